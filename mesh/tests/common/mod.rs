//! Shared fixtures for the custom mesh integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Once};

use redlilium_custom_mesh::{
    Attribute, AttributeType, MeshSpecification, MeshSpecificationDescriptor, ShaderCompiler,
    Varying, VaryingType,
};

/// Vertex stage that forwards the position as `uv`.
pub const VS_UV: &str = "fn main(attributes: Attributes) -> Varyings {
  var v: Varyings;
  v.uv = attributes.position;
  return v;
}
";

/// Fragment stage with no color output and no local coordinates.
pub const FS_NO_COLOR: &str = "fn main(varyings: Varyings) {}
";

/// Fragment stage writing a half-precision color and returning local coordinates.
pub const FS_HALF_COLOR_LOCAL: &str = "fn main(varyings: Varyings, color: ptr<function, vec4<f16>>) -> vec2<f32> {
  *color = vec4<f16>(1.0h, 0.0h, 0.0h, 1.0h);
  return varyings.uv;
}
";

/// Fragment stage writing a full-precision color.
pub const FS_FLOAT_COLOR: &str = "fn main(varyings: Varyings, color: ptr<function, vec4<f32>>) {
  *color = vec4<f32>(varyings.uv, 0.0, 1.0);
}
";

static INIT: Once = Once::new();

/// Route `log` output through the test harness.
pub fn init_logging() {
    INIT.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

/// Position-only layout with a 16 byte stride.
pub fn position_attributes() -> Vec<Attribute> {
    vec![
        Attribute::new(AttributeType::Float2, 0, "position"),
        Attribute::new(AttributeType::UByte4Norm, 8, "color"),
        Attribute::new(AttributeType::Float, 12, "weight"),
    ]
}

/// Single `uv` varying.
pub fn uv_varyings() -> Vec<Varying> {
    vec![Varying::new(VaryingType::Float2, "uv")]
}

/// Descriptor built from [`position_attributes`] and [`uv_varyings`].
pub fn descriptor(fragment: &str) -> MeshSpecificationDescriptor {
    MeshSpecificationDescriptor::new(position_attributes(), 16, uv_varyings(), VS_UV, fragment)
}

/// Build a specification that is expected to succeed.
pub fn build(compiler: &ShaderCompiler, fragment: &str) -> Arc<MeshSpecification> {
    match MeshSpecification::make(compiler, &descriptor(fragment)) {
        Ok(spec) => spec,
        Err(e) => panic!("specification should build: {e}"),
    }
}
