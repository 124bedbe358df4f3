//! Custom mesh specifications.
//!
//! A [`MeshSpecification`] is the compiled, immutable description of a custom
//! mesh: vertex layout, varyings, both stage programs and the fragment stage's
//! output contract. It is built once, shared as `Arc` by every
//! [`CustomMesh`](crate::CustomMesh) that uses it, and identified by a stable
//! content [`hash`](MeshSpecification::hash).
//!
//! # Example
//!
//! ```ignore
//! let compiler = Arc::new(ShaderCompiler::new());
//!
//! let desc = MeshSpecificationDescriptor::new(
//!     vec![Attribute::new(AttributeType::Float2, 0, "position")],
//!     8,
//!     vec![Varying::new(VaryingType::Float2, "uv")],
//!     VERTEX_BODY,
//!     FRAGMENT_BODY,
//! );
//! let spec = MeshSpecification::make(&compiler, &desc)?;
//! println!("spec {:016x} color {:?}", spec.hash(), spec.color_type());
//! ```

mod contract;
mod hash;

use std::sync::Arc;

use crate::color::{AlphaType, ColorSpace};
use crate::error::SpecError;
use crate::layout::{Attribute, MAX_VARYINGS, Varying, check_name, validate_layout};
use crate::profile_function;
use crate::shader::{CompileSettings, CompiledProgram, ProgramKind, ShaderCompiler, synthesize_sources};

pub use contract::{ColorType, FragmentContract};

/// Inputs for building a [`MeshSpecification`].
///
/// Color space defaults to sRGB and alpha type to premultiplied. Both are
/// ignored when the fragment stage produces no color.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshSpecificationDescriptor {
    /// Vertex attributes in declaration order.
    pub attributes: Vec<Attribute>,
    /// Vertex stride in bytes.
    pub stride: usize,
    /// Varyings in declaration order.
    pub varyings: Vec<Varying>,
    /// Vertex stage body, without the struct declarations.
    pub vertex_source: String,
    /// Fragment stage body, without the struct declarations.
    pub fragment_source: String,
    /// Color space of the fragment color output.
    pub color_space: Option<ColorSpace>,
    /// Alpha type of the fragment color output.
    pub alpha_type: AlphaType,
}

impl MeshSpecificationDescriptor {
    /// Create a descriptor with sRGB and premultiplied alpha.
    pub fn new(
        attributes: Vec<Attribute>,
        stride: usize,
        varyings: Vec<Varying>,
        vertex_source: impl Into<String>,
        fragment_source: impl Into<String>,
    ) -> Self {
        Self {
            attributes,
            stride,
            varyings,
            vertex_source: vertex_source.into(),
            fragment_source: fragment_source.into(),
            color_space: Some(ColorSpace::srgb()),
            alpha_type: AlphaType::Premul,
        }
    }

    /// Set the color space.
    pub fn with_color_space(mut self, color_space: Option<ColorSpace>) -> Self {
        self.color_space = color_space;
        self
    }

    /// Set the alpha type.
    pub fn with_alpha_type(mut self, alpha_type: AlphaType) -> Self {
        self.alpha_type = alpha_type;
        self
    }
}

/// Compiled, immutable custom mesh description.
#[derive(Debug)]
pub struct MeshSpecification {
    attributes: Vec<Attribute>,
    varyings: Vec<Varying>,
    stride: usize,
    vertex: CompiledProgram,
    fragment: CompiledProgram,
    color_type: ColorType,
    has_local_coords: bool,
    color_space: Option<ColorSpace>,
    alpha_type: AlphaType,
    hash: u64,
}

impl MeshSpecification {
    /// Build a specification, synthesizing the `Attributes` and `Varyings`
    /// struct declarations in front of the stage bodies.
    pub fn make(
        compiler: &ShaderCompiler,
        desc: &MeshSpecificationDescriptor,
    ) -> Result<Arc<Self>, SpecError> {
        profile_function!();

        // Names go into struct bodies, check them before any text is built.
        Self::check_inputs(&desc.attributes, desc.stride, &desc.varyings)?;

        let sources = synthesize_sources(
            &desc.attributes,
            &desc.varyings,
            &desc.vertex_source,
            &desc.fragment_source,
        );
        Self::build(
            compiler,
            desc,
            &sources.vertex,
            &sources.fragment,
        )
    }

    /// Build with sRGB replaced by `color_space` and premultiplied alpha.
    pub fn make_with_color_space(
        compiler: &ShaderCompiler,
        attributes: Vec<Attribute>,
        stride: usize,
        varyings: Vec<Varying>,
        vertex_source: &str,
        fragment_source: &str,
        color_space: Option<ColorSpace>,
    ) -> Result<Arc<Self>, SpecError> {
        let desc =
            MeshSpecificationDescriptor::new(attributes, stride, varyings, vertex_source, fragment_source)
                .with_color_space(color_space);
        Self::make(compiler, &desc)
    }

    /// Build with an explicit color space and alpha type.
    #[allow(clippy::too_many_arguments)]
    pub fn make_with_color_space_and_alpha(
        compiler: &ShaderCompiler,
        attributes: Vec<Attribute>,
        stride: usize,
        varyings: Vec<Varying>,
        vertex_source: &str,
        fragment_source: &str,
        color_space: Option<ColorSpace>,
        alpha_type: AlphaType,
    ) -> Result<Arc<Self>, SpecError> {
        let desc =
            MeshSpecificationDescriptor::new(attributes, stride, varyings, vertex_source, fragment_source)
                .with_color_space(color_space)
                .with_alpha_type(alpha_type);
        Self::make(compiler, &desc)
    }

    /// Build from complete stage sources that already declare `Attributes`
    /// and `Varyings`. Every check except struct synthesis still runs.
    pub fn make_from_source_with_structs(
        compiler: &ShaderCompiler,
        desc: &MeshSpecificationDescriptor,
    ) -> Result<Arc<Self>, SpecError> {
        profile_function!();

        Self::check_inputs(&desc.attributes, desc.stride, &desc.varyings)?;
        Self::build(compiler, desc, &desc.vertex_source, &desc.fragment_source)
    }

    fn check_inputs(
        attributes: &[Attribute],
        stride: usize,
        varyings: &[Varying],
    ) -> Result<(), SpecError> {
        validate_layout(attributes, stride)?;

        if let Some(a) = attributes.iter().find(|a| !check_name(&a.name)) {
            return Err(SpecError::Naming(format!(
                "\"{}\" is not a valid attribute name.",
                a.name
            )));
        }

        if varyings.len() > MAX_VARYINGS {
            return Err(SpecError::layout(format!(
                "A maximum of {MAX_VARYINGS} varyings is allowed."
            )));
        }

        if let Some(v) = varyings.iter().find(|v| !check_name(&v.name)) {
            return Err(SpecError::Naming(format!(
                "\"{}\" is not a valid varying name.",
                v.name
            )));
        }
        Ok(())
    }

    fn build(
        compiler: &ShaderCompiler,
        desc: &MeshSpecificationDescriptor,
        vertex_source: &str,
        fragment_source: &str,
    ) -> Result<Arc<Self>, SpecError> {
        let result = Self::compile_and_assemble(compiler, desc, vertex_source, fragment_source);
        match &result {
            Ok(spec) => log::debug!(
                "Built custom mesh specification {:016x} (color: {:?}, local coords: {})",
                spec.hash,
                spec.color_type,
                spec.has_local_coords
            ),
            Err(e) => log::warn!("Custom mesh specification rejected: {e}"),
        }
        result
    }

    fn compile_and_assemble(
        compiler: &ShaderCompiler,
        desc: &MeshSpecificationDescriptor,
        vertex_source: &str,
        fragment_source: &str,
    ) -> Result<Arc<Self>, SpecError> {
        let vertex = compile_stage(compiler, vertex_source, ProgramKind::Vertex)?;
        let fragment = compile_stage(compiler, fragment_source, ProgramKind::Fragment)?;

        let FragmentContract {
            color_type,
            has_local_coords,
        } = FragmentContract::extract(&fragment)?;

        let (color_space, alpha_type) = match color_type {
            ColorType::None => (None, AlphaType::Premul),
            ColorType::Half4 | ColorType::Float4 => {
                let Some(color_space) = desc.color_space else {
                    return Err(SpecError::contract(
                        "Must provide a color space if FS returns a color.",
                    ));
                };
                if desc.alpha_type == AlphaType::Unknown {
                    return Err(SpecError::contract(
                        "Must provide a valid alpha type if FS returns a color.",
                    ));
                }
                (Some(color_space), desc.alpha_type)
            }
        };

        let hash = hash::specification_hash(
            vertex.source(),
            fragment.source(),
            &desc.attributes,
            desc.stride,
            color_space.as_ref(),
            alpha_type,
        );

        Ok(Arc::new(Self {
            attributes: desc.attributes.clone(),
            varyings: desc.varyings.clone(),
            stride: desc.stride,
            vertex,
            fragment,
            color_type,
            has_local_coords,
            color_space,
            alpha_type,
            hash,
        }))
    }

    /// Get the vertex attributes.
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Get the varyings.
    pub fn varyings(&self) -> &[Varying] {
        &self.varyings
    }

    /// Get the vertex stride in bytes.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Get the compiled vertex stage.
    pub fn vertex_program(&self) -> &CompiledProgram {
        &self.vertex
    }

    /// Get the compiled fragment stage.
    pub fn fragment_program(&self) -> &CompiledProgram {
        &self.fragment
    }

    /// Get the color produced by the fragment stage.
    pub fn color_type(&self) -> ColorType {
        self.color_type
    }

    /// Check whether the fragment stage returns local coordinates.
    pub fn has_local_coords(&self) -> bool {
        self.has_local_coords
    }

    /// Get the color space of the fragment color, absent when there is none.
    pub fn color_space(&self) -> Option<&ColorSpace> {
        self.color_space.as_ref()
    }

    /// Get the alpha type of the fragment color.
    pub fn alpha_type(&self) -> AlphaType {
        self.alpha_type
    }

    /// Get the content hash.
    ///
    /// Two specifications with the same hash compile to the same programs and
    /// read vertex data the same way.
    pub fn hash(&self) -> u64 {
        self.hash
    }
}

fn compile_stage(
    compiler: &ShaderCompiler,
    source: &str,
    kind: ProgramKind,
) -> Result<CompiledProgram, SpecError> {
    let program = compiler
        .compile(source, kind, &CompileSettings::restricted())
        .map_err(|e| SpecError::Compilation {
            stage: kind,
            diagnostics: e.to_string(),
        })?;
    if !program.has_main() {
        return Err(SpecError::contract(format!(
            "{} shader must have main function.",
            kind.name()
        )));
    }
    if program.calls_color_transform_intrinsics() {
        return Err(SpecError::contract(
            "Color transform intrinsics are not permitted in custom mesh shaders",
        ));
    }
    Ok(program)
}

// Ensure MeshSpecification is Send + Sync
static_assertions::assert_impl_all!(MeshSpecification: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{AttributeType, VaryingType};

    const VS: &str = "fn main(attributes: Attributes) -> Varyings {\n  \
                      var v: Varyings;\n  v.uv = attributes.position;\n  return v;\n}\n";
    const FS_NO_COLOR: &str = "fn main(varyings: Varyings) {}\n";
    const FS_COLOR: &str = "fn main(varyings: Varyings, color: ptr<function, vec4<f32>>) {\n  \
                            *color = vec4<f32>(varyings.uv, 0.0, 1.0);\n}\n";

    fn desc(fs: &str) -> MeshSpecificationDescriptor {
        MeshSpecificationDescriptor::new(
            vec![Attribute::new(AttributeType::Float2, 0, "position")],
            8,
            vec![Varying::new(VaryingType::Float2, "uv")],
            VS,
            fs,
        )
    }

    #[test]
    fn test_make_without_color() {
        let compiler = ShaderCompiler::new();
        let spec = MeshSpecification::make(&compiler, &desc(FS_NO_COLOR)).unwrap();
        assert_eq!(spec.color_type(), ColorType::None);
        assert!(!spec.has_local_coords());
        assert!(spec.color_space().is_none());
        assert_eq!(spec.alpha_type(), AlphaType::Premul);
        assert_eq!(spec.stride(), 8);
        assert_eq!(spec.attributes().len(), 1);
        assert_eq!(spec.varyings().len(), 1);
    }

    #[test]
    fn test_make_with_color_defaults_to_srgb() {
        let compiler = ShaderCompiler::new();
        let spec = MeshSpecification::make(&compiler, &desc(FS_COLOR)).unwrap();
        assert_eq!(spec.color_type(), ColorType::Float4);
        assert_eq!(spec.color_space(), Some(&ColorSpace::srgb()));
        assert_eq!(spec.alpha_type(), AlphaType::Premul);
    }

    #[test]
    fn test_color_requires_color_space_and_alpha() {
        let compiler = ShaderCompiler::new();
        let err = MeshSpecification::make(&compiler, &desc(FS_COLOR).with_color_space(None))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Must provide a color space if FS returns a color."
        );

        let err = MeshSpecification::make(
            &compiler,
            &desc(FS_COLOR).with_alpha_type(AlphaType::Unknown),
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Must provide a valid alpha type if FS returns a color."
        );
    }

    #[test]
    fn test_missing_main() {
        let compiler = ShaderCompiler::new();
        let err = MeshSpecification::make(&compiler, &desc("fn helper() {}\n")).unwrap_err();
        assert_eq!(err.to_string(), "Fragment shader must have main function.");
    }

    #[test]
    fn test_vertex_missing_main() {
        let compiler = ShaderCompiler::new();
        let mut d = desc(FS_NO_COLOR);
        d.vertex_source = "fn helper() {}\n".into();
        let err = MeshSpecification::make(&compiler, &d).unwrap_err();
        assert_eq!(err.to_string(), "Vertex shader must have main function.");
        // The fragment stage is never compiled.
        assert_eq!(compiler.compile_count(), 1);
    }

    #[test]
    fn test_vertex_color_transform_rejected() {
        let compiler = ShaderCompiler::new();
        let mut d = desc(FS_NO_COLOR);
        d.vertex_source = "fn main(attributes: Attributes) -> Varyings {\n  \
                           var v: Varyings;\n  \
                           v.uv = fromLinearSrgb(vec3<f32>(attributes.position, 0.0)).xy;\n  \
                           return v;\n}\n"
            .into();
        let err = MeshSpecification::make(&compiler, &d).unwrap_err();
        assert!(matches!(err, SpecError::Contract(_)));
        assert_eq!(
            err.to_string(),
            "Color transform intrinsics are not permitted in custom mesh shaders"
        );
        assert_eq!(compiler.compile_count(), 1);
    }

    #[test]
    fn test_compile_error_is_stage_tagged() {
        let compiler = ShaderCompiler::new();
        let err = MeshSpecification::make(&compiler, &desc("fn main(varyings: Varyings) {")).unwrap_err();
        assert!(matches!(
            err,
            SpecError::Compilation {
                stage: ProgramKind::Fragment,
                ..
            }
        ));
        assert!(err.to_string().starts_with("FS: "));
    }

    #[test]
    fn test_too_many_varyings() {
        let compiler = ShaderCompiler::new();
        let mut d = desc(FS_NO_COLOR);
        d.varyings = (0..7)
            .map(|i| Varying::new(VaryingType::Float, format!("v{i}")))
            .collect();
        let err = MeshSpecification::make(&compiler, &d).unwrap_err();
        assert_eq!(err.to_string(), "A maximum of 6 varyings is allowed.");
        assert_eq!(compiler.compile_count(), 0);
    }

    #[test]
    fn test_make_from_source_with_structs() {
        let compiler = ShaderCompiler::new();
        let varyings = "struct Varyings {\n  uv: vec2<f32>,\n}\n";
        let attributes = "struct Attributes {\n  position: vec2<f32>,\n}\n";
        let mut d = desc(FS_NO_COLOR);
        d.vertex_source = format!("{varyings}{attributes}{VS}");
        d.fragment_source = format!("{varyings}{FS_NO_COLOR}");

        let from_structs = MeshSpecification::make_from_source_with_structs(&compiler, &d).unwrap();
        let synthesized = MeshSpecification::make(&compiler, &desc(FS_NO_COLOR)).unwrap();
        assert_eq!(from_structs.hash(), synthesized.hash());
    }

    #[test]
    fn test_overloads_agree() {
        let compiler = ShaderCompiler::new();
        let d = desc(FS_COLOR);
        let a = MeshSpecification::make(&compiler, &d).unwrap();
        let b = MeshSpecification::make_with_color_space(
            &compiler,
            d.attributes.clone(),
            d.stride,
            d.varyings.clone(),
            VS,
            FS_COLOR,
            Some(ColorSpace::srgb()),
        )
        .unwrap();
        let c = MeshSpecification::make_with_color_space_and_alpha(
            &compiler,
            d.attributes.clone(),
            d.stride,
            d.varyings.clone(),
            VS,
            FS_COLOR,
            Some(ColorSpace::srgb()),
            AlphaType::Premul,
        )
        .unwrap();
        assert_eq!(a.hash(), b.hash());
        assert_eq!(a.hash(), c.hash());
    }
}
