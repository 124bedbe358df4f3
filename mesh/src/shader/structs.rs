//! Struct declarations synthesized from a custom mesh layout.
//!
//! User stage bodies refer to two structs they never declare themselves:
//!
//! ```wgsl
//! struct Varyings {
//!   uv: vec2<f32>,
//! }
//! struct Attributes {
//!   position: vec2<f32>,
//!   color: vec4<f16>,
//! }
//! ```
//!
//! The vertex source is `Varyings + Attributes + vertex body`, the fragment
//! source is `Varyings + fragment body`. Nothing is validated here, names are
//! checked before synthesis and the compiler handles the rest.

use std::fmt::Write;

use crate::layout::{Attribute, Varying};

/// Name of the synthesized attributes struct.
pub const ATTRIBUTES_STRUCT: &str = "Attributes";
/// Name of the synthesized varyings struct.
pub const VARYINGS_STRUCT: &str = "Varyings";

/// Field added to an otherwise empty `Varyings` struct.
///
/// WGSL has no zero-member structs.
const EMPTY_VARYINGS_FIELD: (&str, &str) = ("bool", "_empty_");

/// An ordered list of `(type, name)` fields, rendered as a WGSL struct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructDecl {
    name: &'static str,
    fields: Vec<(&'static str, String)>,
}

impl StructDecl {
    /// Create an empty struct declaration.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            fields: Vec::new(),
        }
    }

    /// Add a field.
    pub fn with_field(mut self, ty: &'static str, name: impl Into<String>) -> Self {
        self.fields.push((ty, name.into()));
        self
    }

    /// Declaration for the vertex attributes.
    pub fn attributes(attributes: &[Attribute]) -> Self {
        attributes
            .iter()
            .fold(Self::new(ATTRIBUTES_STRUCT), |decl, a| {
                decl.with_field(a.ty.wgsl_type(), a.name.as_str())
            })
    }

    /// Declaration for the varyings, padded with a dummy field when empty.
    pub fn varyings(varyings: &[Varying]) -> Self {
        let decl = varyings
            .iter()
            .fold(Self::new(VARYINGS_STRUCT), |decl, v| {
                decl.with_field(v.ty.wgsl_type(), v.name.as_str())
            });
        if decl.fields.is_empty() {
            let (ty, name) = EMPTY_VARYINGS_FIELD;
            decl.with_field(ty, name)
        } else {
            decl
        }
    }

    /// Struct name.
    pub fn name(&self) -> &str {
        self.name
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[(&'static str, String)] {
        &self.fields
    }

    /// Render the WGSL declaration.
    pub fn to_wgsl(&self) -> String {
        let mut out = format!("struct {} {{\n", self.name);
        for (ty, name) in &self.fields {
            // Writing into a String cannot fail.
            let _ = writeln!(out, "  {name}: {ty},");
        }
        out.push_str("}\n");
        out
    }
}

/// Full per-stage sources ready for compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageSources {
    /// Vertex stage source.
    pub vertex: String,
    /// Fragment stage source.
    pub fragment: String,
}

/// Prepend the synthesized struct declarations to the user stage bodies.
pub fn synthesize_sources(
    attributes: &[Attribute],
    varyings: &[Varying],
    vertex_body: &str,
    fragment_body: &str,
) -> StageSources {
    let varyings_struct = StructDecl::varyings(varyings).to_wgsl();
    let attributes_struct = StructDecl::attributes(attributes).to_wgsl();

    let mut vertex =
        String::with_capacity(varyings_struct.len() + attributes_struct.len() + vertex_body.len());
    vertex.push_str(&varyings_struct);
    vertex.push_str(&attributes_struct);
    vertex.push_str(vertex_body);

    let mut fragment = String::with_capacity(varyings_struct.len() + fragment_body.len());
    fragment.push_str(&varyings_struct);
    fragment.push_str(fragment_body);

    StageSources { vertex, fragment }
}
