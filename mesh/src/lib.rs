//! # RedLilium Custom Mesh
//!
//! User-programmable meshes for RedLilium: a vertex layout and two WGSL stage
//! bodies are validated, compiled and frozen into a shareable specification,
//! which concrete meshes then reference together with their buffer regions.
//!
//! ## Overview
//!
//! This crate provides:
//! - [`MeshSpecification`] - Compiled, hashable description of a custom mesh
//! - [`CustomMesh`] - Drawable instance validated against its specification
//! - [`ShaderCompiler`] - Shared compiler service backed by naga
//! - [`VertexBuffer`] / [`IndexBuffer`] - CPU- or GPU-backed buffer handles
//!
//! ## Example
//!
//! ```ignore
//! use redlilium_custom_mesh::*;
//!
//! let compiler = Arc::new(ShaderCompiler::new());
//! let desc = MeshSpecificationDescriptor::new(attributes, 16, varyings, VS, FS);
//! let spec = MeshSpecification::make(&compiler, &desc)?;
//!
//! let vb = VertexBuffer::new(None, Some(&vertex_bytes));
//! let mesh = CustomMesh::make(Some(spec), MeshMode::Triangles, vb, 3, 0, bounds);
//! assert!(mesh.is_valid());
//! ```

pub mod buffer;
pub mod color;
pub mod error;
pub mod layout;
pub mod mesh;
pub mod profiling;
pub mod shader;
pub mod spec;

// Re-export main types for convenience
pub use buffer::{BufferDescriptor, BufferUsage, DeviceContext, IndexBuffer, MeshBuffer, VertexBuffer};
pub use color::{AlphaType, ColorSpace, Gamut, TransferFunction};
pub use error::{CompileError, SpecError};
pub use layout::{
    Attribute, AttributeType, MAX_ATTRIBUTES, MAX_STRIDE, MAX_VARYINGS, OFFSET_ALIGNMENT,
    STRIDE_ALIGNMENT, Varying, VaryingType,
};
pub use mesh::{CustomMesh, MeshMode, Rect};
pub use shader::{CompileSettings, CompiledProgram, ProgramKind, ShaderCompiler};
pub use spec::{ColorType, MeshSpecification, MeshSpecificationDescriptor};

/// Custom mesh library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the custom mesh subsystem.
pub fn init() {
    log::info!("RedLilium Custom Mesh v{} initialized", VERSION);
}
