//! Custom mesh instances.
//!
//! A [`CustomMesh`] pairs a [`MeshSpecification`] with the buffer regions it
//! draws from. The factories validate every region against the specification
//! and the drawing mode, and return the invalid mesh on any failure, so a
//! partially valid mesh is never observable.
//!
//! # Example
//!
//! ```ignore
//! let vb = VertexBuffer::new(None, Some(&vertex_bytes)).unwrap();
//! let mesh = CustomMesh::make(Some(spec), MeshMode::Triangles, Some(vb), 3, 0, bounds);
//! if !mesh.is_valid() {
//!     log::warn!("mesh rejected");
//! }
//! ```

use std::sync::Arc;

use crate::buffer::{IndexBuffer, VertexBuffer};
use crate::spec::MeshSpecification;

/// Size in bytes of one index. Only 16-bit indices are supported.
pub const INDEX_SIZE: usize = std::mem::size_of::<u16>();

/// How vertices are assembled into triangles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MeshMode {
    /// Every three vertices form a triangle.
    #[default]
    Triangles,
    /// Vertices form a connected strip of triangles.
    TriangleStrip,
}

impl MeshMode {
    /// Minimum number of vertices (or indices) needed to draw anything.
    pub fn min_vertex_count(&self) -> usize {
        match self {
            Self::Triangles => 3,
            Self::TriangleStrip => 3,
        }
    }
}

/// Axis-aligned bounds of a mesh, in local coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    /// Left edge.
    pub left: f32,
    /// Top edge.
    pub top: f32,
    /// Right edge.
    pub right: f32,
    /// Bottom edge.
    pub bottom: f32,
}

impl Rect {
    /// Create a rectangle from its edges.
    pub fn from_ltrb(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Create a rectangle at the origin.
    pub fn from_wh(width: f32, height: f32) -> Self {
        Self::from_ltrb(0.0, 0.0, width, height)
    }

    /// Width of the rectangle.
    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    /// Height of the rectangle.
    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }
}

/// A drawable instance of a [`MeshSpecification`].
///
/// `CustomMesh::default()` is the invalid mesh: no specification, no buffers.
#[derive(Debug, Clone, Default)]
pub struct CustomMesh {
    spec: Option<Arc<MeshSpecification>>,
    mode: MeshMode,
    vertex_buffer: Option<VertexBuffer>,
    vertex_count: usize,
    vertex_offset: usize,
    index_buffer: Option<IndexBuffer>,
    index_count: usize,
    index_offset: usize,
    bounds: Rect,
}

impl CustomMesh {
    /// Create a non-indexed mesh, or the invalid mesh if validation fails.
    pub fn make(
        spec: Option<Arc<MeshSpecification>>,
        mode: MeshMode,
        vertex_buffer: Option<VertexBuffer>,
        vertex_count: usize,
        vertex_offset: usize,
        bounds: Rect,
    ) -> Self {
        Self {
            spec,
            mode,
            vertex_buffer,
            vertex_count,
            vertex_offset,
            bounds,
            ..Self::default()
        }
        .validated()
    }

    /// Create an indexed mesh, or the invalid mesh if validation fails.
    #[allow(clippy::too_many_arguments)]
    pub fn make_indexed(
        spec: Option<Arc<MeshSpecification>>,
        mode: MeshMode,
        vertex_buffer: Option<VertexBuffer>,
        vertex_count: usize,
        vertex_offset: usize,
        index_buffer: Option<IndexBuffer>,
        index_count: usize,
        index_offset: usize,
        bounds: Rect,
    ) -> Self {
        Self {
            spec,
            mode,
            vertex_buffer,
            vertex_count,
            vertex_offset,
            index_buffer,
            index_count,
            index_offset,
            bounds,
        }
        .validated()
    }

    fn validated(self) -> Self {
        if self.validate() {
            self
        } else {
            log::trace!(
                "Rejected custom mesh (mode: {:?}, vertices: {} @ {}, indices: {} @ {})",
                self.mode,
                self.vertex_count,
                self.vertex_offset,
                self.index_count,
                self.index_offset
            );
            Self::default()
        }
    }

    /// Check whether this mesh can be drawn.
    pub fn is_valid(&self) -> bool {
        let valid = self.spec.is_some();
        debug_assert_eq!(valid, self.validate());
        valid
    }

    /// Run every bounds, alignment and count check.
    ///
    /// Any arithmetic overflow fails validation.
    pub fn validate(&self) -> bool {
        self.check().is_some()
    }

    fn check(&self) -> Option<()> {
        let spec = self.spec.as_ref()?;
        let vb = self.vertex_buffer.as_ref()?;
        if self.vertex_count == 0 {
            return None;
        }

        let stride = spec.stride();
        let vertex_end = stride
            .checked_mul(self.vertex_count)?
            .checked_add(self.vertex_offset)?;
        if vertex_end > vb.size() {
            return None;
        }
        if self.vertex_offset % stride != 0 {
            return None;
        }

        let min_count = self.mode.min_vertex_count();
        match &self.index_buffer {
            Some(ib) => {
                if self.index_count < min_count {
                    return None;
                }
                let index_end = INDEX_SIZE
                    .checked_mul(self.index_count)?
                    .checked_add(self.index_offset)?;
                if index_end > ib.size() {
                    return None;
                }
                // Would need 4-byte alignment with 32-bit indices.
                if self.index_offset % INDEX_SIZE != 0 {
                    return None;
                }
            }
            None => {
                if self.vertex_count < min_count {
                    return None;
                }
                if self.index_count != 0 || self.index_offset != 0 {
                    return None;
                }
            }
        }
        Some(())
    }

    /// Get the specification, absent for the invalid mesh.
    pub fn spec(&self) -> Option<&Arc<MeshSpecification>> {
        self.spec.as_ref()
    }

    /// Get the drawing mode.
    pub fn mode(&self) -> MeshMode {
        self.mode
    }

    /// Get the vertex buffer.
    pub fn vertex_buffer(&self) -> Option<&VertexBuffer> {
        self.vertex_buffer.as_ref()
    }

    /// Get the number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    /// Get the byte offset of the first vertex.
    pub fn vertex_offset(&self) -> usize {
        self.vertex_offset
    }

    /// Get the index buffer, if indexed.
    pub fn index_buffer(&self) -> Option<&IndexBuffer> {
        self.index_buffer.as_ref()
    }

    /// Get the number of indices.
    pub fn index_count(&self) -> usize {
        self.index_count
    }

    /// Get the byte offset of the first index.
    pub fn index_offset(&self) -> usize {
        self.index_offset
    }

    /// Check if this mesh uses indexed drawing.
    pub fn is_indexed(&self) -> bool {
        self.index_buffer.is_some()
    }

    /// Get the bounds.
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Check whether this is the invalid mesh: no specification, no buffers,
    /// and every count and offset zero.
    pub fn is_invalid_sentinel(&self) -> bool {
        self.spec.is_none()
            && self.vertex_buffer.is_none()
            && self.index_buffer.is_none()
            && self.vertex_count == 0
            && self.vertex_offset == 0
            && self.index_count == 0
            && self.index_offset == 0
            && self.mode == MeshMode::default()
            && self.bounds == Rect::default()
    }
}

// Ensure CustomMesh is Send + Sync
static_assertions::assert_impl_all!(CustomMesh: Send, Sync);
