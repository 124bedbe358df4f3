//! Vertex and index buffers for custom meshes.
//!
//! A buffer is either CPU-backed (the bytes stay in memory and are uploaded
//! by the renderer) or GPU-backed (uploaded at creation time through a
//! [`DeviceContext`]). The variant is picked by whether a device context is
//! passed to the constructor. Mesh validation only ever asks for the size.
//!
//! # Example
//!
//! ```ignore
//! let vertices: &[u8] = bytemuck::cast_slice(&positions);
//!
//! // CPU-backed
//! let vb = VertexBuffer::new(None, Some(vertices)).unwrap();
//!
//! // GPU-backed
//! let ctx = DeviceContext::wgpu(device.clone());
//! let vb = VertexBuffer::new(Some(&ctx), Some(vertices)).unwrap();
//! assert_eq!(vb.size(), vertices.len());
//! ```

use std::sync::Arc;

use bitflags::bitflags;

bitflags! {
    /// Usage flags for mesh buffers.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BufferUsage: u32 {
        /// Buffer can be used as a vertex buffer.
        const VERTEX = 1 << 0;
        /// Buffer can be used as an index buffer.
        const INDEX = 1 << 1;
        /// Buffer can be copied to.
        const COPY_DST = 1 << 2;
    }
}

impl Default for BufferUsage {
    fn default() -> Self {
        Self::empty()
    }
}

/// Descriptor of a device-backed buffer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct BufferDescriptor {
    /// Debug label for the buffer.
    pub label: Option<String>,
    /// Size in bytes of the uploaded data.
    pub size: usize,
    /// Usage flags.
    pub usage: BufferUsage,
}

impl BufferDescriptor {
    /// Create a new buffer descriptor.
    pub fn new(size: usize, usage: BufferUsage) -> Self {
        Self {
            label: None,
            size,
            usage,
        }
    }

    /// Set the debug label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// Size query shared by every buffer backing.
pub trait MeshBuffer: std::fmt::Debug + Send + Sync {
    /// Size in bytes.
    fn size(&self) -> usize;

    /// Whether the data lives in device memory.
    fn is_gpu_backed(&self) -> bool;

    /// CPU-side bytes, for CPU-backed buffers.
    fn cpu_data(&self) -> Option<&[u8]> {
        None
    }
}

/// Buffer whose bytes stay in CPU memory.
#[derive(Debug, Clone)]
pub struct CpuBuffer {
    data: Arc<[u8]>,
}

impl CpuBuffer {
    /// Copy `data` into a new CPU buffer.
    pub fn new(data: &[u8]) -> Self {
        Self { data: data.into() }
    }
}

impl MeshBuffer for CpuBuffer {
    fn size(&self) -> usize {
        self.data.len()
    }

    fn is_gpu_backed(&self) -> bool {
        false
    }

    fn cpu_data(&self) -> Option<&[u8]> {
        Some(&self.data[..])
    }
}

/// Device allocation behind a [`GpuBuffer`].
#[derive(Debug)]
enum GpuBacking {
    /// Dummy backend (no GPU allocation)
    Dummy,
    /// wgpu backend buffer
    #[cfg(feature = "wgpu-backend")]
    Wgpu(wgpu::Buffer),
}

/// Buffer uploaded to device memory at creation time.
#[derive(Debug)]
pub struct GpuBuffer {
    descriptor: BufferDescriptor,
    backing: GpuBacking,
}

impl GpuBuffer {
    /// Get the buffer descriptor.
    pub fn descriptor(&self) -> &BufferDescriptor {
        &self.descriptor
    }

    /// Check whether this buffer was created on the dummy device.
    pub fn is_dummy(&self) -> bool {
        matches!(self.backing, GpuBacking::Dummy)
    }

    /// Get the wgpu buffer, if this buffer lives on a wgpu device.
    #[cfg(feature = "wgpu-backend")]
    pub fn wgpu_buffer(&self) -> Option<&wgpu::Buffer> {
        match &self.backing {
            GpuBacking::Wgpu(buffer) => Some(buffer),
            GpuBacking::Dummy => None,
        }
    }
}

impl MeshBuffer for GpuBuffer {
    fn size(&self) -> usize {
        self.descriptor.size
    }

    fn is_gpu_backed(&self) -> bool {
        true
    }
}

/// Device that GPU-backed buffers are uploaded to.
#[derive(Debug, Clone)]
pub enum DeviceContext {
    /// No-op device for testing, buffers record their size only.
    Dummy,
    /// wgpu device.
    #[cfg(feature = "wgpu-backend")]
    Wgpu(wgpu::Device),
}

impl DeviceContext {
    /// Create a dummy device context.
    pub fn dummy() -> Self {
        Self::Dummy
    }

    /// Wrap a wgpu device.
    #[cfg(feature = "wgpu-backend")]
    pub fn wgpu(device: wgpu::Device) -> Self {
        Self::Wgpu(device)
    }

    /// Get the backend name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Dummy => "Dummy",
            #[cfg(feature = "wgpu-backend")]
            Self::Wgpu(_) => "wgpu",
        }
    }

    /// Upload `data` into a new device buffer.
    pub fn create_buffer(&self, descriptor: BufferDescriptor, data: &[u8]) -> GpuBuffer {
        log::trace!(
            "{}: creating mesh buffer {:?} (size: {}, usage: {:?})",
            self.name(),
            descriptor.label,
            descriptor.size,
            descriptor.usage
        );
        let backing = match self {
            Self::Dummy => GpuBacking::Dummy,
            #[cfg(feature = "wgpu-backend")]
            Self::Wgpu(device) => {
                use wgpu::util::DeviceExt;

                let mut usage = wgpu::BufferUsages::empty();
                if descriptor.usage.contains(BufferUsage::VERTEX) {
                    usage |= wgpu::BufferUsages::VERTEX;
                }
                if descriptor.usage.contains(BufferUsage::INDEX) {
                    usage |= wgpu::BufferUsages::INDEX;
                }
                if descriptor.usage.contains(BufferUsage::COPY_DST) {
                    usage |= wgpu::BufferUsages::COPY_DST;
                }
                GpuBacking::Wgpu(device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: descriptor.label.as_deref(),
                    contents: data,
                    usage,
                }))
            }
        };
        GpuBuffer {
            descriptor,
            backing,
        }
    }
}

fn make_buffer(
    device: Option<&DeviceContext>,
    data: Option<&[u8]>,
    usage: BufferUsage,
    label: &str,
) -> Option<Arc<dyn MeshBuffer>> {
    let data = data?;
    match device {
        None => Some(Arc::new(CpuBuffer::new(data))),
        Some(device) => {
            let descriptor = BufferDescriptor::new(data.len(), usage | BufferUsage::COPY_DST)
                .with_label(label);
            Some(Arc::new(device.create_buffer(descriptor, data)))
        }
    }
}

/// Shared handle to vertex data.
#[derive(Debug, Clone)]
pub struct VertexBuffer(Arc<dyn MeshBuffer>);

impl VertexBuffer {
    /// Create a vertex buffer, GPU-backed if a device is given.
    ///
    /// Returns `None` when there is no data.
    pub fn new(device: Option<&DeviceContext>, data: Option<&[u8]>) -> Option<Self> {
        make_buffer(device, data, BufferUsage::VERTEX, "custom_mesh_vertices").map(Self)
    }

    /// Get the buffer size in bytes.
    pub fn size(&self) -> usize {
        self.0.size()
    }

    /// Get the underlying buffer.
    pub fn buffer(&self) -> &Arc<dyn MeshBuffer> {
        &self.0
    }
}

/// Shared handle to 16-bit index data.
#[derive(Debug, Clone)]
pub struct IndexBuffer(Arc<dyn MeshBuffer>);

impl IndexBuffer {
    /// Create an index buffer, GPU-backed if a device is given.
    ///
    /// Returns `None` when there is no data.
    pub fn new(device: Option<&DeviceContext>, data: Option<&[u8]>) -> Option<Self> {
        make_buffer(device, data, BufferUsage::INDEX, "custom_mesh_indices").map(Self)
    }

    /// Get the buffer size in bytes.
    pub fn size(&self) -> usize {
        self.0.size()
    }

    /// Get the underlying buffer.
    pub fn buffer(&self) -> &Arc<dyn MeshBuffer> {
        &self.0
    }
}

// Ensure buffer handles are Send + Sync
static_assertions::assert_impl_all!(VertexBuffer: Send, Sync);
static_assertions::assert_impl_all!(IndexBuffer: Send, Sync);
