//! Integration tests for custom mesh validation.
//!
//! Each case runs against CPU-backed buffers and against buffers uploaded to
//! the dummy device, which must validate identically.

mod common;

use rstest::rstest;

use common::{FS_NO_COLOR, build, init_logging};
use redlilium_custom_mesh::{
    CustomMesh, DeviceContext, IndexBuffer, MeshMode, Rect, ShaderCompiler, VertexBuffer,
};

#[derive(Debug, Clone, Copy)]
enum Backing {
    Cpu,
    Dummy,
}

impl Backing {
    fn device(self) -> Option<DeviceContext> {
        match self {
            Self::Cpu => None,
            Self::Dummy => Some(DeviceContext::dummy()),
        }
    }

    fn vertices(self, size: usize) -> Option<VertexBuffer> {
        VertexBuffer::new(self.device().as_ref(), Some(&vec![0u8; size]))
    }

    fn indices(self, size: usize) -> Option<IndexBuffer> {
        IndexBuffer::new(self.device().as_ref(), Some(&vec![0u8; size]))
    }
}

// The common layout has a 16 byte stride.
const STRIDE: usize = 16;

#[rstest]
#[case::exact_fit(3, 0, 48, true)]
#[case::second_vertex(3, 16, 64, true)]
#[case::below_minimum(2, 0, 48, false)]
#[case::misaligned_offset(3, 4, 64, false)]
#[case::past_end(4, 0, 48, false)]
#[case::zero_count(0, 0, 48, false)]
#[case::count_overflow(usize::MAX / 2, 0, 48, false)]
#[case::offset_overflow(3, usize::MAX - 15, 48, false)]
fn test_non_indexed(
    #[values(Backing::Cpu, Backing::Dummy)] backing: Backing,
    #[case] vertex_count: usize,
    #[case] vertex_offset: usize,
    #[case] buffer_size: usize,
    #[case] valid: bool,
) {
    init_logging();
    let spec = build(&ShaderCompiler::new(), FS_NO_COLOR);
    assert_eq!(spec.stride(), STRIDE);

    let mesh = CustomMesh::make(
        Some(spec),
        MeshMode::Triangles,
        backing.vertices(buffer_size),
        vertex_count,
        vertex_offset,
        Rect::from_wh(10.0, 10.0),
    );
    assert_eq!(mesh.is_valid(), valid);
    assert_eq!(mesh.is_invalid_sentinel(), !valid);
}

#[rstest]
#[case::triangle(3, 0, 6, true)]
#[case::offset_strip(4, 4, 12, true)]
#[case::below_minimum(2, 0, 6, false)]
#[case::past_end(4, 0, 6, false)]
#[case::odd_offset(3, 1, 8, false)]
#[case::count_overflow(usize::MAX, 0, 6, false)]
fn test_indexed(
    #[values(Backing::Cpu, Backing::Dummy)] backing: Backing,
    #[values(MeshMode::Triangles, MeshMode::TriangleStrip)] mode: MeshMode,
    #[case] index_count: usize,
    #[case] index_offset: usize,
    #[case] buffer_size: usize,
    #[case] valid: bool,
) {
    init_logging();
    let spec = build(&ShaderCompiler::new(), FS_NO_COLOR);

    let mesh = CustomMesh::make_indexed(
        Some(spec),
        mode,
        backing.vertices(STRIDE),
        1,
        0,
        backing.indices(buffer_size),
        index_count,
        index_offset,
        Rect::default(),
    );
    assert_eq!(mesh.is_valid(), valid);
    if valid {
        assert_eq!(mesh.mode(), mode);
        assert_eq!(mesh.index_count(), index_count);
        assert_eq!(mesh.index_offset(), index_offset);
    }
}

#[test]
fn test_stray_index_metadata_rejected() {
    init_logging();
    let spec = build(&ShaderCompiler::new(), FS_NO_COLOR);
    let mesh = CustomMesh::make_indexed(
        Some(spec),
        MeshMode::Triangles,
        Backing::Cpu.vertices(48),
        3,
        0,
        None,
        6,
        0,
        Rect::default(),
    );
    assert!(!mesh.is_valid());
    assert!(mesh.is_invalid_sentinel());
}

#[test]
fn test_meshes_share_specification() {
    init_logging();
    let spec = build(&ShaderCompiler::new(), FS_NO_COLOR);
    let a = CustomMesh::make(
        Some(spec.clone()),
        MeshMode::Triangles,
        Backing::Cpu.vertices(48),
        3,
        0,
        Rect::default(),
    );
    let b = CustomMesh::make(
        Some(spec.clone()),
        MeshMode::TriangleStrip,
        Backing::Dummy.vertices(64),
        4,
        0,
        Rect::default(),
    );
    assert!(a.is_valid() && b.is_valid());
    assert_eq!(a.spec().map(|s| s.hash()), b.spec().map(|s| s.hash()));
    assert!(b.vertex_buffer().is_some_and(|vb| vb.buffer().is_gpu_backed()));

    drop(a);
    drop(b);
    assert_eq!(std::sync::Arc::strong_count(&spec), 1);
}

#[test]
fn test_default_equals_invalid() {
    let mesh = CustomMesh::default();
    assert!(mesh.is_invalid_sentinel());
    assert!(!mesh.is_valid());
}
