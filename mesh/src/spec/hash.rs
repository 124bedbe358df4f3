//! Content hash identifying a specification.

use std::hash::Hasher;

use fxhash::FxHasher64;

use crate::color::{AlphaType, ColorSpace};
use crate::layout::Attribute;

/// Fold everything that determines a specification's behavior into one value.
///
/// The struct declarations are part of the source text, so names are covered
/// there. Attribute offsets and CPU types are hashed separately because the
/// shader only sees the GPU type. Every integer is written at a fixed width
/// so the value does not depend on the platform. Each source is preceded by
/// its length, so text cannot move between the two stages unnoticed.
pub(crate) fn specification_hash(
    vertex_source: &str,
    fragment_source: &str,
    attributes: &[Attribute],
    stride: usize,
    color_space: Option<&ColorSpace>,
    alpha_type: AlphaType,
) -> u64 {
    let mut hasher = FxHasher64::default();
    hasher.write_u64(vertex_source.len() as u64);
    hasher.write(vertex_source.as_bytes());
    hasher.write_u64(fragment_source.len() as u64);
    hasher.write(fragment_source.as_bytes());
    for attr in attributes {
        hasher.write_u64(attr.offset as u64);
        hasher.write_u32(attr.ty.code());
    }
    hasher.write_u64(stride as u64);
    hasher.write_u64(color_space.map_or(0, ColorSpace::hash));
    hasher.write_u32(alpha_type.code());
    hasher.finish()
}
