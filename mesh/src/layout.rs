//! Vertex attribute and varying layout for custom meshes.
//!
//! A custom mesh reads one interleaved vertex buffer. Its layout is a list of
//! [`Attribute`]s (type + byte offset + name) plus the vertex stride. The layout
//! is checked against the tightest limits of every supported backend before
//! any shader text is produced:
//!
//! | Limit | Value | Reason |
//! |-------|-------|--------|
//! | [`MAX_ATTRIBUTES`] | 8 | ES 2 guarantees 8 vertex attributes |
//! | [`MAX_VARYINGS`] | 6 | ES 2 guarantees 8, two are reserved for the pipeline |
//! | [`MAX_STRIDE`] | 2048 | Vulkan 1.0 minimum `maxVertexInputBindingStride` |
//! | [`STRIDE_ALIGNMENT`] | 4 | Metal vertex buffer alignment |
//! | [`OFFSET_ALIGNMENT`] | 4 | Metal vertex attribute alignment |
//!
//! # Example
//!
//! ```ignore
//! let attributes = [
//!     Attribute::new(AttributeType::Float2, 0, "position"),
//!     Attribute::new(AttributeType::UByte4Norm, 8, "color"),
//! ];
//! validate_layout(&attributes, 12)?;
//! ```

use static_assertions::const_assert;

use crate::error::SpecError;

/// Maximum number of vertex attributes.
pub const MAX_ATTRIBUTES: usize = 8;
/// Maximum number of varyings passed from the vertex to the fragment stage.
pub const MAX_VARYINGS: usize = 6;
/// Maximum vertex stride in bytes.
pub const MAX_STRIDE: usize = 2048;
/// Required alignment of the vertex stride.
pub const STRIDE_ALIGNMENT: usize = 4;
/// Required alignment of every attribute offset.
pub const OFFSET_ALIGNMENT: usize = 4;

const_assert!(MAX_STRIDE <= 2048);
const_assert!(MAX_ATTRIBUTES <= 8);
const_assert!(MAX_VARYINGS <= 6);
const_assert!(STRIDE_ALIGNMENT >= 4);
const_assert!(OFFSET_ALIGNMENT >= 4);
const_assert!(STRIDE_ALIGNMENT.is_power_of_two());
const_assert!(OFFSET_ALIGNMENT.is_power_of_two());

/// CPU-side format of a vertex attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeType {
    /// Single 32-bit float.
    Float,
    /// Two 32-bit floats.
    Float2,
    /// Three 32-bit floats.
    Float3,
    /// Four 32-bit floats.
    Float4,
    /// Four 8-bit unsigned integers, normalized to 0.0-1.0.
    UByte4Norm,
}

impl AttributeType {
    /// Get the size in bytes of this type in the vertex buffer.
    pub fn size(&self) -> usize {
        match self {
            Self::Float => 4,
            Self::Float2 => 2 * 4,
            Self::Float3 => 3 * 4,
            Self::Float4 => 4 * 4,
            Self::UByte4Norm => 4,
        }
    }

    /// WGSL type the vertex stage sees for this attribute.
    ///
    /// Normalized bytes arrive in the shader as a half-precision color.
    pub fn wgsl_type(&self) -> &'static str {
        match self {
            Self::Float => "f32",
            Self::Float2 => "vec2<f32>",
            Self::Float3 => "vec3<f32>",
            Self::Float4 => "vec4<f32>",
            Self::UByte4Norm => "vec4<f16>",
        }
    }

    /// Stable numeric code, used when hashing a specification.
    pub fn code(&self) -> u32 {
        match self {
            Self::Float => 0,
            Self::Float2 => 1,
            Self::Float3 => 2,
            Self::Float4 => 3,
            Self::UByte4Norm => 4,
        }
    }
}

/// Type of a value passed from the vertex stage to the fragment stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VaryingType {
    /// Single 32-bit float.
    Float,
    /// Two 32-bit floats.
    Float2,
    /// Three 32-bit floats.
    Float3,
    /// Four 32-bit floats.
    Float4,
    /// Single 16-bit float.
    Half,
    /// Two 16-bit floats.
    Half2,
    /// Three 16-bit floats.
    Half3,
    /// Four 16-bit floats.
    Half4,
}

impl VaryingType {
    /// WGSL type of this varying.
    pub fn wgsl_type(&self) -> &'static str {
        match self {
            Self::Float => "f32",
            Self::Float2 => "vec2<f32>",
            Self::Float3 => "vec3<f32>",
            Self::Float4 => "vec4<f32>",
            Self::Half => "f16",
            Self::Half2 => "vec2<f16>",
            Self::Half3 => "vec3<f16>",
            Self::Half4 => "vec4<f16>",
        }
    }
}

/// A single vertex attribute description.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Attribute {
    /// Data format of this attribute.
    pub ty: AttributeType,
    /// Byte offset within a vertex.
    pub offset: usize,
    /// Field name in the `Attributes` struct.
    pub name: String,
}

impl Attribute {
    /// Create a new vertex attribute.
    pub fn new(ty: AttributeType, offset: usize, name: impl Into<String>) -> Self {
        Self {
            ty,
            offset,
            name: name.into(),
        }
    }
}

/// A single varying description.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Varying {
    /// Type of this varying.
    pub ty: VaryingType,
    /// Field name in the `Varyings` struct.
    pub name: String,
}

impl Varying {
    /// Create a new varying.
    pub fn new(ty: VaryingType, name: impl Into<String>) -> Self {
        Self {
            ty,
            name: name.into(),
        }
    }
}

/// Validate attribute count, stride and offsets.
///
/// Rules are checked in order and the first failure is reported.
pub fn validate_layout(attributes: &[Attribute], stride: usize) -> Result<(), SpecError> {
    if attributes.is_empty() {
        return Err(SpecError::layout("At least 1 attribute is required."));
    }
    if attributes.len() > MAX_ATTRIBUTES {
        return Err(SpecError::layout(format!(
            "A maximum of {MAX_ATTRIBUTES} attributes is allowed."
        )));
    }
    if stride == 0 || stride & (STRIDE_ALIGNMENT - 1) != 0 {
        return Err(SpecError::layout(format!(
            "Vertex stride must be a non-zero multiple of {STRIDE_ALIGNMENT}."
        )));
    }
    if stride > MAX_STRIDE {
        return Err(SpecError::layout(format!(
            "Stride cannot exceed {MAX_STRIDE}."
        )));
    }
    for attr in attributes {
        if attr.offset & (OFFSET_ALIGNMENT - 1) != 0 {
            return Err(SpecError::layout(format!(
                "Attribute offset must be a multiple of {OFFSET_ALIGNMENT}."
            )));
        }
        // Same as vertexAttributeAccessBeyondStride == VK_FALSE in VK_KHR_portability_subset.
        // The first comparison keeps the addition from overflowing.
        if attr.offset >= stride || attr.offset + attr.ty.size() > stride {
            return Err(SpecError::layout(
                "Attribute offset plus size cannot exceed stride.",
            ));
        }
    }
    Ok(())
}

/// Check that `name` is a single identifier-like token.
///
/// This is not the full WGSL identifier grammar, the compiler has the final
/// word. It only keeps a name from smuggling extra tokens into a struct body.
pub fn check_name(name: &str) -> bool {
    !name.is_empty() && name.bytes().all(|b| b == b'_' || b.is_ascii_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attr(ty: AttributeType, offset: usize) -> Attribute {
        Attribute::new(ty, offset, "a")
    }

    #[test]
    fn test_attribute_type_size() {
        assert_eq!(AttributeType::Float.size(), 4);
        assert_eq!(AttributeType::Float2.size(), 8);
        assert_eq!(AttributeType::Float3.size(), 12);
        assert_eq!(AttributeType::Float4.size(), 16);
        assert_eq!(AttributeType::UByte4Norm.size(), 4);
    }

    #[test]
    fn test_ubyte4_maps_to_half_color() {
        assert_eq!(AttributeType::UByte4Norm.wgsl_type(), "vec4<f16>");
        assert_eq!(VaryingType::Half4.wgsl_type(), "vec4<f16>");
    }

    #[test]
    fn test_valid_layout() {
        let attributes = [
            attr(AttributeType::Float2, 0),
            attr(AttributeType::UByte4Norm, 8),
        ];
        assert!(validate_layout(&attributes, 12).is_ok());
        assert!(validate_layout(&[attr(AttributeType::Float4, 2032)], 2048).is_ok());
    }

    #[test]
    fn test_attribute_count() {
        let err = validate_layout(&[], 4).unwrap_err();
        assert_eq!(err.to_string(), "At least 1 attribute is required.");

        let attributes: Vec<_> = (0..9).map(|i| attr(AttributeType::Float, i * 4)).collect();
        let err = validate_layout(&attributes, 36).unwrap_err();
        assert_eq!(err.to_string(), "A maximum of 8 attributes is allowed.");
    }

    #[test]
    fn test_stride_rules() {
        let attributes = [attr(AttributeType::Float, 0)];
        for stride in [0, 6] {
            let err = validate_layout(&attributes, stride).unwrap_err();
            assert_eq!(
                err.to_string(),
                "Vertex stride must be a non-zero multiple of 4."
            );
        }
        let err = validate_layout(&attributes, 2052).unwrap_err();
        assert_eq!(err.to_string(), "Stride cannot exceed 2048.");
    }

    #[test]
    fn test_offset_rules() {
        let err = validate_layout(&[attr(AttributeType::Float, 2)], 8).unwrap_err();
        assert_eq!(err.to_string(), "Attribute offset must be a multiple of 4.");

        let err = validate_layout(&[attr(AttributeType::Float2, 4)], 8).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Attribute offset plus size cannot exceed stride."
        );

        // Offset past the stride must not reach the addition.
        let err = validate_layout(&[attr(AttributeType::Float, usize::MAX - 3)], 8).unwrap_err();
        assert!(matches!(err, SpecError::Layout(_)));
    }

    #[test]
    fn test_first_failure_wins() {
        // Bad count and bad stride: the count is reported.
        let err = validate_layout(&[], 3).unwrap_err();
        assert_eq!(err.to_string(), "At least 1 attribute is required.");
    }

    #[test]
    fn test_check_name() {
        assert!(check_name("position"));
        assert!(check_name("uv_0"));
        assert!(check_name("_x"));
        assert!(!check_name(""));
        assert!(!check_name("a b"));
        assert!(!check_name("a;"));
        assert!(!check_name("x: f32, y"));
        assert!(!check_name("naïve"));
    }
}
