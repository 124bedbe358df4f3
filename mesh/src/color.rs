//! Color space and alpha type of a fragment stage's color output.

use std::hash::Hasher;

use fxhash::FxHasher64;

/// Transfer function of a color space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransferFunction {
    /// sRGB piecewise curve.
    Srgb,
    /// Linear, no encoding.
    Linear,
    /// Rec. 2020 / BT.709 style curve.
    Rec2020,
}

/// Primaries of a color space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gamut {
    /// sRGB / BT.709 primaries.
    Srgb,
    /// Display P3 primaries.
    DisplayP3,
    /// Rec. 2020 primaries.
    Rec2020,
}

/// Color space in which a fragment stage's color output is expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorSpace {
    transfer: TransferFunction,
    gamut: Gamut,
}

impl ColorSpace {
    /// Create a color space from a transfer function and gamut.
    pub fn new(transfer: TransferFunction, gamut: Gamut) -> Self {
        Self { transfer, gamut }
    }

    /// The sRGB color space.
    pub fn srgb() -> Self {
        Self::new(TransferFunction::Srgb, Gamut::Srgb)
    }

    /// sRGB primaries with a linear transfer function.
    pub fn srgb_linear() -> Self {
        Self::new(TransferFunction::Linear, Gamut::Srgb)
    }

    /// Display P3 with the sRGB transfer function.
    pub fn display_p3() -> Self {
        Self::new(TransferFunction::Srgb, Gamut::DisplayP3)
    }

    /// Get the transfer function.
    pub fn transfer(&self) -> TransferFunction {
        self.transfer
    }

    /// Get the gamut.
    pub fn gamut(&self) -> Gamut {
        self.gamut
    }

    /// Stable hash of this color space.
    ///
    /// Unlike `std::hash::Hash` with a random state, this value is the same
    /// across runs and platforms. It is never 0, which stands for "no color
    /// space" in a specification hash.
    pub fn hash(&self) -> u64 {
        // Codes start at 1: FxHasher64 maps an all-zero input to 0.
        let transfer: u32 = match self.transfer {
            TransferFunction::Srgb => 1,
            TransferFunction::Linear => 2,
            TransferFunction::Rec2020 => 3,
        };
        let gamut: u32 = match self.gamut {
            Gamut::Srgb => 1,
            Gamut::DisplayP3 => 2,
            Gamut::Rec2020 => 3,
        };
        let mut hasher = FxHasher64::default();
        hasher.write_u32(transfer);
        hasher.write_u32(gamut);
        hasher.finish()
    }
}

/// How alpha is stored in a color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AlphaType {
    /// Not specified. Never valid for a color-producing fragment stage.
    Unknown,
    /// Alpha is always 1.
    Opaque,
    /// Color components are premultiplied by alpha.
    #[default]
    Premul,
    /// Color components are not premultiplied.
    Unpremul,
}

impl AlphaType {
    /// Stable numeric code, used when hashing a specification.
    pub fn code(&self) -> u32 {
        match self {
            Self::Unknown => 0,
            Self::Opaque => 1,
            Self::Premul => 2,
            Self::Unpremul => 3,
        }
    }
}
