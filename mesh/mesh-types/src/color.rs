//! Face colors.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// RGBA color with 8-bit components, attached to a face.
///
/// OFF files carry face colors either as integers in `0..=255` or as floats
/// in `[0, 1]`; both end up here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FaceColor {
    /// Red component (0-255).
    pub r: u8,
    /// Green component (0-255).
    pub g: u8,
    /// Blue component (0-255).
    pub b: u8,
    /// Alpha component (0-255, 255 is opaque).
    pub a: u8,
}

impl FaceColor {
    /// Create an opaque color from RGB components.
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_types::FaceColor;
    ///
    /// let red = FaceColor::new(255, 0, 0);
    /// assert_eq!(red.a, 255);
    /// ```
    #[inline]
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Create a color from RGBA components.
    #[inline]
    #[must_use]
    pub const fn with_alpha(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create a color from floating point values in `[0, 1]`.
    ///
    /// Values are clamped to the valid range and rounded to the nearest
    /// 8-bit level.
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_types::FaceColor;
    ///
    /// let color = FaceColor::from_float(1.0, 0.5, 0.0, 1.0);
    /// assert_eq!(color.r, 255);
    /// assert_eq!(color.g, 128);
    /// assert_eq!(color.b, 0);
    /// ```
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    // Values are clamped to [0.0, 1.0] before scaling
    pub fn from_float(r: f32, g: f32, b: f32, a: f32) -> Self {
        let q = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self {
            r: q(r),
            g: q(g),
            b: q(b),
            a: q(a),
        }
    }

    /// Convert to floating point RGBA in `[0, 1]`.
    #[must_use]
    pub fn to_float(self) -> [f32; 4] {
        [
            f32::from(self.r) / 255.0,
            f32::from(self.g) / 255.0,
            f32::from(self.b) / 255.0,
            f32::from(self.a) / 255.0,
        ]
    }

    /// Black (0, 0, 0).
    pub const BLACK: Self = Self::new(0, 0, 0);

    /// White (255, 255, 255).
    pub const WHITE: Self = Self::new(255, 255, 255);

    /// Red (255, 0, 0).
    pub const RED: Self = Self::new(255, 0, 0);

    /// Green (0, 255, 0). Marks defective faces.
    pub const GREEN: Self = Self::new(0, 255, 0);

    /// Blue (0, 0, 255).
    pub const BLUE: Self = Self::new(0, 0, 255);
}

impl Default for FaceColor {
    fn default() -> Self {
        Self::WHITE
    }
}
