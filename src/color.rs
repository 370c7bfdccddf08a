//! Color types and RGB565 compositing
//!
//! This module defines the [`Color`] struct (8 bits per channel plus alpha)
//! and the conversion into the 16-bit packed format the ILI9341 is
//! configured for.
//!
//! ## Color Representation
//!
//! The controller receives one 16-bit word per pixel, most significant byte
//! first:
//!
//! | Bits   | 15..11 | 10..5 | 4..0 |
//! |--------|--------|-------|------|
//! | Field  | Red    | Green | Blue |
//!
//! Conversion truncates the low bits of each channel; no rounding is applied.
//!
//! ## Example
//!
//! ```
//! use ili9341_dma::{color::blend_rgb565, Color};
//!
//! assert_eq!(Color::RED.to_rgb565(), 0xF800);
//! assert_eq!(Color::rgb(0, 255, 0).to_rgb565(), 0x07E0);
//!
//! // Half-transparent white over black
//! let grey = blend_rgb565(0xFFFF, 0x0000, 128);
//! assert_eq!(grey, 0x7BEF);
//! ```

/// Red and blue fields of a packed color
const MASK_RB: u32 = 0b1111_1000_0001_1111;
/// Green field of a packed color
const MASK_G: u32 = 0b0000_0111_1110_0000;
/// Red and blue fields after scaling by a 6-bit weight
const MASK_MUL_RB: u32 = 0b1111_1000_0001_1111_00_0000;
/// Green field after scaling by a 6-bit weight
const MASK_MUL_G: u32 = 0b0000_0111_1110_0000_00_0000;
/// Full weight in the 6-bit+1 fixed-point scale
const MAX_ALPHA: u32 = 64;

/// An 8-bit-per-channel color with alpha
///
/// Alpha 255 is opaque and overwrites the frame buffer; anything lower is
/// blended over the pixel already stored there.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Color {
    /// Red channel
    pub r: u8,
    /// Green channel
    pub g: u8,
    /// Blue channel
    pub b: u8,
    /// Opacity (255 = opaque)
    pub a: u8,
}

impl Color {
    /// Opaque black
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    /// Opaque white
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    /// Opaque red
    pub const RED: Self = Self::rgb(255, 0, 0);
    /// Opaque green
    pub const GREEN: Self = Self::rgb(0, 255, 0);
    /// Opaque blue
    pub const BLUE: Self = Self::rgb(0, 0, 255);

    /// Create an opaque color
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Create a color with explicit alpha
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Whether the color overwrites instead of blending
    pub const fn is_opaque(self) -> bool {
        self.a == 255
    }

    /// Pack into the 5/6/5 format (alpha is dropped)
    ///
    /// ## Example
    ///
    /// ```
    /// use ili9341_dma::Color;
    ///
    /// assert_eq!(Color::WHITE.to_rgb565(), 0xFFFF);
    /// assert_eq!(Color::rgb(0x08, 0x04, 0x08).to_rgb565(), 0x0821);
    /// ```
    pub const fn to_rgb565(self) -> u16 {
        let r = (self.r as u16 >> 3) << 11;
        let g = (self.g as u16 >> 2) << 5;
        let b = self.b as u16 >> 3;
        r | g | b
    }
}

impl Default for Color {
    /// Opaque black
    fn default() -> Self {
        Self::BLACK
    }
}

/// Alpha-blend two packed 5/6/5 colors
///
/// Red and blue are blended together in one multiply-add and green in a
/// second, using a 6-bit+1 fixed-point weight. The masks drop the bits that
/// fall below each field after scaling, so no channel carries into its
/// neighbour.
///
/// # Arguments
///
/// * `foreground` - Color being painted
/// * `background` - Color already stored
/// * `alpha` - Foreground weight, 0 (background only) to 255 (foreground only)
pub fn blend_rgb565(foreground: u16, background: u16, alpha: u8) -> u16 {
    let fg = u32::from(foreground);
    let bg = u32::from(background);

    // 8-bit alpha to [0, 64] with rounding
    let alpha = (u32::from(alpha) + 2) >> 2;
    let beta = MAX_ALPHA - alpha;

    let rb = (alpha * (fg & MASK_RB) + beta * (bg & MASK_RB)) & MASK_MUL_RB;
    let g = (alpha * (fg & MASK_G) + beta * (bg & MASK_G)) & MASK_MUL_G;

    ((rb | g) >> 6) as u16
}

#[cfg(feature = "graphics")]
impl embedded_graphics_core::prelude::PixelColor for Color {
    type Raw = embedded_graphics_core::pixelcolor::raw::RawU32;
}

#[cfg(feature = "graphics")]
impl From<embedded_graphics_core::pixelcolor::Rgb888> for Color {
    fn from(color: embedded_graphics_core::pixelcolor::Rgb888) -> Self {
        use embedded_graphics_core::pixelcolor::RgbColor;
        Self::rgb(color.r(), color.g(), color.b())
    }
}

#[cfg(feature = "graphics")]
impl From<embedded_graphics_core::pixelcolor::Rgb565> for Color {
    fn from(color: embedded_graphics_core::pixelcolor::Rgb565) -> Self {
        embedded_graphics_core::pixelcolor::Rgb888::from(color).into()
    }
}
