//! Orientation resolution
//!
//! The ILI9341 scans its GRAM according to the MADCTL register. Picking an
//! orientation therefore decides two things at once: the logical width and
//! height that drawing code sees, and the MADCTL bits sent during init.
//!
//! | Orientation  | Logical size | MADCTL bits          |
//! |--------------|--------------|----------------------|
//! | `Upright`    | W x H        | BGR \| MX \| MY \| MV |
//! | `UpsideDown` | H x W        | BGR \| MY            |
//! | `ToRight`    | W x H        | BGR \| MX \| MY \| MV |
//! | `ToLeft`     | W x H        | BGR \| MV            |
//!
//! ## Example
//!
//! ```
//! use ili9341_dma::{command, orientation::resolve, Orientation};
//!
//! let resolved = resolve(Orientation::UpsideDown, 320, 240);
//! assert_eq!((resolved.width, resolved.height), (240, 320));
//! assert_eq!(resolved.madctl, command::MADCTL_BGR | command::MADCTL_MY);
//! ```

use crate::command::{MADCTL_BGR, MADCTL_MV, MADCTL_MX, MADCTL_MY};
use crate::config::Orientation;

/// Result of resolving an [`Orientation`]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Resolved {
    /// Logical width after rotation
    pub width: u16,
    /// Logical height after rotation
    pub height: u16,
    /// Value written to the MADCTL register
    pub madctl: u8,
}

/// Resolve an orientation against the declared panel size
///
/// # Arguments
///
/// * `orientation` - Requested orientation
/// * `width` - Declared panel width in pixels
/// * `height` - Declared panel height in pixels
pub fn resolve(orientation: Orientation, width: u16, height: u16) -> Resolved {
    let (width, height, rotation) = match orientation {
        Orientation::Upright | Orientation::ToRight => {
            (width, height, MADCTL_MX | MADCTL_MY | MADCTL_MV)
        }
        Orientation::UpsideDown => (height, width, MADCTL_MY),
        Orientation::ToLeft => (width, height, MADCTL_MV),
    };

    Resolved {
        width,
        height,
        madctl: MADCTL_BGR | rotation,
    }
}
