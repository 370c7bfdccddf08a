//! Error types for the driver
//!
//! This module defines error types for configuration building ([`BuilderError`])
//! and display operations ([`Error`]).
//!
//! ## Error Types
//!
//! - [`BuilderError`] - Errors during configuration construction
//! - [`Error`] - Runtime errors during display operations
//! - [`InterfaceError`](crate::interface::InterfaceError) - Low-level hardware communication errors
//!
//! ## Example
//!
//! ```
//! use ili9341_dma::{Builder, BuilderError, Dimensions};
//!
//! // Missing dimensions
//! let result = Builder::new().build();
//! assert!(matches!(result, Err(BuilderError::MissingDimensions)));
//!
//! // Too few chunks to stream a 320x240 frame
//! let dims = match Dimensions::new(320, 240) {
//!     Ok(dims) => dims,
//!     Err(_) => return,
//! };
//! let result = Builder::new().dimensions(dims).chunk_count(2).build();
//! assert!(matches!(result, Err(BuilderError::InvalidChunkCount { chunk_count: 2 })));
//! ```

use crate::interface::DisplayInterface;

/// Longest panel edge supported by the ILI9341 controller (in pixels)
///
/// The controller drives 240 sources and 320 gates; either may be the
/// declared width once MADCTL row/column exchange is applied.
pub const MAX_DIMENSION: u16 = 320;

/// Shortest panel edge may not exceed the controller's 240 sources
pub const MAX_SHORT_DIMENSION: u16 = 240;

/// Minimum number of dirty-tracking chunks
///
/// The transport's 16-bit length field cannot address a whole 320x240 frame
/// (or half of it) in one transfer.
pub const MIN_CHUNK_COUNT: u8 = 3;

/// Maximum number of dirty-tracking chunks (one bit per chunk in the dirty map)
pub const MAX_CHUNK_COUNT: u8 = 32;

/// Maximum number of bytes a single pixel stream may carry
pub const MAX_TRANSFER_LEN: usize = u16::MAX as usize;

/// Highest frame rate the scheduler accepts
pub const MAX_FRAME_RATE: u8 = 120;

/// Errors that can occur when interacting with the display
///
/// Generic over the interface type to preserve the specific error type.
/// This allows error handling code to match on the underlying hardware error.
#[derive(Debug)]
pub enum Error<I: DisplayInterface> {
    /// Interface error (SPI/GPIO/DMA)
    ///
    /// Wraps the underlying hardware error from the [`DisplayInterface`] implementation.
    Interface(I::Error),
    /// Pixel buffer is too small for the display
    ///
    /// The provided buffer must be at least `config.buffer_size()` bytes.
    BufferTooSmall {
        /// Required buffer size in bytes
        required: usize,
        /// Provided buffer size in bytes
        provided: usize,
    },
    /// Invalid configuration value
    Config(BuilderError),
}

impl<I: DisplayInterface> From<BuilderError> for Error<I> {
    fn from(err: BuilderError) -> Self {
        Self::Config(err)
    }
}

impl<I: DisplayInterface> core::fmt::Display for Error<I> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Interface(_) => write!(f, "Interface error"),
            Self::BufferTooSmall { required, provided } => {
                write!(
                    f,
                    "Buffer too small: required {required} bytes, provided {provided}"
                )
            }
            Self::Config(err) => write!(f, "Invalid configuration: {err}"),
        }
    }
}

impl<I: DisplayInterface + core::fmt::Debug> core::error::Error for Error<I> {}

/// Reasons a [`FrameBuffer`](crate::framebuffer::FrameBuffer) refused a buffer
///
/// The rejected buffer is handed back in every variant.
#[derive(Debug)]
pub enum FrameBufferError<B> {
    /// The configuration violates a layout constraint
    Config {
        /// Rejected buffer
        buffer: B,
        /// Violated constraint
        error: BuilderError,
    },
    /// The buffer is too small for the configured dimensions
    BufferTooSmall {
        /// Rejected buffer
        buffer: B,
        /// Required buffer size in bytes
        required: usize,
    },
}

impl<B: AsRef<[u8]>> core::fmt::Display for FrameBufferError<B> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Config { error, .. } => write!(f, "Invalid configuration: {error}"),
            Self::BufferTooSmall { buffer, required } => write!(
                f,
                "Buffer too small: required {required} bytes, provided {}",
                buffer.as_ref().len()
            ),
        }
    }
}

impl<B: AsRef<[u8]> + core::fmt::Debug> core::error::Error for FrameBufferError<B> {}

impl<B: AsRef<[u8]>, I: DisplayInterface> From<FrameBufferError<B>> for Error<I> {
    fn from(err: FrameBufferError<B>) -> Self {
        match err {
            FrameBufferError::Config { error, .. } => Self::Config(error),
            FrameBufferError::BufferTooSmall { buffer, required } => Self::BufferTooSmall {
                required,
                provided: buffer.as_ref().len(),
            },
        }
    }
}

/// Errors that can occur when building configuration
///
/// These errors occur during the builder pattern before the display is created,
/// or when the frame rate is reconfigured at runtime.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BuilderError {
    /// Dimensions were not specified
    ///
    /// [`Builder::dimensions()`](crate::config::Builder::dimensions) must be called before building.
    MissingDimensions,
    /// Invalid dimensions provided
    ///
    /// See [`Dimensions::new()`](crate::config::Dimensions::new) for constraints.
    InvalidDimensions {
        /// Requested width in pixels
        width: u16,
        /// Requested height in pixels
        height: u16,
    },
    /// Chunk count outside `MIN_CHUNK_COUNT..=MAX_CHUNK_COUNT`
    InvalidChunkCount {
        /// Requested chunk count
        chunk_count: u8,
    },
    /// Chunk count does not evenly divide the pixel count
    UnevenChunks {
        /// Requested chunk count
        chunk_count: u8,
        /// Number of pixels in the frame
        pixels: usize,
    },
    /// A chunk does not cover a whole number of rows
    ChunkNotRowAligned {
        /// Pixels per chunk
        chunk_len: usize,
        /// Rotated display width
        width: u16,
    },
    /// A chunk is too large for a single pixel stream
    ChunkTooLarge {
        /// Bytes per chunk
        bytes: usize,
    },
    /// Target frame rate outside `1..=MAX_FRAME_RATE`
    InvalidFrameRate {
        /// Requested frames per second
        fps: u8,
    },
}

impl core::fmt::Display for BuilderError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::MissingDimensions => write!(f, "Dimensions must be specified"),
            Self::InvalidDimensions { width, height } => write!(
                f,
                "Invalid dimensions {width}x{height} (at most {MAX_SHORT_DIMENSION}x{MAX_DIMENSION} in either order)"
            ),
            Self::InvalidChunkCount { chunk_count } => write!(
                f,
                "Invalid chunk count {chunk_count} (must be {MIN_CHUNK_COUNT}..={MAX_CHUNK_COUNT})"
            ),
            Self::UnevenChunks {
                chunk_count,
                pixels,
            } => write!(
                f,
                "Chunk count {chunk_count} does not evenly divide {pixels} pixels"
            ),
            Self::ChunkNotRowAligned { chunk_len, width } => write!(
                f,
                "Chunk of {chunk_len} pixels is not a whole number of {width}-pixel rows"
            ),
            Self::ChunkTooLarge { bytes } => write!(
                f,
                "Chunk of {bytes} bytes exceeds the {MAX_TRANSFER_LEN}-byte transfer limit"
            ),
            Self::InvalidFrameRate { fps } => {
                write!(f, "Invalid frame rate {fps} (must be 1..={MAX_FRAME_RATE})")
            }
        }
    }
}

impl core::error::Error for BuilderError {}
