//! ILI9341 TFT Display Driver
//!
//! A frame-buffered driver for the ILI9341 TFT controller (320x240, 16-bit
//! color) that streams only the parts of the frame that changed.
//!
//! The frame buffer is split into equal, row-aligned chunks. Drawing marks the
//! chunks it touches dirty; at most once per frame interval the display runs
//! your render callback and then streams each dirty chunk as one transfer,
//! which a DMA-capable [`DisplayInterface`] can run in the background.
//!
//! ## Features
//!
//! - `no_std` compatible
//! - `embedded-hal` v1.0 support
//! - `embedded-graphics` integration (with `graphics` feature)
//! - Dirty-chunk tracking with round-robin flushing
//! - Frame-rate limited rendering
//! - RGB565 alpha blending
//! - Four panel orientations
//!
//! ## Usage
//!
//! ```rust,no_run
//! use core::convert::Infallible;
//! use embedded_hal::delay::DelayNs;
//! use embedded_hal::digital::OutputPin;
//! use embedded_hal::spi::{Operation, SpiDevice};
//! use ili9341_dma::{Builder, Color, Dimensions, Display, Interface, Orientation};
//!
//! # struct MockSpi;
//! # impl embedded_hal::spi::ErrorType for MockSpi { type Error = Infallible; }
//! # impl SpiDevice for MockSpi {
//! #     fn transaction(
//! #         &mut self,
//! #         _operations: &mut [Operation<'_, u8>],
//! #     ) -> Result<(), Self::Error> {
//! #         Ok(())
//! #     }
//! # }
//! # struct MockPin;
//! # impl embedded_hal::digital::ErrorType for MockPin { type Error = Infallible; }
//! # impl OutputPin for MockPin {
//! #     fn set_low(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! #     fn set_high(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! # }
//! # struct MockDelay;
//! # impl DelayNs for MockDelay { fn delay_ns(&mut self, _ns: u32) {} }
//! # let spi = MockSpi;
//! # let dc = MockPin;
//! # let rst = MockPin;
//! # let mut delay = MockDelay;
//! let interface = Interface::new(spi, dc, rst);
//! let dims = match Dimensions::new(320, 240) {
//!     Ok(dims) => dims,
//!     Err(_) => return,
//! };
//! let config = match Builder::new()
//!     .dimensions(dims)
//!     .orientation(Orientation::Upright)
//!     .chunk_count(10)
//!     .target_frame_rate(30)
//!     .build()
//! {
//!     Ok(config) => config,
//!     Err(_) => return,
//! };
//!
//! let buffer = vec![0u8; config.buffer_size()];
//! let mut display = match Display::new(interface, config, buffer) {
//!     Ok(display) => display,
//!     Err(_) => return,
//! };
//! let _ = display.init(&mut delay);
//!
//! display.set_on_render(|frame| frame.clear(Color::BLUE));
//! let _ = display.poll(0.0);
//! ```

#![no_std]

#[cfg(any(test, feature = "alloc"))]
extern crate alloc;

/// Color types and RGB565 blending
pub mod color;
/// ILI9341 command definitions
pub mod command;
/// Display configuration types and builder
pub mod config;
/// Core display operations
pub mod display;
/// Error types for the driver
pub mod error;
/// Frame buffer and dirty-chunk tracking
pub mod framebuffer;
/// Hardware interface abstraction
pub mod interface;
/// Orientation resolution
pub mod orientation;
/// Frame-rate gating
pub mod scheduler;
/// Chunked pixel streaming
pub mod transfer;

/// Graphics support via embedded-graphics (requires `graphics` feature)
#[cfg(feature = "graphics")]
pub mod graphics;

pub use color::Color;
pub use config::{
    Builder, Config, DEFAULT_CHUNK_COUNT, DEFAULT_FRAME_RATE, Dimensions, MAX_CHUNK_COUNT,
    MAX_DIMENSION, MAX_FRAME_RATE, MAX_SHORT_DIMENSION, MIN_CHUNK_COUNT, Orientation,
};
pub use display::{Display, RenderFn, UpdateStatus};
pub use error::{BuilderError, Error, FrameBufferError};
pub use framebuffer::{DirtyMap, FrameBuffer, Region};
pub use interface::InterfaceError;
pub use interface::{DisplayInterface, Interface, StreamStatus};
pub use scheduler::{Clock, FrameScheduler};
pub use transfer::{TransferEngine, TransferState};
