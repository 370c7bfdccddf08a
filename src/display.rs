//! Core display operations
//!
//! [`Display`] owns the hardware interface, the frame buffer and the transfer
//! engine. The host loop calls [`Display::poll`] (or [`Display::update`] with a
//! [`Clock`]) as often as it likes; at most once per frame interval, and only
//! while no flush is running, the display invokes the render callback and
//! starts streaming the chunks it dirtied.
//!
//! ## DMA completion
//!
//! With a transport that returns [`StreamStatus::Pending`](crate::StreamStatus),
//! the host must call [`Display::on_transfer_complete`] from its DMA interrupt
//! with the outcome of the stream. Share the display between the main loop and
//! the interrupt handler through a critical-section mutex.
//!
//! Painting while a flush is in flight is allowed and may tear; the frame is
//! not double buffered.
//!
//! ## Watchdog
//!
//! With a non-zero `transfer_timeout_ms`, a flush that starts no new stream
//! for that long is given up. The display asks the interface to
//! [abort](DisplayInterface::abort_pixel_stream) the outstanding stream; if it
//! cannot, the display stays busy until the late completion arrives, so a new
//! flush never overlaps the abandoned one.
//!
//! ## Example
//!
//! ```rust,no_run
//! use ili9341_dma::{Builder, Color, Dimensions, Display, FrameBuffer, Interface, UpdateStatus};
//! # use core::convert::Infallible;
//! # use embedded_hal::delay::DelayNs;
//! # use embedded_hal::digital::OutputPin;
//! # use embedded_hal::spi::{Operation, SpiDevice};
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
//! # let mut delay = MockDelay;
//! let interface = Interface::new(MockSpi, MockPin, MockPin);
//! let dims = match Dimensions::new(320, 240) {
//!     Ok(dims) => dims,
//!     Err(_) => return,
//! };
//! let config = match Builder::new().dimensions(dims).chunk_count(10).build() {
//!     Ok(config) => config,
//!     Err(_) => return,
//! };
//! let buffer = vec![0u8; config.buffer_size()];
//! let mut display = match Display::new(interface, config, buffer) {
//!     Ok(display) => display,
//!     Err(_) => return,
//! };
//! let _ = display.init(&mut delay);
//!
//! let mut x = 0;
//! let mut now = 0.0;
//! loop {
//!     let status = display.poll_with(now, |frame: &mut FrameBuffer<_>| {
//!         frame.clear(Color::BLACK);
//!         frame.fill_rect(x, 100, 20, 20, Color::RED);
//!     });
//!     if let Ok(UpdateStatus::Rendered) = status {
//!         x = (x + 1) % 300;
//!     }
//!     now += 0.001;
//! }
//! ```

use embedded_hal::delay::DelayNs;

use crate::color::Color;
use crate::command::{
    DISPLAY_ON, INIT_SEQUENCE, MEMORY_ACCESS_CONTROL, SLEEP_OUT, SOFTWARE_RESET,
};
use crate::config::{BuilderError, Config};
use crate::error::Error;
use crate::framebuffer::FrameBuffer;
use crate::interface::DisplayInterface;
use crate::scheduler::{Clock, FrameScheduler};
use crate::transfer::{TransferEngine, TransferState};

type DisplayResult<I> = core::result::Result<(), Error<I>>;

/// Wait after software reset and after leaving sleep
const POWER_UP_DELAY_MS: u32 = 100;

/// Wait before the final orientation write
const MADCTL_DELAY_MS: u32 = 10;

/// Render callback painting the next frame
pub type RenderFn<B> = fn(&mut FrameBuffer<B>);

/// Outcome of a poll
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UpdateStatus {
    /// A flush is still running; nothing was rendered
    Busy,
    /// The next frame is not due yet
    Waiting,
    /// A frame was rendered and its flush started
    Rendered,
}

/// Frame-buffered ILI9341 driver
///
/// ## Type Parameters
///
/// * `I` - Interface type implementing [`DisplayInterface`]
/// * `B` - Frame buffer storage of at least `config.buffer_size()` bytes
pub struct Display<I, B>
where
    I: DisplayInterface,
{
    /// Hardware interface
    interface: I,
    /// Display configuration
    config: Config,
    /// Orientation bits written during init
    madctl: u8,
    /// Pixels and dirty flags
    frame: FrameBuffer<B>,
    /// Chunk streaming state machine
    engine: TransferEngine,
    /// Frame-rate gate
    scheduler: FrameScheduler,
    /// Callback run by `poll` to paint each frame
    on_render: Option<RenderFn<B>>,
    /// Stream count last seen by the watchdog
    watched_streams: u32,
    /// When the watchdog last saw the flush progress, in seconds
    progress_at: f32,
}

impl<I, B> Display<I, B>
where
    I: DisplayInterface,
    B: AsRef<[u8]> + AsMut<[u8]>,
{
    /// Create a new Display instance
    ///
    /// The buffer's contents are kept as the initial frame; no chunk is dirty
    /// until something is drawn.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if `config` fails [`Config::validate`], or
    /// `Error::BufferTooSmall` if `buffer` is shorter than
    /// `config.buffer_size()`.
    pub fn new(interface: I, config: Config, buffer: B) -> Result<Self, Error<I>> {
        let frame = FrameBuffer::new(buffer, &config)?;
        let scheduler = FrameScheduler::new(config.target_frame_rate)?;
        let resolved = config.resolved();

        log::debug!(
            "Display {}x{} ({:?}), {} chunks of {} rows",
            resolved.width,
            resolved.height,
            config.orientation,
            config.chunk_count,
            frame.chunk_rows()
        );

        Ok(Self {
            interface,
            madctl: resolved.madctl,
            config,
            frame,
            engine: TransferEngine::new(),
            scheduler,
            on_render: None,
            watched_streams: 0,
            progress_at: 0.0,
        })
    }

    /// Reset the controller and program it for 16-bit pixels
    ///
    /// Call once before the first poll.
    pub fn init<D: DelayNs>(&mut self, delay: &mut D) -> DisplayResult<I> {
        log::debug!("Initializing controller");

        self.interface.reset(delay);
        self.send_command(SOFTWARE_RESET)?;
        delay.delay_ms(POWER_UP_DELAY_MS);

        for &(command, data) in INIT_SEQUENCE {
            self.send_command(command)?;
            self.send_data(data)?;
        }

        self.send_command(SLEEP_OUT)?;
        delay.delay_ms(POWER_UP_DELAY_MS);
        self.send_command(DISPLAY_ON)?;

        self.send_command(MEMORY_ACCESS_CONTROL)?;
        delay.delay_ms(MADCTL_DELAY_MS);
        self.send_data(&[self.madctl])?;

        log::debug!("Controller ready, MADCTL {:#04x}", self.madctl);
        Ok(())
    }

    /// Change the target frame rate
    ///
    /// The frame already scheduled keeps its due time.
    pub fn set_target_frame_rate(&mut self, fps: u8) -> Result<(), BuilderError> {
        self.scheduler.set_target_frame_rate(fps)?;
        log::debug!("Target frame rate {fps} fps");
        Ok(())
    }

    /// Set the callback `poll` and `update` run to paint each frame
    pub fn set_on_render(&mut self, render: RenderFn<B>) {
        self.on_render = Some(render);
    }

    /// Poll using the host's clock
    pub fn update<C: Clock>(&mut self, clock: &C) -> Result<UpdateStatus, Error<I>> {
        self.poll(clock.now_seconds())
    }

    /// Render and flush a frame if one is due at `now` (seconds)
    ///
    /// Runs the callback set with [`set_on_render`](Self::set_on_render), if
    /// any; dirty chunks are flushed either way.
    pub fn poll(&mut self, now: f32) -> Result<UpdateStatus, Error<I>> {
        let on_render = self.on_render;
        self.poll_with(now, |frame| {
            if let Some(render) = on_render {
                render(frame);
            }
        })
    }

    /// Like [`poll`](Self::poll), painting the frame with `render`
    ///
    /// # Errors
    ///
    /// Returns `Error::Interface` if the flush could not be started. The
    /// unsent chunks stay dirty for the next frame.
    pub fn poll_with<F>(&mut self, now: f32, render: F) -> Result<UpdateStatus, Error<I>>
    where
        F: FnOnce(&mut FrameBuffer<B>),
    {
        if self.engine.is_busy() && !self.transfer_timed_out(now) {
            return Ok(UpdateStatus::Busy);
        }

        if !self.scheduler.try_claim(now) {
            return Ok(UpdateStatus::Waiting);
        }

        render(&mut self.frame);

        let started = self.engine.start(&mut self.frame, &mut self.interface);
        self.watched_streams = self.engine.streams_started();
        self.progress_at = now;
        started.map_err(Error::Interface)?;
        Ok(UpdateStatus::Rendered)
    }

    /// Report the outcome of the outstanding pixel stream
    ///
    /// Call from the DMA completion interrupt. On success the next dirty chunk
    /// is started; on failure the flush stops and the rest of the frame is
    /// retried on the next one.
    ///
    /// # Errors
    ///
    /// Returns `Error::Interface` if the next chunk could not be started.
    pub fn on_transfer_complete(&mut self, result: Result<(), I::Error>) -> DisplayResult<I> {
        self.engine
            .complete(result, &mut self.frame, &mut self.interface)
            .map_err(Error::Interface)
    }

    /// Fill the frame with `color`
    pub fn clear(&mut self, color: Color) {
        self.frame.clear(color);
    }

    /// Paint one pixel; out-of-bounds coordinates are ignored
    pub fn draw_pixel(&mut self, x: i32, y: i32, color: Color) {
        self.frame.draw_pixel(x, y, color);
    }

    /// Paint a rectangle, clipped to the frame
    pub fn fill_rect(&mut self, x: i32, y: i32, w: u32, h: u32, color: Color) {
        self.frame.fill_rect(x, y, w, h, color);
    }

    /// Width and height after orientation is applied
    pub fn dimensions(&self) -> (u16, u16) {
        self.frame.dimensions()
    }

    /// Frame buffer
    pub fn frame(&self) -> &FrameBuffer<B> {
        &self.frame
    }

    /// Frame buffer, for painting outside the render callback
    pub fn frame_mut(&mut self) -> &mut FrameBuffer<B> {
        &mut self.frame
    }

    /// Whether a flush is in progress
    pub fn is_busy(&self) -> bool {
        self.engine.is_busy()
    }

    /// Transfer engine state
    pub fn transfer_state(&self) -> TransferState {
        self.engine.state()
    }

    /// Display configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Hand back the interface and frame buffer
    ///
    /// Refused while a flush is in progress, since a DMA transfer may still be
    /// reading the buffer.
    pub fn release(self) -> Result<(I, B), Self> {
        if self.engine.is_busy() {
            return Err(self);
        }
        Ok((self.interface, self.frame.release()))
    }

    /// Abandon the running flush if it has made no progress for the timeout
    ///
    /// Returns true once the engine is idle and a new flush may start.
    fn transfer_timed_out(&mut self, now: f32) -> bool {
        let timeout_ms = self.config.transfer_timeout_ms;
        if timeout_ms == 0 {
            return false;
        }

        let started = self.engine.streams_started();
        if started != self.watched_streams {
            self.watched_streams = started;
            self.progress_at = now;
            return false;
        }

        // Already abandoned, waiting for the late completion
        if let TransferState::Draining(_) = self.engine.state() {
            return false;
        }

        #[allow(clippy::cast_precision_loss)]
        let timeout = timeout_ms as f32 / 1000.0;
        if now - self.progress_at < timeout {
            return false;
        }

        let stopped = self.interface.abort_pixel_stream();
        log::warn!(
            "Transfer stalled for {timeout_ms} ms in {:?}, abandoning flush (stream {})",
            self.engine.state(),
            if stopped { "aborted" } else { "draining" }
        );
        self.engine.abandon(stopped);
        !self.engine.is_busy()
    }

    fn send_command(&mut self, command: u8) -> DisplayResult<I> {
        self.interface
            .send_command(command)
            .map_err(Error::Interface)
    }

    fn send_data(&mut self, data: &[u8]) -> DisplayResult<I> {
        self.interface.send_data(data).map_err(Error::Interface)
    }
}
