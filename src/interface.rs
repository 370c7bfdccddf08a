//! Hardware interface abstraction
//!
//! This module provides the [`DisplayInterface`] trait and the [`Interface`] struct
//! for communicating with the ILI9341 controller over SPI.
//!
//! ## Hardware Requirements
//!
//! The ILI9341 requires:
//! - SPI bus (MOSI + SCK, CS managed by the [`SpiDevice`])
//! - 2 GPIO pins:
//!   - **DC**: Data/Command select (output)
//!   - **RST**: Reset (output, active low)
//!
//! ## Pixel Streams
//!
//! Register writes are always blocking. Pixel data goes through
//! [`DisplayInterface::start_pixel_stream`], which may hand the bytes to a DMA
//! channel and return [`StreamStatus::Pending`]. The host then reports the
//! transfer's outcome from its DMA interrupt by calling
//! [`Display::on_transfer_complete`](crate::display::Display::on_transfer_complete).
//! The provided [`Interface`] has no DMA and finishes every stream before
//! returning [`StreamStatus::Complete`].
//!
//! ## Example
//!
//! ```rust,no_run
//! use embedded_hal::delay::DelayNs;
//! use embedded_hal::digital::OutputPin;
//! use embedded_hal::spi::{Operation, SpiDevice};
//! use ili9341_dma::{DisplayInterface, Interface};
//! # use core::convert::Infallible;
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
//! // Create interface with SPI and GPIO pins
//! let mut interface = Interface::new(MockSpi, MockPin, MockPin);
//!
//! // Hardware reset
//! interface.reset(&mut delay);
//!
//! // Send command
//! let _ = interface.send_command(0x01); // Software reset
//!
//! // Send data
//! let _ = interface.send_data(&[0x55]);
//! ```

use core::fmt::Debug;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiDevice;

type InterfaceResult<T, E> = core::result::Result<T, E>;

/// How long RST is held low, and how long to wait after releasing it
pub const RESET_DELAY_MS: u32 = 100;

/// Outcome of starting a pixel stream
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StreamStatus {
    /// All bytes were sent before the call returned
    Complete,
    /// The transfer is running; completion will be reported separately
    Pending,
}

/// Trait for hardware interface to the ILI9341 controller
///
/// This trait abstracts over different hardware implementations,
/// allowing the [`Display`](crate::display::Display) to work with any
/// SPI + GPIO implementation that satisfies embedded-hal traits.
///
/// ## Implementing
///
/// For blocking SPI, use the provided [`Interface`] struct. To stream pixels
/// with DMA, implement this trait on your own type and return
/// [`StreamStatus::Pending`] from `start_pixel_stream`.
pub trait DisplayInterface {
    /// Error type for interface operations
    ///
    /// Must implement [`Debug`] for error reporting.
    type Error: Debug;

    /// Send a command byte to the controller
    ///
    /// The implementation must:
    /// 1. Set DC pin low (command mode)
    /// 2. Send the command byte over SPI
    ///
    /// # Errors
    ///
    /// Returns an error if SPI communication or GPIO fails.
    fn send_command(&mut self, command: u8) -> InterfaceResult<(), Self::Error>;

    /// Send parameter bytes to the controller, blocking until sent
    ///
    /// The implementation must:
    /// 1. Set DC pin high (data mode)
    /// 2. Send the data bytes over SPI
    ///
    /// # Errors
    ///
    /// Returns an error if SPI communication or GPIO fails.
    fn send_data(&mut self, data: &[u8]) -> InterfaceResult<(), Self::Error>;

    /// Perform hardware reset
    ///
    /// The implementation must:
    /// 1. Set RST pin low
    /// 2. Wait [`RESET_DELAY_MS`]
    /// 3. Set RST pin high
    /// 4. Wait [`RESET_DELAY_MS`]
    fn reset<D: DelayNs>(&mut self, delay: &mut D);

    /// Start streaming pixel bytes into the current address window
    ///
    /// The implementation must set DC high before the first byte.
    ///
    /// `pixels` points into the display's frame buffer, which stays in place
    /// until the display reports idle; a DMA implementation may keep reading
    /// from it after returning [`StreamStatus::Pending`]. At most one stream
    /// is outstanding at a time.
    ///
    /// # Errors
    ///
    /// Returns an error if the transfer could not be started.
    fn start_pixel_stream(&mut self, pixels: &[u8]) -> InterfaceResult<StreamStatus, Self::Error>;

    /// Stop the outstanding pixel stream, if the transport can
    ///
    /// Called when a stream has made no progress for the configured transfer
    /// timeout. Return `true` only if the stream is stopped and its completion
    /// will never be reported. The default cannot stop anything and returns
    /// `false`, so the display waits for the late completion before streaming
    /// again.
    fn abort_pixel_stream(&mut self) -> bool {
        false
    }
}

/// Errors that can occur at the interface level
///
/// Generic over SPI and GPIO error types.
#[derive(Debug)]
pub enum InterfaceError<SpiErr, PinErr> {
    /// SPI communication error
    Spi(SpiErr),
    /// GPIO pin error
    Pin(PinErr),
}

impl<SpiErr: Debug, PinErr: Debug> core::fmt::Display for InterfaceError<SpiErr, PinErr> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Spi(e) => write!(f, "SPI error: {e:?}"),
            Self::Pin(e) => write!(f, "Pin error: {e:?}"),
        }
    }
}

impl<SpiErr: Debug, PinErr: Debug> core::error::Error for InterfaceError<SpiErr, PinErr> {}

/// Blocking hardware interface implementation for the ILI9341
///
/// Implements [`DisplayInterface`] for embedded-hal v1.0 SPI and GPIO traits.
/// Pixel streams are written synchronously and always report
/// [`StreamStatus::Complete`].
///
/// ## Type Parameters
///
/// * `SPI` - SPI device implementing [`SpiDevice`]
/// * `DC` - Data/Command pin implementing [`OutputPin`]
/// * `RST` - Reset pin implementing [`OutputPin`]
pub struct Interface<SPI, DC, RST> {
    /// SPI device for communication
    spi: SPI,
    /// Data/Command select pin (low=command, high=data)
    dc: DC,
    /// Reset pin (active low)
    rst: RST,
}

impl<SPI, DC, RST> Interface<SPI, DC, RST>
where
    SPI: SpiDevice,
    DC: OutputPin,
    RST: OutputPin,
{
    /// Create a new Interface
    ///
    /// # Arguments
    ///
    /// * `spi` - SPI device (must implement [`SpiDevice`])
    /// * `dc` - Data/Command pin (output, low=command, high=data)
    /// * `rst` - Reset pin (output, active low)
    pub fn new(spi: SPI, dc: DC, rst: RST) -> Self {
        Self { spi, dc, rst }
    }

    /// Consume the interface and return the bus and pins
    pub fn release(self) -> (SPI, DC, RST) {
        (self.spi, self.dc, self.rst)
    }
}

impl<SPI, DC, RST, PinErr> DisplayInterface for Interface<SPI, DC, RST>
where
    SPI: SpiDevice,
    SPI::Error: Debug,
    DC: OutputPin<Error = PinErr>,
    RST: OutputPin<Error = PinErr>,
    PinErr: Debug,
{
    type Error = InterfaceError<SPI::Error, PinErr>;

    fn send_command(&mut self, command: u8) -> InterfaceResult<(), Self::Error> {
        self.dc.set_low().map_err(InterfaceError::Pin)?;
        self.spi.write(&[command]).map_err(InterfaceError::Spi)?;
        Ok(())
    }

    fn send_data(&mut self, data: &[u8]) -> InterfaceResult<(), Self::Error> {
        self.dc.set_high().map_err(InterfaceError::Pin)?;
        self.spi.write(data).map_err(InterfaceError::Spi)?;
        Ok(())
    }

    fn reset<D: DelayNs>(&mut self, delay: &mut D) {
        let _ = self.rst.set_low();
        delay.delay_ms(RESET_DELAY_MS);
        let _ = self.rst.set_high();
        delay.delay_ms(RESET_DELAY_MS);
    }

    fn start_pixel_stream(&mut self, pixels: &[u8]) -> InterfaceResult<StreamStatus, Self::Error> {
        self.send_data(pixels)?;
        Ok(StreamStatus::Complete)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::RefCell;
    use embedded_hal::digital::ErrorType;
    use embedded_hal::spi::{ErrorType as SpiErrorType, Operation};

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Event {
        DcLow,
        DcHigh,
        RstLow,
        RstHigh,
        Write(usize),
        Delay(u32),
    }

    struct Log(RefCell<alloc::vec::Vec<Event>>);

    impl Log {
        fn new() -> Self {
            Self(RefCell::new(alloc::vec::Vec::new()))
        }

        fn push(&self, event: Event) {
            self.0.borrow_mut().push(event);
        }

        fn events(&self) -> alloc::vec::Vec<Event> {
            self.0.borrow().clone()
        }
    }

    struct MockSpi<'a>(&'a Log);
    struct DcPin<'a>(&'a Log);
    struct RstPin<'a>(&'a Log);
    struct MockDelay<'a>(&'a Log);

    impl SpiErrorType for MockSpi<'_> {
        type Error = core::convert::Infallible;
    }

    impl SpiDevice for MockSpi<'_> {
        fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), Self::Error> {
            for op in operations.iter() {
                if let Operation::Write(bytes) = op {
                    self.0.push(Event::Write(bytes.len()));
                }
            }
            Ok(())
        }
    }

    impl ErrorType for DcPin<'_> {
        type Error = core::convert::Infallible;
    }

    impl OutputPin for DcPin<'_> {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            self.0.push(Event::DcLow);
            Ok(())
        }
        fn set_high(&mut self) -> Result<(), Self::Error> {
            self.0.push(Event::DcHigh);
            Ok(())
        }
    }

    impl ErrorType for RstPin<'_> {
        type Error = core::convert::Infallible;
    }

    impl OutputPin for RstPin<'_> {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            self.0.push(Event::RstLow);
            Ok(())
        }
        fn set_high(&mut self) -> Result<(), Self::Error> {
            self.0.push(Event::RstHigh);
            Ok(())
        }
    }

    impl DelayNs for MockDelay<'_> {
        fn delay_ns(&mut self, _ns: u32) {}

        fn delay_ms(&mut self, ms: u32) {
            self.0.push(Event::Delay(ms));
        }
    }

    #[test]
    fn test_command_then_data_toggles_dc() {
        let log = Log::new();
        let mut interface = Interface::new(MockSpi(&log), DcPin(&log), RstPin(&log));

        interface.send_command(0x2C).unwrap();
        interface.send_data(&[1, 2, 3]).unwrap();

        assert_eq!(
            log.events(),
            [Event::DcLow, Event::Write(1), Event::DcHigh, Event::Write(3)]
        );
    }

    #[test]
    fn test_pixel_stream_is_blocking() {
        let log = Log::new();
        let mut interface = Interface::new(MockSpi(&log), DcPin(&log), RstPin(&log));

        let status = interface.start_pixel_stream(&[0u8; 64]).unwrap();

        assert_eq!(status, StreamStatus::Complete);
        assert_eq!(log.events(), [Event::DcHigh, Event::Write(64)]);
    }

    #[test]
    fn test_reset_sequence() {
        let log = Log::new();
        let mut interface = Interface::new(MockSpi(&log), DcPin(&log), RstPin(&log));
        let mut delay = MockDelay(&log);

        interface.reset(&mut delay);

        assert_eq!(
            log.events(),
            [
                Event::RstLow,
                Event::Delay(RESET_DELAY_MS),
                Event::RstHigh,
                Event::Delay(RESET_DELAY_MS),
            ]
        );
    }
}
