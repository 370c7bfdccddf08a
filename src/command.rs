//! ILI9341 command definitions
//!
//! This module defines the command bytes used to control the ILI9341 TFT
//! controller. Commands are sent over SPI with the DC pin low for the command
//! byte and high for its parameters or pixel data.
//!
//! ## Command Structure
//!
//! All commands follow the pattern:
//! 1. Set DC low (command mode)
//! 2. Send command byte
//! 3. Set DC high (data mode)
//! 4. Send parameter bytes (if any)
//!
//! ## Example
//!
//! ```rust,no_run
//! use ili9341_dma::{command, DisplayInterface, Interface};
//! # use core::convert::Infallible;
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
//! # let mut interface = Interface::new(MockSpi, MockPin, MockPin);
//! // Select 16 bits per pixel
//! let _ = interface.send_command(command::PIXEL_FORMAT_SET);
//! let _ = interface.send_data(&[command::PIXEL_FORMAT_RGB565]);
//! ```

// System control commands

/// Software reset command (0x01)
///
/// Resets registers to their default values. Wait 5ms (120ms if sleeping) after issuing.
pub const SOFTWARE_RESET: u8 = 0x01;

/// Sleep out command (0x11)
///
/// Turns off sleep mode. Wait at least 5ms before the next command.
pub const SLEEP_OUT: u8 = 0x11;

/// Gamma curve select command (0x26)
pub const GAMMA_SET: u8 = 0x26;

/// Display on command (0x29)
pub const DISPLAY_ON: u8 = 0x29;

// Addressing commands

/// Column address set command (0x2A)
///
/// Requires 4 bytes: [start_MSB, start_LSB, end_MSB, end_LSB], end inclusive.
pub const COLUMN_ADDRESS_SET: u8 = 0x2A;

/// Page (row) address set command (0x2B)
///
/// Requires 4 bytes: [start_MSB, start_LSB, end_MSB, end_LSB], end inclusive.
pub const PAGE_ADDRESS_SET: u8 = 0x2B;

/// Memory write command (0x2C)
///
/// Subsequent data bytes are written into the current address window.
pub const MEMORY_WRITE: u8 = 0x2C;

/// Memory access control command (0x36)
///
/// Controls GRAM scan direction and RGB/BGR order. Requires 1 byte built from
/// the `MADCTL_*` bits.
pub const MEMORY_ACCESS_CONTROL: u8 = 0x36;

/// Pixel format set command (0x3A)
pub const PIXEL_FORMAT_SET: u8 = 0x3A;

/// 16 bits per pixel for both RGB and MCU interfaces
pub const PIXEL_FORMAT_RGB565: u8 = 0x55;

// MADCTL bits

/// Row address order
pub const MADCTL_MY: u8 = 0x80;
/// Column address order
pub const MADCTL_MX: u8 = 0x40;
/// Row/column exchange
pub const MADCTL_MV: u8 = 0x20;
/// BGR color filter panel order
pub const MADCTL_BGR: u8 = 0x08;

// Panel setup commands

/// Frame rate control (normal mode) command (0xB1)
pub const FRAME_RATE_CONTROL: u8 = 0xB1;
/// Display function control command (0xB6)
pub const DISPLAY_FUNCTION_CONTROL: u8 = 0xB6;
/// Power control 1 command (0xC0)
pub const POWER_CONTROL_1: u8 = 0xC0;
/// Power control 2 command (0xC1)
pub const POWER_CONTROL_2: u8 = 0xC1;
/// VCOM control 1 command (0xC5)
pub const VCOM_CONTROL_1: u8 = 0xC5;
/// VCOM control 2 command (0xC7)
pub const VCOM_CONTROL_2: u8 = 0xC7;
/// Power control A command (0xCB)
pub const POWER_CONTROL_A: u8 = 0xCB;
/// Power control B command (0xCF)
pub const POWER_CONTROL_B: u8 = 0xCF;
/// Positive gamma correction command (0xE0)
pub const POSITIVE_GAMMA_CORRECTION: u8 = 0xE0;
/// Negative gamma correction command (0xE1)
pub const NEGATIVE_GAMMA_CORRECTION: u8 = 0xE1;
/// Driver timing control A command (0xE8)
pub const DRIVER_TIMING_CONTROL_A: u8 = 0xE8;
/// Driver timing control B command (0xEA)
pub const DRIVER_TIMING_CONTROL_B: u8 = 0xEA;
/// Power on sequence control command (0xED)
pub const POWER_ON_SEQUENCE_CONTROL: u8 = 0xED;
/// Enable 3 gamma control command (0xF2)
pub const ENABLE_3G: u8 = 0xF2;
/// Pump ratio control command (0xF7)
pub const PUMP_RATIO_CONTROL: u8 = 0xF7;

/// Register programming sent between software reset and sleep out
///
/// Each entry is a command byte followed by its parameter bytes, sent in order.
pub const INIT_SEQUENCE: &[(u8, &[u8])] = &[
    (POWER_CONTROL_A, &[0x39, 0x2C, 0x00, 0x34, 0x02]),
    (POWER_CONTROL_B, &[0x00, 0xC1, 0x30]),
    (DRIVER_TIMING_CONTROL_A, &[0x85, 0x00, 0x78]),
    (DRIVER_TIMING_CONTROL_B, &[0x00, 0x00]),
    (POWER_ON_SEQUENCE_CONTROL, &[0x64, 0x03, 0x12, 0x81]),
    (PUMP_RATIO_CONTROL, &[0x20]),
    (POWER_CONTROL_1, &[0x23]),
    (POWER_CONTROL_2, &[0x10]),
    (VCOM_CONTROL_1, &[0x3E, 0x28]),
    (VCOM_CONTROL_2, &[0x86]),
    (MEMORY_ACCESS_CONTROL, &[0x48]),
    (PIXEL_FORMAT_SET, &[PIXEL_FORMAT_RGB565]),
    (FRAME_RATE_CONTROL, &[0x00, 0x18]),
    (DISPLAY_FUNCTION_CONTROL, &[0x08, 0x82, 0x27]),
    (ENABLE_3G, &[0x00]),
    (GAMMA_SET, &[0x01]),
    (
        POSITIVE_GAMMA_CORRECTION,
        &[
            0x0F, 0x31, 0x2B, 0x0C, 0x0E, 0x08, 0x4E, 0xF1, 0x37, 0x07, 0x10, 0x03, 0x0E, 0x09,
            0x00,
        ],
    ),
    (
        NEGATIVE_GAMMA_CORRECTION,
        &[
            0x00, 0x0E, 0x14, 0x03, 0x11, 0x07, 0x31, 0xC1, 0x48, 0x08, 0x0F, 0x0C, 0x31, 0x36,
            0x0F,
        ],
    ),
];
