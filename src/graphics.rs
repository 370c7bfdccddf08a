//! Graphics support via embedded-graphics
//!
//! Both [`FrameBuffer`] and [`Display`] implement
//! [`DrawTarget`](embedded_graphics_core::draw_target::DrawTarget) with
//! [`Color`] as the pixel type, so embedded-graphics primitives, text and
//! images can be drawn from the render callback or directly on the display.
//! Colors with alpha below 255 are blended over the frame.
//!
//! Drawing only touches the frame buffer; pixels reach the panel on the next
//! flush.
//!
//! ## Example
//!
//! ```rust,no_run
//! use embedded_graphics::{
//!     mono_font::{ascii::FONT_6X10, MonoTextStyle},
//!     prelude::*,
//!     primitives::{Circle, PrimitiveStyle, Rectangle},
//!     text::Text,
//! };
//! use ili9341_dma::{Color, FrameBuffer};
//! # use core::convert::Infallible;
//! # use embedded_hal::digital::OutputPin;
//! # use embedded_hal::spi::{Operation, SpiDevice};
//! # use ili9341_dma::{Builder, Dimensions, Display, Interface};
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
//! # let interface = Interface::new(MockSpi, MockPin, MockPin);
//! # let dims = match Dimensions::new(320, 240) {
//! #     Ok(dims) => dims,
//! #     Err(_) => return,
//! # };
//! # let config = match Builder::new().dimensions(dims).chunk_count(10).build() {
//! #     Ok(config) => config,
//! #     Err(_) => return,
//! # };
//! # let buffer = vec![0u8; config.buffer_size()];
//! # let mut display = match Display::new(interface, config, buffer) {
//! #     Ok(display) => display,
//! #     Err(_) => return,
//! # };
//! fn render(frame: &mut FrameBuffer<Vec<u8>>) {
//!     let _ = frame.clear(Color::WHITE);
//!
//!     let _ = Rectangle::new(Point::new(10, 10), Size::new(50, 30))
//!         .into_styled(PrimitiveStyle::with_fill(Color::BLUE))
//!         .draw(frame);
//!
//!     let _ = Circle::new(Point::new(100, 50), 40)
//!         .into_styled(PrimitiveStyle::with_stroke(Color::RED, 2))
//!         .draw(frame);
//!
//!     let _ = Text::new(
//!         "Hello, TFT!",
//!         Point::new(10, 100),
//!         MonoTextStyle::new(&FONT_6X10, Color::BLACK),
//!     )
//!     .draw(frame);
//! }
//!
//! display.set_on_render(render);
//! let _ = display.poll(0.0);
//! ```

use core::convert::Infallible;
use embedded_graphics_core::{
    draw_target::DrawTarget,
    geometry::{OriginDimensions, Size},
    prelude::Pixel,
    primitives::Rectangle,
};

use crate::color::Color;
use crate::display::Display;
use crate::framebuffer::FrameBuffer;
use crate::interface::DisplayInterface;

impl<B> DrawTarget for FrameBuffer<B>
where
    B: AsRef<[u8]> + AsMut<[u8]>,
{
    type Color = Color;
    type Error = Infallible;

    fn draw_iter<Iter>(&mut self, pixels: Iter) -> Result<(), Self::Error>
    where
        Iter: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            self.draw_pixel(point.x, point.y, color);
        }
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        self.fill_rect(
            area.top_left.x,
            area.top_left.y,
            area.size.width,
            area.size.height,
            color,
        );
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        FrameBuffer::clear(self, color);
        Ok(())
    }
}

impl<B> OriginDimensions for FrameBuffer<B>
where
    B: AsRef<[u8]> + AsMut<[u8]>,
{
    fn size(&self) -> Size {
        let (width, height) = self.dimensions();
        Size::new(u32::from(width), u32::from(height))
    }
}

impl<I, B> DrawTarget for Display<I, B>
where
    I: DisplayInterface,
    B: AsRef<[u8]> + AsMut<[u8]>,
{
    type Color = Color;
    type Error = Infallible;

    fn draw_iter<Iter>(&mut self, pixels: Iter) -> Result<(), Self::Error>
    where
        Iter: IntoIterator<Item = Pixel<Self::Color>>,
    {
        self.frame_mut().draw_iter(pixels)
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        self.frame_mut().fill_solid(area, color)
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        Display::clear(self, color);
        Ok(())
    }
}

impl<I, B> OriginDimensions for Display<I, B>
where
    I: DisplayInterface,
    B: AsRef<[u8]> + AsMut<[u8]>,
{
    fn size(&self) -> Size {
        self.frame().size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Builder, Dimensions, Orientation};
    use alloc::vec::Vec;
    use embedded_graphics::{
        pixelcolor::Rgb565,
        prelude::*,
        primitives::{Line, PrimitiveStyle},
    };

    fn test_frame(orientation: Orientation) -> FrameBuffer<Vec<u8>> {
        let config = Builder::new()
            .dimensions(Dimensions::new(320, 240).unwrap())
            .orientation(orientation)
            .chunk_count(10)
            .build()
            .unwrap();
        FrameBuffer::new(alloc::vec![0u8; config.buffer_size()], &config).unwrap()
    }

    #[test]
    fn test_size_follows_orientation() {
        assert_eq!(test_frame(Orientation::Upright).size(), Size::new(320, 240));
        assert_eq!(
            test_frame(Orientation::UpsideDown).size(),
            Size::new(240, 320)
        );
    }

    #[test]
    fn test_filled_rectangle() {
        let mut frame = test_frame(Orientation::Upright);

        Rectangle::new(Point::new(10, 20), Size::new(5, 5))
            .into_styled(PrimitiveStyle::with_fill(Color::RED))
            .draw(&mut frame)
            .unwrap();

        assert_eq!(frame.pixel(10, 20), Some(0xF800));
        assert_eq!(frame.pixel(14, 24), Some(0xF800));
        assert_eq!(frame.pixel(15, 24), Some(0x0000));
        assert_eq!(frame.pixel(10, 25), Some(0x0000));
        assert!(frame.dirty().is_dirty(0));
        assert!(frame.dirty().is_dirty(1));
        assert_eq!(frame.dirty().dirty_count(), 2);
    }

    #[test]
    fn test_offscreen_drawing_is_clipped() {
        let mut frame = test_frame(Orientation::Upright);

        Line::new(Point::new(-50, 239), Point::new(400, 239))
            .into_styled(PrimitiveStyle::with_stroke(Color::WHITE, 1))
            .draw(&mut frame)
            .unwrap();

        assert_eq!(frame.pixel(0, 239), Some(0xFFFF));
        assert_eq!(frame.pixel(319, 239), Some(0xFFFF));
        assert_eq!(frame.dirty().dirty_count(), 1);
        assert!(frame.dirty().is_dirty(9));
    }

    #[test]
    fn test_clear_marks_every_chunk() {
        let mut frame = test_frame(Orientation::Upright);

        DrawTarget::clear(&mut frame, Color::BLUE).unwrap();

        assert_eq!(frame.dirty().dirty_count(), 10);
        assert_eq!(frame.pixel(319, 239), Some(0x001F));
    }

    #[test]
    fn test_rgb565_converts_to_color() {
        let mut frame = test_frame(Orientation::Upright);

        Pixel(Point::new(3, 3), Color::from(Rgb565::GREEN))
            .draw(&mut frame)
            .unwrap();

        assert_eq!(frame.pixel(3, 3), Some(0x07E0));
    }

    #[test]
    fn test_translucent_fill_blends() {
        let mut frame = test_frame(Orientation::Upright);
        FrameBuffer::clear(&mut frame, Color::BLACK);

        frame
            .fill_solid(
                &Rectangle::new(Point::zero(), Size::new(2, 2)),
                Color::rgba(255, 255, 255, 128),
            )
            .unwrap();

        assert_eq!(frame.pixel(1, 1), Some(0x7BEF));
        assert_eq!(frame.pixel(2, 2), Some(0x0000));
    }
}
