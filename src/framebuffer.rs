//! Frame buffer with per-chunk dirty tracking
//!
//! The [`FrameBuffer`] holds one 16-bit RGB565 word per pixel in the byte order
//! the controller expects (big-endian), so any chunk can be handed to the
//! transport without conversion.
//!
//! The buffer is split into equal, row-aligned chunks. Every write marks the
//! chunk it lands in as dirty in the [`DirtyMap`]; only the transfer engine
//! clears a flag, once that chunk has reached the panel.
//!
//! ## Example
//!
//! ```
//! use ili9341_dma::{Builder, Color, Dimensions, FrameBuffer};
//!
//! let dims = match Dimensions::new(320, 240) {
//!     Ok(dims) => dims,
//!     Err(_) => return,
//! };
//! let config = match Builder::new().dimensions(dims).chunk_count(10).build() {
//!     Ok(config) => config,
//!     Err(_) => return,
//! };
//! let mut frame = match FrameBuffer::new(vec![0u8; config.buffer_size()], &config) {
//!     Ok(frame) => frame,
//!     Err(_) => return,
//! };
//!
//! frame.draw_pixel(10, 30, Color::RED);
//! assert!(frame.dirty().is_dirty(1)); // rows 24..48
//! assert_eq!(frame.dirty().dirty_count(), 1);
//! ```

use crate::color::{Color, blend_rgb565};
use crate::config::{BYTES_PER_PIXEL, Config};
use crate::error::FrameBufferError;

/// Rectangular area of the display
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Region {
    /// X coordinate in pixels
    pub x: u16,
    /// Y coordinate in pixels
    pub y: u16,
    /// Width in pixels
    pub w: u16,
    /// Height in pixels
    pub h: u16,
}

impl Region {
    /// Create a new region
    #[allow(clippy::many_single_char_names)]
    pub fn new(x: u16, y: u16, w: u16, h: u16) -> Self {
        Self { x, y, w, h }
    }

    /// Last column covered by the region (inclusive)
    pub fn x_end(&self) -> u16 {
        self.x + self.w - 1
    }

    /// Last row covered by the region (inclusive)
    pub fn y_end(&self) -> u16 {
        self.y + self.h - 1
    }
}

/// One dirty flag per chunk
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DirtyMap {
    bits: u32,
    count: usize,
}

impl DirtyMap {
    /// Create a map of `count` clean chunks (`count` must be 1..=32)
    pub(crate) fn new(count: usize) -> Self {
        Self { bits: 0, count }
    }

    /// Number of chunks tracked
    pub fn len(&self) -> usize {
        self.count
    }

    /// Whether no chunks are tracked
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Whether `chunk` holds pixels not yet sent to the panel
    pub fn is_dirty(&self, chunk: usize) -> bool {
        chunk < self.count && self.bits & (1 << chunk) != 0
    }

    /// Whether any chunk is dirty
    pub fn any(&self) -> bool {
        self.bits != 0
    }

    /// Number of dirty chunks
    pub fn dirty_count(&self) -> usize {
        self.bits.count_ones() as usize
    }

    /// First dirty chunk at or after `start`, wrapping around to chunk 0
    pub fn next_dirty_from(&self, start: usize) -> Option<usize> {
        (0..self.count)
            .map(|offset| (start + offset) % self.count)
            .find(|&chunk| self.is_dirty(chunk))
    }

    pub(crate) fn mark(&mut self, chunk: usize) {
        self.bits |= 1 << chunk;
    }

    pub(crate) fn mark_all(&mut self) {
        self.bits = u32::MAX >> (u32::BITS as usize - self.count);
    }

    pub(crate) fn clear(&mut self, chunk: usize) {
        self.bits &= !(1 << chunk);
    }
}

/// Pixel storage in wire format plus dirty tracking
///
/// ## Type Parameters
///
/// * `B` - Byte buffer of at least `config.buffer_size()` bytes
pub struct FrameBuffer<B> {
    /// Packed big-endian RGB565 pixels, row-major
    buffer: B,
    /// Width after orientation is applied
    width: u16,
    /// Height after orientation is applied
    height: u16,
    /// Pixels per chunk
    chunk_len: usize,
    /// Chunks holding unsent pixels
    dirty: DirtyMap,
}

impl<B> FrameBuffer<B>
where
    B: AsRef<[u8]> + AsMut<[u8]>,
{
    /// Adopt `buffer` as the frame for a configuration
    ///
    /// Existing buffer contents are kept and every chunk starts clean.
    ///
    /// # Errors
    ///
    /// Returns the buffer inside `FrameBufferError::Config` if the
    /// configuration fails [`Config::validate`], or inside
    /// `FrameBufferError::BufferTooSmall` if it is shorter than
    /// `config.buffer_size()`.
    pub fn new(buffer: B, config: &Config) -> Result<Self, FrameBufferError<B>> {
        if let Err(error) = config.validate() {
            return Err(FrameBufferError::Config { buffer, error });
        }

        let required = config.buffer_size();
        if buffer.as_ref().len() < required {
            return Err(FrameBufferError::BufferTooSmall { buffer, required });
        }

        let resolved = config.resolved();
        Ok(Self {
            buffer,
            width: resolved.width,
            height: resolved.height,
            chunk_len: config.chunk_len(),
            dirty: DirtyMap::new(config.chunk_count as usize),
        })
    }

    /// Width and height after orientation is applied
    pub fn dimensions(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    /// Dirty flags, one per chunk
    pub fn dirty(&self) -> &DirtyMap {
        &self.dirty
    }

    pub(crate) fn dirty_mut(&mut self) -> &mut DirtyMap {
        &mut self.dirty
    }

    /// Pixels per chunk
    pub fn chunk_len(&self) -> usize {
        self.chunk_len
    }

    /// Number of rows per chunk
    pub fn chunk_rows(&self) -> u16 {
        (self.chunk_len / self.width as usize) as u16
    }

    /// Area of the display covered by `chunk`
    pub fn chunk_region(&self, chunk: usize) -> Region {
        let rows = self.chunk_rows();
        Region::new(0, chunk as u16 * rows, self.width, rows)
    }

    /// Raw wire bytes of `chunk`
    pub fn chunk_bytes(&self, chunk: usize) -> &[u8] {
        let len = self.chunk_len * BYTES_PER_PIXEL;
        let start = chunk * len;
        &self.buffer.as_ref()[start..start + len]
    }

    /// Packed color stored at `(x, y)`, if inside the frame
    pub fn pixel(&self, x: i32, y: i32) -> Option<u16> {
        let index = self.index(x, y)?;
        let offset = index * BYTES_PER_PIXEL;
        let bytes = &self.buffer.as_ref()[offset..offset + BYTES_PER_PIXEL];
        Some(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    /// Fill the whole frame with `color` and mark every chunk dirty
    ///
    /// Alpha is ignored; the fill is always opaque.
    pub fn clear(&mut self, color: Color) {
        let packed = color.to_rgb565().to_be_bytes();
        let len = self.pixel_count() * BYTES_PER_PIXEL;

        for pixel in self.buffer.as_mut()[..len].chunks_exact_mut(BYTES_PER_PIXEL) {
            pixel.copy_from_slice(&packed);
        }
        self.dirty.mark_all();
    }

    /// Paint a single pixel
    ///
    /// Coordinates outside the frame are ignored. Colors with alpha below 255
    /// are blended over the stored pixel.
    pub fn draw_pixel(&mut self, x: i32, y: i32, color: Color) {
        if let Some(index) = self.index(x, y) {
            self.paint_pixel(index, color.to_rgb565(), color.a);
        }
    }

    /// Paint a rectangle, clipped to the frame
    pub fn fill_rect(&mut self, x: i32, y: i32, w: u32, h: u32, color: Color) {
        let x_start = x.max(0);
        let y_start = y.max(0);
        let x_end = x.saturating_add_unsigned(w).min(i32::from(self.width));
        let y_end = y.saturating_add_unsigned(h).min(i32::from(self.height));
        let packed = color.to_rgb565();

        for yy in y_start..y_end {
            for xx in x_start..x_end {
                if let Some(index) = self.index(xx, yy) {
                    self.paint_pixel(index, packed, color.a);
                }
            }
        }
    }

    /// Give back the underlying buffer
    pub fn release(self) -> B {
        self.buffer
    }

    fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= i32::from(self.width) || y >= i32::from(self.height) {
            return None;
        }
        Some(x as usize + y as usize * self.width as usize)
    }

    fn paint_pixel(&mut self, index: usize, rgb565: u16, alpha: u8) {
        let offset = index * BYTES_PER_PIXEL;
        let pixel = &mut self.buffer.as_mut()[offset..offset + BYTES_PER_PIXEL];

        let color = if alpha == 255 {
            rgb565
        } else {
            let current = u16::from_be_bytes([pixel[0], pixel[1]]);
            blend_rgb565(rgb565, current, alpha)
        };
        pixel.copy_from_slice(&color.to_be_bytes());

        self.dirty.mark(index / self.chunk_len);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Builder, BuilderError, Dimensions, Orientation};
    use alloc::vec::Vec;

    fn config(chunk_count: u8) -> Config {
        Builder::new()
            .dimensions(Dimensions::new(320, 240).unwrap())
            .chunk_count(chunk_count)
            .build()
            .unwrap()
    }

    fn frame(chunk_count: u8) -> FrameBuffer<Vec<u8>> {
        let config = config(chunk_count);
        FrameBuffer::new(alloc::vec![0u8; config.buffer_size()], &config).unwrap()
    }

    #[test]
    fn test_new_rejects_small_buffer() {
        let config = config(10);
        let result = FrameBuffer::new(alloc::vec![0u8; 100], &config);
        assert!(matches!(
            result,
            Err(FrameBufferError::BufferTooSmall {
                required: 153_600,
                ..
            })
        ));
    }

    #[test]
    fn test_new_rejects_hand_built_layout() {
        let mut config = config(10);
        let buffer_size = config.buffer_size();

        for chunk_count in [0, 1, 2, 33] {
            config.chunk_count = chunk_count;
            let result = FrameBuffer::new(alloc::vec![0u8; buffer_size], &config);
            assert!(matches!(
                result,
                Err(FrameBufferError::Config {
                    error: BuilderError::InvalidChunkCount { .. },
                    ..
                })
            ));
        }

        config.chunk_count = 7;
        let result = FrameBuffer::new(alloc::vec![0u8; buffer_size], &config);
        assert!(matches!(
            result,
            Err(FrameBufferError::Config {
                error: BuilderError::UnevenChunks { chunk_count: 7, .. },
                ..
            })
        ));
    }

    #[test]
    fn test_default_color_paints_opaque_black() {
        let mut frame = frame(10);
        frame.clear(Color::WHITE);

        frame.draw_pixel(4, 4, Color::default());

        assert_eq!(frame.pixel(4, 4), Some(0x0000));
    }

    #[test]
    fn test_new_starts_clean() {
        let frame = frame(10);
        assert_eq!(frame.dirty().len(), 10);
        assert!(!frame.dirty().any());
    }

    #[test]
    fn test_chunk_geometry() {
        let frame = frame(10);
        assert_eq!(frame.chunk_len(), 7680);
        assert_eq!(frame.chunk_rows(), 24);
        assert_eq!(frame.chunk_region(3), Region::new(0, 72, 320, 24));
        assert_eq!(frame.chunk_region(3).y_end(), 95);
        assert_eq!(frame.chunk_bytes(9).len(), 7680 * 2);
    }

    #[test]
    fn test_upside_down_geometry() {
        let config = Builder::new()
            .dimensions(Dimensions::new(320, 240).unwrap())
            .orientation(Orientation::UpsideDown)
            .chunk_count(10)
            .build()
            .unwrap();
        let frame = FrameBuffer::new(alloc::vec![0u8; config.buffer_size()], &config).unwrap();
        assert_eq!(frame.dimensions(), (240, 320));
        assert_eq!(frame.chunk_rows(), 32);
    }

    #[test]
    fn test_clear_writes_big_endian_and_marks_all() {
        let mut frame = frame(10);
        frame.clear(Color::RED);

        assert_eq!(frame.dirty().dirty_count(), 10);
        assert!(frame.chunk_bytes(0).chunks_exact(2).all(|p| p == [0xF8, 0x00]));
        assert!(frame.chunk_bytes(9).chunks_exact(2).all(|p| p == [0xF8, 0x00]));
        assert_eq!(frame.pixel(319, 239), Some(0xF800));
    }

    #[test]
    fn test_draw_pixel_marks_owning_chunk() {
        let mut frame = frame(10);
        frame.draw_pixel(5, 47, Color::BLUE);

        assert!(frame.dirty().is_dirty(1));
        assert_eq!(frame.dirty().dirty_count(), 1);
        assert_eq!(frame.pixel(5, 47), Some(0x001F));
        let bytes = frame.chunk_bytes(1);
        let offset = (5 + 23 * 320) * 2;
        assert_eq!(&bytes[offset..offset + 2], &[0x00, 0x1F]);
    }

    #[test]
    fn test_out_of_bounds_draw_is_ignored() {
        let mut frame = frame(10);
        let before = frame.chunk_bytes(0).to_vec();

        for (x, y) in [(-1, 0), (0, -1), (320, 0), (0, 240), (i32::MAX, i32::MIN)] {
            frame.draw_pixel(x, y, Color::WHITE);
        }

        assert!(!frame.dirty().any());
        assert_eq!(frame.chunk_bytes(0), &before[..]);
        assert_eq!(frame.pixel(320, 0), None);
    }

    #[test]
    fn test_translucent_pixel_blends_with_stored() {
        let mut frame = frame(10);
        frame.clear(Color::BLACK);
        frame.draw_pixel(0, 0, Color::rgba(255, 255, 255, 128));
        assert_eq!(frame.pixel(0, 0), Some(0x7BEF));
    }

    #[test]
    fn test_transparent_pixel_keeps_color_but_marks_dirty() {
        let mut frame = frame(10);
        frame.clear(Color::GREEN);
        for chunk in 0..10 {
            frame.dirty_mut().clear(chunk);
        }

        frame.draw_pixel(0, 0, Color::rgba(255, 0, 0, 0));

        assert_eq!(frame.pixel(0, 0), Some(0x07E0));
        assert!(frame.dirty().is_dirty(0));
    }

    #[test]
    fn test_fill_rect_is_clipped() {
        let mut frame = frame(10);
        frame.fill_rect(-10, 230, 20, 50, Color::WHITE);

        assert_eq!(frame.pixel(0, 239), Some(0xFFFF));
        assert_eq!(frame.pixel(9, 230), Some(0xFFFF));
        assert_eq!(frame.pixel(10, 230), Some(0x0000));
        assert_eq!(frame.pixel(0, 229), Some(0x0000));
        assert_eq!(frame.dirty().dirty_count(), 1);
        assert!(frame.dirty().is_dirty(9));
    }

    #[test]
    fn test_next_dirty_wraps_around() {
        let mut map = DirtyMap::new(10);
        map.mark(1);
        map.mark(7);

        assert_eq!(map.next_dirty_from(0), Some(1));
        assert_eq!(map.next_dirty_from(2), Some(7));
        assert_eq!(map.next_dirty_from(8), Some(1));
        assert_eq!(map.next_dirty_from(7), Some(7));

        map.clear(1);
        map.clear(7);
        assert_eq!(map.next_dirty_from(3), None);
    }

    #[test]
    fn test_mark_all_covers_exactly_count() {
        let mut map = DirtyMap::new(32);
        map.mark_all();
        assert_eq!(map.dirty_count(), 32);

        let mut map = DirtyMap::new(3);
        map.mark_all();
        assert_eq!(map.dirty_count(), 3);
        assert!(!map.is_dirty(3));
    }
}
