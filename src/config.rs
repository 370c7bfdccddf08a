//! Display configuration types and builder

pub use crate::error::{
    BuilderError, MAX_CHUNK_COUNT, MAX_DIMENSION, MAX_FRAME_RATE, MAX_SHORT_DIMENSION,
    MAX_TRANSFER_LEN, MIN_CHUNK_COUNT,
};
use crate::orientation::{Resolved, resolve};

/// Default number of dirty-tracking chunks
pub const DEFAULT_CHUNK_COUNT: u8 = 4;

/// Default target frame rate in frames per second
pub const DEFAULT_FRAME_RATE: u8 = 60;

/// Bytes per pixel in the packed 5/6/5 wire format
pub const BYTES_PER_PIXEL: usize = 2;

/// Declared panel dimensions, before orientation is applied
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Dimensions {
    /// Declared width in pixels
    pub width: u16,
    /// Declared height in pixels
    pub height: u16,
}

impl Dimensions {
    /// Create new dimensions with validation
    ///
    /// # Errors
    ///
    /// Returns `BuilderError::InvalidDimensions` if either side is zero, the
    /// long side exceeds [`MAX_DIMENSION`] or the short side exceeds
    /// [`MAX_SHORT_DIMENSION`].
    pub fn new(width: u16, height: u16) -> Result<Self, BuilderError> {
        let dims = Self { width, height };
        dims.validate()?;
        Ok(dims)
    }

    fn validate(&self) -> Result<(), BuilderError> {
        let (short, long) = (
            self.width.min(self.height),
            self.width.max(self.height),
        );
        if short == 0 || short > MAX_SHORT_DIMENSION || long > MAX_DIMENSION {
            return Err(BuilderError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }

    /// Number of pixels in a frame
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Calculate required pixel buffer size in bytes
    pub fn buffer_size(&self) -> usize {
        self.pixel_count() * BYTES_PER_PIXEL
    }
}

/// Panel orientation relative to how the module is mounted
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Orientation {
    /// Connector at the bottom
    #[default]
    Upright,
    /// Rotated 180 degrees
    UpsideDown,
    /// Rotated towards the right
    ToRight,
    /// Rotated towards the left
    ToLeft,
}

/// Display configuration
///
/// Use `Builder` to create a Config. A Config assembled by hand is checked
/// again with [`Config::validate`] when a frame buffer adopts it.
#[derive(Clone, Debug)]
pub struct Config {
    /// Declared panel dimensions
    pub dimensions: Dimensions,
    /// Panel orientation
    pub orientation: Orientation,
    /// Number of dirty-tracking chunks the frame is split into
    pub chunk_count: u8,
    /// Initial target frame rate
    pub target_frame_rate: u8,
    /// Abandon a flush that has been outstanding this long (0 disables)
    pub transfer_timeout_ms: u32,
}

impl Config {
    /// Check dimensions, frame rate and chunk layout
    ///
    /// # Errors
    ///
    /// Returns the `BuilderError` variant for the first violated constraint.
    pub fn validate(&self) -> Result<(), BuilderError> {
        self.dimensions.validate()?;
        validate_frame_rate(self.target_frame_rate)?;
        validate_chunks(self)
    }

    /// Resolve the orientation into rotated dimensions and MADCTL bits
    pub fn resolved(&self) -> Resolved {
        resolve(
            self.orientation,
            self.dimensions.width,
            self.dimensions.height,
        )
    }

    /// Pixels covered by one chunk
    pub fn chunk_len(&self) -> usize {
        self.dimensions.pixel_count() / self.chunk_count as usize
    }

    /// Calculate required pixel buffer size in bytes
    pub fn buffer_size(&self) -> usize {
        self.dimensions.buffer_size()
    }
}

/// Builder for constructing display configuration
///
/// # Example
///
/// ```
/// use ili9341_dma::{Builder, Dimensions, Orientation};
///
/// let dims = match Dimensions::new(320, 240) {
///     Ok(dims) => dims,
///     Err(_) => return,
/// };
/// let config = match Builder::new()
///     .dimensions(dims)
///     .orientation(Orientation::Upright)
///     .chunk_count(10)
///     .build()
/// {
///     Ok(config) => config,
///     Err(_) => return,
/// };
/// assert_eq!(config.chunk_len(), 7680);
/// ```
#[must_use]
pub struct Builder {
    dimensions: Option<Dimensions>,
    orientation: Orientation,
    chunk_count: u8,
    target_frame_rate: u8,
    transfer_timeout_ms: u32,
}

impl Default for Builder {
    fn default() -> Self {
        Self {
            dimensions: None,
            orientation: Orientation::Upright,
            chunk_count: DEFAULT_CHUNK_COUNT,
            target_frame_rate: DEFAULT_FRAME_RATE,
            // Default: wait for the transport forever
            transfer_timeout_ms: 0,
        }
    }
}

impl Builder {
    /// Create a new Builder with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set declared panel dimensions (required)
    pub fn dimensions(mut self, dims: Dimensions) -> Self {
        self.dimensions = Some(dims);
        self
    }

    /// Set panel orientation
    pub fn orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    /// Set the number of dirty-tracking chunks
    ///
    /// Each chunk is streamed as one transfer, so it must be a whole number of
    /// rows and fit in the transport's length field.
    pub fn chunk_count(mut self, value: u8) -> Self {
        self.chunk_count = value;
        self
    }

    /// Set the initial target frame rate
    pub fn target_frame_rate(mut self, fps: u8) -> Self {
        self.target_frame_rate = fps;
        self
    }

    /// Set the stalled-transfer watchdog in milliseconds
    ///
    /// Default is 0 (disabled): a transport that never reports completion
    /// keeps the display busy. The timeout counts from the last chunk the
    /// flush started.
    pub fn transfer_timeout_ms(mut self, timeout_ms: u32) -> Self {
        self.transfer_timeout_ms = timeout_ms;
        self
    }

    /// Build the configuration
    ///
    /// # Errors
    ///
    /// Returns `BuilderError::MissingDimensions` if dimensions were not set,
    /// or the matching variant when the chunk layout or frame rate is invalid.
    pub fn build(self) -> Result<Config, BuilderError> {
        let dimensions = self.dimensions.ok_or(BuilderError::MissingDimensions)?;

        let config = Config {
            dimensions,
            orientation: self.orientation,
            chunk_count: self.chunk_count,
            target_frame_rate: self.target_frame_rate,
            transfer_timeout_ms: self.transfer_timeout_ms,
        };
        config.validate()?;
        Ok(config)
    }
}

/// Check that `fps` is within `1..=MAX_FRAME_RATE`
pub(crate) fn validate_frame_rate(fps: u8) -> Result<(), BuilderError> {
    if fps == 0 || fps > MAX_FRAME_RATE {
        return Err(BuilderError::InvalidFrameRate { fps });
    }
    Ok(())
}

fn validate_chunks(config: &Config) -> Result<(), BuilderError> {
    let chunk_count = config.chunk_count;
    if !(MIN_CHUNK_COUNT..=MAX_CHUNK_COUNT).contains(&chunk_count) {
        return Err(BuilderError::InvalidChunkCount { chunk_count });
    }

    let pixels = config.dimensions.pixel_count();
    if pixels % chunk_count as usize != 0 {
        return Err(BuilderError::UnevenChunks {
            chunk_count,
            pixels,
        });
    }

    let chunk_len = config.chunk_len();
    let width = config.resolved().width;
    if chunk_len % width as usize != 0 {
        return Err(BuilderError::ChunkNotRowAligned { chunk_len, width });
    }

    let bytes = chunk_len * BYTES_PER_PIXEL;
    if bytes > MAX_TRANSFER_LEN {
        return Err(BuilderError::ChunkTooLarge { bytes });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dims() -> Dimensions {
        Dimensions::new(320, 240).unwrap()
    }

    #[test]
    fn test_dimensions_reject_zero_and_oversized() {
        assert!(Dimensions::new(0, 240).is_err());
        assert!(Dimensions::new(320, 0).is_err());
        assert!(matches!(
            Dimensions::new(321, 240),
            Err(BuilderError::InvalidDimensions {
                width: 321,
                height: 240
            })
        ));
        assert_eq!(dims().buffer_size(), 320 * 240 * 2);
    }

    #[test]
    fn test_dimensions_short_side_limited_to_240() {
        assert!(matches!(
            Dimensions::new(320, 320),
            Err(BuilderError::InvalidDimensions {
                width: 320,
                height: 320
            })
        ));
        assert!(Dimensions::new(241, 300).is_err());
        assert!(Dimensions::new(240, 320).is_ok());
        assert!(Dimensions::new(320, 240).is_ok());
    }

    #[test]
    fn test_hand_built_config_is_validated() {
        let mut config = Builder::new().dimensions(dims()).build().unwrap();
        assert_eq!(config.validate(), Ok(()));

        for chunk_count in [0, 1, 2, 33] {
            config.chunk_count = chunk_count;
            assert_eq!(
                config.validate(),
                Err(BuilderError::InvalidChunkCount { chunk_count })
            );
        }

        config.chunk_count = 10;
        config.dimensions = Dimensions {
            width: 0,
            height: 240,
        };
        assert!(matches!(
            config.validate(),
            Err(BuilderError::InvalidDimensions { width: 0, .. })
        ));

        config.dimensions = dims();
        config.target_frame_rate = 0;
        assert_eq!(
            config.validate(),
            Err(BuilderError::InvalidFrameRate { fps: 0 })
        );
    }

    #[test]
    fn test_builder_defaults() {
        let config = Builder::new().dimensions(dims()).build().unwrap();
        assert_eq!(config.chunk_count, DEFAULT_CHUNK_COUNT);
        assert_eq!(config.target_frame_rate, DEFAULT_FRAME_RATE);
        assert_eq!(config.transfer_timeout_ms, 0);
        assert_eq!(config.orientation, Orientation::Upright);
    }

    #[test]
    fn test_builder_missing_dimensions() {
        assert!(matches!(
            Builder::new().build(),
            Err(BuilderError::MissingDimensions)
        ));
    }

    #[test]
    fn test_ten_chunks_of_24_rows() {
        let config = Builder::new()
            .dimensions(dims())
            .chunk_count(10)
            .build()
            .unwrap();
        assert_eq!(config.chunk_len(), 7680);
        assert_eq!(config.chunk_len() / config.resolved().width as usize, 24);
    }

    #[test]
    fn test_too_few_chunks_rejected() {
        for chunk_count in [0, 1, 2] {
            let result = Builder::new()
                .dimensions(dims())
                .chunk_count(chunk_count)
                .build();
            assert!(matches!(
                result,
                Err(BuilderError::InvalidChunkCount { .. })
            ));
        }
    }

    #[test]
    fn test_too_many_chunks_rejected() {
        let result = Builder::new().dimensions(dims()).chunk_count(33).build();
        assert!(matches!(
            result,
            Err(BuilderError::InvalidChunkCount { chunk_count: 33 })
        ));
    }

    #[test]
    fn test_uneven_chunks_rejected() {
        let result = Builder::new().dimensions(dims()).chunk_count(7).build();
        assert!(matches!(
            result,
            Err(BuilderError::UnevenChunks {
                chunk_count: 7,
                pixels: 76_800
            })
        ));
    }

    #[test]
    fn test_chunk_must_cover_whole_rows() {
        // 76800 / 32 = 2400 pixels = 7.5 rows of 320
        let result = Builder::new().dimensions(dims()).chunk_count(32).build();
        assert!(matches!(
            result,
            Err(BuilderError::ChunkNotRowAligned {
                chunk_len: 2400,
                width: 320
            })
        ));
    }

    #[test]
    fn test_upside_down_uses_rotated_width_for_row_alignment() {
        // 240 wide when upside down: 76800 / 32 = 2400 = 10 rows of 240
        let result = Builder::new()
            .dimensions(dims())
            .orientation(Orientation::UpsideDown)
            .chunk_count(32)
            .build();
        assert!(result.is_ok());
    }

    #[test]
    fn test_invalid_frame_rate_rejected() {
        for fps in [0, MAX_FRAME_RATE + 1] {
            let result = Builder::new()
                .dimensions(dims())
                .target_frame_rate(fps)
                .build();
            assert_eq!(result.err(), Some(BuilderError::InvalidFrameRate { fps }));
        }
    }
}
