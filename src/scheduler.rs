//! Frame-rate gating for the render loop
//!
//! The [`FrameScheduler`] decides when the next frame may be rendered. Time is
//! measured in seconds as `f32`, read from the host through the [`Clock`]
//! trait or passed to [`FrameScheduler::try_claim`] directly.
//!
//! ## Example
//!
//! ```
//! use ili9341_dma::FrameScheduler;
//!
//! let mut scheduler = match FrameScheduler::new(60) {
//!     Ok(scheduler) => scheduler,
//!     Err(_) => return,
//! };
//! assert!(scheduler.try_claim(0.0));
//! assert!(!scheduler.try_claim(0.01));
//! assert!(scheduler.try_claim(0.02));
//! ```

use crate::config::{BuilderError, validate_frame_rate};

/// Monotonic time source in seconds
pub trait Clock {
    /// Seconds elapsed since an arbitrary fixed point
    fn now_seconds(&self) -> f32;
}

/// Limits rendering to a target frame rate
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameScheduler {
    interval: f32,
    next_frame_at: f32,
}

impl FrameScheduler {
    /// Create a scheduler whose first frame is due immediately
    ///
    /// # Errors
    ///
    /// Returns `BuilderError::InvalidFrameRate` unless `1 <= fps <= MAX_FRAME_RATE`.
    pub fn new(fps: u8) -> Result<Self, BuilderError> {
        validate_frame_rate(fps)?;
        Ok(Self {
            interval: 1.0 / f32::from(fps),
            next_frame_at: 0.0,
        })
    }

    /// Change the target frame rate
    ///
    /// The frame already scheduled keeps its due time; the new interval applies
    /// from the next claimed frame.
    ///
    /// # Errors
    ///
    /// Returns `BuilderError::InvalidFrameRate` unless `1 <= fps <= MAX_FRAME_RATE`.
    pub fn set_target_frame_rate(&mut self, fps: u8) -> Result<(), BuilderError> {
        validate_frame_rate(fps)?;
        self.interval = 1.0 / f32::from(fps);
        Ok(())
    }

    /// Seconds between frames
    pub fn interval(&self) -> f32 {
        self.interval
    }

    /// Time the next frame becomes due
    pub fn next_frame_at(&self) -> f32 {
        self.next_frame_at
    }

    /// Claim the current frame slot if it is due at `now`
    ///
    /// Returns `true` and schedules the following frame one interval after
    /// `now`; returns `false` without side effects if it is too early.
    pub fn try_claim(&mut self, now: f32) -> bool {
        if now < self.next_frame_at {
            return false;
        }
        self.next_frame_at = now + self.interval;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MAX_FRAME_RATE;

    #[test]
    fn test_sixty_fps_gating() {
        let mut scheduler = FrameScheduler::new(60).unwrap();

        assert!(scheduler.try_claim(0.0));
        assert!(!scheduler.try_claim(0.01));
        assert!(scheduler.try_claim(0.02));
        assert!((scheduler.next_frame_at() - (0.02 + 1.0 / 60.0)).abs() < 1e-6);
    }

    #[test]
    fn test_waiting_does_not_move_deadline() {
        let mut scheduler = FrameScheduler::new(10).unwrap();
        assert!(scheduler.try_claim(1.0));
        let due = scheduler.next_frame_at();

        assert!(!scheduler.try_claim(1.05));
        assert_eq!(scheduler.next_frame_at(), due);
    }

    #[test]
    fn test_late_poll_schedules_from_now() {
        let mut scheduler = FrameScheduler::new(50).unwrap();
        assert!(scheduler.try_claim(0.0));
        assert!(scheduler.try_claim(3.0));
        assert!(!scheduler.try_claim(3.01));
    }

    #[test]
    fn test_reconfigure_keeps_pending_deadline() {
        let mut scheduler = FrameScheduler::new(1).unwrap();
        assert!(scheduler.try_claim(0.0));

        scheduler.set_target_frame_rate(100).unwrap();

        assert_eq!(scheduler.next_frame_at(), 1.0);
        assert!(!scheduler.try_claim(0.5));
        assert!(scheduler.try_claim(1.0));
        assert!((scheduler.interval() - 0.01).abs() < 1e-6);
    }

    #[test]
    fn test_invalid_rates_rejected() {
        assert_eq!(
            FrameScheduler::new(0),
            Err(BuilderError::InvalidFrameRate { fps: 0 })
        );

        let mut scheduler = FrameScheduler::new(MAX_FRAME_RATE).unwrap();
        let before = scheduler.interval();
        assert!(scheduler.set_target_frame_rate(MAX_FRAME_RATE + 1).is_err());
        assert_eq!(scheduler.interval(), before);
    }
}
