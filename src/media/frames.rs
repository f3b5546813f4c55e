use std::time::Duration;

use image::RgbaImage;

use crate::media::LoadError;

/// Delay used when the source does not report a usable frame rate.
pub const DEFAULT_FRAME_DELAY_MS: u64 = 100;

/// One decoded raster image from the animation
#[derive(Debug, Clone)]
pub struct Frame {
    image: RgbaImage,
}

impl Frame {
    pub fn new(image: RgbaImage) -> Self {
        Self { image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Raw RGBA8 pixels, row-major.
    pub fn pixels(&self) -> &[u8] {
        self.image.as_raw()
    }
}

/// Ordered, non-empty, immutable list of frames.
#[derive(Debug, Clone)]
pub struct FrameSequence {
    frames: Vec<Frame>,
}

impl FrameSequence {
    pub fn new(frames: Vec<Frame>) -> Result<Self, LoadError> {
        if frames.is_empty() {
            return Err(LoadError::Empty);
        }
        Ok(Self { frames })
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Panics if `index` is out of range; the controller only passes cursors
    /// produced by [`FrameSequence::next_index`].
    pub fn get(&self, index: usize) -> &Frame {
        &self.frames[index]
    }

    /// Pixel size of the first frame, which is also the window size.
    pub fn dimensions(&self) -> (u32, u32) {
        let first = &self.frames[0];
        (first.width(), first.height())
    }

    /// Cursor after `index`, wrapping to 0 after the last frame.
    pub fn next_index(&self, index: usize) -> usize {
        (index + 1) % self.frames.len()
    }
}

/// Time one frame stays on screen before the cursor advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameDelay(Duration);

impl FrameDelay {
    pub fn from_frame_rate(fps: f64) -> Self {
        Self::from_frame_rate_or(fps, Duration::from_millis(DEFAULT_FRAME_DELAY_MS))
    }

    /// Like [`FrameDelay::from_frame_rate`] but with a caller supplied fallback
    /// for unknown or non-positive rates.
    pub fn from_frame_rate_or(fps: f64, fallback: Duration) -> Self {
        if !fps.is_finite() || fps <= 0.0 {
            return Self::from_duration(fallback);
        }
        let millis = (1000.0 / fps).round().max(1.0) as u64;
        Self(Duration::from_millis(millis))
    }

    /// Zero durations are bumped to 1 ms so the delay stays positive.
    pub fn from_duration(duration: Duration) -> Self {
        Self(duration.max(Duration::from_millis(1)))
    }

    pub fn as_duration(&self) -> Duration {
        self.0
    }

    pub fn as_millis(&self) -> u128 {
        self.0.as_millis()
    }
}

impl Default for FrameDelay {
    fn default() -> Self {
        Self(Duration::from_millis(DEFAULT_FRAME_DELAY_MS))
    }
}

/// A ready-to-play animation: all frames present and the delay fixed.
#[derive(Debug)]
pub struct Animation {
    pub frames: FrameSequence,
    pub delay: FrameDelay,
}
