//! Stock drawables: a plain positioned image and a vertically framed strip.

use std::path::Path;

use retromode_core::{EngineError, EngineResult, FrameBuffer};

use crate::compositor::Drawable;
use crate::image_loader::load_image;

/// A positioned image.
#[derive(Debug, Clone, PartialEq)]
pub struct Sprite {
    pub x: i32,
    pub y: i32,
    pub image: FrameBuffer,
}

impl Sprite {
    pub fn new(x: i32, y: i32, image: FrameBuffer) -> Self {
        Self { x, y, image }
    }

    /// Decode an image file into a sprite at (x, y).
    pub fn from_file(x: i32, y: i32, path: &Path) -> EngineResult<Self> {
        Ok(Self::new(x, y, load_image(path)?))
    }
}

impl Drawable for Sprite {
    fn x(&self) -> i32 {
        self.x
    }

    fn set_x(&mut self, x: i32) {
        self.x = x;
    }

    fn y(&self) -> i32 {
        self.y
    }

    fn set_y(&mut self, y: i32) {
        self.y = y;
    }

    fn image(&self) -> &FrameBuffer {
        &self.image
    }

    fn set_image(&mut self, image: FrameBuffer) {
        self.image = image;
    }
}

/// A sprite whose image is a vertical strip of equally sized frames, the
/// first frame on top. Only the selected frame is drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct FramedSprite {
    x: i32,
    y: i32,
    strip: FrameBuffer,
    requested: usize,
    frames: Vec<FrameBuffer>,
    current: usize,
}

impl FramedSprite {
    /// Split `strip` into `frame_count` frames. The count is clamped to
    /// `1..=strip.height`, so every frame is at least one row tall (or the
    /// single frame of an empty strip). Rows left over by an uneven split
    /// are never shown.
    pub fn new(x: i32, y: i32, strip: FrameBuffer, frame_count: usize) -> Self {
        let frames = split_strip(&strip, frame_count);
        Self {
            x,
            y,
            strip,
            requested: frame_count,
            frames,
            current: 0,
        }
    }

    pub fn from_file(x: i32, y: i32, path: &Path, frame_count: usize) -> EngineResult<Self> {
        Ok(Self::new(x, y, load_image(path)?, frame_count))
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn current_frame(&self) -> usize {
        self.current
    }

    pub fn frame(&self, index: usize) -> Option<&FrameBuffer> {
        self.frames.get(index)
    }

    /// The unsplit source strip.
    pub fn strip(&self) -> &FrameBuffer {
        &self.strip
    }
}

fn split_strip(strip: &FrameBuffer, requested: usize) -> Vec<FrameBuffer> {
    let count = requested.clamp(1, strip.height.max(1) as usize);
    // count <= max(height, 1), so it fits in u32 and is never zero.
    let frame_height = strip.height / count as u32;
    (0..count as u32)
        .filter_map(|i| {
            strip
                .sub_image(0, i * frame_height, strip.width, frame_height)
                .ok()
        })
        .collect()
}

impl Drawable for FramedSprite {
    fn x(&self) -> i32 {
        self.x
    }

    fn set_x(&mut self, x: i32) {
        self.x = x;
    }

    fn y(&self) -> i32 {
        self.y
    }

    fn set_y(&mut self, y: i32) {
        self.y = y;
    }

    fn image(&self) -> &FrameBuffer {
        &self.frames[self.current]
    }

    /// Replace the strip, re-splitting it with the count given at
    /// construction. The current frame is kept when it still exists.
    fn set_image(&mut self, image: FrameBuffer) {
        self.frames = split_strip(&image, self.requested);
        self.current = self.current.min(self.frames.len().saturating_sub(1));
        self.strip = image;
    }

    fn set_frame(&mut self, frame: usize) -> EngineResult<()> {
        if frame >= self.frames.len() {
            return Err(EngineError::invalid_parameter(format!(
                "frame {frame} out of range for {} frames",
                self.frames.len()
            )));
        }
        self.current = frame;
        Ok(())
    }
}
