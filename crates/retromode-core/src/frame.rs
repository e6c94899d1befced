use crate::color::{Color, Rgba};
use crate::error::{EngineError, EngineResult};

/// Bytes per pixel of every buffer in the engine (straight-alpha RGBA8).
pub const BYTES_PER_PIXEL: usize = 4;

/// A fixed-size 2D RGBA8 pixel buffer. Used for sprite images as well as
/// rendered frames.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    /// Raw pixel data, row-major, 4 bytes per pixel.
    pub data: Vec<u8>,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl FrameBuffer {
    /// Create a new frame buffer filled with zeros (transparent black).
    pub fn new(width: u32, height: u32) -> Self {
        let size = (width as usize) * (height as usize) * BYTES_PER_PIXEL;
        Self {
            data: vec![0u8; size],
            width,
            height,
        }
    }

    /// Create a frame buffer filled with a solid color.
    pub fn solid(width: u32, height: u32, color: &Color) -> Self {
        let mut fb = Self::new(width, height);
        fb.fill(color.to_rgba8());
        fb
    }

    /// Wrap raw RGBA8 bytes. The length must match `width * height * 4`.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> EngineResult<Self> {
        let expected = (width as usize) * (height as usize) * BYTES_PER_PIXEL;
        if data.len() != expected {
            return Err(EngineError::dimension(format!(
                "{}x{} RGBA buffer needs {} bytes, got {}",
                width,
                height,
                expected,
                data.len()
            )));
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Total number of pixels.
    pub fn pixel_count(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    /// Total byte size of the pixel data.
    pub fn byte_size(&self) -> usize {
        self.data.len()
    }

    /// True when the buffer has no pixels at all.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        ((y as usize) * (self.width as usize) + (x as usize)) * BYTES_PER_PIXEL
    }

    /// Get the RGBA value at a pixel coordinate. Returns None if out of bounds.
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let o = self.offset(x, y);
        Some([
            self.data[o],
            self.data[o + 1],
            self.data[o + 2],
            self.data[o + 3],
        ])
    }

    /// Set the RGBA value at a pixel coordinate. No-op if out of bounds.
    pub fn set_pixel(&mut self, x: u32, y: u32, rgba: Rgba) {
        if x >= self.width || y >= self.height {
            return;
        }
        let o = self.offset(x, y);
        self.data[o..o + BYTES_PER_PIXEL].copy_from_slice(&rgba);
    }

    /// Source-over blend `src` onto the pixel at (x, y). No-op if out of bounds.
    pub fn blend_pixel(&mut self, x: u32, y: u32, src: Rgba) {
        if let Some(dst) = self.get_pixel(x, y) {
            self.set_pixel(x, y, blend_over(dst, src));
        }
    }

    /// Overwrite every pixel with `rgba`.
    pub fn fill(&mut self, rgba: Rgba) {
        for px in self.data.chunks_exact_mut(BYTES_PER_PIXEL) {
            px.copy_from_slice(&rgba);
        }
    }

    /// Copy out a rectangular region. The region must lie inside the buffer.
    pub fn sub_image(&self, x: u32, y: u32, width: u32, height: u32) -> EngineResult<FrameBuffer> {
        let fits = x.checked_add(width).is_some_and(|r| r <= self.width)
            && y.checked_add(height).is_some_and(|b| b <= self.height);
        if !fits {
            return Err(EngineError::invalid_parameter(format!(
                "region {}x{} at ({}, {}) exceeds {}x{} image",
                width, height, x, y, self.width, self.height
            )));
        }
        let mut out = FrameBuffer::new(width, height);
        let len = width as usize * BYTES_PER_PIXEL;
        for row in 0..height {
            let src = self.offset(x, y + row);
            let dst = out.offset(0, row);
            out.data[dst..dst + len].copy_from_slice(&self.data[src..src + len]);
        }
        Ok(out)
    }
}

/// Straight-alpha "source-over" blend of one pixel onto another.
///
/// `outA = sA + dA(1 - sA)` and `outC = (sC·sA + dC·dA(1 - sA)) / outA`,
/// with `outC = 0` when `outA = 0`. A fully transparent source returns `dst`
/// untouched and a fully opaque one returns `src` exactly.
pub fn blend_over(dst: Rgba, src: Rgba) -> Rgba {
    match src[3] {
        0 => return dst,
        255 => return src,
        _ => {}
    }

    let sa = src[3] as f32 / 255.0;
    let da = dst[3] as f32 / 255.0;
    let dst_weight = da * (1.0 - sa);
    let out_a = sa + dst_weight;
    if out_a <= 0.0 {
        return [0, 0, 0, 0];
    }

    let mut out = [0u8; 4];
    for i in 0..3 {
        let c = (src[i] as f32 * sa + dst[i] as f32 * dst_weight) / out_a;
        out[i] = c.round().clamp(0.0, 255.0) as u8;
    }
    out[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_buffer_new() {
        let fb = FrameBuffer::new(240, 160);
        assert_eq!(fb.byte_size(), 240 * 160 * 4);
        assert_eq!(fb.pixel_count(), 240 * 160);
        assert_eq!(fb.get_pixel(0, 0), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_frame_buffer_solid() {
        let fb = FrameBuffer::solid(2, 2, &Color::RED);
        assert_eq!(fb.get_pixel(0, 0), Some([255, 0, 0, 255]));
        assert_eq!(fb.get_pixel(1, 1), Some([255, 0, 0, 255]));
    }

    #[test]
    fn test_frame_buffer_out_of_bounds() {
        let mut fb = FrameBuffer::new(10, 10);
        fb.set_pixel(10, 3, [1, 2, 3, 4]);
        assert_eq!(fb.get_pixel(10, 0), None);
        assert_eq!(fb.get_pixel(0, 10), None);
        assert!(fb.data.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_from_raw_rejects_wrong_length() {
        let err = FrameBuffer::from_raw(2, 2, vec![0; 15]).unwrap_err();
        assert!(matches!(err, EngineError::Dimension(_)));
        assert!(FrameBuffer::from_raw(2, 2, vec![0; 16]).is_ok());
    }

    #[test]
    fn test_sub_image() {
        let mut fb = FrameBuffer::new(4, 4);
        fb.set_pixel(2, 3, [9, 9, 9, 255]);
        let sub = fb.sub_image(1, 2, 2, 2).unwrap();
        assert_eq!(sub.width, 2);
        assert_eq!(sub.get_pixel(1, 1), Some([9, 9, 9, 255]));
        assert!(fb.sub_image(3, 3, 2, 1).is_err());
    }

    #[test]
    fn test_blend_opaque_source_replaces() {
        for dst in [[0, 0, 0, 0], [10, 20, 30, 128], [255, 255, 255, 255]] {
            assert_eq!(blend_over(dst, [1, 2, 3, 255]), [1, 2, 3, 255]);
        }
    }

    #[test]
    fn test_blend_transparent_source_keeps_destination() {
        for dst in [[0, 0, 0, 0], [10, 20, 30, 0], [10, 20, 30, 128]] {
            assert_eq!(blend_over(dst, [200, 100, 50, 0]), dst);
        }
    }

    #[test]
    fn test_blend_half_red_over_white() {
        let out = blend_over([255, 255, 255, 255], [255, 0, 0, 128]);
        assert_eq!(out[3], 255);
        assert_eq!(out[0], 255);
        assert!(out[1] > 120 && out[1] < 130);
        assert_eq!(out[1], out[2]);
    }

    #[test]
    fn test_blend_over_transparent_destination_keeps_source_color() {
        let out = blend_over([0, 0, 0, 0], [40, 80, 120, 100]);
        assert_eq!(out, [40, 80, 120, 100]);
    }
}
