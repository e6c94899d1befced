//! Affine resampling by inverse mapping.
//!
//! A [`Resampler`] accumulates a running [`AffineMatrix`] (each operation is
//! right-multiplied, so operations compose in the order they are called) and
//! then rasterizes the source through it. Every destination pixel asks
//! "which source pixel lands here?", which leaves no holes the way pushing
//! source pixels forward would.

use retromode_core::{AffineMatrix, EngineError, EngineResult, FrameBuffer, Point2D, Rgba};

/// Upper bound on the canvas `apply_unclipped` will allocate.
pub const MAX_UNCLIPPED_PIXELS: u64 = 1 << 26;

/// Supplies an extra matrix per destination row for [`Resampler::apply_scanlines`].
pub trait ScanlineTransform {
    fn row_matrix(&mut self, row: u32) -> EngineResult<AffineMatrix>;
}

impl<F> ScanlineTransform for F
where
    F: FnMut(u32) -> EngineResult<AffineMatrix>,
{
    fn row_matrix(&mut self, row: u32) -> EngineResult<AffineMatrix> {
        self(row)
    }
}

/// Result of [`Resampler::apply_unclipped`]: the image and where its
/// top-left pixel sits in the source's coordinate space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnclippedImage {
    pub image: FrameBuffer,
    pub origin_x: i32,
    pub origin_y: i32,
}

/// Closed-form inverse of the 2x3 affine block.
struct InverseMap {
    a: f64,
    b: f64,
    d: f64,
    e: f64,
    x_const: f64,
    y_const: f64,
    denom: f64,
}

impl InverseMap {
    fn new(m: &AffineMatrix) -> Self {
        let [a, b, c, d, e, f] = m.coefficients();
        Self {
            a,
            b,
            d,
            e,
            x_const: b * f - e * c,
            y_const: d * c - a * f,
            denom: 1.0 / (a * e - b * d),
        }
    }

    fn source_of(&self, xx: f64, yy: f64) -> (f64, f64) {
        let read_x = (self.e * xx - self.b * yy + self.x_const) * self.denom;
        let read_y = (self.a * yy - self.d * xx + self.y_const) * self.denom;
        (read_x, read_y)
    }
}

/// Nearest-neighbour fetch; `None` outside the image or for a singular map.
fn sample(src: &FrameBuffer, read_x: f64, read_y: f64) -> Option<Rgba> {
    if !read_x.is_finite() || !read_y.is_finite() {
        return None;
    }
    let (x, y) = (read_x.floor(), read_y.floor());
    if x < 0.0 || y < 0.0 || x >= src.width as f64 || y >= src.height as f64 {
        return None;
    }
    src.get_pixel(x as u32, y as u32)
}

fn fill_row(dst: &mut FrameBuffer, src: &FrameBuffer, inv: &InverseMap, yy: u32) {
    for xx in 0..dst.width {
        let (rx, ry) = inv.source_of(xx as f64, yy as f64);
        if let Some(px) = sample(src, rx, ry) {
            dst.set_pixel(xx, yy, px);
        }
    }
}

/// Transforms one image through a composed affine matrix.
#[derive(Debug, Clone)]
pub struct Resampler<'a> {
    image: &'a FrameBuffer,
    matrix: AffineMatrix,
}

impl<'a> Resampler<'a> {
    /// Start from the neutral matrix.
    pub fn new(image: &'a FrameBuffer) -> Self {
        Self::with_matrix(image, AffineMatrix::IDENTITY)
    }

    pub fn with_matrix(image: &'a FrameBuffer, matrix: AffineMatrix) -> Self {
        Self { image, matrix }
    }

    pub fn matrix(&self) -> &AffineMatrix {
        &self.matrix
    }

    pub fn reset(mut self) -> Self {
        self.matrix = AffineMatrix::IDENTITY;
        self
    }

    /// Right-multiply the running matrix.
    pub fn multiply_matrix(mut self, rhs: &AffineMatrix) -> Self {
        self.matrix = self.matrix.multiply(rhs);
        self
    }

    /// Right-multiply by a caller-built matrix that must be exactly 3x3.
    pub fn multiply_rows<R: AsRef<[f64]>>(self, rows: &[R]) -> EngineResult<Self> {
        let rhs = AffineMatrix::try_from_rows(rows)?;
        Ok(self.multiply_matrix(&rhs))
    }

    pub fn translate(self, dx: f64, dy: f64) -> EngineResult<Self> {
        Ok(self.multiply_matrix(&AffineMatrix::translation(dx, dy)?))
    }

    pub fn scale(self, dx: f64, dy: f64) -> EngineResult<Self> {
        Ok(self.multiply_matrix(&AffineMatrix::scaling(dx, dy)?))
    }

    pub fn scale_uniform(self, factor: f64) -> EngineResult<Self> {
        self.scale(factor, factor)
    }

    /// Rotate about the image origin, in radians.
    pub fn rotate(self, theta: f64) -> EngineResult<Self> {
        Ok(self.multiply_matrix(&AffineMatrix::rotation(theta)?))
    }

    pub fn rotate_degrees(self, degrees: f64) -> EngineResult<Self> {
        self.rotate(degrees.to_radians())
    }

    /// Rotate about (x, y): `translate(x, y) · rotate(theta) · translate(-x, -y)`.
    pub fn rotate_about(self, x: f64, y: f64, theta: f64) -> EngineResult<Self> {
        retromode_core::error::ensure_finite("rotate_about", &[x, y, theta])?;
        self.translate(x, y)?.rotate(theta)?.translate(-x, -y)
    }

    pub fn rotate_degrees_about(self, x: f64, y: f64, degrees: f64) -> EngineResult<Self> {
        self.rotate_about(x, y, degrees.to_radians())
    }

    pub fn shear(self, theta_x: f64, theta_y: f64) -> EngineResult<Self> {
        Ok(self.multiply_matrix(&AffineMatrix::shear(theta_x, theta_y)?))
    }

    pub fn reflect(self, x_axis: bool, y_axis: bool) -> Self {
        self.multiply_matrix(&AffineMatrix::reflection(x_axis, y_axis))
    }

    /// Resample into a buffer the size of the source. Anything transformed
    /// outside that window is lost.
    pub fn apply(&self) -> FrameBuffer {
        let mut out = FrameBuffer::new(self.image.width, self.image.height);
        let inv = InverseMap::new(&self.matrix);
        for yy in 0..out.height {
            fill_row(&mut out, self.image, &inv, yy);
        }
        out
    }

    /// Resample into a canvas sized to the tight bounding box of the
    /// transformed image, so nothing is clipped.
    pub fn apply_unclipped(&self) -> EngineResult<UnclippedImage> {
        if self.image.is_empty() {
            return Ok(UnclippedImage {
                image: FrameBuffer::new(0, 0),
                origin_x: 0,
                origin_y: 0,
            });
        }

        // An affine map reaches its extremes over a rectangle at the corners.
        let (w, h) = (self.image.width as f64 - 1.0, self.image.height as f64 - 1.0);
        let corners = [(0.0, 0.0), (w, 0.0), (0.0, h), (w, h)];
        let (mut min_x, mut max_x) = (i64::MAX, i64::MIN);
        let (mut min_y, mut max_y) = (i64::MAX, i64::MIN);
        for (x, y) in corners {
            let p = self.matrix.transform_point(Point2D::new(x, y));
            min_x = min_x.min(p.x as i64);
            max_x = max_x.max(p.x as i64);
            min_y = min_y.min(p.y as i64);
            max_y = max_y.max(p.y as i64);
        }

        let width = max_x.saturating_sub(min_x).saturating_add(1);
        let height = max_y.saturating_sub(min_y).saturating_add(1);
        let pixels = (width as u64).saturating_mul(height as u64);
        let origin_fits = i32::try_from(min_x).is_ok() && i32::try_from(min_y).is_ok();
        if pixels > MAX_UNCLIPPED_PIXELS || !origin_fits {
            return Err(EngineError::invalid_parameter(format!(
                "unclipped canvas {}x{} exceeds {} pixels",
                width, height, MAX_UNCLIPPED_PIXELS
            )));
        }
        tracing::trace!(min_x, min_y, width, height, "unclipped resample bounds");

        let mut out = FrameBuffer::new(width as u32, height as u32);
        let inv = InverseMap::new(&self.matrix);
        for row in 0..out.height {
            let yy = min_y + row as i64;
            for col in 0..out.width {
                let xx = min_x + col as i64;
                let (rx, ry) = inv.source_of(xx as f64, yy as f64);
                if let Some(px) = sample(self.image, rx, ry) {
                    out.set_pixel(col, row, px);
                }
            }
        }

        Ok(UnclippedImage {
            image: out,
            origin_x: min_x as i32,
            origin_y: min_y as i32,
        })
    }

    /// Resample with a per-row extra matrix: row `yy` uses
    /// `base · rows.row_matrix(yy)`. Gives per-scanline warps such as a
    /// pseudo-perspective floor.
    pub fn apply_scanlines<S: ScanlineTransform>(&self, mut rows: S) -> EngineResult<FrameBuffer> {
        let mut out = FrameBuffer::new(self.image.width, self.image.height);
        for yy in 0..out.height {
            let row_matrix = self.matrix.multiply(&rows.row_matrix(yy)?);
            fill_row(&mut out, self.image, &InverseMap::new(&row_matrix), yy);
        }
        Ok(out)
    }
}
