use std::fmt;
use std::ops::Mul;

use crate::error::{ensure_finite, EngineError, EngineResult};

/// A 2D point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A 3x3 homogeneous affine transform, stored row-major.
///
/// ```text
/// |X'|   |A B C|   |X|      X' = A·X + B·Y + C
/// |Y'| = |D E F| * |Y|  ->  Y' = D·X + E·Y + F
/// |1 |   |0 0 1|   |1|
/// ```
///
/// Composition is plain matrix multiplication and does not commute.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AffineMatrix {
    pub rows: [[f64; 3]; 3],
}

impl AffineMatrix {
    /// The neutral matrix: ones on the diagonal, zeros elsewhere.
    pub const IDENTITY: Self = Self {
        rows: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
    };

    pub fn from_rows(rows: [[f64; 3]; 3]) -> Self {
        Self { rows }
    }

    /// Build a matrix from caller-supplied rows of unknown shape.
    ///
    /// Anything other than exactly three rows of three values fails with
    /// [`EngineError::Dimension`]; non-finite entries fail with
    /// [`EngineError::InvalidParameter`].
    pub fn try_from_rows<R: AsRef<[f64]>>(rows: &[R]) -> EngineResult<Self> {
        if rows.len() != 3 {
            return Err(EngineError::dimension(format!(
                "matrix must be 3x3, got {} rows",
                rows.len()
            )));
        }
        let mut out = [[0.0; 3]; 3];
        for (i, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != 3 {
                return Err(EngineError::dimension(format!(
                    "matrix must be 3x3, row {} has {} columns",
                    i,
                    row.len()
                )));
            }
            ensure_finite("matrix", row)?;
            out[i].copy_from_slice(row);
        }
        Ok(Self { rows: out })
    }

    pub fn translation(dx: f64, dy: f64) -> EngineResult<Self> {
        ensure_finite("translate", &[dx, dy])?;
        let mut m = Self::IDENTITY;
        m.rows[0][2] = dx;
        m.rows[1][2] = dy;
        Ok(m)
    }

    pub fn scaling(sx: f64, sy: f64) -> EngineResult<Self> {
        ensure_finite("scale", &[sx, sy])?;
        let mut m = Self::IDENTITY;
        m.rows[0][0] = sx;
        m.rows[1][1] = sy;
        Ok(m)
    }

    /// Rotation by `theta` radians about the origin.
    pub fn rotation(theta: f64) -> EngineResult<Self> {
        ensure_finite("rotate", &[theta])?;
        let (sin, cos) = theta.sin_cos();
        let mut m = Self::IDENTITY;
        m.rows[0][0] = cos;
        m.rows[0][1] = sin;
        m.rows[1][0] = -sin;
        m.rows[1][1] = cos;
        Ok(m)
    }

    /// Shear by the tangent of each angle (radians).
    pub fn shear(theta_x: f64, theta_y: f64) -> EngineResult<Self> {
        ensure_finite("shear", &[theta_x, theta_y])?;
        let mut m = Self::IDENTITY;
        m.rows[0][1] = theta_x.tan();
        m.rows[1][0] = theta_y.tan();
        Ok(m)
    }

    /// Mirror across the x axis (flips Y) and/or the y axis (flips X).
    pub fn reflection(x_axis: bool, y_axis: bool) -> Self {
        let mut m = Self::IDENTITY;
        if y_axis {
            m.rows[0][0] = -1.0;
        }
        if x_axis {
            m.rows[1][1] = -1.0;
        }
        m
    }

    /// `self · rhs`.
    pub fn multiply(&self, rhs: &AffineMatrix) -> AffineMatrix {
        let mut out = [[0.0; 3]; 3];
        for (i, row) in out.iter_mut().enumerate() {
            for (j, cell) in row.iter_mut().enumerate() {
                *cell = (0..3).map(|k| self.rows[i][k] * rhs.rows[k][j]).sum();
            }
        }
        AffineMatrix { rows: out }
    }

    /// The `[A, B, C, D, E, F]` coefficients of the affine block.
    pub fn coefficients(&self) -> [f64; 6] {
        let [[a, b, c], [d, e, f], _] = self.rows;
        [a, b, c, d, e, f]
    }

    /// Determinant of the 2x2 linear part, `A·E − B·D`.
    pub fn determinant(&self) -> f64 {
        let [a, b, _, d, e, _] = self.coefficients();
        a * e - b * d
    }

    /// Forward-map a point.
    pub fn transform_point(&self, p: Point2D) -> Point2D {
        let [a, b, c, d, e, f] = self.coefficients();
        Point2D::new(a * p.x + b * p.y + c, d * p.x + e * p.y + f)
    }
}

impl Default for AffineMatrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for AffineMatrix {
    type Output = AffineMatrix;
    fn mul(self, rhs: AffineMatrix) -> AffineMatrix {
        self.multiply(&rhs)
    }
}

impl fmt::Display for AffineMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = &self.rows;
        write!(
            f,
            "[[{}, {}, {}], [{}, {}, {}], [{}, {}, {}]]",
            r[0][0], r[0][1], r[0][2], r[1][0], r[1][1], r[1][2], r[2][0], r[2][1], r[2][2]
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    fn approx_eq(a: &AffineMatrix, b: &AffineMatrix) -> bool {
        a.rows
            .iter()
            .flatten()
            .zip(b.rows.iter().flatten())
            .all(|(x, y)| (x - y).abs() < 1e-9)
    }

    #[test]
    fn test_identity_is_neutral() {
        let m = AffineMatrix::from_rows([[2.0, 0.5, 3.0], [-1.0, 4.0, 7.0], [0.0, 0.0, 1.0]]);
        assert_eq!(AffineMatrix::IDENTITY * m, m);
        assert_eq!(m * AffineMatrix::IDENTITY, m);
    }

    #[test]
    fn test_composition_is_not_commutative() {
        let t = AffineMatrix::translation(10.0, 0.0).unwrap();
        let s = AffineMatrix::scaling(2.0, 2.0).unwrap();
        let ts = t * s;
        let st = s * t;
        assert_eq!(ts.transform_point(Point2D::new(1.0, 0.0)).x, 12.0);
        assert_eq!(st.transform_point(Point2D::new(1.0, 0.0)).x, 22.0);
    }

    #[test]
    fn test_rotation_quarter_turn() {
        let r = AffineMatrix::rotation(FRAC_PI_2).unwrap();
        let p = r.transform_point(Point2D::new(1.0, 0.0));
        assert!(p.x.abs() < 1e-12);
        assert!((p.y + 1.0).abs() < 1e-12);
        assert!((r.determinant() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_translation_inverse_cancels() {
        let m = AffineMatrix::translation(3.0, -4.0).unwrap()
            * AffineMatrix::translation(-3.0, 4.0).unwrap();
        assert!(approx_eq(&m, &AffineMatrix::IDENTITY));
    }

    #[test]
    fn test_reflection_flips_diagonal() {
        let m = AffineMatrix::reflection(true, false);
        assert_eq!(m.rows[0][0], 1.0);
        assert_eq!(m.rows[1][1], -1.0);
        let m = AffineMatrix::reflection(false, true);
        assert_eq!(m.rows[0][0], -1.0);
        assert_eq!(m.rows[1][1], 1.0);
    }

    #[test]
    fn test_shear_uses_tangent() {
        let m = AffineMatrix::shear(std::f64::consts::FRAC_PI_4, 0.0).unwrap();
        assert!((m.rows[0][1] - 1.0).abs() < 1e-12);
        assert_eq!(m.rows[1][0], 0.0);
    }

    #[test]
    fn test_non_finite_arguments_rejected() {
        assert!(matches!(
            AffineMatrix::translation(f64::NAN, 0.0),
            Err(EngineError::InvalidParameter(_))
        ));
        assert!(AffineMatrix::scaling(1.0, f64::INFINITY).is_err());
        assert!(AffineMatrix::rotation(f64::NEG_INFINITY).is_err());
        assert!(AffineMatrix::shear(0.0, f64::NAN).is_err());
    }

    #[test]
    fn test_try_from_rows_shape() {
        let ok = AffineMatrix::try_from_rows(&[
            vec![1.0, 0.0, 5.0],
            vec![0.0, 1.0, 6.0],
            vec![0.0, 0.0, 1.0],
        ])
        .unwrap();
        assert_eq!(ok.rows[0][2], 5.0);

        let two_rows = AffineMatrix::try_from_rows(&[[1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]);
        assert!(matches!(two_rows, Err(EngineError::Dimension(_))));

        let short_row = AffineMatrix::try_from_rows(&[
            vec![1.0, 0.0, 0.0],
            vec![0.0, 1.0],
            vec![0.0, 0.0, 1.0],
        ]);
        assert!(matches!(short_row, Err(EngineError::Dimension(_))));
    }
}
