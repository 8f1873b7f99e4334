//! Affine transform used for glyph placement
//!
//! The matrix follows the PDF convention: a point `(x, y)` maps to
//! `(a*x + c*y + e, b*x + d*y + f)`. The coordinate system has its
//! origin wherever the caller puts it; glyph rendering treats `f` as the
//! baseline translation.

use std::fmt;

/// A 2D affine transform `[a b c d e f]`
///
/// # Examples
///
/// ```
/// use fastcomposite::Matrix;
///
/// let m = Matrix::scale(2.0, 3.0);
/// assert_eq!(m.transform_point(1.0, 1.0), (2.0, 3.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix {
  pub a: f32,
  pub b: f32,
  pub c: f32,
  pub d: f32,
  pub e: f32,
  pub f: f32,
}

impl Matrix {
  /// The identity transform
  pub const IDENTITY: Self = Self {
    a: 1.0,
    b: 0.0,
    c: 0.0,
    d: 1.0,
    e: 0.0,
    f: 0.0,
  };

  /// Creates a matrix from its six coefficients
  pub const fn new(a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) -> Self {
    Self { a, b, c, d, e, f }
  }

  /// Creates a pure scale transform
  pub const fn scale(sx: f32, sy: f32) -> Self {
    Self::new(sx, 0.0, 0.0, sy, 0.0, 0.0)
  }

  /// Creates a pure translation
  pub const fn translate(tx: f32, ty: f32) -> Self {
    Self::new(1.0, 0.0, 0.0, 1.0, tx, ty)
  }

  /// Applies the transform to a point
  pub fn transform_point(&self, x: f32, y: f32) -> (f32, f32) {
    (self.a * x + self.c * y + self.e, self.b * x + self.d * y + self.f)
  }

  /// Returns the transform that applies `self` first, then `other`
  ///
  /// # Examples
  ///
  /// ```
  /// use fastcomposite::Matrix;
  ///
  /// let m = Matrix::scale(2.0, 2.0).then(&Matrix::translate(10.0, 0.0));
  /// assert_eq!(m.transform_point(1.0, 1.0), (12.0, 2.0));
  /// ```
  pub fn then(&self, other: &Matrix) -> Matrix {
    Matrix {
      a: self.a * other.a + self.b * other.c,
      b: self.a * other.b + self.b * other.d,
      c: self.c * other.a + self.d * other.c,
      d: self.c * other.b + self.d * other.d,
      e: self.e * other.a + self.f * other.c + other.e,
      f: self.e * other.b + self.f * other.d + other.f,
    }
  }

  /// Determinant of the linear part
  pub fn determinant(&self) -> f32 {
    self.a * self.d - self.b * self.c
  }

  /// Inverse transform, or `None` when the matrix is singular
  pub fn invert(&self) -> Option<Matrix> {
    let det = self.determinant();
    if det == 0.0 || !det.is_finite() {
      return None;
    }
    let a = self.d / det;
    let b = -self.b / det;
    let c = -self.c / det;
    let d = self.a / det;
    Some(Matrix {
      a,
      b,
      c,
      d,
      e: -(self.e * a + self.f * c),
      f: -(self.e * b + self.f * d),
    })
  }
}

impl fmt::Display for Matrix {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "[{} {} {} {} {} {}]",
      self.a, self.b, self.c, self.d, self.e, self.f
    )
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn identity_leaves_points_alone() {
    assert_eq!(Matrix::IDENTITY.transform_point(7.0, -3.0), (7.0, -3.0));
  }

  #[test]
  fn then_applies_in_order() {
    let m = Matrix::translate(1.0, 0.0).then(&Matrix::scale(2.0, 2.0));
    // Translate first, scale second.
    assert_eq!(m.transform_point(0.0, 0.0), (2.0, 0.0));
  }

  #[test]
  fn invert_round_trips() {
    let m = Matrix::new(2.0, 0.5, -0.25, 3.0, 7.0, -2.0);
    let inv = m.invert().unwrap();
    let (x, y) = m.transform_point(3.0, 4.0);
    let (rx, ry) = inv.transform_point(x, y);
    assert!((rx - 3.0).abs() < 1e-4);
    assert!((ry - 4.0).abs() < 1e-4);
  }

  #[test]
  fn singular_has_no_inverse() {
    let m = Matrix::new(1.0, 2.0, 2.0, 4.0, 0.0, 0.0);
    assert!(m.invert().is_none());
  }
}
