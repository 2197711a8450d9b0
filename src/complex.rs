use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

use crate::Error;

/// Divisors whose squared magnitude falls below this are treated as zero.
pub const SINGULAR_EPSILON: f64 = 1e-200;

/// An immutable complex value.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Complex {
    pub re: f64,
    pub im: f64,
}

#[allow(clippy::should_implement_trait)]
impl Complex {
    pub const ZERO: Complex = Complex { re: 0.0, im: 0.0 };
    pub const ONE: Complex = Complex { re: 1.0, im: 0.0 };
    pub const J: Complex = Complex { re: 0.0, im: 1.0 };

    #[inline]
    pub const fn new(re: f64, im: f64) -> Self {
        Self { re, im }
    }

    #[inline]
    pub const fn real(re: f64) -> Self {
        Self { re, im: 0.0 }
    }

    /// Builds a value from magnitude and phase (radians).
    #[inline]
    pub fn from_polar(mag: f64, phase: f64) -> Self {
        Self::new(mag * phase.cos(), mag * phase.sin())
    }

    #[inline]
    pub fn add(self, other: Self) -> Self {
        Self::new(self.re + other.re, self.im + other.im)
    }

    #[inline]
    pub fn sub(self, other: Self) -> Self {
        Self::new(self.re - other.re, self.im - other.im)
    }

    #[inline]
    pub fn mul(self, other: Self) -> Self {
        Self::new(
            self.re * other.re - self.im * other.im,
            self.re * other.im + self.im * other.re,
        )
    }

    /// Divides by `other` through its conjugate.
    ///
    /// Fails with `Error::SingularDivision` instead of producing infinities when the
    /// divisor is (numerically) zero.
    #[inline]
    pub fn div(self, other: Self) -> Result<Self, Error> {
        let denom = other.norm_sqr();
        if denom.is_nan() || denom < SINGULAR_EPSILON {
            return Err(Error::SingularDivision { norm_sqr: denom });
        }
        Ok(Self::new(
            (self.re * other.re + self.im * other.im) / denom,
            (self.im * other.re - self.re * other.im) / denom,
        ))
    }

    #[inline]
    pub fn recip(self) -> Result<Self, Error> {
        Self::ONE.div(self)
    }

    #[inline]
    pub fn norm_sqr(self) -> f64 {
        self.re * self.re + self.im * self.im
    }

    /// Euclidean norm.
    #[inline]
    pub fn mag(self) -> f64 {
        self.re.hypot(self.im)
    }

    /// Four-quadrant angle in (−π, π].
    #[inline]
    pub fn phase(self) -> f64 {
        self.im.atan2(self.re)
    }

    #[inline]
    pub fn scale(self, k: f64) -> Self {
        Self::new(self.re * k, self.im * k)
    }

    #[inline]
    pub fn conj(self) -> Self {
        Self::new(self.re, -self.im)
    }

    /// Principal square root. The real part of the result is never negative.
    #[inline]
    pub fn sqrt(self) -> Self {
        let root = Self::from_polar(self.mag().sqrt(), self.phase() / 2.0);
        // rounding in cos near ±π/2 must not leave the principal branch
        Self::new(root.re.max(0.0), root.im)
    }

    #[inline]
    pub fn exp(self) -> Self {
        Self::from_polar(self.re.exp(), self.im)
    }

    #[inline]
    pub fn sinh(self) -> Self {
        Self::new(
            self.re.sinh() * self.im.cos(),
            self.re.cosh() * self.im.sin(),
        )
    }

    #[inline]
    pub fn cosh(self) -> Self {
        Self::new(
            self.re.cosh() * self.im.cos(),
            self.re.sinh() * self.im.sin(),
        )
    }

    #[inline]
    pub fn tanh(self) -> Result<Self, Error> {
        self.sinh().div(self.cosh())
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.re.is_finite() && self.im.is_finite()
    }

    /// Compares both parts with an absolute tolerance.
    #[inline]
    pub fn approx_eq(self, other: Self, tol: f64) -> bool {
        (self.re - other.re).abs() <= tol && (self.im - other.im).abs() <= tol
    }
}

impl Add for Complex {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Complex::add(self, other)
    }
}

impl Sub for Complex {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Complex::sub(self, other)
    }
}

impl Mul for Complex {
    type Output = Self;

    fn mul(self, other: Self) -> Self {
        Complex::mul(self, other)
    }
}

impl Mul<f64> for Complex {
    type Output = Self;

    fn mul(self, k: f64) -> Self {
        self.scale(k)
    }
}

impl Div<f64> for Complex {
    type Output = Self;

    fn div(self, k: f64) -> Self {
        Self::new(self.re / k, self.im / k)
    }
}

impl Neg for Complex {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.re, -self.im)
    }
}

impl From<f64> for Complex {
    fn from(re: f64) -> Self {
        Self::real(re)
    }
}

impl fmt::Display for Complex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let precision = f.precision().unwrap_or(3);
        let sign = if self.im.is_sign_negative() { '-' } else { '+' };
        write!(
            f,
            "{:.*} {} j{:.*}",
            precision,
            self.re,
            sign,
            precision,
            self.im.abs()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn multiplication_follows_distributive_rule() {
        let z = Complex::new(1.0, 2.0).mul(Complex::new(3.0, -1.0));
        assert_eq!(z, Complex::new(5.0, 5.0));
    }

    #[test]
    fn division_by_zero_is_reported() {
        let err = Complex::new(1.0, 1.0).div(Complex::ZERO).unwrap_err();
        assert!(matches!(err, Error::SingularDivision { .. }));
        assert!(Complex::new(1.0, 0.0).div(Complex::new(f64::NAN, 0.0)).is_err());
    }

    #[test]
    fn phase_covers_negative_real_axis() {
        assert_relative_eq!(Complex::new(-1.0, 0.0).phase(), PI);
        assert_relative_eq!(Complex::new(0.0, -2.0).phase(), -PI / 2.0);
    }

    #[test]
    fn sqrt_is_principal_branch() {
        let root = Complex::new(-4.0, 0.0).sqrt();
        assert!(root.re >= 0.0);
        assert_relative_eq!(root.im, 2.0, epsilon = 1e-12);

        let root = Complex::new(-3.0, -4.0).sqrt();
        assert!(root.re >= 0.0);
        assert!(root.mul(root).approx_eq(Complex::new(-3.0, -4.0), 1e-12));
    }

    #[test]
    fn tanh_of_imaginary_argument_is_tan() {
        let t = Complex::new(0.0, 0.3).tanh().unwrap();
        assert_relative_eq!(t.re, 0.0, epsilon = 1e-15);
        assert_relative_eq!(t.im, 0.3f64.tan(), epsilon = 1e-12);
    }

    #[test]
    fn exp_of_j_pi_is_minus_one() {
        let z = Complex::new(0.0, PI).exp();
        assert!(z.approx_eq(Complex::new(-1.0, 0.0), 1e-12));
    }

    #[test]
    fn display_shows_sign_of_imaginary_part() {
        assert_eq!(format!("{}", Complex::new(1.0, -2.5)), "1.000 - j2.500");
        assert_eq!(format!("{:.1}", Complex::new(50.0, 0.0)), "50.0 + j0.0");
    }
}
