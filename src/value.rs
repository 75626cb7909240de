use crate::error::Fault;
use derive_more::{Display, From};
use std::ops::{Add, Mul, Neg, Sub};

///
/// A number.
///
/// Literals and the integer results of `+ - * % ^` stay exact in [`Number::Int`];
/// division, negative powers and any operation with a real operand produce
/// [`Number::Real`]. An integer result that would overflow `i64` falls back to
/// a real.
///
#[rustfmt::skip]
#[derive(Debug, Clone, Copy, PartialEq)]
#[derive(From)]
#[derive(Display)]
pub enum Number {
    #[display("{_0}")]
    Int(i64),
    #[display("{_0:?}")]
    Real(f64),
}

impl Number {
    #[must_use]
    pub const fn int(i: i64) -> Self {
        Self::Int(i)
    }

    #[must_use]
    pub const fn real(f: f64) -> Self {
        Self::Real(f)
    }

    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn to_f64(self) -> f64 {
        match self {
            Self::Int(i) => i as f64,
            Self::Real(f) => f,
        }
    }

    fn is_zero(self) -> bool {
        match self {
            Self::Int(i) => i == 0,
            Self::Real(f) => f == 0.0,
        }
    }

    fn combine(
        self,
        rhs: Self,
        int: impl FnOnce(i64, i64) -> Option<i64>,
        real: impl FnOnce(f64, f64) -> f64,
    ) -> Self {
        if let (Self::Int(a), Self::Int(b)) = (self, rhs) {
            if let Some(i) = int(a, b) {
                return Self::Int(i);
            }
        }

        Self::Real(real(self.to_f64(), rhs.to_f64()))
    }

    ///
    /// Real division, even when the quotient is whole. A zero divisor is a
    /// fault rather than an infinity.
    ///
    pub fn div(self, rhs: Self) -> Result<Self, Fault> {
        if rhs.is_zero() {
            return Err(Fault::DivisionByZero);
        }

        Ok(Self::Real(self.to_f64() / rhs.to_f64()))
    }

    ///
    /// Floored modulo: the result takes the sign of the divisor.
    ///
    pub fn rem(self, rhs: Self) -> Result<Self, Fault> {
        if rhs.is_zero() {
            return Err(Fault::DivisionByZero);
        }

        if let (Self::Int(a), Self::Int(b)) = (self, rhs) {
            // only `i64::MIN % -1` overflows, and it divides evenly
            let r = a.checked_rem(b).unwrap_or(0);
            return Ok(Self::Int(if r != 0 && (r < 0) != (b < 0) { r + b } else { r }));
        }

        let (a, b) = (self.to_f64(), rhs.to_f64());
        let r = libm::fmod(a, b);
        if r == 0.0 {
            Ok(Self::Real(libm::copysign(0.0, b)))
        } else if (r < 0.0) != (b < 0.0) {
            Ok(Self::Real(r + b))
        } else {
            Ok(Self::Real(r))
        }
    }

    pub fn pow(self, rhs: Self) -> Result<Self, Fault> {
        if self.is_zero() && rhs.to_f64() < 0.0 {
            return Err(Fault::DivisionByZero);
        }

        let r = self.combine(
            rhs,
            |a, b| u32::try_from(b).ok().and_then(|b| a.checked_pow(b)),
            libm::pow,
        );
        if let Self::Real(f) = r {
            if f.is_nan() && !self.to_f64().is_nan() && !rhs.to_f64().is_nan() {
                return Err(Fault::NotReal);
            }
        }

        Ok(r)
    }
}

impl Add for Number {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        self.combine(rhs, i64::checked_add, |a, b| a + b)
    }
}

impl Sub for Number {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        self.combine(rhs, i64::checked_sub, |a, b| a - b)
    }
}

impl Mul for Number {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        self.combine(rhs, i64::checked_mul, |a, b| a * b)
    }
}

impl Neg for Number {
    type Output = Self;

    fn neg(self) -> Self {
        match self {
            Self::Int(i) => i.checked_neg().map_or_else(|| Self::Real(-self.to_f64()), Self::Int),
            Self::Real(f) => Self::Real(-f),
        }
    }
}
