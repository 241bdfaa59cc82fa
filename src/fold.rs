//! Exact evaluation of static expressions: 128-bit integers and exact
//! rationals for real arithmetic. The resolver folds static expressions at
//! resolve time and re-embeds the results into the syntax tree.

use std::{error, fmt};

#[derive(Debug, Clone, PartialEq)]
pub enum FoldError {
    Overflow,
    DivisionByZero,
    /// Operand combination no static rule applies to.
    NotStatic,
}

impl fmt::Display for FoldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Overflow => "value out of range of the compile-time representation",
            Self::DivisionByZero => "division by zero",
            Self::NotStatic => "expression is not static",
        })
    }
}

impl error::Error for FoldError {}

fn gcd(mut a: i128, mut b: i128) -> i128 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a.abs().max(1)
}

/// An exact rational with positive denominator in lowest terms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rational {
    num: i128,
    den: i128,
}

impl Rational {
    pub const ZERO: Self = Self { num: 0, den: 1 };

    pub fn new(num: i128, den: i128) -> Result<Self, FoldError> {
        if den == 0 {
            return Err(FoldError::DivisionByZero);
        }
        let sign = if den < 0 { -1 } else { 1 };
        let g = gcd(num, den);
        Ok(Self {
            num: sign * num / g,
            den: sign * den / g,
        })
    }

    #[must_use]
    pub fn from_int(v: i128) -> Self {
        Self { num: v, den: 1 }
    }

    /// Exact conversion: every finite double is mantissa × 2^exponent.
    pub fn from_f64(v: f64) -> Result<Self, FoldError> {
        if !v.is_finite() {
            return Err(FoldError::Overflow);
        }
        if v == 0.0 {
            return Ok(Self::ZERO);
        }
        let bits = v.to_bits();
        let sign: i128 = if bits >> 63 == 0 { 1 } else { -1 };
        let exponent = ((bits >> 52) & 0x7ff) as i32;
        let mantissa = if exponent == 0 {
            (bits & 0xf_ffff_ffff_ffff) as i128
        } else {
            (bits & 0xf_ffff_ffff_ffff) as i128 | (1 << 52)
        };
        let exp2 = exponent.max(1) - 1075;
        if exp2 >= 0 {
            // 53 mantissa bits; anything shifted past 127 cannot fit.
            if exp2 > 74 {
                return Err(FoldError::Overflow);
            }
            Ok(Self {
                num: sign * (mantissa << exp2),
                den: 1,
            })
        } else if exp2 > -127 {
            Self::new(sign * mantissa, 1i128 << (-exp2))
        } else {
            // Subnormals far below any representable bound; approximate by
            // the nearest realizable rational.
            Self::new(sign * mantissa, i128::MAX)
        }
    }

    #[must_use]
    pub fn to_f64(&self) -> f64 {
        self.num as f64 / self.den as f64
    }

    #[must_use]
    pub fn numerator(&self) -> i128 {
        self.num
    }

    #[must_use]
    pub fn denominator(&self) -> i128 {
        self.den
    }

    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.num < 0
    }

    pub fn checked_add(&self, rhs: &Self) -> Result<Self, FoldError> {
        let num = self
            .num
            .checked_mul(rhs.den)
            .and_then(|a| rhs.num.checked_mul(self.den).and_then(|b| a.checked_add(b)))
            .ok_or(FoldError::Overflow)?;
        let den = self.den.checked_mul(rhs.den).ok_or(FoldError::Overflow)?;
        Self::new(num, den)
    }

    pub fn checked_sub(&self, rhs: &Self) -> Result<Self, FoldError> {
        self.checked_add(&Self {
            num: -rhs.num,
            den: rhs.den,
        })
    }

    pub fn checked_mul(&self, rhs: &Self) -> Result<Self, FoldError> {
        let num = self.num.checked_mul(rhs.num).ok_or(FoldError::Overflow)?;
        let den = self.den.checked_mul(rhs.den).ok_or(FoldError::Overflow)?;
        Self::new(num, den)
    }

    pub fn checked_div(&self, rhs: &Self) -> Result<Self, FoldError> {
        if rhs.num == 0 {
            return Err(FoldError::DivisionByZero);
        }
        let num = self.num.checked_mul(rhs.den).ok_or(FoldError::Overflow)?;
        let den = self.den.checked_mul(rhs.num).ok_or(FoldError::Overflow)?;
        Self::new(num, den)
    }

    #[must_use]
    pub fn cmp_exact(&self, rhs: &Self) -> Option<std::cmp::Ordering> {
        let a = self.num.checked_mul(rhs.den)?;
        let b = rhs.num.checked_mul(self.den)?;
        Some(a.cmp(&b))
    }
}

/// A folded compile-time value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i128),
    Real(Rational),
    Bool(bool),
    Str(String),
}

impl Value {
    #[must_use]
    pub fn as_int(&self) -> Option<i128> {
        match self {
            Self::Int(v) => Some(*v),
            Self::Bool(b) => Some(*b as i128),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_rational(&self) -> Option<Rational> {
        match self {
            Self::Real(r) => Some(*r),
            Self::Int(v) => Some(Rational::from_int(*v)),
            _ => None,
        }
    }
}

/// Ada `mod`: result takes the sign of the divisor.
pub fn int_mod(a: i128, b: i128) -> Result<i128, FoldError> {
    if b == 0 {
        return Err(FoldError::DivisionByZero);
    }
    let r = a.checked_rem(b).ok_or(FoldError::Overflow)?;
    if r != 0 && (r < 0) != (b < 0) {
        Ok(r + b)
    } else {
        Ok(r)
    }
}

/// Ada `rem`: result takes the sign of the dividend.
pub fn int_rem(a: i128, b: i128) -> Result<i128, FoldError> {
    if b == 0 {
        return Err(FoldError::DivisionByZero);
    }
    a.checked_rem(b).ok_or(FoldError::Overflow)
}

pub fn int_pow(base: i128, exp: i128) -> Result<i128, FoldError> {
    if exp < 0 {
        return Err(FoldError::NotStatic);
    }
    let exp = u32::try_from(exp).map_err(|_| FoldError::Overflow)?;
    base.checked_pow(exp).ok_or(FoldError::Overflow)
}

pub fn real_pow(base: Rational, exp: i128) -> Result<Rational, FoldError> {
    if exp.unsigned_abs() > 4096 {
        return Err(FoldError::Overflow);
    }
    let mut out = Rational::from_int(1);
    let flipped = if exp < 0 {
        Rational::new(base.den, base.num)?
    } else {
        base
    };
    for _ in 0..exp.unsigned_abs() {
        out = out.checked_mul(&flipped)?;
    }
    Ok(out)
}

#[test]
fn test_rational_normalization() {
    let r = Rational::new(6, -4).unwrap();
    assert_eq!(-3, r.numerator());
    assert_eq!(2, r.denominator());
    assert!(r.is_negative());
    assert!(Rational::new(1, 0).is_err());
}

#[test]
fn test_rational_arithmetic_is_exact() {
    let tenth = Rational::new(1, 10).unwrap();
    let mut sum = Rational::ZERO;
    for _ in 0..10 {
        sum = sum.checked_add(&tenth).unwrap();
    }
    // 0.1 summed ten times is exactly one, which f64 famously misses.
    assert_eq!(Rational::from_int(1), sum);
}

#[test]
fn test_rational_from_f64() {
    assert_eq!(Rational::new(1, 4).unwrap(), Rational::from_f64(0.25).unwrap());
    assert_eq!(Rational::from_int(3), Rational::from_f64(3.0).unwrap());
    assert_eq!(
        Rational::new(-3, 2).unwrap(),
        Rational::from_f64(-1.5).unwrap()
    );
    assert!(Rational::from_f64(f64::INFINITY).is_err());
}

#[test]
fn test_int_mod_rem() {
    assert_eq!(2, int_mod(-10, 3).unwrap());
    assert_eq!(-1, int_rem(-10, 3).unwrap());
    assert_eq!(-2, int_mod(10, -3).unwrap());
    assert_eq!(1, int_rem(10, -3).unwrap());
    assert_eq!(FoldError::DivisionByZero, int_mod(1, 0).unwrap_err());
}

#[test]
fn test_int_pow() {
    assert_eq!(1024, int_pow(2, 10).unwrap());
    assert_eq!(FoldError::Overflow, int_pow(i128::MAX, 2).unwrap_err());
    assert_eq!(FoldError::NotStatic, int_pow(2, -1).unwrap_err());
}
