//! Fixed-point helpers shared by every price computation.
//!
//! Scaling, addition and multiplication are exact. Quotients are the only
//! place where digits get dropped: every division goes through [`safe_div`]
//! which rounds the exact quotient once to [`DIVISION_PRECISION`] significant
//! digits using half-even rounding, so replaying the same events always yields
//! the same decimals.

use {
    bigdecimal::{BigDecimal, RoundingMode},
    num::{BigInt, BigUint, Integer, One, Zero, bigint::Sign},
    std::num::NonZeroU64,
};

const PRECISION_DIGITS: u32 = 34;

/// Significant digits kept by a division.
pub const DIVISION_PRECISION: NonZeroU64 = match NonZeroU64::new(PRECISION_DIGITS as u64) {
    Some(precision) => precision,
    None => unreachable!(),
};

/// Scales a raw token amount by `10^-decimals`.
pub fn to_decimal(amount: BigInt, decimals: u8) -> BigDecimal {
    BigDecimal::new(amount, i64::from(decimals))
}

/// `10^exponent`, exact.
pub fn exponent_to_big_decimal(exponent: u8) -> BigDecimal {
    BigDecimal::new(BigInt::one(), -i64::from(exponent))
}

/// Divides `numerator` by `denominator`, returning zero instead of failing
/// when the denominator is zero. The quotient is rounded once, without
/// trailing zeros.
pub fn safe_div(numerator: &BigDecimal, denominator: &BigDecimal) -> BigDecimal {
    if denominator.is_zero() || numerator.is_zero() {
        return BigDecimal::zero();
    }
    let (numerator, numerator_scale) = numerator.as_bigint_and_exponent();
    let (denominator, denominator_scale) = denominator.as_bigint_and_exponent();
    let sign = if numerator.sign() == denominator.sign() {
        Sign::Plus
    } else {
        Sign::Minus
    };

    // Shift the numerator so the integer quotient has more digits than the
    // precision.
    let shift = (PRECISION_DIGITS + 1 + decimal_digits(denominator.magnitude()))
        .saturating_sub(decimal_digits(numerator.magnitude()));
    let shifted = numerator.magnitude() * BigUint::from(10_u8).pow(shift);
    let (quotient, remainder) = shifted.div_rem(denominator.magnitude());
    // An extra non-zero digit stands in for a non-zero remainder, so only
    // exact ties round as ties.
    let sticky = u8::from(!remainder.is_zero());
    let digits = BigInt::from_biguint(sign, quotient * 10_u8 + sticky);

    let quotient = BigDecimal::new(
        digits,
        numerator_scale - denominator_scale + i64::from(shift) + 1,
    )
    .with_precision_round(DIVISION_PRECISION, RoundingMode::HalfEven)
    .normalized();
    // Integral quotients keep their zeros so they print without an exponent.
    if quotient.as_bigint_and_exponent().1 < 0 {
        quotient.with_scale(0)
    } else {
        quotient
    }
}

fn decimal_digits(value: &BigUint) -> u32 {
    u32::try_from(value.to_str_radix(10).len()).unwrap_or(u32::MAX)
}

/// Exact integer exponentiation by squaring.
pub fn pow(base: &BigDecimal, exponent: u32) -> BigDecimal {
    let mut result = BigDecimal::one();
    let mut base = base.clone();
    let mut exponent = exponent;
    while exponent > 0 {
        if exponent & 1 == 1 {
            result = &result * &base;
        }
        exponent >>= 1;
        if exponent > 0 {
            base = &base * &base;
        }
    }
    result
}
