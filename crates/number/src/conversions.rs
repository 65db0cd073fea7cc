use {
    alloy_primitives::{I256, Uint},
    bigdecimal::BigDecimal,
    num::{BigInt, BigUint, bigint::Sign},
};

pub fn uint_to_big_uint<const BITS: usize, const LIMBS: usize>(
    input: &Uint<BITS, LIMBS>,
) -> BigUint {
    BigUint::from_bytes_be(&input.to_be_bytes_vec())
}

pub fn uint_to_big_int<const BITS: usize, const LIMBS: usize>(input: &Uint<BITS, LIMBS>) -> BigInt {
    BigInt::from_biguint(Sign::Plus, uint_to_big_uint(input))
}

pub fn uint_to_big_decimal<const BITS: usize, const LIMBS: usize>(
    input: &Uint<BITS, LIMBS>,
) -> BigDecimal {
    BigDecimal::from(uint_to_big_int(input))
}

/// Two's complement `I256` to a sign-magnitude `BigInt`.
pub fn i256_to_big_int(input: &I256) -> BigInt {
    let (sign, abs) = input.into_sign_and_abs();
    let sign = if sign.is_negative() {
        Sign::Minus
    } else {
        Sign::Plus
    };
    BigInt::from_biguint(sign, uint_to_big_uint(&abs))
}
