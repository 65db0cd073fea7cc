//! Arbitrary precision numbers for on-chain amounts: conversions between the
//! fixed width EVM integer types and `num`/`bigdecimal`, the fixed-point
//! helpers used for price math and serde adapters for big integers.

pub mod conversions;
pub mod decimal;
pub mod serialization;
