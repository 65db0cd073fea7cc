use {
    alloy_primitives::{I256, Uint},
    serde::{Deserialize, Deserializer, Serializer, de},
    serde_with::{DeserializeAs, SerializeAs},
    std::borrow::Cow,
};

/// Serialize big integers as a decimal string and deserialize them from a
/// decimal or a hex string prefixed with 0x.
pub struct HexOrDecimal;

impl<const BITS: usize, const LIMBS: usize> SerializeAs<Uint<BITS, LIMBS>> for HexOrDecimal {
    fn serialize_as<S>(source: &Uint<BITS, LIMBS>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(source)
    }
}

impl<'de, const BITS: usize, const LIMBS: usize> DeserializeAs<'de, Uint<BITS, LIMBS>>
    for HexOrDecimal
{
    fn deserialize_as<D>(deserializer: D) -> Result<Uint<BITS, LIMBS>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = Cow::<str>::deserialize(deserializer)?;
        let s = s.trim();
        match s.strip_prefix("0x") {
            Some(hex) => Uint::from_str_radix(hex, 16).map_err(|err| {
                de::Error::custom(format!("failed to decode {s:?} as hex uint{BITS}: {err}"))
            }),
            None => Uint::from_str_radix(s, 10).map_err(|err| {
                de::Error::custom(format!("failed to decode {s:?} as decimal uint{BITS}: {err}"))
            }),
        }
    }
}

impl SerializeAs<I256> for HexOrDecimal {
    fn serialize_as<S>(source: &I256, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(source)
    }
}

impl<'de> DeserializeAs<'de, I256> for HexOrDecimal {
    fn deserialize_as<D>(deserializer: D) -> Result<I256, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = Cow::<str>::deserialize(deserializer)?;
        let s = s.trim();
        let is_hex = s.trim_start_matches('-').starts_with("0x");
        let parsed = if is_hex {
            I256::from_hex_str(s)
        } else {
            I256::from_dec_str(s)
        };
        parsed.map_err(|err| de::Error::custom(format!("failed to decode {s:?} as int256: {err}")))
    }
}
