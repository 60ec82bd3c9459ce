//! Payload types for extrinsic construction
//!
//! Field names follow the txwrapper convention the JS side already uses
//! (`method`, `specVersion`, `genesisHash`...). Hashes and call bytes travel
//! as `0x` hex strings, amounts as numbers or decimal strings.

use crate::era::Era;
use crate::transaction::blake2_256;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// Payloads longer than this are signed through their blake2-256 hash
pub const MAX_UNHASHED_PAYLOAD: usize = 256;

/// Deserialize u128 from either a number or string
fn deserialize_u128<'de, D>(deserializer: D) -> Result<u128, D::Error>
where
    D: Deserializer<'de>,
{
    struct U128Visitor;

    impl<'de> de::Visitor<'de> for U128Visitor {
        type Value = u128;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            formatter.write_str("a u128 as number or string")
        }

        fn visit_u64<E>(self, value: u64) -> Result<u128, E>
        where
            E: de::Error,
        {
            Ok(value as u128)
        }

        fn visit_u128<E>(self, value: u128) -> Result<u128, E>
        where
            E: de::Error,
        {
            Ok(value)
        }

        fn visit_i64<E>(self, value: i64) -> Result<u128, E>
        where
            E: de::Error,
        {
            if value >= 0 {
                Ok(value as u128)
            } else {
                Err(E::custom("negative values not allowed"))
            }
        }

        fn visit_str<E>(self, value: &str) -> Result<u128, E>
        where
            E: de::Error,
        {
            value.parse().map_err(E::custom)
        }
    }

    deserializer.deserialize_any(U128Visitor)
}

fn serialize_u128<S: Serializer>(value: &u128, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&value.to_string())
}

fn parse_hex<E: de::Error>(s: &str) -> Result<Vec<u8>, E> {
    hex::decode(s.strip_prefix("0x").unwrap_or(s)).map_err(E::custom)
}

pub(crate) mod hex_bytes {
    use super::*;

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("0x{}", hex::encode(bytes)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        parse_hex(&s)
    }
}

pub(crate) mod hex_hash {
    use super::*;

    pub fn serialize<S: Serializer>(hash: &[u8; 32], serializer: S) -> Result<S::Ok, S::Error> {
        super::hex_bytes::serialize(hash, serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<[u8; 32], D::Error> {
        let s = String::deserialize(deserializer)?;
        let bytes = parse_hex::<D::Error>(&s)?;
        bytes.try_into().map_err(|b: Vec<u8>| {
            de::Error::custom(format!("Hash must be 32 bytes, got {}", b.len()))
        })
    }
}

pub(crate) mod hex_hash_opt {
    use super::*;

    pub fn serialize<S: Serializer>(
        hash: &Option<[u8; 32]>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match hash {
            Some(hash) => super::hex_hash::serialize(hash, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<[u8; 32]>, D::Error> {
        #[derive(Deserialize)]
        struct Wrapper(#[serde(with = "super::hex_hash")] [u8; 32]);

        Ok(Option::<Wrapper>::deserialize(deserializer)?.map(|Wrapper(hash)| hash))
    }
}

/// Everything needed to derive a signing payload
///
/// All fields are mandatory. `block_hash` is the era's reference block and
/// must be present for mortal eras; immortal eras check against genesis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnsignedExtrinsicPayload {
    /// SCALE-encoded call
    #[serde(with = "hex_bytes")]
    pub method: Vec<u8>,
    pub era: Era,
    pub nonce: u64,
    #[serde(
        deserialize_with = "deserialize_u128",
        serialize_with = "serialize_u128"
    )]
    pub tip: u128,
    pub spec_version: u32,
    pub transaction_version: u32,
    #[serde(with = "hex_hash")]
    pub genesis_hash: [u8; 32],
    #[serde(default, with = "hex_hash_opt")]
    pub block_hash: Option<[u8; 32]>,
}

/// Bytes a signer commits to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningPayload {
    bytes: Vec<u8>,
}

impl SigningPayload {
    pub(crate) fn new(bytes: Vec<u8>) -> Self {
        SigningPayload { bytes }
    }

    /// call ++ extra ++ additional, before any hashing
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The message actually passed to the signature scheme
    pub fn to_sign_bytes(&self) -> Vec<u8> {
        if self.bytes.len() > MAX_UNHASHED_PAYLOAD {
            blake2_256(&self.bytes).to_vec()
        } else {
            self.bytes.clone()
        }
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(&self.bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_payload_from_json() {
        let payload: UnsignedExtrinsicPayload = serde_json::from_value(json!({
            "method": "0x0500",
            "era": { "mortal": { "period": 64, "phase": 10 } },
            "nonce": 3,
            "tip": "340282366920938463463374607431768211455",
            "specVersion": 9,
            "transactionVersion": 1,
            "genesisHash": format!("0x{}", "11".repeat(32)),
            "blockHash": format!("0x{}", "22".repeat(32))
        }))
        .unwrap();
        assert_eq!(payload.method, vec![5, 0]);
        assert_eq!(payload.tip, u128::MAX);
        assert_eq!(payload.genesis_hash, [0x11; 32]);
        assert_eq!(payload.block_hash, Some([0x22; 32]));
        assert_eq!(payload.era, Era::Mortal { period: 64, phase: 10 });
    }

    #[test]
    fn test_payload_fields_are_mandatory() {
        let err = serde_json::from_value::<UnsignedExtrinsicPayload>(json!({
            "method": "0x0500",
            "era": "immortal",
            "tip": 0,
            "specVersion": 9,
            "transactionVersion": 1,
            "genesisHash": format!("0x{}", "11".repeat(32))
        }))
        .unwrap_err();
        assert!(err.to_string().contains("missing field `nonce`"));
    }

    #[test]
    fn test_short_hash_rejected() {
        let result = serde_json::from_value::<UnsignedExtrinsicPayload>(json!({
            "method": "0x",
            "era": "immortal",
            "nonce": 0,
            "tip": 0,
            "specVersion": 9,
            "transactionVersion": 1,
            "genesisHash": "0x1234"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_long_payload_is_hashed() {
        let short = SigningPayload::new(vec![7u8; MAX_UNHASHED_PAYLOAD]);
        assert_eq!(short.to_sign_bytes().len(), MAX_UNHASHED_PAYLOAD);

        let long = SigningPayload::new(vec![7u8; MAX_UNHASHED_PAYLOAD + 1]);
        assert_eq!(long.to_sign_bytes(), blake2_256(long.as_bytes()).to_vec());
    }
}
