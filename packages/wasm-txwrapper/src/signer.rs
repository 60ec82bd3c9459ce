//! Transaction signing keys
//!
//! Sr25519 (schnorrkel, `substrate` signing context, randomized) and Ed25519
//! (deterministic). Keys are built from 32-byte seeds; the scheme is fixed by
//! the keypair.

use crate::builder::SigningPayload;
use crate::error::TxWrapperError;
use crate::value::Value;
use ed25519_dalek::{Signer as _, Verifier as _};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Signing context Substrate uses for sr25519
const SIGNING_CTX: &[u8] = b"substrate";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SignatureScheme {
    Ed25519,
    Sr25519,
    /// Recognized when decoding; not available for signing
    Ecdsa,
}

impl SignatureScheme {
    /// `MultiSignature` variant name
    pub fn variant_name(self) -> &'static str {
        match self {
            SignatureScheme::Ed25519 => "Ed25519",
            SignatureScheme::Sr25519 => "Sr25519",
            SignatureScheme::Ecdsa => "Ecdsa",
        }
    }

    pub fn from_variant_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "ed25519" => Some(SignatureScheme::Ed25519),
            "sr25519" => Some(SignatureScheme::Sr25519),
            "ecdsa" => Some(SignatureScheme::Ecdsa),
            _ => None,
        }
    }

    pub fn signature_len(self) -> usize {
        match self {
            SignatureScheme::Ed25519 | SignatureScheme::Sr25519 => 64,
            SignatureScheme::Ecdsa => 65,
        }
    }
}

/// A signature tagged with its scheme
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiSignature {
    pub scheme: SignatureScheme,
    #[serde(with = "crate::builder::hex_bytes")]
    pub bytes: Vec<u8>,
}

impl MultiSignature {
    pub fn new(scheme: SignatureScheme, bytes: Vec<u8>) -> Result<Self, TxWrapperError> {
        if bytes.len() != scheme.signature_len() {
            return Err(TxWrapperError::InvalidSignature(format!(
                "{} signature must be {} bytes, got {}",
                scheme.variant_name(),
                scheme.signature_len(),
                bytes.len()
            )));
        }
        Ok(MultiSignature { scheme, bytes })
    }

    /// Value for encoding through the runtime's signature type
    pub fn to_value(&self) -> Value {
        Value::variant(self.scheme.variant_name(), [Value::Bytes(self.bytes.clone())])
    }

    /// Read back from a decoded `MultiSignature` enum value
    pub fn from_value(value: &Value) -> Result<Self, TxWrapperError> {
        let Value::Variant(name, fields) = value else {
            return Err(TxWrapperError::InvalidSignature(format!(
                "expected signature variant, got {}",
                value.kind()
            )));
        };
        let scheme = SignatureScheme::from_variant_name(name)
            .ok_or_else(|| TxWrapperError::InvalidSignature(format!("unknown scheme {}", name)))?;
        let bytes = fields
            .values()
            .first()
            .and_then(|v| innermost_bytes(v))
            .ok_or_else(|| TxWrapperError::InvalidSignature("missing signature bytes".to_string()))?;
        MultiSignature::new(scheme, bytes.to_vec())
    }
}

/// Bytes inside newtype wrappers such as `sr25519::Signature([u8; 64])`
fn innermost_bytes(value: &Value) -> Option<&[u8]> {
    match value {
        Value::Bytes(bytes) => Some(bytes),
        Value::Composite(fields) if fields.len() == 1 => innermost_bytes(fields.values()[0]),
        _ => None,
    }
}

enum Secret {
    Ed25519(ed25519_dalek::SigningKey),
    Sr25519(schnorrkel::Keypair),
}

/// Signing keypair
pub struct KeyPair {
    secret: Secret,
}

impl KeyPair {
    /// Keypair from a 32-byte seed
    pub fn from_seed(scheme: SignatureScheme, seed: &[u8]) -> Result<Self, TxWrapperError> {
        let seed: [u8; 32] = seed.try_into().map_err(|_| {
            TxWrapperError::InvalidInput(format!("Seed must be 32 bytes, got {}", seed.len()))
        })?;
        let secret = match scheme {
            SignatureScheme::Ed25519 => Secret::Ed25519(ed25519_dalek::SigningKey::from_bytes(&seed)),
            SignatureScheme::Sr25519 => {
                let mini = schnorrkel::MiniSecretKey::from_bytes(&seed)
                    .map_err(|e| TxWrapperError::InvalidInput(format!("Invalid seed: {}", e)))?;
                Secret::Sr25519(mini.expand_to_keypair(schnorrkel::ExpansionMode::Ed25519))
            }
            SignatureScheme::Ecdsa => {
                return Err(TxWrapperError::InvalidInput(
                    "ecdsa signing is not supported".to_string(),
                ))
            }
        };
        Ok(KeyPair { secret })
    }

    pub fn scheme(&self) -> SignatureScheme {
        match self.secret {
            Secret::Ed25519(_) => SignatureScheme::Ed25519,
            Secret::Sr25519(_) => SignatureScheme::Sr25519,
        }
    }

    pub fn public_key(&self) -> [u8; 32] {
        match &self.secret {
            Secret::Ed25519(key) => key.verifying_key().to_bytes(),
            Secret::Sr25519(pair) => pair.public.to_bytes(),
        }
    }

    /// Sign `message` as-is
    pub fn sign(&self, message: &[u8]) -> MultiSignature {
        tracing::debug!(
            scheme = self.scheme().variant_name(),
            public_key = %hex::encode(self.public_key()),
            len = message.len(),
            "Signing message"
        );
        let bytes = match &self.secret {
            Secret::Ed25519(key) => key.sign(message).to_bytes().to_vec(),
            Secret::Sr25519(pair) => pair
                .sign(schnorrkel::signing_context(SIGNING_CTX).bytes(message))
                .to_bytes()
                .to_vec(),
        };
        MultiSignature {
            scheme: self.scheme(),
            bytes,
        }
    }

    /// Sign an extrinsic payload, hashing it first when it is long
    pub fn sign_payload(&self, payload: &SigningPayload) -> MultiSignature {
        self.sign(&payload.to_sign_bytes())
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("scheme", &self.scheme())
            .field("public_key", &hex::encode(self.public_key()))
            .finish()
    }
}

/// Check `signature` over `message` for `public_key`
///
/// Malformed keys or signatures verify as `false`.
pub fn verify(message: &[u8], signature: &MultiSignature, public_key: &[u8; 32]) -> bool {
    match signature.scheme {
        SignatureScheme::Ed25519 => {
            let Ok(bytes) = <[u8; 64]>::try_from(signature.bytes.as_slice()) else {
                return false;
            };
            let Ok(key) = ed25519_dalek::VerifyingKey::from_bytes(public_key) else {
                return false;
            };
            key.verify(message, &ed25519_dalek::Signature::from_bytes(&bytes))
                .is_ok()
        }
        SignatureScheme::Sr25519 => {
            let (Ok(key), Ok(sig)) = (
                schnorrkel::PublicKey::from_bytes(public_key),
                schnorrkel::Signature::from_bytes(&signature.bytes),
            ) else {
                return false;
            };
            key.verify_simple(SIGNING_CTX, message, &sig).is_ok()
        }
        SignatureScheme::Ecdsa => false,
    }
}

/// [`verify`] for an extrinsic payload
pub fn verify_payload(payload: &SigningPayload, signature: &MultiSignature, public_key: &[u8; 32]) -> bool {
    verify(&payload.to_sign_bytes(), signature, public_key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(SignatureScheme::Ed25519)]
    #[case(SignatureScheme::Sr25519)]
    fn test_sign_and_verify(#[case] scheme: SignatureScheme) {
        let keypair = KeyPair::from_seed(scheme, &[1u8; 32]).unwrap();
        let message = b"payload bytes";
        let signature = keypair.sign(message);
        assert_eq!(signature.scheme, scheme);
        assert_eq!(signature.bytes.len(), 64);
        assert!(verify(message, &signature, &keypair.public_key()));

        // Flip one payload byte
        let mut tampered = message.to_vec();
        tampered[0] ^= 0x01;
        assert!(!verify(&tampered, &signature, &keypair.public_key()));

        // Someone else's key
        let other = KeyPair::from_seed(scheme, &[2u8; 32]).unwrap();
        assert!(!verify(message, &signature, &other.public_key()));
    }

    #[test]
    fn test_deterministic_pubkey() {
        let a = KeyPair::from_seed(SignatureScheme::Sr25519, &[1u8; 32]).unwrap();
        let b = KeyPair::from_seed(SignatureScheme::Sr25519, &[1u8; 32]).unwrap();
        assert_eq!(a.public_key(), b.public_key());

        let ed = KeyPair::from_seed(SignatureScheme::Ed25519, &[1u8; 32]).unwrap();
        assert_ne!(a.public_key(), ed.public_key());
    }

    #[test]
    fn test_ed25519_is_deterministic() {
        let keypair = KeyPair::from_seed(SignatureScheme::Ed25519, &[3u8; 32]).unwrap();
        assert_eq!(keypair.sign(b"abc"), keypair.sign(b"abc"));
    }

    #[test]
    fn test_sr25519_is_randomized() {
        let keypair = KeyPair::from_seed(SignatureScheme::Sr25519, &[3u8; 32]).unwrap();
        let first = keypair.sign(b"abc");
        let second = keypair.sign(b"abc");
        assert_ne!(first.bytes, second.bytes);
        assert!(verify(b"abc", &second, &keypair.public_key()));
    }

    #[test]
    fn test_invalid_seed_length() {
        assert!(KeyPair::from_seed(SignatureScheme::Sr25519, &[0u8; 31]).is_err());
        assert!(KeyPair::from_seed(SignatureScheme::Ed25519, &[0u8; 33]).is_err());
        assert!(KeyPair::from_seed(SignatureScheme::Ecdsa, &[0u8; 32]).is_err());
    }

    #[test]
    fn test_debug_hides_secret() {
        let seed = [0xabu8; 32];
        let keypair = KeyPair::from_seed(SignatureScheme::Ed25519, &seed).unwrap();
        let debug = format!("{:?}", keypair);
        assert!(debug.contains("Ed25519"));
        assert!(debug.contains(&hex::encode(keypair.public_key())));
        assert!(!debug.contains(&hex::encode(seed)));
    }

    #[test]
    fn test_multisignature_value_roundtrip() {
        let signature = MultiSignature::new(SignatureScheme::Sr25519, vec![9u8; 64]).unwrap();
        assert_eq!(MultiSignature::from_value(&signature.to_value()).unwrap(), signature);

        // Signature newtype around the byte array, as V14 runtimes declare it
        let wrapped = Value::variant("Ed25519", [Value::unnamed([Value::Bytes(vec![1u8; 64])])]);
        assert_eq!(
            MultiSignature::from_value(&wrapped).unwrap().scheme,
            SignatureScheme::Ed25519
        );
        assert!(MultiSignature::new(SignatureScheme::Ecdsa, vec![0u8; 64]).is_err());
    }

    #[test]
    fn test_malformed_signature_does_not_verify() {
        let keypair = KeyPair::from_seed(SignatureScheme::Sr25519, &[1u8; 32]).unwrap();
        let bogus = MultiSignature {
            scheme: SignatureScheme::Sr25519,
            bytes: vec![0u8; 10],
        };
        assert!(!verify(b"abc", &bogus, &keypair.public_key()));
    }
}
