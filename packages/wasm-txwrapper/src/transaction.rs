//! Raw extrinsic wrapper
//!
//! Splits an extrinsic into its envelope (version, signer, signature,
//! signed extras) and the still-encoded call. Decoding the call itself is
//! the parser's job.

use crate::address::encode_ss58;
use crate::builder::{decode_extra, DecodedExtra, ExtrinsicBuilder, SIGNED_FLAG};
use crate::codec::{self, Input};
use crate::era::Era;
use crate::error::TxWrapperError;
use crate::metadata::Registry;
use crate::signer::MultiSignature;
use crate::value::Value;
use blake2::{digest::consts::U32, Blake2b, Digest};

/// Signer, signature and extras of a signed extrinsic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedParts {
    /// Address exactly as decoded through the runtime's address type
    pub address: Value,
    pub signature: MultiSignature,
    pub extra: DecodedExtra,
}

/// A length-prefixed extrinsic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    raw_bytes: Vec<u8>,
    version: u8,
    signed: Option<SignedParts>,
    call_data: Vec<u8>,
}

impl Transaction {
    /// Split raw extrinsic bytes using the runtime's extrinsic layout
    pub fn from_bytes(bytes: &[u8], registry: &Registry) -> Result<Self, TxWrapperError> {
        if bytes.is_empty() {
            return Err(TxWrapperError::InvalidTransaction(
                "Empty transaction".to_string(),
            ));
        }

        let mut input = Input::new(bytes);
        let length = input.read_compact()?;
        if length != input.remaining() as u128 {
            return Err(TxWrapperError::InvalidTransaction(format!(
                "Length prefix {} does not match {} body bytes",
                length,
                input.remaining()
            )));
        }

        let version_byte = input.read_byte()?;
        let version = version_byte & !SIGNED_FLAG;
        let info = registry.extrinsic();
        if version != info.version {
            return Err(TxWrapperError::InvalidTransaction(format!(
                "Unsupported extrinsic version {}, runtime uses {}",
                version, info.version
            )));
        }

        let signed = if version_byte & SIGNED_FLAG != 0 {
            let address = codec::decode_as(&mut input, &info.address_ty, registry)?;
            let signature = codec::decode_as(&mut input, &info.signature_ty, registry)?;
            let signature = MultiSignature::from_value(&signature)?;
            let extra = decode_extra(registry, &mut input)?;
            Some(SignedParts {
                address,
                signature,
                extra,
            })
        } else {
            None
        };

        // Module and call index at minimum
        if input.remaining() < 2 {
            return Err(TxWrapperError::InvalidTransaction(
                "Missing call data".to_string(),
            ));
        }

        Ok(Transaction {
            raw_bytes: bytes.to_vec(),
            version,
            signed,
            call_data: input.rest().to_vec(),
        })
    }

    /// [`from_bytes`](Self::from_bytes) for a `0x`-hex string
    pub fn from_hex(hex_str: &str, registry: &Registry) -> Result<Self, TxWrapperError> {
        let bytes = hex::decode(hex_str.strip_prefix("0x").unwrap_or(hex_str))?;
        Transaction::from_bytes(&bytes, registry)
    }

    /// Attach a signature to an unsigned extrinsic
    pub fn add_signature(
        &self,
        registry: &Registry,
        signer: &[u8; 32],
        signature: &MultiSignature,
        era: &Era,
        nonce: u64,
        tip: u128,
    ) -> Result<Self, TxWrapperError> {
        if self.is_signed() {
            return Err(TxWrapperError::InvalidTransaction(
                "Transaction is already signed".to_string(),
            ));
        }
        let bytes = ExtrinsicBuilder::new(registry).assemble_signed(
            &self.call_data,
            signer,
            signature,
            era,
            nonce,
            tip,
        )?;
        Transaction::from_bytes(&bytes, registry)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.raw_bytes.clone()
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(&self.raw_bytes))
    }

    /// Blake2-256 of the full encoded extrinsic, length prefix included
    pub fn hash(&self) -> [u8; 32] {
        blake2_256(&self.raw_bytes)
    }

    /// Transaction id (hash as hex), only for signed extrinsics
    pub fn id(&self) -> Option<String> {
        self.is_signed()
            .then(|| format!("0x{}", hex::encode(self.hash())))
    }

    pub fn version(&self) -> u8 {
        self.version
    }

    pub fn is_signed(&self) -> bool {
        self.signed.is_some()
    }

    pub fn signed_parts(&self) -> Option<&SignedParts> {
        self.signed.as_ref()
    }

    /// Signer account, when the address is an account id
    pub fn signer(&self) -> Option<[u8; 32]> {
        self.signed.as_ref().and_then(|s| s.address.as_account_id())
    }

    /// Signer address (SS58 encoded)
    pub fn sender(&self, prefix: u16) -> Option<String> {
        self.signer().and_then(|pk| encode_ss58(&pk, prefix).ok())
    }

    pub fn signature(&self) -> Option<&MultiSignature> {
        self.signed.as_ref().map(|s| &s.signature)
    }

    /// Immortal for unsigned extrinsics
    pub fn era(&self) -> Era {
        self.signed.as_ref().map_or(Era::Immortal, |s| s.extra.era)
    }

    pub fn nonce(&self) -> u64 {
        self.signed.as_ref().map_or(0, |s| s.extra.nonce)
    }

    pub fn tip(&self) -> u128 {
        self.signed.as_ref().map_or(0, |s| s.extra.tip)
    }

    /// Encoded call: module index, call index, arguments
    pub fn call_data(&self) -> &[u8] {
        &self.call_data
    }
}

/// Blake2-256 hash
pub fn blake2_256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Blake2b::<U32>::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&result);
    hash
}
