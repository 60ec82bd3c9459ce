//! Extrinsic decoding
//!
//! Turns extrinsic bytes back into named values using the registry: the
//! envelope comes from [`Transaction`], the call is decoded parameter by
//! parameter against its [`CallSpec`](crate::metadata::CallSpec).

use crate::codec::{self, Input};
use crate::era::Era;
use crate::error::TxWrapperError;
use crate::metadata::Registry;
use crate::signer::MultiSignature;
use crate::transaction::Transaction;
use crate::types::DecodeOptions;
use crate::value::{RenderOptions, Value};
use serde::{Serialize, Serializer};
use serde_json::{json, Map, Value as JsonValue};

/// A decoded call with arguments in declared order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedCall {
    pub module: String,
    pub call: String,
    pub module_index: u8,
    pub call_index: u8,
    pub args: Vec<(String, Value)>,
}

impl DecodedCall {
    pub fn arg(&self, name: &str) -> Option<&Value> {
        self.args.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn to_json(&self, options: &RenderOptions) -> JsonValue {
        let args: Map<String, JsonValue> = self
            .args
            .iter()
            .map(|(name, value)| (name.clone(), value.to_json(options)))
            .collect();
        json!({
            "module": self.module,
            "call": self.call,
            "moduleIndex": self.module_index,
            "callIndex": self.call_index,
            "args": args,
        })
    }
}

/// Signer and signed extras of a decoded extrinsic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedSignature {
    pub address: Value,
    /// Account behind the address, when it is one
    pub signer: Option<[u8; 32]>,
    pub signature: MultiSignature,
    pub era: Era,
    pub nonce: u64,
    pub tip: u128,
    /// Data-carrying extensions beyond era, nonce and tip
    pub extra: Vec<(String, Value)>,
}

impl DecodedSignature {
    pub fn to_json(&self, options: &RenderOptions) -> JsonValue {
        let extra: Map<String, JsonValue> = self
            .extra
            .iter()
            .map(|(name, value)| (name.clone(), value.to_json(options)))
            .collect();
        let signer = self
            .signer
            .map(|pk| Value::account(pk).to_json(options))
            .unwrap_or(JsonValue::Null);
        json!({
            "signer": signer,
            "address": self.address.to_json(options),
            "scheme": self.signature.scheme,
            "signature": format!("0x{}", hex::encode(&self.signature.bytes)),
            "era": self.era,
            "nonce": Value::UInt(self.nonce as u128).to_json(options),
            "tip": Value::UInt(self.tip).to_json(options),
            "extra": extra,
        })
    }
}

/// A fully decoded extrinsic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedExtrinsic {
    pub version: u8,
    /// Blake2-256 of the encoded extrinsic
    pub hash: [u8; 32],
    pub signature: Option<DecodedSignature>,
    pub call: DecodedCall,
    /// How integers and accounts render in [`to_json`](Self::to_json)
    pub render: RenderOptions,
}

impl DecodedExtrinsic {
    pub fn is_signed(&self) -> bool {
        self.signature.is_some()
    }

    pub fn to_json(&self) -> JsonValue {
        json!({
            "hash": format!("0x{}", hex::encode(self.hash)),
            "version": self.version,
            "isSigned": self.is_signed(),
            "signature": self
                .signature
                .as_ref()
                .map(|s| s.to_json(&self.render))
                .unwrap_or(JsonValue::Null),
            "method": self.call.to_json(&self.render),
        })
    }
}

impl Serialize for DecodedExtrinsic {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

/// Decode an encoded call (`module_index ++ call_index ++ args`)
///
/// All bytes must be consumed.
pub fn decode_call(call_data: &[u8], registry: &Registry) -> Result<DecodedCall, TxWrapperError> {
    let mut input = Input::new(call_data);
    let module_index = input.read_byte()?;
    let call_index = input.read_byte()?;
    let spec = registry.call_by_index(module_index, call_index)?;

    let mut args = Vec::with_capacity(spec.params.len());
    for param in &spec.params {
        let value = codec::decode_as(&mut input, &param.ty, registry)?;
        args.push((param.name.clone(), value));
    }

    if !input.is_empty() {
        return Err(TxWrapperError::InvalidTransaction(format!(
            "{} trailing bytes after {}.{}",
            input.remaining(),
            spec.module,
            spec.name
        )));
    }

    Ok(DecodedCall {
        module: spec.module.clone(),
        call: spec.name.clone(),
        module_index,
        call_index,
        args,
    })
}

/// Decode a signed or unsigned extrinsic
pub fn decode_extrinsic(
    bytes: &[u8],
    registry: &Registry,
    options: &DecodeOptions,
) -> Result<DecodedExtrinsic, TxWrapperError> {
    let tx = Transaction::from_bytes(bytes, registry)?;
    let call = decode_call(tx.call_data(), registry)?;

    let signature = tx.signed_parts().map(|parts| DecodedSignature {
        address: parts.address.clone(),
        signer: parts.address.as_account_id(),
        signature: parts.signature.clone(),
        era: parts.extra.era,
        nonce: parts.extra.nonce,
        tip: parts.extra.tip,
        extra: parts.extra.other.clone(),
    });

    tracing::debug!(
        call = %format!("{}.{}", call.module, call.call),
        signed = signature.is_some(),
        "Decoded extrinsic"
    );

    Ok(DecodedExtrinsic {
        version: tx.version(),
        hash: tx.hash(),
        signature,
        call,
        render: options.render_options(registry),
    })
}
