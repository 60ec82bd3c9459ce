//! Extrinsic construction
//!
//! Calls are encoded from named arguments against the registry's call
//! specs. Signing payloads and signed extrinsics follow the signed-extension
//! list the runtime declares.

mod extensions;
pub mod types;

pub use extensions::{DecodedExtra, DEFAULT_SIGNED_EXTENSIONS};
pub(crate) use extensions::decode_extra;
pub(crate) use types::hex_bytes;
pub use types::{SigningPayload, UnsignedExtrinsicPayload, MAX_UNHASHED_PAYLOAD};

use crate::codec::{self, encode_compact_to};
use crate::era::Era;
use crate::error::TxWrapperError;
use crate::metadata::{fold_name, CallSpec, Registry};
use crate::signer::{KeyPair, MultiSignature};
use crate::value::{Composite, Value};
use extensions::ExtensionValues;

/// Top bit of the version byte marks a signed extrinsic
pub const SIGNED_FLAG: u8 = 0x80;

/// Builds calls, signing payloads and extrinsics for one runtime
#[derive(Debug, Clone, Copy)]
pub struct ExtrinsicBuilder<'r> {
    registry: &'r Registry,
}

impl<'r> ExtrinsicBuilder<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        ExtrinsicBuilder { registry }
    }

    pub fn registry(&self) -> &'r Registry {
        self.registry
    }

    /// Encode `module_index ++ call_index ++ params`
    ///
    /// `args` is a named composite (or JSON object); names match ignoring
    /// case and underscores. Missing or extra arguments are rejected.
    pub fn build_unsigned_call(&self, spec: &CallSpec, args: &Value) -> Result<Vec<u8>, TxWrapperError> {
        let call = format!("{}.{}", spec.module, spec.name);
        let provided: Vec<(&str, &Value)> = match args {
            Value::Composite(Composite::Named(fields)) => {
                fields.iter().map(|(n, v)| (n.as_str(), v)).collect()
            }
            Value::Composite(Composite::Unnamed(values)) if values.is_empty() => Vec::new(),
            Value::Option(None) => Vec::new(),
            other => {
                return Err(TxWrapperError::ArgumentMismatch(format!(
                    "{} expects named arguments, got {}",
                    call,
                    other.kind()
                )))
            }
        };

        let mut used = vec![false; provided.len()];
        let mut out = vec![spec.module_index, spec.call_index];
        for param in &spec.params {
            let folded = fold_name(&param.name);
            let position = provided
                .iter()
                .position(|(name, _)| fold_name(name) == folded)
                .ok_or_else(|| {
                    TxWrapperError::ArgumentMismatch(format!(
                        "{} missing argument {}",
                        call, param.name
                    ))
                })?;
            used[position] = true;
            codec::encode_as(provided[position].1, &param.ty, self.registry, &mut out)?;
        }

        if let Some(extra) = used.iter().position(|u| !u) {
            return Err(TxWrapperError::ArgumentMismatch(format!(
                "{} has no argument {}",
                call, provided[extra].0
            )));
        }

        tracing::debug!(call = %call, len = out.len(), "Built call");
        Ok(out)
    }

    /// [`build_unsigned_call`](Self::build_unsigned_call) by module and call name
    pub fn build_call(&self, module: &str, call: &str, args: &Value) -> Result<Vec<u8>, TxWrapperError> {
        let spec = self.registry.resolve_call(module, call)?;
        self.build_unsigned_call(spec, args)
    }

    /// Unsigned extrinsic: `compact(len) ++ version ++ call`
    pub fn build_unsigned_extrinsic(&self, call: &[u8]) -> Vec<u8> {
        let mut body = Vec::with_capacity(call.len() + 1);
        body.push(self.registry.extrinsic().version & !SIGNED_FLAG);
        body.extend_from_slice(call);
        with_length_prefix(body)
    }

    /// `call ++ extra ++ additional signed`
    pub fn build_signing_payload(
        &self,
        payload: &UnsignedExtrinsicPayload,
    ) -> Result<SigningPayload, TxWrapperError> {
        payload.era.validate()?;
        let checkpoint = match (&payload.era, payload.block_hash) {
            (Era::Immortal, _) => payload.genesis_hash,
            (Era::Mortal { .. }, Some(block_hash)) => block_hash,
            (Era::Mortal { .. }, None) => {
                return Err(TxWrapperError::MissingField("blockHash".to_string()))
            }
        };
        let values = ExtensionValues {
            era: payload.era,
            nonce: payload.nonce,
            tip: payload.tip,
            spec_version: payload.spec_version,
            transaction_version: payload.transaction_version,
            genesis_hash: payload.genesis_hash,
            checkpoint,
        };

        let mut bytes = payload.method.clone();
        extensions::encode_extra(self.registry, &values.era, values.nonce, values.tip, &mut bytes)?;
        extensions::encode_additional(self.registry, &values, &mut bytes)?;

        tracing::debug!(
            len = bytes.len(),
            spec_version = payload.spec_version,
            nonce = payload.nonce,
            "Built signing payload"
        );
        Ok(SigningPayload::new(bytes))
    }

    /// Signed extrinsic:
    /// `compact(len) ++ (0x80 | version) ++ address ++ signature ++ extra ++ call`
    pub fn assemble_signed(
        &self,
        call: &[u8],
        signer: &[u8; 32],
        signature: &MultiSignature,
        era: &Era,
        nonce: u64,
        tip: u128,
    ) -> Result<Vec<u8>, TxWrapperError> {
        era.validate()?;
        let info = self.registry.extrinsic();
        let mut body = vec![SIGNED_FLAG | info.version];
        codec::encode_as(&Value::account(*signer), &info.address_ty, self.registry, &mut body)?;
        codec::encode_as(&signature.to_value(), &info.signature_ty, self.registry, &mut body)?;
        extensions::encode_extra(self.registry, era, nonce, tip, &mut body)?;
        body.extend_from_slice(call);
        Ok(with_length_prefix(body))
    }

    /// Build the signing payload, sign it and assemble the signed extrinsic
    pub fn sign(
        &self,
        payload: &UnsignedExtrinsicPayload,
        keypair: &KeyPair,
    ) -> Result<Vec<u8>, TxWrapperError> {
        let signing_payload = self.build_signing_payload(payload)?;
        let signature = keypair.sign_payload(&signing_payload);
        self.assemble_signed(
            &payload.method,
            &keypair.public_key(),
            &signature,
            &payload.era,
            payload.nonce,
            payload.tip,
        )
    }
}

fn with_length_prefix(body: Vec<u8>) -> Vec<u8> {
    let mut out = Vec::with_capacity(body.len() + 5);
    encode_compact_to(body.len() as u128, &mut out);
    out.extend_from_slice(&body);
    out
}
