//! WASM bindings for Transaction
//!
//! Thin wrapper around core Transaction with #[wasm_bindgen]

use crate::era::Era;
use crate::signer::{MultiSignature, SignatureScheme};
use crate::transaction::Transaction;
use crate::wasm::{bigint_to_u128, from_js, to_js, WasmRegistry};
use crate::TxWrapperError;
use wasm_bindgen::prelude::*;

/// WASM-exposed transaction wrapper
#[wasm_bindgen]
pub struct WasmTransaction {
    inner: Transaction,
    /// Chain prefix of the registry the bytes were parsed with
    ss58_prefix: u16,
}

#[wasm_bindgen]
impl WasmTransaction {
    /// Split raw extrinsic bytes using the registry's extrinsic layout
    #[wasm_bindgen(constructor)]
    pub fn new(bytes: &[u8], registry: &WasmRegistry) -> Result<WasmTransaction, JsValue> {
        let inner = Transaction::from_bytes(bytes, registry.inner())?;
        Ok(WasmTransaction::from_inner(inner, registry.inner().ss58_prefix()))
    }

    /// Create from hex string
    #[wasm_bindgen(js_name = fromHex)]
    pub fn from_hex(hex: &str, registry: &WasmRegistry) -> Result<WasmTransaction, JsValue> {
        let inner = Transaction::from_hex(hex, registry.inner())?;
        Ok(WasmTransaction::from_inner(inner, registry.inner().ss58_prefix()))
    }

    /// Get the transaction ID (hash) if signed
    #[wasm_bindgen(getter)]
    pub fn id(&self) -> Option<String> {
        self.inner.id()
    }

    /// Blake2-256 of the encoded extrinsic
    #[wasm_bindgen(getter)]
    pub fn hash(&self) -> String {
        format!("0x{}", hex::encode(self.inner.hash()))
    }

    /// Get sender address (SS58 encoded)
    ///
    /// # Arguments
    /// * `prefix` - SS58 address prefix; the registry's chain prefix when omitted
    #[wasm_bindgen]
    pub fn sender(&self, prefix: Option<u16>) -> Option<String> {
        self.inner.sender(prefix.unwrap_or(self.ss58_prefix))
    }

    /// Get account nonce
    #[wasm_bindgen(getter)]
    pub fn nonce(&self) -> u64 {
        self.inner.nonce()
    }

    /// Get tip amount as BigInt
    #[wasm_bindgen(getter)]
    pub fn tip(&self) -> js_sys::BigInt {
        js_sys::BigInt::from(self.inner.tip())
    }

    /// Check if transaction is signed
    #[wasm_bindgen(getter, js_name = isSigned)]
    pub fn is_signed(&self) -> bool {
        self.inner.is_signed()
    }

    /// Get the call data
    #[wasm_bindgen(js_name = callData)]
    pub fn call_data(&self) -> Vec<u8> {
        self.inner.call_data().to_vec()
    }

    /// Get call data as hex string
    #[wasm_bindgen(js_name = callDataHex)]
    pub fn call_data_hex(&self) -> String {
        format!("0x{}", hex::encode(self.inner.call_data()))
    }

    /// Signature as `{ scheme, bytes }`, or undefined when unsigned
    #[wasm_bindgen(getter)]
    pub fn signature(&self) -> Result<JsValue, JsValue> {
        match self.inner.signature() {
            Some(signature) => to_js(signature),
            None => Ok(JsValue::UNDEFINED),
        }
    }

    /// Get era as `"immortal"` or `{ mortal: { period, phase } }`
    #[wasm_bindgen(getter)]
    pub fn era(&self) -> Result<JsValue, JsValue> {
        to_js(&self.inner.era())
    }

    /// Attach a signature to an unsigned transaction
    ///
    /// # Arguments
    /// * `signer` - 32-byte public key
    /// * `scheme` - "sr25519", "ed25519" or "ecdsa"
    /// * `signature` - Signature bytes
    /// * `era` - Era the signature committed to
    #[wasm_bindgen(js_name = addSignature)]
    #[allow(clippy::too_many_arguments)]
    pub fn add_signature(
        &mut self,
        registry: &WasmRegistry,
        signer: &[u8],
        scheme: &str,
        signature: &[u8],
        era: JsValue,
        nonce: u64,
        tip: js_sys::BigInt,
    ) -> Result<(), JsValue> {
        let signer: [u8; 32] = signer.try_into().map_err(|_| {
            TxWrapperError::InvalidSignature(format!(
                "Public key must be 32 bytes, got {}",
                signer.len()
            ))
        })?;
        let scheme = SignatureScheme::from_variant_name(scheme)
            .ok_or_else(|| TxWrapperError::InvalidSignature(format!("unknown scheme {}", scheme)))?;
        let signature = MultiSignature::new(scheme, signature.to_vec())?;
        let era: Era = from_js(era, "era")?;
        let tip = bigint_to_u128(&tip, "Tip")?;

        self.inner = self
            .inner
            .add_signature(registry.inner(), &signer, &signature, &era, nonce, tip)?;
        Ok(())
    }

    /// Serialize to bytes
    #[wasm_bindgen(js_name = toBytes)]
    pub fn to_bytes(&self) -> Vec<u8> {
        self.inner.to_bytes()
    }

    /// Serialize to hex string
    #[wasm_bindgen(js_name = toHex)]
    pub fn to_hex(&self) -> String {
        self.inner.to_hex()
    }
}

// Non-WASM methods for internal use
impl WasmTransaction {
    pub fn from_inner(inner: Transaction, ss58_prefix: u16) -> Self {
        WasmTransaction { inner, ss58_prefix }
    }

    pub fn ss58_prefix(&self) -> u16 {
        self.ss58_prefix
    }

    pub fn inner(&self) -> &Transaction {
        &self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::encode_ss58;
    use crate::builder::{ExtrinsicBuilder, UnsignedExtrinsicPayload};
    use crate::metadata::{Registry, RegistryOptions};
    use crate::signer::KeyPair;
    use crate::test_utils::legacy_metadata;
    use crate::value::Value;

    #[test]
    fn test_sender_defaults_to_registry_prefix() {
        let options = RegistryOptions {
            ss58_prefix: Some(0),
            ..Default::default()
        };
        let registry = WasmRegistry::from(Registry::build(&legacy_metadata(), options).unwrap());
        let builder = ExtrinsicBuilder::new(registry.inner());
        let keypair = KeyPair::from_seed(SignatureScheme::Ed25519, &[3; 32]).unwrap();
        let method = builder
            .build_call(
                "System",
                "remark",
                &Value::named([("remark", Value::Bytes(vec![1, 2, 3]))]),
            )
            .unwrap();
        let payload = UnsignedExtrinsicPayload {
            method,
            era: Era::Immortal,
            nonce: 1,
            tip: 0,
            spec_version: 9,
            transaction_version: 1,
            genesis_hash: [0x11; 32],
            block_hash: None,
        };
        let signed = builder.sign(&payload, &keypair).unwrap();

        let tx = WasmTransaction::new(&signed, &registry).unwrap();
        assert_eq!(tx.ss58_prefix(), 0);
        assert_eq!(tx.sender(None), encode_ss58(&keypair.public_key(), 0).ok());
        assert_eq!(tx.sender(Some(2)), encode_ss58(&keypair.public_key(), 2).ok());
    }
}
