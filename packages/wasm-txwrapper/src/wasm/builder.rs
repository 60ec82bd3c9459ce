//! WASM bindings for extrinsic building
//!
//! BuilderNamespace mirrors the txwrapper flow: build a call, derive the
//! signing payload, sign, then assemble the signed extrinsic.

use crate::builder::{ExtrinsicBuilder, UnsignedExtrinsicPayload};
use crate::era::Era;
use crate::signer::{MultiSignature, SignatureScheme};
use crate::value::Value;
use crate::wasm::{from_js, to_js, WasmKeypair, WasmRegistry};
use crate::TxWrapperError;
use serde_json::Value as JsonValue;
use wasm_bindgen::prelude::*;

/// Namespace for building operations
#[wasm_bindgen]
pub struct BuilderNamespace;

fn scheme_from_name(name: &str) -> Result<SignatureScheme, TxWrapperError> {
    SignatureScheme::from_variant_name(name)
        .ok_or_else(|| TxWrapperError::InvalidSignature(format!("unknown scheme {}", name)))
}

#[wasm_bindgen]
impl BuilderNamespace {
    /// Encode a call from named arguments
    ///
    /// # Example
    /// ```js
    /// BuilderNamespace.buildCall(registry, "Balances", "transferKeepAlive", {
    ///   dest: "5FHneW46xGXgs5mUiveU4sbTyGBzmstUspZC92UhjJM694ty",
    ///   value: "1000000000000",
    /// });
    /// ```
    ///
    /// Amounts above 2^53 - 1 must be passed as decimal strings.
    #[wasm_bindgen(js_name = buildCall)]
    pub fn build_call(
        registry: &WasmRegistry,
        module: &str,
        call: &str,
        args: JsValue,
    ) -> Result<Vec<u8>, JsValue> {
        let args: JsonValue = from_js(args, "call arguments")?;
        let builder = ExtrinsicBuilder::new(registry.inner());
        Ok(builder.build_call(module, call, &Value::from(args))?)
    }

    /// Unsigned extrinsic bytes for an encoded call
    #[wasm_bindgen(js_name = buildUnsignedExtrinsic)]
    pub fn build_unsigned_extrinsic(registry: &WasmRegistry, call: &[u8]) -> Vec<u8> {
        ExtrinsicBuilder::new(registry.inner()).build_unsigned_extrinsic(call)
    }

    /// Bytes to sign for an unsigned payload
    ///
    /// Payloads longer than 256 bytes are returned as their blake2-256 hash,
    /// ready to hand to an external signer.
    ///
    /// # Example Payload
    /// ```json
    /// {
    ///   "method": "0x0503...",
    ///   "era": { "mortal": { "period": 64, "phase": 10 } },
    ///   "nonce": 0,
    ///   "tip": "0",
    ///   "specVersion": 9,
    ///   "transactionVersion": 1,
    ///   "genesisHash": "0x91b1...",
    ///   "blockHash": "0x5d2c..."
    /// }
    /// ```
    #[wasm_bindgen(js_name = signingPayload)]
    pub fn signing_payload(registry: &WasmRegistry, payload: JsValue) -> Result<Vec<u8>, JsValue> {
        let payload: UnsignedExtrinsicPayload = from_js(payload, "payload")?;
        let builder = ExtrinsicBuilder::new(registry.inner());
        Ok(builder.build_signing_payload(&payload)?.to_sign_bytes())
    }

    /// Unhashed signing payload as hex
    #[wasm_bindgen(js_name = signingPayloadHex)]
    pub fn signing_payload_hex(registry: &WasmRegistry, payload: JsValue) -> Result<String, JsValue> {
        let payload: UnsignedExtrinsicPayload = from_js(payload, "payload")?;
        let builder = ExtrinsicBuilder::new(registry.inner());
        Ok(builder.build_signing_payload(&payload)?.to_hex())
    }

    /// Signed extrinsic from a payload and an externally produced signature
    ///
    /// # Arguments
    /// * `payload` - The payload that was signed
    /// * `signer` - 32-byte public key
    /// * `scheme` - "sr25519", "ed25519" or "ecdsa"
    /// * `signature` - Signature bytes
    #[wasm_bindgen(js_name = assembleSigned)]
    pub fn assemble_signed(
        registry: &WasmRegistry,
        payload: JsValue,
        signer: &[u8],
        scheme: &str,
        signature: &[u8],
    ) -> Result<Vec<u8>, JsValue> {
        let payload: UnsignedExtrinsicPayload = from_js(payload, "payload")?;
        let signer: [u8; 32] = signer.try_into().map_err(|_| {
            TxWrapperError::InvalidInput(format!("Signer must be 32 bytes, got {}", signer.len()))
        })?;
        let signature = MultiSignature::new(scheme_from_name(scheme)?, signature.to_vec())?;
        let builder = ExtrinsicBuilder::new(registry.inner());
        Ok(builder.assemble_signed(
            &payload.method,
            &signer,
            &signature,
            &payload.era,
            payload.nonce,
            payload.tip,
        )?)
    }

    /// Build, sign and assemble in one step
    #[wasm_bindgen]
    pub fn sign(
        registry: &WasmRegistry,
        payload: JsValue,
        keypair: &WasmKeypair,
    ) -> Result<Vec<u8>, JsValue> {
        let payload: UnsignedExtrinsicPayload = from_js(payload, "payload")?;
        let builder = ExtrinsicBuilder::new(registry.inner());
        Ok(builder.sign(&payload, keypair.inner())?)
    }

    /// Mortal era for `period` blocks starting at `current` (`{ mortal: { period, phase } }`)
    #[wasm_bindgen(js_name = mortalEra)]
    pub fn mortal_era(period: u32, current: u32) -> Result<JsValue, JsValue> {
        to_js(&Era::mortal(period as u64, current as u64))
    }
}
