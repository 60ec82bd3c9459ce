//! WASM bindings for extrinsic decoding
//!
//! ParserNamespace provides static methods for decoding extrinsics against
//! a registry

use crate::parser::{decode_call, decode_extrinsic};
use crate::types::DecodeOptions;
use crate::wasm::{options_from_js, to_js, WasmRegistry};
use wasm_bindgen::prelude::*;

/// Namespace for parsing operations
#[wasm_bindgen]
pub struct ParserNamespace;

#[wasm_bindgen]
impl ParserNamespace {
    /// Decode a signed or unsigned extrinsic
    ///
    /// # Arguments
    /// * `registry` - Registry built from the chain's metadata
    /// * `bytes` - Raw extrinsic bytes
    /// * `options` - Optional `{ numericOutputMode: "string" | "number", ss58Prefix }`
    ///
    /// # Returns
    /// `{ hash, version, isSigned, signature, method: { module, call, args } }`
    #[wasm_bindgen(js_name = decodeExtrinsic)]
    pub fn decode_extrinsic_wasm(
        registry: &WasmRegistry,
        bytes: &[u8],
        options: JsValue,
    ) -> Result<JsValue, JsValue> {
        let options: DecodeOptions = options_from_js(options, "decode options")?;
        let decoded = decode_extrinsic(bytes, registry.inner(), &options)?;
        to_js(&decoded)
    }

    /// Decode an extrinsic from hex string (with or without 0x prefix)
    #[wasm_bindgen(js_name = decodeExtrinsicHex)]
    pub fn decode_extrinsic_hex(
        registry: &WasmRegistry,
        hex: &str,
        options: JsValue,
    ) -> Result<JsValue, JsValue> {
        let bytes = hex::decode(hex.strip_prefix("0x").unwrap_or(hex))
            .map_err(crate::TxWrapperError::from)?;
        Self::decode_extrinsic_wasm(registry, &bytes, options)
    }

    /// Decode a bare call (`module_index ++ call_index ++ args`)
    #[wasm_bindgen(js_name = decodeCall)]
    pub fn decode_call_wasm(
        registry: &WasmRegistry,
        call: &[u8],
        options: JsValue,
    ) -> Result<JsValue, JsValue> {
        let options: DecodeOptions = options_from_js(options, "decode options")?;
        let decoded = decode_call(call, registry.inner())?;
        to_js(&decoded.to_json(&options.render_options(registry.inner())))
    }
}
