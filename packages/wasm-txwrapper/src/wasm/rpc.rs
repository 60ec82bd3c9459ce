//! WASM bindings for JSON-RPC envelopes
//!
//! The JS side owns the transport; these helpers build request bodies and
//! unwrap responses the same way the Rust client does.

use crate::rpc::{parse_response, JsonRpcRequest};
use crate::wasm::{from_js, to_js};
use serde_json::Value as JsonValue;
use wasm_bindgen::prelude::*;

/// Namespace for RPC helpers
#[wasm_bindgen]
pub struct RpcNamespace;

#[wasm_bindgen]
impl RpcNamespace {
    /// JSON-RPC 2.0 request body
    #[wasm_bindgen(js_name = buildRequest)]
    pub fn build_request(id: u32, method: &str, params: JsValue) -> Result<String, JsValue> {
        let params: JsonValue = if params.is_undefined() {
            JsonValue::Array(Vec::new())
        } else {
            from_js(params, "RPC params")?
        };
        Ok(JsonRpcRequest::new(id as u64, method, params).to_json_string()?)
    }

    /// `result` of a response body; error envelopes throw
    #[wasm_bindgen(js_name = parseResponse)]
    pub fn parse_response(body: &str) -> Result<JsValue, JsValue> {
        to_js(&parse_response(body)?)
    }
}
