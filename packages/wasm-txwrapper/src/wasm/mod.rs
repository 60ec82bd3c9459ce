//! WASM bindings for wasm-txwrapper
//!
//! This module contains thin wrappers with #[wasm_bindgen] that delegate
//! to the core Rust implementations.

pub mod address;
pub mod builder;
pub mod keypair;
pub mod parser;
pub mod registry;
pub mod rpc;
pub mod transaction;

// Re-export WASM types
pub use address::AddressNamespace;
pub use builder::BuilderNamespace;
pub use keypair::WasmKeypair;
pub use parser::ParserNamespace;
pub use registry::WasmRegistry;
pub use rpc::RpcNamespace;
pub use transaction::WasmTransaction;

use crate::error::TxWrapperError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use wasm_bindgen::prelude::*;

/// Serialize to a plain JS object (objects, not `Map`s)
pub(crate) fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| TxWrapperError::InvalidInput(format!("Serialization error: {}", e)).into())
}

/// Deserialize a JS argument, naming it in the error
pub(crate) fn from_js<T: DeserializeOwned>(value: JsValue, what: &str) -> Result<T, JsValue> {
    serde_wasm_bindgen::from_value(value)
        .map_err(|e| TxWrapperError::InvalidInput(format!("Invalid {}: {}", what, e)).into())
}

/// Optional JS options object; `undefined` and `null` mean defaults
pub(crate) fn options_from_js<T: DeserializeOwned + Default>(
    value: JsValue,
    what: &str,
) -> Result<T, JsValue> {
    if value.is_undefined() || value.is_null() {
        return Ok(T::default());
    }
    from_js(value, what)
}

/// u128 from a JS BigInt
pub(crate) fn bigint_to_u128(value: &js_sys::BigInt, what: &str) -> Result<u128, JsValue> {
    let text = value
        .to_string(10)
        .map_err(|_| TxWrapperError::InvalidInput(format!("Invalid {} value", what)))?;
    String::from(text).parse().map_err(|_| {
        TxWrapperError::InvalidInput(format!(
            "{} must be a non-negative integer that fits in u128",
            what
        ))
        .into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::era::Era;
    use wasm_bindgen::JsCast;
    use wasm_bindgen_test::*;

    #[wasm_bindgen_test]
    fn test_to_js_produces_plain_objects() {
        let value = to_js(&serde_json::json!({ "module": "Balances" })).unwrap();
        assert!(value.is_object());
        assert!(!value.is_instance_of::<js_sys::Map>());
    }

    #[wasm_bindgen_test]
    fn test_era_from_js() {
        let js = to_js(&Era::mortal(64, 42)).unwrap();
        let era: Era = from_js(js, "era").unwrap();
        assert_eq!(era, Era::Mortal { period: 64, phase: 42 });
        let options: crate::types::DecodeOptions =
            options_from_js(JsValue::UNDEFINED, "decode options").unwrap();
        assert_eq!(options, crate::types::DecodeOptions::default());
    }

    #[wasm_bindgen_test]
    fn test_bigint_to_u128() {
        let big = js_sys::BigInt::from(u128::MAX);
        assert_eq!(bigint_to_u128(&big, "Tip").unwrap(), u128::MAX);
        let negative = js_sys::BigInt::from(-1i64);
        assert!(bigint_to_u128(&negative, "Tip").is_err());
    }
}
