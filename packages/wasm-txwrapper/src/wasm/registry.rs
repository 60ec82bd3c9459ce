//! WASM bindings for the metadata registry

use crate::metadata::{Registry, RegistryOptions};
use crate::wasm::{options_from_js, to_js};
use std::sync::Arc;
use wasm_bindgen::prelude::*;

/// Parsed runtime metadata, shared by the builder and parser namespaces
#[wasm_bindgen]
#[derive(Debug, Clone)]
pub struct WasmRegistry {
    inner: Arc<Registry>,
}

#[wasm_bindgen]
impl WasmRegistry {
    /// Parse a metadata blob
    ///
    /// # Arguments
    /// * `metadata` - Raw `state_getMetadata` bytes
    /// * `options` - Optional `{ ss58Prefix, types, networks }`
    #[wasm_bindgen(constructor)]
    pub fn new(metadata: &[u8], options: JsValue) -> Result<WasmRegistry, JsValue> {
        let options: RegistryOptions = options_from_js(options, "registry options")?;
        let inner = Registry::build(metadata, options)?;
        Ok(WasmRegistry {
            inner: Arc::new(inner),
        })
    }

    /// Parse a `0x`-hex metadata blob
    #[wasm_bindgen(js_name = fromHex)]
    pub fn from_hex(metadata: &str, options: JsValue) -> Result<WasmRegistry, JsValue> {
        let options: RegistryOptions = options_from_js(options, "registry options")?;
        let inner = Registry::from_hex(metadata, options)?;
        Ok(WasmRegistry {
            inner: Arc::new(inner),
        })
    }

    #[wasm_bindgen(getter, js_name = metadataVersion)]
    pub fn metadata_version(&self) -> u8 {
        self.inner.metadata_version()
    }

    #[wasm_bindgen(getter, js_name = extrinsicVersion)]
    pub fn extrinsic_version(&self) -> u8 {
        self.inner.extrinsic().version
    }

    #[wasm_bindgen(getter, js_name = ss58Prefix)]
    pub fn ss58_prefix(&self) -> u16 {
        self.inner.ss58_prefix()
    }

    /// Signed extension identifiers in declared order
    #[wasm_bindgen(js_name = signedExtensions)]
    pub fn signed_extensions(&self) -> Vec<String> {
        self.inner
            .extrinsic()
            .signed_extensions
            .iter()
            .map(|ext| ext.identifier.clone())
            .collect()
    }

    /// Call description (`{ module, name, moduleIndex, callIndex, params }`)
    #[wasm_bindgen(js_name = resolveCall)]
    pub fn resolve_call(&self, module: &str, call: &str) -> Result<JsValue, JsValue> {
        to_js(self.inner.resolve_call(module, call)?)
    }

    /// Encode a public key for the chain's prefix or a configured network
    #[wasm_bindgen(js_name = encodeAddress)]
    pub fn encode_address(&self, public_key: &[u8], prefix: Option<u16>) -> Result<String, JsValue> {
        let prefix = prefix.unwrap_or_else(|| self.inner.ss58_prefix());
        Ok(self.inner.networks().encode_address(public_key, prefix)?)
    }

    /// Public key of an address registered for this chain
    #[wasm_bindgen(js_name = decodeAddress)]
    pub fn decode_address(&self, address: &str) -> Result<Vec<u8>, JsValue> {
        let (public_key, _) = self.inner.networks().decode_address(address)?;
        Ok(public_key.to_vec())
    }

    /// Module names that expose calls
    #[wasm_bindgen]
    pub fn modules(&self) -> Vec<String> {
        self.inner
            .modules()
            .iter()
            .filter(|m| !m.calls.is_empty())
            .map(|m| m.name.clone())
            .collect()
    }
}

impl From<Registry> for WasmRegistry {
    fn from(inner: Registry) -> Self {
        WasmRegistry {
            inner: Arc::new(inner),
        }
    }
}

// Non-WASM methods for internal use
impl WasmRegistry {
    pub fn inner(&self) -> &Registry {
        &self.inner
    }
}
