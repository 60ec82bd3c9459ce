//! WASM bindings for SS58 addresses

use crate::address::{decode_ss58, encode_ss58, validate_address, NetworkRegistry};
use crate::error::TxWrapperError;
use wasm_bindgen::prelude::*;

/// Namespace for address operations
#[wasm_bindgen]
pub struct AddressNamespace;

#[wasm_bindgen]
impl AddressNamespace {
    /// Encode a 32-byte public key for one of the well-known networks
    ///
    /// Use `WasmRegistry.encodeAddress` to also accept the chain's own prefix
    /// and its configured networks.
    #[wasm_bindgen(js_name = encodeAddress)]
    pub fn encode_address(public_key: &[u8], prefix: u16) -> Result<String, TxWrapperError> {
        NetworkRegistry::default().encode_address(public_key, prefix)
    }

    /// Decode an address to its public key, checking checksum and prefix
    #[wasm_bindgen(js_name = decodeAddress)]
    pub fn decode_address(address: &str) -> Result<Vec<u8>, TxWrapperError> {
        let (public_key, _) = NetworkRegistry::default().decode_address(address)?;
        Ok(public_key.to_vec())
    }

    /// SS58 prefix of an address, without checking it against any network list
    #[wasm_bindgen(js_name = addressPrefix)]
    pub fn address_prefix(address: &str) -> Result<u16, TxWrapperError> {
        Ok(decode_ss58(address)?.1)
    }

    /// Re-encode an address for another network
    #[wasm_bindgen(js_name = convertAddress)]
    pub fn convert_address(address: &str, prefix: u16) -> Result<String, TxWrapperError> {
        let (public_key, _) = decode_ss58(address)?;
        encode_ss58(&public_key, prefix)
    }

    #[wasm_bindgen(js_name = validateAddress)]
    pub fn validate_address(address: &str, expected_prefix: Option<u16>) -> bool {
        validate_address(address, expected_prefix)
    }
}
