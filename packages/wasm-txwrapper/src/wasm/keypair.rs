//! WASM bindings for signing keys

use crate::address::{encode_ss58, SUBSTRATE_SS58_FORMAT};
use crate::error::TxWrapperError;
use crate::signer::{self, KeyPair, MultiSignature, SignatureScheme};
use wasm_bindgen::prelude::*;

fn parse_scheme(name: &str) -> Result<SignatureScheme, TxWrapperError> {
    SignatureScheme::from_variant_name(name)
        .ok_or_else(|| TxWrapperError::InvalidInput(format!("Unknown signature scheme: {}", name)))
}

/// WASM wrapper for sr25519 and ed25519 keypairs
#[wasm_bindgen]
#[derive(Debug)]
pub struct WasmKeypair {
    inner: KeyPair,
}

#[wasm_bindgen]
impl WasmKeypair {
    /// Create a keypair from a 32-byte seed
    ///
    /// @param scheme - "sr25519" or "ed25519"
    #[wasm_bindgen(js_name = fromSeed)]
    pub fn from_seed(scheme: &str, seed: &[u8]) -> Result<WasmKeypair, TxWrapperError> {
        KeyPair::from_seed(parse_scheme(scheme)?, seed).map(|inner| WasmKeypair { inner })
    }

    /// Get the public key as a 32-byte Uint8Array.
    #[wasm_bindgen(getter, js_name = publicKey)]
    pub fn public_key(&self) -> js_sys::Uint8Array {
        js_sys::Uint8Array::from(&self.inner.public_key()[..])
    }

    #[wasm_bindgen(getter)]
    pub fn scheme(&self) -> String {
        self.inner.scheme().variant_name().to_lowercase()
    }

    /// SS58 address for `prefix` (generic Substrate format when omitted)
    #[wasm_bindgen]
    pub fn address(&self, prefix: Option<u16>) -> Result<String, TxWrapperError> {
        encode_ss58(
            &self.inner.public_key(),
            prefix.unwrap_or(SUBSTRATE_SS58_FORMAT),
        )
    }

    /// Sign a message as-is and return the 64-byte signature
    #[wasm_bindgen]
    pub fn sign(&self, message: &[u8]) -> js_sys::Uint8Array {
        let signature = self.inner.sign(message);
        js_sys::Uint8Array::from(&signature.bytes[..])
    }

    /// Check a signature over `message` for a 32-byte public key
    #[wasm_bindgen]
    pub fn verify(
        message: &[u8],
        scheme: &str,
        signature: &[u8],
        public_key: &[u8],
    ) -> Result<bool, TxWrapperError> {
        let public_key: [u8; 32] = public_key.try_into().map_err(|_| {
            TxWrapperError::InvalidInput(format!(
                "Public key must be 32 bytes, got {}",
                public_key.len()
            ))
        })?;
        let signature = MultiSignature {
            scheme: parse_scheme(scheme)?,
            bytes: signature.to_vec(),
        };
        Ok(signer::verify(message, &signature, &public_key))
    }
}

impl WasmKeypair {
    /// Get the inner KeyPair for internal Rust use.
    pub fn inner(&self) -> &KeyPair {
        &self.inner
    }
}
