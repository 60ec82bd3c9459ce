//! wasm-txwrapper: metadata-driven Substrate extrinsic toolkit
//!
//! This crate provides:
//! - Runtime metadata parsing (V12/V13 legacy and V14 portable registries)
//! - A SCALE codec driven by the parsed type registry
//! - Extrinsic building, signing payload derivation and signing
//! - Extrinsic decoding into JSON-friendly values
//! - SS58 address handling and JSON-RPC helpers
//!
//! # Architecture
//!
//! The crate follows a two-layer architecture:
//! - **Core layer** (`src/*.rs`): Pure Rust logic, no WASM dependencies
//! - **WASM layer** (`src/wasm/*.rs`): Thin wrappers with `#[wasm_bindgen]`

// The built-in legacy type table is one `json!` literal
#![recursion_limit = "256"]

pub mod address;
pub mod builder;
pub mod codec;
pub mod era;
pub mod error;
pub mod metadata;
pub mod parser;
pub mod rpc;
pub mod signer;
pub mod transaction;
pub mod types;
pub mod value;
pub mod wasm;

#[cfg(test)]
mod test_utils;

// Re-export main types for convenience
pub use address::{decode_ss58, encode_ss58, validate_address, Address, NetworkRegistry};
pub use builder::{ExtrinsicBuilder, SigningPayload, UnsignedExtrinsicPayload};
pub use era::Era;
pub use error::TxWrapperError;
pub use metadata::{Registry, RegistryOptions};
pub use parser::{decode_call, decode_extrinsic, DecodedCall, DecodedExtrinsic};
pub use rpc::{fetch_chain_material, fetch_nonce, RpcClient};
pub use signer::{KeyPair, MultiSignature, SignatureScheme};
pub use transaction::Transaction;
pub use types::{ChainMaterial, DecodeOptions, Validity};
pub use value::{NumericOutputMode, RenderOptions, Value};
