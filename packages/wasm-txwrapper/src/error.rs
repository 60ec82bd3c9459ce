//! Error types for wasm-txwrapper

use serde_json::Value as JsonValue;
use thiserror::Error;
use wasm_bindgen::prelude::*;

/// Main error type for wasm-txwrapper operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TxWrapperError {
    /// Metadata version byte we do not know how to read
    #[error("Unsupported metadata version: {0}")]
    UnsupportedMetadataVersion(u8),
    /// Metadata blob is not decodable (bad magic, truncated containers...)
    #[error("Invalid metadata: {0}")]
    InvalidMetadata(String),
    /// Type name or id not present in the registry
    #[error("Unknown type: {0}")]
    UnknownType(String),
    /// Enum tag (or module/call index) without a matching metadata entry
    #[error("Unknown variant {index} for {ty}")]
    UnknownVariant { ty: String, index: u8 },
    /// Non-canonical or out of range compact integer
    #[error("Malformed compact integer: {0}")]
    MalformedCompactInt(String),
    /// Decoder asked to read past the end of the input
    #[error("Truncated input: needed {needed} bytes, {available} available")]
    TruncatedInput { needed: usize, available: usize },
    /// Named arguments do not match the declared call parameters
    #[error("Argument mismatch: {0}")]
    ArgumentMismatch(String),
    /// A mandatory construction field was not provided
    #[error("Missing field: {0}")]
    MissingField(String),
    /// A value cannot be encoded as the requested type
    #[error("Value mismatch: expected {expected}, got {found}")]
    ValueMismatch { expected: String, found: String },
    /// SS58 checksum did not verify
    #[error("Checksum mismatch")]
    ChecksumMismatch,
    /// SS58 prefix is not registered for this deployment
    #[error("Unknown network prefix: {0}")]
    UnknownNetworkPrefix(u16),
    /// Malformed SS58 address
    #[error("Invalid address: {0}")]
    InvalidAddress(String),
    /// Invalid key material or signature
    #[error("Invalid signature: {0}")]
    InvalidSignature(String),
    /// Invalid transaction format
    #[error("Invalid transaction: {0}")]
    InvalidTransaction(String),
    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// Error envelope returned by the remote node
    #[error("RPC error {code}: {message}")]
    Rpc {
        code: i64,
        message: String,
        data: Option<JsonValue>,
    },
}

impl TxWrapperError {
    pub(crate) fn truncated(needed: usize, available: usize) -> Self {
        TxWrapperError::TruncatedInput { needed, available }
    }

    pub(crate) fn mismatch(expected: impl Into<String>, found: impl Into<String>) -> Self {
        TxWrapperError::ValueMismatch {
            expected: expected.into(),
            found: found.into(),
        }
    }
}

impl From<parity_scale_codec::Error> for TxWrapperError {
    fn from(err: parity_scale_codec::Error) -> Self {
        TxWrapperError::InvalidMetadata(err.to_string())
    }
}

impl From<hex::FromHexError> for TxWrapperError {
    fn from(err: hex::FromHexError) -> Self {
        TxWrapperError::InvalidInput(format!("Invalid hex: {}", err))
    }
}

// REQUIRED: Converts to JS Error with stack trace
impl From<TxWrapperError> for JsValue {
    fn from(err: TxWrapperError) -> Self {
        js_sys::Error::new(&err.to_string()).into()
    }
}
