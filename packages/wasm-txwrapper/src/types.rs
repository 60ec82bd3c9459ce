//! Shared configuration and chain material types

use crate::builder::{hex_bytes, UnsignedExtrinsicPayload};
use crate::era::Era;
use crate::error::TxWrapperError;
use crate::metadata::{Registry, RegistryOptions};
use crate::value::{NumericOutputMode, RenderOptions};
use serde::{Deserialize, Serialize};

/// Default mortality window in blocks
pub const DEFAULT_ERA_PERIOD: u64 = 64;

/// Chain state needed to build and sign an extrinsic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainMaterial {
    #[serde(with = "crate::builder::types::hex_hash")]
    pub genesis_hash: [u8; 32],
    /// Head block at fetch time, used as the era checkpoint
    #[serde(with = "crate::builder::types::hex_hash")]
    pub block_hash: [u8; 32],
    pub block_number: u64,
    /// Runtime spec name (e.g. "polkadot", "westend")
    pub spec_name: String,
    pub spec_version: u32,
    pub transaction_version: u32,
    /// Runtime metadata blob
    #[serde(with = "hex_bytes")]
    pub metadata: Vec<u8>,
}

impl ChainMaterial {
    /// Parse the metadata blob
    pub fn registry(&self, options: RegistryOptions) -> Result<Registry, TxWrapperError> {
        Registry::build(&self.metadata, options)
    }

    /// Payload for `method`, anchored at the fetched head block
    ///
    /// The head block is the only checkpoint whose hash is known, so a mortal
    /// era always starts at `block_number`; `validity.first_valid` is not used.
    pub fn payload(
        &self,
        method: Vec<u8>,
        validity: &Validity,
        nonce: u64,
        tip: u128,
    ) -> UnsignedExtrinsicPayload {
        let era = Validity {
            first_valid: self.block_number,
            ..*validity
        }
        .era();
        UnsignedExtrinsicPayload {
            method,
            era,
            nonce,
            tip,
            spec_version: self.spec_version,
            transaction_version: self.transaction_version,
            genesis_hash: self.genesis_hash,
            block_hash: (!era.is_immortal()).then_some(self.block_hash),
        }
    }
}

/// Validity window for mortal transactions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Validity {
    /// Block number the era is anchored to
    pub first_valid: u64,
    /// Window length in blocks; 0 makes the transaction immortal
    #[serde(default = "default_max_duration")]
    pub max_duration: u64,
}

fn default_max_duration() -> u64 {
    DEFAULT_ERA_PERIOD
}

impl Default for Validity {
    fn default() -> Self {
        Self {
            first_valid: 0,
            max_duration: default_max_duration(),
        }
    }
}

impl Validity {
    pub fn era(&self) -> Era {
        if self.max_duration == 0 {
            Era::Immortal
        } else {
            Era::mortal(self.max_duration, self.first_valid)
        }
    }
}

/// Options for rendering decoded extrinsics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecodeOptions {
    #[serde(default)]
    pub numeric_output_mode: NumericOutputMode,
    /// Prefix for rendered accounts; the registry's prefix when unset
    #[serde(default)]
    pub ss58_prefix: Option<u16>,
}

impl DecodeOptions {
    pub(crate) fn render_options(&self, registry: &Registry) -> RenderOptions {
        RenderOptions {
            numeric_output_mode: self.numeric_output_mode,
            ss58_prefix: self.ss58_prefix.unwrap_or_else(|| registry.ss58_prefix()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_validity_era() {
        assert!(Validity { first_valid: 10, max_duration: 0 }.era().is_immortal());
        assert_eq!(
            Validity { first_valid: 42, max_duration: 64 }.era(),
            Era::Mortal { period: 64, phase: 42 }
        );
        assert_eq!(Validity::default().max_duration, DEFAULT_ERA_PERIOD);
    }

    #[test]
    fn test_decode_options_defaults() {
        let options: DecodeOptions = serde_json::from_value(json!({})).unwrap();
        assert_eq!(options.numeric_output_mode, NumericOutputMode::String);
        assert_eq!(options.ss58_prefix, None);

        let options: DecodeOptions =
            serde_json::from_value(json!({ "numericOutputMode": "number", "ss58Prefix": 0 }))
                .unwrap();
        assert_eq!(options.numeric_output_mode, NumericOutputMode::Number);
        assert_eq!(options.ss58_prefix, Some(0));
    }

    #[test]
    fn test_material_payload_checkpoint() {
        let material = ChainMaterial {
            genesis_hash: [1; 32],
            block_hash: [2; 32],
            block_number: 100,
            spec_name: "westend".to_string(),
            spec_version: 9,
            transaction_version: 2,
            metadata: vec![],
        };
        let mortal = material.payload(vec![0, 0], &Validity { first_valid: 100, max_duration: 64 }, 0, 0);
        assert_eq!(mortal.block_hash, Some([2; 32]));

        // The era is born at the checkpoint block whatever first_valid says
        for validity in [Validity::default(), Validity { first_valid: 7, max_duration: 64 }] {
            let payload = material.payload(vec![0, 0], &validity, 0, 0);
            assert_eq!(payload.era, Era::mortal(64, 100));
            assert_eq!(payload.era.birth(100), 100);
            assert_eq!(payload.block_hash, Some([2; 32]));
        }

        let immortal = material.payload(vec![0, 0], &Validity { first_valid: 100, max_duration: 0 }, 0, 0);
        assert_eq!(immortal.block_hash, None);
        assert_eq!(immortal.genesis_hash, [1; 32]);
    }
}
