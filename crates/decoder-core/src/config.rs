use chain_tx::DecodeOptions;
use serde::{Deserialize, Serialize};

use crate::error::DecoderError;

/// Decoder configuration, loadable from JSON.
///
/// `chain_id` is only a fallback: it is used for legacy signing preimages
/// when the signature does not carry an EIP-155 chain id (unsigned or
/// pre-EIP-155 payloads). Any non-zero id is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct DecoderConfig {
    pub chain_id: u64,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            chain_id: DecodeOptions::default().chain_id,
        }
    }
}

impl DecoderConfig {
    pub fn new(chain_id: u64) -> Result<Self, DecoderError> {
        let config = Self { chain_id };
        config.validate()?;
        Ok(config)
    }

    /// Parses and validates a JSON config. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, DecoderError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Chain id 0 is reserved and never valid in a signing preimage.
    pub fn validate(&self) -> Result<(), DecoderError> {
        if self.chain_id == 0 {
            return Err(DecoderError::InvalidChainId(0));
        }
        Ok(())
    }

    pub fn decode_options(&self) -> DecodeOptions {
        DecodeOptions {
            chain_id: self.chain_id,
        }
    }
}
