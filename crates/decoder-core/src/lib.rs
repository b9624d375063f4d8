//! Entry points for decoding raw EVM transactions, call inputs and event
//! logs.
//!
//! [`TxDecoder`] and [`AbiDecoder`] are the stateful entry points. The free
//! functions below wrap them with owned arguments, one call per operation.

pub mod config;
pub mod error;

use std::sync::Arc;

use abi_decode::{AbiIndex, CallDecoder, LogDecoder};
use alloy_primitives::{B256, U256};
use chain_tx::rlp::decode_field_list;
use chain_tx::typed::StandardLegacy;
use chain_tx::{LegacyLayout, LegacyTransaction};
use codec_utils::hex::{decode_prefixed, prefixed_hex};
use serde_json::Value;
use tracing::debug;

pub use abi_decode::{DecodedCall, DecodedEvent, DecodedLog, LogEntry, SignatureEntry};
pub use chain_tx::{DecodedTransaction, EnvelopeKind, TransactionEnvelope};
pub use config::DecoderConfig;
pub use error::DecoderError;

// ─── Transactions ────────────────────────────────────────────────────

/// Raw transaction decoder bound to one configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct TxDecoder {
    config: DecoderConfig,
}

impl TxDecoder {
    pub fn new(config: DecoderConfig) -> Result<Self, DecoderError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Classifies `raw` and keeps the parsed structure.
    pub fn classify(&self, raw: &[u8]) -> Result<TransactionEnvelope, DecoderError> {
        Ok(chain_tx::classify(raw, &self.config.decode_options())?)
    }

    pub fn decode(&self, raw: &[u8]) -> Result<DecodedTransaction, DecoderError> {
        let decoded = self.classify(raw)?.to_decoded()?;
        debug!(envelope = ?decoded.envelope, hash = %decoded.hash, "decoded transaction");
        Ok(decoded)
    }

    /// Same as [`Self::decode`] for `0x`-prefixed hex input.
    pub fn decode_hex(&self, raw: &str) -> Result<DecodedTransaction, DecoderError> {
        self.decode(&decode_prefixed(raw)?)
    }

    /// Parses any legacy-style payload into the legacy model.
    ///
    /// Jupiter-wrapped payloads yield the inner transaction. Typed envelopes
    /// are rejected with [`DecoderError::NotLegacy`].
    pub fn legacy(&self, raw: &[u8]) -> Result<LegacyTransaction, DecoderError> {
        let chain_id = self.config.chain_id;
        match self.classify(raw)? {
            TransactionEnvelope::ChainLegacy(tx)
            | TransactionEnvelope::StandardLegacy(StandardLegacy::Unsigned(tx))
            | TransactionEnvelope::ChainJupiter(StandardLegacy::Unsigned(tx)) => Ok(tx),
            TransactionEnvelope::StandardLegacy(StandardLegacy::Signed(_)) => {
                let fields = decode_field_list(raw)?;
                Ok(LegacyTransaction::from_fields(&fields, LegacyLayout::Standard, chain_id)?)
            }
            TransactionEnvelope::ChainJupiter(StandardLegacy::Signed(_)) => {
                let fields = decode_field_list(raw)?;
                Ok(LegacyTransaction::from_fields(&fields[1..], LegacyLayout::Standard, chain_id)?)
            }
            other => Err(DecoderError::NotLegacy(format!("{:?}", other.kind()))),
        }
    }

    /// Hash an external signer must sign to authorize a legacy payload.
    pub fn signing_hash(&self, raw: &[u8]) -> Result<B256, DecoderError> {
        Ok(self.legacy(raw)?.signing_hash())
    }

    /// Attaches an externally produced signature and returns the signed
    /// encoding. The input is left untouched.
    pub fn attach_signature(
        &self,
        raw: &[u8],
        recovery_id: u8,
        r: U256,
        s: U256,
    ) -> Result<Vec<u8>, DecoderError> {
        let signed = self.legacy(raw)?.with_signature(recovery_id, r, s)?;
        Ok(signed.encode())
    }
}

// ─── ABI ─────────────────────────────────────────────────────────────

/// Call and log decoding over one shared ABI index.
#[derive(Debug, Clone)]
pub struct AbiDecoder {
    index: Arc<AbiIndex>,
    calls: CallDecoder,
    logs: LogDecoder,
}

impl AbiDecoder {
    pub fn from_json(abi_json: &str) -> Result<Self, DecoderError> {
        let index = Arc::new(AbiIndex::from_json(abi_json)?);
        Ok(Self {
            calls: CallDecoder::new(Arc::clone(&index)),
            logs: LogDecoder::new(Arc::clone(&index)),
            index,
        })
    }

    pub fn index(&self) -> &AbiIndex {
        &self.index
    }

    pub fn decode_call(&self, data: &[u8]) -> Result<DecodedCall, DecoderError> {
        Ok(self.calls.decode_call(data)?)
    }

    pub fn decode_log(&self, log: Value) -> LogEntry {
        self.logs.decode_log(log)
    }

    pub fn decode_logs(&self, logs: Vec<Value>) -> Vec<LogEntry> {
        self.logs.decode_logs(logs)
    }
}

// ─── Flat API ────────────────────────────────────────────────────────
// Owned arguments throughout so the functions can sit behind a binding
// layer unchanged.

/// Decode raw transaction bytes with the given fallback chain id.
pub fn decode_raw_transaction(raw: Vec<u8>, chain_id: u64) -> Result<DecodedTransaction, DecoderError> {
    TxDecoder::new(DecoderConfig::new(chain_id)?)?.decode(&raw)
}

/// Decode a `0x`-prefixed raw transaction and render it as JSON.
pub fn decode_raw_transaction_json(raw_hex: String, chain_id: u64) -> Result<String, DecoderError> {
    let decoded = TxDecoder::new(DecoderConfig::new(chain_id)?)?.decode_hex(&raw_hex)?;
    Ok(serde_json::to_string(&decoded)?)
}

/// Signing hash of an unsigned (or signed) legacy payload, `0x`-prefixed.
pub fn legacy_signing_hash(raw: Vec<u8>, chain_id: u64) -> Result<String, DecoderError> {
    let hash = TxDecoder::new(DecoderConfig::new(chain_id)?)?.signing_hash(&raw)?;
    Ok(prefixed_hex(hash.as_slice()))
}

/// Attach a 32-byte-scalar signature to a legacy payload.
pub fn attach_legacy_signature(
    raw: Vec<u8>,
    chain_id: u64,
    recovery_id: u8,
    r: Vec<u8>,
    s: Vec<u8>,
) -> Result<Vec<u8>, DecoderError> {
    let r = scalar("r", &r)?;
    let s = scalar("s", &s)?;
    TxDecoder::new(DecoderConfig::new(chain_id)?)?.attach_signature(&raw, recovery_id, r, s)
}

/// Decode contract call input against a JSON ABI.
pub fn decode_call(abi_json: String, data: Vec<u8>) -> Result<DecodedCall, DecoderError> {
    AbiDecoder::from_json(&abi_json)?.decode_call(&data)
}

/// Decode a JSON array of node logs. Each element is read on its own: logs
/// that do not match the ABI, or cannot be read, come back unchanged.
pub fn decode_logs(abi_json: String, logs_json: String) -> Result<Vec<LogEntry>, DecoderError> {
    let logs: Vec<Value> = serde_json::from_str(&logs_json)?;
    Ok(AbiDecoder::from_json(&abi_json)?.decode_logs(logs))
}

/// List `{name, signature}` for every function in the ABI.
pub fn function_signatures(abi_json: String) -> Result<Vec<SignatureEntry>, DecoderError> {
    Ok(AbiIndex::from_json(&abi_json)?.function_signatures())
}

/// List `{name, signature}` for every event in the ABI.
pub fn event_signatures(abi_json: String) -> Result<Vec<SignatureEntry>, DecoderError> {
    Ok(AbiIndex::from_json(&abi_json)?.event_signatures())
}

/// Topic-0 hash of a named event, `None` if missing or ambiguous.
pub fn event_topic(abi_json: String, event_name: String) -> Result<Option<String>, DecoderError> {
    Ok(AbiIndex::from_json(&abi_json)?
        .event_topic(&event_name)
        .map(|topic| prefixed_hex(topic.as_slice())))
}

fn scalar(name: &str, bytes: &[u8]) -> Result<U256, DecoderError> {
    U256::try_from_be_slice(bytes).ok_or_else(|| {
        DecoderError::MalformedTransaction(chain_tx::TxError::InvalidSignature(format!(
            "{name} is {} bytes, at most 32 allowed",
            bytes.len()
        )))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const UNSIGNED_LEGACY: &str = "0xdc80018252089400000000000000000000000000000000000000008080";

    #[test]
    fn decodes_unsigned_standard_legacy_hex() {
        let decoded = TxDecoder::default().decode_hex(UNSIGNED_LEGACY).unwrap();
        assert_eq!(decoded.envelope, EnvelopeKind::StandardLegacy);
        assert_eq!(decoded.nonce, "0x0");
        assert_eq!(decoded.gas_limit, "0x5208");
        assert_eq!(decoded.chain_id.as_deref(), Some("0x1"));
    }

    #[test]
    fn any_nonzero_chain_id_is_accepted() {
        let raw = decode_prefixed(UNSIGNED_LEGACY).unwrap();
        let decoded = decode_raw_transaction(raw.clone(), 31337).unwrap();
        assert_eq!(decoded.chain_id.as_deref(), Some("0x7a69"));

        assert_eq!(
            decode_raw_transaction(raw, 0).unwrap_err(),
            DecoderError::InvalidChainId(0)
        );
    }

    #[test]
    fn malformed_payload_surfaces_tx_error() {
        let err = decode_raw_transaction(vec![], 1).unwrap_err();
        assert_eq!(err, DecoderError::MalformedTransaction(chain_tx::TxError::EmptyPayload));
    }

    #[test]
    fn invalid_hex_is_reported() {
        assert!(matches!(
            TxDecoder::default().decode_hex("0xzz").unwrap_err(),
            DecoderError::InvalidHex(_)
        ));
    }

    #[test]
    fn json_output_omits_absent_fields() {
        let json = decode_raw_transaction_json(UNSIGNED_LEGACY.into(), 888).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["envelope"], "standardLegacy");
        assert_eq!(value["chainId"], "0x378");
        assert!(value.get("v").is_none());
        assert!(value.get("from").is_none());
    }

    #[test]
    fn oversized_scalar_is_rejected() {
        let raw = decode_prefixed(UNSIGNED_LEGACY).unwrap();
        let err = attach_legacy_signature(raw, 1, 0, vec![1; 33], vec![1]).unwrap_err();
        assert!(matches!(
            err,
            DecoderError::MalformedTransaction(chain_tx::TxError::InvalidSignature(_))
        ));
    }

    #[test]
    fn event_topic_lookup() {
        let abi = r#"[{"type":"event","name":"Transfer","anonymous":false,"inputs":[
            {"name":"from","type":"address","indexed":true},
            {"name":"to","type":"address","indexed":true},
            {"name":"value","type":"uint256","indexed":false}]}]"#;
        assert_eq!(
            event_topic(abi.into(), "Transfer".into()).unwrap().as_deref(),
            Some("0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef")
        );
        assert_eq!(event_topic(abi.into(), "Approval".into()).unwrap(), None);
        assert_eq!(event_signatures(abi.into()).unwrap()[0].signature, "Transfer(address,address,uint256)");
    }
}
