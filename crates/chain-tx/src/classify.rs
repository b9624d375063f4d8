//! Raw payload -> envelope classification.
//!
//! The decision order is fixed and the first structural match wins:
//! 1. type byte `0x01` / `0x02`      -> EIP-2930 / EIP-1559
//! 2. RLP list, else fatal
//! 3. first element == `0xffffffff`  -> Jupiter wrapper around a standard legacy list
//! 4. first byte > `0x7f`, 10 fields -> marker-prefixed chain legacy
//! 5. anything else                  -> standard legacy

use alloy_consensus::{Signed, TxEip1559, TxEip2930, TxEnvelope};
use alloy_primitives::U256;
use tracing::debug;

use crate::decoded::DecodedTransaction;
use crate::error::TxError;
use crate::legacy::{LegacyLayout, LegacyTransaction};
use crate::rlp::{decode_field_list, decode_uint, encode_field_list};
use crate::typed::{self, StandardLegacy};

pub use crate::decoded::EnvelopeKind;

const EIP2930_TYPE: u8 = 0x01;
const EIP1559_TYPE: u8 = 0x02;

/// First element value marking a Jupiter-wrapped transaction.
pub const JUPITER_SENTINEL: u64 = 0xffff_ffff;

/// Fallback chain id when none is configured (Ethereum mainnet).
pub const MAINNET_CHAIN_ID: u64 = 1;

/// Element count of a signed marker-prefixed legacy list.
const CHAIN_LEGACY_FIELDS: usize = 10;

/// Options applied while decoding legacy-style payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Chain id for signing preimages when `v` does not carry one.
    pub chain_id: u64,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            chain_id: MAINNET_CHAIN_ID,
        }
    }
}

/// A classified payload together with its parsed structure.
#[derive(Debug, Clone)]
pub enum TransactionEnvelope {
    StandardLegacy(StandardLegacy),
    Eip2930(Signed<TxEip2930>),
    Eip1559(Signed<TxEip1559>),
    ChainLegacy(LegacyTransaction),
    ChainJupiter(StandardLegacy),
}

impl TransactionEnvelope {
    pub fn kind(&self) -> EnvelopeKind {
        match self {
            TransactionEnvelope::StandardLegacy(_) => EnvelopeKind::StandardLegacy,
            TransactionEnvelope::Eip2930(_) => EnvelopeKind::Eip2930,
            TransactionEnvelope::Eip1559(_) => EnvelopeKind::Eip1559,
            TransactionEnvelope::ChainLegacy(_) => EnvelopeKind::ChainLegacy,
            TransactionEnvelope::ChainJupiter(_) => EnvelopeKind::ChainJupiter,
        }
    }

    /// Normalizes the parsed structure into the shared decoded shape.
    pub fn to_decoded(&self) -> Result<DecodedTransaction, TxError> {
        let kind = self.kind();
        match self {
            TransactionEnvelope::StandardLegacy(tx) | TransactionEnvelope::ChainJupiter(tx) => {
                tx.to_decoded(kind)
            }
            TransactionEnvelope::Eip2930(signed) => typed::eip2930_to_decoded(signed),
            TransactionEnvelope::Eip1559(signed) => typed::eip1559_to_decoded(signed),
            TransactionEnvelope::ChainLegacy(tx) => tx.to_decoded(kind),
        }
    }
}

/// Determines which envelope `payload` is and parses it.
pub fn classify(payload: &[u8], opts: &DecodeOptions) -> Result<TransactionEnvelope, TxError> {
    let first = *payload.first().ok_or(TxError::EmptyPayload)?;

    if first == EIP2930_TYPE || first == EIP1559_TYPE {
        debug!(type_byte = first, "typed envelope");
        return match typed::decode_envelope(payload)? {
            TxEnvelope::Eip2930(signed) => Ok(TransactionEnvelope::Eip2930(signed)),
            TxEnvelope::Eip1559(signed) => Ok(TransactionEnvelope::Eip1559(signed)),
            _ => Err(TxError::UnsupportedEnvelope(format!(
                "type byte {first:#04x} decoded to another envelope"
            ))),
        };
    }

    let fields = decode_field_list(payload)?;
    let Some(&head) = fields.first() else {
        return Err(TxError::UnsupportedFieldCount(0));
    };

    if is_jupiter_sentinel(head) {
        debug!(fields = fields.len(), "jupiter wrapper");
        let inner = encode_field_list(&fields[1..]);
        let inner_fields = decode_field_list(&inner)?;
        let tx = typed::decode_standard_legacy(&inner, &inner_fields, opts.chain_id)?;
        return Ok(TransactionEnvelope::ChainJupiter(tx));
    }

    if first > 0x7f && fields.len() == CHAIN_LEGACY_FIELDS {
        debug!("marker-prefixed chain legacy");
        let tx = LegacyTransaction::from_fields(&fields, LegacyLayout::Marked, opts.chain_id)?;
        return Ok(TransactionEnvelope::ChainLegacy(tx));
    }

    debug!(fields = fields.len(), "standard legacy");
    let tx = typed::decode_standard_legacy(payload, &fields, opts.chain_id)?;
    Ok(TransactionEnvelope::StandardLegacy(tx))
}

/// Classifies and normalizes in one step.
pub fn decode_transaction(
    payload: &[u8],
    opts: &DecodeOptions,
) -> Result<DecodedTransaction, TxError> {
    classify(payload, opts)?.to_decoded()
}

/// Integer comparison against the sentinel. A head that is not a canonical
/// integer cannot be the sentinel; the legacy parse later rejects it.
fn is_jupiter_sentinel(head: &[u8]) -> bool {
    matches!(decode_uint("sentinel", head), Ok(value) if value == U256::from(JUPITER_SENTINEL))
}
