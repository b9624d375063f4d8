//! Legacy-style transactions: the standard 6/9-field list and the
//! marker-prefixed 7/10-field list.
//!
//! Raw field order is `[type?, nonce, gasPrice, gasLimit, to, value, data, v, r, s]`.
//! Replay protection is always active: the signing preimage carries
//! `chainId, "", ""` in place of the signature fields.

use alloy_primitives::{Address, Bytes, B256, U256};
use codec_utils::hex::{prefixed_hex, quantity_from_be_bytes, u64_quantity};
use sha3::{Digest, Keccak256};

use crate::address::{checksum_address, recover_sender};
use crate::decoded::{DecodedTransaction, EnvelopeKind, SignatureFields};
use crate::error::TxError;
use crate::rlp::{decode_uint, encode_field_list, encode_uint};

/// Offset added to `v` on top of the doubled chain id (EIP-155).
const EIP155_V_OFFSET: u64 = 35;

/// Pre-EIP-155 `v` base (27 / 28).
const LEGACY_V_OFFSET: u64 = 27;

/// Field list shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegacyLayout {
    /// `[nonce, gasPrice, gasLimit, to, value, data, (v, r, s)]`
    Standard,
    /// `[type, nonce, gasPrice, gasLimit, to, value, data, (v, r, s)]`
    Marked,
}

impl LegacyLayout {
    pub fn unsigned_len(self) -> usize {
        match self {
            LegacyLayout::Standard => 6,
            LegacyLayout::Marked => 7,
        }
    }

    pub fn signed_len(self) -> usize {
        self.unsigned_len() + 3
    }
}

/// Everything except the signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyFields {
    /// Type marker; present exactly for the marked layout.
    pub tx_type: Option<U256>,
    pub nonce: U256,
    pub gas_price: U256,
    pub gas_limit: U256,
    /// `None` for contract creation.
    pub to: Option<Address>,
    pub value: U256,
    pub data: Bytes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegacySignature {
    pub v: U256,
    pub r: U256,
    pub s: U256,
}

/// An immutable legacy transaction.
///
/// The identity hash is computed once at construction. There are no
/// mutators: attaching a signature yields a new instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyTransaction {
    fields: LegacyFields,
    signature: Option<LegacySignature>,
    chain_id: u64,
    hash: B256,
}

impl LegacyTransaction {
    /// Builds a transaction from typed fields.
    ///
    /// `chain_id` is used unless the signature's `v` carries an EIP-155
    /// chain id, which then takes precedence.
    pub fn new(
        fields: LegacyFields,
        signature: Option<LegacySignature>,
        chain_id: u64,
    ) -> Result<Self, TxError> {
        let chain_id = match &signature {
            Some(sig) => chain_id_from_v(sig.v)?.unwrap_or(chain_id),
            None => chain_id,
        };

        let mut tx = Self {
            fields,
            signature,
            chain_id,
            hash: B256::ZERO,
        };
        tx.hash = keccak256(&tx.encode());
        Ok(tx)
    }

    /// Parses raw RLP fields in `layout` order.
    ///
    /// Accepts the unsigned or the signed field count of the layout; signed
    /// lists whose v/r/s are all empty are treated as unsigned.
    pub fn from_fields(
        fields: &[&[u8]],
        layout: LegacyLayout,
        chain_id: u64,
    ) -> Result<Self, TxError> {
        let signed = if fields.len() == layout.unsigned_len() {
            false
        } else if fields.len() == layout.signed_len() {
            true
        } else {
            return Err(TxError::UnsupportedFieldCount(fields.len()));
        };

        let (tx_type, rest) = match layout {
            LegacyLayout::Marked => (Some(decode_uint("type", fields[0])?), &fields[1..]),
            LegacyLayout::Standard => (None, fields),
        };

        let parsed = LegacyFields {
            tx_type,
            nonce: decode_uint("nonce", rest[0])?,
            gas_price: decode_uint("gasPrice", rest[1])?,
            gas_limit: decode_uint("gasLimit", rest[2])?,
            to: decode_to(rest[3])?,
            value: decode_uint("value", rest[4])?,
            data: Bytes::copy_from_slice(rest[5]),
        };

        let signature = if signed {
            decode_signature(rest[6], rest[7], rest[8])?
        } else {
            None
        };

        Self::new(parsed, signature, chain_id)
    }

    pub fn fields(&self) -> &LegacyFields {
        &self.fields
    }

    pub fn signature(&self) -> Option<&LegacySignature> {
        self.signature.as_ref()
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn is_signed(&self) -> bool {
        self.signature.is_some()
    }

    pub fn layout(&self) -> LegacyLayout {
        if self.fields.tx_type.is_some() {
            LegacyLayout::Marked
        } else {
            LegacyLayout::Standard
        }
    }

    /// Identity hash: Keccak-256 of [`Self::encode`].
    pub fn hash(&self) -> B256 {
        self.hash
    }

    /// Raw fields in canonical order. Absent v/r/s are empty strings.
    pub fn raw(&self) -> Vec<Vec<u8>> {
        let mut raw = self.unsigned_raw();
        match &self.signature {
            Some(sig) => {
                raw.push(encode_uint(sig.v));
                raw.push(encode_uint(sig.r));
                raw.push(encode_uint(sig.s));
            }
            None => raw.extend([Vec::new(), Vec::new(), Vec::new()]),
        }
        raw
    }

    /// RLP encoding of [`Self::raw`].
    pub fn encode(&self) -> Vec<u8> {
        encode_field_list(&self.raw())
    }

    /// RLP of the unsigned fields followed by `chainId, "", ""`.
    pub fn signing_preimage(&self) -> Vec<u8> {
        let mut values = self.unsigned_raw();
        values.push(encode_uint(U256::from(self.chain_id)));
        values.push(Vec::new());
        values.push(Vec::new());
        encode_field_list(&values)
    }

    pub fn signing_hash(&self) -> B256 {
        keccak256(&self.signing_preimage())
    }

    /// Returns a new, signed transaction with `v = recovery_id + 2 * chainId + 35`.
    pub fn with_signature(&self, recovery_id: u8, r: U256, s: U256) -> Result<Self, TxError> {
        if recovery_id > 1 {
            return Err(TxError::InvalidSignature(format!(
                "recovery id must be 0 or 1, got {recovery_id}"
            )));
        }
        let v = U256::from(recovery_id)
            + U256::from(self.chain_id) * U256::from(2u8)
            + U256::from(EIP155_V_OFFSET);

        Self::new(
            self.fields.clone(),
            Some(LegacySignature { v, r, s }),
            self.chain_id,
        )
    }

    /// The recovery id implied by `v`, or `None` when unsigned.
    pub fn recovery_id(&self) -> Result<Option<u8>, TxError> {
        let Some(sig) = &self.signature else {
            return Ok(None);
        };

        let eip155_base = U256::from(self.chain_id) * U256::from(2u8) + U256::from(EIP155_V_OFFSET);
        let parity = if sig.v >= eip155_base {
            sig.v - eip155_base
        } else if sig.v >= U256::from(LEGACY_V_OFFSET) {
            sig.v - U256::from(LEGACY_V_OFFSET)
        } else {
            return Err(TxError::InvalidSignature(format!("unexpected v {}", sig.v)));
        };

        match u8::try_from(parity) {
            Ok(id @ (0 | 1)) => Ok(Some(id)),
            _ => Err(TxError::InvalidSignature(format!(
                "v {} does not match chain id {}",
                sig.v, self.chain_id
            ))),
        }
    }

    /// Recovers the sender from the signature over [`Self::signing_hash`].
    pub fn sender(&self) -> Result<Option<Address>, TxError> {
        let (Some(sig), Some(recovery_id)) = (&self.signature, self.recovery_id()?) else {
            return Ok(None);
        };
        recover_sender(&self.signing_hash(), recovery_id, sig.r, sig.s).map(Some)
    }

    /// Projects the transaction into the shared decoded shape.
    pub fn to_decoded(&self, envelope: EnvelopeKind) -> Result<DecodedTransaction, TxError> {
        let from = self.sender()?.map(|a| checksum_address(&a));

        Ok(DecodedTransaction {
            envelope,
            tx_type: self.fields.tx_type.map(u256_quantity),
            hash: prefixed_hex(self.hash.as_slice()),
            chain_id: Some(u64_quantity(self.chain_id)),
            nonce: u256_quantity(self.fields.nonce),
            gas_price: Some(u256_quantity(self.fields.gas_price)),
            max_priority_fee_per_gas: None,
            max_fee_per_gas: None,
            gas_limit: u256_quantity(self.fields.gas_limit),
            from,
            to: self.fields.to.as_ref().map(checksum_address),
            value: u256_quantity(self.fields.value),
            data: prefixed_hex(&self.fields.data),
            access_list: None,
            signature: self.signature.map(|sig| SignatureFields {
                v: u256_quantity(sig.v),
                r: u256_quantity(sig.r),
                s: u256_quantity(sig.s),
            }),
        })
    }

    fn unsigned_raw(&self) -> Vec<Vec<u8>> {
        let f = &self.fields;
        let mut raw = Vec::with_capacity(10);
        if let Some(tx_type) = f.tx_type {
            raw.push(encode_uint(tx_type));
        }
        raw.push(encode_uint(f.nonce));
        raw.push(encode_uint(f.gas_price));
        raw.push(encode_uint(f.gas_limit));
        raw.push(f.to.map(|a| a.to_vec()).unwrap_or_default());
        raw.push(encode_uint(f.value));
        raw.push(f.data.to_vec());
        raw
    }
}

pub(crate) fn keccak256(bytes: &[u8]) -> B256 {
    B256::from_slice(&Keccak256::digest(bytes))
}

pub(crate) fn u256_quantity(value: U256) -> String {
    quantity_from_be_bytes(&value.to_be_bytes::<32>())
}

fn decode_to(bytes: &[u8]) -> Result<Option<Address>, TxError> {
    match bytes.len() {
        0 => Ok(None),
        20 => Ok(Some(Address::from_slice(bytes))),
        n => Err(TxError::InvalidAddress(format!(
            "`to` must be empty or 20 bytes, got {n}"
        ))),
    }
}

fn decode_signature(v: &[u8], r: &[u8], s: &[u8]) -> Result<Option<LegacySignature>, TxError> {
    match (v.is_empty(), r.is_empty(), s.is_empty()) {
        (true, true, true) => Ok(None),
        (false, false, false) => Ok(Some(LegacySignature {
            v: decode_uint("v", v)?,
            r: decode_uint("r", r)?,
            s: decode_uint("s", s)?,
        })),
        _ => Err(TxError::PartialSignature),
    }
}

/// EIP-155 chain id carried by `v`, if any.
fn chain_id_from_v(v: U256) -> Result<Option<u64>, TxError> {
    if v < U256::from(EIP155_V_OFFSET) {
        return Ok(None);
    }
    let doubled = v - U256::from(EIP155_V_OFFSET);
    u64::try_from(doubled / U256::from(2u8))
        .map(Some)
        .map_err(|_| TxError::InvalidSignature(format!("chain id in v {v} exceeds 64 bits")))
}
