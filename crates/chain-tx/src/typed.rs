//! Adapter over alloy's typed transaction decoding.
//!
//! EIP-2930, EIP-1559 and signed standard legacy payloads are decoded by
//! `alloy-consensus`. Its native integers (`u64`, `u128`, `U256`) are never
//! exposed: every numeric field leaves this module as a hex quantity string,
//! so all envelope kinds share the [`DecodedTransaction`] shape.
//!
//! Unsigned standard legacy lists have no alloy representation (its legacy
//! envelope is always signed); those go through [`LegacyTransaction`].

use alloy_consensus::{SignableTransaction, Signed, TxEip1559, TxEip2930, TxEnvelope, TxLegacy};
use alloy_eips::eip2718::Decodable2718;
use alloy_eips::eip2930::AccessList;
use alloy_eips::Typed2718;
use alloy_primitives::{Signature, TxKind, U256};
use codec_utils::hex::{prefixed_hex, u128_quantity, u64_quantity};

use crate::address::{checksum_address, recover_sender};
use crate::decoded::{AccessListEntry, DecodedTransaction, EnvelopeKind, SignatureFields};
use crate::error::TxError;
use crate::legacy::{u256_quantity, LegacyLayout, LegacyTransaction};

/// A decoded standard legacy transaction.
#[derive(Debug, Clone)]
pub enum StandardLegacy {
    Signed(Signed<TxLegacy>),
    Unsigned(LegacyTransaction),
}

impl StandardLegacy {
    pub fn to_decoded(&self, envelope: EnvelopeKind) -> Result<DecodedTransaction, TxError> {
        match self {
            StandardLegacy::Signed(signed) => legacy_to_decoded(signed, envelope),
            StandardLegacy::Unsigned(tx) => tx.to_decoded(envelope),
        }
    }
}

/// Decodes an EIP-2718 payload (type byte included) with alloy.
pub fn decode_envelope(payload: &[u8]) -> Result<TxEnvelope, TxError> {
    let mut buf = payload;
    let envelope = TxEnvelope::decode_2718(&mut buf)?;
    if !buf.is_empty() {
        return Err(TxError::MalformedRlp(format!(
            "{} trailing bytes after transaction",
            buf.len()
        )));
    }
    Ok(envelope)
}

/// Decodes a standard legacy list.
///
/// `fields` are the already split list elements of `payload`; they are
/// validated first (field count, canonical integers, joint v/r/s) so that
/// errors name the offending field.
pub fn decode_standard_legacy(
    payload: &[u8],
    fields: &[&[u8]],
    chain_id: u64,
) -> Result<StandardLegacy, TxError> {
    let parsed = LegacyTransaction::from_fields(fields, LegacyLayout::Standard, chain_id)?;
    if !parsed.is_signed() {
        return Ok(StandardLegacy::Unsigned(parsed));
    }

    match decode_envelope(payload)? {
        TxEnvelope::Legacy(signed) => Ok(StandardLegacy::Signed(signed)),
        other => Err(TxError::UnsupportedEnvelope(format!(
            "expected legacy, decoded type {}",
            other.ty()
        ))),
    }
}

pub fn legacy_to_decoded(
    signed: &Signed<TxLegacy>,
    envelope: EnvelopeKind,
) -> Result<DecodedTransaction, TxError> {
    let tx = signed.tx();
    let sig = signed.signature();

    // Pre-EIP-155 signatures use 27/28, replay-protected ones 35 + 2 * chainId.
    let v = match tx.chain_id {
        Some(chain_id) => U256::from(chain_id) * U256::from(2u8) + U256::from(35u8),
        None => U256::from(27u8),
    } + U256::from(sig.v() as u8);

    Ok(DecodedTransaction {
        envelope,
        tx_type: None,
        hash: prefixed_hex(signed.hash().as_slice()),
        chain_id: tx.chain_id.map(u64_quantity),
        nonce: u64_quantity(tx.nonce),
        gas_price: Some(u128_quantity(tx.gas_price)),
        max_priority_fee_per_gas: None,
        max_fee_per_gas: None,
        gas_limit: u64_quantity(tx.gas_limit),
        from: Some(sender(tx, sig)?),
        to: render_to(&tx.to),
        value: u256_quantity(tx.value),
        data: prefixed_hex(&tx.input),
        access_list: None,
        signature: Some(SignatureFields {
            v: u256_quantity(v),
            r: u256_quantity(sig.r()),
            s: u256_quantity(sig.s()),
        }),
    })
}

pub fn eip2930_to_decoded(signed: &Signed<TxEip2930>) -> Result<DecodedTransaction, TxError> {
    let tx = signed.tx();
    let sig = signed.signature();

    Ok(DecodedTransaction {
        envelope: EnvelopeKind::Eip2930,
        tx_type: Some(u64_quantity(1)),
        hash: prefixed_hex(signed.hash().as_slice()),
        chain_id: Some(u64_quantity(tx.chain_id)),
        nonce: u64_quantity(tx.nonce),
        gas_price: Some(u128_quantity(tx.gas_price)),
        max_priority_fee_per_gas: None,
        max_fee_per_gas: None,
        gas_limit: u64_quantity(tx.gas_limit),
        from: Some(sender(tx, sig)?),
        to: render_to(&tx.to),
        value: u256_quantity(tx.value),
        data: prefixed_hex(&tx.input),
        access_list: Some(render_access_list(&tx.access_list)),
        signature: Some(parity_signature(sig)),
    })
}

pub fn eip1559_to_decoded(signed: &Signed<TxEip1559>) -> Result<DecodedTransaction, TxError> {
    let tx = signed.tx();
    let sig = signed.signature();

    Ok(DecodedTransaction {
        envelope: EnvelopeKind::Eip1559,
        tx_type: Some(u64_quantity(2)),
        hash: prefixed_hex(signed.hash().as_slice()),
        chain_id: Some(u64_quantity(tx.chain_id)),
        nonce: u64_quantity(tx.nonce),
        gas_price: None,
        max_priority_fee_per_gas: Some(u128_quantity(tx.max_priority_fee_per_gas)),
        max_fee_per_gas: Some(u128_quantity(tx.max_fee_per_gas)),
        gas_limit: u64_quantity(tx.gas_limit),
        from: Some(sender(tx, sig)?),
        to: render_to(&tx.to),
        value: u256_quantity(tx.value),
        data: prefixed_hex(&tx.input),
        access_list: Some(render_access_list(&tx.access_list)),
        signature: Some(parity_signature(sig)),
    })
}

fn sender<T: SignableTransaction<Signature>>(tx: &T, sig: &Signature) -> Result<String, TxError> {
    let address = recover_sender(&tx.signature_hash(), sig.v() as u8, sig.r(), sig.s())?;
    Ok(checksum_address(&address))
}

/// Typed envelopes carry the y-parity itself as `v`.
fn parity_signature(sig: &Signature) -> SignatureFields {
    SignatureFields {
        v: u64_quantity(sig.v() as u64),
        r: u256_quantity(sig.r()),
        s: u256_quantity(sig.s()),
    }
}

fn render_to(to: &TxKind) -> Option<String> {
    match to {
        TxKind::Call(address) => Some(checksum_address(address)),
        TxKind::Create => None,
    }
}

fn render_access_list(list: &AccessList) -> Vec<AccessListEntry> {
    list.0
        .iter()
        .map(|item| AccessListEntry {
            address: checksum_address(&item.address),
            storage_keys: item
                .storage_keys
                .iter()
                .map(|key| prefixed_hex(key.as_slice()))
                .collect(),
        })
        .collect()
}
