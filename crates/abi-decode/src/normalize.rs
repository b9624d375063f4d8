//! `DynSolValue` -> JSON.
//!
//! Integer and byte-like values become `0x` hex strings: integers as minimal
//! quantities (`-0x..` when negative), bytes with every byte kept. Arrays are
//! converted element-wise. Addresses are EIP-55 checksummed, tuples become
//! JSON arrays, and bool/string keep their natural JSON form.

use alloy_dyn_abi::DynSolValue;
use alloy_primitives::{I256, U256};
use codec_utils::hex::{prefixed_hex, quantity_from_be_bytes};
use serde_json::Value;

pub fn normalize(value: &DynSolValue) -> Value {
    match value {
        DynSolValue::Bool(b) => Value::Bool(*b),
        DynSolValue::Int(i, _) => Value::String(int_hex(*i)),
        DynSolValue::Uint(u, _) => Value::String(uint_hex(*u)),
        DynSolValue::FixedBytes(word, size) => Value::String(prefixed_hex(&word[..*size])),
        DynSolValue::Bytes(b) => Value::String(prefixed_hex(b)),
        DynSolValue::Function(f) => Value::String(prefixed_hex(f.as_slice())),
        DynSolValue::Address(a) => Value::String(a.to_checksum(None)),
        DynSolValue::String(s) => Value::String(s.clone()),
        DynSolValue::Array(items) | DynSolValue::FixedArray(items) | DynSolValue::Tuple(items) => {
            Value::Array(items.iter().map(normalize).collect())
        }
        #[allow(unreachable_patterns)]
        other => Value::String(prefixed_hex(&other.abi_encode())),
    }
}

fn uint_hex(value: U256) -> String {
    quantity_from_be_bytes(&value.to_be_bytes::<32>())
}

fn int_hex(value: I256) -> String {
    let magnitude = uint_hex(value.unsigned_abs());
    if value.is_negative() {
        format!("-{magnitude}")
    } else {
        magnitude
    }
}
