//! Flat RLP field lists on top of `alloy-rlp`.
//!
//! Every legacy-style transaction is a single RLP list of byte strings. These
//! helpers decode such a list into borrowed fields, re-encode fields, and
//! apply the canonical integer rules (no leading zero byte, zero is empty).

use alloy_primitives::U256;
use alloy_rlp::{Encodable, Header};

use crate::error::TxError;

/// Decodes `payload` as exactly one RLP list of byte strings.
///
/// A non-list payload, trailing bytes after the list, or a nested list
/// element are all rejected.
pub fn decode_field_list(payload: &[u8]) -> Result<Vec<&[u8]>, TxError> {
    let mut buf = payload;
    let header = Header::decode(&mut buf)?;
    if !header.list {
        return Err(TxError::MalformedRlp("expected a list".into()));
    }
    if buf.len() != header.payload_length {
        return Err(TxError::MalformedRlp(format!(
            "list declares {} payload bytes, found {}",
            header.payload_length,
            buf.len()
        )));
    }

    let mut fields = Vec::new();
    while !buf.is_empty() {
        let field = Header::decode_bytes(&mut buf, false).map_err(|e| match e {
            alloy_rlp::Error::UnexpectedList => {
                TxError::MalformedRlp(format!("field {} is a nested list", fields.len()))
            }
            other => other.into(),
        })?;
        fields.push(field);
    }
    Ok(fields)
}

/// Encodes byte strings as one RLP list.
pub fn encode_field_list<T: AsRef<[u8]>>(fields: &[T]) -> Vec<u8> {
    let payload_length: usize = fields.iter().map(|f| f.as_ref().length()).sum();

    let mut out = Vec::with_capacity(payload_length + 9);
    Header {
        list: true,
        payload_length,
    }
    .encode(&mut out);
    for field in fields {
        field.as_ref().encode(&mut out);
    }
    out
}

/// Parses a big-endian unsigned integer field.
///
/// An empty field is zero. A leading zero byte is never stripped: it is a
/// non-canonical encoding and fails.
pub fn decode_uint(name: &str, bytes: &[u8]) -> Result<U256, TxError> {
    if bytes.first() == Some(&0) {
        return Err(TxError::NonCanonicalInteger(name.to_string()));
    }
    if bytes.len() > 32 {
        return Err(TxError::IntegerOverflow(name.to_string()));
    }
    Ok(U256::from_be_slice(bytes))
}

/// Unpadded big-endian bytes of `value`; zero is the empty string.
pub fn encode_uint(value: U256) -> Vec<u8> {
    let be = value.to_be_bytes::<32>();
    let start = be.iter().position(|&b| b != 0).unwrap_or(32);
    be[start..].to_vec()
}
