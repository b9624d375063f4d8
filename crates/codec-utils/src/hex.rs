//! `0x`-prefixed hex helpers.
//!
//! Two renderings are used across the decoders:
//! - **byte strings** keep every byte: `[0x00, 0x2a]` -> `"0x002a"`
//! - **quantities** are minimal: `[0x00, 0x2a]` -> `"0x2a"`, zero -> `"0x0"`

use crate::error::HexError;

/// Strips a leading `0x` / `0X` if present.
pub fn strip_0x(s: &str) -> &str {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}

/// Renders bytes as a full `0x`-prefixed lowercase hex string.
pub fn prefixed_hex(bytes: &[u8]) -> String {
    format!("0x{}", ::hex::encode(bytes))
}

/// Renders a big-endian unsigned integer as a minimal hex quantity.
pub fn quantity_from_be_bytes(bytes: &[u8]) -> String {
    let encoded = ::hex::encode(bytes);
    let trimmed = encoded.trim_start_matches('0');
    if trimmed.is_empty() {
        "0x0".to_string()
    } else {
        format!("0x{trimmed}")
    }
}

pub fn u64_quantity(value: u64) -> String {
    format!("{value:#x}")
}

pub fn u128_quantity(value: u128) -> String {
    format!("{value:#x}")
}

/// Decodes an optionally `0x`-prefixed hex string.
///
/// Odd-length input is left-padded with a zero nibble, matching how node
/// JSON-RPC quantities are written.
pub fn decode_prefixed(s: &str) -> Result<Vec<u8>, HexError> {
    let digits = strip_0x(s);
    let result = if digits.len() % 2 == 1 {
        ::hex::decode(format!("0{digits}"))
    } else {
        ::hex::decode(digits)
    };
    result.map_err(|e| HexError::InvalidHex(e.to_string()))
}
