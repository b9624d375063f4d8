use thiserror::Error;

/// Hex conversion errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HexError {
    #[error("invalid hex: {0}")]
    InvalidHex(String),
}
