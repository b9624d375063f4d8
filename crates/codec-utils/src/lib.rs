//! # codec-utils
//!
//! Hex and quantity rendering helpers shared by the transaction and ABI
//! decoders.

pub mod error;
pub mod hex;

pub use error::HexError;
