//! Ethereum-family raw transaction decoding.
//!
//! This crate provides:
//! - Classification of raw payloads into one of five envelope formats
//! - The legacy transaction model (standard and marker-prefixed layouts) with
//!   identity hash, EIP-155 signing preimage and signature attachment
//! - An adapter normalizing alloy's typed envelopes into [`DecodedTransaction`]
//! - Sender recovery and EIP-55 address rendering

pub mod address;
pub mod classify;
pub mod decoded;
pub mod error;
pub mod legacy;
pub mod rlp;
pub mod typed;

pub use classify::{classify, decode_transaction, DecodeOptions, EnvelopeKind, TransactionEnvelope};
pub use decoded::DecodedTransaction;
pub use error::TxError;
pub use legacy::{LegacyFields, LegacyLayout, LegacySignature, LegacyTransaction};
