//! ABI-driven decoding of contract call inputs and event logs.
//!
//! An [`AbiIndex`] is built once from a JSON ABI and shared (it is immutable
//! and `Send + Sync`) by a [`CallDecoder`] and a [`LogDecoder`].

pub mod call;
pub mod error;
pub mod index;
pub mod log;
pub mod normalize;

pub use call::{CallDecoder, DecodedCall};
pub use error::AbiError;
pub use index::{AbiIndex, SignatureEntry};
pub use log::{DecodedEvent, DecodedLog, LogDecoder, LogEntry};
