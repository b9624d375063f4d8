use thiserror::Error;

/// Malformed-transaction errors.
///
/// Every variant belongs to the same error class: the payload could not be
/// turned into a transaction. Nothing is ever partially returned.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TxError {
    #[error("empty transaction payload")]
    EmptyPayload,

    #[error("malformed rlp: {0}")]
    MalformedRlp(String),

    #[error("unsupported field count: {0}")]
    UnsupportedFieldCount(usize),

    #[error("non-canonical integer in field `{0}`")]
    NonCanonicalInteger(String),

    #[error("integer overflow in field `{0}`")]
    IntegerOverflow(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("partial signature: v, r and s must be all present or all absent")]
    PartialSignature,

    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    #[error("unsupported envelope: {0}")]
    UnsupportedEnvelope(String),
}

impl From<alloy_rlp::Error> for TxError {
    fn from(e: alloy_rlp::Error) -> Self {
        match e {
            alloy_rlp::Error::LeadingZero => TxError::NonCanonicalInteger("unknown".into()),
            alloy_rlp::Error::Overflow => TxError::IntegerOverflow("unknown".into()),
            other => TxError::MalformedRlp(other.to_string()),
        }
    }
}

impl From<alloy_eips::eip2718::Eip2718Error> for TxError {
    fn from(e: alloy_eips::eip2718::Eip2718Error) -> Self {
        match e {
            alloy_eips::eip2718::Eip2718Error::RlpError(inner) => inner.into(),
            other => TxError::UnsupportedEnvelope(other.to_string()),
        }
    }
}
