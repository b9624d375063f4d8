use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AbiError {
    #[error("invalid abi: {0}")]
    InvalidAbi(String),

    #[error("calldata too short: {0} bytes, need at least 4 for the selector")]
    CalldataTooShort(usize),

    #[error("unknown function selector: {0}")]
    UnknownSelector(String),

    #[error("unknown event signature: {0}")]
    UnknownEventSignature(String),

    #[error("log has no topics")]
    MissingTopics,

    #[error("malformed log: {0}")]
    MalformedLog(String),

    #[error("decode failed: {0}")]
    Decode(String),
}
