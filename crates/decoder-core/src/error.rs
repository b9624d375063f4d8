use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecoderError {
    #[error("Malformed transaction: {0}")]
    MalformedTransaction(#[from] chain_tx::TxError),

    #[error("ABI error: {0}")]
    Abi(#[from] abi_decode::AbiError),

    #[error("Invalid hex: {0}")]
    InvalidHex(#[from] codec_utils::HexError),

    #[error("Invalid JSON: {0}")]
    InvalidJson(String),

    #[error("Invalid chain id: {0}")]
    InvalidChainId(u64),

    #[error("Not a legacy transaction: {0}")]
    NotLegacy(String),
}

impl From<serde_json::Error> for DecoderError {
    fn from(e: serde_json::Error) -> Self {
        DecoderError::InvalidJson(e.to_string())
    }
}
