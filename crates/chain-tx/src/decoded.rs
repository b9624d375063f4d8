use serde::Serialize;

/// The five wire formats a raw transaction can arrive in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum EnvelopeKind {
    StandardLegacy,
    Eip2930,
    Eip1559,
    /// 10-field legacy list with a leading type marker.
    ChainLegacy,
    /// Legacy list wrapped by a leading `0xffffffff` sentinel element.
    ChainJupiter,
}

/// Caller-facing projection shared by every envelope kind.
///
/// Numeric fields are minimal hex quantities (`"0x0"` for zero), addresses
/// are EIP-55 checksummed, `data` is full `0x`-prefixed hex. Fields that do
/// not apply to the envelope are omitted from JSON rather than written as
/// `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecodedTransaction {
    pub envelope: EnvelopeKind,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub tx_type: Option<String>,
    pub hash: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<String>,
    pub nonce: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_priority_fee_per_gas: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_fee_per_gas: Option<String>,
    pub gas_limit: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    pub value: String,
    pub data: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_list: Option<Vec<AccessListEntry>>,
    #[serde(flatten)]
    pub signature: Option<SignatureFields>,
}

/// v/r/s as one group: a transaction is either fully signed or unsigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignatureFields {
    pub v: String,
    pub r: String,
    pub s: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessListEntry {
    pub address: String,
    pub storage_keys: Vec<String>,
}
