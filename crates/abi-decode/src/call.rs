//! Function-call input decoding.
//!
//! Calldata is `selector (4 bytes) ++ abi_encode_params(inputs)`.

use std::sync::Arc;

use alloy_dyn_abi::{DynSolType, DynSolValue, Specifier};
use alloy_json_abi::Param;
use alloy_primitives::Selector;
use codec_utils::hex::prefixed_hex;
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use crate::error::AbiError;
use crate::index::AbiIndex;
use crate::normalize::normalize;

/// Named, ordered call arguments.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecodedCall {
    pub name: String,
    pub types: Vec<String>,
    pub args: IndexMap<String, Value>,
}

#[derive(Debug, Clone)]
pub struct CallDecoder {
    index: Arc<AbiIndex>,
}

impl CallDecoder {
    pub fn new(index: Arc<AbiIndex>) -> Self {
        Self { index }
    }

    pub fn from_json(abi_json: &str) -> Result<Self, AbiError> {
        Ok(Self::new(Arc::new(AbiIndex::from_json(abi_json)?)))
    }

    /// Decodes `data` against the function its selector names.
    pub fn decode_call(&self, data: &[u8]) -> Result<DecodedCall, AbiError> {
        if data.len() < 4 {
            return Err(AbiError::CalldataTooShort(data.len()));
        }
        let (selector, params) = data.split_at(4);
        let selector = Selector::from_slice(selector);

        let func = self
            .index
            .function(&selector)
            .ok_or_else(|| AbiError::UnknownSelector(prefixed_hex(selector.as_slice())))?;

        let (names, types) = resolve_params(&func.inputs)?;
        let values = decode_params(&types, params)?;

        Ok(DecodedCall {
            name: func.name.clone(),
            types: types.iter().map(|t| t.sol_type_name().into_owned()).collect(),
            args: names
                .into_iter()
                .zip(values.iter().map(normalize))
                .collect(),
        })
    }
}

/// Parameter names (`arg{i}` when unnamed) and resolved types.
pub(crate) fn resolve_params(params: &[Param]) -> Result<(Vec<String>, Vec<DynSolType>), AbiError> {
    params
        .iter()
        .enumerate()
        .map(|(i, param)| {
            let ty = param
                .resolve()
                .map_err(|e| AbiError::InvalidAbi(format!("parameter {i}: {e}")))?;
            Ok((param_name(&param.name, i), ty))
        })
        .collect::<Result<Vec<_>, AbiError>>()
        .map(|pairs| pairs.into_iter().unzip())
}

pub(crate) fn param_name(name: &str, position: usize) -> String {
    if name.is_empty() {
        format!("arg{position}")
    } else {
        name.to_string()
    }
}

/// Decodes an ABI parameter sequence into one value per type.
pub(crate) fn decode_params(types: &[DynSolType], data: &[u8]) -> Result<Vec<DynSolValue>, AbiError> {
    if types.is_empty() {
        return Ok(Vec::new());
    }
    let decoded = DynSolType::Tuple(types.to_vec())
        .abi_decode_params(data)
        .map_err(|e| AbiError::Decode(e.to_string()))?;
    match decoded {
        DynSolValue::Tuple(values) => Ok(values),
        other => Ok(vec![other]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::fixtures::TOKEN_ABI;
    use alloy_primitives::{address, I256, U256};
    use serde_json::json;

    fn decoder() -> CallDecoder {
        CallDecoder::from_json(TOKEN_ABI).unwrap()
    }

    fn calldata(selector: [u8; 4], args: Vec<DynSolValue>) -> Vec<u8> {
        let mut data = selector.to_vec();
        data.extend(DynSolValue::Tuple(args).abi_encode_params());
        data
    }

    #[test]
    fn decodes_erc20_transfer() {
        let to = address!("5aaeb6053f3e94c9b9a09f33669435e7ef1beaed");
        let data = calldata(
            [0xa9, 0x05, 0x9c, 0xbb],
            vec![
                DynSolValue::Address(to),
                DynSolValue::Uint(U256::from(1_000_000u64), 256),
            ],
        );

        let call = decoder().decode_call(&data).unwrap();
        assert_eq!(call.name, "transfer");
        assert_eq!(call.types, ["address", "uint256"]);
        assert_eq!(call.args["to"], json!("0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed"));
        assert_eq!(call.args["amount"], json!("0xf4240"));
    }

    #[test]
    fn decodes_mixed_types_in_order() {
        let index = AbiIndex::from_json(TOKEN_ABI).unwrap();
        let selector = index
            .abi()
            .functions()
            .find(|f| f.name == "setRecords")
            .unwrap()
            .selector();

        let mut tag = [0u8; 32];
        tag[..4].copy_from_slice(&[0xde, 0xad, 0xbe, 0xef]);
        let data = calldata(
            selector.0,
            vec![
                DynSolValue::Int(I256::try_from(-2i64).unwrap(), 256),
                DynSolValue::Bytes(vec![0x00, 0x01]),
                DynSolValue::Array(vec![
                    DynSolValue::Uint(U256::from(7u8), 64),
                    DynSolValue::Uint(U256::from(16u8), 64),
                ]),
                DynSolValue::String("wan".into()),
                DynSolValue::Bool(true),
                DynSolValue::FixedBytes(tag.into(), 4),
            ],
        );

        let call = CallDecoder::new(Arc::new(index)).decode_call(&data).unwrap();
        let keys: Vec<_> = call.args.keys().map(String::as_str).collect();
        assert_eq!(keys, ["arg0", "payload", "ids", "label", "flag", "tag"]);
        assert_eq!(call.args["arg0"], json!("-0x2"));
        assert_eq!(call.args["payload"], json!("0x0001"));
        assert_eq!(call.args["ids"], json!(["0x7", "0x10"]));
        assert_eq!(call.args["label"], json!("wan"));
        assert_eq!(call.args["flag"], json!(true));
        assert_eq!(call.args["tag"], json!("0xdeadbeef"));
    }

    #[test]
    fn unknown_selector_is_an_error_for_that_call_only() {
        let decoder = decoder();
        let err = decoder.decode_call(&[0xde, 0xad, 0xbe, 0xef]).unwrap_err();
        assert_eq!(err, AbiError::UnknownSelector("0xdeadbeef".into()));

        let data = calldata(
            [0xa9, 0x05, 0x9c, 0xbb],
            vec![
                DynSolValue::Address(Default::default()),
                DynSolValue::Uint(U256::ZERO, 256),
            ],
        );
        assert!(decoder.decode_call(&data).is_ok());
    }

    #[test]
    fn short_calldata_is_rejected() {
        assert_eq!(
            decoder().decode_call(&[0xa9, 0x05, 0x9c]).unwrap_err(),
            AbiError::CalldataTooShort(3)
        );
    }

    #[test]
    fn truncated_arguments_fail_to_decode() {
        let err = decoder()
            .decode_call(&[0xa9, 0x05, 0x9c, 0xbb, 0x00, 0x01])
            .unwrap_err();
        assert!(matches!(err, AbiError::Decode(_)));
    }

    #[test]
    fn serializes_with_ordered_args() {
        let data = calldata(
            [0xa9, 0x05, 0x9c, 0xbb],
            vec![
                DynSolValue::Address(Default::default()),
                DynSolValue::Uint(U256::from(1u8), 256),
            ],
        );
        let json = serde_json::to_string(&decoder().decode_call(&data).unwrap()).unwrap();
        let to = json.find("\"to\"").unwrap();
        let amount = json.find("\"amount\"").unwrap();
        assert!(to < amount);
    }
}
