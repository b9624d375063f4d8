//! Event log decoding.
//!
//! `topics[0]` selects the event. Indexed parameters are read from
//! `topics[1..]` in declaration order, the rest from `data`.
//!
//! Logs stay in the JSON form the node returned. `topics` and `data` are
//! read from it for lookup only, so a log that is foreign, unreadable or
//! fails to decode is handed back as the exact value that came in. A
//! decoded log keeps every original field and gains `event` (unless the
//! node already set one), `eventName`, `types` and `args`.

use std::sync::Arc;

use alloy_dyn_abi::{DynSolType, DynSolValue, Specifier};
use alloy_json_abi::Event;
use alloy_primitives::B256;
use codec_utils::hex::{decode_prefixed, prefixed_hex};
use indexmap::IndexMap;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::call::{decode_params, param_name};
use crate::error::AbiError;
use crate::index::AbiIndex;
use crate::normalize::normalize;

/// Keys a decoded log writes over the original object.
const ADDED_KEYS: [&str; 3] = ["eventName", "types", "args"];

/// The resolved event and its named arguments.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecodedEvent {
    pub name: String,
    pub types: Vec<String>,
    pub args: IndexMap<String, Value>,
}

/// The original log object plus its decoded event.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedLog {
    pub log: Map<String, Value>,
    pub event: DecodedEvent,
}

impl Serialize for DecodedLog {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for (key, value) in &self.log {
            if !ADDED_KEYS.contains(&key.as_str()) {
                map.serialize_entry(key, value)?;
            }
        }
        if !self.log.contains_key("event") {
            map.serialize_entry("event", &self.event.name)?;
        }
        map.serialize_entry("eventName", &self.event.name)?;
        map.serialize_entry("types", &self.event.types)?;
        map.serialize_entry("args", &self.event.args)?;
        map.end()
    }
}

/// Result of the lenient path: either decoded, or the input as it was.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum LogEntry {
    Decoded(DecodedLog),
    Raw(Value),
}

impl LogEntry {
    pub fn is_decoded(&self) -> bool {
        matches!(self, LogEntry::Decoded(_))
    }
}

#[derive(Debug, Clone)]
pub struct LogDecoder {
    index: Arc<AbiIndex>,
}

impl LogDecoder {
    pub fn new(index: Arc<AbiIndex>) -> Self {
        Self { index }
    }

    pub fn from_json(abi_json: &str) -> Result<Self, AbiError> {
        Ok(Self::new(Arc::new(AbiIndex::from_json(abi_json)?)))
    }

    /// Decodes already parsed topics and data.
    pub fn decode_event(&self, topics: &[B256], data: &[u8]) -> Result<DecodedEvent, AbiError> {
        let (signature, indexed_topics) = topics.split_first().ok_or(AbiError::MissingTopics)?;
        let event = self.lookup(signature)?;
        decode_matched(event, indexed_topics, data)
    }

    /// Decodes `log`, or returns it unchanged when it cannot be decoded.
    pub fn decode_log(&self, log: Value) -> LogEntry {
        let Value::Object(map) = log else {
            return LogEntry::Raw(log);
        };
        match self.decode_object(&map) {
            Ok(event) => LogEntry::Decoded(DecodedLog { log: map, event }),
            Err(AbiError::UnknownEventSignature(topic)) => {
                debug!(%topic, "no event for topic, passing log through");
                LogEntry::Raw(Value::Object(map))
            }
            Err(AbiError::MissingTopics) => LogEntry::Raw(Value::Object(map)),
            Err(e) => {
                let address = map.get("address").and_then(Value::as_str).unwrap_or("unknown");
                warn!(address, error = %e, "log failed to decode, passing it through");
                LogEntry::Raw(Value::Object(map))
            }
        }
    }

    /// Like [`Self::decode_log`] but reports every miss and failure.
    pub fn decode_log_strict(&self, log: Value) -> Result<DecodedLog, AbiError> {
        let Value::Object(map) = log else {
            return Err(AbiError::MalformedLog("not a JSON object".into()));
        };
        let event = self.decode_object(&map)?;
        Ok(DecodedLog { log: map, event })
    }

    pub fn decode_logs(&self, logs: Vec<Value>) -> Vec<LogEntry> {
        logs.into_iter().map(|log| self.decode_log(log)).collect()
    }

    fn lookup(&self, signature: &B256) -> Result<&Event, AbiError> {
        self.index
            .event(signature)
            .ok_or_else(|| AbiError::UnknownEventSignature(prefixed_hex(signature.as_slice())))
    }

    /// Topic 0 is resolved before `data` is read, so a foreign log with an
    /// odd `data` field still reports as unknown.
    fn decode_object(&self, log: &Map<String, Value>) -> Result<DecodedEvent, AbiError> {
        let topics = read_topics(log)?;
        let (signature, indexed_topics) = topics.split_first().ok_or(AbiError::MissingTopics)?;
        let event = self.lookup(signature)?;
        let data = read_data(log)?;
        decode_matched(event, indexed_topics, &data)
    }
}

fn read_topics(log: &Map<String, Value>) -> Result<Vec<B256>, AbiError> {
    let Some(topics) = log.get("topics") else {
        return Err(AbiError::MissingTopics);
    };
    let topics = topics
        .as_array()
        .ok_or_else(|| AbiError::MalformedLog("`topics` is not an array".into()))?;
    topics
        .iter()
        .enumerate()
        .map(|(i, topic)| {
            let bytes = topic
                .as_str()
                .ok_or_else(|| AbiError::MalformedLog(format!("topic {i} is not a string")))
                .and_then(|s| {
                    decode_prefixed(s).map_err(|e| AbiError::MalformedLog(format!("topic {i}: {e}")))
                })?;
            if bytes.len() != 32 {
                return Err(AbiError::MalformedLog(format!(
                    "topic {i} is {} bytes, expected 32",
                    bytes.len()
                )));
            }
            Ok(B256::from_slice(&bytes))
        })
        .collect()
}

/// A missing `data` field reads as empty.
fn read_data(log: &Map<String, Value>) -> Result<Vec<u8>, AbiError> {
    match log.get("data") {
        None => Ok(Vec::new()),
        Some(Value::String(s)) => {
            decode_prefixed(s).map_err(|e| AbiError::MalformedLog(format!("data: {e}")))
        }
        Some(_) => Err(AbiError::MalformedLog("`data` is not a string".into())),
    }
}

fn decode_matched(event: &Event, topics: &[B256], data: &[u8]) -> Result<DecodedEvent, AbiError> {
    let values = decode_event(event, topics, data)?;
    let mut types = Vec::with_capacity(values.len());
    let mut args = IndexMap::with_capacity(values.len());
    for (name, ty, value) in values {
        types.push(ty.sol_type_name().into_owned());
        args.insert(name, value);
    }
    Ok(DecodedEvent {
        name: event.name.clone(),
        types,
        args,
    })
}

/// Decodes every input of `event` in declaration order.
fn decode_event(
    event: &Event,
    topics: &[B256],
    data: &[u8],
) -> Result<Vec<(String, DynSolType, Value)>, AbiError> {
    let mut resolved = Vec::with_capacity(event.inputs.len());
    for (i, param) in event.inputs.iter().enumerate() {
        let ty = param
            .resolve()
            .map_err(|e| AbiError::InvalidAbi(format!("event {} input {i}: {e}", event.name)))?;
        resolved.push((param_name(&param.name, i), ty, param.indexed));
    }

    let indexed_count = resolved.iter().filter(|(_, _, indexed)| *indexed).count();
    if topics.len() != indexed_count {
        return Err(AbiError::Decode(format!(
            "event {} expects {indexed_count} indexed topics, log has {}",
            event.name,
            topics.len()
        )));
    }

    let body_types: Vec<DynSolType> = resolved
        .iter()
        .filter(|(_, _, indexed)| !*indexed)
        .map(|(_, ty, _)| ty.clone())
        .collect();
    let mut body = decode_params(&body_types, data)?.into_iter();
    let mut topics = topics.iter();

    let mut out = Vec::with_capacity(resolved.len());
    for (name, ty, indexed) in resolved {
        let value = if indexed {
            // Count was checked above.
            let topic = topics
                .next()
                .ok_or_else(|| AbiError::Decode("topic count mismatch".into()))?;
            decode_topic(&ty, topic)?
        } else {
            let value = body
                .next()
                .ok_or_else(|| AbiError::Decode("data value count mismatch".into()))?;
            normalize(&value)
        };
        out.push((name, ty, value));
    }
    Ok(out)
}

/// Reference types in indexed position are stored as their keccak hash,
/// which is returned as-is.
fn decode_topic(ty: &DynSolType, topic: &B256) -> Result<Value, AbiError> {
    if is_hashed_when_indexed(ty) {
        return Ok(normalize(&DynSolValue::FixedBytes(*topic, 32)));
    }
    ty.abi_decode(topic.as_slice())
        .map(|value| normalize(&value))
        .map_err(|e| AbiError::Decode(format!("topic decode: {e}")))
}

fn is_hashed_when_indexed(ty: &DynSolType) -> bool {
    matches!(
        ty,
        DynSolType::String
            | DynSolType::Bytes
            | DynSolType::Array(_)
            | DynSolType::FixedArray(..)
            | DynSolType::Tuple(_)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::fixtures::TOKEN_ABI;
    use alloy_primitives::{address, b256, keccak256, Address, U256};
    use serde_json::json;

    const TRANSFER_TOPIC: &str = "0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef";
    const FROM: Address = address!("5aaeb6053f3e94c9b9a09f33669435e7ef1beaed");
    const TO: Address = address!("fb6916095ca1df60bb79ce92ce3ea74c37c5d359");

    fn decoder() -> LogDecoder {
        LogDecoder::from_json(TOKEN_ABI).unwrap()
    }

    fn word(value: u64) -> Vec<u8> {
        U256::from(value).to_be_bytes::<32>().to_vec()
    }

    fn transfer_log(value: u64) -> Value {
        json!({
            "address": "0x00000000000000000000000000000000000000aa",
            "topics": [
                TRANSFER_TOPIC,
                prefixed_hex(FROM.into_word().as_slice()),
                prefixed_hex(TO.into_word().as_slice()),
            ],
            "data": prefixed_hex(&word(value)),
            "blockNumber": "0x10",
            "logIndex": "0x2"
        })
    }

    fn foreign_log() -> Value {
        json!({
            "address": "0x00000000000000000000000000000000000000BB",
            "topics": [format!("0x{}", "11".repeat(32))],
            "data": "0xABCD",
            "logIndex": "0x1"
        })
    }

    #[test]
    fn decodes_transfer_with_indexed_addresses() {
        let entry = decoder().decode_log(transfer_log(1_000));
        let LogEntry::Decoded(decoded) = entry else {
            panic!("expected decoded log");
        };
        assert_eq!(decoded.event.name, "Transfer");
        assert_eq!(decoded.event.types, ["address", "address", "uint256"]);
        let keys: Vec<_> = decoded.event.args.keys().map(String::as_str).collect();
        assert_eq!(keys, ["from", "to", "value"]);
        assert_eq!(decoded.event.args["from"], json!(FROM.to_checksum(None)));
        assert_eq!(decoded.event.args["to"], json!(TO.to_checksum(None)));
        assert_eq!(decoded.event.args["value"], json!("0x3e8"));
        assert_eq!(Value::Object(decoded.log), transfer_log(1_000));
    }

    #[test]
    fn decoded_log_keeps_original_fields_in_json() {
        let original = transfer_log(1);
        let json = serde_json::to_value(decoder().decode_log(original.clone())).unwrap();
        for (key, value) in original.as_object().unwrap() {
            assert_eq!(&json[key], value, "{key} changed");
        }
        assert_eq!(json["event"], "Transfer");
        assert_eq!(json["eventName"], "Transfer");
        assert_eq!(json["types"], json!(["address", "address", "uint256"]));
        assert_eq!(json["args"]["value"], "0x1");
    }

    #[test]
    fn existing_event_field_is_kept() {
        let mut log = transfer_log(1);
        log["event"] = json!("NodeLabel");
        let json = serde_json::to_value(decoder().decode_log(log)).unwrap();
        assert_eq!(json["event"], "NodeLabel");
        assert_eq!(json["eventName"], "Transfer");
    }

    #[test]
    fn unknown_topic_passes_through_untouched() {
        let entry = decoder().decode_log(foreign_log());
        assert_eq!(entry, LogEntry::Raw(foreign_log()));

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json, foreign_log());
        assert_eq!(json["data"], "0xABCD");
        for added in ["event", "eventName", "types", "args"] {
            assert!(json.get(added).is_none());
        }
    }

    #[test]
    fn unreadable_logs_pass_through() {
        let logs = [
            json!({"topics": ["0x11"], "data": "0x", "logIndex": "0x1"}),
            json!({"topics": "nope"}),
            json!({"data": "0x"}),
            json!({"topics": []}),
            json!("not an object"),
        ];
        for log in logs {
            assert_eq!(decoder().decode_log(log.clone()), LogEntry::Raw(log));
        }
    }

    #[test]
    fn strict_path_reports_misses() {
        assert_eq!(
            decoder().decode_log_strict(foreign_log()).unwrap_err(),
            AbiError::UnknownEventSignature(format!("0x{}", "11".repeat(32)))
        );
        assert_eq!(
            decoder().decode_log_strict(json!({"topics": []})).unwrap_err(),
            AbiError::MissingTopics
        );
        assert!(matches!(
            decoder().decode_log_strict(json!({"topics": ["0x11"]})).unwrap_err(),
            AbiError::MalformedLog(_)
        ));
        assert!(matches!(
            decoder().decode_log_strict(json!([])).unwrap_err(),
            AbiError::MalformedLog(_)
        ));
    }

    #[test]
    fn matched_event_with_bad_data_passes_through() {
        let mut log = transfer_log(1);
        log["data"] = json!("0x0102");
        assert_eq!(decoder().decode_log(log.clone()), LogEntry::Raw(log.clone()));
        assert!(matches!(
            decoder().decode_log_strict(log).unwrap_err(),
            AbiError::Decode(_)
        ));
    }

    #[test]
    fn wrong_indexed_topic_count_is_a_decode_error() {
        let mut log = transfer_log(1);
        log["topics"].as_array_mut().unwrap().pop();
        assert!(matches!(
            decoder().decode_log_strict(log).unwrap_err(),
            AbiError::Decode(_)
        ));
    }

    #[test]
    fn indexed_string_is_returned_as_topic_hash() {
        let index = AbiIndex::from_json(TOKEN_ABI).unwrap();
        let topic0 = index.event_topic("Labelled").unwrap();
        let label_hash = keccak256("wan");

        let event = LogDecoder::new(Arc::new(index))
            .decode_event(&[topic0, label_hash], &word(5))
            .unwrap();
        assert_eq!(event.name, "Labelled");
        assert_eq!(event.args["label"], json!(prefixed_hex(label_hash.as_slice())));
        assert_eq!(event.args["count"], json!("0x5"));
    }

    #[test]
    fn decode_event_from_parsed_topics() {
        let topic0 = b256!("ddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef");
        let event = decoder()
            .decode_event(&[topic0, FROM.into_word(), TO.into_word()], &word(7))
            .unwrap();
        assert_eq!(event.args["value"], json!("0x7"));
        assert_eq!(decoder().decode_event(&[], &[]).unwrap_err(), AbiError::MissingTopics);
    }

    #[test]
    fn batch_survives_malformed_foreign_log() {
        let malformed = json!({"topics": ["0x11"], "data": "0x", "logIndex": "0x1"});
        let entries = decoder().decode_logs(vec![
            transfer_log(1),
            malformed.clone(),
            foreign_log(),
            transfer_log(3),
        ]);
        let decoded: Vec<_> = entries.iter().map(LogEntry::is_decoded).collect();
        assert_eq!(decoded, [true, false, false, true]);
        assert_eq!(entries[1], LogEntry::Raw(malformed));
        assert_eq!(entries[2], LogEntry::Raw(foreign_log()));
    }
}
