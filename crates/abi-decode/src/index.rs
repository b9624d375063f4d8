//! Selector and topic lookup tables over a JSON ABI.

use std::collections::HashMap;

use alloy_json_abi::{Event, Function, JsonAbi};
use alloy_primitives::{Selector, B256};
use serde::Serialize;

use crate::error::AbiError;

/// A named signature, e.g. `{ name: "transfer", signature: "transfer(address,uint256)" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignatureEntry {
    pub name: String,
    pub signature: String,
}

/// Immutable lookup tables built once per ABI.
///
/// Functions are keyed by 4-byte selector, events by their topic-0 hash.
/// Anonymous events have no signature topic and are left out of the event
/// table. On a selector or topic collision the first declaration wins.
#[derive(Debug, Clone)]
pub struct AbiIndex {
    functions: HashMap<Selector, Function>,
    events: HashMap<B256, Event>,
    abi: JsonAbi,
}

impl AbiIndex {
    pub fn from_json(json: &str) -> Result<Self, AbiError> {
        let abi: JsonAbi =
            serde_json::from_str(json).map_err(|e| AbiError::InvalidAbi(e.to_string()))?;
        Ok(Self::from_abi(abi))
    }

    pub fn from_abi(abi: JsonAbi) -> Self {
        let mut functions = HashMap::new();
        for func in abi.functions() {
            functions.entry(func.selector()).or_insert_with(|| func.clone());
        }

        let mut events = HashMap::new();
        for event in abi.events().filter(|e| !e.anonymous) {
            events.entry(event.selector()).or_insert_with(|| event.clone());
        }

        Self {
            functions,
            events,
            abi,
        }
    }

    pub fn function(&self, selector: &Selector) -> Option<&Function> {
        self.functions.get(selector)
    }

    pub fn event(&self, topic: &B256) -> Option<&Event> {
        self.events.get(topic)
    }

    pub fn abi(&self) -> &JsonAbi {
        &self.abi
    }

    /// All function signatures, ordered by name.
    pub fn function_signatures(&self) -> Vec<SignatureEntry> {
        self.abi
            .functions()
            .map(|f| SignatureEntry {
                name: f.name.clone(),
                signature: f.signature(),
            })
            .collect()
    }

    /// All event signatures ordered by name, anonymous events included.
    pub fn event_signatures(&self) -> Vec<SignatureEntry> {
        self.abi
            .events()
            .map(|e| SignatureEntry {
                name: e.name.clone(),
                signature: e.signature(),
            })
            .collect()
    }

    /// Topic-0 hash of the event called `name`.
    ///
    /// `None` when no such event exists, when it is anonymous, or when the
    /// name is overloaded and therefore ambiguous.
    pub fn event_topic(&self, name: &str) -> Option<B256> {
        let mut matches = self.abi.events().filter(|e| e.name == name && !e.anonymous);
        let first = matches.next()?;
        match matches.next() {
            Some(_) => None,
            None => Some(first.selector()),
        }
    }
}
