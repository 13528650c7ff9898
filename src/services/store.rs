//! Shared key-value state for the components of one story document

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use serde_json::Value;

/// Keys of the shared store the consent prompt knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateProperty {
    ConsentId,
}

impl StateProperty {
    pub fn key(self) -> &'static str {
        match self {
            StateProperty::ConsentId => "consentId",
        }
    }
}

pub trait StoreService: Send + Sync {
    fn get(&self, property: StateProperty) -> Option<Value>;
    fn set(&self, property: StateProperty, value: Value);
}

/// Store backed by a `Mutex<HashMap>`
#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<HashMap<&'static str, Value>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StoreService for InMemoryStore {
    fn get(&self, property: StateProperty) -> Option<Value> {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.get(property.key()).cloned()
    }

    fn set(&self, property: StateProperty, value: Value) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.insert(property.key(), value);
    }
}
