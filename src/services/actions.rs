//! Action allowlist and dispatch for elements inside the consent prompt.
//!
//! Elements declare actions with an `on` attribute such as
//! `on="tap:my-consent.accept"`. A namespace may only trigger actions that
//! were added to the allowlist for it.

use std::fmt;
use std::sync::{Mutex, PoisonError};

use serde::Serialize;

/// One `(namespace, action)` pair permitted to be triggered
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct AllowlistEntry {
    pub namespace: String,
    pub action: String,
}

/// A parsed `event:target.method` handler from an `on` attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionInvocation {
    pub event: String,
    pub target: String,
    pub method: String,
}

impl ActionInvocation {
    pub fn new(event: &str, target: &str, method: &str) -> Self {
        Self {
            event: event.to_string(),
            target: target.to_string(),
            method: method.to_string(),
        }
    }

    /// Parse every handler declared in an `on` attribute. Handlers are
    /// separated by `;`; malformed entries are skipped.
    pub fn parse_all(on: &str) -> Vec<ActionInvocation> {
        on.split(';').filter_map(Self::parse).collect()
    }

    /// Parse a single `event:target.method` handler
    pub fn parse(handler: &str) -> Option<ActionInvocation> {
        let (event, rest) = handler.trim().split_once(':')?;
        let (target, method) = rest.trim().split_once('.')?;
        let (event, target, method) = (event.trim(), target.trim(), method.trim());
        if event.is_empty() || target.is_empty() || method.is_empty() {
            return None;
        }
        Some(ActionInvocation::new(event, target, method))
    }
}

impl fmt::Display for ActionInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}.{}", self.event, self.target, self.method)
    }
}

pub trait ActionService: Send + Sync {
    /// Permit `action` to be triggered on elements of `namespace`
    fn add_to_allowlist(&self, namespace: &str, action: &str);

    /// Dispatch an action declared by an element inside the prompt
    fn trigger(&self, invocation: &ActionInvocation);
}

/// Action service that only records what it was asked to do
#[derive(Default)]
pub struct RecordingActions {
    allowlist: Mutex<Vec<AllowlistEntry>>,
    triggered: Mutex<Vec<ActionInvocation>>,
}

impl RecordingActions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allowlist calls in the order they were made
    pub fn allowlist(&self) -> Vec<AllowlistEntry> {
        self.allowlist
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn triggered(&self) -> Vec<ActionInvocation> {
        self.triggered
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_allowed(&self, namespace: &str, action: &str) -> bool {
        self.allowlist
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .any(|e| e.namespace == namespace && e.action == action)
    }
}

impl ActionService for RecordingActions {
    fn add_to_allowlist(&self, namespace: &str, action: &str) {
        let mut list = self.allowlist.lock().unwrap_or_else(PoisonError::into_inner);
        list.push(AllowlistEntry {
            namespace: namespace.to_string(),
            action: action.to_string(),
        });
    }

    fn trigger(&self, invocation: &ActionInvocation) {
        let mut list = self.triggered.lock().unwrap_or_else(PoisonError::into_inner);
        list.push(invocation.clone());
    }
}
