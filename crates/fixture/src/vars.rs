//! Scenario-scoped variable bindings

use std::collections::HashMap;

/// Values captured for variable tokens during one scenario.
///
/// Owned by a [`crate::Session`]; a new scenario starts from an empty store.
#[derive(Debug, Clone, Default)]
pub struct VariableStore {
    prefix: String,
    values: HashMap<String, String>,
}

impl VariableStore {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            values: HashMap::new(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Whether a cell value is lexically a variable token
    pub fn is_variable(&self, value: &str) -> bool {
        !self.prefix.is_empty() && value.starts_with(&self.prefix)
    }

    /// Encoded value bound to a token
    pub fn lookup(&self, token: &str) -> Option<&str> {
        self.values.get(token).map(String::as_str)
    }

    pub fn is_bound(&self, token: &str) -> bool {
        self.values.contains_key(token)
    }

    /// Bind a token, replacing any previous value
    pub fn bind(&mut self, token: impl Into<String>, value: impl Into<String>) {
        self.values.insert(token.into(), value.into());
    }

    /// Forget every binding
    pub fn reset(&mut self) {
        self.values.clear();
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
