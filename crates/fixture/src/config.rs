//! Fixture engine configuration

use serde::{Deserialize, Serialize};

/// Name of the database used when a step does not name one
pub const DEFAULT_DATABASE: &str = "default";

/// Default prefix marking variable tokens, e.g. `$id1`
pub const DEFAULT_VAR_PREFIX: &str = "$";

/// Fixture engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FixtureConfig {
    /// Cell values starting with this prefix are variable tokens.
    /// An empty prefix falls back to `$`.
    pub var_prefix: String,

    /// Maximum number of rows rendered when a failed assertion exposes the
    /// table contents (default: 50)
    pub diagnostic_row_limit: usize,

    /// Database used by table references that do not name one
    pub default_database: String,
}

impl Default for FixtureConfig {
    fn default() -> Self {
        Self {
            var_prefix: DEFAULT_VAR_PREFIX.to_string(),
            diagnostic_row_limit: 50,
            default_database: DEFAULT_DATABASE.to_string(),
        }
    }
}

impl FixtureConfig {
    pub fn with_var_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.var_prefix = prefix.into();
        self
    }

    pub fn with_default_database(mut self, database: impl Into<String>) -> Self {
        self.default_database = database.into();
        self
    }

    /// Prefix actually used for variable detection
    pub fn effective_var_prefix(&self) -> &str {
        if self.var_prefix.is_empty() {
            DEFAULT_VAR_PREFIX
        } else {
            &self.var_prefix
        }
    }
}
