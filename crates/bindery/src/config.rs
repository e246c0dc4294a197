//! Binder configuration, loadable from TOML.
//!
//! ```toml
//! body = "required"
//! sequence-keys = "repeated"
//! atomic = true
//! max-depth = 16
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Default bound on nested record depth.
pub const DEFAULT_MAX_DEPTH: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct BinderConfig {
    /// Whether a request without any body is an error.
    pub body: BodyMode,
    /// How elements of fixed-size array fields find their values.
    pub sequence_keys: SequenceKeys,
    /// Bind into a scratch copy and swap it in only on success.
    pub atomic: bool,
    /// Maximum nesting of records below the destination.
    pub max_depth: usize,
}

/// Whether an absent body fails the binding pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BodyMode {
    Required,
    #[default]
    Optional,
}

/// Key policy for the elements of a `[T; N]` field bound under `key`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SequenceKeys {
    /// Element `i` reads `key[i]`.
    #[default]
    Indexed,
    /// Element `i` reads the `i`-th occurrence of `key` (`?key=a&key=b`).
    Repeated,
    /// Every element reads `key` itself and receives the same value.
    Shared,
}

impl Default for BinderConfig {
    fn default() -> Self {
        Self {
            body: BodyMode::Optional,
            sequence_keys: SequenceKeys::Indexed,
            atomic: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl BinderConfig {
    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn require_body(mut self) -> Self {
        self.body = BodyMode::Required;
        self
    }

    pub fn with_sequence_keys(mut self, policy: SequenceKeys) -> Self {
        self.sequence_keys = policy;
        self
    }

    pub fn atomic(mut self, atomic: bool) -> Self {
        self.atomic = atomic;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}
