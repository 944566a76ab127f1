//! Engine configuration (TOML)
//!
//! ```toml
//! [text]
//! cache_capacity = 256
//! default_font_size = 14.0
//!
//! [accessibility]
//! validation = "normalize"   # or "reject"
//!
//! [input]
//! max_states = 0             # 0 = unbounded
//! ```

use mcore_a11y::ValidationPolicy;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Top-level engine configuration
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub text: TextConfig,
    #[serde(default)]
    pub accessibility: AccessibilityConfig,
    #[serde(default)]
    pub input: InputConfig,
}

/// Text system settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TextConfig {
    /// Number of layouts kept in the LRU cache
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
    /// Used when a caller passes a non-positive font size
    #[serde(default = "default_font_size")]
    pub default_font_size: f32,
}

fn default_cache_capacity() -> usize {
    mcore_text::DEFAULT_CACHE_CAPACITY
}

fn default_font_size() -> f32 {
    14.0
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            cache_capacity: default_cache_capacity(),
            default_font_size: default_font_size(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationMode {
    #[default]
    Normalize,
    Reject,
}

impl From<ValidationMode> for ValidationPolicy {
    fn from(mode: ValidationMode) -> Self {
        match mode {
            ValidationMode::Normalize => ValidationPolicy::Normalize,
            ValidationMode::Reject => ValidationPolicy::Reject,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct AccessibilityConfig {
    #[serde(default)]
    pub validation: ValidationMode,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct InputConfig {
    /// Live text input states before the least recently used is evicted
    #[serde(default)]
    pub max_states: usize,
}

impl EngineConfig {
    /// Parse a TOML document. Missing sections and keys take their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// `size` if positive, otherwise the configured default.
    pub fn font_size_or_default(&self, size: f32) -> f32 {
        if size > 0.0 && size.is_finite() {
            size
        } else {
            self.text.default_font_size
        }
    }
}
