//! Pass configuration.
//!
//! A [`PassConfig`] is resolved once per transformer from defaults and a
//! [`PartialPassConfig`] of overrides, then shared read-only by every file.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::SpoofError;

// ============================================================================
// RESOLVED CONFIGURATION
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PassConfig {
    /// Report malformed markers to the diagnostic sink.
    pub verbose: bool,
    /// Rewrite `_spoof`-suffixed enum declarations.
    pub spoof_enum: bool,
    /// Enable the one-argument `$spoof("s")` form.
    pub per_character_offsets: bool,
    /// Enable the two-argument `$spoof("s", n)` form.
    pub shared_offset: bool,
    /// Runtime callee that turns character codes back into a string.
    pub decoder: DecoderPath,
}

impl Default for PassConfig {
    fn default() -> Self {
        Self {
            verbose: true,
            spoof_enum: true,
            per_character_offsets: true,
            shared_offset: true,
            decoder: DecoderPath::default(),
        }
    }
}

// ============================================================================
// OVERRIDES
// ============================================================================

/// User-supplied overrides; absent fields keep their default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PartialPassConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verbose: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spoof_enum: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub per_character_offsets: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shared_offset: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decoder: Option<DecoderPath>,
}

impl PartialPassConfig {
    pub fn from_json_str(json: &str) -> Result<Self, SpoofError> {
        serde_json::from_str(json).map_err(|e| SpoofError::config(e.to_string()))
    }

    /// Layer `other` on top of `self`; fields set in `other` win.
    pub fn merge(self, other: PartialPassConfig) -> Self {
        Self {
            verbose: other.verbose.or(self.verbose),
            spoof_enum: other.spoof_enum.or(self.spoof_enum),
            per_character_offsets: other.per_character_offsets.or(self.per_character_offsets),
            shared_offset: other.shared_offset.or(self.shared_offset),
            decoder: other.decoder.or(self.decoder),
        }
    }

    /// Apply the overrides to the defaults.
    pub fn resolve(self) -> PassConfig {
        let defaults = PassConfig::default();
        PassConfig {
            verbose: self.verbose.unwrap_or(defaults.verbose),
            spoof_enum: self.spoof_enum.unwrap_or(defaults.spoof_enum),
            per_character_offsets: self
                .per_character_offsets
                .unwrap_or(defaults.per_character_offsets),
            shared_offset: self.shared_offset.unwrap_or(defaults.shared_offset),
            decoder: self.decoder.unwrap_or(defaults.decoder),
        }
    }
}

// ============================================================================
// DECODER PATH
// ============================================================================

/// Dotted identifier path such as `string.char`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DecoderPath(Vec<String>);

impl DecoderPath {
    pub fn segments(&self) -> &[String] {
        &self.0
    }
}

impl Default for DecoderPath {
    fn default() -> Self {
        Self(vec!["string".to_string(), "char".to_string()])
    }
}

impl FromStr for DecoderPath {
    type Err = SpoofError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let segments: Vec<String> = s.split('.').map(|seg| seg.trim().to_string()).collect();
        if let Some(bad) = segments.iter().find(|seg| !is_identifier(seg)) {
            return Err(SpoofError::config(format!(
                "decoder `{s}` is not a dotted identifier path (bad segment `{bad}`)"
            )));
        }
        Ok(Self(segments))
    }
}

impl TryFrom<String> for DecoderPath {
    type Error = SpoofError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DecoderPath> for String {
    fn from(path: DecoderPath) -> Self {
        path.to_string()
    }
}

impl fmt::Display for DecoderPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("."))
    }
}

fn is_identifier(segment: &str) -> bool {
    let mut chars = segment.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}
