//! Strongly-typed wrappers for game concepts
//!
//! Instead of using bare Strings for different concepts, we wrap them in
//! distinct types that cannot be mixed up.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Template name (unique within a catalog, e.g. "Quick Shot")
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TemplateName(String);

impl TemplateName {
    pub fn new(s: impl Into<String>) -> Self {
        TemplateName(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lookup key: ASCII-folded and lowercased, so "Quick Shot" and
    /// "quick shot" (or an accented variant) find the same template.
    pub fn lookup_key(&self) -> String {
        normalize_name(&self.0)
    }
}

/// Normalize a free-form name for catalog lookup
pub fn normalize_name(name: &str) -> String {
    deunicode::deunicode(name.trim()).to_lowercase()
}

impl fmt::Display for TemplateName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for TemplateName {
    fn from(s: String) -> Self {
        TemplateName(s)
    }
}

impl From<&str> for TemplateName {
    fn from(s: &str) -> Self {
        TemplateName(s.to_string())
    }
}

/// Character name (distinct from other string types)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CharacterName(String);

impl CharacterName {
    pub fn new(s: impl Into<String>) -> Self {
        CharacterName(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CharacterName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for CharacterName {
    fn from(s: String) -> Self {
        CharacterName(s)
    }
}

impl From<&str> for CharacterName {
    fn from(s: &str) -> Self {
        CharacterName(s.to_string())
    }
}
