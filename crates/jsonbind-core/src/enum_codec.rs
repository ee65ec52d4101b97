//! Strict string-only enum codec.
//!
//! Enums cross the wire as their declared names, case preserved. Numeric
//! ordinals are never written and never accepted. Rust enums deriving
//! `Serialize`/`Deserialize` without `rename_all` already follow the same
//! policy through `serde_json`; `EnumType` applies it to enums that are only
//! known at runtime from an operation signature.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A runtime enum description: its name and declared enumerant names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumType {
    pub name: String,
    pub variants: Vec<String>,
}

/// Why a value was not accepted as an enumerant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumRejection {
    pub enum_name: String,
    /// The offending value, rendered as JSON.
    pub found: String,
}

impl EnumType {
    pub fn new<I, S>(name: impl Into<String>, variants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            variants: variants.into_iter().map(Into::into).collect(),
        }
    }

    /// Look up a declared name. Matching is exact and case-sensitive.
    pub fn variant(&self, name: &str) -> Option<&str> {
        self.variants
            .iter()
            .find(|v| v.as_str() == name)
            .map(String::as_str)
    }

    /// Decode a string into a declared enumerant.
    pub fn decode_str(&self, raw: &str) -> Result<&str, EnumRejection> {
        self.variant(raw)
            .ok_or_else(|| self.reject(&Value::String(raw.to_string())))
    }

    /// Validate a materialized JSON value. Anything but a declared name fails.
    pub fn decode(&self, value: &Value) -> Result<&str, EnumRejection> {
        match value {
            Value::String(s) => self.decode_str(s),
            other => Err(self.reject(other)),
        }
    }

    /// Encode an enumerant as its wire form.
    pub fn encode(&self, name: &str) -> Result<Value, EnumRejection> {
        self.decode_str(name).map(|v| Value::String(v.to_string()))
    }

    /// The zero value: the first declared enumerant.
    pub fn default_value(&self) -> Value {
        self.variants
            .first()
            .map(|v| Value::String(v.clone()))
            .unwrap_or(Value::Null)
    }

    pub(crate) fn reject(&self, found: &Value) -> EnumRejection {
        EnumRejection {
            enum_name: self.name.clone(),
            found: found.to_string(),
        }
    }
}
