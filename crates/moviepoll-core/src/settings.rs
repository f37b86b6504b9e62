//! Typed settings stored in the data file
//!
//! Each key holds a string, integer or boolean. Readers ask for the kind
//! they want and the stored value is coerced:
//!
//! | stored \ read | string        | int           | bool           |
//! |---------------|---------------|---------------|----------------|
//! | string        | as is         | decimal parse | boolean parse  |
//! | int           | decimal       | as is         | nonzero = true |
//! | bool          | true / false  | 1 / 0         | as is          |
//!
//! On disk a value is `{"Type": <tag>, "Value": <json>}` with tags
//! 0 = string, 1 = int, 2 = bool.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Setting enabled on a freshly created store
pub const ACTIVE_KEY: &str = "Active";

/// Kind of a setting value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingKind {
    String,
    Int,
    Bool,
}

impl SettingKind {
    fn tag(self) -> u8 {
        match self {
            SettingKind::String => 0,
            SettingKind::Int => 1,
            SettingKind::Bool => 2,
        }
    }
}

impl fmt::Display for SettingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SettingKind::String => "string",
            SettingKind::Int => "int",
            SettingKind::Bool => "bool",
        };
        f.write_str(name)
    }
}

impl FromStr for SettingKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "string" | "str" => Ok(SettingKind::String),
            "int" | "integer" => Ok(SettingKind::Int),
            "bool" | "boolean" => Ok(SettingKind::Bool),
            other => Err(format!(
                "unknown setting kind '{}' (expected string, int or bool)",
                other
            )),
        }
    }
}

/// A tagged setting value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSetting", into = "RawSetting")]
pub enum SettingValue {
    String(String),
    Int(i64),
    Bool(bool),
}

impl SettingValue {
    pub fn kind(&self) -> SettingKind {
        match self {
            SettingValue::String(_) => SettingKind::String,
            SettingValue::Int(_) => SettingKind::Int,
            SettingValue::Bool(_) => SettingKind::Bool,
        }
    }

    /// Read as a string; never fails
    pub fn to_string_value(&self) -> String {
        match self {
            SettingValue::String(s) => s.clone(),
            SettingValue::Int(i) => i.to_string(),
            SettingValue::Bool(b) => b.to_string(),
        }
    }

    /// Read as an integer; `None` if a stored string is not a decimal number
    pub fn to_int(&self) -> Option<i64> {
        match self {
            SettingValue::String(s) => s.parse().ok(),
            SettingValue::Int(i) => Some(*i),
            SettingValue::Bool(b) => Some(i64::from(*b)),
        }
    }

    /// Read as a boolean; `None` if a stored string is not a boolean
    pub fn to_bool(&self) -> Option<bool> {
        match self {
            SettingValue::String(s) => parse_bool(s),
            SettingValue::Int(i) => Some(*i != 0),
            SettingValue::Bool(b) => Some(*b),
        }
    }

    /// Parse user input as a value of the given kind
    pub fn parse_as(kind: SettingKind, input: &str) -> Option<Self> {
        match kind {
            SettingKind::String => Some(SettingValue::String(input.to_string())),
            SettingKind::Int => input.trim().parse().ok().map(SettingValue::Int),
            SettingKind::Bool => parse_bool(input.trim()).map(SettingValue::Bool),
        }
    }
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_value())
    }
}

/// Accepted boolean spellings
fn parse_bool(s: &str) -> Option<bool> {
    match s {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

/// On-disk shape of a setting value
#[derive(Serialize, Deserialize)]
struct RawSetting {
    #[serde(rename = "Type")]
    kind: u8,
    #[serde(rename = "Value")]
    value: serde_json::Value,
}

impl TryFrom<RawSetting> for SettingValue {
    type Error = String;

    fn try_from(raw: RawSetting) -> std::result::Result<Self, Self::Error> {
        use serde_json::Value;

        match (raw.kind, raw.value) {
            (0, Value::String(s)) => Ok(SettingValue::String(s)),
            (1, Value::Number(n)) => n
                .as_i64()
                .or_else(|| n.as_f64().and_then(integral_f64))
                .map(SettingValue::Int)
                .ok_or_else(|| format!("int setting holds non-integer {}", n)),
            (2, Value::Bool(b)) => Ok(SettingValue::Bool(b)),
            (kind @ 0..=2, value) => Err(format!(
                "setting type {} does not match value {}",
                kind, value
            )),
            (kind, _) => Err(format!("unknown setting type {}", kind)),
        }
    }
}

/// Exact i64 value of an integral float, if it fits
fn integral_f64(f: f64) -> Option<i64> {
    // i64::MAX as f64 rounds up to 2^63, which is already out of range
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

impl From<SettingValue> for RawSetting {
    fn from(value: SettingValue) -> Self {
        let kind = value.kind().tag();
        let value = match value {
            SettingValue::String(s) => serde_json::Value::from(s),
            SettingValue::Int(i) => serde_json::Value::from(i),
            SettingValue::Bool(b) => serde_json::Value::from(b),
        };
        RawSetting { kind, value }
    }
}

/// The settings table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Settings {
    values: BTreeMap<String, SettingValue>,
}

impl Settings {
    /// Settings for a brand new store
    pub fn with_defaults() -> Self {
        let mut settings = Self::default();
        settings.set(ACTIVE_KEY, SettingValue::Bool(true));
        settings
    }

    pub fn get(&self, key: &str) -> Option<&SettingValue> {
        self.values.get(key)
    }

    /// Read a string, or `default` if the key is missing
    pub fn get_string(&self, key: &str, default: &str) -> String {
        self.values
            .get(key)
            .map(SettingValue::to_string_value)
            .unwrap_or_else(|| default.to_string())
    }

    /// Read an integer, or `default` if the key is missing
    pub fn get_int(&self, key: &str, default: i64) -> Result<i64> {
        match self.values.get(key) {
            None => Ok(default),
            Some(value) => value
                .to_int()
                .ok_or_else(|| parse_error(key, SettingKind::Int, value)),
        }
    }

    /// Read a boolean, or `default` if the key is missing
    pub fn get_bool(&self, key: &str, default: bool) -> Result<bool> {
        match self.values.get(key) {
            None => Ok(default),
            Some(value) => value
                .to_bool()
                .ok_or_else(|| parse_error(key, SettingKind::Bool, value)),
        }
    }

    /// Overwrite a key's kind and value
    pub fn set(&mut self, key: impl Into<String>, value: SettingValue) {
        self.values.insert(key.into(), value);
    }

    /// Remove a key; missing keys are ignored
    pub fn remove(&mut self, key: &str) -> Option<SettingValue> {
        self.values.remove(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SettingValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

fn parse_error(key: &str, kind: SettingKind, value: &SettingValue) -> Error {
    Error::Parse {
        key: key.to_string(),
        kind,
        value: value.to_string_value(),
    }
}
