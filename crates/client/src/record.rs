//! Record type tags and values as they travel in the `type` and `value`
//! query parameters.

use crate::{Method, OstrichError, OstrichResult};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordType {
    String,
    Integer,
    Float,
    Boolean,
    Char,
    StringArray,
    IntegerArray,
    FloatArray,
    BooleanArray,
    CharArray,
    Date,
    Time,
    DateTime,
    Uuid,
    Null,
    DateArray,
    TimeArray,
    DateTimeArray,
    UuidArray,
}

impl RecordType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::String => "STRING",
            RecordType::Integer => "INTEGER",
            RecordType::Float => "FLOAT",
            RecordType::Boolean => "BOOLEAN",
            RecordType::Char => "CHAR",
            RecordType::StringArray => "STRING[]",
            RecordType::IntegerArray => "INTEGER[]",
            RecordType::FloatArray => "FLOAT[]",
            RecordType::BooleanArray => "BOOLEAN[]",
            RecordType::CharArray => "CHAR[]",
            RecordType::Date => "DATE",
            RecordType::Time => "TIME",
            RecordType::DateTime => "DATETIME",
            RecordType::Uuid => "UUID",
            RecordType::Null => "NULL",
            RecordType::DateArray => "DATE[]",
            RecordType::TimeArray => "TIME[]",
            RecordType::DateTimeArray => "DATETIME[]",
            RecordType::UuidArray => "UUID[]",
        }
    }

    pub fn is_array(&self) -> bool {
        self.as_str().ends_with("[]")
    }
}

impl Display for RecordType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordType {
    type Err = OstrichError;

    fn from_str(s: &str) -> OstrichResult<Self> {
        let upper = s.trim().to_ascii_uppercase();
        let (base, array) = match upper.strip_suffix("[]") {
            Some(base) => (base, true),
            None => (upper.as_str(), false),
        };

        let ty = match (base, array) {
            ("STRING" | "STR", false) => RecordType::String,
            ("INTEGER" | "INT", false) => RecordType::Integer,
            ("FLOAT" | "FLT", false) => RecordType::Float,
            ("BOOLEAN" | "BOOL", false) => RecordType::Boolean,
            ("CHAR", false) => RecordType::Char,
            ("STRING" | "STR", true) => RecordType::StringArray,
            ("INTEGER" | "INT", true) => RecordType::IntegerArray,
            ("FLOAT" | "FLT", true) => RecordType::FloatArray,
            ("BOOLEAN" | "BOOL", true) => RecordType::BooleanArray,
            ("CHAR", true) => RecordType::CharArray,
            ("DATE", false) => RecordType::Date,
            ("TIME", false) => RecordType::Time,
            ("DATETIME", false) => RecordType::DateTime,
            ("UUID", false) => RecordType::Uuid,
            ("NULL", false) => RecordType::Null,
            ("DATE", true) => RecordType::DateArray,
            ("TIME", true) => RecordType::TimeArray,
            ("DATETIME", true) => RecordType::DateTimeArray,
            ("UUID", true) => RecordType::UuidArray,
            _ => {
                return Err(OstrichError::validation(format!(
                    "unknown record type {:?}",
                    s
                )))
            }
        };
        Ok(ty)
    }
}

impl Serialize for RecordType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RecordType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A record value in the textual form the server expects.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordValue(String);

impl RecordValue {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Render a JSON value as record text: strings unquoted, arrays as
    /// `[a,b,c]` with their elements rendered the same way.
    pub fn from_json(value: &Value) -> Self {
        fn render(value: &Value) -> String {
            match value {
                Value::String(s) => s.clone(),
                Value::Null => "null".to_string(),
                Value::Bool(b) => b.to_string(),
                Value::Number(n) => n.to_string(),
                Value::Array(items) => format!(
                    "[{}]",
                    items.iter().map(render).collect::<Vec<_>>().join(",")
                ),
                Value::Object(_) => value.to_string(),
            }
        }
        Self(render(value))
    }
}

impl Display for RecordValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordValue {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for RecordValue {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Optional `type` / `value` query parameters for record requests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordParams {
    pub record_type: Option<RecordType>,
    pub value: Option<RecordValue>,
}

impl RecordParams {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn typed(record_type: RecordType) -> Self {
        Self {
            record_type: Some(record_type),
            value: None,
        }
    }

    pub fn with_value(record_type: RecordType, value: impl Into<RecordValue>) -> Self {
        Self {
            record_type: Some(record_type),
            value: Some(value.into()),
        }
    }

    /// Query pairs the given method sends on a record path.
    ///
    /// POST creates a record and needs its type; PUT sets the value and needs
    /// both. GET, DELETE and HEAD send nothing, even when parameters are set.
    pub fn query_for(&self, method: Method) -> OstrichResult<Vec<(&'static str, String)>> {
        let require_type = || {
            self.record_type.ok_or_else(|| {
                OstrichError::validation(format!("{} on a record requires a record type", method))
            })
        };

        match method {
            Method::Post => Ok(vec![("type", require_type()?.to_string())]),
            Method::Put => {
                let ty = require_type()?;
                let value = self.value.as_ref().ok_or_else(|| {
                    OstrichError::validation("PUT on a record requires a value")
                })?;
                Ok(vec![("type", ty.to_string()), ("value", value.to_string())])
            }
            Method::Get | Method::Delete | Method::Head => Ok(Vec::new()),
        }
    }
}
