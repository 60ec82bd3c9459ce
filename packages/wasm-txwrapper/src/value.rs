//! Dynamic values flowing through the registry-driven codec
//!
//! Encoding accepts loosely typed input (JSON numbers, decimal strings, SS58
//! strings) and coerces it against the target type. Decoding always produces
//! the canonical variant for a type, so `decode(encode(v)) == v` holds for
//! canonical values.

use crate::address::encode_ss58;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// Largest integer a JS number represents exactly (2^53 - 1)
pub const MAX_SAFE_INTEGER: u128 = 9_007_199_254_740_991;

/// Fields of a struct, tuple or enum variant
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Composite {
    Named(Vec<(String, Value)>),
    Unnamed(Vec<Value>),
}

impl Composite {
    pub fn len(&self) -> usize {
        match self {
            Composite::Named(fields) => fields.len(),
            Composite::Unnamed(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Field values in declared order
    pub fn values(&self) -> Vec<&Value> {
        match self {
            Composite::Named(fields) => fields.iter().map(|(_, v)| v).collect(),
            Composite::Unnamed(values) => values.iter().collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        match self {
            Composite::Named(fields) => fields.iter().find(|(n, _)| n == name).map(|(_, v)| v),
            Composite::Unnamed(_) => None,
        }
    }
}

/// A decoded or to-be-encoded value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Bool(bool),
    UInt(u128),
    Int(i128),
    Char(char),
    String(String),
    Bytes(Vec<u8>),
    AccountId([u8; 32]),
    Sequence(Vec<Value>),
    Composite(Composite),
    Variant(String, Composite),
    Option(Option<Box<Value>>),
}

impl Value {
    pub fn u128(value: u128) -> Self {
        Value::UInt(value)
    }

    pub fn string(value: impl Into<String>) -> Self {
        Value::String(value.into())
    }

    pub fn account(public_key: [u8; 32]) -> Self {
        Value::AccountId(public_key)
    }

    pub fn named<S: Into<String>>(fields: impl IntoIterator<Item = (S, Value)>) -> Self {
        Value::Composite(Composite::Named(
            fields.into_iter().map(|(n, v)| (n.into(), v)).collect(),
        ))
    }

    pub fn unnamed(values: impl IntoIterator<Item = Value>) -> Self {
        Value::Composite(Composite::Unnamed(values.into_iter().collect()))
    }

    pub fn variant(name: impl Into<String>, values: impl IntoIterator<Item = Value>) -> Self {
        Value::Variant(name.into(), Composite::Unnamed(values.into_iter().collect()))
    }

    pub fn unit_variant(name: impl Into<String>) -> Self {
        Value::Variant(name.into(), Composite::Unnamed(Vec::new()))
    }

    /// Short label used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::UInt(_) => "unsigned integer",
            Value::Int(_) => "signed integer",
            Value::Char(_) => "char",
            Value::String(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::AccountId(_) => "account id",
            Value::Sequence(_) => "sequence",
            Value::Composite(_) => "composite",
            Value::Variant(_, _) => "variant",
            Value::Option(_) => "option",
        }
    }

    pub fn as_u128(&self) -> Option<u128> {
        match self {
            Value::UInt(v) => Some(*v),
            Value::Int(v) if *v >= 0 => Some(*v as u128),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Account id carried by this value, looking through a `MultiAddress::Id`
    pub fn as_account_id(&self) -> Option<[u8; 32]> {
        match self {
            Value::AccountId(pk) => Some(*pk),
            Value::Variant(name, fields) if name == "Id" && fields.len() == 1 => {
                fields.values()[0].as_account_id()
            }
            Value::Composite(fields) if fields.len() == 1 => fields.values()[0].as_account_id(),
            _ => None,
        }
    }

    /// Render as JSON for display or for crossing the WASM boundary
    pub fn to_json(&self, options: &RenderOptions) -> JsonValue {
        match self {
            Value::Bool(b) => JsonValue::Bool(*b),
            Value::UInt(v) => render_integer(*v, false, options.numeric_output_mode),
            Value::Int(v) => render_integer(v.unsigned_abs(), *v < 0, options.numeric_output_mode),
            Value::Char(c) => JsonValue::String(c.to_string()),
            Value::String(s) => JsonValue::String(s.clone()),
            Value::Bytes(bytes) => JsonValue::String(format!("0x{}", hex::encode(bytes))),
            Value::AccountId(pk) => match encode_ss58(pk, options.ss58_prefix) {
                Ok(address) => JsonValue::String(address),
                Err(_) => JsonValue::String(format!("0x{}", hex::encode(pk))),
            },
            Value::Sequence(values) => {
                JsonValue::Array(values.iter().map(|v| v.to_json(options)).collect())
            }
            Value::Composite(fields) => composite_to_json(fields, options),
            Value::Variant(name, fields) if fields.is_empty() => JsonValue::String(name.clone()),
            Value::Variant(name, fields) => {
                let mut map = Map::new();
                map.insert(name.clone(), composite_to_json(fields, options));
                JsonValue::Object(map)
            }
            Value::Option(None) => JsonValue::Null,
            Value::Option(Some(inner)) => inner.to_json(options),
        }
    }
}

fn composite_to_json(fields: &Composite, options: &RenderOptions) -> JsonValue {
    match fields {
        Composite::Named(fields) => JsonValue::Object(
            fields
                .iter()
                .map(|(name, value)| (name.clone(), value.to_json(options)))
                .collect(),
        ),
        // Newtypes render as their inner value
        Composite::Unnamed(values) if values.len() == 1 => values[0].to_json(options),
        Composite::Unnamed(values) => {
            JsonValue::Array(values.iter().map(|v| v.to_json(options)).collect())
        }
    }
}

fn render_integer(magnitude: u128, negative: bool, mode: NumericOutputMode) -> JsonValue {
    let text = if negative {
        format!("-{}", magnitude)
    } else {
        magnitude.to_string()
    };
    match mode {
        NumericOutputMode::String => JsonValue::String(text),
        NumericOutputMode::Number if magnitude <= MAX_SAFE_INTEGER => {
            let n = magnitude as i64;
            JsonValue::from(if negative { -n } else { n })
        }
        NumericOutputMode::Number => JsonValue::String(text),
    }
}

impl From<&JsonValue> for Value {
    fn from(json: &JsonValue) -> Self {
        match json {
            JsonValue::Null => Value::Option(None),
            JsonValue::Bool(b) => Value::Bool(*b),
            JsonValue::Number(n) => {
                if let Some(u) = n.as_u64() {
                    Value::UInt(u as u128)
                } else if let Some(i) = n.as_i64() {
                    Value::Int(i as i128)
                } else {
                    // Floats never encode; keep the text so the error names it
                    Value::String(n.to_string())
                }
            }
            JsonValue::String(s) => Value::String(s.clone()),
            JsonValue::Array(items) => Value::Sequence(items.iter().map(Value::from).collect()),
            JsonValue::Object(map) => Value::Composite(Composite::Named(
                map.iter().map(|(k, v)| (k.clone(), Value::from(v))).collect(),
            )),
        }
    }
}

impl From<JsonValue> for Value {
    fn from(json: JsonValue) -> Self {
        Value::from(&json)
    }
}

/// How decoded integers are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NumericOutputMode {
    /// Base-10 strings for every integer (safe for arbitrary on-chain amounts)
    #[default]
    String,
    /// Native numbers when they fit in 2^53 - 1, strings otherwise
    Number,
}

/// Options for [`Value::to_json`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    pub numeric_output_mode: NumericOutputMode,
    pub ss58_prefix: u16,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions {
            numeric_output_mode: NumericOutputMode::String,
            ss58_prefix: 42,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_numeric_output_modes() {
        let strings = RenderOptions::default();
        let numbers = RenderOptions {
            numeric_output_mode: NumericOutputMode::Number,
            ..Default::default()
        };

        assert_eq!(Value::UInt(12345).to_json(&strings), json!("12345"));
        assert_eq!(Value::UInt(12345).to_json(&numbers), json!(12345));
        assert_eq!(Value::Int(-5).to_json(&numbers), json!(-5));
        // Above 2^53 - 1 stays a string even in number mode
        let big = MAX_SAFE_INTEGER + 1;
        assert_eq!(Value::UInt(big).to_json(&numbers), json!(big.to_string()));
        assert_eq!(
            Value::UInt(MAX_SAFE_INTEGER).to_json(&numbers),
            json!(9_007_199_254_740_991u64)
        );
    }

    #[test]
    fn test_render_composites() {
        let options = RenderOptions::default();
        let value = Value::named([
            ("dest", Value::variant("Id", [Value::account([0u8; 32])])),
            ("value", Value::UInt(1)),
            ("flag", Value::unit_variant("Staked")),
            ("memo", Value::Bytes(vec![0xde, 0xad])),
            ("maybe", Value::Option(None)),
        ]);
        let rendered = value.to_json(&options);
        assert_eq!(rendered["value"], json!("1"));
        assert_eq!(rendered["flag"], json!("Staked"));
        assert_eq!(rendered["memo"], json!("0xdead"));
        assert_eq!(rendered["maybe"], JsonValue::Null);
        assert!(rendered["dest"]["Id"].as_str().unwrap().starts_with('5'));
    }

    #[test]
    fn test_from_json() {
        let value = Value::from(json!({ "dest": "5Grw", "value": 10, "neg": -1, "list": [true] }));
        match value {
            Value::Composite(Composite::Named(fields)) => {
                assert_eq!(fields[0].0, "dest");
                assert_eq!(fields[1].1, Value::UInt(10));
                assert_eq!(fields[2].1, Value::Int(-1));
                assert_eq!(fields[3].1, Value::Sequence(vec![Value::Bool(true)]));
            }
            other => panic!("Expected composite, got {:?}", other),
        }
    }

    #[test]
    fn test_as_account_id_through_multiaddress() {
        let pk = [7u8; 32];
        assert_eq!(Value::variant("Id", [Value::account(pk)]).as_account_id(), Some(pk));
        assert_eq!(Value::variant("Index", [Value::UInt(1)]).as_account_id(), None);
    }
}
