//! Serde support and the JSON/YAML codec boundary.
//!
//! Serialization is cycle-safe: a container that is already on the current
//! path from the root is rendered as the string `"[Circular]"` instead of
//! recursing forever. Accessor properties serialize as their evaluated
//! snapshot; non-enumerable properties are skipped.

use std::cell::RefCell;
use std::fmt;

use serde::de::{MapAccess, SeqAccess, Visitor};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use super::value::{container_id, Record, Value, CIRCULAR_MARKER};

/// Error type for the codec boundary.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("JSON codec error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML codec error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let path = RefCell::new(Vec::new());
        CycleSafe { value: self, path: &path }.serialize(serializer)
    }
}

/// Wrapper that threads the visited-container path through nested
/// serialization calls. The path is allocated fresh per top-level call, so
/// serialization stays reentrant.
struct CycleSafe<'a> {
    value: &'a Value,
    path: &'a RefCell<Vec<usize>>,
}

impl Serialize for CycleSafe<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self.value {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Float(x) => serializer.serialize_f64(*x),
            Value::String(s) => serializer.serialize_str(s),
            Value::Sequence(rc) => {
                let id = container_id(rc);
                if self.path.borrow().contains(&id) {
                    return serializer.serialize_str(CIRCULAR_MARKER);
                }
                self.path.borrow_mut().push(id);
                let items: Vec<Value> = rc.borrow().clone();
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in &items {
                    seq.serialize_element(&CycleSafe {
                        value: item,
                        path: self.path,
                    })?;
                }
                let done = seq.end()?;
                self.path.borrow_mut().pop();
                Ok(done)
            }
            Value::Record(rc) => {
                let id = container_id(rc);
                if self.path.borrow().contains(&id) {
                    return serializer.serialize_str(CIRCULAR_MARKER);
                }
                self.path.borrow_mut().push(id);
                let record = rc.borrow();
                let entries: Vec<(String, Value)> = record
                    .iter()
                    .filter(|(_, p)| p.enumerable)
                    .map(|(k, p)| (k.to_string(), p.read(&record)))
                    .collect();
                drop(record);
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in &entries {
                    map.serialize_entry(key, &CycleSafe { value, path: self.path })?;
                }
                let done = map.end()?;
                self.path.borrow_mut().pop();
                Ok(done)
            }
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> Result<Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(ValueVisitor)
    }
}

struct ValueVisitor;

impl<'de> Visitor<'de> for ValueVisitor {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a JSON-compatible value")
    }

    fn visit_unit<E>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_none<E>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_some<D>(self, deserializer: D) -> Result<Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        Deserialize::deserialize(deserializer)
    }

    fn visit_bool<E>(self, b: bool) -> Result<Value, E> {
        Ok(Value::Bool(b))
    }

    fn visit_i64<E>(self, i: i64) -> Result<Value, E> {
        Ok(Value::Int(i))
    }

    fn visit_u64<E>(self, u: u64) -> Result<Value, E> {
        if u <= i64::MAX as u64 {
            Ok(Value::Int(u as i64))
        } else {
            Ok(Value::Float(u as f64))
        }
    }

    fn visit_f64<E>(self, f: f64) -> Result<Value, E> {
        Ok(Value::Float(f))
    }

    fn visit_str<E>(self, s: &str) -> Result<Value, E> {
        Ok(Value::String(s.to_string()))
    }

    fn visit_string<E>(self, s: String) -> Result<Value, E> {
        Ok(Value::String(s))
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut items = Vec::new();
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(Value::sequence(items))
    }

    fn visit_map<A>(self, mut map: A) -> Result<Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut record = Record::new();
        while let Some((key, value)) = map.next_entry::<String, Value>()? {
            record.set(&key, value);
        }
        Ok(Value::record(record))
    }
}

/// Parses a value from JSON, preserving document key order.
pub fn from_json(json: &str) -> Result<Value, CodecError> {
    Ok(serde_json::from_str(json)?)
}

/// Serializes a value to compact JSON.
pub fn to_json(value: &Value) -> Result<String, CodecError> {
    Ok(serde_json::to_string(value)?)
}

/// Parses a value from YAML.
pub fn from_yaml(yaml: &str) -> Result<Value, CodecError> {
    Ok(serde_yaml::from_str(yaml)?)
}

/// Serializes a value to YAML.
pub fn to_yaml(value: &Value) -> Result<String, CodecError> {
    Ok(serde_yaml::to_string(value)?)
}
