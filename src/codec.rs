//! Conversion between stored payloads (JSON) and the editable YAML text.
//!
//! # Supported data model
//!
//! null, booleans, numbers, strings, sequences and mappings with unique
//! string keys. YAML features outside that model (tags, non-finite floats,
//! complex keys) are rejected instead of silently coerced.
//!
//! Numbers are carried as 64-bit integers or as `f64`. A stored payload
//! with an integer literal outside the 64-bit range, or a float literal
//! outside the `f64` range, is rejected before it is opened for editing,
//! since publishing it again would silently change its value. Such numbers
//! typed into the editor are read as YAML reads them, i.e. as floats.
//!
//! # Canonical form
//!
//! [`canonical`] renders compact JSON with keys in sorted order. It is both
//! the comparison form used to detect edits and the payload that gets
//! published, so two documents that differ only in formatting, comments or
//! key order compare equal.

use crate::error::{Error, Result};
use serde_json::{Map, Number, Value};

/// Decode a stored payload.
///
/// An empty (or whitespace-only) payload decodes to `null`. JSON is tried
/// first; since YAML is a superset of JSON, YAML is the fallback for
/// payloads that were written by other tools. JSON numbers that would not
/// survive the trip unchanged are a [`Error::DecodeInvalid`].
pub fn decode_payload(payload: &[u8]) -> Result<Value> {
    if payload.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }

    match serde_json::from_slice::<Value>(payload) {
        Ok(value) => {
            if let Some(literal) = oversized_integer(payload) {
                return Err(Error::DecodeInvalid(format!(
                    "integer {} in secret payload does not fit in 64 bits",
                    literal
                )));
            }
            return Ok(value);
        }
        // Otherwise the YAML fallback would turn the number into a string
        Err(e) if e.to_string().starts_with("number out of range") => {
            return Err(Error::DecodeInvalid(format!("secret payload is not valid JSON: {}", e)));
        }
        Err(_) => {}
    }

    let text = std::str::from_utf8(payload)
        .map_err(|_| Error::DecodeInvalid("secret payload is not valid UTF-8".to_string()))?;
    parse_yaml(text)
        .map_err(|e| Error::DecodeInvalid(format!("secret payload is neither JSON nor YAML: {}", e)))
}

/// First integer literal of a valid JSON document that is neither an `i64`
/// nor a `u64`. serde_json reads those as rounded floats.
fn oversized_integer(json: &[u8]) -> Option<String> {
    let mut i = 0;
    while i < json.len() {
        match json[i] {
            b'"' => {
                i += 1;
                while i < json.len() && json[i] != b'"' {
                    if json[i] == b'\\' {
                        i += 1;
                    }
                    i += 1;
                }
                i += 1;
            }
            b'-' | b'0'..=b'9' => {
                let start = i;
                while i < json.len() && matches!(json[i], b'-' | b'+' | b'.' | b'e' | b'E' | b'0'..=b'9') {
                    i += 1;
                }
                // Outside strings a valid document is plain ASCII
                let literal = String::from_utf8_lossy(&json[start..i]);
                let integer = !literal.contains(['.', 'e', 'E']);
                if integer && literal.parse::<i64>().is_err() && literal.parse::<u64>().is_err() {
                    return Some(literal.into_owned());
                }
            }
            _ => i += 1,
        }
    }
    None
}

/// Render a value as editable YAML. `null` renders as an empty document.
pub fn to_editable(value: &Value) -> Result<String> {
    if value.is_null() {
        return Ok(String::new());
    }
    serde_yaml::to_string(value)
        .map_err(|e| Error::DecodeInvalid(format!("failed to convert JSON to YAML: {}", e)))
}

/// Parse edited YAML text back into the JSON data model.
pub fn from_editable(text: &str) -> Result<Value> {
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    parse_yaml(text)
}

/// Compact JSON with sorted keys.
pub fn canonical(value: &Value) -> Vec<u8> {
    let mut out = Vec::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut Vec<u8>) {
    match value {
        Value::Array(items) => {
            out.push(b'[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                write_canonical(item, out);
            }
            out.push(b']');
        }
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push(b'{');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                write_scalar(&Value::String(key.clone()), out);
                out.push(b':');
                write_canonical(&map[key], out);
            }
            out.push(b'}');
        }
        scalar => write_scalar(scalar, out),
    }
}

fn write_scalar(value: &Value, out: &mut Vec<u8>) {
    // Scalars always serialize
    if let Ok(bytes) = serde_json::to_vec(value) {
        out.extend_from_slice(&bytes);
    }
}

fn parse_yaml(text: &str) -> Result<Value> {
    let yaml: serde_yaml::Value = serde_yaml::from_str(text)
        .map_err(|e| Error::DecodeInvalid(format!("failed to parse YAML: {}", e)))?;
    yaml_to_json(yaml)
}

/// Convert a YAML tree into the JSON data model.
fn yaml_to_json(yaml: serde_yaml::Value) -> Result<Value> {
    Ok(match yaml {
        serde_yaml::Value::Null => Value::Null,
        serde_yaml::Value::Bool(b) => Value::Bool(b),
        serde_yaml::Value::Number(n) => Value::Number(yaml_number(&n)?),
        serde_yaml::Value::String(s) => Value::String(s),
        serde_yaml::Value::Sequence(items) => Value::Array(
            items
                .into_iter()
                .map(yaml_to_json)
                .collect::<Result<Vec<_>>>()?,
        ),
        serde_yaml::Value::Mapping(mapping) => {
            let mut object = Map::new();
            for (key, value) in mapping {
                let key = yaml_key(key)?;
                if object.contains_key(&key) {
                    return Err(Error::DecodeInvalid(format!("duplicate key '{}'", key)));
                }
                object.insert(key, yaml_to_json(value)?);
            }
            Value::Object(object)
        }
        serde_yaml::Value::Tagged(tagged) => {
            return Err(Error::DecodeInvalid(format!(
                "YAML tag {} is not supported",
                tagged.tag
            )))
        }
    })
}

fn yaml_number(n: &serde_yaml::Number) -> Result<Number> {
    if let Some(i) = n.as_i64() {
        return Ok(Number::from(i));
    }
    if let Some(u) = n.as_u64() {
        return Ok(Number::from(u));
    }
    n.as_f64()
        .and_then(Number::from_f64)
        .ok_or_else(|| Error::DecodeInvalid(format!("number {} cannot be represented in JSON", n)))
}

/// Scalar keys are stringified; anything else is rejected.
fn yaml_key(key: serde_yaml::Value) -> Result<String> {
    match key {
        serde_yaml::Value::String(s) => Ok(s),
        serde_yaml::Value::Bool(b) => Ok(b.to_string()),
        serde_yaml::Value::Number(n) => Ok(n.to_string()),
        other => Err(Error::DecodeInvalid(format!(
            "mapping keys must be strings, found {:?}",
            other
        ))),
    }
}
