//! Canonical JSON: object keys sorted bytewise, no insignificant whitespace.
//!
//! Two payloads that are equal as JSON values always canonicalize to the same
//! text, independent of field declaration order or map iteration order, so the
//! digest of the text is a stable commitment to the value.

use crate::error::CryptoError;
use crate::hash::digest_canonical;
use serde::Serialize;
use serde_json::Value;
use verdict_types::ContentHash;

/// Serialize `payload` into canonical JSON text.
pub fn canonical_json<T: Serialize + ?Sized>(payload: &T) -> Result<String, CryptoError> {
    let value = serde_json::to_value(payload)?;
    Ok(canonicalize_value(&value))
}

/// Re-encode an arbitrary JSON value canonically.
pub fn canonicalize_value(value: &Value) -> String {
    let mut out = String::new();
    write_value(value, &mut out);
    out
}

/// Parse JSON text and return its canonical form.
pub fn canonicalize_str(text: &str) -> Result<String, CryptoError> {
    let value: Value = serde_json::from_str(text)?;
    Ok(canonicalize_value(&value))
}

/// Canonicalize and digest in one step.
pub fn digest_payload<T: Serialize + ?Sized>(
    payload: &T,
) -> Result<(String, ContentHash), CryptoError> {
    let canonical = canonical_json(payload)?;
    let hash = digest_canonical(&canonical);
    Ok((canonical, hash))
}

fn write_value(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_string(key, out);
                out.push(':');
                write_value(&map[key], out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_value(item, out);
            }
            out.push(']');
        }
        Value::String(s) => write_string(s, out),
        Value::Number(n) => out.push_str(&n.to_string()),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Null => out.push_str("null"),
    }
}

fn write_string(s: &str, out: &mut String) {
    // serde_json's string escaping is deterministic.
    out.push_str(&Value::String(s.to_string()).to_string());
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn keys_are_sorted_recursively() {
        let value = json!({"b": 1, "a": {"z": true, "y": [ {"d": null, "c": "x"} ]}});
        assert_eq!(
            canonicalize_value(&value),
            r#"{"a":{"y":[{"c":"x","d":null}],"z":true},"b":1}"#
        );
    }

    #[test]
    fn whitespace_and_order_do_not_change_canonical_form() {
        let a = canonicalize_str(r#"{ "x": 1, "y": [1, 2] }"#).unwrap();
        let b = canonicalize_str(r#"{"y":[1,2],"x":1}"#).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn array_order_is_significant() {
        let a = canonicalize_str("[1,2]").unwrap();
        let b = canonicalize_str("[2,1]").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn strings_are_escaped() {
        let value = json!({"q": "a\"b\n"});
        assert_eq!(canonicalize_value(&value), r#"{"q":"a\"b\n"}"#);
    }

    #[test]
    fn digest_payload_matches_digest_of_text() {
        let (text, hash) = digest_payload(&json!({"k": 2, "j": 1})).unwrap();
        assert_eq!(text, r#"{"j":1,"k":2}"#);
        assert_eq!(hash, digest_canonical(&text));
    }

    #[test]
    fn invalid_json_is_an_error() {
        assert!(canonicalize_str("{not json").is_err());
    }
}
