//! Stable digests of option structures.
//!
//! Options are hashed through a canonical JSON form: object keys sorted at
//! every level, array order kept, integral floats written as integers. Two
//! values that are deeply equal modulo key order always hash identically.

use std::fmt::Write;

use serde::Serialize;
use serde_json::{Number, Value};

use super::ContentHash;

/// Canonical JSON text of `value`.
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(&mut out, value);
    out
}

/// Lowercase hex blake3 of the canonical form of `options`.
///
/// Fails for values JSON cannot represent (maps with non-string keys).
pub fn hash_options<T: Serialize + ?Sized>(options: &T) -> serde_json::Result<String> {
    let value = serde_json::to_value(options)?;
    Ok(hash_value(&value))
}

/// Lowercase hex blake3 of the canonical form of an already built value.
pub fn hash_value(value: &Value) -> String {
    ContentHash::of(canonical_json(value).as_bytes()).to_hex()
}

fn write_canonical(out: &mut String, value: &Value) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => write_number(out, n),
        Value::String(s) => write_string(out, s),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(out, item);
            }
            out.push(']');
        }
        Value::Object(map) => {
            let mut entries: Vec<_> = map.iter().collect();
            entries.sort_unstable_by(|a, b| a.0.cmp(b.0));
            out.push('{');
            for (i, (key, item)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_string(out, key);
                out.push(':');
                write_canonical(out, item);
            }
            out.push('}');
        }
    }
}

#[allow(clippy::cast_possible_truncation)]
fn write_number(out: &mut String, n: &Number) {
    if let Some(i) = n.as_i64() {
        let _ = write!(out, "{i}");
    } else if let Some(u) = n.as_u64() {
        let _ = write!(out, "{u}");
    } else if let Some(f) = n.as_f64() {
        if f.fract() == 0.0 && f.abs() < 1e15 {
            let _ = write!(out, "{}", f as i64);
        } else {
            let _ = write!(out, "{n}");
        }
    }
}

fn write_string(out: &mut String, s: &str) {
    // serde_json escaping of a plain &str cannot fail
    out.push_str(&serde_json::to_string(s).unwrap_or_default());
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::{Map, json};

    #[test]
    fn test_keys_sorted_at_every_level() {
        let value = json!({"b": 1, "a": {"z": [3, 1], "y": null}});
        assert_eq!(canonical_json(&value), r#"{"a":{"y":null,"z":[3,1]},"b":1}"#);
    }

    #[test]
    fn test_integral_floats_print_as_integers() {
        assert_eq!(canonical_json(&json!(200.0)), "200");
        assert_eq!(canonical_json(&json!(1.5)), "1.5");
        assert_eq!(hash_value(&json!({"w": 200.0})), hash_value(&json!({"w": 200})));
    }

    #[test]
    fn test_strings_are_escaped() {
        assert_eq!(canonical_json(&json!("a\"b")), r#""a\"b""#);
    }

    #[test]
    fn test_list_order_and_scalars_matter() {
        assert_ne!(
            hash_value(&json!({"f": ["webp", "png"]})),
            hash_value(&json!({"f": ["png", "webp"]}))
        );
        assert_ne!(hash_value(&json!({"w": 1})), hash_value(&json!({"w": 2})));
        assert_ne!(hash_value(&json!({"w": 1})), hash_value(&json!({"h": 1})));
    }

    #[test]
    fn test_unrepresentable_options_are_an_error() {
        let mut map = std::collections::BTreeMap::new();
        map.insert((1, 2), "tuple key");
        assert!(hash_options(&map).is_err());
        assert_eq!(hash_options(&json!({"a": 1})).unwrap(), hash_value(&json!({"a": 1})));
    }

    #[test]
    fn test_digest_is_lowercase_hex() {
        let digest = hash_value(&json!({"a": 1}));
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    fn build(entries: &[(String, i64)]) -> Value {
        let mut inner = Map::new();
        for (key, value) in entries {
            inner.insert(key.clone(), json!(value));
        }
        let mut outer = Map::new();
        for (key, value) in entries {
            outer.insert(key.clone(), json!({"n": value, "nested": Value::Object(inner.clone())}));
        }
        Value::Object(outer)
    }

    proptest! {
        #[test]
        fn prop_key_order_does_not_change_digest(
            map in prop::collection::btree_map("[a-z]{1,6}", any::<i64>(), 0..8),
            rotate in 0usize..8,
        ) {
            let forward: Vec<_> = map.into_iter().collect();
            let mut shuffled = forward.clone();
            shuffled.reverse();
            if !shuffled.is_empty() {
                let k = rotate % shuffled.len();
                shuffled.rotate_left(k);
            }

            prop_assert_eq!(hash_value(&build(&forward)), hash_value(&build(&shuffled)));
        }
    }
}
