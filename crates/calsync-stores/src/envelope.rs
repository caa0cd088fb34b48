//! Response envelope decoding shared by every store read.
//!
//! The store usually answers `{"success": true, "message": ..., "data": ...}`
//! but the payload may sit directly under `data`, under a named key inside
//! `data`, under that key at the top level, or be the whole body. Decoding
//! never fails: an unrecognized body is reported as [`Decoded::Unrecognized`]
//! and callers degrade to an empty result.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

/// Outcome of decoding a store response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded<T> {
    Found(T),
    Unrecognized,
}

impl<T> Decoded<T> {
    /// Returns true when the body had a known shape.
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    /// Returns the value, or `None` for an unrecognized body.
    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Found(value) => Some(value),
            Self::Unrecognized => None,
        }
    }
}

impl<T: Default> Decoded<T> {
    /// Returns the decoded value, or the empty value with a warning naming
    /// `context`.
    pub fn or_empty(self, context: &str) -> T {
        match self {
            Self::Found(value) => value,
            Self::Unrecognized => {
                warn!(context, "unrecognized store response, using empty result");
                T::default()
            }
        }
    }
}

/// The places a payload may sit in a body, most specific first.
fn candidates<'a>(body: &'a Value, key: &str) -> [Option<&'a Value>; 4] {
    let data = body.get("data");
    [
        data.and_then(|data| data.get(key)),
        data,
        body.get(key),
        Some(body),
    ]
}

/// Decodes a list stored under `key`.
///
/// Items that fail to deserialize are skipped.
pub fn decode_list<T: DeserializeOwned>(body: &Value, key: &str) -> Decoded<Vec<T>> {
    let Some(items) = candidates(body, key)
        .into_iter()
        .flatten()
        .find_map(Value::as_array)
    else {
        return Decoded::Unrecognized;
    };

    let mut decoded = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        match serde_json::from_value(item.clone()) {
            Ok(value) => decoded.push(value),
            Err(err) => warn!(key, index, %err, "skipping malformed item"),
        }
    }
    Decoded::Found(decoded)
}

/// Decodes a single object stored under `key`.
///
/// The first candidate location that deserializes wins.
pub fn decode_item<T: DeserializeOwned>(body: &Value, key: &str) -> Decoded<T> {
    candidates(body, key)
        .into_iter()
        .flatten()
        .filter(|value| value.is_object())
        .find_map(|value| serde_json::from_value(value.clone()).ok())
        .map_or(Decoded::Unrecognized, Decoded::Found)
}

/// Reads the `message` of an envelope, if any.
pub fn message(body: &Value) -> Option<&str> {
    body.get("message").and_then(Value::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
    struct Item {
        id: i64,
    }

    mod lists {
        use super::*;

        #[test]
        fn accepts_every_shape() {
            let shapes = [
                json!({"success": true, "data": {"events": [{"id": 1}]}}),
                json!({"success": true, "data": [{"id": 1}]}),
                json!({"events": [{"id": 1}]}),
                json!([{"id": 1}]),
            ];
            for body in shapes {
                assert_eq!(
                    decode_list::<Item>(&body, "events"),
                    Decoded::Found(vec![Item { id: 1 }]),
                    "{body}"
                );
            }
        }

        #[test]
        fn skips_malformed_items() {
            let body = json!({"data": {"reminders": [{"id": 1}, {"id": "x"}, {"id": 3}]}});
            assert_eq!(
                decode_list::<Item>(&body, "reminders"),
                Decoded::Found(vec![Item { id: 1 }, Item { id: 3 }])
            );
        }

        #[test]
        fn unknown_shape_is_empty() {
            let body = json!({"success": true, "data": {"count": 3}});
            let decoded = decode_list::<Item>(&body, "events");
            assert_eq!(decoded, Decoded::Unrecognized);
            assert!(decoded.or_empty("events").is_empty());
            assert_eq!(decode_list::<Item>(&Value::Null, "events"), Decoded::Unrecognized);
        }
    }

    mod items {
        use super::*;

        #[test]
        fn accepts_every_shape() {
            let shapes = [
                json!({"data": {"reminder": {"id": 2}}}),
                json!({"success": true, "message": "ok", "data": {"id": 2}}),
                json!({"reminder": {"id": 2}}),
                json!({"id": 2}),
            ];
            for body in shapes {
                assert_eq!(
                    decode_item::<Item>(&body, "reminder"),
                    Decoded::Found(Item { id: 2 }),
                    "{body}"
                );
            }
        }

        #[test]
        fn error_body_is_unrecognized() {
            let body = json!({"success": false, "message": "Event not found"});
            assert_eq!(decode_item::<Item>(&body, "event"), Decoded::Unrecognized);
            assert_eq!(message(&body), Some("Event not found"));
        }
    }
}
