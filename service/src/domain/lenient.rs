//! Lenient [`serde`] deserializers for backend values.
//!
//! The backend is loosely typed: numbers may come as strings (`"12"`) and
//! booleans as numbers (`0`/`1`) or strings (`"1"`, `"true"`).

use std::num::NonZeroU64;

use serde::{de::Error as _, Deserialize, Deserializer};

/// Raw scalar as sent by the backend.
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    /// JSON boolean.
    Bool(bool),

    /// JSON unsigned integer.
    Unsigned(u64),

    /// JSON signed integer.
    Signed(i64),

    /// JSON string.
    Text(String),
}

/// Deserializes a positive identifier from a number or a numeric string.
///
/// # Errors
///
/// If the value is not a positive integer.
pub fn id<'de, D: Deserializer<'de>>(d: D) -> Result<NonZeroU64, D::Error> {
    let raw = match Scalar::deserialize(d)? {
        Scalar::Unsigned(n) => Some(n),
        Scalar::Text(s) => s.trim().parse().ok(),
        Scalar::Bool(_) | Scalar::Signed(_) => None,
    };
    raw.and_then(NonZeroU64::new)
        .ok_or_else(|| D::Error::custom("expected a positive identifier"))
}

/// Deserializes a count from a number or a numeric string, treating `null`
/// as zero.
///
/// # Errors
///
/// If the value is not a non-negative integer.
pub fn count<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
    match Option::<Scalar>::deserialize(d)? {
        None => Ok(0),
        Some(Scalar::Unsigned(n)) => Ok(n),
        Some(Scalar::Text(s)) if s.trim().is_empty() => Ok(0),
        Some(Scalar::Text(s)) => s
            .trim()
            .parse()
            .map_err(|_| D::Error::custom("expected a count")),
        Some(Scalar::Bool(_) | Scalar::Signed(_)) => {
            Err(D::Error::custom("expected a count"))
        }
    }
}

/// Deserializes a flag from a boolean, a number or a string, treating `null`
/// as `false`.
///
/// # Errors
///
/// If the value cannot be interpreted as a flag.
pub fn flag<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    match Option::<Scalar>::deserialize(d)? {
        None => Ok(false),
        Some(Scalar::Bool(b)) => Ok(b),
        Some(Scalar::Unsigned(n)) => Ok(n != 0),
        Some(Scalar::Signed(n)) => Ok(n != 0),
        Some(Scalar::Text(s)) => match s.trim().to_ascii_lowercase().as_str()
        {
            "" | "0" | "false" => Ok(false),
            "1" | "true" => Ok(true),
            _ => Err(D::Error::custom("expected a flag")),
        },
    }
}

/// Deserializes an optional string, treating empty strings as absent and
/// stringifying numbers.
///
/// # Errors
///
/// If the value is a boolean.
pub fn text<'de, D: Deserializer<'de>>(
    d: D,
) -> Result<Option<String>, D::Error> {
    match Option::<Scalar>::deserialize(d)? {
        None => Ok(None),
        Some(Scalar::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(Scalar::Text(s)) => Ok(Some(s)),
        Some(Scalar::Unsigned(n)) => Ok(Some(n.to_string())),
        Some(Scalar::Signed(n)) => Ok(Some(n.to_string())),
        Some(Scalar::Bool(_)) => Err(D::Error::custom("expected a string")),
    }
}

#[cfg(test)]
mod spec {
    use std::num::NonZeroU64;

    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Sample {
        #[serde(deserialize_with = "super::id")]
        id: NonZeroU64,
        #[serde(default, deserialize_with = "super::count")]
        count: u64,
        #[serde(default, deserialize_with = "super::flag")]
        flag: bool,
        #[serde(default, deserialize_with = "super::text")]
        text: Option<String>,
    }

    fn parse(json: &str) -> Result<Sample, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[test]
    fn accepts_loosely_typed_values() {
        let s = parse(r#"{"id":"12","count":"3","flag":"1","text":10}"#)
            .unwrap();
        assert_eq!(s.id.get(), 12);
        assert_eq!(s.count, 3);
        assert!(s.flag);
        assert_eq!(s.text.as_deref(), Some("10"));

        let s = parse(r#"{"id":7,"count":null,"flag":0,"text":""}"#).unwrap();
        assert_eq!(s.id.get(), 7);
        assert_eq!(s.count, 0);
        assert!(!s.flag);
        assert_eq!(s.text, None);

        let s = parse(r#"{"id":1}"#).unwrap();
        assert_eq!(s.count, 0);
        assert!(!s.flag);
    }

    #[test]
    fn rejects_non_positive_ids() {
        assert!(parse(r#"{"id":0}"#).is_err());
        assert!(parse(r#"{"id":-4}"#).is_err());
        assert!(parse(r#"{"id":"abc"}"#).is_err());
    }
}
