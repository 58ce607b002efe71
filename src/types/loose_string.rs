//! KMA endpoints are inconsistent about quoting: the same field arrives as
//! `"0200"`, `200` or `0.5` depending on the service and the value. These
//! helpers normalize such fields while deserializing.

use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum Loose {
    Str(String),
    Int(i64),
    Float(f64),
}

impl From<Loose> for String {
    fn from(value: Loose) -> Self {
        match value {
            Loose::Str(s) => s,
            Loose::Int(i) => i.to_string(),
            // `2.0` stays "2.0" rather than collapsing to "2".
            Loose::Float(f) => serde_json::Number::from_f64(f)
                .map(|n| n.to_string())
                .unwrap_or_else(|| f.to_string()),
        }
    }
}

pub(crate) fn loose_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Loose::deserialize(deserializer).map(String::from)
}

/// Integer that may be quoted. Null, empty or unparsable values become `None`.
pub(crate) fn loose_opt_i32<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Loose>::deserialize(deserializer)? {
        Some(Loose::Int(i)) => i32::try_from(i).ok(),
        Some(Loose::Float(f)) if f.fract() == 0.0 => Some(f as i32),
        Some(Loose::Str(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Probe {
        #[serde(deserialize_with = "loose_string")]
        value: String,
        #[serde(default, deserialize_with = "loose_opt_i32")]
        x: Option<i32>,
    }

    fn probe(json: &str) -> Probe {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_loose_string_accepts_numbers() {
        assert_eq!(probe(r#"{"value": "0200"}"#).value, "0200");
        assert_eq!(probe(r#"{"value": 200}"#).value, "200");
        assert_eq!(probe(r#"{"value": 0.5}"#).value, "0.5");
        assert_eq!(probe(r#"{"value": 2.0}"#).value, "2.0");
        assert_eq!(probe(r#"{"value": -0.0}"#).value, "-0.0");
    }

    #[test]
    fn test_loose_opt_i32() {
        assert_eq!(probe(r#"{"value": "", "x": "63"}"#).x, Some(63));
        assert_eq!(probe(r#"{"value": "", "x": 111}"#).x, Some(111));
        assert_eq!(probe(r#"{"value": "", "x": null}"#).x, None);
        assert_eq!(probe(r#"{"value": "", "x": "n/a"}"#).x, None);
        assert_eq!(probe(r#"{"value": ""}"#).x, None);
    }
}
