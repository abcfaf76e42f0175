use serde::{de, Deserialize, Deserializer};
use serde_json::Value;

/// Accepts a JSON number or a numeric string; empty strings count as absent.
/// The quote and DEX APIs switch between the two encodings.
pub(crate) fn de_opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Value::Number(n)) => Ok(n.as_f64()),
        Some(Value::String(s)) => {
            if s.trim().is_empty() {
                Ok(None)
            } else {
                s.trim().parse::<f64>().map(Some).map_err(|_| {
                    de::Error::custom(format!("could not parse f64 from string: {s}"))
                })
            }
        }
        Some(other) => Err(de::Error::custom(format!(
            "expected number or string, got: {other}"
        ))),
    }
}

/// Same idea for integer status codes, which arrive as `0` or `"0"`.
pub(crate) fn de_opt_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Value::Number(n)) => Ok(n.as_i64()),
        Some(Value::String(s)) => {
            if s.trim().is_empty() {
                Ok(None)
            } else {
                s.trim().parse::<i64>().map(Some).map_err(|_| {
                    de::Error::custom(format!("could not parse i64 from string: {s}"))
                })
            }
        }
        Some(other) => Err(de::Error::custom(format!(
            "expected number or string, got: {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "de_opt_f64")]
        value: Option<f64>,
        #[serde(default, deserialize_with = "de_opt_i64")]
        code: Option<i64>,
    }

    #[test]
    fn accepts_numbers_and_numeric_strings() {
        let p: Probe = serde_json::from_str(r#"{"value": 2.47, "code": 0}"#).unwrap();
        assert_eq!(p.value, Some(2.47));
        assert_eq!(p.code, Some(0));

        let p: Probe = serde_json::from_str(r#"{"value": "303314039061.5", "code": "0"}"#).unwrap();
        assert_eq!(p.value, Some(303314039061.5));
        assert_eq!(p.code, Some(0));
    }

    #[test]
    fn missing_null_and_empty_become_none() {
        let p: Probe = serde_json::from_str("{}").unwrap();
        assert_eq!(p.value, None);
        assert_eq!(p.code, None);

        let p: Probe = serde_json::from_str(r#"{"value": null, "code": ""}"#).unwrap();
        assert_eq!(p.value, None);
        assert_eq!(p.code, None);
    }

    #[test]
    fn rejects_non_numeric_payloads() {
        assert!(serde_json::from_str::<Probe>(r#"{"value": "ton"}"#).is_err());
        assert!(serde_json::from_str::<Probe>(r#"{"code": [1]}"#).is_err());
    }
}
