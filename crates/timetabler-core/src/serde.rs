use serde::{Deserialize, Deserializer};
use uuid::Uuid;

/// Treats an empty query-string value as `None` instead of a parse failure.
///
/// Works for any UUID newtype that implements `From<Uuid>`.
pub fn deserialize_optional_uuid<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: From<Uuid>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    match opt {
        Some(s) if s.is_empty() => Ok(None),
        Some(s) => Uuid::parse_str(&s)
            .map(|uuid| Some(T::from(uuid)))
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// Treats an empty query-string value as `None`.
pub fn deserialize_optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    Ok(opt.filter(|s| !s.trim().is_empty()))
}

/// Parses an optional `u32` that may arrive as a string in a query.
pub fn deserialize_optional_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    match opt {
        Some(s) if s.is_empty() => Ok(None),
        Some(s) => s.parse::<u32>().map(Some).map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Query {
        #[serde(default, deserialize_with = "deserialize_optional_uuid")]
        class_id: Option<Uuid>,
        #[serde(default, deserialize_with = "deserialize_optional_string")]
        section: Option<String>,
        #[serde(default, deserialize_with = "deserialize_optional_u32")]
        duration: Option<u32>,
    }

    #[test]
    fn test_empty_values_become_none() {
        let q: Query =
            serde_json::from_str(r#"{"class_id":"","section":"  ","duration":""}"#).unwrap();
        assert!(q.class_id.is_none());
        assert!(q.section.is_none());
        assert!(q.duration.is_none());
    }

    #[test]
    fn test_present_values_parse() {
        let q: Query = serde_json::from_str(
            r#"{"class_id":"12345678-1234-1234-1234-123456789abc","section":"A","duration":"45"}"#,
        )
        .unwrap();
        assert_eq!(
            q.class_id,
            Some(Uuid::from_u128(0x12345678_1234_1234_1234_123456789abc))
        );
        assert_eq!(q.section.as_deref(), Some("A"));
        assert_eq!(q.duration, Some(45));
    }
}
