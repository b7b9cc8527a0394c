use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

const UNKNOWN: &str = "unknown";

/// Current time in the persisted timestamp format (`2023-01-01T00:00:00.000Z`)
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// The single persisted visitor record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitorRecord {
    pub total_visits: u64,
    pub unique_visitors: BTreeSet<String>,
    pub last_updated: String,
}

impl VisitorRecord {
    /// A record for a store that has never been written
    pub fn fresh() -> Self {
        Self {
            total_visits: 0,
            unique_visitors: BTreeSet::new(),
            last_updated: now_timestamp(),
        }
    }

    pub fn stats(&self) -> VisitorStats {
        VisitorStats {
            total_visits: self.total_visits,
            unique_visitors: self.unique_visitors.len() as u64,
        }
    }
}

/// On-disk JSON shape of a [`VisitorRecord`]
///
/// Every field is optional so that a partially written document still loads;
/// missing or `null` fields take their defaults when converted.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedRecord {
    #[serde(default)]
    pub total_visits: Option<u64>,
    #[serde(default)]
    pub unique_visitors: Option<Vec<String>>,
    #[serde(default)]
    pub last_updated: Option<String>,
}

impl From<PersistedRecord> for VisitorRecord {
    fn from(raw: PersistedRecord) -> Self {
        Self {
            total_visits: raw.total_visits.unwrap_or(0),
            unique_visitors: raw.unique_visitors.unwrap_or_default().into_iter().collect(),
            last_updated: raw
                .last_updated
                .filter(|ts| !ts.is_empty())
                .unwrap_or_else(now_timestamp),
        }
    }
}

impl From<&VisitorRecord> for PersistedRecord {
    fn from(record: &VisitorRecord) -> Self {
        Self {
            total_visits: Some(record.total_visits),
            unique_visitors: Some(record.unique_visitors.iter().cloned().collect()),
            last_updated: Some(record.last_updated.clone()),
        }
    }
}

impl VisitorRecord {
    /// Parse the persisted JSON document
    ///
    /// Only a JSON object is a record; arrays and scalars are rejected even
    /// though the derived deserializer would accept a positional array.
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        let value: serde_json::Value = serde_json::from_str(text)?;
        if !value.is_object() {
            return Err(serde::de::Error::custom("visitor record must be a JSON object"));
        }
        serde_json::from_value::<PersistedRecord>(value).map(Self::from)
    }

    /// Render the persisted JSON document (two-space indentation)
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&PersistedRecord::from(self))
    }
}

/// Aggregate counts returned to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitorStats {
    pub total_visits: u64,
    pub unique_visitors: u64,
}

impl VisitorStats {
    /// Reported when an increment cannot be persisted
    pub const INCREMENT_FALLBACK: Self = Self {
        total_visits: 1,
        unique_visitors: 1,
    };

    /// Reported when the current count cannot be read
    pub const READ_FALLBACK: Self = Self {
        total_visits: 0,
        unique_visitors: 0,
    };
}

/// Request-derived signals used to fingerprint a visitor
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestMetadata {
    /// Raw `X-Forwarded-For` value
    pub forwarded_for: Option<String>,
    /// Raw `X-Real-IP` value
    pub real_ip: Option<String>,
    pub user_agent: Option<String>,
}

impl RequestMetadata {
    pub fn new(address: impl Into<String>, user_agent: impl Into<String>) -> Self {
        Self {
            forwarded_for: Some(address.into()),
            real_ip: None,
            user_agent: Some(user_agent.into()),
        }
    }

    /// Best-effort client address: first forwarded entry, then the real-IP
    /// header, then `"unknown"`
    ///
    /// The forwarded entry is used as sent, without trimming, so existing
    /// fingerprints keep matching.
    pub fn client_address(&self) -> &str {
        if let Some(forwarded) = non_empty(&self.forwarded_for) {
            return forwarded.split(',').next().unwrap_or(forwarded);
        }
        non_empty(&self.real_ip).unwrap_or(UNKNOWN)
    }

    pub fn user_agent_or_unknown(&self) -> &str {
        non_empty(&self.user_agent).unwrap_or(UNKNOWN)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_counts_set_members() {
        let record = VisitorRecord {
            total_visits: 42,
            unique_visitors: ["visitor1", "visitor2", "visitor3", "visitor4"]
                .into_iter()
                .map(String::from)
                .collect(),
            last_updated: "2023-01-01T00:00:00.000Z".to_string(),
        };

        assert_eq!(
            record.stats(),
            VisitorStats {
                total_visits: 42,
                unique_visitors: 4
            }
        );
    }

    #[test]
    fn test_parse_existing_document() {
        let text = r#"{
            "totalVisits": 100,
            "uniqueVisitors": ["visitor1", "visitor2", "visitor1"],
            "lastUpdated": "2023-01-01T00:00:00.000Z"
        }"#;

        let record = VisitorRecord::from_json(text).unwrap();
        assert_eq!(record.total_visits, 100);
        assert_eq!(record.unique_visitors.len(), 2);
        assert!(record.unique_visitors.contains("visitor1"));
        assert!(record.unique_visitors.contains("visitor2"));
        assert_eq!(record.last_updated, "2023-01-01T00:00:00.000Z");
    }

    #[test]
    fn test_missing_and_null_fields_take_defaults() {
        let record = VisitorRecord::from_json(r#"{"totalVisits": null}"#).unwrap();
        assert_eq!(record.total_visits, 0);
        assert!(record.unique_visitors.is_empty());
        assert!(!record.last_updated.is_empty());
    }

    #[test]
    fn test_invalid_json_is_rejected() {
        assert!(VisitorRecord::from_json("not json").is_err());
        assert!(VisitorRecord::from_json(r#"{"totalVisits": "ten"}"#).is_err());
    }

    #[test]
    fn test_non_object_documents_are_rejected() {
        assert!(VisitorRecord::from_json(r#"[5, ["a"], "2023-01-01T00:00:00.000Z"]"#).is_err());
        assert!(VisitorRecord::from_json("5").is_err());
        assert!(VisitorRecord::from_json("null").is_err());
    }

    #[test]
    fn test_serialized_layout() {
        let record = VisitorRecord {
            total_visits: 50,
            unique_visitors: ["visitor1", "visitor2", "visitor3"]
                .into_iter()
                .map(String::from)
                .collect(),
            last_updated: "2023-01-01T12:00:00.000Z".to_string(),
        };

        let expected = r#"{
  "totalVisits": 50,
  "uniqueVisitors": [
    "visitor1",
    "visitor2",
    "visitor3"
  ],
  "lastUpdated": "2023-01-01T12:00:00.000Z"
}"#;
        assert_eq!(record.to_json().unwrap(), expected);
    }

    #[test]
    fn test_timestamp_format() {
        let ts = now_timestamp();
        assert!(ts.ends_with('Z'));
        // 2023-01-01T00:00:00.000Z
        assert_eq!(ts.len(), 24);
    }

    #[test]
    fn test_client_address_fallbacks() {
        let forwarded = RequestMetadata {
            forwarded_for: Some("203.0.113.1, 198.51.100.1".to_string()),
            real_ip: Some("10.0.0.1".to_string()),
            user_agent: None,
        };
        assert_eq!(forwarded.client_address(), "203.0.113.1");
        assert_eq!(forwarded.user_agent_or_unknown(), "unknown");

        let real_ip = RequestMetadata {
            forwarded_for: Some(String::new()),
            real_ip: Some("10.0.0.1".to_string()),
            user_agent: Some("curl/8.0".to_string()),
        };
        assert_eq!(real_ip.client_address(), "10.0.0.1");
        assert_eq!(real_ip.user_agent_or_unknown(), "curl/8.0");

        assert_eq!(RequestMetadata::default().client_address(), "unknown");
    }

    #[test]
    fn test_stats_json_shape() {
        let json = serde_json::to_value(VisitorStats::INCREMENT_FALLBACK).unwrap();
        assert_eq!(json, serde_json::json!({"totalVisits": 1, "uniqueVisitors": 1}));
    }
}
