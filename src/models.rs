use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Venue {
    pub name: Option<String>,
    pub address: Option<String>,
    pub postal_code: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
}

/// One event as the meetup API returns it, before sanitization. Timestamps
/// stay as the ISO-8601 text the API sent; they are parsed on demand.
#[derive(Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct RawEventNode {
    pub title: String,
    pub description: Option<String>,
    pub venue: Option<Venue>,
    pub event_url: String,
    pub date_time: String,
    pub end_time: Option<String>,
    pub timezone: Option<String>,
}

/// The unit of the merged snapshot: a raw node with its description reduced
/// to plain text and the owning group's display name stamped on.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedEvent {
    pub title: String,
    pub description: String,
    pub venue: Option<Venue>,
    pub event_url: String,
    pub date_time: String,
    pub end_time: Option<String>,
    pub timezone: Option<String>,
    pub group_name: String,
}

/// Parses an ISO-8601 timestamp into a UTC instant. The meetup API emits
/// minute precision with an offset (`2030-01-01T10:00+02:00`) as well as
/// full RFC 3339, so both are accepted.
pub fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M%:z", "%Y-%m-%dT%H:%M:%S%:z"] {
        if let Ok(parsed) = DateTime::parse_from_str(raw, fmt) {
            return Some(parsed.with_timezone(&Utc));
        }
    }
    None
}
