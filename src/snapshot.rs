use std::{fs, path::Path};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SnapshotError};
use crate::models::{parse_instant, NormalizedEvent};
use crate::pipeline::{sort_by_start, SortDirection};

/// The persisted artifact: upcoming events ascending, then past events
/// descending. No per-event upcoming/past flag is stored; futurity is
/// re-derived from `dateTime` against a caller-supplied clock.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Snapshot {
    pub events: Vec<NormalizedEvent>,
}

impl Snapshot {
    /// The `n` most recent events, re-sorted descending by start time before
    /// taking the prefix, so "most recent" is chronological regardless of
    /// how the snapshot happens to be ordered.
    pub fn latest(&self, n: usize) -> Result<Vec<NormalizedEvent>> {
        let mut sorted = sort_by_start(self.events.clone(), SortDirection::Descending)?;
        sorted.truncate(n);
        Ok(sorted)
    }
}

/// Replaces the snapshot in full: serialize, write a `.tmp` sibling, rename
/// over the target. Readers see the old file or the new one, never a partial
/// write, and a failed run leaves the prior snapshot in place.
pub fn write(path: &Path, snapshot: &Snapshot) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|source| SnapshotError::Persistence {
                path: path.to_path_buf(),
                source,
            })?;
        }
    }

    let payload = serde_json::to_string(snapshot).map_err(|err| SnapshotError::SnapshotFormat {
        path: path.to_path_buf(),
        message: err.to_string(),
    })?;

    let mut tmp_name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_else(|| "events.json".into());
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    fs::write(&tmp_path, payload).map_err(|source| SnapshotError::Persistence {
        path: tmp_path.clone(),
        source,
    })?;
    fs::rename(&tmp_path, path).map_err(|source| SnapshotError::Persistence {
        path: path.to_path_buf(),
        source,
    })
}

pub fn load(path: &Path) -> Result<Snapshot> {
    let contents = fs::read_to_string(path).map_err(|source| SnapshotError::Persistence {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|err| SnapshotError::SnapshotFormat {
        path: path.to_path_buf(),
        message: err.to_string(),
    })
}

/// True iff the event starts strictly later than `now`. The clock is a
/// parameter so callers and tests control it; an unparseable timestamp is an
/// error rather than quietly "not future".
pub fn is_future_event(date_time: &str, now: DateTime<Utc>) -> Result<bool> {
    let instant = parse_instant(date_time).ok_or_else(|| SnapshotError::MalformedData {
        group: "<reader>".to_string(),
        message: format!("unparseable dateTime {date_time:?}"),
    })?;
    Ok(instant > now)
}

pub fn has_future_events(events: &[NormalizedEvent], now: DateTime<Utc>) -> Result<bool> {
    for event in events {
        if is_future_event(&event.date_time, now)? {
            return Ok(true);
        }
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use std::{env, path::PathBuf};

    use chrono::TimeZone;

    use super::*;

    fn event(title: &str, date_time: &str) -> NormalizedEvent {
        NormalizedEvent {
            title: title.to_string(),
            description: "plain text".to_string(),
            venue: None,
            event_url: format!("https://www.meetup.com/e/{title}"),
            date_time: date_time.to_string(),
            end_time: None,
            timezone: None,
            group_name: "Coven of Wisdom".to_string(),
        }
    }

    fn test_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2029, 1, 1, 0, 0, 0).single().unwrap()
    }

    fn temp_snapshot_path(tag: &str) -> (PathBuf, PathBuf) {
        let dir = env::temp_dir().join(format!("meetup-snapshot-{tag}-{}", std::process::id()));
        fs::remove_dir_all(&dir).ok();
        (dir.join("data").join("events.json"), dir)
    }

    #[test]
    fn classifies_futurity_against_the_given_clock() {
        let now = test_now();
        assert!(is_future_event("2029-01-01T00:00:01Z", now).unwrap());
        assert!(!is_future_event("2029-01-01T00:00:00Z", now).unwrap());
        assert!(!is_future_event("2028-12-31T23:59:59Z", now).unwrap());
    }

    #[test]
    fn unparseable_timestamp_fails_loudly() {
        let err = is_future_event("whenever", test_now()).expect_err("must fail");
        assert!(matches!(err, SnapshotError::MalformedData { .. }));
    }

    #[test]
    fn has_future_events_needs_at_least_one_future_start() {
        let now = test_now();
        let past_only = vec![event("a", "2020-01-01T10:00:00Z"), event("b", "2021-01-01T10:00:00Z")];
        assert!(!has_future_events(&past_only, now).unwrap());

        let mixed = vec![event("a", "2020-01-01T10:00:00Z"), event("b", "2030-01-01T10:00:00Z")];
        assert!(has_future_events(&mixed, now).unwrap());

        assert!(!has_future_events(&[], now).unwrap());
    }

    #[test]
    fn latest_resorts_descending_before_taking_the_prefix() {
        // Stored order is upcoming-ascending then past-descending; latest()
        // must not depend on it.
        let snapshot = Snapshot {
            events: vec![
                event("upcoming-early", "2029-06-01T10:00:00Z"),
                event("upcoming-late", "2030-01-01T10:00:00Z"),
                event("past-recent", "2024-01-01T10:00:00Z"),
                event("past-old", "2020-01-01T10:00:00Z"),
            ],
        };

        let latest = snapshot.latest(3).expect("latest");
        let titles: Vec<_> = latest.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, ["upcoming-late", "upcoming-early", "past-recent"]);

        let all = snapshot.latest(10).expect("latest");
        assert_eq!(all.len(), 4);
    }

    #[test]
    fn write_then_load_round_trips_and_leaves_no_tmp_file() {
        let (path, dir) = temp_snapshot_path("roundtrip");
        let snapshot = Snapshot {
            events: vec![event("a", "2030-01-01T10:00:00Z")],
        };

        write(&path, &snapshot).expect("write");
        assert_eq!(load(&path).expect("load"), snapshot);

        let siblings: Vec<_> = fs::read_dir(path.parent().unwrap())
            .expect("read dir")
            .map(|entry| entry.expect("entry").file_name())
            .collect();
        assert_eq!(siblings, vec![std::ffi::OsString::from("events.json")]);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn write_replaces_prior_content_in_full() {
        let (path, dir) = temp_snapshot_path("replace");
        let first = Snapshot {
            events: vec![event("a", "2030-01-01T10:00:00Z"), event("b", "2030-02-01T10:00:00Z")],
        };
        let second = Snapshot {
            events: vec![event("c", "2031-01-01T10:00:00Z")],
        };

        write(&path, &first).expect("first write");
        write(&path, &second).expect("second write");
        assert_eq!(load(&path).expect("load"), second);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn load_reports_missing_and_corrupt_files_distinctly() {
        let (path, dir) = temp_snapshot_path("corrupt");
        let err = load(&path).expect_err("missing file");
        assert!(matches!(err, SnapshotError::Persistence { .. }));

        fs::create_dir_all(path.parent().unwrap()).expect("dir");
        fs::write(&path, "{not json").expect("write garbage");
        let err = load(&path).expect_err("corrupt file");
        assert!(matches!(err, SnapshotError::SnapshotFormat { .. }));

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn serializes_with_the_wire_field_names() {
        let snapshot = Snapshot {
            events: vec![event("a", "2030-01-01T10:00:00Z")],
        };
        let json = serde_json::to_string(&snapshot).expect("encode");
        assert!(json.contains("\"events\""));
        assert!(json.contains("\"groupName\":\"Coven of Wisdom\""));
        assert!(json.contains("\"dateTime\":\"2030-01-01T10:00:00Z\""));
        assert!(json.contains("\"eventUrl\""));
    }
}
