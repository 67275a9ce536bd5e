use std::path::PathBuf;

use futures::future;
use tracing::info;

use crate::config::SnapshotConfig;
use crate::error::{Result, SnapshotError};
use crate::meetup::{self, GroupEvents};
use crate::models::{parse_instant, NormalizedEvent, RawEventNode};
use crate::sanitize;
use crate::snapshot::{self, Snapshot};

/// Which node list of a group result to flatten. Upcoming/past is the
/// source's classification at fetch time and is not re-derived afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Upcoming,
    Past,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

#[derive(Debug)]
pub struct RunSummary {
    pub upcoming: usize,
    pub past: usize,
    pub snapshot_path: PathBuf,
}

/// Flattens the selected node list of every group into one sequence, in
/// configured-group order, stamping each event with its group's display name
/// and sanitizing its description. Order is not meaningful here; a sort by
/// start time follows.
pub fn normalize(groups: &[GroupEvents], kind: EventKind) -> Result<Vec<NormalizedEvent>> {
    let mut events = Vec::new();
    for group in groups {
        let nodes = match kind {
            EventKind::Upcoming => &group.upcoming,
            EventKind::Past => &group.past,
        };
        for node in nodes {
            events.push(normalize_node(node, &group.name)?);
        }
    }
    Ok(events)
}

fn normalize_node(node: &RawEventNode, group_name: &str) -> Result<NormalizedEvent> {
    for (value, field) in [
        (&node.title, "title"),
        (&node.event_url, "eventUrl"),
        (&node.date_time, "dateTime"),
    ] {
        if value.trim().is_empty() {
            return Err(SnapshotError::MalformedData {
                group: group_name.to_string(),
                message: format!("event with empty {field}"),
            });
        }
    }
    if parse_instant(&node.date_time).is_none() {
        return Err(SnapshotError::MalformedData {
            group: group_name.to_string(),
            message: format!("unparseable dateTime {:?} on {:?}", node.date_time, node.title),
        });
    }

    Ok(NormalizedEvent {
        title: node.title.clone(),
        description: sanitize::sanitize_description(node.description.as_deref().unwrap_or("")),
        venue: node.venue.clone(),
        event_url: node.event_url.clone(),
        date_time: node.date_time.clone(),
        end_time: node.end_time.clone(),
        timezone: node.timezone.clone(),
        group_name: group_name.to_string(),
    })
}

/// Stable sort by start instant. Ties keep their original relative order, so
/// the result is deterministic for any input order of equal timestamps.
pub fn sort_by_start(
    events: Vec<NormalizedEvent>,
    direction: SortDirection,
) -> Result<Vec<NormalizedEvent>> {
    let mut keyed = events
        .into_iter()
        .map(|event| {
            let instant = parse_instant(&event.date_time).ok_or_else(|| {
                SnapshotError::MalformedData {
                    group: event.group_name.clone(),
                    message: format!("unparseable dateTime {:?} on {:?}", event.date_time, event.title),
                }
            })?;
            Ok((instant, event))
        })
        .collect::<Result<Vec<_>>>()?;

    keyed.sort_by(|a, b| match direction {
        SortDirection::Ascending => a.0.cmp(&b.0),
        SortDirection::Descending => b.0.cmp(&a.0),
    });

    Ok(keyed.into_iter().map(|(_, event)| event).collect())
}

/// One full ingestion run: fetch every configured group concurrently, merge
/// and sort, then atomically replace the snapshot. The first fetch failure
/// aborts the run; dropping the unresolved fetch futures cancels their
/// requests, and no write happens.
pub async fn run(config: &SnapshotConfig) -> Result<RunSummary> {
    info!(groups = config.groups.len(), endpoint = %config.endpoint, "starting snapshot run");

    let client = meetup::build_client(config.fetch_timeout())?;
    let fetches = config
        .groups
        .iter()
        .map(|group| meetup::fetch_group(&client, &config.endpoint, group));
    let groups = future::try_join_all(fetches).await?;

    let upcoming = sort_by_start(normalize(&groups, EventKind::Upcoming)?, SortDirection::Ascending)?;
    let past = sort_by_start(normalize(&groups, EventKind::Past)?, SortDirection::Descending)?;

    let summary = RunSummary {
        upcoming: upcoming.len(),
        past: past.len(),
        snapshot_path: config.snapshot_path.clone(),
    };

    let mut events = upcoming;
    events.extend(past);
    snapshot::write(&config.snapshot_path, &Snapshot { events })?;

    info!(
        upcoming = summary.upcoming,
        past = summary.past,
        path = %summary.snapshot_path.display(),
        "snapshot replaced"
    );
    Ok(summary)
}
