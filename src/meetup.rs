use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::error::{Result, SnapshotError};
use crate::models::RawEventNode;

/// First-page size for upcoming events; past events take whatever the first
/// page holds (deeper pages are a known limitation, not fetched).
const UPCOMING_PAGE_SIZE: u32 = 10;

const USER_AGENT: &str = concat!("meetup-snapshot/", env!("CARGO_PKG_VERSION"));

/// One group's fetch result, flattened out of the GraphQL edge lists.
#[derive(Debug, Clone)]
pub struct GroupEvents {
    pub name: String,
    pub upcoming: Vec<RawEventNode>,
    pub past: Vec<RawEventNode>,
}

#[derive(Debug, Deserialize)]
struct GqlResponse {
    data: Option<GqlData>,
    #[serde(default)]
    errors: Vec<GqlError>,
}

#[derive(Debug, Deserialize)]
struct GqlError {
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GqlData {
    group_by_urlname: Option<GqlGroup>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GqlGroup {
    name: String,
    #[serde(default)]
    upcoming_events: EdgeList,
    #[serde(default)]
    past_events: EdgeList,
}

#[derive(Debug, Deserialize, Default)]
struct EdgeList {
    #[serde(default)]
    edges: Vec<Edge>,
}

#[derive(Debug, Deserialize)]
struct Edge {
    node: RawEventNode,
}

pub fn build_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .map_err(SnapshotError::ClientSetup)
}

fn group_query(urlname: &str) -> String {
    format!(
        r#"{{
  groupByUrlname(urlname: "{urlname}") {{
    name
    upcomingEvents(input: {{ first: {UPCOMING_PAGE_SIZE} }}) {{
      edges {{
        node {{
          title
          description
          venue {{ name address postalCode city country }}
          eventUrl
          dateTime
          endTime
          timezone
        }}
      }}
    }}
    pastEvents(input: {{}}) {{
      edges {{
        node {{
          title
          description
          venue {{ name address postalCode city country }}
          eventUrl
          dateTime
          endTime
          timezone
        }}
      }}
    }}
  }}
}}"#
    )
}

/// Fetches the upcoming and past events of one group. Any transport failure,
/// envelope error, undecodable body, or unknown urlname is a typed error that
/// names the group, so the run can abort with a usable message.
pub async fn fetch_group(client: &Client, endpoint: &str, urlname: &str) -> Result<GroupEvents> {
    debug!(group = urlname, "fetching meetup events");

    let response = client
        .post(endpoint)
        .json(&json!({ "query": group_query(urlname) }))
        .send()
        .await
        .map_err(|source| SnapshotError::Transport {
            group: urlname.to_string(),
            source,
        })?
        .error_for_status()
        .map_err(|source| SnapshotError::Transport {
            group: urlname.to_string(),
            source,
        })?;

    let body = response
        .text()
        .await
        .map_err(|source| SnapshotError::Transport {
            group: urlname.to_string(),
            source,
        })?;

    let envelope: GqlResponse =
        serde_json::from_str(&body).map_err(|err| SnapshotError::MalformedData {
            group: urlname.to_string(),
            message: format!("undecodable response body: {err}"),
        })?;

    if !envelope.errors.is_empty() {
        let message = envelope
            .errors
            .into_iter()
            .map(|err| err.message)
            .collect::<Vec<_>>()
            .join("; ");
        return Err(SnapshotError::RemoteApi {
            group: urlname.to_string(),
            message,
        });
    }

    let group = envelope
        .data
        .and_then(|data| data.group_by_urlname)
        .ok_or_else(|| SnapshotError::UnknownGroup {
            group: urlname.to_string(),
        })?;

    debug!(
        group = urlname,
        upcoming = group.upcoming_events.edges.len(),
        past = group.past_events.edges.len(),
        "fetched meetup events"
    );

    Ok(GroupEvents {
        name: group.name,
        upcoming: group
            .upcoming_events
            .edges
            .into_iter()
            .map(|edge| edge.node)
            .collect(),
        past: group
            .past_events
            .edges
            .into_iter()
            .map(|edge| edge.node)
            .collect(),
    })
}
