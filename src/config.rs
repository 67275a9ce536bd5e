use std::{env, fs, path::PathBuf, time::Duration};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SnapshotError};

/// Environment variable naming an alternative config file.
const CONFIG_PATH_VAR: &str = "MEETUP_SNAPSHOT_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "meetup-snapshot.json";

/// The meetup group urlnames the pipeline ingests by default.
const DEFAULT_GROUPS: [&str; 4] = [
    "coven-of-wisdom",
    "coven-of-wisdom-herentals",
    "coven-of-wisdom-amsterdam",
    "coven-of-wisdom-utrecht",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotConfig {
    pub groups: Vec<String>,
    pub endpoint: String,
    pub snapshot_path: PathBuf,
    pub fetch_timeout_secs: u64,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            groups: DEFAULT_GROUPS.iter().map(|g| g.to_string()).collect(),
            endpoint: "https://api.meetup.com/gql".to_string(),
            snapshot_path: PathBuf::from("data/events.json"),
            fetch_timeout_secs: 20,
        }
    }
}

impl SnapshotConfig {
    /// Loads the config file named by `MEETUP_SNAPSHOT_CONFIG`, falling back
    /// to `meetup-snapshot.json` in the working directory. A missing file
    /// yields the defaults; an unreadable or invalid one is an error.
    pub fn load() -> Result<Self> {
        let path = env::var(CONFIG_PATH_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));
        Self::load_from(&path)
    }

    pub fn load_from(path: &PathBuf) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path).map_err(|err| SnapshotError::Config {
            path: path.clone(),
            message: err.to_string(),
        })?;
        serde_json::from_str(&contents).map_err(|err| SnapshotError::Config {
            path: path.clone(),
            message: err.to_string(),
        })
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}
