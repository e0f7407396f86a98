//! Live CI/CD pipeline state.
//!
//! The store holds the most recent stage statuses and git metadata pushed by
//! the CI webhook. Updates merge permissively: only keys carrying a non-empty
//! string overwrite the stored value, everything else is left as it was.
//! Readers merge the live record with configured defaults field by field.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Status reported for a stage that has neither a live value nor a default.
pub const UNKNOWN_STAGE: &str = "Unknown";

/// Pipeline stage statuses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stages {
    pub build: Option<String>,
    pub test: Option<String>,
    pub deploy: Option<String>,
}

/// Git metadata of the deployed revision.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitInfo {
    pub branch: Option<String>,
    pub commit: Option<String>,
    pub author: Option<String>,
    pub date: Option<String>,
}

/// Fallback values used for fields no update has set yet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CiDefaults {
    pub stages: Stages,
    pub git: GitInfo,
}

/// Merged view of the CI state as returned to readers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CiSnapshot {
    pub stages: Stages,
    pub git: GitInfo,
    pub last_update: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default)]
struct CiState {
    stages: Stages,
    git: GitInfo,
    last_update: Option<DateTime<Utc>>,
}

/// Mutex-guarded CI record.
#[derive(Debug, Default)]
pub struct CiStore {
    state: Mutex<CiState>,
}

impl CiStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies an update payload and stamps the record with the current time.
    ///
    /// Recognised keys are `build`, `test`, `deploy`, `branch`, `commit`,
    /// `author` and `date`. Unknown keys, non-string values and empty strings
    /// are ignored. Returns the new last-update timestamp.
    pub fn update(&self, fields: &Map<String, Value>) -> DateTime<Utc> {
        self.update_at(fields, Utc::now())
    }

    pub fn update_at(&self, fields: &Map<String, Value>, now: DateTime<Utc>) -> DateTime<Utc> {
        let mut state = self.lock();

        merge_field(&mut state.stages.build, fields, "build");
        merge_field(&mut state.stages.test, fields, "test");
        merge_field(&mut state.stages.deploy, fields, "deploy");
        merge_field(&mut state.git.branch, fields, "branch");
        merge_field(&mut state.git.commit, fields, "commit");
        merge_field(&mut state.git.author, fields, "author");
        merge_field(&mut state.git.date, fields, "date");

        state.last_update = Some(now);
        now
    }

    /// Returns the live record with `defaults` filled in for unset fields.
    pub fn snapshot_with_defaults(&self, defaults: &CiDefaults) -> CiSnapshot {
        let live = self.lock().clone();

        CiSnapshot {
            stages: Stages {
                build: live.stages.build.or_else(|| defaults.stages.build.clone()),
                test: live.stages.test.or_else(|| defaults.stages.test.clone()),
                deploy: live.stages.deploy.or_else(|| defaults.stages.deploy.clone()),
            },
            git: GitInfo {
                branch: live.git.branch.or_else(|| defaults.git.branch.clone()),
                commit: live.git.commit.or_else(|| defaults.git.commit.clone()),
                author: live.git.author.or_else(|| defaults.git.author.clone()),
                date: live.git.date.or_else(|| defaults.git.date.clone()),
            },
            last_update: live.last_update,
        }
    }

    pub fn last_update(&self) -> Option<DateTime<Utc>> {
        self.lock().last_update
    }

    fn lock(&self) -> MutexGuard<'_, CiState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn merge_field(slot: &mut Option<String>, fields: &Map<String, Value>, key: &str) {
    if let Some(Value::String(value)) = fields.get(key) {
        if !value.is_empty() {
            *slot = Some(value.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn fields(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected a JSON object"),
        }
    }

    fn defaults() -> CiDefaults {
        CiDefaults {
            stages: Stages {
                build: Some("Success".into()),
                test: Some("Success".into()),
                deploy: Some(UNKNOWN_STAGE.into()),
            },
            git: GitInfo {
                branch: Some("main".into()),
                commit: Some("abc1234".into()),
                author: None,
                date: None,
            },
        }
    }

    #[test]
    fn test_fresh_store_reports_defaults() {
        let store = CiStore::new();
        let snapshot = store.snapshot_with_defaults(&defaults());
        assert_eq!(snapshot.stages, defaults().stages);
        assert_eq!(snapshot.git, defaults().git);
        assert!(snapshot.last_update.is_none());
    }

    #[test]
    fn test_empty_update_only_touches_timestamp() {
        let store = CiStore::new();
        let before = store.snapshot_with_defaults(&defaults());

        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        store.update_at(&Map::new(), now);

        let after = store.snapshot_with_defaults(&defaults());
        assert_eq!(after.stages, before.stages);
        assert_eq!(after.git, before.git);
        assert_eq!(after.last_update, Some(now));
    }

    #[test]
    fn test_single_field_update() {
        let store = CiStore::new();
        store.update(&fields(json!({"build": "Failed"})));

        let snapshot = store.snapshot_with_defaults(&defaults());
        assert_eq!(snapshot.stages.build.as_deref(), Some("Failed"));
        assert_eq!(snapshot.stages.test.as_deref(), Some("Success"));
        assert_eq!(snapshot.stages.deploy.as_deref(), Some(UNKNOWN_STAGE));
        assert_eq!(snapshot.git, defaults().git);
    }

    #[test]
    fn test_empty_and_non_string_values_never_clear() {
        let store = CiStore::new();
        store.update(&fields(json!({"test": "Running", "branch": "feature/x"})));
        store.update(&fields(json!({
            "test": "",
            "branch": null,
            "commit": 42,
            "unrelated": "ignored"
        })));

        let snapshot = store.snapshot_with_defaults(&CiDefaults::default());
        assert_eq!(snapshot.stages.test.as_deref(), Some("Running"));
        assert_eq!(snapshot.git.branch.as_deref(), Some("feature/x"));
        assert!(snapshot.git.commit.is_none());
    }

    #[test]
    fn test_live_value_wins_per_field() {
        let store = CiStore::new();
        store.update(&fields(json!({"author": "dev", "deploy": "Success"})));

        let snapshot = store.snapshot_with_defaults(&defaults());
        assert_eq!(snapshot.git.author.as_deref(), Some("dev"));
        assert_eq!(snapshot.git.branch.as_deref(), Some("main"));
        assert_eq!(snapshot.stages.deploy.as_deref(), Some("Success"));
        assert!(store.last_update().is_some());
    }

    #[test]
    fn test_later_update_overwrites_earlier() {
        let store = CiStore::new();
        store.update(&fields(json!({"deploy": "Running"})));
        store.update(&fields(json!({"deploy": "Success"})));

        let snapshot = store.snapshot_with_defaults(&defaults());
        assert_eq!(snapshot.stages.deploy.as_deref(), Some("Success"));
    }
}
