use std::collections::HashMap;

use serde::Deserialize;
use tracing::warn;

use super::{StepId, StepState, StepStatus, WorkflowSnapshot};
use crate::error::{Result, VaultboardError};

/// Wire shape of a single step entry.
///
/// The backend sends `status`; the original web frontend spoke `state`, so
/// that spelling is accepted as an alias. A value with neither field means
/// the step is back at `none`.
#[derive(Debug, Deserialize)]
struct RawEntry {
    #[serde(default, alias = "state")]
    status: Option<String>,
    #[serde(default)]
    reason: Option<String>,
}

/// One decoded step entry out of an update message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepEntry {
    pub id: StepId,
    pub state: StepState,
}

/// A decoded update message: a partial set of step replacements.
///
/// Covers one or more steps, never required to cover all of them.
#[derive(Debug, Clone, Default)]
pub struct StepUpdate {
    pub entries: Vec<StepEntry>,
}

impl StepUpdate {
    /// Decode a raw frame into a step update.
    ///
    /// The frame is rejected as a whole if it is not a JSON object of the
    /// expected shape or if any entry carries an unknown status value.
    /// Entries whose key is not a known step id are skipped with a warning;
    /// the rest of the frame still decodes.
    pub fn decode(raw: &str) -> Result<StepUpdate> {
        let raw_entries: HashMap<String, RawEntry> = serde_json::from_str(raw)?;

        let mut entries = Vec::with_capacity(raw_entries.len());
        for (name, entry) in raw_entries {
            let Some(id) = StepId::parse(&name) else {
                warn!("Ignoring unknown step id '{}' in update", name);
                continue;
            };

            let status = match entry.status {
                None => StepStatus::None,
                Some(value) => StepStatus::parse(&value).ok_or_else(|| {
                    VaultboardError::UnknownStatus {
                        step: name.clone(),
                        value,
                    }
                })?,
            };

            entries.push(StepEntry {
                id,
                state: StepState {
                    status,
                    reason: entry.reason,
                },
            });
        }

        Ok(StepUpdate { entries })
    }

    /// Update touching a single step. Handy for the demo feed and tests.
    pub fn single(id: StepId, status: StepStatus, reason: Option<&str>) -> StepUpdate {
        StepUpdate {
            entries: vec![StepEntry {
                id,
                state: StepState {
                    status,
                    reason: reason.map(str::to_string),
                },
            }],
        }
    }
}

/// Authoritative holder of the latest known state per step.
///
/// Single-threaded by construction: one store instance is driven by one event
/// loop, so `apply` calls never interleave and no locking is needed.
pub struct StepStore {
    current: WorkflowSnapshot,
}

impl StepStore {
    /// New store with every step at `none`.
    pub fn new() -> Self {
        Self {
            current: WorkflowSnapshot::empty(),
        }
    }

    /// The latest published snapshot.
    pub fn snapshot(&self) -> WorkflowSnapshot {
        self.current.clone()
    }

    /// Apply a decoded update and publish the successor snapshot.
    ///
    /// Each step named in the update is replaced wholesale with the incoming
    /// state; steps not named keep their previous state untouched.
    pub fn apply(&mut self, update: StepUpdate) -> WorkflowSnapshot {
        self.current = self
            .current
            .with_replaced(update.entries.into_iter().map(|e| (e.id, e.state)));
        self.current.clone()
    }

    /// Decode a raw frame and apply it.
    ///
    /// A frame that fails to decode is dropped as a whole: the error is
    /// returned and the snapshot is left exactly as it was.
    pub fn apply_frame(&mut self, raw: &str) -> Result<WorkflowSnapshot> {
        let update = StepUpdate::decode(raw)?;
        Ok(self.apply(update))
    }
}

impl Default for StepStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn untouched_steps_stay_at_default() {
        let mut store = StepStore::new();
        store.apply(StepUpdate::single(StepId::Up, StepStatus::Active, None));

        let snapshot = store.snapshot();
        assert_eq!(snapshot.step(StepId::Up).status, StepStatus::Active);
        for id in [StepId::Init, StepId::Auth, StepId::Secret, StepId::Clean] {
            assert_eq!(snapshot.step(id).status, StepStatus::None);
            assert_eq!(snapshot.step(id).reason, None);
        }
    }

    #[test]
    fn later_update_supersedes_earlier_wholesale() {
        let mut store = StepStore::new();
        store.apply(StepUpdate::single(
            StepId::Up,
            StepStatus::Failed,
            Some("connection refused"),
        ));
        store.apply(StepUpdate::single(StepId::Up, StepStatus::Finished, None));

        let state = store.snapshot().step(StepId::Up).clone();
        assert_eq!(state.status, StepStatus::Finished);
        // Whole-record replacement: the old reason does not survive a merge.
        assert_eq!(state.reason, None);
    }

    #[test]
    fn frame_with_unknown_step_id_applies_the_rest() {
        let mut store = StepStore::new();
        let snapshot = store
            .apply_frame(r#"{"up": {"status": "active"}, "bogus": {"status": "active"}}"#)
            .unwrap();

        assert_eq!(snapshot.step(StepId::Up).status, StepStatus::Active);
        assert_eq!(snapshot.step(StepId::Init).status, StepStatus::None);
    }

    #[test]
    fn malformed_frame_leaves_snapshot_untouched() {
        let mut store = StepStore::new();
        store
            .apply_frame(r#"{"up": {"status": "active"}}"#)
            .unwrap();
        let before = store.snapshot();

        assert!(store.apply_frame("not json at all").is_err());
        assert!(store.snapshot().same_as(&before));
    }

    #[test]
    fn unknown_status_value_rejects_the_whole_frame() {
        let mut store = StepStore::new();
        let err = store
            .apply_frame(r#"{"up": {"status": "exploded"}, "auth": {"status": "active"}}"#)
            .unwrap_err();

        assert!(matches!(err, VaultboardError::UnknownStatus { .. }));
        // No partial application: auth was valid but must not have landed.
        assert_eq!(store.snapshot().step(StepId::Auth).status, StepStatus::None);
    }

    #[test]
    fn state_key_is_accepted_as_status_alias() {
        let mut store = StepStore::new();
        let snapshot = store
            .apply_frame(r#"{"init": {"state": "finished"}}"#)
            .unwrap();
        assert_eq!(snapshot.step(StepId::Init).status, StepStatus::Finished);
    }

    #[test]
    fn missing_status_field_means_none() {
        let mut store = StepStore::new();
        store.apply(StepUpdate::single(StepId::Role, StepStatus::Active, None));
        let snapshot = store.apply_frame(r#"{"role": {}}"#).unwrap();
        assert_eq!(snapshot.step(StepId::Role).status, StepStatus::None);
    }

    #[test]
    fn held_snapshot_is_not_disturbed_by_later_updates() {
        let mut store = StepStore::new();
        let before = store.snapshot();
        store.apply(StepUpdate::single(StepId::Init, StepStatus::Active, None));

        assert_eq!(before.step(StepId::Init).status, StepStatus::None);
        assert_eq!(
            store.snapshot().step(StepId::Init).status,
            StepStatus::Active
        );
    }
}
