use tracing::warn;

use crate::locale::LocaleTable;
use crate::workflow::{StepId, StepState, StepStatus, WorkflowSnapshot};

/// Everything the rendering layer needs for one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedStep {
    pub id: StepId,
    pub status: StepStatus,
    pub style_class: &'static str,
    pub title: String,
    pub description: String,
}

/// Resolve one step's display state.
///
/// Pure: no clock, no randomness, no hidden state. The description is the
/// failure reason only when the step itself is failed and a non-empty reason
/// is present; in every other case it is the localized default. A stale
/// reason on a non-failed step is suppressed here, not in the store.
///
/// A localization miss renders as an empty string for that field (with a
/// warning) rather than failing; one missing translation must never blank
/// the whole view.
pub fn resolve(id: StepId, state: &StepState, table: &LocaleTable) -> ResolvedStep {
    let title = lookup(table.title(id), id, "title");

    let description = match (&state.status, &state.reason) {
        (StepStatus::Failed, Some(reason)) if !reason.is_empty() => reason.clone(),
        _ => lookup(table.description(id), id, "description"),
    };

    ResolvedStep {
        id,
        status: state.status,
        style_class: state.status.style_class(),
        title,
        description,
    }
}

fn lookup(text: Option<&str>, id: StepId, field: &str) -> String {
    match text {
        Some(text) => text.to_string(),
        None => {
            warn!("Missing localization for step '{}' {}", id.as_str(), field);
            String::new()
        }
    }
}

/// Derive the full ordered list of resolved steps from a snapshot.
///
/// Always in canonical workflow order, regardless of the order updates
/// arrived in. Re-derived from scratch on every call; holds nothing back.
pub fn derive(snapshot: &WorkflowSnapshot, table: &LocaleTable) -> Vec<ResolvedStep> {
    snapshot
        .iter()
        .map(|(id, state)| resolve(id, state, table))
        .collect()
}
