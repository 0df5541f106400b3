//! Change notifications and their classification

use crate::models::ConfigData;

/// Kind of change notification observed on the watch stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Added,
    Modified,
    Deleted,
    /// Progress notification carrying only a fresh cursor
    Bookmark,
}

/// One change notification from the watch stream
#[derive(Debug, Clone)]
pub struct ConfigMapEvent {
    pub kind: EventKind,
    /// Snapshot of the source data field, if the event carried an object
    pub data: Option<ConfigData>,
    /// Resource version observed on this event
    pub cursor: Option<String>,
}

/// What the control loop should do with a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncAction {
    /// Replicate the snapshot to every target
    Replicate,
    /// Source was deleted: warn and keep watching, never patch
    SuppressAndWarn,
    /// Nothing to do
    Ignore,
}

/// Classify a notification kind into the action to take.
///
/// Every Added or Modified event triggers a full resync attempt, with no
/// diffing against a previous snapshot, even if the content is unchanged.
pub fn classify(kind: EventKind) -> SyncAction {
    match kind {
        EventKind::Added | EventKind::Modified => SyncAction::Replicate,
        EventKind::Deleted => SyncAction::SuppressAndWarn,
        EventKind::Bookmark => SyncAction::Ignore,
    }
}
