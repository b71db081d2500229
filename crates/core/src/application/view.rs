// View Projection - render-ready groups derived from a snapshot

use crate::domain::{OrderedEntry, Participant, QueueSnapshot, QueueState, SequenceKey};
use serde::Serialize;

/// One rendered participant
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewEntry {
    /// 1-based enqueue rank (the entry's sequence key)
    pub position: SequenceKey,
    pub participant: Participant,
}

impl From<&OrderedEntry> for ViewEntry {
    fn from(entry: &OrderedEntry) -> Self {
        Self {
            position: entry.sequence_key,
            participant: entry.participant.clone(),
        }
    }
}

/// The three display groups of a queue
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueueView {
    pub state: QueueState,
    pub active: Option<ViewEntry>,
    pub waiting_rows: Vec<Vec<ViewEntry>>,
    pub history_rows: Vec<Vec<ViewEntry>>,
}

impl QueueView {
    /// Waiting participants after the active one
    pub fn waiting_count(&self) -> usize {
        self.waiting_rows.iter().map(Vec::len).sum()
    }

    pub fn history_count(&self) -> usize {
        self.history_rows.iter().map(Vec::len).sum()
    }
}

/// Project a snapshot into display groups.
///
/// Pure: same snapshot, same view. Rows hold at most `row_width` entries
/// and keep ascending key order.
pub fn project(snapshot: &QueueSnapshot, row_width: usize) -> QueueView {
    QueueView {
        state: snapshot.state(),
        active: snapshot.active().map(ViewEntry::from),
        waiting_rows: chunk_rows(snapshot.waiting_excluding_active(), row_width),
        history_rows: chunk_rows(snapshot.history_in_order(), row_width),
    }
}

fn chunk_rows(entries: &[OrderedEntry], row_width: usize) -> Vec<Vec<ViewEntry>> {
    entries
        .chunks(row_width.max(1))
        .map(|row| row.iter().map(ViewEntry::from).collect())
        .collect()
}
