// Terminal rendering of the queue view

use nextup_core::application::{QueueView, ViewEntry};
use nextup_core::domain::QueueState;
use serde::Serialize;
use tabled::builder::Builder;
use tabled::settings::Style;
use tabled::{Table, Tabled};

/// One line of `nextup status`
#[derive(Debug, Serialize, Tabled)]
pub struct StatusRow {
    pub queue: String,
    pub state: QueueState,
    pub waiting: usize,
    pub history: usize,
    pub reset_mode: String,
    pub duplicates: bool,
}

fn cell(entry: &ViewEntry) -> String {
    format!("#{} {}", entry.position, entry.participant.display_name())
}

/// Rows of participants as a grid, None when there are no rows
pub fn rows_table(rows: &[Vec<ViewEntry>]) -> Option<String> {
    if rows.is_empty() {
        return None;
    }

    let mut builder = Builder::default();
    for row in rows {
        builder.push_record(row.iter().map(cell));
    }

    let mut table = builder.build();
    table.with(Style::rounded());
    Some(table.to_string())
}

/// Banner line for the active participant
pub fn active_line(view: &QueueView) -> String {
    match &view.active {
        Some(entry) => format!("Up now: {}", cell(entry)),
        None => "Nobody is up. Join to start the queue.".to_string(),
    }
}

pub fn status_table(row: StatusRow) -> String {
    let mut table = Table::new(vec![row]);
    table.with(Style::rounded());
    table.to_string()
}
