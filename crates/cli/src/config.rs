// CLI configuration (flags with environment fallbacks)

use clap::{Args, Parser, Subcommand};
use nextup_core::application::constants::{
    DEFAULT_MAX_COMMIT_ATTEMPTS, DEFAULT_RETRY_BASE_DELAY_MS, DEFAULT_ROW_WIDTH,
};
use nextup_core::application::ConflictRetryPolicy;
use nextup_core::domain::{Participant, QueueConfig, ResetMode};
use nextup_infra_sqlite::is_memory_url;
use std::path::PathBuf;

pub const DEFAULT_DB_PATH: &str = "~/.nextup/queue.db";
pub const DEFAULT_QUEUE: &str = "default";

#[derive(Parser, Debug)]
#[command(name = "nextup")]
#[command(about = "Take turns: a shared \"who goes next\" queue", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub settings: Settings,

    /// More log output (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Queue and store settings shared by every subcommand
#[derive(Args, Debug, Clone)]
pub struct Settings {
    /// SQLite database path or URL
    #[arg(long = "db", global = true, env = "NEXTUP_DB_PATH", default_value = DEFAULT_DB_PATH)]
    pub db_path: String,

    /// Queue name (one per widget / meeting)
    #[arg(short, long, global = true, env = "NEXTUP_QUEUE", default_value = DEFAULT_QUEUE)]
    pub queue: String,

    /// Debug mode: let the same participant join more than once
    #[arg(long, global = true, env = "NEXTUP_ALLOW_DUPLICATES")]
    pub allow_duplicates: bool,

    /// What reset clears: waiting-only or waiting-and-history
    #[arg(long, global = true, env = "NEXTUP_RESET_MODE", default_value_t = ResetMode::WaitingOnly)]
    pub reset_mode: ResetMode,

    /// Participants per rendered row
    #[arg(long, global = true, env = "NEXTUP_ROW_WIDTH", default_value_t = DEFAULT_ROW_WIDTH)]
    pub row_width: usize,

    /// Attempts per write before giving up on conflicts
    #[arg(long, global = true, env = "NEXTUP_MAX_ATTEMPTS", default_value_t = DEFAULT_MAX_COMMIT_ATTEMPTS)]
    pub max_attempts: u32,

    /// Delay before the first conflict retry, in milliseconds
    #[arg(long, global = true, env = "NEXTUP_RETRY_BASE_DELAY_MS", default_value_t = DEFAULT_RETRY_BASE_DELAY_MS)]
    pub retry_base_delay_ms: u64,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Join the end of the queue
    Join(Identity),

    /// End the current turn and move on to the next participant
    Next,

    /// Clear the queue
    Reset {
        /// Clear history too, regardless of the configured reset mode
        #[arg(long)]
        history: bool,
    },

    /// Show who is up, who is waiting and who already went
    Show {
        /// Print the view as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show queue counts and settings
    Status,
}

/// Identity of the caller
#[derive(Args, Debug, Clone, Default)]
pub struct Identity {
    /// Participant id
    #[arg(long, env = "NEXTUP_USER_ID")]
    pub id: Option<String>,

    /// Display name (defaults to the id)
    #[arg(long, env = "NEXTUP_USER_NAME")]
    pub name: Option<String>,

    /// Photo URL
    #[arg(long, env = "NEXTUP_USER_PHOTO")]
    pub photo: Option<String>,
}

impl Identity {
    /// None when no id was supplied
    pub fn participant(&self) -> Option<Participant> {
        let id = self.id.as_deref()?;
        let name = self.name.clone().unwrap_or_else(|| id.to_string());
        let participant = Participant::new(id, name);

        Some(match &self.photo {
            Some(photo) => participant.with_photo(photo.clone()),
            None => participant,
        })
    }
}

impl Settings {
    pub fn queue_config(&self) -> QueueConfig {
        QueueConfig::new(self.queue.clone())
            .with_allow_duplicates(self.allow_duplicates)
            .with_reset_mode(self.reset_mode)
            .with_row_width(self.row_width)
    }

    pub fn retry_policy(&self) -> ConflictRetryPolicy {
        ConflictRetryPolicy::new(self.max_attempts, self.retry_base_delay_ms)
    }

    /// Database URL with `~` expanded
    pub fn database_url(&self) -> String {
        if is_memory_url(&self.db_path) {
            return self.db_path.clone();
        }
        shellexpand::tilde(&self.db_path).into_owned()
    }

    /// Database file on disk, None for in-memory databases
    pub fn database_file(&self) -> Option<PathBuf> {
        database_file(&self.database_url())
    }
}

/// File behind a plain path or a `sqlite:` URL
pub fn database_file(database_url: &str) -> Option<PathBuf> {
    if is_memory_url(database_url) {
        return None;
    }

    let path = database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"))
        .unwrap_or(database_url);
    let path = path.split('?').next().unwrap_or(path);

    if path.is_empty() {
        None
    } else {
        Some(PathBuf::from(path))
    }
}
