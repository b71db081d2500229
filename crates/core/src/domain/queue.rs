// Queue Domain Model

use super::error::{DomainError, Result};
use serde::{Deserialize, Serialize};

/// Queue identifier (one per widget instance)
pub type QueueId = String;

/// Longest accepted queue name
pub const MAX_QUEUE_NAME_LEN: usize = 64;

/// Participants per rendered row
pub const DEFAULT_ROW_WIDTH: usize = 3;

/// What `reset` clears
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResetMode {
    /// Clear waiting only; history stays visible
    #[default]
    WaitingOnly,
    /// Clear both lists
    WaitingAndHistory,
}

impl std::str::FromStr for ResetMode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "waiting-only" | "waiting" => Ok(ResetMode::WaitingOnly),
            "waiting-and-history" | "all" => Ok(ResetMode::WaitingAndHistory),
            other => Err(DomainError::ValidationError(format!(
                "unknown reset mode '{}' (expected waiting-only or waiting-and-history)",
                other
            ))),
        }
    }
}

impl std::fmt::Display for ResetMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResetMode::WaitingOnly => write!(f, "waiting-only"),
            ResetMode::WaitingAndHistory => write!(f, "waiting-and-history"),
        }
    }
}

/// Queue configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueConfig {
    pub name: QueueId,
    /// Debug switch: let the same participant join more than once
    #[serde(default)]
    pub allow_duplicates: bool,
    #[serde(default)]
    pub reset_mode: ResetMode,
    #[serde(default = "default_row_width")]
    pub row_width: usize,
}

fn default_row_width() -> usize {
    DEFAULT_ROW_WIDTH
}

impl QueueConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            allow_duplicates: false,
            reset_mode: ResetMode::default(),
            row_width: DEFAULT_ROW_WIDTH,
        }
    }

    pub fn with_allow_duplicates(mut self, allow: bool) -> Self {
        self.allow_duplicates = allow;
        self
    }

    pub fn with_reset_mode(mut self, mode: ResetMode) -> Self {
        self.reset_mode = mode;
        self
    }

    pub fn with_row_width(mut self, width: usize) -> Self {
        self.row_width = width;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(DomainError::ValidationError(
                "queue name cannot be empty".to_string(),
            ));
        }

        if self.name.len() > MAX_QUEUE_NAME_LEN {
            return Err(DomainError::ValidationError(format!(
                "queue name too long (max {} chars)",
                MAX_QUEUE_NAME_LEN
            )));
        }

        if !self
            .name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(DomainError::ValidationError(
                "queue name must be alphanumeric, '_' or '-'".to_string(),
            ));
        }

        if self.row_width == 0 {
            return Err(DomainError::ValidationError(
                "row width must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self::new("default")
    }
}
