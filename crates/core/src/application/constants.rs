// Application constants (No magic values)

pub use crate::domain::queue::{DEFAULT_ROW_WIDTH, MAX_QUEUE_NAME_LEN};

/// Attempts per mutating call before reporting a transient failure
pub const DEFAULT_MAX_COMMIT_ATTEMPTS: u32 = 10;

/// Delay before the first conflict retry (5ms)
pub const DEFAULT_RETRY_BASE_DELAY_MS: u64 = 5;

/// Multiplier applied to the delay after every conflicting attempt
pub const DEFAULT_BACKOFF_FACTOR: f64 = 2.0;

/// Upper bound for a single retry delay (250ms)
pub const MAX_RETRY_DELAY_MS: u64 = 250;

/// Retry delay is scaled by a random factor in [JITTER_MIN, JITTER_MAX)
pub const JITTER_MIN: f64 = 0.5;
pub const JITTER_MAX: f64 = 1.5;
