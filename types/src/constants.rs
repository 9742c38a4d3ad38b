/// Maximum number of announced predictions awaiting resolution.
pub const DEFAULT_MAX_ACTIVE: usize = 2;

/// Maximum distance (in games) at which a queued prediction is announced.
pub const DEFAULT_PROXIMITY_THRESHOLD: u64 = 3;

/// Distance between the rule window start and the target game. Also the
/// distance between a missed target and its backup.
pub const DEFAULT_PREDICTION_OFFSET: u64 = 6;

/// Remembered `(game, prefix)` keys before the oldest is evicted.
pub const DEDUPE_CAPACITY: usize = 200;

/// Characters of message text that participate in the dedupe key.
pub const DEDUPE_PREFIX_CHARS: usize = 50;

/// Finalized games kept for diagnostics.
pub const RECENT_GAMES_CAPACITY: usize = 100;

/// Interval of the safety-net reset.
pub const HOURLY_RESET_SECS: u64 = 60 * 60;

/// One day, in seconds.
pub const DAY_SECS: u64 = 24 * 60 * 60;
