use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

use super::Suit;

/// Game identifier as printed by the feed (`#N<digits>`).
pub type GameNumber = u64;

/// Opaque reference to an announced message, owned by the transport.
///
/// Zero means the announcement was never delivered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnnouncementHandle(pub i64);

impl AnnouncementHandle {
    pub const NONE: AnnouncementHandle = AnnouncementHandle(0);

    pub fn is_set(&self) -> bool {
        self.0 != 0
    }
}

/// Lifecycle of an announced prediction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PredictionStatus {
    Pending,
    /// Suit appeared in the target game.
    HitImmediate,
    /// Suit appeared in the game after the target.
    HitDelayed,
    /// Suit absent from both games.
    Miss,
}

impl PredictionStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, PredictionStatus::Pending)
    }

    /// Glyph shown in the announcement's status slot.
    pub fn glyph(&self) -> &'static str {
        match self {
            PredictionStatus::Pending => "🔮",
            PredictionStatus::HitImmediate => "✅0️⃣",
            PredictionStatus::HitDelayed => "✅1️⃣",
            PredictionStatus::Miss => "❌",
        }
    }
}

/// A derived prediction that has not been announced yet.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueuedPrediction {
    pub target_game: GameNumber,
    pub predicted_suit: Suit,
    pub base_game: GameNumber,
    pub queued_at_ms: u64,
}

/// An announced prediction awaiting its two-chance resolution.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivePrediction {
    pub target_game: GameNumber,
    pub predicted_suit: Suit,
    /// Suit used for the backup if this prediction misses.
    pub alternate_suit: Suit,
    pub backup_game: GameNumber,
    pub base_game: GameNumber,
    pub status: PredictionStatus,
    /// 1 once the target game has been checked without a hit.
    pub check_count: u8,
    pub created_at_ms: u64,
    pub handle: AnnouncementHandle,
}

impl ActivePrediction {
    /// Whether the first chance (the target game itself) has been used up.
    pub fn first_chance_used(&self) -> bool {
        self.check_count >= 1
    }
}

#[derive(Debug, ThisError, PartialEq, Eq)]
pub enum InvariantError {
    #[error("target game {target} is both queued and active")]
    TargetInBoth { target: GameNumber },
    #[error("active set over capacity (len={len}, max={max})")]
    ActiveOverCapacity { len: usize, max: usize },
    #[error("backup game mismatch for target {target} (backup={backup}, offset={offset})")]
    BackupOffsetMismatch {
        target: GameNumber,
        backup: GameNumber,
        offset: u64,
    },
    #[error("check_count out of range for target {target} (got={got})")]
    CheckCountOutOfRange { target: GameNumber, got: u8 },
    #[error("terminal prediction {target} still active")]
    TerminalStillActive { target: GameNumber },
}
