//! Prediction store: the queue of unannounced predictions and the capped set of active ones.
//!
//! A target game lives in at most one of the two collections. Both are keyed by target game
//! in a `BTreeMap`, so every scan runs in ascending target order.

use std::collections::BTreeMap;
use suitwatch_types::{
    ActivePrediction, AnnouncementHandle, GameNumber, InvariantError, QueuedPrediction, Suit,
    SuitPairing, DEFAULT_MAX_ACTIVE, DEFAULT_PREDICTION_OFFSET, DEFAULT_PROXIMITY_THRESHOLD,
};
use tracing::info;

/// Capacity and distance parameters for the store.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StoreConfig {
    /// Maximum number of active predictions.
    pub max_active: usize,
    /// Maximum distance at which a queued prediction is promoted.
    pub proximity_threshold: u64,
    /// Distance from a target game to its backup.
    pub offset: u64,
    /// Pairing used to derive the backup suit.
    pub pairing: SuitPairing,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_active: DEFAULT_MAX_ACTIVE,
            proximity_threshold: DEFAULT_PROXIMITY_THRESHOLD,
            offset: DEFAULT_PREDICTION_OFFSET,
            pairing: SuitPairing::Color,
        }
    }
}

impl StoreConfig {
    /// Validate the configuration (all limits must be > 0).
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.max_active == 0 {
            return Err("max_active must be greater than zero");
        }
        if self.proximity_threshold == 0 {
            return Err("proximity_threshold must be greater than zero");
        }
        if self.offset == 0 {
            return Err("offset must be greater than zero");
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Default)]
pub struct Store {
    pub(crate) config: StoreConfig,
    pub(crate) queued: BTreeMap<GameNumber, QueuedPrediction>,
    pub(crate) active: BTreeMap<GameNumber, ActivePrediction>,
}

impl Store {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config,
            queued: BTreeMap::new(),
            active: BTreeMap::new(),
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Returns true if `target` is queued or active.
    pub fn is_scheduled(&self, target: GameNumber) -> bool {
        self.queued.contains_key(&target) || self.active.contains_key(&target)
    }

    /// Queue a prediction for `target`.
    ///
    /// Returns false without mutating anything if `target` is already queued or active.
    pub fn enqueue(
        &mut self,
        target: GameNumber,
        suit: Suit,
        base: GameNumber,
        now_ms: u64,
    ) -> bool {
        if self.is_scheduled(target) {
            info!(target_game = target, "prediction already queued or active, ignored");
            return false;
        }
        self.queued.insert(
            target,
            QueuedPrediction {
                target_game: target,
                predicted_suit: suit,
                base_game: base,
                queued_at_ms: now_ms,
            },
        );
        info!(target_game = target, %suit, base_game = base, "prediction queued");
        true
    }

    /// Record the transport handle of an announced prediction.
    ///
    /// Returns false if `target` is no longer active (resolved or cleared while the
    /// announcement was in flight).
    pub fn attach_handle(&mut self, target: GameNumber, handle: AnnouncementHandle) -> bool {
        match self.active.get_mut(&target) {
            Some(prediction) => {
                prediction.handle = handle;
                true
            }
            None => false,
        }
    }

    pub fn queued(&self, target: GameNumber) -> Option<&QueuedPrediction> {
        self.queued.get(&target)
    }

    pub fn active(&self, target: GameNumber) -> Option<&ActivePrediction> {
        self.active.get(&target)
    }

    pub fn queued_len(&self) -> usize {
        self.queued.len()
    }

    pub fn active_len(&self) -> usize {
        self.active.len()
    }

    pub fn is_full(&self) -> bool {
        self.active.len() >= self.config.max_active
    }

    /// Queue snapshot, sorted by target game.
    pub fn queued_snapshot(&self) -> Vec<QueuedPrediction> {
        self.queued.values().cloned().collect()
    }

    /// Active snapshot, sorted by target game.
    pub fn active_snapshot(&self) -> Vec<ActivePrediction> {
        self.active.values().cloned().collect()
    }

    /// Empty both collections.
    pub fn clear(&mut self) {
        self.queued.clear();
        self.active.clear();
    }

    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        if self.active.len() > self.config.max_active {
            return Err(InvariantError::ActiveOverCapacity {
                len: self.active.len(),
                max: self.config.max_active,
            });
        }
        for (target, prediction) in &self.active {
            if self.queued.contains_key(target) {
                return Err(InvariantError::TargetInBoth { target: *target });
            }
            if prediction.backup_game != target.saturating_add(self.config.offset) {
                return Err(InvariantError::BackupOffsetMismatch {
                    target: *target,
                    backup: prediction.backup_game,
                    offset: self.config.offset,
                });
            }
            if prediction.check_count > 1 {
                return Err(InvariantError::CheckCountOutOfRange {
                    target: *target,
                    got: prediction.check_count,
                });
            }
            if prediction.status.is_terminal() {
                return Err(InvariantError::TerminalStillActive { target: *target });
            }
        }
        Ok(())
    }
}
