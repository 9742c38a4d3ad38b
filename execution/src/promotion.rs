//! Promotion of queued predictions into the active set.

use suitwatch_types::{
    ActivePrediction, AnnouncementHandle, GameNumber, PredictionStatus, QueuedPrediction, Suit,
};
use tracing::{info, warn};

use crate::store::Store;

/// A queued prediction that became active and must be announced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Promotion {
    pub target_game: GameNumber,
    pub predicted_suit: Suit,
    pub base_game: GameNumber,
    pub distance: u64,
}

/// Outcome of one [`Store::promote_due`] pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PromotionReport {
    /// Promoted in ascending target order.
    pub promoted: Vec<Promotion>,
    /// Dropped because their target game is not in the future.
    pub expired: Vec<QueuedPrediction>,
    /// Within range but left queued because the active set is full.
    pub deferred: Vec<GameNumber>,
}

impl Store {
    /// Promote queued predictions whose target is at most `proximity_threshold` games after
    /// `current`, while the active set has room.
    ///
    /// Entries whose target is `<= current` are dropped on every call, even when the active
    /// set is full. Entries further than the threshold stay queued for a later call.
    pub fn promote_due(&mut self, current: GameNumber, now_ms: u64) -> PromotionReport {
        let mut report = PromotionReport::default();
        if self.is_full() {
            info!(
                active = self.active.len(),
                max = self.config.max_active,
                "active set full, only expiring"
            );
        }

        let targets: Vec<GameNumber> = self.queued.keys().copied().collect();
        for target in targets {
            if target <= current {
                if let Some(expired) = self.queued.remove(&target) {
                    warn!(target_game = target, current_game = current, "queued prediction expired");
                    report.expired.push(expired);
                }
                continue;
            }

            let distance = target - current;
            if distance > self.config.proximity_threshold {
                continue;
            }
            if self.is_full() {
                report.deferred.push(target);
                continue;
            }

            let Some(queued) = self.queued.remove(&target) else {
                continue;
            };
            let alternate_suit = self.config.pairing.map(queued.predicted_suit);
            self.active.insert(
                target,
                ActivePrediction {
                    target_game: target,
                    predicted_suit: queued.predicted_suit,
                    alternate_suit,
                    backup_game: target.saturating_add(self.config.offset),
                    base_game: queued.base_game,
                    status: PredictionStatus::Pending,
                    check_count: 0,
                    created_at_ms: now_ms,
                    handle: AnnouncementHandle::NONE,
                },
            );
            info!(
                current_game = current,
                target_game = target,
                distance,
                suit = %queued.predicted_suit,
                "prediction promoted"
            );
            report.promoted.push(Promotion {
                target_game: target,
                predicted_suit: queued.predicted_suit,
                base_game: queued.base_game,
                distance,
            });
        }
        report
    }
}
