//! Two-chance resolution of active predictions.
//!
//! Each finalized game `G` gives two independent checks:
//! 1. A prediction targeting `G` hits immediately if its suit is present; otherwise its first
//!    chance is marked as used.
//! 2. A prediction targeting `G-1` whose first chance is used hits late if its suit is
//!    present; otherwise it misses and a backup is queued at `backup_game` with the
//!    alternate suit.
//!
//! Terminal predictions are removed from the active set, so none is resolved twice.

use suitwatch_types::{ActivePrediction, GameNumber, PredictionStatus, Suit};
use tracing::info;

use crate::{feed::suits_in, store::Store};

/// Backup scheduling attempted after a miss.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackupOutcome {
    Queued { target_game: GameNumber, suit: Suit },
    /// Target was already queued or active; the existing entry wins.
    AlreadyScheduled { target_game: GameNumber },
}

/// A prediction that reached a terminal status and left the active set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resolved {
    pub prediction: ActivePrediction,
    pub backup: Option<BackupOutcome>,
}

impl Resolved {
    pub fn status(&self) -> PredictionStatus {
        self.prediction.status
    }
}

impl Store {
    /// Apply finalized game `game` with first result group `first_group` to the active set.
    pub fn resolve(&mut self, game: GameNumber, first_group: &str, now_ms: u64) -> Vec<Resolved> {
        let suits = suits_in(first_group);
        let mut resolved = Vec::new();

        // First chance: the target game itself.
        let immediate_hit = self
            .active
            .get(&game)
            .map(|prediction| suits.contains(prediction.predicted_suit));
        match immediate_hit {
            Some(true) => {
                if let Some(mut prediction) = self.active.remove(&game) {
                    prediction.status = PredictionStatus::HitImmediate;
                    info!(target_game = game, suit = %prediction.predicted_suit, "prediction hit on target game");
                    resolved.push(Resolved {
                        prediction,
                        backup: None,
                    });
                }
            }
            Some(false) => {
                if let Some(prediction) = self.active.get_mut(&game) {
                    prediction.check_count = 1;
                    info!(target_game = game, suit = %prediction.predicted_suit, "suit absent on target game, waiting for next game");
                }
            }
            None => {}
        }

        // Second chance: the game after the target.
        let Some(previous) = game.checked_sub(1) else {
            return resolved;
        };
        let second_chance_due = self
            .active
            .get(&previous)
            .is_some_and(ActivePrediction::first_chance_used);
        if !second_chance_due {
            return resolved;
        }
        let Some(mut prediction) = self.active.remove(&previous) else {
            return resolved;
        };
        if suits.contains(prediction.predicted_suit) {
            prediction.status = PredictionStatus::HitDelayed;
            info!(target_game = previous, suit = %prediction.predicted_suit, "prediction hit on second chance");
            resolved.push(Resolved {
                prediction,
                backup: None,
            });
            return resolved;
        }

        prediction.status = PredictionStatus::Miss;
        let backup_target = prediction.backup_game;
        let backup_suit = prediction.alternate_suit;
        let backup = if self.enqueue(backup_target, backup_suit, prediction.base_game, now_ms) {
            info!(
                target_game = previous,
                backup_game = backup_target,
                suit = %backup_suit,
                "prediction missed, backup queued"
            );
            BackupOutcome::Queued {
                target_game: backup_target,
                suit: backup_suit,
            }
        } else {
            info!(
                target_game = previous,
                backup_game = backup_target,
                "prediction missed, backup target already scheduled"
            );
            BackupOutcome::AlreadyScheduled {
                target_game: backup_target,
            }
        };
        resolved.push(Resolved {
            prediction,
            backup: Some(backup),
        });
        resolved
    }
}
