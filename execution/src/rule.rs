//! Missing-suit rule engine.
//!
//! The rule looks at the suits present in the first result group. When exactly one of
//! the four suits is absent, the predicted suit is the configured pairing applied to the
//! missing suit, and the target game is `window_start + offset`, where `window_start` is the
//! earliest game whose first group fed the evaluation.
//!
//! ## Policies
//! - [`RulePolicy::Single`]: one game is the whole window (`target = N + offset`).
//! - [`RulePolicy::Paired`]: the union of games `N-1` and `N` is evaluated, but only when
//!   `N-1` was the game processed immediately before (`target = (N-1) + offset`). The stored
//!   candidate is consumed by every evaluation and replaced by game `N`.

use std::{fmt, str::FromStr};
use suitwatch_types::{GameNumber, Suit, SuitPairing, SuitSet};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RulePolicy {
    Single,
    #[default]
    Paired,
}

impl RulePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            RulePolicy::Single => "single",
            RulePolicy::Paired => "paired",
        }
    }
}

impl FromStr for RulePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "single" => Ok(RulePolicy::Single),
            "paired" | "pair" => Ok(RulePolicy::Paired),
            other => Err(format!("unknown rule policy: {other}")),
        }
    }
}

impl fmt::Display for RulePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A prediction derived from observed results, not yet enqueued.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Derived {
    pub missing: Suit,
    pub predicted_suit: Suit,
    pub window_start: GameNumber,
    pub target_game: GameNumber,
    pub base_game: GameNumber,
}

#[derive(Clone, Copy, Debug)]
struct PairCandidate {
    game: GameNumber,
    suits: SuitSet,
}

#[derive(Clone, Debug)]
pub struct RuleEngine {
    policy: RulePolicy,
    pairing: SuitPairing,
    offset: u64,
    candidate: Option<PairCandidate>,
}

impl RuleEngine {
    pub fn new(policy: RulePolicy, pairing: SuitPairing, offset: u64) -> Self {
        Self {
            policy,
            pairing,
            offset,
            candidate: None,
        }
    }

    pub fn policy(&self) -> RulePolicy {
        self.policy
    }

    pub fn pairing(&self) -> SuitPairing {
        self.pairing
    }

    /// Evaluate finalized game `game` whose first group contains `suits`.
    pub fn evaluate(&mut self, game: GameNumber, suits: SuitSet) -> Option<Derived> {
        match self.policy {
            RulePolicy::Single => self.derive(game, game, suits),
            RulePolicy::Paired => {
                let prior = self.candidate.take();
                let derived = prior
                    .filter(|prior| prior.game.checked_add(1) == Some(game))
                    .and_then(|prior| self.derive(prior.game, game, prior.suits.union(&suits)));
                self.candidate = Some(PairCandidate { game, suits });
                derived
            }
        }
    }

    /// Forget the pairing candidate.
    pub fn reset(&mut self) {
        self.candidate = None;
    }

    /// Game currently held as the first half of the next pair.
    pub fn pending_pair_start(&self) -> Option<GameNumber> {
        self.candidate.map(|candidate| candidate.game)
    }

    fn derive(&self, window_start: GameNumber, base: GameNumber, suits: SuitSet) -> Option<Derived> {
        let missing = suits.single_missing()?;
        Some(Derived {
            missing,
            predicted_suit: self.pairing.map(missing),
            window_start,
            target_game: window_start.saturating_add(self.offset),
            base_game: base,
        })
    }
}
