//! Engine: the single owned context that turns finalized feed messages into effects.
//!
//! All mutable prediction state lives here. The node owns exactly one `Engine`, feeds it
//! every inbound message, and executes the returned [`Effect`]s in order.

use serde::Serialize;
use suitwatch_types::{
    ActivePrediction, AnnouncementHandle, GameNumber, InvariantError, PredictionStatus,
    QueuedPrediction, Suit, DEDUPE_CAPACITY, DEDUPE_PREFIX_CHARS, RECENT_GAMES_CAPACITY,
};
use tracing::{debug, info};

use crate::{
    cache::{BoundedSet, RecentGames},
    feed,
    promotion::PromotionReport,
    reset::ResetScope,
    rule::{RuleEngine, RulePolicy},
    store::{Store, StoreConfig},
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EngineConfig {
    pub store: StoreConfig,
    pub policy: RulePolicy,
    /// Emit [`Effect::Forward`] once per finalized game.
    pub forward_to_operator: bool,
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), &'static str> {
        self.store.validate()
    }
}

/// Outbound action requested by the engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    /// Publish a newly active prediction. The resulting handle goes back through
    /// [`Engine::attach_handle`].
    Announce { target_game: GameNumber, suit: Suit },
    /// Rewrite an announcement with its terminal status.
    Update {
        target_game: GameNumber,
        suit: Suit,
        handle: AnnouncementHandle,
        status: PredictionStatus,
    },
    /// Relay the raw finalized message to the operator.
    Forward { text: String },
}

/// Render the public announcement line for a prediction.
pub fn announcement_text(target: GameNumber, suit: Suit, status: PredictionStatus) -> String {
    format!("😼 {target}😺: √{} statut :{}", suit.display(), status.glyph())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    NotFinalized,
    NoGameNumber,
    Duplicate,
    NoGroups,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::NotFinalized => "not_finalized",
            SkipReason::NoGameNumber => "no_game_number",
            SkipReason::Duplicate => "duplicate",
            SkipReason::NoGroups => "no_groups",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Ingest {
    Processed {
        game: GameNumber,
        effects: Vec<Effect>,
    },
    Skipped(SkipReason),
}

impl Ingest {
    pub fn effects(&self) -> &[Effect] {
        match self {
            Ingest::Processed { effects, .. } => effects,
            Ingest::Skipped(_) => &[],
        }
    }
}

/// Read-only view for operator commands and the status endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StatusSnapshot {
    pub current_game: GameNumber,
    pub active: Vec<ActivePrediction>,
    pub queued: Vec<QueuedPrediction>,
}

pub struct Engine {
    config: EngineConfig,
    store: Store,
    rules: RuleEngine,
    dedupe: BoundedSet<(GameNumber, String)>,
    recent: RecentGames,
    current_game: GameNumber,
    last_transferred_game: Option<GameNumber>,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            store: Store::new(config.store),
            rules: RuleEngine::new(config.policy, config.store.pairing, config.store.offset),
            dedupe: BoundedSet::new(DEDUPE_CAPACITY),
            recent: RecentGames::new(RECENT_GAMES_CAPACITY),
            current_game: 0,
            last_transferred_game: None,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn rules(&self) -> &RuleEngine {
        &self.rules
    }

    pub fn recent(&self) -> &RecentGames {
        &self.recent
    }

    pub fn current_game(&self) -> GameNumber {
        self.current_game
    }

    /// Process one inbound feed message.
    pub fn ingest(&mut self, text: &str, now_ms: u64) -> Ingest {
        if !feed::is_finalized(text) {
            return Ingest::Skipped(SkipReason::NotFinalized);
        }
        let Some(game) = feed::extract_game_number(text) else {
            debug!("finalized message without game number");
            return Ingest::Skipped(SkipReason::NoGameNumber);
        };
        self.current_game = game;

        if !self
            .dedupe
            .insert((game, feed::text_prefix(text, DEDUPE_PREFIX_CHARS)))
        {
            debug!(game, "duplicate message suppressed");
            return Ingest::Skipped(SkipReason::Duplicate);
        }

        let groups = feed::extract_groups(text);
        let Some(first_group) = groups.first().copied() else {
            debug!(game, "finalized message without result groups");
            return Ingest::Skipped(SkipReason::NoGroups);
        };

        let mut effects = Vec::new();
        if self.config.forward_to_operator && self.last_transferred_game != Some(game) {
            self.last_transferred_game = Some(game);
            effects.push(Effect::Forward {
                text: text.to_string(),
            });
        }

        for resolved in self.store.resolve(game, first_group, now_ms) {
            let prediction = resolved.prediction;
            effects.push(Effect::Update {
                target_game: prediction.target_game,
                suit: prediction.predicted_suit,
                handle: prediction.handle,
                status: prediction.status,
            });
        }

        let report = self.store.promote_due(game, now_ms);
        push_announcements(&mut effects, report);

        let suits = feed::suits_in(first_group);
        if let Some(derived) = self.rules.evaluate(game, suits) {
            info!(
                game,
                missing = %derived.missing,
                suit = %derived.predicted_suit,
                target_game = derived.target_game,
                "rule fired"
            );
            if self.store.enqueue(
                derived.target_game,
                derived.predicted_suit,
                derived.base_game,
                now_ms,
            ) {
                let report = self.store.promote_due(game, now_ms);
                push_announcements(&mut effects, report);
            }
        }

        self.recent.record(game, first_group, now_ms);
        Ingest::Processed { game, effects }
    }

    /// Record the handle of a delivered announcement.
    ///
    /// Returns false if the prediction left the active set while the announcement was in
    /// flight.
    pub fn attach_handle(&mut self, target: GameNumber, handle: AnnouncementHandle) -> bool {
        self.store.attach_handle(target, handle)
    }

    /// Clear transient state. Safe to call repeatedly.
    pub fn reset(&mut self, scope: ResetScope) {
        self.store.clear();
        self.dedupe.clear();
        self.last_transferred_game = None;
        self.rules.reset();
        if scope == ResetScope::Full {
            self.recent.clear();
            self.current_game = 0;
        }
        info!(scope = %scope, "state reset");
    }

    pub fn status(&self) -> StatusSnapshot {
        StatusSnapshot {
            current_game: self.current_game,
            active: self.store.active_snapshot(),
            queued: self.store.queued_snapshot(),
        }
    }

    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        self.store.check_invariants()
    }
}

fn push_announcements(effects: &mut Vec<Effect>, report: PromotionReport) {
    effects.extend(report.promoted.into_iter().map(|promotion| Effect::Announce {
        target_game: promotion.target_game,
        suit: promotion.predicted_suit,
    }));
}
