//! End-to-end ingest scenarios.

use crate::{
    mocks::{engine, finalized_message, in_progress_message},
    Effect, Engine, EngineConfig, Ingest, ResetScope, RulePolicy, SkipReason,
};
use suitwatch_types::{AnnouncementHandle, PredictionStatus, Suit, SuitPairing};

/// First group with all four suits: never fires the rule, alone or paired.
const NEUTRAL: &str = "A♠K♥Q♦J♣";

fn ingest(engine: &mut Engine, game: u64, first_group: &str) -> Vec<Effect> {
    match engine.ingest(&finalized_message(game, &[first_group, "2♣"]), game) {
        Ingest::Processed { effects, .. } => effects,
        Ingest::Skipped(reason) => panic!("game {game} skipped: {reason:?}"),
    }
}

#[test]
fn test_single_rule_queues_missing_clubs() {
    let mut engine = engine(RulePolicy::Single, SuitPairing::Color);
    assert!(ingest(&mut engine, 100, "A♠K❤️Q♦️").is_empty());

    let queued = engine.store().queued(106).expect("queued at game 106");
    assert_eq!(queued.predicted_suit, SuitPairing::Color.map(Suit::Clubs));
    assert_eq!(queued.base_game, 100);

    assert!(ingest(&mut engine, 102, NEUTRAL).is_empty());
    assert_eq!(
        ingest(&mut engine, 103, NEUTRAL),
        vec![Effect::Announce {
            target_game: 106,
            suit: Suit::Spades
        }]
    );
    assert!(engine.store().active(106).is_some());
}

#[test]
fn test_paired_rule_announce_then_delayed_hit() {
    let mut engine = engine(RulePolicy::Paired, SuitPairing::Color);
    assert!(ingest(&mut engine, 10, "A♠").is_empty());
    assert!(ingest(&mut engine, 11, "K♥J♣").is_empty());

    // Diamonds missing across games 10 and 11; window starts at 10.
    let queued = engine.store().queued(16).expect("queued");
    assert_eq!(queued.predicted_suit, Suit::Hearts);
    assert_eq!(queued.base_game, 11);

    assert!(ingest(&mut engine, 12, NEUTRAL).is_empty());
    assert_eq!(
        ingest(&mut engine, 13, NEUTRAL),
        vec![Effect::Announce {
            target_game: 16,
            suit: Suit::Hearts
        }]
    );
    assert!(engine.attach_handle(16, AnnouncementHandle(77)));

    assert!(ingest(&mut engine, 16, "A♠").is_empty());
    assert_eq!(engine.store().active(16).map(|p| p.check_count), Some(1));

    assert_eq!(
        ingest(&mut engine, 17, "2♥"),
        vec![Effect::Update {
            target_game: 16,
            suit: Suit::Hearts,
            handle: AnnouncementHandle(77),
            status: PredictionStatus::HitDelayed,
        }]
    );
    assert_eq!(engine.store().active_len(), 0);
    assert_eq!(engine.store().queued_len(), 0);
}

#[test]
fn test_miss_schedules_backup_with_alternate_suit() {
    let mut engine = engine(RulePolicy::Paired, SuitPairing::Color);
    ingest(&mut engine, 10, "A♠");
    ingest(&mut engine, 11, "K♥J♣");
    ingest(&mut engine, 13, NEUTRAL);
    ingest(&mut engine, 16, "A♠");

    let effects = ingest(&mut engine, 17, "2♦");
    assert_eq!(
        effects,
        vec![Effect::Update {
            target_game: 16,
            suit: Suit::Hearts,
            handle: AnnouncementHandle::NONE,
            status: PredictionStatus::Miss,
        }]
    );
    assert!(engine.store().active(16).is_none());
    let backup = engine.store().queued(22).expect("backup queued");
    assert_eq!(backup.predicted_suit, Suit::Diamonds);
    assert_eq!(backup.base_game, 11);
}

#[test]
fn test_effect_order_forward_update_announce() {
    let mut engine = Engine::new(EngineConfig {
        policy: RulePolicy::Single,
        forward_to_operator: true,
        ..EngineConfig::default()
    });
    ingest(&mut engine, 100, "A♠K♥Q♦");
    ingest(&mut engine, 102, "K♥Q♦J♣");
    let effects = ingest(&mut engine, 103, NEUTRAL);
    assert!(matches!(
        effects.as_slice(),
        [Effect::Forward { .. }, Effect::Announce { target_game: 106, .. }]
    ));

    let effects = ingest(&mut engine, 106, "A♠");
    assert!(matches!(
        effects.as_slice(),
        [
            Effect::Forward { .. },
            Effect::Update {
                target_game: 106,
                status: PredictionStatus::HitImmediate,
                ..
            },
            Effect::Announce {
                target_game: 108,
                suit: Suit::Clubs
            },
        ]
    ));
}

#[test]
fn test_capacity_defers_then_promotes_after_resolution() {
    let mut engine = engine(RulePolicy::Single, SuitPairing::Color);
    ingest(&mut engine, 100, "A♠K♥Q♦");
    ingest(&mut engine, 101, "A♠K♥J♣");
    ingest(&mut engine, 102, "A♠Q♦J♣");
    assert_eq!(engine.store().queued_len(), 3);

    let effects = ingest(&mut engine, 105, NEUTRAL);
    let announced: Vec<_> = effects
        .iter()
        .filter_map(|effect| match effect {
            Effect::Announce { target_game, .. } => Some(*target_game),
            _ => None,
        })
        .collect();
    assert_eq!(announced, vec![106, 107]);
    assert!(engine.store().queued(108).is_some());

    let effects = ingest(&mut engine, 106, "A♠");
    assert!(matches!(
        effects.as_slice(),
        [
            Effect::Update { target_game: 106, .. },
            Effect::Announce { target_game: 108, .. },
        ]
    ));
    assert_eq!(engine.store().active_len(), 2);
    assert!(engine.check_invariants().is_ok());
}

#[test]
fn test_skipped_game_expires_queue_entry() {
    let mut engine = engine(RulePolicy::Single, SuitPairing::Color);
    ingest(&mut engine, 100, "A♠K♥Q♦");
    assert!(ingest(&mut engine, 110, NEUTRAL).is_empty());
    assert_eq!(engine.store().queued_len(), 0);
    assert_eq!(engine.store().active_len(), 0);
}

#[test]
fn test_duplicate_delivery_is_not_resolved_twice() {
    let mut engine = engine(RulePolicy::Single, SuitPairing::Color);
    ingest(&mut engine, 100, "A♠K♥Q♦");
    ingest(&mut engine, 104, NEUTRAL);

    let text = finalized_message(106, &["A♠", "2♣"]);
    assert_eq!(engine.ingest(&text, 0).effects().len(), 1);
    assert_eq!(
        engine.ingest(&text, 0),
        Ingest::Skipped(SkipReason::Duplicate)
    );
}

#[test]
fn test_in_progress_message_is_ignored() {
    let mut engine = engine(RulePolicy::Single, SuitPairing::Color);
    assert_eq!(
        engine.ingest(&in_progress_message(100, &["A♠K♥Q♦"]), 0),
        Ingest::Skipped(SkipReason::NotFinalized)
    );
    assert_eq!(engine.current_game(), 0);
    assert_eq!(engine.store().queued_len(), 0);
}

#[test]
fn test_reset_while_announcement_in_flight() {
    let mut engine = engine(RulePolicy::Single, SuitPairing::Color);
    ingest(&mut engine, 100, "A♠K♥Q♦");
    let effects = ingest(&mut engine, 103, NEUTRAL);
    assert_eq!(effects.len(), 1);

    engine.reset(ResetScope::SafetyNet);
    assert!(!engine.attach_handle(106, AnnouncementHandle(5)));
}

#[test]
fn test_dedupe_evicts_oldest_key() {
    let mut engine = engine(RulePolicy::Paired, SuitPairing::Color);
    for game in 1..=201 {
        ingest(&mut engine, game, NEUTRAL);
    }
    // Game 1 fell out of the 200-entry window, game 2 did not.
    let replay = finalized_message(2, &[NEUTRAL, "2♣"]);
    assert_eq!(
        engine.ingest(&replay, 0),
        Ingest::Skipped(SkipReason::Duplicate)
    );
    let replay = finalized_message(1, &[NEUTRAL, "2♣"]);
    assert!(matches!(engine.ingest(&replay, 0), Ingest::Processed { .. }));
}

#[test]
fn test_alternate_pairing_backup_chain() {
    let mut engine = engine(RulePolicy::Single, SuitPairing::Alternate);
    // Clubs missing: alternate pairing predicts diamonds, backup uses clubs.
    ingest(&mut engine, 100, "A♠K♥Q♦");
    assert_eq!(
        engine.store().queued(106).map(|p| p.predicted_suit),
        Some(Suit::Diamonds)
    );
    ingest(&mut engine, 103, NEUTRAL);
    ingest(&mut engine, 106, "A♠");
    ingest(&mut engine, 107, "K♥");
    assert_eq!(
        engine.store().queued(112).map(|p| p.predicted_suit),
        Some(Suit::Clubs)
    );
}
