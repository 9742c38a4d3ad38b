//! Property tests for the prediction store and engine.
//!
//! 1. **Uniqueness**: a target game is never queued and active at the same time.
//! 2. **Capacity**: the active set never exceeds its cap.
//! 3. **Expiry**: `promote_due` drops every queued target at or behind the current game,
//!    whether or not the active set is full.
//! 4. **Termination**: an active prediction resolves at most once, and always within the
//!    target game and the game after it.
//! 5. **Backup chaining**: a miss queues exactly one backup at `target + offset` with the
//!    alternate suit and the same base game.

use crate::{
    mocks::finalized_message, BackupOutcome, Engine, EngineConfig, Ingest, RulePolicy, Store,
    StoreConfig,
};
use proptest::prelude::*;
use std::collections::HashSet;
use suitwatch_types::{PredictionStatus, Suit, SuitPairing};

// ─────────────────────────────────────────────────────────────────────────────
// Generators
// ─────────────────────────────────────────────────────────────────────────────

fn arb_suit() -> impl Strategy<Value = Suit> {
    prop::sample::select(Suit::ALL.to_vec())
}

fn arb_pairing() -> impl Strategy<Value = SuitPairing> {
    prop_oneof![Just(SuitPairing::Color), Just(SuitPairing::Alternate)]
}

/// A first result group made of 0 to 4 cards with arbitrary suits.
fn arb_group() -> impl Strategy<Value = String> {
    prop::collection::vec(arb_suit(), 0..5)
        .prop_map(|suits| suits.iter().map(|suit| format!("7{}", suit.symbol())).collect())
}

#[derive(Clone, Debug)]
enum Op {
    Enqueue { target: u64, suit: Suit },
    Promote { current: u64 },
    Resolve { game: u64, group: String },
    Clear,
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0u64..60, arb_suit()).prop_map(|(target, suit)| Op::Enqueue { target, suit }),
        3 => (0u64..60).prop_map(|current| Op::Promote { current }),
        3 => (0u64..60, arb_group()).prop_map(|(game, group)| Op::Resolve { game, group }),
        1 => Just(Op::Clear),
    ]
}

fn arb_store_config() -> impl Strategy<Value = StoreConfig> {
    (1usize..4, 1u64..5, 1u64..8, arb_pairing()).prop_map(
        |(max_active, proximity_threshold, offset, pairing)| StoreConfig {
            max_active,
            proximity_threshold,
            offset,
            pairing,
        },
    )
}

fn apply(store: &mut Store, op: &Op) {
    match op {
        Op::Enqueue { target, suit } => {
            store.enqueue(*target, *suit, target.saturating_sub(6), 0);
        }
        Op::Promote { current } => {
            store.promote_due(*current, 0);
        }
        Op::Resolve { game, group } => {
            store.resolve(*game, group, 0);
        }
        Op::Clear => store.clear(),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn prop_invariants_hold_for_any_op_sequence(
        config in arb_store_config(),
        ops in prop::collection::vec(arb_op(), 0..80),
    ) {
        let mut store = Store::new(config);
        for op in &ops {
            apply(&mut store, op);
            prop_assert!(store.check_invariants().is_ok(), "after {:?}", op);
            prop_assert!(store.active_len() <= config.max_active);
        }
    }

    #[test]
    fn prop_expiry_ignores_capacity(
        config in arb_store_config(),
        ops in prop::collection::vec(arb_op(), 0..60),
        current in 0u64..60,
    ) {
        let mut store = Store::new(config);
        for op in &ops {
            apply(&mut store, op);
        }
        let report = store.promote_due(current, 0);
        prop_assert!(store.queued_snapshot().iter().all(|p| p.target_game > current));
        prop_assert!(report.expired.iter().all(|p| p.target_game <= current));
        for promotion in &report.promoted {
            prop_assert!(promotion.distance >= 1);
            prop_assert!(promotion.distance <= config.proximity_threshold);
        }
    }

    #[test]
    fn prop_pairing_is_involution(pairing in arb_pairing(), suit in arb_suit()) {
        prop_assert_eq!(pairing.map(pairing.map(suit)), suit);
        prop_assert_ne!(pairing.map(suit), suit);
    }

    #[test]
    fn prop_two_chance_termination(
        targets in prop::collection::btree_set(10u64..40, 1..4),
        suit in arb_suit(),
        groups in prop::collection::vec(arb_group(), 60),
    ) {
        let config = StoreConfig { max_active: 4, proximity_threshold: 40, ..StoreConfig::default() };
        let mut store = Store::new(config);
        for target in &targets {
            store.enqueue(*target, suit, target - 6, 0);
        }
        store.promote_due(1, 0);
        prop_assert_eq!(store.active_len(), targets.len());

        let mut seen = HashSet::new();
        for (game, group) in (1u64..).zip(groups.iter()) {
            for resolved in store.resolve(game, group, 0) {
                let target = resolved.prediction.target_game;
                prop_assert!(seen.insert(target), "target {} resolved twice", target);
                prop_assert!(resolved.prediction.status.is_terminal());
                prop_assert!(game == target || game == target + 1);
                prop_assert!(store.active(target).is_none());
            }
        }
        // Every target was observed along with its following game.
        prop_assert_eq!(seen.len(), targets.len());
        prop_assert_eq!(store.active_len(), 0);
    }

    #[test]
    fn prop_miss_chains_exactly_one_backup(
        pairing in arb_pairing(),
        suit in arb_suit(),
        target in 10u64..50,
    ) {
        let config = StoreConfig { pairing, ..StoreConfig::default() };
        let mut store = Store::new(config);
        store.enqueue(target, suit, target - 6, 0);
        store.promote_due(target - 1, 0);

        // Neither game contains the predicted suit.
        let other = Suit::ALL.iter().copied().find(|s| *s != suit).unwrap_or(suit);
        let absent = format!("7{}", other.symbol());
        prop_assert!(store.resolve(target, &absent, 0).is_empty());
        let resolved = store.resolve(target + 1, &absent, 0);
        prop_assert_eq!(resolved.len(), 1);
        prop_assert_eq!(resolved[0].prediction.status, PredictionStatus::Miss);

        let backup_target = target + config.offset;
        prop_assert_eq!(
            resolved[0].backup,
            Some(BackupOutcome::Queued { target_game: backup_target, suit: pairing.map(suit) })
        );
        prop_assert_eq!(store.queued_len(), 1);
        let backup = store.queued(backup_target).cloned();
        prop_assert_eq!(backup.as_ref().map(|p| p.predicted_suit), Some(pairing.map(suit)));
        prop_assert_eq!(backup.map(|p| p.base_game), Some(target - 6));
    }

    #[test]
    fn prop_engine_preserves_invariants(
        policy in prop_oneof![Just(RulePolicy::Single), Just(RulePolicy::Paired)],
        games in prop::collection::vec((0u64..8, arb_group()), 1..80),
    ) {
        let mut engine = Engine::new(EngineConfig { policy, ..EngineConfig::default() });
        let mut game = 100u64;
        for (step, group) in &games {
            game += step;
            let outcome = engine.ingest(&finalized_message(game, &[group, "2♣"]), game);
            if let Ingest::Processed { game: processed, .. } = outcome {
                prop_assert_eq!(processed, game);
            }
            prop_assert_eq!(engine.current_game(), game);
            prop_assert!(engine.check_invariants().is_ok());
        }
    }
}
