//! Helpers for building feed messages and engines in tests.

use crate::{Engine, EngineConfig, RulePolicy, StoreConfig};
use suitwatch_types::{GameNumber, SuitPairing};

/// A finalized feed message for `game` with the given result groups.
///
/// Group contents are written verbatim inside parentheses, separated by ` - `.
pub fn finalized_message(game: GameNumber, groups: &[&str]) -> String {
    let body = groups
        .iter()
        .enumerate()
        .map(|(i, group)| format!("{}({group})", i + 5))
        .collect::<Vec<_>>()
        .join(" - ");
    format!("✅ #N{game}. {body}")
}

/// Same layout as [`finalized_message`], but still being dealt.
pub fn in_progress_message(game: GameNumber, groups: &[&str]) -> String {
    finalized_message(game, groups).replacen('✅', "⏰", 1)
}

/// An engine with default limits and the given rule policy and pairing.
pub fn engine(policy: RulePolicy, pairing: SuitPairing) -> Engine {
    Engine::new(EngineConfig {
        store: StoreConfig {
            pairing,
            ..StoreConfig::default()
        },
        policy,
        forward_to_operator: false,
    })
}
