//! Operator commands, answered in direct chats only.

use crate::engine::Config;
use std::fmt::Write as _;
use suitwatch_execution::{RulePolicy, StatusSnapshot};
use suitwatch_types::{GameNumber, Suit};

/// Reply sent to non-operators for restricted commands.
pub const RESERVED_REPLY: &str = "Commande réservée à l'administrateur";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    Status,
    VerificationResults,
}

impl Command {
    /// Parse the leading `/command` (optionally addressed as `/command@bot`).
    pub fn parse(text: &str) -> Option<Self> {
        let word = text.split_whitespace().next()?;
        let name = word.strip_prefix('/')?;
        let name = name.split_once('@').map_or(name, |(name, _)| name);
        match name.to_ascii_lowercase().as_str() {
            "start" => Some(Command::Start),
            "help" => Some(Command::Help),
            "status" => Some(Command::Status),
            "vr" | "verification_results" => Some(Command::VerificationResults),
            _ => None,
        }
    }

    pub fn requires_operator(&self) -> bool {
        matches!(self, Command::Status | Command::VerificationResults)
    }
}

/// With no operator configured every sender is allowed.
pub fn is_operator(operator: Option<i64>, sender: Option<i64>) -> bool {
    match operator {
        None => true,
        Some(operator) => sender == Some(operator),
    }
}

/// Text answering `command` from `sender`.
pub fn reply(
    command: Command,
    sender: Option<i64>,
    config: &Config,
    snapshot: &StatusSnapshot,
) -> String {
    if command.requires_operator() && !is_operator(config.operator, sender) {
        return RESERVED_REPLY.to_string();
    }
    match command {
        Command::Start => start_text(),
        Command::Help => help_text(config),
        Command::Status => status_text(snapshot),
        Command::VerificationResults => verification_text(snapshot),
    }
}

fn start_text() -> String {
    "🤖 Bot de Prédiction\n\nCommandes: /status, /help, /vr (Vérification)".to_string()
}

fn help_text(config: &Config) -> String {
    let pairing = config.core.store.pairing;
    let offset = config.core.store.offset;
    let mapping = Suit::ALL
        .iter()
        .map(|suit| format!("{}→{}", suit.display(), pairing.map(*suit).display()))
        .collect::<Vec<_>>()
        .join(" ");
    let rule = match config.core.policy {
        RulePolicy::Single => format!(
            "• Condition: le premier groupe du jeu N contient exactement 3 couleurs.\n\
             • Prédit: jeu N + {offset}."
        ),
        RulePolicy::Paired => format!(
            "• Condition: l'union des couleurs du premier groupe des jeux N et N+1 \
             contient exactement 3 couleurs.\n\
             • Prédit: jeu N + {offset}."
        ),
    };
    format!(
        "📖 Aide - Bot de Prédiction\n\n\
         Règle de prédiction ({policy}):\n{rule}\n\
         • Mapping ({pairing}): {mapping}\n\n\
         Maintenance:\n\
         • Reset quotidien: {daily}\n\
         • Reset horaire ({scope}): toutes les {minutes} minutes",
        policy = config.core.policy,
        daily = config.daily,
        scope = config.hourly_scope,
        minutes = config.hourly_interval.as_secs() / 60,
    )
}

fn distance(target: GameNumber, current: GameNumber) -> i128 {
    i128::from(target) - i128::from(current)
}

fn status_text(snapshot: &StatusSnapshot) -> String {
    let current = snapshot.current_game;
    let mut out = format!("📊 État des prédictions:\n\n🎮 Jeu actuel: #{current}\n\n");
    if snapshot.active.is_empty() {
        out.push_str("🔮 Aucune prédiction active\n");
    } else {
        let _ = writeln!(out, "🔮 Actives ({}):", snapshot.active.len());
        for prediction in &snapshot.active {
            let _ = writeln!(
                out,
                "• Jeu #{}: {} - Statut: {} (dans {} jeux)",
                prediction.target_game,
                prediction.predicted_suit.display(),
                prediction.status.glyph(),
                distance(prediction.target_game, current),
            );
        }
    }
    if !snapshot.queued.is_empty() {
        let _ = writeln!(out, "\n📋 En file d'attente ({}):", snapshot.queued.len());
        for prediction in &snapshot.queued {
            let _ = writeln!(
                out,
                "• Jeu #{}: {} (dans {} jeux)",
                prediction.target_game,
                prediction.predicted_suit.display(),
                distance(prediction.target_game, current),
            );
        }
    }
    out
}

fn verification_text(snapshot: &StatusSnapshot) -> String {
    let current = snapshot.current_game;
    let mut out = format!("📊 Prédictions envoyées (actives):\n🎮 Jeu actuel: #{current}\n\n");
    if snapshot.active.is_empty() {
        out.push_str("🔮 Aucune prédiction en attente de vérification.\n");
        return out;
    }
    let _ = writeln!(out, "🔮 Actives ({}):", snapshot.active.len());
    for prediction in &snapshot.active {
        let _ = writeln!(
            out,
            "• Jeu #{}: {} - Base: {} - Statut: {} (dans {} jeux)",
            prediction.target_game,
            prediction.predicted_suit.display(),
            prediction.base_game,
            prediction.status.glyph(),
            distance(prediction.target_game, current),
        );
    }
    out
}
