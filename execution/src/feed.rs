//! Feed message parsing and suit normalization.
//!
//! A finalized feed message looks like:
//!
//! ```text
//! ✅ #N1234. 8(J♠️10❤️8♦️) - 6(3♣️3♠️)
//! ```
//!
//! The game number follows the `#N` tag and each parenthesized group is one side's cards.
//! Only the first group participates in prediction and resolution.

use regex::Regex;
use std::sync::LazyLock;
use suitwatch_types::{GameNumber, Suit, SuitSet};

/// Marks a game that is still being dealt.
pub const IN_PROGRESS_MARKER: char = '⏰';

/// Marks a completed game.
pub const SUCCESS_MARKER: char = '✅';

/// Alternate completed-game marker used by some feed formats.
pub const FINALIZED_MARKER: char = '🔰';

const VARIATION_SELECTOR: char = '\u{FE0F}';

static RE_GAME_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)#N\s*(\d+)\.?").expect("game number pattern is valid")
});
static RE_GROUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(([^)]*)\)").expect("group pattern is valid"));

/// Fold every accepted suit glyph onto its canonical symbol.
///
/// `❤` becomes `♥`, and the emoji variation selector trailing a suit is dropped. Text that
/// is already canonical is returned unchanged.
pub fn normalize_suits(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        let canonical = match c {
            '❤' => Some('♥'),
            '♠' | '♥' | '♦' | '♣' => Some(c),
            _ => None,
        };
        match canonical {
            Some(symbol) => {
                out.push(symbol);
                if chars.peek() == Some(&VARIATION_SELECTOR) {
                    chars.next();
                }
            }
            None => out.push(c),
        }
    }
    out
}

/// Distinct canonical suits appearing anywhere in `group`.
pub fn suits_in(group: &str) -> SuitSet {
    normalize_suits(group)
        .chars()
        .filter_map(Suit::from_symbol)
        .collect()
}

/// Returns true if `suit` appears in `group`, regardless of glyph variant.
pub fn has_suit(group: &str, suit: Suit) -> bool {
    suits_in(group).contains(suit)
}

/// A message is finalized when it carries a completion marker and no in-progress marker.
pub fn is_finalized(text: &str) -> bool {
    if text.contains(IN_PROGRESS_MARKER) {
        return false;
    }
    text.contains(SUCCESS_MARKER) || text.contains(FINALIZED_MARKER)
}

/// First `#N<digits>` tag in the message.
pub fn extract_game_number(text: &str) -> Option<GameNumber> {
    RE_GAME_NUMBER
        .captures(text)
        .and_then(|captures| captures.get(1))
        .and_then(|digits| digits.as_str().parse().ok())
}

/// Contents of every parenthesized group, left to right.
pub fn extract_groups(text: &str) -> Vec<&str> {
    RE_GROUP
        .captures_iter(text)
        .filter_map(|captures| captures.get(1))
        .map(|group| group.as_str())
        .collect()
}

/// Leading characters of the message used in the dedupe key.
pub fn text_prefix(text: &str, chars: usize) -> String {
    text.chars().take(chars).collect()
}
