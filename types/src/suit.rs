use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// One of the four canonical card suits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Suit {
    Spades,
    Hearts,
    Diamonds,
    Clubs,
}

impl Suit {
    /// All suits, in the order used when scanning for a missing suit.
    pub const ALL: [Suit; 4] = [Suit::Spades, Suit::Hearts, Suit::Diamonds, Suit::Clubs];

    /// Canonical single-codepoint symbol.
    pub fn symbol(&self) -> char {
        match self {
            Suit::Spades => '♠',
            Suit::Hearts => '♥',
            Suit::Diamonds => '♦',
            Suit::Clubs => '♣',
        }
    }

    /// Emoji presentation used in announcements.
    pub fn display(&self) -> &'static str {
        match self {
            Suit::Spades => "♠️",
            Suit::Hearts => "❤️",
            Suit::Diamonds => "♦️",
            Suit::Clubs => "♣️",
        }
    }

    /// Parse a canonical symbol.
    pub fn from_symbol(symbol: char) -> Option<Suit> {
        match symbol {
            '♠' => Some(Suit::Spades),
            '♥' => Some(Suit::Hearts),
            '♦' => Some(Suit::Diamonds),
            '♣' => Some(Suit::Clubs),
            _ => None,
        }
    }

    fn bit(&self) -> u8 {
        match self {
            Suit::Spades => 1 << 0,
            Suit::Hearts => 1 << 1,
            Suit::Diamonds => 1 << 2,
            Suit::Clubs => 1 << 3,
        }
    }
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Set of canonical suits, stored as a 4-bit mask.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct SuitSet(u8);

impl SuitSet {
    pub const fn empty() -> Self {
        Self(0)
    }

    pub fn insert(&mut self, suit: Suit) {
        self.0 |= suit.bit();
    }

    pub fn contains(&self, suit: Suit) -> bool {
        self.0 & suit.bit() != 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn union(&self, other: &SuitSet) -> SuitSet {
        SuitSet(self.0 | other.0)
    }

    /// Returns the absent suit when exactly three suits are present.
    pub fn single_missing(&self) -> Option<Suit> {
        if self.len() != 3 {
            return None;
        }
        Suit::ALL.into_iter().find(|suit| !self.contains(*suit))
    }

    pub fn iter(&self) -> impl Iterator<Item = Suit> + '_ {
        Suit::ALL.into_iter().filter(|suit| self.contains(*suit))
    }
}

impl FromIterator<Suit> for SuitSet {
    fn from_iter<I: IntoIterator<Item = Suit>>(iter: I) -> Self {
        let mut set = SuitSet::empty();
        for suit in iter {
            set.insert(suit);
        }
        set
    }
}

/// Involution applied to the missing suit to obtain the predicted suit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SuitPairing {
    /// Same-colour swap: ♠↔♣, ♥↔♦.
    #[default]
    Color,
    /// Cross-colour swap: ♠↔♥, ♣↔♦.
    Alternate,
}

impl SuitPairing {
    pub fn map(&self, suit: Suit) -> Suit {
        match (self, suit) {
            (SuitPairing::Color, Suit::Spades) => Suit::Clubs,
            (SuitPairing::Color, Suit::Clubs) => Suit::Spades,
            (SuitPairing::Color, Suit::Hearts) => Suit::Diamonds,
            (SuitPairing::Color, Suit::Diamonds) => Suit::Hearts,
            (SuitPairing::Alternate, Suit::Spades) => Suit::Hearts,
            (SuitPairing::Alternate, Suit::Hearts) => Suit::Spades,
            (SuitPairing::Alternate, Suit::Clubs) => Suit::Diamonds,
            (SuitPairing::Alternate, Suit::Diamonds) => Suit::Clubs,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SuitPairing::Color => "color",
            SuitPairing::Alternate => "alternate",
        }
    }
}

impl FromStr for SuitPairing {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "color" | "colour" => Ok(SuitPairing::Color),
            "alternate" => Ok(SuitPairing::Alternate),
            other => Err(format!("unknown suit pairing: {other}")),
        }
    }
}

impl fmt::Display for SuitPairing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
