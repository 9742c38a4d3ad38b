//! Fixed-capacity caches with oldest-first eviction.

use std::collections::{BTreeMap, HashSet, VecDeque};
use std::hash::Hash;
use suitwatch_types::GameNumber;

/// Set that remembers at most `capacity` keys, evicting the oldest insertion first.
#[derive(Clone, Debug)]
pub struct BoundedSet<K> {
    capacity: usize,
    order: VecDeque<K>,
    members: HashSet<K>,
}

impl<K: Eq + Hash + Clone> BoundedSet<K> {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            order: VecDeque::with_capacity(capacity),
            members: HashSet::with_capacity(capacity),
        }
    }

    /// Inserts `key`. Returns false if it was already present.
    pub fn insert(&mut self, key: K) -> bool {
        if self.members.contains(&key) {
            return false;
        }
        if self.order.len() == self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.members.remove(&oldest);
            }
        }
        self.members.insert(key.clone());
        self.order.push_back(key);
        true
    }

    pub fn contains(&self, key: &K) -> bool {
        self.members.contains(key)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.members.clear();
    }
}

/// Diagnostic record of a processed game.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecentGame {
    pub first_group: String,
    pub recorded_at_ms: u64,
}

/// Ring of recently finalized games keyed by game number; the lowest game is evicted first.
#[derive(Clone, Debug)]
pub struct RecentGames {
    capacity: usize,
    games: BTreeMap<GameNumber, RecentGame>,
}

impl RecentGames {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            games: BTreeMap::new(),
        }
    }

    pub fn record(&mut self, game: GameNumber, first_group: &str, now_ms: u64) {
        self.games.insert(
            game,
            RecentGame {
                first_group: first_group.to_string(),
                recorded_at_ms: now_ms,
            },
        );
        while self.games.len() > self.capacity {
            self.games.pop_first();
        }
    }

    pub fn get(&self, game: GameNumber) -> Option<&RecentGame> {
        self.games.get(&game)
    }

    pub fn latest(&self) -> Option<(GameNumber, &RecentGame)> {
        self.games.last_key_value().map(|(game, record)| (*game, record))
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    pub fn clear(&mut self) {
        self.games.clear();
    }
}
