//! Suitwatch domain types.
//!
//! Defines the four canonical suits, the involutive suit pairings used to derive a
//! prediction from a missing suit, and the queued/active prediction records shared by
//! the execution core and the node.

mod constants;
mod prediction;
mod suit;

pub use constants::*;
pub use prediction::*;
pub use suit::*;

#[cfg(test)]
mod tests;
