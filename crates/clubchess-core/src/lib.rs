//! Core chess-notation subsystem for the club backend: embedded-notation
//! scanning, game replay timelines, and daily-puzzle solving sessions.
//!
//! Everything in this crate is synchronous and I/O-free. Board legality, SAN
//! generation and PGN move-list parsing live behind the [`rules::RulesEngine`]
//! seam; the production implementation is [`rules::ShakmatyRules`].

pub mod puzzle;
pub mod replay;
pub mod rules;
pub mod scanner;

pub use puzzle::{PuzzleDefinition, PuzzleSession, PuzzleStatus};
pub use replay::{GameTimeline, Ply, ReplayCursor};
pub use rules::{AppliedMove, RulesEngine, ShakmatyRules};
pub use scanner::{scan, NotationSegment};
