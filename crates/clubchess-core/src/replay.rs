//! Replay of stored game records: turn a raw PGN blob into an addressable
//! position history plus a navigation cursor for the game viewer.

use regex::Regex;
use serde::Serialize;

use crate::rules::{ParseError, RulesEngine};

#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    #[error("could not parse PGN: {0}")]
    Parse(#[from] ParseError),

    #[error("no moves found in PGN")]
    NoMoves,

    #[error("move {index} ({san}) is not playable from the preceding position")]
    BadMove { index: usize, san: String },
}

/// One half-move and the position it produced.
///
/// Ply 0 is the initial, move-less position (`san == None`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ply {
    pub index: usize,
    pub san: Option<String>,
    pub position: String,
}

/// Immutable position history of a single game: plies `0..=N` for N moves.
#[derive(Debug, Clone)]
pub struct GameTimeline {
    plies: Vec<Ply>,
}

impl GameTimeline {
    /// Build the timeline for the first game in `raw_pgn`.
    ///
    /// Stored blobs sometimes concatenate several games (an artifact of the
    /// upstream storage); everything from the second `[Event ...]` marker on
    /// is cut before parsing, so only the first game is ever replayed.
    ///
    /// Each move is re-applied from a fresh initial position rather than
    /// trusting any engine-internal state, so the history is reproducible
    /// from the move list alone.
    pub fn build(rules: &dyn RulesEngine, raw_pgn: &str) -> Result<GameTimeline, ReplayError> {
        let text = first_game(raw_pgn);

        let moves = rules.parse_move_list(text)?;
        if moves.is_empty() {
            return Err(ReplayError::NoMoves);
        }

        let mut plies = Vec::with_capacity(moves.len() + 1);
        let mut position = rules.initial();
        plies.push(Ply {
            index: 0,
            san: None,
            position: position.clone(),
        });

        for (i, san) in moves.iter().enumerate() {
            let applied = rules
                .apply_san(&position, san)
                .ok_or_else(|| ReplayError::BadMove {
                    index: i + 1,
                    san: san.clone(),
                })?;
            position = applied.position.clone();
            plies.push(Ply {
                index: i + 1,
                san: Some(applied.san),
                position: applied.position,
            });
        }

        Ok(GameTimeline { plies })
    }

    /// Number of moves replayed (one less than the ply count).
    pub fn move_count(&self) -> usize {
        self.plies.len() - 1
    }

    pub fn plies(&self) -> &[Ply] {
        &self.plies
    }
}

/// Truncate a stored blob to its first game.
fn first_game(raw_pgn: &str) -> &str {
    let marker = Regex::new(r"\[Event[^\]]*\]").unwrap();
    let mut starts = marker.find_iter(raw_pgn);

    starts.next();
    match starts.next() {
        Some(second) => raw_pgn[..second.start()].trim(),
        None => raw_pgn,
    }
}

/// Navigation over a built timeline.
///
/// The pointer ranges over `[-1, N-1]`: `-1` is "before move 1" (the initial
/// position) and `k` is "after move k+1 has been played". Out-of-range
/// targets are ignored, so stepping is a no-op at either boundary.
#[derive(Debug)]
pub struct ReplayCursor {
    timeline: GameTimeline,
    current: i32,
}

impl ReplayCursor {
    pub fn new(timeline: GameTimeline) -> Self {
        Self {
            timeline,
            current: -1,
        }
    }

    pub fn timeline(&self) -> &GameTimeline {
        &self.timeline
    }

    /// Index of the last played move, or -1 at the initial position.
    pub fn current_move(&self) -> i32 {
        self.current
    }

    pub fn current_position(&self) -> &str {
        &self.timeline.plies[(self.current + 1) as usize].position
    }

    pub fn go_to_move(&mut self, target: i32) {
        if target < -1 || target >= self.timeline.move_count() as i32 {
            return;
        }
        self.current = target;
    }

    pub fn go_to_next(&mut self) {
        self.go_to_move(self.current + 1);
    }

    pub fn go_to_previous(&mut self) {
        self.go_to_move(self.current - 1);
    }

    pub fn go_to_start(&mut self) {
        self.go_to_move(-1);
    }

    pub fn go_to_end(&mut self) {
        self.go_to_move(self.timeline.move_count() as i32 - 1);
    }
}
