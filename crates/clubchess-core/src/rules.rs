//! Chess-rules capability — the seam between this crate and the underlying
//! chess library.
//!
//! The scanner, replay engine and puzzle session never touch a board
//! directly; they go through [`RulesEngine`] so the whole subsystem can be
//! exercised with a stub engine in tests. [`ShakmatyRules`] is the production
//! implementation.

use std::ops::ControlFlow;

use pgn_reader::{RawTag, Reader, SanPlus, Visitor};
use shakmaty::{
    fen::Fen, san::San, CastlingMode, Chess, EnPassantMode, File, Move, Position, Role, Square,
};

pub const INITIAL_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// A move the rules engine has accepted: its SAN label and the position
/// (FEN) after playing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedMove {
    pub san: String,
    pub position: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("unreadable PGN text: {0}")]
    Unreadable(String),

    #[error("no game found in PGN text")]
    NoGame,
}

/// Legal-move application, SAN generation and PGN move-list parsing.
///
/// Implementations own board legality entirely. Illegal or unparseable moves
/// are rejected with `None`, never an error — callers treat a rejection as a
/// no-op.
pub trait RulesEngine {
    /// FEN of the default initial position.
    fn initial(&self) -> String;

    /// Apply a coordinate move (`from`/`to` square names, e.g. "e2" "e4") to
    /// `position`. A missing promotion piece defaults to queen.
    fn apply_move(
        &self,
        position: &str,
        from: &str,
        to: &str,
        promotion: Option<char>,
    ) -> Option<AppliedMove>;

    /// Apply a single SAN move (e.g. "Nxf7+") to `position`.
    fn apply_san(&self, position: &str, san: &str) -> Option<AppliedMove>;

    /// Ordered SAN move list of the first game in `pgn`.
    fn parse_move_list(&self, pgn: &str) -> Result<Vec<String>, ParseError>;
}

/// Production rules engine backed by shakmaty (positions, legality, SAN) and
/// pgn-reader (move-list extraction).
#[derive(Debug, Clone, Copy, Default)]
pub struct ShakmatyRules;

impl ShakmatyRules {
    fn position(fen: &str) -> Option<Chess> {
        let fen: Fen = fen.parse().ok()?;
        fen.into_position(CastlingMode::Standard).ok()
    }

    fn fen_of(pos: &Chess) -> String {
        Fen::from_position(pos, EnPassantMode::Legal).to_string()
    }

    /// Find the legal move matching a drag-style from/to pair.
    ///
    /// Castling needs special handling: the UI sends the king's destination
    /// square (g1/c1), while shakmaty encodes castling as king-takes-rook.
    fn coordinate_move(pos: &Chess, from: Square, to: Square, promotion: Role) -> Option<Move> {
        let legals = pos.legal_moves();

        if let Some(m) = legals.iter().find(|m| {
            m.from() == Some(from)
                && m.to() == to
                && (m.promotion().is_none() || m.promotion() == Some(promotion))
        }) {
            return Some(m.clone());
        }

        legals
            .iter()
            .find(|m| match m {
                Move::Castle { king, rook } => {
                    let dest_file = if rook.file() > king.file() {
                        File::G
                    } else {
                        File::C
                    };
                    *king == from && to == Square::from_coords(dest_file, king.rank())
                }
                _ => false,
            })
            .cloned()
    }

    fn play(mut pos: Chess, m: Move) -> AppliedMove {
        let san = San::from_move(&pos, m);
        pos.play_unchecked(m);

        let suffix = if pos.is_checkmate() {
            "#"
        } else if pos.is_check() {
            "+"
        } else {
            ""
        };

        AppliedMove {
            san: format!("{san}{suffix}"),
            position: Self::fen_of(&pos),
        }
    }
}

impl RulesEngine for ShakmatyRules {
    fn initial(&self) -> String {
        INITIAL_FEN.to_string()
    }

    fn apply_move(
        &self,
        position: &str,
        from: &str,
        to: &str,
        promotion: Option<char>,
    ) -> Option<AppliedMove> {
        let pos = Self::position(position)?;
        let from: Square = from.parse().ok()?;
        let to: Square = to.parse().ok()?;
        let promotion = promotion.and_then(Role::from_char).unwrap_or(Role::Queen);

        let m = Self::coordinate_move(&pos, from, to, promotion)?;
        Some(Self::play(pos, m))
    }

    fn apply_san(&self, position: &str, san: &str) -> Option<AppliedMove> {
        let pos = Self::position(position)?;
        let san: San = san.trim().parse().ok()?;
        let m = san.to_move(&pos).ok()?;
        Some(Self::play(pos, m))
    }

    fn parse_move_list(&self, pgn: &str) -> Result<Vec<String>, ParseError> {
        let mut collector = MoveListCollector;
        let mut reader = Reader::new(pgn.as_bytes());

        reader
            .read_game(&mut collector)
            .map_err(|e| ParseError::Unreadable(e.to_string()))?
            .ok_or(ParseError::NoGame)
    }
}

/// Visitor that records the mainline SAN of the first game, variations
/// skipped.
struct MoveListCollector;

impl Visitor for MoveListCollector {
    type Tags = ();
    type Movetext = Vec<String>;
    type Output = Vec<String>;

    fn begin_tags(&mut self) -> ControlFlow<Self::Output, Self::Tags> {
        ControlFlow::Continue(())
    }

    fn tag(&mut self, _tags: &mut Self::Tags, _name: &[u8], _value: RawTag<'_>) -> ControlFlow<Self::Output> {
        ControlFlow::Continue(())
    }

    fn begin_movetext(&mut self, _tags: Self::Tags) -> ControlFlow<Self::Output, Self::Movetext> {
        ControlFlow::Continue(Vec::new())
    }

    fn san(&mut self, moves: &mut Self::Movetext, san_plus: SanPlus) -> ControlFlow<Self::Output> {
        moves.push(san_plus.to_string());
        ControlFlow::Continue(())
    }

    fn end_game(&mut self, moves: Self::Movetext) -> Self::Output {
        moves
    }
}
