//! Daily-puzzle solving sessions.
//!
//! A puzzle is a start position plus an ordered solution of SAN tokens that
//! alternate player move, opponent reply, player move, ... starting with a
//! player move. The session validates each submitted move against the next
//! expected token, auto-plays the opposing side after a short delay, and
//! flashes a transient rejection for wrong moves.
//!
//! The session itself never sleeps: delayed effects are returned to the
//! caller as [`ScheduledAction`]s carrying an identity token. Whoever drives
//! the session (a timer, a test) hands the action back via
//! [`PuzzleSession::fire_scheduled`]; if the session was reset or moved on in
//! the meantime the identity no longer matches and the stale action falls
//! through without touching anything.

use serde::Serialize;

use crate::rules::RulesEngine;

/// Delay before the automated opponent reply is applied.
pub const OPPONENT_REPLY_DELAY_MS: u64 = 500;

/// How long a wrong-move rejection stays visible before the session returns
/// to `Ready`.
pub const REJECTION_CLEAR_DELAY_MS: u64 = 1000;

/// A puzzle as fetched from the daily-puzzle store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PuzzleDefinition {
    pub start_position: String,
    pub solution_tokens: Vec<String>,
    pub required_player_moves: usize,
    pub hint: Option<String>,
    pub difficulty: String,
}

#[derive(Debug, thiserror::Error)]
pub enum PuzzleError {
    #[error("solution has {got} tokens but {want} player moves are required")]
    TooFewTokens { got: usize, want: usize },

    #[error("solution token {index} ({san}) does not play from the preceding position")]
    BadToken { index: usize, san: String },
}

impl PuzzleDefinition {
    /// Build a definition from the stored form, where the solution is a
    /// pipe-delimited token string (e.g. `"Bxf7+|Kxf7|Ng5+"`).
    pub fn new(
        start_position: impl Into<String>,
        solution: &str,
        required_player_moves: usize,
        hint: Option<String>,
        difficulty: impl Into<String>,
    ) -> Self {
        Self {
            start_position: start_position.into(),
            solution_tokens: split_solution(solution),
            required_player_moves,
            hint,
            difficulty: difficulty.into(),
        }
    }

    /// Check the definition invariants: enough tokens for the required player
    /// moves, and the whole solution replays legally from the start position.
    pub fn verify(&self, rules: &dyn RulesEngine) -> Result<(), PuzzleError> {
        if self.solution_tokens.len() < self.required_player_moves {
            return Err(PuzzleError::TooFewTokens {
                got: self.solution_tokens.len(),
                want: self.required_player_moves,
            });
        }

        let mut position = self.start_position.clone();
        for (i, token) in self.solution_tokens.iter().enumerate() {
            match rules.apply_san(&position, token) {
                Some(applied) => position = applied.position,
                None => {
                    return Err(PuzzleError::BadToken {
                        index: i,
                        san: token.clone(),
                    })
                }
            }
        }
        Ok(())
    }
}

/// Split a stored solution string on `|`, trimming each token.
pub fn split_solution(solution: &str) -> Vec<String> {
    solution
        .split('|')
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Strip check/mate/annotation punctuation so `Qxf7#` and `Qxf7` compare
/// equal.
fn normalize_san(san: &str) -> String {
    san.chars().filter(|c| !"+#!?".contains(*c)).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PuzzleStatus {
    /// Waiting for a player move (including the window while an opponent
    /// reply is still pending).
    Ready,
    /// A wrong move was just shown; clears back to `Ready` on a timer.
    Rejected,
    /// Terminal: the whole solution has been played.
    Solved,
}

/// What a delayed effect does when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelayedEffect {
    /// Apply the opponent's solution token at the current index.
    OpponentReply,
    /// Return a `Rejected` session to `Ready`.
    ClearRejection,
}

/// A delayed effect handed to the session driver.
///
/// The private identity ties the action to the exact schedule that produced
/// it; `reset()` and any newer schedule invalidate older actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledAction {
    pub effect: DelayedEffect,
    pub delay_ms: u64,
    identity: u64,
}

/// Result of a move submission: the accept/reject flag for the board widget
/// plus the delayed effect the caller must arrange to fire, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Submission {
    pub accepted: bool,
    pub scheduled: Option<ScheduledAction>,
}

impl Submission {
    fn rejected() -> Self {
        Self {
            accepted: false,
            scheduled: None,
        }
    }
}

/// Interactive solve-or-fail loop over one [`PuzzleDefinition`].
#[derive(Debug)]
pub struct PuzzleSession {
    definition: PuzzleDefinition,
    current_position: String,
    next_token_index: usize,
    status: PuzzleStatus,
    pending: Option<ScheduledAction>,
    schedule_seq: u64,
}

impl PuzzleSession {
    pub fn new(definition: PuzzleDefinition) -> Self {
        let current_position = definition.start_position.clone();
        Self {
            definition,
            current_position,
            next_token_index: 0,
            status: PuzzleStatus::Ready,
            pending: None,
            schedule_seq: 0,
        }
    }

    pub fn definition(&self) -> &PuzzleDefinition {
        &self.definition
    }

    pub fn current_position(&self) -> &str {
        &self.current_position
    }

    pub fn status(&self) -> PuzzleStatus {
        self.status
    }

    pub fn next_token_index(&self) -> usize {
        self.next_token_index
    }

    /// Player moves completed so far (tokens alternate player/opponent).
    pub fn player_moves_made(&self) -> usize {
        self.next_token_index.div_ceil(2)
    }

    fn solved(&self) -> bool {
        self.next_token_index >= self.definition.solution_tokens.len()
    }

    /// Replace any pending action with a new one; the old identity dies here.
    fn schedule(&mut self, effect: DelayedEffect, delay_ms: u64) -> ScheduledAction {
        self.schedule_seq += 1;
        let action = ScheduledAction {
            effect,
            delay_ms,
            identity: self.schedule_seq,
        };
        self.pending = Some(action);
        action
    }

    /// Submit a player move as a from/to square pair.
    ///
    /// The candidate is validated on a scratch copy of the position and
    /// committed only when its SAN matches the expected solution token; an
    /// illegal move changes nothing at all, and a legal-but-wrong move only
    /// flips the status to a transient `Rejected`.
    pub fn submit_move(
        &mut self,
        rules: &dyn RulesEngine,
        from: &str,
        to: &str,
        promotion: Option<char>,
    ) -> Submission {
        if self.status == PuzzleStatus::Solved {
            return Submission::rejected();
        }

        let Some(expected) = self.definition.solution_tokens.get(self.next_token_index) else {
            return Submission::rejected();
        };

        let Some(applied) = rules.apply_move(&self.current_position, from, to, promotion) else {
            return Submission::rejected();
        };

        // A legal attempt during the rejection flash supersedes it; an illegal
        // one has already fallen through above without touching anything.
        if self.status == PuzzleStatus::Rejected {
            self.status = PuzzleStatus::Ready;
            self.pending = None;
        }

        if normalize_san(&applied.san) != normalize_san(expected) {
            self.status = PuzzleStatus::Rejected;
            let action = self.schedule(DelayedEffect::ClearRejection, REJECTION_CLEAR_DELAY_MS);
            return Submission {
                accepted: false,
                scheduled: Some(action),
            };
        }

        self.current_position = applied.position;
        self.next_token_index += 1;

        if self.solved() {
            self.status = PuzzleStatus::Solved;
            self.pending = None;
            return Submission {
                accepted: true,
                scheduled: None,
            };
        }

        let action = self.schedule(DelayedEffect::OpponentReply, OPPONENT_REPLY_DELAY_MS);
        Submission {
            accepted: true,
            scheduled: Some(action),
        }
    }

    /// Apply a delayed effect. Returns false when the action is stale (the
    /// session was reset or rescheduled since it was issued) — the one
    /// concurrency rule of this type: at most one pending action is live, and
    /// anything older lands here as a no-op.
    pub fn fire_scheduled(&mut self, rules: &dyn RulesEngine, action: ScheduledAction) -> bool {
        match self.pending {
            Some(pending) if pending.identity == action.identity => {}
            _ => return false,
        }
        self.pending = None;

        match action.effect {
            DelayedEffect::ClearRejection => {
                if self.status == PuzzleStatus::Rejected {
                    self.status = PuzzleStatus::Ready;
                }
            }
            DelayedEffect::OpponentReply => {
                let Some(token) = self.definition.solution_tokens.get(self.next_token_index)
                else {
                    return true;
                };
                // A reply that does not play is a corrupt definition; leave
                // the session where it is rather than guessing.
                if let Some(applied) = rules.apply_san(&self.current_position, token) {
                    self.current_position = applied.position;
                    self.next_token_index += 1;
                    if self.solved() {
                        self.status = PuzzleStatus::Solved;
                    }
                }
            }
        }
        true
    }

    /// Back to the start position, forgetting all progress and invalidating
    /// any outstanding scheduled action.
    pub fn reset(&mut self) {
        self.current_position = self.definition.start_position.clone();
        self.next_token_index = 0;
        self.status = PuzzleStatus::Ready;
        self.pending = None;
        self.schedule_seq += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{AppliedMove, ParseError, ShakmatyRules};

    // White mates with Qxf7#.
    const MATE_IN_ONE: &str = "r1bqkb1r/pppp1ppp/2n2n2/4p2Q/2B1P3/8/PPPP1PPP/RNB1K1NR w KQkq - 4 4";
    // White plays Bxf7+, black must take, Ng5+ follows.
    const FRIED_LIVER: &str = "r1bqkb1r/pppp1ppp/2n2n2/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 4 4";

    fn mate_in_one() -> PuzzleDefinition {
        PuzzleDefinition::new(MATE_IN_ONE, "Qxf7#", 1, Some("Mate in one!".into()), "EASY")
    }

    fn two_mover() -> PuzzleDefinition {
        PuzzleDefinition::new(FRIED_LIVER, "Bxf7+|Kxf7|Ng5+", 2, None, "MEDIUM")
    }

    #[test]
    fn test_split_solution_trims_tokens() {
        assert_eq!(
            split_solution(" Bxf7+ | Kxf7 |Ng5+ "),
            vec!["Bxf7+", "Kxf7", "Ng5+"]
        );
        assert_eq!(split_solution("Qxf7#"), vec!["Qxf7#"]);
    }

    #[test]
    fn test_verify_accepts_good_definition() {
        assert!(mate_in_one().verify(&ShakmatyRules).is_ok());
        assert!(two_mover().verify(&ShakmatyRules).is_ok());
    }

    #[test]
    fn test_verify_rejects_bad_definitions() {
        let short = PuzzleDefinition::new(MATE_IN_ONE, "Qxf7#", 3, None, "HARD");
        assert!(matches!(
            short.verify(&ShakmatyRules),
            Err(PuzzleError::TooFewTokens { got: 1, want: 3 })
        ));

        let unplayable = PuzzleDefinition::new(MATE_IN_ONE, "Qxf7#|Ke7", 1, None, "HARD");
        assert!(matches!(
            unplayable.verify(&ShakmatyRules),
            Err(PuzzleError::BadToken { index: 1, .. })
        ));
    }

    #[test]
    fn test_single_token_solve_goes_straight_to_solved() {
        let mut session = PuzzleSession::new(mate_in_one());

        let submission = session.submit_move(&ShakmatyRules, "h5", "f7", None);
        assert!(submission.accepted);
        assert_eq!(submission.scheduled, None);
        assert_eq!(session.status(), PuzzleStatus::Solved);
        assert_eq!(session.player_moves_made(), 1);
    }

    #[test]
    fn test_opponent_reply_then_second_move_solves() {
        let mut session = PuzzleSession::new(two_mover());

        let first = session.submit_move(&ShakmatyRules, "c4", "f7", None);
        assert!(first.accepted);
        let reply = first.scheduled.expect("opponent reply scheduled");
        assert_eq!(reply.effect, DelayedEffect::OpponentReply);
        assert_eq!(reply.delay_ms, OPPONENT_REPLY_DELAY_MS);
        assert_eq!(session.status(), PuzzleStatus::Ready);
        assert_eq!(session.next_token_index(), 1);

        assert!(session.fire_scheduled(&ShakmatyRules, reply));
        assert_eq!(session.next_token_index(), 2);
        assert_eq!(session.status(), PuzzleStatus::Ready);

        let second = session.submit_move(&ShakmatyRules, "f3", "g5", None);
        assert!(second.accepted);
        assert_eq!(second.scheduled, None);
        assert_eq!(session.status(), PuzzleStatus::Solved);
    }

    #[test]
    fn test_illegal_move_changes_nothing() {
        let mut session = PuzzleSession::new(mate_in_one());
        let before = session.current_position().to_string();

        let submission = session.submit_move(&ShakmatyRules, "h5", "h8", None);
        assert!(!submission.accepted);
        assert_eq!(submission.scheduled, None);
        assert_eq!(session.status(), PuzzleStatus::Ready);
        assert_eq!(session.current_position(), before);
    }

    #[test]
    fn test_wrong_but_legal_move_is_transiently_rejected() {
        let mut session = PuzzleSession::new(mate_in_one());
        let before = session.current_position().to_string();

        let submission = session.submit_move(&ShakmatyRules, "d2", "d3", None);
        assert!(!submission.accepted);
        assert_eq!(session.status(), PuzzleStatus::Rejected);
        assert_eq!(session.current_position(), before);

        let clear = submission.scheduled.expect("clear scheduled");
        assert_eq!(clear.effect, DelayedEffect::ClearRejection);
        assert_eq!(clear.delay_ms, REJECTION_CLEAR_DELAY_MS);

        assert!(session.fire_scheduled(&ShakmatyRules, clear));
        assert_eq!(session.status(), PuzzleStatus::Ready);
        assert_eq!(session.current_position(), before);
        assert_eq!(session.next_token_index(), 0);
    }

    #[test]
    fn test_check_suffix_is_ignored_in_comparison() {
        // Solution stored without the mate sign still matches Qxf7#.
        let def = PuzzleDefinition::new(MATE_IN_ONE, "Qxf7", 1, None, "EASY");
        let mut session = PuzzleSession::new(def);
        assert!(session.submit_move(&ShakmatyRules, "h5", "f7", None).accepted);
        assert_eq!(session.status(), PuzzleStatus::Solved);
    }

    #[test]
    fn test_submissions_after_solved_are_ignored() {
        let mut session = PuzzleSession::new(mate_in_one());
        assert!(session.submit_move(&ShakmatyRules, "h5", "f7", None).accepted);

        let position = session.current_position().to_string();
        let late = session.submit_move(&ShakmatyRules, "e2", "e4", None);
        assert!(!late.accepted);
        assert_eq!(late.scheduled, None);
        assert_eq!(session.status(), PuzzleStatus::Solved);
        assert_eq!(session.current_position(), position);
    }

    #[test]
    fn test_reset_restores_start_and_invalidates_pending() {
        let mut session = PuzzleSession::new(two_mover());

        let first = session.submit_move(&ShakmatyRules, "c4", "f7", None);
        let reply = first.scheduled.unwrap();

        session.reset();
        assert_eq!(session.status(), PuzzleStatus::Ready);
        assert_eq!(session.current_position(), FRIED_LIVER);
        assert_eq!(session.next_token_index(), 0);

        // The old timer fires against the reset session: nothing happens.
        assert!(!session.fire_scheduled(&ShakmatyRules, reply));
        assert_eq!(session.current_position(), FRIED_LIVER);
        assert_eq!(session.next_token_index(), 0);
    }

    #[test]
    fn test_illegal_attempt_during_rejection_flash_keeps_it() {
        let mut session = PuzzleSession::new(mate_in_one());

        let wrong = session.submit_move(&ShakmatyRules, "d2", "d3", None);
        let clear = wrong.scheduled.unwrap();

        // Illegal drag while the flash is up: nothing moves, flash stays.
        let illegal = session.submit_move(&ShakmatyRules, "h5", "h1", None);
        assert!(!illegal.accepted);
        assert_eq!(illegal.scheduled, None);
        assert_eq!(session.status(), PuzzleStatus::Rejected);

        // The original clear is still the live one.
        assert!(session.fire_scheduled(&ShakmatyRules, clear));
        assert_eq!(session.status(), PuzzleStatus::Ready);
    }

    #[test]
    fn test_attempt_during_rejection_flash_supersedes_it() {
        let mut session = PuzzleSession::new(mate_in_one());

        let wrong = session.submit_move(&ShakmatyRules, "d2", "d3", None);
        let clear = wrong.scheduled.unwrap();
        assert_eq!(session.status(), PuzzleStatus::Rejected);

        // Correct move lands while the flash is still showing.
        let right = session.submit_move(&ShakmatyRules, "h5", "f7", None);
        assert!(right.accepted);
        assert_eq!(session.status(), PuzzleStatus::Solved);

        // The superseded clear is stale and must not fire.
        assert!(!session.fire_scheduled(&ShakmatyRules, clear));
        assert_eq!(session.status(), PuzzleStatus::Solved);
    }

    /// The session never inspects positions itself, so a stub engine with
    /// made-up position strings drives the state machine just as well.
    struct StubRules;

    impl RulesEngine for StubRules {
        fn initial(&self) -> String {
            "start".to_string()
        }

        fn apply_move(
            &self,
            position: &str,
            from: &str,
            to: &str,
            _promotion: Option<char>,
        ) -> Option<AppliedMove> {
            if from == "xx" {
                return None;
            }
            Some(AppliedMove {
                san: format!("{from}{to}"),
                position: format!("{position}/{from}{to}"),
            })
        }

        fn apply_san(&self, position: &str, san: &str) -> Option<AppliedMove> {
            Some(AppliedMove {
                san: san.to_string(),
                position: format!("{position}/{san}"),
            })
        }

        fn parse_move_list(&self, _pgn: &str) -> Result<Vec<String>, ParseError> {
            Err(ParseError::NoGame)
        }
    }

    #[test]
    fn test_state_machine_with_stub_engine() {
        let def = PuzzleDefinition::new("start", "a1b2|c3d4|e5f6", 2, None, "EASY");
        let mut session = PuzzleSession::new(def);

        // Stub-illegal: nothing happens.
        assert!(!session.submit_move(&StubRules, "xx", "zz", None).accepted);
        assert_eq!(session.status(), PuzzleStatus::Ready);

        // Legal but wrong: transient rejection.
        let wrong = session.submit_move(&StubRules, "h7", "h8", None);
        assert!(!wrong.accepted);
        assert_eq!(session.status(), PuzzleStatus::Rejected);
        assert!(session.fire_scheduled(&StubRules, wrong.scheduled.unwrap()));

        // Correct move, opponent reply, second correct move.
        let ok = session.submit_move(&StubRules, "a1", "b2", None);
        assert!(ok.accepted);
        assert_eq!(session.current_position(), "start/a1b2");

        assert!(session.fire_scheduled(&StubRules, ok.scheduled.unwrap()));
        assert_eq!(session.current_position(), "start/a1b2/c3d4");

        assert!(session.submit_move(&StubRules, "e5", "f6", None).accepted);
        assert_eq!(session.status(), PuzzleStatus::Solved);
        assert_eq!(session.current_position(), "start/a1b2/c3d4/e5f6");
    }
}
