//! End-to-end tests for the notation pipeline: scan a forum post, pull the
//! embedded PGN out, and replay it into a navigable timeline — the same path
//! the post renderer and game viewer take in production.

use clubchess_core::replay::{GameTimeline, ReplayCursor};
use clubchess_core::rules::{RulesEngine, ShakmatyRules, INITIAL_FEN};
use clubchess_core::scanner::{scan, NotationSegment};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn first_pgn_segment(segments: &[NotationSegment]) -> Option<&str> {
    segments.iter().find_map(|s| match s {
        NotationSegment::Pgn(content) => Some(content.as_str()),
        _ => None,
    })
}

// ---------------------------------------------------------------------------
// Scanner over realistic post content
// ---------------------------------------------------------------------------

#[test]
fn test_scan_club_post_with_board_and_game() {
    let post = "Look at last night's blitz final!\n\
                [fen]r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3[/fen]\n\
                White went on to win:\n\
                [pgn]\n1. e4 e5 2. Nf3 Nc6 3. Bb5 a6\n[/pgn]\n\
                Thoughts?";

    let segments = scan(post);
    assert_eq!(segments.len(), 5);

    assert!(matches!(&segments[0], NotationSegment::Text(t) if t.contains("blitz final")));
    assert!(matches!(
        &segments[1],
        NotationSegment::Fen(f) if f == "r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3"
    ));
    assert!(matches!(&segments[2], NotationSegment::Text(t) if t.contains("went on to win")));
    assert!(matches!(
        &segments[3],
        NotationSegment::Pgn(p) if p == "1. e4 e5 2. Nf3 Nc6 3. Bb5 a6"
    ));
    assert!(matches!(&segments[4], NotationSegment::Text(t) if t.contains("Thoughts?")));
}

#[test]
fn test_scan_serializes_for_the_rendering_boundary() {
    let segments = scan("hi[fen]8/8/8/8/8/8/8/8 w - - 0 1[/fen]");
    let json = serde_json::to_value(&segments).unwrap();

    assert_eq!(json[0]["kind"], "text");
    assert_eq!(json[0]["content"], "hi");
    assert_eq!(json[1]["kind"], "fen");
    assert_eq!(json[1]["content"], "8/8/8/8/8/8/8/8 w - - 0 1");
}

#[test]
fn test_scan_plain_text_and_broken_tags_round_trip() {
    for input in ["", "no tags here", "broken [pgn]1. e4", "[/fen] stray close"] {
        let segments = scan(input);
        assert_eq!(segments, vec![NotationSegment::Text(input.to_string())]);
    }
}

// ---------------------------------------------------------------------------
// Scanned PGN feeding the replay engine
// ---------------------------------------------------------------------------

#[test]
fn test_scanned_pgn_replays_into_timeline() {
    let post = "Opening prep: [pgn]1. d4 Nf6 2. c4 e6 3. Nc3 Bb4[/pgn] classic Nimzo.";

    let segments = scan(post);
    let pgn = first_pgn_segment(&segments).expect("post embeds a game");

    let timeline = GameTimeline::build(&ShakmatyRules, pgn).unwrap();
    assert_eq!(timeline.move_count(), 6);
    assert_eq!(timeline.plies()[0].position, INITIAL_FEN);
    assert_eq!(timeline.plies()[6].san.as_deref(), Some("Bb4"));
}

#[test]
fn test_viewer_walks_a_stored_game_end_to_end() {
    let stored = r#"[Event "Spring Rapid, Round 2"]
[White "Aydin, E."]
[Black "Demir, K."]
[Result "1/2-1/2"]

1. Nf3 d5 2. g3 c5 3. Bg2 Nc6 1/2-1/2"#;

    let timeline = GameTimeline::build(&ShakmatyRules, stored).unwrap();
    assert_eq!(timeline.move_count(), 6);

    let mut cursor = ReplayCursor::new(timeline);
    assert_eq!(cursor.current_position(), INITIAL_FEN);

    // Step through the whole game, then bounce off the end.
    for expected_move in 0..6 {
        cursor.go_to_next();
        assert_eq!(cursor.current_move(), expected_move);
    }
    cursor.go_to_next();
    assert_eq!(cursor.current_move(), 5);

    // Jump around like the move-list buttons do.
    cursor.go_to_move(2);
    let after_three = cursor.current_position().to_string();
    cursor.go_to_start();
    cursor.go_to_end();
    cursor.go_to_move(2);
    assert_eq!(cursor.current_position(), after_three);

    // Positions agree with replaying the SAN by hand.
    let rules = ShakmatyRules;
    let mut position = rules.initial();
    for ply in &cursor.timeline().plies()[1..=3] {
        position = rules
            .apply_san(&position, ply.san.as_deref().unwrap())
            .unwrap()
            .position;
    }
    assert_eq!(after_three, position);
}

#[test]
fn test_concatenated_upload_only_replays_first_game() {
    let blob = r#"[Event "Club Championship"]
[White "A"]
[Black "B"]
[Result "1-0"]

1. e4 e5 2. Qh5 Nc6 3. Bc4 Nf6 4. Qxf7# 1-0

[Event "Casual Game"]
[White "C"]
[Black "D"]
[Result "0-1"]

1. f3 e5 2. g4 Qh4# 0-1"#;

    let timeline = GameTimeline::build(&ShakmatyRules, blob).unwrap();
    assert_eq!(timeline.move_count(), 7);
    assert_eq!(timeline.plies()[7].san.as_deref(), Some("Qxf7#"));
}
