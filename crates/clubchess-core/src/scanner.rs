//! Scanner for chess notation embedded in free-form post text.
//!
//! Users write `[fen]...[/fen]` and `[pgn]...[/pgn]` blocks inline; the
//! scanner splits the text into an ordered run of plain-text and notation
//! segments for the renderer. A single left-to-right pass alternates over
//! both tag labels — scanning the two kinds separately would scramble the
//! relative order when a post mixes them.

use serde::Serialize;

/// One piece of a scanned post, in source order.
///
/// Serialized as `{"kind": ..., "content": ...}` for the rendering boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "content", rename_all = "lowercase")]
pub enum NotationSegment {
    Text(String),
    Fen(String),
    Pgn(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TagKind {
    Fen,
    Pgn,
}

impl TagKind {
    fn open(self) -> &'static str {
        match self {
            TagKind::Fen => "[fen]",
            TagKind::Pgn => "[pgn]",
        }
    }

    fn close(self) -> &'static str {
        match self {
            TagKind::Fen => "[/fen]",
            TagKind::Pgn => "[/pgn]",
        }
    }

    fn segment(self, content: String) -> NotationSegment {
        match self {
            TagKind::Fen => NotationSegment::Fen(content),
            TagKind::Pgn => NotationSegment::Pgn(content),
        }
    }
}

/// Nearest opening tag of either kind at or after `from`, in document order.
fn next_opening(text: &str, from: usize) -> Option<(usize, TagKind)> {
    let fen = text[from..].find(TagKind::Fen.open());
    let pgn = text[from..].find(TagKind::Pgn.open());

    let (offset, kind) = match (fen, pgn) {
        (Some(f), Some(p)) if f <= p => (f, TagKind::Fen),
        (Some(_), Some(p)) => (p, TagKind::Pgn),
        (Some(f), None) => (f, TagKind::Fen),
        (None, Some(p)) => (p, TagKind::Pgn),
        (None, None) => return None,
    };

    Some((from + offset, kind))
}

/// Split `text` into plain-text and embedded-notation segments.
///
/// Tags are case-sensitive, non-nested and matched non-greedily; a block may
/// span line breaks. Block interiors are whitespace-trimmed but otherwise
/// passed through unvalidated — a malformed FEN or PGN is the consumer's
/// problem. An opening tag with no matching close is not a block and stays
/// verbatim in the surrounding text. Text with no tags at all (including the
/// empty string) comes back as a single `Text` segment.
pub fn scan(text: &str) -> Vec<NotationSegment> {
    let mut segments = Vec::new();
    let mut consumed = 0; // end of the last emitted segment
    let mut search = 0; // where to look for the next opening tag

    while let Some((open_at, kind)) = next_opening(text, search) {
        let body_start = open_at + kind.open().len();

        let Some(close_rel) = text[body_start..].find(kind.close()) else {
            // Unterminated: skip this opening and keep scanning; the tag text
            // stays part of the surrounding Text segment.
            search = body_start;
            continue;
        };

        if open_at > consumed {
            segments.push(NotationSegment::Text(text[consumed..open_at].to_string()));
        }

        let body = text[body_start..body_start + close_rel].trim().to_string();
        segments.push(kind.segment(body));

        consumed = body_start + close_rel + kind.close().len();
        search = consumed;
    }

    if consumed < text.len() || segments.is_empty() {
        segments.push(NotationSegment::Text(text[consumed..].to_string()));
    }

    segments
}
