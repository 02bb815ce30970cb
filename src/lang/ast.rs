//! Abstract syntax tree for Alda scores.
//!
//! Every node carries the 1-based source position it was parsed from.
//! Ordered children are plain vectors; a node exclusively owns its subtree.

use serde::{Deserialize, Serialize};

/// Source position (1-based line and column).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Position {
    pub line: usize,
    pub col: usize,
}

impl Position {
    pub fn new(line: usize, col: usize) -> Self {
        Self { line, col }
    }
}

/// One entry of an on-repetitions specifier: a single pass (`3`) or an
/// inclusive range (`1-2`). Indices are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepRange {
    pub first: u32,
    pub last: Option<u32>,
}

impl RepRange {
    pub fn contains(&self, rep: u32) -> bool {
        match self.last {
            Some(last) => self.first <= rep && rep <= last,
            None => rep == self.first,
        }
    }
}

/// An AST node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Node {
    Root {
        children: Vec<Node>,
        pos: Position,
    },
    PartDecl {
        names: Vec<String>,
        alias: Option<String>,
        pos: Position,
    },
    EventSeq {
        events: Vec<Node>,
        pos: Position,
    },
    Note {
        letter: char,
        accidentals: String,
        duration: Option<Box<Node>>,
        slurred: bool,
        pos: Position,
    },
    Rest {
        duration: Option<Box<Node>>,
        pos: Position,
    },
    Chord {
        notes: Vec<Node>,
        pos: Position,
    },
    Barline {
        pos: Position,
    },
    Duration {
        components: Vec<Node>,
        pos: Position,
    },
    NoteLength {
        denominator: u32,
        dots: u32,
        pos: Position,
    },
    NoteLengthMs {
        ms: u32,
        pos: Position,
    },
    NoteLengthS {
        seconds: f64,
        pos: Position,
    },
    OctaveSet {
        octave: i32,
        pos: Position,
    },
    OctaveUp {
        pos: Position,
    },
    OctaveDown {
        pos: Position,
    },
    LispList {
        elements: Vec<Node>,
        pos: Position,
    },
    LispSymbol {
        name: String,
        pos: Position,
    },
    LispNumber {
        value: f64,
        pos: Position,
    },
    LispString {
        value: String,
        pos: Position,
    },
    VarDef {
        name: String,
        events: Vec<Node>,
        pos: Position,
    },
    VarRef {
        name: String,
        pos: Position,
    },
    Marker {
        name: String,
        pos: Position,
    },
    AtMarker {
        name: String,
        pos: Position,
    },
    VoiceGroup {
        voices: Vec<Node>,
        pos: Position,
    },
    Voice {
        number: u32,
        events: Vec<Node>,
        pos: Position,
    },
    Cram {
        events: Vec<Node>,
        duration: Option<Box<Node>>,
        pos: Position,
    },
    BracketSeq {
        events: Vec<Node>,
        pos: Position,
    },
    Repeat {
        event: Box<Node>,
        count: u32,
        pos: Position,
    },
    OnReps {
        event: Box<Node>,
        reps: Vec<RepRange>,
        pos: Position,
    },
}

impl Node {
    /// The source position this node was parsed from.
    pub fn pos(&self) -> Position {
        match self {
            Node::Root { pos, .. }
            | Node::PartDecl { pos, .. }
            | Node::EventSeq { pos, .. }
            | Node::Note { pos, .. }
            | Node::Rest { pos, .. }
            | Node::Chord { pos, .. }
            | Node::Barline { pos }
            | Node::Duration { pos, .. }
            | Node::NoteLength { pos, .. }
            | Node::NoteLengthMs { pos, .. }
            | Node::NoteLengthS { pos, .. }
            | Node::OctaveSet { pos, .. }
            | Node::OctaveUp { pos }
            | Node::OctaveDown { pos }
            | Node::LispList { pos, .. }
            | Node::LispSymbol { pos, .. }
            | Node::LispNumber { pos, .. }
            | Node::LispString { pos, .. }
            | Node::VarDef { pos, .. }
            | Node::VarRef { pos, .. }
            | Node::Marker { pos, .. }
            | Node::AtMarker { pos, .. }
            | Node::VoiceGroup { pos, .. }
            | Node::Voice { pos, .. }
            | Node::Cram { pos, .. }
            | Node::BracketSeq { pos, .. }
            | Node::Repeat { pos, .. }
            | Node::OnReps { pos, .. } => *pos,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rep_range_single() {
        let r = RepRange { first: 3, last: None };
        assert!(r.contains(3));
        assert!(!r.contains(2));
        assert!(!r.contains(4));
    }

    #[test]
    fn rep_range_span() {
        let r = RepRange {
            first: 1,
            last: Some(3),
        };
        assert!(r.contains(1));
        assert!(r.contains(2));
        assert!(r.contains(3));
        assert!(!r.contains(4));
    }

    #[test]
    fn pos_accessor() {
        let n = Node::Barline {
            pos: Position::new(2, 5),
        };
        assert_eq!(n.pos(), Position::new(2, 5));

        let note = Node::Note {
            letter: 'c',
            accidentals: String::new(),
            duration: None,
            slurred: false,
            pos: Position::new(1, 8),
        };
        assert_eq!(note.pos().col, 8);
    }

    #[test]
    fn ast_serializes_to_json() {
        let n = Node::Note {
            letter: 'c',
            accidentals: "+".into(),
            duration: Some(Box::new(Node::Duration {
                components: vec![Node::NoteLength {
                    denominator: 4,
                    dots: 1,
                    pos: Position::default(),
                }],
                pos: Position::default(),
            })),
            slurred: false,
            pos: Position::new(1, 1),
        };
        let json = serde_json::to_string(&n).unwrap();
        assert!(json.contains("\"Note\""));
        let back: Node = serde_json::from_str(&json).unwrap();
        assert_eq!(back, n);
    }
}
