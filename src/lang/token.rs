//! Token types for the Alda scanner.

use serde::{Deserialize, Serialize};

/// A token produced by the scanner.
///
/// `lexeme` is the raw source text; literal values live inside the kind.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub line: usize,
    pub col: usize,
}

/// The kind of token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TokenKind {
    // Musical notation
    NoteLetter(char),
    RestLetter,
    Sharp,
    Flat,
    Natural,
    OctaveSet(i32),
    OctaveUp,
    OctaveDown,
    NoteLength(u32),
    NoteLengthMs(u32),
    NoteLengthS(f64),
    Dot,
    Tie,
    Barline,
    Separator,

    // Structure
    Name(String),
    Alias(String),
    Colon,
    Equals,

    // S-expressions
    LeftParen,
    RightParen,
    Symbol(String),
    Number(f64),
    LispString(String),

    // Control flow
    Marker(String),
    AtMarker(String),
    VoiceMarker(u32),
    CramOpen,
    CramClose,
    BracketOpen,
    BracketClose,
    Repeat(u32),
    /// Raw repetition specifier text (digits, commas, hyphens); the parser
    /// turns it into ranges.
    Repetitions(String),

    Newline,
    Eof,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, line: usize, col: usize) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            line,
            col,
        }
    }

    /// True for the three duration-component kinds.
    pub fn is_length(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::NoteLength(_) | TokenKind::NoteLengthMs(_) | TokenKind::NoteLengthS(_)
        )
    }
}
