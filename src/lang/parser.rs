//! Recursive-descent parser for Alda.
//!
//! Parses a token stream into the AST. The only non-local decision is the
//! part-declaration lookahead: a `NAME` that eventually reaches `:` (through
//! `/NAME` repetitions and an optional alias) opens a new part, a `NAME`
//! followed by `=` defines a variable, and anything else is a variable
//! reference. The lookahead scans without consuming and rewinds.

use super::ast::{Node, Position, RepRange};
use super::error::AldaError;
use super::token::{Token, TokenKind};

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    pub fn parse(&mut self) -> Result<Node, AldaError> {
        let mut children = Vec::new();

        loop {
            self.skip_newlines();
            if self.is_at_end() {
                break;
            }

            if self.is_part_declaration() {
                children.push(self.parse_part_decl()?);
                let pos = self.peek_pos();
                let events = self.parse_events(false)?;
                children.push(Node::EventSeq { events, pos });
            } else {
                let pos = self.peek_pos();
                let events = self.parse_events(false)?;
                if events.is_empty() {
                    let t = self.peek();
                    return Err(AldaError::syntax(
                        format!("unexpected token: {}", describe(t)),
                        t.line,
                        t.col,
                    ));
                }
                children.push(Node::EventSeq { events, pos });
            }
        }

        Ok(Node::Root {
            children,
            pos: Position::new(1, 1),
        })
    }

    /// Parse events until something that cannot continue the sequence: end
    /// of input, a closing delimiter, or the start of a new part block.
    /// Inside a voice body (`in_voice`), a voice marker also ends the run.
    fn parse_events(&mut self, in_voice: bool) -> Result<Vec<Node>, AldaError> {
        let mut events = Vec::new();
        loop {
            self.skip_newlines();
            if self.is_at_end() || self.is_part_declaration() {
                break;
            }
            if in_voice && matches!(self.peek().kind, TokenKind::VoiceMarker(_)) {
                break;
            }
            if !starts_event(&self.peek().kind) {
                break;
            }
            events.push(self.parse_event()?);
        }
        Ok(events)
    }

    fn parse_event(&mut self) -> Result<Node, AldaError> {
        let event = self.parse_primary()?;
        self.parse_postfix(event)
    }

    fn parse_primary(&mut self) -> Result<Node, AldaError> {
        let t = self.peek().clone();
        let pos = Position::new(t.line, t.col);

        match t.kind {
            TokenKind::NoteLetter(_) => self.parse_note_or_chord(),
            TokenKind::RestLetter => self.parse_rest(),
            TokenKind::OctaveSet(octave) => {
                self.advance();
                Ok(Node::OctaveSet { octave, pos })
            }
            TokenKind::OctaveUp => {
                self.advance();
                Ok(Node::OctaveUp { pos })
            }
            TokenKind::OctaveDown => {
                self.advance();
                Ok(Node::OctaveDown { pos })
            }
            TokenKind::Barline => {
                self.advance();
                Ok(Node::Barline { pos })
            }
            TokenKind::LeftParen => self.parse_sexp(),
            TokenKind::CramOpen => self.parse_cram(),
            TokenKind::BracketOpen => self.parse_bracket_seq(),
            TokenKind::Marker(name) => {
                self.advance();
                Ok(Node::Marker { name, pos })
            }
            TokenKind::AtMarker(name) => {
                self.advance();
                Ok(Node::AtMarker { name, pos })
            }
            TokenKind::VoiceMarker(_) => self.parse_voice_group(),
            TokenKind::Name(name) => {
                self.advance();
                if matches!(self.peek().kind, TokenKind::Equals) {
                    self.parse_var_def(name, pos)
                } else {
                    Ok(Node::VarRef { name, pos })
                }
            }
            _ => Err(AldaError::syntax(
                format!("unexpected token: {}", describe(&t)),
                t.line,
                t.col,
            )),
        }
    }

    // --- Notes, rests, chords, durations ---

    fn parse_note(&mut self) -> Result<Node, AldaError> {
        let t = self.advance().clone();
        let pos = Position::new(t.line, t.col);
        let letter = match t.kind {
            TokenKind::NoteLetter(l) => l,
            _ => {
                return Err(AldaError::syntax(
                    format!("expected a note, got {}", describe(&t)),
                    t.line,
                    t.col,
                ))
            }
        };

        let mut accidentals = String::new();
        loop {
            match self.peek().kind {
                TokenKind::Sharp => accidentals.push('+'),
                TokenKind::Flat => accidentals.push('-'),
                TokenKind::Natural => accidentals.push('_'),
                _ => break,
            }
            self.advance();
        }

        let duration = if self.peek().is_length() {
            Some(Box::new(self.parse_duration()?))
        } else {
            None
        };

        // A `~` left over after the duration (or with no duration at all)
        // is a slur; ties between components were consumed by
        // parse_duration.
        let slurred = if matches!(self.peek().kind, TokenKind::Tie) {
            self.advance();
            true
        } else {
            false
        };

        Ok(Node::Note {
            letter,
            accidentals,
            duration,
            slurred,
            pos,
        })
    }

    fn parse_rest(&mut self) -> Result<Node, AldaError> {
        let t = self.advance().clone();
        let pos = Position::new(t.line, t.col);
        let duration = if self.peek().is_length() {
            Some(Box::new(self.parse_duration()?))
        } else {
            None
        };
        Ok(Node::Rest { duration, pos })
    }

    fn parse_note_or_chord(&mut self) -> Result<Node, AldaError> {
        let first = self.parse_note()?;
        if !matches!(self.peek().kind, TokenKind::Separator) {
            return Ok(first);
        }

        let pos = first.pos();
        let mut notes = vec![first];
        while matches!(self.peek().kind, TokenKind::Separator) {
            self.advance();
            self.skip_newlines();
            match self.peek().kind {
                TokenKind::NoteLetter(_) => notes.push(self.parse_note()?),
                TokenKind::RestLetter => notes.push(self.parse_rest()?),
                _ => {
                    let t = self.peek();
                    return Err(AldaError::syntax(
                        format!("expected a note or rest in chord, got {}", describe(t)),
                        t.line,
                        t.col,
                    ));
                }
            }
        }

        Ok(Node::Chord { notes, pos })
    }

    fn parse_duration(&mut self) -> Result<Node, AldaError> {
        let pos = self.peek_pos();
        let mut components = vec![self.parse_duration_component()?];

        // A tie joins two duration components additively; a tie followed by
        // anything else belongs to the note (slur), so leave it in place.
        while matches!(self.peek().kind, TokenKind::Tie)
            && self.peek_next().is_some_and(Token::is_length)
        {
            self.advance();
            components.push(self.parse_duration_component()?);
        }

        Ok(Node::Duration { components, pos })
    }

    fn parse_duration_component(&mut self) -> Result<Node, AldaError> {
        let t = self.advance().clone();
        let pos = Position::new(t.line, t.col);
        match t.kind {
            TokenKind::NoteLength(denominator) => {
                let mut dots = 0;
                while matches!(self.peek().kind, TokenKind::Dot) {
                    self.advance();
                    dots += 1;
                }
                Ok(Node::NoteLength {
                    denominator,
                    dots,
                    pos,
                })
            }
            TokenKind::NoteLengthMs(ms) => Ok(Node::NoteLengthMs { ms, pos }),
            TokenKind::NoteLengthS(seconds) => Ok(Node::NoteLengthS { seconds, pos }),
            _ => Err(AldaError::syntax(
                format!("expected a duration, got {}", describe(&t)),
                t.line,
                t.col,
            )),
        }
    }

    // --- S-expressions ---

    fn parse_sexp(&mut self) -> Result<Node, AldaError> {
        let open = self.advance().clone(); // consume '('
        let pos = Position::new(open.line, open.col);
        let mut elements = Vec::new();

        loop {
            self.skip_newlines();
            let t = self.peek().clone();
            match t.kind {
                TokenKind::RightParen => break,
                TokenKind::Eof => {
                    return Err(AldaError::syntax(
                        "expected ')' to close s-expression",
                        open.line,
                        open.col,
                    ))
                }
                TokenKind::LeftParen => elements.push(self.parse_sexp()?),
                TokenKind::Symbol(name) => {
                    self.advance();
                    elements.push(Node::LispSymbol {
                        name,
                        pos: Position::new(t.line, t.col),
                    });
                }
                TokenKind::Number(value) => {
                    self.advance();
                    elements.push(Node::LispNumber {
                        value,
                        pos: Position::new(t.line, t.col),
                    });
                }
                TokenKind::LispString(value) => {
                    self.advance();
                    elements.push(Node::LispString {
                        value,
                        pos: Position::new(t.line, t.col),
                    });
                }
                _ => {
                    return Err(AldaError::syntax(
                        format!("unexpected token in s-expression: {}", describe(&t)),
                        t.line,
                        t.col,
                    ))
                }
            }
        }

        self.advance(); // consume ')'
        Ok(Node::LispList { elements, pos })
    }

    // --- Groups ---

    /// Delimited bodies reset the voice-marker stop condition: a voice
    /// group inside a bracket is its own group.
    fn parse_cram(&mut self) -> Result<Node, AldaError> {
        let open = self.advance().clone(); // consume '{'
        let pos = Position::new(open.line, open.col);

        let events = self.parse_events(false)?;
        if !matches!(self.peek().kind, TokenKind::CramClose) {
            let t = self.peek();
            return Err(AldaError::syntax(
                "expected '}' to close cram expression",
                t.line,
                t.col,
            ));
        }
        self.advance();

        let duration = if self.peek().is_length() {
            Some(Box::new(self.parse_duration()?))
        } else {
            None
        };

        Ok(Node::Cram {
            events,
            duration,
            pos,
        })
    }

    fn parse_bracket_seq(&mut self) -> Result<Node, AldaError> {
        let open = self.advance().clone(); // consume '['
        let pos = Position::new(open.line, open.col);

        let events = self.parse_events(false)?;
        if !matches!(self.peek().kind, TokenKind::BracketClose) {
            let t = self.peek();
            return Err(AldaError::syntax(
                "expected ']' to close bracketed sequence",
                t.line,
                t.col,
            ));
        }
        self.advance();

        Ok(Node::BracketSeq { events, pos })
    }

    fn parse_voice_group(&mut self) -> Result<Node, AldaError> {
        let pos = self.peek_pos();
        let mut voices = Vec::new();

        while let TokenKind::VoiceMarker(number) = self.peek().kind {
            let marker = self.advance().clone();
            if number == 0 {
                // V0: rejoins the voices and ends the group
                break;
            }
            let voice_pos = Position::new(marker.line, marker.col);
            let events = self.parse_events(true)?;
            voices.push(Node::Voice {
                number,
                events,
                pos: voice_pos,
            });
        }

        Ok(Node::VoiceGroup { voices, pos })
    }

    // --- Variables ---

    /// Name and position already consumed; cursor sits on `=`. The event
    /// list runs to the end of the line.
    fn parse_var_def(&mut self, name: String, pos: Position) -> Result<Node, AldaError> {
        self.advance(); // consume '='

        let mut events = Vec::new();
        loop {
            match self.peek().kind {
                TokenKind::Newline | TokenKind::Eof => break,
                _ if starts_event(&self.peek().kind) => events.push(self.parse_event()?),
                _ => break,
            }
        }

        if events.is_empty() {
            let t = self.peek();
            return Err(AldaError::syntax(
                format!("expected events after '=' in definition of '{name}'"),
                t.line,
                t.col,
            ));
        }

        Ok(Node::VarDef { name, events, pos })
    }

    // --- Postfix operators ---

    /// `'spec` binds tighter than `*N`, so `c'1-2*3` repeats an
    /// on-repetitions note and plays it on the first two passes.
    fn parse_postfix(&mut self, mut event: Node) -> Result<Node, AldaError> {
        loop {
            let t = self.peek().clone();
            match t.kind {
                TokenKind::Repetitions(spec) => {
                    self.advance();
                    let reps = parse_rep_spec(&spec, t.line, t.col)?;
                    event = Node::OnReps {
                        event: Box::new(event),
                        reps,
                        pos: Position::new(t.line, t.col),
                    };
                }
                TokenKind::Repeat(count) => {
                    self.advance();
                    if count == 0 {
                        return Err(AldaError::syntax(
                            "repeat count must be at least 1",
                            t.line,
                            t.col,
                        ));
                    }
                    event = Node::Repeat {
                        event: Box::new(event),
                        count,
                        pos: Position::new(t.line, t.col),
                    };
                }
                _ => break,
            }
        }
        Ok(event)
    }

    // --- Part declarations ---

    /// Scan ahead without consuming: NAME ("/" NAME)* ALIAS? ":" begins a
    /// part declaration.
    fn is_part_declaration(&self) -> bool {
        if !matches!(self.peek().kind, TokenKind::Name(_)) {
            return false;
        }
        let mut i = self.pos;
        while let Some(t) = self.tokens.get(i) {
            match t.kind {
                TokenKind::Colon => return true,
                TokenKind::Name(_) | TokenKind::Separator | TokenKind::Alias(_) => i += 1,
                _ => return false,
            }
        }
        false
    }

    fn parse_part_decl(&mut self) -> Result<Node, AldaError> {
        let pos = self.peek_pos();
        let mut names = Vec::new();
        let mut alias = None;

        loop {
            let t = self.advance().clone();
            match t.kind {
                TokenKind::Name(name) => names.push(name),
                _ => {
                    return Err(AldaError::syntax(
                        format!("expected an instrument name, got {}", describe(&t)),
                        t.line,
                        t.col,
                    ))
                }
            }
            if matches!(self.peek().kind, TokenKind::Separator) {
                self.advance();
            } else {
                break;
            }
        }

        if let TokenKind::Alias(a) = self.peek().kind.clone() {
            self.advance();
            alias = Some(a);
        }

        if !matches!(self.peek().kind, TokenKind::Colon) {
            let t = self.peek();
            return Err(AldaError::syntax(
                "expected ':' after part declaration",
                t.line,
                t.col,
            ));
        }
        self.advance();

        Ok(Node::PartDecl { names, alias, pos })
    }

    // --- Cursor helpers ---

    fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek_next(&self) -> Option<&Token> {
        self.tokens.get(self.pos + 1)
    }

    fn peek_pos(&self) -> Position {
        let t = self.peek();
        Position::new(t.line, t.col)
    }

    fn advance(&mut self) -> &Token {
        let i = self.pos.min(self.tokens.len() - 1);
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        &self.tokens[i]
    }

    fn is_at_end(&self) -> bool {
        matches!(self.peek().kind, TokenKind::Eof)
    }

    fn skip_newlines(&mut self) {
        while matches!(self.peek().kind, TokenKind::Newline) {
            self.pos += 1;
        }
    }
}

fn starts_event(kind: &TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::NoteLetter(_)
            | TokenKind::RestLetter
            | TokenKind::OctaveSet(_)
            | TokenKind::OctaveUp
            | TokenKind::OctaveDown
            | TokenKind::Barline
            | TokenKind::LeftParen
            | TokenKind::CramOpen
            | TokenKind::BracketOpen
            | TokenKind::Marker(_)
            | TokenKind::AtMarker(_)
            | TokenKind::VoiceMarker(_)
            | TokenKind::Name(_)
    )
}

/// Parse `1-2,4`-style specifier text into ranges.
fn parse_rep_spec(spec: &str, line: usize, col: usize) -> Result<Vec<RepRange>, AldaError> {
    let malformed = || AldaError::syntax(format!("malformed repetition specifier: '{spec}'"), line, col);

    if spec.is_empty() {
        return Err(malformed());
    }

    let mut ranges = Vec::new();
    for piece in spec.split(',') {
        let range = match piece.split_once('-') {
            Some((a, b)) => RepRange {
                first: a.parse().map_err(|_| malformed())?,
                last: Some(b.parse().map_err(|_| malformed())?),
            },
            None => RepRange {
                first: piece.parse().map_err(|_| malformed())?,
                last: None,
            },
        };
        if range.first == 0 || range.last.is_some_and(|l| l < range.first) {
            return Err(malformed());
        }
        ranges.push(range);
    }
    Ok(ranges)
}

fn describe(t: &Token) -> String {
    match &t.kind {
        TokenKind::Eof => "end of input".to_string(),
        TokenKind::Newline => "end of line".to_string(),
        _ => format!("'{}'", t.lexeme),
    }
}
