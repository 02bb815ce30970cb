//! Scanner for Alda source text.
//!
//! Converts source into a stream of [`Token`]s terminated by `Eof`. The
//! scanner has two modes: normal notation, and s-expression mode inside
//! parentheses. A shared paren-depth counter switches between them, so
//! `(tempo 120)` lexes `tempo` as a symbol while `tempo` outside parens
//! would be a plain name.

use super::error::AldaError;
use super::token::{Token, TokenKind};

pub struct Scanner {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    col: usize,
    sexp_depth: i32,
}

impl Scanner {
    pub fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            col: 1,
            sexp_depth: 0,
        }
    }

    pub fn tokenize(&mut self) -> Result<Vec<Token>, AldaError> {
        let mut tokens = Vec::new();
        loop {
            let token = if self.sexp_depth > 0 {
                self.next_lisp_token()?
            } else {
                self.next_normal_token()?
            };
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                break;
            }
        }
        Ok(tokens)
    }

    // --- Cursor helpers ---

    fn is_at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_next(&self) -> Option<char> {
        self.chars.get(self.pos + 1).copied()
    }

    fn advance(&mut self) -> char {
        let ch = self.chars[self.pos];
        self.pos += 1;
        if ch == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        ch
    }

    fn lexeme_from(&self, start: usize) -> String {
        self.chars[start..self.pos].iter().collect()
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek() {
            match ch {
                ' ' | '\t' | '\r' => {
                    self.advance();
                }
                '#' => {
                    // Comment runs to end of line
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                _ => break,
            }
        }
    }

    // --- Normal mode ---

    fn next_normal_token(&mut self) -> Result<Token, AldaError> {
        self.skip_whitespace();

        let (line, col) = (self.line, self.col);
        let start = self.pos;

        if self.is_at_end() {
            return Ok(Token::new(TokenKind::Eof, "", line, col));
        }

        let ch = self.advance();

        if ch == '\n' {
            return Ok(Token::new(TokenKind::Newline, "\n", line, col));
        }

        let single = |kind| Ok(Token::new(kind, ch.to_string(), line, col));

        match ch {
            '+' => return single(TokenKind::Sharp),
            '-' => return single(TokenKind::Flat),
            '_' => return single(TokenKind::Natural),
            '>' => return single(TokenKind::OctaveUp),
            '<' => return single(TokenKind::OctaveDown),
            '.' => return single(TokenKind::Dot),
            '~' => return single(TokenKind::Tie),
            '|' => return single(TokenKind::Barline),
            '/' => return single(TokenKind::Separator),
            ':' => return single(TokenKind::Colon),
            '=' => return single(TokenKind::Equals),
            '{' => return single(TokenKind::CramOpen),
            '}' => return single(TokenKind::CramClose),
            '[' => return single(TokenKind::BracketOpen),
            ']' => return single(TokenKind::BracketClose),
            '(' => {
                self.sexp_depth += 1;
                return single(TokenKind::LeftParen);
            }
            ')' => {
                self.sexp_depth -= 1;
                return single(TokenKind::RightParen);
            }
            _ => {}
        }

        // Rest: 'r' not followed by a letter (so `read` stays a name)
        if ch == 'r' && !self.peek().is_some_and(|c| c.is_alphabetic()) {
            return Ok(Token::new(TokenKind::RestLetter, "r", line, col));
        }

        // Octave set: o4
        if ch == 'o' && self.peek().is_some_and(|c| c.is_ascii_digit()) {
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
            }
            let lexeme = self.lexeme_from(start);
            let octave: i32 = lexeme[1..].parse().map_err(|_| {
                AldaError::scan(format!("invalid octave: {lexeme}"), line, col)
            })?;
            return Ok(Token::new(TokenKind::OctaveSet(octave), lexeme, line, col));
        }

        // Voice marker: V1: (trailing colon optional)
        if ch == 'V' && self.peek().is_some_and(|c| c.is_ascii_digit()) {
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
            }
            let digits: String = self.chars[start + 1..self.pos].iter().collect();
            if self.peek() == Some(':') {
                self.advance();
            }
            let number: u32 = digits.parse().map_err(|_| {
                AldaError::scan(format!("invalid voice number: {digits}"), line, col)
            })?;
            let lexeme = self.lexeme_from(start);
            return Ok(Token::new(TokenKind::VoiceMarker(number), lexeme, line, col));
        }

        // Note letter: a-g not followed by a letter
        if ('a'..='g').contains(&ch) && !self.peek().is_some_and(|c| c.is_alphabetic()) {
            return Ok(Token::new(
                TokenKind::NoteLetter(ch),
                ch.to_string(),
                line,
                col,
            ));
        }

        if ch.is_ascii_digit() {
            return self.scan_length(start, line, col);
        }

        if ch == '%' {
            let name = self.scan_ident_tail();
            let lexeme = self.lexeme_from(start);
            return Ok(Token::new(TokenKind::Marker(name), lexeme, line, col));
        }

        if ch == '@' {
            let name = self.scan_ident_tail();
            let lexeme = self.lexeme_from(start);
            return Ok(Token::new(TokenKind::AtMarker(name), lexeme, line, col));
        }

        if ch == '*' {
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
            }
            let lexeme = self.lexeme_from(start);
            let count: u32 = lexeme[1..]
                .parse()
                .map_err(|_| AldaError::scan("expected count after '*'", line, col))?;
            return Ok(Token::new(TokenKind::Repeat(count), lexeme, line, col));
        }

        if ch == '\'' {
            while self
                .peek()
                .is_some_and(|c| c.is_ascii_digit() || c == ',' || c == '-')
            {
                self.advance();
            }
            let lexeme = self.lexeme_from(start);
            let spec = lexeme[1..].to_string();
            return Ok(Token::new(TokenKind::Repetitions(spec), lexeme, line, col));
        }

        if ch == '"' {
            return self.scan_alias(start, line, col);
        }

        if ch.is_alphabetic() || ch == '_' {
            let _ = self.scan_ident_tail();
            let lexeme = self.lexeme_from(start);
            return Ok(Token::new(TokenKind::Name(lexeme.clone()), lexeme, line, col));
        }

        Err(AldaError::scan(
            format!("unexpected character: '{ch}'"),
            line,
            col,
        ))
    }

    /// Consume identifier-tail characters and return what was consumed
    /// (not including anything before the current position).
    fn scan_ident_tail(&mut self) -> String {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_alphanumeric() || c == '_' || c == '-')
        {
            self.advance();
        }
        self.chars[start..self.pos].iter().collect()
    }

    /// Digits already begun; decide between plain length, `ms`, and `s`.
    fn scan_length(&mut self, start: usize, line: usize, col: usize) -> Result<Token, AldaError> {
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }
        let digits = self.lexeme_from(start);

        if self.peek() == Some('m') && self.peek_next() == Some('s') {
            self.advance();
            self.advance();
            let ms: u32 = digits
                .parse()
                .map_err(|_| AldaError::scan(format!("invalid duration: {digits}ms"), line, col))?;
            let lexeme = self.lexeme_from(start);
            return Ok(Token::new(TokenKind::NoteLengthMs(ms), lexeme, line, col));
        }

        if self.peek() == Some('s') && !self.peek_next().is_some_and(|c| c.is_alphabetic()) {
            self.advance();
            let seconds: f64 = digits
                .parse()
                .map_err(|_| AldaError::scan(format!("invalid duration: {digits}s"), line, col))?;
            let lexeme = self.lexeme_from(start);
            return Ok(Token::new(TokenKind::NoteLengthS(seconds), lexeme, line, col));
        }

        let denom: u32 = digits
            .parse()
            .map_err(|_| AldaError::scan(format!("invalid note length: {digits}"), line, col))?;
        Ok(Token::new(TokenKind::NoteLength(denom), digits, line, col))
    }

    /// Opening quote already consumed.
    fn scan_alias(&mut self, start: usize, line: usize, col: usize) -> Result<Token, AldaError> {
        while let Some(ch) = self.peek() {
            if ch == '"' {
                break;
            }
            self.advance();
        }
        if self.is_at_end() {
            return Err(AldaError::scan("unterminated string", line, col));
        }
        self.advance(); // closing quote
        let lexeme = self.lexeme_from(start);
        let value = lexeme[1..lexeme.len() - 1].to_string();
        Ok(Token::new(TokenKind::Alias(value), lexeme, line, col))
    }

    // --- Lisp mode ---

    fn next_lisp_token(&mut self) -> Result<Token, AldaError> {
        self.skip_whitespace();

        let (line, col) = (self.line, self.col);
        let start = self.pos;

        if self.is_at_end() {
            return Ok(Token::new(TokenKind::Eof, "", line, col));
        }

        let ch = self.advance();

        if ch == '\n' {
            return Ok(Token::new(TokenKind::Newline, "\n", line, col));
        }

        if ch == '(' {
            self.sexp_depth += 1;
            return Ok(Token::new(TokenKind::LeftParen, "(", line, col));
        }
        if ch == ')' {
            self.sexp_depth -= 1;
            return Ok(Token::new(TokenKind::RightParen, ")", line, col));
        }

        if ch == '"' {
            return self.scan_lisp_string(start, line, col);
        }

        if ch.is_ascii_digit() || (ch == '-' && self.peek().is_some_and(|c| c.is_ascii_digit())) {
            let mut has_dot = false;
            while let Some(c) = self.peek() {
                if c.is_ascii_digit() {
                    self.advance();
                } else if c == '.' && !has_dot {
                    has_dot = true;
                    self.advance();
                } else {
                    break;
                }
            }
            let lexeme = self.lexeme_from(start);
            let value: f64 = lexeme
                .parse()
                .map_err(|_| AldaError::scan(format!("invalid number: {lexeme}"), line, col))?;
            return Ok(Token::new(TokenKind::Number(value), lexeme, line, col));
        }

        if is_symbol_char(ch) {
            while self.peek().is_some_and(is_symbol_char) {
                self.advance();
            }
            let lexeme = self.lexeme_from(start);
            return Ok(Token::new(
                TokenKind::Symbol(lexeme.clone()),
                lexeme,
                line,
                col,
            ));
        }

        Err(AldaError::scan(
            format!("unexpected character in s-expression: '{ch}'"),
            line,
            col,
        ))
    }

    /// Opening quote already consumed; backslash escapes the next char.
    fn scan_lisp_string(
        &mut self,
        start: usize,
        line: usize,
        col: usize,
    ) -> Result<Token, AldaError> {
        let mut value = String::new();
        while let Some(ch) = self.peek() {
            if ch == '"' {
                break;
            }
            if ch == '\\' && self.peek_next().is_some() {
                self.advance();
                value.push(self.advance());
                continue;
            }
            value.push(self.advance());
        }
        if self.is_at_end() {
            return Err(AldaError::scan("unterminated string", line, col));
        }
        self.advance(); // closing quote
        let lexeme = self.lexeme_from(start);
        Ok(Token::new(TokenKind::LispString(value), lexeme, line, col))
    }
}

fn is_symbol_char(c: char) -> bool {
    c.is_alphanumeric()
        || matches!(
            c,
            '!' | '?' | '+' | '-' | '*' | '/' | '_' | '<' | '>' | '=' | '.' | ':'
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Scanner::new(source)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn scan_notes() {
        assert_eq!(
            kinds("c d e"),
            vec![
                TokenKind::NoteLetter('c'),
                TokenKind::NoteLetter('d'),
                TokenKind::NoteLetter('e'),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn scan_note_with_accidentals_and_length() {
        assert_eq!(
            kinds("c+4."),
            vec![
                TokenKind::NoteLetter('c'),
                TokenKind::Sharp,
                TokenKind::NoteLength(4),
                TokenKind::Dot,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn letter_followed_by_letter_is_a_name() {
        assert_eq!(
            kinds("cello"),
            vec![TokenKind::Name("cello".into()), TokenKind::Eof]
        );
        // `r` inside `read` stays part of the name
        assert_eq!(
            kinds("read"),
            vec![TokenKind::Name("read".into()), TokenKind::Eof]
        );
    }

    #[test]
    fn scan_rest() {
        assert_eq!(
            kinds("r4"),
            vec![TokenKind::RestLetter, TokenKind::NoteLength(4), TokenKind::Eof]
        );
        assert_eq!(kinds("r"), vec![TokenKind::RestLetter, TokenKind::Eof]);
    }

    #[test]
    fn scan_octave_tokens() {
        assert_eq!(
            kinds("o4 > <"),
            vec![
                TokenKind::OctaveSet(4),
                TokenKind::OctaveUp,
                TokenKind::OctaveDown,
                TokenKind::Eof,
            ]
        );
        // `o` followed by a letter is a name (oboe)
        assert_eq!(
            kinds("oboe"),
            vec![TokenKind::Name("oboe".into()), TokenKind::Eof]
        );
    }

    #[test]
    fn scan_ms_and_seconds_lengths() {
        assert_eq!(
            kinds("500ms 2s"),
            vec![
                TokenKind::NoteLengthMs(500),
                TokenKind::NoteLengthS(2.0),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn seconds_suffix_not_taken_from_names() {
        // `4sax` is length 4 followed by the name `sax`, not `4s` + `ax`
        assert_eq!(
            kinds("4sax"),
            vec![
                TokenKind::NoteLength(4),
                TokenKind::Name("sax".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn scan_part_declaration() {
        assert_eq!(
            kinds("piano \"lead\":"),
            vec![
                TokenKind::Name("piano".into()),
                TokenKind::Alias("lead".into()),
                TokenKind::Colon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn scan_voice_markers() {
        assert_eq!(
            kinds("V1: V0:"),
            vec![
                TokenKind::VoiceMarker(1),
                TokenKind::VoiceMarker(0),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn scan_markers() {
        assert_eq!(
            kinds("%chorus @chorus"),
            vec![
                TokenKind::Marker("chorus".into()),
                TokenKind::AtMarker("chorus".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn scan_repeat_and_repetitions() {
        assert_eq!(
            kinds("*3 '1-2,4"),
            vec![
                TokenKind::Repeat(3),
                TokenKind::Repetitions("1-2,4".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn scan_brackets_and_crams() {
        assert_eq!(
            kinds("{ c } [ d ]"),
            vec![
                TokenKind::CramOpen,
                TokenKind::NoteLetter('c'),
                TokenKind::CramClose,
                TokenKind::BracketOpen,
                TokenKind::NoteLetter('d'),
                TokenKind::BracketClose,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lisp_mode_inside_parens() {
        assert_eq!(
            kinds("(tempo 120)"),
            vec![
                TokenKind::LeftParen,
                TokenKind::Symbol("tempo".into()),
                TokenKind::Number(120.0),
                TokenKind::RightParen,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lisp_mode_negative_and_fractional_numbers() {
        assert_eq!(
            kinds("(transpose -2.5)"),
            vec![
                TokenKind::LeftParen,
                TokenKind::Symbol("transpose".into()),
                TokenKind::Number(-2.5),
                TokenKind::RightParen,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lisp_mode_ends_at_matching_paren() {
        // After `)`, `c` lexes as a note letter again
        assert_eq!(
            kinds("(quant 90) c"),
            vec![
                TokenKind::LeftParen,
                TokenKind::Symbol("quant".into()),
                TokenKind::Number(90.0),
                TokenKind::RightParen,
                TokenKind::NoteLetter('c'),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn nested_sexp_depth() {
        assert_eq!(
            kinds("(key-signature (quote (a major)))"),
            vec![
                TokenKind::LeftParen,
                TokenKind::Symbol("key-signature".into()),
                TokenKind::LeftParen,
                TokenKind::Symbol("quote".into()),
                TokenKind::LeftParen,
                TokenKind::Symbol("a".into()),
                TokenKind::Symbol("major".into()),
                TokenKind::RightParen,
                TokenKind::RightParen,
                TokenKind::RightParen,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lisp_string_with_escape() {
        let tokens = Scanner::new(r#"(key-signature "f+ \"x\"")"#)
            .tokenize()
            .unwrap();
        assert_eq!(tokens[2].kind, TokenKind::LispString("f+ \"x\"".into()));
    }

    #[test]
    fn comments_are_skipped() {
        assert_eq!(
            kinds("c # a comment\nd"),
            vec![
                TokenKind::NoteLetter('c'),
                TokenKind::Newline,
                TokenKind::NoteLetter('d'),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn positions_track_lines_and_columns() {
        let tokens = Scanner::new("c d\n  e").tokenize().unwrap();
        assert_eq!((tokens[0].line, tokens[0].col), (1, 1));
        assert_eq!((tokens[1].line, tokens[1].col), (1, 3));
        // newline token
        assert_eq!(tokens[2].kind, TokenKind::Newline);
        assert_eq!((tokens[3].line, tokens[3].col), (2, 3));
    }

    #[test]
    fn unterminated_alias_is_an_error() {
        let err = Scanner::new("piano \"lead").tokenize().unwrap_err();
        assert!(err.message.contains("unterminated"));
        assert_eq!(err.col, 7);
    }

    #[test]
    fn unexpected_character_is_an_error() {
        let err = Scanner::new("c $ d").tokenize().unwrap_err();
        assert!(err.message.contains("unexpected character"));
        assert_eq!((err.line, err.col), (1, 3));
    }

    #[test]
    fn empty_input_yields_eof() {
        assert_eq!(kinds(""), vec![TokenKind::Eof]);
    }

    #[test]
    fn tie_and_barline_and_separator() {
        assert_eq!(
            kinds("c1~1 | c/e"),
            vec![
                TokenKind::NoteLetter('c'),
                TokenKind::NoteLength(1),
                TokenKind::Tie,
                TokenKind::NoteLength(1),
                TokenKind::Barline,
                TokenKind::NoteLetter('c'),
                TokenKind::Separator,
                TokenKind::NoteLetter('e'),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn variable_definition_tokens() {
        assert_eq!(
            kinds("theme = c d e"),
            vec![
                TokenKind::Name("theme".into()),
                TokenKind::Equals,
                TokenKind::NoteLetter('c'),
                TokenKind::NoteLetter('d'),
                TokenKind::NoteLetter('e'),
                TokenKind::Eof,
            ]
        );
    }
}
