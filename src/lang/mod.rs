//! The Alda language front end — scanner, parser, AST, diagnostics.

pub mod ast;
pub mod error;
pub mod parser;
pub mod scanner;
pub mod token;
pub mod unparse;

pub use ast::{Node, Position, RepRange};
pub use error::{AldaError, ErrorKind};
pub use token::{Token, TokenKind};

use parser::Parser;
use scanner::Scanner;

/// Scan Alda source into tokens (terminated by `Eof`).
///
/// On failure the error carries the offending source line and filename for
/// caret-style display.
pub fn scan(source: &str, filename: Option<&str>) -> Result<Vec<Token>, AldaError> {
    Scanner::new(source)
        .tokenize()
        .map_err(|e| e.with_context(source, filename))
}

/// Parse Alda source into an AST rooted at [`Node::Root`].
pub fn parse(source: &str, filename: Option<&str>) -> Result<Node, AldaError> {
    let tokens = scan(source, filename)?;
    Parser::new(tokens)
        .parse()
        .map_err(|e| e.with_context(source, filename))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_attaches_context_on_error() {
        let err = scan("c $ d", Some("bad.alda")).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Scan);
        assert_eq!(err.filename.as_deref(), Some("bad.alda"));
        assert_eq!(err.source_line.as_deref(), Some("c $ d"));
    }

    #[test]
    fn parse_attaches_context_on_error() {
        let err = parse("piano: {c d", None).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Syntax);
        assert_eq!(err.source_line.as_deref(), Some("piano: {c d"));
        let display = err.to_string();
        assert!(display.contains('^'), "display: {display}");
    }

    #[test]
    fn parse_ok_for_valid_source() {
        let root = parse("piano: c d e", Some("song.alda")).unwrap();
        assert!(matches!(root, Node::Root { .. }));
    }
}
