//! Error types shared by every phase of the pipeline.

use std::fmt;

/// An error from scanning, parsing, generation, or SMF handling.
///
/// Carries a 1-based source position and, when the failing phase had the
/// source text at hand, the offending line for caret-style display.
#[derive(Debug, Clone)]
pub struct AldaError {
    pub kind: ErrorKind,
    pub message: String,
    pub line: usize,
    pub col: usize,
    pub filename: Option<String>,
    pub source_line: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Scan,
    Syntax,
    Generate,
    Smf,
}

impl ErrorKind {
    fn label(self) -> &'static str {
        match self {
            ErrorKind::Scan => "Scan error",
            ErrorKind::Syntax => "Syntax error",
            ErrorKind::Generate => "Generation error",
            ErrorKind::Smf => "MIDI file error",
        }
    }
}

impl AldaError {
    pub fn scan(message: impl Into<String>, line: usize, col: usize) -> Self {
        Self::new(ErrorKind::Scan, message, line, col)
    }

    pub fn syntax(message: impl Into<String>, line: usize, col: usize) -> Self {
        Self::new(ErrorKind::Syntax, message, line, col)
    }

    pub fn generate(message: impl Into<String>, line: usize, col: usize) -> Self {
        Self::new(ErrorKind::Generate, message, line, col)
    }

    /// SMF errors have no source position; line 0 means "none".
    pub fn smf(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Smf, message, 0, 0)
    }

    fn new(kind: ErrorKind, message: impl Into<String>, line: usize, col: usize) -> Self {
        Self {
            kind,
            message: message.into(),
            line,
            col,
            filename: None,
            source_line: None,
        }
    }

    /// Attach the source text and filename so `Display` can show the
    /// offending line with a caret. The facade functions call this after
    /// the scanner/parser return, so those stay borrow-free.
    pub fn with_context(mut self, source: &str, filename: Option<&str>) -> Self {
        if self.source_line.is_none() && self.line > 0 {
            self.source_line = extract_line(source, self.line);
        }
        if self.filename.is_none() {
            self.filename = filename.map(str::to_string);
        }
        self
    }
}

/// Pull a single 1-based line out of the source for error display.
pub fn extract_line(source: &str, line: usize) -> Option<String> {
    if line == 0 {
        return None;
    }
    source.lines().nth(line - 1).map(str::to_string)
}

impl fmt::Display for AldaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = &self.filename {
            write!(f, "{name}:")?;
        }
        if self.line > 0 {
            write!(f, "{}:{}: ", self.line, self.col)?;
        }
        write!(f, "{}: {}", self.kind.label(), self.message)?;

        if let (Some(src), true) = (&self.source_line, self.col > 0) {
            write!(f, "\n  {src}\n  ")?;
            for _ in 1..self.col {
                write!(f, " ")?;
            }
            write!(f, "^")?;
        }
        Ok(())
    }
}

impl std::error::Error for AldaError {}
