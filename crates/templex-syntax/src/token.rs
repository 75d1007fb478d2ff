//! Token definitions for the templex scanning and parsing pipeline.
//!
//! Unlike a fixed-language lexer, templex does not know the token vocabulary
//! ahead of time: a token's kind is simply the name of the scanner pass that
//! recognized it. Grammars and scanners agree on kind names by convention,
//! and the constants on [`Token`] cover the standard set used by the bundled
//! passes.
//!
//! # Standard kinds
//!
//! - [`Token::IDENTIFIER`] (`"iden"`): identifier runs (`foo`, `my_var`)
//! - [`Token::NUMBER_LITERAL`] (`"numl"`): digit runs (`42`, `007`)
//! - [`Token::STRING_LITERAL`] (`"strl"`): quoted literals including quotes
//! - [`Token::OPERATOR`] (`"oper"`): single operator characters (`+`, `=`)
//! - [`Token::TERMINATOR`] (`"term"`): statement punctuation (`;`, `,`)
//! - [`Token::WHITESPACE`] (`"whsp"`): space/newline runs
//! - [`Token::EOF`] (`"eof"`): end of input, carries no data
//! - [`Token::ERROR`] (`"error"`): scan failure, data holds the diagnostic
//!
//! # Examples
//!
//! ```rust
//! use templex_syntax::Token;
//!
//! let ident = Token::with_data(Token::IDENTIFIER, "count", 1);
//! assert!(ident.is(Some(Token::IDENTIFIER), None));
//! assert!(ident.is(Some(Token::IDENTIFIER), Some("count")));
//! assert!(!ident.is(None, Some("total")));
//! ```

use serde::Serialize;

/// One lexical unit produced by a scanner pass.
///
/// Tokens are immutable once constructed: the scanner stamps kind, matched
/// text, and source line at creation and nothing mutates them afterwards.
/// This keeps checkpoint/rollback reasoning in the parser trivial: rolling a
/// cursor back can never observe a half-updated token.
///
/// # Fields
///
/// - `kind`: name of the pass that matched (open vocabulary)
/// - `data`: the exact consumed substring; `None` only for pure end-of-file
/// - `line`: 1-based source line at the start of the match
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    /// Kind tag; equals the registered name of the producing pass.
    pub kind: String,

    /// Exact matched substring. `None` only for the end-of-file token; error
    /// tokens carry their diagnostic message here.
    pub data: Option<String>,

    /// Line number at match start (1-based).
    pub line: usize,
}

impl Token {
    /// Standard whitespace kind.
    pub const WHITESPACE: &'static str = "whsp";
    /// Standard end-of-file kind.
    pub const EOF: &'static str = "eof";
    /// Standard identifier kind.
    pub const IDENTIFIER: &'static str = "iden";
    /// Standard number literal kind.
    pub const NUMBER_LITERAL: &'static str = "numl";
    /// Standard string literal kind.
    pub const STRING_LITERAL: &'static str = "strl";
    /// Standard statement terminator kind.
    pub const TERMINATOR: &'static str = "term";
    /// Standard operator kind.
    pub const OPERATOR: &'static str = "oper";
    /// Kind reserved for scan failures; never a valid pass name.
    pub const ERROR: &'static str = "error";

    /// Creates a token with no matched data.
    pub fn new(kind: impl Into<String>, line: usize) -> Self {
        Self {
            kind: kind.into(),
            data: None,
            line,
        }
    }

    /// Creates a token carrying its matched substring.
    ///
    /// This is the normal constructor for every pass-produced token.
    pub fn with_data(kind: impl Into<String>, data: impl Into<String>, line: usize) -> Self {
        Self {
            kind: kind.into(),
            data: Some(data.into()),
            line,
        }
    }

    /// Creates the end-of-file token for the given line.
    pub fn eof(line: usize) -> Self {
        Self::new(Token::EOF, line)
    }

    /// Tests the token against optional kind/data constraints.
    ///
    /// An absent constraint is a wildcard, so `is(None, None)` is true for
    /// every token. This is the primitive the parser uses to evaluate token
    /// requirements.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use templex_syntax::Token;
    ///
    /// let eq = Token::with_data(Token::OPERATOR, "=", 3);
    /// assert!(eq.is(Some(Token::OPERATOR), Some("=")));
    /// assert!(eq.is(None, Some("=")));
    /// assert!(!eq.is(Some(Token::OPERATOR), Some("+")));
    /// ```
    pub fn is(&self, kind: Option<&str>, data: Option<&str>) -> bool {
        if let Some(k) = kind {
            if self.kind != k {
                return false;
            }
        }
        if let Some(d) = data {
            if self.data.as_deref() != Some(d) {
                return false;
            }
        }
        true
    }

    /// True for tokens produced by a failed scan step.
    pub fn is_error(&self) -> bool {
        self.kind == Token::ERROR
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wildcard_constraints_match_everything() {
        let t = Token::with_data(Token::IDENTIFIER, "x", 1);
        assert!(t.is(None, None));
        assert!(t.is(Some(Token::IDENTIFIER), None));
        assert!(t.is(None, Some("x")));
    }

    #[test]
    fn test_kind_and_data_constraints_are_exact() {
        let t = Token::with_data(Token::OPERATOR, "=", 2);
        assert!(t.is(Some(Token::OPERATOR), Some("=")));
        assert!(!t.is(Some(Token::TERMINATOR), Some("=")));
        assert!(!t.is(Some(Token::OPERATOR), Some("==")));
    }

    #[test]
    fn test_data_constraint_fails_against_missing_data() {
        let t = Token::eof(4);
        assert!(t.is(Some(Token::EOF), None));
        assert!(!t.is(None, Some("")));
    }

    #[test]
    fn test_error_tokens_are_recognizable() {
        let t = Token::with_data(Token::ERROR, "\"@#$...\" could not be parsed at line 1 char 1", 1);
        assert!(t.is_error());
        assert!(!Token::eof(1).is_error());
    }
}
