//! Scanner core: an ordered registry of named recognition passes driven
//! over a character buffer.
//!
//! Each pass inspects the buffer at the current offset and reports how many
//! characters it would consume. Passes are tried in registration order and
//! the first match wins, so registration order is part of a scanner's
//! definition: a pass whose character class overlaps a later one shadows it
//! for the shared prefix.

use templex_syntax::error::{error, ErrorKind, Result};
use templex_syntax::token::Token;

/// What a pass reports about the buffer at one offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassOutcome {
    /// True if the pass recognized a token here.
    pub matched: bool,
    /// Characters consumed on a match (0 on a miss).
    pub chars: usize,
    /// Newlines inside the consumed text; the scanner advances its line
    /// counter by this much.
    pub lines: usize,
    /// A diagnostic from the pass itself. A plain miss leaves this unset;
    /// setting it stops the scan with an error token instead of letting
    /// later passes run.
    pub error: Option<String>,
}

impl PassOutcome {
    /// The pass did not recognize the input; try the next pass.
    pub fn miss() -> Self {
        Self {
            matched: false,
            chars: 0,
            lines: 0,
            error: None,
        }
    }

    /// The pass matched `chars` characters on a single line.
    pub fn hit(chars: usize) -> Self {
        Self {
            matched: true,
            chars,
            lines: 0,
            error: None,
        }
    }

    /// The pass matched `chars` characters spanning `lines` newlines.
    pub fn hit_lines(chars: usize, lines: usize) -> Self {
        Self {
            matched: true,
            chars,
            lines,
            error: None,
        }
    }

    /// The pass recognized its shape but the input is invalid; scanning
    /// cannot continue past this point.
    pub fn fail(msg: impl Into<String>) -> Self {
        Self {
            matched: false,
            chars: 0,
            lines: 0,
            error: Some(msg.into()),
        }
    }
}

/// A single recognition pass: a pure function of the buffer and an offset.
pub type Pass = Box<dyn Fn(&[char], usize) -> PassOutcome>;

/// Multi-pass scanner over a character buffer.
///
/// Feed it input with [`Scanner::set_data`], then pull tokens with
/// [`Scanner::next`] until [`Scanner::available`] hits zero. `next` never
/// fails: bad input comes back as a token of kind [`Token::ERROR`] whose
/// data describes the problem, and the end of input as [`Token::EOF`].
pub struct Scanner {
    passes: Vec<(String, Pass)>,
    data: Vec<char>,
    offset: usize,
    line: usize,
    col: usize,
}

impl Scanner {
    /// Creates a scanner with no passes and no data.
    pub fn new() -> Self {
        Self {
            passes: Vec::new(),
            data: Vec::new(),
            offset: 0,
            line: 1,
            col: 1,
        }
    }

    /// Registers a pass under a unique name; the name becomes the kind of
    /// every token the pass produces.
    ///
    /// Fails if the name is taken. The same callback may be registered
    /// again under a different name.
    pub fn add_pass(
        &mut self,
        name: impl Into<String>,
        pass: impl Fn(&[char], usize) -> PassOutcome + 'static,
    ) -> Result<()> {
        let name = name.into();
        if self.has_pass(&name) {
            return error(
                ErrorKind::DuplicatePass,
                format!(
                    "pass \"{}\" is already added, use set_pass to override it",
                    name
                ),
            );
        }
        self.set_pass(name, pass);
        Ok(())
    }

    /// Registers a pass, replacing any existing pass with the same name in
    /// place (its position in the trial order is kept).
    pub fn set_pass(
        &mut self,
        name: impl Into<String>,
        pass: impl Fn(&[char], usize) -> PassOutcome + 'static,
    ) {
        let name = name.into();
        let boxed: Pass = Box::new(pass);
        match self.passes.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = boxed,
            None => self.passes.push((name, boxed)),
        }
    }

    /// True if a pass with this name is registered.
    pub fn has_pass(&self, name: &str) -> bool {
        self.passes.iter().any(|(n, _)| n == name)
    }

    /// Unregisters a pass; fails if no pass has this name.
    pub fn remove_pass(&mut self, name: &str) -> Result<()> {
        match self.passes.iter().position(|(n, _)| n == name) {
            Some(i) => {
                self.passes.remove(i);
                Ok(())
            }
            None => error(
                ErrorKind::UnknownPass,
                format!("cannot remove pass \"{}\" as it isn't added", name),
            ),
        }
    }

    /// Registered pass names in trial order.
    pub fn pass_names(&self) -> impl Iterator<Item = &str> {
        self.passes.iter().map(|(n, _)| n.as_str())
    }

    /// Replaces the buffer. Position counters are kept; call
    /// [`Scanner::reset`] when switching to an unrelated input.
    pub fn set_data(&mut self, data: &str) {
        self.data = data.chars().collect();
    }

    /// Rewinds to the start of the buffer.
    pub fn reset(&mut self) {
        self.offset = 0;
        self.line = 1;
        self.col = 1;
    }

    /// True once a non-empty buffer is loaded.
    pub fn has_data(&self) -> bool {
        !self.data.is_empty()
    }

    /// Characters left to scan.
    pub fn available(&self) -> usize {
        self.data.len() - self.offset.min(self.data.len())
    }

    /// Current offset into the buffer.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Current line, 1-based.
    pub fn line(&self) -> usize {
        self.line
    }

    /// Current column, 1-based.
    pub fn col(&self) -> usize {
        self.col
    }

    /// Scans the next token.
    ///
    /// With nothing left to read this returns an EOF token. When no pass
    /// matches (or a pass reports a failure) it returns an error token and
    /// consumes nothing; the caller decides whether to stop.
    pub fn next(&mut self) -> Token {
        if self.available() == 0 {
            return Token::eof(self.line);
        }

        let mut winner: Option<(String, PassOutcome)> = None;
        for (name, pass) in &self.passes {
            let outcome = pass(&self.data, self.offset);
            // A zero-width match can never make progress; treat it as a miss.
            if outcome.error.is_some() || (outcome.matched && outcome.chars > 0) {
                winner = Some((name.clone(), outcome));
                break;
            }
        }

        match winner {
            Some((
                _,
                PassOutcome {
                    error: Some(msg), ..
                },
            )) => self.error_token(msg),
            Some((name, outcome)) => {
                let start_line = self.line;
                let end = (self.offset + outcome.chars).min(self.data.len());
                let consumed = &self.data[self.offset..end];
                let count = consumed.len();
                let tail = consumed.iter().rev().take_while(|&&c| c != '\n').count();
                let crossed_line = tail < count;
                let text: String = consumed.iter().collect();

                self.offset = end;
                self.line += outcome.lines;
                self.col = if crossed_line { tail + 1 } else { self.col + count };
                Token::with_data(name, text, start_line)
            }
            None => {
                let end = (self.offset + 6).min(self.data.len());
                let excerpt: String = self.data[self.offset..end].iter().collect();
                self.error_token(format!("\"{}...\" could not be parsed", excerpt))
            }
        }
    }

    fn error_token(&self, msg: String) -> Token {
        Token::with_data(
            Token::ERROR,
            format!("{} at line {} char {}", msg, self.line, self.col),
            self.line,
        )
    }
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new()
    }
}
