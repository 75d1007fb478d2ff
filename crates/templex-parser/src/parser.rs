//! Template-driven backtracking parser.
//!
//! The parser walks the token stream trying the language's statement
//! templates in declaration order. A template matches when every one of its
//! requirements matches in sequence; a requirement that fails rolls the
//! cursor back to where the template started and the next candidate is
//! tried. The first template to satisfy wins, so declaration order decides
//! between overlapping templates and parsing is fully deterministic.
//!
//! Statement requirements recurse. Two guards keep recursive grammars from
//! running away:
//!
//! - re-entering a template at the same offset it is already being tried at
//!   (left recursion, direct or indirect) stops with a `GrammarCycle` error
//!   naming the template;
//! - nesting deeper than the configured limit stops with a `Parse` error
//!   instead of exhausting the call stack.
//!
//! Mismatches are soft and drive backtracking; guard trips, cursor misuse,
//! and unknown template ids are hard errors that abort the parse. After a
//! hard error the parser's position is unspecified; build a fresh parser to
//! retry.

use std::collections::HashSet;

use templex_syntax::error::{error, Error, ErrorKind, Result};
use templex_syntax::grammar::{Language, Repeat, RequirementKind, StatementTemplate};
use templex_syntax::statement::{Node, Statement};
use templex_syntax::token::Token;

use crate::cursor::Cursor;

const DEFAULT_MAX_DEPTH: usize = 128;

/// One failed requirement, kept for the top-level diagnostic.
#[derive(Debug, Clone)]
struct Attempt {
    template_id: String,
    requirement: usize,
    offset: usize,
    reason: String,
}

/// Matches a token stream against a [`Language`].
pub struct Parser<'l> {
    language: &'l Language,
    cursor: Cursor<Token>,
    active: HashSet<(usize, usize)>,
    depth: usize,
    max_depth: usize,
    attempts: Vec<Attempt>,
}

impl<'l> Parser<'l> {
    /// Creates a parser for one token stream.
    pub fn new(language: &'l Language, tokens: &[Token]) -> Self {
        Self {
            language,
            cursor: Cursor::new(tokens),
            active: HashSet::new(),
            depth: 0,
            max_depth: DEFAULT_MAX_DEPTH,
            attempts: Vec::new(),
        }
    }

    /// Overrides the statement nesting limit.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Current position in the token stream.
    pub fn offset(&self) -> usize {
        self.cursor.offset()
    }

    /// Parses the whole stream into top-level statements.
    ///
    /// Every token must be accounted for: a position where no non-abstract
    /// template matches fails with a diagnostic listing what was tried and
    /// why each attempt stopped.
    pub fn parse(&mut self) -> Result<Vec<Statement>> {
        let mut statements = Vec::new();
        while self.cursor.has_next() {
            self.attempts.clear();
            let before = self.cursor.offset();
            match self.match_statement(None)? {
                Some(statement) => {
                    if self.cursor.offset() == before {
                        // An empty match at top level would loop forever.
                        return error(
                            ErrorKind::GrammarCycle,
                            format!(
                                "template \"{}\" matched without consuming any input",
                                statement.template_id
                            ),
                        );
                    }
                    statements.push(statement);
                }
                None => return Err(self.no_match_error()),
            }
        }
        Ok(statements)
    }

    /// Matches a single statement at the current position.
    ///
    /// With an id, only that template is tried (this is how abstract
    /// templates are reached). Without one, every non-abstract template is
    /// tried in declaration order. `Ok(None)` means no candidate matched
    /// and the cursor is back where it started.
    pub fn match_statement(&mut self, required_id: Option<&str>) -> Result<Option<Statement>> {
        if self.depth >= self.max_depth {
            return error(
                ErrorKind::Parse,
                format!("statement nesting exceeded {} levels", self.max_depth),
            );
        }

        let language = self.language;
        let candidates: Vec<usize> = match required_id {
            Some(id) => match language.template_index(id) {
                Some(index) => vec![index],
                None => {
                    return error(
                        ErrorKind::UnresolvedReference,
                        format!("unknown statement template \"{}\"", id),
                    )
                }
            },
            None => language
                .templates()
                .iter()
                .enumerate()
                .filter(|(_, template)| !template.is_abstract())
                .map(|(index, _)| index)
                .collect(),
        };

        self.depth += 1;
        let result = self.try_candidates(&candidates);
        self.depth -= 1;
        result
    }

    fn try_candidates(&mut self, candidates: &[usize]) -> Result<Option<Statement>> {
        for &index in candidates {
            let key = (index, self.cursor.offset());
            if self.active.contains(&key) {
                let template = &self.language.templates()[index];
                return error(
                    ErrorKind::GrammarCycle,
                    format!(
                        "template \"{}\" recursed into itself without consuming input at offset {}",
                        template.id(),
                        key.1
                    ),
                );
            }

            self.active.insert(key);
            self.cursor.save();
            let outcome = self.try_template(index);
            self.active.remove(&key);

            match outcome? {
                Some(statement) => {
                    self.cursor.commit()?;
                    return Ok(Some(statement));
                }
                None => self.cursor.restore()?,
            }
        }
        Ok(None)
    }

    fn try_template(&mut self, index: usize) -> Result<Option<Statement>> {
        let language = self.language;
        let template = &language.templates()[index];

        let mut statement = Statement::new(template.id());
        for (req_index, requirement) in template.requirements().iter().enumerate() {
            let met = match requirement.repeat {
                Repeat::Exactly(count) => {
                    let mut all = true;
                    for _ in 0..count {
                        if !self.meet_once(template, req_index, &requirement.kind, &mut statement)? {
                            all = false;
                            break;
                        }
                    }
                    all
                }
                Repeat::ZeroOrMore => {
                    loop {
                        let before = self.cursor.offset();
                        self.cursor.save();
                        if self.meet_once(template, req_index, &requirement.kind, &mut statement)? {
                            self.cursor.commit()?;
                            // A zero-width match would repeat forever.
                            if self.cursor.offset() == before {
                                break;
                            }
                        } else {
                            self.cursor.restore()?;
                            break;
                        }
                    }
                    true
                }
            };
            if !met {
                return Ok(None);
            }
        }
        Ok(Some(statement))
    }

    fn meet_once(
        &mut self,
        template: &StatementTemplate,
        req_index: usize,
        kind: &RequirementKind,
        out: &mut Statement,
    ) -> Result<bool> {
        match kind {
            RequirementKind::Token {
                token_type,
                token_data,
            } => {
                let matched = match self.cursor.peek() {
                    Some(token) => token.is(token_type.as_deref(), token_data.as_deref()),
                    None => false,
                };
                if matched {
                    let token = self.cursor.next()?;
                    out.push(Node::Token(token));
                    Ok(true)
                } else {
                    let found = match self.cursor.peek() {
                        Some(token) => describe_token(token),
                        None => String::from("end of input"),
                    };
                    let reason = format!(
                        "expected token {}, found {}",
                        describe_constraint(token_type.as_deref(), token_data.as_deref()),
                        found
                    );
                    self.record_attempt(template, req_index, reason);
                    Ok(false)
                }
            }
            RequirementKind::Statement { statement_id } => {
                match self.match_statement(statement_id.as_deref())? {
                    Some(statement) => {
                        out.push(Node::Statement(statement));
                        Ok(true)
                    }
                    None => {
                        let reason = match statement_id {
                            Some(id) => format!("statement \"{}\" did not match", id),
                            None => String::from("no statement template matched here"),
                        };
                        self.record_attempt(template, req_index, reason);
                        Ok(false)
                    }
                }
            }
        }
    }

    fn record_attempt(&mut self, template: &StatementTemplate, req_index: usize, reason: String) {
        self.attempts.push(Attempt {
            template_id: template.id().to_string(),
            requirement: req_index + 1,
            offset: self.cursor.offset(),
            reason,
        });
    }

    fn no_match_error(&self) -> Error {
        let mut msg = match self.cursor.peek() {
            Some(token) => format!(
                "no statement template matches {} at offset {}",
                describe_token(token),
                self.cursor.offset()
            ),
            None => format!(
                "no statement template matches at end of input (offset {})",
                self.cursor.offset()
            ),
        };
        for attempt in &self.attempts {
            msg.push_str(&format!(
                "\n  template \"{}\" requirement {} at offset {}: {}",
                attempt.template_id, attempt.requirement, attempt.offset, attempt.reason
            ));
        }
        match self.cursor.peek() {
            Some(token) => Error::at_line(ErrorKind::Parse, msg, token.line),
            None => Error::new(ErrorKind::Parse, msg),
        }
    }
}

fn describe_token(token: &Token) -> String {
    match &token.data {
        Some(data) => format!("{} \"{}\"", token.kind, data),
        None => token.kind.clone(),
    }
}

fn describe_constraint(token_type: Option<&str>, token_data: Option<&str>) -> String {
    match (token_type, token_data) {
        (Some(t), Some(d)) => format!("{} \"{}\"", t, d),
        (Some(t), None) => t.to_string(),
        (None, Some(d)) => format!("any kind \"{}\"", d),
        (None, None) => String::from("any token"),
    }
}
