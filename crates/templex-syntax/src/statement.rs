//! Parse output: statements and their nested items.
//!
//! The parser produces a [`Statement`] per matched template. A statement
//! records which template matched and, in match order, every token it
//! consumed and every sub-statement it recursed into. Whitespace skipped
//! during tokenization never appears here.
//!
//! Statements serialize to JSON for tooling; each item is tagged with its
//! variant:
//!
//! ```json
//! {
//!   "template": "assignment",
//!   "items": [
//!     { "token": { "kind": "iden", "data": "x", "line": 1 } },
//!     { "token": { "kind": "oper", "data": "=", "line": 1 } },
//!     { "statement": { "template": "number-literal", "items": [ ... ] } }
//!   ]
//! }
//! ```

use std::fmt;

use serde::Serialize;

use crate::token::Token;

/// One matched item inside a statement: a consumed token or a nested
/// statement produced by a statement requirement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Node {
    Token(Token),
    Statement(Statement),
}

/// A successful match of one statement template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Statement {
    /// Id of the template that matched.
    #[serde(rename = "template")]
    pub template_id: String,
    /// Consumed tokens and nested statements, in match order.
    pub items: Vec<Node>,
}

impl Statement {
    /// Creates an empty statement for the given template.
    pub fn new(template_id: impl Into<String>) -> Self {
        Self {
            template_id: template_id.into(),
            items: Vec::new(),
        }
    }

    /// Appends a matched item.
    pub fn push(&mut self, node: Node) {
        self.items.push(node);
    }

    /// Total number of tokens in this statement, including nested ones.
    pub fn token_count(&self) -> usize {
        self.items
            .iter()
            .map(|node| match node {
                Node::Token(_) => 1,
                Node::Statement(stmt) => stmt.token_count(),
            })
            .sum()
    }

    /// Line of the first token in this statement, if it has any.
    pub fn line(&self) -> Option<usize> {
        self.items.iter().find_map(|node| match node {
            Node::Token(token) => Some(token.line),
            Node::Statement(stmt) => stmt.line(),
        })
    }
}

/// Compact one-line rendering, e.g.
/// `assignment(iden "x", oper "=", number-literal(numl "5"), term ";")`.
impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.template_id)?;
        for (i, node) in self.items.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            match node {
                Node::Token(token) => match &token.data {
                    Some(data) => write!(f, "{} \"{}\"", token.kind, data)?,
                    None => write!(f, "{}", token.kind)?,
                },
                Node::Statement(stmt) => write!(f, "{}", stmt)?,
            }
        }
        write!(f, ")")
    }
}
