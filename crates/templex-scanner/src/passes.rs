//! The standard pass set: numbers, identifiers, strings, operators,
//! brackets, parentheses, terminators, whitespace.
//!
//! Character classes are deliberately small. Operators are the single
//! characters `- + / * % =`; terminators are `: ; . ,`; whitespace is the
//! space and the newline only. Together the classes cover a C-like surface
//! syntax; anything outside them scans to an error token.
//!
//! Digits belong to both the number class and the identifier class, so
//! [`standard_scanner`] registers `numl` ahead of `iden`; swapping them
//! would turn every number into an identifier.

use templex_syntax::token::Token;

use crate::scanner::{PassOutcome, Scanner};

/// Token kind produced by the [`bracket`] pass.
pub const BRACKET: &str = "brak";
/// Token kind produced by the [`parenthesis`] pass.
pub const PARENTHESIS: &str = "pare";

const NUMBERS: &str = "0123456789";
const IDENT_CHARS: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ_0123456789";
const OPERATORS: &str = "-+/*%=";
const TERMINATORS: &str = ":;.,";
const PARENTHESES: &str = "()";
const BRACKETS: &str = "{[]}";
const QUOTES: &str = "\"'`";
const WHITESPACE_CHARS: &str = " \n";

// Number and identifier runs are clipped here; a longer run scans as
// consecutive tokens.
const RUN_CAP: usize = 309;

fn class_run(data: &[char], offset: usize, class: &str, cap: usize) -> PassOutcome {
    let max = data.len().min(offset + cap);
    let mut read = 0;
    for &c in &data[offset.min(max)..max] {
        if !class.contains(c) {
            break;
        }
        read += 1;
    }
    if read > 0 {
        PassOutcome::hit(read)
    } else {
        PassOutcome::miss()
    }
}

fn single_char(data: &[char], offset: usize, class: &str) -> PassOutcome {
    match data.get(offset) {
        Some(&c) if class.contains(c) => PassOutcome::hit(1),
        _ => PassOutcome::miss(),
    }
}

/// Maximal run of decimal digits.
pub fn number_literal(data: &[char], offset: usize) -> PassOutcome {
    class_run(data, offset, NUMBERS, RUN_CAP)
}

/// Maximal run of identifier characters (letters, underscore, digits).
pub fn identifier(data: &[char], offset: usize) -> PassOutcome {
    class_run(data, offset, IDENT_CHARS, RUN_CAP)
}

/// A quoted literal: `"`, `'`, or a backtick through the matching
/// unescaped closing quote. A backslash escapes the character after it.
/// An unterminated literal is a miss, leaving the opening quote for the
/// error path to report.
pub fn string_literal(data: &[char], offset: usize) -> PassOutcome {
    let quote = match data.get(offset) {
        Some(&c) if QUOTES.contains(c) => c,
        _ => return PassOutcome::miss(),
    };

    let mut read = 1;
    let mut lines = 0;
    let mut escaped = false;
    for &c in &data[offset + 1..] {
        read += 1;
        if c == '\n' {
            lines += 1;
        }
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == quote {
            return PassOutcome::hit_lines(read, lines);
        }
    }
    PassOutcome::miss()
}

/// A single operator character.
pub fn operator(data: &[char], offset: usize) -> PassOutcome {
    single_char(data, offset, OPERATORS)
}

/// A single curly or square bracket.
pub fn bracket(data: &[char], offset: usize) -> PassOutcome {
    single_char(data, offset, BRACKETS)
}

/// A single parenthesis.
pub fn parenthesis(data: &[char], offset: usize) -> PassOutcome {
    single_char(data, offset, PARENTHESES)
}

/// A single statement-terminator character.
pub fn terminator(data: &[char], offset: usize) -> PassOutcome {
    single_char(data, offset, TERMINATORS)
}

/// Maximal run of spaces and newlines, counting the newlines.
pub fn whitespace(data: &[char], offset: usize) -> PassOutcome {
    let mut read = 0;
    let mut lines = 0;
    for &c in &data[offset.min(data.len())..] {
        if !WHITESPACE_CHARS.contains(c) {
            break;
        }
        if c == '\n' {
            lines += 1;
        }
        read += 1;
    }
    if read > 0 {
        PassOutcome::hit_lines(read, lines)
    } else {
        PassOutcome::miss()
    }
}

/// A scanner loaded with the standard passes in their canonical order.
pub fn standard_scanner() -> Scanner {
    let mut scanner = Scanner::new();
    scanner.set_pass(Token::NUMBER_LITERAL, number_literal);
    scanner.set_pass(Token::IDENTIFIER, identifier);
    scanner.set_pass(Token::STRING_LITERAL, string_literal);
    scanner.set_pass(Token::OPERATOR, operator);
    scanner.set_pass(BRACKET, bracket);
    scanner.set_pass(PARENTHESIS, parenthesis);
    scanner.set_pass(Token::TERMINATOR, terminator);
    scanner.set_pass(Token::WHITESPACE, whitespace);
    scanner
}
