//! Tokenizer driver: runs a scanner over a whole input.

use templex_syntax::error::{Error, ErrorKind, Result};
use templex_syntax::token::Token;

use crate::scanner::Scanner;

/// Tokenizes `data` to completion with the given scanner.
///
/// Token kinds listed in `skip` (typically whitespace and comments) are
/// dropped from the output but still advance the position. The first error
/// token aborts the run with no partial results: its diagnostic becomes the
/// error message and the scanner's stalled position its span. The output
/// never contains an EOF token.
pub fn tokenize(data: &str, scanner: &mut Scanner, skip: &[&str]) -> Result<Vec<Token>> {
    scanner.reset();
    scanner.set_data(data);

    let mut tokens = Vec::new();
    while scanner.available() > 0 {
        let token = scanner.next();
        if token.is_error() {
            let msg = token
                .data
                .unwrap_or_else(|| String::from("input could not be parsed"));
            // An error step consumes nothing, so the scanner still points
            // at the offending character.
            return Err(Error::with_span(
                ErrorKind::Scan,
                msg,
                scanner.line(),
                scanner.col(),
            ));
        }
        if skip.contains(&token.kind.as_str()) {
            continue;
        }
        tokens.push(token);
    }
    Ok(tokens)
}
