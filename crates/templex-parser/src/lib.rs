pub mod cursor;
pub mod parser;

pub use cursor::Cursor;
pub use parser::Parser;

#[cfg(test)]
mod tests {
    use super::*;
    use templex_scanner::passes::{standard_scanner, BRACKET, PARENTHESIS};
    use templex_scanner::tokenize;
    use templex_syntax::error::ErrorKind;
    use templex_syntax::grammar::{Language, Repeat, Requirement, StatementTemplate};
    use templex_syntax::statement::{Node, Statement};
    use templex_syntax::token::Token;

    fn scan(input: &str) -> Vec<Token> {
        let mut scanner = standard_scanner();
        tokenize(input, &mut scanner, &[Token::WHITESPACE]).expect("Scanning should succeed")
    }

    fn parse_with(language: &Language, input: &str) -> Vec<Statement> {
        let tokens = scan(input);
        let mut parser = Parser::new(language, &tokens);
        parser.parse().expect("Parsing should succeed")
    }

    fn template_ids(statements: &[Statement]) -> Vec<&str> {
        statements.iter().map(|s| s.template_id.as_str()).collect()
    }

    /// let/assignment/block grammar over the standard token kinds.
    fn mini_language() -> Language {
        let mut lang = Language::new("mini");

        let t = lang.create_template("let-declaration").unwrap();
        t.add_requirement(Requirement::token_data(Token::IDENTIFIER, "let"))
            .unwrap();
        t.add_requirement(Requirement::token(Token::IDENTIFIER))
            .unwrap();
        t.add_requirement(Requirement::token_data(Token::OPERATOR, "="))
            .unwrap();
        t.add_requirement(Requirement::any_token()).unwrap();
        t.add_requirement(Requirement::token_data(Token::TERMINATOR, ";"))
            .unwrap();

        let t = lang.create_template("assignment").unwrap();
        t.add_requirement(Requirement::token(Token::IDENTIFIER))
            .unwrap();
        t.add_requirement(Requirement::token_data(Token::OPERATOR, "="))
            .unwrap();
        t.add_requirement(Requirement::any_token()).unwrap();
        t.add_requirement(Requirement::token_data(Token::TERMINATOR, ";"))
            .unwrap();

        let t = lang.create_template("block").unwrap();
        t.add_requirement(Requirement::token_data(BRACKET, "{"))
            .unwrap();
        t.add_requirement(Requirement::any_statement().with_repeat(Repeat::ZeroOrMore))
            .unwrap();
        t.add_requirement(Requirement::token_data(BRACKET, "}"))
            .unwrap();

        lang.validate().expect("Grammar should validate");
        lang
    }

    #[test]
    fn test_parses_statement_sequence() {
        let lang = mini_language();
        let statements = parse_with(&lang, "let x = 42; y = x; { a = 1; b = 2; }");
        assert_eq!(
            template_ids(&statements),
            ["let-declaration", "assignment", "block"]
        );

        // The block nests its two assignments.
        let Node::Statement(first) = &statements[2].items[1] else {
            panic!("Expected a nested statement");
        };
        assert_eq!(first.template_id, "assignment");
        assert_eq!(statements[2].items.len(), 4);
    }

    #[test]
    fn test_statement_records_tokens_in_match_order() {
        let lang = mini_language();
        let statements = parse_with(&lang, "let speed = 88;");
        let items = &statements[0].items;
        assert_eq!(items.len(), 5);
        let Node::Token(name) = &items[1] else {
            panic!("Expected a token");
        };
        assert_eq!(name.data.as_deref(), Some("speed"));
    }

    #[test]
    fn test_failed_template_leaves_no_trace() {
        // "let = 2;" walks into let-declaration, fails at its second
        // requirement, and must rewind fully before assignment is tried.
        let lang = mini_language();
        let statements = parse_with(&lang, "let = 2;");
        assert_eq!(template_ids(&statements), ["assignment"]);
        assert_eq!(statements[0].items.len(), 4);
        let Node::Token(first) = &statements[0].items[0] else {
            panic!("Expected a token");
        };
        assert_eq!(first.data.as_deref(), Some("let"));
    }

    #[test]
    fn test_declaration_order_decides_between_overlapping_templates() {
        let build = |first_general: bool| {
            let mut lang = Language::new("overlap");
            let general = {
                let mut t = StatementTemplate::new("general");
                t.add_requirement(Requirement::token(Token::IDENTIFIER))
                    .unwrap();
                t.add_requirement(Requirement::token(Token::NUMBER_LITERAL))
                    .unwrap();
                t
            };
            let specific = {
                let mut t = StatementTemplate::new("specific");
                t.add_requirement(Requirement::token(Token::IDENTIFIER))
                    .unwrap();
                t.add_requirement(Requirement::token_data(Token::NUMBER_LITERAL, "42"))
                    .unwrap();
                t
            };
            if first_general {
                lang.add_template(general).unwrap();
                lang.add_template(specific).unwrap();
            } else {
                lang.add_template(specific).unwrap();
                lang.add_template(general).unwrap();
            }
            lang
        };

        let statements = parse_with(&build(true), "x 42");
        assert_eq!(template_ids(&statements), ["general"]);
        let statements = parse_with(&build(false), "x 42");
        assert_eq!(template_ids(&statements), ["specific"]);
    }

    #[test]
    fn test_parse_is_deterministic() {
        let lang = mini_language();
        let input = "let a = 1; { b = a; { c = 'x'; } }";
        let first = parse_with(&lang, input);
        let second = parse_with(&lang, input);
        assert_eq!(first, second);
    }

    #[test]
    fn test_exact_repeat_requires_every_match() {
        let mut lang = Language::new("triples");
        let t = lang.create_template("triple").unwrap();
        t.add_requirement(
            Requirement::token(Token::NUMBER_LITERAL).with_repeat(Repeat::Exactly(3)),
        )
        .unwrap();
        t.add_requirement(Requirement::token_data(Token::TERMINATOR, ";"))
            .unwrap();

        let statements = parse_with(&lang, "1 2 3;");
        assert_eq!(statements[0].items.len(), 4);

        let tokens = scan("1 2;");
        let mut parser = Parser::new(&lang, &tokens);
        let err = parser.parse().unwrap_err();
        assert_eq!(err.kind, ErrorKind::Parse);
    }

    #[test]
    fn test_zero_or_more_accepts_empty_and_long_runs() {
        let lang = mini_language();
        let statements = parse_with(&lang, "{}");
        assert_eq!(statements[0].items.len(), 2);

        let statements = parse_with(&lang, "{ a = 1; b = 2; c = 3; }");
        assert_eq!(statements[0].items.len(), 5);
    }

    #[test]
    fn test_statement_requirement_with_exact_count() {
        let mut lang = Language::new("counted");
        let num = {
            let mut t = StatementTemplate::new_abstract("num");
            t.add_requirement(Requirement::token(Token::NUMBER_LITERAL))
                .unwrap();
            t
        };
        lang.add_template(num).unwrap();
        let t = lang.create_template("pair").unwrap();
        t.add_requirement(Requirement::statement("num").with_repeat(Repeat::Exactly(2)))
            .unwrap();
        t.add_requirement(Requirement::token_data(Token::TERMINATOR, ";"))
            .unwrap();
        lang.validate().expect("Grammar should validate");

        let statements = parse_with(&lang, "7 9;");
        assert_eq!(statements[0].items.len(), 3);

        let tokens = scan("7;");
        let mut parser = Parser::new(&lang, &tokens);
        assert!(parser.parse().is_err());
    }

    #[test]
    fn test_abstract_template_only_matches_by_reference() {
        let mut lang = Language::new("hidden");
        let stray = {
            let mut t = StatementTemplate::new_abstract("stray");
            t.add_requirement(Requirement::token(Token::NUMBER_LITERAL))
                .unwrap();
            t
        };
        lang.add_template(stray).unwrap();
        let t = lang.create_template("pair").unwrap();
        t.add_requirement(Requirement::token(Token::IDENTIFIER))
            .unwrap();
        t.add_requirement(Requirement::statement("stray")).unwrap();
        lang.validate().expect("Grammar should validate");

        // Standalone, the abstract template is never a candidate.
        let tokens = scan("42");
        let mut parser = Parser::new(&lang, &tokens);
        assert!(parser.parse().is_err());

        // Through the reference it matches fine.
        let statements = parse_with(&lang, "x 42");
        assert_eq!(template_ids(&statements), ["pair"]);
        let Node::Statement(nested) = &statements[0].items[1] else {
            panic!("Expected a nested statement");
        };
        assert_eq!(nested.template_id, "stray");
    }

    #[test]
    fn test_left_recursion_is_a_hard_error() {
        let mut lang = Language::new("looping");
        let t = lang.create_template("loop").unwrap();
        t.add_requirement(Requirement::statement("loop")).unwrap();
        lang.validate().expect("Grammar should validate");

        let tokens = scan("x");
        let mut parser = Parser::new(&lang, &tokens);
        let err = parser.parse().unwrap_err();
        assert_eq!(err.kind, ErrorKind::GrammarCycle);
        assert!(err.msg.contains("loop"), "got: {}", err.msg);
    }

    #[test]
    fn test_nesting_limit_fails_fast() {
        let mut lang = Language::new("nesting");
        let t = lang.create_template("nest").unwrap();
        t.add_requirement(Requirement::token_data(PARENTHESIS, "("))
            .unwrap();
        t.add_requirement(Requirement::any_statement()).unwrap();
        t.add_requirement(Requirement::token_data(PARENTHESIS, ")"))
            .unwrap();
        let t = lang.create_template("leaf").unwrap();
        t.add_requirement(Requirement::token(Token::NUMBER_LITERAL))
            .unwrap();

        let tokens = scan("((1))");
        let mut parser = Parser::new(&lang, &tokens).with_max_depth(3);
        assert!(parser.parse().is_ok());

        let tokens = scan("(((1)))");
        let mut parser = Parser::new(&lang, &tokens).with_max_depth(3);
        let err = parser.parse().unwrap_err();
        assert_eq!(err.kind, ErrorKind::Parse);
        assert!(err.msg.contains("nesting"), "got: {}", err.msg);
    }

    #[test]
    fn test_no_match_reports_attempts() {
        let lang = mini_language();
        let tokens = scan("x = ;");
        let mut parser = Parser::new(&lang, &tokens);
        let err = parser.parse().unwrap_err();
        assert_eq!(err.kind, ErrorKind::Parse);
        assert_eq!(err.line, Some(1));
        assert!(err.msg.contains("no statement template matches"));
        assert!(err.msg.contains("template \"assignment\""), "got: {}", err.msg);
        assert!(err.msg.contains("expected token"), "got: {}", err.msg);
    }

    #[test]
    fn test_unterminated_statement_fails_after_rollback() {
        let lang = mini_language();
        let tokens = scan("x = 5");
        let mut parser = Parser::new(&lang, &tokens);
        let err = parser.parse().unwrap_err();
        assert_eq!(err.kind, ErrorKind::Parse);
        assert!(err.msg.contains("found end of input"), "got: {}", err.msg);
        // The failed attempts rolled the cursor back to the start.
        assert_eq!(parser.offset(), 0);
    }

    #[test]
    fn test_unknown_template_reference_is_a_hard_error() {
        let lang = mini_language();
        let tokens = scan("x");
        let mut parser = Parser::new(&lang, &tokens);
        let err = parser.match_statement(Some("ghost")).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnresolvedReference);
    }

    #[test]
    fn test_empty_template_cannot_drive_the_top_level() {
        let mut lang = Language::new("empty");
        lang.create_template("nothing").unwrap();

        let tokens = scan("x");
        let mut parser = Parser::new(&lang, &tokens);
        let err = parser.parse().unwrap_err();
        assert_eq!(err.kind, ErrorKind::GrammarCycle);
        assert!(err.msg.contains("without consuming"), "got: {}", err.msg);
    }

    #[test]
    fn test_empty_token_stream_parses_to_nothing() {
        let lang = mini_language();
        let statements = parse_with(&lang, "");
        assert!(statements.is_empty());
    }

    #[test]
    fn test_match_statement_leaves_cursor_after_the_match() {
        let lang = mini_language();
        let tokens = scan("a = 1; b = 2;");
        let mut parser = Parser::new(&lang, &tokens);
        let first = parser
            .match_statement(None)
            .expect("Parsing should succeed")
            .expect("A statement should match");
        assert_eq!(first.template_id, "assignment");
        assert_eq!(parser.offset(), 4);
    }
}
