use std::fs;
use std::path::{Path, PathBuf};

use owo_colors::OwoColorize;
use templex_parser::Parser;
use templex_scanner::passes::standard_scanner;
use templex_scanner::tokenize;
use templex_syntax::error::{Error, ErrorKind, Result};
use templex_syntax::grammar::{Language, LanguageDef};
use templex_syntax::statement::Statement;
use templex_syntax::token::Token;

// Grammar used when no -lang file is given.
const DEFAULT_GRAMMAR: &str = include_str!("../../../samples/minits.lang.json");

struct Options {
    input: Option<String>,
    output: String,
    grammar: Option<String>,
    show_tokens: bool,
}

fn usage() {
    println!("Usage: templex -in=<file> [-out=<dir>] [-lang=<grammar.json>] [-tokens]");
    println!();
    println!("  -in=<file>    input source file, relative to cwd");
    println!("  -out=<dir>    output directory for the parse tree (default: build)");
    println!("  -lang=<file>  grammar document; defaults to the bundled minits grammar");
    println!("  -tokens       also print the token stream");
    println!("  -help         show this message");
}

fn parse_options(args: &[String]) -> Options {
    let mut options = Options {
        input: None,
        output: String::from("build"),
        grammar: None,
        show_tokens: false,
    };
    for arg in args.iter().skip(1) {
        if let Some(value) = arg.strip_prefix("-in=") {
            options.input = Some(value.to_string());
        } else if let Some(value) = arg.strip_prefix("-out=") {
            options.output = value.to_string();
        } else if let Some(value) = arg.strip_prefix("-lang=") {
            options.grammar = Some(value.to_string());
        } else if arg == "-tokens" {
            options.show_tokens = true;
        } else if arg == "-help" || arg == "--help" || arg == "-h" {
            usage();
            std::process::exit(0);
        } else {
            eprintln!(
                "{}: {}",
                "error".red().bold(),
                format!("unknown argument: {}", arg).red()
            );
            usage();
            std::process::exit(2);
        }
    }
    options
}

fn render_error(source: &str, err: &Error) {
    eprintln!("{}: {}", err.kind.label().red().bold(), err.msg.red());
    if let Some(line) = err.line {
        match err.col {
            Some(col) => eprintln!("  --> line {}, column {}", line, col),
            None => eprintln!("  --> line {}", line),
        }
        if let Some(src_line) = source.lines().nth(line - 1) {
            let line_num_str = format!("{:3} | ", line);
            eprintln!("     |");
            eprintln!("{}{}", line_num_str.bright_black(), src_line);

            let col = err.col.unwrap_or(1);
            let mut marker = String::new();
            marker.push_str(&" ".repeat(line_num_str.len()));
            if col > 1 {
                marker.push_str(&" ".repeat(col - 1));
            }
            marker.push('^');
            eprintln!("{}{}", marker.red(), " error here".red());
            eprintln!("     |");
        }
    }
}

fn load_language(grammar_path: Option<&str>) -> Language {
    let (text, origin) = match grammar_path {
        Some(path) => match fs::read_to_string(path) {
            Ok(text) => (text, path.to_string()),
            Err(e) => {
                eprintln!(
                    "{}: {}",
                    "error".red().bold(),
                    format!("Failed to read {}: {}", path, e).red()
                );
                std::process::exit(1);
            }
        },
        None => (
            String::from(DEFAULT_GRAMMAR),
            String::from("bundled minits grammar"),
        ),
    };

    let def: LanguageDef = match serde_json::from_str(&text) {
        Ok(def) => def,
        Err(e) => {
            eprintln!(
                "{}: {}",
                ErrorKind::Grammar.label().red().bold(),
                format!("{}: {}", origin, e).red()
            );
            std::process::exit(1);
        }
    };
    match Language::from_definition(&def) {
        Ok(language) => language,
        Err(e) => {
            // Load failures keep their own kind, so a bad reference reads
            // "Unresolved reference" rather than a generic grammar error.
            eprintln!(
                "{}: {}",
                e.kind.label().red().bold(),
                format!("{}: {}", origin, e).red()
            );
            std::process::exit(1);
        }
    }
}

fn write_tree(out_dir: &str, input_path: &str, statements: &[Statement]) -> Result<PathBuf> {
    fs::create_dir_all(out_dir)
        .map_err(|e| Error::new(ErrorKind::Io, format!("failed to create {}: {}", out_dir, e)))?;

    let stem = Path::new(input_path)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("out");
    let out_path = Path::new(out_dir).join(format!("{}.ast.json", stem));

    let json = serde_json::to_string_pretty(statements)
        .map_err(|e| Error::new(ErrorKind::Io, format!("failed to encode parse tree: {}", e)))?;
    fs::write(&out_path, json).map_err(|e| {
        Error::new(
            ErrorKind::Io,
            format!("failed to write {}: {}", out_path.display(), e),
        )
    })?;
    Ok(out_path)
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let options = parse_options(&args);

    let input_path = match options.input {
        Some(path) => path,
        None => {
            eprintln!(
                "{}",
                "No input file specified, you can use -help".red()
            );
            std::process::exit(2);
        }
    };

    let source = match fs::read_to_string(&input_path) {
        Ok(source) => source,
        Err(e) => {
            eprintln!(
                "{}: {}",
                "error".red().bold(),
                format!("Failed to read {}: {}", input_path, e).red()
            );
            std::process::exit(1);
        }
    };

    let language = load_language(options.grammar.as_deref());

    let mut scanner = standard_scanner();
    let tokens = match tokenize(&source, &mut scanner, &[Token::WHITESPACE]) {
        Ok(tokens) => tokens,
        Err(e) => {
            render_error(&source, &e);
            std::process::exit(1);
        }
    };

    if options.show_tokens {
        for token in &tokens {
            println!(
                "{:>4}  {:<4}  {}",
                token.line,
                token.kind,
                token.data.as_deref().unwrap_or("")
            );
        }
    }

    let mut parser = Parser::new(&language, &tokens);
    let statements = match parser.parse() {
        Ok(statements) => statements,
        Err(e) => {
            render_error(&source, &e);
            std::process::exit(1);
        }
    };

    println!(
        "{} {} with {} ({} statements, {} tokens)",
        "Parsed".green().bold(),
        input_path,
        language.name(),
        statements.len(),
        tokens.len()
    );

    match write_tree(&options.output, &input_path, &statements) {
        Ok(out_path) => println!("{} {}", "Wrote".green().bold(), out_path.display()),
        Err(e) => {
            eprintln!("{}: {}", e.kind.label().red().bold(), e.to_string().red());
            std::process::exit(1);
        }
    }
}
