use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{ArgAction, Parser};
use serde::Serialize;

use templex_parser::Parser as TemplexParser;
use templex_scanner::passes::standard_scanner;
use templex_scanner::tokenize;
use templex_syntax::grammar::{Language, LanguageDef};
use templex_syntax::token::Token;

#[derive(Parser, Debug)]
#[command(name = "templex-bench", about = "Run templex scan/parse benchmarks")]
struct Cli {
    /// Specific case(s) to run (by name, e.g. nested). If omitted, runs all discovered samples.
    #[arg(short = 't', long = "test", action = ArgAction::Append)]
    tests: Vec<String>,

    /// Iterations per case (measured)
    #[arg(short = 'n', long = "iterations", default_value_t = 50)]
    iterations: u32,

    /// Warmup iterations (not measured)
    #[arg(short = 'w', long = "warmup", default_value_t = 5)]
    warmup: u32,

    /// Output JSON file path; default: bench-results/<timestamp>.json
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Grammar document to parse with; default: samples/minits.lang.json
    #[arg(short = 'l', long = "lang")]
    lang: Option<PathBuf>,

    /// List discovered cases and exit
    #[arg(long = "list", default_value_t = false)]
    list: bool,
}

#[derive(Debug, Serialize)]
struct BenchResult {
    name: String,
    iterations: u32,
    avg_total_ms: f64,
    min_total_ms: f64,
    max_total_ms: f64,
    avg_scan_ms: f64,
    avg_parse_ms: f64,
    tokens: usize,
    statements: usize,
}

#[derive(Debug, Serialize)]
struct OutputDoc {
    timestamp: String,
    templex_version: String,
    grammar: String,
    benchmarks: Vec<BenchResult>,
}

#[derive(Debug, Clone)]
struct SampleCase {
    name: String,
    path: PathBuf,
}

fn workspace_root() -> PathBuf {
    // crates/templex-bench -> crates -> root
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .to_path_buf()
}

fn discover_samples() -> Vec<SampleCase> {
    let dir = workspace_root().join("samples");
    let mut out = Vec::new();

    if let Ok(entries) = fs::read_dir(&dir) {
        for e in entries.flatten() {
            let p = e.path();
            if p.extension().and_then(|s| s.to_str()) == Some("mts") {
                let name = p
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or("")
                    .to_string();
                out.push(SampleCase { name, path: p });
            }
        }
    }

    out.sort_by(|a, b| a.name.cmp(&b.name));
    out
}

fn load_language(path: &Path) -> Language {
    let text = fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", path.display(), e));
    let def: LanguageDef = serde_json::from_str(&text)
        .unwrap_or_else(|e| panic!("Bad grammar {}: {}", path.display(), e));
    Language::from_definition(&def)
        .unwrap_or_else(|e| panic!("Bad grammar {}: {}", path.display(), e))
}

fn read_sample(path: &Path) -> String {
    fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", path.display(), e))
}

fn measure_case(
    language: &Language,
    src: &str,
    iterations: u32,
    warmup: u32,
) -> (Vec<f64>, Vec<f64>, Vec<f64>, usize, usize) {
    // Warmup
    for _ in 0..warmup {
        let mut scanner = standard_scanner();
        let tokens = tokenize(src, &mut scanner, &[Token::WHITESPACE]).expect("scan error");
        let mut parser = TemplexParser::new(language, &tokens);
        parser.parse().expect("parse error");
    }

    let mut totals = Vec::with_capacity(iterations as usize);
    let mut scans = Vec::with_capacity(iterations as usize);
    let mut parses = Vec::with_capacity(iterations as usize);
    let mut token_count = 0;
    let mut statement_count = 0;

    for _i in 0..iterations {
        let t0 = Instant::now();
        let mut t = Instant::now();

        let mut scanner = standard_scanner();
        let tokens = tokenize(src, &mut scanner, &[Token::WHITESPACE]).expect("scan error");
        let t_scan = t.elapsed();

        t = Instant::now();
        let mut parser = TemplexParser::new(language, &tokens);
        let statements = parser.parse().expect("parse error");
        let t_parse = t.elapsed();

        let total = t0.elapsed();

        token_count = tokens.len();
        statement_count = statements.len();
        scans.push(dur_ms(t_scan));
        parses.push(dur_ms(t_parse));
        totals.push(dur_ms(total));
    }

    (totals, scans, parses, token_count, statement_count)
}

fn dur_ms(d: std::time::Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

fn stats(vals: &[f64]) -> (f64, f64, f64) {
    let min = vals.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = vals.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let avg = if vals.is_empty() {
        0.0
    } else {
        vals.iter().sum::<f64>() / (vals.len() as f64)
    };
    (avg, min, max)
}

fn ensure_dir(p: &Path) {
    if let Err(e) = fs::create_dir_all(p) {
        panic!("Failed to create {}: {}", p.display(), e);
    }
}

fn main() {
    let cli = Cli::parse();

    let grammar_path = cli
        .lang
        .clone()
        .unwrap_or_else(|| workspace_root().join("samples/minits.lang.json"));
    let language = load_language(&grammar_path);

    let mut cases = discover_samples();

    if cli.list {
        println!("Discovered cases:");
        for c in &cases {
            println!("- {} ({})", c.name, c.path.display());
        }
        return;
    }

    if !cli.tests.is_empty() {
        let wanted: std::collections::HashSet<_> =
            cli.tests.iter().map(|s| s.to_lowercase()).collect();
        cases.retain(|c| wanted.contains(&c.name.to_lowercase()));
        if cases.is_empty() {
            eprintln!("No matching cases. Use --list to see available.");
            std::process::exit(2);
        }
    }

    if cases.is_empty() {
        eprintln!("No .mts samples found in samples/.");
        std::process::exit(2);
    }

    let mut results = Vec::new();

    for case in &cases {
        let src = read_sample(&case.path);
        let (totals, scans, parses, tokens, statements) =
            measure_case(&language, &src, cli.iterations, cli.warmup);
        let (avg_t, min_t, max_t) = stats(&totals);
        let (avg_s, _, _) = stats(&scans);
        let (avg_p, _, _) = stats(&parses);

        println!(
            "{:>12}: total avg={:.3}ms min={:.3}ms max={:.3}ms | scan={:.3}ms parse={:.3}ms | {} tokens, {} statements",
            case.name, avg_t, min_t, max_t, avg_s, avg_p, tokens, statements
        );

        results.push(BenchResult {
            name: case.name.clone(),
            iterations: cli.iterations,
            avg_total_ms: avg_t,
            min_total_ms: min_t,
            max_total_ms: max_t,
            avg_scan_ms: avg_s,
            avg_parse_ms: avg_p,
            tokens,
            statements,
        });
    }

    // Prepare output path
    let out_path = if let Some(p) = cli.output.clone() {
        p
    } else {
        let results_dir = workspace_root().join("bench-results");
        ensure_dir(&results_dir);
        // Human-friendly, Windows-safe filename timestamp
        let ts_file = chrono::Utc::now().format("%Y-%m-%d_%H-%M-%SZ").to_string();
        results_dir.join(format!("{}.json", ts_file))
    };

    let doc = OutputDoc {
        // Human-friendly ISO-8601 UTC without fractional seconds
        timestamp: chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string(),
        templex_version: env!("CARGO_PKG_VERSION").to_string(),
        grammar: language.name().to_string(),
        benchmarks: results,
    };

    let json = serde_json::to_string_pretty(&doc).expect("serialize json");
    if let Some(parent) = out_path.parent() {
        ensure_dir(parent);
    }
    fs::write(&out_path, json).expect("write results json");

    println!("\nSaved results to {}", out_path.display());
}
