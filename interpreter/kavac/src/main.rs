//! Kava interpreter CLI.

use std::process::ExitCode;
use std::sync::Once;

use kava_eval::{FatalError, Session};
use kava_parse::parse_program;

fn main() -> ExitCode {
    init_tracing();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        return ExitCode::FAILURE;
    }

    match args[1].as_str() {
        "run" => {
            let Some(path) = args.get(2) else {
                eprintln!("Usage: kavac run <file.kv>");
                return ExitCode::FAILURE;
            };
            run_file(path)
        }
        "parse" => {
            let Some(path) = args.get(2) else {
                eprintln!("Usage: kavac parse <file.kv>");
                return ExitCode::FAILURE;
            };
            parse_file(path)
        }
        "help" | "--help" | "-h" => {
            print_usage();
            ExitCode::SUCCESS
        }
        other => {
            eprintln!("error: unknown command `{other}`");
            print_usage();
            ExitCode::FAILURE
        }
    }
}

/// Interpret a program; faults go to stderr with their source line.
fn run_file(path: &str) -> ExitCode {
    let source = match std::fs::read_to_string(path) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("error: cannot read `{path}`: {err}");
            return ExitCode::FAILURE;
        }
    };
    let mut session = Session::new();
    match session.run(&source) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", format_fatal(&err));
            ExitCode::FAILURE
        }
    }
}

/// Parse only; print the program back as normalized S-expressions.
fn parse_file(path: &str) -> ExitCode {
    let source = match std::fs::read_to_string(path) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("error: cannot read `{path}`: {err}");
            return ExitCode::FAILURE;
        }
    };
    match parse_program(&source) {
        Ok(forms) => {
            for form in forms {
                println!("{form}");
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("syntax error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn format_fatal(err: &FatalError) -> String {
    match err.line {
        Some(line) => format!("{err} (line {line})"),
        None => err.to_string(),
    }
}

fn print_usage() {
    eprintln!("Kava interpreter");
    eprintln!();
    eprintln!("Usage: kavac <command> [args]");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  run <file.kv>     Interpret a Kava program");
    eprintln!("  parse <file.kv>   Parse a program and print its forms");
    eprintln!("  help              Show this help");
    eprintln!();
    eprintln!("Set RUST_LOG=kava_eval=debug for evaluator tracing.");
}

static TRACING_INIT: Once = Once::new();

/// Initialize tracing once at startup; active only when `RUST_LOG` is set.
fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}
