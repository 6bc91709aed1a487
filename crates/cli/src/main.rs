//! LForth CLI
//!
//! Runs an LForth program from a file or stdin and prints the final machine
//! state. Exit code 0 means the run completed; 1 means the program text
//! could not be loaded or the run faulted.

use clap::Parser as ClapParser;
use lforth::Snapshot;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process;

#[derive(ClapParser)]
#[command(name = "lforth")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "LForth interpreter - run concatenative stack programs", long_about = None)]
struct Cli {
    /// Program file to run (conventionally .lf); `-` or omission reads stdin
    program: Option<PathBuf>,

    /// Print the final state as JSON instead of the two-line human form
    #[arg(long)]
    json: bool,
}

fn main() {
    // Set up logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("lforth=info".parse().unwrap()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let source = match load_program(cli.program.as_deref()) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let state = lforth::interpret(&source);
    match render(&state, cli.json) {
        Ok(out) => println!("{}", out),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
    if !state.success {
        process::exit(1);
    }
}

/// Read the program text from `path`, or from stdin when the path is `-` or
/// absent.
fn load_program(path: Option<&Path>) -> Result<String, String> {
    match path {
        Some(p) if p.as_os_str() != "-" => std::fs::read_to_string(p)
            .map_err(|e| format!("cannot read {}: {}", p.display(), e)),
        _ => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .map_err(|e| format!("cannot read stdin: {}", e))?;
            Ok(text)
        }
    }
}

/// Human or JSON rendering of the final state.
fn render(state: &Snapshot, json: bool) -> Result<String, String> {
    if json {
        serde_json::to_string_pretty(state).map_err(|e| format!("cannot encode state: {}", e))
    } else {
        Ok(format!("Final state:\n{}", state))
    }
}
