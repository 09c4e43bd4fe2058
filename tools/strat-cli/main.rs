use clap::{Parser, Subcommand};
use stratgraph::prelude::*;
use std::fs;
use std::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Compile strategy snapshots into backend payloads and back
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: CliCommand,

    /// Write the result here instead of stdout
    #[arg(short, long, global = true)]
    output: Option<String>,
}

#[derive(Subcommand, Debug)]
enum CliCommand {
    /// Compile a strategy state JSON file into a backend payload
    Compile {
        /// Path to the strategy state JSON file
        state_path: String,
    },
    /// Rebuild a strategy state from a saved payload
    Reform {
        /// Path to the payload JSON file
        payload_path: String,
        /// Seed for regenerated ids
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Reform a payload, compile it again and report what changed
    Roundtrip {
        /// Path to the payload JSON file
        payload_path: String,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let started = Instant::now();

    let rendered = match cli.command {
        CliCommand::Compile { state_path } => run_compile(&state_path),
        CliCommand::Reform { payload_path, seed } => run_reform(&payload_path, seed),
        CliCommand::Roundtrip { payload_path } => run_roundtrip(&payload_path),
    };

    match cli.output {
        Some(path) => fs::write(&path, rendered).unwrap_or_else(|e| {
            exit_with_error(&format!("Failed to write output file '{}': {}", path, e))
        }),
        None => println!("{}", rendered),
    }
    info!(elapsed = ?started.elapsed(), "done");
}

fn run_compile(state_path: &str) -> String {
    let json = read_file(state_path);
    let state = StrategyState::from_json(&json)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to parse strategy state: {}", e)));

    let payload = Compiler::builder(&state).build().compile();
    info!(
        conditions = payload.conditions.len(),
        actions = payload.actions.len(),
        chain = payload.conditions_seq.len(),
        "compiled strategy '{}'",
        payload.strategy_name
    );
    payload
        .to_json_pretty()
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to serialize payload: {}", e)))
}

fn run_reform(payload_path: &str, seed: Option<u64>) -> String {
    let payload = load_payload(payload_path);
    let mut reformer = seed.map(Reformer::seeded).unwrap_or_default();
    let state = reformer
        .reform(&payload)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to reform payload: {}", e)));
    state
        .to_json_pretty()
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to serialize state: {}", e)))
}

fn run_roundtrip(payload_path: &str) -> String {
    let payload = load_payload(payload_path);
    let state = reform(&payload)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to reform payload: {}", e)));
    let recompiled = compile(&state);

    let mut report = Vec::new();
    for (id, original) in &payload.conditions {
        let status = match recompiled.conditions.get(id) {
            Some(again) if again == original => "unchanged",
            Some(_) => "changed",
            None => "dropped",
        };
        report.push(format!("condition {:<24} {}", id, status));
    }
    for (id, original) in &payload.actions {
        let status = match recompiled.actions.get(id) {
            Some(again) if again == original => "unchanged",
            Some(_) => "changed",
            None => "dropped",
        };
        report.push(format!("action    {:<24} {}", id, status));
    }
    report.push(format!(
        "chain     {}",
        if recompiled.conditions_seq == payload.conditions_seq {
            "unchanged"
        } else {
            "changed"
        }
    ));
    report.join("\n")
}

fn load_payload(path: &str) -> Payload {
    let json = read_file(path);
    Payload::from_json(&json)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to parse payload: {}", e)))
}

fn read_file(path: &str) -> String {
    fs::read_to_string(path)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to read file '{}': {}", path, e)))
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
