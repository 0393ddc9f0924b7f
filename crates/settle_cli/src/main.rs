//! Settle CLI, the command-line interface for the settle placement tool.
//!
//! Given a problem file, `settle` runs one simulated-annealing placement
//! and prints the result. With `--benchmark` it instead runs the standard
//! problem set in parallel and writes aggregate statistics as JSON. The
//! interactive viewer lives outside this tool; everything here is
//! headless.

#![warn(missing_docs)]

mod bench;
mod run;

use clap::Parser;
use settle_diagnostics::{DiagnosticRenderer, DiagnosticSink, TerminalRenderer};
use std::path::PathBuf;
use std::process;

/// Standard-cell placement tool built around a simulated-annealing core.
#[derive(Parser, Debug)]
#[command(name = "settle", version, about = "Standard cell placement tool")]
pub struct Cli {
    /// Input file specifying the problem to be placed.
    pub problem: Option<PathBuf>,

    /// Benchmark mode: run each sample problem multiple times using the
    /// default presets and write aggregate statistics.
    #[arg(long)]
    pub benchmark: bool,

    /// JSON input file for benchmark settings.
    #[arg(long = "bench_settings_in", value_name = "path")]
    pub bench_settings_in: Option<PathBuf>,

    /// Directory containing the benchmark problem files.
    #[arg(long = "bench_dir", value_name = "path", default_value = "benchmarks")]
    pub bench_dir: PathBuf,

    /// Write generated data into this path.
    #[arg(long = "json_out", value_name = "path", default_value = "out.json")]
    pub json_out: PathBuf,

    /// Repeat each benchmark the specified number of times.
    #[arg(long, value_name = "count", default_value_t = 10)]
    pub repeat: usize,
}

fn main() {
    let cli = Cli::parse();
    let sink = DiagnosticSink::new();

    let result = dispatch(&cli, &sink);

    let renderer = TerminalRenderer::new(atty_is_terminal());
    for diag in sink.take_all() {
        eprint!("{}", renderer.render(&diag));
    }

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

/// Routes the parsed arguments to benchmark or single-run mode.
fn dispatch(cli: &Cli, sink: &DiagnosticSink) -> Result<i32, Box<dyn std::error::Error>> {
    if cli.benchmark {
        let mut benchmarker =
            bench::Benchmarker::new(cli.json_out.clone(), cli.repeat, cli.bench_dir.clone());
        if let Some(path) = &cli.bench_settings_in {
            benchmarker.read_settings(path, sink)?;
        }
        benchmarker.run(sink)?;
        return Ok(0);
    }

    match &cli.problem {
        Some(path) => run::run(path, sink),
        None => Err("no problem file given; pass a path or use --benchmark".into()),
    }
}

/// Rough terminal detection: checks if stdout is a terminal.
fn atty_is_terminal() -> bool {
    // Use a simple heuristic: check the TERM env var.
    std::env::var("TERM").is_ok()
}
