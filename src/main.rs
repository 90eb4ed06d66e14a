//! Jacobi - Iterative Linear System Solver
//!
//! Solves square linear systems by Jacobi iteration.
//!
//! # Usage
//!
//! ```bash
//! jacobi generate --size 5 > system.txt
//! jacobi solve system.txt --precision 1e-6
//! echo '{"matrix":[[4,1,2],[1,3,5]],"precision":0.0001}' | jacobi serve
//! ```

use std::fmt::Write as _;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, Level};

use jacobi_core::{
    error::{JacobiError, Result},
    generator::{self, DEFAULT_MAX, DEFAULT_MIN},
    input,
    solver::{JacobiSolver, ProgressEvent, SolverConfig, MAX_ITERATIONS},
    worker::{handle_message, Response, Worker},
    IterationResult, DEFAULT_PRECISION,
};

/// Jacobi iterative solver for square linear systems
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Solve a system file
    Solve {
        /// Path to the system file
        #[arg(value_name = "MATRIX_FILE")]
        file: PathBuf,

        /// Convergence threshold (overrides the file's accuracy)
        #[arg(short, long)]
        precision: Option<f64>,

        /// Iteration cap
        #[arg(long, default_value_t = MAX_ITERATIONS)]
        max_iterations: usize,

        /// Print every intermediate approximation
        #[arg(long)]
        steps: bool,

        /// Print the full result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print a random diagonally dominant system in file format
    Generate {
        /// Number of unknowns
        #[arg(short, long, default_value_t = 5)]
        size: usize,

        /// Lower bound for off-diagonal coefficients
        #[arg(long, default_value_t = DEFAULT_MIN, allow_hyphen_values = true)]
        min: f64,

        /// Upper bound for off-diagonal coefficients
        #[arg(long, default_value_t = DEFAULT_MAX, allow_hyphen_values = true)]
        max: f64,

        /// Accuracy written to the header line
        #[arg(short, long, default_value_t = DEFAULT_PRECISION)]
        precision: f64,

        /// Seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Answer JSON requests from stdin, one per line
    Serve,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();
}

fn write_stdout(text: &str) -> Result<()> {
    let mut stdout = io::stdout().lock();
    stdout
        .write_all(text.as_bytes())
        .and_then(|_| stdout.flush())
        .map_err(|e| JacobiError::OutputError {
            message: e.to_string(),
        })
}

fn format_vector(values: &[f64]) -> String {
    let fields: Vec<String> = values.iter().map(|v| format!("{v:.6}")).collect();
    format!("[{}]", fields.join(", "))
}

fn render_result(result: &IterationResult, with_steps: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Converged after {} iterations (norm {:.6})", result.iterations, result.norm);

    if with_steps {
        for (k, step) in result.steps.iter().enumerate() {
            let _ = writeln!(out, "  step {:>6}: {}", k, format_vector(step));
        }
    }

    for (k, value) in result.solution.iter().enumerate() {
        let _ = writeln!(out, "x{} = {:.6}", result.unknown_order[k] + 1, value);
    }
    let _ = writeln!(out, "precision vector: {}", format_vector(&result.precision_vector));
    out
}

fn solve(file: PathBuf, precision: Option<f64>, max_iterations: usize, steps: bool, json: bool) -> Result<()> {
    let parsed = input::parse_file(&file)?;
    let precision = precision.unwrap_or(parsed.accuracy);

    let config = SolverConfig::new().with_max_iterations(max_iterations);
    let worker = Worker::spawn(config)?;
    let mut observer = |event: ProgressEvent| {
        info!(iterations = event.iterations, norm = event.norm, "iterating");
    };
    let result = worker.solve(parsed.matrix, precision, &mut observer)?;

    if json {
        let text = serde_json::to_string_pretty(&result).map_err(|e| JacobiError::OutputError {
            message: e.to_string(),
        })?;
        write_stdout(&format!("{text}\n"))
    } else {
        write_stdout(&render_result(&result, steps))
    }
}

fn generate(size: usize, min: f64, max: f64, precision: f64, seed: Option<u64>) -> Result<()> {
    let matrix = match seed {
        Some(seed) => generator::generate_matrix_with(&mut StdRng::seed_from_u64(seed), size, min, max)?,
        None => generator::generate_matrix(size, min, max)?,
    };
    write_stdout(&input::to_text(precision, &matrix))
}

fn serve() -> Result<()> {
    let mut solver = JacobiSolver::new();

    for line in io::stdin().lock().lines() {
        let line = line.map_err(|e| JacobiError::invalid_request(e.to_string()))?;
        if line.trim().is_empty() {
            continue;
        }

        let mut observer = |event: ProgressEvent| {
            // Progress is best effort; the terminal message reports failures.
            if let Ok(text) = Response::Progress(event).to_json() {
                let _ = write_stdout(&format!("{text}\n"));
            }
        };
        let response = handle_message(&line, &mut solver, &mut observer);
        write_stdout(&format!("{}\n", response.to_json()?))?;
    }

    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    match args.command {
        Command::Solve {
            file,
            precision,
            max_iterations,
            steps,
            json,
        } => solve(file, precision, max_iterations, steps, json),
        Command::Generate {
            size,
            min,
            max,
            precision,
            seed,
        } => generate(size, min, max, precision, seed),
        Command::Serve => serve(),
    }
}
