mod bidirectional;
mod benchmark;
mod bits;
mod board;
mod deadlock;
mod errors;
mod heuristic;
mod hungarian;
mod levels;
mod local_search;
mod mcts;
mod pqueue;
mod problem;
mod search;
mod sokoban_problem;
mod state;

use std::time::{SystemTime, UNIX_EPOCH};

use clap::Parser;

use bidirectional::BWeight;
use levels::LevelSet;
use sokoban_problem::SokobanProblem;

/// A Sokoban solver: a bidirectional weighted-A* search core over a
/// reusable best-first/problem-interface framework.
#[derive(Parser)]
#[command(name = "sokoban-core")]
#[command(about = "A Sokoban solver", long_about = None)]
struct Args {
    /// Run the benchmark harness over `levels/level0.txt..level<MAX_LEVEL>.txt`
    /// instead of solving a single level.
    #[arg(long, default_value = "false")]
    test: bool,

    /// Level number to solve (ignored when --test is set).
    #[arg(long, default_value = "1")]
    level: usize,

    /// Log destination file. Unset logs to stderr.
    #[arg(long)]
    log_file: Option<String>,

    /// Forwarded to the renderer this crate does not implement; accepted
    /// and logged at startup, otherwise inert.
    #[arg(long)]
    icon_style: Option<String>,
}

/// `pretty_env_logger::init()` (teacher's own logging call, grounded in
/// `hassek-SokobanSolver/src/main.rs`) only ever writes to stderr, so a
/// `--log-file` destination needs the plain `env_logger::Builder` it's
/// built on instead, pointed at the requested file.
fn init_logging(log_file: &Option<String>) {
    match log_file {
        None => pretty_env_logger::init(),
        Some(path) => {
            let mut builder = env_logger::Builder::new();
            builder.filter_level(log::LevelFilter::Info);
            match std::fs::File::create(path) {
                Ok(file) => {
                    builder.target(env_logger::Target::Pipe(Box::new(file)));
                }
                Err(err) => {
                    eprintln!("could not open log file {}: {}; logging to stderr", path, err);
                }
            }
            let _ = builder.try_init();
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(&args.log_file);

    if let Some(style) = &args.icon_style {
        log::info!("icon-style {} requested (no renderer in this crate; ignored)", style);
    }

    if args.test {
        run_benchmark()
    } else {
        solve_one_level(args.level)
    }
}

fn solve_one_level(level: usize) -> anyhow::Result<()> {
    let levels = LevelSet::default_dir();
    let state = levels.load(level)?;
    let problem = SokobanProblem::new(state);

    log::info!("solving level {}", level);
    let outcome = bidirectional::search(&problem, 3, BWeight::Finite(2), 64);

    match outcome {
        Some(result) => {
            log::info!(
                "solved level {} in {} moves (b_factor={:.2}, nodes={})",
                level,
                result.actions.len(),
                result.b_factor,
                result.nodes_explored
            );
        }
        None => {
            log::warn!("no solution found for level {}", level);
        }
    }

    Ok(())
}

fn run_benchmark() -> anyhow::Result<()> {
    let config = benchmark::BenchmarkConfig::new(
        "levels",
        0..(levels::MAX_LEVEL + 1),
        vec![BWeight::Finite(1), BWeight::Finite(2), BWeight::Finite(4), BWeight::Infinite],
    );

    let results = benchmark::run(&config);

    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "0".to_string());

    let path = benchmark::persist(std::path::Path::new("results"), &timestamp, &results)?;
    log::info!("benchmark results written to {}", path.display());

    Ok(())
}
