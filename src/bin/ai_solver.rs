use clap::Parser;
use fifteen_solver::engine::State;
use fifteen_solver::solver::{shortest, Solver};
use fifteen_solver::utils::{parse_state, random_solvable, random_walk};
use fifteen_solver::Heuristic;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Heuristic used to order the search
    #[clap(short = 'H', long, value_enum, default_value_t = Heuristic::LinearConflict)]
    heuristic: Heuristic,

    /// Seed for generating a start state when no board file is given
    #[clap(short, long, default_value_t = 0)]
    seed: u64,

    /// Number of random moves used to scramble the generated start state
    #[clap(short, long, default_value_t = 20)]
    depth: usize,

    /// Generate a uniformly random solvable permutation instead of a scramble
    #[clap(short, long)]
    random: bool,

    /// Give up after expanding this many nodes
    #[clap(short, long)]
    limit: Option<u64>,

    /// Print every state along each solution, not just the moves
    #[clap(short, long)]
    verbose: bool,

    /// Path to a board file (16 numbers, 0 for the blank)
    board_file: Option<PathBuf>,
}

fn read_board_file(path: &PathBuf) -> Result<State, String> {
    let content =
        fs::read_to_string(path).map_err(|e| format!("Failed to read file: {}", e))?;
    parse_state(&content).map_err(|e| format!("Invalid board format: {}", e))
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    let start = match &args.board_file {
        Some(path) => match read_board_file(path) {
            Ok(state) => {
                println!("Loaded board from {}\n", path.display());
                state
            }
            Err(e) => {
                eprintln!("{}", e);
                return ExitCode::FAILURE;
            }
        },
        None if args.random => random_solvable(args.seed),
        None => random_walk(args.seed, args.depth),
    };

    println!("Initial state:\n{}\n", start);
    println!("Searching with the {} heuristic...\n", args.heuristic);

    let mut solver = Solver::new(start, args.heuristic);
    if let Some(limit) = args.limit {
        solver = solver.with_expansion_limit(limit);
    }

    let started = Instant::now();
    let result = solver.solve();
    let elapsed = started.elapsed();

    let solutions = match result {
        Ok(solutions) => solutions,
        Err(e) => {
            eprintln!("No solution: {}", e);
            return ExitCode::FAILURE;
        }
    };

    for (i, solution) in solutions.iter().enumerate() {
        println!("Solution {} ({} moves): {}", i + 1, solution.cost, solution.move_string());
        if args.verbose {
            for state in &solution.states {
                println!("{}\n", state);
            }
        }
    }

    match shortest(&solutions) {
        Some(best) => println!("\nShortest path consists of {} moves", best.cost),
        None => println!("\nNo solution found."),
    }

    let stats = solver.stats();
    println!(
        "Expanded {} nodes, generated {}, registry holds {}, frontier peaked at {}",
        stats.expanded, stats.generated, stats.registry_size, stats.frontier_high_water
    );
    println!("Time spent searching: {:.3}s", elapsed.as_secs_f64());
    ExitCode::SUCCESS
}
