use clap::Parser;
use fifteen_solver::solver::{shortest, Solver};
use fifteen_solver::utils::random_walk;
use fifteen_solver::Heuristic;
use std::collections::HashMap;
use std::time::{Duration, Instant};

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Number of scrambled boards to evaluate
    #[clap(short, long, default_value_t = 20)]
    boards: usize,

    /// Number of random moves used to scramble each board
    #[clap(short, long, default_value_t = 16)]
    depth: usize,

    /// Seed of the first board; board `i` uses `seed + i`
    #[clap(short, long, default_value_t = 0)]
    seed: u64,

    /// Give up on a board after expanding this many nodes
    #[clap(short, long, default_value_t = 5_000_000)]
    limit: u64,
}

#[derive(Default)]
struct Tally {
    solved: usize,
    total_cost: u64,
    total_expanded: u64,
    total_time: Duration,
    /// Boards where the shortest path found was longer than the best of all heuristics.
    suboptimal: usize,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let mut tallies: HashMap<Heuristic, Tally> = HashMap::new();

    println!("Starting heuristic evaluation for {} boards...", args.boards);

    for board_idx in 0..args.boards {
        let current_seed = args.seed + board_idx as u64;
        let start = random_walk(current_seed, args.depth);
        println!("\nEvaluating Board {} (Seed: {})", board_idx, current_seed);

        let mut costs: Vec<(Heuristic, u32)> = Vec::new();
        for heuristic in Heuristic::ALL {
            let mut solver = Solver::new(start, heuristic).with_expansion_limit(args.limit);
            let started = Instant::now();
            let result = solver.solve();
            let elapsed = started.elapsed();
            let tally = tallies.entry(heuristic).or_default();

            match result {
                Ok(solutions) => match shortest(&solutions) {
                    Some(best) => {
                        let expanded = solver.stats().expanded;
                        println!(
                            "  Heuristic: {:<20} Cost: {:<4} Expanded: {:<10} Time: {:.3}s",
                            heuristic,
                            best.cost,
                            expanded,
                            elapsed.as_secs_f64()
                        );
                        tally.solved += 1;
                        tally.total_cost += u64::from(best.cost);
                        tally.total_expanded += expanded;
                        tally.total_time += elapsed;
                        costs.push((heuristic, best.cost));
                    }
                    None => println!("  Heuristic: {:<20} found no solution", heuristic),
                },
                Err(e) => println!("  Heuristic: {:<20} failed: {}", heuristic, e),
            }
        }

        if let Some(optimal) = costs.iter().map(|&(_, cost)| cost).min() {
            for &(heuristic, cost) in &costs {
                if cost > optimal {
                    if let Some(tally) = tallies.get_mut(&heuristic) {
                        tally.suboptimal += 1;
                    }
                }
            }
        }
    }

    println!("\n--- Evaluation Complete ---");
    println!("Number of boards evaluated: {}", args.boards);
    println!("\n--- Averages over solved boards ---");

    for heuristic in Heuristic::ALL {
        let Some(tally) = tallies.get(&heuristic) else {
            continue;
        };
        if tally.solved == 0 {
            println!("Heuristic {:<20}: no board solved.", heuristic);
            continue;
        }
        let n = tally.solved as f64;
        println!(
            "Heuristic {:<20}: solved {:>3}, avg cost {:>6.2}, avg expanded {:>10.1}, avg time {:.3}s, longer than best {} time(s)",
            heuristic,
            tally.solved,
            tally.total_cost as f64 / n,
            tally.total_expanded as f64 / n,
            tally.total_time.as_secs_f64() / n,
            tally.suboptimal
        );
    }
}
