use clap::Parser;
use fifteen_solver::engine::{Direction, State};
use fifteen_solver::solver::{shortest, Solver};
use fifteen_solver::utils::random_walk;
use fifteen_solver::Heuristic;
use std::io::{self, Write};

/// Hint searches give up after this many expansions.
const HINT_EXPANSION_LIMIT: u64 = 2_000_000;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Seed for the scramble
    #[clap(short, long, default_value_t = 514514)]
    seed: u64,

    /// Number of random moves used to scramble the board
    #[clap(short, long, default_value_t = 20)]
    depth: usize,
}

/// Maps a key to the direction the blank travels.
fn parse_direction(input: &str) -> Option<Direction> {
    match input {
        "w" | "up" => Some(Direction::Up),
        "s" | "down" => Some(Direction::Down),
        "a" | "left" => Some(Direction::Left),
        "d" | "right" => Some(Direction::Right),
        _ => None,
    }
}

fn hint(state: &State) -> Option<Direction> {
    let mut solver =
        Solver::new(*state, Heuristic::LinearConflict).with_expansion_limit(HINT_EXPANSION_LIMIT);
    let solutions = solver.solve().ok()?;
    shortest(&solutions).and_then(|s| s.moves.first().copied())
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let mut state = random_walk(args.seed, args.depth);
    let mut history: Vec<Direction> = Vec::new();
    let mut last_moved: Option<usize> = None;
    println!("Welcome to the 15-puzzle!");

    loop {
        println!("---------------------");
        println!("Moves: {}", history.len());
        println!("{}", state.to_string_with_highlight(last_moved));

        if state.is_goal() {
            println!();
            println!("---------------------");
            println!("🎉 SOLVED! 🎉");
            println!("Total moves: {}", history.len());
            println!("---------------------");
            break;
        }

        print!("Move the blank (w/a/s/d), 'u' to undo, 'h' for a hint, 'q' to quit: ");
        if io::stdout().flush().is_err() {
            break;
        }

        let mut input = String::new();
        match io::stdin().read_line(&mut input) {
            Ok(0) => break,
            Ok(_) => {}
            Err(_) => {
                println!("Error reading input. Please try again.");
                continue;
            }
        }

        let trimmed_input = input.trim().to_lowercase();

        match trimmed_input.as_str() {
            "q" => {
                println!("Thanks for playing!");
                break;
            }
            "u" => match history.pop() {
                Some(direction) => {
                    let previous_blank = state.blank();
                    if state.apply_move(direction.opposite()).is_ok() {
                        last_moved = Some(previous_blank);
                        println!("Move undone.");
                    }
                }
                None => println!("Cannot undo further (no moves made)."),
            },
            "h" => match hint(&state) {
                Some(direction) => println!("Hint: move the blank {}.", direction),
                None => println!("No hint available."),
            },
            other => match parse_direction(other) {
                Some(direction) => {
                    let previous_blank = state.blank();
                    match state.apply_move(direction) {
                        Ok(_) => {
                            history.push(direction);
                            last_moved = Some(previous_blank);
                        }
                        Err(e) => println!("Invalid move: {}.", e),
                    }
                }
                None => println!("Invalid input. Use w/a/s/d, 'u', 'h' or 'q'."),
            },
        }
    }
}
