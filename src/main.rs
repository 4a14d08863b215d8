//! Noughts: a minimax noughts-and-crosses engine.
//!
//! ## Usage
//!
//! - `noughts` - Show a demo
//! - `noughts play` - Play against the engine in the terminal
//! - `noughts protocol` - Serve the text protocol on stdin/stdout
//! - `noughts duel` - Pit the engine against a random player
//!
//! Log output goes to stderr and is controlled by `RUST_LOG`.

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use noughts::board::{Board, Cell};
use noughts::constants::{DEFAULT_MAX_DEPTH, MAX_WIDTH, N};
use noughts::playout::random_move;
use noughts::protocol::ProtocolEngine;
use noughts::search::{Scoring, SearchConfig, best_move, search};

/// Noughts: a minimax noughts-and-crosses engine
#[derive(Parser)]
#[command(name = "noughts")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    engine: EngineArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Board and search settings shared by every command.
#[derive(Args, Debug, Clone, Copy)]
struct EngineArgs {
    /// Board width; a full row, column or diagonal wins
    #[arg(long, global = true, default_value_t = N,
          value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..=MAX_WIDTH as u64))]
    width: usize,

    /// Search horizon in plies
    #[arg(long, global = true, default_value_t = DEFAULT_MAX_DEPTH,
          value_parser = clap::value_parser!(u32).range(1..))]
    depth: u32,

    /// Search every branch instead of pruning with alpha-beta
    #[arg(long, global = true)]
    no_pruning: bool,

    /// Score all wins alike instead of preferring faster ones
    #[arg(long, global = true)]
    flat_scoring: bool,
}

impl EngineArgs {
    fn config(&self) -> SearchConfig {
        let scoring = if self.flat_scoring {
            Scoring::Flat
        } else {
            Scoring::DepthDiscounted
        };
        SearchConfig::new()
            .with_max_depth(self.depth)
            .with_pruning(!self.no_pruning)
            .with_scoring(scoring)
    }

    fn board(&self) -> Result<Board> {
        if self.width == 0 || self.width > MAX_WIDTH {
            bail!("board width must be between 1 and {MAX_WIDTH}");
        }
        Ok(Board::new(self.width))
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Play against the engine; enter moves as `row col`
    Play {
        /// Take Cross and move first (the engine moves first by default)
        #[arg(long)]
        human_first: bool,
    },
    /// Serve the line-oriented text protocol on stdin/stdout
    Protocol,
    /// Play the engine against a random player and print the tally
    Duel {
        /// Number of games
        #[arg(long, default_value_t = 100)]
        games: u32,
        /// Seed for the random player
        #[arg(long, default_value_t = 0)]
        seed: u64,
    },
    /// Run a short demo of the engine
    Demo,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let engine = cli.engine;

    match cli.command {
        Some(Commands::Play { human_first }) => run_play(&engine, human_first),
        Some(Commands::Protocol) => {
            ProtocolEngine::with_config(engine.board()?, engine.config()).run_stdio()
        }
        Some(Commands::Duel { games, seed }) => run_duel(&engine, games, seed),
        Some(Commands::Demo) | None => run_demo(&engine),
    }
}

/// Interactive games against the engine until the user declines a rematch.
fn run_play(engine: &EngineArgs, human_first: bool) -> Result<()> {
    let config = engine.config();
    let human = if human_first { Cell::Cross } else { Cell::Nought };
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        let mut board = engine.board()?;
        println!("You are {human}. Enter moves as `row col`.\n");

        while !board.is_over() {
            if board.active_player() == human {
                print!("{board}{human} to move> ");
                io::stdout().flush()?;
                let Some(line) = lines.next() else {
                    return Ok(());
                };
                let line = line.context("failed to read move")?;
                let Some((row, col)) = parse_move(&line) else {
                    println!("Enter a move as two numbers, e.g. `1 1`.");
                    continue;
                };
                if let Err(err) = board.try_place(row, col) {
                    println!("{err}");
                }
            } else {
                let Some(mv) = best_move(&mut board, &config) else {
                    break;
                };
                board
                    .try_place(mv.row as i32, mv.col as i32)
                    .context("engine chose an illegal move")?;
                println!("Engine plays {mv}");
            }
        }

        println!("\n{board}");
        match board.winner() {
            Cell::Blank => println!("Draw!"),
            winner => println!("{winner} wins!"),
        }

        print!("New game? [y/N] ");
        io::stdout().flush()?;
        let again = match lines.next() {
            Some(line) => line
                .context("failed to read answer")?
                .trim()
                .eq_ignore_ascii_case("y"),
            None => false,
        };
        if !again {
            return Ok(());
        }
    }
}

fn parse_move(line: &str) -> Option<(i32, i32)> {
    let mut parts = line.split_whitespace().map(str::parse::<i32>);
    match (parts.next(), parts.next(), parts.next()) {
        (Some(Ok(row)), Some(Ok(col)), None) => Some((row, col)),
        _ => None,
    }
}

/// Engine versus random player, alternating who moves first.
fn run_duel(engine: &EngineArgs, games: u32, seed: u64) -> Result<()> {
    let config = engine.config();
    let mut rng = fastrand::Rng::with_seed(seed);
    let (mut wins, mut draws, mut losses) = (0u32, 0u32, 0u32);

    for game in 0..games {
        let mut board = engine.board()?;
        let engine_side = if game % 2 == 0 { Cell::Cross } else { Cell::Nought };

        while !board.is_over() {
            let mv = if board.active_player() == engine_side {
                best_move(&mut board, &config)
            } else {
                random_move(&board, &mut rng)
            };
            let Some(mv) = mv else { break };
            board
                .try_place(mv.row as i32, mv.col as i32)
                .context("duel produced an illegal move")?;
        }

        match board.winner() {
            Cell::Blank => draws += 1,
            w if w == engine_side => wins += 1,
            _ => losses += 1,
        }
    }

    info!(games, wins, draws, losses, "duel finished");
    println!("games: {games}  engine wins: {wins}  draws: {draws}  engine losses: {losses}");
    Ok(())
}

fn run_demo(engine: &EngineArgs) -> Result<()> {
    let config = engine.config();
    println!("Noughts: minimax noughts-and-crosses engine\n");

    let mut board = engine.board()?;
    let first = search(&mut board, &config);
    if let Some(mv) = first.best {
        println!(
            "Opening move on an empty {w}x{w} board: {mv} (score {}, {} positions)",
            first.score,
            first.nodes,
            w = board.width()
        );
    }

    let unpruned = search(&mut board, &config.with_pruning(false));
    println!("Without pruning the same search visits {} positions\n", unpruned.nodes);

    println!("=== Engine self-play ===");
    while let Some(mv) = best_move(&mut board, &config) {
        board
            .try_place(mv.row as i32, mv.col as i32)
            .context("engine chose an illegal move")?;
        println!("{} plays {mv}", board.active_player().opponent());
    }
    println!("\n{board}");
    match (board.winner(), board.winning_line()) {
        (Cell::Blank, _) | (_, None) => println!("Draw!"),
        (winner, Some(line)) => println!("{winner} wins on {line}"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_move() {
        assert_eq!(parse_move("1 2"), Some((1, 2)));
        assert_eq!(parse_move("  0   0 "), Some((0, 0)));
        assert_eq!(parse_move("-1 0"), Some((-1, 0)));
        assert_eq!(parse_move("1"), None);
        assert_eq!(parse_move("1 2 3"), None);
        assert_eq!(parse_move("a b"), None);
    }

    #[test]
    fn test_cli_flags_build_config() {
        let cli = Cli::parse_from(["noughts", "--depth", "4", "--no-pruning", "--flat-scoring", "demo"]);
        let config = cli.engine.config();
        assert_eq!(config.max_depth(), 4);
        assert!(!config.pruning());
        assert_eq!(config.scoring(), Scoring::Flat);
    }

    #[test]
    fn test_cli_bounds_width() {
        let cli = Cli::parse_from(["noughts", "--width", "4", "demo"]);
        assert_eq!(cli.engine.width, 4);
        assert!(Cli::try_parse_from(["noughts", "--width", "0"]).is_err());
        assert!(Cli::try_parse_from(["noughts", "--width", "17"]).is_err());
        assert!(Cli::try_parse_from(["noughts", "--width", "100000"]).is_err());
    }

    #[test]
    fn test_cli_rejects_zero_depth() {
        assert!(Cli::try_parse_from(["noughts", "--depth", "0"]).is_err());
    }
}
