#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line host for simulating Polaris Arena placements and asking the
//! lookahead agent for moves.

mod layout;
mod layout_transfer;

use std::{
    fs,
    io::{self, Read},
    path::{Path, PathBuf},
};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use polaris_core::{Board, Coord, EngineConfig, Player, Polarity};
use polaris_system_boundary::{energy_gain, score_totals, translate_ejections};
use polaris_system_cascade::{CascadeManager, CascadeResult};
use polaris_system_heuristics::evaluate;
use polaris_system_lookahead::{Difficulty, LookaheadAgent};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::{
    layout::{parse_layout, render_layout},
    layout_transfer::{is_transfer_string, BoardSnapshot},
};

const STDIN_SOURCE: &str = "-";

/// Polaris Arena command-line interface.
#[derive(Debug, Parser)]
#[command(name = "polaris", author, version, about = "Polaris Arena cascade engine")]
struct Cli {
    /// JSON file overriding the engine configuration.
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,
    /// Enables debug logging unless `RUST_LOG` says otherwise.
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: CliCommand,
}

/// Operations exposed by the binary.
#[derive(Debug, Subcommand)]
enum CliCommand {
    /// Places a token and prints every cascade step.
    Simulate {
        #[command(flatten)]
        board: BoardArgs,
        /// Target cell in notation such as `C3`.
        #[arg(long, value_name = "CELL")]
        place: String,
        /// Polarity of the placed token.
        #[arg(long, value_enum)]
        polarity: PolarityArg,
        /// Player placing the token.
        #[arg(long, value_enum, default_value = "1")]
        player: PlayerArg,
    },
    /// Asks the lookahead agent for a placement.
    Suggest {
        #[command(flatten)]
        board: BoardArgs,
        /// Player to move.
        #[arg(long, value_enum, default_value = "1")]
        player: PlayerArg,
        /// Search strength.
        #[arg(long, default_value = "tactical")]
        difficulty: Difficulty,
    },
    /// Prints the heuristic evaluation of a board.
    Evaluate {
        #[command(flatten)]
        board: BoardArgs,
        /// Player whose perspective is scored.
        #[arg(long, value_enum, default_value = "1")]
        player: PlayerArg,
    },
}

/// Where the starting board comes from.
#[derive(Debug, clap::Args)]
struct BoardArgs {
    /// Transfer string, inline layout using `/` between rows, file path, or
    /// `-` for standard input. Defaults to an empty board.
    #[arg(long, value_name = "LAYOUT")]
    board: Option<String>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PlayerArg {
    #[value(name = "1")]
    One,
    #[value(name = "2")]
    Two,
}

impl From<PlayerArg> for Player {
    fn from(value: PlayerArg) -> Self {
        match value {
            PlayerArg::One => Player::One,
            PlayerArg::Two => Player::Two,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PolarityArg {
    #[value(name = "a", alias = "alpha")]
    Alpha,
    #[value(name = "b", alias = "beta")]
    Beta,
}

impl From<PolarityArg> for Polarity {
    fn from(value: PolarityArg) -> Self {
        match value {
            PolarityArg::Alpha => Polarity::Alpha,
            PolarityArg::Beta => Polarity::Beta,
        }
    }
}

/// Entry point for the Polaris Arena command-line interface.
fn main() -> Result<()> {
    let cli = Cli::parse();
    install_logging(cli.verbose);

    let config = load_config(cli.config.as_deref())?;
    debug!(?config, "engine configuration loaded");

    match cli.command {
        CliCommand::Simulate {
            board,
            place,
            polarity,
            player,
        } => {
            let board = load_board(board.board.as_deref())?;
            let cell = Coord::from_notation(&place)
                .ok_or_else(|| anyhow!("`{place}` is not a cell, expected A1 through E5"))?;
            simulate(&board, &config, cell, polarity.into(), player.into())
        }
        CliCommand::Suggest {
            board,
            player,
            difficulty,
        } => {
            let board = load_board(board.board.as_deref())?;
            suggest(&board, &config, player.into(), difficulty);
            Ok(())
        }
        CliCommand::Evaluate { board, player } => {
            let board = load_board(board.board.as_deref())?;
            print_evaluation(&board, player.into());
            Ok(())
        }
    }
}

fn install_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    let config = match path {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("failed to parse config {}", path.display()))?
        }
        None => EngineConfig::default(),
    };
    config.validate().context("invalid engine configuration")?;
    Ok(config)
}

fn load_board(source: Option<&str>) -> Result<Board> {
    let Some(source) = source else {
        return Ok(Board::new());
    };
    if source == STDIN_SOURCE {
        let mut text = String::new();
        let _ = io::stdin()
            .read_to_string(&mut text)
            .context("failed to read board from standard input")?;
        return parse_board(&text);
    }
    let path = Path::new(source);
    if path.is_file() {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read board {}", path.display()))?;
        return parse_board(&text);
    }
    parse_board(source)
}

fn parse_board(text: &str) -> Result<Board> {
    if is_transfer_string(text) {
        let snapshot = BoardSnapshot::decode(text).context("invalid transfer string")?;
        return snapshot.restore().context("invalid transfer string");
    }
    parse_layout(text).context("invalid board layout")
}

fn simulate(
    board: &Board,
    config: &EngineConfig,
    cell: Coord,
    polarity: Polarity,
    player: Player,
) -> Result<()> {
    let cascade = CascadeManager::from_config(config);
    let token = board.fresh_token(player, polarity);
    let result = cascade
        .simulate(cell, token, board)
        .with_context(|| format!("cannot place at {cell}"))?;
    info!(%cell, steps = result.chain_length(), "simulation finished");

    print_steps(&result);

    println!();
    print!("{}", render_layout(&result.final_board));
    println!("{}", BoardSnapshot::capture(&result.final_board).encode()?);

    println!();
    for ejection in &result.ejections {
        println!(
            "ejected token {} of player {} from {}",
            ejection.token.get(),
            ejection.owner.seat(),
            ejection.from
        );
    }
    let totals = score_totals(&translate_ejections(&result.ejections));
    println!("score: player 1 {:+}, player 2 {:+}", totals[0], totals[1]);
    println!(
        "energy: player {} gains {}",
        player.seat(),
        energy_gain(&result.ejections, player, config.energy_per_turn)
    );
    if result.was_stable() {
        println!("stable: no token moved");
    }
    Ok(())
}

fn print_steps(result: &CascadeResult) {
    for step in &result.steps {
        let triggers: Vec<String> = step.triggers.iter().map(ToString::to_string).collect();
        println!(
            "step {}: triggers [{}], {} moves, {} ejections, {} conflicts",
            step.index,
            triggers.join(", "),
            step.moves.len(),
            step.ejections.len(),
            step.conflicts
        );
        for event in &step.moves {
            println!(
                "  token {} {} -> {} (priority {})",
                event.token.get(),
                event.from,
                event.to,
                event.priority
            );
        }
        for event in &step.ejections {
            println!("  token {} {} -> off board", event.token.get(), event.from);
        }
        for collision in &step.collisions {
            let target = collision
                .to
                .map_or_else(|| "off board".to_owned(), |cell| cell.to_string());
            println!(
                "  collision {:?}: token {} {} -> {} (trigger {})",
                collision.kind,
                collision.token.get(),
                collision.from,
                target,
                collision.trigger
            );
        }
    }
}

fn suggest(board: &Board, config: &EngineConfig, player: Player, difficulty: Difficulty) {
    let agent = LookaheadAgent::with_cascade(difficulty, player, CascadeManager::from_config(config));
    match agent.decide(board) {
        Some(decision) => match decision.score {
            Some(score) => println!("{} (score {score})", decision.candidate),
            None => println!("{}", decision.candidate),
        },
        None => println!("no legal placement"),
    }
}

fn print_evaluation(board: &Board, player: Player) {
    let evaluation = evaluate(board, player);
    println!("player {}: {}", player.seat(), evaluation.score);
    println!("  tokens         {}", evaluation.token_count);
    println!("  center control {}", evaluation.center_control);
    println!("  stability      {}", evaluation.stability);
    println!("  risk           {}", evaluation.risk);
}

