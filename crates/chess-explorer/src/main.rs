mod config;

use anyhow::{bail, Context, Result};
use chess_rules::{Game, NotationStyle, Position, ShortAlgebraic};
use clap::{Parser, ValueEnum};
use config::ExplorerConfig;
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "chess-explorer")]
#[command(about = "Replay a line of moves and show the resulting position")]
struct Cli {
    /// Moves in short algebraic notation, e.g. e4 e5 Nf3
    moves: Vec<String>,
    /// Start position in FEN (defaults to the initial position)
    #[arg(long)]
    fen: Option<String>,
    /// Notation used for the printed line
    #[arg(short, long, value_enum)]
    notation: Option<NotationArg>,
    /// Configuration file (defaults to explorer.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Number of moves to step back after replaying the line
    #[arg(short, long, default_value = "0")]
    back: usize,
    /// Log filter, e.g. "debug" or "chess_rules=trace"
    #[arg(long, default_value = "warn")]
    log_level: String,
}

#[derive(Clone, Copy, ValueEnum)]
enum NotationArg {
    Short,
    Long,
}

impl From<NotationArg> for NotationStyle {
    fn from(arg: NotationArg) -> Self {
        match arg {
            NotationArg::Short => NotationStyle::Short,
            NotationArg::Long => NotationStyle::Long,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_new(&cli.log_level)
        .with_context(|| format!("invalid log level: {}", cli.log_level))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = ExplorerConfig::load(cli.config.as_deref())?;
    let style = cli.notation.map(NotationStyle::from).unwrap_or(config.notation);
    debug!(?style, "configuration loaded");

    let mut game = match &cli.fen {
        Some(fen) => Game::from_fen(fen).with_context(|| format!("invalid FEN: {fen}"))?,
        None => Game::new(),
    };

    let parser = ShortAlgebraic::new(config.symbols.clone());
    for text in &cli.moves {
        let requested = parser
            .parse(game.position(), text)
            .with_context(|| format!("move {} ({text})", game.active_move_index() + 1))?;
        let mv = game.try_make_move(requested, true);
        if !mv.is_ok() {
            bail!("move {text} was rejected: {}", mv.result());
        }
    }
    info!(moves = game.moves().len(), "line replayed");

    for _ in 0..cli.back {
        if !game.undo() {
            break;
        }
    }

    let played: Vec<_> = game.active_moves().iter().map(|mv| mv.info()).collect();
    let formatter = style.formatter(config.symbols);
    let line = formatter.format_line(&game.initial_position(), &played)?;

    if !line.is_empty() {
        println!("{line}");
        println!();
    }
    println!("{}", game.position());
    println!();
    println!("FEN: {}", game.position().to_fen());
    println!("{}", status(game.position()));
    Ok(())
}

fn status(position: &Position) -> String {
    let side = position.side_to_move();
    if position.is_checkmate() {
        format!("Checkmate, {} wins", side.opposite())
    } else if position.is_stalemate() {
        "Stalemate".to_string()
    } else if position.is_check() {
        format!("{side} to move, in check")
    } else {
        format!("{side} to move")
    }
}
