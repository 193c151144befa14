mod output;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use karuah_core::{Promotion, Square};
use karuah_engine::rules::{make_move, perft_divide, MoveMode};
use karuah_engine::{parse_san, perft, EngineConfig, Position, Tables};
use tracing::info;
use tracing_subscriber::EnvFilter;

use output::{PlayJson, PlayedMove};

#[derive(Parser)]
#[command(name = "karuah")]
#[command(about = "Drive the Karuah Chess position engine by hand")]
struct Cli {
    /// Configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a position with its hashes and status
    Show {
        /// Position to show; the configured start if omitted
        #[arg(long)]
        fen: Option<String>,
    },
    /// Check whether a position could be searched
    Verify {
        #[arg(long)]
        fen: String,
    },
    /// Play moves and print the result
    Play {
        #[arg(long)]
        fen: Option<String>,
        /// Read moves as SAN instead of coordinates (e2e4, e7e8q)
        #[arg(long)]
        san: bool,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
        moves: Vec<String>,
    },
    /// Count leaf nodes of the legal move tree
    Perft {
        #[arg(short, long, default_value = "3")]
        depth: u32,
        #[arg(long)]
        fen: Option<String>,
        /// Show the count below each first move
        #[arg(long)]
        divide: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => EngineConfig::load_from(path),
        None => EngineConfig::load(),
    }
    .context("loading configuration")?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let tables = Tables::shared().context("building lookup tables")?;
    let start = |fen: Option<String>| -> Result<Position> {
        let mut session = config.session(tables.clone())?;
        if let Some(fen) = fen {
            session
                .main_mut()
                .set_full_fen(&fen)
                .with_context(|| format!("invalid FEN: {fen}"))?;
        }
        Ok(session.main().clone())
    };

    match cli.command {
        Commands::Show { fen } => show(&start(fen)?),
        Commands::Verify { fen } => {
            let position = start(Some(fen))?;
            let diagnostic = position.verify_board_configuration();
            println!("{} ({})", diagnostic, diagnostic.code());
            if !diagnostic.is_valid() {
                std::process::exit(1);
            }
        }
        Commands::Play {
            fen,
            san,
            json,
            moves,
        } => {
            let mut position = start(fen)?;
            let played = play(&mut position, &moves, san)?;
            if json {
                let report = PlayJson::new(&position, &played);
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                let line: Vec<&str> = played.iter().map(|m| m.san.as_str()).collect();
                println!("{}", line.join(" "));
                show(&position);
            }
        }
        Commands::Perft { depth, fen, divide } => {
            let mut position = start(fen)?;
            info!(depth, fen = %position.full_fen(), "perft");
            if divide {
                let results = perft_divide(&mut position, depth);
                for (mv, nodes) in &results {
                    println!("{mv}: {nodes}");
                }
                let total: u64 = results.iter().map(|(_, n)| n).sum();
                println!("\nTotal: {total}");
            } else {
                println!("{}", perft(&mut position, depth));
            }
        }
    }

    Ok(())
}

fn show(position: &Position) {
    println!("{position}");
    println!("FEN:      {}", position.full_fen());
    println!("Hash:     {:016x}", position.hash());
    println!("To move:  {:016x}", position.hash_with_state());
    println!("Pawns:    {:016x}", position.hash_pawn());
    println!("Material: {:016x}", position.material_hash());
    println!("Status:   {}", position.status());
    println!("Verify:   {}", position.verify_board_configuration());
}

fn play(position: &mut Position, moves: &[String], san: bool) -> Result<Vec<PlayedMove>> {
    let mut played = Vec::with_capacity(moves.len());
    for text in moves {
        let (from, to, promotion) = if san {
            parse_san(position, text).with_context(|| format!("move {text}"))?
        } else {
            parse_coordinate(text)?
        };
        let outcome = make_move(position, from, to, promotion, MoveMode::PLAY)
            .with_context(|| format!("move {text}"))?;
        played.push(PlayedMove::new(&outcome, position.return_message()));
    }
    Ok(played)
}

/// `e2e4`, or `e7e8q` with a promotion letter.
fn parse_coordinate(text: &str) -> Result<(Square, Square, Promotion)> {
    let from = text.get(0..2).and_then(Square::from_algebraic);
    let to = text.get(2..4).and_then(Square::from_algebraic);
    let promotion = match text.get(4..) {
        None | Some("") => Some(Promotion::default()),
        Some(rest) => {
            let mut chars = rest.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Promotion::from_char(c),
                _ => None,
            }
        }
    };
    match (from, to, promotion) {
        (Some(from), Some(to), Some(promotion)) => Ok((from, to, promotion)),
        _ => bail!("not a coordinate move: {text}"),
    }
}
