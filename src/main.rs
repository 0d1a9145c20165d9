use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use log::LevelFilter;

use spell_chess::cards::card_catalog::CardCatalog;
use spell_chess::game_state::chess_rules::STARTING_POSITION_FEN;
use spell_chess::session::game_session::{GameSession, SessionConfig};
use spell_chess::session::match_registry::MatchRegistry;
use spell_chess::session::protocol::run_stdio_loop;

/// Spell chess match server speaking one JSON object per line on stdin/stdout.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Fixed RNG seed for every match (random when omitted).
    #[arg(long)]
    seed: Option<u64>,

    /// Starting position.
    #[arg(long, default_value = STARTING_POSITION_FEN)]
    fen: String,

    #[arg(long, default_value_t = LevelFilter::Info)]
    log_level: LevelFilter,

    /// Also append log output to this file.
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Light's starting hand, as comma-separated card ids.
    #[arg(long, value_delimiter = ',', default_value = "avada_kedavra")]
    hand_light: Vec<String>,

    /// Dark's starting hand, as comma-separated card ids.
    #[arg(long, value_delimiter = ',', default_value = "cruciatus,imperius")]
    hand_dark: Vec<String>,
}

fn setup_logging(level: LevelFilter, log_file: Option<&PathBuf>) -> Result<(), fern::InitError> {
    let mut dispatch = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{} [{}] {}: {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level)
        .chain(std::io::stderr());

    if let Some(path) = log_file {
        dispatch = dispatch.chain(fern::log_file(path)?);
    }

    dispatch.apply()?;
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(err) = setup_logging(args.log_level, args.log_file.as_ref()) {
        eprintln!("failed to set up logging: {err}");
        return ExitCode::FAILURE;
    }

    let config = SessionConfig {
        fen: args.fen,
        hands: [args.hand_light, args.hand_dark],
        seed: args.seed,
    };
    let catalog = Arc::new(CardCatalog::standard());

    // Reject a bad configuration at start-up rather than on the first `create`.
    if let Err(err) = GameSession::new(&config, Arc::clone(&catalog)) {
        log::error!("invalid configuration: {err}");
        return ExitCode::FAILURE;
    }

    let registry = MatchRegistry::new(config, catalog);
    log::info!("serving matches on stdin/stdout");

    match run_stdio_loop(&registry) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("protocol loop stopped: {err}");
            ExitCode::FAILURE
        }
    }
}
