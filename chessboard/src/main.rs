use std::process::ExitCode;

use chessboard::app::{self, ChessApp};
use chessboard::cli;
use chessboard::error::AppError;
use chessboard::rules::BoardState;
use chessboard::session::ChessSession;
use chessboard::settings::SettingsStore;
use chessboard::sprites::SpriteSet;
use engine::app::{AppConfig, run_game};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "chessboard failed");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), AppError> {
    let cli = cli::parse_args(std::env::args().skip(1))?;
    if cli.help {
        cli::print_help();
        return Ok(());
    }

    let store = cli
        .settings
        .clone()
        .map(SettingsStore::new)
        .unwrap_or_else(SettingsStore::from_env);
    let settings = store.load_or_init();
    info!(path = %store.path().display(), "settings loaded");

    let board = match cli.fen.as_deref().or(settings.game.start_fen.as_deref()) {
        Some(fen) => BoardState::new(fen)?,
        None => BoardState::standard(),
    };
    let mut session = ChessSession::new(board).with_tags(settings.game.tags());
    if let Some(path) = &cli.pgn {
        session.load_pgn(&app::read_text(path)?)?;
        info!(path = %path.display(), moves = session.record().len(), "loaded game");
    }

    let assets = cli.assets.clone().or_else(|| settings.paths.assets_dir.clone());
    let sprites = SpriteSet::load(assets.as_deref())?;

    let mut config = AppConfig::new(
        "Chessboard",
        settings.video.window_width,
        settings.video.window_height,
    );
    config.vsync = Some(settings.video.vsync);

    info!(fen = %session.board().fen(), "starting");
    run_game(config, ChessApp::new(&settings, sprites), session)?;
    Ok(())
}
