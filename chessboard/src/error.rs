use std::io;
use std::path::PathBuf;

use engine::EngineError;
use engine::image::ImageError;
use thiserror::Error;

use crate::rules::BoardError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Board(#[from] BoardError),
    #[error("failed to load piece sprites: {0}")]
    Sprite(#[from] ImageError),
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{0} (try --help)")]
    Cli(String),
}
