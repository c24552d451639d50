pub mod app;
pub mod graphics;
pub mod image;
pub mod pixels_renderer;
pub mod surface;
pub mod ui;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),
    #[error("pixels backend error: {0}")]
    Pixels(#[from] pixels::Error),
}
