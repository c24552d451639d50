use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::layout::{BoardLayout, DEFAULT_MARGIN, DEFAULT_SQUARE_SIZE};

const MIN_SQUARE_SIZE: u32 = 8;
const MAX_SQUARE_SIZE: u32 = 256;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct BoardSettings {
    pub square_size: u32,
    pub margin_x: u32,
    pub margin_y: u32,
    /// Rescale the board to the window instead of keeping `square_size`.
    pub fit_to_window: bool,
}

impl Default for BoardSettings {
    fn default() -> Self {
        Self {
            square_size: DEFAULT_SQUARE_SIZE,
            margin_x: DEFAULT_MARGIN.0,
            margin_y: DEFAULT_MARGIN.1,
            fit_to_window: false,
        }
    }
}

impl BoardSettings {
    pub fn margin(self) -> (u32, u32) {
        (self.margin_x, self.margin_y)
    }

    pub fn layout(self) -> BoardLayout {
        BoardLayout::new(self.margin(), self.square_size)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct VideoSettings {
    pub window_width: u32,
    pub window_height: u32,
    pub fullscreen_width: u32,
    pub fullscreen_height: u32,
    pub vsync: bool,
}

impl Default for VideoSettings {
    fn default() -> Self {
        Self {
            window_width: 800,
            window_height: 600,
            fullscreen_width: 1920,
            fullscreen_height: 1080,
            vsync: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameSettings {
    /// Starting position; the standard start when unset.
    pub start_fen: Option<String>,
    pub event: String,
    pub white: String,
    pub black: String,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            start_fen: None,
            event: "Casual game".to_string(),
            white: "?".to_string(),
            black: "?".to_string(),
        }
    }
}

impl GameSettings {
    pub fn tags(&self) -> Vec<(String, String)> {
        vec![
            ("Event".to_string(), self.event.clone()),
            ("White".to_string(), self.white.clone()),
            ("Black".to_string(), self.black.clone()),
        ]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PathSettings {
    /// Directory holding `wP.png` .. `bK.png`.
    pub assets_dir: Option<PathBuf>,
    pub export_pgn: PathBuf,
    pub import_pgn: PathBuf,
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            assets_dir: Some(PathBuf::from("assets")),
            export_pgn: PathBuf::from("game.pgn"),
            import_pgn: PathBuf::from("game.pgn"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChessSettings {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub board: BoardSettings,
    #[serde(default)]
    pub video: VideoSettings,
    #[serde(default)]
    pub game: GameSettings,
    #[serde(default)]
    pub paths: PathSettings,
}

impl Default for ChessSettings {
    fn default() -> Self {
        Self {
            version: default_version(),
            board: BoardSettings::default(),
            video: VideoSettings::default(),
            game: GameSettings::default(),
            paths: PathSettings::default(),
        }
    }
}

impl ChessSettings {
    pub fn sanitized(mut self) -> Self {
        self.version = default_version();
        self.board.square_size = self.board.square_size.clamp(MIN_SQUARE_SIZE, MAX_SQUARE_SIZE);
        let defaults = VideoSettings::default();
        if self.video.window_width == 0 || self.video.window_height == 0 {
            self.video.window_width = defaults.window_width;
            self.video.window_height = defaults.window_height;
        }
        if self.video.fullscreen_width == 0 || self.video.fullscreen_height == 0 {
            self.video.fullscreen_width = defaults.fullscreen_width;
            self.video.fullscreen_height = defaults.fullscreen_height;
        }
        if self
            .game
            .start_fen
            .as_deref()
            .is_some_and(|fen| fen.trim().is_empty())
        {
            self.game.start_fen = None;
        }
        self
    }
}

fn default_version() -> u32 {
    1
}

#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn from_env() -> Self {
        if let Some(explicit) = std::env::var_os("CHESSBOARD_SETTINGS_PATH") {
            return Self::new(explicit);
        }

        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))
            .unwrap_or_else(|| PathBuf::from("."));

        Self::new(base.join("chessboard").join("settings.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Defaults when the file is missing or does not parse.
    pub fn load(&self) -> ChessSettings {
        let Ok(bytes) = fs::read(&self.path) else {
            debug!(path = %self.path.display(), "no settings file; using defaults");
            return ChessSettings::default();
        };
        match serde_json::from_slice::<ChessSettings>(&bytes) {
            Ok(settings) => settings.sanitized(),
            Err(err) => {
                warn!(path = %self.path.display(), %err, "invalid settings file; using defaults");
                ChessSettings::default()
            }
        }
    }

    /// Like [`load`](Self::load), but writes the defaults out when no settings file exists yet.
    pub fn load_or_init(&self) -> ChessSettings {
        if self.path.exists() {
            return self.load();
        }
        let settings = ChessSettings::default();
        match self.save(&settings) {
            Ok(()) => debug!(path = %self.path.display(), "wrote default settings"),
            Err(err) => warn!(path = %self.path.display(), %err, "could not write default settings"),
        }
        settings
    }

    pub fn save(&self, settings: &ChessSettings) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let text = serde_json::to_string_pretty(settings)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(&self.path, text)
    }
}
