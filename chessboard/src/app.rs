use std::fs;
use std::path::{Path, PathBuf};

use engine::app::{AppContext, AppControl, GameApp, InputEvent, PointerButton};
use engine::graphics::{self, Renderer2d};
use engine::surface::SurfaceSize;
use tracing::{debug, info, warn};
use winit::dpi::PhysicalSize;
use winit::event::VirtualKeyCode;

use crate::error::AppError;
use crate::input::{self, BoardInput, DropOutcome};
use crate::layout::BoardLayout;
use crate::render::{self, STATUS_TEXT_SCALE};
use crate::session::ChessSession;
use crate::settings::{BoardSettings, ChessSettings};
use crate::sprites::SpriteSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Quit,
    ToggleFullscreen,
    Minimize,
    Reset,
    TakeBack,
    Forward,
    ExportPgn,
    ImportPgn,
}

pub fn map_key_to_command(key: VirtualKeyCode) -> Option<Command> {
    match key {
        VirtualKeyCode::Escape => Some(Command::Quit),
        VirtualKeyCode::F => Some(Command::ToggleFullscreen),
        VirtualKeyCode::M => Some(Command::Minimize),
        VirtualKeyCode::R => Some(Command::Reset),
        VirtualKeyCode::Left => Some(Command::TakeBack),
        VirtualKeyCode::Right => Some(Command::Forward),
        VirtualKeyCode::E => Some(Command::ExportPgn),
        VirtualKeyCode::L => Some(Command::ImportPgn),
        _ => None,
    }
}

pub struct ChessApp {
    sprites: SpriteSet,
    board: BoardSettings,
    layout: BoardLayout,
    fullscreen_size: PhysicalSize<u32>,
    export_path: PathBuf,
    import_path: PathBuf,
}

impl ChessApp {
    pub fn new(settings: &ChessSettings, sprites: SpriteSet) -> Self {
        Self {
            sprites,
            board: settings.board,
            layout: settings.board.layout(),
            fullscreen_size: PhysicalSize::new(
                settings.video.fullscreen_width,
                settings.video.fullscreen_height,
            ),
            export_path: settings.paths.export_pgn.clone(),
            import_path: settings.paths.import_pgn.clone(),
        }
    }

    pub fn layout(&self) -> &BoardLayout {
        &self.layout
    }

    /// Refits the board to `surface` when fitting is enabled; the fixed layout is kept otherwise.
    pub fn relayout(&mut self, surface: SurfaceSize) {
        if !self.board.fit_to_window || surface.is_empty() {
            return;
        }
        let footer = graphics::line_advance_y(STATUS_TEXT_SCALE) * 2;
        let layout = BoardLayout::fitted(surface, self.board.margin(), footer);
        if layout != self.layout {
            debug!(square_size = layout.square_size, "board relayout");
            self.layout = layout;
            self.sprites.retain_size(layout.square_size);
        }
    }

    pub fn export_pgn(&self, session: &ChessSession) -> Result<(), AppError> {
        write_text(&self.export_path, &session.export_pgn())?;
        info!(path = %self.export_path.display(), moves = session.record().len(), "exported pgn");
        Ok(())
    }

    pub fn import_pgn(&self, session: &mut ChessSession) -> Result<(), AppError> {
        let text = read_text(&self.import_path)?;
        session.load_pgn(&text)?;
        info!(path = %self.import_path.display(), fen = %session.board().fen(), "imported pgn");
        Ok(())
    }

    /// Handles everything that does not need the window: pointer drags and session commands.
    pub fn handle_board_event(&mut self, session: &mut ChessSession, event: InputEvent) -> AppControl {
        let board_input = match event {
            InputEvent::PointerPressed {
                x,
                y,
                button: PointerButton::Left,
            } => BoardInput::Press { x, y },
            InputEvent::PointerMoved { x, y } => BoardInput::Motion { x, y },
            InputEvent::PointerReleased {
                x,
                y,
                button: PointerButton::Left,
            } => BoardInput::Release { x, y },
            InputEvent::Resized(size) => {
                self.relayout(size);
                return AppControl::Continue;
            }
            InputEvent::KeyPressed(key) => {
                return match map_key_to_command(key) {
                    Some(command) => self.run_command(session, command),
                    None => AppControl::Continue,
                };
            }
            InputEvent::PointerPressed { .. } | InputEvent::PointerReleased { .. } => {
                return AppControl::Continue;
            }
        };
        if let Some(DropOutcome::Accepted { san }) = input::dispatch(session, &self.layout, board_input) {
            debug!(%san, "dropped");
        }
        AppControl::Continue
    }

    /// Runs a session command. Window commands are no-ops here.
    pub fn run_command(&mut self, session: &mut ChessSession, command: Command) -> AppControl {
        match command {
            Command::Quit => return AppControl::Exit,
            Command::Reset => session.reset(),
            Command::TakeBack => {
                if !session.take_back() {
                    debug!("nothing to take back");
                }
            }
            Command::Forward => {
                if !session.replay_forward() {
                    debug!("nothing to replay");
                }
            }
            Command::ExportPgn => {
                if let Err(err) = self.export_pgn(session) {
                    warn!(%err, "pgn export failed");
                }
            }
            Command::ImportPgn => {
                if let Err(err) = self.import_pgn(session) {
                    warn!(%err, "pgn import failed");
                }
            }
            Command::ToggleFullscreen | Command::Minimize => {}
        }
        AppControl::Continue
    }
}

impl GameApp for ChessApp {
    type State = ChessSession;

    fn init(&mut self, _session: &mut ChessSession, ctx: &mut AppContext) {
        self.relayout(ctx.surface_size());
    }

    fn handle_input(
        &mut self,
        session: &mut ChessSession,
        event: InputEvent,
        ctx: &mut AppContext,
    ) -> AppControl {
        if let InputEvent::KeyPressed(key) = event {
            match map_key_to_command(key) {
                Some(Command::ToggleFullscreen) => {
                    ctx.toggle_fullscreen(self.fullscreen_size);
                    return AppControl::Continue;
                }
                Some(Command::Minimize) => {
                    ctx.minimize();
                    return AppControl::Continue;
                }
                _ => {}
            }
        }
        self.handle_board_event(session, event)
    }

    fn render(&mut self, session: &ChessSession, gfx: &mut dyn Renderer2d) {
        render::draw_scene(gfx, session, &self.layout, &mut self.sprites);
    }
}

pub fn read_text(path: &Path) -> Result<String, AppError> {
    fs::read_to_string(path).map_err(|source| AppError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn write_text(path: &Path, text: &str) -> Result<(), AppError> {
    let io_err = |source| AppError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
    }
    fs::write(path, text).map_err(io_err)
}
