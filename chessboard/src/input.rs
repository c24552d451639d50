//! Pointer drag lifecycle and the board-level input vocabulary.

use shakmaty::Square;

use crate::layout::BoardLayout;
use crate::session::ChessSession;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Drag {
    pub origin: Square,
    /// Cursor in surface pixels.
    pub cursor: (i32, i32),
    /// Legal destinations of the dragged piece, sorted.
    pub destinations: Vec<Square>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DragState {
    #[default]
    Idle,
    Dragging(Drag),
}

impl DragState {
    pub fn is_dragging(&self) -> bool {
        matches!(self, DragState::Dragging(_))
    }

    pub fn drag(&self) -> Option<&Drag> {
        match self {
            DragState::Dragging(drag) => Some(drag),
            DragState::Idle => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome {
    Accepted { san: String },
    Rejected,
    /// Release without a drag in progress.
    Ignored,
}

/// Board input in surface pixels, independent of the window system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardInput {
    Press { x: i32, y: i32 },
    Motion { x: i32, y: i32 },
    Release { x: i32, y: i32 },
    Reset,
    TakeBack,
    Forward,
}

/// Applies one input to `session`, resolving pointer positions through `layout`.
///
/// Returns the drop outcome for releases and `None` for everything else.
pub fn dispatch(
    session: &mut ChessSession,
    layout: &BoardLayout,
    input: BoardInput,
) -> Option<DropOutcome> {
    match input {
        BoardInput::Press { x, y } => {
            session.press(layout.square_at(x, y), (x, y));
            None
        }
        BoardInput::Motion { x, y } => {
            session.drag_to((x, y));
            None
        }
        BoardInput::Release { x, y } => Some(session.release(layout.square_at(x, y))),
        BoardInput::Reset => {
            session.reset();
            None
        }
        BoardInput::TakeBack => {
            session.take_back();
            None
        }
        BoardInput::Forward => {
            session.replay_forward();
            None
        }
    }
}
