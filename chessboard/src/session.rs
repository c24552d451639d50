use shakmaty::{Move, Position, Square};
use tracing::{debug, info, warn};

use crate::input::{Drag, DragState, DropOutcome};
use crate::pieces::{PieceSet, PieceVisual};
use crate::record::GameRecord;
use crate::rules::{BoardError, BoardState};

/// Everything one game window needs: the board, its piece visuals, the drag in progress and the
/// move record. Visuals are updated incrementally on accepted moves and rebuilt wholesale on
/// reset, load and navigation.
#[derive(Debug, Clone)]
pub struct ChessSession {
    board: BoardState,
    pieces: PieceSet,
    record: GameRecord,
    drag: DragState,
    tags: Vec<(String, String)>,
}

impl ChessSession {
    pub fn new(board: BoardState) -> Self {
        let pieces = PieceSet::from_position(board.position());
        let record = GameRecord::new(board.position().clone());
        Self {
            board,
            pieces,
            record,
            drag: DragState::Idle,
            tags: Vec::new(),
        }
    }

    pub fn standard() -> Self {
        Self::new(BoardState::standard())
    }

    pub fn from_fen(fen: &str) -> Result<Self, BoardError> {
        Ok(Self::new(BoardState::new(fen)?))
    }

    /// Header tags applied to this record and to every record started by `reset`.
    pub fn with_tags(mut self, tags: Vec<(String, String)>) -> Self {
        for (name, value) in &tags {
            self.record.set_tag(name, value.clone());
        }
        self.tags = tags;
        self
    }

    pub fn board(&self) -> &BoardState {
        &self.board
    }

    pub fn pieces(&self) -> &PieceSet {
        &self.pieces
    }

    pub fn record(&self) -> &GameRecord {
        &self.record
    }

    pub fn drag_state(&self) -> &DragState {
        &self.drag
    }

    /// The dragged visual and the cursor it follows.
    pub fn dragged(&self) -> Option<(&PieceVisual, (i32, i32))> {
        let drag = self.drag.drag()?;
        Some((self.pieces.dragging()?, drag.cursor))
    }

    /// Legal destinations of the dragged piece; empty when idle.
    pub fn selected_destinations(&self) -> &[Square] {
        self.drag
            .drag()
            .map(|drag| drag.destinations.as_slice())
            .unwrap_or_default()
    }

    /// Starts a drag when `square` holds a piece of the side to move.
    pub fn press(&mut self, square: Option<Square>, cursor: (i32, i32)) -> bool {
        if self.drag.is_dragging() {
            return false;
        }
        let Some(square) = square else {
            return false;
        };
        match self.board.piece_at(square) {
            Some(piece) if piece.color == self.board.turn() => {}
            _ => return false,
        }
        let Some(visual) = self.pieces.at_mut(square) else {
            return false;
        };
        visual.begin_drag();
        let destinations = self.board.legal_destinations(square);
        debug!(%square, destinations = destinations.len(), "drag started");
        self.drag = DragState::Dragging(Drag {
            origin: square,
            cursor,
            destinations,
        });
        true
    }

    pub fn drag_to(&mut self, cursor: (i32, i32)) {
        if let DragState::Dragging(drag) = &mut self.drag {
            drag.cursor = cursor;
        }
    }

    /// Ends the drag on `square` (`None` is off the board).
    pub fn release(&mut self, square: Option<Square>) -> DropOutcome {
        let DragState::Dragging(drag) = std::mem::take(&mut self.drag) else {
            return DropOutcome::Ignored;
        };
        let accepted = square
            .filter(|target| drag.destinations.contains(target))
            .and_then(|target| self.board.find_move(drag.origin, target));
        match accepted {
            Some(m) => self.commit(&m),
            None => {
                self.pieces.cancel_drag();
                debug!(origin = %drag.origin, target = ?square, "move rejected");
                DropOutcome::Rejected
            }
        }
    }

    fn commit(&mut self, m: &Move) -> DropOutcome {
        if let Err(err) = self.board.play(m) {
            warn!(%err, "legal move failed to apply");
            self.pieces.cancel_drag();
            return DropOutcome::Rejected;
        }
        self.pieces.apply_move(m);
        let san = self
            .record
            .add_variation(m)
            .and_then(|id| self.record.recorded(id))
            .map(|played| played.san.clone())
            .unwrap_or_default();
        debug_assert!(self.pieces.agrees_with(self.board.position()));
        debug_assert_eq!(self.record.current_position().board(), self.board.position().board());

        info!(%san, fen = %self.board.fen(), "move accepted");
        info!("\n{}", self.record.to_pgn());
        DropOutcome::Accepted { san }
    }

    fn rebuild(&mut self) {
        self.drag = DragState::Idle;
        self.pieces = PieceSet::from_position(self.board.position());
    }

    /// Back to the starting position with an empty record.
    pub fn reset(&mut self) {
        self.board.reset();
        self.record = GameRecord::new(self.board.position().clone());
        for (name, value) in &self.tags {
            self.record.set_tag(name, value.clone());
        }
        self.rebuild();
        debug!(fen = %self.board.fen(), "reset");
    }

    /// Replaces the game with `text`'s first game; on error nothing changes.
    pub fn load_pgn(&mut self, text: &str) -> Result<(), BoardError> {
        let mut board = self.board.clone();
        let record = board.load_pgn(text)?;
        self.board = board;
        self.record = record;
        self.rebuild();
        Ok(())
    }

    /// Steps back one move along the record. Ignored mid-drag.
    pub fn take_back(&mut self) -> bool {
        if self.drag.is_dragging() {
            return false;
        }
        let Some(position) = self.record.back() else {
            return false;
        };
        self.board.set_position(position.clone());
        self.rebuild();
        true
    }

    /// Replays the move most recently taken back (or the main continuation). Ignored mid-drag.
    pub fn replay_forward(&mut self) -> bool {
        if self.drag.is_dragging() {
            return false;
        }
        let Some(position) = self.record.forward() else {
            return false;
        };
        self.board.set_position(position.clone());
        self.rebuild();
        true
    }

    pub fn export_pgn(&self) -> String {
        self.record.to_pgn()
    }
}

impl Default for ChessSession {
    fn default() -> Self {
        Self::standard()
    }
}
