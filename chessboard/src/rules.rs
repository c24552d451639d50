//! Board state holder: the only module that asks the rules library about legality.

use shakmaty::fen::{Fen, ParseFenError};
use shakmaty::{
    CastlingMode, Chess, Color, EnPassantMode, Move, Outcome, Piece, Position, PositionError,
    Role, Square,
};
use thiserror::Error;
use tracing::debug;

use crate::pgn::{self, PgnError};
use crate::record::GameRecord;

pub const STANDARD_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

#[derive(Debug, Error)]
pub enum FenError {
    #[error("invalid FEN {fen:?}: {source}")]
    Parse {
        fen: String,
        #[source]
        source: ParseFenError,
    },
    #[error("FEN {fen:?} is not a legal position: {source}")]
    Position {
        fen: String,
        #[source]
        source: Box<PositionError<Chess>>,
    },
}

#[derive(Debug, Error)]
pub enum BoardError {
    #[error(transparent)]
    Fen(#[from] FenError),
    #[error(transparent)]
    Pgn(#[from] PgnError),
    #[error("move {uci} is not legal in {fen}")]
    IllegalMove { uci: String, fen: String },
}

pub fn parse_fen(fen: &str) -> Result<Chess, FenError> {
    let fen = fen.trim();
    let parsed: Fen = fen.parse().map_err(|source| FenError::Parse {
        fen: fen.to_string(),
        source,
    })?;
    parsed
        .into_position(CastlingMode::Standard)
        .map_err(|source| FenError::Position {
            fen: fen.to_string(),
            source: Box::new(source),
        })
}

pub fn to_fen(position: &Chess) -> String {
    Fen::from_position(position.clone(), EnPassantMode::Legal).to_string()
}

/// Where the moving piece lands; castling reports the king's target square (g/c file).
pub fn destination(m: &Move) -> Square {
    match m {
        Move::Castle { king, rook } => {
            let king_idx = u32::from(*king);
            let file = if u32::from(*rook) % 8 > king_idx % 8 { 6 } else { 2 };
            Square::new(king_idx / 8 * 8 + file)
        }
        _ => m.to(),
    }
}

/// UCI text for a standard-chess move, e.g. `e2e4`, `e1g1`, `e7e8q`.
pub fn uci(m: &Move) -> String {
    let from = m.from().map(|sq| sq.to_string()).unwrap_or_default();
    let promotion = m.promotion().map(|role| role.char().to_string()).unwrap_or_default();
    format!("{from}{}{promotion}", destination(m))
}

#[derive(Debug, Clone)]
pub struct BoardState {
    start_fen: String,
    start: Chess,
    position: Chess,
}

impl BoardState {
    pub fn new(fen: &str) -> Result<Self, BoardError> {
        let start = parse_fen(fen)?;
        Ok(Self {
            start_fen: fen.trim().to_string(),
            position: start.clone(),
            start,
        })
    }

    pub fn standard() -> Self {
        Self {
            start_fen: STANDARD_FEN.to_string(),
            start: Chess::default(),
            position: Chess::default(),
        }
    }

    pub fn start_fen(&self) -> &str {
        &self.start_fen
    }

    pub fn start_position(&self) -> &Chess {
        &self.start
    }

    pub fn position(&self) -> &Chess {
        &self.position
    }

    pub fn fen(&self) -> String {
        to_fen(&self.position)
    }

    pub fn turn(&self) -> Color {
        self.position.turn()
    }

    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.position.board().piece_at(square)
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.position.outcome()
    }

    pub fn is_check(&self) -> bool {
        self.position.is_check()
    }

    pub fn reset(&mut self) {
        self.position = self.start.clone();
    }

    pub fn set_position(&mut self, position: Chess) {
        self.position = position;
    }

    /// Replays a PGN's mainline from its start position (or its `FEN` tag) and leaves the board
    /// at the final position. The configured start position is kept for `reset`.
    pub fn load_pgn(&mut self, text: &str) -> Result<GameRecord, BoardError> {
        let record = pgn::parse(text)?;
        self.position = record.current_position().clone();
        debug!(moves = record.len(), fen = %self.fen(), "loaded pgn");
        Ok(record)
    }

    /// Sorted, de-duplicated destinations of the legal moves starting on `from`.
    pub fn legal_destinations(&self, from: Square) -> Vec<Square> {
        let mut squares: Vec<Square> = self
            .position
            .legal_moves()
            .iter()
            .filter(|m| m.from() == Some(from))
            .map(destination)
            .collect();
        squares.sort();
        squares.dedup();
        squares
    }

    /// The legal move from `from` landing on `to`. Promotions resolve to a queen.
    pub fn find_move(&self, from: Square, to: Square) -> Option<Move> {
        self.position
            .legal_moves()
            .into_iter()
            .filter(|m| m.from() == Some(from) && destination(m) == to)
            .find(|m| m.promotion().is_none_or(|role| role == Role::Queen))
    }

    pub fn play(&mut self, m: &Move) -> Result<(), BoardError> {
        if !self.position.is_legal(m) {
            return Err(BoardError::IllegalMove {
                uci: uci(m),
                fen: self.fen(),
            });
        }
        self.position.play_unchecked(m);
        Ok(())
    }
}

impl Default for BoardState {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_start_round_trips_through_fen() {
        let board = BoardState::standard();
        assert_eq!(board.fen(), STANDARD_FEN);
        assert_eq!(BoardState::new(STANDARD_FEN).unwrap().fen(), STANDARD_FEN);
    }

    #[test]
    fn knight_destinations_from_start() {
        let board = BoardState::standard();
        assert_eq!(board.legal_destinations(Square::G1), vec![Square::F3, Square::H3]);
        assert!(board.legal_destinations(Square::E1).is_empty());
        assert!(board.legal_destinations(Square::E4).is_empty());
    }

    #[test]
    fn castling_is_reported_on_the_king_target() {
        let board = BoardState::new("4k3/8/8/8/8/8/8/R3K2R w KQ - 0 1").unwrap();
        let destinations = board.legal_destinations(Square::E1);
        assert!(destinations.contains(&Square::G1));
        assert!(destinations.contains(&Square::C1));
        assert!(!destinations.contains(&Square::H1));

        let m = board.find_move(Square::E1, Square::G1).expect("castle");
        assert!(matches!(m, Move::Castle { .. }));
        assert_eq!(uci(&m), "e1g1");
    }

    #[test]
    fn promotion_defaults_to_queen() {
        let board = BoardState::new("8/4P3/8/8/8/8/k7/4K3 w - - 0 1").unwrap();
        assert_eq!(board.legal_destinations(Square::E7), vec![Square::E8]);
        let m = board.find_move(Square::E7, Square::E8).expect("promotion");
        assert_eq!(m.promotion(), Some(Role::Queen));
        assert_eq!(uci(&m), "e7e8q");
    }

    #[test]
    fn play_rejects_moves_from_another_position() {
        let mut board = BoardState::standard();
        let e4 = board.find_move(Square::E2, Square::E4).unwrap();
        board.play(&e4).unwrap();
        assert_eq!(board.turn(), Color::Black);

        let err = board.play(&e4).unwrap_err();
        assert!(matches!(err, BoardError::IllegalMove { .. }));
    }

    #[test]
    fn reset_returns_to_configured_start() {
        let fen = "4k3/8/8/8/8/8/4P3/4K3 w - - 0 1";
        let mut board = BoardState::new(fen).unwrap();
        let m = board.find_move(Square::E2, Square::E3).unwrap();
        board.play(&m).unwrap();
        board.reset();
        assert_eq!(board.fen(), fen);
    }

    #[test]
    fn bad_fen_is_reported() {
        assert!(matches!(
            BoardState::new("not a fen"),
            Err(BoardError::Fen(FenError::Parse { .. }))
        ));
        assert!(matches!(
            BoardState::new("8/8/8/8/8/8/8/8 w - - 0 1"),
            Err(BoardError::Fen(FenError::Position { .. }))
        ));
    }
}
