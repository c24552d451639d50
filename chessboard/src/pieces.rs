use shakmaty::{Chess, Color, Move, Piece, Position, Role, Square};

use crate::rules;

/// Sprite lookup key for one (color, role) pair; `file_stem` is the asset name (`wP`, `bK`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PieceKey {
    pub color: Color,
    pub role: Role,
}

impl PieceKey {
    pub const ALL: [PieceKey; 12] = {
        const ROLES: [Role; 6] = [
            Role::Pawn,
            Role::Knight,
            Role::Bishop,
            Role::Rook,
            Role::Queen,
            Role::King,
        ];
        let mut keys = [PieceKey {
            color: Color::White,
            role: Role::Pawn,
        }; 12];
        let mut i = 0;
        while i < 12 {
            keys[i] = PieceKey {
                color: if i < 6 { Color::White } else { Color::Black },
                role: ROLES[i % 6],
            };
            i += 1;
        }
        keys
    };

    pub fn new(color: Color, role: Role) -> Self {
        Self { color, role }
    }

    /// Position in [`PieceKey::ALL`].
    pub fn index(self) -> usize {
        let color = match self.color {
            Color::White => 0,
            Color::Black => 6,
        };
        color + (self.role as usize - 1)
    }

    pub fn file_stem(self) -> String {
        format!("{}{}", self.color.char(), self.role.upper_char())
    }
}

impl From<Piece> for PieceKey {
    fn from(piece: Piece) -> Self {
        Self::new(piece.color, piece.role)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PieceVisual {
    pub key: PieceKey,
    pub square: Square,
    pub dragging: bool,
    /// Square the piece left when the current drag started.
    pub origin: Option<Square>,
}

impl PieceVisual {
    pub fn new(key: PieceKey, square: Square) -> Self {
        Self {
            key,
            square,
            dragging: false,
            origin: None,
        }
    }

    pub fn begin_drag(&mut self) {
        self.dragging = true;
        self.origin = Some(self.square);
    }

    fn settle(&mut self, square: Square) {
        self.square = square;
        self.dragging = false;
        self.origin = None;
    }
}

/// One visual per occupied square.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PieceSet {
    visuals: Vec<PieceVisual>,
}

impl PieceSet {
    pub fn from_position(position: &Chess) -> Self {
        let board = position.board();
        let visuals = board
            .occupied()
            .into_iter()
            .filter_map(|square| {
                board
                    .piece_at(square)
                    .map(|piece| PieceVisual::new(piece.into(), square))
            })
            .collect();
        Self { visuals }
    }

    pub fn len(&self) -> usize {
        self.visuals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visuals.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PieceVisual> {
        self.visuals.iter()
    }

    pub fn at(&self, square: Square) -> Option<&PieceVisual> {
        self.visuals.iter().find(|v| v.square == square)
    }

    pub fn at_mut(&mut self, square: Square) -> Option<&mut PieceVisual> {
        self.visuals.iter_mut().find(|v| v.square == square)
    }

    pub fn dragging(&self) -> Option<&PieceVisual> {
        self.visuals.iter().find(|v| v.dragging)
    }

    /// Puts the dragged piece back on its origin square.
    pub fn cancel_drag(&mut self) {
        for visual in self.visuals.iter_mut().filter(|v| v.dragging) {
            let origin = visual.origin.unwrap_or(visual.square);
            visual.settle(origin);
        }
    }

    fn remove_at(&mut self, square: Square) {
        self.visuals.retain(|v| v.square != square);
    }

    fn relocate(&mut self, from: Square, to: Square) -> Option<&mut PieceVisual> {
        let visual = self.at_mut(from)?;
        visual.settle(to);
        Some(visual)
    }

    /// Applies an accepted move to the visuals: removes the captured piece (including an
    /// en-passant victim), moves the castling rook, and changes role on promotion.
    pub fn apply_move(&mut self, m: &Move) {
        match m {
            Move::Normal {
                from,
                to,
                promotion,
                ..
            } => {
                self.remove_at(*to);
                if let Some(visual) = self.relocate(*from, *to) {
                    if let Some(role) = promotion {
                        visual.key.role = *role;
                    }
                }
            }
            Move::EnPassant { from, to } => {
                let victim = Square::new(u32::from(*from) / 8 * 8 + u32::from(*to) % 8);
                self.remove_at(victim);
                self.relocate(*from, *to);
            }
            Move::Castle { king, rook } => {
                let king_to = rules::destination(m);
                let rank = u32::from(*king) / 8 * 8;
                let rook_file = if u32::from(king_to) % 8 == 6 { 5 } else { 3 };
                let rook_to = Square::new(rank + rook_file);
                let king_idx = self.visuals.iter().position(|v| v.square == *king);
                let rook_idx = self.visuals.iter().position(|v| v.square == *rook);
                if let Some(i) = king_idx {
                    self.visuals[i].settle(king_to);
                }
                if let Some(i) = rook_idx {
                    self.visuals[i].settle(rook_to);
                }
            }
            Move::Put { .. } => {}
        }
    }

    /// True when every occupied square holds exactly one matching visual and nothing else.
    pub fn agrees_with(&self, position: &Chess) -> bool {
        let board = position.board();
        if self.visuals.len() != board.occupied().count() {
            return false;
        }
        Square::ALL.into_iter().all(|square| {
            let mut on_square = self.visuals.iter().filter(|v| v.square == square);
            match (board.piece_at(square), on_square.next(), on_square.next()) {
                (Some(piece), Some(visual), None) => visual.key == PieceKey::from(piece),
                (None, None, None) => true,
                _ => false,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_index_their_position_in_all() {
        for (i, key) in PieceKey::ALL.iter().enumerate() {
            assert_eq!(key.index(), i);
        }
        assert_eq!(PieceKey::new(Color::White, Role::Pawn).file_stem(), "wP");
        assert_eq!(PieceKey::new(Color::Black, Role::King).file_stem(), "bK");
    }

    #[test]
    fn standard_start_has_thirty_two_visuals() {
        let set = PieceSet::from_position(&Chess::default());
        assert_eq!(set.len(), 32);
        assert!(set.agrees_with(&Chess::default()));
        assert_eq!(
            set.at(Square::E1).map(|v| v.key),
            Some(PieceKey::new(Color::White, Role::King))
        );
    }

    #[test]
    fn cancel_drag_restores_origin() {
        let mut set = PieceSet::from_position(&Chess::default());
        set.at_mut(Square::G1).unwrap().begin_drag();
        set.cancel_drag();
        let knight = set.at(Square::G1).unwrap();
        assert!(!knight.dragging);
        assert_eq!(knight.origin, None);
    }

    #[test]
    fn disagreement_is_detected() {
        let mut set = PieceSet::from_position(&Chess::default());
        set.remove_at(Square::A2);
        assert!(!set.agrees_with(&Chess::default()));
    }
}
