//! Pixel geometry of the board: white at the bottom, a8 in the top-left corner.

use engine::surface::SurfaceSize;
use engine::ui::{Anchor, Insets, Rect, Size};
use shakmaty::Square;

pub const DEFAULT_SQUARE_SIZE: u32 = 70;
pub const DEFAULT_MARGIN: (u32, u32) = (40, 20);

/// Squares never shrink below this when fitting a small window.
const MIN_SQUARE_SIZE: u32 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardLayout {
    pub origin_x: u32,
    pub origin_y: u32,
    pub square_size: u32,
}

impl Default for BoardLayout {
    fn default() -> Self {
        Self::new(DEFAULT_MARGIN, DEFAULT_SQUARE_SIZE)
    }
}

impl BoardLayout {
    pub fn new(margin: (u32, u32), square_size: u32) -> Self {
        Self {
            origin_x: margin.0,
            origin_y: margin.1,
            square_size: square_size.max(1),
        }
    }

    /// Largest board that fits `surface` inside `margin`, leaving `footer` pixels below it.
    pub fn fitted(surface: SurfaceSize, margin: (u32, u32), footer: u32) -> Self {
        let area = Rect::from_size(surface.width, surface.height)
            .inset(Insets::symmetric(margin.0, margin.1));
        let side = area.w.min(area.h.saturating_sub(footer));
        let square_size = (side / 8).max(MIN_SQUARE_SIZE);
        let board = area.place(
            Size::new(square_size * 8, (square_size * 8 + footer).min(area.h)),
            Anchor::TopCenter,
        );
        Self::new((board.x, board.y), square_size)
    }

    pub fn board_rect(&self) -> Rect {
        let side = self.square_size * 8;
        Rect::new(self.origin_x, self.origin_y, side, side)
    }

    pub fn square_rect(&self, square: Square) -> Rect {
        let index = u32::from(square);
        let col = index % 8;
        let row = 7 - index / 8;
        Rect::new(
            self.origin_x + col * self.square_size,
            self.origin_y + row * self.square_size,
            self.square_size,
            self.square_size,
        )
    }

    pub fn square_center(&self, square: Square) -> (i32, i32) {
        let (x, y) = self.square_rect(square).center();
        (x as i32, y as i32)
    }

    /// Square under a pointer position, `None` off the board.
    pub fn square_at(&self, x: i32, y: i32) -> Option<Square> {
        if !self.board_rect().contains(x, y) {
            return None;
        }
        let col = (x as u32 - self.origin_x) / self.square_size;
        let row = (y as u32 - self.origin_y) / self.square_size;
        Some(Square::new((7 - row) * 8 + col))
    }

    /// Top-left corner for a sprite centered on the cursor.
    pub fn drag_origin(&self, cursor: (i32, i32)) -> (i32, i32) {
        let half = (self.square_size / 2) as i32;
        (cursor.0 - half, cursor.1 - half)
    }

    /// Left edge and top of the status line under the board.
    pub fn status_origin(&self) -> (u32, u32) {
        let board = self.board_rect();
        (board.x, board.bottom() + self.square_size / 8 + 2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a8_is_top_left_and_h1_bottom_right() {
        let layout = BoardLayout::default();
        assert_eq!(layout.square_rect(Square::A8), Rect::new(40, 20, 70, 70));
        assert_eq!(layout.square_rect(Square::H1), Rect::new(40 + 7 * 70, 20 + 7 * 70, 70, 70));
    }

    #[test]
    fn square_at_inverts_square_rect() {
        let layout = BoardLayout::default();
        for square in Square::ALL {
            let (cx, cy) = layout.square_center(square);
            assert_eq!(layout.square_at(cx, cy), Some(square));
            let rect = layout.square_rect(square);
            assert_eq!(layout.square_at(rect.x as i32, rect.y as i32), Some(square));
        }
    }

    #[test]
    fn pointer_off_board_maps_to_none() {
        let layout = BoardLayout::default();
        assert_eq!(layout.square_at(39, 100), None);
        assert_eq!(layout.square_at(40 + 560, 100), None);
        assert_eq!(layout.square_at(100, -5), None);
        assert_eq!(layout.square_at(100, 20 + 560), None);
    }

    #[test]
    fn drag_origin_centers_the_sprite() {
        let layout = BoardLayout::default();
        assert_eq!(layout.drag_origin((100, 100)), (65, 65));
        assert_eq!(layout.drag_origin((10, 0)), (-25, -35));
    }

    #[test]
    fn fitted_board_stays_inside_the_surface() {
        let layout = BoardLayout::fitted(SurfaceSize::new(800, 600), DEFAULT_MARGIN, 24);
        let board = layout.board_rect();
        assert_eq!(layout.square_size, 67);
        assert!(board.right() <= 800);
        assert!(board.bottom() + 24 <= 600);
        assert_eq!(board.y, 20);
    }
}
