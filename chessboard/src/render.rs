//! Frame drawing. Every frame is painted from scratch from the session.

use engine::graphics::{Color as Rgba, Renderer2d};
use shakmaty::{Color, Outcome, Square};

use crate::layout::BoardLayout;
use crate::pieces::PieceVisual;
use crate::session::ChessSession;
use crate::sprites::SpriteSet;

/// grey10
pub const BACKGROUND: Rgba = [26, 26, 26, 255];
pub const LIGHT_SQUARE: Rgba = [255, 255, 255, 255];
/// cadetblue4
pub const DARK_SQUARE: Rgba = [83, 134, 139, 255];
/// grey69
pub const DESTINATION_MARKER: Rgba = [176, 176, 176, 255];
pub const MARKER_RADIUS: u32 = 10;
pub const STATUS_TEXT: Rgba = [200, 200, 200, 255];
pub const STATUS_TEXT_SCALE: u32 = 2;

pub fn draw_scene(
    gfx: &mut dyn Renderer2d,
    session: &ChessSession,
    layout: &BoardLayout,
    sprites: &mut SpriteSet,
) {
    gfx.clear(BACKGROUND);
    draw_board(gfx, layout);
    draw_destinations(gfx, layout, session.selected_destinations());
    draw_pieces(gfx, layout, session, sprites);
    draw_status(gfx, layout, &status_line(session));
}

pub fn square_color(square: Square) -> Rgba {
    let index = u32::from(square);
    // a1 (file 0, rank 0) is dark.
    if (index % 8 + index / 8) % 2 == 0 {
        DARK_SQUARE
    } else {
        LIGHT_SQUARE
    }
}

pub fn draw_board(gfx: &mut dyn Renderer2d, layout: &BoardLayout) {
    for square in Square::ALL {
        gfx.fill_rect(layout.square_rect(square), square_color(square));
    }
}

pub fn draw_destinations(gfx: &mut dyn Renderer2d, layout: &BoardLayout, squares: &[Square]) {
    for &square in squares {
        let (cx, cy) = layout.square_center(square);
        gfx.fill_circle(cx, cy, MARKER_RADIUS, DESTINATION_MARKER);
    }
}

/// Resting pieces first, then the dragged piece centered on the cursor.
pub fn draw_pieces(
    gfx: &mut dyn Renderer2d,
    layout: &BoardLayout,
    session: &ChessSession,
    sprites: &mut SpriteSet,
) {
    let size = layout.square_size;
    for visual in session.pieces().iter().filter(|v| !v.dragging) {
        let rect = layout.square_rect(visual.square);
        gfx.draw_image(rect.x as i32, rect.y as i32, sprites.scaled(visual.key, size));
    }
    if let Some((visual, cursor)) = session.dragged() {
        draw_dragged(gfx, layout, visual, cursor, sprites);
    }
}

fn draw_dragged(
    gfx: &mut dyn Renderer2d,
    layout: &BoardLayout,
    visual: &PieceVisual,
    cursor: (i32, i32),
    sprites: &mut SpriteSet,
) {
    let (x, y) = layout.drag_origin(cursor);
    gfx.draw_image(x, y, sprites.scaled(visual.key, layout.square_size));
}

pub fn draw_status(gfx: &mut dyn Renderer2d, layout: &BoardLayout, text: &str) {
    let (x, y) = layout.status_origin();
    gfx.draw_text_scaled(x, y, text, STATUS_TEXT, STATUS_TEXT_SCALE);
}

fn side_name(color: Color) -> &'static str {
    match color {
        Color::White => "WHITE",
        Color::Black => "BLACK",
    }
}

/// `WHITE TO MOVE`, `BLACK TO MOVE (CHECK)`, or the result once the game is over.
pub fn status_line(session: &ChessSession) -> String {
    let board = session.board();
    let moves = session.record().len();
    match board.outcome() {
        Some(Outcome::Decisive { winner }) => {
            format!("CHECKMATE - {} WINS  {}", side_name(winner), session.record().result())
        }
        Some(Outcome::Draw) => format!("DRAW  {}", session.record().result()),
        None if board.is_check() => {
            format!("{} TO MOVE (CHECK)  MOVES: {moves}", side_name(board.turn()))
        }
        None => format!("{} TO MOVE  MOVES: {moves}", side_name(board.turn())),
    }
}
