use chessboard::input::{self, BoardInput, DropOutcome};
use chessboard::layout::BoardLayout;
use chessboard::pieces::{PieceKey, PieceSet};
use chessboard::rules::{self, STANDARD_FEN};
use chessboard::session::ChessSession;
use shakmaty::{Color, Role, Square};

fn drag(session: &mut ChessSession, from: Square, to: Square) -> DropOutcome {
    assert!(session.press(Some(from), (0, 0)), "press on {from}");
    session.release(Some(to))
}

fn accepted(san: &str) -> DropOutcome {
    DropOutcome::Accepted {
        san: san.to_string(),
    }
}

fn key_at(session: &ChessSession, square: Square) -> Option<PieceKey> {
    session.pieces().at(square).map(|v| v.key)
}

fn assert_in_sync(session: &ChessSession) {
    assert!(session.pieces().agrees_with(session.board().position()));
}

#[test]
fn e2_e4_is_accepted() {
    let mut session = ChessSession::standard();
    assert_eq!(drag(&mut session, Square::E2, Square::E4), accepted("e4"));

    assert_eq!(key_at(&session, Square::E2), None);
    assert_eq!(
        key_at(&session, Square::E4),
        Some(PieceKey::new(Color::White, Role::Pawn))
    );
    assert_eq!(session.board().turn(), Color::Black);
    assert_eq!(session.record().len(), 1);
    assert_in_sync(&session);
}

#[test]
fn illegal_target_snaps_back() {
    let mut session = ChessSession::standard();
    let before = session.pieces().clone();

    assert_eq!(drag(&mut session, Square::E2, Square::E5), DropOutcome::Rejected);

    assert_eq!(session.pieces(), &before);
    assert_eq!(session.board().fen(), STANDARD_FEN);
    assert!(session.record().is_empty());
    assert!(session.selected_destinations().is_empty());
}

#[test]
fn release_off_board_is_rejected() {
    let mut session = ChessSession::standard();
    assert!(session.press(Some(Square::G1), (0, 0)));
    assert_eq!(session.release(None), DropOutcome::Rejected);
    assert_eq!(
        key_at(&session, Square::G1),
        Some(PieceKey::new(Color::White, Role::Knight))
    );
    assert!(session.pieces().dragging().is_none());
}

#[test]
fn only_the_side_to_move_can_drag() {
    let mut session = ChessSession::standard();
    assert!(!session.press(Some(Square::E7), (0, 0)));
    assert!(!session.press(Some(Square::E4), (0, 0)));
    assert!(!session.press(None, (0, 0)));
    assert_eq!(session.release(Some(Square::E5)), DropOutcome::Ignored);
}

#[test]
fn drag_exposes_destinations_and_cursor() {
    let mut session = ChessSession::standard();
    assert!(session.press(Some(Square::B1), (10, 10)));
    assert_eq!(session.selected_destinations(), &[Square::A3, Square::C3]);

    session.drag_to((123, 456));
    let (visual, cursor) = session.dragged().expect("dragging");
    assert_eq!(visual.square, Square::B1);
    assert_eq!(cursor, (123, 456));

    // A second press mid-drag does nothing.
    assert!(!session.press(Some(Square::G1), (0, 0)));
}

#[test]
fn capture_removes_the_victim() {
    let mut session = ChessSession::from_fen("4k3/8/8/3p4/4P3/8/8/4K3 w - - 0 1").unwrap();
    assert_eq!(drag(&mut session, Square::E4, Square::D5), accepted("exd5"));
    assert_eq!(session.pieces().len(), 3);
    assert_eq!(
        key_at(&session, Square::D5),
        Some(PieceKey::new(Color::White, Role::Pawn))
    );
    assert_in_sync(&session);
}

#[test]
fn castling_moves_the_rook_visual() {
    let mut session = ChessSession::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();

    assert_eq!(drag(&mut session, Square::E1, Square::G1), accepted("O-O"));
    assert_eq!(key_at(&session, Square::G1), Some(PieceKey::new(Color::White, Role::King)));
    assert_eq!(key_at(&session, Square::F1), Some(PieceKey::new(Color::White, Role::Rook)));
    assert_eq!(key_at(&session, Square::H1), None);
    assert_eq!(key_at(&session, Square::E1), None);

    assert_eq!(drag(&mut session, Square::E8, Square::C8), accepted("O-O-O"));
    assert_eq!(key_at(&session, Square::C8), Some(PieceKey::new(Color::Black, Role::King)));
    assert_eq!(key_at(&session, Square::D8), Some(PieceKey::new(Color::Black, Role::Rook)));
    assert_eq!(key_at(&session, Square::A8), None);
    assert_in_sync(&session);
}

#[test]
fn en_passant_removes_the_passed_pawn() {
    let mut session = ChessSession::from_fen("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 1").unwrap();
    assert_eq!(drag(&mut session, Square::E5, Square::D6), accepted("exd6"));

    assert_eq!(key_at(&session, Square::D5), None);
    assert_eq!(key_at(&session, Square::E5), None);
    assert_eq!(
        key_at(&session, Square::D6),
        Some(PieceKey::new(Color::White, Role::Pawn))
    );
    assert_eq!(session.pieces().len(), 3);
    assert_in_sync(&session);
}

#[test]
fn promotion_becomes_a_queen() {
    let mut session = ChessSession::from_fen("8/4P3/8/8/8/8/k7/4K3 w - - 0 1").unwrap();
    let DropOutcome::Accepted { san } = drag(&mut session, Square::E7, Square::E8) else {
        panic!("promotion should be accepted");
    };
    assert!(san.starts_with("e8=Q"), "{san}");
    assert_eq!(
        key_at(&session, Square::E8),
        Some(PieceKey::new(Color::White, Role::Queen))
    );
    assert_in_sync(&session);
}

#[test]
fn reset_returns_to_the_starting_layout() {
    let mut session = ChessSession::standard();
    let initial = session.pieces().clone();
    drag(&mut session, Square::E2, Square::E4);
    drag(&mut session, Square::E7, Square::E5);

    session.reset();
    assert_eq!(session.pieces(), &initial);
    assert_eq!(session.board().fen(), STANDARD_FEN);
    assert!(session.record().is_empty());
}

#[test]
fn reset_uses_the_configured_start() {
    let fen = "4k3/8/8/8/8/8/4P3/4K3 w - - 0 1";
    let mut session = ChessSession::from_fen(fen).unwrap();
    drag(&mut session, Square::E2, Square::E4);
    session.reset();
    assert_eq!(session.board().fen(), fen);
}

#[test]
fn loading_a_transcript_matches_setting_the_final_position() {
    let mut session = ChessSession::standard();
    session.load_pgn("1. e4 e5 2. Nf3 Nc6 *").unwrap();

    let fen = "r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3";
    let direct = ChessSession::from_fen(fen).unwrap();
    assert_eq!(session.board().fen(), fen);
    assert_eq!(session.pieces(), direct.pieces());
    assert_eq!(session.record().len(), 4);
}

#[test]
fn failed_load_leaves_the_game_alone() {
    let mut session = ChessSession::standard();
    drag(&mut session, Square::D2, Square::D4);
    let fen = session.board().fen();

    assert!(session.load_pgn("1. e4 e5 2. Ke3 *").is_err());
    assert_eq!(session.board().fen(), fen);
    assert_eq!(session.record().len(), 1);
}

#[test]
fn take_back_and_replay() {
    let mut session = ChessSession::standard();
    drag(&mut session, Square::E2, Square::E4);
    drag(&mut session, Square::E7, Square::E5);
    let after_e5 = session.board().fen();

    assert!(session.take_back());
    assert_eq!(session.board().turn(), Color::Black);
    assert_eq!(
        key_at(&session, Square::E7),
        Some(PieceKey::new(Color::Black, Role::Pawn))
    );
    assert_in_sync(&session);

    assert!(session.replay_forward());
    assert_eq!(session.board().fen(), after_e5);
    assert!(!session.replay_forward());

    assert!(session.take_back());
    assert!(session.take_back());
    assert!(!session.take_back());
    assert_eq!(session.board().fen(), STANDARD_FEN);
}

#[test]
fn playing_after_take_back_adds_a_variation() {
    let mut session = ChessSession::standard();
    drag(&mut session, Square::E2, Square::E4);
    drag(&mut session, Square::E7, Square::E5);
    session.take_back();
    assert_eq!(drag(&mut session, Square::C7, Square::C5), accepted("c5"));

    let record = session.record();
    assert_eq!(record.len(), 3);
    let mainline: Vec<&str> = record.mainline().iter().map(|m| m.san.as_str()).collect();
    assert_eq!(mainline, ["e4", "e5"]);
    assert!(session.export_pgn().contains("1. e4 e5 (1... c5) *"));
}

#[test]
fn take_back_is_ignored_mid_drag() {
    let mut session = ChessSession::standard();
    drag(&mut session, Square::E2, Square::E4);
    assert!(session.press(Some(Square::E7), (0, 0)));
    assert!(!session.take_back());
    assert_eq!(session.release(Some(Square::E5)), accepted("e5"));
}

#[test]
fn visuals_match_a_fresh_rebuild_after_a_game() {
    let mut session = ChessSession::standard();
    for (from, to) in [
        (Square::E2, Square::E4),
        (Square::D7, Square::D5),
        (Square::E4, Square::D5),
        (Square::D8, Square::D5),
        (Square::B1, Square::C3),
        (Square::D5, Square::A5),
    ] {
        assert!(matches!(drag(&mut session, from, to), DropOutcome::Accepted { .. }));
    }
    let rebuilt = PieceSet::from_position(&rules::parse_fen(&session.board().fen()).unwrap());
    assert!(rebuilt.agrees_with(session.board().position()));
    assert!(session.pieces().agrees_with(session.board().position()));
    assert_eq!(session.pieces().len(), 30);
}

fn press_at(layout: &BoardLayout, square: Square) -> BoardInput {
    let (x, y) = layout.square_center(square);
    BoardInput::Press { x, y }
}

fn release_at(layout: &BoardLayout, square: Square) -> BoardInput {
    let (x, y) = layout.square_center(square);
    BoardInput::Release { x, y }
}

fn run(session: &mut ChessSession, layout: &BoardLayout, inputs: impl IntoIterator<Item = BoardInput>) {
    for board_input in inputs {
        input::dispatch(session, layout, board_input);
    }
}

#[test]
fn pointer_inputs_play_moves_through_the_layout() {
    let layout = BoardLayout::default();
    let mut session = ChessSession::standard();
    run(
        &mut session,
        &layout,
        [
            press_at(&layout, Square::E2),
            BoardInput::Motion { x: 300, y: 300 },
            release_at(&layout, Square::E4),
            press_at(&layout, Square::E7),
            release_at(&layout, Square::E5),
        ],
    );
    assert_eq!(session.record().len(), 2);
    assert_eq!(session.board().turn(), Color::White);

    run(&mut session, &layout, [BoardInput::TakeBack]);
    assert_eq!(session.board().turn(), Color::Black);
    assert!(session.pieces().at(Square::E4).is_some());
    assert!(session.pieces().at(Square::E5).is_none());
}

#[test]
fn pointer_release_off_the_board_leaves_the_position_alone() {
    let layout = BoardLayout::default();
    let mut session = ChessSession::standard();
    let initial = session.pieces().clone();
    run(
        &mut session,
        &layout,
        [
            press_at(&layout, Square::D2),
            BoardInput::Release { x: -50, y: 900 },
            BoardInput::TakeBack,
        ],
    );
    assert_eq!(session.board().fen(), STANDARD_FEN);
    assert_eq!(session.pieces(), &initial);
}

#[test]
fn reset_and_navigation_inputs() {
    let layout = BoardLayout::default();
    let mut session = ChessSession::standard();
    run(
        &mut session,
        &layout,
        [
            press_at(&layout, Square::G1),
            release_at(&layout, Square::F3),
            BoardInput::TakeBack,
            BoardInput::Forward,
        ],
    );
    assert!(session.pieces().at(Square::F3).is_some());

    run(&mut session, &layout, [BoardInput::Reset]);
    assert!(session.record().is_empty());
    assert!(session.pieces().at(Square::G1).is_some());
}
