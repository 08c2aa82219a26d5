//! Piece tests - occupancy, rotation and transactional updates

use block_gate::core::{Board, Piece, PieceStatus, Shape, ShapePreset};
use block_gate::types::{BlockColor, Coord, Orientation, PieceId};

fn placed(board: &mut Board, id: u32, preset: ShapePreset, x: i32, y: i32) -> Piece {
    let mut piece = Piece::new(PieceId(id), BlockColor::Blue, preset.into(), Coord::new(x, y));
    assert!(piece.place_on_board(board));
    piece
}

fn footprint(board: &Board, piece: &Piece) -> Vec<Coord> {
    let mut cells: Vec<Coord> = board.cells_of(piece.id()).collect();
    cells.sort();
    cells
}

fn sorted(piece: &Piece) -> Vec<Coord> {
    let mut cells: Vec<Coord> = piece.cells().collect();
    cells.sort();
    cells
}

#[test]
fn test_occupied_cells_follow_rotation_table() {
    let shape = Shape::custom(&[Coord::new(0, 0), Coord::new(2, 1)]).unwrap();
    let cases = [
        (Orientation::Deg0, Coord::new(7, 6)),
        (Orientation::Deg90, Coord::new(4, 7)),
        (Orientation::Deg180, Coord::new(3, 4)),
        (Orientation::Deg270, Coord::new(6, 3)),
    ];
    for (orientation, expected) in cases {
        let piece = Piece::new(PieceId(0), BlockColor::Red, shape.clone(), Coord::new(5, 5))
            .with_orientation(orientation);
        let cells = piece.occupied_cells();
        assert_eq!(cells[0], Coord::new(5, 5), "{orientation:?}");
        assert_eq!(cells[1], expected, "{orientation:?}");
    }
}

#[test]
fn test_new_piece_is_lifted_until_placed() {
    let mut board = Board::new(5, 5).unwrap();
    let mut piece = Piece::new(PieceId(0), BlockColor::Red, ShapePreset::Vertical2.into(), Coord::new(1, 1));
    assert_eq!(piece.status(), PieceStatus::Lifted);
    assert_eq!(board.occupied_count(), 0);
    assert!(!piece.try_move(&mut board, Coord::new(2, 2)));

    assert!(piece.place_on_board(&mut board));
    assert!(piece.is_placed());
    assert_eq!(footprint(&board, &piece), sorted(&piece));
}

#[test]
fn test_try_move_commits_full_footprint() {
    let mut board = Board::new(6, 6).unwrap();
    let mut piece = placed(&mut board, 0, ShapePreset::LShape, 0, 0);

    assert!(piece.try_move(&mut board, Coord::new(3, 2)));
    assert_eq!(piece.pivot(), Coord::new(3, 2));
    assert_eq!(footprint(&board, &piece), sorted(&piece));
    assert_eq!(board.occupied_count(), 4);
}

#[test]
fn test_try_move_into_other_piece_rolls_back() {
    let mut board = Board::new(6, 6).unwrap();
    let mut a = placed(&mut board, 0, ShapePreset::Square2x2, 0, 0);
    let b = placed(&mut board, 1, ShapePreset::Horizontal2, 3, 1);
    let snapshot = board.clone();

    assert!(!a.try_move(&mut board, Coord::new(2, 0)));
    assert_eq!(a.pivot(), Coord::new(0, 0));
    assert_eq!(board, snapshot);
    assert_eq!(footprint(&board, &b), sorted(&b));
}

#[test]
fn test_try_move_out_of_bounds_rolls_back() {
    let mut board = Board::new(4, 4).unwrap();
    let mut piece = placed(&mut board, 0, ShapePreset::Horizontal2, 2, 0);
    let snapshot = board.clone();

    assert!(!piece.try_move(&mut board, Coord::new(3, 0)));
    assert!(!piece.try_move(&mut board, Coord::new(-1, 0)));
    assert_eq!(board, snapshot);
}

#[test]
fn test_move_overlapping_own_cells_is_allowed() {
    let mut board = Board::new(5, 1).unwrap();
    let mut piece = placed(&mut board, 0, ShapePreset::Horizontal2, 0, 0);
    assert!(piece.try_move(&mut board, Coord::new(1, 0)));
    assert_eq!(footprint(&board, &piece), vec![Coord::new(1, 0), Coord::new(2, 0)]);
}

#[test]
fn test_rotate_four_times_round_trips() {
    let mut board = Board::new(7, 7).unwrap();
    let mut piece = placed(&mut board, 0, ShapePreset::Zigzag, 3, 3);
    let start = sorted(&piece);

    for _ in 0..4 {
        assert!(piece.try_rotate(&mut board, true));
        assert_eq!(footprint(&board, &piece), sorted(&piece));
    }
    assert_eq!(piece.orientation(), Orientation::Deg0);
    assert_eq!(sorted(&piece), start);

    for _ in 0..4 {
        assert!(piece.try_rotate(&mut board, false));
    }
    assert_eq!(sorted(&piece), start);
}

#[test]
fn test_rotate_blocked_rolls_back() {
    let mut board = Board::new(5, 5).unwrap();
    let mut bar = placed(&mut board, 0, ShapePreset::Horizontal2, 2, 2);
    // Deg90 would put the second cell at (2, 3).
    let _blocker = placed(&mut board, 1, ShapePreset::Single, 2, 3);
    let snapshot = board.clone();

    assert!(!bar.try_rotate(&mut board, true));
    assert_eq!(bar.orientation(), Orientation::Deg0);
    assert_eq!(board, snapshot);

    // Counter-clockwise goes to (2, 1), which is open.
    assert!(bar.try_rotate(&mut board, false));
    assert_eq!(bar.orientation(), Orientation::Deg270);
}

#[test]
fn test_remove_from_board_is_idempotent() {
    let mut board = Board::new(4, 4).unwrap();
    let mut piece = placed(&mut board, 0, ShapePreset::Square2x2, 1, 1);
    piece.remove_from_board(&mut board);
    piece.remove_from_board(&mut board);
    assert_eq!(board.occupied_count(), 0);
    assert_eq!(piece.status(), PieceStatus::Lifted);
}

#[test]
fn test_place_partially_off_board_skips_cells() {
    let mut board = Board::new(3, 3).unwrap();
    let mut piece = Piece::new(PieceId(0), BlockColor::Green, ShapePreset::Horizontal2.into(), Coord::new(2, 0));
    assert!(!piece.is_valid_placement(&board));
    assert!(!piece.place_on_board(&mut board));
    assert_eq!(footprint(&board, &piece), vec![Coord::new(2, 0)]);
}
