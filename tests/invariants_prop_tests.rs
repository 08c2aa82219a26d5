//! Property tests for the placement invariants.
//!
//! Random command sequences against a populated session must always keep:
//! - at most one piece per cell, with board and piece footprints in agreement
//! - rejected commands byte-for-byte free of side effects
//! - four quarter turns in open space returning a piece to where it started

use proptest::prelude::*;

use block_gate::core::{Board, Gate, Piece, ShapePreset};
use block_gate::engine::{apply_command, Command, Session};
use block_gate::types::{BlockColor, Coord, Orientation, PieceId};

const WIDTH: u16 = 8;
const HEIGHT: u16 = 8;

fn populated_session() -> Session {
    let mut s = Session::new(WIDTH, HEIGHT).unwrap();
    let layout = [
        (BlockColor::Red, ShapePreset::Square2x2, 0, 0),
        (BlockColor::Blue, ShapePreset::TShape, 4, 0),
        (BlockColor::Green, ShapePreset::LShape, 0, 4),
        (BlockColor::Yellow, ShapePreset::Zigzag, 3, 4),
        (BlockColor::Red, ShapePreset::Single, 7, 7),
    ];
    for (color, preset, x, y) in layout {
        s.add_piece(color, preset.into(), Coord::new(x, y), Orientation::Deg0)
            .unwrap();
    }
    s.add_gate(Gate::new(BlockColor::Red, Coord::new(7, 0)));
    s.add_gate(Gate::new(BlockColor::Green, Coord::new(7, 3)));
    s
}

fn arb_command() -> impl Strategy<Value = Command> {
    let piece = (0u32..6).prop_map(PieceId);
    let coord = (-2i32..10, -2i32..10).prop_map(|(x, y)| Coord::new(x, y));
    prop_oneof![
        (piece.clone(), coord.clone()).prop_map(|(piece, to)| Command::Move { piece, to }),
        (piece.clone(), -2i32..=2, -2i32..=2).prop_map(|(piece, dx, dy)| Command::Shift { piece, dx, dy }),
        (piece.clone(), any::<bool>()).prop_map(|(piece, clockwise)| Command::Rotate { piece, clockwise }),
        piece.clone().prop_map(|piece| Command::Drag { piece }),
        (piece.clone(), coord).prop_map(|(piece, at)| Command::Drop { piece, at }),
        (piece, proptest::option::of(0usize..3)).prop_map(|(piece, gate)| Command::Exit { piece, gate }),
    ]
}

fn mutates_only_on_success(command: Command) -> bool {
    matches!(
        command,
        Command::Move { .. } | Command::Shift { .. } | Command::Rotate { .. } | Command::Exit { .. }
    )
}

proptest! {
    #[test]
    fn random_commands_keep_board_consistent(commands in prop::collection::vec(arb_command(), 1..60)) {
        let mut session = populated_session();

        for command in commands {
            let before = session.clone();
            let result = apply_command(&mut session, command);

            prop_assert!(session.audit().is_ok(), "{:?} broke the board: {:?}", command, session.audit());

            if result.is_err() && mutates_only_on_success(command) {
                prop_assert_eq!(&session, &before, "rejected {:?} had side effects", command);
            }
        }

        let placed_cells: usize = session
            .pieces()
            .iter()
            .filter(|p| p.is_placed())
            .map(|p| p.shape().len())
            .sum();
        prop_assert_eq!(session.board().occupied_count(), placed_cells);
    }

    #[test]
    fn four_quarter_turns_round_trip(
        preset_idx in 0usize..ShapePreset::ALL.len(),
        clockwise in any::<bool>(),
        start in 0usize..4,
    ) {
        let preset = ShapePreset::ALL[preset_idx];
        let orientation = [Orientation::Deg0, Orientation::Deg90, Orientation::Deg180, Orientation::Deg270][start];
        let mut board = Board::new(9, 9).unwrap();
        let mut piece = Piece::new(PieceId(0), BlockColor::Blue, preset.into(), Coord::new(4, 4))
            .with_orientation(orientation);
        prop_assert!(piece.place_on_board(&mut board));
        let cells = piece.occupied_cells();
        let snapshot = board.clone();

        for _ in 0..4 {
            prop_assert!(piece.try_rotate(&mut board, clockwise));
        }
        prop_assert_eq!(piece.orientation(), orientation);
        prop_assert_eq!(piece.occupied_cells(), cells);
        prop_assert_eq!(board, snapshot);
    }

    #[test]
    fn orientation_apply_is_consistent_with_turns(x in -5i32..=5, y in -5i32..=5, turns in 0usize..8) {
        let offset = Coord::new(x, y);
        let mut orientation = Orientation::Deg0;
        let mut expected = offset;
        for _ in 0..turns {
            orientation = orientation.rotate_cw();
            expected = Coord::new(-expected.y, expected.x);
        }
        prop_assert_eq!(orientation.apply(offset), expected);
        prop_assert_eq!(Orientation::from_degrees(orientation.degrees() + 360), Some(orientation));
    }
}
