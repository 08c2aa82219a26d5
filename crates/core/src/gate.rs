//! Gate module - color-matched exits
//!
//! A gate sits on a fixed board cell and lets through pieces of its color.
//! A piece exits when its color matches and its footprint covers the gate cell;
//! the whole footprint is then removed from the board in one step.

use crate::board::Board;
use crate::piece::Piece;
use crate::types::{BlockColor, Coord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Gate {
    required_color: BlockColor,
    position: Coord,
}

impl Gate {
    pub fn new(required_color: BlockColor, position: Coord) -> Self {
        Self {
            required_color,
            position,
        }
    }

    pub fn required_color(&self) -> BlockColor {
        self.required_color
    }

    pub fn position(&self) -> Coord {
        self.position
    }

    /// Color rule only
    pub fn can_exit_through(&self, piece: &Piece) -> bool {
        piece.color() == self.required_color
    }

    /// The piece is on the board and one of its cells is the gate cell
    pub fn is_reached_by(&self, piece: &Piece) -> bool {
        piece.is_placed() && piece.cells().any(|cell| cell == self.position)
    }

    /// Remove `piece` from the board if it may leave through this gate.
    ///
    /// Returns true if the piece exited. A color mismatch or a piece that is
    /// not on the gate cell leaves board and piece untouched.
    pub fn process_exit(&self, piece: &mut Piece, board: &mut Board) -> bool {
        if !self.can_exit_through(piece) || !self.is_reached_by(piece) {
            return false;
        }
        if board.occupant_at(self.position) != Some(piece.id()) {
            log::warn!(
                "gate ({}, {}): piece {} covers the gate but the board disagrees",
                self.position.x,
                self.position.y,
                piece.id().0
            );
            return false;
        }
        piece.exit(board);
        log::debug!(
            "gate ({}, {}): piece {} exited",
            self.position.x,
            self.position.y,
            piece.id().0
        );
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::piece::PieceStatus;
    use crate::shapes::ShapePreset;
    use crate::types::PieceId;

    fn setup(color: BlockColor) -> (Board, Piece) {
        let mut board = Board::new(5, 5).unwrap();
        let mut piece = Piece::new(PieceId(0), color, ShapePreset::Horizontal2.into(), Coord::new(3, 4));
        assert!(piece.place_on_board(&mut board));
        (board, piece)
    }

    #[test]
    fn test_matching_piece_exits() {
        let gate = Gate::new(BlockColor::Red, Coord::new(4, 4));
        let (mut board, mut piece) = setup(BlockColor::Red);

        assert!(gate.process_exit(&mut piece, &mut board));
        assert_eq!(piece.status(), PieceStatus::Exited);
        assert_eq!(board.occupied_count(), 0);
    }

    #[test]
    fn test_wrong_color_stays() {
        let gate = Gate::new(BlockColor::Red, Coord::new(4, 4));
        let (mut board, mut piece) = setup(BlockColor::Green);
        let before = board.clone();

        assert!(!gate.can_exit_through(&piece));
        assert!(!gate.process_exit(&mut piece, &mut board));
        assert!(piece.is_placed());
        assert_eq!(board, before);
    }

    #[test]
    fn test_piece_away_from_gate_stays() {
        let gate = Gate::new(BlockColor::Red, Coord::new(0, 0));
        let (mut board, mut piece) = setup(BlockColor::Red);

        assert!(gate.can_exit_through(&piece));
        assert!(!gate.is_reached_by(&piece));
        assert!(!gate.process_exit(&mut piece, &mut board));
        assert_eq!(board.occupied_count(), 2);
    }

    #[test]
    fn test_exited_piece_cannot_move() {
        let gate = Gate::new(BlockColor::Red, Coord::new(3, 4));
        let (mut board, mut piece) = setup(BlockColor::Red);
        assert!(gate.process_exit(&mut piece, &mut board));

        assert!(!piece.try_move(&mut board, Coord::new(0, 0)));
        assert!(!piece.place_on_board(&mut board));
        assert!(!piece.snap_to_grid(&mut board, Coord::new(0, 0)).is_placed());
        assert_eq!(board.occupied_count(), 0);
    }
}
