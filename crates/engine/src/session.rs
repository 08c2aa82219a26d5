//! Session module - explicitly owned puzzle state
//!
//! A session owns the board, the arena of pieces, and the gates of one level.
//! Pieces are addressed by [`PieceId`], which is their index in the arena, so no
//! component ever holds a live reference into another. Every mutation borrows
//! the session mutably for its whole duration, which makes each operation one
//! critical section over the board.

use derive_more::{Display, Error};

use crate::core::{Board, BoardError, Gate, Piece, PieceStatus, Shape, SnapOutcome};
use crate::place::PlaceError;
use crate::types::{BlockColor, Coord, Orientation, PieceId};

/// Board and pieces disagree about who owns a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
pub enum InvariantViolation {
    #[display("cell ({}, {}) is owned by unknown piece {}", cell.x, cell.y, owner.0)]
    UnknownOwner { cell: Coord, owner: PieceId },
    #[display("cell ({}, {}) is owned by piece {} which is not placed there", cell.x, cell.y, owner.0)]
    StrayCell { cell: Coord, owner: PieceId },
    #[display("piece {} is placed but cell ({}, {}) is not attributed to it", piece.0, cell.x, cell.y)]
    MissingCell { piece: PieceId, cell: Coord },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    board: Board,
    pieces: Vec<Piece>,
    gates: Vec<Gate>,
}

impl Session {
    /// Create an empty session with a `width x height` board
    pub fn new(width: u16, height: u16) -> Result<Self, BoardError> {
        Ok(Self {
            board: Board::new(width, height)?,
            pieces: Vec::new(),
            gates: Vec::new(),
        })
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    pub fn piece(&self, id: PieceId) -> Option<&Piece> {
        self.pieces.get(id.index())
    }

    pub fn gates(&self) -> &[Gate] {
        &self.gates
    }

    pub fn gate(&self, index: usize) -> Option<&Gate> {
        self.gates.get(index)
    }

    /// Create a piece and register it on the board.
    ///
    /// The initial footprint must be a valid placement; nothing is written
    /// otherwise.
    pub fn add_piece(
        &mut self,
        color: BlockColor,
        shape: Shape,
        pivot: Coord,
        orientation: Orientation,
    ) -> Result<PieceId, PlaceError> {
        let id = PieceId(self.pieces.len() as u32);
        let mut piece = Piece::new(id, color, shape, pivot).with_orientation(orientation);

        if !piece.is_valid_placement(&self.board) {
            let in_bounds = piece.cells().all(|c| self.board.is_valid_coord(c));
            return Err(if in_bounds {
                PlaceError::Blocked
            } else {
                PlaceError::OutOfBounds
            });
        }

        piece.place_on_board(&mut self.board);
        log::debug!(
            "session: added {} piece {} at ({}, {})",
            color.as_str(),
            id.0,
            pivot.x,
            pivot.y
        );
        self.pieces.push(piece);
        Ok(id)
    }

    /// Add a gate and return its index
    pub fn add_gate(&mut self, gate: Gate) -> usize {
        self.gates.push(gate);
        self.gates.len() - 1
    }

    /// Split borrow of one arena slot and the board
    fn slot(&mut self, id: PieceId) -> Option<(&mut Piece, &mut Board)> {
        let piece = self.pieces.get_mut(id.index())?;
        Some((piece, &mut self.board))
    }

    pub fn try_move(&mut self, id: PieceId, pivot: Coord) -> bool {
        self.slot(id)
            .is_some_and(|(piece, board)| piece.try_move(board, pivot))
    }

    /// Move by a relative offset
    pub fn try_move_by(&mut self, id: PieceId, dx: i32, dy: i32) -> bool {
        let Some(piece) = self.piece(id) else {
            return false;
        };
        match piece.pivot().checked_add(Coord::new(dx, dy)) {
            Some(target) => self.try_move(id, target),
            None => false,
        }
    }

    pub fn try_rotate(&mut self, id: PieceId, clockwise: bool) -> bool {
        self.slot(id)
            .is_some_and(|(piece, board)| piece.try_rotate(board, clockwise))
    }

    /// Lift a piece off the board at the start of a drag
    pub fn begin_drag(&mut self, id: PieceId) -> bool {
        self.slot(id)
            .is_some_and(|(piece, board)| piece.begin_drag(board))
    }

    /// Release a dragged piece near `candidate`
    pub fn end_drag(&mut self, id: PieceId, candidate: Coord) -> SnapOutcome {
        match self.slot(id) {
            Some((piece, board)) => piece.snap_to_grid(board, candidate),
            None => SnapOutcome::Unplaced,
        }
    }

    /// Try to leave through the gate at `gate_index`
    pub fn exit_through(&mut self, id: PieceId, gate_index: usize) -> bool {
        let Some(gate) = self.gates.get(gate_index).copied() else {
            return false;
        };
        self.slot(id)
            .is_some_and(|(piece, board)| gate.process_exit(piece, board))
    }

    /// Leave through the first gate that accepts the piece
    pub fn try_exit(&mut self, id: PieceId) -> Option<usize> {
        (0..self.gates.len()).find(|&index| self.exit_through(id, index))
    }

    /// Every piece has left through a gate
    pub fn is_complete(&self) -> bool {
        !self.pieces.is_empty() && self.pieces.iter().all(Piece::is_exited)
    }

    /// Clear the board and forget all pieces and gates
    pub fn reset(&mut self) {
        self.board.clear();
        self.pieces.clear();
        self.gates.clear();
    }

    /// Check that the board attributes to every placed piece exactly its
    /// footprint, and nothing to anything else.
    pub fn audit(&self) -> Result<(), InvariantViolation> {
        let width = self.board.width() as usize;
        for (idx, cell) in self.board.cells().iter().enumerate() {
            let Some(owner) = *cell else {
                continue;
            };
            let at = Coord::new((idx % width) as i32, (idx / width) as i32);
            let Some(piece) = self.piece(owner) else {
                return Err(InvariantViolation::UnknownOwner { cell: at, owner });
            };
            if piece.status() != PieceStatus::Placed || !piece.cells().any(|c| c == at) {
                return Err(InvariantViolation::StrayCell { cell: at, owner });
            }
        }

        for piece in self.pieces.iter().filter(|p| p.is_placed()) {
            if let Some(cell) = piece
                .cells()
                .find(|&c| self.board.occupant_at(c) != Some(piece.id()))
            {
                return Err(InvariantViolation::MissingCell {
                    piece: piece.id(),
                    cell,
                });
            }
        }
        Ok(())
    }
}
