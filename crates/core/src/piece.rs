//! Piece module - occupancy, rotation and transactional updates
//!
//! A piece is a pivot, an orientation and an immutable [`Shape`]. Its footprint
//! is `pivot + orientation.apply(offset)` for every shape offset.
//!
//! While a piece is [`PieceStatus::Placed`] the board attributes exactly its
//! footprint to its id. Every mutation goes through [`Piece::transact`]:
//!
//! 1. detach the current footprint (so self-overlap is not a collision)
//! 2. apply the proposed pose
//! 3. validate against the whole board
//! 4. commit the new footprint, or restore the old pose and re-attach it
//!
//! Either way the piece ends up registered for exactly its current pose.

use arrayvec::ArrayVec;

use crate::board::Board;
use crate::shapes::Shape;
use crate::snap;
use crate::types::{BlockColor, Coord, Orientation, PieceId, MAX_SHAPE_CELLS, SNAP_MAX_RADIUS};

/// Logical position of a piece: pivot plus orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pose {
    pub pivot: Coord,
    pub orientation: Orientation,
}

impl Pose {
    pub fn new(pivot: Coord, orientation: Orientation) -> Self {
        Self { pivot, orientation }
    }
}

/// Board registration state of a piece
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceStatus {
    /// Footprint registered on the board
    Placed,
    /// Footprint detached (being dragged, or never placed)
    Lifted,
    /// Left through a gate; terminal
    Exited,
}

impl PieceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PieceStatus::Placed => "placed",
            PieceStatus::Lifted => "lifted",
            PieceStatus::Exited => "exited",
        }
    }
}

/// Result of snapping a released piece back onto the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SnapOutcome {
    /// Placed at the candidate or the first valid pivot in probe order
    Snapped(Coord),
    /// Nothing valid nearby; returned to the pre-drag pivot
    Reverted(Coord),
    /// Not even the pre-drag pivot fits; the piece stays lifted
    Unplaced,
}

impl SnapOutcome {
    pub fn is_placed(&self) -> bool {
        !matches!(self, SnapOutcome::Unplaced)
    }

    pub fn pivot(&self) -> Option<Coord> {
        match *self {
            SnapOutcome::Snapped(c) | SnapOutcome::Reverted(c) => Some(c),
            SnapOutcome::Unplaced => None,
        }
    }
}

/// A movable, rotatable multi-cell piece
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Piece {
    id: PieceId,
    color: BlockColor,
    shape: Shape,
    pose: Pose,
    status: PieceStatus,
    /// Pose recorded when a drag began
    drag_origin: Option<Pose>,
}

impl Piece {
    /// Create a lifted piece; call [`Piece::place_on_board`] to register it
    pub fn new(id: PieceId, color: BlockColor, shape: Shape, pivot: Coord) -> Self {
        Self {
            id,
            color,
            shape,
            pose: Pose::new(pivot, Orientation::Deg0),
            status: PieceStatus::Lifted,
            drag_origin: None,
        }
    }

    /// Set the initial orientation (before the piece is placed)
    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.pose.orientation = orientation;
        self
    }

    pub fn id(&self) -> PieceId {
        self.id
    }

    pub fn color(&self) -> BlockColor {
        self.color
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn pose(&self) -> Pose {
        self.pose
    }

    pub fn pivot(&self) -> Coord {
        self.pose.pivot
    }

    pub fn orientation(&self) -> Orientation {
        self.pose.orientation
    }

    pub fn status(&self) -> PieceStatus {
        self.status
    }

    pub fn is_placed(&self) -> bool {
        self.status == PieceStatus::Placed
    }

    pub fn is_exited(&self) -> bool {
        self.status == PieceStatus::Exited
    }

    /// Pivot held before the current drag began, if a drag is in progress
    pub fn drag_origin(&self) -> Option<Coord> {
        self.drag_origin.map(|p| p.pivot)
    }

    /// Footprint this piece would have at `pose`
    ///
    /// Coordinates past the `i32` range are clamped, which keeps them off
    /// every board.
    pub fn cells_at(&self, pose: Pose) -> impl Iterator<Item = Coord> + '_ {
        self.shape
            .offsets()
            .iter()
            .map(move |&offset| pose.pivot.saturating_add(pose.orientation.apply(offset)))
    }

    /// Footprint for the current pose, in shape order
    pub fn cells(&self) -> impl Iterator<Item = Coord> + '_ {
        self.cells_at(self.pose)
    }

    /// Footprint for the current pose, in shape order
    pub fn occupied_cells(&self) -> ArrayVec<Coord, MAX_SHAPE_CELLS> {
        self.cells().collect()
    }

    fn fits_at(&self, board: &Board, pose: Pose) -> bool {
        self.cells_at(pose).all(|cell| {
            board.is_valid_coord(cell)
                && board.occupant_at(cell).map_or(true, |owner| owner == self.id)
        })
    }

    /// Every footprint cell is on the board and empty or already ours
    pub fn is_valid_placement(&self, board: &Board) -> bool {
        self.fits_at(board, self.pose)
    }

    fn detach(&self, board: &mut Board) {
        for cell in self.cells() {
            if board.occupant_at(cell) == Some(self.id) {
                board.remove(cell);
            }
        }
    }

    fn attach(&self, board: &mut Board) -> bool {
        let mut complete = true;
        for cell in self.cells() {
            if !board.place(self.id, cell) {
                complete = false;
            }
        }
        if !complete {
            log::warn!(
                "piece {}: footprint at ({}, {}) extends off the board; skipped cells",
                self.id.0,
                self.pose.pivot.x,
                self.pose.pivot.y
            );
        }
        complete
    }

    /// Clear every board cell this piece owns. Idempotent.
    pub fn remove_from_board(&mut self, board: &mut Board) {
        self.detach(board);
        if self.status == PieceStatus::Placed {
            self.status = PieceStatus::Lifted;
        }
    }

    /// Register the footprint on the board.
    ///
    /// Off-board cells are skipped and reported by returning false. Exited
    /// pieces are never registered.
    pub fn place_on_board(&mut self, board: &mut Board) -> bool {
        if self.status == PieceStatus::Exited {
            return false;
        }
        let complete = self.attach(board);
        self.status = PieceStatus::Placed;
        complete
    }

    /// Detach, apply `mutate`, validate, then commit or roll back.
    ///
    /// Returns true if the mutated pose was committed. Only placed pieces can
    /// be updated. On failure board and piece are restored exactly.
    pub fn transact(&mut self, board: &mut Board, mutate: impl FnOnce(&mut Pose)) -> bool {
        if self.status != PieceStatus::Placed {
            log::debug!(
                "piece {}: update ignored while {}",
                self.id.0,
                self.status.as_str()
            );
            return false;
        }

        let before = self.pose;
        self.detach(board);
        mutate(&mut self.pose);

        if self.is_valid_placement(board) {
            let attached = self.attach(board);
            debug_assert!(attached, "validated footprint must be fully on the board");
            log::trace!(
                "piece {}: committed pivot ({}, {}) at {}°",
                self.id.0,
                self.pose.pivot.x,
                self.pose.pivot.y,
                self.pose.orientation.degrees()
            );
            true
        } else {
            self.pose = before;
            let restored = self.attach(board);
            debug_assert!(restored, "previous footprint must still fit");
            log::trace!("piece {}: update rejected, rolled back", self.id.0);
            false
        }
    }

    /// Move the pivot to `pivot` if the new footprint is valid
    pub fn try_move(&mut self, board: &mut Board, pivot: Coord) -> bool {
        self.transact(board, |pose| pose.pivot = pivot)
    }

    /// Rotate a quarter turn about the pivot if the new footprint is valid
    pub fn try_rotate(&mut self, board: &mut Board, clockwise: bool) -> bool {
        self.transact(board, |pose| pose.orientation = pose.orientation.rotate(clockwise))
    }

    /// Lift a placed piece off the board and remember where it was.
    pub fn begin_drag(&mut self, board: &mut Board) -> bool {
        if self.status != PieceStatus::Placed {
            return false;
        }
        self.drag_origin = Some(self.pose);
        self.remove_from_board(board);
        true
    }

    /// Settle the piece at or near `candidate`.
    ///
    /// Tries the candidate, then the documented probe order up to
    /// [`SNAP_MAX_RADIUS`], then the pre-drag pose. If nothing fits the piece
    /// stays lifted and [`SnapOutcome::Unplaced`] is returned.
    pub fn snap_to_grid(&mut self, board: &mut Board, candidate: Coord) -> SnapOutcome {
        self.snap_within(board, candidate, SNAP_MAX_RADIUS)
    }

    /// [`Piece::snap_to_grid`] with an explicit search radius
    pub fn snap_within(&mut self, board: &mut Board, candidate: Coord, max_radius: i32) -> SnapOutcome {
        if self.status == PieceStatus::Exited {
            return SnapOutcome::Unplaced;
        }
        let origin = self.drag_origin.take().unwrap_or(self.pose);
        self.remove_from_board(board);

        let orientation = self.pose.orientation;
        let found = snap::find_nearest_valid(candidate, max_radius, |pivot| {
            self.fits_at(board, Pose::new(pivot, orientation))
        });

        let outcome = if let Some(pivot) = found {
            self.pose.pivot = pivot;
            SnapOutcome::Snapped(pivot)
        } else if self.fits_at(board, origin) {
            log::debug!(
                "piece {}: no valid pivot within {} of ({}, {}); reverting",
                self.id.0,
                max_radius,
                candidate.x,
                candidate.y
            );
            self.pose = origin;
            SnapOutcome::Reverted(origin.pivot)
        } else {
            log::warn!(
                "piece {}: snap exhausted and pre-drag pivot ({}, {}) is blocked; left unplaced",
                self.id.0,
                origin.pivot.x,
                origin.pivot.y
            );
            self.pose = origin;
            return SnapOutcome::Unplaced;
        };

        self.place_on_board(board);
        outcome
    }

    /// Detach for good. Used by gates once the exit has been accepted.
    pub(crate) fn exit(&mut self, board: &mut Board) {
        self.detach(board);
        self.drag_origin = None;
        self.status = PieceStatus::Exited;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::ShapePreset;

    fn board() -> Board {
        Board::new(6, 6).unwrap()
    }

    fn placed(board: &mut Board, id: u32, preset: ShapePreset, pivot: Coord) -> Piece {
        let mut p = Piece::new(PieceId(id), BlockColor::Red, preset.into(), pivot);
        assert!(p.is_valid_placement(board));
        assert!(p.place_on_board(board));
        p
    }

    #[test]
    fn test_new_piece_is_lifted() {
        let p = Piece::new(PieceId(0), BlockColor::Blue, ShapePreset::Single.into(), Coord::new(1, 1));
        assert_eq!(p.status(), PieceStatus::Lifted);
        assert_eq!(p.orientation(), Orientation::Deg0);
    }

    #[test]
    fn test_occupied_cells_follow_rotation() {
        let p = Piece::new(PieceId(0), BlockColor::Red, ShapePreset::Horizontal2.into(), Coord::new(2, 2))
            .with_orientation(Orientation::Deg90);
        assert_eq!(p.occupied_cells().as_slice(), &[Coord::new(2, 2), Coord::new(2, 3)]);
    }

    #[test]
    fn test_try_move() {
        let mut b = board();
        let mut p = placed(&mut b, 0, ShapePreset::Horizontal2, Coord::new(0, 0));

        assert!(p.try_move(&mut b, Coord::new(1, 0)));
        assert_eq!(p.pivot(), Coord::new(1, 0));
        assert_eq!(b.occupant_at(Coord::new(0, 0)), None);
        assert_eq!(b.occupant_at(Coord::new(1, 0)), Some(PieceId(0)));
        assert_eq!(b.occupant_at(Coord::new(2, 0)), Some(PieceId(0)));
    }

    #[test]
    fn test_overlapping_own_footprint_is_not_collision() {
        let mut b = board();
        let mut p = placed(&mut b, 0, ShapePreset::Square2x2, Coord::new(0, 0));
        assert!(p.try_move(&mut b, Coord::new(1, 1)));
        assert_eq!(b.cells_of(PieceId(0)).count(), 4);
    }

    #[test]
    fn test_try_move_out_of_bounds_rolls_back() {
        let mut b = board();
        let mut p = placed(&mut b, 0, ShapePreset::Horizontal2, Coord::new(4, 0));
        let before = b.clone();

        assert!(!p.try_move(&mut b, Coord::new(5, 0)));
        assert_eq!(p.pivot(), Coord::new(4, 0));
        assert_eq!(b, before);
    }

    #[test]
    fn test_try_rotate_blocked_rolls_back() {
        let mut b = board();
        let mut p = placed(&mut b, 0, ShapePreset::Horizontal2, Coord::new(2, 2));
        let _blocker = placed(&mut b, 1, ShapePreset::Single, Coord::new(2, 3));
        let before = b.clone();

        assert!(!p.try_rotate(&mut b, true));
        assert_eq!(p.orientation(), Orientation::Deg0);
        assert_eq!(b, before);

        assert!(p.try_rotate(&mut b, false));
        assert_eq!(p.orientation(), Orientation::Deg270);
        assert_eq!(p.occupied_cells().as_slice(), &[Coord::new(2, 2), Coord::new(2, 1)]);
    }

    #[test]
    fn test_remove_from_board_is_idempotent() {
        let mut b = board();
        let mut p = placed(&mut b, 0, ShapePreset::TShape, Coord::new(2, 2));
        p.remove_from_board(&mut b);
        p.remove_from_board(&mut b);
        assert_eq!(b.occupied_count(), 0);
        assert_eq!(p.status(), PieceStatus::Lifted);
    }

    #[test]
    fn test_remove_does_not_touch_other_pieces() {
        let mut b = board();
        let mut p = placed(&mut b, 0, ShapePreset::Single, Coord::new(2, 2));
        // Simulate another piece written over one of our cells.
        b.place(PieceId(9), Coord::new(2, 2));
        p.remove_from_board(&mut b);
        assert_eq!(b.occupant_at(Coord::new(2, 2)), Some(PieceId(9)));
    }

    #[test]
    fn test_place_on_board_reports_skipped_cells() {
        let mut b = board();
        let mut p = Piece::new(PieceId(0), BlockColor::Red, ShapePreset::Horizontal2.into(), Coord::new(5, 0));
        assert!(!p.is_valid_placement(&b));
        assert!(!p.place_on_board(&mut b));
        assert_eq!(b.occupant_at(Coord::new(5, 0)), Some(PieceId(0)));
    }

    #[test]
    fn test_lifted_piece_cannot_move() {
        let mut b = board();
        let mut p = placed(&mut b, 0, ShapePreset::Single, Coord::new(0, 0));
        assert!(p.begin_drag(&mut b));
        assert!(!p.try_move(&mut b, Coord::new(1, 1)));
        assert!(!p.try_rotate(&mut b, true));
        assert_eq!(b.occupied_count(), 0);
    }

    #[test]
    fn test_snap_to_candidate() {
        let mut b = board();
        let mut p = placed(&mut b, 0, ShapePreset::Single, Coord::new(0, 0));
        assert!(p.begin_drag(&mut b));
        assert_eq!(p.drag_origin(), Some(Coord::new(0, 0)));

        let outcome = p.snap_to_grid(&mut b, Coord::new(3, 3));
        assert_eq!(outcome, SnapOutcome::Snapped(Coord::new(3, 3)));
        assert!(p.is_placed());
        assert_eq!(p.drag_origin(), None);
        assert_eq!(b.occupant_at(Coord::new(3, 3)), Some(PieceId(0)));
        assert_eq!(b.occupied_count(), 1);
    }

    #[test]
    fn test_snap_off_board_pulls_inside() {
        let mut b = board();
        let mut p = placed(&mut b, 0, ShapePreset::Single, Coord::new(2, 2));
        p.begin_drag(&mut b);
        let outcome = p.snap_to_grid(&mut b, Coord::new(-1, 2));
        assert_eq!(outcome, SnapOutcome::Snapped(Coord::new(0, 2)));
    }

    #[test]
    fn test_snap_reverts_when_exhausted() {
        let mut b = Board::new(12, 1).unwrap();
        let mut p = placed(&mut b, 0, ShapePreset::Single, Coord::new(0, 0));
        for x in 5..12 {
            b.place(PieceId(1), Coord::new(x, 0));
        }
        p.begin_drag(&mut b);
        let outcome = p.snap_to_grid(&mut b, Coord::new(8, 0));
        assert_eq!(outcome, SnapOutcome::Reverted(Coord::new(0, 0)));
        assert_eq!(b.occupant_at(Coord::new(0, 0)), Some(PieceId(0)));
    }

    #[test]
    fn test_snap_unplaced_when_origin_blocked() {
        let mut b = Board::new(12, 1).unwrap();
        let mut p = placed(&mut b, 0, ShapePreset::Single, Coord::new(0, 0));
        p.begin_drag(&mut b);
        for x in 0..12 {
            if x < 1 || x >= 5 {
                b.place(PieceId(1), Coord::new(x, 0));
            }
        }
        // Everything within radius 3 of x = 9, and the origin, is blocked.
        let outcome = p.snap_to_grid(&mut b, Coord::new(9, 0));
        assert_eq!(outcome, SnapOutcome::Unplaced);
        assert!(!outcome.is_placed());
        assert_eq!(p.status(), PieceStatus::Lifted);
        assert_eq!(b.cells_of(PieceId(0)).count(), 0);
    }

    #[test]
    fn test_snap_without_drag_uses_current_pose() {
        let mut b = board();
        let mut p = placed(&mut b, 0, ShapePreset::Single, Coord::new(1, 1));
        let outcome = p.snap_to_grid(&mut b, Coord::new(4, 1));
        assert_eq!(outcome, SnapOutcome::Snapped(Coord::new(4, 1)));
        assert_eq!(b.cells_of(PieceId(0)).collect::<Vec<_>>(), vec![Coord::new(4, 1)]);
    }
}
