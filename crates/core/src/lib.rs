//! Core placement module - pure, deterministic, and testable
//!
//! This crate contains the grid store, pieces, and gates of the block puzzle.
//! It has **no dependencies** on rendering, input, networking, or I/O, making it:
//!
//! - **Deterministic**: the same calls on the same board always give the same result
//! - **Testable**: every rule is a plain function over a `Board` and a `Piece`
//! - **Portable**: any presentation layer can drive it with grid coordinates
//!
//! # Module Structure
//!
//! - [`board`]: fixed-size grid mapping cells to the id of the occupying piece
//! - [`shapes`]: preset and custom shape offset tables
//! - [`piece`]: footprint computation, rotation, transactional move/rotate, snapping
//! - [`snap`]: bounded nearest-valid-pivot search with a fixed probe order
//! - [`gate`]: color-matched exits
//!
//! # Rules
//!
//! - **Mutual exclusion**: at most one piece per cell
//! - **Atomic updates**: a move or rotation is committed whole or rolled back whole
//! - **Bounded snapping**: release points search at most [`SNAP_MAX_RADIUS`](types::SNAP_MAX_RADIUS) rings
//!
//! # Example
//!
//! ```
//! use block_gate_core::{Board, Gate, Piece, ShapePreset};
//! use block_gate_core::types::{BlockColor, Coord, PieceId};
//!
//! let mut board = Board::new(6, 6).unwrap();
//! let mut piece = Piece::new(PieceId(0), BlockColor::Red, ShapePreset::Square2x2.into(), Coord::new(0, 0));
//! assert!(piece.place_on_board(&mut board));
//!
//! assert!(piece.try_move(&mut board, Coord::new(4, 4)));
//! assert!(!piece.try_move(&mut board, Coord::new(5, 5))); // off the board
//! assert!(piece.try_rotate(&mut board, false));
//!
//! let gate = Gate::new(BlockColor::Red, Coord::new(4, 4));
//! assert!(gate.process_exit(&mut piece, &mut board));
//! assert_eq!(board.occupied_count(), 0);
//! ```

pub mod board;
pub mod gate;
pub mod piece;
pub mod shapes;
pub mod snap;

pub use block_gate_types as types;

// Re-export commonly used types for convenience
pub use board::{Board, BoardError};
pub use gate::Gate;
pub use piece::{Piece, PieceStatus, Pose, SnapOutcome};
pub use shapes::{Shape, ShapeError, ShapePreset};
pub use snap::{find_nearest_valid, probe_order, NEIGHBOR_ORDER};
