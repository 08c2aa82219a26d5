//! Engine crate - session ownership, commands, and levels
//!
//! Wraps the pure placement rules of `block-gate-core` in a [`Session`] that
//! owns the board, the pieces and the gates of one level:
//!
//! - [`session`]: the owned state and the id-addressed operations on it
//! - [`place`]: typed commands with explicit rejection reasons
//! - [`level`]: JSON level files and the built-in demo level
//!
//! ```
//! use block_gate_engine::{apply_command, Command, CommandOutcome, LevelConfig, Session};
//! use block_gate_engine::types::{Coord, PieceId};
//!
//! let mut session = Session::from_level(&LevelConfig::demo()).unwrap();
//! let out = apply_command(&mut session, Command::Move { piece: PieceId(0), to: Coord::new(0, 1) });
//! assert_eq!(out, Ok(CommandOutcome::Moved(Coord::new(0, 1))));
//! assert!(session.audit().is_ok());
//! ```

pub mod level;
pub mod place;
pub mod session;

pub use block_gate_core as core;
pub use block_gate_types as types;

pub use level::{GateConfig, LevelConfig, LevelError, PieceConfig, ShapeConfig};
pub use place::{apply_command, Command, CommandOutcome, PlaceError};
pub use session::{InvariantViolation, Session};
