use derive_more::{Display, Error};

use crate::core::{PieceStatus, Pose, SnapOutcome};
use crate::session::Session;
use crate::types::{Coord, Orientation, PieceId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
pub enum PlaceError {
    #[display("no piece with that id")]
    UnknownPiece,
    #[display("no gate with that index")]
    UnknownGate,
    #[display("piece is not on the board")]
    NotPlaced,
    #[display("piece has already exited")]
    Exited,
    #[display("target cells are occupied by another piece")]
    Blocked,
    #[display("target would place piece out of bounds")]
    OutOfBounds,
    #[display("gate color does not match piece")]
    ColorMismatch,
    #[display("piece does not cover the gate cell")]
    NotAtGate,
    #[display("no valid position near release point")]
    SnapExhausted,
}

impl PlaceError {
    pub fn code(self) -> &'static str {
        match self {
            PlaceError::UnknownPiece | PlaceError::UnknownGate => "unknown_target",
            PlaceError::NotPlaced | PlaceError::Exited => "invalid_state",
            PlaceError::Blocked | PlaceError::OutOfBounds | PlaceError::SnapExhausted => {
                "invalid_place"
            }
            PlaceError::ColorMismatch | PlaceError::NotAtGate => "exit_refused",
        }
    }
}

/// Placement request issued by a presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Move { piece: PieceId, to: Coord },
    Shift { piece: PieceId, dx: i32, dy: i32 },
    Rotate { piece: PieceId, clockwise: bool },
    Drag { piece: PieceId },
    Drop { piece: PieceId, at: Coord },
    /// `gate: None` tries every gate in order
    Exit { piece: PieceId, gate: Option<usize> },
}

/// What a successful command did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    Moved(Coord),
    Rotated(Orientation),
    Lifted(Coord),
    Dropped(SnapOutcome),
    Exited { gate: usize },
}

fn placed(session: &Session, id: PieceId) -> Result<Pose, PlaceError> {
    let piece = session.piece(id).ok_or(PlaceError::UnknownPiece)?;
    match piece.status() {
        PieceStatus::Placed => Ok(piece.pose()),
        PieceStatus::Lifted => Err(PlaceError::NotPlaced),
        PieceStatus::Exited => Err(PlaceError::Exited),
    }
}

/// Why `pose` was rejected for `id` (assumes it was rejected)
fn classify_rejection(session: &Session, id: PieceId, pose: Pose) -> PlaceError {
    let Some(piece) = session.piece(id) else {
        return PlaceError::UnknownPiece;
    };
    let board = session.board();
    if piece.cells_at(pose).all(|c| board.is_valid_coord(c)) {
        PlaceError::Blocked
    } else {
        PlaceError::OutOfBounds
    }
}

fn apply_move(session: &mut Session, id: PieceId, to: Coord) -> Result<CommandOutcome, PlaceError> {
    let pose = placed(session, id)?;
    if session.try_move(id, to) {
        return Ok(CommandOutcome::Moved(to));
    }
    Err(classify_rejection(session, id, Pose { pivot: to, ..pose }))
}

pub fn apply_command(session: &mut Session, command: Command) -> Result<CommandOutcome, PlaceError> {
    match command {
        Command::Move { piece, to } => apply_move(session, piece, to),

        Command::Shift { piece, dx, dy } => {
            let pose = placed(session, piece)?;
            let to = pose
                .pivot
                .checked_add(Coord::new(dx, dy))
                .ok_or(PlaceError::OutOfBounds)?;
            apply_move(session, piece, to)
        }

        Command::Rotate { piece, clockwise } => {
            let pose = placed(session, piece)?;
            if session.try_rotate(piece, clockwise) {
                return Ok(CommandOutcome::Rotated(pose.orientation.rotate(clockwise)));
            }
            let target = Pose {
                orientation: pose.orientation.rotate(clockwise),
                ..pose
            };
            Err(classify_rejection(session, piece, target))
        }

        Command::Drag { piece } => {
            let pose = placed(session, piece)?;
            session.begin_drag(piece);
            Ok(CommandOutcome::Lifted(pose.pivot))
        }

        Command::Drop { piece, at } => {
            let status = session
                .piece(piece)
                .ok_or(PlaceError::UnknownPiece)?
                .status();
            if status == PieceStatus::Exited {
                return Err(PlaceError::Exited);
            }
            match session.end_drag(piece, at) {
                SnapOutcome::Unplaced => Err(PlaceError::SnapExhausted),
                outcome => Ok(CommandOutcome::Dropped(outcome)),
            }
        }

        Command::Exit { piece, gate } => {
            placed(session, piece)?;
            let candidates: Vec<usize> = match gate {
                Some(index) if index < session.gates().len() => vec![index],
                Some(_) => return Err(PlaceError::UnknownGate),
                None => (0..session.gates().len()).collect(),
            };

            if candidates.is_empty() {
                return Err(PlaceError::UnknownGate);
            }

            let mut color_match = false;
            for index in candidates {
                if session.exit_through(piece, index) {
                    return Ok(CommandOutcome::Exited { gate: index });
                }
                if let (Some(g), Some(p)) = (session.gate(index), session.piece(piece)) {
                    color_match |= g.can_exit_through(p);
                }
            }
            Err(if color_match {
                PlaceError::NotAtGate
            } else {
                PlaceError::ColorMismatch
            })
        }
    }
}
