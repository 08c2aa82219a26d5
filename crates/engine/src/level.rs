//! Level module - JSON level configuration
//!
//! A level file describes the board size, the starting pieces and the gates:
//!
//! ```json
//! {
//!   "name": "intro",
//!   "width": 6,
//!   "height": 6,
//!   "pieces": [
//!     { "color": "red", "shape": "square2x2", "pivot": [0, 0] },
//!     { "color": "blue", "shape": [[0, 0], [1, 0]], "pivot": [4, 4], "rotation": 90 }
//!   ],
//!   "gates": [ { "color": "red", "position": [5, 5] } ]
//! }
//! ```
//!
//! `shape` is either a preset name or a custom offset list. `rotation` is in
//! degrees and is normalized into a quarter-turn orientation.

use std::path::Path;

use derive_more::{Display, Error, From};
use serde::{Deserialize, Serialize};

use crate::core::{BoardError, Gate, Shape, ShapeError, ShapePreset};
use crate::place::PlaceError;
use crate::session::Session;
use crate::types::{BlockColor, Coord, Orientation, DEFAULT_BOARD_HEIGHT, DEFAULT_BOARD_WIDTH};

#[derive(Debug, Display, Error, From)]
pub enum LevelError {
    #[display("failed to read level file: {_0}")]
    #[from]
    Io(std::io::Error),
    #[display("invalid level json: {_0}")]
    #[from]
    Json(serde_json::Error),
    #[display("invalid board: {_0}")]
    #[from]
    Board(BoardError),
    #[display("{kind} {index}: unknown color {name:?}")]
    UnknownColor {
        kind: &'static str,
        index: usize,
        name: String,
    },
    #[display("piece {index}: unknown shape preset {name:?}")]
    UnknownShape { index: usize, name: String },
    #[display("piece {index}: {source}")]
    Shape { index: usize, source: ShapeError },
    #[display("piece {index}: rotation {degrees} is not a multiple of 90")]
    Rotation { index: usize, degrees: i32 },
    #[display("piece {index}: {source}")]
    Placement { index: usize, source: PlaceError },
    #[display("gate {index}: position ({}, {}) is off the board", position.x, position.y)]
    GateOffBoard { index: usize, position: Coord },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ShapeConfig {
    Preset(String),
    Custom(Vec<(i32, i32)>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PieceConfig {
    pub color: String,
    pub shape: ShapeConfig,
    pub pivot: (i32, i32),
    #[serde(default, skip_serializing_if = "is_zero")]
    pub rotation: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateConfig {
    pub color: String,
    pub position: (i32, i32),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelConfig {
    #[serde(default)]
    pub name: String,
    pub width: u16,
    pub height: u16,
    #[serde(default)]
    pub pieces: Vec<PieceConfig>,
    #[serde(default)]
    pub gates: Vec<GateConfig>,
}

fn is_zero(v: &i32) -> bool {
    *v == 0
}

fn parse_color(kind: &'static str, index: usize, name: &str) -> Result<BlockColor, LevelError> {
    BlockColor::from_str(name).ok_or_else(|| LevelError::UnknownColor {
        kind,
        index,
        name: name.to_string(),
    })
}

impl ShapeConfig {
    fn build(&self, index: usize) -> Result<Shape, LevelError> {
        match self {
            ShapeConfig::Preset(name) => ShapePreset::from_name(name)
                .map(Shape::from)
                .ok_or_else(|| LevelError::UnknownShape {
                    index,
                    name: name.clone(),
                }),
            ShapeConfig::Custom(offsets) => {
                let offsets: Vec<Coord> = offsets.iter().copied().map(Coord::from).collect();
                Shape::custom(&offsets).map_err(|source| LevelError::Shape { index, source })
            }
        }
    }
}

impl LevelConfig {
    pub fn from_json(json: &str) -> Result<Self, LevelError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, LevelError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// Built-in level served when no level file is given
    pub fn demo() -> Self {
        let piece = |color: &str, shape: &str, x: i32, y: i32| PieceConfig {
            color: color.to_string(),
            shape: ShapeConfig::Preset(shape.to_string()),
            pivot: (x, y),
            rotation: 0,
        };
        let gate = |color: &str, x: i32, y: i32| GateConfig {
            color: color.to_string(),
            position: (x, y),
        };
        Self {
            name: "demo".to_string(),
            width: DEFAULT_BOARD_WIDTH,
            height: DEFAULT_BOARD_HEIGHT,
            pieces: vec![
                piece("red", "square2x2", 0, 0),
                piece("blue", "tshape", 4, 0),
                piece("green", "lshape", 0, 3),
                piece("yellow", "zigzag", 2, 3),
            ],
            gates: vec![
                gate("red", 5, 5),
                gate("blue", 2, 0),
                gate("green", 5, 3),
                gate("yellow", 3, 1),
            ],
        }
    }
}

impl Session {
    /// Build a fresh session from a level description
    pub fn from_level(level: &LevelConfig) -> Result<Self, LevelError> {
        let mut session = Session::new(level.width, level.height)?;

        for (index, cfg) in level.pieces.iter().enumerate() {
            let color = parse_color("piece", index, &cfg.color)?;
            let shape = cfg.shape.build(index)?;
            let orientation = Orientation::from_degrees(cfg.rotation).ok_or(LevelError::Rotation {
                index,
                degrees: cfg.rotation,
            })?;
            session
                .add_piece(color, shape, Coord::from(cfg.pivot), orientation)
                .map_err(|source| LevelError::Placement { index, source })?;
        }

        for (index, cfg) in level.gates.iter().enumerate() {
            let color = parse_color("gate", index, &cfg.color)?;
            let position = Coord::from(cfg.position);
            if !session.board().is_valid_coord(position) {
                return Err(LevelError::GateOffBoard { index, position });
            }
            session.add_gate(Gate::new(color, position));
        }

        log::info!(
            "level {:?}: {}x{} board, {} pieces, {} gates",
            level.name,
            level.width,
            level.height,
            level.pieces.len(),
            level.gates.len()
        );
        Ok(session)
    }

    /// Replace this session with `level`. On error the session is unchanged.
    pub fn load_level(&mut self, level: &LevelConfig) -> Result<(), LevelError> {
        *self = Session::from_level(level)?;
        Ok(())
    }
}
