//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the engine.
//! All types are pure data structures with no external dependencies, making them
//! usable in any context (placement engine, level loading, remote protocol).
//!
//! # Coordinates
//!
//! Grid cells are addressed by integer `(x, y)` pairs. The same [`Coord`] type is
//! used for absolute board cells and for shape offsets relative to a piece pivot.
//!
//! - `x` grows to the right
//! - `y` grows upward
//! - A board of size `W x H` covers `[0, W) x [0, H)`
//!
//! # Orientations
//!
//! Pieces rotate in quarter turns. The rotation transform is a pure lookup:
//!
//! | Orientation | `(x, y)` maps to |
//! |-------------|------------------|
//! | `Deg0`      | `(x, y)`         |
//! | `Deg90`     | `(-y, x)`        |
//! | `Deg180`    | `(-x, -y)`       |
//! | `Deg270`    | `(y, -x)`        |
//!
//! # Examples
//!
//! ```
//! use block_gate_types::{BlockColor, Coord, Orientation};
//!
//! let color = BlockColor::from_str("RED").unwrap();
//! assert_eq!(color, BlockColor::Red);
//!
//! let o = Orientation::Deg0.rotate_cw();
//! assert_eq!(o, Orientation::Deg90);
//! assert_eq!(o.apply(Coord::new(1, 0)), Coord::new(0, 1));
//!
//! assert_eq!(Orientation::from_degrees(-90), Some(Orientation::Deg270));
//! ```

use std::ops::{Add, Neg, Sub};

/// Default board width used by the demo level
pub const DEFAULT_BOARD_WIDTH: u16 = 6;

/// Default board height used by the demo level
pub const DEFAULT_BOARD_HEIGHT: u16 = 6;

/// Largest ring radius probed by the snap-to-grid search
pub const SNAP_MAX_RADIUS: i32 = 3;

/// Maximum number of cells a single shape may cover
pub const MAX_SHAPE_CELLS: usize = 16;

/// Integer grid coordinate (absolute cell or pivot-relative offset)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub const ORIGIN: Coord = Coord { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Nearest grid cell for a continuous position already expressed in cell units.
    ///
    /// Rounds to the closest cell center (halves away from zero) rather than
    /// flooring, so a release point is attracted to the closer cell.
    ///
    /// ```
    /// use block_gate_types::Coord;
    ///
    /// assert_eq!(Coord::nearest(2.6, 0.4), Coord::new(3, 0));
    /// assert_eq!(Coord::nearest(-0.6, 1.5), Coord::new(-1, 2));
    /// ```
    pub fn nearest(fx: f32, fy: f32) -> Self {
        Self {
            x: fx.round() as i32,
            y: fy.round() as i32,
        }
    }

    /// Component-wise add, `None` if either axis overflows
    ///
    /// ```
    /// use block_gate_types::Coord;
    ///
    /// assert_eq!(Coord::new(1, 2).checked_add(Coord::new(3, -4)), Some(Coord::new(4, -2)));
    /// assert_eq!(Coord::new(i32::MAX, 0).checked_add(Coord::new(1, 0)), None);
    /// ```
    pub fn checked_add(self, rhs: Coord) -> Option<Coord> {
        Some(Coord::new(self.x.checked_add(rhs.x)?, self.y.checked_add(rhs.y)?))
    }

    /// Component-wise add clamped to the `i32` range
    pub fn saturating_add(self, rhs: Coord) -> Coord {
        Coord::new(self.x.saturating_add(rhs.x), self.y.saturating_add(rhs.y))
    }

    /// Chebyshev (king-move) distance
    pub fn chebyshev(self, other: Coord) -> u32 {
        self.x.abs_diff(other.x).max(self.y.abs_diff(other.y))
    }
}

impl From<(i32, i32)> for Coord {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

impl Add for Coord {
    type Output = Coord;

    fn add(self, rhs: Coord) -> Coord {
        Coord::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Coord {
    type Output = Coord;

    fn sub(self, rhs: Coord) -> Coord {
        Coord::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Neg for Coord {
    type Output = Coord;

    fn neg(self) -> Coord {
        Coord::new(-self.x, -self.y)
    }
}

/// Block colors
///
/// Gates only let through pieces of their own color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockColor {
    Red,
    Green,
    Blue,
    Yellow,
}

impl BlockColor {
    pub const ALL: [BlockColor; 4] = [
        BlockColor::Red,
        BlockColor::Green,
        BlockColor::Blue,
        BlockColor::Yellow,
    ];

    /// Parse color from string (case-insensitive)
    ///
    /// # Examples
    ///
    /// ```
    /// use block_gate_types::BlockColor;
    ///
    /// assert_eq!(BlockColor::from_str("green"), Some(BlockColor::Green));
    /// assert_eq!(BlockColor::from_str("Yellow"), Some(BlockColor::Yellow));
    /// assert_eq!(BlockColor::from_str("purple"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "red" => Some(BlockColor::Red),
            "green" => Some(BlockColor::Green),
            "blue" => Some(BlockColor::Blue),
            "yellow" => Some(BlockColor::Yellow),
            _ => None,
        }
    }

    /// Convert to lowercase string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockColor::Red => "red",
            BlockColor::Green => "green",
            BlockColor::Blue => "blue",
            BlockColor::Yellow => "yellow",
        }
    }
}

/// Quarter-turn orientation of a piece
///
/// The cycle goes: 0° → 90° → 180° → 270° → 0° (clockwise).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Orientation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Orientation {
    /// Rotate clockwise (90°)
    ///
    /// ```
    /// use block_gate_types::Orientation;
    ///
    /// assert_eq!(Orientation::Deg0.rotate_cw(), Orientation::Deg90);
    /// assert_eq!(Orientation::Deg270.rotate_cw(), Orientation::Deg0);
    /// ```
    pub fn rotate_cw(&self) -> Self {
        match self {
            Orientation::Deg0 => Orientation::Deg90,
            Orientation::Deg90 => Orientation::Deg180,
            Orientation::Deg180 => Orientation::Deg270,
            Orientation::Deg270 => Orientation::Deg0,
        }
    }

    /// Rotate counter-clockwise (-90° or 270°)
    ///
    /// ```
    /// use block_gate_types::Orientation;
    ///
    /// assert_eq!(Orientation::Deg0.rotate_ccw(), Orientation::Deg270);
    /// assert_eq!(Orientation::Deg90.rotate_ccw(), Orientation::Deg0);
    /// ```
    pub fn rotate_ccw(&self) -> Self {
        match self {
            Orientation::Deg0 => Orientation::Deg270,
            Orientation::Deg270 => Orientation::Deg180,
            Orientation::Deg180 => Orientation::Deg90,
            Orientation::Deg90 => Orientation::Deg0,
        }
    }

    pub fn rotate(&self, clockwise: bool) -> Self {
        if clockwise {
            self.rotate_cw()
        } else {
            self.rotate_ccw()
        }
    }

    /// Clockwise angle in degrees, always one of 0, 90, 180, 270
    pub fn degrees(&self) -> i32 {
        match self {
            Orientation::Deg0 => 0,
            Orientation::Deg90 => 90,
            Orientation::Deg180 => 180,
            Orientation::Deg270 => 270,
        }
    }

    /// Normalize an arbitrary angle into an orientation.
    ///
    /// Negative and multi-turn angles wrap modulo 360. Angles that are not a
    /// multiple of 90 have no orientation.
    ///
    /// ```
    /// use block_gate_types::Orientation;
    ///
    /// assert_eq!(Orientation::from_degrees(450), Some(Orientation::Deg90));
    /// assert_eq!(Orientation::from_degrees(-180), Some(Orientation::Deg180));
    /// assert_eq!(Orientation::from_degrees(45), None);
    /// ```
    pub fn from_degrees(degrees: i32) -> Option<Self> {
        match degrees.rem_euclid(360) {
            0 => Some(Orientation::Deg0),
            90 => Some(Orientation::Deg90),
            180 => Some(Orientation::Deg180),
            270 => Some(Orientation::Deg270),
            _ => None,
        }
    }

    /// Apply this rotation to a pivot-relative offset
    #[inline]
    pub fn apply(&self, offset: Coord) -> Coord {
        let Coord { x, y } = offset;
        match self {
            Orientation::Deg0 => Coord::new(x, y),
            Orientation::Deg90 => Coord::new(y.saturating_neg(), x),
            Orientation::Deg180 => Coord::new(x.saturating_neg(), y.saturating_neg()),
            Orientation::Deg270 => Coord::new(y, x.saturating_neg()),
        }
    }
}

/// Opaque handle of a piece inside a session arena
///
/// A handle is the piece's index in its session and doubles as the ownership
/// token stored in board cells. Handles stay stable until the session is
/// reset, after which numbering starts again from zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PieceId(pub u32);

impl PieceId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A cell on the board
///
/// - `None`: Empty cell
/// - `Some(PieceId)`: Cell occupied by the given piece
pub type Cell = Option<PieceId>;
