//! Shapes module - preset offset tables and custom shapes
//!
//! A shape is an ordered list of offsets relative to a piece pivot. Shapes are
//! fixed when the piece is created; rotation is applied on top, never baked in.
//!
//! The preset table is puzzle data: level solvability depends on these exact
//! offsets, so they must not change.

use arrayvec::ArrayVec;
use derive_more::{Display, Error};

use crate::types::{Coord, MAX_SHAPE_CELLS};

/// Named shape presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapePreset {
    Single,
    Horizontal2,
    Vertical2,
    Square2x2,
    LShape,
    TShape,
    Zigzag,
}

const SINGLE: [Coord; 1] = [Coord::new(0, 0)];
const HORIZONTAL2: [Coord; 2] = [Coord::new(0, 0), Coord::new(1, 0)];
const VERTICAL2: [Coord; 2] = [Coord::new(0, 0), Coord::new(0, 1)];
const SQUARE2X2: [Coord; 4] = [
    Coord::new(0, 0),
    Coord::new(1, 0),
    Coord::new(0, 1),
    Coord::new(1, 1),
];
const LSHAPE: [Coord; 4] = [
    Coord::new(0, 0),
    Coord::new(0, 1),
    Coord::new(0, 2),
    Coord::new(1, 0),
];
const TSHAPE: [Coord; 4] = [
    Coord::new(0, 0),
    Coord::new(-1, 0),
    Coord::new(1, 0),
    Coord::new(0, 1),
];
const ZIGZAG: [Coord; 4] = [
    Coord::new(0, 0),
    Coord::new(1, 0),
    Coord::new(1, 1),
    Coord::new(2, 1),
];

impl ShapePreset {
    pub const ALL: [ShapePreset; 7] = [
        ShapePreset::Single,
        ShapePreset::Horizontal2,
        ShapePreset::Vertical2,
        ShapePreset::Square2x2,
        ShapePreset::LShape,
        ShapePreset::TShape,
        ShapePreset::Zigzag,
    ];

    /// Look up a preset by name (case-insensitive)
    ///
    /// ```
    /// use block_gate_core::shapes::ShapePreset;
    ///
    /// assert_eq!(ShapePreset::from_name("square2x2"), Some(ShapePreset::Square2x2));
    /// assert_eq!(ShapePreset::from_name("TShape"), Some(ShapePreset::TShape));
    /// assert_eq!(ShapePreset::from_name("pentomino"), None);
    /// ```
    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "single" => Some(ShapePreset::Single),
            "horizontal2" => Some(ShapePreset::Horizontal2),
            "vertical2" => Some(ShapePreset::Vertical2),
            "square2x2" => Some(ShapePreset::Square2x2),
            "lshape" => Some(ShapePreset::LShape),
            "tshape" => Some(ShapePreset::TShape),
            "zigzag" => Some(ShapePreset::Zigzag),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ShapePreset::Single => "single",
            ShapePreset::Horizontal2 => "horizontal2",
            ShapePreset::Vertical2 => "vertical2",
            ShapePreset::Square2x2 => "square2x2",
            ShapePreset::LShape => "lshape",
            ShapePreset::TShape => "tshape",
            ShapePreset::Zigzag => "zigzag",
        }
    }

    /// Offsets relative to the pivot, in definition order
    pub fn offsets(&self) -> &'static [Coord] {
        match self {
            ShapePreset::Single => &SINGLE,
            ShapePreset::Horizontal2 => &HORIZONTAL2,
            ShapePreset::Vertical2 => &VERTICAL2,
            ShapePreset::Square2x2 => &SQUARE2X2,
            ShapePreset::LShape => &LSHAPE,
            ShapePreset::TShape => &TSHAPE,
            ShapePreset::Zigzag => &ZIGZAG,
        }
    }
}

/// Rejected custom shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
pub enum ShapeError {
    #[display("shape has no cells")]
    Empty,
    #[display("shape has more than {} cells", MAX_SHAPE_CELLS)]
    TooLarge,
    #[display("shape repeats offset ({}, {})", _0.x, _0.y)]
    Duplicate(#[error(not(source))] Coord),
}

/// Ordered, immutable list of pivot-relative offsets
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Shape {
    offsets: ArrayVec<Coord, MAX_SHAPE_CELLS>,
}

impl Shape {
    /// Build a shape from a custom offset list
    pub fn custom(offsets: &[Coord]) -> Result<Self, ShapeError> {
        if offsets.is_empty() {
            return Err(ShapeError::Empty);
        }
        let mut out = ArrayVec::new();
        for &offset in offsets {
            if out.contains(&offset) {
                return Err(ShapeError::Duplicate(offset));
            }
            out.try_push(offset).map_err(|_| ShapeError::TooLarge)?;
        }
        Ok(Self { offsets: out })
    }

    pub fn offsets(&self) -> &[Coord] {
        &self.offsets
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }
}

impl From<ShapePreset> for Shape {
    fn from(preset: ShapePreset) -> Self {
        Self {
            offsets: preset.offsets().iter().copied().collect(),
        }
    }
}
