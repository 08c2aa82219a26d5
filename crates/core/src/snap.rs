//! Snap module - nearest valid pivot search for drag release
//!
//! Probe order (stable, decides ties between equally near cells):
//!
//! 1. The candidate pivot itself.
//! 2. The eight immediate neighbours, in [`NEIGHBOR_ORDER`]:
//!    right, left, up, down, then the diagonals up-right, up-left,
//!    down-right, down-left. (`+y` is up.)
//! 3. Square rings of Chebyshev radius `2..=max_radius` around the candidate.
//!    Within a ring cells are visited top row first (`y` descending), and left
//!    to right (`x` ascending) within a row.
//!
//! Radius 1 is exactly the neighbour set, so the ring scan starts at 2.
//! Probes that would leave the `i32` range are skipped.
//! The search is bounded: at most `(2 * max_radius + 1)^2` probes.

use crate::types::Coord;

/// Immediate neighbours probed right after the candidate, in priority order
pub const NEIGHBOR_ORDER: [Coord; 8] = [
    Coord::new(1, 0),
    Coord::new(-1, 0),
    Coord::new(0, 1),
    Coord::new(0, -1),
    Coord::new(1, 1),
    Coord::new(-1, 1),
    Coord::new(1, -1),
    Coord::new(-1, -1),
];

/// Cells at exactly Chebyshev distance `radius` from `center`, in scan order
pub fn ring(center: Coord, radius: i32) -> impl Iterator<Item = Coord> {
    let r = radius.max(0);
    (-r..=r).rev().flat_map(move |dy| {
        (-r..=r)
            .filter(move |dx| dx.abs() == r || dy.abs() == r)
            .filter_map(move |dx| center.checked_add(Coord::new(dx, dy)))
    })
}

/// Full probe sequence for a candidate pivot
///
/// ```
/// use block_gate_core::snap::probe_order;
/// use block_gate_core::types::Coord;
///
/// let probes: Vec<Coord> = probe_order(Coord::new(0, 0), 1).collect();
/// assert_eq!(probes[0], Coord::new(0, 0));
/// assert_eq!(probes[1], Coord::new(1, 0));
/// assert_eq!(probes.len(), 9);
/// ```
pub fn probe_order(candidate: Coord, max_radius: i32) -> impl Iterator<Item = Coord> {
    let neighbors: &'static [Coord] = if max_radius >= 1 { &NEIGHBOR_ORDER } else { &[] };
    std::iter::once(candidate)
        .chain(neighbors.iter().filter_map(move |&d| candidate.checked_add(d)))
        .chain((2..=max_radius).flat_map(move |r| ring(candidate, r)))
}

/// First pivot in probe order accepted by `is_valid`
pub fn find_nearest_valid(
    candidate: Coord,
    max_radius: i32,
    mut is_valid: impl FnMut(Coord) -> bool,
) -> Option<Coord> {
    probe_order(candidate, max_radius).find(|&pivot| is_valid(pivot))
}
