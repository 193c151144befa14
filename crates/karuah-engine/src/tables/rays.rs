//! Directional rays, relevant-occupancy masks and the slow ray-caster the
//! magic tables are filled from.

use crate::Bitboard;
use karuah_core::Square;

/// The eight compass directions, as seen from White's side of the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    North,
    South,
    East,
    West,
    NorthEast,
    NorthWest,
    SouthEast,
    SouthWest,
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
        Direction::NorthEast,
        Direction::NorthWest,
        Direction::SouthEast,
        Direction::SouthWest,
    ];

    /// Directions a bishop slides along.
    pub const DIAGONAL: [Direction; 4] = [
        Direction::NorthEast,
        Direction::NorthWest,
        Direction::SouthEast,
        Direction::SouthWest,
    ];

    /// Directions a rook slides along.
    pub const ORTHOGONAL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
            Direction::NorthEast => Direction::SouthWest,
            Direction::NorthWest => Direction::SouthEast,
            Direction::SouthEast => Direction::NorthWest,
            Direction::SouthWest => Direction::NorthEast,
        }
    }

    /// Moves every set square one step in this direction, dropping squares
    /// that would leave the board.
    #[inline]
    pub const fn step(self, bb: Bitboard) -> Bitboard {
        match self {
            Direction::North => bb.north(),
            Direction::South => bb.south(),
            Direction::East => bb.east(),
            Direction::West => bb.west(),
            Direction::NorthEast => bb.north_east(),
            Direction::NorthWest => bb.north_west(),
            Direction::SouthEast => bb.south_east(),
            Direction::SouthWest => bb.south_west(),
        }
    }
}

/// Squares from `sq` to the board edge in `dir`, excluding `sq` itself.
pub fn ray(sq: Square, dir: Direction) -> Bitboard {
    let mut ray = Bitboard::EMPTY;
    let mut cursor = dir.step(Bitboard::from_square(sq));
    while cursor.is_not_empty() {
        ray |= cursor;
        cursor = dir.step(cursor);
    }
    ray
}

/// All eight rays for every square.
pub fn build_rays() -> [[Bitboard; 8]; 64] {
    let mut rays = [[Bitboard::EMPTY; 8]; 64];
    for (index, entry) in rays.iter_mut().enumerate() {
        if let Some(sq) = Square::from_index(index as u8) {
            for dir in Direction::ALL {
                entry[dir.index()] = ray(sq, dir);
            }
        }
    }
    rays
}

/// Relevant occupancy for a slider on `sq`: its empty-board rays with the
/// final edge square of each ray removed.
pub fn relevant_mask(sq: Square, dirs: &[Direction; 4]) -> Bitboard {
    let mut mask = Bitboard::EMPTY;
    for &dir in dirs {
        let full = ray(sq, dir);
        // The last square of a ray is the only one with no further step.
        let edge = full & !dir.opposite().step(dir.step(full));
        mask |= full & !edge;
    }
    mask
}

/// Slow slider attack generation used to fill and check the magic tables.
///
/// Each ray stops at the first blocker, inclusive. With `xray` set the ray
/// continues through that blocker and stops at the second one instead.
pub fn slide(sq: Square, dirs: &[Direction; 4], blockers: Bitboard, xray: bool) -> Bitboard {
    let limit = if xray { 2 } else { 1 };
    let mut attacks = Bitboard::EMPTY;
    for &dir in dirs {
        let mut hits = 0;
        let mut cursor = dir.step(Bitboard::from_square(sq));
        while cursor.is_not_empty() {
            attacks |= cursor;
            if cursor.intersects(blockers) {
                hits += 1;
                if hits == limit {
                    break;
                }
            }
            cursor = dir.step(cursor);
        }
    }
    attacks
}
