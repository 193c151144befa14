//! Precomputed square-indexed lookup tables.
//!
//! [`Tables`] is built once and then only read. It bundles the directional
//! rays, the magic slider tables (with their x-ray lookups), the knight and
//! king jump tables, the castling rook map and the Zobrist keys. Positions
//! hold it behind an [`Arc`]; [`Tables::shared`] hands out one process-wide
//! copy.

mod jumps;
mod magics;
mod rays;

use std::sync::{Arc, OnceLock};

use karuah_core::Square;
use thiserror::Error;

pub use magics::{Magic, Slider, SliderTable, MAX_ATTEMPTS, SHIFT, SLOTS};
pub use rays::{relevant_mask, slide, Direction};

use crate::zobrist::ZobristKeys;
use crate::Bitboard;

/// Errors raised while building the lookup tables. Any of them leaves the
/// engine unusable.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TableError {
    #[error("no {slider} magic found for {square} after {attempts} attempts")]
    MagicNotFound {
        slider: Slider,
        square: Square,
        attempts: u32,
    },

    #[error("{slider} magic for {square} maps two attack sets to one slot")]
    MagicCollision { slider: Slider, square: Square },
}

static SHARED: OnceLock<Result<Arc<Tables>, TableError>> = OnceLock::new();

/// All static lookup data used by pattern generation and positions.
pub struct Tables {
    rays: [[Bitboard; 8]; 64],
    bishop: SliderTable,
    rook: SliderTable,
    zobrist: ZobristKeys,
}

impl Tables {
    /// Builds every table from scratch.
    pub fn build() -> Result<Self, TableError> {
        let (bishop, bishop_tries) = SliderTable::build(Slider::Bishop)?;
        let (rook, rook_tries) = SliderTable::build(Slider::Rook)?;
        tracing::debug!(
            bishop_candidates = bishop_tries,
            rook_candidates = rook_tries,
            "lookup tables built"
        );

        Ok(Tables {
            rays: rays::build_rays(),
            bishop,
            rook,
            zobrist: ZobristKeys::new(),
        })
    }

    /// The process-wide tables, built on first use.
    ///
    /// A failed build is remembered, so later calls return the same error
    /// without searching again.
    pub fn shared() -> Result<Arc<Tables>, TableError> {
        SHARED
            .get_or_init(|| Tables::build().map(Arc::new))
            .clone()
    }

    /// Squares from `sq` to the edge in `dir`.
    #[inline]
    pub fn ray(&self, sq: Square, dir: Direction) -> Bitboard {
        self.rays[sq.idx()][dir.index()]
    }

    /// Squares strictly between `a` and `b` when they share a rank, file or
    /// diagonal; empty otherwise.
    pub fn between(&self, a: Square, b: Square) -> Bitboard {
        Direction::ALL
            .into_iter()
            .find(|&dir| self.ray(a, dir).contains(b))
            .map_or(Bitboard::EMPTY, |dir| {
                self.ray(a, dir) & self.ray(b, dir.opposite())
            })
    }

    #[inline]
    pub fn knight_jumps(&self, sq: Square) -> Bitboard {
        jumps::KNIGHT_JUMPS[sq.idx()]
    }

    #[inline]
    pub fn king_jumps(&self, sq: Square) -> Bitboard {
        jumps::KING_JUMPS[sq.idx()]
    }

    /// Bishop attacks, stopping at (and including) the first blocker.
    #[inline]
    pub fn bishop_attacks(&self, sq: Square, occupied: Bitboard) -> Bitboard {
        self.bishop.attacks(sq, occupied)
    }

    /// Rook attacks, stopping at (and including) the first blocker.
    #[inline]
    pub fn rook_attacks(&self, sq: Square, occupied: Bitboard) -> Bitboard {
        self.rook.attacks(sq, occupied)
    }

    /// Queen attacks (bishop + rook).
    #[inline]
    pub fn queen_attacks(&self, sq: Square, occupied: Bitboard) -> Bitboard {
        self.bishop_attacks(sq, occupied) ^ self.rook_attacks(sq, occupied)
    }

    /// Bishop rays continued through the first blocker to the second.
    #[inline]
    pub fn bishop_xray(&self, sq: Square, occupied: Bitboard) -> Bitboard {
        self.bishop.xray(sq, occupied)
    }

    /// Rook rays continued through the first blocker to the second.
    #[inline]
    pub fn rook_xray(&self, sq: Square, occupied: Bitboard) -> Bitboard {
        self.rook.xray(sq, occupied)
    }

    #[inline]
    pub fn queen_xray(&self, sq: Square, occupied: Bitboard) -> Bitboard {
        self.bishop_xray(sq, occupied) ^ self.rook_xray(sq, occupied)
    }

    /// The slider table for one family.
    pub fn slider(&self, slider: Slider) -> &SliderTable {
        match slider {
            Slider::Bishop => &self.bishop,
            Slider::Rook => &self.rook,
        }
    }

    #[inline]
    pub fn zobrist(&self) -> &ZobristKeys {
        &self.zobrist
    }

    /// Rook relocation for a castling king landing on `king_to`: the rook's
    /// corner and the square it moves to.
    pub const fn castle_rook(king_to: Square) -> Option<(Square, Square)> {
        match king_to.index() {
            62 => Some((Square::H1, Square::F1)),
            58 => Some((Square::A1, Square::D1)),
            6 => Some((Square::H8, Square::F8)),
            2 => Some((Square::A8, Square::D8)),
            _ => None,
        }
    }
}

impl std::fmt::Debug for Tables {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tables").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tables() -> Arc<Tables> {
        Tables::shared().unwrap()
    }

    fn sq(name: &str) -> Square {
        Square::from_algebraic(name).unwrap()
    }

    #[test]
    fn shared_tables_are_built_once() {
        let a = tables();
        let b = tables();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn empty_board_slider_counts() {
        let t = tables();
        let d4 = sq("d4");
        assert_eq!(t.bishop_attacks(d4, Bitboard::EMPTY).count(), 13);
        assert_eq!(t.rook_attacks(d4, Bitboard::EMPTY).count(), 14);
        assert_eq!(t.queen_attacks(d4, Bitboard::EMPTY).count(), 27);
        assert_eq!(t.bishop_attacks(Square::A1, Bitboard::EMPTY).count(), 7);
        assert_eq!(t.rook_attacks(Square::A1, Bitboard::EMPTY).count(), 14);
    }

    #[test]
    fn bishop_attacks_with_blockers() {
        let t = tables();
        let blockers = Bitboard::from_square(sq("e5")) | Bitboard::from_square(sq("c3"));
        let attacks = t.bishop_attacks(sq("d4"), blockers);
        assert!(attacks.contains(sq("e5")));
        assert!(attacks.contains(sq("c3")));
        assert!(!attacks.contains(sq("f6")));
        assert!(!attacks.contains(sq("b2")));
    }

    #[test]
    fn rook_xray_passes_the_first_blocker() {
        let t = tables();
        let blockers = Bitboard::from_square(sq("d6")) | Bitboard::from_square(sq("d8"));
        let plain = t.rook_attacks(sq("d4"), blockers);
        let xray = t.rook_xray(sq("d4"), blockers);
        assert!(!plain.contains(sq("d7")));
        assert!(xray.contains(sq("d7")));
        assert!(xray.contains(sq("d8")));
        assert_eq!(xray & plain, plain);
    }

    #[test]
    fn every_magic_matches_the_ray_caster() {
        let t = tables();
        for index in 0..64u8 {
            let square = Square::from_index(index).unwrap();
            for slider in [Slider::Bishop, Slider::Rook] {
                let mask = t.slider(slider).mask(square);
                // Walk a spread of subsets rather than all of them.
                let mut blockers = Bitboard::EMPTY;
                let mut step = 0;
                loop {
                    if step % 7 == 0 {
                        let expected = slide(square, slider.directions(), blockers, false);
                        assert_eq!(t.slider(slider).attacks(square, blockers), expected);
                    }
                    step += 1;
                    blockers = Bitboard(blockers.0.wrapping_sub(mask.0) & mask.0);
                    if blockers.is_empty() {
                        break;
                    }
                }
            }
        }
    }

    #[test]
    fn castle_rook_map() {
        assert_eq!(Tables::castle_rook(Square::G1), Some((Square::H1, Square::F1)));
        assert_eq!(Tables::castle_rook(Square::C1), Some((Square::A1, Square::D1)));
        assert_eq!(Tables::castle_rook(Square::G8), Some((Square::H8, Square::F8)));
        assert_eq!(Tables::castle_rook(Square::C8), Some((Square::A8, Square::D8)));
        assert_eq!(Tables::castle_rook(Square::E1), None);
    }

    #[test]
    fn rays_are_cached() {
        let t = tables();
        assert_eq!(t.ray(Square::A1, Direction::North).count(), 7);
        assert_eq!(t.ray(sq("d4"), Direction::SouthWest).count(), 3);
    }

    #[test]
    fn squares_between() {
        let t = tables();
        let expected: Bitboard = [sq("e2"), sq("e3"), sq("e4")].into_iter().collect();
        assert_eq!(t.between(Square::E1, sq("e5")), expected);
        assert_eq!(t.between(sq("e5"), Square::E1), expected);
        assert_eq!(t.between(Square::A1, Square::H8).count(), 6);
        assert!(t.between(sq("d4"), sq("e5")).is_empty());
        assert!(t.between(Square::G1, sq("f3")).is_empty());
    }
}
