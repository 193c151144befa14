//! Magic bitboard tables for sliding piece attack generation.
//!
//! Magic bitboards use a perfect hashing technique to map blocker
//! configurations to precomputed attack bitboards in O(1) time. The
//! multipliers are not hard-coded: they are searched for when the tables
//! are built, from a fixed seed, so every build finds the same numbers.

use std::fmt;

use karuah_core::Square;

use super::rays::{relevant_mask, slide, Direction};
use super::TableError;
use crate::Bitboard;

/// Right shift applied to the multiplied occupancy. Every square gets
/// `1 << (64 - SHIFT)` slots, enough for the 12-bit rook corner masks.
pub const SHIFT: u32 = 52;

/// Slots per square.
pub const SLOTS: usize = 1 << (64 - SHIFT);

/// Candidates tried per square before giving up.
pub const MAX_ATTEMPTS: u32 = 1 << 24;

const SEED: u64 = 0x9E37_79B9_7F4A_7C15;

/// The two slider families with their own table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slider {
    Bishop,
    Rook,
}

impl Slider {
    pub const fn directions(self) -> &'static [Direction; 4] {
        match self {
            Slider::Bishop => &Direction::DIAGONAL,
            Slider::Rook => &Direction::ORTHOGONAL,
        }
    }
}

impl fmt::Display for Slider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slider::Bishop => write!(f, "bishop"),
            Slider::Rook => write!(f, "rook"),
        }
    }
}

/// Xorshift generator for magic candidates.
pub(crate) struct Prng(u64);

impl Prng {
    pub(crate) const fn new(seed: u64) -> Self {
        Prng(seed)
    }

    pub(crate) fn next(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }

    /// A candidate with few bits set; these make better multipliers.
    pub(crate) fn sparse(&mut self) -> u64 {
        self.next() & self.next() & self.next()
    }
}

/// Magic entry for a single square.
#[derive(Debug, Clone, Copy, Default)]
pub struct Magic {
    /// Mask of relevant blocker squares (excludes edges).
    pub mask: Bitboard,
    /// The magic number for this square.
    pub magic: u64,
}

impl Magic {
    /// Computes the table slot for a given blocker configuration.
    #[inline]
    pub fn index(&self, occupied: Bitboard) -> usize {
        ((occupied & self.mask).0.wrapping_mul(self.magic) >> SHIFT) as usize
    }
}

/// All blocker subsets of one square's mask with their attack sets.
struct Subsets {
    occupancy: Vec<Bitboard>,
    reference: Vec<Bitboard>,
}

impl Subsets {
    fn enumerate(sq: Square, slider: Slider, mask: Bitboard) -> Self {
        let mut occupancy = Vec::with_capacity(SLOTS);
        let mut reference = Vec::with_capacity(SLOTS);

        // Carry-Rippler trick to enumerate all subsets
        let mut blockers = Bitboard::EMPTY;
        loop {
            occupancy.push(blockers);
            reference.push(slide(sq, slider.directions(), blockers, false));
            blockers = Bitboard(blockers.0.wrapping_sub(mask.0) & mask.0);
            if blockers.is_empty() {
                break;
            }
        }

        Subsets {
            occupancy,
            reference,
        }
    }
}

/// Attack table for one slider family.
pub struct SliderTable {
    magics: [Magic; 64],
    attacks: Vec<Bitboard>,
}

impl SliderTable {
    /// Searches a multiplier for every square and fills the table.
    ///
    /// Returns the table together with the total number of candidates tried.
    pub fn build(slider: Slider) -> Result<(Self, u64), TableError> {
        let mut rng = Prng::new(match slider {
            Slider::Bishop => SEED,
            Slider::Rook => SEED.rotate_left(32),
        });
        let mut magics = [Magic::default(); 64];
        let mut attacks = vec![Bitboard::EMPTY; 64 * SLOTS];
        let mut epoch = vec![0u32; SLOTS];
        let mut scratch = vec![Bitboard::EMPTY; SLOTS];
        let mut tried = 0u64;

        for (index, entry) in magics.iter_mut().enumerate() {
            let Some(sq) = Square::from_index(index as u8) else {
                continue;
            };
            let mask = relevant_mask(sq, slider.directions());
            let subsets = Subsets::enumerate(sq, slider, mask);

            let (magic, attempts) =
                find_magic(sq, slider, mask, &subsets, &mut rng, &mut epoch, &mut scratch)?;
            tried += u64::from(attempts);
            *entry = Magic { mask, magic };

            let slots = &mut attacks[index * SLOTS..(index + 1) * SLOTS];
            fill(sq, slider, entry, &subsets, slots)?;
        }

        Ok((SliderTable { magics, attacks }, tried))
    }

    /// Attack set for a slider on `sq` given the full board occupancy.
    /// Rays include the first blocker on each line.
    #[inline]
    pub fn attacks(&self, sq: Square, occupied: Bitboard) -> Bitboard {
        let magic = &self.magics[sq.idx()];
        self.attacks[sq.idx() * SLOTS + magic.index(occupied)]
    }

    /// Like [`SliderTable::attacks`] but each ray runs on through the first
    /// blocker and stops at the second.
    #[inline]
    pub fn xray(&self, sq: Square, occupied: Bitboard) -> Bitboard {
        let first = self.attacks(sq, occupied) & occupied;
        self.attacks(sq, occupied & !first)
    }

    /// The relevant-occupancy mask for `sq`.
    #[inline]
    pub fn mask(&self, sq: Square) -> Bitboard {
        self.magics[sq.idx()].mask
    }

    /// The multiplier chosen for `sq`.
    #[inline]
    pub fn magic(&self, sq: Square) -> u64 {
        self.magics[sq.idx()].magic
    }
}

/// Draws candidates until one maps every subset without a destructive
/// collision. Two subsets may share a slot only if their attacks agree.
fn find_magic(
    sq: Square,
    slider: Slider,
    mask: Bitboard,
    subsets: &Subsets,
    rng: &mut Prng,
    epoch: &mut [u32],
    scratch: &mut [Bitboard],
) -> Result<(u64, u32), TableError> {
    // Stale epochs from the previous square must not count as filled.
    epoch.fill(0);

    for attempt in 1..=MAX_ATTEMPTS {
        let candidate = rng.sparse();
        // Cheap filter: the top byte of the product needs enough bits.
        if (mask.0.wrapping_mul(candidate) >> 56).count_ones() < 6 {
            continue;
        }

        let magic = Magic {
            mask,
            magic: candidate,
        };
        let mut ok = true;
        for (occupancy, reference) in subsets.occupancy.iter().zip(&subsets.reference) {
            let slot = magic.index(*occupancy);
            if epoch[slot] < attempt {
                epoch[slot] = attempt;
                scratch[slot] = *reference;
            } else if scratch[slot] != *reference {
                ok = false;
                break;
            }
        }

        if ok {
            return Ok((candidate, attempt));
        }
    }

    Err(TableError::MagicNotFound {
        slider,
        square: sq,
        attempts: MAX_ATTEMPTS,
    })
}

/// Writes every subset's attack set into its slot, rejecting a multiplier
/// that sends two different attack sets to the same slot.
fn fill(
    sq: Square,
    slider: Slider,
    magic: &Magic,
    subsets: &Subsets,
    slots: &mut [Bitboard],
) -> Result<(), TableError> {
    let mut written = vec![false; slots.len()];
    for (occupancy, reference) in subsets.occupancy.iter().zip(&subsets.reference) {
        let slot = magic.index(*occupancy);
        if written[slot] && slots[slot] != *reference {
            return Err(TableError::MagicCollision { slider, square: sq });
        }
        written[slot] = true;
        slots[slot] = *reference;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn magic_index_stays_in_range() {
        let magic = Magic {
            mask: Bitboard::FULL,
            magic: u64::MAX,
        };
        assert!(magic.index(Bitboard::FULL) < SLOTS);
    }

    #[test]
    fn sparse_candidates_have_fewer_bits() {
        let mut rng = Prng::new(SEED);
        let total: u32 = (0..64).map(|_| rng.sparse().count_ones()).sum();
        // Three-way AND leaves about an eighth of the bits set.
        assert!(total < 64 * 16);
    }

    #[test]
    fn fill_rejects_a_bad_multiplier() {
        let sq = Square::from_algebraic("d4").unwrap();
        let mask = relevant_mask(sq, Slider::Rook.directions());
        let subsets = Subsets::enumerate(sq, Slider::Rook, mask);
        let mut slots = vec![Bitboard::EMPTY; SLOTS];
        // A zero multiplier sends every subset to slot 0.
        let zero = Magic { mask, magic: 0 };
        assert!(matches!(
            fill(sq, Slider::Rook, &zero, &subsets, &mut slots),
            Err(TableError::MagicCollision { .. })
        ));
    }

    #[test]
    fn exhausted_search_is_reported() {
        let sq = Square::A1;
        let mask = relevant_mask(sq, Slider::Rook.directions());
        let subsets = Subsets::enumerate(sq, Slider::Rook, mask);
        // A generator stuck at zero never yields a usable candidate.
        let mut rng = Prng::new(0);
        let mut epoch = vec![0u32; SLOTS];
        let mut scratch = vec![Bitboard::EMPTY; SLOTS];
        assert!(matches!(
            find_magic(sq, Slider::Rook, mask, &subsets, &mut rng, &mut epoch, &mut scratch),
            Err(TableError::MagicNotFound { .. })
        ));
    }
}
