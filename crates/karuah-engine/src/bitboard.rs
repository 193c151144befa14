//! 64-square occupancy sets.
//!
//! Bit `i` stands for square `i`, so the low byte is row 0 (rank 8) and the
//! high byte is row 7 (rank 1). "North" therefore means towards lower
//! indices.

use karuah_core::Square;
use std::fmt;
use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, BitXorAssign, Not};

/// A set of squares packed into a `u64`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Bitboard(pub u64);

const NOT_A_FILE: u64 = !0x0101_0101_0101_0101;
const NOT_H_FILE: u64 = !0x8080_8080_8080_8080;

impl Bitboard {
    pub const EMPTY: Bitboard = Bitboard(0);
    pub const FULL: Bitboard = Bitboard(u64::MAX);

    pub const FILE_A: Bitboard = Bitboard(!NOT_A_FILE);
    pub const FILE_H: Bitboard = Bitboard(!NOT_H_FILE);

    /// Row 0.
    pub const RANK_8: Bitboard = Bitboard::row(0);
    /// Row 1, where black pawns start.
    pub const RANK_7: Bitboard = Bitboard::row(1);
    /// Row 6, where white pawns start.
    pub const RANK_2: Bitboard = Bitboard::row(6);
    /// Row 7.
    pub const RANK_1: Bitboard = Bitboard::row(7);

    /// All eight squares of board row `row` (0 = rank 8).
    pub const fn row(row: u32) -> Bitboard {
        Bitboard(0xFF << (row * 8))
    }

    #[inline]
    pub const fn new(bits: u64) -> Self {
        Bitboard(bits)
    }

    #[inline]
    pub const fn from_square(sq: Square) -> Self {
        Bitboard(1 << sq.index())
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_not_empty(self) -> bool {
        !self.is_empty()
    }

    /// Number of squares in the set.
    #[inline]
    pub const fn count(self) -> u32 {
        self.0.count_ones()
    }

    #[inline]
    pub const fn contains(self, sq: Square) -> bool {
        self.intersects(Bitboard::from_square(sq))
    }

    #[inline]
    pub const fn intersects(self, other: Bitboard) -> bool {
        self.0 & other.0 != 0
    }

    #[inline]
    pub fn set(&mut self, sq: Square) {
        *self |= Bitboard::from_square(sq);
    }

    /// The square with the lowest index (nearest a8).
    #[inline]
    pub const fn lsb(self) -> Option<Square> {
        match self.0 {
            0 => None,
            bits => Square::from_index(bits.trailing_zeros() as u8),
        }
    }

    /// Removes and returns [`Bitboard::lsb`].
    #[inline]
    pub fn pop_lsb(&mut self) -> Option<Square> {
        let sq = self.lsb();
        self.0 &= self.0.wrapping_sub(1);
        sq
    }

    /// One row towards rank 8.
    #[inline]
    pub const fn north(self) -> Bitboard {
        Bitboard(self.0 >> 8)
    }

    /// One row towards rank 1.
    #[inline]
    pub const fn south(self) -> Bitboard {
        Bitboard(self.0 << 8)
    }

    /// One column towards the h-file; squares on the h-file drop off.
    #[inline]
    pub const fn east(self) -> Bitboard {
        Bitboard((self.0 & NOT_H_FILE) << 1)
    }

    /// One column towards the a-file; squares on the a-file drop off.
    #[inline]
    pub const fn west(self) -> Bitboard {
        Bitboard((self.0 & NOT_A_FILE) >> 1)
    }

    #[inline]
    pub const fn north_east(self) -> Bitboard {
        self.east().north()
    }

    #[inline]
    pub const fn north_west(self) -> Bitboard {
        self.west().north()
    }

    #[inline]
    pub const fn south_east(self) -> Bitboard {
        self.east().south()
    }

    #[inline]
    pub const fn south_west(self) -> Bitboard {
        self.west().south()
    }
}

impl From<Square> for Bitboard {
    #[inline]
    fn from(sq: Square) -> Self {
        Bitboard::from_square(sq)
    }
}

macro_rules! bit_op {
    ($op:ident, $method:ident, $assign:ident, $assign_method:ident, $sym:tt) => {
        impl $op for Bitboard {
            type Output = Bitboard;
            #[inline]
            fn $method(self, rhs: Bitboard) -> Bitboard {
                Bitboard(self.0 $sym rhs.0)
            }
        }

        impl $assign for Bitboard {
            #[inline]
            fn $assign_method(&mut self, rhs: Bitboard) {
                *self = *self $sym rhs;
            }
        }
    };
}

bit_op!(BitAnd, bitand, BitAndAssign, bitand_assign, &);
bit_op!(BitOr, bitor, BitOrAssign, bitor_assign, |);
bit_op!(BitXor, bitxor, BitXorAssign, bitxor_assign, ^);

impl Not for Bitboard {
    type Output = Bitboard;
    #[inline]
    fn not(self) -> Bitboard {
        Bitboard(!self.0)
    }
}

/// Prints the raw value followed by an 8x8 grid, rank 8 first.
impl fmt::Debug for Bitboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:#018x}", self.0)?;
        for (row, byte) in self.0.to_le_bytes().iter().enumerate() {
            let cells: String = (0..8)
                .map(|col| if (byte >> col) & 1 == 1 { '1' } else { '.' })
                .collect();
            writeln!(f, "{} {}", 8 - row, cells)?;
        }
        write!(f, "  abcdefgh")
    }
}

/// Squares of a [`Bitboard`] in index order.
pub struct Squares(Bitboard);

impl Iterator for Squares {
    type Item = Square;

    #[inline]
    fn next(&mut self) -> Option<Square> {
        self.0.pop_lsb()
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.0.count() as usize;
        (n, Some(n))
    }
}

impl ExactSizeIterator for Squares {}

impl IntoIterator for Bitboard {
    type Item = Square;
    type IntoIter = Squares;

    #[inline]
    fn into_iter(self) -> Squares {
        Squares(self)
    }
}

impl FromIterator<Square> for Bitboard {
    fn from_iter<I: IntoIterator<Item = Square>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Bitboard::EMPTY, |bb, sq| bb | Bitboard::from_square(sq))
    }
}
