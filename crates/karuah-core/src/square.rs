//! Squares, files and ranks.
//!
//! Squares count row by row from a8 (0) to h1 (63), the order the board is
//! drawn in. The search engine counts from a1 instead.

use std::fmt;

/// Board column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum File {
    A = 0,
    B = 1,
    C = 2,
    D = 3,
    E = 4,
    F = 5,
    G = 6,
    H = 7,
}

impl File {
    /// a through h.
    pub const ALL: [File; 8] = [
        File::A,
        File::B,
        File::C,
        File::D,
        File::E,
        File::F,
        File::G,
        File::H,
    ];

    /// Accepts either case.
    #[inline]
    pub const fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            c @ 'a'..='h' => Some(File::ALL[(c as u8 - b'a') as usize]),
            _ => None,
        }
    }

    #[inline]
    pub const fn index(self) -> u8 {
        self as u8
    }

    #[inline]
    pub const fn to_char(self) -> char {
        (b'a' + self as u8) as char
    }
}

impl fmt::Display for File {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Write::write_char(f, self.to_char())
    }
}

/// Board rank. The discriminant is the rank number minus one, so it runs
/// the opposite way to [`Square::row`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Rank {
    R1 = 0,
    R2 = 1,
    R3 = 2,
    R4 = 3,
    R5 = 4,
    R6 = 5,
    R7 = 6,
    R8 = 7,
}

impl Rank {
    /// 1 through 8.
    pub const ALL: [Rank; 8] = [
        Rank::R1,
        Rank::R2,
        Rank::R3,
        Rank::R4,
        Rank::R5,
        Rank::R6,
        Rank::R7,
        Rank::R8,
    ];

    #[inline]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            '1'..='8' => Some(Rank::ALL[(c as u8 - b'1') as usize]),
            _ => None,
        }
    }

    #[inline]
    pub const fn index(self) -> u8 {
        self as u8
    }

    #[inline]
    pub const fn to_char(self) -> char {
        (b'1' + self as u8) as char
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Write::write_char(f, self.to_char())
    }
}

/// Algebraic names of all 64 squares, indexed by square.
pub const COORDINATES: [&str; 64] = [
    "a8", "b8", "c8", "d8", "e8", "f8", "g8", "h8", //
    "a7", "b7", "c7", "d7", "e7", "f7", "g7", "h7", //
    "a6", "b6", "c6", "d6", "e6", "f6", "g6", "h6", //
    "a5", "b5", "c5", "d5", "e5", "f5", "g5", "h5", //
    "a4", "b4", "c4", "d4", "e4", "f4", "g4", "h4", //
    "a3", "b3", "c3", "d3", "e3", "f3", "g3", "h3", //
    "a2", "b2", "c2", "d2", "e2", "f2", "g2", "h2", //
    "a1", "b1", "c1", "d1", "e1", "f1", "g1", "h1", //
];

/// Board square, 0 = a8 through 63 = h1.
///
/// Convert to and from the search engine's a1 = 0 numbering with
/// [`Square::mirror_rank`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Square(u8);

impl Square {
    #[inline]
    pub const fn new(file: File, rank: Rank) -> Self {
        Square((7 - rank.index()) * 8 + file.index())
    }

    #[inline]
    pub const fn from_index(index: u8) -> Option<Self> {
        if index < 64 {
            Some(Square(index))
        } else {
            None
        }
    }

    /// Signed form used in state arrays, where `-1` means no square.
    #[inline]
    pub const fn from_i32(index: i32) -> Option<Self> {
        if index >= 0 && index < 64 {
            Some(Square(index as u8))
        } else {
            None
        }
    }

    /// Row 0 is rank 8, column 0 is file a.
    #[inline]
    pub const fn from_row_col(row: u8, col: u8) -> Option<Self> {
        if row < 8 && col < 8 {
            Some(Square(row * 8 + col))
        } else {
            None
        }
    }

    /// Parses a name such as `e4`.
    pub const fn from_algebraic(s: &str) -> Option<Self> {
        match s.as_bytes() {
            [f, r] => match (File::from_char(*f as char), Rank::from_char(*r as char)) {
                (Some(file), Some(rank)) => Some(Square::new(file, rank)),
                _ => None,
            },
            _ => None,
        }
    }

    #[inline]
    pub const fn index(self) -> u8 {
        self.0
    }

    /// The index as a table subscript.
    #[inline]
    pub const fn idx(self) -> usize {
        self.0 as usize
    }

    /// Board row, 0 for rank 8 through 7 for rank 1.
    #[inline]
    pub const fn row(self) -> u8 {
        self.0 >> 3
    }

    /// Board column, 0 for file a through 7 for file h.
    #[inline]
    pub const fn col(self) -> u8 {
        self.0 & 7
    }

    #[inline]
    pub const fn file(self) -> File {
        File::ALL[self.col() as usize]
    }

    #[inline]
    pub const fn rank(self) -> Rank {
        Rank::ALL[(7 - self.row()) as usize]
    }

    /// Reflects the square across the middle of the board (a8 <-> a1).
    ///
    /// This converts between this crate's numbering and the a1 = 0
    /// numbering used by the search engine; it is its own inverse.
    #[inline]
    pub const fn mirror_rank(self) -> Self {
        Square(self.0 ^ 56)
    }

    /// The square `delta` indices away. Only the 0..64 bound is checked, so
    /// callers stepping sideways must watch the board edge themselves.
    #[inline]
    pub const fn offset(self, delta: i8) -> Option<Self> {
        Square::from_i32(self.0 as i32 + delta as i32)
    }

    /// Algebraic name, from [`COORDINATES`].
    #[inline]
    pub const fn name(self) -> &'static str {
        COORDINATES[self.0 as usize]
    }

    // Back ranks
    pub const A8: Square = Square(0);
    pub const B8: Square = Square(1);
    pub const C8: Square = Square(2);
    pub const D8: Square = Square(3);
    pub const E8: Square = Square(4);
    pub const F8: Square = Square(5);
    pub const G8: Square = Square(6);
    pub const H8: Square = Square(7);
    pub const A1: Square = Square(56);
    pub const B1: Square = Square(57);
    pub const C1: Square = Square(58);
    pub const D1: Square = Square(59);
    pub const E1: Square = Square(60);
    pub const F1: Square = Square(61);
    pub const G1: Square = Square(62);
    pub const H1: Square = Square(63);
}

impl fmt::Debug for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Square({})", self.name())
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_run_from_rank_eight() {
        let d5 = Square::new(File::D, Rank::R5);
        assert_eq!((d5.row(), d5.col()), (3, 3));
        assert_eq!(d5.index(), 27);
        assert_eq!((d5.file(), d5.rank()), (File::D, Rank::R5));
        assert_eq!(Square::from_row_col(7, 4), Some(Square::E1));
        assert_eq!(Square::from_row_col(8, 0), None);
    }

    #[test]
    fn names_parse() {
        assert_eq!(Square::from_algebraic("a8"), Some(Square::A8));
        assert_eq!(Square::from_algebraic("G1"), Some(Square::G1));
        for bad in ["", "e", "e44", "j4", "e0", "e9"] {
            assert_eq!(Square::from_algebraic(bad), None, "{bad}");
        }
    }

    #[test]
    fn coordinate_table_matches_file_and_rank() {
        for i in 0..64u8 {
            let sq = Square(i);
            let expected = format!("{}{}", sq.file(), sq.rank());
            assert_eq!(sq.name(), expected);
            assert_eq!(Square::from_algebraic(sq.name()), Some(sq));
        }
    }

    #[test]
    fn mirror_rank_is_an_involution() {
        assert_eq!(Square::A8.mirror_rank().index(), 56);
        assert_eq!(Square::E1.mirror_rank(), Square::E8);
        for i in 0..64u8 {
            let sq = Square(i);
            assert_eq!(sq.mirror_rank().mirror_rank(), sq);
            assert_eq!(sq.mirror_rank().file(), sq.file());
        }
    }

    #[test]
    fn signed_index_bounds() {
        assert_eq!(Square::from_i32(-1), None);
        assert_eq!(Square::from_i32(64), None);
        assert_eq!(Square::from_i32(63), Some(Square::H1));
        assert_eq!(Square::E1.offset(-8).map(Square::name), Some("e2"));
        assert_eq!(Square::A8.offset(-1), None);
    }
}
