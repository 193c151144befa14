//! Fixed jump patterns for knights and kings.

use crate::Bitboard;

const KNIGHT_STEPS: [(i8, i8); 8] = [
    (-2, -1),
    (-2, 1),
    (-1, -2),
    (-1, 2),
    (1, -2),
    (1, 2),
    (2, -1),
    (2, 1),
];

const KING_STEPS: [(i8, i8); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Precomputed knight jumps, indexed by square.
pub const KNIGHT_JUMPS: [Bitboard; 64] = jump_table(&KNIGHT_STEPS);

/// Precomputed king steps, indexed by square.
pub const KING_JUMPS: [Bitboard; 64] = jump_table(&KING_STEPS);

/// Builds a jump table from (row, column) offsets, dropping any target that
/// falls off the board.
const fn jump_table(steps: &[(i8, i8); 8]) -> [Bitboard; 64] {
    let mut table = [Bitboard::EMPTY; 64];
    let mut sq = 0;
    while sq < 64 {
        let row = (sq / 8) as i8;
        let col = (sq % 8) as i8;
        let mut bits = 0u64;
        let mut i = 0;
        while i < steps.len() {
            let r = row + steps[i].0;
            let c = col + steps[i].1;
            if r >= 0 && r < 8 && c >= 0 && c < 8 {
                bits |= 1u64 << ((r * 8 + c) as u32);
            }
            i += 1;
        }
        table[sq] = Bitboard(bits);
        sq += 1;
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use karuah_core::Square;

    fn sq(name: &str) -> Square {
        Square::from_algebraic(name).unwrap()
    }

    #[test]
    fn knight_jump_counts() {
        assert_eq!(KNIGHT_JUMPS[Square::A1.idx()].count(), 2);
        assert_eq!(KNIGHT_JUMPS[sq("d4").idx()].count(), 8);
        assert_eq!(KNIGHT_JUMPS[Square::B1.idx()].count(), 3);
        assert!(KNIGHT_JUMPS[Square::G1.idx()].contains(sq("f3")));
        assert!(KNIGHT_JUMPS[Square::G1.idx()].contains(sq("h3")));
        assert!(KNIGHT_JUMPS[Square::G1.idx()].contains(sq("e2")));
    }

    #[test]
    fn king_step_counts() {
        assert_eq!(KING_JUMPS[Square::A8.idx()].count(), 3);
        assert_eq!(KING_JUMPS[Square::E1.idx()].count(), 5);
        assert_eq!(KING_JUMPS[sq("e4").idx()].count(), 8);
        assert!(!KING_JUMPS[Square::H8.idx()].contains(Square::A8));
    }
}
