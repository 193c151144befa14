//! Zobrist hashing for position identification.
//!
//! Zobrist hashing creates a unique hash for each chess position by XORing
//! random numbers associated with each piece on each square (12 spins x 64
//! squares = 768 values). Separate key sets cover the side to move and the
//! material composition (12 spins x up to 64 copies).

use karuah_core::{Color, Spin, Square};

/// Zobrist hash keys.
///
/// Generated at compile time from a fixed seed, so hashes are stable across
/// runs and builds.
#[derive(Clone)]
pub struct ZobristKeys {
    /// Keys for pieces: [spin slot][square]
    pub pieces: [[u64; 64]; 12],
    /// Keys for the side to move: [color]
    pub side: [u64; 2],
    /// Keys for material: [spin slot][count - 1]
    pub material: [[u64; 64]; 12],
}

impl ZobristKeys {
    /// Initializes Zobrist keys using a simple xorshift PRNG.
    pub const fn new() -> Self {
        const fn next_random(state: u64) -> (u64, u64) {
            let mut x = state;
            x ^= x << 13;
            x ^= x >> 7;
            x ^= x << 17;
            (x, x)
        }

        let mut state = 0x2545_F491_4F6C_DD1Du64;
        let mut pieces = [[0u64; 64]; 12];
        let mut material = [[0u64; 64]; 12];
        let mut side = [0u64; 2];

        let mut slot = 0;
        while slot < 12 {
            let mut square = 0;
            while square < 64 {
                let (new_state, value) = next_random(state);
                state = new_state;
                pieces[slot][square] = value;
                square += 1;
            }
            slot += 1;
        }

        let mut i = 0;
        while i < 2 {
            let (new_state, value) = next_random(state);
            state = new_state;
            side[i] = value;
            i += 1;
        }

        let mut slot = 0;
        while slot < 12 {
            let mut count = 0;
            while count < 64 {
                let (new_state, value) = next_random(state);
                state = new_state;
                material[slot][count] = value;
                count += 1;
            }
            slot += 1;
        }

        ZobristKeys {
            pieces,
            side,
            material,
        }
    }

    /// Returns the key for a spin on a square; empty squares hash to zero.
    #[inline]
    pub const fn piece_key(&self, spin: Spin, square: Square) -> u64 {
        match spin.slot() {
            Some(slot) => self.pieces[slot][square.idx()],
            None => 0,
        }
    }

    /// Returns the key XORed in when `color` is to move.
    #[inline]
    pub const fn side_key(&self, color: Color) -> u64 {
        self.side[color.index()]
    }

    /// Returns the material key for `count` copies of the spin in `slot`.
    /// A count of zero contributes nothing.
    #[inline]
    pub const fn material_key(&self, slot: usize, count: u32) -> u64 {
        if count == 0 || count > 64 {
            0
        } else {
            self.material[slot][count as usize - 1]
        }
    }
}

impl Default for ZobristKeys {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zobrist_keys_are_nonzero() {
        let keys = ZobristKeys::new();
        assert_ne!(keys.side_key(Color::White), 0);
        assert_ne!(keys.side_key(Color::Black), 0);
        assert_ne!(keys.pieces[0][0], 0);
        assert_ne!(keys.material[11][63], 0);
    }

    #[test]
    fn zobrist_keys_are_unique() {
        let keys = ZobristKeys::new();
        let key1 = keys.piece_key(Spin::WHITE_PAWN, Square::A1);
        let key2 = keys.piece_key(Spin::WHITE_PAWN, Square::B1);
        let key3 = keys.piece_key(Spin::BLACK_PAWN, Square::A1);
        let key4 = keys.piece_key(Spin::WHITE_KNIGHT, Square::A1);

        assert_ne!(key1, key2);
        assert_ne!(key1, key3);
        assert_ne!(key1, key4);
        assert_ne!(keys.material_key(0, 1), keys.material_key(0, 2));
    }

    #[test]
    fn empty_contributes_nothing() {
        let keys = ZobristKeys::new();
        assert_eq!(keys.piece_key(Spin::EMPTY, Square::E1), 0);
        assert_eq!(keys.material_key(3, 0), 0);
    }
}
