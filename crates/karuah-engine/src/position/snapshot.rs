//! Flat snapshot arrays.
//!
//! A position crosses process or language boundaries as two flat arrays:
//! 366 `u64` words for the board (piece bitboards, hashes and the attack
//! cache) and 8 `i32` values for the game state. Loading is the exact
//! inverse of saving.
//!
//! Board words:
//!
//! | words      | content                                      |
//! |------------|----------------------------------------------|
//! | 0..=11     | piece bitboards in spin slot order           |
//! | 12, 13, 14 | position hash, pawn hash, material hash      |
//! | 15..=78    | attack path per square                       |
//! | 79         | 1 if the cache words are current             |
//! | 80..=143   | non-attacking pawn path per square           |
//! | 144..=207  | castle path per square                       |
//! | 208..=271  | potential pawn attack path per square        |
//! | 272..=293  | colour aggregates, White and Black alternate |
//! | 294..=299  | bishop, rook, queen x-ray: White then Black  |
//! | 300..=363  | x-ray path per square                        |
//! | 364, 365   | non-pawn material, White then Black          |
//!
//! State values: active colour (+1/-1), castling bits, en passant square
//! (-1 for none), halfmove clock, full-move count, game status, White and
//! Black clock offsets.

use karuah_core::{Color, Square};
use thiserror::Error;

use crate::castling::CastlingRights;
use crate::Bitboard;

use super::cache::{AttackCache, SideAttacks};
use super::{GameState, GameStatus, Position};

pub const BOARD_ARRAY_LEN: usize = 366;
pub const STATE_ARRAY_LEN: usize = 8;

const HASH: usize = 12;
const PAWN_HASH: usize = 13;
const MATERIAL_HASH: usize = 14;
const ATTACK_PATH: usize = 15;
const READY: usize = 79;
const NON_ATTACK_PAWN_PATH: usize = 80;
const CASTLE_PATH: usize = 144;
const POTENTIAL_PAWN_PATH: usize = 208;
const AGGREGATES: usize = 272;
const XRAY_AGGREGATES: usize = 294;
const XRAY_PATH: usize = 300;
const MATERIAL: usize = 364;

/// Errors raised when loading a snapshot.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SnapshotError {
    #[error("board array must hold {BOARD_ARRAY_LEN} words, got {0}")]
    BoardLength(usize),

    #[error("state array must hold {STATE_ARRAY_LEN} values, got {0}")]
    StateLength(usize),

    #[error("two piece bitboards claim the same square")]
    OverlappingPieces,

    #[error("invalid {field} value {value}")]
    InvalidField { field: &'static str, value: i64 },

    #[error("cannot parse state string: {0}")]
    Parse(String),
}

fn read_squares(words: &[u64], start: usize) -> [Bitboard; 64] {
    let mut out = [Bitboard::EMPTY; 64];
    for (i, bb) in out.iter_mut().enumerate() {
        *bb = Bitboard(words[start + i]);
    }
    out
}

fn write_squares(words: &mut [u64], start: usize, paths: &[Bitboard; 64]) {
    for (i, bb) in paths.iter().enumerate() {
        words[start + i] = bb.0;
    }
}

fn read_cache(words: &[u64]) -> Result<AttackCache, SnapshotError> {
    let mut cache = AttackCache::empty();
    cache.material_hash = words[MATERIAL_HASH];
    cache.attack_path = read_squares(words, ATTACK_PATH);
    cache.non_attack_pawn_path = read_squares(words, NON_ATTACK_PAWN_PATH);
    cache.castle_path = read_squares(words, CASTLE_PATH);
    cache.potential_pawn_path = read_squares(words, POTENTIAL_PAWN_PATH);
    cache.xray_path = read_squares(words, XRAY_PATH);

    for color in Color::ALL {
        let mut side_words = [0u64; SideAttacks::WORDS];
        for (k, word) in side_words.iter_mut().enumerate() {
            *word = words[AGGREGATES + 2 * k + color.index()];
        }
        let side = &mut cache.sides[color.index()];
        side.set_words(&side_words);
        let xray = XRAY_AGGREGATES + 3 * color.index();
        side.bishop_xray = Bitboard(words[xray]);
        side.rook_xray = Bitboard(words[xray + 1]);
        side.queen_xray = Bitboard(words[xray + 2]);
        let material = words[MATERIAL + color.index()];
        side.major_material = u32::try_from(material).map_err(|_| SnapshotError::InvalidField {
            field: "material",
            value: material as i64,
        })?;
    }

    Ok(cache)
}

impl Position {
    /// Saves the board, hashes and cache into the flat word layout.
    pub fn board_array(&self) -> [u64; BOARD_ARRAY_LEN] {
        let mut words = [0u64; BOARD_ARRAY_LEN];
        for (slot, bb) in self.pieces.iter().enumerate() {
            words[slot] = bb.0;
        }
        words[HASH] = self.hash;
        words[PAWN_HASH] = self.pawn_hash;

        let Some(cache) = self.cache.get() else {
            return words;
        };

        words[MATERIAL_HASH] = cache.material_hash;
        write_squares(&mut words, ATTACK_PATH, &cache.attack_path);
        words[READY] = 1;
        write_squares(&mut words, NON_ATTACK_PAWN_PATH, &cache.non_attack_pawn_path);
        write_squares(&mut words, CASTLE_PATH, &cache.castle_path);
        write_squares(&mut words, POTENTIAL_PAWN_PATH, &cache.potential_pawn_path);

        for color in Color::ALL {
            let side = cache.side(color);
            for (k, word) in side.words().iter().enumerate() {
                words[AGGREGATES + 2 * k + color.index()] = *word;
            }
            let xray = XRAY_AGGREGATES + 3 * color.index();
            words[xray] = side.bishop_xray.0;
            words[xray + 1] = side.rook_xray.0;
            words[xray + 2] = side.queen_xray.0;
            words[MATERIAL + color.index()] = u64::from(side.major_material);
        }

        write_squares(&mut words, XRAY_PATH, &cache.xray_path);
        words
    }

    /// Loads a board saved by [`Position::board_array`].
    ///
    /// Hashes are taken as stored. Cache words are used only when the ready
    /// flag is set; otherwise the cache is rebuilt on demand.
    pub fn set_board_array(&mut self, words: &[u64]) -> Result<(), SnapshotError> {
        if words.len() != BOARD_ARRAY_LEN {
            return Err(SnapshotError::BoardLength(words.len()));
        }

        let mut pieces = [Bitboard::EMPTY; 12];
        let mut seen = Bitboard::EMPTY;
        for (slot, bb) in pieces.iter_mut().enumerate() {
            *bb = Bitboard(words[slot]);
            if seen.intersects(*bb) {
                return Err(SnapshotError::OverlappingPieces);
            }
            seen |= *bb;
        }

        let cache = if words[READY] == 1 {
            Some(Box::new(read_cache(words)?))
        } else {
            None
        };

        self.pieces = pieces;
        self.hash = words[HASH];
        self.pawn_hash = words[PAWN_HASH];
        self.install_cache(cache);
        Ok(())
    }

    /// Saves the game state as eight integers.
    pub fn state_array(&self) -> [i32; STATE_ARRAY_LEN] {
        let s = &self.state;
        [
            s.active_color.sign(),
            i32::from(s.castling.raw()),
            s.en_passant.map_or(-1, |sq| i32::from(sq.index())),
            s.halfmove_clock as i32,
            s.fullmove_count as i32,
            s.status.code(),
            s.white_clock_offset,
            s.black_clock_offset,
        ]
    }

    /// Loads a state saved by [`Position::state_array`]. Nothing changes if
    /// any value is out of range.
    pub fn set_state_array(&mut self, values: &[i32]) -> Result<(), SnapshotError> {
        if values.len() != STATE_ARRAY_LEN {
            return Err(SnapshotError::StateLength(values.len()));
        }
        let invalid = |field: &'static str, value: i32| SnapshotError::InvalidField {
            field,
            value: i64::from(value),
        };

        let active_color =
            Color::from_sign(values[0]).ok_or_else(|| invalid("active colour", values[0]))?;
        if !(0..64).contains(&values[1]) {
            return Err(invalid("castling", values[1]));
        }
        let en_passant = match values[2] {
            -1 => None,
            raw => Some(Square::from_i32(raw).ok_or_else(|| invalid("en passant", raw))?),
        };
        let halfmove_clock =
            u32::try_from(values[3]).map_err(|_| invalid("halfmove clock", values[3]))?;
        let fullmove_count =
            u32::try_from(values[4]).map_err(|_| invalid("full-move count", values[4]))?;

        let state = GameState {
            active_color,
            castling: CastlingRights::from_i32(values[1]),
            en_passant,
            halfmove_clock,
            fullmove_count,
            status: GameStatus::from_code(values[5]),
            white_clock_offset: values[6],
            black_clock_offset: values[7],
        };

        let stale = state.castling != self.state.castling || state.en_passant != self.state.en_passant;
        self.state = state;
        if stale {
            self.invalidate();
        }
        Ok(())
    }

    /// The state as `|`-separated integers, e.g. `1|15|-1|0|0|0|0|0`.
    pub fn state_string(&self) -> String {
        self.state_array()
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join("|")
    }

    /// Loads a state written by [`Position::state_string`].
    pub fn set_state_string(&mut self, text: &str) -> Result<(), SnapshotError> {
        let values = text
            .split('|')
            .map(|part| {
                part.trim()
                    .parse::<i32>()
                    .map_err(|_| SnapshotError::Parse(text.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        self.set_state_array(&values)
    }
}
