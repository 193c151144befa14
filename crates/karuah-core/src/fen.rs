//! FEN text: the piece-placement field on its own and the full six-field
//! record.

use thiserror::Error;

use crate::{Color, Spin, Square};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FenError {
    #[error("FEN needs 4 or 6 fields, found {0}")]
    FieldCount(usize),

    #[error("bad piece placement: {0}")]
    Placement(String),

    #[error("active colour must be 'w' or 'b', found '{0}'")]
    ActiveColor(String),

    #[error("bad castling field '{0}'")]
    Castling(String),

    #[error("bad en passant target '{0}'")]
    EnPassant(String),

    #[error("bad halfmove clock '{0}'")]
    HalfmoveClock(String),

    #[error("bad fullmove number '{0}'")]
    FullmoveNumber(String),
}

/// Placement field of the standard starting position.
pub const START_PLACEMENT: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR";

/// Reads a placement field into one spin per square, a8 first.
pub fn parse_placement(placement: &str) -> Result<[Spin; 64], FenError> {
    let bad = |why: String| FenError::Placement(why);

    let rows: Vec<&str> = placement.split('/').collect();
    if rows.len() != 8 {
        return Err(bad(format!("{} rows instead of 8", rows.len())));
    }

    let mut board = [Spin::EMPTY; 64];
    for (row, text) in rows.into_iter().enumerate() {
        let rank = 8 - row;
        let mut col = 0;
        for c in text.chars() {
            let width = match c {
                '1'..='8' => c as usize - '0' as usize,
                _ => {
                    let spin = Spin::from_fen_char(c)
                        .ok_or_else(|| bad(format!("'{c}' on rank {rank}")))?;
                    if col < 8 {
                        board[row * 8 + col] = spin;
                    }
                    1
                }
            };
            col += width;
            if col > 8 {
                return Err(bad(format!("rank {rank} runs past the h-file")));
            }
        }
        if col < 8 {
            return Err(bad(format!("rank {rank} covers only {col} squares")));
        }
    }
    Ok(board)
}

/// Writes a placement field from one spin per square, a8 first.
pub fn placement_string(board: &[Spin; 64]) -> String {
    let rows: Vec<String> = board
        .chunks(8)
        .map(|row| {
            let mut text = String::new();
            let mut gap = 0u8;
            for spin in row {
                match spin.to_fen_char() {
                    None => gap += 1,
                    Some(c) => {
                        if gap > 0 {
                            text.push(char::from(b'0' + gap));
                            gap = 0;
                        }
                        text.push(c);
                    }
                }
            }
            if gap > 0 {
                text.push(char::from(b'0' + gap));
            }
            text
        })
        .collect();
    rows.join("/")
}

/// The fields of a full FEN string.
///
/// The en passant target is kept as written (the square behind the pushed
/// pawn). Loading the record into a position is the engine's job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FenParser {
    /// One spin per square, a8 first.
    pub placement: [Spin; 64],
    pub active_color: Color,
    /// Castling letters granted, in `KQkq` order.
    pub castling: [bool; 4],
    pub en_passant: Option<Square>,
    pub halfmove_clock: u32,
    pub fullmove_number: u32,
}

const CASTLING_LETTERS: [char; 4] = ['K', 'Q', 'k', 'q'];

impl FenParser {
    pub const STARTPOS: &'static str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    /// Parses a FEN string. Without the two counters the clock reads 0 and
    /// the move number 1.
    pub fn parse(fen: &str) -> Result<Self, FenError> {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        let (placement, color, castling, ep, counters) = match fields.as_slice() {
            [p, c, k, e] => (*p, *c, *k, *e, None),
            [p, c, k, e, h, f] => (*p, *c, *k, *e, Some((*h, *f))),
            other => return Err(FenError::FieldCount(other.len())),
        };

        let active_color = match color {
            "w" => Color::White,
            "b" => Color::Black,
            _ => return Err(FenError::ActiveColor(color.to_string())),
        };

        let (halfmove_clock, fullmove_number) = match counters {
            None => (0, 1),
            Some((half, full)) => (
                half.parse()
                    .map_err(|_| FenError::HalfmoveClock(half.to_string()))?,
                full.parse()
                    .map_err(|_| FenError::FullmoveNumber(full.to_string()))?,
            ),
        };

        Ok(FenParser {
            placement: parse_placement(placement)?,
            active_color,
            castling: parse_castling(castling)?,
            en_passant: parse_target(ep)?,
            halfmove_clock,
            fullmove_number,
        })
    }

    /// True if the castling field grants `letter` (one of `KQkq`).
    pub fn has_castling(&self, letter: char) -> bool {
        CASTLING_LETTERS
            .iter()
            .position(|&c| c == letter)
            .is_some_and(|i| self.castling[i])
    }

    /// Writes the record back out as a FEN string.
    pub fn to_fen(&self) -> String {
        let castling: String = CASTLING_LETTERS
            .iter()
            .zip(self.castling)
            .filter_map(|(&c, granted)| granted.then_some(c))
            .collect();
        format!(
            "{} {} {} {} {} {}",
            placement_string(&self.placement),
            self.active_color.fen_char(),
            if castling.is_empty() { "-" } else { castling.as_str() },
            self.en_passant.map_or("-", Square::name),
            self.halfmove_clock,
            self.fullmove_number
        )
    }
}

fn parse_castling(field: &str) -> Result<[bool; 4], FenError> {
    let mut granted = [false; 4];
    if field == "-" {
        return Ok(granted);
    }
    for c in field.chars() {
        match CASTLING_LETTERS.iter().position(|&l| l == c) {
            Some(i) if !granted[i] => granted[i] = true,
            _ => return Err(FenError::Castling(field.to_string())),
        }
    }
    Ok(granted)
}

/// The target square is only ever on the third or sixth rank.
fn parse_target(field: &str) -> Result<Option<Square>, FenError> {
    if field == "-" {
        return Ok(None);
    }
    match Square::from_algebraic(field) {
        Some(sq) if matches!(sq.row(), 2 | 5) => Ok(Some(sq)),
        _ => Err(FenError::EnPassant(field.to_string())),
    }
}
