//! Signed piece codes.
//!
//! A spin packs a piece and its colour into one small integer: the
//! magnitude is the [`Piece`] value (1-6) and the sign is the colour
//! (positive White, negative Black). Zero is an empty square.

use std::fmt;

use crate::{Color, Piece};

/// A signed piece code, or [`Spin::EMPTY`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct Spin(i8);

impl Spin {
    pub const EMPTY: Spin = Spin(0);

    pub const WHITE_PAWN: Spin = Spin(1);
    pub const WHITE_KNIGHT: Spin = Spin(2);
    pub const WHITE_BISHOP: Spin = Spin(3);
    pub const WHITE_ROOK: Spin = Spin(4);
    pub const WHITE_QUEEN: Spin = Spin(5);
    pub const WHITE_KING: Spin = Spin(6);
    pub const BLACK_PAWN: Spin = Spin(-1);
    pub const BLACK_KNIGHT: Spin = Spin(-2);
    pub const BLACK_BISHOP: Spin = Spin(-3);
    pub const BLACK_ROOK: Spin = Spin(-4);
    pub const BLACK_QUEEN: Spin = Spin(-5);
    pub const BLACK_KING: Spin = Spin(-6);

    /// All twelve non-empty spins in slot order (black king first).
    pub const ALL: [Spin; 12] = [
        Spin(-6),
        Spin(-5),
        Spin(-4),
        Spin(-3),
        Spin(-2),
        Spin(-1),
        Spin(1),
        Spin(2),
        Spin(3),
        Spin(4),
        Spin(5),
        Spin(6),
    ];

    /// Builds the spin for a piece of the given colour.
    #[inline]
    pub const fn new(piece: Piece, color: Color) -> Self {
        match color {
            Color::White => Spin(piece.value() as i8),
            Color::Black => Spin(-(piece.value() as i8)),
        }
    }

    /// Validates a raw code in `-6..=6`.
    #[inline]
    pub const fn from_raw(raw: i32) -> Option<Self> {
        if raw >= -6 && raw <= 6 {
            Some(Spin(raw as i8))
        } else {
            None
        }
    }

    /// The raw signed code.
    #[inline]
    pub const fn raw(self) -> i8 {
        self.0
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// The piece type, or `None` for an empty square.
    #[inline]
    pub const fn piece(self) -> Option<Piece> {
        Piece::from_value(self.0.unsigned_abs())
    }

    /// The colour, or `None` for an empty square.
    #[inline]
    pub const fn color(self) -> Option<Color> {
        if self.0 > 0 {
            Some(Color::White)
        } else if self.0 < 0 {
            Some(Color::Black)
        } else {
            None
        }
    }

    /// True if this is a piece of the given type (either colour).
    #[inline]
    pub const fn is(self, piece: Piece) -> bool {
        self.0.unsigned_abs() == piece.value()
    }

    /// True if this spin belongs to `color`.
    #[inline]
    pub const fn is_color(self, color: Color) -> bool {
        match color {
            Color::White => self.0 > 0,
            Color::Black => self.0 < 0,
        }
    }

    /// Position of this spin in a 12-entry per-piece array: black king
    /// through black pawn are 0-5, white pawn through white king are 6-11.
    /// Empty squares have no slot.
    #[inline]
    pub const fn slot(self) -> Option<usize> {
        if self.0 == 0 {
            None
        } else if self.0 < 0 {
            Some((self.0 + 6) as usize)
        } else {
            Some((self.0 + 5) as usize)
        }
    }

    /// Inverse of [`Spin::slot`].
    #[inline]
    pub const fn from_slot(slot: usize) -> Option<Self> {
        if slot < 12 {
            Some(Spin::ALL[slot])
        } else {
            None
        }
    }

    /// FEN character, or `None` for an empty square.
    pub const fn to_fen_char(self) -> Option<char> {
        match (self.piece(), self.color()) {
            (Some(piece), Some(color)) => Some(piece.to_fen_char(color)),
            _ => None,
        }
    }

    /// Parses a FEN piece character.
    pub const fn from_fen_char(c: char) -> Option<Self> {
        match Piece::from_fen_char(c) {
            Some((piece, color)) => Some(Spin::new(piece, color)),
            None => None,
        }
    }

    /// Display name such as `"White Pawn"`; empty for an empty square.
    pub const fn name(self) -> &'static str {
        match self.0 {
            1 => "White Pawn",
            2 => "White Knight",
            3 => "White Bishop",
            4 => "White Rook",
            5 => "White Queen",
            6 => "White King",
            -1 => "Black Pawn",
            -2 => "Black Knight",
            -3 => "Black Bishop",
            -4 => "Black Rook",
            -5 => "Black Queen",
            -6 => "Black King",
            _ => "",
        }
    }

    /// Inverse of [`Spin::name`]. Unknown names map to `None`.
    pub fn from_name(name: &str) -> Option<Self> {
        Spin::ALL.into_iter().find(|spin| spin.name() == name)
    }
}

impl From<Spin> for i32 {
    fn from(spin: Spin) -> i32 {
        spin.0 as i32
    }
}

impl fmt::Debug for Spin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            write!(f, "Spin(empty)")
        } else {
            write!(f, "Spin({})", self.name())
        }
    }
}

impl fmt::Display for Spin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_fen_char() {
            Some(c) => write!(f, "{}", c),
            None => write!(f, "."),
        }
    }
}
