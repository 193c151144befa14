//! Castling availability as stored in the state array.

use karuah_core::{Color, Square};

/// Six flag bits: the four castling rights, then who has castled.
///
/// Bit `2 * colour + side` is a right, with White = 0, Black = 1 and
/// queenside = 0, kingside = 1. Bit 4 marks Black as castled, bit 5 White.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CastlingRights(u8);

impl CastlingRights {
    pub const NONE: CastlingRights = CastlingRights(0);
    pub const ALL: CastlingRights = CastlingRights(0b1111);

    pub const WHITE_QUEENSIDE: u8 = Self::right(Color::White, false);
    pub const WHITE_KINGSIDE: u8 = Self::right(Color::White, true);
    pub const BLACK_QUEENSIDE: u8 = Self::right(Color::Black, false);
    pub const BLACK_KINGSIDE: u8 = Self::right(Color::Black, true);
    pub const BLACK_CASTLED: u8 = Self::castled(Color::Black);
    pub const WHITE_CASTLED: u8 = Self::castled(Color::White);

    const MASK: u8 = 0b11_1111;

    const fn right(color: Color, kingside: bool) -> u8 {
        1 << (color.index() as u8 * 2 + kingside as u8)
    }

    const fn castled(color: Color) -> u8 {
        0b10_0000 >> color.index()
    }

    /// Bits above 5 are dropped.
    #[inline]
    pub const fn new(flags: u8) -> Self {
        CastlingRights(flags & Self::MASK)
    }

    #[inline]
    pub const fn from_i32(flags: i32) -> Self {
        CastlingRights((flags & Self::MASK as i32) as u8)
    }

    #[inline]
    pub const fn raw(self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn can_castle_kingside(self, color: Color) -> bool {
        self.0 & Self::right(color, true) != 0
    }

    #[inline]
    pub const fn can_castle_queenside(self, color: Color) -> bool {
        self.0 & Self::right(color, false) != 0
    }

    #[inline]
    pub const fn has_castled(self, color: Color) -> bool {
        self.0 & Self::castled(color) != 0
    }

    /// Drops both rights of `color`; the castled marker stays.
    #[inline]
    pub fn remove_color(&mut self, color: Color) {
        self.0 &= !(Self::right(color, true) | Self::right(color, false));
    }

    #[inline]
    pub fn remove_kingside(&mut self, color: Color) {
        self.0 &= !Self::right(color, true);
    }

    #[inline]
    pub fn remove_queenside(&mut self, color: Color) {
        self.0 &= !Self::right(color, false);
    }

    /// Replaces the two rights of `color`.
    pub fn set_color(&mut self, color: Color, kingside: bool, queenside: bool) {
        self.remove_color(color);
        if kingside {
            self.0 |= Self::right(color, true);
        }
        if queenside {
            self.0 |= Self::right(color, false);
        }
    }

    /// Drops the right tied to the rook on a corner square. Other squares
    /// are ignored.
    pub fn clear_corner(&mut self, sq: Square) {
        let (color, kingside) = match sq {
            Square::A1 => (Color::White, false),
            Square::H1 => (Color::White, true),
            Square::A8 => (Color::Black, false),
            Square::H8 => (Color::Black, true),
            _ => return,
        };
        self.0 &= !Self::right(color, kingside);
    }

    #[inline]
    pub fn mark_castled(&mut self, color: Color) {
        self.0 |= Self::castled(color);
    }
}
