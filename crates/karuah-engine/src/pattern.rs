//! Piece pattern generation.
//!
//! Stateless functions returning the raw move or attack bitboard for one
//! piece on one square. Sliding patterns go through the magic tables; the
//! rest is table lookups or shifts. None of these know whose squares are
//! whose: slider and jump patterns include squares held by either side and
//! the caller removes its own pieces.

use karuah_core::{Color, Square};

use crate::castling::CastlingRights;
use crate::tables::Tables;
use crate::Bitboard;

/// Rows a pawn may double-push from.
const WHITE_PAWN_HOME: Bitboard = Bitboard::RANK_2;
const BLACK_PAWN_HOME: Bitboard = Bitboard::RANK_7;

/// Home squares of the kings.
pub const fn king_home(color: Color) -> Square {
    match color {
        Color::White => Square::E1,
        Color::Black => Square::E8,
    }
}

#[inline]
fn forward(color: Color, bb: Bitboard) -> Bitboard {
    match color {
        Color::White => bb.north(),
        Color::Black => bb.south(),
    }
}

/// Forward pushes: one square if empty, two from the home row if both
/// squares are empty.
pub fn pawn_move(sq: Square, color: Color, occupied: Bitboard) -> Bitboard {
    let from = Bitboard::from_square(sq);
    let single = forward(color, from) & !occupied;
    let home = match color {
        Color::White => WHITE_PAWN_HOME,
        Color::Black => BLACK_PAWN_HOME,
    };
    let double = if (from & home).is_not_empty() {
        forward(color, single) & !occupied
    } else {
        Bitboard::EMPTY
    };
    single | double
}

/// Diagonal-forward squares regardless of what stands on them.
pub fn pawn_potential_attack(sq: Square, color: Color) -> Bitboard {
    pawn_potential_attack_bb(Bitboard::from_square(sq), color)
}

/// Union of the diagonal-forward squares of every pawn in `pawns`.
pub fn pawn_potential_attack_bb(pawns: Bitboard, color: Color) -> Bitboard {
    match color {
        Color::White => pawns.north_east() | pawns.north_west(),
        Color::Black => pawns.south_east() | pawns.south_west(),
    }
}

/// Diagonal-forward squares that hold a piece of either colour.
pub fn pawn_attack(sq: Square, color: Color, occupied: Bitboard) -> Bitboard {
    pawn_potential_attack(sq, color) & occupied
}

/// En passant capture square for a pawn on `sq`.
///
/// `ep` is the square of the enemy pawn that has just made a double push.
/// If that pawn stands directly beside `sq` the capture square behind it is
/// returned.
pub fn pawn_en_passant(
    sq: Square,
    color: Color,
    ep: Option<Square>,
    enemy_pawns: Bitboard,
) -> Bitboard {
    let Some(ep) = ep else {
        return Bitboard::EMPTY;
    };
    let target = Bitboard::from_square(ep) & enemy_pawns;
    let from = Bitboard::from_square(sq);
    let beside = (from.east() | from.west()) & target;
    forward(color, beside)
}

#[inline]
pub fn knight(tables: &Tables, sq: Square) -> Bitboard {
    tables.knight_jumps(sq)
}

#[inline]
pub fn king(tables: &Tables, sq: Square) -> Bitboard {
    tables.king_jumps(sq)
}

#[inline]
pub fn bishop(tables: &Tables, sq: Square, occupied: Bitboard) -> Bitboard {
    tables.bishop_attacks(sq, occupied)
}

#[inline]
pub fn rook(tables: &Tables, sq: Square, occupied: Bitboard) -> Bitboard {
    tables.rook_attacks(sq, occupied)
}

/// Queen = bishop pattern XOR rook pattern; the two never overlap.
#[inline]
pub fn queen(tables: &Tables, sq: Square, occupied: Bitboard) -> Bitboard {
    tables.queen_attacks(sq, occupied)
}

/// Everything the king side needs to decide on castling.
#[derive(Debug, Clone, Copy)]
pub struct CastleContext {
    pub rights: CastlingRights,
    pub occupied: Bitboard,
    /// Rooks of the castling side.
    pub own_rooks: Bitboard,
    /// Squares attacked by the other side, including the squares its pawns
    /// would cover if something stood there.
    pub danger: Bitboard,
}

/// Castling destinations for a king of `color` on `sq`.
///
/// The king must be on its home square with the matching right, the squares
/// between king and rook must be empty, the rook must be on its corner, and
/// neither the king's square nor the two squares toward the destination may
/// be in `danger`.
pub fn king_castle(sq: Square, color: Color, ctx: &CastleContext) -> Bitboard {
    if sq != king_home(color) {
        return Bitboard::EMPTY;
    }
    let king = Bitboard::from_square(sq);
    if king.intersects(ctx.danger) {
        return Bitboard::EMPTY;
    }

    let mut path = Bitboard::EMPTY;

    if ctx.rights.can_castle_kingside(color) {
        let f = king.east();
        let g = f.east();
        let corner = g.east();
        if !(f | g).intersects(ctx.occupied)
            && corner.intersects(ctx.own_rooks)
            && !(f | g).intersects(ctx.danger)
        {
            path |= g;
        }
    }

    if ctx.rights.can_castle_queenside(color) {
        let d = king.west();
        let c = d.west();
        let b = c.west();
        let corner = b.west();
        if !(d | c | b).intersects(ctx.occupied)
            && corner.intersects(ctx.own_rooks)
            && !(d | c).intersects(ctx.danger)
        {
            path |= c;
        }
    }

    path
}
