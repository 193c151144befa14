//! Checkmate and stalemate detection by trial moves.

use karuah_core::{Color, Promotion, Square};

use crate::position::Position;

use super::{execute, MoveMode};

/// True if `color` has at least one move that leaves its king safe.
///
/// Every pseudo-legal destination of every piece is tried on the board and
/// rolled back straight away.
pub fn has_legal_move(position: &mut Position, color: Color) -> bool {
    let pieces = position.occupied(color);
    for from in pieces {
        let targets = position.potential_move(from);
        for to in targets {
            if escapes(position, color, from, to) {
                return true;
            }
        }
    }
    false
}

fn escapes(position: &mut Position, color: Color, from: Square, to: Square) -> bool {
    position.trial(|p| {
        execute(p, from, to, Promotion::Queen, MoveMode::FORCE, false).is_ok()
            && !p.is_king_check(color)
    })
}

/// True if the side to move is in check and cannot get out of it.
pub fn is_checkmate(position: &mut Position) -> bool {
    let color = position.active_color();
    if !position.is_king_check(color) {
        return false;
    }
    !has_legal_move(position, color)
}

/// True if only the two kings are left, or the side to move is not in
/// check and has no legal move.
pub fn is_stalemate(position: &mut Position) -> bool {
    if position.only_kings_remain() {
        return true;
    }
    let color = position.active_color();
    if position.is_king_check(color) {
        return false;
    }
    !has_legal_move(position, color)
}
