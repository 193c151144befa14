//! Perft (performance test) for validating the move rules.
//!
//! Perft counts the leaf nodes of the legal move tree to a given depth.
//! Every pseudo-legal destination is played through the ordinary move
//! path and kept only if the mover's king is safe, so the counts check
//! the pattern generator, the cache and the rollback logic together.

use karuah_core::{Color, Piece, Promotion, Spin, Square};

use crate::position::Position;

use super::{execute, MoveMode};

const PROMOTIONS: [Promotion; 4] = [
    Promotion::Queen,
    Promotion::Rook,
    Promotion::Bishop,
    Promotion::Knight,
];

/// Candidate moves for the side to move, before the king-safety check.
fn candidates(position: &Position) -> Vec<(Square, Square, Option<Promotion>)> {
    let color = position.active_color();
    let mut moves = Vec::with_capacity(64);
    for from in position.occupied(color) {
        let pawn = position.spin(from).is(Piece::Pawn);
        for to in position.potential_move(from) {
            if pawn && to.row() == color.opposite().back_row() {
                moves.extend(PROMOTIONS.iter().map(|&p| (from, to, Some(p))));
            } else {
                moves.push((from, to, None));
            }
        }
    }
    moves
}

/// Plays one move, runs `f` on the result if it was legal, then restores.
fn descend<T>(
    position: &mut Position,
    (from, to, promotion): (Square, Square, Option<Promotion>),
    f: impl FnOnce(&mut Position) -> T,
) -> Option<T> {
    position.trial(|p| {
        let promotion = promotion.unwrap_or_default();
        execute(p, from, to, promotion, MoveMode::PLAY, false)
            .ok()
            .map(|_| f(p))
    })
}

/// Counts the leaf nodes at the given depth.
pub fn perft(position: &mut Position, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }

    let mut nodes = 0u64;
    for mv in candidates(position) {
        nodes += descend(position, mv, |p| perft(p, depth - 1)).unwrap_or(0);
    }
    nodes
}

/// Perft split by first move, sorted by coordinate notation (`e2e4`,
/// `e7e8q`).
pub fn perft_divide(position: &mut Position, depth: u32) -> Vec<(String, u64)> {
    let mut results = Vec::new();
    for mv in candidates(position) {
        let counted = descend(position, mv, |p| {
            if depth > 1 {
                perft(p, depth - 1)
            } else {
                1
            }
        });
        if let Some(nodes) = counted {
            results.push((coordinate(mv), nodes));
        }
    }

    results.sort_by(|a, b| a.0.cmp(&b.0));
    results
}

fn coordinate((from, to, promotion): (Square, Square, Option<Promotion>)) -> String {
    let mut text = format!("{from}{to}");
    if let Some(promotion) = promotion {
        if let Some(letter) = Spin::new(promotion.piece(), Color::Black).to_fen_char() {
            text.push(letter);
        }
    }
    text
}
