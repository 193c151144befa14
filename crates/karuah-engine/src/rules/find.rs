//! Locating the origin of a move from its destination.

use karuah_core::{Promotion, Spin, Square};

use crate::position::Position;

use super::{execute, MoveMode};

/// Result of [`find_from_index`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FromSearch {
    Found(Square),
    NotFound,
    /// More than one piece fits; the caller needs more disambiguation.
    Ambiguous,
}

impl FromSearch {
    /// Square index, -1 for none or -2 for ambiguous.
    pub const fn code(self) -> i32 {
        match self {
            FromSearch::Found(sq) => sq.index() as i32,
            FromSearch::NotFound => -1,
            FromSearch::Ambiguous => -2,
        }
    }

    pub const fn square(self) -> Option<Square> {
        match self {
            FromSearch::Found(sq) => Some(sq),
            _ => None,
        }
    }
}

/// Finds the square a `spin` piece could move to `to` from.
///
/// Every square holding `spin` whose potential moves include `to` is a
/// match. With `test_move`, a match must also be a legal move for the side
/// to move. A non-empty `candidates` list narrows the matches to those
/// squares.
pub fn find_from_index(
    position: &mut Position,
    to: Square,
    spin: Spin,
    candidates: &[Square],
    test_move: bool,
) -> FromSearch {
    if spin.is_empty() {
        return FromSearch::NotFound;
    }

    let origins = position.occupied_by_spin(spin);
    let mut matches = Vec::new();
    for from in origins {
        if !position.potential_move(from).contains(to) {
            continue;
        }
        if test_move && !is_legal(position, from, to) {
            continue;
        }
        matches.push(from);
    }

    if !candidates.is_empty() {
        matches.retain(|sq| candidates.contains(sq));
    }

    match matches.as_slice() {
        [] => FromSearch::NotFound,
        [only] => FromSearch::Found(*only),
        _ => FromSearch::Ambiguous,
    }
}

fn is_legal(position: &mut Position, from: Square, to: Square) -> bool {
    execute(position, from, to, Promotion::Queen, MoveMode::TEST, false).is_ok()
}
