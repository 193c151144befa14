//! Free board editing outside normal play.
//!
//! No turn or check rules apply here, but both kings must stay on the
//! board and castling rights never outlive the pieces they depend on.

use karuah_core::{Color, Piece, Spin, Square};
use thiserror::Error;

use crate::pattern::king_home;
use crate::position::Position;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ArrangeError {
    #[error("{0} does not contain a piece to move")]
    EmptySquare(Square),

    #[error("Invalid as King must remain on the board")]
    KingRemoved,
}

/// Moves whatever stands on `from` to `to`, replacing anything there.
pub fn arrange(position: &mut Position, from: Square, to: Square) -> Result<(), ArrangeError> {
    if from == to {
        return Ok(());
    }
    let spin = position.spin(from);
    let Some(color) = spin.color() else {
        return Err(fail(position, ArrangeError::EmptySquare(from)));
    };

    let result = position.transaction(true, |p| {
        p.update(from, Spin::EMPTY);
        p.update(to, spin);
        both_kings_present(p)?;

        let mut rights = p.castling();
        if spin.is(Piece::King) && from == king_home(color) {
            rights.remove_color(color);
        }
        rights.clear_corner(from);
        rights.clear_corner(to);
        p.set_castling(rights);
        Ok(())
    });

    finish(position, result)
}

/// Puts `spin` on `to`; [`Spin::EMPTY`] clears the square.
pub fn arrange_update(position: &mut Position, spin: Spin, to: Square) -> Result<(), ArrangeError> {
    if position.spin(to) == spin {
        return Ok(());
    }

    let result = position.transaction(true, |p| {
        p.update(to, spin);
        both_kings_present(p)?;

        let mut rights = p.castling();
        rights.clear_corner(to);
        for color in Color::ALL {
            if to == king_home(color) {
                rights.remove_color(color);
            }
        }
        p.set_castling(rights);
        Ok(())
    });

    finish(position, result)
}

fn both_kings_present(position: &Position) -> Result<(), ArrangeError> {
    let missing = Color::ALL
        .iter()
        .any(|&color| position.king_index(color).is_none());
    if missing {
        Err(ArrangeError::KingRemoved)
    } else {
        Ok(())
    }
}

fn finish(position: &mut Position, result: Result<(), ArrangeError>) -> Result<(), ArrangeError> {
    match result {
        Ok(()) => {
            position.set_en_passant(None);
            position.set_move_san("");
            position.set_return_message("");
            Ok(())
        }
        Err(err) => Err(fail(position, err)),
    }
}

fn fail(position: &mut Position, err: ArrangeError) -> ArrangeError {
    tracing::debug!(error = %err, "arrangement rejected");
    position.set_return_message(err.to_string());
    err
}
