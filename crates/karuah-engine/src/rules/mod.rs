//! Move rules: validation, application and game-end detection.
//!
//! A move runs inside a position transaction. It is validated against the
//! cached pseudo-legal destinations, applied square by square through
//! [`Position::update`], checked for leaving the mover's king attacked, and
//! then either committed (state bookkeeping, game status, SAN) or rolled
//! back so the position is exactly as before.

mod arrange;
mod find;
mod mate;
mod perft;

use karuah_core::{Color, Piece, Promotion, Spin, Square};
use thiserror::Error;

use crate::pattern::king_home;
use crate::position::{GameStatus, MoveData, Position};
use crate::san;
use crate::tables::Tables;

pub use arrange::{arrange, arrange_update, ArrangeError};
pub use find::{find_from_index, FromSearch};
pub use mate::{has_legal_move, is_checkmate, is_stalemate};
pub use perft::{perft, perft_divide};

/// Errors for a rejected move. The text matches what front ends display.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MoveError {
    #[error("Wrong side attempted to move.")]
    WrongSide,

    #[error("Move from {from} to {to} is not valid")]
    Invalid { from: Square, to: Square },

    #[error("Cannot make this move. King would be in check.")]
    KingInCheck,
}

/// How a move is processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveMode {
    /// Check turn, destination and own-king safety.
    pub validate: bool,
    /// Keep the move. Without this the position is restored afterwards.
    pub commit: bool,
}

impl MoveMode {
    /// Validated and committed: a move played in a game.
    pub const PLAY: MoveMode = MoveMode {
        validate: true,
        commit: true,
    };

    /// Validated, then rolled back: a legality test.
    pub const TEST: MoveMode = MoveMode {
        validate: true,
        commit: false,
    };

    /// Applied without any checks.
    pub const FORCE: MoveMode = MoveMode {
        validate: false,
        commit: true,
    };
}

/// What a successful move did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveOutcome {
    pub from: Square,
    pub to: Square,
    pub moved: Spin,
    /// The piece removed from the board, including a pawn taken en passant.
    pub captured: Spin,
    pub promotion: Option<Promotion>,
    pub castle: bool,
    pub en_passant: bool,
    /// SAN with check or mate suffix; empty unless the move was validated
    /// and committed.
    pub san: String,
    /// Game status after the move.
    pub status: GameStatus,
}

/// Board changes made by one move, before any state bookkeeping.
struct Applied {
    promotion: Option<Promotion>,
    en_passant_capture: Option<(Square, Spin)>,
    castle: bool,
}

/// Moves the piece on `from` to `to`.
///
/// With validation the side to move must own `from` and `to` must be one
/// of its pseudo-legal destinations; a move leaving the mover's king in
/// check is rejected. On any failure, or when `mode.commit` is false, the
/// position is restored exactly. A committing move also stores the failure
/// text as the position's return message.
///
/// A committed, validated move also tests the opponent for checkmate and
/// stalemate and records the SAN.
pub fn make_move(
    position: &mut Position,
    from: Square,
    to: Square,
    promotion: Promotion,
    mode: MoveMode,
) -> Result<MoveOutcome, MoveError> {
    execute(position, from, to, promotion, mode, true)
}

/// True if moving the pawn on `from` to `to` promotes and is legal.
pub fn is_pawn_promotion(position: &mut Position, from: Square, to: Square) -> bool {
    promotes(position.spin(from), to)
        && make_move(position, from, to, Promotion::Queen, MoveMode::TEST).is_ok()
}

fn promotes(spin: Spin, to: Square) -> bool {
    match spin {
        Spin::WHITE_PAWN => to.row() == 0,
        Spin::BLACK_PAWN => to.row() == 7,
        _ => false,
    }
}

/// Shared move path. `annotate` turns on game-status detection, SAN and
/// the return message for validated commits; search-style callers switch
/// it off.
pub(crate) fn execute(
    position: &mut Position,
    from: Square,
    to: Square,
    promotion: Promotion,
    mode: MoveMode,
    annotate: bool,
) -> Result<MoveOutcome, MoveError> {
    let moved = position.spin(from);
    let target = position.spin(to);

    if mode.validate && mode.commit {
        position.set_return_message("");
    }

    let color = match validate(position, from, to, moved, mode.validate) {
        Ok(color) => color,
        Err(err) => return Err(reject(position, mode, err)),
    };

    let annotate = annotate && mode.validate && mode.commit;
    let disambiguation = if annotate {
        san::disambiguation(position, from, to, moved)
    } else {
        String::new()
    };

    let result = position.transaction(mode.commit, |p| {
        let applied = apply(p, from, to, moved, color, promotion);

        if mode.validate && p.is_king_check(color) {
            return Err(MoveError::KingInCheck);
        }

        if mode.commit {
            commit_state(p, from, to, moved, target, color, &applied);
        }
        Ok(applied)
    });

    let applied = match result {
        Ok(applied) => applied,
        Err(err) => return Err(reject(position, mode, err)),
    };

    let captured = match applied.en_passant_capture {
        Some((_, pawn)) => pawn,
        None => target,
    };

    let mut outcome = MoveOutcome {
        from,
        to,
        moved,
        captured,
        promotion: applied.promotion,
        castle: applied.castle,
        en_passant: applied.en_passant_capture.is_some(),
        san: String::new(),
        status: position.status(),
    };

    if annotate {
        finish(position, &mut outcome, &disambiguation);
    }

    Ok(outcome)
}

/// Turn and destination checks. Returns the mover's colour.
fn validate(
    position: &Position,
    from: Square,
    to: Square,
    moved: Spin,
    enabled: bool,
) -> Result<Color, MoveError> {
    let invalid = MoveError::Invalid { from, to };
    let Some(color) = moved.color() else {
        return Err(invalid);
    };
    if !enabled {
        return Ok(color);
    }

    let turn = position.active_color();
    if color != turn {
        return Err(MoveError::WrongSide);
    }
    if !position.potential_move(from).contains(to) {
        return Err(invalid);
    }
    Ok(color)
}

/// Only a committing move reports its failure through the return message.
fn reject(position: &mut Position, mode: MoveMode, err: MoveError) -> MoveError {
    tracing::debug!(error = %err, commit = mode.commit, "move rejected");
    if mode.commit {
        position.set_return_message(err.to_string());
    }
    err
}

/// Moves the pieces: the mover itself, a promotion, an en passant capture
/// and the castling rook.
fn apply(
    p: &mut Position,
    from: Square,
    to: Square,
    moved: Spin,
    color: Color,
    promotion: Promotion,
) -> Applied {
    let target = p.spin(to);
    p.update(from, Spin::EMPTY);
    p.update(to, moved);

    let mut applied = Applied {
        promotion: None,
        en_passant_capture: None,
        castle: false,
    };

    if promotes(moved, to) {
        p.update(to, Spin::new(promotion.piece(), color));
        applied.promotion = Some(promotion);
    }

    if moved.is(Piece::Pawn) && target.is_empty() {
        if let Some(ep) = p.en_passant() {
            let behind = match color {
                Color::White => to.offset(8),
                Color::Black => to.offset(-8),
            };
            let victim = p.spin(ep);
            if behind == Some(ep) && victim == Spin::new(Piece::Pawn, color.opposite()) {
                p.update(ep, Spin::EMPTY);
                applied.en_passant_capture = Some((ep, victim));
            }
        }
    }

    if moved.is(Piece::King) && from == king_home(color) {
        if let Some((rook_from, rook_to)) = Tables::castle_rook(to) {
            let rook = Spin::new(Piece::Rook, color);
            if p.spin(rook_from) == rook {
                p.update(rook_to, rook);
                p.update(rook_from, Spin::EMPTY);
                applied.castle = true;
            }
        }
    }

    applied
}

/// Bookkeeping after a kept move: en passant, counters, turn, castling.
fn commit_state(
    p: &mut Position,
    from: Square,
    to: Square,
    moved: Spin,
    target: Spin,
    color: Color,
    applied: &Applied,
) {
    let double_push = moved.is(Piece::Pawn) && from.index().abs_diff(to.index()) == 16;
    p.set_en_passant(double_push.then_some(to));

    let mut rights = p.castling();
    if moved.is(Piece::King) {
        rights.remove_color(color);
    } else if moved.is(Piece::Rook) {
        rights.clear_corner(from);
    }
    rights.clear_corner(to);
    if applied.castle {
        rights.mark_castled(color);
    }
    p.set_castling(rights);

    let state = p.state_mut();
    if color == Color::Black {
        state.fullmove_count += 1;
    }
    if !target.is_empty() || moved.is(Piece::Pawn) {
        state.halfmove_clock = 0;
    } else {
        state.halfmove_clock += 1;
    }
    state.active_color = color.opposite();

    p.set_move_data(MoveData {
        from: Some(from),
        to: Some(to),
        moved,
        captured: target,
    });
}

/// Status detection, message and SAN for a move played in a game.
fn finish(position: &mut Position, outcome: &mut MoveOutcome, disambiguation: &str) {
    if outcome.castle {
        position.set_return_message("Castle");
    } else if outcome.en_passant {
        position.set_return_message("En passant");
    }

    let previous = position.status();
    if is_checkmate(position) {
        position.set_status(GameStatus::Checkmate);
    } else if is_stalemate(position) {
        position.set_status(GameStatus::Stalemate);
    }
    let status = position.status();
    if status != previous {
        tracing::debug!(%status, "game status changed");
    }

    let check = position.is_king_check(position.active_color());
    let text = san::format_move(&san::SanMove {
        from: outcome.from,
        to: outcome.to,
        moved: outcome.moved,
        capture: !outcome.captured.is_empty(),
        promotion: outcome.promotion,
        castle: outcome.castle,
        disambiguation,
        mate: status == GameStatus::Checkmate,
        check,
    });
    position.set_move_san(text.clone());

    tracing::trace!(
        from = %outcome.from,
        to = %outcome.to,
        moved = %outcome.moved,
        captured = %outcome.captured,
        san = %text,
        "move committed"
    );

    outcome.san = text;
    outcome.status = status;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::castling::CastlingRights;

    fn sq(name: &str) -> Square {
        Square::from_algebraic(name).unwrap()
    }

    fn startpos() -> Position {
        Position::startpos(Tables::shared().unwrap())
    }

    fn position(fen: &str) -> Position {
        let mut pos = Position::new(Tables::shared().unwrap());
        pos.set_full_fen(fen).unwrap();
        pos
    }

    fn play(pos: &mut Position, from: &str, to: &str) -> Result<MoveOutcome, MoveError> {
        make_move(pos, sq(from), sq(to), Promotion::Queen, MoveMode::PLAY)
    }

    #[test]
    fn pawn_double_push() {
        let mut pos = startpos();
        let outcome = play(&mut pos, "e2", "e4").unwrap();
        assert_eq!(pos.spin(Square::from_index(52).unwrap()), Spin::EMPTY);
        assert_eq!(pos.spin(Square::from_index(36).unwrap()), Spin::WHITE_PAWN);
        assert_eq!(pos.en_passant(), Some(sq("e4")));
        assert_eq!(pos.active_color(), Color::Black);
        assert_eq!(outcome.san, "e4");
        assert_eq!(pos.move_san(), "e4");
        assert_eq!(pos.move_data().to_array(), [52, 36, 1, 0]);
        assert_eq!(pos.halfmove_clock(), 0);
        assert_eq!(pos.fullmove_count(), 0);

        play(&mut pos, "g8", "f6").unwrap();
        assert_eq!(pos.en_passant(), None);
        assert_eq!(pos.fullmove_count(), 1);
        assert_eq!(pos.halfmove_clock(), 1);
    }

    #[test]
    fn wrong_side_and_invalid_destination() {
        let mut pos = startpos();
        let before = pos.board();
        assert_eq!(play(&mut pos, "e7", "e5"), Err(MoveError::WrongSide));
        assert_eq!(pos.return_message(), "Wrong side attempted to move.");
        let err = play(&mut pos, "e2", "e5").unwrap_err();
        assert_eq!(pos.return_message(), "Move from e2 to e5 is not valid");
        assert_eq!(err, MoveError::Invalid { from: sq("e2"), to: sq("e5") });
        assert!(play(&mut pos, "e4", "e5").is_err());
        assert_eq!(pos.board(), before);
    }

    #[test]
    fn pinned_piece_cannot_move() {
        let mut pos = position("4r1k1/8/8/8/8/8/4N3/4K3 w - - 0 1");
        let before = pos.state_array();
        assert_eq!(play(&mut pos, "e2", "c3"), Err(MoveError::KingInCheck));
        assert_eq!(pos.return_message(), "Cannot make this move. King would be in check.");
        assert_eq!(pos.spin(sq("e2")), Spin::WHITE_KNIGHT);
        assert_eq!(pos.state_array(), before);
        assert_eq!(pos.computed_hashes(), (pos.hash(), pos.hash_pawn()));
    }

    #[test]
    fn test_mode_leaves_no_trace() {
        let mut pos = startpos();
        let before = pos.clone();
        let outcome = make_move(&mut pos, sq("g1"), sq("f3"), Promotion::Queen, MoveMode::TEST).unwrap();
        assert_eq!(outcome.moved, Spin::WHITE_KNIGHT);
        assert!(outcome.san.is_empty());
        assert_eq!(pos, before);
    }

    #[test]
    fn failed_trial_keeps_the_return_message() {
        let mut pos = position("4r1k1/8/8/8/8/8/4N3/4K3 w - - 0 1");
        play(&mut pos, "e2", "c3").unwrap_err();
        let message = pos.return_message().to_owned();

        let before = pos.clone();
        let err = make_move(&mut pos, sq("e2"), sq("d4"), Promotion::Queen, MoveMode::TEST).unwrap_err();
        assert_eq!(err, MoveError::KingInCheck);
        assert_eq!(
            make_move(&mut pos, sq("g8"), sq("g7"), Promotion::Queen, MoveMode::TEST),
            Err(MoveError::WrongSide)
        );
        assert!(!is_pawn_promotion(&mut pos, sq("e2"), sq("e1")));
        assert_eq!(pos.return_message(), message);
        assert_eq!(pos, before);
    }

    #[test]
    fn promotion_query_has_no_side_effects() {
        let mut pos = position("2r5/3P4/8/8/8/8/8/K6k w - - 0 1");
        play(&mut pos, "a1", "a3").unwrap_err();
        let before = pos.clone();
        assert!(is_pawn_promotion(&mut pos, sq("d7"), sq("d8")));
        assert!(is_pawn_promotion(&mut pos, sq("d7"), sq("c8")));
        assert!(!is_pawn_promotion(&mut pos, sq("d7"), sq("e8")));
        assert_eq!(pos.return_message(), "Move from a1 to a3 is not valid");
        assert_eq!(pos, before);
    }

    #[test]
    fn en_passant_removes_the_pushed_pawn() {
        let mut pos = position("4k3/3p4/8/4P3/8/8/8/4K3 b - - 0 1");
        play(&mut pos, "d7", "d5").unwrap();
        assert_eq!(pos.en_passant(), Some(sq("d5")));
        let outcome = play(&mut pos, "e5", "d6").unwrap();
        assert!(outcome.en_passant);
        assert_eq!(outcome.captured, Spin::BLACK_PAWN);
        assert_eq!(pos.spin(sq("d5")), Spin::EMPTY);
        assert_eq!(pos.spin(sq("d6")), Spin::WHITE_PAWN);
        assert_eq!(pos.return_message(), "En passant");
        assert_eq!(outcome.san, "exd6");
        assert_eq!(pos.move_data().captured, Spin::EMPTY);
        assert_eq!(pos.computed_hashes(), (pos.hash(), pos.hash_pawn()));
    }

    #[test]
    fn en_passant_expires() {
        let mut pos = position("4k3/3p4/8/4P3/8/8/8/4K3 b - - 0 1");
        play(&mut pos, "d7", "d5").unwrap();
        play(&mut pos, "e1", "e2").unwrap();
        play(&mut pos, "e8", "e7").unwrap();
        assert!(play(&mut pos, "e5", "d6").is_err());
    }

    #[test]
    fn kingside_castle_moves_both_pieces() {
        let mut pos = position("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
        let outcome = play(&mut pos, "e1", "g1").unwrap();
        assert!(outcome.castle);
        assert_eq!(outcome.san, "O-O");
        assert_eq!(pos.spin(Square::G1), Spin::WHITE_KING);
        assert_eq!(pos.spin(Square::F1), Spin::WHITE_ROOK);
        assert_eq!(pos.spin(Square::H1), Spin::EMPTY);
        assert_eq!(pos.return_message(), "Castle");
        let rights = pos.castling();
        assert!(!rights.can_castle_kingside(Color::White));
        assert!(!rights.can_castle_queenside(Color::White));
        assert!(rights.has_castled(Color::White));
        assert!(!rights.has_castled(Color::Black));
        assert_eq!(rights.raw(), CastlingRights::WHITE_CASTLED | 0b1100);

        let outcome = play(&mut pos, "e8", "c8").unwrap();
        assert_eq!(outcome.san, "O-O-O");
        assert_eq!(pos.spin(Square::D8), Spin::BLACK_ROOK);
        assert!(pos.castling().has_castled(Color::Black));
    }

    #[test]
    fn rook_moves_and_captures_drop_rights() {
        let mut pos = position("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
        play(&mut pos, "a1", "a8").unwrap();
        let rights = pos.castling();
        assert!(!rights.can_castle_queenside(Color::White));
        assert!(!rights.can_castle_queenside(Color::Black));
        assert!(rights.can_castle_kingside(Color::White));
        assert!(rights.can_castle_kingside(Color::Black));
    }

    #[test]
    fn promotion_choices() {
        let mut pos = position("8/4P3/8/8/8/8/k7/4K3 w - - 0 1");
        assert!(is_pawn_promotion(&mut pos, sq("e7"), sq("e8")));
        assert!(!is_pawn_promotion(&mut pos, Square::E1, sq("e2")));
        let outcome = make_move(&mut pos, sq("e7"), sq("e8"), Promotion::Knight, MoveMode::PLAY).unwrap();
        assert_eq!(outcome.promotion, Some(Promotion::Knight));
        assert_eq!(pos.spin(sq("e8")), Spin::WHITE_KNIGHT);
        assert_eq!(outcome.san, "e8=N");
    }

    #[test]
    fn mate_is_detected_and_annotated() {
        let mut pos = position("6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1");
        let outcome = play(&mut pos, "a1", "a8").unwrap();
        assert_eq!(outcome.status, GameStatus::Checkmate);
        assert_eq!(pos.status(), GameStatus::Checkmate);
        assert_eq!(outcome.san, "Ra8#");
    }

    #[test]
    fn check_suffix() {
        let mut pos = position("4k3/8/8/8/8/8/8/R3K3 w - - 0 1");
        let outcome = play(&mut pos, "a1", "a8").unwrap();
        assert_eq!(outcome.san, "Ra8+");
        assert_eq!(outcome.status, GameStatus::Ready);
    }

    #[test]
    fn stalemate_is_detected() {
        let mut pos = position("7k/8/8/8/8/8/8/5QK1 w - - 0 1");
        let outcome = play(&mut pos, "f1", "f7").unwrap();
        assert_eq!(outcome.status, GameStatus::Stalemate);
    }

    #[test]
    fn forced_move_skips_checks() {
        let mut pos = startpos();
        let outcome = make_move(&mut pos, sq("e7"), sq("e5"), Promotion::Queen, MoveMode::FORCE).unwrap();
        assert_eq!(outcome.moved, Spin::BLACK_PAWN);
        assert_eq!(pos.spin(sq("e5")), Spin::BLACK_PAWN);
        assert_eq!(pos.active_color(), Color::White);
        // There is still nothing to move on an empty square.
        assert!(make_move(&mut pos, sq("e4"), sq("e5"), Promotion::Queen, MoveMode::FORCE).is_err());
    }
}
