//! Property tests for positions reached by random play and random edits.

use karuah_core::{Promotion, Spin, Square};
use karuah_engine::rules::{make_move, MoveMode};
use karuah_engine::{Position, Tables};
use proptest::prelude::*;

/// Legal moves for the side to move, found by testing every pseudo-legal
/// destination.
fn legal_moves(pos: &mut Position) -> Vec<(Square, Square)> {
    let color = pos.active_color();
    let mut moves = Vec::new();
    for from in pos.occupied(color) {
        for to in pos.potential_move(from) {
            if make_move(pos, from, to, Promotion::Queen, MoveMode::TEST).is_ok() {
                moves.push((from, to));
            }
        }
    }
    moves
}

/// Plays up to `choices.len()` moves from the start, each picked by index.
fn random_game(choices: &[u16]) -> Position {
    let mut pos = Position::startpos(Tables::shared().unwrap());
    for &choice in choices {
        let moves = legal_moves(&mut pos);
        if moves.is_empty() || pos.status().is_over() {
            break;
        }
        let (from, to) = moves[usize::from(choice) % moves.len()];
        if make_move(&mut pos, from, to, Promotion::Queen, MoveMode::PLAY).is_err() {
            break;
        }
    }
    pos
}

fn any_spin() -> impl Strategy<Value = Spin> {
    (-6i32..=6).prop_map(|raw| Spin::from_raw(raw).unwrap_or(Spin::EMPTY))
}

fn any_square() -> impl Strategy<Value = Square> {
    (0u8..64).prop_map(|i| Square::from_index(i).unwrap_or(Square::A8))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn updates_keep_occupancy_and_hashes(edits in prop::collection::vec((any_square(), any_spin()), 0..40)) {
        let mut pos = Position::startpos(Tables::shared().unwrap());
        for (square, spin) in edits {
            pos.update(square, spin);
            prop_assert!(pos.occupancy_is_consistent());
            prop_assert_eq!(pos.spin(square), spin);
        }
        prop_assert_eq!(pos.computed_hashes(), (pos.hash(), pos.hash_pawn()));
    }

    #[test]
    fn played_games_keep_hashes(choices in prop::collection::vec(any::<u16>(), 0..16)) {
        let pos = random_game(&choices);
        prop_assert!(pos.occupancy_is_consistent());
        prop_assert_eq!(pos.computed_hashes(), (pos.hash(), pos.hash_pawn()));
    }

    #[test]
    fn test_moves_change_nothing(choices in prop::collection::vec(any::<u16>(), 0..12)) {
        let mut pos = random_game(&choices);
        let moves = legal_moves(&mut pos);
        let before = pos.clone();
        for (from, to) in moves {
            make_move(&mut pos, from, to, Promotion::Queen, MoveMode::TEST).unwrap();
            prop_assert_eq!(&pos, &before);
        }
    }

    #[test]
    fn snapshot_undoes_a_played_move(choices in prop::collection::vec(any::<u16>(), 0..12), pick in any::<u16>()) {
        let mut pos = random_game(&choices);
        let moves = legal_moves(&mut pos);
        prop_assume!(!moves.is_empty());

        let board = pos.board_array();
        let state = pos.state_array();
        let (from, to) = moves[usize::from(pick) % moves.len()];
        make_move(&mut pos, from, to, Promotion::Queen, MoveMode::PLAY).unwrap();

        pos.set_state_array(&state).unwrap();
        pos.set_board_array(&board).unwrap();
        prop_assert_eq!(pos.board_array(), board);
        prop_assert_eq!(pos.state_array(), state);
        prop_assert_eq!(pos.computed_hashes(), (pos.hash(), pos.hash_pawn()));
    }

    #[test]
    fn snapshots_copy_between_positions(choices in prop::collection::vec(any::<u16>(), 0..12)) {
        let pos = random_game(&choices);
        let mut copy = Position::new(Tables::shared().unwrap());
        copy.set_state_string(&pos.state_string()).unwrap();
        copy.set_board_array(&pos.board_array()).unwrap();
        prop_assert_eq!(copy.board(), pos.board());
        prop_assert_eq!(copy.state_array(), pos.state_array());
        prop_assert_eq!(copy.board_array(), pos.board_array());
        prop_assert_eq!(copy.full_fen(), pos.full_fen());
    }

    #[test]
    fn full_fen_round_trips(choices in prop::collection::vec(any::<u16>(), 0..16)) {
        let pos = random_game(&choices);
        let fen = pos.full_fen();
        let mut copy = Position::new(Tables::shared().unwrap());
        copy.set_full_fen(&fen).unwrap();
        prop_assert_eq!(copy.full_fen(), fen);
        prop_assert_eq!(copy.board(), pos.board());
        prop_assert_eq!(copy.hash(), pos.hash());
    }
}
