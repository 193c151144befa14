//! End-to-end scenarios through the public API.

use karuah_core::{Color, Promotion, Spin, Square};
use karuah_engine::rules::{make_move, MoveMode};
use karuah_engine::{
    arrange, find_from_index, is_checkmate, is_stalemate, parse_san, perft, FromSearch, GameStatus,
    MoveError, Position, Tables,
};

fn sq(name: &str) -> Square {
    Square::from_algebraic(name).unwrap()
}

fn position(fen: &str) -> Position {
    let mut pos = Position::new(Tables::shared().unwrap());
    pos.set_full_fen(fen).unwrap();
    pos
}

fn play_san(pos: &mut Position, moves: &[&str]) -> Vec<String> {
    moves
        .iter()
        .map(|text| {
            let (from, to, promotion) = parse_san(pos, text).unwrap();
            make_move(pos, from, to, promotion, MoveMode::PLAY).unwrap().san
        })
        .collect()
}

#[test]
fn opening_double_push() {
    let mut pos = Position::startpos(Tables::shared().unwrap());
    make_move(&mut pos, sq("e2"), sq("e4"), Promotion::Queen, MoveMode::PLAY).unwrap();

    let board = pos.board();
    assert_eq!(board[52], Spin::EMPTY);
    assert_eq!(board[36], Spin::WHITE_PAWN);
    assert_eq!(pos.en_passant(), Some(sq("e4")));
    assert_eq!(pos.active_color(), Color::Black);
    assert_eq!(
        pos.full_fen(),
        "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 0"
    );
}

#[test]
fn lone_queen_mate_and_defence() {
    let mut pos = position("k7/1Q6/2K5/8/8/8/8/8 b - - 0 1");
    assert!(is_checkmate(&mut pos));

    // A black rook on b8 can take the queen.
    let mut pos = position("kr6/1Q6/2K5/8/8/8/8/8 b - - 0 1");
    assert!(!is_checkmate(&mut pos));
    assert!(!is_stalemate(&mut pos));
}

#[test]
fn en_passant_takes_the_pushed_pawn() {
    let mut pos = position("4k3/2p5/8/3P4/8/8/8/4K3 b - - 0 1");
    make_move(&mut pos, sq("c7"), sq("c5"), Promotion::Queen, MoveMode::PLAY).unwrap();
    let outcome = make_move(&mut pos, sq("d5"), sq("c6"), Promotion::Queen, MoveMode::PLAY).unwrap();

    assert!(outcome.en_passant);
    assert_eq!(pos.spin(sq("c5")), Spin::EMPTY);
    assert_eq!(pos.spin(sq("c6")), Spin::WHITE_PAWN);
    assert_eq!(pos.spin(sq("d5")), Spin::EMPTY);
    assert_eq!(pos.count(Color::Black), 1);
}

#[test]
fn castling_through_attack_is_refused() {
    // The black rook on f8 covers f1.
    let mut pos = position("4kr2/8/8/8/8/8/8/4K2R w K - 0 1");
    let err = make_move(&mut pos, Square::E1, Square::G1, Promotion::Queen, MoveMode::PLAY).unwrap_err();
    assert_eq!(err, MoveError::Invalid { from: Square::E1, to: Square::G1 });
    assert_eq!(pos.spin(Square::H1), Spin::WHITE_ROOK);
}

#[test]
fn rejected_move_leaves_everything_in_place() {
    let mut pos = position("4r1k1/8/8/8/8/8/4N3/4K3 w - - 0 1");
    let board = pos.board();
    let state = pos.state_array();
    let hash = pos.hash();

    let err = make_move(&mut pos, sq("e2"), sq("g3"), Promotion::Queen, MoveMode::PLAY).unwrap_err();
    assert_eq!(err, MoveError::KingInCheck);
    assert_eq!(pos.board(), board);
    assert_eq!(pos.state_array(), state);
    assert_eq!(pos.hash(), hash);
}

#[test]
fn scholars_mate_in_san() {
    let mut pos = Position::startpos(Tables::shared().unwrap());
    let sans = play_san(&mut pos, &["e4", "e5", "Qh5", "Nc6", "Bc4", "Nf6", "Qxf7#"]);
    assert_eq!(sans, ["e4", "e5", "Qh5", "Nc6", "Bc4", "Nf6", "Qxf7#"]);
    assert_eq!(pos.status(), GameStatus::Checkmate);
    assert_eq!(pos.fullmove_count(), 3);
    assert_eq!(pos.halfmove_clock(), 0);
}

#[test]
fn two_knights_need_disambiguation() {
    let mut pos = Position::startpos(Tables::shared().unwrap());
    play_san(&mut pos, &["Nf3", "d5", "d3", "d4"]);
    // Knights on b1 and f3 both reach d2.
    assert_eq!(
        find_from_index(&mut pos, sq("d2"), Spin::WHITE_KNIGHT, &[], true),
        FromSearch::Ambiguous
    );
    let sans = play_san(&mut pos, &["Nbd2"]);
    assert_eq!(sans, ["Nbd2"]);
}

#[test]
fn board_editing_keeps_kings() {
    let mut pos = Position::startpos(Tables::shared().unwrap());
    arrange(&mut pos, sq("d1"), sq("h5")).unwrap();
    assert_eq!(pos.spin(sq("h5")), Spin::WHITE_QUEEN);
    assert!(arrange(&mut pos, sq("h5"), Square::E8).is_err());
    assert_eq!(pos.spin(Square::E8), Spin::BLACK_KING);
}

#[test]
fn perft_reference_counts() {
    let mut pos = Position::startpos(Tables::shared().unwrap());
    assert_eq!(perft(&mut pos, 1), 20);
    assert_eq!(perft(&mut pos, 2), 400);
    assert_eq!(perft(&mut pos, 3), 8902);

    let mut kiwipete =
        position("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1");
    assert_eq!(perft(&mut kiwipete, 1), 48);
    assert_eq!(perft(&mut kiwipete, 2), 2039);
}
