//! Property tests for the core value types.

use karuah_core::{parse_placement, placement_string, Color, FenParser, Piece, Spin, Square};
use proptest::prelude::*;

fn any_spin() -> impl Strategy<Value = Spin> {
    (-6i32..=6).prop_map(|raw| Spin::from_raw(raw).unwrap_or(Spin::EMPTY))
}

proptest! {
    #[test]
    fn square_name_parses_back(index in 0u8..64) {
        let square = Square::from_index(index).unwrap();
        prop_assert_eq!(Square::from_algebraic(square.name()), Some(square));
        prop_assert_eq!(square.row() * 8 + square.col(), index);
    }

    #[test]
    fn mirror_rank_keeps_file_and_flips_rank(index in 0u8..64) {
        let square = Square::from_index(index).unwrap();
        let mirrored = square.mirror_rank();
        prop_assert_eq!(mirrored.file(), square.file());
        prop_assert_eq!(mirrored.rank().index(), 7 - square.rank().index());
    }

    #[test]
    fn spin_parts_rebuild_the_spin(raw in -6i32..=6) {
        let spin = Spin::from_raw(raw).unwrap();
        match (spin.piece(), spin.color()) {
            (Some(piece), Some(color)) => prop_assert_eq!(Spin::new(piece, color), spin),
            (None, None) => prop_assert!(spin.is_empty()),
            _ => prop_assert!(false, "spin {:?} is half empty", spin),
        }
    }

    #[test]
    fn placement_text_round_trips(board in prop::array::uniform32(any_spin())
        .prop_flat_map(|top| prop::array::uniform32(any_spin()).prop_map(move |bottom| (top, bottom))))
    {
        let (top, bottom) = board;
        let mut squares = [Spin::EMPTY; 64];
        squares[..32].copy_from_slice(&top);
        squares[32..].copy_from_slice(&bottom);
        let text = placement_string(&squares);
        prop_assert_eq!(parse_placement(&text), Ok(squares));
    }
}

#[test]
fn start_position_piece_counts() {
    let fen = FenParser::parse(FenParser::STARTPOS).unwrap();
    for color in Color::ALL {
        let pawns = fen
            .placement
            .iter()
            .filter(|s| **s == Spin::new(Piece::Pawn, color))
            .count();
        assert_eq!(pawns, 8);
    }
    let kings: Vec<usize> = fen
        .placement
        .iter()
        .enumerate()
        .filter(|(_, s)| s.is(Piece::King))
        .map(|(i, _)| i)
        .collect();
    assert_eq!(kings, vec![4, 60]);
}
