//! Sanity checks run before a position is handed to a search engine.

use std::fmt;

use karuah_core::{Color, Piece, Spin, Square};

use crate::Bitboard;

use super::Position;

/// Result of [`Position::verify_board_configuration`]. The first failing
/// check wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoardDiagnostic {
    Valid,
    WhiteKingCount,
    BlackKingCount,
    TooManyWhitePawns,
    TooManyBlackPawns,
    WhitePieceOvercount,
    BlackPieceOvercount,
    PawnOnBackRank,
    OpponentInCheck,
    CastlingMismatch,
    OverlappingPieces,
}

impl BoardDiagnostic {
    /// Numeric code; 0 means valid.
    pub const fn code(self) -> i32 {
        match self {
            BoardDiagnostic::Valid => 0,
            BoardDiagnostic::WhiteKingCount => 1,
            BoardDiagnostic::BlackKingCount => 2,
            BoardDiagnostic::TooManyWhitePawns => 3,
            BoardDiagnostic::TooManyBlackPawns => 4,
            BoardDiagnostic::WhitePieceOvercount => 5,
            BoardDiagnostic::BlackPieceOvercount => 6,
            BoardDiagnostic::PawnOnBackRank => 7,
            BoardDiagnostic::OpponentInCheck => 8,
            BoardDiagnostic::CastlingMismatch => 9,
            BoardDiagnostic::OverlappingPieces => 10,
        }
    }

    #[inline]
    pub const fn is_valid(self) -> bool {
        matches!(self, BoardDiagnostic::Valid)
    }
}

impl fmt::Display for BoardDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            BoardDiagnostic::Valid => "valid",
            BoardDiagnostic::WhiteKingCount => "White must have exactly one king",
            BoardDiagnostic::BlackKingCount => "Black must have exactly one king",
            BoardDiagnostic::TooManyWhitePawns => "White has more than eight pawns",
            BoardDiagnostic::TooManyBlackPawns => "Black has more than eight pawns",
            BoardDiagnostic::WhitePieceOvercount => "White has too many pieces",
            BoardDiagnostic::BlackPieceOvercount => "Black has too many pieces",
            BoardDiagnostic::PawnOnBackRank => "pawns cannot stand on the first or last rank",
            BoardDiagnostic::OpponentInCheck => "the side not to move is in check",
            BoardDiagnostic::CastlingMismatch => {
                "castling rights do not match king and rook placement"
            }
            BoardDiagnostic::OverlappingPieces => "two pieces share a square",
        };
        f.write_str(text)
    }
}

impl Position {
    /// Checks that the position could be reached in a game and searched.
    pub fn verify_board_configuration(&self) -> BoardDiagnostic {
        for (color, diagnostic) in [
            (Color::White, BoardDiagnostic::WhiteKingCount),
            (Color::Black, BoardDiagnostic::BlackKingCount),
        ] {
            if self.pieces_of(Piece::King, color).count() != 1 {
                return diagnostic;
            }
        }

        for (color, diagnostic) in [
            (Color::White, BoardDiagnostic::TooManyWhitePawns),
            (Color::Black, BoardDiagnostic::TooManyBlackPawns),
        ] {
            if self.pieces_of(Piece::Pawn, color).count() > 8 {
                return diagnostic;
            }
        }

        for (color, diagnostic) in [
            (Color::White, BoardDiagnostic::WhitePieceOvercount),
            (Color::Black, BoardDiagnostic::BlackPieceOvercount),
        ] {
            if self.overcounted(color) {
                return diagnostic;
            }
        }

        let pawns = self.pieces_of(Piece::Pawn, Color::White) | self.pieces_of(Piece::Pawn, Color::Black);
        if pawns.intersects(Bitboard::RANK_1 | Bitboard::RANK_8) {
            return BoardDiagnostic::PawnOnBackRank;
        }

        if self.is_king_check(self.active_color().opposite()) {
            return BoardDiagnostic::OpponentInCheck;
        }

        if !self.castling_matches_placement() {
            return BoardDiagnostic::CastlingMismatch;
        }

        if !self.occupancy_is_consistent() {
            return BoardDiagnostic::OverlappingPieces;
        }

        BoardDiagnostic::Valid
    }

    /// More than sixteen pieces, or more promoted pieces than missing pawns.
    fn overcounted(&self, color: Color) -> bool {
        if self.count(color) > 16 {
            return true;
        }
        let extra = |piece: Piece, standard: u32| {
            self.pieces_of(piece, color).count().saturating_sub(standard)
        };
        let promoted = extra(Piece::Knight, 2)
            + extra(Piece::Bishop, 2)
            + extra(Piece::Rook, 2)
            + extra(Piece::Queen, 1);
        let missing_pawns = 8u32.saturating_sub(self.pieces_of(Piece::Pawn, color).count());
        promoted > missing_pawns
    }

    fn castling_matches_placement(&self) -> bool {
        let rights = self.castling();
        let home = |sq: Square, spin: Spin| self.spin(sq) == spin;
        for (color, king, rook_k, rook_q) in [
            (Color::White, Square::E1, Square::H1, Square::A1),
            (Color::Black, Square::E8, Square::H8, Square::A8),
        ] {
            let king_spin = Spin::new(Piece::King, color);
            let rook_spin = Spin::new(Piece::Rook, color);
            if rights.can_castle_kingside(color) && !(home(king, king_spin) && home(rook_k, rook_spin)) {
                return false;
            }
            if rights.can_castle_queenside(color) && !(home(king, king_spin) && home(rook_q, rook_spin)) {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::Tables;

    fn position(fen: &str) -> Position {
        let mut pos = Position::new(Tables::shared().unwrap());
        pos.set_full_fen(fen).unwrap();
        pos
    }

    #[test]
    fn startpos_is_valid() {
        let pos = Position::startpos(Tables::shared().unwrap());
        assert_eq!(pos.verify_board_configuration(), BoardDiagnostic::Valid);
        assert_eq!(pos.verify_board_configuration().code(), 0);
    }

    #[test]
    fn king_counts() {
        let pos = position("4k3/8/8/8/8/8/8/3KK3 w - - 0 1");
        assert_eq!(pos.verify_board_configuration().code(), 1);
        let pos = position("8/8/8/8/8/8/8/4K3 w - - 0 1");
        assert_eq!(pos.verify_board_configuration().code(), 2);
    }

    #[test]
    fn piece_counts() {
        let pos = position("4k3/pppppppp/p7/8/8/8/8/4K3 w - - 0 1");
        assert_eq!(pos.verify_board_configuration(), BoardDiagnostic::TooManyBlackPawns);
        // Two extra queens with only one pawn missing.
        let pos = position("4k3/8/8/8/8/8/PPPPPPP1/QQQ1K3 w - - 0 1");
        assert_eq!(pos.verify_board_configuration(), BoardDiagnostic::WhitePieceOvercount);
        // One extra queen for one missing pawn is fine.
        let pos = position("4k3/8/8/8/8/8/PPPPPPP1/QQ2K3 w - - 0 1");
        assert_eq!(pos.verify_board_configuration(), BoardDiagnostic::Valid);
    }

    #[test]
    fn pawn_on_back_rank() {
        let pos = position("4k2P/8/8/8/8/8/8/4K3 w - - 0 1");
        assert_eq!(pos.verify_board_configuration().code(), 7);
    }

    #[test]
    fn side_not_to_move_in_check() {
        let pos = position("4k3/8/8/8/8/8/8/4K2R w - - 0 1");
        assert!(pos.verify_board_configuration().is_valid());
        let pos = position("4k3/8/8/8/8/8/8/4R2K w - - 0 1");
        assert_eq!(pos.verify_board_configuration(), BoardDiagnostic::OpponentInCheck);
        // Being in check on your own turn is fine.
        let pos = position("4k3/8/8/8/8/8/8/4R2K b - - 0 1");
        assert!(pos.verify_board_configuration().is_valid());
    }

    #[test]
    fn castling_must_match_pieces() {
        let mut pos = position("4k3/8/8/8/8/8/8/4K2R w K - 0 1");
        assert!(pos.verify_board_configuration().is_valid());
        pos.update(Square::H1, Spin::EMPTY);
        pos.update(Square::G1, Spin::WHITE_ROOK);
        assert_eq!(pos.verify_board_configuration().code(), 9);
    }
}
