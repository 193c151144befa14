//! FEN import and export for a live position.

use karuah_core::{
    parse_placement, placement_string, Color, FenError, FenParser, Piece, Spin, Square,
};

use crate::castling::CastlingRights;

use super::{GameStatus, Position};

impl Position {
    /// The piece-placement field.
    pub fn board_fen(&self) -> String {
        placement_string(&self.board())
    }

    /// Replaces the pieces from a placement field. Only squares that change
    /// are touched, each through [`Position::update`]. The game state is
    /// left alone.
    pub fn set_board_fen(&mut self, placement: &str) -> Result<(), FenError> {
        let board = parse_placement(placement)?;
        self.apply_board(&board);
        Ok(())
    }

    fn apply_board(&mut self, board: &[Spin; 64]) {
        for (i, &spin) in board.iter().enumerate() {
            let Some(sq) = Square::from_index(i as u8) else {
                continue;
            };
            if self.spin(sq) != spin {
                self.update(sq, spin);
            }
        }
    }

    /// True if `color` has its king and the given corner rook at home.
    fn castle_pieces_home(&self, color: Color, kingside: bool) -> bool {
        let (king, rook) = match (color, kingside) {
            (Color::White, true) => (Square::E1, Square::H1),
            (Color::White, false) => (Square::E1, Square::A1),
            (Color::Black, true) => (Square::E8, Square::H8),
            (Color::Black, false) => (Square::E8, Square::A8),
        };
        self.spin(king) == Spin::new(Piece::King, color)
            && self.spin(rook) == Spin::new(Piece::Rook, color)
    }

    fn castling_field(&self) -> String {
        let rights = self.castling();
        let mut field = String::new();
        for (letter, color, kingside) in [
            ('K', Color::White, true),
            ('Q', Color::White, false),
            ('k', Color::Black, true),
            ('q', Color::Black, false),
        ] {
            let granted = if kingside {
                rights.can_castle_kingside(color)
            } else {
                rights.can_castle_queenside(color)
            };
            if granted && self.castle_pieces_home(color, kingside) {
                field.push(letter);
            }
        }
        if field.is_empty() {
            field.push('-');
        }
        field
    }

    /// The en passant target: the square the pushed pawn passed over.
    fn en_passant_target(&self) -> Option<Square> {
        let ep = self.en_passant()?;
        match self.spin(ep) {
            Spin::WHITE_PAWN => ep.offset(8),
            Spin::BLACK_PAWN => ep.offset(-8),
            _ => None,
        }
    }

    /// All six FEN fields. Castling letters appear only when the right is
    /// held and the king and rook are still on their home squares.
    pub fn full_fen(&self) -> String {
        format!(
            "{} {} {} {} {} {}",
            self.board_fen(),
            self.active_color().fen_char(),
            self.castling_field(),
            self.en_passant_target().map_or("-", Square::name),
            self.halfmove_clock(),
            self.fullmove_count()
        )
    }

    /// Loads a complete FEN. The status goes back to in progress, the
    /// has-castled markers are cleared and the last move is forgotten.
    pub fn set_full_fen(&mut self, fen: &str) -> Result<(), FenError> {
        let parsed = FenParser::parse(fen)?;

        // The target sits behind the pawn that moved: rank 3 for White,
        // rank 6 for Black.
        let en_passant = match parsed.en_passant {
            Some(target) if target.row() == 5 => target.offset(-8),
            Some(target) => target.offset(8),
            None => None,
        };

        let mut rights = CastlingRights::NONE;
        rights.set_color(
            Color::White,
            parsed.has_castling('K'),
            parsed.has_castling('Q'),
        );
        rights.set_color(
            Color::Black,
            parsed.has_castling('k'),
            parsed.has_castling('q'),
        );

        self.apply_board(&parsed.placement);
        {
            let state = self.state_mut();
            state.active_color = parsed.active_color;
            state.castling = rights;
            state.en_passant = en_passant;
            state.halfmove_clock = parsed.halfmove_clock;
            state.fullmove_count = parsed.fullmove_number;
            state.status = GameStatus::Ready;
        }
        self.clear_last_move();
        self.invalidate();
        Ok(())
    }
}
