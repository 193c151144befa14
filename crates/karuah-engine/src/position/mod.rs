//! Chess position representation.
//!
//! A [`Position`] owns twelve piece bitboards (one per spin), the two
//! incrementally maintained Zobrist hashes, the scalar game state and a
//! lazily built [`AttackCache`]. Every change of occupancy goes through
//! [`Position::update`], which keeps the hashes in step and drops the cache.

mod cache;
mod fen;
mod snapshot;
mod verify;

use std::cell::OnceCell;
use std::fmt;
use std::sync::Arc;

use karuah_core::{Color, Piece, Spin, Square};

use crate::castling::CastlingRights;
use crate::tables::Tables;
use crate::Bitboard;

pub(crate) use cache::AttackCache;
pub use snapshot::{SnapshotError, BOARD_ARRAY_LEN, STATE_ARRAY_LEN};
pub use verify::BoardDiagnostic;

/// Outcome flag stored with the game state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GameStatus {
    /// Game in progress.
    #[default]
    Ready,
    Checkmate,
    Stalemate,
    Resigned,
    TimeExpired,
    /// Any other code a front end chose to store.
    Other(i32),
}

impl GameStatus {
    pub const fn code(self) -> i32 {
        match self {
            GameStatus::Ready => 0,
            GameStatus::Checkmate => 1,
            GameStatus::Stalemate => 2,
            GameStatus::Resigned => 3,
            GameStatus::TimeExpired => 4,
            GameStatus::Other(code) => code,
        }
    }

    pub const fn from_code(code: i32) -> Self {
        match code {
            0 => GameStatus::Ready,
            1 => GameStatus::Checkmate,
            2 => GameStatus::Stalemate,
            3 => GameStatus::Resigned,
            4 => GameStatus::TimeExpired,
            other => GameStatus::Other(other),
        }
    }

    /// True once the game can no longer continue by moving.
    pub const fn is_over(self) -> bool {
        !matches!(self, GameStatus::Ready)
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameStatus::Ready => write!(f, "in progress"),
            GameStatus::Checkmate => write!(f, "checkmate"),
            GameStatus::Stalemate => write!(f, "stalemate"),
            GameStatus::Resigned => write!(f, "resigned"),
            GameStatus::TimeExpired => write!(f, "time expired"),
            GameStatus::Other(code) => write!(f, "status {}", code),
        }
    }
}

/// Scalar game state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    /// The side to move.
    pub active_color: Color,
    /// Castling rights and has-castled markers.
    pub castling: CastlingRights,
    /// Square of the pawn that just made a double push, if any.
    pub en_passant: Option<Square>,
    /// Halfmove clock for the fifty-move rule.
    pub halfmove_clock: u32,
    /// Full-move count, incremented after each Black move.
    pub fullmove_count: u32,
    pub status: GameStatus,
    /// Clock offsets kept for front ends; not used by the rules.
    pub white_clock_offset: i32,
    pub black_clock_offset: i32,
}

impl Default for GameState {
    fn default() -> Self {
        GameState {
            active_color: Color::White,
            castling: CastlingRights::NONE,
            en_passant: None,
            halfmove_clock: 0,
            fullmove_count: 0,
            status: GameStatus::Ready,
            white_clock_offset: 0,
            black_clock_offset: 0,
        }
    }
}

/// The last committed move, kept for notifications and animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MoveData {
    pub from: Option<Square>,
    pub to: Option<Square>,
    pub moved: Spin,
    pub captured: Spin,
}

impl MoveData {
    /// The four-integer form: from, to, moved spin, captured spin
    /// (-1 for a missing square).
    pub fn to_array(self) -> [i32; 4] {
        [
            self.from.map_or(-1, |sq| sq.index() as i32),
            self.to.map_or(-1, |sq| sq.index() as i32),
            i32::from(self.moved),
            i32::from(self.captured),
        ]
    }
}

/// Board, game state and cached attack data for one game.
#[derive(Clone)]
pub struct Position {
    tables: Arc<Tables>,
    /// Occupancy per spin slot.
    pieces: [Bitboard; 12],
    hash: u64,
    pawn_hash: u64,
    state: GameState,
    move_data: MoveData,
    return_message: String,
    move_san: String,
    cache: OnceCell<Box<AttackCache>>,
}

/// Saved copy of everything a move attempt may touch.
pub(crate) struct Checkpoint {
    pieces: [Bitboard; 12],
    hash: u64,
    pawn_hash: u64,
    state: GameState,
    move_data: MoveData,
    return_message: String,
    move_san: String,
    cache: Option<Box<AttackCache>>,
}

impl Position {
    /// An empty board with White to move.
    pub fn new(tables: Arc<Tables>) -> Self {
        Position {
            tables,
            pieces: [Bitboard::EMPTY; 12],
            hash: 0,
            pawn_hash: 0,
            state: GameState::default(),
            move_data: MoveData::default(),
            return_message: String::new(),
            move_san: String::new(),
            cache: OnceCell::new(),
        }
    }

    /// The standard starting position.
    pub fn startpos(tables: Arc<Tables>) -> Self {
        let mut position = Position::new(tables);
        position.reset();
        position
    }

    /// Loads the standard starting arrangement and clears the game state.
    pub fn reset(&mut self) {
        for (i, spin) in START_BOARD.iter().enumerate() {
            let sq = Square::from_index(i as u8);
            if let Some(sq) = sq {
                if self.spin(sq) != *spin {
                    self.update(sq, *spin);
                }
            }
        }
        self.state = GameState {
            castling: CastlingRights::ALL,
            ..GameState::default()
        };
        self.clear_last_move();
        self.invalidate();
    }

    /// Forgets the last move, its SAN and the return message.
    fn clear_last_move(&mut self) {
        self.move_data = MoveData::default();
        self.return_message.clear();
        self.move_san.clear();
    }

    #[inline]
    pub fn tables(&self) -> &Arc<Tables> {
        &self.tables
    }

    /// Places `spin` on `sq` (or empties it), keeping both hashes current.
    ///
    /// This is the only way occupancy changes.
    pub fn update(&mut self, sq: Square, spin: Spin) {
        let old = self.spin(sq);
        let keys = self.tables.zobrist();
        let out_key = keys.piece_key(old, sq);
        let in_key = keys.piece_key(spin, sq);

        self.hash ^= out_key;
        if old.is(Piece::Pawn) {
            self.pawn_hash ^= out_key;
        }

        let clear = !Bitboard::from_square(sq);
        for bb in self.pieces.iter_mut() {
            *bb &= clear;
        }
        if let Some(slot) = spin.slot() {
            self.pieces[slot].set(sq);
        }

        self.hash ^= in_key;
        if spin.is(Piece::Pawn) {
            self.pawn_hash ^= in_key;
        }

        self.invalidate();
    }

    /// The spin on `sq`, or [`Spin::EMPTY`].
    pub fn spin(&self, sq: Square) -> Spin {
        self.pieces
            .iter()
            .position(|bb| bb.contains(sq))
            .and_then(Spin::from_slot)
            .unwrap_or(Spin::EMPTY)
    }

    /// The spin on `sq` if it belongs to `color`.
    pub fn spin_of(&self, sq: Square, color: Color) -> Spin {
        let spin = self.spin(sq);
        if spin.is_color(color) {
            spin
        } else {
            Spin::EMPTY
        }
    }

    /// All 64 spins, a8 first.
    pub fn board(&self) -> [Spin; 64] {
        let mut board = [Spin::EMPTY; 64];
        for (slot, bb) in self.pieces.iter().enumerate() {
            if let Some(spin) = Spin::from_slot(slot) {
                for sq in *bb {
                    board[sq.idx()] = spin;
                }
            }
        }
        board
    }

    /// Squares holding `spin`. Empty for [`Spin::EMPTY`].
    #[inline]
    pub fn occupied_by_spin(&self, spin: Spin) -> Bitboard {
        spin.slot().map_or(Bitboard::EMPTY, |slot| self.pieces[slot])
    }

    #[inline]
    pub fn pieces_of(&self, piece: Piece, color: Color) -> Bitboard {
        self.occupied_by_spin(Spin::new(piece, color))
    }

    /// Squares holding a piece of `color`.
    pub fn occupied(&self, color: Color) -> Bitboard {
        let range = match color {
            Color::Black => 0..6,
            Color::White => 6..12,
        };
        self.pieces[range]
            .iter()
            .fold(Bitboard::EMPTY, |acc, bb| acc | *bb)
    }

    /// Squares holding any piece.
    pub fn occupied_all(&self) -> Bitboard {
        self.pieces.iter().fold(Bitboard::EMPTY, |acc, bb| acc | *bb)
    }

    pub fn count(&self, color: Color) -> u32 {
        self.occupied(color).count()
    }

    pub fn count_spin(&self, spin: Spin) -> u32 {
        self.occupied_by_spin(spin).count()
    }

    pub fn only_kings_remain(&self) -> bool {
        let kings = self.pieces_of(Piece::King, Color::White) | self.pieces_of(Piece::King, Color::Black);
        self.occupied_all() == kings
    }

    /// Number of non-pawn pieces on the board, kings included.
    pub fn major_piece_count(&self) -> u32 {
        let pawns = self.pieces_of(Piece::Pawn, Color::White) | self.pieces_of(Piece::Pawn, Color::Black);
        (self.occupied_all() & !pawns).count()
    }

    /// The square of `color`'s king, if it has one.
    pub fn king_index(&self, color: Color) -> Option<Square> {
        self.pieces_of(Piece::King, color).lsb()
    }

    /// True if the other side attacks `color`'s king.
    pub fn is_king_check(&self, color: Color) -> bool {
        let attack = self.cache().side(color.opposite()).attack;
        attack.intersects(self.pieces_of(Piece::King, color))
    }

    #[inline]
    pub fn hash(&self) -> u64 {
        self.hash
    }

    #[inline]
    pub fn hash_pawn(&self) -> u64 {
        self.pawn_hash
    }

    /// The position hash with the side to move folded in.
    pub fn hash_with_state(&self) -> u64 {
        self.hash ^ self.tables.zobrist().side_key(self.state.active_color)
    }

    /// Recomputes both hashes from the piece bitboards.
    pub fn computed_hashes(&self) -> (u64, u64) {
        let keys = self.tables.zobrist();
        let mut hash = 0;
        let mut pawn_hash = 0;
        for (slot, bb) in self.pieces.iter().enumerate() {
            let Some(spin) = Spin::from_slot(slot) else {
                continue;
            };
            for sq in *bb {
                let key = keys.piece_key(spin, sq);
                hash ^= key;
                if spin.is(Piece::Pawn) {
                    pawn_hash ^= key;
                }
            }
        }
        (hash, pawn_hash)
    }

    /// True if no square is claimed by two piece bitboards.
    pub fn occupancy_is_consistent(&self) -> bool {
        let mut seen = Bitboard::EMPTY;
        for bb in &self.pieces {
            if seen.intersects(*bb) {
                return false;
            }
            seen |= *bb;
        }
        true
    }

    // --- game state ---

    #[inline]
    pub fn state(&self) -> &GameState {
        &self.state
    }

    #[inline]
    pub fn active_color(&self) -> Color {
        self.state.active_color
    }

    #[inline]
    pub fn castling(&self) -> CastlingRights {
        self.state.castling
    }

    #[inline]
    pub fn en_passant(&self) -> Option<Square> {
        self.state.en_passant
    }

    #[inline]
    pub fn halfmove_clock(&self) -> u32 {
        self.state.halfmove_clock
    }

    #[inline]
    pub fn fullmove_count(&self) -> u32 {
        self.state.fullmove_count
    }

    #[inline]
    pub fn status(&self) -> GameStatus {
        self.state.status
    }

    /// Sets the side to move. Changing it forfeits any en passant chance.
    pub fn set_active_color(&mut self, color: Color) {
        if self.state.active_color != color {
            self.state.active_color = color;
            self.set_en_passant(None);
        }
    }

    pub fn set_castling(&mut self, rights: CastlingRights) {
        if self.state.castling != rights {
            self.state.castling = rights;
            self.invalidate();
        }
    }

    /// Sets both castling rights of one colour.
    ///
    /// Granting a right needs the king and the matching rook on their home
    /// squares; returns false and changes nothing otherwise.
    pub fn set_castling_for(&mut self, color: Color, kingside: bool, queenside: bool) -> bool {
        let (king, rook_k, rook_q) = match color {
            Color::White => (Square::E1, Square::H1, Square::A1),
            Color::Black => (Square::E8, Square::H8, Square::A8),
        };
        let king_spin = Spin::new(Piece::King, color);
        let rook_spin = Spin::new(Piece::Rook, color);
        let king_home = self.spin(king) == king_spin;

        if kingside && !(king_home && self.spin(rook_k) == rook_spin) {
            return false;
        }
        if queenside && !(king_home && self.spin(rook_q) == rook_spin) {
            return false;
        }

        let mut rights = self.state.castling;
        rights.set_color(color, kingside, queenside);
        self.set_castling(rights);
        true
    }

    pub fn set_en_passant(&mut self, ep: Option<Square>) {
        if self.state.en_passant != ep {
            self.state.en_passant = ep;
            self.invalidate();
        }
    }

    pub fn set_halfmove_clock(&mut self, value: u32) {
        self.state.halfmove_clock = value;
    }

    pub fn set_fullmove_count(&mut self, value: u32) {
        self.state.fullmove_count = value;
    }

    pub fn set_status(&mut self, status: GameStatus) {
        self.state.status = status;
    }

    pub fn clock_offsets(&self) -> (i32, i32) {
        (self.state.white_clock_offset, self.state.black_clock_offset)
    }

    pub fn set_clock_offset(&mut self, color: Color, offset: i32) {
        match color {
            Color::White => self.state.white_clock_offset = offset,
            Color::Black => self.state.black_clock_offset = offset,
        }
    }

    // --- last move bookkeeping ---

    #[inline]
    pub fn move_data(&self) -> MoveData {
        self.move_data
    }

    /// Message left by the last move or arrange call.
    #[inline]
    pub fn return_message(&self) -> &str {
        &self.return_message
    }

    /// SAN of the last committed move.
    #[inline]
    pub fn move_san(&self) -> &str {
        &self.move_san
    }

    pub(crate) fn set_move_data(&mut self, data: MoveData) {
        self.move_data = data;
    }

    pub(crate) fn set_return_message(&mut self, message: impl Into<String>) {
        self.return_message = message.into();
    }

    pub(crate) fn set_move_san(&mut self, san: impl Into<String>) {
        self.move_san = san.into();
    }

    pub(crate) fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    // --- cached attack data ---

    /// The attack cache, computed on first use after a change.
    pub(crate) fn cache(&self) -> &AttackCache {
        self.cache
            .get_or_init(|| Box::new(AttackCache::compute(self)))
    }

    /// True if the cache is current.
    pub fn is_cache_ready(&self) -> bool {
        self.cache.get().is_some()
    }

    /// Drops the cached attack data.
    pub fn invalidate(&mut self) {
        self.cache.take();
    }

    pub(crate) fn install_cache(&mut self, cache: Option<Box<AttackCache>>) {
        self.cache = match cache {
            Some(cache) => OnceCell::from(cache),
            None => OnceCell::new(),
        };
    }

    /// Pseudo-legal destinations of the piece on `sq`; empty when the
    /// square is empty. Own-king safety is not considered.
    pub fn potential_move(&self, sq: Square) -> Bitboard {
        let spin = self.spin(sq);
        let Some(color) = spin.color() else {
            return Bitboard::EMPTY;
        };
        let cache = self.cache();
        let i = sq.idx();
        (cache.attack_path[i] | cache.non_attack_pawn_path[i] | cache.castle_path[i])
            & !self.occupied(color)
    }

    /// Squares the piece on `sq` attacks or defends.
    pub fn attack_path(&self, sq: Square) -> Bitboard {
        self.cache().attack_path[sq.idx()]
    }

    /// Slider path from `sq` continued through the first blocker.
    pub fn xray_path(&self, sq: Square) -> Bitboard {
        self.cache().xray_path[sq.idx()]
    }

    /// Every square `color` attacks or could attack with a pawn, minus its
    /// own pieces.
    pub fn all_attack_paths(&self, color: Color) -> Bitboard {
        let side = self.cache().side(color);
        (side.attack | side.potential_pawn) & !self.occupied(color)
    }

    /// Squares `color` hits at least twice, minus its own pieces.
    pub fn all_attack_twice_paths(&self, color: Color) -> Bitboard {
        let side = self.cache().side(color);
        (side.attack_twice | (side.attack & side.potential_pawn)) & !self.occupied(color)
    }

    /// Squares attacked by one piece type of `color`, minus its own pieces.
    /// Pawns include the squares they could attack.
    pub fn piece_attack_paths(&self, color: Color, piece: Piece) -> Bitboard {
        let side = self.cache().side(color);
        let bb = match piece {
            Piece::Pawn => side.pawn | side.potential_pawn,
            Piece::Knight => side.knight,
            Piece::Bishop => side.bishop,
            Piece::Rook => side.rook,
            Piece::Queen => side.queen,
            Piece::King => side.king,
        };
        bb & !self.occupied(color)
    }

    /// Squares `color`'s pawns cover whether or not anything stands there.
    pub fn protect_pawn_paths(&self, color: Color) -> Bitboard {
        self.cache().side(color).potential_pawn
    }

    pub fn potential_attack_pawn_twice(&self, color: Color) -> Bitboard {
        self.cache().side(color).potential_pawn_twice
    }

    /// Pawns of `color` with no push and no capture.
    pub fn blocked_pawns(&self, color: Color) -> Bitboard {
        self.cache().side(color).blocked_pawns
    }

    /// Sliders of `color` that attack `sq` directly.
    pub fn slider_attackers(&self, color: Color, sq: Square) -> Bitboard {
        let occupied = self.occupied_all();
        let queens = self.pieces_of(Piece::Queen, color);
        let diagonal = self.tables.bishop_attacks(sq, occupied)
            & (self.pieces_of(Piece::Bishop, color) | queens);
        let straight = self.tables.rook_attacks(sq, occupied)
            & (self.pieces_of(Piece::Rook, color) | queens);
        diagonal | straight
    }

    /// Pieces of `color` standing between `sq` and an enemy slider that
    /// would otherwise reach it.
    pub fn slider_blockers(&self, color: Color, sq: Square) -> Bitboard {
        let occupied = self.occupied_all();
        let enemy = color.opposite();
        let enemy_queens = self.pieces_of(Piece::Queen, enemy);
        let xray_b = self.tables.bishop_xray(sq, occupied);
        let xray_r = self.tables.rook_xray(sq, occupied);
        let snipers = (xray_b & (self.pieces_of(Piece::Bishop, enemy) | enemy_queens))
            | (xray_r & (self.pieces_of(Piece::Rook, enemy) | enemy_queens));

        // The x-ray stops at the second piece, so at most one stands between.
        let own = self.occupied(color);
        snipers
            .into_iter()
            .fold(Bitboard::EMPTY, |acc, s| acc | (self.tables.between(sq, s) & own))
    }

    /// Occupied squares that some slider of either colour attacks.
    pub fn all_slider_blockers(&self) -> Bitboard {
        let cache = self.cache();
        let hits = cache
            .sides
            .iter()
            .fold(Bitboard::EMPTY, |acc, s| acc | s.bishop | s.rook | s.queen);
        hits & self.occupied_all()
    }

    /// Union of every slider's x-ray path.
    pub fn xray_attack_paths(&self) -> Bitboard {
        self.cache()
            .sides
            .iter()
            .fold(Bitboard::EMPTY, |acc, s| acc | s.bishop_xray | s.rook_xray | s.queen_xray)
    }

    /// X-ray paths of the bishops, rooks or queens of one colour. Other
    /// spins have none.
    pub fn xray_attack_paths_of(&self, spin: Spin) -> Bitboard {
        let (Some(piece), Some(color)) = (spin.piece(), spin.color()) else {
            return Bitboard::EMPTY;
        };
        let side = self.cache().side(color);
        match piece {
            Piece::Bishop => side.bishop_xray,
            Piece::Rook => side.rook_xray,
            Piece::Queen => side.queen_xray,
            _ => Bitboard::EMPTY,
        }
    }

    /// Hash of the material on the board, independent of placement.
    pub fn material_hash(&self) -> u64 {
        self.cache().material_hash
    }

    /// Summed value of `color`'s knights, bishops, rooks and queens.
    pub fn major_piece_material(&self, color: Color) -> u32 {
        self.cache().side(color).major_material
    }

    // --- transactions ---

    pub(crate) fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            pieces: self.pieces,
            hash: self.hash,
            pawn_hash: self.pawn_hash,
            state: self.state.clone(),
            move_data: self.move_data,
            return_message: self.return_message.clone(),
            move_san: self.move_san.clone(),
            cache: self.cache.get().cloned(),
        }
    }

    pub(crate) fn restore(&mut self, checkpoint: Checkpoint) {
        self.pieces = checkpoint.pieces;
        self.hash = checkpoint.hash;
        self.pawn_hash = checkpoint.pawn_hash;
        self.state = checkpoint.state;
        self.move_data = checkpoint.move_data;
        self.return_message = checkpoint.return_message;
        self.move_san = checkpoint.move_san;
        self.install_cache(checkpoint.cache);
    }

    /// Runs `f` and keeps its changes only if it succeeds and `keep` is
    /// set. Otherwise the position is put back exactly as it was.
    pub fn transaction<T, E>(
        &mut self,
        keep: bool,
        f: impl FnOnce(&mut Position) -> Result<T, E>,
    ) -> Result<T, E> {
        let checkpoint = self.checkpoint();
        let result = f(self);
        if !keep || result.is_err() {
            self.restore(checkpoint);
        }
        result
    }

    /// Runs `f` and always puts the position back afterwards.
    pub fn trial<T>(&mut self, f: impl FnOnce(&mut Position) -> T) -> T {
        let checkpoint = self.checkpoint();
        let result = f(self);
        self.restore(checkpoint);
        result
    }
}

/// Spins of the standard starting position, a8 first.
const START_BOARD: [Spin; 64] = {
    let back = [
        Piece::Rook,
        Piece::Knight,
        Piece::Bishop,
        Piece::Queen,
        Piece::King,
        Piece::Bishop,
        Piece::Knight,
        Piece::Rook,
    ];
    let mut board = [Spin::EMPTY; 64];
    let mut col = 0;
    while col < 8 {
        board[col] = Spin::new(back[col], Color::Black);
        board[8 + col] = Spin::BLACK_PAWN;
        board[48 + col] = Spin::WHITE_PAWN;
        board[56 + col] = Spin::new(back[col], Color::White);
        col += 1;
    }
    board
};

impl PartialEq for Position {
    fn eq(&self, other: &Self) -> bool {
        self.pieces == other.pieces
            && self.hash == other.hash
            && self.pawn_hash == other.pawn_hash
            && self.state == other.state
            && self.move_data == other.move_data
            && self.return_message == other.return_message
            && self.move_san == other.move_san
    }
}

impl Eq for Position {}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Position")
            .field("board", &self.board_fen())
            .field("state", &self.state)
            .field("hash", &format_args!("{:#018x}", self.hash))
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let board = self.board();
        for row in 0..8 {
            write!(f, "{} ", 8 - row)?;
            for col in 0..8 {
                let c = board[row * 8 + col].to_fen_char().unwrap_or('.');
                write!(f, " {}", c)?;
            }
            writeln!(f)?;
        }
        write!(f, "   a b c d e f g h")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn startpos() -> Position {
        Position::startpos(Tables::shared().unwrap())
    }

    fn sq(name: &str) -> Square {
        Square::from_algebraic(name).unwrap()
    }

    #[test]
    fn empty_position() {
        let pos = Position::new(Tables::shared().unwrap());
        assert!(pos.occupied_all().is_empty());
        assert_eq!(pos.active_color(), Color::White);
        assert_eq!(pos.castling(), CastlingRights::NONE);
        assert_eq!(pos.hash(), 0);
        assert_eq!(pos.king_index(Color::White), None);
    }

    #[test]
    fn startpos_layout() {
        let pos = startpos();
        assert_eq!(pos.count(Color::White), 16);
        assert_eq!(pos.count(Color::Black), 16);
        assert_eq!(pos.spin(Square::E1), Spin::WHITE_KING);
        assert_eq!(pos.spin(Square::D8), Spin::BLACK_QUEEN);
        assert_eq!(pos.spin(sq("e2")), Spin::WHITE_PAWN);
        assert_eq!(pos.spin(sq("e4")), Spin::EMPTY);
        assert_eq!(pos.king_index(Color::White), Some(Square::E1));
        assert_eq!(pos.king_index(Color::Black), Some(Square::E8));
        assert_eq!(pos.castling().raw(), 0b00_1111);
        assert_eq!(pos.fullmove_count(), 0);
        assert_eq!(pos.major_piece_count(), 16);
        assert!(!pos.only_kings_remain());
    }

    #[test]
    fn spin_of_filters_colour() {
        let pos = startpos();
        assert_eq!(pos.spin_of(Square::E1, Color::White), Spin::WHITE_KING);
        assert_eq!(pos.spin_of(Square::E1, Color::Black), Spin::EMPTY);
    }

    #[test]
    fn update_keeps_hashes_in_step() {
        let mut pos = startpos();
        pos.update(sq("e2"), Spin::EMPTY);
        pos.update(sq("e4"), Spin::WHITE_PAWN);
        pos.update(sq("d8"), Spin::WHITE_QUEEN);
        assert_eq!(pos.computed_hashes(), (pos.hash(), pos.hash_pawn()));
        assert!(pos.occupancy_is_consistent());
        assert_eq!(pos.spin(sq("d8")), Spin::WHITE_QUEEN);
    }

    #[test]
    fn side_to_move_changes_only_the_state_hash() {
        let mut pos = startpos();
        let (hash, with_state) = (pos.hash(), pos.hash_with_state());
        assert_ne!(hash, with_state);
        pos.set_active_color(Color::Black);
        assert_eq!(pos.hash(), hash);
        assert_ne!(pos.hash_with_state(), with_state);
        pos.set_active_color(Color::White);
        assert_eq!(pos.hash_with_state(), with_state);
    }

    #[test]
    fn update_invalidates_cache() {
        let mut pos = startpos();
        let _ = pos.potential_move(sq("e2"));
        assert!(pos.is_cache_ready());
        pos.update(sq("e3"), Spin::BLACK_PAWN);
        assert!(!pos.is_cache_ready());
        assert!(pos.potential_move(sq("e2")).is_empty());
    }

    #[test]
    fn startpos_potential_moves() {
        let pos = startpos();
        assert_eq!(pos.potential_move(sq("e2")).count(), 2);
        assert_eq!(pos.potential_move(sq("g1")).count(), 2);
        assert!(pos.potential_move(Square::A1).is_empty());
        assert!(pos.potential_move(sq("e4")).is_empty());
        assert!(!pos.is_king_check(Color::White));
        assert!(!pos.is_king_check(Color::Black));
    }

    #[test]
    fn changing_colour_clears_en_passant() {
        let mut pos = startpos();
        pos.set_en_passant(Some(sq("e4")));
        pos.set_active_color(Color::White);
        assert_eq!(pos.en_passant(), Some(sq("e4")));
        pos.set_active_color(Color::Black);
        assert_eq!(pos.en_passant(), None);
    }

    #[test]
    fn castling_setter_checks_home_squares() {
        let mut pos = startpos();
        pos.update(Square::H1, Spin::EMPTY);
        assert!(!pos.set_castling_for(Color::White, true, true));
        assert_eq!(pos.castling().raw(), 0b00_1111);
        assert!(pos.set_castling_for(Color::White, false, true));
        assert!(!pos.castling().can_castle_kingside(Color::White));
        assert!(pos.castling().can_castle_queenside(Color::White));
    }

    #[test]
    fn transaction_rolls_back_on_error() {
        let mut pos = startpos();
        let before = pos.clone();
        let result: Result<(), ()> = pos.transaction(true, |p| {
            p.update(sq("e2"), Spin::EMPTY);
            Err(())
        });
        assert!(result.is_err());
        assert_eq!(pos, before);

        let _ = pos.transaction::<(), ()>(false, |p| {
            p.update(sq("e2"), Spin::EMPTY);
            Ok(())
        });
        assert_eq!(pos, before);

        let _ = pos.transaction::<(), ()>(true, |p| {
            p.update(sq("e2"), Spin::EMPTY);
            Ok(())
        });
        assert_ne!(pos, before);
    }

    #[test]
    fn game_status_codes() {
        for code in -1..6 {
            assert_eq!(GameStatus::from_code(code).code(), code);
        }
        assert_eq!(GameStatus::from_code(1), GameStatus::Checkmate);
        assert!(!GameStatus::Ready.is_over());
    }

    #[test]
    fn display_draws_rank_eight_first() {
        let text = startpos().to_string();
        let first = text.lines().next().unwrap();
        assert_eq!(first, "8  r n b q k b n r");
    }
}
