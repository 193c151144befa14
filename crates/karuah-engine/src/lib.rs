//! Bitboard position model and legality engine for Karuah Chess.
//!
//! This crate provides:
//! - [`Tables`] - magic-bitboard attack tables, jump tables and Zobrist keys,
//!   built once per process
//! - [`Position`] - piece bitboards, game state and a lazily computed cache of
//!   attack paths, with FEN and flat-array snapshots
//! - [`rules`] - move validation and application, checkmate and stalemate
//!   detection, board editing and perft
//! - [`san`] - Standard Algebraic Notation for played moves
//! - [`Session`] - the main board plus the scratch copy handed to an external
//!   search engine through [`SearchAdapter`]
//!
//! # Architecture
//!
//! Every piece type and colour has a 64-bit occupancy board where bit `i` is
//! square `i` (a8 = 0, h1 = 63). All derived data lives in one cache that is
//! dropped whenever the occupancy, castling rights or en passant square
//! change, and rebuilt on the next query. Moves run as transactions: a
//! rejected or test move leaves the position exactly as it was.
//!
//! # Example
//!
//! ```
//! use karuah_core::{Promotion, Square};
//! use karuah_engine::rules::{make_move, MoveMode};
//! use karuah_engine::{Position, Tables};
//!
//! let tables = Tables::shared().unwrap();
//! let mut position = Position::startpos(tables);
//! let e2 = Square::from_algebraic("e2").unwrap();
//! let e4 = Square::from_algebraic("e4").unwrap();
//! let outcome = make_move(&mut position, e2, e4, Promotion::Queen, MoveMode::PLAY).unwrap();
//! assert_eq!(outcome.san, "e4");
//! println!("{}", position.full_fen());
//! ```

mod bitboard;
mod castling;
pub mod config;
pub mod pattern;
mod position;
pub mod rules;
pub mod san;
pub mod session;
pub mod tables;
mod zobrist;

pub use bitboard::Bitboard;
pub use castling::CastlingRights;
pub use config::{ConfigError, EngineConfig};
pub use position::{
    BoardDiagnostic, GameState, GameStatus, MoveData, Position, SnapshotError, BOARD_ARRAY_LEN,
    STATE_ARRAY_LEN,
};
pub use rules::{
    arrange, arrange_update, find_from_index, is_checkmate, is_pawn_promotion, is_stalemate,
    make_move, perft, ArrangeError, FromSearch, MoveError, MoveMode, MoveOutcome,
};
pub use san::{parse_san, SanError};
pub use session::{
    BestMove, EngineMove, SearchAdapter, SearchError, SearchOptions, SearchOutcome, Session,
    SessionError,
};
pub use tables::{TableError, Tables};
pub use zobrist::ZobristKeys;
