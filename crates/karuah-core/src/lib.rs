//! Core value types for Karuah Chess.
//!
//! This crate provides the plain types shared by the engine and its front
//! ends:
//! - [`Color`], [`Piece`] and the signed piece code [`Spin`]
//! - [`Square`], [`File`], and [`Rank`] (a8 = 0 through h1 = 63)
//! - [`Promotion`] choices
//! - FEN parsing and serialization

mod color;
mod fen;
mod piece;
mod spin;
mod square;

pub use color::Color;
pub use fen::{parse_placement, placement_string, FenError, FenParser, START_PLACEMENT};
pub use piece::{Piece, Promotion};
pub use spin::Spin;
pub use square::{File, Rank, Square, COORDINATES};
