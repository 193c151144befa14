//! A game session: the board the user plays on and the copy handed to a
//! search engine.
//!
//! The search engine itself lives outside this crate behind
//! [`SearchAdapter`]. Before every search the main board is copied into
//! the scratch board through the snapshot arrays, so a long-running search
//! never sees later edits to the main board.

use std::sync::Arc;

use karuah_core::{FenError, Piece, Promotion, Spin, Square};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::pattern::king_home;
use crate::position::{BoardDiagnostic, Position, SnapshotError};
use crate::tables::{TableError, Tables};

/// Limits and style settings passed to the search engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchOptions {
    /// -10 (weakest) to 19; anything else plays at full strength.
    pub skill_level: i32,
    /// Search depth; 0 is unlimited.
    pub depth: i32,
    /// Node budget; 0 is unlimited.
    pub nodes: i64,
    pub move_duration_ms: i32,
    pub threads: i32,
    /// Pick among the top five replies on the first move of a game.
    pub randomise_first_move: bool,
    /// Prefer the second-best reply to avoid repetitions.
    pub alternate_move: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        SearchOptions {
            skill_level: 20,
            depth: 0,
            nodes: 0,
            move_duration_ms: 1000,
            threads: 1,
            randomise_first_move: false,
            alternate_move: false,
        }
    }
}

impl SearchOptions {
    /// Skill level the engine should use; out-of-range values mean full
    /// strength (20).
    pub fn effective_skill_level(&self) -> i32 {
        if (-10..20).contains(&self.skill_level) {
            self.skill_level
        } else {
            20
        }
    }

    /// Number of principal variations to ask for at the given full-move
    /// count.
    pub fn multi_pv(&self, fullmove_count: u32) -> u32 {
        if self.randomise_first_move && fullmove_count < 1 {
            5
        } else if self.alternate_move {
            2
        } else {
            1
        }
    }
}

/// A reply from the search engine, in its own square numbering
/// (a1 = 0, h8 = 63).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineMove {
    pub from: u8,
    pub to: u8,
    pub promotion: Option<Promotion>,
    /// Castling given as king-takes-rook.
    pub castling: bool,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SearchError {
    #[error("search engine found no move")]
    NoMove,

    #[error("search was cancelled")]
    Cancelled,

    #[error("search engine failed: {0}")]
    Engine(String),
}

/// The seam to an external search engine.
pub trait SearchAdapter {
    /// Finds the best move for the side to move in `fen`.
    fn best_move(&mut self, fen: &str, options: &SearchOptions) -> Result<EngineMove, SearchError>;

    /// Asks a running search to stop early.
    fn cancel(&mut self) {}
}

/// A move chosen by the search, on this crate's board numbering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BestMove {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<Promotion>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    Found(BestMove),
    /// The position failed verification and was never sent to the engine.
    Rejected(BoardDiagnostic),
}

impl SearchOutcome {
    /// 0 for a searched position, otherwise the diagnostic code.
    pub fn code(&self) -> i32 {
        match self {
            SearchOutcome::Found(_) => 0,
            SearchOutcome::Rejected(diagnostic) => diagnostic.code(),
        }
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Tables(#[from] TableError),

    #[error(transparent)]
    Fen(#[from] FenError),

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    #[error(transparent)]
    Search(#[from] SearchError),

    #[error("search engine returned square {0} which is off the board")]
    EngineSquare(u8),
}

/// Main and scratch boards for one game.
#[derive(Debug, Clone)]
pub struct Session {
    main: Position,
    scratch: Position,
    options: SearchOptions,
}

impl Session {
    /// A session at the standard starting position.
    pub fn new(tables: Arc<Tables>) -> Self {
        Session {
            main: Position::startpos(Arc::clone(&tables)),
            scratch: Position::new(tables),
            options: SearchOptions::default(),
        }
    }

    /// A session starting from `fen`, or the standard start for `None`.
    pub fn with_start(tables: Arc<Tables>, fen: Option<&str>) -> Result<Self, SessionError> {
        let mut session = Session::new(tables);
        if let Some(fen) = fen {
            session.main.set_full_fen(fen)?;
        }
        Ok(session)
    }

    pub fn main(&self) -> &Position {
        &self.main
    }

    pub fn main_mut(&mut self) -> &mut Position {
        &mut self.main
    }

    /// The board last handed to the search engine.
    pub fn scratch(&self) -> &Position {
        &self.scratch
    }

    pub fn options(&self) -> &SearchOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: SearchOptions) {
        self.options = options;
    }

    /// Back to the standard start on both boards.
    pub fn reset(&mut self) {
        self.main.reset();
        self.scratch.reset();
    }

    /// Copies the main board to the scratch board and asks `adapter` for a
    /// move there.
    ///
    /// A position failing [`Position::verify_board_configuration`] is not
    /// searched; the outcome carries the diagnostic instead.
    pub fn search<A: SearchAdapter + ?Sized>(&mut self, adapter: &mut A) -> Result<SearchOutcome, SessionError> {
        // State first: a castling or en passant change would drop the
        // cache that arrives with the board words.
        self.scratch.set_state_array(&self.main.state_array())?;
        self.scratch.set_board_array(&self.main.board_array())?;

        let diagnostic = self.scratch.verify_board_configuration();
        if !diagnostic.is_valid() {
            tracing::warn!(code = diagnostic.code(), %diagnostic, "position not handed to search");
            return Ok(SearchOutcome::Rejected(diagnostic));
        }

        let fen = self.scratch.full_fen();
        let reply = adapter.best_move(&fen, &self.options)?;
        let best = decode(&self.scratch, reply)?;
        tracing::debug!(from = %best.from, to = %best.to, "search finished");
        Ok(SearchOutcome::Found(best))
    }
}

fn engine_square(index: u8) -> Result<Square, SessionError> {
    Square::from_index(index)
        .map(Square::mirror_rank)
        .ok_or(SessionError::EngineSquare(index))
}

/// Converts an engine reply to board squares. Castling given as the king
/// capturing its own rook becomes the king's two-square move.
fn decode(position: &Position, reply: EngineMove) -> Result<BestMove, SessionError> {
    let from = engine_square(reply.from)?;
    let mut to = engine_square(reply.to)?;

    let mover = position.spin(from);
    let own_rook = mover
        .color()
        .is_some_and(|color| position.spin(to) == Spin::new(Piece::Rook, color));
    let at_home = mover.color().map(king_home) == Some(from);
    if mover.is(Piece::King) && at_home && (reply.castling || own_rook) {
        let step = if to > from { 2 } else { -2 };
        to = from.offset(step).ok_or(SessionError::EngineSquare(reply.to))?;
    }

    Ok(BestMove {
        from,
        to,
        promotion: reply.promotion,
    })
}
