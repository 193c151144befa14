//! JSON report for the `play` command.

use karuah_engine::{MoveOutcome, Position};
use serde::Serialize;

/// One move as played.
#[derive(Debug, Serialize)]
pub struct PlayedMove {
    pub from: String,
    pub to: String,
    pub san: String,
    pub moved: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub captured: Option<String>,
    /// "Castle", "En passant" or empty.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub message: String,
}

impl PlayedMove {
    pub fn new(outcome: &MoveOutcome, message: &str) -> Self {
        PlayedMove {
            from: outcome.from.to_string(),
            to: outcome.to.to_string(),
            san: outcome.san.clone(),
            moved: outcome.moved.name().to_string(),
            captured: (!outcome.captured.is_empty()).then(|| outcome.captured.name().to_string()),
            message: message.to_string(),
        }
    }
}

/// The moves played and where they led.
#[derive(Debug, Serialize)]
pub struct PlayJson<'a> {
    moves: &'a [PlayedMove],
    fen: String,
    status: i32,
    status_text: String,
    state: String,
    /// Position hash with the side to move folded in, as hex.
    hash: String,
}

impl<'a> PlayJson<'a> {
    pub fn new(position: &Position, moves: &'a [PlayedMove]) -> Self {
        PlayJson {
            moves,
            fen: position.full_fen(),
            status: position.status().code(),
            status_text: position.status().to_string(),
            state: position.state_string(),
            hash: format!("{:016x}", position.hash_with_state()),
        }
    }
}
