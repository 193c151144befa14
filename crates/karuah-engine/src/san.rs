//! Standard Algebraic Notation (SAN) parsing and generation.
//!
//! SAN is generated for every move played through the move rules and can
//! be parsed back for the side to move. Examples: "e4", "Nf3", "Bxc6",
//! "O-O", "e8=Q", "Nbd2", "R1e1".

use karuah_core::{Color, File, Piece, Promotion, Rank, Spin, Square};
use thiserror::Error;

use crate::pattern::king_home;
use crate::position::Position;
use crate::rules::{find_from_index, FromSearch};

/// Error type for SAN parsing.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SanError {
    #[error("empty SAN string")]
    Empty,

    #[error("invalid SAN format: {0}")]
    InvalidFormat(String),

    #[error("no legal move matches: {0}")]
    NoMatchingMove(String),

    #[error("ambiguous move: {0}")]
    AmbiguousMove(String),
}

/// Everything needed to write one move in SAN.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SanMove<'a> {
    pub from: Square,
    pub to: Square,
    pub moved: Spin,
    pub capture: bool,
    pub promotion: Option<Promotion>,
    pub castle: bool,
    pub disambiguation: &'a str,
    pub mate: bool,
    pub check: bool,
}

pub(crate) fn format_move(mv: &SanMove<'_>) -> String {
    let mut san = String::new();

    if mv.castle {
        san.push_str(if mv.to.col() > mv.from.col() { "O-O" } else { "O-O-O" });
    } else {
        match mv.moved.piece().and_then(Piece::san_letter) {
            Some(letter) => {
                san.push(letter);
                san.push_str(mv.disambiguation);
                if mv.capture {
                    san.push('x');
                }
            }
            None => {
                if mv.capture {
                    san.push(mv.from.file().to_char());
                    san.push('x');
                }
            }
        }
        san.push_str(mv.to.name());

        if let Some(letter) = mv.promotion.and_then(|p| p.piece().san_letter()) {
            san.push('=');
            san.push(letter);
        }
    }

    if mv.mate {
        san.push('#');
    } else if mv.check {
        san.push('+');
    }
    san
}

/// The shortest prefix that tells `from` apart from other pieces of the
/// same kind that could also legally reach `to`: the file, else the rank,
/// else the whole square. Must run before the move is applied.
pub(crate) fn disambiguation(position: &mut Position, from: Square, to: Square, moved: Spin) -> String {
    if matches!(moved.piece(), None | Some(Piece::Pawn) | Some(Piece::King)) {
        return String::new();
    }
    if find_from_index(position, to, moved, &[], true) != FromSearch::Ambiguous {
        return String::new();
    }

    if find_from_index(position, to, moved, &file_squares(from.file()), true) == FromSearch::Found(from) {
        return from.file().to_char().to_string();
    }
    if find_from_index(position, to, moved, &rank_squares(from.rank()), true) == FromSearch::Found(from) {
        return from.rank().to_char().to_string();
    }
    from.name().to_string()
}

fn file_squares(file: File) -> Vec<Square> {
    Rank::ALL.iter().map(|&rank| Square::new(file, rank)).collect()
}

fn rank_squares(rank: Rank) -> Vec<Square> {
    File::ALL.iter().map(|&file| Square::new(file, rank)).collect()
}

/// Parsed components of a SAN string.
#[derive(Debug)]
struct ParsedSan {
    piece: Piece,
    from_file: Option<File>,
    from_rank: Option<Rank>,
    to: Square,
    promotion: Option<Promotion>,
}

/// Resolves a SAN token for the side to move into a move.
///
/// Check and mate suffixes are ignored. A pawn reaching the last rank
/// without `=X` promotes to a queen.
pub fn parse_san(position: &mut Position, text: &str) -> Result<(Square, Square, Promotion), SanError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(SanError::Empty);
    }
    let san = text.trim_end_matches(['#', '+', '!', '?']);
    let color = position.active_color();

    let castle = match san {
        "O-O" | "0-0" => Some(true),
        "O-O-O" | "0-0-0" => Some(false),
        _ => None,
    };
    if let Some(kingside) = castle {
        return parse_castle(position, color, kingside, text);
    }

    let parsed = parse_components(san)?;
    let promotes = parsed.piece == Piece::Pawn && parsed.to.row() == color.opposite().back_row();
    if parsed.promotion.is_some() && !promotes {
        return Err(SanError::InvalidFormat(format!("promotion on a non-promoting move: {text}")));
    }

    let candidates: Vec<Square> = match (parsed.from_file, parsed.from_rank) {
        (Some(file), Some(rank)) => vec![Square::new(file, rank)],
        (Some(file), None) => file_squares(file),
        (None, Some(rank)) => rank_squares(rank),
        (None, None) => Vec::new(),
    };

    let spin = Spin::new(parsed.piece, color);
    match find_from_index(position, parsed.to, spin, &candidates, true) {
        FromSearch::Found(from) => Ok((from, parsed.to, parsed.promotion.unwrap_or_default())),
        FromSearch::NotFound => Err(SanError::NoMatchingMove(text.to_string())),
        FromSearch::Ambiguous => Err(SanError::AmbiguousMove(text.to_string())),
    }
}

fn parse_castle(
    position: &mut Position,
    color: Color,
    kingside: bool,
    text: &str,
) -> Result<(Square, Square, Promotion), SanError> {
    let home = king_home(color);
    let to = home.offset(if kingside { 2 } else { -2 });
    let king = Spin::new(Piece::King, color);
    match to.map(|to| (to, find_from_index(position, to, king, &[home], true))) {
        Some((to, FromSearch::Found(from))) => Ok((from, to, Promotion::Queen)),
        _ => Err(SanError::NoMatchingMove(text.to_string())),
    }
}

fn parse_components(san: &str) -> Result<ParsedSan, SanError> {
    let mut chars = san.chars().peekable();

    let piece = match chars.peek() {
        Some(&c) if c.is_ascii_uppercase() => {
            chars.next();
            Piece::from_san_letter(c)
                .ok_or_else(|| SanError::InvalidFormat(format!("invalid piece character: {c}")))?
        }
        Some(_) => Piece::Pawn,
        None => return Err(SanError::Empty),
    };

    let rest: String = chars.filter(|&c| c != 'x' && c != ':').collect();

    let (body, promotion) = match rest.split_once('=') {
        Some((body, promo)) => {
            let mut letters = promo.chars();
            let promotion = match (letters.next(), letters.next()) {
                (Some(c), None) => Piece::from_san_letter(c).and_then(Promotion::from_piece),
                _ => None,
            };
            match promotion {
                Some(p) => (body, Some(p)),
                None => return Err(SanError::InvalidFormat(format!("invalid promotion: {san}"))),
            }
        }
        None => (rest.as_str(), None),
    };

    let body: Vec<char> = body.chars().collect();
    if body.len() < 2 {
        return Err(SanError::InvalidFormat(format!("too short: {san}")));
    }
    let (disambiguation, target) = body.split_at(body.len() - 2);

    let to_file = File::from_char(target[0])
        .ok_or_else(|| SanError::InvalidFormat(format!("invalid file: {san}")))?;
    let to_rank = Rank::from_char(target[1])
        .ok_or_else(|| SanError::InvalidFormat(format!("invalid rank: {san}")))?;
    let (from_file, from_rank) = parse_disambiguation(disambiguation, san)?;

    Ok(ParsedSan {
        piece,
        from_file,
        from_rank,
        to: Square::new(to_file, to_rank),
        promotion,
    })
}

fn parse_disambiguation(chars: &[char], san: &str) -> Result<(Option<File>, Option<Rank>), SanError> {
    let invalid = || SanError::InvalidFormat(format!("invalid disambiguation: {san}"));
    match chars {
        [] => Ok((None, None)),
        [c] => match (File::from_char(*c), Rank::from_char(*c)) {
            (Some(file), _) => Ok((Some(file), None)),
            (None, Some(rank)) => Ok((None, Some(rank))),
            (None, None) => Err(invalid()),
        },
        [f, r] => {
            let file = File::from_char(*f).ok_or_else(invalid)?;
            let rank = Rank::from_char(*r).ok_or_else(invalid)?;
            Ok((Some(file), Some(rank)))
        }
        _ => Err(invalid()),
    }
}
