//! Derived attack data for one occupancy.
//!
//! Built in a single pass over the occupied squares. Pawns, knights and
//! sliders are folded into per-colour aggregates as they are met; kings
//! are held back and resolved last, because each king's reach depends on
//! what the other side attacks. Castling destinations go in after that.

use karuah_core::{Color, Piece, Spin, Square};

use crate::pattern::{self, CastleContext};
use crate::Bitboard;

use super::Position;

/// Aggregated attack data of one colour.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct SideAttacks {
    /// Every square attacked or defended.
    pub attack: Bitboard,
    /// Squares reached by two or more pieces.
    pub attack_twice: Bitboard,
    /// Pawn captures available now, including en passant.
    pub pawn: Bitboard,
    /// Diagonal squares covered by pawns whatever stands there.
    pub potential_pawn: Bitboard,
    pub potential_pawn_twice: Bitboard,
    pub knight: Bitboard,
    pub bishop: Bitboard,
    pub rook: Bitboard,
    pub queen: Bitboard,
    pub king: Bitboard,
    /// Pawns that can neither push nor capture.
    pub blocked_pawns: Bitboard,
    pub bishop_xray: Bitboard,
    pub rook_xray: Bitboard,
    pub queen_xray: Bitboard,
    /// Summed value of knights, bishops, rooks and queens.
    pub major_material: u32,
}

impl SideAttacks {
    /// Number of bitboard words in [`SideAttacks::words`].
    pub const WORDS: usize = 11;

    /// The aggregates stored per colour in board snapshots, in order.
    pub fn words(&self) -> [u64; Self::WORDS] {
        [
            self.attack.0,
            self.pawn.0,
            self.potential_pawn.0,
            self.knight.0,
            self.bishop.0,
            self.rook.0,
            self.queen.0,
            self.king.0,
            self.blocked_pawns.0,
            self.attack_twice.0,
            self.potential_pawn_twice.0,
        ]
    }

    pub fn set_words(&mut self, words: &[u64; Self::WORDS]) {
        self.attack = Bitboard(words[0]);
        self.pawn = Bitboard(words[1]);
        self.potential_pawn = Bitboard(words[2]);
        self.knight = Bitboard(words[3]);
        self.bishop = Bitboard(words[4]);
        self.rook = Bitboard(words[5]);
        self.queen = Bitboard(words[6]);
        self.king = Bitboard(words[7]);
        self.blocked_pawns = Bitboard(words[8]);
        self.attack_twice = Bitboard(words[9]);
        self.potential_pawn_twice = Bitboard(words[10]);
    }

    #[inline]
    fn fold(&mut self, path: Bitboard) {
        self.attack_twice |= self.attack & path;
        self.attack |= path;
    }
}

/// Material weights used for [`SideAttacks::major_material`].
const fn material_value(piece: Piece) -> u32 {
    match piece {
        Piece::Knight => 781,
        Piece::Bishop => 825,
        Piece::Rook => 1276,
        Piece::Queen => 2538,
        Piece::Pawn | Piece::King => 0,
    }
}

/// Everything derived from the occupancy and the castling/en passant state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct AttackCache {
    pub attack_path: [Bitboard; 64],
    pub xray_path: [Bitboard; 64],
    pub non_attack_pawn_path: [Bitboard; 64],
    pub castle_path: [Bitboard; 64],
    pub potential_pawn_path: [Bitboard; 64],
    /// Indexed by [`Color::index`].
    pub sides: [SideAttacks; 2],
    pub material_hash: u64,
}

impl AttackCache {
    pub fn empty() -> Self {
        AttackCache {
            attack_path: [Bitboard::EMPTY; 64],
            xray_path: [Bitboard::EMPTY; 64],
            non_attack_pawn_path: [Bitboard::EMPTY; 64],
            castle_path: [Bitboard::EMPTY; 64],
            potential_pawn_path: [Bitboard::EMPTY; 64],
            sides: [SideAttacks::default(); 2],
            material_hash: 0,
        }
    }

    #[inline]
    pub fn side(&self, color: Color) -> &SideAttacks {
        &self.sides[color.index()]
    }

    pub fn compute(pos: &Position) -> Self {
        let tables = pos.tables();
        let occupied = pos.occupied_all();
        let ep = pos.en_passant();
        let mut cache = AttackCache::empty();
        let mut kings: [Option<Square>; 2] = [None, None];

        for sq in occupied {
            let spin = pos.spin(sq);
            let (Some(piece), Some(color)) = (spin.piece(), spin.color()) else {
                continue;
            };
            let i = sq.idx();
            let side = &mut cache.sides[color.index()];

            match piece {
                Piece::Pawn => {
                    let push = pattern::pawn_move(sq, color, occupied);
                    let potential = pattern::pawn_potential_attack(sq, color);
                    let enemy_pawns = pos.pieces_of(Piece::Pawn, color.opposite());
                    let attack = pattern::pawn_attack(sq, color, occupied)
                        | pattern::pawn_en_passant(sq, color, ep, enemy_pawns);

                    cache.non_attack_pawn_path[i] = push;
                    cache.potential_pawn_path[i] = potential;
                    cache.attack_path[i] = attack;

                    side.fold(attack);
                    side.pawn |= attack;
                    side.potential_pawn_twice |= side.potential_pawn & potential;
                    side.potential_pawn |= potential;
                    if (push | attack).is_empty() {
                        side.blocked_pawns |= Bitboard::from_square(sq);
                    }
                }
                Piece::Knight => {
                    let attack = pattern::knight(tables, sq);
                    cache.attack_path[i] = attack;
                    side.fold(attack);
                    side.knight |= attack;
                    side.major_material += material_value(piece);
                }
                Piece::Bishop => {
                    let attack = pattern::bishop(tables, sq, occupied);
                    let xray = tables.bishop_xray(sq, occupied);
                    cache.attack_path[i] = attack;
                    cache.xray_path[i] = xray;
                    side.fold(attack);
                    side.bishop |= attack;
                    side.bishop_xray |= xray;
                    side.major_material += material_value(piece);
                }
                Piece::Rook => {
                    let attack = pattern::rook(tables, sq, occupied);
                    let xray = tables.rook_xray(sq, occupied);
                    cache.attack_path[i] = attack;
                    cache.xray_path[i] = xray;
                    side.fold(attack);
                    side.rook |= attack;
                    side.rook_xray |= xray;
                    side.major_material += material_value(piece);
                }
                Piece::Queen => {
                    let attack = pattern::queen(tables, sq, occupied);
                    let xray = tables.queen_xray(sq, occupied);
                    cache.attack_path[i] = attack;
                    cache.xray_path[i] = xray;
                    side.fold(attack);
                    side.queen |= attack;
                    side.queen_xray |= xray;
                    side.major_material += material_value(piece);
                }
                Piece::King => {
                    kings[color.index()] = Some(sq);
                }
            }
        }

        cache.resolve_kings(pos, kings);

        cache.material_hash = Spin::ALL
            .iter()
            .filter_map(|&spin| {
                let slot = spin.slot()?;
                let count = pos.count_spin(spin);
                Some(tables.zobrist().material_key(slot, count))
            })
            .fold(0, |acc, key| acc ^ key);

        cache
    }

    /// King steps exclude whatever the other side attacks and the squares
    /// next to the other king. Both are worked out before either king is
    /// folded in, so neither sees the other's reach.
    fn resolve_kings(&mut self, pos: &Position, kings: [Option<Square>; 2]) {
        let tables = pos.tables();
        let reach = |k: Option<Square>| k.map_or(Bitboard::EMPTY, |sq| pattern::king(tables, sq));

        let mut paths = [Bitboard::EMPTY; 2];
        for color in [Color::White, Color::Black] {
            if let Some(sq) = kings[color.index()] {
                let enemy = color.opposite();
                let excluded = self.side(enemy).attack | reach(kings[enemy.index()]);
                paths[color.index()] = pattern::king(tables, sq) & !excluded;
            }
        }

        for color in [Color::White, Color::Black] {
            if let Some(sq) = kings[color.index()] {
                let path = paths[color.index()];
                self.attack_path[sq.idx()] = path;
                let side = &mut self.sides[color.index()];
                side.fold(path);
                side.king |= path;
            }
        }

        let occupied = pos.occupied_all();
        for color in [Color::White, Color::Black] {
            let Some(sq) = kings[color.index()] else {
                continue;
            };
            let enemy = color.opposite();
            let enemy_side = self.side(enemy);
            let ctx = CastleContext {
                rights: pos.castling(),
                occupied,
                own_rooks: pos.pieces_of(Piece::Rook, color),
                danger: enemy_side.attack
                    | enemy_side.potential_pawn
                    | reach(kings[enemy.index()]),
            };
            self.castle_path[sq.idx()] = pattern::king_castle(sq, color, &ctx);
        }
    }
}
