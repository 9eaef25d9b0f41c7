//! Precomputed board geometry shared by every [`Position`](crate::Position).
//!
//! Building the tables takes a few milliseconds, so they are built once with
//! [`BoardConstants::build`] and shared through an [`Arc`]. Positions created
//! with [`Position::initial`](crate::Position::initial) use
//! [`BoardConstants::shared`].

mod masks;
mod sliding;

pub use sliding::RayFamily;

use crate::Bitboard;
use chess_core::{Color, MoveType, Square};
use sliding::SlidingTables;
use std::fmt;
use std::sync::{Arc, OnceLock};

static SHARED: OnceLock<Arc<BoardConstants>> = OnceLock::new();

/// Geometry of a castling move for one side and one wing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CastlingRule {
    pub color: Color,
    pub move_type: MoveType,
    pub king_source: Square,
    pub king_target: Square,
    /// Square the king crosses between source and target.
    pub king_transit: Square,
    pub rook_source: Square,
    pub rook_target: Square,
}

impl CastlingRule {
    /// Rook source and target, for toggling the rook with a single XOR.
    #[inline]
    pub const fn rook_delta(&self) -> Bitboard {
        Bitboard(self.rook_source.bit() | self.rook_target.bit())
    }
}

static CASTLING_RULES: [CastlingRule; 4] = [
    CastlingRule {
        color: Color::White,
        move_type: MoveType::CastleKingside,
        king_source: Square::E1,
        king_target: Square::G1,
        king_transit: Square::F1,
        rook_source: Square::H1,
        rook_target: Square::F1,
    },
    CastlingRule {
        color: Color::White,
        move_type: MoveType::CastleQueenside,
        king_source: Square::E1,
        king_target: Square::C1,
        king_transit: Square::D1,
        rook_source: Square::A1,
        rook_target: Square::D1,
    },
    CastlingRule {
        color: Color::Black,
        move_type: MoveType::CastleKingside,
        king_source: Square::E8,
        king_target: Square::G8,
        king_transit: Square::F8,
        rook_source: Square::H8,
        rook_target: Square::F8,
    },
    CastlingRule {
        color: Color::Black,
        move_type: MoveType::CastleQueenside,
        king_source: Square::E8,
        king_target: Square::C8,
        king_transit: Square::D8,
        rook_source: Square::A8,
        rook_target: Square::D8,
    },
];

/// Immutable lookup tables for move validation.
#[derive(Clone)]
pub struct BoardConstants {
    knight_moves: [Bitboard; 64],
    king_moves: [Bitboard; 64],
    pawn_pushes: [[Bitboard; 64]; 2],
    pawn_double_pushes: [[Bitboard; 64]; 2],
    pawn_captures: [[Bitboard; 64]; 2],
    en_passant_targets: [[Bitboard; 64]; 2],
    sliding: SlidingTables,
    /// Castling targets that become unavailable once a piece leaves or lands
    /// on the indexed square.
    castling_revocations: [Bitboard; 64],
    promotion_squares: Bitboard,
    castling_targets: Bitboard,
}

impl BoardConstants {
    /// Computes every table from scratch.
    pub fn build() -> Self {
        let mut castling_revocations = [Bitboard::EMPTY; 64];
        let mut castling_targets = Bitboard::EMPTY;
        for rule in &CASTLING_RULES {
            let target = Bitboard::from_square(rule.king_target);
            castling_revocations[rule.king_source.index() as usize] |= target;
            castling_revocations[rule.rook_source.index() as usize] |= target;
            castling_targets |= target;
        }

        let constants = BoardConstants {
            knight_moves: masks::KNIGHT_MOVES,
            king_moves: masks::KING_MOVES,
            pawn_pushes: masks::PAWN_PUSHES,
            pawn_double_pushes: masks::PAWN_DOUBLE_PUSHES,
            pawn_captures: masks::PAWN_CAPTURES,
            en_passant_targets: masks::EN_PASSANT_TARGETS,
            sliding: SlidingTables::build(),
            castling_revocations,
            promotion_squares: Bitboard::RANK_1 | Bitboard::RANK_8,
            castling_targets,
        };
        tracing::debug!("built board constants");
        constants
    }

    /// Process-wide instance, built on first use.
    pub fn shared() -> Arc<BoardConstants> {
        Arc::clone(SHARED.get_or_init(|| Arc::new(BoardConstants::build())))
    }

    #[inline]
    pub fn knight_moves(&self, sq: Square) -> Bitboard {
        self.knight_moves[sq.index() as usize]
    }

    #[inline]
    pub fn king_moves(&self, sq: Square) -> Bitboard {
        self.king_moves[sq.index() as usize]
    }

    /// Single-step push target for a pawn of `color` on `sq`.
    #[inline]
    pub fn pawn_push(&self, color: Color, sq: Square) -> Bitboard {
        self.pawn_pushes[color.index()][sq.index() as usize]
    }

    /// Two-step push target; empty unless `sq` is on the pawn's starting rank.
    #[inline]
    pub fn pawn_double_push(&self, color: Color, sq: Square) -> Bitboard {
        self.pawn_double_pushes[color.index()][sq.index() as usize]
    }

    /// All non-capturing pawn targets, ignoring blockers.
    #[inline]
    pub fn pawn_moves(&self, color: Color, sq: Square) -> Bitboard {
        self.pawn_push(color, sq) | self.pawn_double_push(color, sq)
    }

    #[inline]
    pub fn pawn_captures(&self, color: Color, sq: Square) -> Bitboard {
        self.pawn_captures[color.index()][sq.index() as usize]
    }

    #[inline]
    pub fn en_passant_targets(&self, color: Color, sq: Square) -> Bitboard {
        self.en_passant_targets[color.index()][sq.index() as usize]
    }

    /// Full line of `family` through `sq`.
    #[inline]
    pub fn line(&self, family: RayFamily, sq: Square) -> Bitboard {
        self.sliding.line(family, sq)
    }

    /// Line of `family` through `sq` with both board-edge endpoints removed.
    #[inline]
    pub fn inner_line(&self, family: RayFamily, sq: Square) -> Bitboard {
        self.sliding.inner_line(family, sq)
    }

    /// Squares a slider on `sq` reaches along `family` given the occupancy.
    #[inline]
    pub fn reach(&self, family: RayFamily, sq: Square, occupied: Bitboard) -> Bitboard {
        self.sliding.reach(family, sq, occupied)
    }

    /// File and rank reachability, the rook's move set.
    #[inline]
    pub fn straight_reach(&self, sq: Square, occupied: Bitboard) -> Bitboard {
        self.reach(RayFamily::File, sq, occupied) | self.reach(RayFamily::Rank, sq, occupied)
    }

    /// Diagonal and anti-diagonal reachability, the bishop's move set.
    #[inline]
    pub fn diagonal_reach(&self, sq: Square, occupied: Bitboard) -> Bitboard {
        self.reach(RayFamily::Diagonal, sq, occupied)
            | self.reach(RayFamily::AntiDiagonal, sq, occupied)
    }

    #[inline]
    pub fn castling_revocations(&self, sq: Square) -> Bitboard {
        self.castling_revocations[sq.index() as usize]
    }

    /// Castling geometry for a king landing on `king_target`, if that square
    /// is one of the four castling targets.
    pub fn castling_rule(&self, king_target: Square) -> Option<&'static CastlingRule> {
        CASTLING_RULES.iter().find(|rule| rule.king_target == king_target)
    }

    /// Every castling rule, white kingside first.
    pub fn castling_rules(&self) -> &'static [CastlingRule] {
        &CASTLING_RULES
    }

    /// First and last ranks.
    #[inline]
    pub fn promotion_squares(&self) -> Bitboard {
        self.promotion_squares
    }

    /// c1, g1, c8 and g8.
    #[inline]
    pub fn castling_targets(&self) -> Bitboard {
        self.castling_targets
    }
}

impl fmt::Debug for BoardConstants {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoardConstants").finish_non_exhaustive()
    }
}
