//! Fixed move masks for the non-sliding pieces.
//!
//! Everything here is evaluated at compile time; [`BoardConstants`](super::BoardConstants)
//! copies the results into its own tables.

use crate::Bitboard;

const KNIGHT_DELTAS: [(i8, i8); 8] = [
    (2, 1),
    (2, -1),
    (-2, 1),
    (-2, -1),
    (1, 2),
    (1, -2),
    (-1, 2),
    (-1, -2),
];

const KING_DELTAS: [(i8, i8); 8] = [
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
];

pub(crate) const KNIGHT_MOVES: [Bitboard; 64] = leaper_masks(&KNIGHT_DELTAS);
pub(crate) const KING_MOVES: [Bitboard; 64] = leaper_masks(&KING_DELTAS);

/// Single-step pawn pushes, indexed `[color][square]`.
pub(crate) const PAWN_PUSHES: [[Bitboard; 64]; 2] = pawn_steps(1);
/// Two-step pawn pushes, only populated on each side's pawn rank.
pub(crate) const PAWN_DOUBLE_PUSHES: [[Bitboard; 64]; 2] = pawn_steps(2);
pub(crate) const PAWN_CAPTURES: [[Bitboard; 64]; 2] = pawn_captures();
/// Diagonal targets from which an en-passant capture can land.
pub(crate) const EN_PASSANT_TARGETS: [[Bitboard; 64]; 2] = en_passant_targets();

/// Squares reachable by stepping once along each `(rank, file)` delta.
const fn leaper_masks(deltas: &[(i8, i8)]) -> [Bitboard; 64] {
    let mut masks = [Bitboard::EMPTY; 64];
    let mut sq = 0;
    while sq < 64 {
        let rank = (sq / 8) as i8;
        let file = (sq % 8) as i8;
        let mut bits = 0u64;
        let mut i = 0;
        while i < deltas.len() {
            let (dr, df) = deltas[i];
            let (r, f) = (rank + dr, file + df);
            if r >= 0 && r < 8 && f >= 0 && f < 8 {
                bits |= 1u64 << (r * 8 + f);
            }
            i += 1;
        }
        masks[sq] = Bitboard(bits);
        sq += 1;
    }
    masks
}

/// Straight pawn steps of `distance` ranks.
///
/// A `distance` of 2 only applies from the second rank (seventh for Black); a
/// `distance` of 1 applies from every rank that still has room in front of it.
const fn pawn_steps(distance: i8) -> [[Bitboard; 64]; 2] {
    let mut masks = [[Bitboard::EMPTY; 64]; 2];
    let mut sq = 0;
    while sq < 64 {
        let rank = (sq / 8) as i8;

        // White
        let target = rank + distance;
        if target < 8 && (distance == 1 || rank == 1) {
            masks[0][sq] = Bitboard(1u64 << (target * 8 + (sq % 8) as i8));
        }

        // Black
        let target = rank - distance;
        if target >= 0 && (distance == 1 || rank == 6) {
            masks[1][sq] = Bitboard(1u64 << (target * 8 + (sq % 8) as i8));
        }

        sq += 1;
    }
    masks
}

const fn pawn_captures() -> [[Bitboard; 64]; 2] {
    let mut masks = [[Bitboard::EMPTY; 64]; 2];
    let mut sq = 0;
    while sq < 64 {
        let rank = (sq / 8) as i8;
        let file = (sq % 8) as i8;
        let mut white = 0u64;
        let mut black = 0u64;
        let mut df = -1;
        while df <= 1 {
            let f = file + df;
            if df != 0 && f >= 0 && f < 8 {
                if rank < 7 {
                    white |= 1u64 << ((rank + 1) * 8 + f);
                }
                if rank > 0 {
                    black |= 1u64 << ((rank - 1) * 8 + f);
                }
            }
            df += 1;
        }
        masks[0][sq] = Bitboard(white);
        masks[1][sq] = Bitboard(black);
        sq += 1;
    }
    masks
}

/// White pawns on the fifth rank capture onto the sixth; Black pawns on the
/// fourth rank capture onto the third.
const fn en_passant_targets() -> [[Bitboard; 64]; 2] {
    let captures = pawn_captures();
    let mut masks = [[Bitboard::EMPTY; 64]; 2];
    let mut sq = 0;
    while sq < 64 {
        let rank = sq / 8;
        if rank == 4 {
            masks[0][sq] = Bitboard(captures[0][sq].0 & (0xFFu64 << 40));
        }
        if rank == 3 {
            masks[1][sq] = Bitboard(captures[1][sq].0 & (0xFFu64 << 16));
        }
        sq += 1;
    }
    masks
}
