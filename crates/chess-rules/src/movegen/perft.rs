//! Perft: leaf counts of the legal move tree, for validating the rules
//! against published node counts.

use crate::Position;

/// Counts the positions reachable in exactly `depth` moves.
pub fn perft(position: &Position, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }

    let moves = position.legal_moves();
    if depth == 1 {
        return moves.len() as u64;
    }

    moves
        .iter()
        .map(|mv| {
            let mut next = position.clone();
            next.try_make_move(mv.info(), true);
            perft(&next, depth - 1)
        })
        .sum()
}

/// Node counts per root move, sorted by move text. Handy for locating the
/// move whose subtree disagrees with a reference engine.
pub fn perft_divide(position: &Position, depth: u32) -> Vec<(String, u64)> {
    let mut results: Vec<(String, u64)> = position
        .legal_moves()
        .iter()
        .map(|mv| {
            let mut next = position.clone();
            next.try_make_move(mv.info(), true);
            (mv.to_string(), perft(&next, depth.saturating_sub(1)))
        })
        .collect();
    results.sort();
    results
}
