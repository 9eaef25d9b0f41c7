//! Reachability tables for sliding pieces.
//!
//! Every square lies on exactly one line of each [`RayFamily`]. Reachability
//! along a line only depends on the six inner squares of that line, so a
//! single base table per family, indexed by the position along the line and
//! the 6-bit inner occupancy, covers all 64 squares. The base table is laid
//! out on a canonical line (file A, rank 1, the a1-h8 diagonal or the a8-h1
//! anti-diagonal) and shifted onto the square's own line at lookup time.
//!
//! The 6-bit index is gathered with one multiplication: the masked occupancy
//! is multiplied so that the inner squares land, in order, on bits 57..=62.

use crate::Bitboard;
use chess_core::Square;

/// One of the four line directions a slider can move along.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RayFamily {
    File,
    Rank,
    Diagonal,
    AntiDiagonal,
}

impl RayFamily {
    pub const ALL: [RayFamily; 4] = [
        RayFamily::File,
        RayFamily::Rank,
        RayFamily::Diagonal,
        RayFamily::AntiDiagonal,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Unit step `(rank, file)` in the positive direction of the line.
    const fn step(self) -> (i8, i8) {
        match self {
            RayFamily::File => (1, 0),
            RayFamily::Rank => (0, 1),
            RayFamily::Diagonal => (1, 1),
            RayFamily::AntiDiagonal => (-1, 1),
        }
    }

    /// Places bit `k` of an 8-bit line pattern on the canonical line.
    const fn canonical_square(self, k: u8) -> u8 {
        match self {
            RayFamily::File => 8 * k,
            RayFamily::Rank => k,
            RayFamily::Diagonal => 9 * k,
            RayFamily::AntiDiagonal => 56 - 7 * k,
        }
    }
}

const DIAGONAL_COLLAPSE: u64 = 0x0101_0101_0101_0101;
const FILE_COLLAPSE: u64 = 0x0102_0408_1020_4080;

/// Per-square entry into a family's base table.
#[derive(Clone, Copy, Debug, Default)]
struct RayLookup {
    /// Inner squares of the line through this square, endpoints excluded.
    inner: Bitboard,
    multiplier: u64,
    /// Shift from the canonical line onto this square's line.
    shift: i8,
    /// Position of the square along its line, 0..8.
    position: u8,
}

impl RayLookup {
    #[inline]
    fn occupancy_index(&self, occupied: Bitboard) -> usize {
        (((occupied & self.inner).0.wrapping_mul(self.multiplier) >> 57) & 63) as usize
    }
}

/// Base tables plus the per-square lookups for all four families.
#[derive(Clone)]
pub(crate) struct SlidingTables {
    base: [[[Bitboard; 64]; 8]; 4],
    lookups: [[RayLookup; 64]; 4],
    lines: [[Bitboard; 64]; 4],
}

impl SlidingTables {
    pub(crate) fn build() -> Self {
        let pattern = base_pattern();
        let mut base = [[[Bitboard::EMPTY; 64]; 8]; 4];
        let mut lookups = [[RayLookup::default(); 64]; 4];
        let mut lines = [[Bitboard::EMPTY; 64]; 4];

        for family in RayFamily::ALL {
            let f = family.index();
            for position in 0..8 {
                for occupancy in 0..64 {
                    base[f][position][occupancy] = project(family, pattern[position][occupancy]);
                }
            }
            for sq in Square::ALL {
                let line = line_through(family, sq);
                lines[f][sq.index() as usize] = line;
                lookups[f][sq.index() as usize] = lookup_for(family, sq, line);
            }
        }

        SlidingTables {
            base,
            lookups,
            lines,
        }
    }

    /// Squares reachable from `sq` along one family, stopping at (and
    /// including) the first occupied square in each direction.
    #[inline]
    pub(crate) fn reach(&self, family: RayFamily, sq: Square, occupied: Bitboard) -> Bitboard {
        let f = family.index();
        let lookup = &self.lookups[f][sq.index() as usize];
        let index = lookup.occupancy_index(occupied);
        self.base[f][lookup.position as usize][index].shifted(lookup.shift)
    }

    /// The full line of `family` through `sq`, including `sq` itself.
    #[inline]
    pub(crate) fn line(&self, family: RayFamily, sq: Square) -> Bitboard {
        self.lines[family.index()][sq.index() as usize]
    }

    /// The line through `sq` without its two endpoints.
    #[inline]
    pub(crate) fn inner_line(&self, family: RayFamily, sq: Square) -> Bitboard {
        self.lookups[family.index()][sq.index() as usize].inner
    }
}

/// Reachable positions on an 8-square line, indexed by `[position][occupancy]`.
///
/// Bit `b - 1` of the occupancy stands for a blocker on position `b`.
fn base_pattern() -> [[u8; 64]; 8] {
    let mut table = [[0xFFu8; 64]; 8];
    for blocker in 1..=6usize {
        let up_to_blocker = ((1u16 << (blocker + 1)) - 1) as u8;
        let from_blocker = !((1u8 << blocker) - 1);
        for occupancy in 0..64usize {
            if occupancy & (1 << (blocker - 1)) == 0 {
                continue;
            }
            for (position, row) in table.iter_mut().enumerate() {
                if position < blocker {
                    row[occupancy] &= up_to_blocker;
                } else if position > blocker {
                    row[occupancy] &= from_blocker;
                }
            }
        }
    }
    for (position, row) in table.iter_mut().enumerate() {
        for entry in row.iter_mut() {
            *entry &= !(1u8 << position);
        }
    }
    table
}

fn project(family: RayFamily, pattern: u8) -> Bitboard {
    (0..8u8)
        .filter(|k| pattern & (1 << k) != 0)
        .fold(Bitboard::EMPTY, |bb, k| {
            bb | Bitboard(1u64 << family.canonical_square(k))
        })
}

fn line_through(family: RayFamily, sq: Square) -> Bitboard {
    let (dr, df) = family.step();
    let mut line = Bitboard::from_square(sq);
    for sign in [1i8, -1] {
        let mut r = sq.rank().index() as i8 + sign * dr;
        let mut f = sq.file().index() as i8 + sign * df;
        while (0..8).contains(&r) && (0..8).contains(&f) {
            line |= Bitboard(1u64 << (r * 8 + f));
            r += sign * dr;
            f += sign * df;
        }
    }
    line
}

fn lookup_for(family: RayFamily, sq: Square, line: Bitboard) -> RayLookup {
    let rank = sq.rank().index() as i8;
    let file = sq.file().index() as i8;
    let (multiplier, shift, position, edges) = match family {
        RayFamily::File => (
            FILE_COLLAPSE >> file,
            file,
            rank,
            Bitboard::RANK_1 | Bitboard::RANK_8,
        ),
        RayFamily::Rank => (
            DIAGONAL_COLLAPSE,
            8 * rank,
            file,
            Bitboard::FILE_A | Bitboard::FILE_H,
        ),
        RayFamily::Diagonal => (DIAGONAL_COLLAPSE, 8 * (rank - file), file, Bitboard::EDGES),
        RayFamily::AntiDiagonal => (
            DIAGONAL_COLLAPSE,
            8 * (rank + file - 7),
            file,
            Bitboard::EDGES,
        ),
    };
    RayLookup {
        inner: line & !edges,
        multiplier,
        shift,
        position: position as u8,
    }
}

/// Reference walk used to validate the tables.
#[cfg(test)]
pub(crate) fn reach_slow(family: RayFamily, sq: Square, occupied: Bitboard) -> Bitboard {
    let (dr, df) = family.step();
    let mut reach = Bitboard::EMPTY;
    for sign in [1i8, -1] {
        let mut r = sq.rank().index() as i8 + sign * dr;
        let mut f = sq.file().index() as i8 + sign * df;
        while (0..8).contains(&r) && (0..8).contains(&f) {
            let bit = Bitboard(1u64 << (r * 8 + f));
            reach |= bit;
            if occupied.intersects(bit) {
                break;
            }
            r += sign * dr;
            f += sign * df;
        }
    }
    reach
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::OnceLock;

    fn tables() -> &'static SlidingTables {
        static TABLES: OnceLock<SlidingTables> = OnceLock::new();
        TABLES.get_or_init(SlidingTables::build)
    }

    #[test]
    fn base_pattern_blocks_at_first_occupied() {
        let pattern = base_pattern();
        // Position 0 with a blocker on position 3 (bit 2) reaches 1, 2, 3.
        assert_eq!(pattern[0][0b000100], 0b0000_1110);
        // Position 5 with blockers on 2 and 6 reaches 2, 3, 4, 6.
        assert_eq!(pattern[5][0b100010], 0b0101_1100);
        // Empty line from position 7 reaches everything else.
        assert_eq!(pattern[7][0], 0b0111_1111);
    }

    #[test]
    fn empty_board_counts() {
        let t = tables();
        let straight = |sq| {
            t.reach(RayFamily::File, sq, Bitboard::EMPTY) | t.reach(RayFamily::Rank, sq, Bitboard::EMPTY)
        };
        let diagonal = |sq| {
            t.reach(RayFamily::Diagonal, sq, Bitboard::EMPTY)
                | t.reach(RayFamily::AntiDiagonal, sq, Bitboard::EMPTY)
        };
        assert_eq!(straight(Square::D4).count(), 14);
        assert_eq!(straight(Square::A1).count(), 14);
        assert_eq!(diagonal(Square::D4).count(), 13);
        assert_eq!(diagonal(Square::A1).count(), 7);
        assert_eq!(diagonal(Square::H1).count(), 7);
    }

    #[test]
    fn blockers_are_included_but_not_passed() {
        let t = tables();
        let occupied = Bitboard::from_square(Square::D6) | Bitboard::from_square(Square::B4);
        let file = t.reach(RayFamily::File, Square::D4, occupied);
        assert!(file.contains(Square::D6));
        assert!(!file.contains(Square::D7));
        let rank = t.reach(RayFamily::Rank, Square::D4, occupied);
        assert!(rank.contains(Square::B4));
        assert!(!rank.contains(Square::A4));
        assert!(rank.contains(Square::H4));
    }

    #[test]
    fn line_masks() {
        let t = tables();
        assert_eq!(t.line(RayFamily::File, Square::C5), Bitboard::file(chess_core::File::C));
        assert_eq!(t.line(RayFamily::Diagonal, Square::A1).count(), 8);
        assert_eq!(t.line(RayFamily::AntiDiagonal, Square::A1).count(), 1);
        assert_eq!(t.inner_line(RayFamily::Rank, Square::E1).count(), 6);
        assert_eq!(t.inner_line(RayFamily::AntiDiagonal, Square::E4).count(), 6);
    }

    #[test]
    fn every_square_matches_reference_on_empty_and_full_boards() {
        let t = tables();
        for family in RayFamily::ALL {
            for sq in Square::ALL {
                for occupied in [Bitboard::EMPTY, Bitboard::FULL] {
                    assert_eq!(
                        t.reach(family, sq, occupied),
                        reach_slow(family, sq, occupied),
                        "{family:?} from {sq} with {occupied:?}"
                    );
                }
            }
        }
    }

    proptest! {
        #[test]
        fn reach_matches_reference(sq in 0u8..64, occupied in any::<u64>(), family in 0usize..4) {
            let sq = Square::ALL[sq as usize];
            let family = RayFamily::ALL[family];
            let occupied = Bitboard(occupied);
            prop_assert_eq!(tables().reach(family, sq, occupied), reach_slow(family, sq, occupied));
        }
    }
}
