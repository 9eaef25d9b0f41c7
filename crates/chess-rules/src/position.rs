//! Bitboard-encoded board state.

use crate::constants::BoardConstants;
use crate::Bitboard;
use chess_core::{Color, ColoredPiece, FenError, FenParser, File, Piece, Rank, Square};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

/// Reasons a set of bitboards does not describe a reachable chess position.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PositionError {
    #[error(transparent)]
    Fen(#[from] FenError),

    #[error("white and black pieces overlap")]
    OverlappingColors,

    #[error("two piece kinds share a square")]
    OverlappingPieces,

    #[error("piece vectors and color vectors cover different squares")]
    UnionMismatch,

    #[error("{color} has {count} kings, expected exactly one")]
    KingCount { color: Color, count: u32 },

    #[error("{0} is in check but it is not their move")]
    OpponentInCheck(Color),

    #[error("pawn on the first or last rank at {0}")]
    PawnOnBackRank(Square),

    #[error("castling to {0} is available but king or rook has left its square")]
    CastlingWithoutPieces(Square),

    #[error("inconsistent en passant state")]
    InconsistentEnPassant,
}

const BACK_RANK: [Piece; 8] = [
    Piece::Rook,
    Piece::Knight,
    Piece::Bishop,
    Piece::Queen,
    Piece::King,
    Piece::Bishop,
    Piece::Knight,
    Piece::Rook,
];

/// A chess position.
///
/// Positions only change through [`try_make_move`](Position::try_make_move),
/// which either commits a complete legal move or leaves the position exactly
/// as it was.
#[derive(Clone)]
pub struct Position {
    pub(crate) constants: Arc<BoardConstants>,
    pub(crate) side_to_move: Color,
    pub(crate) colors: [Bitboard; 2],
    pub(crate) pieces: [Bitboard; 6],
    /// Square a pawn moves to when capturing en passant.
    pub(crate) en_passant: Bitboard,
    /// Square of the pawn that would be captured en passant.
    pub(crate) en_passant_capture: Bitboard,
    /// Subset of c1, g1, c8 and g8.
    pub(crate) castling_rights: Bitboard,
    pub(crate) halfmove_clock: u32,
    pub(crate) fullmove_number: u32,
}

impl Position {
    /// The standard starting position.
    pub fn initial() -> Self {
        Self::initial_with(BoardConstants::shared())
    }

    /// The standard starting position, using the given tables.
    pub fn initial_with(constants: Arc<BoardConstants>) -> Self {
        let mut position = Position::empty(constants);
        for (file, piece) in File::ALL.into_iter().zip(BACK_RANK) {
            for color in Color::ALL {
                position.put(color, piece, Square::new(file, color.back_rank()));
                position.put(color, Piece::Pawn, Square::new(file, color.pawn_rank()));
            }
        }
        position.castling_rights = position.constants.castling_targets();
        position
    }

    fn empty(constants: Arc<BoardConstants>) -> Self {
        Position {
            constants,
            side_to_move: Color::White,
            colors: [Bitboard::EMPTY; 2],
            pieces: [Bitboard::EMPTY; 6],
            en_passant: Bitboard::EMPTY,
            en_passant_capture: Bitboard::EMPTY,
            castling_rights: Bitboard::EMPTY,
            halfmove_clock: 0,
            fullmove_number: 1,
        }
    }

    /// Parses a FEN record and checks that it describes a valid position.
    pub fn from_fen(fen: &str) -> Result<Self, PositionError> {
        Self::from_fen_with(fen, BoardConstants::shared())
    }

    pub fn from_fen_with(fen: &str, constants: Arc<BoardConstants>) -> Result<Self, PositionError> {
        let parsed = FenParser::parse(fen)?;
        let mut position = Position::empty(constants);

        for (sq, occupant) in Square::ALL.into_iter().zip(parsed.placement) {
            if let Some(cp) = occupant {
                position.put(cp.color, cp.piece, sq);
            }
        }
        position.side_to_move = parsed.side_to_move;
        position.castling_rights = parsed.castling_targets.into_iter().collect();
        if let Some(ep) = parsed.en_passant {
            position.en_passant = Bitboard::from_square(ep);
            // The pawn that just double-stepped sits one rank past the en passant square.
            position.en_passant_capture = match parsed.side_to_move {
                Color::White => Bitboard(ep.bit() >> 8),
                Color::Black => Bitboard(ep.bit() << 8),
            };
        }
        position.halfmove_clock = parsed.halfmove_clock;
        position.fullmove_number = parsed.fullmove_number;

        position.check_invariants()?;
        Ok(position)
    }

    /// Serializes the position as a FEN record.
    pub fn to_fen(&self) -> String {
        FenParser {
            placement: std::array::from_fn(|i| self.colored_piece(Square::ALL[i])),
            side_to_move: self.side_to_move,
            castling_targets: self.castling_rights.into_iter().collect(),
            en_passant: self.en_passant.lsb(),
            halfmove_clock: self.halfmove_clock,
            fullmove_number: self.fullmove_number,
        }
        .to_fen()
    }

    #[inline]
    fn put(&mut self, color: Color, piece: Piece, sq: Square) {
        self.colors[color.index()].set(sq);
        self.pieces[piece.index()].set(sq);
    }

    /// Flips `sq` in both the color and the piece vector.
    #[inline]
    pub(crate) fn toggle(&mut self, color: Color, piece: Piece, sq: Square) {
        let bb = Bitboard::from_square(sq);
        self.colors[color.index()] ^= bb;
        self.pieces[piece.index()] ^= bb;
    }

    /// The tables this position validates moves against.
    #[inline]
    pub fn constants(&self) -> &Arc<BoardConstants> {
        &self.constants
    }

    #[inline]
    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    #[inline]
    pub fn color_vector(&self, color: Color) -> Bitboard {
        self.colors[color.index()]
    }

    #[inline]
    pub fn piece_vector(&self, piece: Piece) -> Bitboard {
        self.pieces[piece.index()]
    }

    #[inline]
    pub fn colored_piece_vector(&self, cp: ColoredPiece) -> Bitboard {
        self.colors[cp.color.index()] & self.pieces[cp.piece.index()]
    }

    #[inline]
    pub fn occupied(&self) -> Bitboard {
        self.colors[0] | self.colors[1]
    }

    /// The occupant of `sq`, if any.
    pub fn colored_piece(&self, sq: Square) -> Option<ColoredPiece> {
        let color = Color::ALL
            .into_iter()
            .find(|c| self.colors[c.index()].contains(sq))?;
        let piece = Piece::ALL
            .into_iter()
            .find(|p| self.pieces[p.index()].contains(sq))?;
        Some(ColoredPiece::new(color, piece))
    }

    /// The king square of `color`, absent only in hand-built test positions.
    pub fn king_square(&self, color: Color) -> Option<Square> {
        (self.colors[color.index()] & self.pieces[Piece::King.index()]).lsb()
    }

    #[inline]
    pub fn en_passant_vector(&self) -> Bitboard {
        self.en_passant
    }

    #[inline]
    pub fn en_passant_capture_vector(&self) -> Bitboard {
        self.en_passant_capture
    }

    /// Where a pawn lands when capturing en passant.
    #[inline]
    pub fn en_passant_square(&self) -> Option<Square> {
        self.en_passant.lsb()
    }

    /// Where the pawn that can be captured en passant stands.
    #[inline]
    pub fn en_passant_capture_square(&self) -> Option<Square> {
        self.en_passant_capture.lsb()
    }

    /// King targets of the castling moves still available.
    #[inline]
    pub fn castling_rights(&self) -> Bitboard {
        self.castling_rights
    }

    #[inline]
    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    #[inline]
    pub fn fullmove_number(&self) -> u32 {
        self.fullmove_number
    }

    /// Returns true if a piece of the side opposing `defender` attacks `sq`.
    pub fn is_square_under_attack(&self, sq: Square, defender: Color) -> bool {
        let c = &self.constants;
        let attackers = self.colors[defender.opposite().index()];
        let occupied = self.occupied();
        let pieces = |piece: Piece| self.pieces[piece.index()] & attackers;
        let straight = pieces(Piece::Rook) | pieces(Piece::Queen);
        let diagonal = pieces(Piece::Bishop) | pieces(Piece::Queen);

        c.pawn_captures(defender, sq).intersects(pieces(Piece::Pawn))
            || c.knight_moves(sq).intersects(pieces(Piece::Knight))
            || c.king_moves(sq).intersects(pieces(Piece::King))
            || (straight.is_not_empty() && c.straight_reach(sq, occupied).intersects(straight))
            || (diagonal.is_not_empty() && c.diagonal_reach(sq, occupied).intersects(diagonal))
    }

    /// Returns true if `color`'s king is attacked.
    pub fn is_in_check(&self, color: Color) -> bool {
        self.king_square(color)
            .is_some_and(|king| self.is_square_under_attack(king, color))
    }

    /// Returns true if the side to move is in check.
    #[inline]
    pub fn is_check(&self) -> bool {
        self.is_in_check(self.side_to_move)
    }

    /// Verifies that the bitboards describe a consistent position.
    pub fn check_invariants(&self) -> Result<(), PositionError> {
        let [white, black] = self.colors;
        if white.intersects(black) {
            return Err(PositionError::OverlappingColors);
        }

        let mut union = Bitboard::EMPTY;
        for piece in self.pieces {
            if union.intersects(piece) {
                return Err(PositionError::OverlappingPieces);
            }
            union |= piece;
        }
        if union != self.occupied() {
            return Err(PositionError::UnionMismatch);
        }

        for color in Color::ALL {
            let count = self.colored_piece_vector(ColoredPiece::new(color, Piece::King)).count();
            if count != 1 {
                return Err(PositionError::KingCount { color, count });
            }
        }

        let resting = self.side_to_move.opposite();
        if self.is_in_check(resting) {
            return Err(PositionError::OpponentInCheck(resting));
        }

        let stray_pawns = self.pieces[Piece::Pawn.index()] & self.constants.promotion_squares();
        if let Some(sq) = stray_pawns.lsb() {
            return Err(PositionError::PawnOnBackRank(sq));
        }

        for target in self.castling_rights {
            let at_home = self.constants.castling_rule(target).is_some_and(|rule| {
                let king = ColoredPiece::new(rule.color, Piece::King);
                let rook = ColoredPiece::new(rule.color, Piece::Rook);
                self.colored_piece(rule.king_source) == Some(king)
                    && self.colored_piece(rule.rook_source) == Some(rook)
            });
            if !at_home {
                return Err(PositionError::CastlingWithoutPieces(target));
            }
        }

        self.check_en_passant()
    }

    fn check_en_passant(&self) -> Result<(), PositionError> {
        let (Some(ep), Some(capture)) = (
            self.en_passant.single_square(),
            self.en_passant_capture.single_square(),
        ) else {
            return if self.en_passant.is_empty() && self.en_passant_capture.is_empty() {
                Ok(())
            } else {
                Err(PositionError::InconsistentEnPassant)
            };
        };

        let mover = self.side_to_move.opposite();
        let (expected_rank, forward) = match mover {
            Color::White => (Rank::R3, 8),
            Color::Black => (Rank::R6, -8),
        };
        // The double step went from `origin` over `ep` to `capture`.
        let ep_bb = Bitboard::from_square(ep);
        let origin = ep_bb.shifted(-forward);
        let consistent = ep.rank() == expected_rank
            && ep_bb.shifted(forward) == Bitboard::from_square(capture)
            && self.colored_piece(capture) == Some(ColoredPiece::new(mover, Piece::Pawn))
            && !self.occupied().intersects(ep_bb | origin);
        if consistent {
            Ok(())
        } else {
            Err(PositionError::InconsistentEnPassant)
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::initial()
    }
}

impl FromStr for Position {
    type Err = PositionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_fen(s)
    }
}

/// Positions compare by board state; the shared tables are not part of it.
impl PartialEq for Position {
    fn eq(&self, other: &Self) -> bool {
        self.side_to_move == other.side_to_move
            && self.colors == other.colors
            && self.pieces == other.pieces
            && self.en_passant == other.en_passant
            && self.en_passant_capture == other.en_passant_capture
            && self.castling_rights == other.castling_rights
            && self.halfmove_clock == other.halfmove_clock
            && self.fullmove_number == other.fullmove_number
    }
}

impl Eq for Position {}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Position").field(&self.to_fen()).finish()
    }
}

/// ASCII diagram with White at the bottom.
impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in Rank::ALL.into_iter().rev() {
            write!(f, "{} ", rank)?;
            for file in File::ALL {
                let symbol = self
                    .colored_piece(Square::new(file, rank))
                    .map_or('.', ColoredPiece::to_fen_char);
                write!(f, " {}", symbol)?;
            }
            writeln!(f)?;
        }
        write!(f, "  ")?;
        for file in File::ALL {
            write!(f, " {}", file)?;
        }
        writeln!(f)
    }
}
