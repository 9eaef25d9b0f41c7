//! Move requests and move check results.

use crate::{Piece, Square};
use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// The kind of move a caller declares when requesting a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum MoveType {
    /// Any move that is none of the special kinds below.
    #[default]
    Default = 0,
    /// Pawn advancing onto the last rank.
    Promotion = 1,
    /// Pawn capturing a pawn that just made a double step past it.
    EnPassant = 2,
    /// O-O-O.
    CastleQueenside = 3,
    /// O-O.
    CastleKingside = 4,
}

impl MoveType {
    /// Returns true for castling in either direction.
    #[inline]
    pub const fn is_castling(self) -> bool {
        matches!(self, MoveType::CastleQueenside | MoveType::CastleKingside)
    }
}

/// A request to move a piece, as constructed from user input.
///
/// `MoveInfo` carries no knowledge of the position; it is validated by the
/// rules engine, which reports what is wrong or missing with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MoveInfo {
    move_type: MoveType,
    source: Square,
    target: Square,
    promote_to: Option<Piece>,
}

impl MoveInfo {
    /// Creates a request for a move without special information.
    #[inline]
    pub const fn new(source: Square, target: Square) -> Self {
        MoveInfo {
            move_type: MoveType::Default,
            source,
            target,
            promote_to: None,
        }
    }

    /// Creates a request for a move of the given declared type.
    #[inline]
    pub const fn with_type(move_type: MoveType, source: Square, target: Square) -> Self {
        MoveInfo {
            move_type,
            source,
            target,
            promote_to: None,
        }
    }

    /// Creates a promotion request.
    #[inline]
    pub const fn promotion(source: Square, target: Square, promote_to: Piece) -> Self {
        MoveInfo {
            move_type: MoveType::Promotion,
            source,
            target,
            promote_to: Some(promote_to),
        }
    }

    /// Creates an en passant request.
    #[inline]
    pub const fn en_passant(source: Square, target: Square) -> Self {
        Self::with_type(MoveType::EnPassant, source, target)
    }

    /// Creates a castling request; the king's source and target squares identify the side.
    #[inline]
    pub const fn castle(move_type: MoveType, king_source: Square, king_target: Square) -> Self {
        Self::with_type(move_type, king_source, king_target)
    }

    #[inline]
    pub const fn move_type(&self) -> MoveType {
        self.move_type
    }

    #[inline]
    pub const fn source(&self) -> Square {
        self.source
    }

    #[inline]
    pub const fn target(&self) -> Square {
        self.target
    }

    /// The piece to promote to, if the caller supplied one.
    #[inline]
    pub const fn promote_to(&self) -> Option<Piece> {
        self.promote_to
    }

    /// Returns true if both requests describe the same move.
    ///
    /// The promotion piece only takes part in the comparison for promotions.
    pub fn same_move(&self, other: &MoveInfo) -> bool {
        self.source == other.source
            && self.target == other.target
            && self.move_type == other.move_type
            && (self.move_type != MoveType::Promotion || self.promote_to == other.promote_to)
    }
}

impl fmt::Display for MoveInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.source, self.target)?;
        if let Some(piece) = self.promote_to {
            write!(f, "{}", piece.to_fen_char(crate::Color::Black))?;
        }
        Ok(())
    }
}

/// The outcome of validating a [`MoveInfo`] against a position.
///
/// Reasons fall into two disjoint groups. Illegality reasons mean the move
/// cannot be played. Incompleteness reasons mean the move is legal but the
/// caller must supply more information before it can be committed.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct MoveCheckResult(u16);

impl MoveCheckResult {
    pub const OK: MoveCheckResult = MoveCheckResult(0);

    pub const SOURCE_SQUARE_IS_TARGET_SQUARE: MoveCheckResult = MoveCheckResult(1 << 0);
    pub const SOURCE_SQUARE_IS_EMPTY: MoveCheckResult = MoveCheckResult(1 << 1);
    pub const NOT_SIDE_TO_MOVE: MoveCheckResult = MoveCheckResult(1 << 2);
    pub const CANNOT_CAPTURE_OWN_PIECE: MoveCheckResult = MoveCheckResult(1 << 3);
    pub const ILLEGAL_TARGET_SQUARE: MoveCheckResult = MoveCheckResult(1 << 4);
    pub const ILLEGAL_MOVE_TYPE_PROMOTION: MoveCheckResult = MoveCheckResult(1 << 5);
    pub const ILLEGAL_MOVE_TYPE_EN_PASSANT: MoveCheckResult = MoveCheckResult(1 << 6);
    pub const ILLEGAL_MOVE_TYPE_CASTLE_QUEENSIDE: MoveCheckResult = MoveCheckResult(1 << 7);
    pub const ILLEGAL_MOVE_TYPE_CASTLE_KINGSIDE: MoveCheckResult = MoveCheckResult(1 << 8);
    pub const FRIENDLY_KING_IN_CHECK: MoveCheckResult = MoveCheckResult(1 << 9);

    pub const MISSING_PROMOTION_INFORMATION: MoveCheckResult = MoveCheckResult(1 << 10);
    pub const MISSING_EN_PASSANT: MoveCheckResult = MoveCheckResult(1 << 11);
    pub const MISSING_CASTLE_QUEENSIDE: MoveCheckResult = MoveCheckResult(1 << 12);
    pub const MISSING_CASTLE_KINGSIDE: MoveCheckResult = MoveCheckResult(1 << 13);

    /// Every illegality reason.
    pub const ILLEGAL_MASK: MoveCheckResult = MoveCheckResult(0b11_1111_1111);

    /// Every incompleteness reason.
    pub const INCOMPLETE_MASK: MoveCheckResult = MoveCheckResult(0b1111 << 10);

    const NAMES: [(MoveCheckResult, &'static str); 14] = [
        (Self::SOURCE_SQUARE_IS_TARGET_SQUARE, "source square is target square"),
        (Self::SOURCE_SQUARE_IS_EMPTY, "source square is empty"),
        (Self::NOT_SIDE_TO_MOVE, "not side to move"),
        (Self::CANNOT_CAPTURE_OWN_PIECE, "cannot capture own piece"),
        (Self::ILLEGAL_TARGET_SQUARE, "illegal target square"),
        (Self::ILLEGAL_MOVE_TYPE_PROMOTION, "move is not a promotion"),
        (Self::ILLEGAL_MOVE_TYPE_EN_PASSANT, "move is not en passant"),
        (Self::ILLEGAL_MOVE_TYPE_CASTLE_QUEENSIDE, "move is not queenside castling"),
        (Self::ILLEGAL_MOVE_TYPE_CASTLE_KINGSIDE, "move is not kingside castling"),
        (Self::FRIENDLY_KING_IN_CHECK, "friendly king in check"),
        (Self::MISSING_PROMOTION_INFORMATION, "missing promotion piece"),
        (Self::MISSING_EN_PASSANT, "missing en passant"),
        (Self::MISSING_CASTLE_QUEENSIDE, "missing queenside castling"),
        (Self::MISSING_CASTLE_KINGSIDE, "missing kingside castling"),
    ];

    /// The illegality reason for declaring `move_type` when the move is something else.
    #[inline]
    pub const fn illegal_move_type(move_type: MoveType) -> MoveCheckResult {
        match move_type {
            MoveType::Default => Self::OK,
            MoveType::Promotion => Self::ILLEGAL_MOVE_TYPE_PROMOTION,
            MoveType::EnPassant => Self::ILLEGAL_MOVE_TYPE_EN_PASSANT,
            MoveType::CastleQueenside => Self::ILLEGAL_MOVE_TYPE_CASTLE_QUEENSIDE,
            MoveType::CastleKingside => Self::ILLEGAL_MOVE_TYPE_CASTLE_KINGSIDE,
        }
    }

    /// The incompleteness reason for a move that is `move_type` but was declared as default.
    #[inline]
    pub const fn missing(move_type: MoveType) -> MoveCheckResult {
        match move_type {
            MoveType::Default => Self::OK,
            MoveType::Promotion => Self::MISSING_PROMOTION_INFORMATION,
            MoveType::EnPassant => Self::MISSING_EN_PASSANT,
            MoveType::CastleQueenside => Self::MISSING_CASTLE_QUEENSIDE,
            MoveType::CastleKingside => Self::MISSING_CASTLE_KINGSIDE,
        }
    }

    /// Returns true if no reason at all is set.
    #[inline]
    pub const fn is_ok(self) -> bool {
        self.0 == 0
    }

    /// Returns true if no illegality reason is set. The move may still be incomplete.
    #[inline]
    pub const fn is_legal_move(self) -> bool {
        self.0 & Self::ILLEGAL_MASK.0 == 0
    }

    /// Returns true if any incompleteness reason is set.
    #[inline]
    pub const fn is_incomplete(self) -> bool {
        self.0 & Self::INCOMPLETE_MASK.0 != 0
    }

    /// Returns true if every reason in `other` is also set in `self`.
    #[inline]
    pub const fn contains(self, other: MoveCheckResult) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns true if `self` and `other` share a reason.
    #[inline]
    pub const fn intersects(self, other: MoveCheckResult) -> bool {
        self.0 & other.0 != 0
    }

    #[inline]
    pub fn insert(&mut self, other: MoveCheckResult) {
        self.0 |= other.0;
    }

    #[inline]
    pub fn remove(&mut self, other: MoveCheckResult) {
        self.0 &= !other.0;
    }

    /// Returns the raw bits.
    #[inline]
    pub const fn bits(self) -> u16 {
        self.0
    }

    /// Iterates over the human-readable names of the reasons that are set.
    pub fn reasons(self) -> impl Iterator<Item = &'static str> {
        Self::NAMES
            .into_iter()
            .filter(move |(flag, _)| self.contains(*flag))
            .map(|(_, name)| name)
    }
}

impl BitOr for MoveCheckResult {
    type Output = Self;

    #[inline]
    fn bitor(self, rhs: Self) -> Self::Output {
        MoveCheckResult(self.0 | rhs.0)
    }
}

impl BitOrAssign for MoveCheckResult {
    #[inline]
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for MoveCheckResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MoveCheckResult({})", self)
    }
}

impl fmt::Display for MoveCheckResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_ok() {
            return write!(f, "ok");
        }
        let reasons: Vec<&str> = self.reasons().collect();
        write!(f, "{}", reasons.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_are_disjoint_and_cover_all_reasons() {
        assert_eq!(
            MoveCheckResult::ILLEGAL_MASK.bits() & MoveCheckResult::INCOMPLETE_MASK.bits(),
            0
        );
        let all = MoveCheckResult::NAMES
            .iter()
            .fold(MoveCheckResult::OK, |acc, (flag, _)| acc | *flag);
        assert_eq!(
            all,
            MoveCheckResult::ILLEGAL_MASK | MoveCheckResult::INCOMPLETE_MASK
        );
    }

    #[test]
    fn legal_but_incomplete() {
        let result = MoveCheckResult::MISSING_PROMOTION_INFORMATION;
        assert!(result.is_legal_move());
        assert!(result.is_incomplete());
        assert!(!result.is_ok());
    }

    #[test]
    fn illegal_reasons_are_not_legal() {
        let result = MoveCheckResult::NOT_SIDE_TO_MOVE | MoveCheckResult::MISSING_EN_PASSANT;
        assert!(!result.is_legal_move());
        assert!(result.is_incomplete());
        assert!(result.contains(MoveCheckResult::NOT_SIDE_TO_MOVE));
    }

    #[test]
    fn insert_and_remove() {
        let mut result = MoveCheckResult::OK;
        result.insert(MoveCheckResult::illegal_move_type(MoveType::CastleKingside));
        assert_eq!(result, MoveCheckResult::ILLEGAL_MOVE_TYPE_CASTLE_KINGSIDE);
        result.remove(MoveCheckResult::ILLEGAL_MOVE_TYPE_CASTLE_KINGSIDE);
        assert!(result.is_ok());
    }

    #[test]
    fn default_type_maps_to_no_reason() {
        assert!(MoveCheckResult::illegal_move_type(MoveType::Default).is_ok());
        assert!(MoveCheckResult::missing(MoveType::Default).is_ok());
        assert_eq!(
            MoveCheckResult::missing(MoveType::EnPassant),
            MoveCheckResult::MISSING_EN_PASSANT
        );
    }

    #[test]
    fn display_lists_reasons() {
        assert_eq!(MoveCheckResult::OK.to_string(), "ok");
        let result = MoveCheckResult::SOURCE_SQUARE_IS_EMPTY
            | MoveCheckResult::SOURCE_SQUARE_IS_TARGET_SQUARE;
        assert_eq!(
            result.to_string(),
            "source square is target square, source square is empty"
        );
    }

    #[test]
    fn same_move_ignores_promotion_piece_for_non_promotions() {
        let a = MoveInfo::new(Square::E2, Square::E4);
        let b = MoveInfo::new(Square::E2, Square::E4);
        assert!(a.same_move(&b));

        let q = MoveInfo::promotion(Square::E7, Square::E8, Piece::Queen);
        let n = MoveInfo::promotion(Square::E7, Square::E8, Piece::Knight);
        assert!(!q.same_move(&n));
        assert!(!q.same_move(&MoveInfo::new(Square::E7, Square::E8)));
    }

    #[test]
    fn move_info_display() {
        assert_eq!(MoveInfo::new(Square::G1, Square::F3).to_string(), "g1f3");
        assert_eq!(
            MoveInfo::promotion(Square::A7, Square::A8, Piece::Queen).to_string(),
            "a7a8q"
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn move_info_serde_roundtrip() {
        let info = MoveInfo::promotion(Square::B7, Square::B8, Piece::Rook);
        let json = serde_json::to_string(&info).unwrap();
        let back: MoveInfo = serde_json::from_str(&json).unwrap();
        assert_eq!(info, back);
        assert!(serde_json::from_str::<Square>("64").is_err());
    }
}
