//! Validated moves.

use chess_core::{MoveCheckResult, MoveInfo, MoveType, Piece, Square};
use std::fmt;

/// A [`MoveInfo`] together with what the position made of it.
///
/// Moves are only produced by [`Position::try_make_move`](crate::Position::try_make_move);
/// the `result` says whether the request was legal, complete, or neither.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Move {
    info: MoveInfo,
    moving_piece: Option<Piece>,
    captured_piece: Option<Piece>,
    result: MoveCheckResult,
}

impl Move {
    pub(crate) const fn new(
        info: MoveInfo,
        moving_piece: Option<Piece>,
        captured_piece: Option<Piece>,
        result: MoveCheckResult,
    ) -> Self {
        Move {
            info,
            moving_piece,
            captured_piece,
            result,
        }
    }

    /// The request this move was validated from.
    #[inline]
    pub const fn info(&self) -> MoveInfo {
        self.info
    }

    #[inline]
    pub const fn move_type(&self) -> MoveType {
        self.info.move_type()
    }

    #[inline]
    pub const fn source(&self) -> Square {
        self.info.source()
    }

    #[inline]
    pub const fn target(&self) -> Square {
        self.info.target()
    }

    #[inline]
    pub const fn promote_to(&self) -> Option<Piece> {
        self.info.promote_to()
    }

    /// The piece on the source square, or `None` if it was empty.
    #[inline]
    pub const fn moving_piece(&self) -> Option<Piece> {
        self.moving_piece
    }

    #[inline]
    pub const fn is_capture(&self) -> bool {
        self.captured_piece.is_some()
    }

    /// The captured piece; a pawn for en passant even though the target is empty.
    #[inline]
    pub const fn captured_piece(&self) -> Option<Piece> {
        self.captured_piece
    }

    #[inline]
    pub const fn result(&self) -> MoveCheckResult {
        self.result
    }

    /// Legal and complete: the move can be committed as requested.
    #[inline]
    pub const fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    /// Compares the requests, ignoring the validation result.
    #[inline]
    pub fn same_move(&self, other: &Move) -> bool {
        self.info.same_move(&other.info)
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.info, f)
    }
}
