//! Legal move generation.
//!
//! Moves are generated by asking [`Position::check_move`] about every
//! candidate target of every piece of the side to move. Candidates that come
//! back legal but incomplete are re-issued with the information they lack, so
//! the generator and the validator can never disagree.

pub mod perft;

use crate::{Bitboard, Move, Position};
use chess_core::{MoveCheckResult, MoveInfo, MoveType, Piece, Square};
use std::ops::ControlFlow;

impl Position {
    /// Every legal and complete move of the side to move.
    ///
    /// Promotions appear once per promotion piece.
    pub fn legal_moves(&self) -> Vec<Move> {
        let mut moves = Vec::with_capacity(48);
        let _ = self.visit_legal_moves(|mv| {
            moves.push(mv);
            ControlFlow::<()>::Continue(())
        });
        moves
    }

    /// Returns true if the side to move has at least one legal move.
    pub fn has_legal_move(&self) -> bool {
        self.visit_legal_moves(|_| ControlFlow::Break(())).is_break()
    }

    /// The side to move is in check and cannot get out of it.
    pub fn is_checkmate(&self) -> bool {
        self.is_check() && !self.has_legal_move()
    }

    /// The side to move is not in check but has no legal move.
    pub fn is_stalemate(&self) -> bool {
        !self.is_check() && !self.has_legal_move()
    }

    /// Legal moves of the piece on `source`.
    pub fn legal_moves_from(&self, source: Square) -> Vec<Move> {
        let mut moves = Vec::new();
        let _ = self.visit_moves_from(source, &mut |mv| {
            moves.push(mv);
            ControlFlow::<()>::Continue(())
        });
        moves
    }

    fn visit_legal_moves<B>(&self, mut visit: impl FnMut(Move) -> ControlFlow<B>) -> ControlFlow<B> {
        for source in self.colors[self.side_to_move.index()] {
            self.visit_moves_from(source, &mut visit)?;
        }
        ControlFlow::Continue(())
    }

    fn visit_moves_from<B>(
        &self,
        source: Square,
        visit: &mut impl FnMut(Move) -> ControlFlow<B>,
    ) -> ControlFlow<B> {
        for target in self.candidate_targets(source) {
            let mv = self.check_move(MoveInfo::new(source, target));
            if mv.is_ok() {
                visit(mv)?;
                continue;
            }
            let result = mv.result();
            if !result.is_legal_move() {
                continue;
            }
            if result.contains(MoveCheckResult::MISSING_PROMOTION_INFORMATION) {
                for piece in Piece::PROMOTIONS {
                    let mv = self.check_move(MoveInfo::promotion(source, target, piece));
                    if mv.is_ok() {
                        visit(mv)?;
                    }
                }
                continue;
            }
            let completed = [
                (MoveCheckResult::MISSING_EN_PASSANT, MoveType::EnPassant),
                (MoveCheckResult::MISSING_CASTLE_QUEENSIDE, MoveType::CastleQueenside),
                (MoveCheckResult::MISSING_CASTLE_KINGSIDE, MoveType::CastleKingside),
            ]
            .into_iter()
            .find(|(missing, _)| result.contains(*missing));
            if let Some((_, move_type)) = completed {
                let mv = self.check_move(MoveInfo::with_type(move_type, source, target));
                if mv.is_ok() {
                    visit(mv)?;
                }
            }
        }
        ControlFlow::Continue(())
    }

    /// A superset of the squares the piece on `source` may move to, used to
    /// keep the number of validation calls small.
    fn candidate_targets(&self, source: Square) -> Bitboard {
        let Some(mover) = self.colored_piece(source) else {
            return Bitboard::EMPTY;
        };
        let c = &self.constants;
        let occupied = self.occupied();
        let targets = match mover.piece {
            Piece::Pawn => c.pawn_moves(mover.color, source) | c.pawn_captures(mover.color, source),
            Piece::Knight => c.knight_moves(source),
            Piece::Bishop => c.diagonal_reach(source, occupied),
            Piece::Rook => c.straight_reach(source, occupied),
            Piece::Queen => c.straight_reach(source, occupied) | c.diagonal_reach(source, occupied),
            Piece::King => c.king_moves(source) | self.castling_rights,
        };
        targets & !self.colors[mover.color.index()]
    }
}
