//! Move validation and application.

use crate::constants::CastlingRule;
use crate::{Bitboard, Move, Position};
use chess_core::{Color, MoveCheckResult, MoveInfo, MoveType, Piece, Square};
use tracing::{debug, trace};

/// Board changes a validated move makes, before any bookkeeping.
#[derive(Clone, Copy, Debug)]
struct Transition {
    color: Color,
    piece: Piece,
    /// Piece standing on the target afterwards; differs from `piece` on promotion.
    landed: Piece,
    source: Square,
    target: Square,
    capture: Option<(Square, Piece)>,
    castling: Option<&'static CastlingRule>,
}

impl Position {
    /// Validates `info` and, if `commit` is set and the move is legal and
    /// complete, plays it.
    ///
    /// The returned [`Move`] carries every reason the request is illegal or
    /// incomplete. Unless the move is committed the position is left untouched.
    pub fn try_make_move(&mut self, info: MoveInfo, commit: bool) -> Move {
        let (mv, next) = self.evaluate(info);
        match next {
            Some((mut next, transition)) if commit && mv.is_ok() => {
                next.finish(&transition);
                debug_assert!(
                    next.check_invariants().is_ok(),
                    "invariants broken after {info}: {:?}",
                    next.check_invariants()
                );
                *self = next;
                debug!(mv = %info, side_to_move = %self.side_to_move, "move committed");
            }
            _ if !mv.is_ok() => trace!(mv = %info, result = %mv.result(), "move rejected"),
            _ => {}
        }
        mv
    }

    /// Validates `info` without playing it.
    pub fn check_move(&self, info: MoveInfo) -> Move {
        self.evaluate(info).0
    }

    /// Validates `info` and, when it is legal, returns the position with the
    /// pieces already moved.
    fn evaluate(&self, info: MoveInfo) -> (Move, Option<(Position, Transition)>) {
        let source = info.source();
        let target = info.target();
        let mut result = MoveCheckResult::OK;

        if source == target {
            result |= MoveCheckResult::SOURCE_SQUARE_IS_TARGET_SQUARE;
        }
        let Some(mover) = self.colored_piece(source) else {
            result |= MoveCheckResult::SOURCE_SQUARE_IS_EMPTY;
            return (Move::new(info, None, None, result), None);
        };
        if mover.color != self.side_to_move {
            result |= MoveCheckResult::NOT_SIDE_TO_MOVE;
            return (Move::new(info, Some(mover.piece), None, result), None);
        }

        let us = mover.color;
        let own = self.colors[us.index()];
        let enemy = self.colors[us.opposite().index()];
        let occupied = own | enemy;
        let c = &self.constants;

        if own.contains(target) {
            result |= MoveCheckResult::CANNOT_CAPTURE_OWN_PIECE;
        }

        let mut implied = MoveType::Default;
        let mut capture = self
            .colored_piece(target)
            .filter(|cp| cp.color != us)
            .map(|cp| (target, cp.piece));
        let mut castling = None;

        let reachable = match mover.piece {
            Piece::Pawn => {
                let captures = (enemy & c.pawn_captures(us, source))
                    | (self.en_passant & c.en_passant_targets(us, source));
                let pushes = !occupied & c.pawn_moves(us, source) & c.straight_reach(source, occupied);
                if self.en_passant.contains(target) && captures.contains(target) {
                    implied = MoveType::EnPassant;
                    capture = self
                        .en_passant_capture_square()
                        .map(|sq| (sq, Piece::Pawn));
                } else if c.promotion_squares().contains(target) {
                    implied = MoveType::Promotion;
                }
                captures | pushes
            }
            Piece::Knight => c.knight_moves(source),
            Piece::Bishop => c.diagonal_reach(source, occupied),
            Piece::Rook => c.straight_reach(source, occupied),
            Piece::Queen => c.straight_reach(source, occupied) | c.diagonal_reach(source, occupied),
            Piece::King => {
                let steps = c.king_moves(source);
                if !steps.contains(target) {
                    if let Some(rule) = self.castling_rule_for(us, source, target, occupied) {
                        implied = rule.move_type;
                        castling = Some(rule);
                        if self.is_square_under_attack(source, us)
                            || self.is_square_under_attack(rule.king_transit, us)
                        {
                            result |= MoveCheckResult::FRIENDLY_KING_IN_CHECK;
                        }
                    }
                }
                match castling {
                    Some(rule) => steps | Bitboard::from_square(rule.king_target),
                    None => steps,
                }
            }
        };
        if !reachable.contains(target) {
            result |= MoveCheckResult::ILLEGAL_TARGET_SQUARE;
            implied = MoveType::Default;
        }

        let declared = info.move_type();
        if declared != implied {
            if declared == MoveType::Default {
                result |= MoveCheckResult::missing(implied);
            } else {
                result |= MoveCheckResult::illegal_move_type(declared);
            }
        } else if implied == MoveType::Promotion
            && !info.promote_to().is_some_and(Piece::is_promotion_target)
        {
            result |= MoveCheckResult::MISSING_PROMOTION_INFORMATION;
        }

        let captured_piece = capture.map(|(_, piece)| piece);
        if !result.is_legal_move() {
            return (Move::new(info, Some(mover.piece), captured_piece, result), None);
        }

        let landed = match implied {
            MoveType::Promotion => info
                .promote_to()
                .filter(|piece| piece.is_promotion_target())
                .unwrap_or(Piece::Queen),
            _ => mover.piece,
        };
        let transition = Transition {
            color: us,
            piece: mover.piece,
            landed,
            source,
            target,
            capture,
            castling,
        };

        let mut next = self.clone();
        next.relocate(&transition);
        if next.is_in_check(us) {
            result |= MoveCheckResult::FRIENDLY_KING_IN_CHECK;
            return (Move::new(info, Some(mover.piece), captured_piece, result), None);
        }

        (
            Move::new(info, Some(mover.piece), captured_piece, result),
            Some((next, transition)),
        )
    }

    /// The castling move a king on `source` makes by landing on `target`, if
    /// it is still available and nothing stands between king and rook.
    fn castling_rule_for(
        &self,
        us: Color,
        source: Square,
        target: Square,
        occupied: Bitboard,
    ) -> Option<&'static CastlingRule> {
        let rule = self.constants.castling_rule(target)?;
        let available = rule.color == us
            && rule.king_source == source
            && self.castling_rights.contains(target)
            && (self.castling_rights & Bitboard::rank(us.back_rank())).contains(target);
        let clear = self
            .constants
            .straight_reach(source, occupied)
            .contains(rule.rook_source);
        (available && clear).then_some(rule)
    }

    fn relocate(&mut self, t: &Transition) {
        if let Some((sq, piece)) = t.capture {
            self.toggle(t.color.opposite(), piece, sq);
        }
        self.toggle(t.color, t.piece, t.source);
        self.toggle(t.color, t.landed, t.target);
        if let Some(rule) = t.castling {
            let delta = rule.rook_delta();
            self.colors[t.color.index()] ^= delta;
            self.pieces[Piece::Rook.index()] ^= delta;
        }
    }

    /// Updates en passant state, castling rights, clocks and the side to move.
    fn finish(&mut self, t: &Transition) {
        let c = &self.constants;

        let (en_passant, en_passant_capture) =
            if t.piece == Piece::Pawn && c.pawn_double_push(t.color, t.source).contains(t.target) {
                let between = (t.source.index() + t.target.index()) / 2;
                (
                    Square::ALL[between as usize].into(),
                    Bitboard::from_square(t.target),
                )
            } else {
                (Bitboard::EMPTY, Bitboard::EMPTY)
            };

        let mut revoked = c.castling_revocations(t.source) | c.castling_revocations(t.target);
        if let Some((sq, _)) = t.capture {
            revoked |= c.castling_revocations(sq);
        }

        self.en_passant = en_passant;
        self.en_passant_capture = en_passant_capture;
        self.castling_rights &= !revoked;
        if t.piece == Piece::Pawn || t.capture.is_some() {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock = self.halfmove_clock.saturating_add(1);
        }
        // FEN allows any u32 for both counters, so they stop at the maximum.
        if t.color == Color::Black {
            self.fullmove_number = self.fullmove_number.saturating_add(1);
        }
        self.side_to_move = t.color.opposite();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn play(position: &mut Position, info: MoveInfo) -> Move {
        let mv = position.try_make_move(info, true);
        assert!(mv.is_ok(), "{info}: {}", mv.result());
        mv
    }

    #[test]
    fn basic_flags_return_early() {
        let mut position = Position::initial();
        let mv = position.try_make_move(MoveInfo::new(Square::E4, Square::E5), true);
        assert_eq!(mv.result(), MoveCheckResult::SOURCE_SQUARE_IS_EMPTY);
        assert_eq!(mv.moving_piece(), None);

        let mv = position.try_make_move(MoveInfo::new(Square::E7, Square::E5), true);
        assert_eq!(mv.result(), MoveCheckResult::NOT_SIDE_TO_MOVE);
        assert_eq!(mv.moving_piece(), Some(Piece::Pawn));

        let mv = position.try_make_move(MoveInfo::new(Square::E3, Square::E3), true);
        assert_eq!(
            mv.result(),
            MoveCheckResult::SOURCE_SQUARE_IS_TARGET_SQUARE | MoveCheckResult::SOURCE_SQUARE_IS_EMPTY
        );
    }

    #[test]
    fn own_piece_and_illegal_target() {
        let position = Position::initial();
        let mv = position.check_move(MoveInfo::new(Square::A1, Square::A2));
        assert_eq!(mv.result(), MoveCheckResult::CANNOT_CAPTURE_OWN_PIECE);

        let mv = position.check_move(MoveInfo::new(Square::D1, Square::D4));
        assert_eq!(mv.result(), MoveCheckResult::ILLEGAL_TARGET_SQUARE);

        let mv = position.check_move(MoveInfo::new(Square::G1, Square::G3));
        assert_eq!(mv.result(), MoveCheckResult::ILLEGAL_TARGET_SQUARE);

        let mv = position.check_move(MoveInfo::new(Square::E2, Square::E5));
        assert_eq!(mv.result(), MoveCheckResult::ILLEGAL_TARGET_SQUARE);
    }

    #[test]
    fn double_step_sets_en_passant_vectors() {
        let mut position = Position::initial();
        play(&mut position, MoveInfo::new(Square::E2, Square::E4));
        assert_eq!(position.en_passant_square(), Some(Square::E3));
        assert_eq!(position.en_passant_capture_square(), Some(Square::E4));

        play(&mut position, MoveInfo::new(Square::G8, Square::F6));
        assert_eq!(position.en_passant_vector(), Bitboard::EMPTY);
        assert_eq!(position.en_passant_capture_vector(), Bitboard::EMPTY);
    }

    #[test]
    fn en_passant_capture() {
        let mut position =
            Position::from_fen("rnbqkbnr/ppp1pppp/8/3pP3/8/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 3").unwrap();

        let mv = position.check_move(MoveInfo::new(Square::E5, Square::D6));
        assert_eq!(mv.result(), MoveCheckResult::MISSING_EN_PASSANT);
        assert!(mv.result().is_legal_move());

        let mv = play(&mut position, MoveInfo::en_passant(Square::E5, Square::D6));
        assert_eq!(mv.captured_piece(), Some(Piece::Pawn));
        assert!(mv.is_capture());
        assert_eq!(position.colored_piece(Square::D5), None);
        assert_eq!(position.halfmove_clock(), 0);
    }

    #[test]
    fn declared_type_must_match_geometry() {
        let position = Position::initial();
        let mv = position.check_move(MoveInfo::en_passant(Square::E2, Square::E4));
        assert_eq!(mv.result(), MoveCheckResult::ILLEGAL_MOVE_TYPE_EN_PASSANT);
        let mv = position.check_move(MoveInfo::promotion(Square::E2, Square::E4, Piece::Queen));
        assert_eq!(mv.result(), MoveCheckResult::ILLEGAL_MOVE_TYPE_PROMOTION);
        let mv = position.check_move(MoveInfo::castle(MoveType::CastleKingside, Square::E1, Square::G1));
        assert!(mv.result().contains(MoveCheckResult::ILLEGAL_MOVE_TYPE_CASTLE_KINGSIDE));
        assert!(mv.result().contains(MoveCheckResult::ILLEGAL_TARGET_SQUARE));
    }

    #[test]
    fn promotion_needs_a_piece() {
        let mut position = Position::from_fen("8/P6k/8/8/8/8/8/K7 w - - 0 1").unwrap();

        let mv = position.try_make_move(MoveInfo::new(Square::A7, Square::A8), true);
        assert_eq!(mv.result(), MoveCheckResult::MISSING_PROMOTION_INFORMATION);
        assert_eq!(position.colored_piece(Square::A7).map(|cp| cp.piece), Some(Piece::Pawn));

        let mv = position.check_move(MoveInfo::promotion(Square::A7, Square::A8, Piece::King));
        assert_eq!(mv.result(), MoveCheckResult::MISSING_PROMOTION_INFORMATION);

        play(&mut position, MoveInfo::promotion(Square::A7, Square::A8, Piece::Knight));
        assert_eq!(position.colored_piece(Square::A8).map(|cp| cp.piece), Some(Piece::Knight));
        assert_eq!(position.piece_vector(Piece::Pawn), Bitboard::EMPTY);
    }

    #[test]
    fn pinned_piece_cannot_move() {
        // White knight on e2 is pinned by the rook on e8.
        let position = Position::from_fen("4r2k/8/8/8/8/8/4N3/4K3 w - - 0 1").unwrap();
        let before = position.clone();
        let mv = position.check_move(MoveInfo::new(Square::E2, Square::C3));
        assert_eq!(mv.result(), MoveCheckResult::FRIENDLY_KING_IN_CHECK);
        assert_eq!(position, before);
    }

    #[test]
    fn kingside_castling_moves_rook_and_revokes_rights() {
        let mut position = Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        let mv = position.check_move(MoveInfo::new(Square::E1, Square::G1));
        assert_eq!(mv.result(), MoveCheckResult::MISSING_CASTLE_KINGSIDE);

        play(
            &mut position,
            MoveInfo::castle(MoveType::CastleKingside, Square::E1, Square::G1),
        );
        assert_eq!(position.colored_piece(Square::G1).map(|cp| cp.piece), Some(Piece::King));
        assert_eq!(position.colored_piece(Square::F1).map(|cp| cp.piece), Some(Piece::Rook));
        assert_eq!(position.colored_piece(Square::H1), None);
        assert!(!position.castling_rights().contains(Square::G1));
        assert!(!position.castling_rights().contains(Square::C1));
        assert!(position.castling_rights().contains(Square::G8));
        assert!(position.castling_rights().contains(Square::C8));
    }

    #[test]
    fn castling_through_attack_is_refused() {
        // Black rook on f8 covers f1.
        let mut position = Position::from_fen("4kr2/8/8/8/8/8/8/R3K2R w KQ - 0 1").unwrap();
        let before = position.clone();
        let mv = position.try_make_move(
            MoveInfo::castle(MoveType::CastleKingside, Square::E1, Square::G1),
            true,
        );
        assert_eq!(mv.result(), MoveCheckResult::FRIENDLY_KING_IN_CHECK);
        assert_eq!(position, before);

        // Queenside is still fine.
        play(
            &mut position,
            MoveInfo::castle(MoveType::CastleQueenside, Square::E1, Square::C1),
        );
        assert_eq!(position.colored_piece(Square::D1).map(|cp| cp.piece), Some(Piece::Rook));
    }

    #[test]
    fn castling_out_of_check_is_refused() {
        // Black rook on e8 attacks the king on e1.
        let mut position = Position::from_fen("4r1k1/8/8/8/8/8/8/R3K2R w KQ - 0 1").unwrap();
        let before = position.clone();
        for (move_type, target) in [
            (MoveType::CastleKingside, Square::G1),
            (MoveType::CastleQueenside, Square::C1),
        ] {
            let mv = position.try_make_move(MoveInfo::castle(move_type, Square::E1, target), true);
            assert_eq!(mv.result(), MoveCheckResult::FRIENDLY_KING_IN_CHECK);
            assert_eq!(position, before);
        }
    }

    #[test]
    fn clocks_stop_at_maximum() {
        let mut position = Position::from_fen("4k3/8/8/8/8/8/8/4K1N1 w - - 4294967295 1").unwrap();
        play(&mut position, MoveInfo::new(Square::G1, Square::F3));
        assert_eq!(position.halfmove_clock(), u32::MAX);
        assert_eq!(position.fullmove_number(), 1);

        let mut position = Position::from_fen("4k1n1/8/8/8/8/8/8/4K3 b - - 0 4294967295").unwrap();
        play(&mut position, MoveInfo::new(Square::G8, Square::F6));
        assert_eq!(position.fullmove_number(), u32::MAX);
        assert_eq!(position.halfmove_clock(), 1);
        assert_eq!(position.side_to_move(), Color::White);
    }

    #[test]
    fn castling_blocked_by_piece() {
        let position = Position::from_fen("4k3/8/8/8/8/8/8/RN2K2R w KQ - 0 1").unwrap();
        let mv = position.check_move(MoveInfo::castle(
            MoveType::CastleQueenside,
            Square::E1,
            Square::C1,
        ));
        assert!(mv.result().contains(MoveCheckResult::ILLEGAL_TARGET_SQUARE));
    }

    #[test]
    fn capturing_home_rook_revokes_opponent_right() {
        let mut position = Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        let mv = play(&mut position, MoveInfo::new(Square::H1, Square::H8));
        assert_eq!(mv.captured_piece(), Some(Piece::Rook));
        assert_eq!(
            position.castling_rights(),
            Bitboard::from_square(Square::C1) | Bitboard::from_square(Square::C8)
        );
    }

    #[test]
    fn clocks_advance() {
        let mut position = Position::initial();
        play(&mut position, MoveInfo::new(Square::G1, Square::F3));
        assert_eq!(position.halfmove_clock(), 1);
        assert_eq!(position.fullmove_number(), 1);
        play(&mut position, MoveInfo::new(Square::G8, Square::F6));
        assert_eq!(position.halfmove_clock(), 2);
        assert_eq!(position.fullmove_number(), 2);
        play(&mut position, MoveInfo::new(Square::E2, Square::E4));
        assert_eq!(position.halfmove_clock(), 0);
    }

    proptest! {
        #[test]
        fn uncommitted_moves_leave_position_untouched(
            source in 0u8..64,
            target in 0u8..64,
            kind in 0usize..5,
            promote in 0usize..6,
        ) {
            let kinds = [
                MoveType::Default,
                MoveType::Promotion,
                MoveType::EnPassant,
                MoveType::CastleQueenside,
                MoveType::CastleKingside,
            ];
            let source = Square::ALL[source as usize];
            let target = Square::ALL[target as usize];
            let info = match kinds[kind] {
                MoveType::Promotion => MoveInfo::promotion(source, target, Piece::ALL[promote]),
                other => MoveInfo::with_type(other, source, target),
            };
            let mut position = Position::from_fen(
                "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
            )
            .unwrap();
            let before = position.clone();
            position.try_make_move(info, false);
            prop_assert_eq!(position, before);
        }
    }
}
