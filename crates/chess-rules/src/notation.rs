//! Algebraic move notation.
//!
//! Formatting plays the move: the text of a move depends on the position
//! before it (disambiguation) and after it (check and mate marks), and the
//! text of the next move assumes this one has been made.
//!
//! Examples: "e4", "Nf3", "exd6", "Nbd2", "R1a3", "O-O", "a8=Q", "Qh4#" in
//! short form; "e2-e4", "Ng1-f3", "e5xd6" in long form.

use crate::{Game, Move, Position};
use chess_core::{Color, File, MoveCheckResult, MoveInfo, MoveType, Piece, Rank, Square};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NotationError {
    #[error("cannot format {mv}: {result}")]
    NotPlayable { mv: MoveInfo, result: MoveCheckResult },

    #[error("empty move text")]
    Empty,

    #[error("malformed move text: {0}")]
    Malformed(String),

    #[error("no legal move matches {0}")]
    NoMatch(String),

    #[error("{0} matches more than one legal move")]
    Ambiguous(String),

    #[error("invalid piece symbols: {0}")]
    InvalidSymbols(String),
}

/// Letters used for the pieces in move text. Pawns have none.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct PieceSymbols {
    pub knight: char,
    pub bishop: char,
    pub rook: char,
    pub queen: char,
    pub king: char,
}

impl Default for PieceSymbols {
    fn default() -> Self {
        PieceSymbols {
            knight: 'N',
            bishop: 'B',
            rook: 'R',
            queen: 'Q',
            king: 'K',
        }
    }
}

impl PieceSymbols {
    pub fn new(
        knight: char,
        bishop: char,
        rook: char,
        queen: char,
        king: char,
    ) -> Result<Self, NotationError> {
        let symbols = PieceSymbols {
            knight,
            bishop,
            rook,
            queen,
            king,
        };
        symbols.validate()?;
        Ok(symbols)
    }

    /// Symbols must be distinct capital letters; lower case belongs to files
    /// and to the capture mark.
    pub fn validate(&self) -> Result<(), NotationError> {
        let letters = [self.knight, self.bishop, self.rook, self.queen, self.king];
        for (i, c) in letters.iter().enumerate() {
            if !c.is_alphabetic() || c.is_lowercase() {
                return Err(NotationError::InvalidSymbols(format!("'{c}' cannot name a piece")));
            }
            if letters[..i].contains(c) {
                return Err(NotationError::InvalidSymbols(format!("'{c}' names more than one piece")));
            }
        }
        Ok(())
    }

    pub fn letter(&self, piece: Piece) -> Option<char> {
        match piece {
            Piece::Pawn => None,
            Piece::Knight => Some(self.knight),
            Piece::Bishop => Some(self.bishop),
            Piece::Rook => Some(self.rook),
            Piece::Queen => Some(self.queen),
            Piece::King => Some(self.king),
        }
    }

    pub fn piece(&self, letter: char) -> Option<Piece> {
        Piece::ALL
            .into_iter()
            .find(|piece| self.letter(*piece) == Some(letter))
    }
}

/// Which algebraic variant to write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum NotationStyle {
    #[default]
    Short,
    Long,
}

impl NotationStyle {
    pub fn formatter(self, symbols: PieceSymbols) -> Box<dyn MoveFormatter> {
        match self {
            NotationStyle::Short => Box::new(ShortAlgebraic::new(symbols)),
            NotationStyle::Long => Box::new(LongAlgebraic::new(symbols)),
        }
    }
}

/// Writes moves in one of the algebraic variants.
///
/// Implementors decide how the source of a move is written; everything else
/// (piece letters, targets, promotion, castling, check marks) is shared.
pub trait MoveFormatter {
    fn symbols(&self) -> &PieceSymbols;

    /// What is written between the piece letter and the target square.
    fn source_designation(&self, position: &Position, mv: &Move) -> String;

    /// Separator in front of the target square.
    fn capture_mark(&self, mv: &Move) -> &'static str;

    /// Formats `info` and plays it on `position`.
    fn format_move(&self, position: &mut Position, info: MoveInfo) -> Result<String, NotationError> {
        let mv = playable(position, info)?;
        let mut text = self.move_body(position, &mv);
        position.try_make_move(info, true);
        text.push_str(check_suffix(position));
        Ok(text)
    }

    /// Formats `info` and plays it in `game`, so the game's history and
    /// cursor follow the text.
    fn format_game_move(&self, game: &mut Game, info: MoveInfo) -> Result<String, NotationError> {
        let mv = playable(game.position(), info)?;
        let mut text = self.move_body(game.position(), &mv);
        game.try_make_move(info, true);
        text.push_str(check_suffix(game.position()));
        Ok(text)
    }

    /// Numbered move text for `moves` played from `position`, e.g.
    /// "1. e4 e5 2. Nf3", or "1... e5" when Black moves first.
    fn format_line(&self, position: &Position, moves: &[MoveInfo]) -> Result<String, NotationError> {
        let mut position = position.clone();
        let mut text = String::new();
        for (i, info) in moves.iter().enumerate() {
            let number = position.fullmove_number();
            let prefix = match position.side_to_move() {
                Color::White if i == 0 => format!("{number}. "),
                Color::White => format!(" {number}. "),
                Color::Black if i == 0 => format!("{number}... "),
                Color::Black => " ".to_string(),
            };
            text.push_str(&prefix);
            text.push_str(&self.format_move(&mut position, *info)?);
        }
        Ok(text)
    }

    /// The move text without check marks.
    fn move_body(&self, position: &Position, mv: &Move) -> String {
        match mv.move_type() {
            MoveType::CastleKingside => return "O-O".to_string(),
            MoveType::CastleQueenside => return "O-O-O".to_string(),
            _ => {}
        }

        let mut text = String::new();
        if let Some(letter) = mv.moving_piece().and_then(|piece| self.symbols().letter(piece)) {
            text.push(letter);
        }
        text.push_str(&self.source_designation(position, mv));
        text.push_str(self.capture_mark(mv));
        text.push_str(&mv.target().to_algebraic());
        if let Some(letter) = mv.promote_to().and_then(|piece| self.symbols().letter(piece)) {
            text.push('=');
            text.push(letter);
        }
        text
    }
}

fn playable(position: &Position, info: MoveInfo) -> Result<Move, NotationError> {
    let mv = position.check_move(info);
    if mv.is_ok() {
        Ok(mv)
    } else {
        Err(NotationError::NotPlayable {
            mv: info,
            result: mv.result(),
        })
    }
}

/// "+" for check, "#" for mate, nothing otherwise; `position` is the one
/// after the move.
fn check_suffix(position: &Position) -> &'static str {
    if !position.is_check() {
        ""
    } else if position.has_legal_move() {
        "+"
    } else {
        "#"
    }
}

/// Standard short algebraic notation, the form used in PGN.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShortAlgebraic {
    symbols: PieceSymbols,
}

impl ShortAlgebraic {
    pub fn new(symbols: PieceSymbols) -> Self {
        ShortAlgebraic { symbols }
    }

    /// Resolves short algebraic text against the legal moves of `position`.
    ///
    /// Accepts optional "x", "+", "#", "=Q" and both "O-O" and "0-0".
    pub fn parse(&self, position: &Position, text: &str) -> Result<MoveInfo, NotationError> {
        let trimmed = text.trim().trim_end_matches(['+', '#']);
        if trimmed.is_empty() {
            return Err(NotationError::Empty);
        }

        let castling = match trimmed {
            "O-O" | "0-0" => Some(MoveType::CastleKingside),
            "O-O-O" | "0-0-0" => Some(MoveType::CastleQueenside),
            _ => None,
        };
        if let Some(move_type) = castling {
            return position
                .legal_moves()
                .into_iter()
                .find(|mv| mv.move_type() == move_type)
                .map(|mv| mv.info())
                .ok_or_else(|| NotationError::NoMatch(text.to_string()));
        }

        let pattern = self.pattern(trimmed)?;
        let mut candidates = position
            .legal_moves()
            .into_iter()
            .filter(|mv| pattern.matches(mv));
        match (candidates.next(), candidates.next()) {
            (Some(mv), None) => Ok(mv.info()),
            (None, _) => Err(NotationError::NoMatch(text.to_string())),
            (Some(_), Some(_)) => Err(NotationError::Ambiguous(text.to_string())),
        }
    }

    fn pattern(&self, text: &str) -> Result<Pattern, NotationError> {
        let malformed = || NotationError::Malformed(text.to_string());

        let mut chars = text.chars().peekable();
        let piece = match chars.peek().and_then(|c| self.symbols.piece(*c)) {
            Some(piece) => {
                chars.next();
                piece
            }
            None => Piece::Pawn,
        };
        let rest: String = chars.filter(|c| *c != 'x').collect();

        let (squares, promotion) = match rest.split_once('=') {
            Some((squares, promoted)) => {
                let mut letters = promoted.chars();
                let piece = letters
                    .next()
                    .and_then(|c| self.symbols.piece(c))
                    .filter(|piece| piece.is_promotion_target())
                    .ok_or_else(malformed)?;
                if letters.next().is_some() {
                    return Err(malformed());
                }
                (squares, Some(piece))
            }
            None => (rest.as_str(), None),
        };

        let split = squares
            .len()
            .checked_sub(2)
            .filter(|at| squares.is_char_boundary(*at))
            .ok_or_else(malformed)?;
        let (hint, target) = squares.split_at(split);
        let target = Square::from_algebraic(target).ok_or_else(malformed)?;

        let mut file = None;
        let mut rank = None;
        for c in hint.chars() {
            if let (None, None, Some(f)) = (file, rank, File::from_char(c)) {
                file = Some(f);
            } else if let (None, Some(r)) = (rank, Rank::from_char(c)) {
                rank = Some(r);
            } else {
                return Err(malformed());
            }
        }

        Ok(Pattern {
            piece,
            file,
            rank,
            target,
            promotion,
        })
    }
}

/// The constraints a piece of short algebraic text puts on a move.
#[derive(Debug)]
struct Pattern {
    piece: Piece,
    file: Option<File>,
    rank: Option<Rank>,
    target: Square,
    promotion: Option<Piece>,
}

impl Pattern {
    fn matches(&self, mv: &Move) -> bool {
        mv.moving_piece() == Some(self.piece)
            && !mv.move_type().is_castling()
            && mv.target() == self.target
            && self.file.map_or(true, |f| mv.source().file() == f)
            && self.rank.map_or(true, |r| mv.source().rank() == r)
            && mv.promote_to() == self.promotion
    }
}

impl MoveFormatter for ShortAlgebraic {
    fn symbols(&self) -> &PieceSymbols {
        &self.symbols
    }

    /// Pawn captures name the source file. Other pieces name as much of the
    /// source square as it takes to tell them apart from every other piece
    /// of the same kind that could also reach the target.
    fn source_designation(&self, position: &Position, mv: &Move) -> String {
        let source = mv.source();
        let Some(piece) = mv.moving_piece() else {
            return String::new();
        };
        match piece {
            Piece::Pawn if mv.is_capture() => return source.file().to_string(),
            Piece::Pawn | Piece::King => return String::new(),
            _ => {}
        }

        let same_kind = position.piece_vector(piece) & position.color_vector(position.side_to_move());
        let rivals: Vec<Square> = same_kind
            .into_iter()
            .filter(|sq| *sq != source)
            .filter(|sq| {
                position
                    .check_move(MoveInfo::new(*sq, mv.target()))
                    .result()
                    .is_legal_move()
            })
            .collect();

        if rivals.is_empty() {
            String::new()
        } else if rivals.iter().all(|sq| sq.file() != source.file()) {
            source.file().to_string()
        } else if rivals.iter().all(|sq| sq.rank() != source.rank()) {
            source.rank().to_string()
        } else {
            source.to_algebraic()
        }
    }

    fn capture_mark(&self, mv: &Move) -> &'static str {
        if mv.is_capture() {
            "x"
        } else {
            ""
        }
    }
}

/// Long algebraic notation: every move names its full source square.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LongAlgebraic {
    symbols: PieceSymbols,
}

impl LongAlgebraic {
    pub fn new(symbols: PieceSymbols) -> Self {
        LongAlgebraic { symbols }
    }
}

impl MoveFormatter for LongAlgebraic {
    fn symbols(&self) -> &PieceSymbols {
        &self.symbols
    }

    fn source_designation(&self, _position: &Position, mv: &Move) -> String {
        mv.source().to_algebraic()
    }

    fn capture_mark(&self, mv: &Move) -> &'static str {
        if mv.is_capture() {
            "x"
        } else {
            "-"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn short(fen: &str, info: MoveInfo) -> String {
        let mut position = Position::from_fen(fen).unwrap();
        ShortAlgebraic::default().format_move(&mut position, info).unwrap()
    }

    const EN_PASSANT: &str = "rnbqkbnr/ppp1pppp/8/3pP3/8/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 3";
    const CASTLING: &str = "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1";
    const KNIGHTS: &str = "4k3/8/8/8/8/5N2/8/1N2K3 w - - 0 1";

    #[test]
    fn plain_moves() {
        let mut position = Position::initial();
        let f = ShortAlgebraic::default();
        assert_eq!(f.format_move(&mut position, MoveInfo::new(Square::E2, Square::E4)).unwrap(), "e4");
        assert_eq!(f.format_move(&mut position, MoveInfo::new(Square::D7, Square::D5)).unwrap(), "d5");
        assert_eq!(f.format_move(&mut position, MoveInfo::new(Square::E4, Square::D5)).unwrap(), "exd5");
        assert_eq!(f.format_move(&mut position, MoveInfo::new(Square::G8, Square::F6)).unwrap(), "Nf6");
        assert_eq!(position.side_to_move(), Color::White);
    }

    #[test]
    fn special_moves() {
        assert_eq!(short(EN_PASSANT, MoveInfo::en_passant(Square::E5, Square::D6)), "exd6");
        assert_eq!(
            short(CASTLING, MoveInfo::castle(MoveType::CastleKingside, Square::E1, Square::G1)),
            "O-O"
        );
        assert_eq!(
            short(CASTLING, MoveInfo::castle(MoveType::CastleQueenside, Square::E1, Square::C1)),
            "O-O-O"
        );
        assert_eq!(
            short("8/P6k/8/8/8/8/8/K7 w - - 0 1", MoveInfo::promotion(Square::A7, Square::A8, Piece::Queen)),
            "a8=Q"
        );
    }

    #[test]
    fn disambiguation() {
        assert_eq!(short(KNIGHTS, MoveInfo::new(Square::B1, Square::D2)), "Nbd2");
        assert_eq!(short(KNIGHTS, MoveInfo::new(Square::F3, Square::D4)), "Nd4");
        assert_eq!(
            short("4k3/8/8/R7/8/8/8/R3K3 w - - 0 1", MoveInfo::new(Square::A1, Square::A3)),
            "R1a3"
        );
        assert_eq!(
            short("1k6/8/8/8/4Q2Q/8/8/K6Q w - - 0 1", MoveInfo::new(Square::H4, Square::E1)),
            "Qh4e1"
        );
    }

    #[test]
    fn check_and_mate_marks() {
        assert_eq!(short("4k3/8/8/8/8/8/8/R3K3 w - - 0 1", MoveInfo::new(Square::A1, Square::A8)), "Ra8+");
        assert_eq!(
            short(
                "rnbqkbnr/pppp1ppp/8/4p3/6P1/5P2/PPPPP2P/RNBQKBNR b KQkq - 0 2",
                MoveInfo::new(Square::D8, Square::H4)
            ),
            "Qh4#"
        );
    }

    #[test]
    fn long_form() {
        let mut position = Position::initial();
        let f = LongAlgebraic::default();
        assert_eq!(f.format_move(&mut position, MoveInfo::new(Square::E2, Square::E4)).unwrap(), "e2-e4");
        assert_eq!(f.format_move(&mut position, MoveInfo::new(Square::G8, Square::F6)).unwrap(), "Ng8-f6");
        assert_eq!(f.format_move(&mut position, MoveInfo::new(Square::E4, Square::E5)).unwrap(), "e4-e5");
        assert_eq!(f.format_move(&mut position, MoveInfo::new(Square::F6, Square::E4)).unwrap(), "Nf6-e4");

        let mut position = Position::from_fen(EN_PASSANT).unwrap();
        assert_eq!(
            f.format_move(&mut position, MoveInfo::en_passant(Square::E5, Square::D6)).unwrap(),
            "e5xd6"
        );
    }

    #[test]
    fn custom_symbols() {
        let symbols = PieceSymbols::new('S', 'L', 'T', 'D', 'K').unwrap();
        let f = NotationStyle::Short.formatter(symbols.clone());
        let mut position = Position::initial();
        assert_eq!(f.format_move(&mut position, MoveInfo::new(Square::G1, Square::F3)).unwrap(), "Sf3");

        let parsed = ShortAlgebraic::new(symbols).parse(&position, "Sc6").unwrap();
        assert_eq!(parsed, MoveInfo::new(Square::B8, Square::C6));
    }

    #[test]
    fn symbols_must_be_distinct_capitals() {
        assert!(PieceSymbols::default().validate().is_ok());
        assert!(matches!(
            PieceSymbols::new('K', 'B', 'R', 'Q', 'K'),
            Err(NotationError::InvalidSymbols(_))
        ));
        assert!(matches!(
            PieceSymbols::new('N', 'b', 'R', 'Q', 'K'),
            Err(NotationError::InvalidSymbols(_))
        ));
        assert!(matches!(
            PieceSymbols::new('N', 'B', 'R', '=', 'K'),
            Err(NotationError::InvalidSymbols(_))
        ));
        assert!(PieceSymbols::new('К', 'С', 'Л', 'Ф', 'Р').is_ok());
        assert!(PieceSymbols::new('S', 'L', 'T', 'D', 'K').is_ok());
    }

    #[test]
    fn illegal_moves_are_not_formatted() {
        let mut position = Position::initial();
        let err = ShortAlgebraic::default()
            .format_move(&mut position, MoveInfo::new(Square::E2, Square::E5))
            .unwrap_err();
        assert!(matches!(
            err,
            NotationError::NotPlayable { result, .. }
                if result.contains(MoveCheckResult::ILLEGAL_TARGET_SQUARE)
        ));
        assert_eq!(position, Position::initial());

        // Incomplete requests are refused too.
        let mut position = Position::from_fen(CASTLING).unwrap();
        assert!(ShortAlgebraic::default()
            .format_move(&mut position, MoveInfo::new(Square::E1, Square::G1))
            .is_err());
    }

    #[test]
    fn numbered_lines() {
        let f = ShortAlgebraic::default();
        let line = f
            .format_line(
                &Position::initial(),
                &[
                    MoveInfo::new(Square::F2, Square::F3),
                    MoveInfo::new(Square::E7, Square::E5),
                    MoveInfo::new(Square::G2, Square::G4),
                    MoveInfo::new(Square::D8, Square::H4),
                ],
            )
            .unwrap();
        assert_eq!(line, "1. f3 e5 2. g4 Qh4#");

        let mut position = Position::initial();
        position.try_make_move(MoveInfo::new(Square::E2, Square::E4), true);
        let line = f
            .format_line(
                &position,
                &[
                    MoveInfo::new(Square::E7, Square::E5),
                    MoveInfo::new(Square::G1, Square::F3),
                ],
            )
            .unwrap();
        assert_eq!(line, "1... e5 2. Nf3");
    }

    #[test]
    fn game_moves_follow_text() {
        let mut game = Game::new();
        let f = ShortAlgebraic::default();
        assert_eq!(f.format_game_move(&mut game, MoveInfo::new(Square::E2, Square::E4)).unwrap(), "e4");
        assert_eq!(game.active_move_index(), 1);
    }

    #[test]
    fn parse_short_algebraic() {
        let f = ShortAlgebraic::default();
        let position = Position::initial();
        assert_eq!(f.parse(&position, "e4").unwrap(), MoveInfo::new(Square::E2, Square::E4));
        assert_eq!(f.parse(&position, "Nf3").unwrap(), MoveInfo::new(Square::G1, Square::F3));
        assert_eq!(f.parse(&position, " e3 ").unwrap(), MoveInfo::new(Square::E2, Square::E3));

        let position = Position::from_fen(EN_PASSANT).unwrap();
        assert_eq!(f.parse(&position, "exd6").unwrap(), MoveInfo::en_passant(Square::E5, Square::D6));

        let position = Position::from_fen(CASTLING).unwrap();
        assert_eq!(
            f.parse(&position, "O-O").unwrap(),
            MoveInfo::castle(MoveType::CastleKingside, Square::E1, Square::G1)
        );
        assert_eq!(
            f.parse(&position, "0-0-0").unwrap(),
            MoveInfo::castle(MoveType::CastleQueenside, Square::E1, Square::C1)
        );
        assert_eq!(f.parse(&position, "Rxa8+").unwrap(), MoveInfo::new(Square::A1, Square::A8));

        let position = Position::from_fen("8/P6k/8/8/8/8/8/K7 w - - 0 1").unwrap();
        assert_eq!(
            f.parse(&position, "a8=N").unwrap(),
            MoveInfo::promotion(Square::A7, Square::A8, Piece::Knight)
        );
        assert!(matches!(f.parse(&position, "a8"), Err(NotationError::NoMatch(_))));
    }

    #[test]
    fn parse_errors() {
        let f = ShortAlgebraic::default();
        let position = Position::from_fen(KNIGHTS).unwrap();
        assert_eq!(f.parse(&position, "  "), Err(NotationError::Empty));
        assert_eq!(f.parse(&position, "Nd2"), Err(NotationError::Ambiguous("Nd2".to_string())));
        assert_eq!(f.parse(&position, "Nbd2").unwrap(), MoveInfo::new(Square::B1, Square::D2));
        assert_eq!(f.parse(&position, "N3d2").unwrap(), MoveInfo::new(Square::F3, Square::D2));
        assert_eq!(f.parse(&position, "Ke5"), Err(NotationError::NoMatch("Ke5".to_string())));
        assert!(matches!(f.parse(&position, "Z9"), Err(NotationError::Malformed(_))));
        assert!(matches!(f.parse(&position, "e"), Err(NotationError::Malformed(_))));
    }
}
