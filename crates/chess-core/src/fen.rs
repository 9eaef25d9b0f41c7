//! FEN (Forsyth-Edwards Notation) parsing and serialization.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::{Color, ColoredPiece, File, Rank, Square};

/// Errors that can occur when parsing FEN strings.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FenError {
    #[error("invalid FEN: expected 6 parts, got {0}")]
    InvalidPartCount(usize),

    #[error("invalid piece placement: {0}")]
    InvalidPiecePlacement(String),

    #[error("invalid active color: expected 'w' or 'b', got '{0}'")]
    InvalidActiveColor(String),

    #[error("invalid castling rights: {0}")]
    InvalidCastlingRights(String),

    #[error("invalid en passant square: {0}")]
    InvalidEnPassantSquare(String),

    #[error("invalid halfmove clock: {0}")]
    InvalidHalfmoveClock(String),

    #[error("invalid fullmove number: {0}")]
    InvalidFullmoveNumber(String),
}

/// The six fields of a FEN record, decoded into board types.
///
/// Castling availability is expressed as the squares the king lands on when
/// castling (`K` = g1, `Q` = c1, `k` = g8, `q` = c8). The rules engine checks
/// the decoded fields for consistency; this type only checks syntax.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FenParser {
    /// Occupant of each square, indexed by square index.
    pub placement: [Option<ColoredPiece>; 64],
    /// The side to move.
    pub side_to_move: Color,
    /// King target squares of the castling moves still available.
    pub castling_targets: Vec<Square>,
    /// En passant target square, if any.
    pub en_passant: Option<Square>,
    /// Halfmove clock (for 50-move rule).
    pub halfmove_clock: u32,
    /// Fullmove number.
    pub fullmove_number: u32,
}

const CASTLING_CHARS: [(char, Square); 4] = [
    ('K', Square::G1),
    ('Q', Square::C1),
    ('k', Square::G8),
    ('q', Square::C8),
];

impl FenParser {
    /// The standard starting position FEN.
    pub const STARTPOS: &'static str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    /// Parses a FEN string.
    pub fn parse(fen: &str) -> Result<Self, FenError> {
        let parts: Vec<&str> = fen.split_whitespace().collect();

        if parts.len() != 6 {
            return Err(FenError::InvalidPartCount(parts.len()));
        }

        let placement = Self::parse_piece_placement(parts[0])?;

        let side_to_move = match parts[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => return Err(FenError::InvalidActiveColor(other.to_string())),
        };

        let castling_targets = Self::parse_castling(parts[2])?;
        let en_passant = Self::parse_en_passant(parts[3])?;

        let halfmove_clock = parts[4]
            .parse::<u32>()
            .map_err(|_| FenError::InvalidHalfmoveClock(parts[4].to_string()))?;

        let fullmove_number = parts[5]
            .parse::<u32>()
            .map_err(|_| FenError::InvalidFullmoveNumber(parts[5].to_string()))?;

        Ok(FenParser {
            placement,
            side_to_move,
            castling_targets,
            en_passant,
            halfmove_clock,
            fullmove_number,
        })
    }

    fn parse_piece_placement(placement: &str) -> Result<[Option<ColoredPiece>; 64], FenError> {
        let ranks: Vec<&str> = placement.split('/').collect();
        if ranks.len() != 8 {
            return Err(FenError::InvalidPiecePlacement(format!(
                "expected 8 ranks, got {}",
                ranks.len()
            )));
        }

        let mut board = [None; 64];
        for (i, rank_str) in ranks.iter().enumerate() {
            let rank = 7 - i as u8;
            let mut file = 0u8;
            for c in rank_str.chars() {
                if let Some(skip) = c.to_digit(10).filter(|d| (1..=8).contains(d)) {
                    file += skip as u8;
                } else if let Some(piece) = ColoredPiece::from_fen_char(c) {
                    if file < 8 {
                        board[(rank * 8 + file) as usize] = Some(piece);
                    }
                    file += 1;
                } else {
                    return Err(FenError::InvalidPiecePlacement(format!(
                        "invalid character '{}' in rank {}",
                        c,
                        rank + 1
                    )));
                }
                if file > 8 {
                    break;
                }
            }
            if file != 8 {
                return Err(FenError::InvalidPiecePlacement(format!(
                    "rank {} does not describe 8 squares",
                    rank + 1
                )));
            }
        }

        Ok(board)
    }

    fn parse_castling(castling: &str) -> Result<Vec<Square>, FenError> {
        if castling == "-" {
            return Ok(Vec::new());
        }

        let mut targets = Vec::with_capacity(4);
        for c in castling.chars() {
            let target = CASTLING_CHARS
                .iter()
                .find(|(symbol, _)| *symbol == c)
                .map(|(_, target)| *target)
                .ok_or_else(|| {
                    FenError::InvalidCastlingRights(format!("invalid character '{}'", c))
                })?;
            if targets.contains(&target) {
                return Err(FenError::InvalidCastlingRights(format!(
                    "duplicate character '{}'",
                    c
                )));
            }
            targets.push(target);
        }

        Ok(targets)
    }

    fn parse_en_passant(ep: &str) -> Result<Option<Square>, FenError> {
        if ep == "-" {
            return Ok(None);
        }

        match Square::from_algebraic(ep) {
            Some(square) if matches!(square.rank(), Rank::R3 | Rank::R6) => Ok(Some(square)),
            _ => Err(FenError::InvalidEnPassantSquare(ep.to_string())),
        }
    }

    /// Converts the decoded fields back to a FEN string.
    pub fn to_fen(&self) -> String {
        self.to_string()
    }
}

impl FromStr for FenParser {
    type Err = FenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for FenParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in Rank::ALL.iter().rev() {
            let mut empty = 0;
            for file in File::ALL {
                match self.placement[Square::new(file, *rank).index() as usize] {
                    Some(piece) => {
                        if empty > 0 {
                            write!(f, "{}", empty)?;
                            empty = 0;
                        }
                        write!(f, "{}", piece.to_fen_char())?;
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                write!(f, "{}", empty)?;
            }
            if *rank != Rank::R1 {
                write!(f, "/")?;
            }
        }

        let color = match self.side_to_move {
            Color::White => 'w',
            Color::Black => 'b',
        };
        write!(f, " {} ", color)?;

        let mut any_castling = false;
        for (symbol, target) in CASTLING_CHARS {
            if self.castling_targets.contains(&target) {
                write!(f, "{}", symbol)?;
                any_castling = true;
            }
        }
        if !any_castling {
            write!(f, "-")?;
        }

        match self.en_passant {
            Some(square) => write!(f, " {}", square)?,
            None => write!(f, " -")?,
        }

        write!(f, " {} {}", self.halfmove_clock, self.fullmove_number)
    }
}

impl Default for FenParser {
    fn default() -> Self {
        Self::parse(Self::STARTPOS).expect("STARTPOS is valid")
    }
}
