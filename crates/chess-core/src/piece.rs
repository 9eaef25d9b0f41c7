//! Chess piece representation.

use crate::Color;

/// The six types of chess pieces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum Piece {
    Pawn = 0,
    Knight = 1,
    Bishop = 2,
    Rook = 3,
    Queen = 4,
    King = 5,
}

impl Piece {
    /// All piece types in order.
    pub const ALL: [Piece; 6] = [
        Piece::Pawn,
        Piece::Knight,
        Piece::Bishop,
        Piece::Rook,
        Piece::Queen,
        Piece::King,
    ];

    /// The pieces a pawn may promote to, strongest first.
    pub const PROMOTIONS: [Piece; 4] = [Piece::Queen, Piece::Rook, Piece::Bishop, Piece::Knight];

    /// Returns the index of this piece type (0-5).
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Returns the FEN character for this piece with the given color.
    pub const fn to_fen_char(self, color: Color) -> char {
        let c = match self {
            Piece::Pawn => 'p',
            Piece::Knight => 'n',
            Piece::Bishop => 'b',
            Piece::Rook => 'r',
            Piece::Queen => 'q',
            Piece::King => 'k',
        };
        match color {
            Color::White => c.to_ascii_uppercase(),
            Color::Black => c,
        }
    }

    /// Returns true if this piece is a sliding piece (bishop, rook, or queen).
    #[inline]
    pub const fn is_slider(self) -> bool {
        matches!(self, Piece::Bishop | Piece::Rook | Piece::Queen)
    }

    /// Returns true if a pawn may promote to this piece.
    #[inline]
    pub const fn is_promotion_target(self) -> bool {
        matches!(
            self,
            Piece::Knight | Piece::Bishop | Piece::Rook | Piece::Queen
        )
    }
}

impl std::fmt::Display for Piece {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Piece::Pawn => "Pawn",
            Piece::Knight => "Knight",
            Piece::Bishop => "Bishop",
            Piece::Rook => "Rook",
            Piece::Queen => "Queen",
            Piece::King => "King",
        };
        write!(f, "{}", name)
    }
}

/// A piece of a specific color, as found on a square.
///
/// An empty square is represented as `Option::<ColoredPiece>::None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ColoredPiece {
    pub color: Color,
    pub piece: Piece,
}

impl ColoredPiece {
    /// All twelve colored pieces, White first.
    pub const ALL: [ColoredPiece; 12] = {
        let mut all = [ColoredPiece::new(Color::White, Piece::Pawn); 12];
        let mut i = 0;
        while i < 12 {
            let color = if i < 6 { Color::White } else { Color::Black };
            all[i] = ColoredPiece::new(color, Piece::ALL[i % 6]);
            i += 1;
        }
        all
    };

    #[inline]
    pub const fn new(color: Color, piece: Piece) -> Self {
        ColoredPiece { color, piece }
    }

    /// Returns the FEN character for this piece.
    #[inline]
    pub const fn to_fen_char(self) -> char {
        self.piece.to_fen_char(self.color)
    }

    /// Parses a FEN character into a colored piece.
    pub const fn from_fen_char(c: char) -> Option<Self> {
        let color = if c.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        let piece = match c.to_ascii_lowercase() {
            'p' => Piece::Pawn,
            'n' => Piece::Knight,
            'b' => Piece::Bishop,
            'r' => Piece::Rook,
            'q' => Piece::Queen,
            'k' => Piece::King,
            _ => return None,
        };
        Some(ColoredPiece::new(color, piece))
    }
}

impl std::fmt::Display for ColoredPiece {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.color, self.piece)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn piece_to_fen() {
        assert_eq!(Piece::Pawn.to_fen_char(Color::White), 'P');
        assert_eq!(Piece::Pawn.to_fen_char(Color::Black), 'p');
        assert_eq!(Piece::King.to_fen_char(Color::White), 'K');
        assert_eq!(Piece::Knight.to_fen_char(Color::Black), 'n');
    }

    #[test]
    fn colored_piece_from_fen() {
        assert_eq!(
            ColoredPiece::from_fen_char('P'),
            Some(ColoredPiece::new(Color::White, Piece::Pawn))
        );
        assert_eq!(
            ColoredPiece::from_fen_char('q'),
            Some(ColoredPiece::new(Color::Black, Piece::Queen))
        );
        assert_eq!(ColoredPiece::from_fen_char('x'), None);
    }

    #[test]
    fn all_colored_pieces_are_distinct() {
        for (i, a) in ColoredPiece::ALL.iter().enumerate() {
            for b in &ColoredPiece::ALL[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert_eq!(
            ColoredPiece::ALL[11],
            ColoredPiece::new(Color::Black, Piece::King)
        );
    }

    #[test]
    fn promotion_targets() {
        assert!(!Piece::Pawn.is_promotion_target());
        assert!(!Piece::King.is_promotion_target());
        assert!(Piece::PROMOTIONS.iter().all(|p| p.is_promotion_target()));
    }

    #[test]
    fn is_slider() {
        assert!(!Piece::Pawn.is_slider());
        assert!(!Piece::Knight.is_slider());
        assert!(Piece::Bishop.is_slider());
        assert!(Piece::Rook.is_slider());
        assert!(Piece::Queen.is_slider());
        assert!(!Piece::King.is_slider());
    }
}
