//! Board square representation.

use std::fmt;
use std::str::FromStr;

use crate::CoreError;

/// A file (column) on the chess board, from A to H.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "u8", into = "u8")
)]
#[repr(u8)]
pub enum File {
    A = 0,
    B = 1,
    C = 2,
    D = 3,
    E = 4,
    F = 5,
    G = 6,
    H = 7,
}

impl File {
    /// All files in order.
    pub const ALL: [File; 8] = [
        File::A,
        File::B,
        File::C,
        File::D,
        File::E,
        File::F,
        File::G,
        File::H,
    ];

    #[inline]
    pub const fn from_index(index: u8) -> Option<Self> {
        if index < 8 {
            Some(Self::ALL[index as usize])
        } else {
            None
        }
    }

    /// Lowercase letters only; upper case is reserved for pieces in move text.
    #[inline]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            'a'..='h' => Self::from_index(c as u8 - b'a'),
            _ => None,
        }
    }

    #[inline]
    pub const fn index(self) -> u8 {
        self as u8
    }

    /// 'a' to 'h'.
    #[inline]
    pub const fn to_char(self) -> char {
        (b'a' + self as u8) as char
    }
}

impl TryFrom<u8> for File {
    type Error = CoreError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        File::from_index(value).ok_or(CoreError::FileOutOfRange(value))
    }
}

impl From<File> for u8 {
    fn from(file: File) -> u8 {
        file.index()
    }
}

impl fmt::Display for File {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

/// A rank (row) on the chess board, from 1 to 8.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "u8", into = "u8")
)]
#[repr(u8)]
pub enum Rank {
    R1 = 0,
    R2 = 1,
    R3 = 2,
    R4 = 3,
    R5 = 4,
    R6 = 5,
    R7 = 6,
    R8 = 7,
}

impl Rank {
    /// All ranks in order.
    pub const ALL: [Rank; 8] = [
        Rank::R1,
        Rank::R2,
        Rank::R3,
        Rank::R4,
        Rank::R5,
        Rank::R6,
        Rank::R7,
        Rank::R8,
    ];

    #[inline]
    pub const fn from_index(index: u8) -> Option<Self> {
        if index < 8 {
            Some(Self::ALL[index as usize])
        } else {
            None
        }
    }

    #[inline]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            '1'..='8' => Self::from_index(c as u8 - b'1'),
            _ => None,
        }
    }

    #[inline]
    pub const fn index(self) -> u8 {
        self as u8
    }

    /// '1' to '8'.
    #[inline]
    pub const fn to_char(self) -> char {
        (b'1' + self as u8) as char
    }
}

impl TryFrom<u8> for Rank {
    type Error = CoreError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Rank::from_index(value).ok_or(CoreError::RankOutOfRange(value))
    }
}

impl From<Rank> for u8 {
    fn from(rank: Rank) -> u8 {
        rank.index()
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

/// A square on the chess board, indexed 0-63.
///
/// Squares are indexed in little-endian rank-file mapping:
/// - a1 = 0, b1 = 1, ..., h1 = 7
/// - a2 = 8, ..., h8 = 63
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "u8", into = "u8")
)]
pub struct Square(u8);

macro_rules! square_constants {
    ($($name:ident = $index:expr),* $(,)?) => {
        $(pub const $name: Square = Square($index);)*
    };
}

impl Square {
    /// All squares from a1 to h8.
    pub const ALL: [Square; 64] = {
        let mut squares = [Square(0); 64];
        let mut i = 0;
        while i < 64 {
            squares[i] = Square(i as u8);
            i += 1;
        }
        squares
    };

    /// Creates a square from file and rank.
    #[inline]
    pub const fn new(file: File, rank: Rank) -> Self {
        Square(rank.index() * 8 + file.index())
    }

    /// Creates a square from index (0-63).
    #[inline]
    pub const fn from_index(index: u8) -> Option<Self> {
        if index < 64 {
            Some(Square(index))
        } else {
            None
        }
    }

    /// Parses lowercase coordinates such as "e4".
    pub const fn from_algebraic(s: &str) -> Option<Self> {
        match s.as_bytes() {
            [f, r] => match (File::from_char(*f as char), Rank::from_char(*r as char)) {
                (Some(file), Some(rank)) => Some(Square::new(file, rank)),
                _ => None,
            },
            _ => None,
        }
    }

    /// Returns the index (0-63).
    #[inline]
    pub const fn index(self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn file(self) -> File {
        File::ALL[(self.0 % 8) as usize]
    }

    #[inline]
    pub const fn rank(self) -> Rank {
        Rank::ALL[(self.0 / 8) as usize]
    }

    /// Lowercase coordinates, e.g. "e4".
    pub fn to_algebraic(self) -> String {
        format!("{}{}", self.file(), self.rank())
    }

    /// Returns a raw bit mask with only this square set.
    #[inline]
    pub const fn bit(self) -> u64 {
        1u64 << self.0
    }

    square_constants! {
        A1 = 0, B1 = 1, C1 = 2, D1 = 3, E1 = 4, F1 = 5, G1 = 6, H1 = 7,
        A2 = 8, B2 = 9, C2 = 10, D2 = 11, E2 = 12, F2 = 13, G2 = 14, H2 = 15,
        A3 = 16, B3 = 17, C3 = 18, D3 = 19, E3 = 20, F3 = 21, G3 = 22, H3 = 23,
        A4 = 24, B4 = 25, C4 = 26, D4 = 27, E4 = 28, F4 = 29, G4 = 30, H4 = 31,
        A5 = 32, B5 = 33, C5 = 34, D5 = 35, E5 = 36, F5 = 37, G5 = 38, H5 = 39,
        A6 = 40, B6 = 41, C6 = 42, D6 = 43, E6 = 44, F6 = 45, G6 = 46, H6 = 47,
        A7 = 48, B7 = 49, C7 = 50, D7 = 51, E7 = 52, F7 = 53, G7 = 54, H7 = 55,
        A8 = 56, B8 = 57, C8 = 58, D8 = 59, E8 = 60, F8 = 61, G8 = 62, H8 = 63,
    }
}

impl TryFrom<u8> for Square {
    type Error = CoreError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Square::from_index(value).ok_or(CoreError::SquareOutOfRange(value))
    }
}

impl From<Square> for u8 {
    fn from(square: Square) -> u8 {
        square.index()
    }
}

impl FromStr for Square {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Square::from_algebraic(s).ok_or_else(|| CoreError::InvalidSquare(s.to_string()))
    }
}

impl fmt::Debug for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Square({})", self.to_algebraic())
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_algebraic())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn coordinates() {
        let b6 = Square::new(File::B, Rank::R6);
        assert_eq!(b6, Square::B6);
        assert_eq!((b6.file(), b6.rank(), b6.index()), (File::B, Rank::R6, 41));
        assert_eq!(File::from_char('h'), Some(File::H));
        assert_eq!(File::from_char('B'), None);
        assert_eq!(Rank::from_char('0'), None);
    }

    #[test]
    fn parse_coordinates() {
        assert_eq!(Square::from_algebraic("h1"), Some(Square::H1));
        assert_eq!(Square::from_algebraic("c5"), Some(Square::C5));
        for bad in ["", "c", "c55", "E4", "j3", "b0"] {
            assert_eq!(Square::from_algebraic(bad), None, "{bad}");
        }
    }

    #[test]
    fn square_from_str() {
        assert_eq!("d5".parse::<Square>(), Ok(Square::D5));
        assert_eq!(
            "z0".parse::<Square>(),
            Err(CoreError::InvalidSquare("z0".to_string()))
        );
    }

    #[test]
    fn display() {
        assert_eq!(Square::F2.to_string(), "f2");
        assert_eq!(format!("{:?}", Square::D7), "Square(d7)");
        assert_eq!(format!("{}{}", File::G, Rank::R3), "g3");
    }

    #[test]
    fn square_constants_match_coordinates() {
        for (i, sq) in Square::ALL.iter().enumerate() {
            assert_eq!(sq.index() as usize, i);
            assert_eq!(Square::new(sq.file(), sq.rank()), *sq);
        }
        assert_eq!(Square::C8, Square::new(File::C, Rank::R8));
    }

    #[test]
    fn out_of_range_conversions() {
        assert_eq!(Square::try_from(63), Ok(Square::H8));
        assert_eq!(Square::try_from(64), Err(CoreError::SquareOutOfRange(64)));
        assert_eq!(File::try_from(8), Err(CoreError::FileOutOfRange(8)));
        assert_eq!(Rank::try_from(200), Err(CoreError::RankOutOfRange(200)));
    }

    proptest! {
        #[test]
        fn index_conversions_accept_exactly_the_board(value: u8) {
            match Square::try_from(value) {
                Ok(sq) => {
                    prop_assert!(value < 64);
                    prop_assert_eq!(u8::from(sq), value);
                    prop_assert_eq!(Square::new(sq.file(), sq.rank()), sq);
                    prop_assert_eq!(sq.to_algebraic().parse::<Square>(), Ok(sq));
                }
                Err(err) => {
                    prop_assert!(value >= 64);
                    prop_assert_eq!(err, CoreError::SquareOutOfRange(value));
                }
            }
            prop_assert_eq!(File::try_from(value).is_ok(), value < 8);
            prop_assert_eq!(Rank::try_from(value).is_ok(), value < 8);
            if let Ok(file) = File::try_from(value) {
                prop_assert_eq!(u8::from(file), value);
                prop_assert_eq!(File::from_char(file.to_char()), Some(file));
            }
            if let Ok(rank) = Rank::try_from(value) {
                prop_assert_eq!(u8::from(rank), value);
                prop_assert_eq!(Rank::from_char(rank.to_char()), Some(rank));
            }
        }
    }

    #[test]
    fn square_bit() {
        assert_eq!(Square::A1.bit(), 1);
        assert_eq!(Square::H1.bit(), 128);
        assert_eq!(Square::A8.bit(), 1 << 56);
    }
}
