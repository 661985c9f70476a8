use crate::piece::Color::{Black, White};
use crate::piece::PieceType::{Bishop, King, Knight, Pawn, Queen, Rook};
use std::fmt::{Display, Formatter};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Piece {
    pub piece_type: PieceType,
    pub color: Color,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PieceType {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}
impl PieceType {
    pub const PROMOTIONS: [PieceType; 4] = [Queen, Rook, Bishop, Knight];

    /// Uppercase letter used in algebraic notation, None for pawns
    pub fn san_letter(&self) -> Option<char> {
        match self {
            Pawn => None,
            Knight => Some('N'),
            Bishop => Some('B'),
            Rook => Some('R'),
            Queen => Some('Q'),
            King => Some('K'),
        }
    }

    /// Reads a piece letter in either case ('p' included)
    pub fn from_letter(c: char) -> Option<PieceType> {
        match c.to_ascii_lowercase() {
            'p' => Some(Pawn),
            'n' => Some(Knight),
            'b' => Some(Bishop),
            'r' => Some(Rook),
            'q' => Some(Queen),
            'k' => Some(King),
            _ => None,
        }
    }
}
impl Display for PieceType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Pawn => "p",
                Knight => "n",
                Bishop => "b",
                Rook => "r",
                Queen => "q",
                King => "k",
            }
        )
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Color {
    Black,
    White,
}
impl Color {
    pub fn opposite(&self) -> Color {
        match self {
            White => Black,
            Black => White,
        }
    }
    /// Rank direction pawns of this color advance in
    pub fn forward(&self) -> isize {
        match self {
            White => 1,
            Black => -1,
        }
    }
    pub fn name(&self) -> &'static str {
        match self {
            White => "White",
            Black => "Black",
        }
    }
}
impl Display for Color {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", if self == &Black { "b" } else { "w" })
    }
}

impl Piece {
    pub fn new(piece_type: PieceType, color: Color) -> Piece {
        Piece { piece_type, color }
    }

    /// FEN letter: uppercase for White, lowercase for Black
    pub fn from_char(c: char) -> Option<Piece> {
        let piece_type = PieceType::from_letter(c)?;
        let color = if c.is_ascii_lowercase() { Black } else { White };
        Some(Piece { piece_type, color })
    }
}

impl Display for Piece {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let letter = self.piece_type.to_string();
        write!(
            f,
            "{}",
            if self.color == White {
                letter.to_uppercase()
            } else {
                letter
            }
        )
    }
}
