use crate::piece::{Color, PieceType};
use crate::square::{self, square_representation, Square};
use std::fmt::{Display, Formatter};

/// Tags the moves whose side effects go beyond moving one piece
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Special {
    None,
    KingSideCastle,
    QueenSideCastle,
    EnPassant,
    DoublePush,
}

/// A move as produced by the generator. Two moves are equal when every
/// field is, so a move parsed from text only matches a generated one if
/// its tag agrees too
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Move {
    origin: Square,
    target: Square,
    promotion: Option<PieceType>,
    special: Special,
}

impl Move {
    fn new(origin: Square, target: Square, promotion: Option<PieceType>, special: Special) -> Move {
        Move { origin, target, promotion, special }
    }
    pub fn new_quiet(origin: Square, target: Square) -> Move {
        Self::new(origin, target, None, Special::None)
    }
    pub fn new_double_push(origin: Square, target: Square) -> Move {
        Self::new(origin, target, None, Special::DoublePush)
    }
    pub fn new_en_passant(origin: Square, target: Square) -> Move {
        Self::new(origin, target, None, Special::EnPassant)
    }
    pub fn new_kingside_castle(color: Color) -> Move {
        match color {
            Color::White => Self::new(4, 6, None, Special::KingSideCastle),
            Color::Black => Self::new(60, 62, None, Special::KingSideCastle),
        }
    }
    pub fn new_queenside_castle(color: Color) -> Move {
        match color {
            Color::White => Self::new(4, 2, None, Special::QueenSideCastle),
            Color::Black => Self::new(60, 58, None, Special::QueenSideCastle),
        }
    }
    pub fn new_promotion(origin: Square, target: Square, promote_to: PieceType) -> Move {
        Self::new(origin, target, Some(promote_to), Special::None)
    }
    pub fn all_promotions(origin: Square, target: Square) -> [Move; 4] {
        PieceType::PROMOTIONS.map(|p| Self::new_promotion(origin, target, p))
    }

    pub fn origin(&self) -> Square {
        self.origin
    }
    pub fn target(&self) -> Square {
        self.target
    }
    pub fn special(&self) -> Special {
        self.special
    }
    pub fn promotion_target(&self) -> Option<PieceType> {
        self.promotion
    }
    pub fn is_castle(&self) -> bool {
        matches!(self.special, Special::KingSideCastle | Special::QueenSideCastle)
    }

    /// Parses a move formatted in coordinate notation (e2e4, e7e8q).
    /// Since no information can be given on flags, it simply returns origin, target and potential
    /// piece type to promote to
    pub fn parse(mv: &str) -> Option<(Square, Square, Option<PieceType>)> {
        if !mv.is_ascii() || !(4..=5).contains(&mv.len()) {
            return None;
        }
        let origin = square::parse_square(&mv[0..2])?;
        let target = square::parse_square(&mv[2..4])?;
        let promotion_target = match mv[4..].chars().next() {
            None => None,
            Some(c) => match PieceType::from_letter(c)? {
                PieceType::Pawn | PieceType::King => return None,
                p => Some(p),
            },
        };
        Some((origin, target, promotion_target))
    }
}

/// Coordinate notation, the form UCI engines read and write
impl Display for Move {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let o = square_representation(self.origin).unwrap_or_else(|| String::from("**"));
        let t = square_representation(self.target).unwrap_or_else(|| String::from("**"));
        match self.promotion {
            Some(p) => write!(f, "{}{}{}", o, t, p),
            None => write!(f, "{}{}", o, t),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Move;
    use crate::piece::{Color, PieceType};

    #[test]
    fn coordinate_parsing() {
        assert_eq!(Move::parse("e2e4"), Some((12, 28, None)));
        assert_eq!(Move::parse("e7e8q"), Some((52, 60, Some(PieceType::Queen))));
        assert_eq!(Move::parse("e7e8k"), None);
        assert_eq!(Move::parse("Nf3"), None);
        assert_eq!(Move::parse("e2e4e5"), None);
    }

    #[test]
    fn castles_print_as_king_moves() {
        assert_eq!(Move::new_kingside_castle(Color::White).to_string(), "e1g1");
        assert_eq!(Move::new_queenside_castle(Color::Black).to_string(), "e8c8");
        assert_eq!(Move::new_promotion(52, 60, PieceType::Knight).to_string(), "e7e8n");
    }
}
