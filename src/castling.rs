use crate::piece::Color;
use crate::piece::Color::{Black, White};
use crate::square::Square;
use std::fmt::{Display, Formatter};

/// The four castling rights, packed as KQkq from the high bit down
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct CastlingRights(u8);

impl CastlingRights {
    pub const NONE: CastlingRights = CastlingRights(0);

    pub fn new() -> CastlingRights {
        CastlingRights(0b1111)
    }

    /// Reads the FEN castling field. Returns None on any character other
    /// than KQkq, or on a repeated one
    pub fn from_fen(s: &str) -> Option<CastlingRights> {
        if s == "-" {
            return Some(Self::NONE);
        }
        let mut res = CastlingRights(0);
        for c in s.chars() {
            let bit = match c {
                'K' => 0b1000,
                'Q' => 0b0100,
                'k' => 0b0010,
                'q' => 0b0001,
                _ => return None,
            };
            if res.0 & bit != 0 {
                return None;
            }
            res.0 |= bit
        }
        Some(res)
    }

    /// Returns the (kingside, queenside) castling rights of a given color
    pub fn get(&self, side: Color) -> (bool, bool) {
        match side {
            White => (self.0 & 0b1000 != 0, self.0 & 0b0100 != 0),
            Black => (self.0 & 0b10 != 0, self.0 & 0b01 != 0),
        }
    }
    /// Marks the given side as unable to castle
    pub fn uncastle(&mut self, side: Color) {
        self.0 &= match side {
            White => 0b0011,
            Black => 0b1100,
        }
    }
    /// Marks the given side as unable to castle kingside
    pub fn uncastle_kingside(&mut self, side: Color) {
        self.0 &= match side {
            White => 0b0111,
            Black => 0b1101,
        }
    }
    /// Marks the given side as unable to castle queenside
    pub fn uncastle_queenside(&mut self, side: Color) {
        self.0 &= match side {
            White => 0b1011,
            Black => 0b1110,
        }
    }

    /// Drops the right tied to a rook corner whenever something leaves or
    /// lands on that corner
    pub fn touch(&mut self, sq: Square) {
        match sq {
            0 => self.uncastle_queenside(White),
            7 => self.uncastle_kingside(White),
            56 => self.uncastle_queenside(Black),
            63 => self.uncastle_kingside(Black),
            _ => (),
        }
    }
}

impl Display for CastlingRights {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.0 == 0 {
            return write!(f, "-");
        }
        let (wking, wqueen) = self.get(White);
        let (bking, bqueen) = self.get(Black);
        write!(
            f,
            "{}{}{}{}",
            if wking { "K" } else { "" },
            if wqueen { "Q" } else { "" },
            if bking { "k" } else { "" },
            if bqueen { "q" } else { "" }
        )
    }
}

impl Default for CastlingRights {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::CastlingRights;
    use crate::piece::Color::{Black, White};

    #[test]
    fn fen_field_round_trips() {
        for field in ["KQkq", "Kq", "k", "-"] {
            assert_eq!(CastlingRights::from_fen(field).unwrap().to_string(), field);
        }
        assert!(CastlingRights::from_fen("KK").is_none());
        assert!(CastlingRights::from_fen("X").is_none());
    }

    #[test]
    fn corner_touch_drops_single_right() {
        let mut rights = CastlingRights::new();
        rights.touch(63);
        assert_eq!(rights.get(Black), (false, true));
        assert_eq!(rights.get(White), (true, true));
        rights.touch(0);
        assert_eq!(rights.get(White), (true, false));
    }
}
