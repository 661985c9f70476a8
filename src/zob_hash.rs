//! Position keys. Two positions share a key when they have the same pieces,
//! side to move, castling rights and en passant target, which is exactly
//! the repetition rule's notion of "the same position".

use crate::castling::CastlingRights;
use crate::piece::{Color, Piece};
use crate::square::{file_of, Square};

// Keys are generated by build.rs from a fixed seed, so a position gets the
// same key on every run
include!(concat!(env!("OUT_DIR"), "/zobrist_keys.rs"));

pub type Hash = u64;

const BLACK_TO_MOVE: usize = 768;
const CASTLING_OFFSET: usize = 769;
const EP_FILE_OFFSET: usize = 773;

pub struct ZobristHasher {}
impl ZobristHasher {
    /// Key of a whole position, computed from scratch
    pub fn position<I>(pieces: I, side_to_move: Color, castling_rights: CastlingRights, ep_target: Option<Square>) -> Hash
    where
        I: IntoIterator<Item = (Square, Piece)>,
    {
        pieces
            .into_iter()
            .fold(0u64, |h, (sq, p)| h ^ Self::piece_on(p, sq))
            ^ Self::side_to_move(side_to_move)
            ^ Self::castling(castling_rights)
            ^ Self::en_passant(ep_target)
    }

    pub fn piece_on(piece: Piece, sq: Square) -> Hash {
        let color_offset = if piece.color == Color::White { 6 * 64 } else { 0 };
        Self::ZOBRIST_KEYS[64 * piece.piece_type as usize + color_offset + sq]
    }

    pub fn side_to_move(color: Color) -> Hash {
        match color {
            Color::White => 0,
            Color::Black => Self::ZOBRIST_KEYS[BLACK_TO_MOVE],
        }
    }

    /// XOR-ing this in flips the side to move
    pub fn turn() -> Hash {
        Self::ZOBRIST_KEYS[BLACK_TO_MOVE]
    }

    pub fn castling(castling_rights: CastlingRights) -> Hash {
        let (wking, wqueen) = castling_rights.get(Color::White);
        let (bking, bqueen) = castling_rights.get(Color::Black);
        [wking, wqueen, bking, bqueen]
            .iter()
            .enumerate()
            .filter(|(_, right)| **right)
            .fold(0u64, |hash, (i, _)| hash ^ Self::ZOBRIST_KEYS[CASTLING_OFFSET + i])
    }

    /// Only the file of the target matters, the rank follows from the side to move
    pub fn en_passant(ep_target: Option<Square>) -> Hash {
        ep_target.map_or(0, |sq| Self::ZOBRIST_KEYS[EP_FILE_OFFSET + file_of(sq)])
    }
}
