use std::fmt::{Display, Formatter};

use crate::castling::CastlingRights;
use crate::error::{FenError, IllegalMoveError, ReverseError};
use crate::history::HistoryEntry;
use crate::move_generator::{self, squares, CARDINALS, DIAGONALS, KING_TARGETS, KNIGHT_TARGETS};
use crate::movelist::MoveList;
use crate::piece::Color::{Black, White};
use crate::piece::{Color, Piece, PieceType};
use crate::r#move::{Move, Special};
use crate::square::{is_light, parse_square, rank_of, square_representation, step, Square};
use crate::zob_hash::{Hash, ZobristHasher};

pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

// Squares are indexed a1 = 0, b1 = 1, ..., h8 = 63.

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    pieces: [Option<Piece>; 64],
    side_to_move: Color,
    castling_rights: CastlingRights,
    ep_target: Option<Square>,
    halfmove_clock: u32,
    fullmove_number: u32,
    hash: Hash,
}

impl Board {
    /// Creates a new board given its FEN representation
    pub fn new(fen: &str) -> Result<Board, FenError> {
        let mut b = Board::empty();
        b.set_fen(fen)?;
        Ok(b)
    }

    /// The standard initial position
    pub fn starting_position() -> Board {
        use PieceType::*;
        let back_rank = [Rook, Knight, Bishop, Queen, King, Bishop, Knight, Rook];
        let mut b = Board::empty();
        for (file, piece_type) in back_rank.into_iter().enumerate() {
            b.add_piece(Piece::new(piece_type, White), file);
            b.add_piece(Piece::new(Pawn, White), 8 + file);
            b.add_piece(Piece::new(Pawn, Black), 48 + file);
            b.add_piece(Piece::new(piece_type, Black), 56 + file);
        }
        b.castling_rights = CastlingRights::new();
        b.hash = b.cold_hash();
        b
    }

    fn empty() -> Board {
        Board {
            pieces: [None; 64],
            side_to_move: White,
            castling_rights: CastlingRights::NONE,
            ep_target: None,
            halfmove_clock: 0,
            fullmove_number: 1,
            hash: 0,
        }
    }

    /// Every legal move for the side to move
    pub fn legal_moves(&self) -> MoveList {
        move_generator::generate(self)
    }

    /// Plays a move after checking it against the legal move set
    pub fn apply(&mut self, mv: Move) -> Result<HistoryEntry, IllegalMoveError> {
        if !self.legal_moves().contains(&mv) {
            return Err(IllegalMoveError(mv));
        }
        Ok(self.make(mv))
    }

    /// Takes back the move recorded in `entry`, which must be the last one
    /// applied to this position
    pub fn reverse(&mut self, entry: &HistoryEntry) -> Result<(), ReverseError> {
        let mv = entry.move_played;
        if self.hash != entry.hash_after || self.pieces[mv.target()].is_none() {
            return Err(ReverseError::OutOfOrder(mv));
        }
        self.unmake(entry);
        Ok(())
    }

    /// Makes a move on the board.
    /// The move is expected to be at least pseudo-legal, anything else
    /// will break the position
    pub(crate) fn make(&mut self, mv: Move) -> HistoryEntry {
        let origin = mv.origin();
        let target = mv.target();
        let side = self.side_to_move;
        let hash_before = self.hash;

        let Some(moved_piece) = self.remove_piece(origin) else {
            unreachable!("move {} starts on an empty square", mv)
        };
        let captured_piece = match mv.special() {
            Special::EnPassant => self.remove_piece(en_passant_victim(target, side)),
            _ => self.remove_piece(target),
        };

        let mut entry = HistoryEntry {
            move_played: mv,
            moved_piece,
            captured_piece,
            castling_rights: self.castling_rights,
            ep_target: self.ep_target,
            halfmove_clock: self.halfmove_clock,
            fullmove_number: self.fullmove_number,
            hash_before,
            hash_after: 0,
        };

        self.hash ^= ZobristHasher::castling(self.castling_rights);
        if moved_piece.piece_type == PieceType::King {
            self.castling_rights.uncastle(side);
        }
        self.castling_rights.touch(origin);
        self.castling_rights.touch(target);
        self.hash ^= ZobristHasher::castling(self.castling_rights);

        self.hash ^= ZobristHasher::en_passant(self.ep_target);
        self.ep_target = None;

        let placed = match mv.promotion_target() {
            Some(p) => Piece::new(p, side),
            None => moved_piece,
        };
        self.add_piece(placed, target);

        match mv.special() {
            Special::DoublePush => {
                self.ep_target = Some((origin + target) / 2);
                self.hash ^= ZobristHasher::en_passant(self.ep_target);
            }
            Special::KingSideCastle => self.shift_rook(origin + 3, origin + 1),
            Special::QueenSideCastle => self.shift_rook(origin - 4, origin - 1),
            Special::EnPassant | Special::None => (),
        }

        if moved_piece.piece_type == PieceType::Pawn || captured_piece.is_some() {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock += 1;
        }
        if side == Black {
            self.fullmove_number += 1;
        }
        self.hash ^= ZobristHasher::turn();
        self.side_to_move = side.opposite();

        entry.hash_after = self.hash;
        entry
    }

    /// Unmakes the move recorded in the given entry
    pub(crate) fn unmake(&mut self, entry: &HistoryEntry) {
        let mv = entry.move_played;
        self.side_to_move = self.side_to_move.opposite();
        let side = self.side_to_move;

        self.remove_piece(mv.target());
        self.add_piece(entry.moved_piece, mv.origin());
        if let Some(captured) = entry.captured_piece {
            let sq = match mv.special() {
                Special::EnPassant => en_passant_victim(mv.target(), side),
                _ => mv.target(),
            };
            self.add_piece(captured, sq);
        }
        match mv.special() {
            Special::KingSideCastle => self.shift_rook(mv.origin() + 1, mv.origin() + 3),
            Special::QueenSideCastle => self.shift_rook(mv.origin() - 1, mv.origin() - 4),
            _ => (),
        }

        self.castling_rights = entry.castling_rights;
        self.ep_target = entry.ep_target;
        self.halfmove_clock = entry.halfmove_clock;
        self.fullmove_number = entry.fullmove_number;
        self.hash = entry.hash_before;
    }

    fn shift_rook(&mut self, from: Square, to: Square) {
        if let Some(rook) = self.remove_piece(from) {
            self.add_piece(rook, to)
        }
    }

    /// Places a new piece on a given square
    fn add_piece(&mut self, piece: Piece, sq: Square) {
        self.pieces[sq] = Some(piece);
        self.hash ^= ZobristHasher::piece_on(piece, sq);
    }

    /// Clears the given square, returning the piece that has been removed if any
    fn remove_piece(&mut self, sq: Square) -> Option<Piece> {
        let removed = self.pieces[sq].take();
        if let Some(p) = removed {
            self.hash ^= ZobristHasher::piece_on(p, sq);
        }
        removed
    }

    /*
    INTERESTING GETTERS
     */
    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    pub fn en_passant_target(&self) -> Option<Square> {
        self.ep_target
    }

    pub fn castling_rights(&self) -> CastlingRights {
        self.castling_rights
    }

    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    pub fn fullmove_number(&self) -> u32 {
        self.fullmove_number
    }

    pub fn piece_on(&self, sq: Square) -> Option<Piece> {
        self.pieces[sq]
    }

    pub fn piece_type_on(&self, sq: Square) -> Option<PieceType> {
        self.pieces[sq].map(|p| p.piece_type)
    }

    pub fn color_on(&self, sq: Square) -> Option<Color> {
        self.pieces[sq].map(|p| p.color)
    }

    /// Iterates over occupied squares
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        self.pieces
            .iter()
            .enumerate()
            .filter_map(|(sq, p)| p.map(|p| (sq, p)))
    }

    pub fn king_square(&self, color: Color) -> Option<Square> {
        self.pieces()
            .find(|(_, p)| p.piece_type == PieceType::King && p.color == color)
            .map(|(sq, _)| sq)
    }

    pub fn get_hash(&self) -> Hash {
        self.hash
    }

    /*
    ATTACKS AND GAME STATUS
     */
    pub fn in_check(&self, side: Color) -> bool {
        match self.king_square(side) {
            Some(sq) => self.is_attacked(sq, side.opposite()),
            None => false,
        }
    }

    /// Whether any piece of `by` attacks the given square
    pub fn is_attacked(&self, sq: Square, by: Color) -> bool {
        let holds = |s: Square, kinds: &[PieceType]| {
            matches!(self.pieces[s], Some(p) if p.color == by && kinds.contains(&p.piece_type))
        };

        let pawn_rank = -by.forward();
        if [-1, 1]
            .iter()
            .filter_map(|df| step(sq, *df, pawn_rank))
            .any(|s| holds(s, &[PieceType::Pawn]))
        {
            return true;
        }
        if squares(KNIGHT_TARGETS[sq]).any(|s| holds(s, &[PieceType::Knight])) {
            return true;
        }
        if squares(KING_TARGETS[sq]).any(|s| holds(s, &[PieceType::King])) {
            return true;
        }

        let slides = |dirs: &[(isize, isize)], kinds: &[PieceType]| {
            dirs.iter().any(|(df, dr)| {
                let mut current = sq;
                while let Some(next) = step(current, *df, *dr) {
                    if self.pieces[next].is_some() {
                        return holds(next, kinds);
                    }
                    current = next;
                }
                false
            })
        };
        slides(&DIAGONALS, &[PieceType::Bishop, PieceType::Queen])
            || slides(&CARDINALS, &[PieceType::Rook, PieceType::Queen])
    }

    pub fn is_check(&self) -> bool {
        self.in_check(self.side_to_move)
    }

    pub fn is_checkmate(&self) -> bool {
        self.is_check() && self.legal_moves().is_empty()
    }

    pub fn is_stalemate(&self) -> bool {
        !self.is_check() && self.legal_moves().is_empty()
    }

    /// Fifty full moves without a capture or a pawn move
    pub fn fifty_move_rule(&self) -> bool {
        self.halfmove_clock >= 100
    }

    /// Neither side can ever mate: bare kings, a single minor piece, or
    /// bishops that all stand on one square color
    pub fn is_insufficient_material(&self) -> bool {
        let others: Vec<(Square, Piece)> = self
            .pieces()
            .filter(|(_, p)| p.piece_type != PieceType::King)
            .collect();
        match others.as_slice() {
            [] => true,
            [(_, p)] => matches!(p.piece_type, PieceType::Knight | PieceType::Bishop),
            many => {
                many.iter().all(|(_, p)| p.piece_type == PieceType::Bishop)
                    && many.iter().all(|(sq, _)| is_light(*sq) == is_light(many[0].0))
            }
        }
    }

    /// Where the game stands, `repetitions` being how many times the
    /// current position has occurred
    pub fn status(&self, repetitions: usize) -> GameStatus {
        let stuck = self.legal_moves().is_empty();
        let check = self.is_check();
        match (stuck, check) {
            (true, true) => GameStatus::Checkmate {
                winner: self.side_to_move.opposite(),
            },
            (true, false) => GameStatus::Draw(DrawReason::Stalemate),
            _ if self.is_insufficient_material() => GameStatus::Draw(DrawReason::InsufficientMaterial),
            _ if self.fifty_move_rule() => GameStatus::Draw(DrawReason::FiftyMoveRule),
            _ if repetitions >= 3 => GameStatus::Draw(DrawReason::Repetition),
            (false, true) => GameStatus::Check,
            (false, false) => GameStatus::InProgress,
        }
    }

    /*
    FEN STRING OPERATIONS
     */
    fn set_fen(&mut self, fen: &str) -> Result<(), FenError> {
        let sections: Vec<&str> = fen.split_whitespace().collect();
        if !(4..=6).contains(&sections.len()) {
            return Err(FenError::FieldCount(sections.len()));
        }

        let ranks: Vec<&str> = sections[0].split('/').collect();
        if ranks.len() != 8 {
            return Err(FenError::Placement(sections[0].to_string()));
        }
        for (i, rank) in ranks.iter().enumerate() {
            let mut current_square = (7 - i) * 8;
            let rank_end = current_square + 8;
            for c in rank.chars() {
                if let Some(skip) = c.to_digit(10).filter(|d| (1..=8).contains(d)) {
                    current_square += skip as usize;
                } else {
                    let piece = Piece::from_char(c)
                        .filter(|_| current_square < rank_end)
                        .ok_or_else(|| FenError::Placement(rank.to_string()))?;
                    self.add_piece(piece, current_square);
                    current_square += 1;
                }
            }
            if current_square != rank_end {
                return Err(FenError::Placement(rank.to_string()));
            }
        }
        let pawn_on_edge = self.pieces().any(|(sq, p)| {
            p.piece_type == PieceType::Pawn && (rank_of(sq) == 0 || rank_of(sq) == 7)
        });
        if pawn_on_edge {
            return Err(FenError::Placement(sections[0].to_string()));
        }

        self.side_to_move = match sections[1] {
            "w" => White,
            "b" => Black,
            other => return Err(FenError::SideToMove(other.to_string())),
        };
        self.castling_rights = CastlingRights::from_fen(sections[2])
            .ok_or_else(|| FenError::Castling(sections[2].to_string()))?;
        self.ep_target = match sections[3] {
            "-" => None,
            sq => {
                let expected_rank = if self.side_to_move == White { 5 } else { 2 };
                let parsed = parse_square(sq)
                    .filter(|s| sq.len() == 2 && rank_of(*s) == expected_rank)
                    .ok_or_else(|| FenError::EnPassant(sq.to_string()))?;
                Some(parsed)
            }
        };
        let counter = |i: usize, default: u32| match sections.get(i) {
            None => Ok(default),
            Some(s) => s.parse::<u32>().map_err(|_| FenError::Counter(s.to_string())),
        };
        self.halfmove_clock = counter(4, 0)?;
        self.fullmove_number = counter(5, 1)?.max(1);

        let king_count = |c: Color| {
            self.pieces()
                .filter(|(_, p)| p.piece_type == PieceType::King && p.color == c)
                .count()
        };
        if king_count(White) != 1 || king_count(Black) != 1 {
            return Err(FenError::Kings);
        }
        if self.in_check(self.side_to_move.opposite()) {
            return Err(FenError::OpponentInCheck);
        }

        self.hash = self.cold_hash();
        Ok(())
    }

    pub fn get_fen(&self) -> String {
        let mut fen = String::new();
        for rank in (0..8).rev() {
            let mut empty_counter = 0;
            for sq in rank * 8..rank * 8 + 8 {
                match self.pieces[sq] {
                    Some(p) => {
                        if empty_counter != 0 {
                            fen.push_str(&empty_counter.to_string())
                        }
                        empty_counter = 0;
                        fen.push_str(&p.to_string())
                    }
                    None => empty_counter += 1,
                }
            }
            if empty_counter != 0 {
                fen.push_str(&empty_counter.to_string())
            }
            if rank != 0 {
                fen.push('/')
            }
        }

        let ep = self
            .ep_target
            .and_then(square_representation)
            .unwrap_or_else(|| String::from("-"));
        format!(
            "{} {} {} {} {} {}",
            fen, self.side_to_move, self.castling_rights, ep, self.halfmove_clock, self.fullmove_number
        )
    }

    fn cold_hash(&self) -> Hash {
        ZobristHasher::position(self.pieces(), self.side_to_move, self.castling_rights, self.ep_target)
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::starting_position()
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DrawReason {
    Stalemate,
    InsufficientMaterial,
    FiftyMoveRule,
    Repetition,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameStatus {
    InProgress,
    Check,
    Checkmate { winner: Color },
    Draw(DrawReason),
}

impl GameStatus {
    pub fn is_over(&self) -> bool {
        matches!(self, GameStatus::Checkmate { .. } | GameStatus::Draw(_))
    }

    /// PGN result token
    pub fn result_marker(&self) -> &'static str {
        match self {
            GameStatus::Checkmate { winner: White } => "1-0",
            GameStatus::Checkmate { winner: Black } => "0-1",
            GameStatus::Draw(_) => "1/2-1/2",
            GameStatus::InProgress | GameStatus::Check => "*",
        }
    }
}

impl Display for GameStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            GameStatus::InProgress => write!(f, "in progress"),
            GameStatus::Check => write!(f, "check"),
            GameStatus::Checkmate { winner } => write!(f, "checkmate, {} wins", winner.name()),
            GameStatus::Draw(DrawReason::Stalemate) => write!(f, "stalemate"),
            GameStatus::Draw(DrawReason::InsufficientMaterial) => write!(f, "draw by insufficient material"),
            GameStatus::Draw(DrawReason::FiftyMoveRule) => write!(f, "draw by the fifty-move rule"),
            GameStatus::Draw(DrawReason::Repetition) => write!(f, "draw by threefold repetition"),
        }
    }
}

/// Square of the pawn taken by an en passant capture landing on `target`
fn en_passant_victim(target: Square, mover: Color) -> Square {
    match mover {
        White => target - 8,
        Black => target + 8,
    }
}

impl Display for Board {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let ep = self
            .ep_target
            .and_then(square_representation)
            .unwrap_or_else(|| String::from("-"));
        let side_notes = [
            format!("side to move: {}", self.side_to_move.name()),
            format!("castling rights: {}", self.castling_rights),
            format!("en passant: {}", ep),
            format!("halfmove clock: {}", self.halfmove_clock),
            format!("fullmove number: {}", self.fullmove_number),
        ];

        for rank in (0..8).rev() {
            write!(f, "{} ", rank + 1)?;
            for sq in rank * 8..rank * 8 + 8 {
                match self.pieces[sq] {
                    None => write!(f, ". ")?,
                    Some(p) => write!(f, "{} ", p)?,
                }
            }
            if let Some(note) = side_notes.get(7 - rank) {
                write!(f, "  {}", note)?;
            }
            writeln!(f)?;
        }
        writeln!(f, "  a b c d e f g h")?;
        write!(f, "fen: {}", self.get_fen())
    }
}
