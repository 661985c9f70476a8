//! Standard algebraic notation (SAN) and coordinate notation.
//!
//! Parsing is lenient about the things a dictated token gets wrong
//! (missing capture marker, `0-0` for castling, an uppercased file letter)
//! but a token only ever resolves to a move that is legal on the board.

use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::board::Board;
use crate::error::NotationError;
use crate::piece::PieceType;
use crate::r#move::{Move, Special};
use crate::square::{file_char, file_of, parse_file, parse_rank, parse_square, rank_char, rank_of, square_representation};

fn san_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"^(?:(?P<castle>[Oo0]-[Oo0](?P<long>-[Oo0])?)|(?P<piece>[NBRQK])?(?P<file>[a-h])?(?P<rank>[1-8])?x?(?P<target>[a-h][1-8])(?:=?(?P<promotion>[NBRQnbrq]))?)[+#]?[!?]{0,2}$",
        )
        .expect("SAN pattern compiles")
    })
}

/// Renders a move in SAN. `board` is the position before the move
/// ```
/// use voice_chess::board::Board;
/// use voice_chess::notation::to_notation;
/// use voice_chess::r#move::Move;
/// let board = Board::starting_position();
/// assert_eq!(to_notation(Move::new_quiet(6, 21), &board), "Nf3");
/// assert_eq!(to_notation(Move::new_double_push(12, 28), &board), "e4");
/// ```
pub fn to_notation(mv: Move, board: &Board) -> String {
    let mut san = match mv.special() {
        Special::KingSideCastle => String::from("O-O"),
        Special::QueenSideCastle => String::from("O-O-O"),
        _ => match board.piece_type_on(mv.origin()) {
            Some(piece_type) => body(mv, piece_type, board),
            None => return mv.to_string(),
        },
    };

    let mut after = board.clone();
    after.make(mv);
    if after.is_checkmate() {
        san.push('#')
    } else if after.is_check() {
        san.push('+')
    }
    san
}

fn body(mv: Move, piece_type: PieceType, board: &Board) -> String {
    let mut san = String::new();
    let is_capture = board.piece_on(mv.target()).is_some() || mv.special() == Special::EnPassant;
    let target = square_representation(mv.target()).unwrap_or_default();

    match piece_type.san_letter() {
        None => {
            if is_capture {
                san.push(file_char(mv.origin()));
                san.push('x');
            }
            san.push_str(&target);
            if let Some(p) = mv.promotion_target().and_then(|p| p.san_letter()) {
                san.push('=');
                san.push(p);
            }
        }
        Some(letter) => {
            san.push(letter);
            let rivals: Vec<Move> = board
                .legal_moves()
                .iter()
                .filter(|m| {
                    m.target() == mv.target()
                        && m.origin() != mv.origin()
                        && !m.is_castle()
                        && board.piece_type_on(m.origin()) == Some(piece_type)
                })
                .copied()
                .collect();
            if !rivals.is_empty() {
                let file_shared = rivals.iter().any(|m| file_of(m.origin()) == file_of(mv.origin()));
                let rank_shared = rivals.iter().any(|m| rank_of(m.origin()) == rank_of(mv.origin()));
                if !file_shared {
                    san.push(file_char(mv.origin()));
                } else if !rank_shared {
                    san.push(rank_char(mv.origin()));
                } else {
                    san.push(file_char(mv.origin()));
                    san.push(rank_char(mv.origin()));
                }
            }
            if is_capture {
                san.push('x');
            }
            san.push_str(&target);
        }
    }
    san
}

/// Resolves a token to the unique legal move it designates.
///
/// Coordinate notation is tried first, and only for tokens of 4 letters or
/// digits (5 with a promotion letter). Anything else is read as SAN.
/// ```
/// use voice_chess::board::Board;
/// use voice_chess::notation::parse;
/// let board = Board::starting_position();
/// assert_eq!(parse("e2e4", &board), parse("e4", &board));
/// assert!(parse("e5", &board).is_err());
/// ```
pub fn parse(token: &str, board: &Board) -> Result<Move, NotationError> {
    let token = token.trim();
    if let Some((origin, target, promotion)) = coordinates(token) {
        return board
            .legal_moves()
            .iter()
            .find(|m| m.origin() == origin && m.target() == target && m.promotion_target() == promotion)
            .copied()
            .ok_or_else(|| NotationError::UnknownNotation(token.to_string()));
    }

    match parse_san(token, board) {
        Err(NotationError::UnknownNotation(_)) if token.starts_with(|c: char| ('A'..='H').contains(&c)) => {
            // An uppercased file letter, as in "Exd5". B was already tried as a bishop
            let lowered = token[..1].to_ascii_lowercase() + &token[1..];
            parse_san(&lowered, board).map_err(|e| match e {
                NotationError::UnknownNotation(_) => NotationError::UnknownNotation(token.to_string()),
                ambiguous => ambiguous,
            })
        }
        result => result,
    }
}

fn coordinates(token: &str) -> Option<(usize, usize, Option<PieceType>)> {
    if !token.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Move::parse(&token.to_ascii_lowercase())
}

fn parse_san(token: &str, board: &Board) -> Result<Move, NotationError> {
    let unknown = || NotationError::UnknownNotation(token.to_string());
    let caps = san_pattern().captures(token).ok_or_else(unknown)?;
    let legal = board.legal_moves();

    let candidates: Vec<Move> = if caps.name("castle").is_some() {
        let wanted = if caps.name("long").is_some() {
            Special::QueenSideCastle
        } else {
            Special::KingSideCastle
        };
        legal.iter().filter(|m| m.special() == wanted).copied().collect()
    } else {
        let first_char = |name: &str| caps.name(name).and_then(|m| m.as_str().chars().next());
        let piece_type = first_char("piece")
            .and_then(PieceType::from_letter)
            .unwrap_or(PieceType::Pawn);
        let file = first_char("file").and_then(parse_file);
        let rank = first_char("rank").and_then(parse_rank);
        let promotion = first_char("promotion").and_then(PieceType::from_letter);
        let target = target_square(&caps).ok_or_else(unknown)?;

        legal
            .iter()
            .filter(|m| {
                !m.is_castle()
                    && m.target() == target
                    && m.promotion_target() == promotion
                    && board.piece_type_on(m.origin()) == Some(piece_type)
                    && file.map_or(true, |f| file_of(m.origin()) == f)
                    && rank.map_or(true, |r| rank_of(m.origin()) == r)
                    // a pawn only leaves its file when the origin file is given
                    && (piece_type != PieceType::Pawn || file.is_some() || file_of(m.origin()) == file_of(target))
            })
            .copied()
            .collect()
    };

    match candidates.as_slice() {
        [mv] => Ok(*mv),
        [] => Err(unknown()),
        _ => Err(NotationError::AmbiguousMove(token.to_string())),
    }
}

fn target_square(caps: &Captures) -> Option<usize> {
    parse_square(caps.name("target")?.as_str())
}

#[cfg(test)]
mod tests {
    use super::{parse, to_notation};
    use crate::board::Board;
    use crate::error::NotationError;
    use crate::piece::{Color, PieceType};
    use crate::r#move::Move;

    fn board_after(coordinates: &[&str]) -> Board {
        let mut board = Board::starting_position();
        for c in coordinates {
            let mv = parse(c, &board).unwrap();
            board.apply(mv).unwrap();
        }
        board
    }

    #[test]
    fn every_legal_move_survives_a_round_trip() {
        for fen in [
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
            "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1",
            "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
            "r4rk1/1pp1qppp/p1np1n2/2b1p1B1/2B1P1b1/P1NP1N2/1PP1QPPP/R4RK1 w - - 0 10",
        ] {
            let board = Board::new(fen).unwrap();
            for mv in &board.legal_moves() {
                let san = to_notation(*mv, &board);
                assert_eq!(parse(&san, &board), Ok(*mv), "{} in {}", san, fen);
                assert_eq!(to_notation(parse(&san, &board).unwrap(), &board), san);
            }
        }
    }

    #[test]
    fn knights_reaching_the_same_square_need_disambiguation() {
        let board = Board::new("4k3/8/8/8/8/8/3N4/4K1N1 w - - 0 1").unwrap();
        assert_eq!(parse("Nf3", &board), Err(NotationError::AmbiguousMove(String::from("Nf3"))));
        let from_g1 = parse("Ngf3", &board).unwrap();
        assert_eq!(from_g1, Move::new_quiet(6, 21));
        assert_eq!(to_notation(from_g1, &board), "Ngf3");
        assert_eq!(to_notation(parse("Ndf3", &board).unwrap(), &board), "Ndf3");

        let same_file = Board::new("4k3/8/8/6N1/8/8/8/4K1N1 w - - 0 1").unwrap();
        assert_eq!(to_notation(Move::new_quiet(6, 21), &same_file), "N1f3");
        assert_eq!(to_notation(Move::new_quiet(38, 21), &same_file), "N5f3");
    }

    #[test]
    fn both_file_and_rank_when_neither_alone_is_enough() {
        let board = Board::new("8/8/k7/3Q4/8/8/8/K2Q3Q w - - 0 1").unwrap();
        assert_eq!(to_notation(Move::new_quiet(3, 39), &board), "Qd1h5");
        assert_eq!(parse("Qd1h5", &board), Ok(Move::new_quiet(3, 39)));
    }

    #[test]
    fn special_moves() {
        let castling = Board::new("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        assert_eq!(to_notation(Move::new_kingside_castle(Color::White), &castling), "O-O");
        assert_eq!(to_notation(Move::new_queenside_castle(Color::White), &castling), "O-O-O");
        assert_eq!(parse("0-0-0", &castling), Ok(Move::new_queenside_castle(Color::White)));
        assert_eq!(parse("O-O", &castling), Ok(Move::new_kingside_castle(Color::White)));
        assert!(parse("Kg1", &castling).is_err());

        let promotion = Board::new("r3k3/1P6/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        let push = Move::new_promotion(49, 57, PieceType::Queen);
        let take = Move::new_promotion(49, 56, PieceType::Queen);
        assert_eq!(to_notation(push, &promotion), "b8=Q+");
        assert_eq!(to_notation(take, &promotion), "bxa8=Q+");
        assert_eq!(parse("bxa8Q", &promotion), Ok(take));
        assert_eq!(parse("b8=N", &promotion), Ok(Move::new_promotion(49, 57, PieceType::Knight)));
        assert!(parse("b8", &promotion).is_err());

        let en_passant = board_after(&["e2e4", "a7a6", "e4e5", "d7d5"]);
        assert_eq!(to_notation(Move::new_en_passant(36, 43), &en_passant), "exd6");
        assert_eq!(parse("ed6", &en_passant), Ok(Move::new_en_passant(36, 43)));

        let mate = board_after(&["f2f3", "e7e5", "g2g4"]);
        assert_eq!(to_notation(Move::new_quiet(59, 31), &mate), "Qh4#");
    }

    #[test]
    fn coordinate_form_takes_precedence() {
        let board = Board::starting_position();
        assert_eq!(parse("g1f3", &board), Ok(Move::new_quiet(6, 21)));
        assert_eq!(parse("G1f3", &board), Ok(Move::new_quiet(6, 21)));
        assert_eq!(parse("e2e5", &board), Err(NotationError::UnknownNotation(String::from("e2e5"))));

        let promotion = Board::new("4k3/1P6/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        assert_eq!(parse("b7b8r", &promotion), Ok(Move::new_promotion(49, 57, PieceType::Rook)));
    }

    #[test]
    fn uppercased_file_letters_are_forgiven() {
        let board = board_after(&["e2e4", "d7d5"]);
        assert_eq!(parse("Exd5", &board), Ok(Move::new_quiet(28, 35)));
        assert_eq!(parse("E5", &board), Ok(Move::new_quiet(28, 36)));
        // the bishop reading comes first
        let bishop = board_after(&["e2e4", "e7e5"]);
        assert_eq!(parse("Bc4", &bishop), Ok(Move::new_quiet(5, 26)));
        assert_eq!(parse("B3", &bishop), Ok(Move::new_quiet(9, 17)));
        assert_eq!(parse("Xyz", &bishop), Err(NotationError::UnknownNotation(String::from("Xyz"))));
    }

    #[test]
    fn suffixes_and_missing_capture_marker_are_accepted() {
        let board = board_after(&["e2e4", "d7d5"]);
        assert_eq!(parse("exd5!?", &board), Ok(Move::new_quiet(28, 35)));
        assert_eq!(parse("ed5", &board), Ok(Move::new_quiet(28, 35)));
        assert_eq!(parse("d5", &board), Err(NotationError::UnknownNotation(String::from("d5"))));
    }
}
