use crate::{
    board::Board,
    movelist::MoveList,
    piece::{Color, PieceType},
    r#move::Move,
    square::{rank_of, step, Square},
};

// Knight and king target masks are computed by the build script
include!(concat!(env!("OUT_DIR"), "/lookup.rs"));

pub const DIAGONALS: [(isize, isize); 4] = [(1, 1), (1, -1), (-1, -1), (-1, 1)];
pub const CARDINALS: [(isize, isize); 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];

/// Iterates over the squares set in a 64 bit mask
pub fn squares(mut mask: u64) -> impl Iterator<Item = Square> {
    std::iter::from_fn(move || {
        if mask == 0 {
            return None;
        }
        let sq = mask.trailing_zeros() as Square;
        mask &= mask - 1;
        Some(sq)
    })
}

/// Generates every legal move of the side to move.
/// Pseudo-legal moves are made on a scratch board and dropped when they
/// leave the mover's king attacked
pub fn generate(board: &Board) -> MoveList {
    let side = board.side_to_move();
    let mut move_list = pseudo_legal(board);
    let mut scratch = board.clone();
    move_list.retain(|mv| {
        let entry = scratch.make(*mv);
        let safe = !scratch.in_check(side);
        scratch.unmake(&entry);
        safe
    });
    move_list
}

fn pseudo_legal(board: &Board) -> MoveList {
    let side = board.side_to_move();
    let mut move_list = MoveList::default();
    for (origin, piece) in board.pieces().filter(|(_, p)| p.color == side) {
        match piece.piece_type {
            PieceType::Pawn => pawn_moves(board, origin, &mut move_list),
            PieceType::Knight => step_moves(board, origin, KNIGHT_TARGETS[origin], &mut move_list),
            PieceType::King => step_moves(board, origin, KING_TARGETS[origin], &mut move_list),
            PieceType::Bishop => slider_moves(board, origin, &DIAGONALS, &mut move_list),
            PieceType::Rook => slider_moves(board, origin, &CARDINALS, &mut move_list),
            PieceType::Queen => {
                slider_moves(board, origin, &DIAGONALS, &mut move_list);
                slider_moves(board, origin, &CARDINALS, &mut move_list);
            }
        }
    }
    castling(board, &mut move_list);
    move_list
}

fn pawn_moves(board: &Board, origin: Square, move_list: &mut MoveList) {
    let side = board.side_to_move();
    let forward = side.forward();
    let (start_rank, promotion_rank) = if side == Color::White { (1, 7) } else { (6, 0) };

    let push = |target: Square, move_list: &mut MoveList| {
        if rank_of(target) == promotion_rank {
            for prom in Move::all_promotions(origin, target) {
                move_list.push(prom)
            }
        } else {
            move_list.push(Move::new_quiet(origin, target))
        }
    };

    if let Some(one) = step(origin, 0, forward).filter(|sq| board.piece_on(*sq).is_none()) {
        push(one, move_list);
        if rank_of(origin) == start_rank {
            if let Some(two) = step(one, 0, forward).filter(|sq| board.piece_on(*sq).is_none()) {
                move_list.push(Move::new_double_push(origin, two))
            }
        }
    }

    for target in [-1, 1].iter().filter_map(|df| step(origin, *df, forward)) {
        match board.color_on(target) {
            Some(c) if c != side => push(target, move_list),
            None if board.en_passant_target() == Some(target) => {
                move_list.push(Move::new_en_passant(origin, target))
            }
            _ => (),
        }
    }
}

fn step_moves(board: &Board, origin: Square, targets: u64, move_list: &mut MoveList) {
    let side = board.side_to_move();
    for target in squares(targets).filter(|sq| board.color_on(*sq) != Some(side)) {
        move_list.push(Move::new_quiet(origin, target))
    }
}

fn slider_moves(board: &Board, origin: Square, directions: &[(isize, isize)], move_list: &mut MoveList) {
    let side = board.side_to_move();
    for (df, dr) in directions {
        let mut current = origin;
        while let Some(target) = step(current, *df, *dr) {
            match board.color_on(target) {
                None => move_list.push(Move::new_quiet(origin, target)),
                Some(c) => {
                    if c != side {
                        move_list.push(Move::new_quiet(origin, target))
                    }
                    break;
                }
            }
            current = target;
        }
    }
}

fn castling(board: &Board, move_list: &mut MoveList) {
    let side = board.side_to_move();
    let (king_side_right, queen_side_right) = board.castling_rights().get(side);
    if !(king_side_right || queen_side_right) {
        return;
    }
    let king_square = if side == Color::White { 4 } else { 60 };
    if board.piece_type_on(king_square) != Some(PieceType::King) || board.in_check(side) {
        return;
    }

    let rook_on = |sq: Square| {
        matches!(board.piece_on(sq), Some(p) if p.piece_type == PieceType::Rook && p.color == side)
    };
    let empty = |sqs: &[Square]| sqs.iter().all(|sq| board.piece_on(*sq).is_none());
    let safe = |sqs: &[Square]| sqs.iter().all(|sq| !board.is_attacked(*sq, side.opposite()));

    let k = king_square;
    if king_side_right && rook_on(k + 3) && empty(&[k + 1, k + 2]) && safe(&[k + 1, k + 2]) {
        move_list.push(Move::new_kingside_castle(side))
    }
    if queen_side_right && rook_on(k - 4) && empty(&[k - 1, k - 2, k - 3]) && safe(&[k - 1, k - 2]) {
        move_list.push(Move::new_queenside_castle(side))
    }
}

/// Counts leaf nodes of the legal move tree, for move generator verification
pub fn perft(board: &mut Board, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }
    let moves = generate(board);
    if depth == 1 {
        return moves.len() as u64;
    }
    let mut nodes = 0;
    for mv in &moves {
        let entry = board.make(*mv);
        nodes += perft(board, depth - 1);
        board.unmake(&entry);
    }
    nodes
}
