use std::time::Instant;

use crate::board::Board;
use crate::move_generator::perft;

pub mod advisor;
pub mod board;
pub mod castling;
pub mod command;
pub mod config;
pub mod console;
pub mod error;
pub mod history;
pub mod move_generator;
pub mod movelist;
pub mod notation;
pub mod piece;
pub mod r#move;
pub mod session;
pub mod square;
pub mod transcript;
pub mod uci;
pub mod zob_hash;

/// Prints node counts for every depth up to `depth`
pub fn run_perft(depth: u32, board: &mut Board) {
    println!("{}\n", board);
    println!("depth nodes\n--------");
    for d in 0..depth + 1 {
        let start = Instant::now();
        let nodes = perft(board, d);
        let elapsed = start.elapsed();
        println!(
            "{}     {} ({}s, {} nps)",
            d,
            nodes,
            elapsed.as_secs_f32(),
            nodes as f32 / elapsed.as_secs_f32()
        );
    }
}
