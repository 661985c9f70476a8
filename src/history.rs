use tracing::warn;

use crate::board::Board;
use crate::castling::CastlingRights;
use crate::error::IllegalMoveError;
use crate::piece::Piece;
use crate::r#move::Move;
use crate::square::Square;
use crate::zob_hash::Hash;

/// Records the informations that are lost when making a move, so it can
/// be taken back exactly
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub move_played: Move,
    pub moved_piece: Piece,
    pub captured_piece: Option<Piece>,
    pub castling_rights: CastlingRights,
    pub ep_target: Option<Square>,
    pub halfmove_clock: u32,
    pub fullmove_number: u32,
    pub hash_before: Hash,
    pub hash_after: Hash,
}

/// The applied moves of a game, plus the moves taken back that can still
/// be replayed.
///
/// The redo sequence only ever continues the most recent chain of undos:
/// committing any new move empties it.
#[derive(Debug, Clone)]
pub struct GameLog {
    start: Board,
    applied: Vec<HistoryEntry>,
    undone: Vec<Move>,
}

impl GameLog {
    pub fn new(start: Board) -> GameLog {
        GameLog {
            start,
            applied: Vec::with_capacity(128),
            undone: Vec::new(),
        }
    }

    /// Position the game started from
    pub fn start(&self) -> &Board {
        &self.start
    }

    /// Applies a new move and forgets any pending redo
    pub fn commit(&mut self, board: &mut Board, mv: Move) -> Result<HistoryEntry, IllegalMoveError> {
        let entry = board.apply(mv)?;
        self.applied.push(entry);
        self.undone.clear();
        Ok(entry)
    }

    /// Takes back the last applied move. Returns false when there is none
    pub fn undo(&mut self, board: &mut Board) -> bool {
        let Some(entry) = self.applied.last().copied() else {
            return false;
        };
        if let Err(e) = board.reverse(&entry) {
            warn!(error = %e, "history does not match the board, undo refused");
            return false;
        }
        self.applied.pop();
        self.undone.push(entry.move_played);
        true
    }

    /// Replays the most recently undone move. Returns false when there is
    /// none. The redo sequence is left as is apart from the replayed move
    pub fn redo(&mut self, board: &mut Board) -> bool {
        let Some(mv) = self.undone.last().copied() else {
            return false;
        };
        match board.apply(mv) {
            Ok(entry) => {
                self.undone.pop();
                self.applied.push(entry);
                true
            }
            Err(e) => {
                // The chain no longer continues this position, none of it can be replayed
                warn!(error = %e, "pending redo is stale, dropping it");
                self.undone.clear();
                false
            }
        }
    }

    /// Forgets everything and restarts from `start`
    pub fn clear(&mut self, start: Board) {
        self.start = start;
        self.applied.clear();
        self.undone.clear();
    }

    pub fn moves(&self) -> impl Iterator<Item = Move> + '_ {
        self.applied.iter().map(|e| e.move_played)
    }

    pub fn len(&self) -> usize {
        self.applied.len()
    }

    pub fn is_empty(&self) -> bool {
        self.applied.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.undone.is_empty()
    }

    /// How many times the current position has occurred in this game,
    /// the current occurrence included
    pub fn repetitions(&self) -> usize {
        let current = self
            .applied
            .last()
            .map_or(self.start.get_hash(), |e| e.hash_after);
        std::iter::once(self.start.get_hash())
            .chain(self.applied.iter().map(|e| e.hash_after))
            .filter(|h| *h == current)
            .count()
    }
}
