//! Error taxonomy of the session controller.
//!
//! Everything except [`FenError`] and [`ConfigError`] is recoverable: the
//! turn loop reports it and keeps going with the board untouched.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::board::GameStatus;
use crate::r#move::Move;

/// The move is not in the legal move set of the current position
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("illegal move: {0}")]
pub struct IllegalMoveError(pub Move);

/// A history entry was handed back to a board it does not belong to, or
/// not in last-in first-out order
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReverseError {
    #[error("history entry for {0} is not the last move applied to this position")]
    OutOfOrder(Move),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NotationError {
    #[error("ambiguous move: {0}")]
    AmbiguousMove(String),
    #[error("no legal move matches: {0}")]
    UnknownNotation(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FenError {
    #[error("FEN needs 4 to 6 fields, found {0}")]
    FieldCount(usize),
    #[error("bad piece placement: {0}")]
    Placement(String),
    #[error("bad side to move: {0}")]
    SideToMove(String),
    #[error("bad castling rights: {0}")]
    Castling(String),
    #[error("bad en passant square: {0}")]
    EnPassant(String),
    #[error("bad move counter: {0}")]
    Counter(String),
    #[error("position needs exactly one king per side")]
    Kings,
    #[error("the side not to move is in check")]
    OpponentInCheck,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AdvisorError {
    #[error("advisor unavailable: {0}")]
    Unavailable(String),
    #[error("advisor did not answer within {0:?}")]
    Timeout(Duration),
    #[error("advisor suggested a move that is not legal here: {0}")]
    IllegalSuggestion(String),
    #[error("advisor has no move in this position")]
    NoMove,
}

#[derive(Error, Debug)]
#[error("could not write transcript to {}: {source}", path.display())]
pub struct TranscriptWriteError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Why a turn was rejected. None of these change the board or the history
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error(transparent)]
    Illegal(#[from] IllegalMoveError),
    #[error(transparent)]
    Notation(#[from] NotationError),
    #[error(transparent)]
    Advisor(#[from] AdvisorError),
    #[error("the game is over: {0}")]
    GameOver(GameStatus),
}
