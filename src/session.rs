//! The session: the one owner of the board, the game log and the advisor.
//!
//! Turns are handled strictly one after the other. A turn either changes
//! the game through the commit/undo/redo paths or leaves it exactly as it
//! was, whatever went wrong.

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::advisor::{Advisor, AdvisorState};
use crate::board::{Board, GameStatus};
use crate::command::{interpret, Command, Control};
use crate::config::Config;
use crate::error::{AdvisorError, FenError, SessionError, TranscriptWriteError};
use crate::history::GameLog;
use crate::notation::{parse, to_notation};
use crate::piece::Color;
use crate::r#move::Move;
use crate::transcript::Transcript;
use crate::uci::{Score, SearchBudget};

/// A suggestion from the advisor, in notation for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advice {
    pub mv: Move,
    pub san: String,
    /// From White's point of view
    pub score: Option<Score>,
}

/// What a turn did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// A move was committed, in SAN
    Moved(String),
    Undone,
    Redone,
    NothingToUndo,
    NothingToRedo,
    Advice(Advice),
    NewGame,
    Show,
    Quit,
    /// The game is unchanged
    Rejected(SessionError),
    /// The token was not a command nor notation. The game is unchanged
    Unrecognized,
}

pub struct Session {
    board: Board,
    log: GameLog,
    advisor: Box<dyn Advisor>,
    transcript: Transcript,
    advise_budget: SearchBudget,
    play_budget: SearchBudget,
    show_hint: bool,
    hint: Option<Advice>,
    transcript_error: Option<TranscriptWriteError>,
}

impl Session {
    /// Starts a new game. The start position is the only thing that can
    /// prevent a session from existing
    pub fn new(config: &Config, advisor: Box<dyn Advisor>) -> Result<Session, FenError> {
        let start = match &config.start_fen {
            Some(fen) => Board::new(fen)?,
            None => Board::starting_position(),
        };
        let mut session = Session {
            board: start.clone(),
            log: GameLog::new(start),
            advisor,
            transcript: Transcript::new(config.transcript.clone(), config.pgn.clone()),
            advise_budget: SearchBudget::Depth(config.advisor.depth),
            play_budget: SearchBudget::MoveTime(Duration::from_millis(config.advisor.play_movetime_ms)),
            show_hint: config.advisor.show_hint,
            hint: None,
            transcript_error: None,
        };
        session.clear_transcript();
        session.refresh_hint();
        info!(fen = %session.board.get_fen(), "new game");
        Ok(session)
    }

    /// Interprets and executes one raw token
    pub fn handle(&mut self, raw: &str) -> TurnOutcome {
        let command = interpret(raw);
        debug!(raw, ?command, "turn");
        self.execute(command)
    }

    pub fn execute(&mut self, command: Command) -> TurnOutcome {
        let outcome = match command {
            Command::Unrecognized => TurnOutcome::Unrecognized,
            Command::MoveToken(token) => match self.play(&token) {
                Ok(san) => TurnOutcome::Moved(san),
                Err(e) => TurnOutcome::Rejected(e),
            },
            Command::Control(Control::Undo) => match self.undo() {
                true => TurnOutcome::Undone,
                false => TurnOutcome::NothingToUndo,
            },
            Command::Control(Control::Redo) => match self.redo() {
                true => TurnOutcome::Redone,
                false => TurnOutcome::NothingToRedo,
            },
            Command::Control(Control::Advise) => match self.advise() {
                Ok(advice) => TurnOutcome::Advice(advice),
                Err(e) => TurnOutcome::Rejected(e),
            },
            Command::Control(Control::PlayBest) => match self.play_best() {
                Ok(san) => TurnOutcome::Moved(san),
                Err(e) => TurnOutcome::Rejected(e),
            },
            Command::Control(Control::Reset) => {
                self.reset();
                TurnOutcome::NewGame
            }
            Command::Control(Control::Show) => TurnOutcome::Show,
            Command::Control(Control::Quit) => TurnOutcome::Quit,
        };
        if let TurnOutcome::Rejected(e) = &outcome {
            info!(error = %e, "turn rejected");
        }
        outcome
    }

    /// Resolves a notation token and commits the move
    pub fn play(&mut self, token: &str) -> Result<String, SessionError> {
        let mv = parse(token, &self.board)?;
        self.commit(mv)
    }

    /// Commits a move, the only way new moves enter the game. Once the game
    /// is decided only undo and reset change it
    pub fn commit(&mut self, mv: Move) -> Result<String, SessionError> {
        let status = self.status();
        if status.is_over() {
            return Err(SessionError::GameOver(status));
        }
        let before = self.board.clone();
        self.log.commit(&mut self.board, mv)?;
        let san = to_notation(mv, &before);
        info!(san = %san, "move");
        self.changed();
        Ok(san)
    }

    pub fn undo(&mut self) -> bool {
        let undone = self.log.undo(&mut self.board);
        if undone {
            self.changed();
        }
        undone
    }

    pub fn redo(&mut self) -> bool {
        let redone = self.log.redo(&mut self.board);
        if redone {
            self.changed();
        }
        redone
    }

    /// Asks the advisor for the best move without playing it
    pub fn advise(&mut self) -> Result<Advice, SessionError> {
        self.consult(self.advise_budget)
    }

    /// Plays the advisor's move through the regular commit path
    pub fn play_best(&mut self) -> Result<String, SessionError> {
        let advice = self.consult(self.play_budget)?;
        self.commit(advice.mv)
    }

    /// Back to the start position with an empty log and no transcript
    pub fn reset(&mut self) {
        let start = self.log.start().clone();
        self.board = start.clone();
        self.log.clear(start);
        self.transcript.restart();
        self.advisor.new_game();
        self.clear_transcript();
        self.refresh_hint();
        info!("new game");
    }

    /// Releases the advisor. The bridge does it on drop too, this makes the
    /// moment explicit
    pub fn shutdown(&mut self) {
        self.advisor.shutdown()
    }

    fn consult(&mut self, budget: SearchBudget) -> Result<Advice, SessionError> {
        let suggestion = self.advisor.query_best_move(&self.board, budget)?;
        if !self.board.legal_moves().contains(&suggestion.mv) {
            return Err(AdvisorError::IllegalSuggestion(suggestion.mv.to_string()).into());
        }
        let score = suggestion.score.map(|s| match (self.board.side_to_move(), s) {
            (Color::White, s) => s,
            (Color::Black, Score::Centipawns(cp)) => Score::Centipawns(-cp),
            (Color::Black, Score::Mate(n)) => Score::Mate(-n),
        });
        Ok(Advice {
            mv: suggestion.mv,
            san: to_notation(suggestion.mv, &self.board),
            score,
        })
    }

    /// Every change to the game goes through here
    fn changed(&mut self) {
        self.transcript_error = match self.transcript.write(&self.log) {
            Ok(()) => None,
            Err(e) => {
                warn!(error = %e, "transcript not saved, it stays in memory only");
                Some(e)
            }
        };
        self.refresh_hint();
    }

    fn clear_transcript(&mut self) {
        self.transcript_error = match self.transcript.clear() {
            Ok(()) => None,
            Err(e) => {
                warn!(error = %e, "old transcript could not be removed");
                Some(e)
            }
        };
    }

    fn refresh_hint(&mut self) {
        self.hint = None;
        if !self.show_hint || self.advisor.state() != AdvisorState::Ready || self.status().is_over() {
            return;
        }
        match self.consult(self.advise_budget) {
            Ok(advice) => self.hint = Some(advice),
            Err(e) => debug!(error = %e, "no hint"),
        }
    }

    /*
    SNAPSHOT
     */
    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn log(&self) -> &GameLog {
        &self.log
    }

    pub fn status(&self) -> GameStatus {
        self.board.status(self.log.repetitions())
    }

    pub fn advisor_state(&self) -> AdvisorState {
        self.advisor.state()
    }

    /// The advisor's move for the current position, when hints are on
    pub fn hint(&self) -> Option<&Advice> {
        self.hint.as_ref()
    }

    /// Why the last transcript write failed, if it did
    pub fn transcript_error(&self) -> Option<&TranscriptWriteError> {
        self.transcript_error.as_ref()
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// The moves so far, grouped by move number: (number, White, Black)
    pub fn score_sheet(&self) -> Vec<(u32, Option<String>, Option<String>)> {
        let mut board = self.log.start().clone();
        let mut sheet: Vec<(u32, Option<String>, Option<String>)> = Vec::new();
        for mv in self.log.moves() {
            let san = to_notation(mv, &board);
            match board.side_to_move() {
                Color::White => sheet.push((board.fullmove_number(), Some(san), None)),
                Color::Black => match sheet.last_mut() {
                    Some((number, _, black)) if *number == board.fullmove_number() => *black = Some(san),
                    _ => sheet.push((board.fullmove_number(), None, Some(san))),
                },
            }
            board.make(mv);
        }
        sheet
    }
}
