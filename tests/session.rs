use std::cell::Cell;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::rc::Rc;

use voice_chess::advisor::{Advisor, AdvisorBridge, AdvisorState, Suggestion};
use voice_chess::board::{Board, DrawReason, GameStatus};
use voice_chess::config::{AdvisorConfig, Config};
use voice_chess::error::{AdvisorError, FenError, IllegalMoveError, SessionError};
use voice_chess::piece::PieceType;
use voice_chess::r#move::Move;
use voice_chess::session::{Session, TurnOutcome};
use voice_chess::uci::{Score, SearchBudget};

struct Scratch(PathBuf);

impl Scratch {
    fn new() -> Scratch {
        let dir = std::env::temp_dir().join(format!("voice_chess_it_{:016x}", rand::random::<u64>()));
        std::fs::create_dir_all(&dir).unwrap();
        Scratch(dir)
    }

    fn transcript(&self) -> PathBuf {
        self.0.join("game_log.pgn")
    }

    fn config(&self) -> Config {
        Config {
            transcript: self.transcript(),
            ..Config::default()
        }
    }
}

impl Drop for Scratch {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.0);
    }
}

/// Answers queries from a fixed script
struct ScriptedAdvisor {
    answers: VecDeque<Result<Suggestion, AdvisorError>>,
    budgets: Rc<Cell<Option<SearchBudget>>>,
    new_games: Rc<Cell<u32>>,
    shutdowns: Rc<Cell<u32>>,
}

impl ScriptedAdvisor {
    fn answering(answers: Vec<Result<Suggestion, AdvisorError>>) -> ScriptedAdvisor {
        ScriptedAdvisor {
            answers: answers.into(),
            budgets: Rc::new(Cell::new(None)),
            new_games: Rc::new(Cell::new(0)),
            shutdowns: Rc::new(Cell::new(0)),
        }
    }
}

impl Advisor for ScriptedAdvisor {
    fn state(&self) -> AdvisorState {
        if self.shutdowns.get() == 0 {
            AdvisorState::Ready
        } else {
            AdvisorState::Unavailable
        }
    }

    fn query_best_move(&mut self, _board: &Board, budget: SearchBudget) -> Result<Suggestion, AdvisorError> {
        self.budgets.set(Some(budget));
        self.answers.pop_front().unwrap_or(Err(AdvisorError::NoMove))
    }

    fn new_game(&mut self) {
        self.new_games.set(self.new_games.get() + 1);
    }

    fn shutdown(&mut self) {
        self.shutdowns.set(self.shutdowns.get() + 1);
    }
}

fn without_advisor(scratch: &Scratch) -> Session {
    Session::new(&scratch.config(), Box::new(AdvisorBridge::unavailable())).unwrap()
}

fn snapshot(session: &Session) -> (String, Vec<Move>) {
    (session.board().get_fen(), session.log().moves().collect())
}

#[test]
fn undo_takes_back_only_the_last_move() {
    let scratch = Scratch::new();
    let mut session = without_advisor(&scratch);
    assert_eq!(session.handle("e4"), TurnOutcome::Moved(String::from("e4")));
    assert_eq!(session.handle("e5"), TurnOutcome::Moved(String::from("e5")));
    assert_eq!(session.handle("undo"), TurnOutcome::Undone);

    let board = session.board();
    assert_eq!(board.piece_type_on(28), Some(PieceType::Pawn));
    assert_eq!(board.piece_on(12), None);
    assert_eq!(board.piece_type_on(52), Some(PieceType::Pawn));
    assert_eq!(board.piece_on(36), None);
    assert_eq!(session.log().len(), 1);
}

#[test]
fn undo_and_redo_round_trip() {
    let scratch = Scratch::new();
    let mut session = without_advisor(&scratch);
    let tokens = ["e4", "c5", "nf3", "d6", "d4", "cxd4", "nxd4", "nf6", "nc3", "a6", "be2", "e5", "nb3", "be7", "o-o"];
    let mut positions = vec![session.board().clone()];
    for token in tokens {
        assert!(matches!(session.handle(token), TurnOutcome::Moved(_)), "{}", token);
        positions.push(session.board().clone());
    }
    for expected in positions.iter().rev().skip(1) {
        assert_eq!(session.handle("undo"), TurnOutcome::Undone);
        assert_eq!(session.board(), expected);
    }
    assert_eq!(session.handle("undo"), TurnOutcome::NothingToUndo);
    for expected in positions.iter().skip(1) {
        assert_eq!(session.handle("redo"), TurnOutcome::Redone);
        assert_eq!(session.board(), expected);
    }
    assert_eq!(session.handle("redo"), TurnOutcome::NothingToRedo);
}

#[test]
fn new_move_clears_redo() {
    let scratch = Scratch::new();
    let mut session = without_advisor(&scratch);
    session.handle("e4");
    session.handle("e5");
    session.handle("undo");
    assert_eq!(session.handle("c5"), TurnOutcome::Moved(String::from("c5")));
    assert_eq!(session.handle("redo"), TurnOutcome::NothingToRedo);
    assert_eq!(session.handle("undo"), TurnOutcome::Undone);
    assert_eq!(session.handle("redo"), TurnOutcome::Redone);
}

#[test]
fn rejected_turns_change_nothing() {
    let scratch = Scratch::new();
    let mut session = without_advisor(&scratch);
    session.handle("e4");
    let before = snapshot(&session);
    let transcript = std::fs::read_to_string(scratch.transcript()).unwrap();

    for raw in ["e3", "Qh5", "zz9", "", "   ", "e4;", "Ke2", "advise"] {
        for _ in 0..2 {
            let outcome = session.handle(raw);
            assert!(
                matches!(outcome, TurnOutcome::Rejected(_) | TurnOutcome::Unrecognized),
                "{:?} gave {:?}",
                raw,
                outcome
            );
            assert_eq!(snapshot(&session), before);
            assert_eq!(std::fs::read_to_string(scratch.transcript()).unwrap(), transcript);
        }
    }
}

#[test]
fn absent_advisor_degrades_gracefully() {
    let scratch = Scratch::new();
    let mut config = scratch.config();
    config.advisor = AdvisorConfig {
        path: PathBuf::from("/nonexistent/voice_chess/stockfish"),
        ..AdvisorConfig::default()
    };
    let mut session = Session::new(&config, Box::new(AdvisorBridge::start(&config.advisor))).unwrap();
    assert_eq!(session.advisor_state(), AdvisorState::Unavailable);
    assert!(matches!(
        session.handle("advise"),
        TurnOutcome::Rejected(SessionError::Advisor(AdvisorError::Unavailable(_)))
    ));
    assert!(matches!(
        session.handle("play best move"),
        TurnOutcome::Rejected(SessionError::Advisor(AdvisorError::Unavailable(_)))
    ));
    assert_eq!(session.handle("d4"), TurnOutcome::Moved(String::from("d4")));
    session.shutdown();
    session.shutdown();
}

#[test]
fn transcript_follows_the_game() {
    let scratch = Scratch::new();
    let mut session = without_advisor(&scratch);
    for token in ["e4", "e5", "Nf3"] {
        session.handle(token);
    }
    let text = std::fs::read_to_string(scratch.transcript()).unwrap();
    assert!(text.ends_with("\n\n1. e4 e5 2. Nf3 *\n"), "{}", text);

    session.handle("undo");
    let text = std::fs::read_to_string(scratch.transcript()).unwrap();
    assert!(text.ends_with("\n\n1. e4 e5 *\n"), "{}", text);

    session.handle("redo");
    let text = std::fs::read_to_string(scratch.transcript()).unwrap();
    assert!(text.ends_with("\n\n1. e4 e5 2. Nf3 *\n"), "{}", text);

    assert_eq!(session.handle("new game"), TurnOutcome::NewGame);
    assert!(!scratch.transcript().exists());
    assert_eq!(session.board(), &Board::starting_position());
    assert!(session.log().is_empty());
    assert!(!session.log().can_redo());
}

#[test]
fn unwritable_transcript_does_not_stop_play() {
    let scratch = Scratch::new();
    let config = Config {
        transcript: scratch.0.join("no_such_dir").join("game_log.pgn"),
        ..Config::default()
    };
    let mut session = Session::new(&config, Box::new(AdvisorBridge::unavailable())).unwrap();
    assert_eq!(session.handle("e4"), TurnOutcome::Moved(String::from("e4")));
    assert!(session.transcript_error().is_some());
    assert_eq!(session.handle("e5"), TurnOutcome::Moved(String::from("e5")));
    assert_eq!(session.log().len(), 2);
}

#[test]
fn invalid_start_position_is_fatal() {
    let scratch = Scratch::new();
    let config = Config {
        start_fen: Some(String::from("8/8/8/8/8/8/8/8 w - - 0 1")),
        ..scratch.config()
    };
    let result = Session::new(&config, Box::new(AdvisorBridge::unavailable()));
    assert!(matches!(result, Err(FenError::Kings)));
}

#[test]
fn best_move_goes_through_the_commit_path() {
    let scratch = Scratch::new();
    let advisor = ScriptedAdvisor::answering(vec![
        Ok(Suggestion {
            mv: Move::new_quiet(6, 21),
            score: Some(Score::Centipawns(25)),
        }),
        Ok(Suggestion {
            mv: Move::new_quiet(62, 45),
            score: Some(Score::Centipawns(-10)),
        }),
        Err(AdvisorError::IllegalSuggestion(String::from("e2e5"))),
    ]);
    let budgets = advisor.budgets.clone();
    let new_games = advisor.new_games.clone();
    let shutdowns = advisor.shutdowns.clone();
    let mut session = Session::new(&scratch.config(), Box::new(advisor)).unwrap();
    session.handle("e4");
    session.handle("undo");
    assert!(session.log().can_redo());

    assert_eq!(session.handle("playbestmove"), TurnOutcome::Moved(String::from("Nf3")));
    assert_eq!(budgets.get(), Some(SearchBudget::MoveTime(std::time::Duration::from_millis(500))));
    assert!(!session.log().can_redo());

    match session.handle("advise") {
        TurnOutcome::Advice(advice) => {
            assert_eq!(advice.san, "Nf6");
            // Black to move, flipped to White's point of view
            assert_eq!(advice.score, Some(Score::Centipawns(10)));
        }
        other => panic!("{:?}", other),
    }
    assert_eq!(budgets.get(), Some(SearchBudget::Depth(10)));
    assert_eq!(session.log().len(), 1);

    let before = snapshot(&session);
    assert_eq!(
        session.handle("play"),
        TurnOutcome::Rejected(SessionError::Advisor(AdvisorError::IllegalSuggestion(String::from("e2e5"))))
    );
    assert_eq!(snapshot(&session), before);

    assert_eq!(session.handle("reset"), TurnOutcome::NewGame);
    assert_eq!(new_games.get(), 1);

    session.shutdown();
    assert_eq!(shutdowns.get(), 1);
    assert_eq!(session.advisor_state(), AdvisorState::Unavailable);
}

#[test]
fn hints_follow_every_change() {
    let scratch = Scratch::new();
    let mut config = scratch.config();
    config.advisor.show_hint = true;
    let advisor = ScriptedAdvisor::answering(vec![
        Ok(Suggestion {
            mv: Move::new_double_push(12, 28),
            score: None,
        }),
        Ok(Suggestion {
            mv: Move::new_double_push(52, 36),
            score: Some(Score::Mate(-3)),
        }),
    ]);
    let mut session = Session::new(&config, Box::new(advisor)).unwrap();
    assert_eq!(session.hint().map(|h| h.san.as_str()), Some("e4"));
    session.handle("d4");
    let hint = session.hint().unwrap();
    assert_eq!(hint.san, "e5");
    assert_eq!(hint.score, Some(Score::Mate(3)));
    // the script is exhausted, no hint rather than an error
    assert_eq!(session.handle("c5"), TurnOutcome::Moved(String::from("c5")));
    assert!(session.hint().is_none());
}

#[test]
fn moves_outside_the_legal_set_are_refused() {
    let scratch = Scratch::new();
    let mut session = without_advisor(&scratch);
    let before = snapshot(&session);
    for mv in [Move::new_en_passant(12, 3), Move::new_quiet(12, 64), Move::new_quiet(0, 63)] {
        assert_eq!(session.commit(mv), Err(SessionError::Illegal(IllegalMoveError(mv))));
        assert_eq!(snapshot(&session), before);
    }
    assert!(!scratch.transcript().exists());
}

#[test]
fn unchecked_advisor_moves_are_refused() {
    let scratch = Scratch::new();
    let advisor = ScriptedAdvisor::answering(vec![
        Ok(Suggestion {
            mv: Move::new_quiet(12, 64),
            score: None,
        }),
        Ok(Suggestion {
            mv: Move::new_en_passant(12, 3),
            score: None,
        }),
    ]);
    let mut session = Session::new(&scratch.config(), Box::new(advisor)).unwrap();
    let before = snapshot(&session);
    for token in ["play", "advise"] {
        assert!(matches!(
            session.handle(token),
            TurnOutcome::Rejected(SessionError::Advisor(AdvisorError::IllegalSuggestion(_)))
        ));
        assert_eq!(snapshot(&session), before);
    }
}

#[test]
fn fifty_move_draw_ends_the_game() {
    let scratch = Scratch::new();
    let config = Config {
        start_fen: Some(String::from("4k3/8/8/8/8/8/8/R3K3 w - - 99 80")),
        ..scratch.config()
    };
    let mut session = Session::new(&config, Box::new(AdvisorBridge::unavailable())).unwrap();
    assert_eq!(session.handle("Ra2"), TurnOutcome::Moved(String::from("Ra2")));
    let over = GameStatus::Draw(DrawReason::FiftyMoveRule);
    assert_eq!(session.status(), over);

    let transcript = std::fs::read_to_string(scratch.transcript()).unwrap();
    assert!(transcript.ends_with("\n\n80. Ra2 1/2-1/2\n"), "{}", transcript);
    assert_eq!(session.handle("Ke7"), TurnOutcome::Rejected(SessionError::GameOver(over)));
    assert_eq!(std::fs::read_to_string(scratch.transcript()).unwrap(), transcript);

    assert_eq!(session.handle("undo"), TurnOutcome::Undone);
    assert_eq!(session.status(), GameStatus::InProgress);
    assert_eq!(session.handle("ke2"), TurnOutcome::Moved(String::from("Ke2")));
}

#[test]
fn threefold_repetition_ends_the_game() {
    let scratch = Scratch::new();
    let mut session = without_advisor(&scratch);
    for _ in 0..2 {
        for token in ["nf3", "nf6", "ng1", "ng8"] {
            assert!(matches!(session.handle(token), TurnOutcome::Moved(_)), "{}", token);
        }
    }
    let over = GameStatus::Draw(DrawReason::Repetition);
    assert_eq!(session.status(), over);
    assert_eq!(session.handle("e4"), TurnOutcome::Rejected(SessionError::GameOver(over)));
    assert_eq!(session.log().len(), 8);
    let transcript = std::fs::read_to_string(scratch.transcript()).unwrap();
    assert!(transcript.contains("[Result \"1/2-1/2\"]"));
    assert!(transcript.ends_with("Ng8 1/2-1/2\n"), "{}", transcript);
}
