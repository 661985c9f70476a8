//! Line-oriented front end. Each line read is one token for the session,
//! and the state is printed back after every turn that changed something.

use std::fmt::Write;

use rustyline::config::Configurer;
use rustyline::Editor;

use crate::advisor::AdvisorState;
use crate::session::{Session, TurnOutcome};

/// Turns shown on the score sheet
const SHEET_TURNS: usize = 25;

pub struct Console {
    session: Session,
    editor: Editor<()>,
}

impl Console {
    pub fn new(session: Session) -> Console {
        let mut editor = Editor::<()>::new();
        editor.set_auto_add_history(true);
        editor.set_check_cursor_position(true);
        Console { session, editor }
    }

    /// Runs turns until `quit` or end of input, then releases the advisor
    pub fn run(&mut self) {
        println!("{}", snapshot(&self.session));
        while let Ok(line) = self.editor.readline("> ") {
            let outcome = self.session.handle(&line);
            if outcome == TurnOutcome::Quit {
                break;
            }
            if let Some(message) = describe(&outcome) {
                match outcome {
                    TurnOutcome::Rejected(_) => eprintln!("{}", message),
                    _ => println!("{}", message),
                }
            }
            if changes_the_view(&outcome) {
                println!("{}", snapshot(&self.session));
            }
        }
        self.session.shutdown();
    }
}

fn changes_the_view(outcome: &TurnOutcome) -> bool {
    matches!(
        outcome,
        TurnOutcome::Moved(_) | TurnOutcome::Undone | TurnOutcome::Redone | TurnOutcome::NewGame | TurnOutcome::Show
    )
}

/// One line about the turn, None when there is nothing worth saying
pub fn describe(outcome: &TurnOutcome) -> Option<String> {
    match outcome {
        TurnOutcome::Moved(san) => Some(format!("played {}", san)),
        TurnOutcome::Undone => Some(String::from("move taken back")),
        TurnOutcome::Redone => Some(String::from("move replayed")),
        TurnOutcome::NothingToUndo => Some(String::from("nothing to undo")),
        TurnOutcome::NothingToRedo => Some(String::from("nothing to redo")),
        TurnOutcome::Advice(advice) => Some(match advice.score {
            Some(score) => format!("best move: {} ({})", advice.san, score),
            None => format!("best move: {}", advice.san),
        }),
        TurnOutcome::NewGame => Some(String::from("new game")),
        TurnOutcome::Rejected(e) => Some(e.to_string()),
        TurnOutcome::Show | TurnOutcome::Quit | TurnOutcome::Unrecognized => None,
    }
}

/// Text rendering of everything a front end would show: board, status,
/// score sheet and advisor line
pub fn snapshot(session: &Session) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", session.board());
    let _ = writeln!(out, "status: {}", session.status());

    let sheet = session.score_sheet();
    if !sheet.is_empty() {
        let _ = writeln!(out, "score sheet:");
        for (number, white, black) in sheet.iter().skip(sheet.len().saturating_sub(SHEET_TURNS)) {
            let white = white.as_deref().unwrap_or("...");
            let _ = writeln!(out, "{:>4}. {:<8} {}", number, white, black.as_deref().unwrap_or(""));
        }
    }

    match (session.advisor_state(), session.hint()) {
        (_, Some(hint)) => match hint.score {
            Some(score) => {
                let _ = writeln!(out, "best move: {} ({})", hint.san, score);
            }
            None => {
                let _ = writeln!(out, "best move: {}", hint.san);
            }
        },
        (AdvisorState::Unavailable, None) => {
            let _ = writeln!(out, "advisor: unavailable");
        }
        (state, None) => {
            let _ = writeln!(out, "advisor: {}", state);
        }
    }
    if let Some(e) = session.transcript_error() {
        let _ = writeln!(out, "warning: {}", e);
    }
    out.trim_end().to_string()
}
