use std::fmt::{Display, Formatter};

/// Directives that act on the session instead of the board
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Control {
    Undo,
    Redo,
    Advise,
    PlayBest,
    Reset,
    Show,
    Quit,
}

impl Control {
    fn from_word(word: &str) -> Option<Control> {
        match word {
            "undo" => Some(Control::Undo),
            "redo" => Some(Control::Redo),
            "advise" => Some(Control::Advise),
            "playbestmove" | "bestmove" | "play" => Some(Control::PlayBest),
            "reset" | "newgame" => Some(Control::Reset),
            "show" | "board" => Some(Control::Show),
            "quit" | "exit" => Some(Control::Quit),
            _ => None,
        }
    }
}

impl Display for Control {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let word = match self {
            Control::Undo => "undo",
            Control::Redo => "redo",
            Control::Advise => "advise",
            Control::PlayBest => "playbestmove",
            Control::Reset => "reset",
            Control::Show => "show",
            Control::Quit => "quit",
        };
        write!(f, "{}", word)
    }
}

/// A raw token once normalized
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Control(Control),
    /// Something that looks like a move, still to be resolved against the board
    MoveToken(String),
    Unrecognized,
}

fn is_notation_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '=' | '+' | '#' | '-' | '!' | '?')
}

/// Normalizes a raw token.
///
/// All whitespace is dropped. Control words are matched regardless of case.
/// Other tokens get their first character uppercased, since a leading
/// uppercase letter names the piece in algebraic notation, except two
/// character tokens which are pawn pushes like `e4` and are passed as is.
/// ```
/// use voice_chess::command::{interpret, Command, Control};
/// assert_eq!(interpret(" Play Best Move "), Command::Control(Control::PlayBest));
/// assert_eq!(interpret("knight f3"), Command::MoveToken(String::from("Knightf3")));
/// assert_eq!(interpret("nf3"), Command::MoveToken(String::from("Nf3")));
/// ```
pub fn interpret(raw: &str) -> Command {
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return Command::Unrecognized;
    }
    if let Some(control) = Control::from_word(&compact.to_lowercase()) {
        return Command::Control(control);
    }
    if !compact.chars().all(is_notation_char) {
        return Command::Unrecognized;
    }
    if compact.len() == 2 {
        return Command::MoveToken(compact);
    }

    let mut chars = compact.chars();
    let token = match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => return Command::Unrecognized,
    };
    Command::MoveToken(token)
}
