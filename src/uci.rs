//! The client side of the UCI protocol: the commands sent to an engine and
//! the lines read back from it. No I/O happens here.

use std::fmt::{Display, Formatter};
use std::time::Duration;

/// How long the engine may think
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SearchBudget {
    Depth(u32),
    MoveTime(Duration),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UciCommand {
    Uci,
    IsReady,
    UciNewGame,
    SetOption { name: String, value: String },
    Position { fen: String },
    Go(SearchBudget),
    Stop,
    Quit,
}

impl Display for UciCommand {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            UciCommand::Uci => write!(f, "uci"),
            UciCommand::IsReady => write!(f, "isready"),
            UciCommand::UciNewGame => write!(f, "ucinewgame"),
            UciCommand::SetOption { name, value } => write!(f, "setoption name {} value {}", name, value),
            UciCommand::Position { fen } => write!(f, "position fen {}", fen),
            UciCommand::Go(SearchBudget::Depth(d)) => write!(f, "go depth {}", d),
            UciCommand::Go(SearchBudget::MoveTime(t)) => write!(f, "go movetime {}", t.as_millis()),
            UciCommand::Stop => write!(f, "stop"),
            UciCommand::Quit => write!(f, "quit"),
        }
    }
}

/// Evaluation, from the point of view of the side to move
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Score {
    Centipawns(i32),
    /// Mate in that many moves, negative when the side to move gets mated
    Mate(i32),
}

impl Display for Score {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Score::Centipawns(cp) => write!(f, "{:+.2}", *cp as f64 / 100.0),
            Score::Mate(n) if *n < 0 => write!(f, "-M{}", n.abs()),
            Score::Mate(n) => write!(f, "M{}", n),
        }
    }
}

/// The fields of an `info` line we care about
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Info {
    pub depth: Option<u32>,
    pub score: Option<Score>,
    pub pv: Vec<String>,
}

impl Info {
    /// Reads the part of the line after `info`
    pub fn parse(rest: &str) -> Info {
        let mut info = Info::default();
        let mut words = rest.split_whitespace();
        while let Some(word) = words.next() {
            match word {
                "depth" => info.depth = words.next().and_then(|d| d.parse().ok()),
                "score" => {
                    let kind = words.next();
                    let value = words.next().and_then(|v| v.parse::<i32>().ok());
                    info.score = match (kind, value) {
                        (Some("cp"), Some(v)) => Some(Score::Centipawns(v)),
                        (Some("mate"), Some(v)) => Some(Score::Mate(v)),
                        _ => info.score,
                    };
                }
                // the principal variation runs to the end of the line
                "pv" => {
                    info.pv = words.by_ref().map(String::from).collect();
                }
                _ => (),
            }
        }
        info
    }
}

/// One line of engine output
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineLine {
    UciOk,
    ReadyOk,
    Id(String),
    Info(Info),
    /// None when the engine has no move to give (`bestmove (none)`)
    BestMove(Option<String>),
    Other(String),
}

impl EngineLine {
    pub fn parse(line: &str) -> EngineLine {
        let line = line.trim();
        let (head, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        match head {
            "uciok" => EngineLine::UciOk,
            "readyok" => EngineLine::ReadyOk,
            "id" => EngineLine::Id(rest.trim().to_string()),
            "info" => EngineLine::Info(Info::parse(rest)),
            "bestmove" => match rest.split_whitespace().next() {
                None | Some("(none)") | Some("0000") => EngineLine::BestMove(None),
                Some(mv) => EngineLine::BestMove(Some(mv.to_string())),
            },
            _ => EngineLine::Other(line.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{EngineLine, Info, Score, SearchBudget, UciCommand};
    use std::time::Duration;

    #[test]
    fn commands_print_as_protocol_lines() {
        assert_eq!(UciCommand::Uci.to_string(), "uci");
        assert_eq!(UciCommand::UciNewGame.to_string(), "ucinewgame");
        assert_eq!(
            UciCommand::Position {
                fen: String::from("8/8/8/8/8/8/8/K6k w - - 0 1")
            }
            .to_string(),
            "position fen 8/8/8/8/8/8/8/K6k w - - 0 1"
        );
        assert_eq!(UciCommand::Go(SearchBudget::Depth(10)).to_string(), "go depth 10");
        assert_eq!(
            UciCommand::Go(SearchBudget::MoveTime(Duration::from_millis(500))).to_string(),
            "go movetime 500"
        );
        assert_eq!(
            UciCommand::SetOption {
                name: String::from("Hash"),
                value: String::from("16")
            }
            .to_string(),
            "setoption name Hash value 16"
        );
    }

    #[test]
    fn parses_stockfish_output() {
        assert_eq!(EngineLine::parse("uciok"), EngineLine::UciOk);
        assert_eq!(EngineLine::parse("readyok\r"), EngineLine::ReadyOk);
        assert_eq!(EngineLine::parse("id name Stockfish 16"), EngineLine::Id(String::from("name Stockfish 16")));
        assert_eq!(EngineLine::parse("bestmove e2e4 ponder e7e5"), EngineLine::BestMove(Some(String::from("e2e4"))));
        assert_eq!(EngineLine::parse("bestmove (none)"), EngineLine::BestMove(None));
        assert!(matches!(EngineLine::parse("option name Hash type spin"), EngineLine::Other(_)));

        let line = "info depth 12 seldepth 18 multipv 1 score cp -35 nodes 120443 nps 1204430 time 100 pv e7e5 g1f3 b8c6";
        match EngineLine::parse(line) {
            EngineLine::Info(info) => {
                assert_eq!(info.depth, Some(12));
                assert_eq!(info.score, Some(Score::Centipawns(-35)));
                assert_eq!(info.pv, vec!["e7e5", "g1f3", "b8c6"]);
            }
            other => panic!("{:?}", other),
        }
    }

    #[test]
    fn mate_scores_and_bounds() {
        assert_eq!(Info::parse("depth 5 score mate -2 pv h7h8").score, Some(Score::Mate(-2)));
        assert_eq!(Info::parse("depth 5 score cp 20 lowerbound").score, Some(Score::Centipawns(20)));
        assert_eq!(Info::parse("string hello").score, None);
    }

    #[test]
    fn scores_display_in_pawns() {
        assert_eq!(Score::Centipawns(35).to_string(), "+0.35");
        assert_eq!(Score::Centipawns(-120).to_string(), "-1.20");
        assert_eq!(Score::Mate(3).to_string(), "M3");
        assert_eq!(Score::Mate(-2).to_string(), "-M2");
    }
}
