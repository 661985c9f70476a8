//! Bridge to an external UCI engine used as a move oracle.
//!
//! The engine runs as a child process. A reader thread forwards its output
//! line by line over a channel so that every wait is bounded. Whatever the
//! engine says is checked against the legal moves before it is handed out.

use std::fmt::{Display, Formatter};
use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::board::Board;
use crate::config::AdvisorConfig;
use crate::error::AdvisorError;
use crate::r#move::Move;
use crate::uci::{EngineLine, Score, SearchBudget, UciCommand};

const QUIT_GRACE: Duration = Duration::from_millis(250);

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AdvisorState {
    /// No engine process
    Unavailable,
    Ready,
    Querying,
    /// Transport broke or the engine went silent, about to be torn down
    Failed,
}

impl Display for AdvisorState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            AdvisorState::Unavailable => "unavailable",
            AdvisorState::Ready => "ready",
            AdvisorState::Querying => "querying",
            AdvisorState::Failed => "failed",
        };
        write!(f, "{}", name)
    }
}

/// A validated move suggestion
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Suggestion {
    pub mv: Move,
    /// From the point of view of the side to move
    pub score: Option<Score>,
}

pub trait Advisor {
    fn state(&self) -> AdvisorState;

    /// Best move for the side to move in `board`, guaranteed legal there
    fn query_best_move(&mut self, board: &Board, budget: SearchBudget) -> Result<Suggestion, AdvisorError>;

    /// The next query belongs to a different game than the previous ones
    fn new_game(&mut self);

    /// Releases the engine. Calling it again does nothing
    fn shutdown(&mut self);
}

pub struct AdvisorBridge {
    state: AdvisorState,
    engine: Option<EngineProcess>,
    timeout: Duration,
}

impl AdvisorBridge {
    /// A bridge that never had an engine
    pub fn unavailable() -> AdvisorBridge {
        AdvisorBridge {
            state: AdvisorState::Unavailable,
            engine: None,
            timeout: Duration::ZERO,
        }
    }

    /// Launches the configured engine and performs the UCI handshake.
    /// Any failure leaves the bridge unavailable, it is never fatal
    pub fn start(config: &AdvisorConfig) -> AdvisorBridge {
        let mut bridge = AdvisorBridge::unavailable();
        bridge.timeout = config.timeout();
        if !config.enabled {
            info!("advisor disabled");
            return bridge;
        }

        let mut last_error = None;
        for path in candidates(&config.path) {
            match EngineProcess::launch(&path, config) {
                Ok(engine) => {
                    info!(path = %path.display(), "advisor ready");
                    bridge.engine = Some(engine);
                    bridge.state = AdvisorState::Ready;
                    return bridge;
                }
                Err(e) => last_error = Some(e),
            }
        }
        if let Some(e) = last_error {
            warn!(error = %e, "advisor could not be started, playing without it");
        }
        bridge
    }

    fn set_state(&mut self, state: AdvisorState) {
        if self.state != state {
            debug!(from = %self.state, to = %state, "advisor state");
            self.state = state;
        }
    }

    /// Tears the engine down after a transport failure or a timeout
    fn fail(&mut self, error: AdvisorError) -> AdvisorError {
        warn!(error = %error, "advisor failed, shutting it down");
        self.set_state(AdvisorState::Failed);
        self.engine = None;
        self.set_state(AdvisorState::Unavailable);
        error
    }
}

impl Advisor for AdvisorBridge {
    fn state(&self) -> AdvisorState {
        self.state
    }

    fn query_best_move(&mut self, board: &Board, budget: SearchBudget) -> Result<Suggestion, AdvisorError> {
        if self.state != AdvisorState::Ready {
            return Err(AdvisorError::Unavailable(format!("advisor is {}", self.state)));
        }
        let Some(engine) = self.engine.as_mut() else {
            return Err(AdvisorError::Unavailable(String::from("no engine process")));
        };
        self.state = AdvisorState::Querying;

        let timeout = self.timeout;
        let answer = engine.best_move(&board.get_fen(), budget, timeout);
        let (text, score) = match answer {
            Ok(answer) => answer,
            Err(e @ AdvisorError::Timeout(_)) => {
                if let Some(engine) = self.engine.as_mut() {
                    let _ = engine.send(&UciCommand::Stop);
                }
                return Err(self.fail(e));
            }
            Err(e) => return Err(self.fail(e)),
        };
        self.set_state(AdvisorState::Ready);

        let Some(text) = text else {
            return Err(AdvisorError::NoMove);
        };
        let found = Move::parse(&text).and_then(|(origin, target, promotion)| {
            board
                .legal_moves()
                .iter()
                .find(|m| m.origin() == origin && m.target() == target && m.promotion_target() == promotion)
                .copied()
        });
        match found {
            Some(mv) => Ok(Suggestion { mv, score }),
            None => {
                warn!(suggestion = %text, fen = %board.get_fen(), "advisor suggested an illegal move");
                Err(AdvisorError::IllegalSuggestion(text))
            }
        }
    }

    fn new_game(&mut self) {
        if self.state != AdvisorState::Ready {
            return;
        }
        let timeout = self.timeout;
        let Some(engine) = self.engine.as_mut() else {
            return;
        };
        if let Err(e) = engine.new_game(timeout) {
            let _ = self.fail(e);
        }
    }

    fn shutdown(&mut self) {
        if let Some(engine) = self.engine.take() {
            drop(engine);
            info!("advisor shut down");
        }
        self.set_state(AdvisorState::Unavailable);
    }
}

impl Drop for AdvisorBridge {
    fn drop(&mut self) {
        self.shutdown()
    }
}

/// The configured path, plus the current directory when the default bare
/// name is not found on PATH
fn candidates(path: &Path) -> Vec<PathBuf> {
    let mut paths = vec![path.to_path_buf()];
    if path == Path::new("stockfish") {
        paths.push(PathBuf::from("./stockfish"));
    }
    paths
}

struct EngineProcess {
    child: Child,
    stdin: ChildStdin,
    lines: Receiver<String>,
}

impl EngineProcess {
    fn launch(path: &Path, config: &AdvisorConfig) -> Result<EngineProcess, AdvisorError> {
        let unavailable = |what: &str, e: std::io::Error| {
            AdvisorError::Unavailable(format!("{} {}: {}", what, path.display(), e))
        };
        let mut child = Command::new(path)
            .args(&config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| unavailable("cannot run", e))?;

        let (Some(stdin), Some(stdout)) = (child.stdin.take(), child.stdout.take()) else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(AdvisorError::Unavailable(String::from("engine pipes not available")));
        };

        let (sender, lines) = mpsc::channel();
        let reader = thread::Builder::new()
            .name(String::from("advisor-reader"))
            .spawn(move || {
                for line in BufReader::new(stdout).lines() {
                    let Ok(line) = line else { break };
                    if sender.send(line).is_err() {
                        break;
                    }
                }
            });
        let mut engine = EngineProcess { child, stdin, lines };
        // Dropping the engine from here on reaps the child
        reader.map_err(|e| unavailable("cannot read from", e))?;

        let deadline = Instant::now() + config.handshake_timeout();
        engine.send(&UciCommand::Uci)?;
        engine.wait_for(deadline, config.handshake_timeout(), |l| *l == EngineLine::UciOk)?;
        for (name, value) in [
            ("Threads", config.thread_count().to_string()),
            ("Hash", config.hash_mb.to_string()),
        ] {
            engine.send(&UciCommand::SetOption {
                name: name.to_string(),
                value,
            })?;
        }
        engine.send(&UciCommand::IsReady)?;
        engine.wait_for(deadline, config.handshake_timeout(), |l| *l == EngineLine::ReadyOk)?;
        Ok(engine)
    }

    fn send(&mut self, command: &UciCommand) -> Result<(), AdvisorError> {
        debug!(line = %command, "to advisor");
        writeln!(self.stdin, "{}", command)
            .and_then(|_| self.stdin.flush())
            .map_err(|e| AdvisorError::Unavailable(format!("engine input closed: {}", e)))
    }

    /// Reads lines until one satisfies `wanted`, or the deadline passes
    fn wait_for<F>(&mut self, deadline: Instant, budget: Duration, mut wanted: F) -> Result<EngineLine, AdvisorError>
    where
        F: FnMut(&EngineLine) -> bool,
    {
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.lines.recv_timeout(remaining) {
                Ok(line) => {
                    debug!(line = %line, "from advisor");
                    let parsed = EngineLine::parse(&line);
                    if wanted(&parsed) {
                        return Ok(parsed);
                    }
                }
                Err(RecvTimeoutError::Timeout) => return Err(AdvisorError::Timeout(budget)),
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(AdvisorError::Unavailable(String::from("engine exited")))
                }
            }
        }
    }

    fn new_game(&mut self, timeout: Duration) -> Result<(), AdvisorError> {
        self.send(&UciCommand::UciNewGame)?;
        self.send(&UciCommand::IsReady)?;
        self.wait_for(Instant::now() + timeout, timeout, |l| *l == EngineLine::ReadyOk)?;
        Ok(())
    }

    fn best_move(
        &mut self,
        fen: &str,
        budget: SearchBudget,
        timeout: Duration,
    ) -> Result<(Option<String>, Option<Score>), AdvisorError> {
        // Leftovers of an earlier exchange must not be taken for this answer
        while self.lines.try_recv().is_ok() {}

        self.send(&UciCommand::Position { fen: fen.to_string() })?;
        self.send(&UciCommand::Go(budget))?;

        let deadline = Instant::now() + timeout;
        let mut score = None;
        loop {
            match self.wait_for(deadline, timeout, |l| matches!(l, EngineLine::Info(_) | EngineLine::BestMove(_)))? {
                EngineLine::Info(info) => score = info.score.or(score),
                EngineLine::BestMove(mv) => return Ok((mv, score)),
                _ => (),
            }
        }
    }
}

impl Drop for EngineProcess {
    fn drop(&mut self) {
        let _ = self.send(&UciCommand::Quit);
        let deadline = Instant::now() + QUIT_GRACE;
        loop {
            match self.child.try_wait() {
                Ok(Some(_)) => return,
                Ok(None) if Instant::now() < deadline => thread::sleep(Duration::from_millis(10)),
                Ok(None) => break,
                Err(e) if e.kind() == ErrorKind::Interrupted => (),
                Err(_) => break,
            }
        }
        if let Err(e) = self.child.kill() {
            debug!(error = %e, "could not kill advisor process");
        }
        let _ = self.child.wait();
    }
}
