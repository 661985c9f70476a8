//! PGN transcript of the current game.
//!
//! The text is always derived from the [`GameLog`]: it is rendered from
//! scratch and the file replaced whole on every change, so the file on disk
//! is either the previous complete record or the new one.

use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};

use crate::board::STARTING_FEN;
use crate::config::PgnConfig;
use crate::error::TranscriptWriteError;
use crate::history::GameLog;
use crate::notation::to_notation;
use crate::piece::Color;

const LINE_WIDTH: usize = 80;

#[derive(Debug, Clone)]
pub struct Transcript {
    path: PathBuf,
    tags: PgnConfig,
    date: NaiveDate,
}

impl Transcript {
    pub fn new(path: PathBuf, tags: PgnConfig) -> Transcript {
        Transcript {
            path,
            tags,
            date: Local::now().date_naive(),
        }
    }

    /// The date tag follows the start of the game
    pub fn restart(&mut self) {
        self.date = Local::now().date_naive();
    }

    pub fn render(&self, log: &GameLog) -> String {
        let mut board = log.start().clone();
        let mut tokens = Vec::with_capacity(log.len() + log.len() / 2 + 2);
        for (i, mv) in log.moves().enumerate() {
            let number = board.fullmove_number();
            match board.side_to_move() {
                Color::White => tokens.push(format!("{}.", number)),
                Color::Black if i == 0 => tokens.push(format!("{}...", number)),
                Color::Black => (),
            }
            tokens.push(to_notation(mv, &board));
            board.make(mv);
        }
        let result = board.status(log.repetitions()).result_marker();
        tokens.push(result.to_string());

        let start_fen = log.start().get_fen();
        let mut tags = vec![
            ("Event", self.tags.event.clone()),
            ("Site", self.tags.site.clone()),
            ("Date", self.date.format("%Y.%m.%d").to_string()),
            ("Round", String::from("-")),
            ("White", self.tags.white.clone()),
            ("Black", self.tags.black.clone()),
            ("Result", result.to_string()),
        ];
        if start_fen != STARTING_FEN {
            tags.push(("SetUp", String::from("1")));
            tags.push(("FEN", start_fen));
        }

        let mut out = String::new();
        for (name, value) in tags {
            out.push_str(&format!("[{} \"{}\"]\n", name, escape(&value)));
        }
        out.push('\n');
        out.push_str(&wrap(&tokens));
        out.push('\n');
        out
    }

    /// Renders the game and replaces the transcript file with it
    pub fn write(&self, log: &GameLog) -> Result<(), TranscriptWriteError> {
        persist(&self.render(log), &self.path)
    }

    pub fn clear(&self) -> Result<(), TranscriptWriteError> {
        clear(&self.path)
    }
}

fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

fn wrap(tokens: &[String]) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut line = String::new();
    for token in tokens {
        if !line.is_empty() && line.len() + 1 + token.len() > LINE_WIDTH {
            lines.push(std::mem::take(&mut line));
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(token);
    }
    lines.push(line);
    lines.join("\n")
}

/// Writes `text` to a temporary file next to `path`, syncs it and renames
/// it over `path`. A failed write leaves the previous file untouched
pub fn persist(text: &str, path: &Path) -> Result<(), TranscriptWriteError> {
    let fail = |source: std::io::Error| TranscriptWriteError {
        path: path.to_path_buf(),
        source,
    };
    let mut tmp_name = path.file_name().ok_or_else(|| fail(ErrorKind::InvalidInput.into()))?.to_os_string();
    tmp_name.push(format!(".{:08x}.tmp", rand::random::<u32>()));
    let tmp = path.with_file_name(tmp_name);

    let written = File::create(&tmp).and_then(|mut file| {
        file.write_all(text.as_bytes())?;
        file.sync_all()
    });
    if let Err(e) = written.and_then(|_| fs::rename(&tmp, path)) {
        let _ = fs::remove_file(&tmp);
        return Err(fail(e));
    }
    Ok(())
}

/// Removes the transcript file, which may not exist yet
pub fn clear(path: &Path) -> Result<(), TranscriptWriteError> {
    match fs::remove_file(path) {
        Err(e) if e.kind() != ErrorKind::NotFound => Err(TranscriptWriteError {
            path: path.to_path_buf(),
            source: e,
        }),
        _ => Ok(()),
    }
}
