//! Session configuration, read from a TOML file. Every field has a default
//! so a partial file (or none at all) is fine.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

pub const DEFAULT_CONFIG_PATH: &str = "voice_chess.toml";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Where the PGN transcript is written after every change
    pub transcript: PathBuf,
    /// Position new games start from, the standard one when absent
    pub start_fen: Option<String>,
    pub advisor: AdvisorConfig,
    pub pgn: PgnConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            transcript: PathBuf::from("game_log.pgn"),
            start_fen: None,
            advisor: AdvisorConfig::default(),
            pgn: PgnConfig::default(),
        }
    }
}

impl Config {
    /// Reads the config file at `path`. A missing file gives the defaults
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(text) => Config::parse(&text, path),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Config::default()),
            Err(source) => Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    pub fn parse(text: &str, path: &Path) -> Result<Config, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AdvisorConfig {
    pub enabled: bool,
    /// UCI binary, looked up on PATH when it has no directory part
    pub path: PathBuf,
    pub args: Vec<String>,
    /// Search depth for advice and hints
    pub depth: u32,
    /// Thinking time when the advisor's move is played
    pub play_movetime_ms: u64,
    /// Wall-clock cap on any single query
    pub timeout_ms: u64,
    pub handshake_timeout_ms: u64,
    /// 0 means one thread per logical CPU
    pub threads: usize,
    pub hash_mb: u32,
    /// Query the advisor after every change and show its move
    pub show_hint: bool,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        AdvisorConfig {
            enabled: true,
            path: PathBuf::from("stockfish"),
            args: Vec::new(),
            depth: 10,
            play_movetime_ms: 500,
            timeout_ms: 5000,
            handshake_timeout_ms: 2000,
            threads: 0,
            hash_mb: 16,
            show_hint: false,
        }
    }
}

impl AdvisorConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn handshake_timeout(&self) -> Duration {
        Duration::from_millis(self.handshake_timeout_ms)
    }

    pub fn thread_count(&self) -> usize {
        match self.threads {
            0 => num_cpus::get(),
            n => n,
        }
    }
}

/// Free-form PGN tags
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PgnConfig {
    pub event: String,
    pub site: String,
    pub white: String,
    pub black: String,
}

impl Default for PgnConfig {
    fn default() -> Self {
        PgnConfig {
            event: String::from("Voice Chess"),
            site: String::from("Local"),
            white: String::from("White"),
            black: String::from("Black"),
        }
    }
}
