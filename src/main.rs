use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::error;
use tracing_subscriber::EnvFilter;

use voice_chess::advisor::AdvisorBridge;
use voice_chess::board::Board;
use voice_chess::config::{Config, DEFAULT_CONFIG_PATH};
use voice_chess::console::Console;
use voice_chess::session::Session;

#[derive(Parser, Debug)]
#[command(version, author, about)]
struct Cli {
    /// TOML configuration file
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Mode>,
}

#[derive(Subcommand, Debug)]
enum Mode {
    /// Play a game from the console (the default)
    Play(PlayArgs),
    /// Count the leaf nodes of the legal move tree
    Perft {
        depth: u32,
        /// Position to start from, the standard one when absent
        fen: Option<String>,
    },
}

#[derive(clap::Args, Debug, Default)]
struct PlayArgs {
    /// Where the PGN transcript is written
    #[arg(long)]
    transcript: Option<PathBuf>,
    /// Start position
    #[arg(long)]
    fen: Option<String>,
    /// UCI engine used as advisor
    #[arg(long)]
    engine: Option<PathBuf>,
    /// Play without the advisor
    #[arg(long)]
    no_engine: bool,
    /// Show the advisor's move after every change
    #[arg(long)]
    hint: bool,
}

impl PlayArgs {
    fn apply(self, config: &mut Config) {
        if let Some(path) = self.transcript {
            config.transcript = path;
        }
        if self.fen.is_some() {
            config.start_fen = self.fen;
        }
        if let Some(engine) = self.engine {
            config.advisor.path = engine;
        }
        if self.no_engine {
            config.advisor.enabled = false;
        }
        if self.hint {
            config.advisor.show_hint = true;
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command.unwrap_or(Mode::Play(PlayArgs::default())) {
        Mode::Perft { depth, fen } => {
            let board = match fen {
                Some(f) => Board::new(&f),
                None => Ok(Board::starting_position()),
            };
            match board {
                Ok(mut board) => {
                    voice_chess::run_perft(depth, &mut board);
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    error!(error = %e, "invalid position");
                    ExitCode::FAILURE
                }
            }
        }
        Mode::Play(args) => {
            println!("voice_chess v{}, by {}", env!("CARGO_PKG_VERSION"), env!("CARGO_PKG_AUTHORS"));
            let mut config = match Config::load(&cli.config) {
                Ok(config) => config,
                Err(e) => {
                    error!(error = %e, "cannot start");
                    return ExitCode::FAILURE;
                }
            };
            args.apply(&mut config);

            let advisor = AdvisorBridge::start(&config.advisor);
            match Session::new(&config, Box::new(advisor)) {
                Ok(session) => {
                    Console::new(session).run();
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    error!(error = %e, "invalid start position");
                    ExitCode::FAILURE
                }
            }
        }
    }
}
