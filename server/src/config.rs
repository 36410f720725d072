use std::path::PathBuf;

use clap::Parser;

use crate::{board_file, error::ServerError, logic::Board};

pub const DEFAULT_PORT: u16 = 4444;
pub const DEFAULT_SIZE: usize = 10;

/// Command line of the minesweeper server. Every flag can also come from the
/// environment.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Keep players connected after they hit a bomb
    #[arg(long, env = "MINESWEEPER_DEBUG", overrides_with = "no_debug")]
    pub debug: bool,

    /// Disconnect players when they hit a bomb (default)
    #[arg(long, overrides_with = "debug")]
    pub no_debug: bool,

    /// Address to bind to
    #[arg(short = 'H', long, env = "MINESWEEPER_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, env = "MINESWEEPER_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Size of a randomly generated board, as WIDTH,HEIGHT
    #[arg(
        long,
        env = "MINESWEEPER_SIZE",
        value_parser = parse_size,
        default_value = "10,10",
        conflicts_with = "file"
    )]
    pub size: (usize, usize),

    /// Load the board from a file instead of generating one
    #[arg(long, env = "MINESWEEPER_FILE")]
    pub file: Option<PathBuf>,
}

impl Args {
    pub fn into_config(self) -> ServerConfig {
        let board = match self.file {
            Some(path) => BoardSource::File(path),
            None => BoardSource::Random {
                width: self.size.0,
                height: self.size.1,
            },
        };

        ServerConfig {
            host: self.host,
            port: self.port,
            debug: self.debug && !self.no_debug,
            board,
        }
    }
}

fn parse_size(value: &str) -> Result<(usize, usize), String> {
    let (width, height) = value
        .split_once(',')
        .ok_or_else(|| format!("expected WIDTH,HEIGHT, got {value:?}"))?;
    let width: usize = width
        .trim()
        .parse()
        .map_err(|e| format!("invalid width {width:?}: {e}"))?;
    let height: usize = height
        .trim()
        .parse()
        .map_err(|e| format!("invalid height {height:?}: {e}"))?;

    if width == 0 || height == 0 {
        return Err("board must be at least 1x1".to_string());
    }
    Ok((width, height))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardSource {
    Random { width: usize, height: usize },
    File(PathBuf),
}

impl BoardSource {
    pub fn build(&self) -> Result<Board, ServerError> {
        match self {
            Self::Random { width, height } => Ok(Board::random(*width, *height)?),
            Self::File(path) => Ok(Board::new(board_file::load(path)?)?),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub debug: bool,
    pub board: BoardSource,
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            debug: false,
            board: BoardSource::Random {
                width: DEFAULT_SIZE,
                height: DEFAULT_SIZE,
            },
        }
    }
}
