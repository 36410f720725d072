use std::fmt;

/// Fixed reply to a `help` request.
pub const HELP_MESSAGE: &str = "You can send look, dig, flag, deflag commands to interact with the board; \
     a help command to get a help message or a bye command to terminate the connection.";

/// Line sent to a player whose dig detonated a bomb.
pub const BOOM_MESSAGE: &str = "BOOM!";

const HELLO_PREFIX: &str = "Welcome to Minesweeper. Players: ";
const HELLO_PLAYERS_SUFFIX: &str = " including you. Board: ";
const HELLO_COLUMNS_SUFFIX: &str = " columns by ";
const HELLO_SUFFIX: &str = " rows. Type 'help' for help.";

/// A single client request line.
///
/// Coordinates are kept exactly as sent. Negative or oversized values are
/// valid syntax; resolving them against the board is the server's job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    Look,
    Help,
    Bye,
    Dig { x: i64, y: i64 },
    Flag { x: i64, y: i64 },
    Deflag { x: i64, y: i64 },
}

impl Request {
    /// Parses one line (without its terminator) against the request grammar:
    ///
    /// ```text
    /// look | help | bye | dig INT INT | flag INT INT | deflag INT INT
    /// INT := -?[0-9]+
    /// ```
    ///
    /// Tokens are separated by exactly one space and the whole line must
    /// match. Returns `None` for anything else.
    pub fn parse(line: &str) -> Option<Self> {
        let mut tokens = line.split(' ');
        let keyword = tokens.next()?;

        let request = match keyword {
            "look" => Self::Look,
            "help" => Self::Help,
            "bye" => Self::Bye,
            "dig" | "flag" | "deflag" => {
                let x = parse_coordinate(tokens.next()?)?;
                let y = parse_coordinate(tokens.next()?)?;
                match keyword {
                    "dig" => Self::Dig { x, y },
                    "flag" => Self::Flag { x, y },
                    _ => Self::Deflag { x, y },
                }
            }
            _ => return None,
        };

        if tokens.next().is_some() {
            return None;
        }

        Some(request)
    }
}

/// Integers that overflow `i64` saturate; they are off the board either way.
fn parse_coordinate(token: &str) -> Option<i64> {
    let (negative, digits) = match token.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, token),
    };

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    Some(token.parse().unwrap_or(if negative { i64::MIN } else { i64::MAX }))
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Look => f.write_str("look"),
            Self::Help => f.write_str("help"),
            Self::Bye => f.write_str("bye"),
            Self::Dig { x, y } => write!(f, "dig {x} {y}"),
            Self::Flag { x, y } => write!(f, "flag {x} {y}"),
            Self::Deflag { x, y } => write!(f, "deflag {x} {y}"),
        }
    }
}

/// A reply produced by the game for one player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Full board render, rows separated by `\n`.
    Board(String),
    /// The requester's dig hit a bomb. `debug` means the connection survives.
    Boom { debug: bool },
    /// Greeting sent once when a player joins.
    Hello {
        players: usize,
        columns: usize,
        rows: usize,
    },
}

impl Reply {
    /// The reply as it goes over the wire, including the final newline.
    pub fn to_wire(&self) -> String {
        format!("{self}\n")
    }

    /// Parses a welcome line back into [`Reply::Hello`].
    pub fn parse_hello(line: &str) -> Option<Self> {
        let rest = line.strip_prefix(HELLO_PREFIX)?.strip_suffix(HELLO_SUFFIX)?;
        let (players, rest) = rest.split_once(HELLO_PLAYERS_SUFFIX)?;
        let (columns, rows) = rest.split_once(HELLO_COLUMNS_SUFFIX)?;

        Some(Self::Hello {
            players: players.parse().ok()?,
            columns: columns.parse().ok()?,
            rows: rows.parse().ok()?,
        })
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Board(text) => f.write_str(text),
            Self::Boom { .. } => f.write_str(BOOM_MESSAGE),
            Self::Hello {
                players,
                columns,
                rows,
            } => write!(
                f,
                "{HELLO_PREFIX}{players}{HELLO_PLAYERS_SUFFIX}{columns}{HELLO_COLUMNS_SUFFIX}{rows}{HELLO_SUFFIX}"
            ),
        }
    }
}
