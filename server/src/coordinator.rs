//! The game coordinator: the one task that owns the board.
//!
//! Every session pushes [`Command`]s into a single unbounded channel and the
//! coordinator handles them strictly one after another. Board mutation and
//! board rendering only ever happen here, which is what keeps concurrent
//! players from observing a half-applied dig.

use std::{collections::HashMap, fmt};

use minesweeper_common::Reply;
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::logic::Board;

pub type CommandSender = mpsc::UnboundedSender<Command>;
pub type ReplySender = mpsc::UnboundedSender<Reply>;

/// Identity of one connected session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlayerId(Uuid);

impl PlayerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PlayerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Work item sent from a session to the coordinator.
#[derive(Debug)]
pub enum Command {
    /// A session joined; replies for `id` go to `replies`.
    NewPlayer { id: PlayerId, replies: ReplySender },
    Look { id: PlayerId },
    Dig { id: PlayerId, x: i64, y: i64 },
    Flag { id: PlayerId, x: i64, y: i64 },
    Deflag { id: PlayerId, x: i64, y: i64 },
    /// The session is closing. Never answered.
    Bye { id: PlayerId },
}

impl Command {
    pub fn player(&self) -> PlayerId {
        match self {
            Self::NewPlayer { id, .. }
            | Self::Look { id }
            | Self::Dig { id, .. }
            | Self::Flag { id, .. }
            | Self::Deflag { id, .. }
            | Self::Bye { id } => *id,
        }
    }
}

pub struct Coordinator {
    board: Board,
    debug: bool,
    /// `None` marks a player that has left.
    players: HashMap<PlayerId, Option<ReplySender>>,
    player_count: usize,
}

impl Coordinator {
    pub fn new(board: Board, debug: bool) -> Self {
        Self {
            board,
            debug,
            players: HashMap::new(),
            player_count: 0,
        }
    }

    /// Moves the coordinator onto its own task and returns the sender every
    /// session uses to reach it.
    pub fn spawn(self) -> (CommandSender, JoinHandle<()>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let handle = tokio::spawn(self.run(receiver));
        (sender, handle)
    }

    /// Processes commands until every sender has been dropped.
    pub async fn run(mut self, mut commands: mpsc::UnboundedReceiver<Command>) {
        info!(
            "Game coordinator started: {}x{} board, debug mode {}",
            self.board.width(),
            self.board.height(),
            if self.debug { "on" } else { "off" }
        );

        while let Some(command) = commands.recv().await {
            self.handle(command);
        }

        info!("Game coordinator stopped, no sessions left to serve");
    }

    pub fn player_count(&self) -> usize {
        self.player_count
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Applies one command and answers its sender.
    #[instrument(level = "trace", skip(self), fields(player = %command.player()))]
    pub fn handle(&mut self, command: Command) {
        debug!("Handling {:?}", command);

        match command {
            Command::NewPlayer { id, replies } => {
                let previous = self.players.insert(id, Some(replies));
                if matches!(previous, Some(Some(_))) {
                    warn!("Player {} registered twice", id);
                } else {
                    self.player_count += 1;
                }
                info!("Player {} joined, {} players", id, self.player_count);

                self.reply(
                    id,
                    Reply::Hello {
                        players: self.player_count,
                        columns: self.board.width(),
                        rows: self.board.height(),
                    },
                );
            }
            Command::Bye { id } => match self.players.get_mut(&id) {
                Some(entry) if entry.is_some() => {
                    *entry = None;
                    self.player_count -= 1;
                    info!("Player {} left, {} players", id, self.player_count);
                }
                _ => debug!("Ignoring bye from inactive player {}", id),
            },
            Command::Look { id } => self.reply(id, Reply::Board(self.board.render())),
            Command::Dig { id, x, y } => {
                if self.board.dig(x, y) {
                    info!("Player {} hit a bomb at ({}, {})", id, x, y);
                    self.reply(id, Reply::Boom { debug: self.debug });
                } else {
                    self.reply(id, Reply::Board(self.board.render()));
                }
            }
            Command::Flag { id, x, y } => {
                self.board.flag(x, y);
                self.reply(id, Reply::Board(self.board.render()));
            }
            Command::Deflag { id, x, y } => {
                self.board.deflag(x, y);
                self.reply(id, Reply::Board(self.board.render()));
            }
        }
    }

    /// Replies to players that left or whose session is gone are dropped.
    fn reply(&self, id: PlayerId, reply: Reply) {
        match self.players.get(&id) {
            Some(Some(sender)) => {
                if sender.send(reply).is_err() {
                    debug!("Session of player {} is gone, reply dropped", id);
                }
            }
            Some(None) => debug!("Player {} already left, reply dropped", id),
            None => warn!("Reply for unknown player {} dropped", id),
        }
    }
}
