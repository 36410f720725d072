//! Multiplayer minesweeper over a plain-text TCP protocol.
//!
//! A single [`coordinator::Coordinator`] task owns the [`logic::Board`] and
//! serializes every command. Each connection runs its own
//! [`session::run_session`] task which parses client lines and exchanges
//! messages with the coordinator.

pub mod board_file;
pub mod config;
pub mod coordinator;
pub mod data;
pub mod error;
pub mod logic;
pub mod server;
pub mod session;
