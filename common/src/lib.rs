//! Wire format shared by the minesweeper server and client.
//!
//! The protocol is line oriented: every client request is a single line and
//! every server reply is one or more newline-terminated lines. [`Request`]
//! covers the client side of the grammar and [`Reply`] the server side.

pub mod protocol;

pub use protocol::{BOOM_MESSAGE, HELP_MESSAGE, Reply, Request};
