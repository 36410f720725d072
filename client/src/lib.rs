//! Minesweeper Client Library
//!
//! An async client for the minesweeper multiplayer server. It speaks the
//! line-based text protocol over TCP and turns replies into board rows.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use minesweeper_client::{DigOutcome, MinesweeperClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//!     let mut client = MinesweeperClient::connect("127.0.0.1:4444").await?;
//!     println!(
//!         "{} players on a {}x{} board",
//!         client.players(),
//!         client.columns(),
//!         client.rows()
//!     );
//!
//!     client.flag(1, 1).await?;
//!     match client.dig(0, 0).await? {
//!         DigOutcome::Board(rows) => println!("{}", rows.join("\n")),
//!         DigOutcome::Boom => println!("BOOM!"),
//!     }
//!
//!     client.bye().await?;
//!     Ok(())
//! }
//! ```

mod client;

pub use client::{DigOutcome, MinesweeperClient};

// Re-export common types for convenience
pub use minesweeper_common::protocol::*;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;
