use minesweeper_client::{DigOutcome, MinesweeperClient, Result};
use tracing::info;

/// Digs along the diagonal of a running server's board until a bomb goes off.
///
/// Usage: `cargo run -p minesweeper-client --example play -- [ADDR]`
#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let addr = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "127.0.0.1:4444".to_string());
    let mut client = MinesweeperClient::connect(addr.as_str()).await?;
    info!(
        "Joined {} players on a {}x{} board",
        client.players(),
        client.columns(),
        client.rows()
    );
    println!("{}", client.help().await?);

    let steps = client.columns().min(client.rows());
    for i in 0..steps as i64 {
        match client.dig(i, i).await? {
            DigOutcome::Board(rows) => {
                println!("dig {i} {i}");
                println!("{}\n", rows.join("\n"));
            }
            DigOutcome::Boom => {
                println!("BOOM! at {i} {i}");
                return Ok(());
            }
        }
    }

    client.bye().await
}
