use std::{net::SocketAddr, time::Duration};

use tokio::net::TcpListener;
use tracing::{Instrument, debug, error, info, info_span, instrument, warn};

use crate::{
    config::ServerConfig,
    coordinator::{CommandSender, Coordinator},
    error::ServerError,
    logic::Board,
    session::run_session,
};

/// Pause after a failed accept, so a persistent error such as running out of
/// file descriptors does not spin.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(10);

/// Accepts connections forever, one session task per client.
pub async fn serve(listener: TcpListener, commands: CommandSender) {
    loop {
        let (stream, peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                warn!("Failed to accept connection: {}", e);
                tokio::time::sleep(ACCEPT_BACKOFF).await;
                continue;
            }
        };

        info!("Client connected from {}", peer);
        let commands = commands.clone();
        tokio::spawn(
            async move {
                match run_session(stream, commands).await {
                    Ok(()) => info!("Client disconnected"),
                    Err(e) => warn!("Session ended with error: {}", e),
                }
            }
            .instrument(info_span!("session", %peer)),
        );
    }
}

/// Starts the coordinator and the acceptor in the background on an already
/// bound listener and returns the address clients should connect to.
pub fn spawn(listener: TcpListener, board: Board, debug: bool) -> std::io::Result<SocketAddr> {
    let addr = listener.local_addr()?;
    let (commands, _) = Coordinator::new(board, debug).spawn();
    tokio::spawn(serve(listener, commands));
    debug!("Server spawned on {}", addr);
    Ok(addr)
}

/// Runs the server described by `config` until Ctrl+C.
#[instrument(level = "trace", skip(config), fields(addr = %config.bind_addr()))]
pub async fn run(config: ServerConfig) -> Result<(), ServerError> {
    let board = config.board.build()?;

    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|source| ServerError::Bind {
            addr: addr.clone(),
            source,
        })?;
    let local = listener.local_addr().map_err(|source| ServerError::Bind {
        addr: addr.clone(),
        source,
    })?;

    info!(
        "Minesweeper server listening on {} ({}x{} board, debug mode {})",
        local,
        board.width(),
        board.height(),
        if config.debug { "on" } else { "off" }
    );

    let (commands, coordinator) = Coordinator::new(board, config.debug).spawn();

    tokio::select! {
        () = serve(listener, commands) => {}
        result = coordinator => {
            if let Err(e) = result {
                error!("Game coordinator failed: {}", e);
            }
        }
        result = tokio::signal::ctrl_c() => {
            match result {
                Ok(()) => info!("Received Ctrl+C, shutting down"),
                Err(e) => error!("Failed to listen for Ctrl+C: {}", e),
            }
        }
    }

    Ok(())
}
