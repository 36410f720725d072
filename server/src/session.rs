use minesweeper_common::{HELP_MESSAGE, Reply, Request};
use tokio::{
    io::{
        AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt,
        BufReader,
    },
    sync::mpsc,
};
use tracing::{Instrument, debug, info, info_span, warn};

use crate::{
    coordinator::{Command, CommandSender, PlayerId},
    error::SessionError,
};

/// Longest request line accepted, terminator excluded. Longer lines are
/// discarded without being buffered.
pub const MAX_LINE_LEN: usize = 4096;

/// Serves one client connection until it says `bye`, detonates a bomb
/// outside debug mode, disconnects or fails.
///
/// The coordinator is told about the departure exactly once on every exit
/// path, including cancellation of the task, and the write side of `stream`
/// is shut down before returning.
pub async fn run_session<S>(stream: S, commands: CommandSender) -> Result<(), SessionError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let id = PlayerId::new();
    let span = info_span!("player", %id);

    async move {
        let (reader, mut writer) = tokio::io::split(stream);
        let mut reader = BufReader::new(reader);
        let mut session = Session { id, commands };

        let result = session.serve(&mut reader, &mut writer).await;
        drop(session);

        if let Err(e) = writer.shutdown().await {
            debug!("Failed to shut down connection: {}", e);
        }
        result
    }
    .instrument(span)
    .await
}

/// Holds the player's slot at the coordinator until dropped.
struct Session {
    id: PlayerId,
    commands: CommandSender,
}

impl Session {
    async fn serve<R, W>(&mut self, reader: &mut R, writer: &mut W) -> Result<(), SessionError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let (reply_sender, mut replies) = mpsc::unbounded_channel();
        self.send(Command::NewPlayer {
            id: self.id,
            replies: reply_sender,
        })?;
        let hello = replies.recv().await.ok_or(SessionError::CoordinatorGone)?;
        write_reply(writer, &hello).await?;

        let mut buf = Vec::new();
        while let Some(line) = read_line(reader, &mut buf).await? {
            let Some(request) = Request::parse(&line) else {
                debug!("Ignoring unrecognized line {:?}", line);
                continue;
            };

            let command = match request {
                Request::Help => {
                    write_line(writer, HELP_MESSAGE).await?;
                    continue;
                }
                Request::Bye => {
                    info!("Player said bye");
                    return Ok(());
                }
                Request::Look => Command::Look { id: self.id },
                Request::Dig { x, y } => Command::Dig { id: self.id, x, y },
                Request::Flag { x, y } => Command::Flag { id: self.id, x, y },
                Request::Deflag { x, y } => Command::Deflag { id: self.id, x, y },
            };

            self.send(command)?;
            let reply = replies.recv().await.ok_or(SessionError::CoordinatorGone)?;
            write_reply(writer, &reply).await?;

            if let Reply::Boom { debug: false } = reply {
                info!("Player hit a bomb, closing connection");
                return Ok(());
            }
        }

        info!("Client closed the connection");
        Ok(())
    }

    fn send(&self, command: Command) -> Result<(), SessionError> {
        self.commands
            .send(command)
            .map_err(|_| SessionError::CoordinatorGone)
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if self.send(Command::Bye { id: self.id }).is_err() {
            warn!("Coordinator gone before player {} could leave", self.id);
        }
    }
}

/// Next line without its `\n` or `\r\n` terminator, `None` at end of stream.
/// Bytes that are not UTF-8 are replaced so the line simply fails to parse.
/// Lines over [`MAX_LINE_LEN`] are skipped in bounded chunks.
async fn read_line<R>(reader: &mut R, buf: &mut Vec<u8>) -> std::io::Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    let mut discarding = false;
    loop {
        buf.clear();
        let read = (&mut *reader)
            .take(MAX_LINE_LEN as u64 + 1)
            .read_until(b'\n', buf)
            .await?;
        if read == 0 {
            return Ok(None);
        }

        let complete = buf.last() == Some(&b'\n');
        if discarding {
            discarding = !complete;
            continue;
        }
        if !complete && read > MAX_LINE_LEN {
            warn!("Discarding line longer than {} bytes", MAX_LINE_LEN);
            discarding = true;
            continue;
        }
        break;
    }

    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    }

    Ok(Some(String::from_utf8_lossy(buf).into_owned()))
}

async fn write_reply<W>(writer: &mut W, reply: &Reply) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(reply.to_wire().as_bytes()).await?;
    writer.flush().await
}

async fn write_line<W>(writer: &mut W, line: &str) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(format!("{line}\n").as_bytes()).await?;
    writer.flush().await
}
