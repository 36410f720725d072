use minesweeper_common::protocol::{BOOM_MESSAGE, Reply, Request};
use tokio::{
    io::{
        AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, ReadHalf, WriteHalf,
    },
    net::{TcpStream, ToSocketAddrs},
};
use tracing::{debug, info};

use crate::Result;

/// Result of a `dig` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DigOutcome {
    /// The board after the dig, one string per row.
    Board(Vec<String>),
    /// The dig hit a bomb. Outside debug mode the server closes the
    /// connection right after.
    Boom,
}

/// Connection to a minesweeper server
pub struct MinesweeperClient<S = TcpStream> {
    reader: BufReader<ReadHalf<S>>,
    writer: WriteHalf<S>,
    players: usize,
    columns: usize,
    rows: usize,
}

impl MinesweeperClient<TcpStream> {
    /// Connect to a server and read its welcome message
    pub async fn connect(addr: impl ToSocketAddrs) -> Result<Self> {
        let stream = TcpStream::connect(addr).await?;
        info!("Connected to {}", stream.peer_addr()?);
        Self::from_stream(stream).await
    }
}

impl<S> MinesweeperClient<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Wrap an already open stream and read the welcome message from it
    pub async fn from_stream(stream: S) -> Result<Self> {
        let (reader, writer) = tokio::io::split(stream);
        let mut reader = BufReader::new(reader);

        let line = read_line(&mut reader)
            .await?
            .ok_or("Connection closed before the welcome message")?;
        let Some(Reply::Hello {
            players,
            columns,
            rows,
        }) = Reply::parse_hello(&line)
        else {
            return Err(format!("Unexpected welcome message: {line:?}").into());
        };
        if columns == 0 || rows == 0 {
            return Err(format!("Server announced an empty {columns}x{rows} board").into());
        }

        debug!("Joined as one of {} players on a {}x{} board", players, columns, rows);
        Ok(Self {
            reader,
            writer,
            players,
            columns,
            rows,
        })
    }

    /// Players connected when this client joined, itself included
    pub fn players(&self) -> usize {
        self.players
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub async fn look(&mut self) -> Result<Vec<String>> {
        self.send(Request::Look).await?;
        self.read_board().await
    }

    pub async fn dig(&mut self, x: i64, y: i64) -> Result<DigOutcome> {
        self.send(Request::Dig { x, y }).await?;

        let first = self.expect_line().await?;
        if first == BOOM_MESSAGE {
            return Ok(DigOutcome::Boom);
        }

        let mut rows = Vec::with_capacity(self.rows);
        rows.push(first);
        rows.extend(self.read_lines(self.rows - 1).await?);
        Ok(DigOutcome::Board(rows))
    }

    pub async fn flag(&mut self, x: i64, y: i64) -> Result<Vec<String>> {
        self.send(Request::Flag { x, y }).await?;
        self.read_board().await
    }

    pub async fn deflag(&mut self, x: i64, y: i64) -> Result<Vec<String>> {
        self.send(Request::Deflag { x, y }).await?;
        self.read_board().await
    }

    pub async fn help(&mut self) -> Result<String> {
        self.send(Request::Help).await?;
        self.expect_line().await
    }

    /// Say goodbye and wait for the server to close the connection
    pub async fn bye(mut self) -> Result<()> {
        self.send(Request::Bye).await?;
        match read_line(&mut self.reader).await? {
            None => {
                info!("Disconnected");
                Ok(())
            }
            Some(line) => Err(format!("Unexpected line after bye: {line:?}").into()),
        }
    }

    /// Send an arbitrary line. The server ignores anything it cannot parse.
    pub async fn send_raw(&mut self, line: &str) -> Result<()> {
        debug!("Sending {:?}", line);
        self.writer.write_all(format!("{line}\n").as_bytes()).await?;
        self.writer.flush().await?;
        Ok(())
    }

    /// Next line from the server, `None` once it has closed the connection
    pub async fn next_line(&mut self) -> Result<Option<String>> {
        read_line(&mut self.reader).await
    }

    async fn send(&mut self, request: Request) -> Result<()> {
        self.send_raw(&request.to_string()).await
    }

    async fn read_board(&mut self) -> Result<Vec<String>> {
        self.read_lines(self.rows).await
    }

    async fn read_lines(&mut self, count: usize) -> Result<Vec<String>> {
        let mut lines = Vec::with_capacity(count);
        for _ in 0..count {
            lines.push(self.expect_line().await?);
        }
        Ok(lines)
    }

    async fn expect_line(&mut self) -> Result<String> {
        Ok(read_line(&mut self.reader)
            .await?
            .ok_or("Connection closed by server")?)
    }
}

async fn read_line<R>(reader: &mut BufReader<R>) -> Result<Option<String>>
where
    R: AsyncRead + Unpin,
{
    let mut line = String::new();
    if reader.read_line(&mut line).await? == 0 {
        return Ok(None);
    }

    let trimmed = line.strip_suffix('\n').unwrap_or(&line);
    let trimmed = trimmed.strip_suffix('\r').unwrap_or(trimmed);
    debug!("Received {:?}", trimmed);
    Ok(Some(trimmed.to_string()))
}

#[cfg(test)]
mod tests {
    use minesweeper_common::HELP_MESSAGE;
    use tokio_test::io::Builder;

    use super::*;

    const WELCOME: &[u8] = b"Welcome to Minesweeper. Players: 2 including you. Board: 3 columns by 2 rows. Type 'help' for help.\n";

    #[tokio::test]
    async fn reads_welcome_and_boards() {
        let stream = Builder::new()
            .read(WELCOME)
            .write(b"look\n")
            .read(b"- - -\n- - -\n")
            .write(b"dig 0 0\n")
            .read(b"1 - -\n- - -\n")
            .write(b"flag -1 99\n")
            .read(b"1 - -\n")
            .read(b"- - -\n")
            .build();

        let mut client = MinesweeperClient::from_stream(stream).await.unwrap();
        assert_eq!(
            (client.players(), client.columns(), client.rows()),
            (2, 3, 2)
        );
        assert_eq!(client.look().await.unwrap(), vec!["- - -", "- - -"]);
        assert_eq!(
            client.dig(0, 0).await.unwrap(),
            DigOutcome::Board(vec!["1 - -".to_string(), "- - -".to_string()])
        );
        assert_eq!(client.flag(-1, 99).await.unwrap(), vec!["1 - -", "- - -"]);
    }

    #[tokio::test]
    async fn boom_help_and_bye() {
        let stream = Builder::new()
            .read(WELCOME)
            .write(b"dig 1 1\n")
            .read(b"BOOM!\n")
            .write(b"help\n")
            .read(format!("{HELP_MESSAGE}\n").as_bytes())
            .write(b"bye\n")
            .build();

        let mut client = MinesweeperClient::from_stream(stream).await.unwrap();
        assert_eq!(client.dig(1, 1).await.unwrap(), DigOutcome::Boom);
        assert_eq!(client.help().await.unwrap(), HELP_MESSAGE);
        client.bye().await.unwrap();
    }

    #[tokio::test]
    async fn rejects_unexpected_welcome() {
        let stream = Builder::new().read(b"hello there\n").build();
        assert!(MinesweeperClient::from_stream(stream).await.is_err());
    }

    #[tokio::test]
    async fn rejects_empty_board_in_welcome() {
        let stream = Builder::new()
            .read(b"Welcome to Minesweeper. Players: 1 including you. Board: 3 columns by 0 rows. Type 'help' for help.\n")
            .build();
        assert!(MinesweeperClient::from_stream(stream).await.is_err());
    }

    #[tokio::test]
    async fn early_close_is_an_error() {
        let stream = Builder::new()
            .read(WELCOME)
            .write(b"look\n")
            .read(b"- - -\n")
            .build();

        let mut client = MinesweeperClient::from_stream(stream).await.unwrap();
        assert!(client.look().await.is_err());
    }
}
