//! CLI channel: interactive terminal-based chat.
//!
//! Writes the `>> ` prompt, reads one line, hands it to the caller. Blank
//! lines are skipped; EOF (Ctrl+D) or an exit word ends the session.

use thiserror::Error;
use tokio::io::{
    self, AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Lines, Stdin,
    Stdout,
};
use tracing::debug;

/// Shown before every read.
pub const PROMPT: &str = ">> ";

/// Lines that end the session like EOF does.
pub const EXIT_WORDS: [&str; 5] = ["exit", "quit", "/exit", "/quit", ":q"];

#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("Terminal I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Interactive CLI channel for terminal-based chat.
pub struct CliChannel<R, W> {
    lines: Lines<R>,
    out: W,
}

impl CliChannel<BufReader<Stdin>, Stdout> {
    /// A channel over the process's stdin and stdout.
    pub fn stdio() -> Self {
        Self::new(BufReader::new(io::stdin()), io::stdout())
    }
}

impl<R, W> CliChannel<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(reader: R, out: W) -> Self {
        Self {
            lines: reader.lines(),
            out,
        }
    }

    /// Prompt and read the next non-blank line.
    ///
    /// Returns `None` at EOF or when the user types an exit word.
    pub async fn read_line(&mut self) -> Result<Option<String>, ChannelError> {
        loop {
            self.out.write_all(PROMPT.as_bytes()).await?;
            self.out.flush().await?;

            let Some(line) = self.lines.next_line().await? else {
                debug!("End of input");
                return Ok(None);
            };

            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if is_exit_word(line) {
                debug!(word = line, "Exit requested");
                return Ok(None);
            }
            return Ok(Some(line.to_string()));
        }
    }

    /// Print one reply line.
    pub async fn send(&mut self, content: &str) -> Result<(), ChannelError> {
        self.out.write_all(content.as_bytes()).await?;
        self.out.write_all(b"\n").await?;
        self.out.flush().await?;
        Ok(())
    }

    /// Give back the writer, e.g. to inspect what was printed.
    pub fn into_writer(self) -> W {
        self.out
    }
}

pub fn is_exit_word(line: &str) -> bool {
    EXIT_WORDS.contains(&line)
}
