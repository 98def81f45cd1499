//! Console I/O for `--text` mode

use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader, Lines};

use super::{Speaker, Transcriber, normalize_transcript};

/// Reads one line of input per listen
pub struct ConsoleTranscriber<R = tokio::io::Stdin> {
    lines: Lines<BufReader<R>>,
    timeout: Duration,
    closed: bool,
}

impl ConsoleTranscriber {
    /// Read from stdin, waiting at most `timeout` per line
    #[must_use]
    pub fn stdin(timeout: Duration) -> Self {
        Self::new(tokio::io::stdin(), timeout)
    }
}

impl<R: AsyncRead + Unpin> ConsoleTranscriber<R> {
    /// Read lines from any async reader
    pub fn new(reader: R, timeout: Duration) -> Self {
        Self {
            lines: BufReader::new(reader).lines(),
            timeout,
            closed: false,
        }
    }
}

#[async_trait(?Send)]
impl<R: AsyncRead + Unpin> Transcriber for ConsoleTranscriber<R> {
    async fn listen(&mut self) -> Option<String> {
        if self.closed {
            // Keep the loop from spinning once stdin is gone
            tokio::time::sleep(self.timeout).await;
            return None;
        }

        match tokio::time::timeout(self.timeout, self.lines.next_line()).await {
            Ok(Ok(Some(line))) => {
                let text = normalize_transcript(&line);
                if let Some(utterance) = &text {
                    tracing::info!(utterance, "recognized");
                }
                text
            }
            Ok(Ok(None)) => {
                tracing::info!("input closed");
                self.closed = true;
                None
            }
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "failed to read input");
                None
            }
            Err(_) => None,
        }
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}

/// Prints replies to stdout
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSpeaker;

#[async_trait(?Send)]
impl Speaker for ConsoleSpeaker {
    async fn speak(&mut self, text: &str) {
        if text.trim().is_empty() {
            return;
        }
        tracing::info!(text, "speaking");
        println!("[Assistant]: {text}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_reads_lines() {
        let input: &[u8] = b"Hey Assistant\n\nwhat time is it?\n";
        let mut console = ConsoleTranscriber::new(input, Duration::from_millis(50));

        assert_eq!(console.listen().await.as_deref(), Some("hey assistant"));
        assert_eq!(console.listen().await, None);
        assert_eq!(console.listen().await.as_deref(), Some("what time is it"));
        assert_eq!(console.listen().await, None);
        assert!(console.is_closed());
        assert_eq!(console.listen().await, None);
    }
}
