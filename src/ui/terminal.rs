use std::sync::Arc;
use tokio::io::{stdin, AsyncBufRead, AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::Mutex;

use crate::{
    error::{AppError, Notice, Result},
    integrations::wallet::{
        pairing::{SessionProposal, Settlement},
        PairingRelay,
    },
};

use super::{view::ScreenView, Renderer, UserPrompt};

/// Line-oriented front-end writing to stdout. Reads are serialized through
/// one line reader so the command loop, prompts and the console relay never
/// race for input.
pub struct TerminalConsole<R = BufReader<Stdin>> {
    lines: Mutex<Lines<R>>,
}

impl Default for TerminalConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalConsole {
    pub fn new() -> Self {
        Self::from_reader(BufReader::new(stdin()))
    }
}

impl<R> TerminalConsole<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    pub fn from_reader(reader: R) -> Self {
        Self {
            lines: Mutex::new(reader.lines()),
        }
    }

    /// Next input line, or `None` on EOF. Cancel safe.
    pub async fn read_line(&self) -> Option<String> {
        let mut lines = self.lines.lock().await;
        match lines.next_line().await {
            Ok(line) => line,
            Err(e) => {
                tracing::error!("Failed to read input line: {}", e);
                None
            }
        }
    }
}

impl<R> Renderer for TerminalConsole<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    fn render(&self, view: &ScreenView) {
        println!("\n{}", view.to_text());
    }
}

#[async_trait::async_trait]
impl<R> UserPrompt for TerminalConsole<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    async fn notify(&self, notice: &Notice) {
        println!("\n--- {} ---\n{}\n(press Enter)", notice.title, notice.message);
        let _ = self.read_line().await;
    }

    async fn confirm(&self, notice: &Notice) -> bool {
        println!("\n--- {} ---\n{}\nContinue? [y/N]", notice.title, notice.message);
        matches!(
            self.read_line()
                .await
                .map(|answer| answer.trim().to_ascii_lowercase())
                .as_deref(),
            Some("y") | Some("yes")
        )
    }
}

/// Relay for wallets that answer by redirecting to a `fundme://pair/...`
/// callback, which the user pastes into the terminal.
pub struct ConsoleRelay<R = BufReader<Stdin>> {
    console: Arc<TerminalConsole<R>>,
}

impl<R> ConsoleRelay<R> {
    pub fn new(console: Arc<TerminalConsole<R>>) -> Self {
        Self { console }
    }
}

#[async_trait::async_trait]
impl<R> PairingRelay for ConsoleRelay<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    async fn publish(&self, proposal: &SessionProposal) -> Result<()> {
        let payload = serde_json::to_string(proposal)
            .map_err(|e| AppError::Internal(format!("Cannot encode proposal: {}", e)))?;
        tracing::debug!("Session proposal: {}", payload);
        println!(
            "\nFundMe pairing request (open with a wallet that supports it):\n  {}",
            proposal.pairing_uri()
        );
        Ok(())
    }

    async fn await_settlement(&self, topic: &str) -> Result<Settlement> {
        loop {
            println!("Paste the wallet callback link (empty line to cancel):");
            let Some(line) = self.console.read_line().await else {
                return Err(AppError::UserCancelled);
            };
            if line.trim().is_empty() {
                return Ok(Settlement::Rejected {
                    topic: topic.to_string(),
                    reason: "Cancelled from terminal".to_string(),
                });
            }
            match Settlement::from_callback(&line) {
                Ok(settlement) if settlement.topic() == topic => return Ok(settlement),
                Ok(settlement) => println!(
                    "Callback is for pairing {}, expected {}",
                    settlement.topic(),
                    topic
                ),
                Err(e) => println!("{}", e),
            }
        }
    }
}
