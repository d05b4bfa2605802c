use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::{
    error::{AppError, Notice, Result},
    integrations::wallet::{ConnectionOutcome, Launcher, TransactionOutcome, WalletBridge},
    models::{ChainConfig, ContractDescriptor, DisplayState, FundingPhase, FundingRequest, WalletSession},
    services::{ChainReader, TransactionBuilder},
    utils::{checksum, parse_amount, shorten_address},
};

use super::{view::ScreenView, Renderer, UserPrompt};

const TITLE: &str = "FundMe DApp";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenEvent {
    Refresh,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Connect,
    Fund(String),
    Refresh,
    Stats,
    Explorer,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = AppError;

    fn from_str(line: &str) -> Result<Self> {
        let mut parts = line.split_whitespace();
        let verb = parts.next().unwrap_or_default().to_ascii_lowercase();
        let rest = parts.collect::<Vec<_>>().join(" ");
        match verb.as_str() {
            "connect" | "c" => Ok(Command::Connect),
            "fund" | "f" => Ok(Command::Fund(rest)),
            "refresh" | "r" => Ok(Command::Refresh),
            "stats" | "s" => Ok(Command::Stats),
            "explorer" | "e" => Ok(Command::Explorer),
            "help" | "h" | "?" => Ok(Command::Help),
            "quit" | "q" | "exit" => Ok(Command::Quit),
            "" => Err(AppError::Validation("Enter a command".to_string())),
            other => Err(AppError::Validation(format!(
                "Unknown command `{}`, type `help`",
                other
            ))),
        }
    }
}

const HELP: &str = "connect        pair with your wallet app
fund <amount>  send <amount> to the contract, e.g. `fund 0.01`
refresh        re-read the contract total
stats          show contract statistics
explorer       open the contract on the block explorer
quit           exit";

/// Collaborators the screen drives.
pub struct ScreenDeps {
    pub chain: ChainConfig,
    pub contract: ContractDescriptor,
    pub reader: ChainReader,
    pub builder: TransactionBuilder,
    pub bridge: WalletBridge,
    pub launcher: Arc<dyn Launcher>,
    pub prompt: Arc<dyn UserPrompt>,
    pub renderer: Arc<dyn Renderer>,
    pub refresh_delay: Duration,
}

/// The single FundMe screen. Owns display state and the wallet session;
/// all updates happen on the task that drives it.
pub struct FundMeScreen {
    deps: ScreenDeps,
    events: mpsc::UnboundedSender<ScreenEvent>,
    display: DisplayState,
    session: WalletSession,
    phase: FundingPhase,
    amount: String,
}

impl FundMeScreen {
    pub fn new(deps: ScreenDeps, events: mpsc::UnboundedSender<ScreenEvent>) -> Self {
        Self {
            deps,
            events,
            display: DisplayState::default(),
            session: WalletSession::default(),
            phase: FundingPhase::Idle,
            amount: String::new(),
        }
    }

    pub fn display(&self) -> &DisplayState {
        &self.display
    }

    pub fn session(&self) -> &WalletSession {
        &self.session
    }

    pub fn phase(&self) -> FundingPhase {
        self.phase
    }

    pub fn view(&self) -> ScreenView {
        ScreenView {
            title: TITLE.to_string(),
            subtitle: self.deps.chain.chain_name.clone(),
            account: self.session.connected_address.as_ref().map(shorten_address),
            total_funds: format!(
                "{} {}",
                self.display.total_funds, self.deps.chain.native_symbol
            ),
            loading: self.display.loading,
            phase: self.phase,
            amount: self.amount.clone(),
            contract_address: checksum(&self.deps.contract.address),
        }
    }

    fn render(&self) {
        self.deps.renderer.render(&self.view());
    }

    async fn notify_error(&self, err: &AppError) {
        tracing::warn!("{} ({})", err, err.code());
        self.deps.prompt.notify(&err.notice()).await;
    }

    pub async fn mount(&mut self) {
        self.load_contract_data().await;
    }

    /// Failures are logged and leave the previous display state.
    pub async fn load_contract_data(&mut self) {
        match self.deps.reader.read_total_funds().await {
            Ok(total) => self.display.total_funds = total,
            Err(e) => tracing::error!("Error loading contract data: {}", e),
        }
        self.render();
    }

    pub async fn handle_event(&mut self, event: ScreenEvent) {
        match event {
            ScreenEvent::Refresh => self.load_contract_data().await,
        }
    }

    pub async fn handle_connect(&mut self) {
        if let Some(address) = self.session.connected_address {
            self.deps
                .prompt
                .notify(&Notice::new(
                    "Connect Wallet",
                    format!("Already connected as {}", checksum(&address)),
                ))
                .await;
            return;
        }

        self.display.loading = true;
        self.render();

        let outcome = self
            .deps
            .bridge
            .request_connection(&self.deps.contract, &self.deps.chain)
            .await;

        self.display.loading = false;
        match outcome {
            Ok(ConnectionOutcome::Connected(session)) => self.session = session,
            Ok(ConnectionOutcome::Cancelled) => tracing::info!("Wallet connection cancelled"),
            Ok(ConnectionOutcome::Unavailable) => {
                self.notify_error(&AppError::WalletUnavailable(
                    "wallet link cannot be opened".to_string(),
                ))
                .await
            }
            Err(e) => self.notify_error(&e).await,
        }
        self.render();
    }

    pub async fn handle_fund(&mut self, amount_text: &str) {
        self.amount = amount_text.trim().to_string();

        if !self.session.is_connected() {
            self.notify_error(&AppError::Validation(
                "Please connect wallet first".to_string(),
            ))
            .await;
            return;
        }
        let amount_wei = match parse_amount(&self.amount, self.deps.chain.native_decimals) {
            Ok(value) => value,
            Err(e) => {
                self.notify_error(&e).await;
                return;
            }
        };

        self.display.loading = true;
        self.render();

        let outcome = self.submit(amount_wei).await;

        self.display.loading = false;
        match outcome {
            Ok(TransactionOutcome::Submitted) => {
                self.phase = FundingPhase::HandedOff;
                self.render();
                self.deps
                    .prompt
                    .notify(&Notice::new(
                        "Transaction Sent",
                        "Please confirm the transaction in MetaMask mobile app",
                    ))
                    .await;
                self.amount.clear();
                self.schedule_refresh();
            }
            Ok(TransactionOutcome::Cancelled) => tracing::info!("Funding cancelled by user"),
            Ok(TransactionOutcome::Unavailable) => {
                self.notify_error(&AppError::WalletUnavailable(
                    "wallet link cannot be opened".to_string(),
                ))
                .await
            }
            Err(e) => self.notify_error(&e).await,
        }
        self.phase = FundingPhase::Idle;
        self.render();
    }

    async fn submit(&mut self, amount_wei: ethers::types::U256) -> Result<TransactionOutcome> {
        self.phase = FundingPhase::Building;
        let request = FundingRequest::new(
            &self.session,
            amount_wei,
            &self.deps.contract,
            &self.deps.chain,
        )?;
        let call = self.deps.builder.build_funding_call(
            request.amount_wei(),
            &self.deps.contract,
            request.chain_id(),
        )?;
        tracing::debug!(
            "Funding call to={:?} value={} data=0x{} chain_id={}",
            call.to,
            call.value,
            hex::encode(&call.data),
            call.chain_id
        );

        self.deps.bridge.request_transaction(&request).await
    }

    /// One re-read after the fixed delay. The wallet may not have mined the
    /// transaction by then; the next manual refresh picks it up.
    fn schedule_refresh(&self) {
        let events = self.events.clone();
        let delay = self.deps.refresh_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if events.send(ScreenEvent::Refresh).is_err() {
                tracing::debug!("Screen closed before scheduled refresh");
            }
        });
    }

    pub async fn open_explorer(&self) {
        let result = match self.deps.bridge.links().explorer(&self.deps.contract.address) {
            Ok(url) => self.deps.launcher.open(&url).await,
            Err(e) => Err(e),
        };
        if let Err(e) = result {
            self.notify_error(&e).await;
        }
    }

    pub async fn show_stats(&self) {
        let snapshot = match self.deps.reader.read_snapshot().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                self.notify_error(&e).await;
                return;
            }
        };
        let symbol = &self.deps.chain.native_symbol;
        let mut lines = vec![
            format!("Total funds: {} {}", snapshot.total_funds, symbol),
            format!("Contract balance: {} {}", snapshot.contract_balance, symbol),
            format!("Funders: {}", snapshot.funder_count),
        ];
        if let Some(address) = self.session.connected_address {
            match self.deps.reader.read_contribution(address).await {
                Ok(own) => lines.push(format!("Your contribution: {} {}", own, symbol)),
                Err(e) => tracing::warn!("Could not read contribution: {}", e),
            }
        }
        self.deps
            .prompt
            .notify(&Notice::new("Contract Stats", lines.join("\n")))
            .await;
    }

    pub async fn handle_command(&mut self, line: &str) -> Flow {
        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(e) => {
                self.notify_error(&e).await;
                return Flow::Continue;
            }
        };

        match command {
            Command::Connect => self.handle_connect().await,
            Command::Fund(amount) => self.handle_fund(&amount).await,
            Command::Refresh => self.load_contract_data().await,
            Command::Stats => self.show_stats().await,
            Command::Explorer => self.open_explorer().await,
            Command::Help => self.deps.prompt.notify(&Notice::new("Help", HELP)).await,
            Command::Quit => return Flow::Quit,
        }
        Flow::Continue
    }
}
