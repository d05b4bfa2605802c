use std::sync::Arc;
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod constants;
mod crypto;
mod error;
mod integrations;
mod models;
mod services;
#[cfg(test)]
mod testing;
mod ui;
mod utils;

use config::{Config, LauncherMode};
use integrations::wallet::{DappMetadata, DeepLinks, Launcher, PrintLauncher, SystemLauncher, WalletBridge};
use models::{ChainConfig, ContractDescriptor};
use services::{ChainReader, TransactionBuilder};
use ui::{ConsoleRelay, Flow, FundMeScreen, ScreenDeps, TerminalConsole};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout belongs to the screen.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fundme_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load configuration
    let config = Config::from_env()?;
    config.validate()?;

    let capabilities = crypto::init();
    let chain = ChainConfig::monad_testnet();
    let contract = ContractDescriptor::fund_me()?;

    tracing::info!("Starting FundMe client");
    tracing::info!("Chain: {} ({})", chain.chain_name, chain.chain_id);
    tracing::info!("Contract: {:?}", contract.address);

    let console = Arc::new(TerminalConsole::new());
    let launcher: Arc<dyn Launcher> = match config.launcher {
        LauncherMode::System => Arc::new(SystemLauncher),
        LauncherMode::Print => Arc::new(PrintLauncher),
    };

    let bridge = WalletBridge::new(
        DeepLinks::new(config.wallet_link_base()?, chain.explorer_url.clone()),
        launcher.clone(),
        Arc::new(ConsoleRelay::new(console.clone())),
        console.clone(),
        DappMetadata {
            name: config.dapp_name.clone(),
            url: config.dapp_url.clone(),
        },
        config.pairing_timeout(),
        &chain,
    );

    let deps = ScreenDeps {
        reader: ChainReader::connect(
            chain.clone(),
            contract.clone(),
            capabilities.hasher.clone(),
        )?,
        builder: TransactionBuilder::new(capabilities.hasher.clone()),
        bridge,
        launcher,
        prompt: console.clone(),
        renderer: console.clone(),
        refresh_delay: config.refresh_delay(),
        chain,
        contract,
    };

    let (events_tx, mut events_rx) = mpsc::unbounded_channel();
    let mut screen = FundMeScreen::new(deps, events_tx);
    screen.mount().await;

    loop {
        tokio::select! {
            line = console.read_line() => match line {
                Some(line) => {
                    if screen.handle_command(&line).await == Flow::Quit {
                        break;
                    }
                }
                None => break,
            },
            Some(event) = events_rx.recv() => screen.handle_event(event).await,
        }
    }

    tracing::info!("Bye");
    Ok(())
}
