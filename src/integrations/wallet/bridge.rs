use std::sync::Arc;
use std::time::Duration;

use crate::{
    error::{AppError, Notice, Result},
    models::{ChainConfig, ContractDescriptor, FundingRequest, WalletSession},
    ui::UserPrompt,
    utils::format_amount,
};

use super::{
    deep_link::DeepLinks,
    launcher::Launcher,
    pairing::{DappMetadata, PairingRelay, SessionProposal, Settlement},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionOutcome {
    Connected(WalletSession),
    Cancelled,
    Unavailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionOutcome {
    /// The wallet received the request. Signing, broadcast and
    /// confirmation happen out of process and are never observed here.
    Submitted,
    Cancelled,
    Unavailable,
}

/// Hands connection and payment requests to an external wallet app.
pub struct WalletBridge {
    links: DeepLinks,
    launcher: Arc<dyn Launcher>,
    relay: Arc<dyn PairingRelay>,
    prompt: Arc<dyn UserPrompt>,
    metadata: DappMetadata,
    pairing_timeout: Duration,
    native_symbol: String,
    native_decimals: u32,
}

impl WalletBridge {
    pub fn new(
        links: DeepLinks,
        launcher: Arc<dyn Launcher>,
        relay: Arc<dyn PairingRelay>,
        prompt: Arc<dyn UserPrompt>,
        metadata: DappMetadata,
        pairing_timeout: Duration,
        chain: &ChainConfig,
    ) -> Self {
        Self {
            links,
            launcher,
            relay,
            prompt,
            metadata,
            pairing_timeout,
            native_symbol: chain.native_symbol.clone(),
            native_decimals: chain.native_decimals,
        }
    }

    pub fn links(&self) -> &DeepLinks {
        &self.links
    }

    pub async fn request_connection(
        &self,
        contract: &ContractDescriptor,
        chain: &ChainConfig,
    ) -> Result<ConnectionOutcome> {
        let dapp_link = self.links.dapp(&contract.address)?;
        if !self.launcher.can_open(&dapp_link).await {
            tracing::warn!("Wallet link not resolvable: {}", dapp_link);
            return Ok(ConnectionOutcome::Unavailable);
        }

        let proposal = SessionProposal::new(chain, self.metadata.clone());
        self.relay.publish(&proposal).await?;

        tracing::debug!("Pairing request {}", proposal.pairing_uri());
        if let Err(e) = self.launcher.open(&dapp_link).await {
            tracing::warn!("Failed to open wallet link: {}", e);
            return Ok(ConnectionOutcome::Unavailable);
        }

        let wait = self.relay.await_settlement(&proposal.topic);
        let settlement = match tokio::time::timeout(self.pairing_timeout, wait).await {
            Ok(Ok(settlement)) => settlement,
            Ok(Err(AppError::UserCancelled)) => return Ok(ConnectionOutcome::Cancelled),
            Ok(Err(e)) => return Err(e),
            Err(_) => {
                tracing::warn!(
                    "No wallet answer for pairing {} within {:?}",
                    proposal.topic,
                    self.pairing_timeout
                );
                return Ok(ConnectionOutcome::Cancelled);
            }
        };

        match settlement {
            Settlement::Approved(approval) => {
                let address = proposal.accept(&approval)?;
                tracing::info!("Wallet connected: {:?}", address);
                Ok(ConnectionOutcome::Connected(WalletSession::connected(
                    address,
                    approval.session_topic,
                )))
            }
            Settlement::Rejected { reason, .. } => {
                tracing::info!("Wallet rejected pairing: {}", reason);
                Ok(ConnectionOutcome::Cancelled)
            }
        }
    }

    pub async fn request_transaction(&self, req: &FundingRequest) -> Result<TransactionOutcome> {
        let send_link = self
            .links
            .send(&req.recipient(), req.chain_id(), req.amount_wei())?;
        if !self.launcher.can_open(&send_link).await {
            tracing::warn!("Wallet link not resolvable: {}", send_link);
            return Ok(TransactionOutcome::Unavailable);
        }

        let amount = format_amount(req.amount_wei(), self.native_decimals)?;
        let confirm = Notice::new(
            "Fund Contract",
            format!(
                "Send {} {} to {:?} on chain {}? Your wallet will ask you to sign.",
                amount,
                self.native_symbol,
                req.recipient(),
                req.chain_id()
            ),
        );
        if !self.prompt.confirm(&confirm).await {
            return Ok(TransactionOutcome::Cancelled);
        }

        match self.launcher.open(&send_link).await {
            Ok(()) => {
                tracing::info!("Handed funding request to wallet: {}", send_link);
                Ok(TransactionOutcome::Submitted)
            }
            Err(AppError::WalletUnavailable(reason)) => {
                tracing::warn!("Wallet unavailable: {}", reason);
                Ok(TransactionOutcome::Unavailable)
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{EXPLORER_URL, WALLET_LINK_BASE};
    use crate::integrations::wallet::pairing::ChannelRelay;
    use crate::testing::{RecordingLauncher, ScriptedPrompt};
    use ethers::types::{Address, U256};
    use url::Url;

    struct Fixture {
        bridge: WalletBridge,
        launcher: Arc<RecordingLauncher>,
        prompt: Arc<ScriptedPrompt>,
        wallet: crate::integrations::wallet::pairing::WalletEndpoint,
    }

    fn fixture(resolvable: bool, timeout: Duration) -> Fixture {
        let chain = ChainConfig::monad_testnet();
        let launcher = Arc::new(RecordingLauncher::new(resolvable));
        let prompt = Arc::new(ScriptedPrompt::accepting());
        let (relay, wallet) = ChannelRelay::new();
        let bridge = WalletBridge::new(
            DeepLinks::new(Url::parse(WALLET_LINK_BASE).unwrap(), EXPLORER_URL),
            launcher.clone(),
            Arc::new(relay),
            prompt.clone(),
            DappMetadata {
                name: "FundMe DApp".to_string(),
                url: "https://fundme.monad.xyz".to_string(),
            },
            timeout,
            &chain,
        );
        Fixture {
            bridge,
            launcher,
            prompt,
            wallet,
        }
    }

    fn request() -> FundingRequest {
        FundingRequest::new(
            &WalletSession::connected(Address::repeat_byte(0x11), "topic"),
            U256::exp10(16),
            &ContractDescriptor::fund_me().unwrap(),
            &ChainConfig::monad_testnet(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn unresolvable_link_reports_unavailable() {
        let fx = fixture(false, Duration::from_secs(1));
        let contract = ContractDescriptor::fund_me().unwrap();
        let chain = ChainConfig::monad_testnet();

        let connection = fx.bridge.request_connection(&contract, &chain).await;
        assert_eq!(connection.unwrap(), ConnectionOutcome::Unavailable);

        let tx = fx.bridge.request_transaction(&request()).await;
        assert_eq!(tx.unwrap(), TransactionOutcome::Unavailable);
        assert!(fx.launcher.opened().is_empty());
    }

    #[tokio::test]
    async fn connection_completes_pairing_handshake() {
        let Fixture {
            bridge,
            launcher,
            mut wallet,
            ..
        } = fixture(true, Duration::from_secs(5));
        let contract = ContractDescriptor::fund_me().unwrap();
        let chain = ChainConfig::monad_testnet();
        let account = Address::repeat_byte(0x42);

        let wallet_task = tokio::spawn(async move {
            let proposal = wallet.next_proposal().await.unwrap();
            wallet.approve(&proposal, account, 666).unwrap();
            proposal
        });

        let outcome = bridge.request_connection(&contract, &chain).await.unwrap();
        let proposal = wallet_task.await.unwrap();
        match outcome {
            ConnectionOutcome::Connected(session) => {
                assert_eq!(session.connected_address, Some(account));
                assert!(session.session_topic.is_some());
            }
            other => panic!("unexpected outcome: {:?}", other),
        }

        let opened = launcher.opened();
        assert_eq!(opened.len(), 1);
        assert_eq!(opened[0], bridge.links().dapp(&contract.address).unwrap());
        assert_eq!(proposal.required_namespaces["eip155"].chains, vec![chain.caip2()]);
    }

    #[tokio::test]
    async fn approval_with_wrong_pairing_key_is_an_error() {
        let Fixture {
            bridge, mut wallet, ..
        } = fixture(true, Duration::from_secs(5));
        let contract = ContractDescriptor::fund_me().unwrap();
        let chain = ChainConfig::monad_testnet();

        let wallet_task = tokio::spawn(async move {
            let mut proposal = wallet.next_proposal().await.unwrap();
            proposal.key = "00".repeat(32);
            wallet.approve(&proposal, Address::repeat_byte(0x42), 666).unwrap();
            wallet
        });

        let outcome = bridge.request_connection(&contract, &chain).await;
        drop(wallet_task.await.unwrap());
        assert!(matches!(outcome, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn rejected_pairing_is_cancelled() {
        let Fixture {
            bridge, mut wallet, ..
        } = fixture(true, Duration::from_secs(5));
        let contract = ContractDescriptor::fund_me().unwrap();
        let chain = ChainConfig::monad_testnet();

        let wallet_task = tokio::spawn(async move {
            let proposal = wallet.next_proposal().await.unwrap();
            wallet.reject(&proposal, "User rejected").unwrap();
            wallet
        });

        let outcome = bridge.request_connection(&contract, &chain).await.unwrap();
        drop(wallet_task.await.unwrap());
        assert_eq!(outcome, ConnectionOutcome::Cancelled);
    }

    #[tokio::test(start_paused = true)]
    async fn silent_wallet_times_out_as_cancelled() {
        let fx = fixture(true, Duration::from_secs(120));
        let contract = ContractDescriptor::fund_me().unwrap();
        let chain = ChainConfig::monad_testnet();

        let outcome = fx.bridge.request_connection(&contract, &chain).await.unwrap();
        assert_eq!(outcome, ConnectionOutcome::Cancelled);
        drop(fx.wallet);
    }

    struct DismissedRelay;

    #[async_trait::async_trait]
    impl PairingRelay for DismissedRelay {
        async fn publish(&self, _proposal: &SessionProposal) -> Result<()> {
            Ok(())
        }

        async fn await_settlement(&self, _topic: &str) -> Result<Settlement> {
            Err(AppError::UserCancelled)
        }
    }

    #[tokio::test]
    async fn dismissed_pairing_prompt_is_cancelled() {
        let chain = ChainConfig::monad_testnet();
        let bridge = WalletBridge::new(
            DeepLinks::new(Url::parse(WALLET_LINK_BASE).unwrap(), EXPLORER_URL),
            Arc::new(RecordingLauncher::new(true)),
            Arc::new(DismissedRelay),
            Arc::new(ScriptedPrompt::accepting()),
            DappMetadata {
                name: "FundMe DApp".to_string(),
                url: "https://fundme.monad.xyz".to_string(),
            },
            Duration::from_secs(5),
            &chain,
        );
        let outcome = bridge
            .request_connection(&ContractDescriptor::fund_me().unwrap(), &chain)
            .await
            .unwrap();
        assert_eq!(outcome, ConnectionOutcome::Cancelled);
    }

    #[tokio::test]
    async fn transaction_opens_send_link_after_confirmation() {
        let fx = fixture(true, Duration::from_secs(1));
        let outcome = fx.bridge.request_transaction(&request()).await.unwrap();
        assert_eq!(outcome, TransactionOutcome::Submitted);

        let opened = fx.launcher.opened();
        assert_eq!(opened.len(), 1);
        assert!(opened[0].path().starts_with("/send/"));
        assert!(opened[0].as_str().ends_with("uint256=10000000000000000"));
        assert_eq!(fx.prompt.confirmations().len(), 1);
    }

    #[tokio::test]
    async fn declined_confirmation_is_cancelled_without_opening() {
        let fx = fixture(true, Duration::from_secs(1));
        fx.prompt.decline_next();
        let outcome = fx.bridge.request_transaction(&request()).await.unwrap();
        assert_eq!(outcome, TransactionOutcome::Cancelled);
        assert!(fx.launcher.opened().is_empty());
    }
}
