//! Wallet pairing handshake.
//!
//! FundMe pairs with wallets over its own small protocol. The dapp publishes
//! a [`SessionProposal`] whose request URI
//! (`fundme://pair/request?topic=..&key=..&chain=..&expiry=..`) carries a
//! one-off pairing key. The wallet answers with a [`Settlement`]: an
//! approval listing CAIP-10 accounts, tagged with
//! `keccak256(key | topic | sessionTopic | accounts)`, or a rejection.
//! Approvals are checked against the proposal before a session is created.

use ethers::types::Address;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;
use tokio::sync::{mpsc, Mutex};
use url::Url;

use crate::{
    constants::{CALLBACK_SCHEME, PAIRING_EXPIRY_SECS, PAIRING_HOST, PAIRING_PROTOCOL_VERSION},
    crypto::{Hasher, Keccak256Hasher},
    error::{AppError, Result},
    models::ChainConfig,
};

const EIP155: &str = "eip155";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DappMetadata {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Namespace {
    pub chains: Vec<String>,
    pub methods: Vec<String>,
    pub events: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionProposal {
    pub topic: String,
    pub key: String,
    pub version: u8,
    pub expiry_timestamp: i64,
    pub required_namespaces: BTreeMap<String, Namespace>,
    pub proposer: DappMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionApproval {
    pub topic: String,
    pub session_topic: String,
    pub accounts: Vec<String>,
    pub signature: String,
}

impl SessionApproval {
    /// Approval for `proposal`, tagged with its pairing key.
    pub fn signed(proposal: &SessionProposal, session_topic: String, accounts: Vec<String>) -> Self {
        let signature = approval_tag(&proposal.key, &proposal.topic, &session_topic, &accounts);
        Self {
            topic: proposal.topic.clone(),
            session_topic,
            accounts,
            signature,
        }
    }

    fn is_signed_with(&self, key: &str) -> bool {
        approval_tag(key, &self.topic, &self.session_topic, &self.accounts) == self.signature
    }
}

fn approval_tag(key: &str, topic: &str, session_topic: &str, accounts: &[String]) -> String {
    let message = format!("{}|{}|{}|{}", key, topic, session_topic, accounts.join(","));
    hex::encode(Keccak256Hasher.keccak256(message.as_bytes()))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Settlement {
    Approved(SessionApproval),
    Rejected { topic: String, reason: String },
}

impl Settlement {
    pub fn topic(&self) -> &str {
        match self {
            Settlement::Approved(approval) => &approval.topic,
            Settlement::Rejected { topic, .. } => topic,
        }
    }

    /// Parses the wallet's callback link:
    /// `fundme://pair/approve?topic=..&sessionTopic=..&account=eip155:<chain>:<addr>&sig=..`
    /// or `fundme://pair/reject?topic=..&reason=..`.
    pub fn from_callback(link: &str) -> Result<Self> {
        let url = Url::parse(link.trim())
            .map_err(|e| AppError::Validation(format!("Invalid wallet callback: {}", e)))?;
        if url.scheme() != CALLBACK_SCHEME || url.host_str() != Some(PAIRING_HOST) {
            return Err(AppError::Validation(format!(
                "Unexpected wallet callback: {}",
                url
            )));
        }

        let mut topic = None;
        let mut session_topic = None;
        let mut reason = None;
        let mut signature = None;
        let mut accounts = Vec::new();
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "topic" => topic = Some(value.into_owned()),
                "sessionTopic" => session_topic = Some(value.into_owned()),
                "reason" => reason = Some(value.into_owned()),
                "sig" => signature = Some(value.into_owned()),
                "account" => accounts.push(value.into_owned()),
                _ => {}
            }
        }
        let topic = topic
            .ok_or_else(|| AppError::Validation("Wallet callback has no topic".to_string()))?;

        match url.path() {
            "/approve" => Ok(Settlement::Approved(SessionApproval {
                session_topic: session_topic.unwrap_or_else(|| topic.clone()),
                topic,
                accounts,
                signature: signature.ok_or_else(|| {
                    AppError::Validation("Wallet approval is not signed".to_string())
                })?,
            })),
            "/reject" => Ok(Settlement::Rejected {
                topic,
                reason: reason.unwrap_or_else(|| "User rejected".to_string()),
            }),
            other => Err(AppError::Validation(format!(
                "Unknown wallet callback action: {}",
                other
            ))),
        }
    }

    /// Inverse of [`Settlement::from_callback`]; what a wallet sends back.
    pub fn to_callback(&self) -> String {
        let (action, pairs): (&str, Vec<(&str, &str)>) = match self {
            Settlement::Approved(approval) => {
                let mut pairs = vec![
                    ("topic", approval.topic.as_str()),
                    ("sessionTopic", approval.session_topic.as_str()),
                ];
                pairs.extend(approval.accounts.iter().map(|a| ("account", a.as_str())));
                pairs.push(("sig", approval.signature.as_str()));
                ("approve", pairs)
            }
            Settlement::Rejected { topic, reason } => {
                ("reject", vec![("topic", topic.as_str()), ("reason", reason.as_str())])
            }
        };
        let query: String = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(pairs)
            .finish();
        format!("{}://{}/{}?{}", CALLBACK_SCHEME, PAIRING_HOST, action, query)
    }
}

impl SessionProposal {
    pub fn new(chain: &ChainConfig, proposer: DappMetadata) -> Self {
        let topic: [u8; 32] = rand::random();
        let key: [u8; 32] = rand::random();

        let mut required_namespaces = BTreeMap::new();
        required_namespaces.insert(
            EIP155.to_string(),
            Namespace {
                chains: vec![chain.caip2()],
                methods: vec!["eth_sendTransaction".to_string()],
                events: vec!["accountsChanged".to_string(), "chainChanged".to_string()],
            },
        );

        Self {
            topic: hex::encode(topic),
            key: hex::encode(key),
            version: PAIRING_PROTOCOL_VERSION,
            expiry_timestamp: chrono::Utc::now().timestamp() + PAIRING_EXPIRY_SECS,
            required_namespaces,
            proposer,
        }
    }

    /// `fundme://pair/request?v=1&topic=..&key=..&chain=eip155:666&expiry=..&name=..&url=..`
    pub fn pairing_uri(&self) -> String {
        let mut pairs = vec![
            ("v", self.version.to_string()),
            ("topic", self.topic.clone()),
            ("key", self.key.clone()),
        ];
        pairs.extend(self.required_chains().map(|c| ("chain", c.to_string())));
        pairs.push(("expiry", self.expiry_timestamp.to_string()));
        pairs.push(("name", self.proposer.name.clone()));
        pairs.push(("url", self.proposer.url.clone()));

        let query: String = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(pairs)
            .finish();
        format!("{}://{}/request?{}", CALLBACK_SCHEME, PAIRING_HOST, query)
    }

    pub fn is_expired(&self, now: i64) -> bool {
        now >= self.expiry_timestamp
    }

    fn required_chains(&self) -> impl Iterator<Item = &str> {
        self.required_namespaces
            .values()
            .flat_map(|ns| ns.chains.iter().map(String::as_str))
    }

    /// Checks an approval against this proposal and returns the account
    /// approved on the required chain.
    pub fn accept(&self, approval: &SessionApproval) -> Result<Address> {
        if approval.topic != self.topic {
            return Err(AppError::Validation(
                "Wallet answered a different pairing request".to_string(),
            ));
        }
        if !approval.is_signed_with(&self.key) {
            return Err(AppError::Validation(
                "Wallet approval does not match this pairing key".to_string(),
            ));
        }
        if self.is_expired(chrono::Utc::now().timestamp()) {
            return Err(AppError::Validation(
                "Pairing request expired, please connect again".to_string(),
            ));
        }

        for chain in self.required_chains() {
            for account in &approval.accounts {
                if let Some((account_chain, address)) = split_caip10(account) {
                    if account_chain == chain {
                        return Address::from_str(address).map_err(|e| {
                            AppError::Validation(format!("Wallet returned a bad address: {}", e))
                        });
                    }
                }
            }
        }

        Err(AppError::Validation(format!(
            "Wallet did not approve an account on {}",
            self.required_chains().collect::<Vec<_>>().join(", ")
        )))
    }
}

/// `eip155:666:0xabc` -> (`eip155:666`, `0xabc`)
fn split_caip10(account: &str) -> Option<(&str, &str)> {
    let (chain, address) = account.rsplit_once(':')?;
    chain.starts_with("eip155:").then_some((chain, address))
}

/// Transport carrying proposals to the wallet and settlements back.
#[async_trait::async_trait]
pub trait PairingRelay: Send + Sync {
    async fn publish(&self, proposal: &SessionProposal) -> Result<()>;

    async fn await_settlement(&self, topic: &str) -> Result<Settlement>;
}

/// In-process relay; the wallet side is driven through [`WalletEndpoint`].
pub struct ChannelRelay {
    proposals: mpsc::UnboundedSender<SessionProposal>,
    settlements: Mutex<mpsc::UnboundedReceiver<Settlement>>,
}

pub struct WalletEndpoint {
    proposals: mpsc::UnboundedReceiver<SessionProposal>,
    settlements: mpsc::UnboundedSender<Settlement>,
}

impl ChannelRelay {
    pub fn new() -> (Self, WalletEndpoint) {
        let (proposal_tx, proposal_rx) = mpsc::unbounded_channel();
        let (settlement_tx, settlement_rx) = mpsc::unbounded_channel();
        (
            Self {
                proposals: proposal_tx,
                settlements: Mutex::new(settlement_rx),
            },
            WalletEndpoint {
                proposals: proposal_rx,
                settlements: settlement_tx,
            },
        )
    }
}

#[async_trait::async_trait]
impl PairingRelay for ChannelRelay {
    async fn publish(&self, proposal: &SessionProposal) -> Result<()> {
        self.proposals
            .send(proposal.clone())
            .map_err(|_| AppError::Network("Pairing relay closed".to_string()))
    }

    async fn await_settlement(&self, topic: &str) -> Result<Settlement> {
        let mut settlements = self.settlements.lock().await;
        loop {
            let settlement = settlements
                .recv()
                .await
                .ok_or_else(|| AppError::Network("Pairing relay closed".to_string()))?;
            if settlement.topic() == topic {
                return Ok(settlement);
            }
            tracing::warn!("Dropping settlement for stale topic {}", settlement.topic());
        }
    }
}

impl WalletEndpoint {
    pub async fn next_proposal(&mut self) -> Option<SessionProposal> {
        self.proposals.recv().await
    }

    pub fn approve(&self, proposal: &SessionProposal, account: Address, chain_id: u64) -> Result<()> {
        let session_topic: [u8; 32] = rand::random();
        self.settle(Settlement::Approved(SessionApproval::signed(
            proposal,
            hex::encode(session_topic),
            vec![format!("{}:{}:{:?}", EIP155, chain_id, account)],
        )))
    }

    pub fn reject(&self, proposal: &SessionProposal, reason: &str) -> Result<()> {
        self.settle(Settlement::Rejected {
            topic: proposal.topic.clone(),
            reason: reason.to_string(),
        })
    }

    fn settle(&self, settlement: Settlement) -> Result<()> {
        self.settlements
            .send(settlement)
            .map_err(|_| AppError::Network("Pairing relay closed".to_string()))
    }
}
