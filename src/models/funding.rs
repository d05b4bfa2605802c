use ethers::types::{Address, Bytes, U256};

use super::chain::{ChainConfig, ContractDescriptor};
use crate::error::{AppError, Result};

/// Wallet connection, held only in memory for the life of the process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalletSession {
    pub connected_address: Option<Address>,
    pub session_topic: Option<String>,
}

impl WalletSession {
    pub fn connected(address: Address, session_topic: impl Into<String>) -> Self {
        Self {
            connected_address: Some(address),
            session_topic: Some(session_topic.into()),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected_address.is_some()
    }
}

/// A single payment attempt. Only built for a connected session and a
/// non-zero amount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FundingRequest {
    amount_wei: U256,
    recipient: Address,
    chain_id: u64,
}

impl FundingRequest {
    pub fn new(
        session: &WalletSession,
        amount_wei: U256,
        contract: &ContractDescriptor,
        chain: &ChainConfig,
    ) -> Result<Self> {
        if !session.is_connected() {
            return Err(AppError::Validation(
                "Please connect wallet first".to_string(),
            ));
        }
        if amount_wei.is_zero() {
            return Err(AppError::Validation(
                "Please enter a valid amount".to_string(),
            ));
        }
        Ok(Self {
            amount_wei,
            recipient: contract.address,
            chain_id: chain.chain_id,
        })
    }

    pub fn amount_wei(&self) -> U256 {
        self.amount_wei
    }

    pub fn recipient(&self) -> Address {
        self.recipient
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }
}

/// Value-bearing call handed to the wallet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxDescriptor {
    pub to: Address,
    pub value: U256,
    pub data: Bytes,
    pub chain_id: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayState {
    pub total_funds: String,
    pub loading: bool,
}

impl Default for DisplayState {
    fn default() -> Self {
        Self {
            total_funds: "0".to_string(),
            loading: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FundingPhase {
    #[default]
    Idle,
    Building,
    HandedOff,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractSnapshot {
    pub total_funds: String,
    pub contract_balance: String,
    pub funder_count: u64,
}
