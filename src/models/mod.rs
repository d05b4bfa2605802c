// src/models/mod.rs
pub mod chain;
pub mod funding;

pub use chain::{ChainConfig, ContractDescriptor};
pub use funding::{
    ContractSnapshot, DisplayState, FundingPhase, FundingRequest, TxDescriptor, WalletSession,
};
