use ethers::abi::{parse_abi, Abi, Function};
use ethers::types::Address;
use std::str::FromStr;

use crate::constants::{
    CHAIN_ID, CHAIN_NAME, CONTRACT_ABI, CONTRACT_ADDRESS, EXPLORER_URL, NATIVE_DECIMALS,
    NATIVE_SYMBOL, RPC_URL,
};
use crate::error::{AppError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainConfig {
    pub chain_id: u64,
    pub chain_name: String,
    pub rpc_url: String,
    pub explorer_url: String,
    pub native_symbol: String,
    pub native_decimals: u32,
}

impl ChainConfig {
    /// The network the deployed contract lives on.
    pub fn monad_testnet() -> Self {
        Self {
            chain_id: CHAIN_ID,
            chain_name: CHAIN_NAME.to_string(),
            rpc_url: RPC_URL.to_string(),
            explorer_url: EXPLORER_URL.to_string(),
            native_symbol: NATIVE_SYMBOL.to_string(),
            native_decimals: NATIVE_DECIMALS,
        }
    }

    /// CAIP-2 identifier, e.g. `eip155:666`.
    pub fn caip2(&self) -> String {
        format!("eip155:{}", self.chain_id)
    }
}

#[derive(Debug, Clone)]
pub struct ContractDescriptor {
    pub address: Address,
    pub abi: Abi,
}

impl ContractDescriptor {
    pub fn new(address: &str, signatures: &[&str]) -> Result<Self> {
        let address = Address::from_str(address.trim())
            .map_err(|e| AppError::Config(format!("Invalid contract address: {}", e)))?;
        let abi = parse_abi(signatures)
            .map_err(|e| AppError::Config(format!("Invalid contract ABI: {}", e)))?;
        Ok(Self { address, abi })
    }

    pub fn fund_me() -> Result<Self> {
        Self::new(CONTRACT_ADDRESS, CONTRACT_ABI)
    }

    /// Canonical `name(type,...)` form used for selector derivation.
    pub fn selector_signature(function: &Function) -> String {
        let inputs: Vec<String> = function.inputs.iter().map(|p| p.kind.to_string()).collect();
        format!("{}({})", function.name, inputs.join(","))
    }

    pub fn function(&self, name: &str) -> Result<&Function> {
        self.abi
            .function(name)
            .map_err(|_| AppError::Validation(format!("Contract ABI has no `{}` function", name)))
    }
}
