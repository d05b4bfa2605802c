use ethers::abi::Token;
use ethers::providers::{Http, JsonRpcClient, Middleware, Provider};
use ethers::types::{
    transaction::eip2718::TypedTransaction, Address, Bytes, TransactionRequest, U256,
};
use std::sync::Arc;

use crate::{
    constants::{FN_CONTRACT_BALANCE, FN_FUNDERS, FN_FUNDER_COUNT, FN_TOTAL_FUNDS},
    crypto::Hasher,
    error::{AppError, Result},
    models::{ChainConfig, ContractDescriptor, ContractSnapshot},
    services::tx_builder::TransactionBuilder,
    utils::format_amount,
};

/// Read-only `eth_call` seam.
#[async_trait::async_trait]
pub trait CallTransport: Send + Sync {
    async fn eth_call(&self, to: Address, data: Bytes) -> Result<Bytes>;
}

#[async_trait::async_trait]
impl<P> CallTransport for Provider<P>
where
    P: JsonRpcClient + 'static,
{
    async fn eth_call(&self, to: Address, data: Bytes) -> Result<Bytes> {
        let tx: TypedTransaction = TransactionRequest::new().to(to).data(data).into();
        Middleware::call(self, &tx, None)
            .await
            .map_err(|e| AppError::Network(e.to_string()))
    }
}

/// Queries the contract's view functions. Calls are one-shot: no retry,
/// no caching.
pub struct ChainReader {
    transport: Arc<dyn CallTransport>,
    chain: ChainConfig,
    contract: ContractDescriptor,
    encoder: TransactionBuilder,
}

impl ChainReader {
    pub fn new(
        transport: Arc<dyn CallTransport>,
        chain: ChainConfig,
        contract: ContractDescriptor,
        hasher: Arc<dyn Hasher>,
    ) -> Self {
        Self {
            transport,
            chain,
            contract,
            encoder: TransactionBuilder::new(hasher),
        }
    }

    /// Reader over HTTP JSON-RPC at `chain.rpc_url`.
    pub fn connect(
        chain: ChainConfig,
        contract: ContractDescriptor,
        hasher: Arc<dyn Hasher>,
    ) -> Result<Self> {
        let provider = Provider::<Http>::try_from(chain.rpc_url.as_str())
            .map_err(|e| AppError::Config(format!("Invalid RPC URL: {}", e)))?;
        Ok(Self::new(Arc::new(provider), chain, contract, hasher))
    }

    async fn read_uint(&self, function_name: &str, args: &[Token]) -> Result<U256> {
        let data = self.encoder.encode_call(&self.contract, function_name, args)?;
        let raw = self.transport.eth_call(self.contract.address, data).await?;

        let function = self.contract.function(function_name)?;
        let tokens = function.decode_output(&raw).map_err(|e| {
            AppError::Network(format!("Malformed `{}` response: {}", function_name, e))
        })?;
        tokens
            .into_iter()
            .next()
            .and_then(Token::into_uint)
            .ok_or_else(|| {
                AppError::Network(format!("`{}` did not return a uint256", function_name))
            })
    }

    fn format(&self, value: U256) -> Result<String> {
        format_amount(value, self.chain.native_decimals)
    }

    /// Total contributed funds, as a decimal string in the native currency.
    pub async fn read_total_funds(&self) -> Result<String> {
        let raw = self.read_uint(FN_TOTAL_FUNDS, &[]).await?;
        tracing::debug!("totalFunds() returned {} base units", raw);
        self.format(raw)
    }

    pub async fn read_contribution(&self, funder: Address) -> Result<String> {
        let raw = self
            .read_uint(FN_FUNDERS, &[Token::Address(funder)])
            .await?;
        self.format(raw)
    }

    pub async fn read_contract_balance(&self) -> Result<String> {
        let raw = self.read_uint(FN_CONTRACT_BALANCE, &[]).await?;
        self.format(raw)
    }

    pub async fn read_funder_count(&self) -> Result<u64> {
        let raw = self.read_uint(FN_FUNDER_COUNT, &[]).await?;
        if raw > U256::from(u64::MAX) {
            return Err(AppError::Network(format!(
                "Funder count out of range: {}",
                raw
            )));
        }
        Ok(raw.as_u64())
    }

    pub async fn read_snapshot(&self) -> Result<ContractSnapshot> {
        let (total_funds, contract_balance, funder_count) = tokio::try_join!(
            self.read_total_funds(),
            self.read_contract_balance(),
            self.read_funder_count(),
        )?;
        Ok(ContractSnapshot {
            total_funds,
            contract_balance,
            funder_count,
        })
    }
}
