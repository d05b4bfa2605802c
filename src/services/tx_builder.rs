use ethers::types::{Bytes, U256};
use std::sync::Arc;

use crate::{
    constants::FN_FUND,
    crypto::Hasher,
    error::{AppError, Result},
    models::{ContractDescriptor, TxDescriptor},
};

/// Encodes calls against the contract ABI using the injected hasher for
/// selector derivation.
#[derive(Clone)]
pub struct TransactionBuilder {
    hasher: Arc<dyn Hasher>,
}

impl TransactionBuilder {
    pub fn new(hasher: Arc<dyn Hasher>) -> Self {
        Self { hasher }
    }

    /// Selector plus ABI-encoded arguments for `function_name`.
    pub fn encode_call(
        &self,
        contract: &ContractDescriptor,
        function_name: &str,
        args: &[ethers::abi::Token],
    ) -> Result<Bytes> {
        let function = contract.function(function_name)?;
        if function.inputs.len() != args.len() {
            return Err(AppError::Validation(format!(
                "`{}` expects {} argument(s), got {}",
                function_name,
                function.inputs.len(),
                args.len()
            )));
        }
        let signature = ContractDescriptor::selector_signature(function);
        let mut data = self.hasher.selector(&signature).to_vec();
        data.extend(ethers::abi::encode(args));
        Ok(Bytes::from(data))
    }

    pub fn build_funding_call(
        &self,
        amount_wei: U256,
        contract: &ContractDescriptor,
        chain_id: u64,
    ) -> Result<TxDescriptor> {
        if amount_wei.is_zero() {
            return Err(AppError::Validation(
                "Funding amount must be greater than zero".to_string(),
            ));
        }
        let data = self.encode_call(contract, FN_FUND, &[])?;

        Ok(TxDescriptor {
            to: contract.address,
            value: amount_wei,
            data,
            chain_id,
        })
    }
}
