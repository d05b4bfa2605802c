use ethers::types::{Address, U256};
use url::Url;

use crate::error::{AppError, Result};
use crate::utils::checksum;

/// Builds the wallet app and explorer URLs. Parameter layout follows the
/// wallet's published deep-link format.
#[derive(Debug, Clone)]
pub struct DeepLinks {
    wallet_base: Url,
    explorer_base: String,
}

impl DeepLinks {
    pub fn new(wallet_base: Url, explorer_base: impl Into<String>) -> Self {
        Self {
            wallet_base,
            explorer_base: explorer_base.into(),
        }
    }

    fn wallet_url(&self, path_and_query: &str) -> Result<Url> {
        let base = self.wallet_base.as_str().trim_end_matches('/');
        Url::parse(&format!("{}/{}", base, path_and_query))
            .map_err(|e| AppError::Internal(format!("Invalid wallet link: {}", e)))
    }

    /// `{base}/dapp/{contract}`
    pub fn dapp(&self, contract: &Address) -> Result<Url> {
        self.wallet_url(&format!("dapp/{}", checksum(contract)))
    }

    /// `{base}/send/{contract}@{chainId}/transfer?address={contract}&uint256={amountWei}`
    pub fn send(&self, recipient: &Address, chain_id: u64, amount_wei: U256) -> Result<Url> {
        let recipient = checksum(recipient);
        self.wallet_url(&format!(
            "send/{recipient}@{chain_id}/transfer?address={recipient}&uint256={amount_wei}"
        ))
    }

    /// `{explorer}/address/{contract}`
    pub fn explorer(&self, contract: &Address) -> Result<Url> {
        let base = self.explorer_base.trim_end_matches('/');
        Url::parse(&format!("{}/address/{}", base, checksum(contract)))
            .map_err(|e| AppError::Internal(format!("Invalid explorer link: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{CONTRACT_ADDRESS, EXPLORER_URL, WALLET_LINK_BASE};

    fn links() -> DeepLinks {
        DeepLinks::new(Url::parse(WALLET_LINK_BASE).unwrap(), EXPLORER_URL)
    }

    fn contract() -> Address {
        CONTRACT_ADDRESS.parse().unwrap()
    }

    #[test]
    fn dapp_link_is_scoped_to_contract() {
        assert_eq!(
            links().dapp(&contract()).unwrap().as_str(),
            format!("https://metamask.app.link/dapp/{}", CONTRACT_ADDRESS)
        );
    }

    #[test]
    fn send_link_encodes_recipient_chain_and_amount() {
        let url = links()
            .send(&contract(), 666, U256::from(10_000_000_000_000_000u64))
            .unwrap();
        assert_eq!(
            url.as_str(),
            format!(
                "https://metamask.app.link/send/{0}@666/transfer?address={0}&uint256=10000000000000000",
                CONTRACT_ADDRESS
            )
        );
    }

    #[test]
    fn explorer_link_tolerates_trailing_slash() {
        let links = DeepLinks::new(
            Url::parse(WALLET_LINK_BASE).unwrap(),
            format!("{}/", EXPLORER_URL),
        );
        assert_eq!(
            links.explorer(&contract()).unwrap().as_str(),
            format!("{}/address/{}", EXPLORER_URL, CONTRACT_ADDRESS)
        );
    }
}
