use std::env;
use std::time::Duration;
use url::Url;

use crate::constants::{
    DAPP_NAME, DAPP_URL, PAIRING_TIMEOUT_SECS, REFRESH_DELAY_SECS, WALLET_LINK_BASE,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LauncherMode {
    /// Hand links to the platform opener.
    System,
    /// Print links so they can be opened on another device.
    Print,
}

impl std::str::FromStr for LauncherMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "system" => Ok(LauncherMode::System),
            "print" => Ok(LauncherMode::Print),
            other => anyhow::bail!("Unknown launcher mode: {}", other),
        }
    }
}

/// Runtime behaviour. Chain and contract values are build-time constants.
#[derive(Debug, Clone)]
pub struct Config {
    // Wallet
    pub wallet_link_base: String,
    pub pairing_timeout_secs: u64,
    pub launcher: LauncherMode,

    // Screen
    pub refresh_delay_secs: u64,

    // Pairing metadata
    pub dapp_name: String,
    pub dapp_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            wallet_link_base: WALLET_LINK_BASE.to_string(),
            pairing_timeout_secs: PAIRING_TIMEOUT_SECS,
            launcher: LauncherMode::System,
            refresh_delay_secs: REFRESH_DELAY_SECS,
            dapp_name: DAPP_NAME.to_string(),
            dapp_url: DAPP_URL.to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();

        Ok(Config {
            wallet_link_base: env::var("FUNDME_WALLET_LINK_BASE")
                .unwrap_or_else(|_| WALLET_LINK_BASE.to_string()),
            pairing_timeout_secs: env::var("FUNDME_PAIRING_TIMEOUT_SECS")
                .unwrap_or_else(|_| PAIRING_TIMEOUT_SECS.to_string())
                .parse()?,
            launcher: env::var("FUNDME_LAUNCHER")
                .unwrap_or_else(|_| "system".to_string())
                .parse()?,
            refresh_delay_secs: env::var("FUNDME_REFRESH_DELAY_SECS")
                .unwrap_or_else(|_| REFRESH_DELAY_SECS.to_string())
                .parse()?,
            dapp_name: env::var("FUNDME_DAPP_NAME").unwrap_or_else(|_| DAPP_NAME.to_string()),
            dapp_url: env::var("FUNDME_DAPP_URL").unwrap_or_else(|_| DAPP_URL.to_string()),
        })
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        Url::parse(&self.wallet_link_base)
            .map_err(|e| anyhow::anyhow!("FUNDME_WALLET_LINK_BASE is invalid: {}", e))?;
        Url::parse(&self.dapp_url)
            .map_err(|e| anyhow::anyhow!("FUNDME_DAPP_URL is invalid: {}", e))?;
        if self.refresh_delay_secs == 0 {
            anyhow::bail!("FUNDME_REFRESH_DELAY_SECS must be > 0");
        }
        if self.pairing_timeout_secs == 0 {
            anyhow::bail!("FUNDME_PAIRING_TIMEOUT_SECS must be > 0");
        }

        if self.dapp_name.trim().is_empty() {
            tracing::warn!("FUNDME_DAPP_NAME is empty; wallets will show an unnamed dapp");
        }
        if self.wallet_link_base != WALLET_LINK_BASE {
            tracing::warn!(
                "Using non-default wallet link base {}",
                self.wallet_link_base
            );
        }

        Ok(())
    }

    pub fn wallet_link_base(&self) -> anyhow::Result<Url> {
        Ok(Url::parse(&self.wallet_link_base)?)
    }

    pub fn refresh_delay(&self) -> Duration {
        Duration::from_secs(self.refresh_delay_secs)
    }

    pub fn pairing_timeout(&self) -> Duration {
        Duration::from_secs(self.pairing_timeout_secs)
    }
}
