use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Wallet unavailable: {0}")]
    WalletUnavailable(String),

    #[error("Cancelled by user")]
    UserCancelled,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Blocking, user-facing message shown by the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub title: String,
    pub message: String,
}

impl Notice {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
        }
    }
}

impl AppError {
    /// Stable machine-readable code, used in logs.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Network(_) => "NETWORK_ERROR",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::WalletUnavailable(_) => "WALLET_UNAVAILABLE",
            AppError::UserCancelled => "USER_CANCELLED",
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn notice(&self) -> Notice {
        match self {
            AppError::Network(msg) => Notice::new("Network Error", msg.clone()),
            AppError::Validation(msg) => Notice::new("Error", msg.clone()),
            AppError::WalletUnavailable(_) => {
                Notice::new("Error", "Please install MetaMask mobile app")
            }
            AppError::UserCancelled => Notice::new("Cancelled", "Request was cancelled"),
            AppError::Config(msg) | AppError::Internal(msg) => {
                Notice::new("Error", msg.clone())
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
