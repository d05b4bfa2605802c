// Chain-facing services
pub mod chain_reader;
pub mod tx_builder;

// Re-export for convenience
pub use chain_reader::{CallTransport, ChainReader};
pub use tx_builder::TransactionBuilder;
