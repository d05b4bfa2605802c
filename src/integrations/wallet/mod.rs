pub mod bridge;
pub mod deep_link;
pub mod launcher;
pub mod pairing;

pub use bridge::{ConnectionOutcome, TransactionOutcome, WalletBridge};
pub use deep_link::DeepLinks;
pub use launcher::{Launcher, PrintLauncher, SystemLauncher};
pub use pairing::{ChannelRelay, DappMetadata, PairingRelay};
