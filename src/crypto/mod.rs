//! Process-wide runtime capabilities.
//!
//! `init` runs once before any network or hashing call. The returned
//! capabilities are passed explicitly to the components that need them;
//! nothing is read back from globals afterwards. There is no teardown.

pub mod hash;

use std::sync::{Arc, OnceLock};

pub use hash::{Hasher, Keccak256Hasher};

#[derive(Clone)]
pub struct Capabilities {
    pub hasher: Arc<dyn Hasher>,
}

impl std::fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Capabilities").finish_non_exhaustive()
    }
}

static CAPABILITIES: OnceLock<Capabilities> = OnceLock::new();

/// Idempotent; later calls return the instance built by the first one.
pub fn init() -> Capabilities {
    CAPABILITIES
        .get_or_init(|| {
            tracing::debug!("Initializing runtime capabilities");
            Capabilities {
                hasher: Arc::new(Keccak256Hasher),
            }
        })
        .clone()
}
