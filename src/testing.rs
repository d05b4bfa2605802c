//! In-process fakes shared by unit tests.

use ethers::abi::Token;
use ethers::types::{Address, Bytes, U256};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use url::Url;

use crate::{
    constants::FN_TOTAL_FUNDS,
    crypto::{Hasher, Keccak256Hasher},
    error::{AppError, Notice, Result},
    integrations::wallet::Launcher,
    models::ContractDescriptor,
    services::CallTransport,
    ui::{Renderer, ScreenView, UserPrompt},
};

/// Answers view calls from a table keyed by function name.
pub struct StubTransport {
    selectors: HashMap<[u8; 4], String>,
    values: Mutex<HashMap<String, U256>>,
    calls: Mutex<Vec<(Address, Bytes)>>,
    failing: AtomicBool,
}

impl StubTransport {
    pub fn with_total_funds(total: U256) -> Self {
        let contract = ContractDescriptor::fund_me().expect("builtin ABI");
        let selectors = contract
            .abi
            .functions()
            .map(|f| {
                let signature = ContractDescriptor::selector_signature(f);
                (Keccak256Hasher.selector(&signature), f.name.clone())
            })
            .collect();
        let transport = Self {
            selectors,
            values: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            failing: AtomicBool::new(false),
        };
        transport.set(FN_TOTAL_FUNDS, total);
        transport
    }

    pub fn set(&self, function_name: &str, value: U256) {
        self.values
            .lock()
            .unwrap()
            .insert(function_name.to_string(), value);
    }

    pub fn fail(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<(Address, Bytes)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl CallTransport for StubTransport {
    async fn eth_call(&self, to: Address, data: Bytes) -> Result<Bytes> {
        self.calls.lock().unwrap().push((to, data.clone()));
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::Network("connection refused".to_string()));
        }

        let selector: [u8; 4] = data
            .get(..4)
            .and_then(|s| s.try_into().ok())
            .ok_or_else(|| AppError::Network("short calldata".to_string()))?;
        let name = self
            .selectors
            .get(&selector)
            .ok_or_else(|| AppError::Network("execution reverted".to_string()))?;
        let value = self
            .values
            .lock()
            .unwrap()
            .get(name)
            .copied()
            .unwrap_or_default();
        Ok(Bytes::from(ethers::abi::encode(&[Token::Uint(value)])))
    }
}

/// Records every probe and open; `resolvable` decides `can_open`.
pub struct RecordingLauncher {
    resolvable: bool,
    probed: Mutex<Vec<Url>>,
    opened: Mutex<Vec<Url>>,
}

impl RecordingLauncher {
    pub fn new(resolvable: bool) -> Self {
        Self {
            resolvable,
            probed: Mutex::new(Vec::new()),
            opened: Mutex::new(Vec::new()),
        }
    }

    pub fn probed(&self) -> Vec<Url> {
        self.probed.lock().unwrap().clone()
    }

    pub fn opened(&self) -> Vec<Url> {
        self.opened.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Launcher for RecordingLauncher {
    async fn can_open(&self, url: &Url) -> bool {
        self.probed.lock().unwrap().push(url.clone());
        self.resolvable
    }

    async fn open(&self, url: &Url) -> Result<()> {
        if !self.resolvable {
            return Err(AppError::WalletUnavailable("nothing handles this link".to_string()));
        }
        self.opened.lock().unwrap().push(url.clone());
        Ok(())
    }
}

/// Accepts confirmations unless told to decline the next one.
#[derive(Default)]
pub struct ScriptedPrompt {
    notices: Mutex<Vec<Notice>>,
    confirmations: Mutex<Vec<Notice>>,
    decline_next: AtomicBool,
}

impl ScriptedPrompt {
    pub fn accepting() -> Self {
        Self::default()
    }

    pub fn decline_next(&self) {
        self.decline_next.store(true, Ordering::SeqCst);
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().unwrap().clone()
    }

    pub fn confirmations(&self) -> Vec<Notice> {
        self.confirmations.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl UserPrompt for ScriptedPrompt {
    async fn notify(&self, notice: &Notice) {
        self.notices.lock().unwrap().push(notice.clone());
    }

    async fn confirm(&self, notice: &Notice) -> bool {
        self.confirmations.lock().unwrap().push(notice.clone());
        !self.decline_next.swap(false, Ordering::SeqCst)
    }
}

#[derive(Default)]
pub struct RecordingRenderer {
    views: Mutex<Vec<ScreenView>>,
}

impl RecordingRenderer {
    pub fn views(&self) -> Vec<ScreenView> {
        self.views.lock().unwrap().clone()
    }

    pub fn last(&self) -> Option<ScreenView> {
        self.views.lock().unwrap().last().cloned()
    }
}

impl Renderer for RecordingRenderer {
    fn render(&self, view: &ScreenView) {
        self.views.lock().unwrap().push(view.clone());
    }
}
