use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use url::Url;

use crate::error::{AppError, Result};

/// Platform capability for handing URLs to other applications.
#[async_trait::async_trait]
pub trait Launcher: Send + Sync {
    /// Whether the platform has something that can resolve `url`.
    async fn can_open(&self, url: &Url) -> bool;

    async fn open(&self, url: &Url) -> Result<()>;
}

const OPENERS: [&str; 3] = ["xdg-open", "open", "explorer.exe"];

/// Opens links with the first desktop opener found on `PATH`.
#[derive(Debug, Default, Clone)]
pub struct SystemLauncher;

impl SystemLauncher {
    fn find_opener() -> Option<&'static str> {
        let path = std::env::var_os("PATH")?;
        let dirs: Vec<_> = std::env::split_paths(&path).collect();
        OPENERS
            .into_iter()
            .find(|cmd| dirs.iter().any(|dir| is_executable(&dir.join(cmd))))
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    std::fs::metadata(path)
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

#[async_trait::async_trait]
impl Launcher for SystemLauncher {
    async fn can_open(&self, url: &Url) -> bool {
        let opener = Self::find_opener();
        tracing::debug!("Opener for {} scheme: {:?}", url.scheme(), opener);
        opener.is_some()
    }

    async fn open(&self, url: &Url) -> Result<()> {
        let opener = Self::find_opener()
            .ok_or_else(|| AppError::WalletUnavailable("no URL opener available".to_string()))?;
        run_opener(opener, url).await?;
        tracing::info!("Opened {} via {}", url, opener);
        Ok(())
    }
}

/// Runs `opener url` to completion. Desktop openers return as soon as the
/// link is dispatched, so waiting here also reaps the child.
async fn run_opener(opener: &str, url: &Url) -> Result<()> {
    let status = Command::new(opener)
        .arg(url.as_str())
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .map_err(|e| AppError::WalletUnavailable(format!("{} failed: {}", opener, e)))?;
    if !status.success() {
        return Err(AppError::WalletUnavailable(format!(
            "{} exited with {}",
            opener, status
        )));
    }
    Ok(())
}

/// Prints links instead of opening them, e.g. to scan or paste on a phone.
#[derive(Debug, Default, Clone)]
pub struct PrintLauncher;

#[async_trait::async_trait]
impl Launcher for PrintLauncher {
    async fn can_open(&self, _url: &Url) -> bool {
        true
    }

    async fn open(&self, url: &Url) -> Result<()> {
        println!("\nOpen this link on your device:\n  {}\n", url);
        Ok(())
    }
}
