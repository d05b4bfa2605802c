pub mod screen;
pub mod terminal;
pub mod view;

pub use screen::{Flow, FundMeScreen, ScreenDeps, ScreenEvent};
pub use terminal::{ConsoleRelay, TerminalConsole};
pub use view::ScreenView;

use crate::error::Notice;

/// Blocking notices and yes/no confirmations.
#[async_trait::async_trait]
pub trait UserPrompt: Send + Sync {
    async fn notify(&self, notice: &Notice);

    async fn confirm(&self, notice: &Notice) -> bool;
}

pub trait Renderer: Send + Sync {
    fn render(&self, view: &ScreenView);
}
