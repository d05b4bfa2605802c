use crate::models::FundingPhase;

/// Everything the screen shows, derived from screen state on each render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenView {
    pub title: String,
    pub subtitle: String,
    pub account: Option<String>,
    pub total_funds: String,
    pub loading: bool,
    pub phase: FundingPhase,
    pub amount: String,
    pub contract_address: String,
}

impl ScreenView {
    pub fn connect_label(&self) -> &'static str {
        if self.loading {
            "Connecting..."
        } else {
            "Connect Wallet"
        }
    }

    pub fn fund_label(&self) -> &'static str {
        if self.loading {
            "Processing..."
        } else {
            "Fund Contract"
        }
    }

    pub fn to_text(&self) -> String {
        let rule = "==============================";
        let mut lines = vec![
            rule.to_string(),
            format!("  {}", self.title),
            format!("  {}", self.subtitle),
            rule.to_string(),
            format!("Total Funds in Contract: {}", self.total_funds),
        ];

        match &self.account {
            None => lines.push(format!("[connect] {}", self.connect_label())),
            Some(account) => {
                lines.push(format!("Connected Account: {}", account));
                let pending = if self.amount.is_empty() {
                    String::new()
                } else {
                    format!(" ({})", self.amount)
                };
                lines.push(format!("[fund <amount>] {}{}", self.fund_label(), pending));
            }
        }

        lines.push(format!("Contract Address: {}", self.contract_address));
        lines.push("[explorer] View on Explorer ->".to_string());
        lines.push("[refresh] [stats] [help] [quit]".to_string());
        lines.join("\n")
    }
}
