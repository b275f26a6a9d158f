//! Plain-text snapshot of the form for presentation

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletStatus {
    NotInstalled,
    Disconnected { connecting: bool },
    Connected { address: String },
}

/// Everything a front-end needs to draw the form, already formatted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormView {
    pub wallet: WalletStatus,
    pub slippage: String,
    pub pay_symbol: String,
    pub pay_balance: String,
    pub amount: String,
    pub pay_fiat: String,
    pub receive_symbol: String,
    pub receive_balance: String,
    pub receive_amount: String,
    /// The receive amount belongs to an earlier amount; a new quote is on its way.
    pub quoting: bool,
    pub receive_fiat: String,
    pub rate: String,
    pub route: String,
    pub trade_enabled: bool,
    pub trade_label: String,
    pub error: Option<String>,
}

impl fmt::Display for FormView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(error) = &self.error {
            writeln!(f, "[error] {}", error)?;
        }

        let address = match &self.wallet {
            WalletStatus::NotInstalled => {
                return writeln!(
                    f,
                    "Sui Wallet is not installed. Set a wallet address with --address or [wallet].address."
                );
            }
            WalletStatus::Disconnected { connecting: true } => return writeln!(f, "Connecting..."),
            WalletStatus::Disconnected { connecting: false } => {
                return writeln!(f, "Connect Sui Wallet")
            }
            WalletStatus::Connected { address } => address,
        };

        writeln!(f, "Swap                  Slippage Tolerance (%): {}", self.slippage)?;
        writeln!(f, "Wallet: {}", address)?;
        writeln!(f, "Pay:     {} (Balance: {})", self.pay_symbol, self.pay_balance)?;
        let amount = if self.amount.is_empty() { "0.0" } else { &self.amount };
        writeln!(f, "         {:<24} {}", amount, self.pay_fiat)?;
        writeln!(f, "Receive: {} (Balance: {})", self.receive_symbol, self.receive_balance)?;
        let receive = if self.quoting {
            format!("{} (quoting...)", self.receive_amount)
        } else {
            self.receive_amount.clone()
        };
        writeln!(f, "         {:<24} {}", receive, self.receive_fiat)?;
        writeln!(f, "{}", self.rate)?;
        writeln!(f, "Route: {}", self.route)?;
        if self.trade_enabled {
            writeln!(f, "[ {} ]", self.trade_label)
        } else {
            writeln!(f, "[ {} ] (disabled)", self.trade_label)
        }
    }
}
