//! Error presentation: user-facing failure messages and the auto-dismissing toast

use std::time::{Duration, Instant};

use tracing::debug;

use crate::shared::errors::ServiceError;

pub const DEFAULT_TOAST_TIMEOUT: Duration = Duration::from_millis(4000);

/// Background operation whose failure is surfaced to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormAction {
    ConnectWallet,
    FetchMetadata,
    FetchBalanceOrPrice,
    FetchPrice,
    FetchTradeRoute,
}

impl FormAction {
    fn object(&self) -> &'static str {
        match self {
            FormAction::ConnectWallet => "connect to Sui Wallet",
            FormAction::FetchMetadata => "fetch token metadata",
            FormAction::FetchBalanceOrPrice => "fetch balance or price",
            FormAction::FetchPrice => "fetch price",
            FormAction::FetchTradeRoute => "fetch trade route",
        }
    }

    fn gerund(&self) -> &'static str {
        match self {
            FormAction::ConnectWallet => "connecting to Sui Wallet",
            FormAction::FetchMetadata => "fetching token metadata",
            FormAction::FetchBalanceOrPrice => "fetching balance or price",
            FormAction::FetchPrice => "fetching price",
            FormAction::FetchTradeRoute => "fetching trade route",
        }
    }

    /// Message shown when this action fails with `err`.
    pub fn failure_message(&self, err: &ServiceError) -> String {
        match (self, err.status()) {
            (_, Some(status)) => format!("Error {}: Failed to {}", status, self.object()),
            (FormAction::ConnectWallet, None) => "Failed to connect to Sui Wallet".to_string(),
            (_, None) => format!("An unexpected error occurred while {}", self.gerund()),
        }
    }
}

/// Single-slot error toast. A new error replaces the current one and restarts
/// the dismissal timer.
#[derive(Debug, Clone)]
pub struct ErrorToast {
    message: Option<String>,
    raised_at: Option<Instant>,
    timeout: Duration,
}

impl ErrorToast {
    pub fn new(timeout: Duration) -> Self {
        Self {
            message: None,
            raised_at: None,
            timeout,
        }
    }

    pub fn raise(&mut self, message: impl Into<String>, now: Instant) {
        self.message = Some(message.into());
        self.raised_at = Some(now);
    }

    pub fn dismiss(&mut self) {
        self.message = None;
        self.raised_at = None;
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn is_visible(&self) -> bool {
        self.message.is_some()
    }

    /// Time left before the toast hides itself.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.raised_at
            .map(|raised| self.timeout.saturating_sub(now.saturating_duration_since(raised)))
    }

    /// Dismiss the toast once its timeout elapsed. Returns true if it was hidden.
    pub fn expire(&mut self, now: Instant) -> bool {
        match self.remaining(now) {
            Some(left) if left.is_zero() => {
                debug!("error toast expired: {:?}", self.message);
                self.dismiss();
                true
            }
            _ => false,
        }
    }
}

impl Default for ErrorToast {
    fn default() -> Self {
        Self::new(DEFAULT_TOAST_TIMEOUT)
    }
}
