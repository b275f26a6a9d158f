//! Swap form controller
//!
//! Holds the form state and keeps the typed amount, the quoted output, the best
//! route and the wallet balances consistent with each other. Network work is not
//! done here: the controller hands out tickets describing what has to be fetched
//! and accepts the results back, discarding answers to questions that are no
//! longer being asked.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use super::amount::{validate_amount_edit, AmountEdit};
use super::rate::{exchange_rate, rate_label, reversed_exchange_rate, RateDirection};
use super::slippage::{minimum_received, validate_slippage_edit, SlippageEdit, DEFAULT_SLIPPAGE};
use super::view::{FormView, WalletStatus};
use crate::domain::toast::{ErrorToast, FormAction, DEFAULT_TOAST_TIMEOUT};
use crate::shared::errors::ServiceError;
use crate::shared::types::{
    CoinMetadata, PriceQuote, Token, TokenPair, TradeQuote, WalletAccount, DEFAULT_COIN_DECIMALS,
};
use crate::shared::utils::{
    format_balance, format_number, format_number_text, format_usd, normalize_sui_address,
    parse_amount, short_address,
};

#[derive(Debug, Clone)]
pub struct FormSettings {
    pub default_slippage: Decimal,
    pub toast_timeout: Duration,
}

impl Default for FormSettings {
    fn default() -> Self {
        Self {
            default_slippage: DEFAULT_SLIPPAGE,
            toast_timeout: DEFAULT_TOAST_TIMEOUT,
        }
    }
}

/// A route quote the form is waiting for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTicket {
    pub id: u64,
    pub pair: TokenPair,
    pub amount: Decimal,
}

/// A balance refresh for the connected account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountTicket {
    pub address: String,
    pub pair: TokenPair,
}

/// What a trade would look like with the current form values
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapPreview {
    pub pair: TokenPair,
    pub amount_in: Decimal,
    pub expected_out: Option<Decimal>,
    pub minimum_received: Option<Decimal>,
    pub slippage: Decimal,
    pub route: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SwapForm {
    pair: TokenPair,
    wallet_installed: bool,
    wallet_address: Option<String>,
    loading: bool,
    balances: HashMap<String, Decimal>,
    prices: HashMap<String, Decimal>,
    amount: String,
    to_amount: Option<Decimal>,
    // pay amount that `to_amount` was quoted for
    quoted_amount: Option<Decimal>,
    route: String,
    slippage: Decimal,
    default_slippage: Decimal,
    rate_direction: RateDirection,
    from_metadata: Option<CoinMetadata>,
    to_metadata: Option<CoinMetadata>,
    toast: ErrorToast,
    next_ticket: u64,
    last_quoted: Option<(TokenPair, Decimal)>,
    metadata_pair: Option<TokenPair>,
    last_account: Option<AccountTicket>,
}

impl SwapForm {
    pub fn new(pair: TokenPair, settings: FormSettings) -> Self {
        Self {
            pair,
            wallet_installed: false,
            wallet_address: None,
            loading: false,
            balances: HashMap::new(),
            prices: HashMap::new(),
            amount: String::new(),
            to_amount: None,
            quoted_amount: None,
            route: String::new(),
            slippage: settings.default_slippage,
            default_slippage: settings.default_slippage,
            rate_direction: RateDirection::default(),
            from_metadata: None,
            to_metadata: None,
            toast: ErrorToast::new(settings.toast_timeout),
            next_ticket: 0,
            last_quoted: None,
            metadata_pair: None,
            last_account: None,
        }
    }

    pub fn pair(&self) -> &TokenPair {
        &self.pair
    }

    pub fn amount(&self) -> &str {
        &self.amount
    }

    pub fn to_amount(&self) -> Option<Decimal> {
        self.to_amount
    }

    pub fn route(&self) -> &str {
        &self.route
    }

    pub fn slippage(&self) -> Decimal {
        self.slippage
    }

    pub fn rate_direction(&self) -> RateDirection {
        self.rate_direction
    }

    pub fn wallet_address(&self) -> Option<&str> {
        self.wallet_address.as_deref()
    }

    pub fn is_wallet_installed(&self) -> bool {
        self.wallet_installed
    }

    pub fn is_connected(&self) -> bool {
        self.wallet_address.is_some()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn from_metadata(&self) -> Option<&CoinMetadata> {
        self.from_metadata.as_ref()
    }

    pub fn to_metadata(&self) -> Option<&CoinMetadata> {
        self.to_metadata.as_ref()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.toast.message()
    }

    pub fn balance_of(&self, token: &Token) -> Option<Decimal> {
        self.balances.get(&token.coin_type).copied()
    }

    pub fn price_of(&self, token: &Token) -> Decimal {
        self.prices
            .get(&token.coin_type)
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    /// Spendable balance of the pay token; unknown counts as zero.
    fn spendable(&self) -> Decimal {
        self.balance_of(&self.pair.from).unwrap_or(Decimal::ZERO)
    }

    fn parsed_amount(&self) -> Option<Decimal> {
        parse_amount(&self.amount).ok().flatten()
    }

    fn clear_quote(&mut self) {
        self.to_amount = None;
        self.quoted_amount = None;
        self.route.clear();
        self.last_quoted = None;
    }

    // ---- user edits -------------------------------------------------------

    pub fn change_amount(&mut self, raw: &str) -> AmountEdit {
        let edit = validate_amount_edit(raw, self.spendable());
        match &edit {
            AmountEdit::Ignored => {}
            AmountEdit::Accepted { text, clears_quote } => {
                self.amount = text.clone();
                if *clears_quote {
                    self.clear_quote();
                }
            }
            AmountEdit::Clamped { text } => {
                debug!("amount {:?} exceeds balance, clamped to {}", raw, text);
                self.amount = text.clone();
            }
        }
        edit
    }

    pub fn change_slippage(&mut self, raw: &str) {
        match validate_slippage_edit(raw) {
            SlippageEdit::Set(value) => self.slippage = value,
            SlippageEdit::Ignored => {}
            SlippageEdit::Reset => self.slippage = self.default_slippage,
        }
    }

    pub fn half(&mut self) {
        let half = self.spendable() / Decimal::TWO;
        self.fill_amount(half);
    }

    pub fn max(&mut self) {
        let all = self.spendable();
        self.fill_amount(all);
    }

    fn fill_amount(&mut self, value: Decimal) {
        self.amount = format_number(value);
        self.route.clear();
        // the route line was emptied, so ask again even for an unchanged amount
        self.last_quoted = None;
    }

    pub fn switch_direction(&mut self) {
        self.pair = self.pair.switched();
        self.amount.clear();
        self.clear_quote();
        std::mem::swap(&mut self.from_metadata, &mut self.to_metadata);
        self.metadata_pair = self.metadata_pair.as_ref().map(TokenPair::switched);
        info!("swap direction is now {} -> {}", self.pair.from.symbol, self.pair.to.symbol);
    }

    pub fn toggle_rate_direction(&mut self) {
        self.rate_direction = self.rate_direction.toggled();
    }

    /// Reformat the amount with thousands separators when the field loses focus.
    pub fn blur_amount(&mut self) {
        if self.amount.is_empty() || self.amount.contains(',') {
            return;
        }
        self.amount = format_number_text(&self.amount);
    }

    /// Forget what was already fetched so the next round asks again.
    pub fn requote(&mut self) {
        self.last_quoted = None;
        self.metadata_pair = None;
        self.last_account = None;
    }

    // ---- derived values ---------------------------------------------------

    pub fn exchange_rate(&self) -> Decimal {
        exchange_rate(self.quoted_amount, self.to_amount)
    }

    pub fn reversed_exchange_rate(&self) -> Decimal {
        reversed_exchange_rate(self.exchange_rate())
    }

    pub fn rate_label(&self) -> String {
        rate_label(self.rate_direction, &self.pair, self.exchange_rate())
    }

    pub fn from_fiat_value(&self) -> Decimal {
        self.parsed_amount().unwrap_or(Decimal::ZERO) * self.price_of(&self.pair.from)
    }

    pub fn to_fiat_value(&self) -> Decimal {
        self.to_amount.unwrap_or(Decimal::ZERO) * self.price_of(&self.pair.to)
    }

    /// True when a quote for the current amount has been requested but not applied.
    pub fn is_quote_pending(&self) -> bool {
        match (&self.last_quoted, self.parsed_amount()) {
            (Some((pair, amount)), Some(current)) => {
                *pair == self.pair && *amount == current && self.quoted_amount != Some(current)
            }
            _ => false,
        }
    }

    pub fn can_trade(&self) -> bool {
        !self.amount.is_empty() && !self.loading
    }

    // ---- effects: route ---------------------------------------------------

    /// Route quote due for the current pair and amount, if any.
    pub fn route_request(&mut self) -> Option<RouteTicket> {
        if self.amount.is_empty() {
            return None;
        }
        let amount = self.parsed_amount()?;
        if amount.is_zero() {
            if self.to_amount.is_some() || !self.route.is_empty() {
                self.clear_quote();
            }
            return None;
        }

        let key = (self.pair.clone(), amount);
        if self.last_quoted.as_ref() == Some(&key) {
            return None;
        }
        self.last_quoted = Some(key);
        self.next_ticket += 1;

        debug!(
            "route quote #{} for {} {} -> {}",
            self.next_ticket, amount, self.pair.from.symbol, self.pair.to.symbol
        );
        Some(RouteTicket {
            id: self.next_ticket,
            pair: self.pair.clone(),
            amount,
        })
    }

    fn is_current(&self, ticket: &RouteTicket) -> bool {
        ticket.pair == self.pair && self.parsed_amount() == Some(ticket.amount)
    }

    /// Apply a route answer. Returns false when the ticket was stale.
    pub fn apply_route_result(
        &mut self,
        ticket: &RouteTicket,
        result: Result<TradeQuote, ServiceError>,
        now: Instant,
    ) -> bool {
        if !self.is_current(ticket) {
            debug!("discarding stale route quote #{}", ticket.id);
            return false;
        }

        let best = result.and_then(|quote| {
            let description = quote
                .best_route()
                .map(|route| route.describe())
                .ok_or(ServiceError::NoRoute)?;
            Ok((quote.output_amount, description))
        });

        match best {
            Ok((output, description)) => {
                info!("quote #{}: {} -> {} via {}", ticket.id, ticket.amount, output, description);
                self.to_amount = Some(output);
                self.quoted_amount = Some(ticket.amount);
                self.route = description;
            }
            Err(err) => {
                warn!("failed to fetch trade route: {}", err);
                self.toast
                    .raise(FormAction::FetchTradeRoute.failure_message(&err), now);
                self.to_amount = None;
                self.quoted_amount = None;
                self.route.clear();
            }
        }
        true
    }

    // ---- effects: metadata ------------------------------------------------

    /// Coin metadata due for the current pair, fetched alongside the first quote.
    pub fn metadata_request(&mut self) -> Option<TokenPair> {
        if self.amount.is_empty() || self.metadata_pair.as_ref() == Some(&self.pair) {
            return None;
        }
        self.metadata_pair = Some(self.pair.clone());
        Some(self.pair.clone())
    }

    pub fn apply_metadata(
        &mut self,
        pair: &TokenPair,
        result: Result<(Option<CoinMetadata>, Option<CoinMetadata>), ServiceError>,
        now: Instant,
    ) -> bool {
        match result {
            Ok((from, to)) if *pair == self.pair => {
                self.from_metadata = from;
                self.to_metadata = to;
                true
            }
            Ok((from, to)) if pair.switched() == self.pair => {
                self.from_metadata = to;
                self.to_metadata = from;
                true
            }
            Ok(_) => {
                debug!("discarding metadata for {} -> {}", pair.from.symbol, pair.to.symbol);
                false
            }
            Err(err) => {
                warn!("failed to fetch token metadata: {}", err);
                self.toast
                    .raise(FormAction::FetchMetadata.failure_message(&err), now);
                false
            }
        }
    }

    // ---- effects: wallet, balances, prices --------------------------------

    pub fn set_wallet_installed(&mut self, installed: bool) {
        self.wallet_installed = installed;
    }

    /// Enter the connecting state. Returns false when there is nothing to do.
    pub fn begin_connect(&mut self) -> bool {
        if !self.wallet_installed || self.loading || self.wallet_address.is_some() {
            return false;
        }
        self.loading = true;
        true
    }

    pub fn finish_connect(&mut self, result: Result<WalletAccount, ServiceError>, now: Instant) {
        self.loading = false;
        let account = result.and_then(|account| {
            normalize_sui_address(&account.address)
                .map_err(|err| ServiceError::Wallet(err.to_string()))
        });
        match account {
            Ok(address) => {
                info!("wallet connected: {}", short_address(&address));
                self.wallet_address = Some(address);
            }
            Err(err) => {
                warn!("wallet connection failed: {}", err);
                self.toast
                    .raise(FormAction::ConnectWallet.failure_message(&err), now);
            }
        }
    }

    /// Balance refresh due after a connect or a direction switch.
    pub fn account_request(&mut self) -> Option<AccountTicket> {
        let ticket = AccountTicket {
            address: self.wallet_address.clone()?,
            pair: self.pair.clone(),
        };
        if self.last_account.as_ref() == Some(&ticket) {
            return None;
        }
        self.last_account = Some(ticket.clone());
        Some(ticket)
    }

    /// Apply balances for `(pair.from, pair.to)`. Returns true when prices
    /// should be refreshed next.
    pub fn apply_balances(
        &mut self,
        ticket: &AccountTicket,
        result: Result<(Decimal, Decimal), ServiceError>,
        now: Instant,
    ) -> bool {
        if self.wallet_address.as_deref() != Some(ticket.address.as_str()) {
            debug!("discarding balances for {}", short_address(&ticket.address));
            return false;
        }
        match result {
            Ok((from, to)) => {
                self.balances.insert(ticket.pair.from.coin_type.clone(), from);
                self.balances.insert(ticket.pair.to.coin_type.clone(), to);
                true
            }
            Err(err) => {
                warn!("failed to fetch balances: {}", err);
                self.toast
                    .raise(FormAction::FetchBalanceOrPrice.failure_message(&err), now);
                false
            }
        }
    }

    pub fn apply_prices(&mut self, result: Result<Vec<PriceQuote>, ServiceError>, now: Instant) {
        match result {
            Ok(quotes) => {
                for quote in quotes {
                    self.prices.insert(quote.coin_type, quote.price);
                }
            }
            Err(err) => {
                warn!("failed to fetch prices: {}", err);
                self.toast
                    .raise(FormAction::FetchPrice.failure_message(&err), now);
            }
        }
    }

    // ---- error toast ------------------------------------------------------

    pub fn dismiss_error(&mut self) {
        self.toast.dismiss();
    }

    pub fn expire_error(&mut self, now: Instant) -> bool {
        self.toast.expire(now)
    }

    // ---- trade ------------------------------------------------------------

    /// Preview of the trade the form describes. Needs an amount and a wallet.
    pub fn prepare_swap(&self) -> Option<SwapPreview> {
        self.wallet_address.as_ref()?;
        let amount_in = self.parsed_amount()?;

        let expected_out = self
            .to_amount
            .filter(|_| self.quoted_amount == Some(amount_in));
        let decimals = self
            .to_metadata
            .as_ref()
            .map(|meta| meta.decimals)
            .unwrap_or(DEFAULT_COIN_DECIMALS);

        Some(SwapPreview {
            pair: self.pair.clone(),
            amount_in,
            expected_out,
            minimum_received: expected_out
                .map(|out| minimum_received(out, self.slippage, decimals)),
            slippage: self.slippage,
            route: (!self.route.is_empty()).then(|| self.route.clone()),
        })
    }

    // ---- presentation -----------------------------------------------------

    fn label_for(&self, token: &Token, metadata: Option<&CoinMetadata>) -> String {
        metadata
            .map(|meta| meta.symbol.clone())
            .unwrap_or_else(|| token.symbol.clone())
    }

    pub fn view(&self) -> FormView {
        let wallet = match (&self.wallet_address, self.wallet_installed) {
            (Some(address), _) => WalletStatus::Connected {
                address: short_address(address),
            },
            (None, true) => WalletStatus::Disconnected {
                connecting: self.loading,
            },
            (None, false) => WalletStatus::NotInstalled,
        };

        let balance_text = |token: &Token| {
            self.balance_of(token)
                .map(format_number)
                .unwrap_or_default()
        };

        FormView {
            wallet,
            slippage: self.slippage.normalize().to_string(),
            pay_symbol: self.label_for(&self.pair.from, self.from_metadata.as_ref()),
            pay_balance: balance_text(&self.pair.from),
            amount: self.amount.clone(),
            pay_fiat: format_usd(self.from_fiat_value()),
            receive_symbol: self.label_for(&self.pair.to, self.to_metadata.as_ref()),
            receive_balance: balance_text(&self.pair.to),
            receive_amount: match self.to_amount {
                Some(_) => format_balance(
                    self.to_amount,
                    self.to_metadata.as_ref().map(|meta| meta.decimals),
                ),
                None => "0.0".to_string(),
            },
            quoting: self.is_quote_pending(),
            receive_fiat: format_usd(self.to_fiat_value()),
            rate: self.rate_label(),
            route: if self.route.is_empty() {
                "N/A".to_string()
            } else {
                self.route.clone()
            },
            trade_enabled: self.can_trade(),
            trade_label: if self.loading { "Swapping..." } else { "Trade" }.to_string(),
            error: self.toast.message().map(str::to_string),
        }
    }
}

impl Default for SwapForm {
    fn default() -> Self {
        Self::new(TokenPair::default(), FormSettings::default())
    }
}
