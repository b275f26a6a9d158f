//! Swap form service: runs the effects the controller asks for against the
//! wallet, chain and aggregator, and feeds the answers back.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::BoxFuture;
use futures::stream::{FuturesUnordered, StreamExt};
use futures::FutureExt;
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::domain::services::{BalanceSource, PriceSource, RouteQuoter, WalletProvider};
use crate::domain::swap::{AccountTicket, RouteTicket, SwapForm};
use crate::shared::errors::ServiceError;
use crate::shared::types::{CoinMetadata, PriceQuote, TokenPair, TradeQuote, WalletAccount};

pub const DEFAULT_EFFECT_TIMEOUT: Duration = Duration::from_secs(15);
pub const DEFAULT_WALLET_DETECT_RETRY: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone)]
pub struct ServiceSettings {
    /// Upper bound on a single effect, on top of the HTTP client timeout
    pub effect_timeout: Duration,
    /// Delay before the wallet installation is checked a second time
    pub wallet_detect_retry: Duration,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            effect_timeout: DEFAULT_EFFECT_TIMEOUT,
            wallet_detect_retry: DEFAULT_WALLET_DETECT_RETRY,
        }
    }
}

/// Answer of a finished effect, tagged with the question it answers
#[derive(Debug)]
pub enum EffectResult {
    Route(RouteTicket, Result<TradeQuote, ServiceError>),
    Metadata(TokenPair, Result<(Option<CoinMetadata>, Option<CoinMetadata>), ServiceError>),
    Balances(AccountTicket, Result<(Decimal, Decimal), ServiceError>),
    Prices(Result<Vec<PriceQuote>, ServiceError>),
    Connected(Result<WalletAccount, ServiceError>),
}

pub type PendingEffect = BoxFuture<'static, EffectResult>;

async fn with_timeout<T, F>(limit: Duration, fut: F) -> Result<T, ServiceError>
where
    F: Future<Output = Result<T, ServiceError>>,
{
    tokio::time::timeout(limit, fut)
        .await
        .unwrap_or(Err(ServiceError::Timeout))
}

/// Current time on the tokio clock; stands still while the runtime clock is paused.
fn now() -> Instant {
    tokio::time::Instant::now().into_std()
}

pub struct SwapFormService {
    form: SwapForm,
    wallet: Arc<dyn WalletProvider>,
    balances: Arc<dyn BalanceSource>,
    prices: Arc<dyn PriceSource>,
    quoter: Arc<dyn RouteQuoter>,
    settings: ServiceSettings,
}

impl SwapFormService {
    pub fn new(
        form: SwapForm,
        wallet: Arc<dyn WalletProvider>,
        balances: Arc<dyn BalanceSource>,
        prices: Arc<dyn PriceSource>,
        quoter: Arc<dyn RouteQuoter>,
        settings: ServiceSettings,
    ) -> Self {
        Self {
            form,
            wallet,
            balances,
            prices,
            quoter,
            settings,
        }
    }

    pub fn form(&self) -> &SwapForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut SwapForm {
        &mut self.form
    }

    /// Check for the wallet, and once more after a short delay when it is not
    /// there yet.
    pub async fn detect_wallet(&mut self) -> bool {
        let mut installed = self.wallet.is_installed();
        if !installed {
            debug!(
                "{} not detected, retrying in {:?}",
                self.wallet.name(),
                self.settings.wallet_detect_retry
            );
            tokio::time::sleep(self.settings.wallet_detect_retry).await;
            installed = self.wallet.is_installed();
        }
        if installed {
            info!("{} detected", self.wallet.name());
        } else {
            info!("{} is not installed", self.wallet.name());
        }
        self.form.set_wallet_installed(installed);
        installed
    }

    pub fn connect_effect(&mut self) -> Option<PendingEffect> {
        if !self.form.begin_connect() {
            return None;
        }
        let wallet = Arc::clone(&self.wallet);
        let limit = self.settings.effect_timeout;
        Some(
            async move {
                let result = with_timeout(limit, wallet.connect()).await;
                EffectResult::Connected(result)
            }
            .boxed(),
        )
    }

    /// Effects the current form state calls for: route quote, coin metadata
    /// and account balances.
    pub fn due_effects(&mut self) -> Vec<PendingEffect> {
        let mut effects = Vec::new();
        let limit = self.settings.effect_timeout;

        if let Some(ticket) = self.form.route_request() {
            let quoter = Arc::clone(&self.quoter);
            effects.push(
                async move {
                    let result =
                        with_timeout(limit, quoter.trade_route(&ticket.pair, ticket.amount)).await;
                    EffectResult::Route(ticket, result)
                }
                .boxed(),
            );
        }

        if let Some(pair) = self.form.metadata_request() {
            let source = Arc::clone(&self.balances);
            effects.push(
                async move {
                    let result = with_timeout(limit, async {
                        futures::try_join!(
                            source.coin_metadata(&pair.from.coin_type),
                            source.coin_metadata(&pair.to.coin_type)
                        )
                    })
                    .await;
                    EffectResult::Metadata(pair, result)
                }
                .boxed(),
            );
        }

        if let Some(ticket) = self.form.account_request() {
            let source = Arc::clone(&self.balances);
            effects.push(
                async move {
                    let result = with_timeout(limit, async {
                        futures::try_join!(
                            source.balance(&ticket.address, &ticket.pair.from.coin_type),
                            source.balance(&ticket.address, &ticket.pair.to.coin_type)
                        )
                    })
                    .await;
                    EffectResult::Balances(ticket, result)
                }
                .boxed(),
            );
        }

        effects
    }

    /// USD prices of both tokens of the current pair.
    pub fn price_effect(&self) -> PendingEffect {
        let source = Arc::clone(&self.prices);
        let pair = self.form.pair().clone();
        let limit = self.settings.effect_timeout;
        async move {
            let result = with_timeout(limit, async {
                let (from, to) = futures::try_join!(
                    source.price(&pair.from.coin_type),
                    source.price(&pair.to.coin_type)
                )?;
                Ok(vec![from, to])
            })
            .await;
            EffectResult::Prices(result)
        }
        .boxed()
    }

    /// Periodic price poll; only runs while a wallet is connected.
    pub fn on_price_tick(&self) -> Option<PendingEffect> {
        self.form.is_connected().then(|| self.price_effect())
    }

    /// Hide the error toast once its timeout elapsed. Returns true when it was
    /// hidden.
    pub fn on_toast_tick(&mut self) -> bool {
        self.form.expire_error(now())
    }

    /// Hand a finished effect to the form. Returns the effects that follow
    /// from it.
    pub fn apply(&mut self, result: EffectResult) -> Vec<PendingEffect> {
        let now = now();
        let mut follow_up = Vec::new();
        match result {
            EffectResult::Route(ticket, result) => {
                self.form.apply_route_result(&ticket, result, now);
            }
            EffectResult::Metadata(pair, result) => {
                self.form.apply_metadata(&pair, result, now);
            }
            EffectResult::Balances(ticket, result) => {
                if self.form.apply_balances(&ticket, result, now) {
                    follow_up.push(self.price_effect());
                }
            }
            EffectResult::Prices(result) => self.form.apply_prices(result, now),
            EffectResult::Connected(result) => self.form.finish_connect(result, now),
        }
        follow_up.extend(self.due_effects());
        follow_up
    }

    /// Run everything that is due, and whatever follows from it, to completion.
    pub async fn settle(&mut self) {
        self.settle_with(Vec::new()).await
    }

    /// Like [`settle`](Self::settle), starting from extra in-flight effects.
    pub async fn settle_with(&mut self, effects: Vec<PendingEffect>) {
        let mut pending: FuturesUnordered<PendingEffect> = effects.into_iter().collect();
        pending.extend(self.due_effects());
        while let Some(result) = pending.next().await {
            pending.extend(self.apply(result));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::swap::FormSettings;
    use crate::domain::toast::DEFAULT_TOAST_TIMEOUT;
    use crate::infrastructure::wallet::ConfiguredWallet;
    use crate::shared::types::{RoutePath, TradeRoute, CETUS_COIN_TYPE, SUI_COIN_TYPE};
    use async_trait::async_trait;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    struct FakeChain;

    #[async_trait]
    impl BalanceSource for FakeChain {
        async fn coin_metadata(&self, coin_type: &str) -> Result<Option<CoinMetadata>, ServiceError> {
            let symbol = if coin_type == SUI_COIN_TYPE { "SUI" } else { "CETUS" };
            Ok(Some(CoinMetadata {
                name: symbol.to_string(),
                symbol: symbol.to_string(),
                decimals: 9,
            }))
        }

        async fn balance(&self, _owner: &str, coin_type: &str) -> Result<Decimal, ServiceError> {
            Ok(if coin_type == SUI_COIN_TYPE { dec!(10) } else { dec!(500) })
        }
    }

    struct FakePrices;

    #[async_trait]
    impl PriceSource for FakePrices {
        async fn price(&self, coin_type: &str) -> Result<PriceQuote, ServiceError> {
            Ok(PriceQuote {
                coin_type: coin_type.to_string(),
                price: if coin_type == SUI_COIN_TYPE { dec!(2) } else { dec!(0.08) },
                fetched_at: Utc::now(),
            })
        }
    }

    /// Quotes 25 out per unit in, after `delay`.
    struct FakeQuoter {
        delay: Duration,
    }

    #[async_trait]
    impl RouteQuoter for FakeQuoter {
        async fn trade_route(&self, pair: &TokenPair, amount: Decimal) -> Result<TradeQuote, ServiceError> {
            tokio::time::sleep(self.delay).await;
            Ok(TradeQuote {
                output_amount: amount * dec!(25),
                routes: vec![TradeRoute {
                    paths: vec![RoutePath {
                        protocol_name: "Cetus".to_string(),
                        coin_in_type: pair.from.coin_type.clone(),
                        coin_out_type: pair.to.coin_type.clone(),
                    }],
                }],
            })
        }
    }

    fn service(address: Option<&str>, quote_delay: Duration, effect_timeout: Duration) -> SwapFormService {
        SwapFormService::new(
            SwapForm::new(TokenPair::default(), FormSettings::default()),
            Arc::new(ConfiguredWallet::new(address.map(str::to_string))),
            Arc::new(FakeChain),
            Arc::new(FakePrices),
            Arc::new(FakeQuoter { delay: quote_delay }),
            ServiceSettings {
                effect_timeout,
                wallet_detect_retry: Duration::from_millis(5),
            },
        )
    }

    async fn connected(service: &mut SwapFormService) {
        assert!(service.detect_wallet().await);
        let connect = service.connect_effect().expect("connect due");
        service.settle_with(vec![connect]).await;
    }

    #[tokio::test]
    async fn test_connect_loads_balances_and_prices() {
        let mut service = service(Some("0xa1"), Duration::ZERO, Duration::from_secs(1));
        connected(&mut service).await;

        let form = service.form();
        assert!(form.is_connected());
        assert_eq!(form.balance_of(&form.pair().from), Some(dec!(10)));
        assert_eq!(form.balance_of(&form.pair().to), Some(dec!(500)));
        assert_eq!(form.price_of(&form.pair().from), dec!(2));
        assert_eq!(form.price_of(&form.pair().to), dec!(0.08));
    }

    #[tokio::test]
    async fn test_amount_edit_is_quoted() {
        let mut service = service(Some("0xa1"), Duration::ZERO, Duration::from_secs(1));
        connected(&mut service).await;

        service.form_mut().change_amount("2");
        service.settle().await;

        let form = service.form();
        assert_eq!(form.to_amount(), Some(dec!(50)));
        assert_eq!(form.route(), "SUI → CETUS via Cetus");
        assert_eq!(form.to_metadata().map(|m| m.symbol.as_str()), Some("CETUS"));
        assert_eq!(form.error_message(), None);
    }

    #[tokio::test]
    async fn test_superseded_quote_is_ignored() {
        let mut service = service(Some("0xa1"), Duration::ZERO, Duration::from_secs(1));
        connected(&mut service).await;

        service.form_mut().change_amount("1");
        let stale = service.due_effects();
        service.form_mut().change_amount("3");
        let fresh = service.due_effects();

        for effect in fresh {
            let result = effect.await;
            service.apply(result);
        }
        for effect in stale {
            let result = effect.await;
            service.apply(result);
        }
        assert_eq!(service.form().to_amount(), Some(dec!(75)));
    }

    #[tokio::test]
    async fn test_slow_quote_times_out() {
        let mut service = service(
            Some("0xa1"),
            Duration::from_millis(200),
            Duration::from_millis(20),
        );
        connected(&mut service).await;

        service.form_mut().change_amount("2");
        service.settle().await;

        assert_eq!(service.form().to_amount(), None);
        assert_eq!(
            service.form().error_message(),
            Some("An unexpected error occurred while fetching trade route")
        );
    }

    #[tokio::test]
    async fn test_missing_wallet_is_detected_after_retry() {
        let mut service = service(None, Duration::ZERO, Duration::from_secs(1));
        assert!(!service.detect_wallet().await);
        assert!(!service.form().is_wallet_installed());
        assert!(service.connect_effect().is_none());
    }

    #[tokio::test]
    async fn test_switch_refreshes_balances() {
        let mut service = service(Some("0xa1"), Duration::ZERO, Duration::from_secs(1));
        connected(&mut service).await;

        service.form_mut().switch_direction();
        let effects = service.due_effects();
        assert_eq!(effects.len(), 1);
        service.settle_with(effects).await;

        let form = service.form();
        assert_eq!(form.pair().from.coin_type, CETUS_COIN_TYPE);
        assert_eq!(form.balance_of(&form.pair().from), Some(dec!(500)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_price_poll_and_toast_ticks() {
        let mut service = service(Some("0xa1"), Duration::ZERO, Duration::from_secs(1));
        let mut price_tick = tokio::time::interval(Duration::from_secs(10));
        price_tick.tick().await;
        assert!(service.on_price_tick().is_none());

        connected(&mut service).await;
        price_tick.tick().await;
        let poll = service.on_price_tick().expect("prices polled while connected");
        assert!(matches!(poll.await, EffectResult::Prices(Ok(ref quotes)) if quotes.len() == 2));

        service.apply(EffectResult::Prices(Err(ServiceError::Timeout)));
        assert!(service.form().error_message().is_some());
        assert!(!service.on_toast_tick());

        tokio::time::advance(DEFAULT_TOAST_TIMEOUT - Duration::from_millis(1)).await;
        assert!(!service.on_toast_tick());
        tokio::time::advance(Duration::from_millis(1)).await;
        assert!(service.on_toast_tick());
        assert_eq!(service.form().error_message(), None);
    }
}
