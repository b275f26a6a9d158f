// src/app.rs
use anyhow::{bail, Context, Result};
use futures::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use crate::application::{
    CommandExecutor, CommandOutcome, FormCommand, PendingEffect, ServiceSettings, SwapFormService,
};
use crate::config::Config;
use crate::domain::swap::{AmountEdit, FormSettings, SwapForm};
use crate::infrastructure::{AftermathClient, ConfiguredWallet, SuiRpcClient};
use crate::shared::types::{Token, TokenPair};
use crate::shared::utils::{format_number, format_usd};

const TOAST_TICK: Duration = Duration::from_millis(250);

#[derive(Debug, Clone)]
pub struct AppCfg {
    pub rpc_url: String,
    pub rpc_timeout: Duration,
    pub aggregator_url: String,
    pub aggregator_timeout: Duration,
    pub wallet_address: Option<String>,
    pub pair: TokenPair,
    pub form: FormSettings,
    pub service: ServiceSettings,
    pub price_refresh: Duration,
}

impl AppCfg {
    pub fn from_config(cfg: Config) -> Self {
        Self {
            rpc_url: cfg.rpc.url,
            rpc_timeout: Duration::from_millis(cfg.rpc.timeout_ms),
            aggregator_url: cfg.aggregator.base_url,
            aggregator_timeout: Duration::from_millis(cfg.aggregator.timeout_ms),
            wallet_address: cfg.wallet.address,
            pair: TokenPair::new(Token::from(cfg.tokens.from), Token::from(cfg.tokens.to)),
            form: FormSettings {
                default_slippage: cfg.form.default_slippage,
                toast_timeout: Duration::from_millis(cfg.form.toast_timeout_ms),
            },
            service: ServiceSettings {
                effect_timeout: Duration::from_millis(cfg.form.effect_timeout_ms),
                wallet_detect_retry: Duration::from_millis(cfg.form.wallet_detect_retry_ms),
            },
            // tokio intervals panic on a zero period
            price_refresh: Duration::from_secs(cfg.form.price_refresh_secs.max(1)),
        }
    }

    /// Command-line values win over the config file.
    pub fn with_overrides(
        mut self,
        rpc_url: Option<String>,
        aggregator_url: Option<String>,
        address: Option<String>,
    ) -> Self {
        if let Some(url) = rpc_url {
            self.rpc_url = url;
        }
        if let Some(url) = aggregator_url {
            self.aggregator_url = url;
        }
        if address.is_some() {
            self.wallet_address = address;
        }
        self
    }
}

impl Default for AppCfg {
    fn default() -> Self {
        Self::from_config(Config::default())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    Prices,
    Balances,
    Quote { amount: String, reverse: bool },
    Repl,
}

pub fn build_service(app_cfg: &AppCfg) -> Result<SwapFormService> {
    let chain = Arc::new(
        SuiRpcClient::new(app_cfg.rpc_url.clone(), app_cfg.rpc_timeout)
            .context("build Sui RPC client")?,
    );
    let aftermath = Arc::new(
        AftermathClient::new(
            app_cfg.aggregator_url.clone(),
            app_cfg.aggregator_timeout,
            chain.clone(),
        )
        .context("build Aftermath client")?,
    );
    let wallet = Arc::new(ConfiguredWallet::new(app_cfg.wallet_address.clone()));

    Ok(SwapFormService::new(
        SwapForm::new(app_cfg.pair.clone(), app_cfg.form.clone()),
        wallet,
        chain,
        aftermath.clone(),
        aftermath,
        app_cfg.service.clone(),
    ))
}

pub async fn run(app_cfg: AppCfg, command: AppCommand) -> Result<()> {
    info!("RPC: {}", app_cfg.rpc_url);
    info!("Aggregator: {}", app_cfg.aggregator_url);
    info!("Pair: {} -> {}", app_cfg.pair.from.symbol, app_cfg.pair.to.symbol);

    let mut service = build_service(&app_cfg)?;
    match command {
        AppCommand::Prices => print_prices(&mut service).await,
        AppCommand::Balances => print_balances(&mut service).await,
        AppCommand::Quote { amount, reverse } => quote_once(&mut service, &amount, reverse).await,
        AppCommand::Repl => repl(&mut service, app_cfg.price_refresh).await,
    }
}

fn fail_on_error(service: &SwapFormService) -> Result<()> {
    match service.form().error_message() {
        Some(message) => bail!("{}", message),
        None => Ok(()),
    }
}

async fn connect(service: &mut SwapFormService) -> Result<()> {
    if !service.detect_wallet().await {
        bail!("no wallet address configured (use --address or [wallet].address)");
    }
    let effects: Vec<PendingEffect> = service.connect_effect().into_iter().collect();
    service.settle_with(effects).await;
    fail_on_error(service)
}

async fn print_prices(service: &mut SwapFormService) -> Result<()> {
    let effect = service.price_effect();
    service.settle_with(vec![effect]).await;
    fail_on_error(service)?;

    let form = service.form();
    for token in [&form.pair().from, &form.pair().to] {
        println!("{:<8} {}", token.symbol, format_usd(form.price_of(token)));
    }
    Ok(())
}

async fn print_balances(service: &mut SwapFormService) -> Result<()> {
    connect(service).await?;

    let form = service.form();
    println!("Wallet: {}", form.wallet_address().unwrap_or_default());
    for token in [&form.pair().from, &form.pair().to] {
        let balance = form.balance_of(token).unwrap_or_default();
        println!(
            "{:<8} {:>24} ({})",
            token.symbol,
            format_number(balance),
            format_usd(balance * form.price_of(token))
        );
    }
    Ok(())
}

async fn quote_once(service: &mut SwapFormService, amount: &str, reverse: bool) -> Result<()> {
    connect(service).await?;
    if reverse {
        service.form_mut().switch_direction();
        service.settle().await;
    }

    match service.form_mut().change_amount(amount) {
        AmountEdit::Ignored => bail!("not an amount: {:?}", amount),
        AmountEdit::Clamped { text } => warn!("amount limited to balance: {}", text),
        AmountEdit::Accepted { .. } => {}
    }
    service.settle().await;
    service.form_mut().blur_amount();

    print!("{}", service.form().view());
    Ok(())
}

async fn repl(service: &mut SwapFormService, price_refresh: Duration) -> Result<()> {
    let mut pending: FuturesUnordered<PendingEffect> = FuturesUnordered::new();
    if service.detect_wallet().await {
        pending.extend(service.connect_effect());
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut price_tick = tokio::time::interval(price_refresh);
    let mut toast_tick = tokio::time::interval(TOAST_TICK);
    // the first tick of an interval fires immediately; prices follow the balances
    price_tick.tick().await;

    print!("{}", service.form().view());
    println!("type `help` for commands");

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("read stdin")? else {
                    break;
                };
                let command = match line.parse::<FormCommand>() {
                    Ok(command) => command,
                    Err(err) => {
                        println!("{} (type `help`)", err);
                        continue;
                    }
                };
                match CommandExecutor::execute(service, command) {
                    CommandOutcome::Quit => break,
                    CommandOutcome::Continue { effects, message } => {
                        if let Some(message) = &message {
                            println!("{}", message);
                        }
                        if effects.is_empty() && message.is_none() {
                            print!("{}", service.form().view());
                        }
                        pending.extend(effects);
                    }
                }
            }
            Some(result) = pending.next(), if !pending.is_empty() => {
                pending.extend(service.apply(result));
                if pending.is_empty() {
                    print!("{}", service.form().view());
                }
            }
            _ = price_tick.tick() => {
                pending.extend(service.on_price_tick());
            }
            _ = toast_tick.tick() => {
                if service.on_toast_tick() {
                    print!("{}", service.form().view());
                }
            }
        }
    }

    info!("bye");
    Ok(())
}
