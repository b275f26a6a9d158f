//! Interactive form commands and their handlers

use std::str::FromStr;

use tracing::debug;

use super::services::{PendingEffect, SwapFormService};
use crate::domain::swap::{AmountEdit, SwapPreview};
use crate::shared::errors::FormError;
use crate::shared::utils::format_number;

pub const HELP: &str = "\
commands:
  amount <x>     type an amount to pay (empty clears it)
  half | max     fill half or all of the pay balance
  switch         swap pay and receive tokens
  flip           invert the displayed rate
  slippage <x>   slippage tolerance in percent
  blur           leave the amount field (adds separators)
  connect        connect the wallet
  refresh        fetch quote, balances and prices again
  trade          show what the trade would do
  dismiss        hide the error message
  show           print the form
  quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormCommand {
    Amount(String),
    Half,
    Max,
    Switch,
    Flip,
    Slippage(String),
    Blur,
    Connect,
    Refresh,
    Trade,
    Dismiss,
    Show,
    Help,
    Quit,
}

impl FromStr for FormCommand {
    type Err = FormError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };
        let command = match word.to_ascii_lowercase().as_str() {
            "amount" | "a" => FormCommand::Amount(rest.to_string()),
            "half" => FormCommand::Half,
            "max" => FormCommand::Max,
            "switch" => FormCommand::Switch,
            "flip" => FormCommand::Flip,
            "slippage" => FormCommand::Slippage(rest.to_string()),
            "blur" => FormCommand::Blur,
            "connect" => FormCommand::Connect,
            "refresh" => FormCommand::Refresh,
            "trade" => FormCommand::Trade,
            "dismiss" => FormCommand::Dismiss,
            "show" | "" => FormCommand::Show,
            "help" | "?" => FormCommand::Help,
            "quit" | "exit" | "q" => FormCommand::Quit,
            _ => return Err(FormError::UnknownCommand(line.to_string())),
        };
        Ok(command)
    }
}

pub enum CommandOutcome {
    Continue {
        effects: Vec<PendingEffect>,
        message: Option<String>,
    },
    Quit,
}

pub struct CommandExecutor;

impl CommandExecutor {
    pub fn execute(service: &mut SwapFormService, command: FormCommand) -> CommandOutcome {
        debug!("executing {:?}", command);
        let mut effects = Vec::new();
        let form = service.form_mut();

        let message = match command {
            FormCommand::Quit => return CommandOutcome::Quit,
            FormCommand::Amount(raw) => match form.change_amount(&raw) {
                AmountEdit::Ignored => Some(format!("not an amount: {:?}", raw)),
                AmountEdit::Clamped { text } => Some(format!("amount limited to balance: {}", text)),
                AmountEdit::Accepted { .. } => None,
            },
            FormCommand::Half => {
                form.half();
                None
            }
            FormCommand::Max => {
                form.max();
                None
            }
            FormCommand::Switch => {
                form.switch_direction();
                None
            }
            FormCommand::Flip => {
                form.toggle_rate_direction();
                Some(form.rate_label())
            }
            FormCommand::Slippage(raw) => {
                form.change_slippage(&raw);
                Some(format!("slippage tolerance: {}%", form.slippage().normalize()))
            }
            FormCommand::Blur => {
                form.blur_amount();
                None
            }
            FormCommand::Dismiss => {
                form.dismiss_error();
                None
            }
            FormCommand::Trade => Some(match form.prepare_swap() {
                Some(preview) => describe_preview(&preview),
                None if !form.is_connected() => "connect a wallet first".to_string(),
                None => "enter an amount first".to_string(),
            }),
            FormCommand::Show => Some(form.view().to_string()),
            FormCommand::Help => Some(HELP.to_string()),
            FormCommand::Connect => {
                match service.connect_effect() {
                    Some(effect) => effects.push(effect),
                    None => debug!("connect not started"),
                }
                None
            }
            FormCommand::Refresh => {
                form.requote();
                None
            }
        };

        effects.extend(service.due_effects());
        CommandOutcome::Continue { effects, message }
    }
}

pub fn describe_preview(preview: &SwapPreview) -> String {
    let mut lines = vec![format!(
        "pay {} {}",
        format_number(preview.amount_in),
        preview.pair.from.symbol
    )];
    match (preview.expected_out, preview.minimum_received) {
        (Some(expected), Some(minimum)) => {
            lines.push(format!(
                "receive {} {} (at least {} with {}% slippage)",
                format_number(expected),
                preview.pair.to.symbol,
                format_number(minimum),
                preview.slippage.normalize()
            ));
        }
        _ => lines.push("quote pending".to_string()),
    }
    if let Some(route) = &preview.route {
        lines.push(format!("route {}", route));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::types::TokenPair;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_commands() {
        assert_eq!("amount 1.5".parse::<FormCommand>(), Ok(FormCommand::Amount("1.5".to_string())));
        assert_eq!("amount".parse::<FormCommand>(), Ok(FormCommand::Amount(String::new())));
        assert_eq!("  MAX ".parse::<FormCommand>(), Ok(FormCommand::Max));
        assert_eq!("slippage 1".parse::<FormCommand>(), Ok(FormCommand::Slippage("1".to_string())));
        assert_eq!("".parse::<FormCommand>(), Ok(FormCommand::Show));
        assert_eq!("q".parse::<FormCommand>(), Ok(FormCommand::Quit));
        assert_eq!(
            "buy 3".parse::<FormCommand>(),
            Err(FormError::UnknownCommand("buy 3".to_string()))
        );
    }

    #[test]
    fn test_describe_preview() {
        let preview = SwapPreview {
            pair: TokenPair::default(),
            amount_in: dec!(2000),
            expected_out: Some(dec!(50000)),
            minimum_received: Some(dec!(49750)),
            slippage: dec!(0.50),
            route: Some("SUI → CETUS via Cetus".to_string()),
        };
        assert_eq!(
            describe_preview(&preview),
            "pay 2,000 SUI\nreceive 50,000 CETUS (at least 49,750 with 0.5% slippage)\nroute SUI → CETUS via Cetus"
        );

        let pending = SwapPreview {
            expected_out: None,
            minimum_received: None,
            route: None,
            ..preview
        };
        assert_eq!(describe_preview(&pending), "pay 2,000 SUI\nquote pending");
    }
}
