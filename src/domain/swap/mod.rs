//! Swap domain - the form controller and the value rules behind it

mod amount;
mod form;
mod rate;
mod slippage;
mod view;

pub use amount::{validate_amount_edit, AmountEdit};
pub use form::{AccountTicket, FormSettings, RouteTicket, SwapForm, SwapPreview};
pub use rate::{exchange_rate, rate_label, reversed_exchange_rate, RateDirection};
pub use slippage::{minimum_received, validate_slippage_edit, SlippageEdit, DEFAULT_SLIPPAGE, MAX_SLIPPAGE};
pub use view::{FormView, WalletStatus};
