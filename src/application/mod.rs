//! Application layer - form commands and the effect-running service

pub mod commands;
pub mod services;

pub use commands::{CommandExecutor, CommandOutcome, FormCommand};
pub use services::{EffectResult, PendingEffect, ServiceSettings, SwapFormService};
