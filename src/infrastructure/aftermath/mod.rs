//! Aftermath Finance REST API: router quotes and USD prices

mod client;
mod models;

pub use client::{AftermathClient, AFTERMATH_API_BASE};
