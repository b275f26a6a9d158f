//! Domain layer - core business logic and entities

pub mod services;
pub mod swap;
pub mod toast;
