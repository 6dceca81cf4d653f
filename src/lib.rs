//! Paper-trading web service: accounts with a simulated cash balance that buy
//! shares at live quotes, persisted as a single JSON document.

pub mod accounts;
pub mod api;
pub mod auth;
pub mod config;
pub mod persistence;
pub mod quotes;
pub mod trading;
pub mod types;
