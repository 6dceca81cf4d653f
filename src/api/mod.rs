//! HTTP surface: routing, sessions, form and JSON handlers.

pub mod error;
pub mod handlers;
pub mod rest;
pub mod routes;
pub mod session;
pub mod views;
