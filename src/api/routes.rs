use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use rust_decimal::Decimal;

use crate::accounts::Accounts;
use crate::api::{handlers, rest};
use crate::auth::SessionStore;
use crate::persistence::{CorruptPolicy, Ledger, UserStore};
use crate::quotes::QuoteProvider;
use crate::trading::TradingDesk;

/// Knobs the router needs beyond its collaborators.
#[derive(Clone)]
pub struct AppSettings {
    pub jwt_secret: Vec<u8>,
    pub starting_balance: Decimal,
    pub currency: String,
    pub corrupt_policy: CorruptPolicy,
    pub secure_cookies: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            jwt_secret: uuid::Uuid::new_v4().as_bytes().to_vec(),
            starting_balance: Decimal::from(100_000),
            currency: "₹".to_string(),
            corrupt_policy: CorruptPolicy::FailFast,
            secure_cookies: false,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub accounts: Arc<Accounts>,
    pub trading: Arc<TradingDesk>,
    pub sessions: SessionStore,
    pub jwt_secret: Vec<u8>,
    pub secure_cookies: bool,
}

impl AppState {
    pub fn new(
        store: Arc<dyn UserStore>,
        quotes: Arc<dyn QuoteProvider>,
        settings: AppSettings,
    ) -> Self {
        let ledger = Arc::new(Ledger::new(store, settings.corrupt_policy));
        let sessions = SessionStore::new();
        let accounts = Accounts::new(
            ledger.clone(),
            sessions.clone(),
            settings.jwt_secret.clone(),
            settings.starting_balance,
        );
        let trading = TradingDesk::new(ledger, quotes, settings.currency);
        Self {
            accounts: Arc::new(accounts),
            trading: Arc::new(trading),
            sessions,
            jwt_secret: settings.jwt_secret,
            secure_cookies: settings.secure_cookies,
        }
    }
}

async fn health() -> &'static str {
    "healthy"
}

pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(health))
        .route("/signup", get(handlers::signup_form).post(handlers::signup))
        .route("/login", get(handlers::login_form).post(handlers::login))
        .route("/logout", get(handlers::logout))
        .route(
            "/dashboard",
            get(handlers::dashboard).post(handlers::dashboard_search),
        )
        .route("/buy", post(handlers::buy))
        .route("/api/portfolio", get(rest::portfolio))
        .route("/api/quote/{symbol}", get(rest::quote))
        .with_state(state)
}
