//! Buy transition integration tests: affordability, holdings, transaction log,
//! persistence, concurrency.

use async_trait::async_trait;
use paper_trader::accounts::Accounts;
use paper_trader::auth::SessionStore;
use paper_trader::persistence::{CorruptPolicy, Ledger, MemoryStore, StoreError, UserStore};
use paper_trader::quotes::{FixedQuotes, QuoteError, QuoteProvider};
use paper_trader::trading::{BuyOrder, TradeError, TradingDesk};
use paper_trader::types::holding::Price;
use paper_trader::types::user::UserTable;
use rust_decimal::Decimal;
use std::sync::Arc;

const EMAIL: &str = "trader@example.com";

struct Desk {
    store: Arc<MemoryStore>,
    quotes: Arc<FixedQuotes>,
    accounts: Accounts,
    trading: TradingDesk,
}

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

async fn desk_with_user() -> Desk {
    let store = Arc::new(MemoryStore::new());
    let quotes = Arc::new(FixedQuotes::new());
    let ledger = Arc::new(Ledger::new(store.clone(), CorruptPolicy::FailFast));
    let accounts = Accounts::new(
        ledger.clone(),
        SessionStore::new(),
        b"test-jwt-secret".to_vec(),
        Decimal::from(100_000),
    );
    let trading = TradingDesk::new(ledger, quotes.clone(), "₹");
    accounts.signup(EMAIL, "secret").await.unwrap();
    Desk {
        store,
        quotes,
        accounts,
        trading,
    }
}

async fn table(store: &MemoryStore) -> UserTable {
    store.load().await.unwrap()
}

#[tokio::test]
async fn new_account_starts_with_full_balance() {
    let desk = desk_with_user().await;
    let users = table(&desk.store).await;
    let user = &users[EMAIL];
    assert_eq!(user.balance, Decimal::from(100_000));
    assert!(user.portfolio.is_empty());
    assert!(user.transactions.is_empty());
}

#[tokio::test]
async fn buy_then_rebuy_keeps_first_price() {
    let desk = desk_with_user().await;
    desk.quotes.set_price("SYM", Decimal::from(250)).await;

    let fill = desk
        .trading
        .buy(EMAIL, BuyOrder::new("sym", 10, Decimal::from(200)))
        .await
        .unwrap();
    assert_eq!(fill.total, Decimal::from(2_500));
    assert_eq!(fill.balance, Decimal::from(97_500));

    let users = table(&desk.store).await;
    let user = &users[EMAIL];
    assert_eq!(user.balance, Decimal::from(97_500));
    let holding = &user.portfolio["SYM"];
    assert_eq!(holding.shares, 10);
    assert_eq!(holding.price, Decimal::from(250));
    assert_eq!(holding.stop_loss, Decimal::from(200));
    assert_eq!(
        user.transactions,
        vec!["Bought 10 shares of SYM at ₹250 each with stop-loss ₹200".to_string()]
    );

    desk.quotes.set_price("SYM", Decimal::from(300)).await;
    desk.trading
        .buy(EMAIL, BuyOrder::new("SYM", 5, Decimal::from(280)))
        .await
        .unwrap();

    let users = table(&desk.store).await;
    let user = &users[EMAIL];
    assert_eq!(user.balance, Decimal::from(96_000));
    let holding = &user.portfolio["SYM"];
    assert_eq!(holding.shares, 15);
    assert_eq!(holding.price, Decimal::from(250));
    assert_eq!(holding.stop_loss, Decimal::from(200));
    assert_eq!(user.transactions.len(), 2);
}

#[tokio::test]
async fn fractional_prices_debit_exactly() {
    let desk = desk_with_user().await;
    desk.quotes.set_price("FRAC", dec("123.4567")).await;

    desk.trading
        .buy(EMAIL, BuyOrder::new("FRAC", 3, Decimal::ZERO))
        .await
        .unwrap();

    let users = table(&desk.store).await;
    assert_eq!(users[EMAIL].balance, dec("100000") - dec("370.3701"));
}

#[tokio::test]
async fn insufficient_balance_leaves_state_unchanged() {
    let desk = desk_with_user().await;
    desk.quotes.set_price("BIG", Decimal::from(60_000)).await;
    let before = desk.store.document().await;

    let err = desk
        .trading
        .buy(EMAIL, BuyOrder::new("BIG", 2, Decimal::ZERO))
        .await
        .unwrap_err();
    match err {
        TradeError::InsufficientBalance { required, available } => {
            assert_eq!(required, Decimal::from(120_000));
            assert_eq!(available, Decimal::from(100_000));
        }
        other => panic!("expected InsufficientBalance, got {other:?}"),
    }
    assert_eq!(desk.store.document().await, before);
}

#[tokio::test]
async fn spending_the_whole_balance_is_allowed() {
    let desk = desk_with_user().await;
    desk.quotes.set_price("ALL", Decimal::from(50_000)).await;

    desk.trading
        .buy(EMAIL, BuyOrder::new("ALL", 2, Decimal::ZERO))
        .await
        .unwrap();

    let users = table(&desk.store).await;
    assert_eq!(users[EMAIL].balance, Decimal::ZERO);
}

#[tokio::test]
async fn unknown_symbol_is_rejected_without_changes() {
    let desk = desk_with_user().await;
    let before = desk.store.document().await;

    let err = desk
        .trading
        .buy(EMAIL, BuyOrder::new("NOPE", 1, Decimal::ZERO))
        .await
        .unwrap_err();
    assert!(matches!(err, TradeError::SymbolNotFound(ref s) if s == "NOPE"));
    assert_eq!(desk.store.document().await, before);
}

#[tokio::test]
async fn buy_for_missing_account_is_rejected() {
    let desk = desk_with_user().await;
    desk.quotes.set_price("SYM", Decimal::from(1)).await;

    let err = desk
        .trading
        .buy("ghost@example.com", BuyOrder::new("SYM", 1, Decimal::ZERO))
        .await
        .unwrap_err();
    assert!(matches!(err, TradeError::UnknownAccount));
}

#[tokio::test]
async fn concurrent_buys_do_not_lose_updates() {
    let desk = Arc::new(desk_with_user().await);
    desk.quotes.set_price("SYM", Decimal::from(100)).await;

    let mut handles = Vec::new();
    for _ in 0..20 {
        let desk = desk.clone();
        handles.push(tokio::spawn(async move {
            desk.trading
                .buy(EMAIL, BuyOrder::new("SYM", 1, Decimal::ZERO))
                .await
                .unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let users = table(&desk.store).await;
    let user = &users[EMAIL];
    assert_eq!(user.portfolio["SYM"].shares, 20);
    assert_eq!(user.balance, Decimal::from(98_000));
    assert_eq!(user.transactions.len(), 20);
}

#[tokio::test]
async fn summary_hides_password_hash() {
    let desk = desk_with_user().await;
    let summary = desk.accounts.summary(EMAIL).await.unwrap().unwrap();
    let json = serde_json::to_value(&summary).unwrap();
    assert_eq!(json["email"], EMAIL);
    assert!(json.get("password").is_none());
    assert!(json.get("password_hash").is_none());
}

#[tokio::test]
async fn corrupt_store_fails_fast_by_default() {
    let store = Arc::new(MemoryStore::with_document("{ not json"));
    let ledger = Ledger::new(store, CorruptPolicy::FailFast);
    assert!(matches!(ledger.read().await, Err(StoreError::Corrupt(_))));
}

#[tokio::test]
async fn corrupt_store_can_be_treated_as_empty() {
    let store = Arc::new(MemoryStore::with_document("{ not json"));
    let ledger = Ledger::new(store, CorruptPolicy::TreatAsEmpty);
    assert!(ledger.read().await.unwrap().is_empty());
}

/// Loads from a seeded in-memory store but refuses every save.
struct ReadOnlyStore(MemoryStore);

#[async_trait]
impl UserStore for ReadOnlyStore {
    async fn load(&self) -> Result<UserTable, StoreError> {
        self.0.load().await
    }

    async fn save(&self, _table: &UserTable) -> Result<(), StoreError> {
        Err(StoreError::Io(std::io::Error::other("disk full")))
    }
}

struct DownQuotes;

#[async_trait]
impl QuoteProvider for DownQuotes {
    async fn get_price(&self, _symbol: &str) -> Result<Price, QuoteError> {
        Err(QuoteError::Unavailable("connection refused".to_string()))
    }
}

#[tokio::test]
async fn failed_save_reports_store_error_and_keeps_document() {
    let desk = desk_with_user().await;
    let before = desk.store.document().await.unwrap();
    let store = Arc::new(ReadOnlyStore(MemoryStore::with_document(before.clone())));
    let ledger = Arc::new(Ledger::new(store.clone(), CorruptPolicy::FailFast));
    let quotes = Arc::new(FixedQuotes::from_prices([("SYM", Decimal::from(250))]));
    let trading = TradingDesk::new(ledger, quotes, "₹");

    let err = trading
        .buy(EMAIL, BuyOrder::new("SYM", 1, Decimal::ZERO))
        .await
        .unwrap_err();
    assert!(matches!(err, TradeError::Store(StoreError::Io(_))));
    assert_eq!(store.0.document().await, Some(before));
}

#[tokio::test]
async fn unavailable_quote_service_rejects_buy() {
    let desk = desk_with_user().await;
    let before = desk.store.document().await;
    let ledger = Arc::new(Ledger::new(desk.store.clone(), CorruptPolicy::FailFast));
    let trading = TradingDesk::new(ledger, Arc::new(DownQuotes), "₹");

    let err = trading
        .buy(EMAIL, BuyOrder::new("SYM", 1, Decimal::ZERO))
        .await
        .unwrap_err();
    assert!(matches!(err, TradeError::QuoteUnavailable));
    assert_eq!(desk.store.document().await, before);
}

#[tokio::test]
async fn overflowing_share_count_is_rejected() {
    let desk = desk_with_user().await;
    desk.quotes.set_price("DUST", Decimal::new(1, 20)).await;
    desk.trading
        .buy(EMAIL, BuyOrder::new("DUST", u64::MAX, Decimal::ZERO))
        .await
        .unwrap();
    let before = desk.store.document().await;

    let err = desk
        .trading
        .buy(EMAIL, BuyOrder::new("DUST", 1, Decimal::ZERO))
        .await
        .unwrap_err();
    assert!(matches!(err, TradeError::PositionTooLarge));
    assert_eq!(desk.store.document().await, before);
    let users = table(&desk.store).await;
    assert_eq!(users[EMAIL].portfolio["DUST"].shares, u64::MAX);
    assert_eq!(users[EMAIL].transactions.len(), 1);
}

#[tokio::test]
async fn expired_sessions_do_not_accumulate() {
    let store = Arc::new(MemoryStore::new());
    let ledger = Arc::new(Ledger::new(store, CorruptPolicy::FailFast));
    let sessions = SessionStore::with_ttl(chrono::Duration::zero());
    let accounts = Accounts::new(
        ledger,
        sessions.clone(),
        b"test-jwt-secret".to_vec(),
        Decimal::from(100_000),
    );
    accounts.signup(EMAIL, "secret").await.unwrap();

    for _ in 0..50 {
        accounts.login(EMAIL, "secret").await.unwrap();
    }
    assert_eq!(sessions.len().await, 1);
}
