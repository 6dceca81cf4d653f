//! Signup, login and logout over the ledger and the session table.
//! Testable without HTTP.

use std::sync::Arc;

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::{self, SessionStore};
use crate::persistence::{Ledger, StoreError};
use crate::types::user::{AccountSummary, UserRecord};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Email and password are required.")]
    MissingField,
    #[error("Email already exists.")]
    AlreadyExists,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("failed to hash password: {0}")]
    Hash(String),
    #[error("failed to issue session token: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Outcome of a successful login.
#[derive(Debug, Clone)]
pub struct LoginSession {
    pub email: String,
    pub session_id: Uuid,
    pub token: String,
}

/// Emails are keys: trimmed and lower-cased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub struct Accounts {
    ledger: Arc<Ledger>,
    sessions: SessionStore,
    jwt_secret: Vec<u8>,
    starting_balance: Decimal,
}

impl Accounts {
    pub fn new(
        ledger: Arc<Ledger>,
        sessions: SessionStore,
        jwt_secret: Vec<u8>,
        starting_balance: Decimal,
    ) -> Self {
        Self {
            ledger,
            sessions,
            jwt_secret,
            starting_balance,
        }
    }

    /// Create an account with the starting balance. Returns the normalized
    /// email. A second signup for the same email never touches the first.
    pub async fn signup(&self, email: &str, password: &str) -> Result<String, AuthError> {
        let email = normalize_email(email);
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::MissingField);
        }

        let password = password.to_string();
        let password_hash = tokio::task::spawn_blocking(move || auth::hash_password(&password))
            .await
            .map_err(|e| AuthError::Hash(e.to_string()))?
            .map_err(|e| AuthError::Hash(e.to_string()))?;

        let starting_balance = self.starting_balance;
        self.ledger
            .update(|users| {
                if users.contains_key(&email) {
                    return Err(AuthError::AlreadyExists);
                }
                users.insert(email.clone(), UserRecord::new(password_hash, starting_balance));
                Ok(())
            })
            .await
            .inspect_err(|e| {
                if matches!(e, AuthError::AlreadyExists) {
                    warn!(email = %email, "signup for existing email");
                }
            })?;

        info!(email = %email, "account created");
        Ok(email)
    }

    /// Verify credentials and open a session.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginSession, AuthError> {
        let email = normalize_email(email);
        let stored_hash = self
            .ledger
            .read()
            .await?
            .remove(&email)
            .map(|user| user.password_hash);
        let password = password.to_string();
        let verified = tokio::task::spawn_blocking(move || {
            stored_hash.is_some_and(|hash| auth::verify_password(&password, &hash))
        })
        .await
        .map_err(|e| AuthError::Hash(e.to_string()))?;
        if !verified {
            warn!(email = %email, "rejected login");
            return Err(AuthError::InvalidCredentials);
        }

        let (session_id, expires_at) = self.sessions.open(&email).await;
        let token = auth::create_token(&self.jwt_secret, &email, session_id, expires_at);
        let token = match token {
            Ok(token) => token,
            Err(e) => {
                self.sessions.close(session_id).await;
                return Err(e.into());
            }
        };
        info!(email = %email, "logged in");
        Ok(LoginSession {
            email,
            session_id,
            token,
        })
    }

    pub async fn logout(&self, session_id: Uuid) {
        self.sessions.close(session_id).await;
    }

    /// Balance, holdings and transaction log for `email`, if the account exists.
    pub async fn summary(&self, email: &str) -> Result<Option<AccountSummary>, StoreError> {
        let users = self.ledger.read().await?;
        Ok(users
            .get(email)
            .map(|record| AccountSummary::from_record(email, record)))
    }
}
