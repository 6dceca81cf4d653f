//! HTML form handlers.

use axum::Form;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use tracing::{error, warn};

use crate::accounts::AuthError;
use crate::api::error::internal_error;
use crate::api::routes::AppState;
use crate::api::session::{self, AuthUser};
use crate::api::views::{self, QuoteView};
use crate::quotes::QuoteError;
use crate::trading::{BuyOrder, TradeError};

#[derive(Debug, Deserialize)]
pub struct CredentialsForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchForm {
    pub search: Option<String>,
    #[serde(default)]
    pub symbol: String,
}

#[derive(Debug, Deserialize)]
pub struct BuyForm {
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub shares: String,
    #[serde(default)]
    pub stop_loss: String,
}

pub async fn index(State(state): State<AppState>, headers: HeaderMap) -> Redirect {
    match session::resolve(&state, &headers).await {
        Some(_) => Redirect::to("/dashboard"),
        None => Redirect::to("/login"),
    }
}

pub async fn signup_form() -> Html<String> {
    Html(views::signup_page(None))
}

pub async fn signup(State(state): State<AppState>, Form(form): Form<CredentialsForm>) -> Response {
    match state.accounts.signup(&form.email, &form.password).await {
        Ok(_) => Redirect::to("/login").into_response(),
        Err(e @ (AuthError::MissingField | AuthError::AlreadyExists)) => {
            let status = match e {
                AuthError::AlreadyExists => StatusCode::CONFLICT,
                _ => StatusCode::BAD_REQUEST,
            };
            (status, Html(views::signup_page(Some(&e.to_string())))).into_response()
        }
        Err(e) => {
            error!(error = %e, "signup failed");
            internal_error()
        }
    }
}

pub async fn login_form() -> Html<String> {
    Html(views::login_page(None))
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<CredentialsForm>,
) -> Response {
    match state.accounts.login(&form.email, &form.password).await {
        Ok(login) => (
            jar.add(session::session_cookie(login.token, state.secure_cookies)),
            Redirect::to("/dashboard"),
        )
            .into_response(),
        Err(e @ AuthError::InvalidCredentials) => (
            StatusCode::UNAUTHORIZED,
            Html(views::login_page(Some(&e.to_string()))),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "login failed");
            internal_error()
        }
    }
}

pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
    headers: HeaderMap,
) -> Response {
    if let Some(user) = session::resolve(&state, &headers).await {
        state.accounts.logout(user.session_id).await;
    }
    (session::without_session_cookie(jar), Redirect::to("/login")).into_response()
}

async fn render_dashboard(state: &AppState, user: &AuthUser, quote: Option<QuoteView>) -> Response {
    match state.accounts.summary(&user.email).await {
        Ok(Some(account)) => Html(views::dashboard_page(
            &account,
            state.trading.currency(),
            quote.as_ref(),
        ))
        .into_response(),
        Ok(None) => {
            warn!(email = %user.email, "session for missing account");
            state.accounts.logout(user.session_id).await;
            Redirect::to("/login").into_response()
        }
        Err(e) => {
            error!(error = %e, "failed to load dashboard");
            internal_error()
        }
    }
}

pub async fn dashboard(State(state): State<AppState>, user: AuthUser) -> Response {
    render_dashboard(&state, &user, None).await
}

/// POST /dashboard: a form carrying `search` also looks up `symbol`.
pub async fn dashboard_search(
    State(state): State<AppState>,
    user: AuthUser,
    Form(form): Form<SearchForm>,
) -> Response {
    let quote = match form.search {
        Some(_) => Some(match state.trading.quote(&form.symbol).await {
            Ok((symbol, price)) => QuoteView::Found { symbol, price },
            Err(QuoteError::NotFound(symbol)) => QuoteView::NotFound { symbol },
            Err(QuoteError::Unavailable(_)) => QuoteView::Unavailable {
                symbol: crate::quotes::normalize_symbol(&form.symbol),
            },
        }),
        None => None,
    };
    render_dashboard(&state, &user, quote).await
}

pub async fn buy(
    State(state): State<AppState>,
    user: AuthUser,
    Form(form): Form<BuyForm>,
) -> Response {
    let order = match BuyOrder::parse(&form.symbol, &form.shares, &form.stop_loss) {
        Ok(order) => order,
        Err(e) => return e.into_response(),
    };
    match state.trading.buy(&user.email, order).await {
        Ok(_) => Redirect::to("/dashboard").into_response(),
        Err(e @ TradeError::UnknownAccount) => {
            warn!(email = %user.email, "session for missing account");
            state.accounts.logout(user.session_id).await;
            e.into_response()
        }
        Err(e) => e.into_response(),
    }
}
