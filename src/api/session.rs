//! Session cookie handling and the request extractors that resolve sessions.

use axum::Json;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use axum_extra::headers::authorization::Bearer;
use axum_extra::headers::{Authorization, HeaderMapExt};
use uuid::Uuid;

use crate::api::routes::AppState;
use crate::auth;

pub const SESSION_COOKIE: &str = "session";

/// Authenticated identity for the current request.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub email: String,
    pub session_id: Uuid,
}

/// Same identity, but rejects with a JSON 401 instead of a login redirect.
#[derive(Debug, Clone)]
pub struct ApiUser(pub AuthUser);

/// Token from the `session` cookie, falling back to `Authorization: Bearer`.
pub fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    CookieJar::from_headers(headers)
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|token| !token.is_empty())
        .or_else(|| {
            headers
                .typed_get::<Authorization<Bearer>>()
                .map(|bearer| bearer.token().to_string())
        })
}

/// Resolve the request's identity. The token must verify, its session must
/// still be live, and the session must belong to the token's subject.
pub async fn resolve(state: &AppState, headers: &HeaderMap) -> Option<AuthUser> {
    let token = token_from_headers(headers)?;
    let claims = auth::decode_token(&state.jwt_secret, &token).ok()?;
    let email = state.sessions.email_for(claims.sid).await?;
    (email == claims.sub).then_some(AuthUser {
        email,
        session_id: claims.sid,
    })
}

pub fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build()
}

/// Jar with the session cookie removed. Path must match the one it was set with.
pub fn without_session_cookie(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(SESSION_COOKIE).path("/"))
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = Redirect;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        resolve(state, &parts.headers)
            .await
            .ok_or_else(|| Redirect::to("/login"))
    }
}

pub struct ApiUnauthorized;

impl IntoResponse for ApiUnauthorized {
    fn into_response(self) -> Response {
        (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({ "error": "Not logged in" })),
        )
            .into_response()
    }
}

impl FromRequestParts<AppState> for ApiUser {
    type Rejection = ApiUnauthorized;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        resolve(state, &parts.headers)
            .await
            .map(ApiUser)
            .ok_or(ApiUnauthorized)
    }
}
