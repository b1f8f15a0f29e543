use std::convert::Infallible;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap, HeaderValue},
};
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "screener_session";

/// The browser's session id, read from the `screener_session` cookie.
/// A missing or malformed cookie yields a fresh id, so extraction never fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionId(pub Uuid);

impl SessionId {
    /// `Set-Cookie` value that (re)issues this id for `max_age_secs`.
    pub fn cookie_header(&self, max_age_secs: u64) -> HeaderValue {
        let cookie = format!(
            "{SESSION_COOKIE}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age_secs}",
            self.0
        );
        // uuid and integer formatting only produce visible ASCII
        HeaderValue::from_str(&cookie).unwrap_or_else(|_| HeaderValue::from_static(""))
    }
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for SessionId {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(SessionId(
            session_from_headers(&parts.headers).unwrap_or_else(Uuid::new_v4),
        ))
    }
}

fn session_from_headers(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| Uuid::parse_str(value.trim()).ok())
}
