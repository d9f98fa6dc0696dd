use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{request::Parts, HeaderMap},
};
use base64::{engine::general_purpose, Engine as _};
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::domain::models::User;
use crate::error::ApiError;
use crate::state::SharedState;

type HmacSha256 = Hmac<Sha256>;

pub const SESSION_TTL_DAYS: i64 = 7;

#[derive(Debug, Clone)]
pub struct SessionClaims {
    pub user_id: i64,
    pub exp: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("invalid token format")]
    Invalid,
    #[error("signature mismatch")]
    Signature,
    #[error("expired")]
    Expired,
}

fn sign_payload(user_id: i64, exp: i64, key: &[u8]) -> Result<String, SessionError> {
    let nonce: String = (0..8).map(|_| format!("{:02x}", rand::random::<u8>())).collect();
    let payload = format!("{user_id}|{exp}|{nonce}");
    let mut mac = HmacSha256::new_from_slice(key).map_err(|_| SessionError::Invalid)?;
    mac.update(payload.as_bytes());
    let sig = mac.finalize().into_bytes();
    Ok(format!(
        "{}.{}",
        general_purpose::STANDARD.encode(payload.as_bytes()),
        general_purpose::STANDARD.encode(sig)
    ))
}

/// Signs a fresh session token. Returns the token together with its expiry
/// so the caller can persist the session row.
pub fn issue_token(user_id: i64, key: &[u8]) -> Result<(String, DateTime<Utc>), SessionError> {
    let expires_at = Utc::now() + Duration::days(SESSION_TTL_DAYS);
    let token = sign_payload(user_id, expires_at.timestamp(), key)?;
    Ok((token, expires_at))
}

pub fn verify_token(token: &str, key: &[u8]) -> Result<SessionClaims, SessionError> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 2 {
        return Err(SessionError::Invalid);
    }
    let payload_bytes = general_purpose::STANDARD
        .decode(parts[0])
        .map_err(|_| SessionError::Invalid)?;
    let sig_bytes = general_purpose::STANDARD
        .decode(parts[1])
        .map_err(|_| SessionError::Invalid)?;

    let mut mac = HmacSha256::new_from_slice(key).map_err(|_| SessionError::Invalid)?;
    mac.update(&payload_bytes);
    mac.verify_slice(&sig_bytes)
        .map_err(|_| SessionError::Signature)?;

    let payload = String::from_utf8(payload_bytes).map_err(|_| SessionError::Invalid)?;
    let pieces: Vec<&str> = payload.split('|').collect();
    if pieces.len() != 3 {
        return Err(SessionError::Invalid);
    }
    let user_id: i64 = pieces[0].parse().map_err(|_| SessionError::Invalid)?;
    let exp: i64 = pieces[1].parse().map_err(|_| SessionError::Invalid)?;
    if Utc::now().timestamp() > exp {
        return Err(SessionError::Expired);
    }
    Ok(SessionClaims { user_id, exp })
}

pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    let auth = headers.get(axum::http::header::AUTHORIZATION)?;
    let val = auth.to_str().ok()?;
    let bearer = val.strip_prefix("Bearer ")?;
    Some(bearer.trim().to_string())
}

/// Axum extractor that validates the bearer token and loads the user.
///
/// Usage:
/// ```rust,ignore
/// async fn handler(AuthedUser(user): AuthedUser) -> ApiResult<...> {
///     // user is the authenticated account
/// }
/// ```
pub struct AuthedUser(pub User);

#[async_trait]
impl<S> FromRequestParts<S> for AuthedUser
where
    S: Send + Sync,
    SharedState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let shared = SharedState::from_ref(state);

        let token = extract_token(&parts.headers)
            .ok_or_else(|| ApiError::auth("Authentication required"))?;

        let claims = verify_token(&token, &shared.session_key).map_err(|e| {
            tracing::warn!("Session verification failed: {}", e);
            ApiError::auth("Invalid or expired session")
        })?;

        let user = shared
            .store
            .find_user_by_id(claims.user_id)
            .await
            .map_err(|e| {
                tracing::warn!("User lookup failed for session: {}", e);
                ApiError::auth("Invalid or expired session")
            })?;

        let Some(user) = user else {
            return Err(ApiError::auth("Invalid or expired session"));
        };

        if !user.is_active {
            return Err(ApiError::auth("Invalid or expired session"));
        }

        Ok(AuthedUser(user))
    }
}

/// Like [`AuthedUser`] but additionally requires the admin flag.
pub struct AdminUser(pub User);

#[async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
    SharedState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthedUser(user) = AuthedUser::from_request_parts(parts, state).await?;
        if !user.is_admin {
            return Err(ApiError::Forbidden(
                "Access denied. Admin privileges required.".to_string(),
            ));
        }
        Ok(AdminUser(user))
    }
}

/// User-scoped routes take the target user id in the path; the session must
/// belong to that user unless it belongs to an admin.
pub fn ensure_owner(user: &User, user_id: i64) -> Result<(), ApiError> {
    if user.id != user_id && !user.is_admin {
        return Err(ApiError::auth("Session does not match user"));
    }
    Ok(())
}
