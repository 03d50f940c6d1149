/**
 * Authentication Routes
 * JWT login for site accounts, token verification and per-handler capability checks
 */
use axum::{
    extract::{ConnectInfo, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

use crate::accounts::{normalize_email, verify_password, Capability};
use crate::db::models::{Account, AccountInfo};
use crate::routes::{api_error, ApiError};
use crate::AppState;

/// Access token expiry in minutes
const ACCESS_TOKEN_EXPIRY_MINUTES: i64 = 60;

// ============================================================================
// Types
// ============================================================================

/// JWT Claims structure
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,   // Account id
    pub email: String, // Account email
    pub exp: i64,      // Expiry timestamp
    pub iat: i64,      // Issued at timestamp
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub success: bool,
    pub account: Option<AccountInfo>,
    pub access_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl LoginResponse {
    fn failed(status: StatusCode, error: &str) -> (StatusCode, Json<LoginResponse>) {
        (
            status,
            Json(LoginResponse {
                success: false,
                account: None,
                access_token: None,
                error: Some(error.to_string()),
            }),
        )
    }
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResponse {
    pub success: bool,
    pub is_valid: bool,
    pub claims: Option<Claims>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Create access token
pub fn create_access_token(
    account: &Account,
    secret: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let exp = now + Duration::minutes(ACCESS_TOKEN_EXPIRY_MINUTES);

    let claims = Claims {
        sub: account.id.to_string(),
        email: account.email.clone(),
        exp: exp.timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Verify and decode access token
pub fn verify_access_token(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(token_data.claims)
}

/// Extract bearer token from Authorization header
fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

/// Resolve the caller from its bearer token and require `capability`.
///
/// The account is reloaded on every call, so deactivation and role changes take
/// effect without waiting for the token to expire.
pub async fn authorize(
    state: &AppState,
    headers: &HeaderMap,
    capability: Capability,
) -> Result<Account, ApiError> {
    let token = extract_bearer_token(headers)
        .ok_or_else(|| api_error(StatusCode::UNAUTHORIZED, "Missing authorization token"))?;

    let claims = verify_access_token(token, &state.config.jwt_secret).map_err(|e| {
        tracing::debug!("Token verification failed: {}", e);
        api_error(StatusCode::UNAUTHORIZED, "Invalid or expired token")
    })?;

    let id: i64 = claims
        .sub
        .parse()
        .map_err(|_| api_error(StatusCode::UNAUTHORIZED, "Invalid or expired token"))?;

    let account = state
        .store
        .get_account(id)
        .await
        .map_err(crate::routes::store_api_error)?
        .ok_or_else(|| api_error(StatusCode::UNAUTHORIZED, "Unknown account"))?;

    if !account.can(capability) {
        tracing::warn!(
            account = account.id,
            ?capability,
            "capability check denied"
        );
        return Err(api_error(
            StatusCode::FORBIDDEN,
            "You do not have permission to perform this action",
        ));
    }

    Ok(account)
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/auth/login
/// Authenticate an account and return an access token
pub async fn login(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(payload): Json<LoginRequest>,
) -> impl IntoResponse {
    if !state.login_limiter.check(addr.ip()).await {
        return LoginResponse::failed(
            StatusCode::TOO_MANY_REQUESTS,
            "Too many requests. Please try again later.",
        );
    }

    // Validate request
    if payload.email.trim().is_empty() || payload.password.is_empty() {
        return LoginResponse::failed(StatusCode::BAD_REQUEST, "Email and password are required");
    }

    if !payload.email.contains('@') {
        return LoginResponse::failed(StatusCode::BAD_REQUEST, "Invalid email format");
    }

    let email = normalize_email(&payload.email);
    let account = match state.store.find_account_by_email(&email).await {
        Ok(Some(account)) => account,
        Ok(None) => {
            tracing::warn!("Login attempt for unknown account: {}", email);
            return LoginResponse::failed(StatusCode::UNAUTHORIZED, "Invalid credentials");
        }
        Err(e) => {
            tracing::error!("Database error during login: {}", e);
            return LoginResponse::failed(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Authentication service temporarily unavailable.",
            );
        }
    };

    // bcrypt is CPU-bound; verify_password runs it on a blocking thread.
    if !verify_password(payload.password, account.password_hash.clone()).await {
        tracing::warn!("Failed login attempt for: {}", email);
        return LoginResponse::failed(StatusCode::UNAUTHORIZED, "Invalid credentials");
    }

    if !account.is_active {
        return LoginResponse::failed(StatusCode::FORBIDDEN, "Account is disabled.");
    }

    let access_token = match create_access_token(&account, &state.config.jwt_secret) {
        Ok(token) => token,
        Err(e) => {
            tracing::error!("Failed to create access token: {}", e);
            return LoginResponse::failed(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to create token",
            );
        }
    };

    tracing::info!("Successful login for account: {}", account.email);

    (
        StatusCode::OK,
        Json(LoginResponse {
            success: true,
            account: Some(AccountInfo::from(&account)),
            access_token: Some(access_token),
            error: None,
        }),
    )
}

/// POST /api/auth/verify
/// Verify an access token and return its claims
pub async fn verify_token(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    let Some(token) = extract_bearer_token(&headers) else {
        return (
            StatusCode::OK,
            Json(VerifyResponse {
                success: false,
                is_valid: false,
                claims: None,
                error: Some("No authorization token provided".to_string()),
            }),
        );
    };

    match verify_access_token(token, &state.config.jwt_secret) {
        Ok(claims) => (
            StatusCode::OK,
            Json(VerifyResponse {
                success: true,
                is_valid: true,
                claims: Some(claims),
                error: None,
            }),
        ),
        Err(e) => {
            tracing::debug!("Token verification failed: {}", e);
            (
                StatusCode::OK,
                Json(VerifyResponse {
                    success: false,
                    is_valid: false,
                    claims: None,
                    error: Some("Invalid or expired token".to_string()),
                }),
            )
        }
    }
}
