//! Authentication handlers

use crate::models::*;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::{Duration, Utc};
use rand::RngCore;
use sha2::{Digest, Sha256};
use sqlx::PgPool;

use super::{log_activity, AppState};

/// Session cookie name
pub const SESSION_COOKIE: &str = "rp_session";

/// Rate limit: max login attempts per IP per hour
const MAX_LOGIN_ATTEMPTS: i64 = 10;

// =============================================================================
// Login / Logout
// =============================================================================

/// Log in with username and password; sets the session cookie.
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<LoginRequest>,
) -> impl IntoResponse {
    let client_ip = get_client_ip(&headers, &state.trusted_proxies);

    if !check_rate_limit(&state.pool, &client_ip, "login").await {
        return (
            StatusCode::TOO_MANY_REQUESTS,
            [(header::SET_COOKIE, "".to_string())],
            Json(ApiResponse::<Actor>::error(
                "Too many login attempts. Please try again later.",
            )),
        );
    }
    record_attempt(&state.pool, &client_ip, "login").await;

    let user = sqlx::query_as::<_, User>(
        "SELECT * FROM users WHERE username = $1 AND status = 'active'",
    )
    .bind(input.username.trim())
    .fetch_optional(&state.pool)
    .await;

    let user = match user {
        Ok(Some(u)) => u,
        Ok(None) | Err(_) => {
            // Don't reveal whether the username exists
            return (
                StatusCode::UNAUTHORIZED,
                [(header::SET_COOKIE, "".to_string())],
                Json(ApiResponse::error("Invalid username or password")),
            );
        }
    };

    let parsed_hash = match PasswordHash::new(&user.password_hash) {
        Ok(h) => h,
        Err(_) => {
            tracing::error!("Invalid password hash in database for user {}", user.username);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(header::SET_COOKIE, "".to_string())],
                Json(ApiResponse::error("Authentication error")),
            );
        }
    };

    if Argon2::default()
        .verify_password(input.password.as_bytes(), &parsed_hash)
        .is_err()
    {
        return (
            StatusCode::UNAUTHORIZED,
            [(header::SET_COOKIE, "".to_string())],
            Json(ApiResponse::error("Invalid username or password")),
        );
    }

    let token = generate_session_token();
    let token_hash = hash_token(&token);
    let expires_at = Utc::now() + Duration::hours(state.session_expiry_hours);

    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.chars().take(500).collect::<String>());

    let session_result = sqlx::query(
        r#"
        INSERT INTO sessions (user_id, token_hash, expires_at, ip_address, user_agent)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(user.id)
    .bind(&token_hash)
    .bind(expires_at)
    .bind(&client_ip)
    .bind(&user_agent)
    .execute(&state.pool)
    .await;

    if session_result.is_err() {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            [(header::SET_COOKIE, "".to_string())],
            Json(ApiResponse::error("Failed to create session")),
        );
    }

    let _ = sqlx::query("UPDATE users SET last_login_at = NOW() WHERE id = $1")
        .bind(user.id)
        .execute(&state.pool)
        .await;

    log_activity(
        &state.pool,
        Some(user.id),
        "login",
        &format!("{} logged in", user.username),
    )
    .await;

    let cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Strict; Max-Age={}",
        SESSION_COOKIE,
        token,
        state.session_expiry_hours * 3600
    );

    (
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(ApiResponse::success(user.actor())),
    )
}

/// Log out: delete the server-side session and clear the cookie.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    if let Some(token) = extract_session_token(&headers) {
        let token_hash = hash_token(&token);

        let session = sqlx::query_as::<_, Session>("SELECT * FROM sessions WHERE token_hash = $1")
            .bind(&token_hash)
            .fetch_optional(&state.pool)
            .await
            .ok()
            .flatten();

        let _ = sqlx::query("DELETE FROM sessions WHERE token_hash = $1")
            .bind(&token_hash)
            .execute(&state.pool)
            .await;

        if let Some(session) = session {
            log_activity(&state.pool, Some(session.user_id), "logout", "Logged out").await;
        }
    }

    let cookie = format!(
        "{}=; Path=/; HttpOnly; SameSite=Strict; Max-Age=0",
        SESSION_COOKIE
    );

    (
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(ApiResponse::success(())),
    )
}

/// Current actor profile from the session.
pub async fn me(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    match validate_session(&state.pool, &headers).await {
        Some(user) => (StatusCode::OK, Json(ApiResponse::success(user.actor()))),
        None => (
            StatusCode::UNAUTHORIZED,
            Json(ApiResponse::error("Not authenticated")),
        ),
    }
}

// =============================================================================
// Session Validation
// =============================================================================

/// Resolve a valid session from request headers to its active user.
pub async fn validate_session(pool: &PgPool, headers: &HeaderMap) -> Option<User> {
    let token = extract_session_token(headers)?;
    let token_hash = hash_token(&token);

    let session = sqlx::query_as::<_, Session>(
        "SELECT * FROM sessions WHERE token_hash = $1 AND expires_at > NOW()",
    )
    .bind(&token_hash)
    .fetch_optional(pool)
    .await
    .ok()??;

    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1 AND status = 'active'")
        .bind(session.user_id)
        .fetch_optional(pool)
        .await
        .ok()?
}

// =============================================================================
// Password Utilities
// =============================================================================

/// Hash a password using Argon2
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2.hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Create the bootstrap super admin when no active admin exists yet.
pub async fn ensure_bootstrap_admin(
    pool: &PgPool,
    username: &str,
    password: &str,
) -> Result<(), sqlx::Error> {
    let admin_count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM users WHERE role IN ('admin', 'super_admin') AND status = 'active'",
    )
    .fetch_one(pool)
    .await?;
    if admin_count > 0 {
        return Ok(());
    }

    let password_hash =
        hash_password(password).map_err(|e| sqlx::Error::Protocol(e.to_string()))?;

    sqlx::query(
        r#"
        INSERT INTO users (username, password_hash, name, role, campus)
        VALUES ($1, $2, 'System Administrator', 'super_admin', 'Main Campus')
        ON CONFLICT (username) DO NOTHING
        "#,
    )
    .bind(username)
    .bind(password_hash)
    .execute(pool)
    .await?;

    tracing::info!("Bootstrap super admin '{}' created", username);
    Ok(())
}

// =============================================================================
// Helper Functions
// =============================================================================

pub fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    let cookie_header = headers.get(header::COOKIE)?.to_str().ok()?;

    for cookie in cookie_header.split(';') {
        let cookie = cookie.trim();
        if let Some(value) = cookie.strip_prefix(&format!("{}=", SESSION_COOKIE)) {
            return Some(value.to_string());
        }
    }

    None
}

fn generate_session_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// Best client IP we can determine. X-Forwarded-For is only honored when
/// the operator has configured trusted proxies.
pub fn get_client_ip(headers: &HeaderMap, trusted_proxies: &[String]) -> String {
    if !trusted_proxies.is_empty() {
        if let Some(xff) = headers.get("x-forwarded-for") {
            if let Ok(xff_str) = xff.to_str() {
                if let Some(first_ip) = xff_str.split(',').next() {
                    let ip = first_ip.trim();
                    if !ip.is_empty() {
                        return ip.to_string();
                    }
                }
            }
        }
    }

    if let Some(real_ip) = headers.get("x-real-ip") {
        if let Ok(ip) = real_ip.to_str() {
            return ip.to_string();
        }
    }

    "unknown".to_string()
}

pub async fn check_rate_limit(pool: &PgPool, ip: &str, endpoint: &str) -> bool {
    let count: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM rate_limit_attempts
        WHERE ip_address = $1 AND endpoint = $2
        AND attempted_at > NOW() - INTERVAL '1 hour'
        "#,
    )
    .bind(ip)
    .bind(endpoint)
    .fetch_one(pool)
    .await
    .unwrap_or(0);

    count < MAX_LOGIN_ATTEMPTS
}

pub async fn record_attempt(pool: &PgPool, ip: &str, endpoint: &str) {
    let _ = sqlx::query("INSERT INTO rate_limit_attempts (ip_address, endpoint) VALUES ($1, $2)")
        .bind(ip)
        .bind(endpoint)
        .execute(pool)
        .await;
}
