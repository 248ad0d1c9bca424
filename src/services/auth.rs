use std::sync::Arc;

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::Admin;
use crate::state::AppState;

const TOKEN_TTL_SECS: i64 = 24 * 60 * 60;

/// Claims carried in the admin session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminClaims {
    pub sub: String,
    pub email: String,
    pub name: String,
    pub role: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Minimal `local@domain.tld` shape check, nothing RFC-grade.
fn is_valid_email(email: &str) -> bool {
    let mut parts = email.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => {
            !local.is_empty()
                && !domain.is_empty()
                && !email.contains(char::is_whitespace)
                && domain.split('.').count() >= 2
                && domain.split('.').all(|p| !p.is_empty())
        }
        _ => false,
    }
}

/// Creates the one-and-only admin account. The singleton row constraint makes
/// concurrent signups safe: exactly one insert wins, the rest get a conflict.
pub fn signup(state: &Arc<AppState>, req: SignupRequest) -> Result<Admin, AppError> {
    let (email, password, name) = match (
        req.email.as_deref().map(str::trim).filter(|s| !s.is_empty()),
        req.password.as_deref().filter(|s| !s.is_empty()),
        req.name.as_deref().map(str::trim).filter(|s| !s.is_empty()),
    ) {
        (Some(email), Some(password), Some(name)) => (email, password, name),
        _ => {
            return Err(AppError::Validation(
                "Please provide email, password, and name".to_string(),
            ))
        }
    };

    if password.len() < 6 {
        return Err(AppError::Validation(
            "Password must be at least 6 characters long".to_string(),
        ));
    }

    if !is_valid_email(email) {
        return Err(AppError::Validation(
            "Please provide a valid email address".to_string(),
        ));
    }

    let password_hash = bcrypt::hash(password, bcrypt::DEFAULT_COST)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("password hashing failed: {e}")))?;

    let admin = Admin {
        id: Uuid::new_v4().to_string(),
        email: email.to_lowercase(),
        password_hash,
        name: name.to_string(),
        role: "superadmin".to_string(),
        active: true,
        created_at: Utc::now().naive_utc(),
    };

    let inserted = {
        let db = state.db.lock().unwrap();
        queries::create_admin(&db, &admin)?
    };

    if !inserted {
        return Err(AppError::Conflict(
            "Admin account already exists. Only one admin is allowed.".to_string(),
        ));
    }

    tracing::info!(email = %admin.email, "admin account created");
    Ok(admin)
}

/// Authenticates the admin and issues a 24-hour session token. The failure
/// message never reveals whether the email exists.
pub fn login(state: &Arc<AppState>, req: LoginRequest) -> Result<(String, Admin), AppError> {
    let (email, password) = match (
        req.email.as_deref().map(str::trim).filter(|s| !s.is_empty()),
        req.password.as_deref().filter(|s| !s.is_empty()),
    ) {
        (Some(email), Some(password)) => (email, password),
        _ => {
            return Err(AppError::Validation(
                "Please provide email and password".to_string(),
            ))
        }
    };

    let admin = {
        let db = state.db.lock().unwrap();
        queries::get_admin_by_email(&db, &email.to_lowercase())?
    };

    let Some(admin) = admin else {
        tracing::warn!(email = %email, "failed login attempt (unknown email)");
        return Err(AppError::Auth("Invalid email or password".to_string()));
    };

    if !admin.active {
        tracing::warn!(email = %email, "failed login attempt (account deactivated)");
        return Err(AppError::Auth(
            "Your account has been deactivated".to_string(),
        ));
    }

    let password_ok = bcrypt::verify(password, &admin.password_hash)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("password verification failed: {e}")))?;

    if !password_ok {
        tracing::warn!(email = %email, "failed login attempt (wrong password)");
        return Err(AppError::Auth("Invalid email or password".to_string()));
    }

    let token = issue_token(&state.config.jwt_secret, &admin)?;

    tracing::info!(email = %admin.email, "admin login successful");
    Ok((token, admin))
}

pub fn check_exists(state: &Arc<AppState>) -> Result<bool, AppError> {
    let db = state.db.lock().unwrap();
    Ok(queries::admin_exists(&db)?)
}

pub fn issue_token(secret: &str, admin: &Admin) -> Result<String, AppError> {
    let now = Utc::now().timestamp();
    let claims = AdminClaims {
        sub: admin.id.clone(),
        email: admin.email.clone(),
        name: admin.name.clone(),
        role: admin.role.clone(),
        iat: now,
        exp: now + TOKEN_TTL_SECS,
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!("failed to sign session token: {e}")))
}

/// Validates signature and expiry. There is no revocation list; logout is a
/// client-side token discard.
pub fn verify_token(secret: &str, token: &str) -> Result<AdminClaims, AppError> {
    decode::<AdminClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::Auth("Invalid or expired token".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_shape_check() {
        assert!(is_valid_email("admin@example.com"));
        assert!(is_valid_email("a.b@sub.example.co"));
        assert!(!is_valid_email("admin"));
        assert!(!is_valid_email("admin@"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("admin@example"));
        assert!(!is_valid_email("admin@example..com"));
        assert!(!is_valid_email("ad min@example.com"));
        assert!(!is_valid_email("admin@example.com@x.com"));
    }

    #[test]
    fn token_round_trip() {
        let admin = Admin {
            id: "admin-1".to_string(),
            email: "admin@example.com".to_string(),
            password_hash: String::new(),
            name: "Admin".to_string(),
            role: "superadmin".to_string(),
            active: true,
            created_at: Utc::now().naive_utc(),
        };

        let token = issue_token("secret", &admin).unwrap();
        let claims = verify_token("secret", &token).unwrap();
        assert_eq!(claims.sub, "admin-1");
        assert_eq!(claims.role, "superadmin");
        assert!(claims.exp - claims.iat == TOKEN_TTL_SECS);
    }

    #[test]
    fn token_rejects_wrong_secret_and_garbage() {
        let admin = Admin {
            id: "admin-1".to_string(),
            email: "admin@example.com".to_string(),
            password_hash: String::new(),
            name: "Admin".to_string(),
            role: "superadmin".to_string(),
            active: true,
            created_at: Utc::now().naive_utc(),
        };

        let token = issue_token("secret", &admin).unwrap();
        assert!(verify_token("other-secret", &token).is_err());
        assert!(verify_token("secret", "not-a-token").is_err());
    }
}
