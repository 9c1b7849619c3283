use std::sync::Arc;

use argon2::Argon2;
use argon2::password_hash::{
    PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng,
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::config::Config;
use crate::errors::AppError;
use crate::models::Admin;
use crate::store::Store;

const SECONDS_PER_DAY: i64 = 86_400;

/// JWT claims carried by an admin bearer token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Admin id
    pub sub: String,
    pub email: String,
    pub role: String,
    pub iat: i64,
    pub exp: i64,
}

/// Authentication gate for the admin surface.
///
/// Every failure mode collapses to `AppError::Unauthorized` so callers
/// cannot distinguish which check failed.
pub struct AuthService {
    store: Arc<Store>,
    secret: String,
    token_ttl_days: i64,
}

impl AuthService {
    /// Create a new authentication service
    pub fn new(store: Arc<Store>, config: &Config) -> Self {
        Self {
            store,
            secret: config.jwt_secret.clone(),
            token_ttl_days: config.token_ttl_days,
        }
    }

    /// Verify credentials, stamp the last login, and issue a token
    pub fn login(&self, email: &str, password: &str) -> Result<(String, Admin), AppError> {
        let admin = self
            .store
            .read_admins(|admins| {
                admins
                    .values()
                    .find(|a| a.email.eq_ignore_ascii_case(email.trim()))
                    .cloned()
            })
            .ok_or_else(|| {
                debug!("Login attempt for unknown account");
                AppError::Unauthorized
            })?;

        if !admin.is_active {
            warn!("Login attempt for inactive account {}", admin.email);
            return Err(AppError::Unauthorized);
        }
        if !Self::verify_password(password, &admin.password_hash)? {
            warn!("Failed login for {}", admin.email);
            return Err(AppError::Unauthorized);
        }

        let now = OffsetDateTime::now_utc();
        let admin = self
            .store
            .write_admins(|admins| {
                admins.get_mut(&admin.id).map(|a| {
                    a.last_login_at = Some(now);
                    a.updated_at = now;
                    a.clone()
                })
            })?
            .unwrap_or(admin);

        let token = self.issue_token(&admin)?;
        info!("Admin {} logged in", admin.email);
        Ok((token, admin))
    }

    /// Issue a signed token for the given principal
    pub fn issue_token(&self, admin: &Admin) -> Result<String, AppError> {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        let claims = Claims {
            sub: admin.id.to_string(),
            email: admin.email.clone(),
            role: admin.role.clone(),
            iat: now,
            exp: now + self.token_ttl_days * SECONDS_PER_DAY,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| {
            warn!("Token encoding failed: {e}");
            AppError::Unauthorized
        })
    }

    /// Verify a bearer token and resolve its principal.
    ///
    /// Rejects expired or tampered tokens and missing or inactive admins.
    pub fn verify(&self, token: &str) -> Result<Admin, AppError> {
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| {
            debug!("Token rejected: {e}");
            AppError::Unauthorized
        })?;

        let id = Uuid::parse_str(&data.claims.sub).map_err(|_| AppError::Unauthorized)?;
        let admin = self
            .store
            .read_admins(|admins| admins.get(&id).cloned())
            .ok_or(AppError::Unauthorized)?;
        if !admin.is_active {
            warn!("Token presented for inactive account {}", admin.email);
            return Err(AppError::Unauthorized);
        }
        Ok(admin)
    }

    /// Create the configured admin account if no account uses its email yet
    pub fn ensure_bootstrap_admin(&self, email: &str, password: &str) -> Result<(), AppError> {
        let exists = self
            .store
            .read_admins(|admins| admins.values().any(|a| a.email.eq_ignore_ascii_case(email)));
        if exists {
            return Ok(());
        }

        let now = OffsetDateTime::now_utc();
        let admin = Admin {
            id: Uuid::new_v4(),
            email: email.to_lowercase(),
            password_hash: Self::hash_password(password)?,
            role: "admin".to_string(),
            is_active: true,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        };
        self.store.write_admins(|admins| {
            admins.insert(admin.id, admin.clone());
        })?;
        info!("Bootstrapped admin account {}", admin.email);
        Ok(())
    }

    /// Hash a password into a PHC string
    pub fn hash_password(password: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AppError::Internal(format!("password hashing failed: {e}")))
    }

    fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
        let parsed = PasswordHash::new(hash)
            .map_err(|e| AppError::Internal(format!("stored hash is malformed: {e}")))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }
}
