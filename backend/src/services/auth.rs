//! Authentication service for signup, login and token handling

use std::sync::OnceLock;

use bcrypt::{hash, verify};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use shared::PublicUser;

use crate::config::{AuthConfig, JwtConfig};
use crate::error::{AppError, AppResult};

/// Stored credential; only [`PublicUser`] fields ever leave the service
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CredentialRecord {
    pub id: Uuid,
    pub name: String,
    pub email_or_phone: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl CredentialRecord {
    pub fn public(&self) -> PublicUser {
        PublicUser {
            id: self.id,
            name: self.name.clone(),
            email_or_phone: self.email_or_phone.clone(),
        }
    }
}

#[axum::async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find(&self, email_or_phone: &str) -> AppResult<Option<CredentialRecord>>;

    /// Insert a new record; `false` when the identifier is already taken
    async fn insert(&self, record: &CredentialRecord) -> AppResult<bool>;
}

#[derive(Clone)]
pub struct PgCredentialStore {
    db: PgPool,
}

impl PgCredentialStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[axum::async_trait]
impl CredentialStore for PgCredentialStore {
    async fn find(&self, email_or_phone: &str) -> AppResult<Option<CredentialRecord>> {
        let user = sqlx::query_as::<_, CredentialRecord>(
            r#"
            SELECT id, name, email_or_phone, password_hash, created_at
            FROM users
            WHERE email_or_phone = $1
            "#,
        )
        .bind(email_or_phone)
        .fetch_optional(&self.db)
        .await?;

        Ok(user)
    }

    async fn insert(&self, record: &CredentialRecord) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (id, name, email_or_phone, password_hash, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (email_or_phone) DO NOTHING
            "#,
        )
        .bind(record.id)
        .bind(&record.name)
        .bind(&record.email_or_phone)
        .bind(&record.password_hash)
        .bind(record.created_at)
        .execute(&self.db)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // User ID
    pub name: String,
    pub exp: i64,
    pub iat: i64,
}

/// Decode and validate an access token
pub fn decode_token(token: &str, secret: &str) -> AppResult<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))
}

/// Authentication service
pub struct AuthService<C> {
    store: C,
    jwt_secret: String,
    access_token_expiry: i64,
    bcrypt_cost: u32,
    min_password_length: usize,
}

impl<C: CredentialStore> AuthService<C> {
    pub fn new(store: C, jwt: &JwtConfig, auth: &AuthConfig) -> Self {
        Self {
            store,
            jwt_secret: jwt.secret.clone(),
            access_token_expiry: jwt.access_token_expiry,
            bcrypt_cost: auth.bcrypt_cost,
            min_password_length: auth.min_password_length,
        }
    }

    /// Register a new user
    pub async fn signup(
        &self,
        name: &str,
        email_or_phone: &str,
        password: &str,
    ) -> AppResult<PublicUser> {
        shared::validate_signup(name, email_or_phone, password, self.min_password_length)?;
        let email_or_phone = email_or_phone.trim();

        if self.store.find(email_or_phone).await?.is_some() {
            return Err(AppError::UserExists);
        }

        let password_hash = hash(password, self.bcrypt_cost)
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?;

        let record = CredentialRecord {
            id: Uuid::new_v4(),
            name: name.trim().to_string(),
            email_or_phone: email_or_phone.to_string(),
            password_hash,
            created_at: Utc::now(),
        };

        // A concurrent signup can still win the race for the identifier
        if !self.store.insert(&record).await? {
            return Err(AppError::UserExists);
        }

        tracing::info!(user_id = %record.id, "User created");
        Ok(record.public())
    }

    /// Authenticate and issue an access token.
    ///
    /// Unknown identifiers and wrong passwords fail identically.
    pub async fn login(&self, email_or_phone: &str, password: &str) -> AppResult<(PublicUser, String)> {
        let Some(user) = self.store.find(email_or_phone.trim()).await? else {
            // Same bcrypt work as a wrong password
            if let Some(dummy) = dummy_hash(self.bcrypt_cost) {
                let _ = verify(password, dummy);
            }
            return Err(AppError::InvalidCredentials);
        };

        let valid = verify(password, &user.password_hash)
            .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))?;

        if !valid {
            tracing::debug!(user_id = %user.id, "Password mismatch");
            return Err(AppError::InvalidCredentials);
        }

        let token = self.issue_token(&user)?;
        Ok((user.public(), token))
    }

    fn issue_token(&self, user: &CredentialRecord) -> AppResult<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.to_string(),
            name: user.name.clone(),
            exp: (now + Duration::seconds(self.access_token_expiry)).timestamp(),
            iat: now.timestamp(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))
    }
}

/// Hash verified against when the identifier is unknown
fn dummy_hash(cost: u32) -> Option<&'static str> {
    static DUMMY: OnceLock<Option<String>> = OnceLock::new();
    DUMMY
        .get_or_init(|| hash("agrilens-unknown-account", cost).ok())
        .as_deref()
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::HashMap;

    use tokio::sync::RwLock;

    use super::*;

    #[derive(Default)]
    pub struct MemoryCredentialStore {
        users: RwLock<HashMap<String, CredentialRecord>>,
    }

    #[axum::async_trait]
    impl CredentialStore for MemoryCredentialStore {
        async fn find(&self, email_or_phone: &str) -> AppResult<Option<CredentialRecord>> {
            Ok(self.users.read().await.get(email_or_phone).cloned())
        }

        async fn insert(&self, record: &CredentialRecord) -> AppResult<bool> {
            let mut users = self.users.write().await;
            if users.contains_key(&record.email_or_phone) {
                return Ok(false);
            }
            users.insert(record.email_or_phone.clone(), record.clone());
            Ok(true)
        }
    }

    const SECRET: &str = "test-secret";

    fn service() -> AuthService<MemoryCredentialStore> {
        AuthService::new(
            MemoryCredentialStore::default(),
            &JwtConfig {
                secret: SECRET.to_string(),
                access_token_expiry: 3600,
            },
            &AuthConfig {
                bcrypt_cost: 4,
                min_password_length: 6,
            },
        )
    }

    #[tokio::test]
    async fn test_signup_then_login() {
        let auth = service();
        let user = auth.signup("Ravi", "ravi@example.com", "paddy123").await.unwrap();
        assert_eq!(user.email_or_phone, "ravi@example.com");

        let (logged_in, token) = auth.login("ravi@example.com", "paddy123").await.unwrap();
        assert_eq!(logged_in, user);

        let claims = decode_token(&token, SECRET).unwrap();
        assert_eq!(claims.sub, user.id.to_string());
        assert!(decode_token(&token, "other-secret").is_err());
    }

    #[tokio::test]
    async fn test_second_signup_conflicts() {
        let auth = service();
        auth.signup("Ravi", "9876543210", "paddy123").await.unwrap();
        let err = auth.signup("Someone", " 9876543210 ", "another1").await;
        assert!(matches!(err, Err(AppError::UserExists)));
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let auth = service();
        auth.signup("Ravi", "ravi@example.com", "paddy123").await.unwrap();

        let unknown = auth.login("nobody@example.com", "paddy123").await.unwrap_err();
        let wrong = auth.login("ravi@example.com", "wrong-password").await.unwrap_err();
        assert!(matches!(unknown, AppError::InvalidCredentials));
        assert!(matches!(wrong, AppError::InvalidCredentials));
        assert_eq!(unknown.to_string(), wrong.to_string());
    }

    #[tokio::test]
    async fn test_signup_validation() {
        let auth = service();
        match auth.signup("Ravi", "ravi@example.com", "abc").await {
            Err(AppError::Validation { field, .. }) => assert_eq!(field, "password"),
            other => panic!("expected validation error, got {:?}", other.map(|u| u.id)),
        }
        assert!(matches!(
            auth.signup("", "ravi@example.com", "paddy123").await,
            Err(AppError::Validation { .. })
        ));
    }

    #[tokio::test]
    async fn test_unknown_identifier_checks_a_dummy_hash() {
        let auth = service();
        let err = auth.login("nobody@example.com", "agrilens-unknown-account").await;
        assert!(matches!(err, Err(AppError::InvalidCredentials)));

        let dummy = dummy_hash(4).unwrap();
        assert!(dummy.starts_with("$2"));
        assert!(!verify("paddy123", dummy).unwrap());
    }
}
