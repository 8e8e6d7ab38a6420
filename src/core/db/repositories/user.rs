//! User repository for database operations
//!
//! Provides account storage with password hashing using bcrypt.

use sqlx::PgPool;
use uuid::Uuid;

use crate::core::db::models::User;

/// Cost factor for bcrypt hashing
const BCRYPT_COST: u32 = 10;

/// User repository error types
#[derive(Debug, thiserror::Error)]
pub enum UserRepositoryError {
    #[error("Email already exists")]
    EmailAlreadyExists,

    #[error("Password hashing failed: {0}")]
    HashingError(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

/// User repository for database operations
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Hash a password using bcrypt with automatic salt generation
    pub fn hash_password(password: &str) -> Result<String, UserRepositoryError> {
        bcrypt::hash(password, BCRYPT_COST)
            .map_err(|e| UserRepositoryError::HashingError(e.to_string()))
    }

    /// Verify a password against a bcrypt hash
    pub fn verify_password(password: &str, hash: &str) -> Result<bool, UserRepositoryError> {
        bcrypt::verify(password, hash).map_err(|e| UserRepositoryError::HashingError(e.to_string()))
    }

    /// Create a new user with a plain text password (will be hashed)
    pub async fn create(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<User, UserRepositoryError> {
        if self.find_by_email(email).await?.is_some() {
            return Err(UserRepositoryError::EmailAlreadyExists);
        }

        let password_hash = Self::hash_password(password)?;

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, name, email, password_hash, created_at, updated_at
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(&password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            // Lost a race with a concurrent registration for the same email
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                UserRepositoryError::EmailAlreadyExists
            }
            other => UserRepositoryError::DatabaseError(other),
        })?;

        Ok(user)
    }

    /// Find a user by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, UserRepositoryError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Find a user by email
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserRepositoryError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Authenticate a user by email and password
    /// Returns the user if credentials are valid, None otherwise
    pub async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<User>, UserRepositoryError> {
        let user = match self.find_by_email(email).await? {
            Some(u) => u,
            None => return Ok(None),
        };

        let is_valid = Self::verify_password(password, &user.password_hash)?;

        if is_valid { Ok(Some(user)) } else { Ok(None) }
    }
}
