//! Gadget repository for database operations
//!
//! Plain CRUD over the `gadgets` table. Status transitions that carry a
//! timestamp go through [`GadgetRepository::update_status`], which is also the
//! item store used by the destruction coordinator.
//!
//! `update` and `decommission` never write a row that is already `Destroyed`,
//! so a request that read the gadget before a concurrent destruction cannot
//! bring it back.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::db::models::{CreateGadget, Gadget, GadgetStatus, StatusTimestamp, UpdateGadget};
use crate::core::destruction::{ItemStore, ItemStoreError};

const GADGET_COLUMNS: &str =
    "id, name, status, owner_id, decommissioned_at, destroyed_at, created_at, updated_at";

/// Gadget repository error types
#[derive(Debug, thiserror::Error)]
pub enum GadgetRepositoryError {
    #[error("Gadget not found")]
    NotFound,

    #[error("Gadget name must be unique")]
    NameAlreadyExists,

    #[error("Gadget is already destroyed")]
    AlreadyDestroyed,

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

impl GadgetRepositoryError {
    fn from_write(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                GadgetRepositoryError::NameAlreadyExists
            }
            other => GadgetRepositoryError::DatabaseError(other),
        }
    }
}

/// Gadget repository for database operations
#[derive(Clone)]
pub struct GadgetRepository {
    pool: PgPool,
}

impl GadgetRepository {
    /// Create a new gadget repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List gadgets, optionally only those with the given status
    pub async fn list(
        &self,
        status: Option<GadgetStatus>,
    ) -> Result<Vec<Gadget>, GadgetRepositoryError> {
        let gadgets = sqlx::query_as::<_, Gadget>(&format!(
            r#"
            SELECT {GADGET_COLUMNS}
            FROM gadgets
            WHERE $1::VARCHAR IS NULL OR status = $1
            ORDER BY created_at ASC
            "#
        ))
        .bind(status)
        .fetch_all(&self.pool)
        .await?;

        Ok(gadgets)
    }

    /// Create a gadget in the `Available` state
    pub async fn create(&self, dto: &CreateGadget) -> Result<Gadget, GadgetRepositoryError> {
        let gadget = sqlx::query_as::<_, Gadget>(&format!(
            r#"
            INSERT INTO gadgets (name, status, owner_id)
            VALUES ($1, $2, $3)
            RETURNING {GADGET_COLUMNS}
            "#
        ))
        .bind(&dto.name)
        .bind(GadgetStatus::Available)
        .bind(dto.owner_id)
        .fetch_one(&self.pool)
        .await
        .map_err(GadgetRepositoryError::from_write)?;

        Ok(gadget)
    }

    /// Find a gadget by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Gadget>, GadgetRepositoryError> {
        let gadget = sqlx::query_as::<_, Gadget>(&format!(
            "SELECT {GADGET_COLUMNS} FROM gadgets WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(gadget)
    }

    /// Find a gadget by its unique name
    pub async fn find_by_name(&self, name: &str) -> Result<Option<Gadget>, GadgetRepositoryError> {
        let gadget = sqlx::query_as::<_, Gadget>(&format!(
            "SELECT {GADGET_COLUMNS} FROM gadgets WHERE name = $1"
        ))
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(gadget)
    }

    /// Apply a partial update
    pub async fn update(
        &self,
        id: Uuid,
        updates: &UpdateGadget,
    ) -> Result<Gadget, GadgetRepositoryError> {
        let (touch_decommissioned, decommissioned_at) = match updates.decommissioned_at {
            Some(value) => (true, value),
            None => (false, None),
        };

        let updated = sqlx::query_as::<_, Gadget>(&format!(
            r#"
            UPDATE gadgets
            SET
                name = COALESCE($2, name),
                status = COALESCE($3, status),
                decommissioned_at = CASE WHEN $4 THEN $5 ELSE decommissioned_at END,
                updated_at = NOW()
            WHERE id = $1 AND status <> 'Destroyed'
            RETURNING {GADGET_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&updates.name)
        .bind(updates.status)
        .bind(touch_decommissioned)
        .bind(decommissioned_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(GadgetRepositoryError::from_write)?;

        match updated {
            Some(gadget) => Ok(gadget),
            None => Err(self.unwritable(id).await),
        }
    }

    /// Set a status and stamp the matching timestamp column.
    ///
    /// Returns `None` if the gadget does not exist. Transition legality is not checked here.
    pub async fn update_status(
        &self,
        id: Uuid,
        status: GadgetStatus,
        timestamp: StatusTimestamp,
        at: DateTime<Utc>,
    ) -> Result<Option<Gadget>, GadgetRepositoryError> {
        let gadget = sqlx::query_as::<_, Gadget>(&format!(
            r#"
            UPDATE gadgets
            SET status = $2, {column} = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING {GADGET_COLUMNS}
            "#,
            column = timestamp.column(),
        ))
        .bind(id)
        .bind(status)
        .bind(at)
        .fetch_optional(&self.pool)
        .await?;

        Ok(gadget)
    }

    /// Move a gadget to `Decommissioned`
    pub async fn decommission(
        &self,
        id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<Gadget, GadgetRepositoryError> {
        let updated = sqlx::query_as::<_, Gadget>(&format!(
            r#"
            UPDATE gadgets
            SET status = $2, decommissioned_at = $3, updated_at = NOW()
            WHERE id = $1 AND status <> 'Destroyed'
            RETURNING {GADGET_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(GadgetStatus::Decommissioned)
        .bind(at)
        .fetch_optional(&self.pool)
        .await?;

        match updated {
            Some(gadget) => Ok(gadget),
            None => Err(self.unwritable(id).await),
        }
    }

    /// Why a guarded write matched no row
    async fn unwritable(&self, id: Uuid) -> GadgetRepositoryError {
        match self.find_by_id(id).await {
            Ok(Some(_)) => GadgetRepositoryError::AlreadyDestroyed,
            Ok(None) => GadgetRepositoryError::NotFound,
            Err(e) => e,
        }
    }
}

#[async_trait]
impl ItemStore for GadgetRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Gadget>, ItemStoreError> {
        GadgetRepository::find_by_id(self, id)
            .await
            .map_err(|e| ItemStoreError(e.to_string()))
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: GadgetStatus,
        timestamp: StatusTimestamp,
        at: DateTime<Utc>,
    ) -> Result<Option<Gadget>, ItemStoreError> {
        GadgetRepository::update_status(self, id, status, timestamp, at)
            .await
            .map_err(|e| ItemStoreError(e.to_string()))
    }
}
