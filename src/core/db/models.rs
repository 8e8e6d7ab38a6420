//! Database models for GadgetVault
//!
//! This module defines the database entity structs that map to PostgreSQL tables.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// ============================================================================
// User Model
// ============================================================================

/// User entity representing a registered user
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// User without sensitive data (for API responses)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
        }
    }
}

// ============================================================================
// Gadget Model
// ============================================================================

/// Lifecycle states of a gadget.
///
/// `Destroyed` is terminal: a destroyed gadget can no longer be updated,
/// decommissioned or destroyed again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "VARCHAR")]
pub enum GadgetStatus {
    Available,
    Deployed,
    Destroyed,
    Decommissioned,
}

impl GadgetStatus {
    /// Every status, in display order
    pub const ALL: [GadgetStatus; 4] = [
        GadgetStatus::Available,
        GadgetStatus::Deployed,
        GadgetStatus::Destroyed,
        GadgetStatus::Decommissioned,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GadgetStatus::Available => "Available",
            GadgetStatus::Deployed => "Deployed",
            GadgetStatus::Destroyed => "Destroyed",
            GadgetStatus::Decommissioned => "Decommissioned",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, GadgetStatus::Destroyed)
    }

    /// Comma separated list of all statuses (for error messages)
    pub fn allowed_values() -> String {
        Self::ALL
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl std::fmt::Display for GadgetStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for GadgetStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("Invalid status: {}", s))
    }
}

/// Timestamp column stamped alongside a status transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTimestamp {
    DecommissionedAt,
    DestroyedAt,
}

impl StatusTimestamp {
    /// Column name in the `gadgets` table
    pub fn column(&self) -> &'static str {
        match self {
            StatusTimestamp::DecommissionedAt => "decommissioned_at",
            StatusTimestamp::DestroyedAt => "destroyed_at",
        }
    }
}

/// Gadget entity
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Gadget {
    pub id: Uuid,
    pub name: String,
    pub status: GadgetStatus,
    pub owner_id: Option<Uuid>,
    pub decommissioned_at: Option<DateTime<Utc>>,
    pub destroyed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Gadget data for creation
#[derive(Debug, Clone)]
pub struct CreateGadget {
    pub name: String,
    pub owner_id: Option<Uuid>,
}

/// Gadget data for updates
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateGadget {
    pub name: Option<String>,
    pub status: Option<GadgetStatus>,
    /// None = don't touch, Some(None) = clear, Some(Some(ts)) = set
    pub decommissioned_at: Option<Option<DateTime<Utc>>>,
}

// ============================================================================
// Tests
// ============================================================================
