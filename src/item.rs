//! The catalog record entity and its construction.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single catalog record.
///
/// Every field is fixed at creation; the store exposes no mutation path, so
/// `updated_at` always equals `created_at` for now.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Unique, immutable identifier. Never reused.
    pub id: String,
    /// Caller-supplied title. Non-empty, enforced at the boundary.
    pub title: String,
    /// Caller-supplied description. Non-empty, enforced at the boundary.
    pub description: String,
    /// Opaque URL of the externally stored binary asset.
    pub image_url: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time. Equal to `created_at` at creation.
    pub updated_at: DateTime<Utc>,
}

/// The explicit create-input contract: three required text fields,
/// validated at the boundary before construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDraft {
    pub title: String,
    pub description: String,
    pub image_url: String,
}

impl Item {
    /// Builds a new item from a pre-validated draft.
    ///
    /// Assigns a freshly generated v4 UUID as the id and stamps both
    /// timestamps with the current time. Performs no validation and cannot
    /// fail.
    pub fn new(draft: ItemDraft) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            title: draft.title,
            description: draft.description,
            image_url: draft.image_url,
            created_at: now,
            updated_at: now,
        }
    }
}
