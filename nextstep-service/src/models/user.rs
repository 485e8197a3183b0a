//! User identity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserIdentityStatus {
    Active,
    Blocked,
    Removed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserIdentity {
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<String>,
    pub status: UserIdentityStatus,
    pub timestamp_created: DateTime<Utc>,
}

impl UserIdentity {
    pub fn new(user_id: String, organization_id: Option<String>) -> Self {
        Self {
            user_id,
            organization_id,
            status: UserIdentityStatus::Active,
            timestamp_created: Utc::now(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == UserIdentityStatus::Active
    }
}
