//! Organization model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Organization {
    pub organization_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name_key: Option<String>,
    pub is_default: bool,
    pub order_number: u32,
    pub timestamp_created: DateTime<Utc>,
}
