//! Customer model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    /// Unique contact email, used by order list filtering and exports
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// Create customer request
#[derive(Debug, Clone, Deserialize)]
pub struct CustomerCreate {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

/// Update customer request (partial)
#[derive(Debug, Clone, Deserialize)]
pub struct CustomerUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
}
