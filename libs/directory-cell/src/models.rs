use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Professional record as served by the directory service. The scheduling
/// core only reads the liveness flag and the listed price; the rest is
/// carried for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Professional {
    pub id: Uuid,
    pub display_name: String,
    pub profession: Option<String>,
    pub is_active: bool,
    pub listed_price: Option<Decimal>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}
