use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub stock: i64,
    pub seller_id: String,
    pub active: bool,

    pub updated_at: i64,

    // bumped on every stock write, checked by the reservation commit
    pub version: u64,
}
