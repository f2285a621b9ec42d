use async_trait::async_trait;
use thiserror::Error;

use crate::models::{EscrowStatus, Order, OrderStatus, Product, StatusEntry};

pub mod memory;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,
    #[error("version mismatch")]
    VersionMismatch,
}

#[derive(Debug, Clone, Default)]
pub struct OrderPatch {
    pub status: Option<OrderStatus>,
    pub tracking_number: Option<String>,
    pub proof_of_delivery: Option<String>,
    pub escrow_status: Option<EscrowStatus>,
    pub escrow_released_at: Option<i64>,
    pub history_entry: Option<StatusEntry>,
    pub updated_at: i64,
}

#[derive(Debug, Clone)]
pub struct ReservedLine {
    pub product_id: String,
    pub expected_version: u64,
    pub quantity: i64,
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn get(&self, order_id: &str) -> Result<Option<Order>, StoreError>;
    async fn put(&self, order: Order) -> Result<(), StoreError>;
    // applies the patch and bumps version in one step, or fails with
    // VersionMismatch when expected_version is stale
    async fn update(
        &self,
        order_id: &str,
        expected_version: u64,
        patch: OrderPatch,
    ) -> Result<Order, StoreError>;
    async fn list_by_buyer(&self, buyer_id: &str) -> Result<Vec<Order>, StoreError>;
    async fn list_by_seller(&self, seller_id: &str) -> Result<Vec<Order>, StoreError>;
}

#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn fetch(&self, product_id: &str) -> Result<Option<Product>, StoreError>;
    async fn put(&self, product: Product) -> Result<(), StoreError>;
    // applies every decrement or none, conditional on every line's version
    async fn commit_decrements(
        &self,
        lines: &[ReservedLine],
        updated_at: i64,
    ) -> Result<(), StoreError>;
}
