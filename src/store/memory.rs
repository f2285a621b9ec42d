use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::models::{Order, Product};

use super::{OrderPatch, OrderStore, ProductStore, ReservedLine, StoreError};

#[derive(Clone, Default)]
pub struct InMemoryOrderStore {
    inner: Arc<RwLock<OrderMap>>,
}

#[derive(Default)]
struct OrderMap {
    // order keyed by id, tagged with an insertion sequence so newest-first
    // listings stay stable when created_at ties
    orders: HashMap<String, (u64, Order)>,
    seq: u64,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn get(&self, order_id: &str) -> Result<Option<Order>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.orders.get(order_id).map(|(_, o)| o.clone()))
    }

    async fn put(&self, order: Order) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        inner.seq += 1;
        let seq = inner.seq;
        inner.orders.insert(order.id.clone(), (seq, order));
        Ok(())
    }

    async fn update(
        &self,
        order_id: &str,
        expected_version: u64,
        patch: OrderPatch,
    ) -> Result<Order, StoreError> {
        let mut inner = self.inner.write().await;
        let slot = inner.orders.get_mut(order_id).ok_or(StoreError::NotFound)?;
        let order = &mut slot.1;

        if order.version != expected_version {
            return Err(StoreError::VersionMismatch);
        }

        if let Some(status) = patch.status {
            order.status = status;
        }
        if let Some(tracking) = patch.tracking_number {
            order.tracking_number = Some(tracking);
        }
        if let Some(proof) = patch.proof_of_delivery {
            order.proof_of_delivery = Some(proof);
        }
        if let Some(escrow) = patch.escrow_status {
            order.escrow_status = escrow;
        }
        if let Some(at) = patch.escrow_released_at {
            order.escrow_released_at = Some(at);
        }
        if let Some(entry) = patch.history_entry {
            order.status_history.push(entry);
        }
        order.updated_at = patch.updated_at;
        order.version += 1;

        Ok(order.clone())
    }

    async fn list_by_buyer(&self, buyer_id: &str) -> Result<Vec<Order>, StoreError> {
        let inner = self.inner.read().await;
        let mut rows: Vec<(u64, Order)> = inner
            .orders
            .values()
            .filter(|(_, o)| o.buyer_id == buyer_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| (b.1.created_at, b.0).cmp(&(a.1.created_at, a.0)));
        Ok(rows.into_iter().map(|(_, o)| o).collect())
    }

    async fn list_by_seller(&self, seller_id: &str) -> Result<Vec<Order>, StoreError> {
        let inner = self.inner.read().await;
        let mut rows: Vec<(u64, Order)> = inner
            .orders
            .values()
            .filter(|(_, o)| o.seller_id == seller_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| (b.1.created_at, b.0).cmp(&(a.1.created_at, a.0)));
        Ok(rows.into_iter().map(|(_, o)| o).collect())
    }
}

#[derive(Clone, Default)]
pub struct InMemoryProductStore {
    inner: Arc<RwLock<HashMap<String, Product>>>,
}

impl InMemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductStore for InMemoryProductStore {
    async fn fetch(&self, product_id: &str) -> Result<Option<Product>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.get(product_id).cloned())
    }

    async fn put(&self, product: Product) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        inner.insert(product.id.clone(), product);
        Ok(())
    }

    async fn commit_decrements(
        &self,
        lines: &[ReservedLine],
        updated_at: i64,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;

        // validate every line before touching any stock
        for line in lines {
            let product = inner.get(&line.product_id).ok_or(StoreError::NotFound)?;
            if product.version != line.expected_version {
                return Err(StoreError::VersionMismatch);
            }
        }

        for line in lines {
            if let Some(product) = inner.get_mut(&line.product_id) {
                product.stock -= line.quantity;
                product.version += 1;
                product.updated_at = updated_at;
            }
        }

        Ok(())
    }
}
