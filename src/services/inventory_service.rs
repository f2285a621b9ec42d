use tracing::debug;

use crate::{error::OrderError, store::ReservedLine, AppState};

#[derive(Debug, Clone)]
pub struct ReservationItem {
    pub product_id: String,
    pub quantity: i64,
}

const MAX_RESERVE_ATTEMPTS: u32 = 5;

/// Reserves stock for every item or for none of them.
///
/// Snapshot the products with their versions, check stock and the active
/// flag, then commit all decrements conditional on every version still
/// matching. A conflicting write fails the commit and the whole unit of work
/// re-runs, up to `MAX_RESERVE_ATTEMPTS`.
pub async fn reserve(state: &AppState, items: &[ReservationItem]) -> Result<(), OrderError> {
    // fold repeated product ids into one line, keeping request order, so a
    // duplicated line cannot slip past the stock check
    let mut wanted: Vec<(String, i64)> = Vec::new();
    for item in items {
        if let Some(slot) = wanted.iter_mut().find(|(id, _)| *id == item.product_id) {
            let Some(sum) = slot.1.checked_add(item.quantity) else {
                return Err(OrderError::InvalidArgument(format!(
                    "total quantity for product {} is out of range",
                    item.product_id
                )));
            };
            slot.1 = sum;
        } else {
            wanted.push((item.product_id.clone(), item.quantity));
        }
    }

    for attempt in 1..=MAX_RESERVE_ATTEMPTS {
        let mut lines = Vec::with_capacity(wanted.len());

        for (product_id, quantity) in &wanted {
            let product = match state.products.fetch(product_id).await {
                Ok(Some(p)) => p,
                _ => {
                    return Err(OrderError::NotFound(format!(
                        "product {product_id} not found"
                    )));
                }
            };

            if !product.active || product.stock < *quantity {
                return Err(OrderError::InsufficientStock {
                    product_id: product_id.clone(),
                });
            }

            lines.push(ReservedLine {
                product_id: product_id.clone(),
                expected_version: product.version,
                quantity: *quantity,
            });
        }

        match state
            .products
            .commit_decrements(&lines, state.clock.now())
            .await
        {
            Ok(()) => return Ok(()),
            Err(_) => {
                // lost a race; take a fresh snapshot and re-run
                debug!("reservation commit conflicted (attempt {attempt}), retrying");
                tokio::task::yield_now().await;
            }
        }
    }

    Err(OrderError::Contention)
}
