use tracing::info;

use crate::{
    error::OrderError,
    models::{AuthContext, EscrowStatus, Order, OrderStatus, StatusEntry},
    store::OrderPatch,
    AppState,
};

/// Records the buyer's payment as an escrow hold. Payment never advances
/// the order status; the window closes once the order moves past `confirmed`.
pub async fn simulate_payment(
    state: &AppState,
    auth: &AuthContext,
    order_id: &str,
) -> Result<Order, OrderError> {
    let order = match state.orders.get(order_id).await {
        Ok(Some(o)) => o,
        _ => return Err(OrderError::NotFound(format!("order {order_id} not found"))),
    };

    if auth.uid != order.buyer_id {
        return Err(OrderError::Unauthorized(
            "only the order's buyer can pay for it".to_string(),
        ));
    }

    if order.escrow_status != EscrowStatus::None {
        return Err(OrderError::AlreadyPaid);
    }

    if !matches!(order.status, OrderStatus::Pending | OrderStatus::Confirmed) {
        return Err(OrderError::InvalidTransition(format!(
            "payment window is closed for a {} order",
            order.status.as_str()
        )));
    }

    let now = state.clock.now();
    let patch = OrderPatch {
        escrow_status: Some(EscrowStatus::Held),
        history_entry: Some(StatusEntry {
            status: order.status,
            actor: auth.uid.clone(),
            timestamp: now,
        }),
        updated_at: now,
        ..Default::default()
    };

    let updated = state.orders.update(order_id, order.version, patch).await?;
    info!("escrow hold placed on order {order_id}");

    Ok(updated)
}

/// Hands the held funds to the seller once the order is delivered.
pub async fn release_escrow(
    state: &AppState,
    auth: &AuthContext,
    order_id: &str,
) -> Result<Order, OrderError> {
    let order = match state.orders.get(order_id).await {
        Ok(Some(o)) => o,
        _ => return Err(OrderError::NotFound(format!("order {order_id} not found"))),
    };

    let participant = auth.uid == order.buyer_id || auth.uid == order.seller_id || auth.is_admin();
    if !participant {
        return Err(OrderError::Unauthorized("not your order".to_string()));
    }

    if order.status != OrderStatus::Delivered {
        return Err(OrderError::EscrowNotReleasable(
            "order is not delivered yet".to_string(),
        ));
    }
    match order.escrow_status {
        EscrowStatus::Held => {}
        EscrowStatus::Released => {
            return Err(OrderError::EscrowNotReleasable(
                "escrow was already released".to_string(),
            ));
        }
        EscrowStatus::None => {
            return Err(OrderError::EscrowNotReleasable(
                "no funds are held for this order".to_string(),
            ));
        }
    }

    let now = state.clock.now();
    let patch = OrderPatch {
        escrow_status: Some(EscrowStatus::Released),
        escrow_released_at: Some(now),
        history_entry: Some(StatusEntry {
            status: order.status,
            actor: auth.uid.clone(),
            timestamp: now,
        }),
        updated_at: now,
        ..Default::default()
    };

    let updated = state.orders.update(order_id, order.version, patch).await?;
    info!("escrow released on order {order_id}");

    Ok(updated)
}
