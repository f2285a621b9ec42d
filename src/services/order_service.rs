use regex::Regex;
use tracing::info;
use uuid::Uuid;

use crate::{
    error::OrderError,
    models::{
        AuthContext, DeliveryAddress, EscrowStatus, Order, OrderItem, OrderStatus, PaymentMethod,
        Role, StatusEntry,
    },
    store::OrderPatch,
    AppState,
};

use super::{
    fraud_guard,
    inventory_service::{self, ReservationItem},
};

#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub product_id: String,
    pub quantity: i64,
}

#[derive(Debug, Clone)]
pub struct CreateOrderRequest {
    pub seller_id: String,
    pub items: Vec<NewOrderItem>,
    // raw string so an unknown method surfaces as invalid_argument
    pub payment_method: String,
    pub delivery_address: DeliveryAddress,
}

fn validate_address(addr: &DeliveryAddress) -> Result<(), OrderError> {
    if addr.street.trim().is_empty() {
        return Err(OrderError::InvalidArgument(
            "delivery street is required".to_string(),
        ));
    }
    if addr.city.trim().is_empty() {
        return Err(OrderError::InvalidArgument(
            "delivery city is required".to_string(),
        ));
    }

    let phone = addr.phone.trim();
    let phone_re = Regex::new(r"^\+?[0-9][0-9 \-]{5,19}$").unwrap();
    if !phone_re.is_match(phone) {
        return Err(OrderError::InvalidArgument(
            "delivery phone does not look like a phone number".to_string(),
        ));
    }

    Ok(())
}

/// Snapshots item names and prices, reserves stock for the whole cart
/// atomically, then persists the order as `pending`.
pub async fn create_order(
    state: &AppState,
    auth: &AuthContext,
    req: CreateOrderRequest,
) -> Result<Order, OrderError> {
    let seller_id = req.seller_id.trim().to_string();

    if seller_id.is_empty() {
        return Err(OrderError::InvalidArgument(
            "seller_id is required".to_string(),
        ));
    }
    if seller_id == auth.uid {
        return Err(OrderError::InvalidArgument(
            "you cannot order from yourself".to_string(),
        ));
    }
    if req.items.is_empty() {
        return Err(OrderError::InvalidArgument(
            "order needs at least one item".to_string(),
        ));
    }
    for item in &req.items {
        if item.quantity <= 0 {
            return Err(OrderError::InvalidArgument(
                "item quantities must be positive".to_string(),
            ));
        }
    }

    let Some(payment_method) = PaymentMethod::parse(req.payment_method.trim()) else {
        return Err(OrderError::InvalidArgument(format!(
            "unknown payment method {:?}",
            req.payment_method
        )));
    };

    validate_address(&req.delivery_address)?;

    // snapshot names and prices, checking every product belongs to the seller
    let mut items = Vec::with_capacity(req.items.len());
    let mut total = 0.0;
    for item in &req.items {
        let product = match state.products.fetch(&item.product_id).await {
            Ok(Some(p)) => p,
            _ => {
                return Err(OrderError::NotFound(format!(
                    "product {} not found",
                    item.product_id
                )));
            }
        };

        if product.seller_id != seller_id {
            return Err(OrderError::InvalidArgument(format!(
                "product {} does not belong to seller {}",
                product.id, seller_id
            )));
        }

        total += product.price * (item.quantity as f64);
        items.push(OrderItem {
            product_id: product.id,
            name_snapshot: product.name,
            price_snapshot: product.price,
            quantity: item.quantity,
        });
    }

    let reservation: Vec<ReservationItem> = req
        .items
        .iter()
        .map(|i| ReservationItem {
            product_id: i.product_id.clone(),
            quantity: i.quantity,
        })
        .collect();
    inventory_service::reserve(state, &reservation).await?;

    let now = state.clock.now();
    let order = Order {
        id: Uuid::new_v4().to_string(),
        buyer_id: auth.uid.clone(),
        seller_id,
        items,
        total_amount: total,
        payment_method,
        delivery_address: DeliveryAddress {
            street: req.delivery_address.street.trim().to_string(),
            city: req.delivery_address.city.trim().to_string(),
            phone: req.delivery_address.phone.trim().to_string(),
        },
        status: OrderStatus::Pending,
        tracking_number: None,
        proof_of_delivery: None,
        escrow_status: EscrowStatus::None,
        escrow_released_at: None,
        created_at: now,
        updated_at: now,
        status_history: vec![StatusEntry {
            status: OrderStatus::Pending,
            actor: auth.uid.clone(),
            timestamp: now,
        }],
        version: 0,
    };

    state.orders.put(order.clone()).await?;
    info!("order {} created for buyer {}", order.id, order.buyer_id);

    Ok(order)
}

/// The write is conditional on the version read here; a concurrent mutation
/// surfaces as `Conflict` and the caller re-reads and retries.
pub async fn update_order_status(
    state: &AppState,
    auth: &AuthContext,
    order_id: &str,
    target: &str,
    tracking_number: Option<String>,
    proof_of_delivery: Option<String>,
) -> Result<Order, OrderError> {
    let Some(target) = OrderStatus::parse(target.trim()) else {
        return Err(OrderError::InvalidArgument(format!(
            "unknown status {target:?}"
        )));
    };

    let order = match state.orders.get(order_id).await {
        Ok(Some(o)) => o,
        _ => return Err(OrderError::NotFound(format!("order {order_id} not found"))),
    };

    fraud_guard::check(
        auth,
        &order,
        target,
        tracking_number.as_deref(),
        proof_of_delivery.as_deref(),
    )?;

    let now = state.clock.now();
    let patch = OrderPatch {
        status: Some(target),
        tracking_number: if target == OrderStatus::Shipped {
            tracking_number.map(|t| t.trim().to_string())
        } else {
            None
        },
        proof_of_delivery: if target == OrderStatus::Delivered {
            proof_of_delivery.map(|p| p.trim().to_string())
        } else {
            None
        },
        history_entry: Some(StatusEntry {
            status: target,
            actor: auth.uid.clone(),
            timestamp: now,
        }),
        updated_at: now,
        ..Default::default()
    };

    let updated = state.orders.update(order_id, order.version, patch).await?;
    info!(
        "order {} moved {} -> {}",
        order_id,
        order.status.as_str(),
        target.as_str()
    );

    Ok(updated)
}

pub async fn get_order_by_id(
    state: &AppState,
    auth: &AuthContext,
    order_id: &str,
) -> Result<Order, OrderError> {
    let order = match state.orders.get(order_id).await {
        Ok(Some(o)) => o,
        _ => return Err(OrderError::NotFound(format!("order {order_id} not found"))),
    };

    let allowed = auth.uid == order.buyer_id || auth.uid == order.seller_id || auth.is_admin();
    if !allowed {
        return Err(OrderError::Unauthorized("not your order".to_string()));
    }

    Ok(order)
}

// newest first, scoped by role
pub async fn get_user_orders(
    state: &AppState,
    auth: &AuthContext,
) -> Result<Vec<Order>, OrderError> {
    match auth.role {
        Role::Buyer => Ok(state.orders.list_by_buyer(&auth.uid).await?),
        Role::Seller => Ok(state.orders.list_by_seller(&auth.uid).await?),
        Role::Admin => Err(OrderError::InvalidArgument(
            "order listing is scoped to buyers and sellers".to_string(),
        )),
    }
}
