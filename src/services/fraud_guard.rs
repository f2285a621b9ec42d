use crate::error::OrderError;
use crate::models::{AuthContext, Order, OrderStatus};

fn allowed(current: OrderStatus, target: OrderStatus) -> bool {
    use OrderStatus::*;
    match (current, target) {
        (Pending, Confirmed) | (Pending, Cancelled) => true,
        (Confirmed, Shipped) | (Confirmed, Cancelled) => true,
        (Shipped, Delivered) => true,
        // refunds are admin territory, reachable from any live state
        (from, Refunded) => !from.is_terminal(),
        _ => false,
    }
}

/// Checks run in a fixed order: transition table first, then who the caller
/// is, then the fields the target status requires.
pub fn check(
    auth: &AuthContext,
    order: &Order,
    target: OrderStatus,
    tracking_number: Option<&str>,
    proof_of_delivery: Option<&str>,
) -> Result<(), OrderError> {
    let current = order.status;

    if !allowed(current, target) {
        return Err(OrderError::InvalidTransition(format!(
            "cannot move order from {} to {}",
            current.as_str(),
            target.as_str()
        )));
    }

    match target {
        OrderStatus::Confirmed | OrderStatus::Shipped | OrderStatus::Delivered => {
            if !(auth.is_verified_seller() && auth.uid == order.seller_id) {
                return Err(OrderError::Unauthorized(
                    "only the order's verified seller may do this".to_string(),
                ));
            }
        }
        OrderStatus::Cancelled => {
            let ok = match current {
                // before the seller commits, the buyer may walk away
                OrderStatus::Pending => auth.uid == order.buyer_id,
                // after confirmation, backing out is the seller's call
                OrderStatus::Confirmed => auth.is_verified_seller() && auth.uid == order.seller_id,
                _ => false,
            };
            if !ok {
                return Err(OrderError::Unauthorized(
                    "you may not cancel this order".to_string(),
                ));
            }
        }
        OrderStatus::Refunded => {
            if !auth.is_admin() {
                return Err(OrderError::Unauthorized(
                    "refunds are admin only".to_string(),
                ));
            }
        }
        // never a valid target, rejected by the table above
        OrderStatus::Pending => {}
    }

    match target {
        OrderStatus::Shipped => {
            if tracking_number.map(str::trim).unwrap_or("").is_empty() {
                return Err(OrderError::InvalidArgument(
                    "tracking number required to mark an order shipped".to_string(),
                ));
            }
        }
        OrderStatus::Delivered => {
            if proof_of_delivery.map(str::trim).unwrap_or("").is_empty() {
                return Err(OrderError::InvalidArgument(
                    "proof of delivery required to mark an order delivered".to_string(),
                ));
            }
        }
        _ => {}
    }

    Ok(())
}
