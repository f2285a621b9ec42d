use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::{
    models::{AuthContext, DeliveryAddress},
    services::{
        escrow_service, order_service,
        order_service::{CreateOrderRequest, NewOrderItem},
    },
    AppState,
};

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": "unauthorized", "message": "missing or invalid credentials" })),
    )
        .into_response()
}

#[derive(Deserialize)]
pub struct AddressPayload {
    pub street: String,
    pub city: String,
    pub phone: String,
}

#[derive(Deserialize)]
pub struct ItemPayload {
    pub product_id: String,
    pub quantity: i64,
}

#[derive(Deserialize)]
pub struct CreateOrderPayload {
    pub seller_id: String,
    pub items: Vec<ItemPayload>,
    pub payment_method: String,
    pub delivery_address: AddressPayload,
}

// POST /orders
pub async fn create_order(
    State(state): State<AppState>,
    auth: Option<Extension<AuthContext>>,
    Json(payload): Json<CreateOrderPayload>,
) -> Response {
    let Some(Extension(auth)) = auth else {
        return unauthorized();
    };

    let req = CreateOrderRequest {
        seller_id: payload.seller_id,
        items: payload
            .items
            .into_iter()
            .map(|i| NewOrderItem {
                product_id: i.product_id,
                quantity: i.quantity,
            })
            .collect(),
        payment_method: payload.payment_method,
        delivery_address: DeliveryAddress {
            street: payload.delivery_address.street,
            city: payload.delivery_address.city,
            phone: payload.delivery_address.phone,
        },
    };

    match order_service::create_order(&state, &auth, req).await {
        Ok(order) => (
            StatusCode::OK,
            Json(json!({ "order_id": order.id, "order": order })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

#[derive(Deserialize)]
pub struct UpdateStatusPayload {
    pub status: String,
    #[serde(default)]
    pub tracking_number: Option<String>,
    #[serde(default)]
    pub proof_of_delivery: Option<String>,
}

// POST /orders/:id/status
pub async fn update_status(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
    auth: Option<Extension<AuthContext>>,
    Json(payload): Json<UpdateStatusPayload>,
) -> Response {
    let Some(Extension(auth)) = auth else {
        return unauthorized();
    };

    match order_service::update_order_status(
        &state,
        &auth,
        &order_id,
        &payload.status,
        payload.tracking_number,
        payload.proof_of_delivery,
    )
    .await
    {
        Ok(order) => (StatusCode::OK, Json(json!({ "order": order }))).into_response(),
        Err(e) => e.into_response(),
    }
}

// POST /orders/:id/payment
pub async fn simulate_payment(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
    auth: Option<Extension<AuthContext>>,
) -> Response {
    let Some(Extension(auth)) = auth else {
        return unauthorized();
    };

    match escrow_service::simulate_payment(&state, &auth, &order_id).await {
        Ok(order) => (StatusCode::OK, Json(json!({ "order": order }))).into_response(),
        Err(e) => e.into_response(),
    }
}

// POST /orders/:id/escrow/release
pub async fn release_escrow(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
    auth: Option<Extension<AuthContext>>,
) -> Response {
    let Some(Extension(auth)) = auth else {
        return unauthorized();
    };

    match escrow_service::release_escrow(&state, &auth, &order_id).await {
        Ok(order) => (StatusCode::OK, Json(json!({ "order": order }))).into_response(),
        Err(e) => e.into_response(),
    }
}

// GET /orders/:id
pub async fn get_order(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
    auth: Option<Extension<AuthContext>>,
) -> Response {
    let Some(Extension(auth)) = auth else {
        return unauthorized();
    };

    match order_service::get_order_by_id(&state, &auth, &order_id).await {
        Ok(order) => (StatusCode::OK, Json(json!({ "order": order }))).into_response(),
        Err(e) => e.into_response(),
    }
}

// GET /orders
pub async fn list_orders(
    State(state): State<AppState>,
    auth: Option<Extension<AuthContext>>,
) -> Response {
    let Some(Extension(auth)) = auth else {
        return unauthorized();
    };

    match order_service::get_user_orders(&state, &auth).await {
        Ok(orders) => (StatusCode::OK, Json(json!({ "orders": orders }))).into_response(),
        Err(e) => e.into_response(),
    }
}
