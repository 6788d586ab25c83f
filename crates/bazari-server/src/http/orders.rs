// SPDX-License-Identifier: Apache-2.0

use crate::auth::guard;
use crate::http::response_contract::order_error_response;
use crate::AppState;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use bazari_api::{AdminOrderDto, CreateOrderRequest, OrderDto, OrderEnvelope, UpdateOrderStatusRequest};
use bazari_orders::{PurchaseLine, PurchaseRequest};

pub(crate) async fn create_order_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<CreateOrderRequest>,
) -> Response {
    if let Err(denied) = guard::authenticate(&state, &headers) {
        return denied;
    }
    let request = PurchaseRequest {
        user_id: body.user_id,
        payment_method: body.payment_method,
        lines: body.products.map(|lines| {
            lines
                .into_iter()
                .map(|line| PurchaseLine {
                    product: line.product,
                    quantity: line.quantity,
                })
                .collect()
        }),
    };
    match state.engine.create_order(&request).await {
        Ok(order) => (
            StatusCode::CREATED,
            Json(OrderEnvelope {
                message: "Transaction created successfully".to_string(),
                transaction: OrderDto::from(&order),
            }),
        )
            .into_response(),
        Err(err) => order_error_response(err),
    }
}

pub(crate) async fn user_orders_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(user_id): Path<String>,
) -> Response {
    if let Err(denied) = guard::authenticate(&state, &headers) {
        return denied;
    }
    match state.engine.orders_for_user(&user_id).await {
        Ok(orders) => {
            let payload: Vec<OrderDto> = orders.iter().map(OrderDto::from).collect();
            Json(payload).into_response()
        }
        Err(err) => order_error_response(err),
    }
}

pub(crate) async fn list_orders_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Response {
    let claims = match guard::authenticate(&state, &headers) {
        Ok(claims) => claims,
        Err(denied) => return denied,
    };
    if let Err(denied) = guard::require_admin(&state, &claims).await {
        return denied;
    }
    match state.engine.list_all().await {
        Ok(orders) => {
            let payload: Vec<AdminOrderDto> = orders
                .iter()
                .map(|(order, purchaser)| AdminOrderDto::from_order(order, purchaser.as_ref()))
                .collect();
            Json(payload).into_response()
        }
        Err(err) => order_error_response(err),
    }
}

pub(crate) async fn update_status_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(order_id): Path<String>,
    Json(body): Json<UpdateOrderStatusRequest>,
) -> Response {
    let claims = match guard::authenticate(&state, &headers) {
        Ok(claims) => claims,
        Err(denied) => return denied,
    };
    if let Err(denied) = guard::require_admin(&state, &claims).await {
        return denied;
    }
    match state
        .engine
        .update_status(&order_id, body.status.as_deref())
        .await
    {
        Ok(order) => Json(OrderEnvelope {
            message: "Order status updated".to_string(),
            transaction: OrderDto::from(&order),
        })
        .into_response(),
        Err(err) => order_error_response(err),
    }
}
