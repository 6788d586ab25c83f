// SPDX-License-Identifier: Apache-2.0

use crate::auth::guard;
use crate::http::response_contract::{api_error_response, internal_response};
use crate::AppState;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use bazari_api::{ApiError, ProductDto, ProductPayload};
use bazari_model::{validate_price, Product, ProductId};
use bazari_store::CatalogStore;
use chrono::Utc;
use serde_json::json;

async fn admin_gate(state: &AppState, headers: &HeaderMap) -> Result<(), Response> {
    let claims = guard::authenticate(state, headers)?;
    guard::require_admin(state, &claims).await?;
    Ok(())
}

pub(crate) async fn list_products_handler(State(state): State<AppState>) -> Response {
    match state.store.list_products().await {
        Ok(products) => {
            let payload: Vec<ProductDto> = products.iter().map(ProductDto::from).collect();
            Json(payload).into_response()
        }
        Err(err) => internal_response(&err),
    }
}

pub(crate) async fn get_product_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    let Ok(product_id) = ProductId::parse(&id) else {
        return api_error_response(ApiError::not_found("product not found"));
    };
    match state.store.find_product(&product_id).await {
        Ok(Some(product)) => Json(ProductDto::from(&product)).into_response(),
        Ok(None) => api_error_response(ApiError::not_found("product not found")),
        Err(err) => internal_response(&err),
    }
}

pub(crate) async fn create_product_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<ProductPayload>,
) -> Response {
    if let Err(denied) = admin_gate(&state, &headers).await {
        return denied;
    }
    let (Some(name), Some(price), Some(category)) = (body.name, body.price, body.category)
    else {
        return api_error_response(ApiError::invalid_request(
            "name, price, and category are required",
        ));
    };
    if let Err(err) = validate_price(price) {
        return api_error_response(ApiError::invalid_request(err.to_string()));
    }
    let images = body.images.unwrap_or_default();
    if images.is_empty() {
        return api_error_response(ApiError::invalid_request("at least one image is required"));
    }
    let product = Product {
        id: ProductId::generate(),
        name,
        description: body.description.unwrap_or_default(),
        price,
        category,
        images,
        created_at: Utc::now(),
    };
    match state.store.insert_product(&product).await {
        Ok(()) => (
            StatusCode::CREATED,
            Json(json!({
                "message": "Product created successfully",
                "product": ProductDto::from(&product),
            })),
        )
            .into_response(),
        Err(err) => internal_response(&err),
    }
}

pub(crate) async fn update_product_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<ProductPayload>,
) -> Response {
    if let Err(denied) = admin_gate(&state, &headers).await {
        return denied;
    }
    let Ok(product_id) = ProductId::parse(&id) else {
        return api_error_response(ApiError::not_found("product not found"));
    };
    let mut product = match state.store.find_product(&product_id).await {
        Ok(Some(product)) => product,
        Ok(None) => return api_error_response(ApiError::not_found("product not found")),
        Err(err) => return internal_response(&err),
    };

    if let Some(name) = body.name {
        product.name = name;
    }
    if let Some(description) = body.description {
        product.description = description;
    }
    if let Some(price) = body.price {
        if let Err(err) = validate_price(price) {
            return api_error_response(ApiError::invalid_request(err.to_string()));
        }
        product.price = price;
    }
    if let Some(category) = body.category {
        product.category = category;
    }
    if let Some(images) = body.images {
        if images.is_empty() {
            return api_error_response(ApiError::invalid_request(
                "at least one image is required",
            ));
        }
        product.images = images;
    }

    match state.store.update_product(&product).await {
        Ok(()) => Json(json!({
            "message": "Product updated successfully",
            "product": ProductDto::from(&product),
        }))
        .into_response(),
        Err(err) => internal_response(&err),
    }
}

pub(crate) async fn delete_product_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    if let Err(denied) = admin_gate(&state, &headers).await {
        return denied;
    }
    let Ok(product_id) = ProductId::parse(&id) else {
        return api_error_response(ApiError::not_found("product not found"));
    };
    match state.store.delete_product(&product_id).await {
        Ok(true) => Json(json!({ "message": "Product deleted successfully" })).into_response(),
        Ok(false) => api_error_response(ApiError::not_found("product not found")),
        Err(err) => internal_response(&err),
    }
}
