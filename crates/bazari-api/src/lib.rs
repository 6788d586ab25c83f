#![forbid(unsafe_code)]
//! Wire contract for the storefront API: the error envelope and the JSON
//! request/response shapes. Request DTOs keep every field optional so the
//! operations behind them can report missing fields in a defined order.

mod dto;
mod errors;

pub use dto::{
    AdminOrderDto, CreateOrderRequest, CreateUserRequest, GoogleLoginRequest, LineItemDto,
    LoginRequest, LoginResponse, MessageResponse, OrderDto, OrderEnvelope, OrderLineRequest,
    ProductDto, ProductPayload, PurchaserDto, RegisterRequest, UpdateOrderStatusRequest,
    UpdateUserRequest, UserDto,
};
pub use errors::{ApiError, ApiErrorCode};

pub const CRATE_NAME: &str = "bazari-api";
