use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{Order, OrderItem, PaymentMethod},
    money::Money,
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CheckoutRequest {
    pub address: String,
    pub payment_method: PaymentMethod,
}

/// Checkout input after validation.
#[derive(Debug, Clone)]
pub struct ValidCheckout {
    pub address: String,
    pub payment_method: PaymentMethod,
}

impl TryFrom<CheckoutRequest> for ValidCheckout {
    type Error = AppError;

    fn try_from(request: CheckoutRequest) -> Result<Self, Self::Error> {
        let address = request.address.trim();
        if address.is_empty() {
            return Err(AppError::BadRequest("address must not be empty".into()));
        }
        Ok(Self {
            address: address.to_string(),
            payment_method: request.payment_method,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderWithItems {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// Order item joined with its product for display.
#[derive(Debug, Serialize, ToSchema)]
pub struct OrderLineDto {
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: Money,
    pub subtotal: Money,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderDetail {
    pub order: Order,
    pub items: Vec<OrderLineDto>,
    /// Sum of the line subtotals under the configured pricing policy.
    pub items_total: Money,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderList {
    pub items: Vec<Order>,
}
