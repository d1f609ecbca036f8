use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{models::Product, money::Money};

#[derive(Debug, Serialize, ToSchema)]
pub struct CartLineDto {
    pub id: Uuid,
    pub product: Product,
    pub quantity: i32,
    /// Current catalog price × quantity.
    pub subtotal: Money,
}

/// A user's cart lines in insertion order with the live total.
#[derive(Debug, Serialize, ToSchema)]
pub struct CartView {
    pub items: Vec<CartLineDto>,
    pub total: Money,
}
