use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    entity::{order_items, orders, products},
    error::AppError,
    money::Money,
};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    /// Unit price in minor currency units.
    pub price: Money,
    pub average_rating: f64,
    pub rating_count: i32,
    pub created_at: DateTime<Utc>,
}

impl From<products::Model> for Product {
    fn from(model: products::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            price: Money::from_minor(model.price),
            average_rating: model.average_rating,
            rating_count: model.rating_count,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

/// Closed set of payment methods accepted at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Card,
    Upi,
    NetBanking,
    CashOnDelivery,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Card => "card",
            PaymentMethod::Upi => "upi",
            PaymentMethod::NetBanking => "net_banking",
            PaymentMethod::CashOnDelivery => "cash_on_delivery",
        }
    }

    /// Human label printed on receipts.
    pub fn label(&self) -> &'static str {
        match self {
            PaymentMethod::Card => "Card",
            PaymentMethod::Upi => "UPI",
            PaymentMethod::NetBanking => "Net Banking",
            PaymentMethod::CashOnDelivery => "Cash on Delivery",
        }
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "card" => Ok(PaymentMethod::Card),
            "upi" => Ok(PaymentMethod::Upi),
            "net_banking" => Ok(PaymentMethod::NetBanking),
            "cash_on_delivery" => Ok(PaymentMethod::CashOnDelivery),
            other => Err(AppError::BadRequest(format!(
                "unknown payment method: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Cart total captured at checkout.
    pub total: Money,
    pub address: String,
    pub payment_method: PaymentMethod,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<orders::Model> for Order {
    type Error = AppError;

    fn try_from(model: orders::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            user_id: model.user_id,
            total: Money::from_minor(model.total),
            address: model.address,
            payment_method: model.payment_method.parse().map_err(|_| {
                AppError::Internal(anyhow::anyhow!(
                    "order {} has unknown payment method {:?}",
                    model.id,
                    model.payment_method
                ))
            })?,
            created_at: model.created_at.with_timezone(&Utc),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: Money,
    pub created_at: DateTime<Utc>,
}

impl From<order_items::Model> for OrderItem {
    fn from(model: order_items::Model) -> Self {
        Self {
            id: model.id,
            order_id: model.order_id,
            product_id: model.product_id,
            quantity: model.quantity,
            unit_price: Money::from_minor(model.unit_price),
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}
