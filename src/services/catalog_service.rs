use sea_orm::{ConnectionTrait, EntityTrait};
use uuid::Uuid;

use crate::{
    entity::products::Entity as Products,
    error::{AppError, AppResult},
    models::Product,
};

/// Catalog lookup; the cart never writes products.
pub async fn get_product<C: ConnectionTrait>(db: &C, id: Uuid) -> AppResult<Product> {
    Products::find_by_id(id)
        .one(db)
        .await?
        .map(Product::from)
        .ok_or(AppError::NotFound)
}
