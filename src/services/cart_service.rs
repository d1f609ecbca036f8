use chrono::Utc;
use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
    sea_query::{Expr, OnConflict},
};
use uuid::Uuid;

use crate::{
    audit,
    dto::cart::{CartLineDto, CartView},
    entity::{
        cart_items::{
            ActiveModel as CartActive, Column as CartCol, Entity as CartItems, Model as CartModel,
        },
        products::{Entity as Products, Model as ProductModel},
    },
    error::{AppError, AppResult},
    middleware::auth::CurrentUser,
    models::Product,
    money::Money,
    response::{ApiResponse, Meta},
    services::catalog_service,
    state::AppState,
};

/// Cart lines joined with their products, oldest line first.
pub(crate) async fn load_lines<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
) -> AppResult<Vec<(CartModel, ProductModel)>> {
    let rows = CartItems::find()
        .filter(CartCol::UserId.eq(user_id))
        .order_by_asc(CartCol::CreatedAt)
        .order_by_asc(CartCol::Id)
        .find_also_related(Products)
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .filter_map(|(line, product)| match product {
            Some(product) => Some((line, product)),
            None => {
                tracing::warn!(line_id = %line.id, "cart line without product skipped");
                None
            }
        })
        .collect())
}

/// Σ current price × quantity over `lines`.
pub(crate) fn lines_total(lines: &[(CartModel, ProductModel)]) -> AppResult<Money> {
    lines.iter().try_fold(Money::ZERO, |total, (line, product)| {
        total.checked_add(Money::from_minor(product.price).times(line.quantity)?)
    })
}

pub async fn cart_view<C: ConnectionTrait>(db: &C, user_id: Uuid) -> AppResult<CartView> {
    let lines = load_lines(db, user_id).await?;
    let total = lines_total(&lines)?;

    let mut items = Vec::with_capacity(lines.len());
    for (line, product) in lines {
        let product = Product::from(product);
        let subtotal = product.price.times(line.quantity)?;
        items.push(CartLineDto {
            id: line.id,
            product,
            quantity: line.quantity,
            subtotal,
        });
    }

    Ok(CartView { items, total })
}

fn owned_line(user: &CurrentUser, line_id: Uuid) -> Condition {
    Condition::all()
        .add(CartCol::Id.eq(line_id))
        .add(CartCol::UserId.eq(user.id))
}

async fn respond(state: &AppState, user: &CurrentUser, message: &str) -> AppResult<ApiResponse<CartView>> {
    let view = cart_view(&state.orm, user.id).await?;
    let meta = Meta::count(view.items.len());
    Ok(ApiResponse::success(message, view, Some(meta)))
}

pub async fn list_cart(state: &AppState, user: &CurrentUser) -> AppResult<ApiResponse<CartView>> {
    respond(state, user, "OK").await
}

/// Add one unit of `product_id`, creating the line on first add.
pub async fn add_to_cart(
    state: &AppState,
    user: &CurrentUser,
    product_id: Uuid,
) -> AppResult<ApiResponse<CartView>> {
    let product = catalog_service::get_product(&state.orm, product_id).await?;

    let line = CartActive {
        id: Set(Uuid::now_v7()),
        user_id: Set(user.id),
        product_id: Set(product.id),
        quantity: Set(1),
        created_at: Set(Utc::now().into()),
    };

    // Single statement so concurrent adds neither duplicate the line nor lose a unit.
    CartItems::insert(line)
        .on_conflict(
            OnConflict::columns([CartCol::UserId, CartCol::ProductId])
                .value(
                    CartCol::Quantity,
                    Expr::col((CartItems, CartCol::Quantity)).add(1),
                )
                .to_owned(),
        )
        .exec_without_returning(&state.orm)
        .await?;

    tracing::debug!(user_id = %user.id, product_id = %product.id, "cart add");
    audit::record(
        &state.orm,
        user.id,
        "cart_add",
        "cart_items",
        serde_json::json!({ "product_id": product.id }),
    )
    .await;

    respond(state, user, &format!("{} added to cart", product.name)).await
}

pub async fn increment_line(
    state: &AppState,
    user: &CurrentUser,
    line_id: Uuid,
) -> AppResult<ApiResponse<CartView>> {
    let result = CartItems::update_many()
        .col_expr(CartCol::Quantity, Expr::col(CartCol::Quantity).add(1))
        .filter(owned_line(user, line_id))
        .exec(&state.orm)
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    audit::record(
        &state.orm,
        user.id,
        "cart_increment",
        "cart_items",
        serde_json::json!({ "line_id": line_id }),
    )
    .await;

    respond(state, user, "Quantity increased").await
}

/// Decrease by one; a line at quantity 1 is deleted instead.
pub async fn decrement_line(
    state: &AppState,
    user: &CurrentUser,
    line_id: Uuid,
) -> AppResult<ApiResponse<CartView>> {
    let txn = state.orm.begin().await?;

    let decremented = CartItems::update_many()
        .col_expr(CartCol::Quantity, Expr::col(CartCol::Quantity).sub(1))
        .filter(owned_line(user, line_id).add(CartCol::Quantity.gt(1)))
        .exec(&txn)
        .await?;

    let removed = decremented.rows_affected == 0;
    if removed {
        let deleted = CartItems::delete_many()
            .filter(owned_line(user, line_id))
            .exec(&txn)
            .await?;
        if deleted.rows_affected == 0 {
            return Err(AppError::NotFound);
        }
    }

    txn.commit().await?;

    audit::record(
        &state.orm,
        user.id,
        if removed { "cart_remove" } else { "cart_decrement" },
        "cart_items",
        serde_json::json!({ "line_id": line_id }),
    )
    .await;

    let message = if removed {
        "Removed from cart"
    } else {
        "Quantity decreased"
    };
    respond(state, user, message).await
}

pub async fn remove_line(
    state: &AppState,
    user: &CurrentUser,
    line_id: Uuid,
) -> AppResult<ApiResponse<CartView>> {
    let result = CartItems::delete_many()
        .filter(owned_line(user, line_id))
        .exec(&state.orm)
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    audit::record(
        &state.orm,
        user.id,
        "cart_remove",
        "cart_items",
        serde_json::json!({ "line_id": line_id }),
    )
    .await;

    respond(state, user, "Removed from cart").await
}
