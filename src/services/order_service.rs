use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    config::PricingPolicy,
    dto::orders::{OrderDetail, OrderLineDto, OrderList, OrderWithItems, ValidCheckout},
    entity::{
        cart_items::{Column as CartCol, Entity as CartItems},
        order_items::{
            ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems,
        },
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel},
        products::Entity as Products,
    },
    error::{AppError, AppResult},
    middleware::auth::CurrentUser,
    models::{Order, OrderItem},
    money::Money,
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, SortOrder},
    services::cart_service,
    state::AppState,
};

pub async fn list_orders(
    state: &AppState,
    user: &CurrentUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);

    let mut finder = Orders::find().filter(OrderCol::UserId.eq(user.id));
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(OrderCol::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(OrderCol::CreatedAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let orders = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Order::try_from)
        .collect::<AppResult<Vec<_>>>()?;

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Ok",
        OrderList { items: orders },
        Some(meta),
    ))
}

/// Turn the user's cart into an order and clear the cart, all in one transaction.
pub async fn checkout(
    state: &AppState,
    user: &CurrentUser,
    payload: ValidCheckout,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let txn = state.orm.begin().await?;

    // Lock the cart rows so a concurrent checkout waits and then sees an empty cart.
    let locked = CartItems::find()
        .filter(CartCol::UserId.eq(user.id))
        .lock_exclusive()
        .all(&txn)
        .await?;
    if locked.is_empty() {
        return Err(AppError::EmptyCart);
    }

    let lines = cart_service::load_lines(&txn, user.id).await?;
    if lines.is_empty() {
        return Err(AppError::EmptyCart);
    }
    let total = cart_service::lines_total(&lines)?;

    let order = OrderActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.id),
        total: Set(total.minor()),
        address: Set(payload.address),
        payment_method: Set(payload.payment_method.as_str().to_string()),
        created_at: Set(Utc::now().into()),
    }
    .insert(&txn)
    .await?;

    let mut order_items: Vec<OrderItem> = Vec::with_capacity(lines.len());
    for (line, product) in &lines {
        let item = OrderItemActive {
            id: Set(Uuid::now_v7()),
            order_id: Set(order.id),
            product_id: Set(line.product_id),
            quantity: Set(line.quantity),
            unit_price: Set(product.price),
            created_at: Set(Utc::now().into()),
        }
        .insert(&txn)
        .await?;

        order_items.push(OrderItem::from(item));
    }

    let line_ids: Vec<Uuid> = lines.iter().map(|(line, _)| line.id).collect();
    let cleared = CartItems::delete_many()
        .filter(
            Condition::all()
                .add(CartCol::UserId.eq(user.id))
                .add(CartCol::Id.is_in(line_ids)),
        )
        .exec(&txn)
        .await?;

    if cleared.rows_affected != lines.len() as u64 {
        return Err(AppError::Conflict(
            "cart changed during checkout".into(),
        ));
    }

    txn.commit().await?;

    tracing::info!(
        user_id = %user.id,
        order_id = %order.id,
        total = %total,
        items = order_items.len(),
        "checkout committed"
    );
    audit::record(
        &state.orm,
        user.id,
        "checkout",
        "orders",
        serde_json::json!({ "order_id": order.id, "total": total.minor() }),
    )
    .await;

    Ok(ApiResponse::success(
        "Your order has been placed successfully!",
        OrderWithItems {
            order: Order::try_from(order)?,
            items: order_items,
        },
        Some(Meta::empty()),
    ))
}

/// The order `id` if it belongs to `user`; any other order is `NotFound`.
pub(crate) async fn find_owned_order<C: ConnectionTrait>(
    db: &C,
    user: &CurrentUser,
    id: Uuid,
) -> AppResult<OrderModel> {
    Orders::find()
        .filter(
            Condition::all()
                .add(OrderCol::UserId.eq(user.id))
                .add(OrderCol::Id.eq(id)),
        )
        .one(db)
        .await?
        .ok_or(AppError::NotFound)
}

/// Order items with product names, priced per `pricing`.
pub(crate) async fn order_lines<C: ConnectionTrait>(
    db: &C,
    order_id: Uuid,
    pricing: PricingPolicy,
) -> AppResult<Vec<OrderLineDto>> {
    let rows = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order_id))
        .order_by_asc(OrderItemCol::CreatedAt)
        .order_by_asc(OrderItemCol::Id)
        .find_also_related(Products)
        .all(db)
        .await?;

    rows.into_iter()
        .map(|(item, product)| {
            let product = product.ok_or_else(|| {
                AppError::Internal(anyhow::anyhow!(
                    "order item {} references a missing product",
                    item.id
                ))
            })?;
            let unit_price = match pricing {
                PricingPolicy::Live => Money::from_minor(product.price),
                PricingPolicy::Snapshot => Money::from_minor(item.unit_price),
            };
            Ok(OrderLineDto {
                product_id: product.id,
                product_name: product.name,
                quantity: item.quantity,
                unit_price,
                subtotal: unit_price.times(item.quantity)?,
            })
        })
        .collect()
}

pub async fn get_order(
    state: &AppState,
    user: &CurrentUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderDetail>> {
    let order = find_owned_order(&state.orm, user, id).await?;
    let items = order_lines(&state.orm, order.id, state.receipt.pricing).await?;
    let items_total = items
        .iter()
        .try_fold(Money::ZERO, |total, line| total.checked_add(line.subtotal))?;

    Ok(ApiResponse::success(
        "OK",
        OrderDetail {
            order: Order::try_from(order)?,
            items,
            items_total,
        },
        Some(Meta::empty()),
    ))
}
