use chrono::Utc;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    middleware::auth::CurrentUser,
    models::Order,
    receipt::{
        ReceiptFile, ReceiptInput, ReceiptLayout, ReceiptLine,
        assets::{load_font, load_logo},
        pdf,
    },
    services::order_service,
    state::AppState,
};

/// Render the PDF bill for one of the requester's orders.
///
/// The ownership check runs first; an order owned by someone else is
/// indistinguishable from a missing one. The logo may be absent, the font may
/// not.
pub async fn generate_receipt(
    state: &AppState,
    user: &CurrentUser,
    order_id: Uuid,
) -> AppResult<ReceiptFile> {
    let order = order_service::find_owned_order(&state.orm, user, order_id).await?;
    let order = Order::try_from(order)?;
    let config = &state.receipt;

    let lines: Vec<ReceiptLine> = order_service::order_lines(&state.orm, order.id, config.pricing)
        .await?
        .into_iter()
        .map(|line| ReceiptLine {
            product_name: line.product_name,
            quantity: line.quantity,
            subtotal: line.subtotal,
        })
        .collect();

    let font = load_font(&config.font_path, &config.currency_symbol).await?;
    let header = load_logo(&config.logo_path, &config.shop_name).await;

    let layout = ReceiptLayout::build(
        &ReceiptInput {
            order_id: order.id,
            customer_name: user.customer_name(),
            payment_method: order.payment_method,
            address: &order.address,
            order_total: order.total,
            lines: &lines,
            generated_at: Utc::now(),
            currency_symbol: &config.currency_symbol,
        },
        header,
    )?;

    let bytes = tokio::task::spawn_blocking(move || pdf::render(&layout, &font))
        .await
        .map_err(|err| AppError::Internal(err.into()))??;

    tracing::info!(
        user_id = %user.id,
        order_id = %order.id,
        bytes = bytes.len(),
        "receipt generated"
    );

    Ok(ReceiptFile {
        filename: ReceiptFile::filename_for(order.id),
        bytes,
    })
}
