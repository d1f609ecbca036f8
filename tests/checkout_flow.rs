mod common;

use common::{TestApp, customer};
use sea_orm::{ActiveModelTrait, ConnectionTrait, EntityTrait, IntoActiveModel, Set};
use storefront_api::{
    config::{PricingPolicy, ReceiptConfig},
    dto::orders::{CheckoutRequest, ValidCheckout},
    entity::{OrderItems, Orders},
    error::AppError,
    models::PaymentMethod,
    money::Money,
    routes::params::OrderListQuery,
    services::{cart_service, order_service},
};

fn checkout_input(payment_method: PaymentMethod) -> ValidCheckout {
    ValidCheckout::try_from(CheckoutRequest {
        address: "  12 Lake Road, Pune  ".into(),
        payment_method,
    })
    .expect("valid checkout")
}

#[tokio::test]
async fn checkout_creates_order_and_clears_cart() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let user = customer("Asha Rao");
    let widget = app.product("Widget", 1000).await?;
    let gadget = app.product("Gadget", 500).await?;

    cart_service::add_to_cart(&app.state, &user, widget.id).await?;
    cart_service::add_to_cart(&app.state, &user, widget.id).await?;
    cart_service::add_to_cart(&app.state, &user, gadget.id).await?;

    let resp = order_service::checkout(&app.state, &user, checkout_input(PaymentMethod::Upi)).await?;
    assert_eq!(resp.message, "Your order has been placed successfully!");
    let placed = resp.into_data().expect("order");

    assert_eq!(placed.order.user_id, user.id);
    assert_eq!(placed.order.total, Money::from_minor(2500));
    assert_eq!(placed.order.address, "12 Lake Road, Pune");
    assert_eq!(placed.order.payment_method, PaymentMethod::Upi);
    assert_eq!(placed.items.len(), 2);
    assert_eq!(placed.items[0].product_id, widget.id);
    assert_eq!(placed.items[0].quantity, 2);
    assert_eq!(placed.items[0].unit_price, Money::from_minor(1000));
    assert_eq!(placed.items[1].product_id, gadget.id);
    assert_eq!(placed.items[1].quantity, 1);

    let cart = cart_service::list_cart(&app.state, &user).await?.into_data().expect("cart");
    assert!(cart.items.is_empty());

    let history = order_service::list_orders(&app.state, &user, OrderListQuery::default())
        .await?
        .into_data()
        .expect("orders");
    assert_eq!(history.items.len(), 1);
    assert_eq!(history.items[0].id, placed.order.id);
    Ok(())
}

#[tokio::test]
async fn empty_cart_checkout_creates_nothing() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let user = customer("Asha Rao");

    let err = order_service::checkout(&app.state, &user, checkout_input(PaymentMethod::Card))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::EmptyCart));

    let history = order_service::list_orders(&app.state, &user, OrderListQuery::default())
        .await?
        .into_data()
        .expect("orders");
    assert!(history.items.is_empty());
    Ok(())
}

#[tokio::test]
async fn second_checkout_sees_empty_cart() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let user = customer("Asha Rao");
    let widget = app.product("Widget", 1000).await?;
    cart_service::add_to_cart(&app.state, &user, widget.id).await?;

    order_service::checkout(&app.state, &user, checkout_input(PaymentMethod::Card)).await?;
    let err = order_service::checkout(&app.state, &user, checkout_input(PaymentMethod::Card))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::EmptyCart));
    Ok(())
}

#[tokio::test]
async fn failed_cart_clear_rolls_back_order() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    if !app.is_sqlite() {
        eprintln!("Skipping: failure injection uses a SQLite trigger.");
        return Ok(());
    }
    let user = customer("Asha Rao");
    let widget = app.product("Widget", 1000).await?;
    cart_service::add_to_cart(&app.state, &user, widget.id).await?;
    cart_service::add_to_cart(&app.state, &user, widget.id).await?;

    app.state
        .orm
        .execute_unprepared(
            "CREATE TRIGGER fail_clear BEFORE DELETE ON cart_items \
             BEGIN SELECT RAISE(ABORT, 'simulated failure'); END;",
        )
        .await?;

    let err = order_service::checkout(&app.state, &user, checkout_input(PaymentMethod::Card))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Storage(_)));

    assert!(Orders::find().all(&app.state.orm).await?.is_empty());
    assert!(OrderItems::find().all(&app.state.orm).await?.is_empty());

    let cart = cart_service::list_cart(&app.state, &user).await?.into_data().expect("cart");
    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.items[0].quantity, 2);
    Ok(())
}

#[tokio::test]
async fn order_detail_prices_follow_policy() -> anyhow::Result<()> {
    for (pricing, expected) in [(PricingPolicy::Live, 2400), (PricingPolicy::Snapshot, 2000)] {
        let app = TestApp::with_receipt(ReceiptConfig {
            pricing,
            ..ReceiptConfig::default()
        })
        .await?;
        let user = customer("Asha Rao");
        let widget = app.product("Widget", 1000).await?;
        cart_service::add_to_cart(&app.state, &user, widget.id).await?;
        cart_service::add_to_cart(&app.state, &user, widget.id).await?;

        let placed = order_service::checkout(&app.state, &user, checkout_input(PaymentMethod::Card))
            .await?
            .into_data()
            .expect("order");

        let mut active = widget.into_active_model();
        active.price = Set(1200);
        active.update(&app.state.orm).await?;

        let detail = order_service::get_order(&app.state, &user, placed.order.id)
            .await?
            .into_data()
            .expect("detail");
        assert_eq!(detail.order.total, Money::from_minor(2000));
        assert_eq!(detail.items.len(), 1);
        assert_eq!(detail.items_total, Money::from_minor(expected));
    }
    Ok(())
}

#[tokio::test]
async fn other_users_order_is_not_found() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let owner = customer("Asha Rao");
    let intruder = customer("Ravi Kumar");
    let widget = app.product("Widget", 1000).await?;
    cart_service::add_to_cart(&app.state, &owner, widget.id).await?;

    let placed = order_service::checkout(&app.state, &owner, checkout_input(PaymentMethod::Card))
        .await?
        .into_data()
        .expect("order");

    let err = order_service::get_order(&app.state, &intruder, placed.order.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    let history = order_service::list_orders(&app.state, &intruder, OrderListQuery::default())
        .await?
        .into_data()
        .expect("orders");
    assert!(history.items.is_empty());
    Ok(())
}

#[tokio::test]
async fn concurrent_checkouts_consume_cart_once() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let user = customer("Asha Rao");
    let widget = app.product("Widget", 1000).await?;
    cart_service::add_to_cart(&app.state, &user, widget.id).await?;

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let state = app.state.clone();
            let user = user.clone();
            tokio::spawn(async move {
                order_service::checkout(&state, &user, checkout_input(PaymentMethod::Card)).await
            })
        })
        .collect();

    let mut placed = 0;
    for handle in handles {
        match handle.await? {
            Ok(_) => placed += 1,
            Err(AppError::EmptyCart) => {}
            Err(other) => panic!("unexpected checkout error: {other:?}"),
        }
    }
    assert_eq!(placed, 1);

    let history = order_service::list_orders(&app.state, &user, OrderListQuery::default())
        .await?
        .into_data()
        .expect("orders");
    assert_eq!(history.items.len(), 1);
    assert_eq!(history.items[0].total, Money::from_minor(1000));
    Ok(())
}
