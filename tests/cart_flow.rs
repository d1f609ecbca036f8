mod common;

use std::collections::HashMap;

use common::{TestApp, customer};
use sea_orm::{ActiveModelTrait, IntoActiveModel, Set};
use storefront_api::{
    dto::cart::CartView,
    error::AppError,
    money::Money,
    services::cart_service,
};
use uuid::Uuid;

fn view(resp: storefront_api::response::ApiResponse<CartView>) -> CartView {
    resp.into_data().expect("cart view")
}

#[tokio::test]
async fn adding_twice_keeps_one_line() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let user = customer("Asha Rao");
    let widget = app.product("Widget", 1000).await?;

    let first = cart_service::add_to_cart(&app.state, &user, widget.id).await?;
    assert_eq!(first.message, format!("{} added to cart", widget.name));

    let cart = view(cart_service::add_to_cart(&app.state, &user, widget.id).await?);
    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.items[0].quantity, 2);
    assert_eq!(cart.items[0].subtotal, Money::from_minor(2000));
    assert_eq!(cart.total, Money::from_minor(2000));
    Ok(())
}

#[tokio::test]
async fn widget_and_gadget_total() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let user = customer("Asha Rao");
    let widget = app.product("Widget", 1000).await?;
    let gadget = app.product("Gadget", 500).await?;

    cart_service::add_to_cart(&app.state, &user, widget.id).await?;
    cart_service::add_to_cart(&app.state, &user, widget.id).await?;
    let cart = view(cart_service::add_to_cart(&app.state, &user, gadget.id).await?);

    assert_eq!(cart.items.len(), 2);
    assert_eq!(cart.items[0].product.id, widget.id);
    assert_eq!(cart.items[1].product.id, gadget.id);
    assert_eq!(cart.total, Money::from_minor(2500));
    Ok(())
}

#[tokio::test]
async fn increment_and_decrement_adjust_by_one() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let user = customer("Asha Rao");
    let widget = app.product("Widget", 1000).await?;

    let cart = view(cart_service::add_to_cart(&app.state, &user, widget.id).await?);
    let line_id = cart.items[0].id;

    let cart = view(cart_service::increment_line(&app.state, &user, line_id).await?);
    assert_eq!(cart.items[0].quantity, 2);

    let cart = view(cart_service::decrement_line(&app.state, &user, line_id).await?);
    assert_eq!(cart.items[0].quantity, 1);
    assert_eq!(cart.items[0].id, line_id);
    Ok(())
}

#[tokio::test]
async fn decrement_at_one_removes_line() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let user = customer("Asha Rao");
    let widget = app.product("Widget", 1000).await?;

    let cart = view(cart_service::add_to_cart(&app.state, &user, widget.id).await?);
    let line_id = cart.items[0].id;

    let resp = cart_service::decrement_line(&app.state, &user, line_id).await?;
    assert_eq!(resp.message, "Removed from cart");
    let cart = view(resp);
    assert!(cart.items.is_empty());
    assert_eq!(cart.total, Money::ZERO);

    let err = cart_service::decrement_line(&app.state, &user, line_id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound));
    Ok(())
}

#[tokio::test]
async fn remove_deletes_whole_line() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let user = customer("Asha Rao");
    let widget = app.product("Widget", 1000).await?;
    let gadget = app.product("Gadget", 500).await?;

    cart_service::add_to_cart(&app.state, &user, widget.id).await?;
    cart_service::add_to_cart(&app.state, &user, widget.id).await?;
    let cart = view(cart_service::add_to_cart(&app.state, &user, gadget.id).await?);

    let cart = view(cart_service::remove_line(&app.state, &user, cart.items[0].id).await?);
    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.items[0].product.id, gadget.id);
    assert_eq!(cart.total, Money::from_minor(500));
    Ok(())
}

#[tokio::test]
async fn unknown_product_is_not_found() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let user = customer("Asha Rao");

    let err = cart_service::add_to_cart(&app.state, &user, Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    let cart = view(cart_service::list_cart(&app.state, &user).await?);
    assert!(cart.items.is_empty());
    Ok(())
}

#[tokio::test]
async fn other_users_lines_are_not_found() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let owner = customer("Asha Rao");
    let intruder = customer("Ravi Kumar");
    let widget = app.product("Widget", 1000).await?;

    let cart = view(cart_service::add_to_cart(&app.state, &owner, widget.id).await?);
    let line_id = cart.items[0].id;

    for err in [
        cart_service::increment_line(&app.state, &intruder, line_id).await.unwrap_err(),
        cart_service::decrement_line(&app.state, &intruder, line_id).await.unwrap_err(),
        cart_service::remove_line(&app.state, &intruder, line_id).await.unwrap_err(),
    ] {
        assert!(matches!(err, AppError::NotFound));
    }

    let cart = view(cart_service::list_cart(&app.state, &owner).await?);
    assert_eq!(cart.items[0].quantity, 1);
    assert!(view(cart_service::list_cart(&app.state, &intruder).await?).items.is_empty());
    Ok(())
}

#[tokio::test]
async fn cart_total_follows_current_price() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let user = customer("Asha Rao");
    let widget = app.product("Widget", 1000).await?;

    cart_service::add_to_cart(&app.state, &user, widget.id).await?;
    cart_service::add_to_cart(&app.state, &user, widget.id).await?;

    let mut active = widget.into_active_model();
    active.price = Set(1200);
    active.update(&app.state.orm).await?;

    let cart = view(cart_service::list_cart(&app.state, &user).await?);
    assert_eq!(cart.items[0].product.price, Money::from_minor(1200));
    assert_eq!(cart.total, Money::from_minor(2400));
    Ok(())
}

#[tokio::test]
async fn concurrent_adds_do_not_lose_units() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let user = customer("Asha Rao");
    let widget = app.product("Widget", 1000).await?;

    let product_id = widget.id;
    let handles: Vec<_> = (0..5)
        .map(|_| {
            let state = app.state.clone();
            let user = user.clone();
            tokio::spawn(async move { cart_service::add_to_cart(&state, &user, product_id).await })
        })
        .collect();
    for handle in handles {
        handle.await??;
    }

    let cart = view(cart_service::list_cart(&app.state, &user).await?);
    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.items[0].quantity, 5);
    Ok(())
}

#[tokio::test]
async fn concurrent_increments_do_not_lose_units() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let user = customer("Asha Rao");
    let widget = app.product("Widget", 1000).await?;

    let cart = view(cart_service::add_to_cart(&app.state, &user, widget.id).await?);
    let line_id = cart.items[0].id;

    let handles: Vec<_> = (0..6)
        .map(|_| {
            let state = app.state.clone();
            let user = user.clone();
            tokio::spawn(async move { cart_service::increment_line(&state, &user, line_id).await })
        })
        .collect();
    for handle in handles {
        handle.await??;
    }

    let cart = view(cart_service::list_cart(&app.state, &user).await?);
    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.items[0].quantity, 7);
    assert_eq!(cart.total, Money::from_minor(7000));
    Ok(())
}

/// xorshift64, enough to pick operations deterministically.
struct Rng(u64);

impl Rng {
    fn next(&mut self, bound: usize) -> usize {
        self.0 ^= self.0 << 13;
        self.0 ^= self.0 >> 7;
        self.0 ^= self.0 << 17;
        (self.0 % bound as u64) as usize
    }
}

#[tokio::test]
async fn random_operations_keep_total_consistent() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let user = customer("Asha Rao");
    let products = [
        app.product("Widget", 1000).await?,
        app.product("Gadget", 500).await?,
        app.product("Gizmo", 1299).await?,
    ];

    // product index -> expected quantity
    let mut model: HashMap<usize, i32> = HashMap::new();
    let mut rng = Rng(0x5eed_1234_abcd_0042);

    for _ in 0..60 {
        let pick = rng.next(products.len());
        let product = &products[pick];
        let cart = view(cart_service::list_cart(&app.state, &user).await?);
        let line = cart.items.iter().find(|line| line.product.id == product.id);

        let cart = match (rng.next(4), line) {
            (0, _) | (_, None) => {
                *model.entry(pick).or_insert(0) += 1;
                view(cart_service::add_to_cart(&app.state, &user, product.id).await?)
            }
            (1, Some(line)) => {
                *model.entry(pick).or_insert(0) += 1;
                view(cart_service::increment_line(&app.state, &user, line.id).await?)
            }
            (2, Some(line)) => {
                let quantity = model.entry(pick).or_insert(0);
                *quantity -= 1;
                if *quantity == 0 {
                    model.remove(&pick);
                }
                view(cart_service::decrement_line(&app.state, &user, line.id).await?)
            }
            (_, Some(line)) => {
                model.remove(&pick);
                view(cart_service::remove_line(&app.state, &user, line.id).await?)
            }
        };

        let expected: i64 = model
            .iter()
            .map(|(idx, quantity)| products[*idx].price * i64::from(*quantity))
            .sum();
        assert_eq!(cart.total, Money::from_minor(expected));
        assert_eq!(cart.items.len(), model.len());
        for line in &cart.items {
            let idx = products
                .iter()
                .position(|product| product.id == line.product.id)
                .expect("known product");
            assert_eq!(Some(&line.quantity), model.get(&idx));
        }
    }
    Ok(())
}
