use chrono::Utc;
use sea_orm::{EntityTrait, Set, sea_query::OnConflict};
use storefront_api::{
    config::AppConfig,
    db::{OrmConn, create_orm_conn, run_migrations},
    entity::products::{ActiveModel as ProductActive, Column as ProductCol, Entity as Products},
    middleware::auth::{CurrentUser, issue_token},
};
use uuid::Uuid;

const DEMO_USER_ID: Uuid = Uuid::from_u128(0x0190_0000_0000_7000_8000_0000_0000_0001);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let orm = create_orm_conn(&config.database_url).await?;
    // Ensure migrations are applied.
    run_migrations(&orm).await?;

    seed_products(&orm).await?;

    let demo = CurrentUser {
        id: DEMO_USER_ID,
        login: "asha".to_string(),
        display_name: Some("Asha Rao".to_string()),
    };
    let token = issue_token(&demo, &config.jwt_secret, chrono::Duration::days(7))?;

    println!("Seed completed. Demo user ID: {}", demo.id);
    println!("Bearer token (valid 7 days): {token}");
    Ok(())
}

async fn seed_products(orm: &OrmConn) -> anyhow::Result<()> {
    // Prices in minor units.
    let products = [
        ("Axum Hoodie", "Warm hoodie for Rustaceans", 550000, 4.6, 31),
        ("Ferris Mug", "Coffee tastes better with Ferris", 120000, 4.8, 112),
        ("Rust Sticker Pack", "Decorate your laptop", 50000, 4.2, 57),
        ("E-book: Async Rust", "Learn async Rust patterns", 250000, 0.0, 0),
    ];

    for (name, desc, price, rating, ratings) in products {
        let inserted = Products::insert(ProductActive {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            description: Set(Some(desc.to_string())),
            price: Set(price),
            average_rating: Set(rating),
            rating_count: Set(ratings),
            created_at: Set(Utc::now().into()),
        })
        .on_conflict(OnConflict::column(ProductCol::Name).do_nothing().to_owned())
        .exec_without_returning(orm)
        .await?;

        if inserted > 0 {
            println!("Seeded product {name}");
        }
    }

    Ok(())
}
