#![allow(dead_code)]

use std::{path::PathBuf, sync::Arc};

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ConnectionTrait, DatabaseBackend, Set};
use storefront_api::{
    config::ReceiptConfig,
    db::{create_orm_conn, run_migrations},
    entity::products::{ActiveModel as ProductActive, Model as ProductModel},
    middleware::auth::CurrentUser,
    state::AppState,
};
use tempfile::TempDir;
use uuid::Uuid;

pub const TEST_JWT_SECRET: &str = "test-secret";

/// Application state over a migrated database.
///
/// Uses `TEST_DATABASE_URL` when set, otherwise a throwaway SQLite file that
/// lives as long as this value.
pub struct TestApp {
    pub state: AppState,
    _dir: Option<TempDir>,
}

impl TestApp {
    pub async fn new() -> anyhow::Result<Self> {
        Self::with_receipt(ReceiptConfig::default()).await
    }

    pub async fn with_receipt(receipt: ReceiptConfig) -> anyhow::Result<Self> {
        let (database_url, dir) = match std::env::var("TEST_DATABASE_URL") {
            Ok(url) => (url, None),
            Err(_) => {
                let dir = tempfile::tempdir()?;
                let path = dir.path().join("storefront.db");
                (format!("sqlite://{}?mode=rwc", path.display()), Some(dir))
            }
        };

        let orm = create_orm_conn(&database_url).await?;
        run_migrations(&orm).await?;

        Ok(Self {
            state: AppState {
                orm,
                jwt_secret: Arc::from(TEST_JWT_SECRET),
                receipt: Arc::new(receipt),
            },
            _dir: dir,
        })
    }

    pub fn is_sqlite(&self) -> bool {
        self.state.orm.get_database_backend() == DatabaseBackend::Sqlite
    }

    /// Insert a product; the name gets a random suffix so shared databases stay collision free.
    pub async fn product(&self, name: &str, price: i64) -> anyhow::Result<ProductModel> {
        let product = ProductActive {
            id: Set(Uuid::new_v4()),
            name: Set(format!("{name} {}", Uuid::new_v4().simple())),
            description: Set(Some(format!("{name} for testing"))),
            price: Set(price),
            average_rating: Set(0.0),
            rating_count: Set(0),
            created_at: Set(Utc::now().into()),
        }
        .insert(&self.state.orm)
        .await?;
        Ok(product)
    }
}

pub fn customer(name: &str) -> CurrentUser {
    CurrentUser {
        id: Uuid::new_v4(),
        login: name.to_lowercase(),
        display_name: Some(name.to_string()),
    }
}

/// First DejaVu Sans found in the usual system locations.
pub fn find_receipt_font() -> Option<PathBuf> {
    [
        "assets/fonts/DejaVuSans.ttf",
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/TTF/DejaVuSans.ttf",
        "/usr/share/fonts/dejavu-sans-fonts/DejaVuSans.ttf",
    ]
    .into_iter()
    .map(PathBuf::from)
    .find(|path| path.exists())
}
