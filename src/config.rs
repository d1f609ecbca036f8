use std::{env, path::PathBuf};

/// Which unit price the receipt and order views multiply quantities by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PricingPolicy {
    /// Current catalog price at render time.
    #[default]
    Live,
    /// Price recorded on the order item at checkout.
    Snapshot,
}

impl PricingPolicy {
    pub fn parse(value: &str) -> anyhow::Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "live" => Ok(Self::Live),
            "snapshot" => Ok(Self::Snapshot),
            other => anyhow::bail!("unknown RECEIPT_PRICING value: {other}"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReceiptConfig {
    pub shop_name: String,
    pub currency_symbol: String,
    pub font_path: PathBuf,
    pub logo_path: PathBuf,
    pub pricing: PricingPolicy,
}

impl Default for ReceiptConfig {
    fn default() -> Self {
        Self {
            shop_name: "MyShop".to_string(),
            currency_symbol: "₹".to_string(),
            font_path: PathBuf::from("assets/fonts/DejaVuSans.ttf"),
            logo_path: PathBuf::from("assets/logo.png"),
            pricing: PricingPolicy::Live,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt_secret: String,
    pub host: String,
    pub port: u16,
    pub receipt: ReceiptConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let jwt_secret = env::var("JWT_SECRET")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);

        let defaults = ReceiptConfig::default();
        let pricing = match env::var("RECEIPT_PRICING") {
            Ok(value) => PricingPolicy::parse(&value)?,
            Err(_) => defaults.pricing,
        };
        let receipt = ReceiptConfig {
            shop_name: env::var("SHOP_NAME").unwrap_or(defaults.shop_name),
            currency_symbol: env::var("CURRENCY_SYMBOL").unwrap_or(defaults.currency_symbol),
            font_path: env::var("RECEIPT_FONT_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.font_path),
            logo_path: env::var("RECEIPT_LOGO_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.logo_path),
            pricing,
        };

        Ok(Self {
            port,
            database_url,
            jwt_secret,
            host,
            receipt,
        })
    }
}
