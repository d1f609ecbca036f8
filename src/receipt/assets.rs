use std::path::Path;

use printpdf::image_crate;

use super::Header;
use crate::error::{AppError, AppResult};

/// TrueType font bytes verified to cover the currency glyphs.
#[derive(Debug, Clone)]
pub struct ReceiptFont {
    bytes: Vec<u8>,
}

impl ReceiptFont {
    /// Parse `bytes` and require a glyph for every char in `required`.
    pub fn from_bytes(bytes: Vec<u8>, required: &str) -> AppResult<Self> {
        let face = ttf_parser::Face::parse(&bytes, 0)
            .map_err(|err| AppError::AssetMissing(format!("receipt font is unreadable: {err}")))?;

        if let Some(missing) = required.chars().find(|ch| face.glyph_index(*ch).is_none()) {
            return Err(AppError::AssetMissing(format!(
                "receipt font has no glyph for {missing:?}"
            )));
        }

        Ok(Self { bytes })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn face(&self) -> AppResult<ttf_parser::Face<'_>> {
        ttf_parser::Face::parse(&self.bytes, 0)
            .map_err(|err| AppError::AssetMissing(format!("receipt font is unreadable: {err}")))
    }
}

/// Load the receipt font. A missing or incomplete font is fatal: amounts
/// printed without the currency glyph would be wrong.
pub async fn load_font(path: &Path, currency_symbol: &str) -> AppResult<ReceiptFont> {
    let bytes = tokio::fs::read(path).await.map_err(|err| {
        AppError::AssetMissing(format!("receipt font {}: {err}", path.display()))
    })?;
    ReceiptFont::from_bytes(bytes, currency_symbol)
}

/// Load the shop logo, falling back to a text title on any failure.
pub async fn load_logo(path: &Path, shop_name: &str) -> Header {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "logo unavailable, using text title");
            return Header::Title(shop_name.to_string());
        }
    };

    match image_crate::load_from_memory(&bytes) {
        Ok(image) => Header::Logo(image),
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "logo undecodable, using text title");
            Header::Title(shop_name.to_string())
        }
    }
}
