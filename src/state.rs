use std::sync::Arc;

use crate::{config::ReceiptConfig, db::OrmConn};

#[derive(Clone)]
pub struct AppState {
    pub orm: OrmConn,
    pub jwt_secret: Arc<str>,
    pub receipt: Arc<ReceiptConfig>,
}
