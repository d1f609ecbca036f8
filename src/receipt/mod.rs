//! Printable order receipts.
//!
//! [`ReceiptLayout::build`] shapes an order into the rows and strings that go
//! on the page; [`pdf::render`] turns a layout into PDF bytes with an
//! explicitly loaded TrueType font.

pub mod assets;
pub mod pdf;

use chrono::{DateTime, Utc};
use printpdf::image_crate::DynamicImage;
use uuid::Uuid;

use crate::{error::AppResult, models::PaymentMethod, money::Money};

pub const RECEIPT_TITLE: &str = "Order Receipt";
pub const TABLE_HEADER: [&str; 3] = ["Product", "Quantity", "Subtotal"];

/// Top of the receipt: the shop logo, or the shop name when no logo loaded.
#[derive(Debug, Clone)]
pub enum Header {
    Logo(DynamicImage),
    Title(String),
}

/// One billed line, already priced.
#[derive(Debug, Clone)]
pub struct ReceiptLine {
    pub product_name: String,
    pub quantity: i32,
    pub subtotal: Money,
}

/// Everything the receipt needs to know about the order.
#[derive(Debug, Clone)]
pub struct ReceiptInput<'a> {
    pub order_id: Uuid,
    pub customer_name: &'a str,
    pub payment_method: PaymentMethod,
    pub address: &'a str,
    pub order_total: Money,
    pub lines: &'a [ReceiptLine],
    pub generated_at: DateTime<Utc>,
    pub currency_symbol: &'a str,
}

#[derive(Debug, Clone)]
pub struct ReceiptLayout {
    pub document_title: String,
    pub header: Header,
    pub title: String,
    /// Customer and order details, one entry per printed line.
    pub info: Vec<String>,
    /// Header row, one row per item, then the grand total row.
    pub table: Vec<[String; 3]>,
    /// Sum of the table subtotals.
    pub table_total: Money,
}

impl ReceiptLayout {
    pub fn build(input: &ReceiptInput<'_>, header: Header) -> AppResult<Self> {
        let symbol = input.currency_symbol;

        let info = vec![
            format!("Customer: {}", input.customer_name),
            format!("Order ID: {}", input.order_id),
            format!("Date: {}", input.generated_at.format("%Y-%m-%d %H:%M:%S")),
            format!("Payment Method: {}", input.payment_method.label()),
            format!("Address: {}", input.address),
            format!("Total: {}", input.order_total.format_with(symbol)),
        ];

        let mut table = Vec::with_capacity(input.lines.len() + 2);
        table.push(TABLE_HEADER.map(String::from));

        let mut table_total = Money::ZERO;
        for line in input.lines {
            table_total = table_total.checked_add(line.subtotal)?;
            table.push([
                line.product_name.clone(),
                line.quantity.to_string(),
                line.subtotal.format_with(symbol),
            ]);
        }
        table.push([
            String::new(),
            "Total".to_string(),
            table_total.format_with(symbol),
        ]);

        Ok(Self {
            document_title: format!("Receipt {}", input.order_id),
            header,
            title: RECEIPT_TITLE.to_string(),
            info,
            table,
            table_total,
        })
    }

    /// Every string printed on the page, used for glyph coverage checks.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        let header = match &self.header {
            Header::Title(title) => Some(title.as_str()),
            Header::Logo(_) => None,
        };
        header
            .into_iter()
            .chain(std::iter::once(self.title.as_str()))
            .chain(self.info.iter().map(String::as_str))
            .chain(self.table.iter().flat_map(|row| row.iter().map(String::as_str)))
    }
}

/// Rendered receipt ready to be served as a download.
#[derive(Debug, Clone)]
pub struct ReceiptFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl ReceiptFile {
    pub fn filename_for(order_id: Uuid) -> String {
        format!("bill_{order_id}.pdf")
    }
}
