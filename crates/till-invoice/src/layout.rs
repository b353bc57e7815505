//! # Invoice Layout
//!
//! The deterministic half of invoice rendering: everything that appears on
//! the page, as plain strings, before any PDF drawing happens. Given the
//! same order and settings snapshot, the layout is always identical.

use till_core::{Money, Order, OrderItem};

use crate::ShopInfo;

/// Fixed currency prefix on every printed amount.
pub const CURRENCY_PREFIX: &str = "Rs. ";

/// Formats a money value for the invoice ("Rs. 26.25").
pub fn format_money(amount: Money) -> String {
    format!("{}{}", CURRENCY_PREFIX, amount)
}

/// One row of the itemized table, fully formatted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRow {
    pub serial: String,
    pub name: String,
    pub quantity: String,
    pub unit_price: String,
    pub line_total: String,
}

/// Everything printed on the invoice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceLayout {
    /// Shop display name (header title).
    pub shop_name: String,
    /// Address and phone lines under the title; empty values are omitted.
    pub shop_lines: Vec<String>,
    /// Label/value pairs: invoice number, timestamp.
    pub meta: Vec<(String, String)>,
    /// Itemized rows, in order position.
    pub rows: Vec<ItemRow>,
    /// Totals block. The discount row only appears when discount > 0.
    pub totals: Vec<(String, String)>,
    /// Footer text from settings.
    pub footer: String,
}

impl InvoiceLayout {
    /// Builds the layout for an order. Item names come from the snapshots
    /// frozen at checkout, so a later product rename never changes the
    /// printed invoice.
    pub fn build(order: &Order, items: &[OrderItem], shop: &ShopInfo) -> Self {
        let mut shop_lines = Vec::new();
        if !shop.address.is_empty() {
            shop_lines.push(shop.address.clone());
        }
        if !shop.phone.is_empty() {
            shop_lines.push(format!("Phone: {}", shop.phone));
        }

        let meta = vec![
            (
                "Invoice Number:".to_string(),
                order.invoice_number.clone(),
            ),
            (
                "Date:".to_string(),
                order.created_at.format("%d-%m-%Y %H:%M:%S").to_string(),
            ),
        ];

        let rows = items
            .iter()
            .enumerate()
            .map(|(idx, item)| ItemRow {
                serial: (idx + 1).to_string(),
                name: item.name_snapshot.clone(),
                quantity: item.quantity.to_string(),
                unit_price: format_money(item.unit_price()),
                line_total: format_money(item.line_total()),
            })
            .collect();

        let mut totals = vec![(
            "Subtotal:".to_string(),
            format_money(order.subtotal()),
        )];
        if order.discount_cents > 0 {
            totals.push((
                "Discount:".to_string(),
                format!("-{}", format_money(order.discount())),
            ));
        }
        totals.push((
            "Total Amount:".to_string(),
            format_money(order.total()),
        ));

        InvoiceLayout {
            shop_name: shop.name.clone(),
            shop_lines,
            meta,
            rows,
            totals,
            footer: shop.footer.clone(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
