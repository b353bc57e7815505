//! # till-invoice: PDF Invoice Rendering for Till POS
//!
//! `Order` graph in, PDF bytes out. The caller resolves shop branding from
//! the settings store into a [`ShopInfo`] and hands over the order with its
//! already-loaded items; nothing here reads the database or the network.
//!
//! Rendering happens in two steps:
//!
//! 1. [`layout::InvoiceLayout::build`] turns the order into plain text rows
//!    and totals. Deterministic for a given order + settings snapshot.
//! 2. [`render_invoice`] draws that layout onto A4 pages with printpdf's
//!    built-in Helvetica fonts.

pub mod layout;

use printpdf::{BuiltinFont, IndirectFontRef, Line, Mm, PdfDocument, PdfLayerReference, Point};
use thiserror::Error;

use layout::InvoiceLayout;
use till_core::{Order, OrderItem};

// =============================================================================
// Shop Info
// =============================================================================

/// Shop branding shown on invoices, resolved from settings by the caller.
#[derive(Debug, Clone)]
pub struct ShopInfo {
    pub name: String,
    pub address: String,
    pub phone: String,
    pub footer: String,
}

/// Hardcoded fallbacks for when the settings store has no values.
impl Default for ShopInfo {
    fn default() -> Self {
        ShopInfo {
            name: "Trio Snacks".to_string(),
            address: String::new(),
            phone: String::new(),
            footer: "Thank you for your business!".to_string(),
        }
    }
}

// =============================================================================
// Errors
// =============================================================================

/// Invoice rendering errors.
#[derive(Debug, Error)]
pub enum InvoiceError {
    /// The PDF backend rejected the document.
    #[error("PDF rendering failed: {0}")]
    Render(String),
}

impl From<printpdf::Error> for InvoiceError {
    fn from(err: printpdf::Error) -> Self {
        InvoiceError::Render(err.to_string())
    }
}

// =============================================================================
// Rendering
// =============================================================================

// A4 in millimeters.
const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN_LEFT: f32 = 15.0;
const MARGIN_RIGHT: f32 = 195.0;
const MARGIN_BOTTOM: f32 = 25.0;

// Item table column x positions.
const COL_SERIAL: f32 = 15.0;
const COL_NAME: f32 = 30.0;
const COL_QTY: f32 = 120.0;
const COL_UNIT: f32 = 140.0;
const COL_TOTAL: f32 = 170.0;

const ROW_HEIGHT: f32 = 7.0;

/// Renders an order as a PDF invoice.
///
/// Items must belong to the order and be in display order; the repository
/// query already returns them sorted by position.
pub fn render_invoice(
    order: &Order,
    items: &[OrderItem],
    shop: &ShopInfo,
) -> Result<Vec<u8>, InvoiceError> {
    let layout = InvoiceLayout::build(order, items, shop);

    let (doc, page, layer) = PdfDocument::new(
        format!("Invoice {}", order.invoice_number),
        Mm(PAGE_WIDTH),
        Mm(PAGE_HEIGHT),
        "invoice",
    );

    let font = doc.add_builtin_font(BuiltinFont::Helvetica)?;
    let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold)?;

    let mut page_layer = doc.get_page(page).get_layer(layer);
    let mut y = PAGE_HEIGHT - 20.0;

    // Shop header block.
    page_layer.use_text(layout.shop_name.clone(), 20.0, Mm(MARGIN_LEFT), Mm(y), &bold);
    y -= 10.0;
    for line in &layout.shop_lines {
        page_layer.use_text(line.clone(), 10.0, Mm(MARGIN_LEFT), Mm(y), &font);
        y -= 5.0;
    }
    y -= 5.0;

    // Invoice number and timestamp.
    for (label, value) in &layout.meta {
        page_layer.use_text(label.clone(), 10.0, Mm(MARGIN_LEFT), Mm(y), &bold);
        page_layer.use_text(value.clone(), 10.0, Mm(COL_QTY - 45.0), Mm(y), &font);
        y -= 6.0;
    }
    y -= 6.0;

    // Item table.
    draw_table_header(&page_layer, &bold, y);
    y -= ROW_HEIGHT;

    for row in &layout.rows {
        if y < MARGIN_BOTTOM {
            let (next_page, next_layer) =
                doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "invoice");
            page_layer = doc.get_page(next_page).get_layer(next_layer);
            y = PAGE_HEIGHT - 20.0;
            draw_table_header(&page_layer, &bold, y);
            y -= ROW_HEIGHT;
        }

        page_layer.use_text(row.serial.clone(), 10.0, Mm(COL_SERIAL), Mm(y), &font);
        page_layer.use_text(row.name.clone(), 10.0, Mm(COL_NAME), Mm(y), &font);
        page_layer.use_text(row.quantity.clone(), 10.0, Mm(COL_QTY), Mm(y), &font);
        page_layer.use_text(row.unit_price.clone(), 10.0, Mm(COL_UNIT), Mm(y), &font);
        page_layer.use_text(row.line_total.clone(), 10.0, Mm(COL_TOTAL), Mm(y), &font);
        y -= ROW_HEIGHT;
    }

    draw_rule(&page_layer, y + ROW_HEIGHT - 2.0);
    y -= 4.0;

    // Totals block, right-aligned column pair.
    for (label, value) in &layout.totals {
        page_layer.use_text(label.clone(), 11.0, Mm(COL_QTY), Mm(y), &bold);
        page_layer.use_text(value.clone(), 11.0, Mm(COL_TOTAL), Mm(y), &font);
        y -= ROW_HEIGHT;
    }

    // Footer text.
    y -= 10.0;
    if y < MARGIN_BOTTOM {
        y = MARGIN_BOTTOM;
    }
    page_layer.use_text(layout.footer.clone(), 9.0, Mm(MARGIN_LEFT), Mm(y), &font);

    Ok(doc.save_to_bytes()?)
}

fn draw_table_header(layer: &PdfLayerReference, bold: &IndirectFontRef, y: f32) {
    layer.use_text("S.No", 10.0, Mm(COL_SERIAL), Mm(y), bold);
    layer.use_text("Item", 10.0, Mm(COL_NAME), Mm(y), bold);
    layer.use_text("Qty", 10.0, Mm(COL_QTY), Mm(y), bold);
    layer.use_text("Unit Price", 10.0, Mm(COL_UNIT), Mm(y), bold);
    layer.use_text("Total", 10.0, Mm(COL_TOTAL), Mm(y), bold);
    draw_rule(layer, y - 2.0);
}

fn draw_rule(layer: &PdfLayerReference, y: f32) {
    let rule = Line {
        points: vec![
            (Point::new(Mm(MARGIN_LEFT), Mm(y)), false),
            (Point::new(Mm(MARGIN_RIGHT), Mm(y)), false),
        ],
        is_closed: false,
    };
    layer.add_line(rule);
}

// =============================================================================
// Unit Tests
// =============================================================================
