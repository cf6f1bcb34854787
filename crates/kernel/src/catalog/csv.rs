//! CSV export of product listings.

use std::fmt::Write as _;

use crate::models::{DATE_FORMAT, Product};

/// Header row of the export.
pub const CSV_HEADER: &str =
    "ID,Name,Type,Origin,Price,Stock Quantity,Description,Received Date";

/// Media type of the export.
pub const CSV_CONTENT_TYPE: &str = "text/csv; charset=utf-8";

/// Download filename of the export.
pub const CSV_FILENAME: &str = "products.csv";

/// Render products as CSV bytes.
///
/// Text columns are always quoted with embedded quotes doubled; the price has
/// exactly two decimals; a missing description is an empty quoted field.
pub fn export_csv(products: &[Product]) -> Vec<u8> {
    let mut out = String::with_capacity(CSV_HEADER.len() + 1 + products.len() * 96);
    out.push_str(CSV_HEADER);
    out.push('\n');

    for product in products {
        // Writing to a String cannot fail.
        let _ = writeln!(
            out,
            "{},{},{},{},{:.2},{},{},{}",
            product.id,
            quoted(&product.name),
            quoted(&product.tea_type),
            quoted(&product.origin),
            product.price,
            product.stock_quantity,
            quoted(product.description.as_deref().unwrap_or_default()),
            product.received_date.format(DATE_FORMAT),
        );
    }

    out.into_bytes()
}

fn quoted(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}
