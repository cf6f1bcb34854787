//! Teahouse test utilities.
//!
//! Helpers for integration testing: product fixtures, form body builders,
//! and assertion utilities for catalog testing.

use chrono::NaiveDate;

/// Create a test product with default values.
pub fn test_product(name: &str) -> TestProduct {
    TestProduct {
        name: name.to_string(),
        tea_type: "Green".to_string(),
        origin: "China".to_string(),
        price: 12.5,
        stock_quantity: 10,
        description: None,
        received_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap_or_default(),
    }
}

/// A test product builder for creating catalog fixtures.
#[derive(Debug, Clone)]
pub struct TestProduct {
    pub name: String,
    pub tea_type: String,
    pub origin: String,
    pub price: f64,
    pub stock_quantity: i32,
    pub description: Option<String>,
    pub received_date: NaiveDate,
}

impl TestProduct {
    /// Set the tea type (category).
    pub fn with_type(mut self, tea_type: &str) -> Self {
        self.tea_type = tea_type.to_string();
        self
    }

    /// Set the origin.
    pub fn with_origin(mut self, origin: &str) -> Self {
        self.origin = origin.to_string();
        self
    }

    /// Set the price.
    pub fn with_price(mut self, price: f64) -> Self {
        self.price = price;
        self
    }

    /// Set the stock quantity.
    pub fn with_stock(mut self, stock_quantity: i32) -> Self {
        self.stock_quantity = stock_quantity;
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    /// Set the received date.
    pub fn received_on(mut self, year: i32, month: u32, day: u32) -> Self {
        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
            self.received_date = date;
        }
        self
    }

    /// Form field pairs as the product form submits them.
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("name", self.name.clone()),
            ("tea_type", self.tea_type.clone()),
            ("origin", self.origin.clone()),
            ("price", self.price.to_string()),
            ("stock_quantity", self.stock_quantity.to_string()),
            ("description", self.description.clone().unwrap_or_default()),
            (
                "received_date",
                self.received_date.format("%Y-%m-%d").to_string(),
            ),
        ]
    }

    /// URL-encoded form body for POST requests.
    pub fn form_body(&self) -> String {
        encode_form(&self.form_fields())
    }
}

/// URL-encode a list of form fields.
pub fn encode_form(fields: &[(&str, String)]) -> String {
    fields
        .iter()
        .map(|(key, value)| format!("{key}={}", urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Assertion helpers for rendered output.
pub mod assert {
    /// Assert that a string contains a substring.
    pub fn contains(haystack: &str, needle: &str) {
        assert!(
            haystack.contains(needle),
            "Expected string to contain '{needle}'\nActual: {haystack}"
        );
    }

    /// Assert that a string does not contain a substring.
    pub fn not_contains(haystack: &str, needle: &str) {
        assert!(
            !haystack.contains(needle),
            "Expected string NOT to contain '{needle}'\nActual: {haystack}"
        );
    }
}
