//! Product model, form binding, and field validation.
//!
//! A product is a single tea in the catalog. The store assigns `id`; every
//! other field is supplied by the product form and checked here before any
//! write reaches the store.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum name length in characters.
pub const NAME_MAX_CHARS: usize = 100;

/// Maximum description length in characters.
pub const DESCRIPTION_MAX_CHARS: usize = 500;

/// Lowest accepted price.
pub const MIN_PRICE: f64 = 5.0;

/// Highest accepted price.
pub const MAX_PRICE: f64 = 100.0;

/// Date format used by the form and the CSV export.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Product record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    /// Store-assigned identifier.
    pub id: i64,

    /// Display name.
    pub name: String,

    /// Category label (open set, e.g. "Green", "Oolong").
    pub tea_type: String,

    /// Country or region of origin.
    pub origin: String,

    /// Unit price, within [`MIN_PRICE`, `MAX_PRICE`].
    pub price: f64,

    /// Units in stock.
    pub stock_quantity: i32,

    /// Optional free text.
    pub description: Option<String>,

    /// Date the stock was received.
    pub received_date: NaiveDate,
}

impl Product {
    /// Build a product from validated input and a store-assigned id.
    pub fn from_input(id: i64, input: ProductInput) -> Self {
        Self {
            id,
            name: input.name,
            tea_type: input.tea_type,
            origin: input.origin,
            price: input.price,
            stock_quantity: input.stock_quantity,
            description: input.description,
            received_date: input.received_date,
        }
    }
}

/// Typed input for creating or overwriting a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductInput {
    pub name: String,
    pub tea_type: String,
    pub origin: String,
    pub price: f64,
    pub stock_quantity: i32,
    pub description: Option<String>,
    pub received_date: NaiveDate,
}

impl ProductInput {
    /// Check every field constraint, collecting all failures.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();

        if self.name.trim().is_empty() {
            errors.add("name", "Name is required.");
        } else if self.name.chars().count() > NAME_MAX_CHARS {
            errors.add("name", "Name cannot exceed 100 characters.");
        }

        if self.tea_type.trim().is_empty() {
            errors.add("tea_type", "Tea type is required.");
        }

        if self.origin.trim().is_empty() {
            errors.add("origin", "Origin is required.");
        }

        if !self.price.is_finite() {
            errors.add("price", "Price must be a number.");
        } else if self.price < MIN_PRICE {
            errors.add("price", "Price must be at least 5.");
        } else if self.price > MAX_PRICE {
            errors.add("price", "Price cannot exceed 100.");
        }

        if self.stock_quantity < 0 {
            errors.add("stock_quantity", "Stock quantity cannot be negative.");
        }

        if let Some(description) = &self.description
            && description.chars().count() > DESCRIPTION_MAX_CHARS
        {
            errors.add("description", "Description cannot exceed 500 characters.");
        }

        errors.into_result()
    }
}

/// Raw product form payload, exactly as the browser submits it.
///
/// Also used to refill the form: every value is kept as text so a rejected
/// submission redisplays what the user typed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductForm {
    pub name: Option<String>,
    pub tea_type: Option<String>,
    pub origin: Option<String>,
    pub price: Option<String>,
    pub stock_quantity: Option<String>,
    pub description: Option<String>,
    pub received_date: Option<String>,
}

impl ProductForm {
    /// Parse and validate the form into a [`ProductInput`].
    ///
    /// Text fields are trimmed and an empty description becomes `None`.
    pub fn into_input(self) -> Result<ProductInput, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let price = parse_required(
            self.price.as_deref(),
            "price",
            "Price is required.",
            "Price must be a number.",
            &mut errors,
            |raw| raw.parse::<f64>().ok().filter(|p| p.is_finite()),
        );
        let stock_quantity = parse_required(
            self.stock_quantity.as_deref(),
            "stock_quantity",
            "Stock quantity is required.",
            "Stock quantity must be a whole number.",
            &mut errors,
            |raw| raw.parse::<i32>().ok(),
        );
        let received_date = parse_required(
            self.received_date.as_deref(),
            "received_date",
            "Received date is required.",
            "Received date must be a valid date (YYYY-MM-DD).",
            &mut errors,
            |raw| NaiveDate::parse_from_str(raw, DATE_FORMAT).ok(),
        );

        // Unparsed fields fall back to in-range placeholders so that the
        // remaining checks report only the text fields.
        let input = ProductInput {
            name: trimmed(self.name),
            tea_type: trimmed(self.tea_type),
            origin: trimmed(self.origin),
            price: price.unwrap_or(MIN_PRICE),
            stock_quantity: stock_quantity.unwrap_or(0),
            description: self
                .description
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
            received_date: received_date.unwrap_or_default(),
        };

        if let Err(more) = input.validate() {
            errors.merge(more);
        }

        errors.into_result().map(|()| input)
    }
}

impl From<&Product> for ProductForm {
    fn from(product: &Product) -> Self {
        Self {
            name: Some(product.name.clone()),
            tea_type: Some(product.tea_type.clone()),
            origin: Some(product.origin.clone()),
            price: Some(format!("{:.2}", product.price)),
            stock_quantity: Some(product.stock_quantity.to_string()),
            description: product.description.clone(),
            received_date: Some(product.received_date.format(DATE_FORMAT).to_string()),
        }
    }
}

fn trimmed(value: Option<String>) -> String {
    value.map(|v| v.trim().to_string()).unwrap_or_default()
}

fn parse_required<T>(
    raw: Option<&str>,
    field: &'static str,
    missing: &str,
    invalid: &str,
    errors: &mut ValidationErrors,
    parse: impl FnOnce(&str) -> Option<T>,
) -> Option<T> {
    let raw = raw.map(str::trim).filter(|v| !v.is_empty());
    let Some(raw) = raw else {
        errors.add(field, missing);
        return None;
    };
    let parsed = parse(raw);
    if parsed.is_none() {
        errors.add(field, invalid);
    }
    parsed
}

/// Field-level validation failures, keyed by form field name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Error)]
#[error("invalid product: {} field(s) rejected", .fields.len())]
#[serde(transparent)]
pub struct ValidationErrors {
    fields: BTreeMap<&'static str, Vec<String>>,
}

impl ValidationErrors {
    /// Record a message against a field.
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.fields.entry(field).or_default().push(message.into());
    }

    /// Absorb another set of failures.
    pub fn merge(&mut self, other: ValidationErrors) {
        for (field, messages) in other.fields {
            self.fields.entry(field).or_default().extend(messages);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Messages recorded for a field.
    pub fn field(&self, field: &str) -> &[String] {
        self.fields.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    /// Whether a field has at least one failure.
    pub fn has(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}
