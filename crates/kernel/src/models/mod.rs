//! Catalog data models.

pub mod product;

pub use product::{
    DATE_FORMAT, DESCRIPTION_MAX_CHARS, MAX_PRICE, MIN_PRICE, NAME_MAX_CHARS, Product,
    ProductForm, ProductInput, ValidationErrors,
};
