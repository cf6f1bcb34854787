//! Catalog query types.
//!
//! Provides the vocabulary shared by the query service and the stores:
//! - ProductQuery: which of the four filter shapes a request resolves to
//! - Sort: a validated sortable field plus direction
//! - PageRequest / Page: zero-indexed page windows with totals

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use super::CatalogError;

/// Category value meaning "no category filter".
pub const ALL_CATEGORIES: &str = "All";

/// Which products a query selects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductQuery {
    /// Every product.
    All,
    /// Name contains the term, case-insensitively.
    NameContains(String),
    /// Exact, case-sensitive category match.
    Category(String),
    /// Both of the above.
    NameAndCategory { term: String, category: String },
}

impl ProductQuery {
    /// Resolve optional request inputs into a query shape.
    ///
    /// A term is present when it is non-blank after trimming; a category is
    /// present when it is non-blank and not [`ALL_CATEGORIES`]. Terms are
    /// stored trimmed, categories as given.
    pub fn select(term: Option<&str>, category: Option<&str>) -> Self {
        match (present_term(term), present_category(category)) {
            (Some(term), Some(category)) => Self::NameAndCategory {
                term: term.to_string(),
                category: category.to_string(),
            },
            (Some(term), None) => Self::NameContains(term.to_string()),
            (None, Some(category)) => Self::Category(category.to_string()),
            (None, None) => Self::All,
        }
    }

    /// Whether this query narrows the catalog at all.
    pub fn is_filtered(&self) -> bool {
        !matches!(self, Self::All)
    }

    /// The name term, if any.
    pub fn term(&self) -> Option<&str> {
        match self {
            Self::NameContains(term) | Self::NameAndCategory { term, .. } => Some(term),
            _ => None,
        }
    }

    /// The category, if any.
    pub fn category(&self) -> Option<&str> {
        match self {
            Self::Category(category) | Self::NameAndCategory { category, .. } => Some(category),
            _ => None,
        }
    }
}

/// Trimmed term when present.
pub fn present_term(term: Option<&str>) -> Option<&str> {
    term.map(str::trim).filter(|t| !t.is_empty())
}

/// Category when present (non-blank and not the "All" sentinel).
pub fn present_category(category: Option<&str>) -> Option<&str> {
    category.filter(|c| !c.trim().is_empty() && *c != ALL_CATEGORIES)
}

/// Fields the catalog can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    Id,
    #[default]
    Name,
    TeaType,
    Origin,
    Price,
    StockQuantity,
    ReceivedDate,
}

impl SortField {
    pub const ALL: [SortField; 7] = [
        SortField::Id,
        SortField::Name,
        SortField::TeaType,
        SortField::Origin,
        SortField::Price,
        SortField::StockQuantity,
        SortField::ReceivedDate,
    ];

    /// Database column name.
    pub fn column(self) -> &'static str {
        match self {
            SortField::Id => "id",
            SortField::Name => "name",
            SortField::TeaType => "tea_type",
            SortField::Origin => "origin",
            SortField::Price => "price",
            SortField::StockQuantity => "stock_quantity",
            SortField::ReceivedDate => "received_date",
        }
    }

    /// Request parameter spelling.
    pub fn as_param(self) -> &'static str {
        match self {
            SortField::Id => "id",
            SortField::Name => "name",
            SortField::TeaType => "teaType",
            SortField::Origin => "origin",
            SortField::Price => "price",
            SortField::StockQuantity => "stockQuantity",
            SortField::ReceivedDate => "receivedDate",
        }
    }
}

impl FromStr for SortField {
    type Err = CatalogError;

    /// Accepts the request spelling or the column name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        SortField::ALL
            .into_iter()
            .find(|f| f.as_param() == wanted || f.column() == wanted)
            .ok_or_else(|| CatalogError::InvalidSortField(wanted.to_string()))
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_param())
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// `Desc` when the input is "desc" in any case, `Asc` otherwise.
    pub fn parse(direction: &str) -> Self {
        if direction.trim().eq_ignore_ascii_case("desc") {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    /// The other direction, for column header toggles.
    pub fn reversed(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

/// A single-field ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Sort {
    pub field: SortField,
    pub direction: SortDirection,
}

impl Sort {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    pub fn asc(field: SortField) -> Self {
        Self::new(field, SortDirection::Asc)
    }

    pub fn desc(field: SortField) -> Self {
        Self::new(field, SortDirection::Desc)
    }

    /// Parse request strings; the field must be a known sortable field.
    pub fn parse(field: &str, direction: &str) -> Result<Self, CatalogError> {
        Ok(Self::new(field.parse()?, SortDirection::parse(direction)))
    }
}

/// A zero-indexed page window with its ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub size: u64,
    pub sort: Sort,
}

impl PageRequest {
    pub fn new(page: u64, size: u64, sort: Sort) -> Self {
        Self { page, size, sort }
    }

    /// Number of rows to skip.
    pub fn offset(&self) -> u64 {
        self.page.saturating_mul(self.size)
    }
}

/// A page of results with pagination metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub page: u64,
    pub size: u64,
    pub total_elements: u64,
    pub total_pages: u64,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, request: &PageRequest, total_elements: u64) -> Self {
        let total_pages = if request.size == 0 {
            0
        } else {
            total_elements.div_ceil(request.size)
        };
        Self {
            content,
            page: request.page,
            size: request.size,
            total_elements,
            total_pages,
        }
    }

    pub fn has_previous(&self) -> bool {
        self.page > 0
    }

    pub fn has_next(&self) -> bool {
        self.page.saturating_add(1) < self.total_pages
    }
}
