//! Product catalog pages.
//!
//! Listing with search, category filter, sorting and pagination; the add and
//! edit forms; delete; and CSV export of the current filter.

use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Form, Router};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::{debug, error, warn};

use crate::catalog::csv::{CSV_CONTENT_TYPE, CSV_FILENAME};
use crate::catalog::{
    ALL_CATEGORIES, CatalogError, Page, PageRequest, ProductQuery, Sort, SortDirection, SortField,
};
use crate::error::AppResult;
use crate::models::{ProductForm, ValidationErrors};
use crate::routes::helpers::{parse_id, query_string, render_template};
use crate::session::{Flash, set_flash, take_flash};
use crate::state::AppState;

const DEFAULT_SORT_FIELD: &str = "name";
const DEFAULT_PAGE_SIZE: u64 = 10;
const MAX_PAGE_SIZE: u64 = 100;
/// Highest page index honored; larger requests land on this (empty) page.
const MAX_PAGE: u64 = u32::MAX as u64;

const TITLE_NEW: &str = "Add a new tea";
const TITLE_EDIT: &str = "Edit tea";

const MSG_ADDED: &str = "Product added successfully.";
const MSG_UPDATED: &str = "Product updated successfully.";
const MSG_DELETED: &str = "Product deleted successfully.";
const MSG_NOT_FOUND: &str = "Product not found.";
const MSG_DELETE_FAILED: &str = "Error deleting product.";
const MSG_LOAD_FAILED: &str = "Failed to load products.";
const MSG_PRODUCT_LOAD_FAILED: &str = "Failed to load product.";
const MSG_EXPORT_FAILED: &str = "Failed to export products.";

/// Create the product router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products))
        .route("/new", get(new_product_form))
        .route("/save", post(save_product))
        .route("/edit/{id}", get(edit_product_form).post(update_product))
        .route("/delete/{id}", get(delete_product))
        .route("/export-csv", get(export_products_csv))
}

/// Listing query parameters.
///
/// Kept as text so malformed numbers fall back to defaults instead of
/// rejecting the request.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ListParams {
    search: Option<String>,
    category: Option<String>,
    #[serde(rename = "sortField")]
    sort_field: Option<String>,
    direction: Option<String>,
    page: Option<String>,
    size: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ExportParams {
    search: Option<String>,
    category: Option<String>,
}

/// A sortable column header.
#[derive(Debug, Serialize)]
struct SortLink {
    label: &'static str,
    href: String,
    active: bool,
}

fn column_label(field: SortField) -> &'static str {
    match field {
        SortField::Id => "ID",
        SortField::Name => "Name",
        SortField::TeaType => "Type",
        SortField::Origin => "Origin",
        SortField::Price => "Price",
        SortField::StockQuantity => "Stock",
        SortField::ReceivedDate => "Received",
    }
}

fn parse_number(raw: Option<&str>, default: u64) -> u64 {
    raw.and_then(|v| v.trim().parse().ok()).unwrap_or(default)
}

/// Listing page.
async fn list_products(
    State(state): State<AppState>,
    session: Session,
    Query(params): Query<ListParams>,
) -> Response {
    let requested_field = params
        .sort_field
        .as_deref()
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .unwrap_or(DEFAULT_SORT_FIELD);
    let direction = SortDirection::parse(params.direction.as_deref().unwrap_or_default());

    let field = match requested_field.parse::<SortField>() {
        Ok(field) => field,
        Err(e) => {
            warn!(error = %e, "rejected listing sort field");
            set_flash(
                &session,
                Flash::error(format!("Cannot sort by \"{requested_field}\".")),
            )
            .await;
            return Redirect::to("/").into_response();
        }
    };

    let sort = Sort::new(field, direction);
    let page = parse_number(params.page.as_deref(), 0).min(MAX_PAGE);
    let size = parse_number(params.size.as_deref(), DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
    let request = PageRequest::new(page, size, sort);

    let search = params.search.as_deref().unwrap_or_default();
    let category = params.category.as_deref().unwrap_or(ALL_CATEGORIES);

    let query = ProductQuery::select(Some(search), Some(category));
    let result = if query.is_filtered() {
        state
            .catalog()
            .search_and_filter_paged(Some(search), Some(category), &request)
            .await
    } else {
        state.catalog().list(&request).await
    };

    let (products, load_error) = match result {
        Ok(products) => (products, None),
        Err(e) => {
            error!(error = %e, "failed to load product listing");
            (Page::new(Vec::new(), &request, 0), Some(MSG_LOAD_FAILED))
        }
    };
    debug!(
        ?query,
        page,
        size,
        total = products.total_elements,
        "product listing"
    );

    let size_param = size.to_string();
    let sort_links: Vec<SortLink> = SortField::ALL
        .into_iter()
        .map(|f| {
            let active = f == field;
            let link_direction = if active {
                direction.reversed()
            } else {
                SortDirection::Asc
            };
            SortLink {
                label: column_label(f),
                href: query_string([
                    ("search", search),
                    ("category", category),
                    ("sortField", f.as_param()),
                    ("direction", link_direction.as_str()),
                    ("size", size_param.as_str()),
                ]),
                active,
            }
        })
        .collect();

    let filter_query = query_string([("search", search), ("category", category)]);
    let page_query = query_string([
        ("search", search),
        ("category", category),
        ("sortField", field.as_param()),
        ("direction", direction.as_str()),
        ("size", size_param.as_str()),
    ]);

    let mut context = tera::Context::new();
    context.insert("flash", &take_flash(&session).await);
    context.insert("error", &load_error);
    context.insert("search", search);
    context.insert("category", category);
    context.insert("categories", state.categories());
    context.insert("sort_field", field.as_param());
    context.insert("direction", direction.as_str());
    context.insert("page_size", &size);
    context.insert("sort_links", &sort_links);
    context.insert("filter_query", &filter_query);
    context.insert("page_query", &page_query);
    context.insert("current_page", &products.page);
    context.insert("total_pages", &products.total_pages);
    context.insert("total_items", &products.total_elements);
    context.insert("has_previous", &products.has_previous());
    context.insert("has_next", &products.has_next());
    context.insert("products", &products.content);

    render_template(&state, "products/list.html", &context)
}

/// Render the product form.
fn render_form(
    state: &AppState,
    title: &str,
    action: &str,
    values: &ProductForm,
    errors: &ValidationErrors,
) -> Response {
    let mut context = tera::Context::new();
    context.insert("flash", &None::<Flash>);
    context.insert("title", title);
    context.insert("action", action);
    context.insert("values", values);
    context.insert("errors", errors);
    context.insert("categories", state.categories());
    context.insert("origins", state.origins());
    render_template(state, "products/form.html", &context)
}

async fn redirect_with(session: &Session, flash: Flash) -> Response {
    set_flash(session, flash).await;
    Redirect::to("/").into_response()
}

/// Empty add form.
async fn new_product_form(State(state): State<AppState>) -> Response {
    render_form(
        &state,
        TITLE_NEW,
        "/save",
        &ProductForm::default(),
        &ValidationErrors::default(),
    )
}

/// Create a product from the add form.
async fn save_product(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<ProductForm>,
) -> AppResult<Response> {
    let input = match form.clone().into_input() {
        Ok(input) => input,
        Err(errors) => {
            debug!(?errors, "product form rejected");
            return Ok(render_form(&state, TITLE_NEW, "/save", &form, &errors));
        }
    };

    match state.catalog().create(input).await {
        Ok(_) => Ok(redirect_with(&session, Flash::message(MSG_ADDED)).await),
        Err(CatalogError::Validation(errors)) => {
            Ok(render_form(&state, TITLE_NEW, "/save", &form, &errors))
        }
        Err(e) => Err(e.into()),
    }
}

/// Edit form pre-filled from the stored product.
async fn edit_product_form(
    State(state): State<AppState>,
    session: Session,
    Path(raw_id): Path<String>,
) -> Response {
    let found = match parse_id(&raw_id) {
        Some(id) => state.catalog().find(id).await,
        None => Ok(None),
    };

    let product = match found {
        Ok(Some(product)) => product,
        Ok(None) => {
            warn!(id = %raw_id, "edit requested for unknown product");
            return redirect_with(&session, Flash::error(MSG_NOT_FOUND)).await;
        }
        Err(e) => {
            error!(id = %raw_id, error = %e, "failed to load product for editing");
            return redirect_with(&session, Flash::error(MSG_PRODUCT_LOAD_FAILED)).await;
        }
    };

    render_form(
        &state,
        TITLE_EDIT,
        &format!("/edit/{}", product.id),
        &ProductForm::from(&product),
        &ValidationErrors::default(),
    )
}

/// Overwrite a product from the edit form.
async fn update_product(
    State(state): State<AppState>,
    session: Session,
    Path(raw_id): Path<String>,
    Form(form): Form<ProductForm>,
) -> AppResult<Response> {
    let Some(id) = parse_id(&raw_id) else {
        warn!(id = %raw_id, "update requested for unknown product");
        return Ok(redirect_with(&session, Flash::error(MSG_NOT_FOUND)).await);
    };
    let action = format!("/edit/{id}");

    let input = match form.clone().into_input() {
        Ok(input) => input,
        Err(errors) => {
            debug!(product_id = id, ?errors, "product form rejected");
            return Ok(render_form(&state, TITLE_EDIT, &action, &form, &errors));
        }
    };

    match state.catalog().update(id, input).await {
        Ok(_) => Ok(redirect_with(&session, Flash::message(MSG_UPDATED)).await),
        Err(CatalogError::NotFound(_)) => {
            warn!(product_id = id, "update requested for unknown product");
            Ok(redirect_with(&session, Flash::error(MSG_NOT_FOUND)).await)
        }
        Err(CatalogError::Validation(errors)) => {
            Ok(render_form(&state, TITLE_EDIT, &action, &form, &errors))
        }
        Err(e) => Err(e.into()),
    }
}

/// Delete a product. Failures become a flash message, never an error page.
async fn delete_product(
    State(state): State<AppState>,
    session: Session,
    Path(raw_id): Path<String>,
) -> Response {
    let deleted = match parse_id(&raw_id) {
        Some(id) => state.catalog().delete(id).await.is_ok(),
        None => {
            warn!(id = %raw_id, "delete requested for unknown product");
            false
        }
    };

    let flash = if deleted {
        Flash::message(MSG_DELETED)
    } else {
        Flash::error(MSG_DELETE_FAILED)
    };
    redirect_with(&session, flash).await
}

/// Download the products matching the search and category as CSV.
async fn export_products_csv(
    State(state): State<AppState>,
    session: Session,
    Query(params): Query<ExportParams>,
) -> Response {
    let products = match state
        .catalog()
        .search_and_filter(params.search.as_deref(), params.category.as_deref())
        .await
    {
        Ok(products) => products,
        Err(e) => {
            error!(error = %e, "failed to load products for CSV export");
            return redirect_with(&session, Flash::error(MSG_EXPORT_FAILED)).await;
        }
    };
    debug!(count = products.len(), "exporting products as CSV");

    let body = state.catalog().export_csv(&products);
    (
        [
            (header::CONTENT_TYPE, CSV_CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{CSV_FILENAME}\""),
            ),
        ],
        body,
    )
        .into_response()
}
