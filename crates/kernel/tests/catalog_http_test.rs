#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Catalog page tests.
//!
//! Drives the real router: listing, search and filter, pagination, the add
//! and edit forms, delete, and CSV export.

mod common;

use axum::http::{StatusCode, header};
use teahouse_test_utils::{assert, encode_form, test_product};

use common::{TestApp, assert_redirects_home, body_string, extract_cookies};

fn five_teas() -> Vec<teahouse_test_utils::TestProduct> {
    vec![
        test_product("Jasmine Pearl").with_price(30.0),
        test_product("Assam Gold").with_type("Black").with_origin("India"),
        test_product("Green Mist").with_price(8.0),
        test_product("Darjeeling").with_type("Black").with_origin("India"),
        test_product("Green Dragon").with_stock(3),
    ]
}

// =============================================================================
// Listing
// =============================================================================

#[tokio::test]
async fn test_empty_listing_renders() {
    let app = TestApp::new();

    let response = app.get("/").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_string(response).await;
    assert::contains(&body, "No products found.");
    assert::contains(&body, "0 product(s), page 1 of 1");
}

#[tokio::test]
async fn test_listing_sorted_by_name_by_default() {
    let app = TestApp::new();
    app.seed(&five_teas()).await;

    let body = body_string(app.get("/").await).await;

    let positions: Vec<usize> = [
        "Assam Gold",
        "Darjeeling",
        "Green Dragon",
        "Green Mist",
        "Jasmine Pearl",
    ]
    .iter()
    .map(|name| body.find(name).unwrap())
    .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]), "{positions:?}");
    assert::contains(&body, "12.50");
}

#[tokio::test]
async fn test_listing_sort_desc_by_price() {
    let app = TestApp::new();
    app.seed(&five_teas()).await;

    let body = body_string(app.get("/?sortField=price&direction=DESC").await).await;

    let jasmine = body.find("Jasmine Pearl").unwrap();
    let mist = body.find("Green Mist").unwrap();
    assert!(jasmine < mist, "most expensive tea should come first");
}

#[tokio::test]
async fn test_listing_pagination_window() {
    let app = TestApp::new();
    app.seed(&five_teas()).await;

    let response = app.get("/?page=1&size=2").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;

    assert::contains(&body, "Green Dragon");
    assert::contains(&body, "Green Mist");
    assert::not_contains(&body, "Assam Gold");
    assert::not_contains(&body, "Jasmine Pearl");
    assert::contains(&body, "5 product(s), page 2 of 3");
}

#[tokio::test]
async fn test_listing_malformed_numbers_use_defaults() {
    let app = TestApp::new();
    app.seed(&five_teas()).await;

    let body = body_string(app.get("/?page=abc&size=-4").await).await;

    assert::contains(&body, "5 product(s), page 1 of 1");
    assert::contains(&body, "Jasmine Pearl");
}

#[tokio::test]
async fn test_listing_huge_page_renders_empty() {
    let app = TestApp::new();
    app.seed(&[test_product("Sencha")]).await;

    let response = app.get("/?page=18446744073709551615").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_string(response).await;
    assert::contains(&body, "No products found.");
    assert::contains(&body, "1 product(s)");
    assert::not_contains(&body, "Sencha");
}

#[tokio::test]
async fn test_listing_search_is_case_insensitive() {
    let app = TestApp::new();
    app.seed(&five_teas()).await;

    let body = body_string(app.get("/?search=%20green%20").await).await;

    assert::contains(&body, "Green Dragon");
    assert::contains(&body, "Green Mist");
    assert::not_contains(&body, "Darjeeling");
    assert::contains(&body, "2 product(s)");
}

#[tokio::test]
async fn test_listing_category_filter() {
    let app = TestApp::new();
    app.seed(&five_teas()).await;

    let body = body_string(app.get("/?category=Black").await).await;
    assert::contains(&body, "Assam Gold");
    assert::contains(&body, "Darjeeling");
    assert::not_contains(&body, "Jasmine Pearl");

    // "All" is the no-filter sentinel
    let body = body_string(app.get("/?category=All").await).await;
    assert::contains(&body, "5 product(s)");
}

#[tokio::test]
async fn test_listing_search_and_category_conjunction() {
    let app = TestApp::new();
    app.seed(&[
        test_product("Green Dragon"),
        test_product("Green Tip Assam").with_type("Black"),
        test_product("Lapsang").with_type("Black"),
    ])
    .await;

    let body = body_string(app.get("/?search=Green&category=Black").await).await;

    assert::contains(&body, "Green Tip Assam");
    assert::not_contains(&body, "Green Dragon");
    assert::not_contains(&body, "Lapsang");
}

#[tokio::test]
async fn test_listing_unknown_sort_field_redirects_with_error() {
    let app = TestApp::new();

    let response = app.get("/?sortField=bogus").await;
    let body = app.follow_redirect(&response).await;

    assert::contains(&body, "flash-error");
    assert::contains(&body, "Cannot sort by &quot;bogus&quot;.");
}

// =============================================================================
// Add form
// =============================================================================

#[tokio::test]
async fn test_new_form_renders_suggestions() {
    let app = TestApp::new();

    let response = app.get("/new").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_string(response).await;
    assert::contains(&body, "Add a new tea");
    assert::contains(&body, r#"<option value="Oolong">"#);
    assert::contains(&body, r#"<option value="Sri Lanka">"#);
}

#[tokio::test]
async fn test_save_creates_product_and_flashes() {
    let app = TestApp::new();

    let response = app
        .post_form("/save", test_product("Sencha").with_type("Green").form_body())
        .await;
    let body = app.follow_redirect(&response).await;

    assert::contains(&body, "Product added successfully.");
    assert::contains(&body, "Sencha");

    let stored = app.stored().await;
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].name, "Sencha");
    assert_eq!(stored[0].description, None);
}

#[tokio::test]
async fn test_flash_is_shown_once() {
    let app = TestApp::new();

    let response = app
        .post_form("/save", test_product("Sencha").form_body())
        .await;
    assert_redirects_home(&response);
    let cookies = extract_cookies(&response);

    let first = body_string(app.get_with_cookies("/", &cookies).await).await;
    assert::contains(&first, "Product added successfully.");

    let second = body_string(app.get_with_cookies("/", &cookies).await).await;
    assert::not_contains(&second, "Product added successfully.");
}

#[tokio::test]
async fn test_save_rejects_out_of_range_values() {
    let app = TestApp::new();

    let response = app
        .post_form(
            "/save",
            test_product("Cheap Tea")
                .with_price(2.0)
                .with_stock(-1)
                .form_body(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_string(response).await;
    assert::contains(&body, "Add a new tea");
    assert::contains(&body, "Price must be at least 5.");
    assert::contains(&body, "Stock quantity cannot be negative.");
    // Submitted values are kept
    assert::contains(&body, r#"value="Cheap Tea""#);

    assert!(app.stored().await.is_empty());
}

#[tokio::test]
async fn test_save_rejects_missing_fields() {
    let app = TestApp::new();

    let body = encode_form(&[
        ("name", "  ".to_string()),
        ("price", "abc".to_string()),
        ("received_date", "not-a-date".to_string()),
    ]);
    let response = app.post_form("/save", body).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_string(response).await;
    assert::contains(&body, "Name is required.");
    assert::contains(&body, "Tea type is required.");
    assert::contains(&body, "Origin is required.");
    assert::contains(&body, "Price must be a number.");
    assert::contains(&body, "Stock quantity is required.");
    assert::contains(&body, "Received date must be a valid date (YYYY-MM-DD).");

    assert!(app.stored().await.is_empty());
}

// =============================================================================
// Edit form
// =============================================================================

#[tokio::test]
async fn test_edit_form_prefilled() {
    let app = TestApp::new();
    let seeded = app
        .seed(&[test_product("Gyokuro")
            .with_price(45.0)
            .with_description("Shade grown")])
        .await;

    let response = app.get(&format!("/edit/{}", seeded[0].id)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_string(response).await;
    assert::contains(&body, "Edit tea");
    assert::contains(&body, r#"value="Gyokuro""#);
    assert::contains(&body, r#"value="45.00""#);
    assert::contains(&body, "Shade grown");
    assert::contains(&body, r#"value="2024-03-01""#);
}

#[tokio::test]
async fn test_edit_form_unknown_id_redirects() {
    let app = TestApp::new();

    for uri in ["/edit/999", "/edit/not-a-number"] {
        let response = app.get(uri).await;
        let body = app.follow_redirect(&response).await;
        assert::contains(&body, "Product not found.");
    }
}

#[tokio::test]
async fn test_update_overwrites_fields_and_keeps_id() {
    let app = TestApp::new();
    let seeded = app.seed(&[test_product("Gyokuro")]).await;
    let id = seeded[0].id;

    let form = test_product("Gyokuro Supreme")
        .with_type("Green")
        .with_origin("Japan")
        .with_price(60.0)
        .with_stock(4)
        .received_on(2024, 6, 1)
        .form_body();
    let response = app.post_form(&format!("/edit/{id}"), form).await;
    let body = app.follow_redirect(&response).await;
    assert::contains(&body, "Product updated successfully.");

    let stored = app.stored().await;
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id, id);
    assert_eq!(stored[0].name, "Gyokuro Supreme");
    assert_eq!(stored[0].origin, "Japan");
    assert_eq!(stored[0].price, 60.0);
    assert_eq!(stored[0].received_date.to_string(), "2024-06-01");
}

#[tokio::test]
async fn test_update_invalid_redisplays_form() {
    let app = TestApp::new();
    let seeded = app.seed(&[test_product("Gyokuro")]).await;
    let id = seeded[0].id;

    let response = app
        .post_form(
            &format!("/edit/{id}"),
            test_product("Gyokuro").with_price(150.0).form_body(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_string(response).await;
    assert::contains(&body, "Edit tea");
    assert::contains(&body, "Price cannot exceed 100.");
    assert_eq!(app.stored().await[0].price, 12.5);
}

#[tokio::test]
async fn test_update_unknown_id_flashes_not_found() {
    let app = TestApp::new();

    let response = app
        .post_form("/edit/42", test_product("Ghost").form_body())
        .await;
    let body = app.follow_redirect(&response).await;

    assert::contains(&body, "Product not found.");
    assert!(app.stored().await.is_empty());
}

// =============================================================================
// Delete
// =============================================================================

#[tokio::test]
async fn test_delete_removes_product() {
    let app = TestApp::new();
    let seeded = app
        .seed(&[test_product("Sencha"), test_product("Bancha")])
        .await;

    let response = app.get(&format!("/delete/{}", seeded[0].id)).await;
    let body = app.follow_redirect(&response).await;

    assert::contains(&body, "Product deleted successfully.");
    let stored = app.stored().await;
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].name, "Bancha");
}

#[tokio::test]
async fn test_delete_nonexistent_flashes_error() {
    let app = TestApp::new();
    app.seed(&[test_product("Sencha")]).await;

    for uri in ["/delete/999", "/delete/abc"] {
        let response = app.get(uri).await;
        let body = app.follow_redirect(&response).await;
        assert::contains(&body, "Error deleting product.");
        // The listing still renders
        assert::contains(&body, "Sencha");
    }
}

// =============================================================================
// CSV export
// =============================================================================

#[tokio::test]
async fn test_export_csv_headers_and_body() {
    let app = TestApp::new();
    app.seed(&[
        test_product("Earl \"Grey\"")
            .with_type("Black")
            .with_origin("India")
            .received_on(2024, 5, 9),
        test_product("Sencha").with_origin("Japan").with_price(7.0),
    ])
    .await;

    let response = app.get("/export-csv").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "text/csv; charset=utf-8"
    );
    assert_eq!(
        response.headers().get(header::CONTENT_DISPOSITION).unwrap(),
        "attachment; filename=\"products.csv\""
    );

    let body = body_string(response).await;
    assert_eq!(
        body,
        "ID,Name,Type,Origin,Price,Stock Quantity,Description,Received Date\n\
         1,\"Earl \"\"Grey\"\"\",\"Black\",\"India\",12.50,10,\"\",2024-05-09\n\
         2,\"Sencha\",\"Green\",\"Japan\",7.00,10,\"\",2024-03-01\n"
    );
}

#[tokio::test]
async fn test_export_csv_respects_filters() {
    let app = TestApp::new();
    app.seed(&five_teas()).await;

    let body = body_string(app.get("/export-csv?search=green&category=Green").await).await;

    let lines: Vec<&str> = body.lines().collect();
    assert_eq!(lines.len(), 3, "{body}");
    assert::contains(&body, "Green Mist");
    assert::contains(&body, "Green Dragon");
    assert::not_contains(&body, "Assam Gold");
}

// =============================================================================
// Store failures
// =============================================================================

#[tokio::test]
async fn test_listing_store_failure_renders_error() {
    let app = TestApp::failing();

    let response = app.get("/").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_string(response).await;
    assert::contains(&body, "Failed to load products.");
    assert::contains(&body, "No products found.");
}

#[tokio::test]
async fn test_delete_store_failure_flashes_error() {
    let app = TestApp::failing();

    let response = app.get("/delete/1").await;
    let body = app.follow_redirect(&response).await;
    assert::contains(&body, "Error deleting product.");
}

#[tokio::test]
async fn test_edit_form_store_failure_redirects_with_flash() {
    let app = TestApp::failing();

    let response = app.get("/edit/1").await;
    let body = app.follow_redirect(&response).await;
    assert::contains(&body, "Failed to load product.");
}

#[tokio::test]
async fn test_export_csv_store_failure_redirects_with_flash() {
    let app = TestApp::failing();

    let response = app.get("/export-csv?search=green").await;
    assert!(response.headers().get(header::CONTENT_DISPOSITION).is_none());
    let body = app.follow_redirect(&response).await;
    assert::contains(&body, "Failed to export products.");
}

#[tokio::test]
async fn test_save_store_failure_is_server_error() {
    let app = TestApp::failing();

    let response = app
        .post_form("/save", test_product("Sencha").form_body())
        .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = body_string(response).await;
    assert::not_contains(&body, "pool timed out");
}

#[tokio::test]
async fn test_health_reports_failing_store() {
    let app = TestApp::failing();

    let response = app.get("/health").await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let json: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(json["store"], false);
    assert_eq!(json["backend"], "failing");
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_reports_store() {
    let app = TestApp::new();

    let response = app.get("/health").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["store"], true);
    assert_eq!(json["backend"], "memory");
}
