mod common;

use axum::http::StatusCode;
use common::*;
use serde_json::json;

fn assert_json_bad_request(status: StatusCode, body: &serde_json::Value) {
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], true);
    assert_eq!(body["code"], "BAD_REQUEST");
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn test_bad_query_values_get_json_errors() {
    let (app, _) = test_app();

    for uri in [
        "/api/products?page=abc",
        "/api/products?per_page=ten",
        "/api/products?category_id=",
        "/api/products?category_id=shoes",
    ] {
        let (status, body) = send(&app, "GET", uri, None).await;
        assert_json_bad_request(status, &body);
        assert!(body["message"].as_str().unwrap().starts_with("Invalid query parameters"), "{}", uri);
    }
}

#[tokio::test]
async fn test_bad_query_values_on_protected_and_admin_routes() {
    let (app, state) = test_app();
    let user = bearer(&state.tokens.issue_default(ACTIVE_USER).unwrap());
    let admin = bearer(&state.tokens.issue_default(ADMIN_USER).unwrap());

    let (status, body) = send(&app, "GET", "/api/notifications?page=x", Some(&user)).await;
    assert_json_bad_request(status, &body);

    let (status, body) = send(&app, "GET", "/api/products/my-products?per_page=-", Some(&user)).await;
    assert_json_bad_request(status, &body);

    let (status, body) = send(&app, "GET", "/api/admin/users?page=1.5", Some(&admin)).await;
    assert_json_bad_request(status, &body);
}

#[tokio::test]
async fn test_non_numeric_ids_get_json_errors() {
    let (app, state) = test_app();
    let admin = bearer(&state.tokens.issue_default(ADMIN_USER).unwrap());

    let (status, body) = send(&app, "GET", "/api/products/abc", None).await;
    assert_json_bad_request(status, &body);
    assert!(body["message"].as_str().unwrap().starts_with("Invalid path parameter"));

    let (status, body) = send(&app, "DELETE", "/api/admin/categories/first", Some(&admin)).await;
    assert_json_bad_request(status, &body);
}

#[tokio::test]
async fn test_update_refuses_blank_required_fields() {
    let (app, state) = test_app();
    let user = bearer(&state.tokens.issue_default(ACTIVE_USER).unwrap());

    for field in ["name", "description", "contact_info"] {
        let (status, body) =
            send_json(&app, "PUT", "/api/products/1", Some(&user), Some(json!({ field: "   " }))).await;
        assert_json_bad_request(status, &body);
        assert_eq!(
            body["message"],
            "Missing required fields: name, description, category_id, contact_info",
            "{}",
            field
        );
    }
}
