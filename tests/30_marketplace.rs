//! Flows that need a real Postgres. Set TEST_DATABASE_URL to run them; each
//! test uses fresh, randomly named rows so runs can share one database.

mod common;

use anyhow::Result;
use axum::http::StatusCode;
use common::*;
use serde_json::{json, Value};

use marketplace_api::database::{notifications, products, users};

async fn create_product(
    app: &axum::Router,
    auth: &str,
    category_id: i32,
    extra: Value,
) -> Result<Value> {
    let mut body = json!({
        "name": "Mountain bike",
        "description": "Barely used",
        "category_id": category_id,
        "contact_info": "0788 000 000"
    });
    if let (Some(target), Value::Object(fields)) = (body.as_object_mut(), extra) {
        target.extend(fields);
    }
    let (status, body) = send_json(app, "POST", "/api/products", Some(auth), Some(body)).await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    Ok(body["product"].clone())
}

#[tokio::test]
async fn test_register_login_and_duplicates() -> Result<()> {
    let Some((app, state)) = live_app().await? else {
        return Ok(());
    };
    let name = unique("buyer");
    let email = format!("{}@Example.com", name);

    let (status, body) = send_json(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({ "username": name, "email": email, "password": "secret12" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "User registered successfully");
    assert_eq!(body["user"]["email"], email.to_lowercase());
    let token = body["token"].as_str().unwrap().to_string();
    assert_eq!(state.tokens.verify(&token).await?.username, name);

    let (status, body) = send(&app, "GET", "/api/auth/me", Some(&bearer(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["username"], name);

    let (status, body) = send_json(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": email, "password": "secret12" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let login_token = body["token"].as_str().unwrap();
    assert_eq!(state.tokens.verify(login_token).await?.username, name);

    let (status, body) = send_json(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": email, "password": "wrong-password" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid email or password");

    let (status, body) = send_json(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({ "username": name, "email": format!("other_{}", email), "password": "secret12" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Username already exists");

    let (status, body) = send_json(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({ "username": unique("other"), "email": email, "password": "secret12" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Email already registered");
    Ok(())
}

#[tokio::test]
async fn test_create_stores_normalized_image_urls() -> Result<()> {
    let Some((app, state)) = live_app().await? else {
        return Ok(());
    };
    let (_, auth) = seed_user(&state, false).await?;
    let category_id = seed_category(&state).await?;

    let product = create_product(
        &app,
        &auth,
        category_id,
        json!({
            "price": 1500,
            "image_urls": "uploads/products/a.png, https://via.placeholder.com/150, https://cdn.example.com/b.jpg"
        }),
    )
    .await?;

    let expected = json!([
        format!("{}/uploads/products/a.png", TEST_BASE_URL),
        "https://cdn.example.com/b.jpg"
    ]);
    assert_eq!(product["image_urls"], expected);
    assert_eq!(product["price_display"], "RWF 1 500");

    let id = product["id"].as_i64().unwrap() as i32;
    let row = products::find(&state.db, id).await?.unwrap();
    assert_eq!(row.image_urls, expected);

    let (status, _) = send_json(
        &app,
        "POST",
        "/api/products",
        Some(&auth),
        Some(json!({
            "name": "Ghost",
            "description": "No such category",
            "category_id": -1,
            "contact_info": "x"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn test_update_null_clears_and_absent_keeps() -> Result<()> {
    let Some((app, state)) = live_app().await? else {
        return Ok(());
    };
    let (_, auth) = seed_user(&state, false).await?;
    let category_id = seed_category(&state).await?;
    let product = create_product(&app, &auth, category_id, json!({ "price": 1500, "location": "Kigali" })).await?;
    let uri = format!("/api/products/{}", product["id"]);

    let (status, body) = send_json(&app, "PUT", &uri, Some(&auth), Some(json!({ "price": null }))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["product"]["price"].is_null());
    assert!(body["product"]["price_display"].is_null());
    assert_eq!(body["product"]["location"], "Kigali");

    let (_, body) = send_json(&app, "PUT", &uri, Some(&auth), Some(json!({ "location": null }))).await;
    assert!(body["product"]["location"].is_null());
    assert!(body["product"]["price"].is_null());

    let (_, body) = send_json(&app, "PUT", &uri, Some(&auth), Some(json!({ "price": 2500, "is_sold": true }))).await;
    assert_eq!(body["product"]["price"].as_f64(), Some(2500.0));
    assert_eq!(body["product"]["price_display"], "RWF 2 500");
    assert_eq!(body["product"]["is_sold"], true);
    assert_eq!(body["product"]["name"], "Mountain bike");

    // Only admins may change visibility
    let (_, body) = send_json(&app, "PUT", &uri, Some(&auth), Some(json!({ "is_active": false }))).await;
    assert_eq!(body["product"]["is_active"], true);

    let (_, stranger) = seed_user(&state, false).await?;
    let (status, _) = send_json(&app, "PUT", &uri, Some(&stranger), Some(json!({ "name": "Mine now" }))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn test_update_and_delete_remove_dropped_image_files() -> Result<()> {
    let Some((app, state)) = live_app().await? else {
        return Ok(());
    };
    let (_, auth) = seed_user(&state, false).await?;
    let category_id = seed_category(&state).await?;

    let first = state.uploads.save_product_image("first.png", b"one").await?;
    let second = state.uploads.save_product_image("second.png", b"two").await?;
    let first_file = state.uploads.local_file_name(&first).unwrap().to_string();
    let second_file = state.uploads.local_file_name(&second).unwrap().to_string();

    let product = create_product(&app, &auth, category_id, json!({ "image_urls": [first, second] })).await?;
    let uri = format!("/api/products/{}", product["id"]);

    let (status, body) = send_json(&app, "PUT", &uri, Some(&auth), Some(json!({ "image_urls": [second] }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["product"]["image_urls"].as_array().unwrap().len(), 1);
    assert!(!state.uploads.products_dir().join(&first_file).exists());
    assert!(state.uploads.products_dir().join(&second_file).exists());

    let (status, body) = send(&app, "DELETE", &uri, Some(&auth)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted_images_count"], 1);
    assert!(!state.uploads.products_dir().join(&second_file).exists());

    let (status, _) = send(&app, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn test_admin_user_delete_cascades() -> Result<()> {
    let Some((app, state)) = live_app().await? else {
        return Ok(());
    };
    let (_, admin) = seed_user(&state, true).await?;
    let (seller, seller_auth) = seed_user(&state, false).await?;
    let category_id = seed_category(&state).await?;

    let image = state.uploads.save_product_image("listing.png", b"img").await?;
    let image_file = state.uploads.local_file_name(&image).unwrap().to_string();
    create_product(&app, &seller_auth, category_id, json!({ "image_urls": [image] })).await?;
    create_product(&app, &seller_auth, category_id, json!({})).await?;

    let (status, _) = send_json(
        &app,
        "POST",
        "/api/notifications/broadcast",
        Some(&admin),
        Some(json!({ "message": unique("maintenance") })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(notifications::unread_count(&state.db, seller.id).await? >= 1);

    let (status, body) = send(&app, "DELETE", &format!("/api/admin/users/{}", seller.id), Some(&admin)).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["deleted_products_count"], 2);
    assert_eq!(body["deleted_images_count"], 1);

    assert!(users::find_by_id(&state.db, seller.id).await?.is_none());
    assert_eq!(notifications::unread_count(&state.db, seller.id).await?, 0);
    let filter = products::ProductFilter {
        user_id: Some(seller.id),
        ..Default::default()
    };
    let (_, remaining) = products::list(&state.db, &filter, 10, 0).await?;
    assert_eq!(remaining, 0);
    assert!(!state.uploads.products_dir().join(&image_file).exists());

    let (status, _) = send(&app, "DELETE", &format!("/api/admin/users/{}", seller.id), Some(&admin)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn test_category_delete_refused_while_in_use() -> Result<()> {
    let Some((app, state)) = live_app().await? else {
        return Ok(());
    };
    let (_, admin) = seed_user(&state, true).await?;
    let (_, seller) = seed_user(&state, false).await?;
    let category_id = seed_category(&state).await?;
    let product = create_product(&app, &seller, category_id, json!({})).await?;
    let category_uri = format!("/api/admin/categories/{}", category_id);

    let (status, body) = send(&app, "DELETE", &category_uri, Some(&admin)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Cannot delete category with 1 products. Move products first.");

    let (status, _) = send(&app, "DELETE", &format!("/api/admin/products/{}", product["id"]), Some(&admin)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, "DELETE", &category_uri, Some(&admin)).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, "DELETE", &category_uri, Some(&admin)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn test_broadcast_reaches_active_users_only() -> Result<()> {
    let Some((app, state)) = live_app().await? else {
        return Ok(());
    };
    let (_, admin) = seed_user(&state, true).await?;
    let (active, active_auth) = seed_user(&state, false).await?;
    let (inactive, _) = seed_user(&state, false).await?;
    users::toggle_active(&state.db, inactive.id).await?;

    let message = unique("sale");
    let (status, body) = send_json(
        &app,
        "POST",
        "/api/notifications/broadcast",
        Some(&admin),
        Some(json!({ "message": message })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["users_notified"].as_u64().unwrap() >= 2);

    let (status, body) = send(&app, "GET", "/api/notifications?unread_only=TRUE", Some(&active_auth)).await;
    assert_eq!(status, StatusCode::OK);
    let received: Vec<&Value> = body["notifications"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|n| n["message"] == message.as_str())
        .collect();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0]["is_admin_notification"], true);

    let (inbox, _) = notifications::list_for_user(&state.db, inactive.id, false, 50, 0).await?;
    assert!(inbox.iter().all(|n| n.message != message));

    let (status, body) = send(&app, "PUT", "/api/notifications/read-all", Some(&active_auth)).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(notifications::unread_count(&state.db, active.id).await?, 0);
    Ok(())
}
