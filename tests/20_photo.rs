mod common;

use anyhow::Result;
use axum::{body::Body, http::{Request, StatusCode}};
use serde_json::json;

use common::{
    body_json, content_type, header_value, mercury, multipart_request, TestApp, JPEG_BYTES,
    PNG_BYTES,
};
use planets_api::database::PlanetStore;
use planets_api::AppCapabilities;

async fn app_with_mercury() -> Result<TestApp> {
    TestApp::seeded(AppCapabilities::default(), vec![mercury()]).await
}

#[tokio::test]
async fn png_upload_is_stored_and_served() -> Result<()> {
    let app = app_with_mercury().await?;

    let res = app
        .send(multipart_request(
            "/planets/1/photo",
            &[("photo", "file.png", "image/png", PNG_BYTES)],
        )?)
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    assert_eq!(
        header_value(&res, "access-control-allow-origin").as_deref(),
        Some(common::ORIGIN)
    );
    let body = body_json(res).await?;
    let filename = body["photoFilename"].as_str().expect("filename").to_string();
    assert!(filename.ends_with(".png"));
    assert_eq!(std::fs::read(app.uploads.path().join(&filename))?, PNG_BYTES);

    let planet = app.store.find_unique(1).await?.expect("planet");
    assert_eq!(planet.photo_filename.as_deref(), Some(filename.as_str()));

    let res = app.get(&format!("/planets/photos/{}", filename)).await?;
    assert_eq!(res.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await?;
    assert_eq!(&bytes[..], PNG_BYTES);
    Ok(())
}

#[tokio::test]
async fn jpeg_upload_succeeds() -> Result<()> {
    let app = app_with_mercury().await?;
    let res = app
        .send(multipart_request(
            "/planets/1/photo",
            &[("photo", "file.jpeg", "image/jpeg", JPEG_BYTES)],
        )?)
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body = body_json(res).await?;
    assert!(body["photoFilename"].as_str().unwrap_or_default().ends_with(".jpg"));
    Ok(())
}

#[tokio::test]
async fn text_upload_is_rejected() -> Result<()> {
    let app = app_with_mercury().await?;
    let res = app
        .send(multipart_request(
            "/planets/1/photo",
            &[("photo", "file.txt", "text/plain", b"hello")],
        )?)
        .await?;
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(content_type(&res).starts_with("application/json"));
    assert_eq!(
        body_json(res).await?["message"],
        json!("Error: The uploaded file must be a JPG or a PNG image.")
    );

    assert_eq!(std::fs::read_dir(app.uploads.path())?.count(), 0);
    let planet = app.store.find_unique(1).await?.expect("planet");
    assert!(planet.photo_filename.is_none());
    Ok(())
}

#[tokio::test]
async fn upload_for_missing_planet_is_404() -> Result<()> {
    let app = TestApp::new().await?;
    let res = app
        .send(multipart_request(
            "/planets/23/photo",
            &[("photo", "file.png", "image/png", PNG_BYTES)],
        )?)
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert!(content_type(&res).starts_with("application/json"));
    assert_eq!(body_json(res).await?["message"], json!("Cannot POST /planets/23/photo"));

    // The stored file is cleaned up again.
    assert_eq!(std::fs::read_dir(app.uploads.path())?.count(), 0);
    Ok(())
}

#[tokio::test]
async fn upload_with_non_numeric_id_never_matches() -> Result<()> {
    let app = TestApp::new().await?;
    let res = app
        .send(Request::post("/planets/asdf/photo").body(Body::empty())?)
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert!(content_type(&res).starts_with("application/json"));
    assert_eq!(body_json(res).await?["message"], json!("Cannot POST /planets/asdf/photo"));
    Ok(())
}

#[tokio::test]
async fn upload_without_a_file_is_400() -> Result<()> {
    let app = app_with_mercury().await?;

    let res = app
        .send(Request::post("/planets/1/photo").body(Body::empty())?)
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert!(content_type(&res).starts_with("application/json"));
    assert_eq!(body_json(res).await?["message"], json!("No photo file uploaded."));

    // A multipart body whose only file uses another field name carries no photo either.
    let res = app
        .send(multipart_request(
            "/planets/1/photo",
            &[("avatar", "file.png", "image/png", PNG_BYTES)],
        )?)
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(res).await?["message"], json!("No photo file uploaded."));
    Ok(())
}

#[tokio::test]
async fn missing_file_is_checked_before_the_planet_lookup() -> Result<()> {
    let app = TestApp::new().await?;
    let res = app
        .send(Request::post("/planets/23/photo").body(Body::empty())?)
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn two_photo_files_are_rejected() -> Result<()> {
    let app = app_with_mercury().await?;
    let res = app
        .send(multipart_request(
            "/planets/1/photo",
            &[
                ("photo", "a.png", "image/png", PNG_BYTES),
                ("photo", "b.png", "image/png", PNG_BYTES),
            ],
        )?)
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(res).await?["message"], json!("Unexpected field: photo"));
    Ok(())
}

#[tokio::test]
async fn missing_static_photo_falls_through() -> Result<()> {
    let app = TestApp::new().await?;
    let res = app.get("/planets/photos/nope.png").await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        body_json(res).await?["message"],
        json!("Cannot GET /planets/photos/nope.png")
    );
    Ok(())
}
