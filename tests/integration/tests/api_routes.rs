//! Integration tests for the HTTP API
//!
//! Every request runs in-process against the router with a CMS that is
//! unreachable, so content is served from the fallback dataset.

use anyhow::Result;
use axum::http::StatusCode;
use axum::Router;
use serde_json::json;
use showreel::content::{ContentSource, FallbackSource};
use showreel::media::MediaResolver;
use showreel::server::{self, AppState};
use showreel_integration_tests::api::{get, post};
use showreel_integration_tests::mock_content::{BrokenSource, UnreachableSource};
use showreel_integration_tests::TestFixture;
use std::sync::Arc;

const CDN: &str = "https://pub-123.r2.dev";

fn app_with(content: Arc<dyn ContentSource>, cdn: Option<&str>) -> Router {
    let media = MediaResolver::new(cdn.map(str::to_string));
    server::router(AppState::new(content, media), true)
}

fn app(fixture: &TestFixture) -> Result<Router> {
    let content = FallbackSource::new(Box::new(UnreachableSource), fixture.static_source()?);
    Ok(app_with(Arc::new(content), Some(CDN)))
}

#[tokio::test]
async fn test_health() -> Result<()> {
    let fixture = TestFixture::new()?;
    let (status, body) = get(&app(&fixture)?, "/health").await?;

    assert_eq!(status, StatusCode::OK);
    assert!(body.is_null());
    Ok(())
}

#[tokio::test]
async fn test_projects_fall_back_when_cms_is_down() -> Result<()> {
    let fixture = TestFixture::new()?;
    let (status, body) = get(&app(&fixture)?, "/api/projects").await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"].as_array().map(Vec::len), Some(2));
    assert_eq!(body["data"][0]["id"], "reel");
    assert_eq!(body["data"][0]["sNo"], 1);
    assert!(body.get("error").is_none());
    Ok(())
}

#[tokio::test]
async fn test_project_category_filter() -> Result<()> {
    let fixture = TestFixture::new()?;
    let app = app(&fixture)?;

    let (_, drone) = get(&app, "/api/projects?category=Drone").await?;
    assert_eq!(drone["data"].as_array().map(Vec::len), Some(1));
    assert_eq!(drone["data"][0]["id"], "stills");

    let (_, all) = get(&app, "/api/projects?category=All").await?;
    assert_eq!(all["data"].as_array().map(Vec::len), Some(2));
    Ok(())
}

#[tokio::test]
async fn test_project_lookup() -> Result<()> {
    let fixture = TestFixture::new()?;
    let app = app(&fixture)?;

    let (status, body) = get(&app, "/api/projects/reel").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], "Project reel");

    let (status, body) = get(&app, "/api/projects/missing").await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Project not found");
    assert!(body.get("data").is_none());
    Ok(())
}

#[tokio::test]
async fn test_playlist_keeps_order() -> Result<()> {
    let fixture = TestFixture::new()?;
    let (status, body) = get(&app(&fixture)?, "/api/playlist").await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["id"], "reel");
    assert_eq!(body["data"][0]["mediaUrl"], "https://cdn.example.com/reel.mp4");
    assert!(body["data"][1]["mediaUrl"].is_null());
    Ok(())
}

#[tokio::test]
async fn test_blog_routes() -> Result<()> {
    let fixture = TestFixture::new()?;
    let app = app(&fixture)?;

    let (status, body) = get(&app, "/api/blog").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["slug"], "golden-hour");

    let (status, body) = get(&app, "/api/blog/golden-hour").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], "Shooting at golden hour");
    assert_eq!(body["data"]["blocks"], json!([]));

    let (status, body) = get(&app, "/api/blog/nope").await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Post not found");
    Ok(())
}

#[tokio::test]
async fn test_asset_urls() -> Result<()> {
    let fixture = TestFixture::new()?;
    let app = app(&fixture)?;

    let (status, body) = get(&app, "/api/assets?key=stills/urban-1.jpg").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["url"], "https://pub-123.r2.dev/stills/urban-1.jpg");
    assert!(body["data"].get("transformedUrl").is_none());

    let (status, body) = get(&app, "/api/assets?key=stills/urban-1.jpg&width=800&format=webp").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["data"]["transformedUrl"],
        "https://pub-123.r2.dev/stills/urban-1.jpg?width=800&format=webp"
    );
    assert_eq!(body["data"]["asset"]["key"], "stills/urban-1.jpg");
    Ok(())
}

#[tokio::test]
async fn test_asset_errors() -> Result<()> {
    let fixture = TestFixture::new()?;
    let app = app(&fixture)?;

    let (status, body) = get(&app, "/api/assets").await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing required parameter: key");

    let (status, _) = get(&app, "/api/assets?key=a.jpg&width=wide").await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let content = FallbackSource::new(Box::new(UnreachableSource), fixture.static_source()?);
    let unconfigured = app_with(Arc::new(content), None);
    let (status, body) = get(&unconfigured, "/api/assets?key=a.jpg").await?;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    Ok(())
}

#[tokio::test]
async fn test_contact_submission() -> Result<()> {
    let fixture = TestFixture::new()?;
    let app = app(&fixture)?;

    let accepted = json!({
        "name": "Asha",
        "email": "asha@example.com",
        "phone": "+91 98919-46529",
        "message": "Looking for a drone operator in March.",
        "projectType": "Commercial"
    });
    let (status, body) = post(&app, "/api/contact", accepted).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["message"], "Contact form submitted successfully");

    let invalid = json!({
        "name": "A",
        "email": "not-an-email",
        "message": "short"
    });
    let (status, body) = post(&app, "/api/contact", invalid).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Name must be at least 2 characters");

    let (status, body) = post(&app, "/api/contact", json!("just a string")).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    Ok(())
}

#[tokio::test]
async fn test_unexpected_source_failure_is_500() -> Result<()> {
    let fixture = TestFixture::new()?;
    let content = FallbackSource::new(Box::new(BrokenSource), fixture.static_source()?);
    let app = app_with(Arc::new(content), Some(CDN));

    let (status, body) = get(&app, "/api/projects").await?;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    Ok(())
}

#[tokio::test]
async fn test_unavailable_without_fallback_is_503() -> Result<()> {
    let app = app_with(Arc::new(UnreachableSource), Some(CDN));

    let (status, body) = get(&app, "/api/blog").await?;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["success"], false);
    Ok(())
}
