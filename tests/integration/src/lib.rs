//! Integration test utilities for showreel
//!
//! This module provides common utilities for integration testing including:
//! - Content fixtures written to a temporary directory
//! - Recording media surfaces and fullscreen hosts
//! - Controllable content sources
//! - HTTP request helpers for the API router

use anyhow::Result;
use showreel::content::{BlogPost, PlayableItem, Project, ProjectCategory, StaticSource};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Test fixture for integration tests
pub struct TestFixture {
    pub temp_dir: TempDir,
    pub dataset: PathBuf,
}

impl TestFixture {
    /// Write a two-project, one-post dataset to a temporary directory
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let dataset = temp_dir.path().join("content.json");

        let body = serde_json::json!({
            "projects": sample_projects(),
            "posts": sample_posts(),
        });
        std::fs::write(&dataset, serde_json::to_vec_pretty(&body)?)?;

        Ok(Self { temp_dir, dataset })
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn static_source(&self) -> Result<StaticSource> {
        Ok(StaticSource::from_json_file(&self.dataset)?)
    }
}

pub fn project(id: &str, category: ProjectCategory, s_no: i64) -> Project {
    Project {
        id: id.to_string(),
        title: format!("Project {}", id),
        slug: id.to_string(),
        year: 2024,
        role: "Director".to_string(),
        thumbnail_url: format!("thumbs/{}.jpg", id),
        video_url: Some(format!("https://cdn.example.com/{}.mp4", id)),
        description: format!("About {}", id),
        credits: vec!["Editor: Priya Singh".to_string()],
        still_images: Vec::new(),
        category,
        featured: false,
        s_no,
    }
}

pub fn sample_projects() -> Vec<Project> {
    let mut stills_only = project("stills", ProjectCategory::Drone, 2);
    stills_only.video_url = None;

    vec![project("reel", ProjectCategory::Commercial, 1), stills_only]
}

pub fn sample_posts() -> Vec<BlogPost> {
    vec![BlogPost {
        id: "post-1".to_string(),
        title: "Shooting at golden hour".to_string(),
        date: "2024-05-01".to_string(),
        excerpt: "Notes from a week of dawn shoots".to_string(),
        thumbnail: "/golden.jpg".to_string(),
        slug: "golden-hour".to_string(),
        content: None,
        tags: vec!["cinematography".to_string()],
    }]
}

/// Playable items `ids`, each with a video and a CDN-key poster
pub fn playlist(ids: &[&str]) -> Vec<PlayableItem> {
    ids.iter()
        .map(|id| {
            PlayableItem::new(*id, format!("Project {}", id))
                .with_media(format!("https://cdn.example.com/{}.mp4", id))
                .with_poster(format!("posters/{}.jpg", id))
        })
        .collect()
}

/// Recording doubles for the player's platform seams
pub mod mock_media {
    use parking_lot::Mutex;
    use showreel::content::{ItemId, PlayableItem};
    use showreel::player::{FullscreenError, FullscreenHost, MediaError, MediaSurface, PlayerEvent, PlayerEventHandler};
    use std::sync::Arc;
    use std::time::Duration;

    #[derive(Debug, Clone, PartialEq)]
    pub enum SurfaceCall {
        Load(ItemId),
        Play,
        Pause,
        Reset,
        Muted(bool),
        Seek(Duration),
    }

    /// Media surface that records calls; clones share the log
    #[derive(Clone, Default)]
    pub struct RecordingSurface {
        calls: Arc<Mutex<Vec<SurfaceCall>>>,
        urls: Arc<Mutex<Vec<String>>>,
        reject_play: Arc<Mutex<Option<MediaError>>>,
    }

    impl RecordingSurface {
        pub fn take(&self) -> Vec<SurfaceCall> {
            std::mem::take(&mut *self.calls.lock())
        }

        pub fn loaded_urls(&self) -> Vec<String> {
            self.urls.lock().clone()
        }

        pub fn reject_play_with(&self, error: Option<MediaError>) {
            *self.reject_play.lock() = error;
        }
    }

    impl MediaSurface for RecordingSurface {
        fn load(&mut self, item: &PlayableItem, url: &str) {
            self.calls.lock().push(SurfaceCall::Load(item.id.clone()));
            self.urls.lock().push(url.to_string());
        }

        fn play(&mut self) -> Result<(), MediaError> {
            self.calls.lock().push(SurfaceCall::Play);
            match self.reject_play.lock().clone() {
                Some(err) => Err(err),
                None => Ok(()),
            }
        }

        fn pause(&mut self) {
            self.calls.lock().push(SurfaceCall::Pause);
        }

        fn reset(&mut self) {
            self.calls.lock().push(SurfaceCall::Reset);
        }

        fn set_muted(&mut self, muted: bool) {
            self.calls.lock().push(SurfaceCall::Muted(muted));
        }

        fn seek(&mut self, position: Duration) {
            self.calls.lock().push(SurfaceCall::Seek(position));
        }
    }

    /// Fullscreen host that always succeeds
    #[derive(Clone, Default)]
    pub struct FakeFullscreen {
        pub requests: Arc<Mutex<u32>>,
    }

    impl FullscreenHost for FakeFullscreen {
        fn request_fullscreen(&mut self) -> Result<(), FullscreenError> {
            *self.requests.lock() += 1;
            Ok(())
        }

        fn exit_fullscreen(&mut self) -> Result<(), FullscreenError> {
            Ok(())
        }
    }

    /// Collects player events; clones share the log
    #[derive(Clone, Default)]
    pub struct EventLog(Arc<Mutex<Vec<PlayerEvent>>>);

    impl EventLog {
        pub fn events(&self) -> Vec<PlayerEvent> {
            self.0.lock().clone()
        }
    }

    impl PlayerEventHandler for EventLog {
        fn handle_event(&mut self, event: PlayerEvent) {
            self.0.lock().push(event);
        }
    }
}

/// Content sources with scripted behaviour
pub mod mock_content {
    use async_trait::async_trait;
    use showreel::content::{BlogPost, BlogPostDetail, ContentSource, Project};
    use showreel::{Result, ShowreelError};

    /// A CMS that cannot be reached
    pub struct UnreachableSource;

    #[async_trait]
    impl ContentSource for UnreachableSource {
        fn name(&self) -> &str {
            "unreachable"
        }

        async fn list_projects(&self) -> Result<Vec<Project>> {
            Err(ShowreelError::SourceUnavailable("connection refused".to_string()))
        }

        async fn list_posts(&self) -> Result<Vec<BlogPost>> {
            Err(ShowreelError::SourceUnavailable("connection refused".to_string()))
        }

        async fn post_by_slug(&self, _slug: &str) -> Result<Option<BlogPostDetail>> {
            Err(ShowreelError::SourceUnavailable("connection refused".to_string()))
        }
    }

    /// A CMS that answers with a broken payload
    pub struct BrokenSource;

    #[async_trait]
    impl ContentSource for BrokenSource {
        fn name(&self) -> &str {
            "broken"
        }

        async fn list_projects(&self) -> Result<Vec<Project>> {
            Err(ShowreelError::Internal("unexpected payload".to_string()))
        }

        async fn list_posts(&self) -> Result<Vec<BlogPost>> {
            Ok(Vec::new())
        }

        async fn post_by_slug(&self, _slug: &str) -> Result<Option<BlogPostDetail>> {
            Ok(None)
        }
    }
}

/// Helpers for driving the API router in-process
pub mod api {
    use anyhow::Result;
    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode};
    use axum::Router;
    use serde_json::Value;
    use tower::ServiceExt;

    /// Send one request and decode the JSON body, `Value::Null` when empty
    pub async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> Result<(StatusCode, Value)> {
        let mut request = Request::builder().method(method).uri(uri);

        let body = match body {
            Some(json) => {
                request = request.header("content-type", "application/json");
                Body::from(serde_json::to_vec(&json)?)
            }
            None => Body::empty(),
        };

        let response = app.clone().oneshot(request.body(body)?).await?;
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;

        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)?
        };

        Ok((status, json))
    }

    pub async fn get(app: &Router, uri: &str) -> Result<(StatusCode, Value)> {
        send(app, Method::GET, uri, None).await
    }

    pub async fn post(app: &Router, uri: &str, body: Value) -> Result<(StatusCode, Value)> {
        send(app, Method::POST, uri, Some(body)).await
    }
}
