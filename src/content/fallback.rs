//! Bundled content and CMS fallback

use crate::content::{BlogPost, BlogPostDetail, ContentSource, Project, ProjectCategory};
use crate::utils::error::{Result, ShowreelError};
use async_trait::async_trait;
use log::warn;
use std::path::Path;

/// In-memory content, shipped with the binary or loaded from JSON
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    projects: Vec<Project>,
    posts: Vec<BlogPost>,
}

#[derive(serde::Deserialize)]
struct StaticDataset {
    #[serde(default)]
    projects: Vec<Project>,
    #[serde(default)]
    posts: Vec<BlogPost>,
}

impl StaticSource {
    pub fn new(projects: Vec<Project>, posts: Vec<BlogPost>) -> Self {
        Self { projects, posts }
    }

    /// The dataset bundled with the site
    pub fn bundled() -> Self {
        Self::new(
            vec![Project {
                id: "proj1".to_string(),
                title: "Urban Perspectives".to_string(),
                slug: "urban-perspectives".to_string(),
                year: 2024,
                role: "Director".to_string(),
                thumbnail_url: "/urban-film-thumbnail.jpg".to_string(),
                video_url: Some("/urban-film-video.jpg".to_string()),
                description: "A cinematic exploration of city life through the lens of emerging artists."
                    .to_string(),
                credits: vec![
                    "Producer: Tanmay Gaur".to_string(),
                    "Cinematographer: Alex Kumar".to_string(),
                    "Editor: Priya Singh".to_string(),
                ],
                still_images: vec!["/urban-still-1.jpg".to_string(), "/urban-still-2.jpg".to_string()],
                category: ProjectCategory::Documentary,
                featured: true,
                s_no: 0,
            }],
            Vec::new(),
        )
    }

    /// Load a dataset from a JSON file with `projects` and `posts` arrays
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let dataset: StaticDataset = serde_json::from_str(&contents)?;
        Ok(Self::new(dataset.projects, dataset.posts))
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty() && self.posts.is_empty()
    }
}

#[async_trait]
impl ContentSource for StaticSource {
    fn name(&self) -> &str {
        "static"
    }

    async fn list_projects(&self) -> Result<Vec<Project>> {
        Ok(self.projects.clone())
    }

    async fn list_posts(&self) -> Result<Vec<BlogPost>> {
        Ok(self.posts.clone())
    }

    async fn post_by_slug(&self, slug: &str) -> Result<Option<BlogPostDetail>> {
        Ok(self
            .posts
            .iter()
            .find(|p| p.slug == slug)
            .map(|post| BlogPostDetail {
                post: post.clone(),
                blocks: Vec::new(),
            }))
    }
}

/// Serves the primary source, falling back to static data when the
/// primary is unavailable
///
/// Other errors pass through untouched: only an unreachable or
/// misconfigured CMS is recovered locally.
pub struct FallbackSource {
    primary: Box<dyn ContentSource>,
    fallback: StaticSource,
}

impl FallbackSource {
    pub fn new(primary: Box<dyn ContentSource>, fallback: StaticSource) -> Self {
        Self { primary, fallback }
    }

    fn should_fall_back(&self, err: &ShowreelError, what: &str) -> bool {
        if err.is_source_unavailable() {
            warn!(
                "{} unavailable for {} ({}), serving bundled content",
                self.primary.name(),
                what,
                err
            );
            true
        } else {
            false
        }
    }
}

#[async_trait]
impl ContentSource for FallbackSource {
    fn name(&self) -> &str {
        self.primary.name()
    }

    async fn list_projects(&self) -> Result<Vec<Project>> {
        match self.primary.list_projects().await {
            Ok(projects) if !projects.is_empty() => Ok(projects),
            Ok(_) => self.fallback.list_projects().await,
            Err(e) if self.should_fall_back(&e, "projects") => self.fallback.list_projects().await,
            Err(e) => Err(e),
        }
    }

    async fn project_by_id(&self, id: &str) -> Result<Option<Project>> {
        match self.primary.project_by_id(id).await {
            Ok(Some(project)) => Ok(Some(project)),
            Ok(None) => self.fallback.project_by_id(id).await,
            Err(e) if self.should_fall_back(&e, "project lookup") => self.fallback.project_by_id(id).await,
            Err(e) => Err(e),
        }
    }

    async fn list_posts(&self) -> Result<Vec<BlogPost>> {
        match self.primary.list_posts().await {
            Ok(posts) => Ok(posts),
            Err(e) if self.should_fall_back(&e, "blog posts") => self.fallback.list_posts().await,
            Err(e) => Err(e),
        }
    }

    async fn post_by_slug(&self, slug: &str) -> Result<Option<BlogPostDetail>> {
        match self.primary.post_by_slug(slug).await {
            Ok(post) => Ok(post),
            Err(e) if self.should_fall_back(&e, "blog post") => self.fallback.post_by_slug(slug).await,
            Err(e) => Err(e),
        }
    }
}
