//! Content module for showreel
//!
//! Portfolio projects and blog posts come from a headless CMS, with a
//! bundled dataset behind it. Whatever the source, the player only ever
//! sees [`PlayableItem`]s.

mod fallback;
mod notion;

pub use fallback::{FallbackSource, StaticSource};
pub use notion::NotionSource;

use crate::utils::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier of a playable item
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ItemId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Display-only descriptive field (year, category, role, credit...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataField {
    pub label: String,
    pub value: String,
}

impl MetadataField {
    pub fn new<L: Into<String>, V: Into<String>>(label: L, value: V) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// One playable or viewable unit
///
/// Immutable for the duration of a page view. An item without a media URL
/// is image-only and never attached to a media surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayableItem {
    pub id: ItemId,
    pub title: String,
    pub media_url: Option<String>,
    pub poster_url: Option<String>,
    pub description: Option<String>,
    pub metadata: Vec<MetadataField>,
}

impl PlayableItem {
    pub fn new<I: Into<ItemId>, T: Into<String>>(id: I, title: T) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            media_url: None,
            poster_url: None,
            description: None,
            metadata: Vec::new(),
        }
    }

    pub fn with_media<S: Into<String>>(mut self, url: S) -> Self {
        self.media_url = Some(url.into());
        self
    }

    pub fn with_poster<S: Into<String>>(mut self, url: S) -> Self {
        self.poster_url = Some(url.into());
        self
    }

    pub fn with_description<S: Into<String>>(mut self, text: S) -> Self {
        self.description = Some(text.into());
        self
    }

    pub fn with_field<L: Into<String>, V: Into<String>>(mut self, label: L, value: V) -> Self {
        self.metadata.push(MetadataField::new(label, value));
        self
    }

    /// Whether the item has a video to play
    pub fn is_playable(&self) -> bool {
        self.media_url.as_deref().is_some_and(|url| !url.is_empty())
    }
}

/// Project category as curated in the CMS
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ProjectCategory {
    Commercial,
    Documentary,
    Drone,
    #[serde(rename = "Music Video")]
    MusicVideo,
    Corporate,
    #[default]
    Other,
}

impl ProjectCategory {
    pub const ALL: [ProjectCategory; 6] = [
        ProjectCategory::Commercial,
        ProjectCategory::Documentary,
        ProjectCategory::Drone,
        ProjectCategory::MusicVideo,
        ProjectCategory::Corporate,
        ProjectCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectCategory::Commercial => "Commercial",
            ProjectCategory::Documentary => "Documentary",
            ProjectCategory::Drone => "Drone",
            ProjectCategory::MusicVideo => "Music Video",
            ProjectCategory::Corporate => "Corporate",
            ProjectCategory::Other => "Other",
        }
    }

    /// Parse a CMS select value. Unknown names land in `Other`.
    pub fn from_name(name: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(name.trim()))
            .unwrap_or_default()
    }
}

impl fmt::Display for ProjectCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Portfolio project record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub slug: String,
    pub year: i32,
    pub role: String,
    pub thumbnail_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    pub description: String,
    pub credits: Vec<String>,
    pub still_images: Vec<String>,
    #[serde(default)]
    pub category: ProjectCategory,
    #[serde(default)]
    pub featured: bool,
    #[serde(default, rename = "sNo")]
    pub s_no: i64,
}

/// Blog post summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPost {
    pub id: String,
    pub title: String,
    pub date: String,
    pub excerpt: String,
    pub thumbnail: String,
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Blog post with its raw CMS body blocks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlogPostDetail {
    #[serde(flatten)]
    pub post: BlogPost,
    pub blocks: Vec<serde_json::Value>,
}

impl From<&Project> for PlayableItem {
    fn from(project: &Project) -> Self {
        let mut item = PlayableItem::new(project.id.as_str(), project.title.as_str())
            .with_field("Year", project.year.to_string())
            .with_field("Category", project.category.as_str());

        if let Some(url) = project.video_url.as_deref().filter(|u| !u.is_empty()) {
            item = item.with_media(url);
        }
        if !project.thumbnail_url.is_empty() {
            item = item.with_poster(project.thumbnail_url.as_str());
        }
        if !project.description.is_empty() {
            item = item.with_description(project.description.as_str());
        }
        if !project.role.is_empty() {
            item = item.with_field("Role", project.role.as_str());
        }
        for credit in &project.credits {
            item = item.with_field("Credit", credit.as_str());
        }

        item
    }
}

impl From<&BlogPost> for PlayableItem {
    fn from(post: &BlogPost) -> Self {
        let mut item = PlayableItem::new(post.id.as_str(), post.title.as_str())
            .with_field("Date", post.date.as_str());

        if !post.thumbnail.is_empty() {
            item = item.with_poster(post.thumbnail.as_str());
        }
        if !post.excerpt.is_empty() {
            item = item.with_description(post.excerpt.as_str());
        }
        if !post.tags.is_empty() {
            item = item.with_field("Tags", post.tags.join(", "));
        }

        item
    }
}

/// Source of portfolio content
///
/// Implementations fail with `SourceUnavailable` when the backing store is
/// unreachable or misconfigured; [`FallbackSource`] turns that into the
/// bundled dataset.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// All projects, in curated order
    async fn list_projects(&self) -> Result<Vec<Project>>;

    /// Single project lookup
    async fn project_by_id(&self, id: &str) -> Result<Option<Project>> {
        Ok(self.list_projects().await?.into_iter().find(|p| p.id == id))
    }

    /// All blog posts, newest first
    async fn list_posts(&self) -> Result<Vec<BlogPost>>;

    /// Single blog post with body
    async fn post_by_slug(&self, slug: &str) -> Result<Option<BlogPostDetail>>;

    /// Projects normalised into the player's playlist
    async fn list(&self) -> Result<Vec<PlayableItem>> {
        Ok(self.list_projects().await?.iter().map(PlayableItem::from).collect())
    }

    /// Playlist item lookup
    async fn item_by_id(&self, id: &ItemId) -> Result<Option<PlayableItem>> {
        Ok(self
            .project_by_id(id.as_str())
            .await?
            .as_ref()
            .map(PlayableItem::from))
    }
}

/// Filter projects by category, keeping order
pub fn filter_by_category(projects: Vec<Project>, category: Option<ProjectCategory>) -> Vec<Project> {
    match category {
        Some(category) => projects.into_iter().filter(|p| p.category == category).collect(),
        None => projects,
    }
}
