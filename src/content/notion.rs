//! Notion-backed content source
//!
//! Talks to the Notion REST API directly. Property names follow the CMS
//! databases the site is edited in (`Title`, `Slug`, `Video URL`, ...).

use crate::content::{BlogPost, BlogPostDetail, ContentSource, Project, ProjectCategory};
use crate::utils::config::NotionConfig;
use crate::utils::error::{IntoShowreelError, Result, ShowreelError};
use async_trait::async_trait;
use chrono::{Datelike, Utc};
use log::{debug, info, warn};
use serde_json::{json, Value};
use std::time::Duration;

const PLACEHOLDER_THUMBNAIL: &str = "/placeholder.svg";

/// Notion REST client scoped to the blog and projects databases
pub struct NotionSource {
    client: reqwest::Client,
    api_base: String,
    api_version: String,
    api_key: Option<String>,
    blog_database_id: Option<String>,
    projects_database_id: Option<String>,
}

impl NotionSource {
    /// Create a client from configuration
    ///
    /// A missing API key is not an error here: every request will report
    /// `SourceUnavailable`, which the fallback layer absorbs.
    pub fn new(config: &NotionConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .config_err("Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            api_version: config.api_version.clone(),
            api_key: config.api_key.clone(),
            blog_database_id: config.blog_database_id.clone(),
            projects_database_id: config.projects_database_id.clone(),
        })
    }

    fn api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| ShowreelError::SourceUnavailable("NOTION_API_KEY is not set".to_string()))
    }

    /// Query a database, optionally filtered and sorted by `Date` descending
    async fn query_database(&self, database_id: &str, filter: Option<Value>, sort_by_date: bool) -> Result<Value> {
        let token = self.api_key()?;
        let url = format!("{}/databases/{}/query", self.api_base, database_id);

        let mut body = json!({});
        if let Some(filter) = filter {
            body["filter"] = filter;
        }
        if sort_by_date {
            body["sorts"] = json!([{ "property": "Date", "direction": "descending" }]);
        }

        debug!("Querying Notion database {}", database_id);

        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .header("Notion-Version", &self.api_version)
            .json(&body)
            .send()
            .await
            .source_err("Notion request failed")?;

        if !response.status().is_success() {
            return Err(ShowreelError::SourceUnavailable(format!(
                "Notion API error: {}",
                response.status()
            )));
        }

        response.json().await.source_err("Malformed Notion response")
    }

    async fn block_children(&self, block_id: &str) -> Result<Vec<Value>> {
        let token = self.api_key()?;
        let url = format!("{}/blocks/{}/children", self.api_base, block_id);

        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .header("Notion-Version", &self.api_version)
            .send()
            .await
            .source_err("Notion request failed")?;

        if !response.status().is_success() {
            return Err(ShowreelError::SourceUnavailable(format!(
                "Notion API error: {}",
                response.status()
            )));
        }

        let data: Value = response.json().await.source_err("Malformed Notion response")?;
        Ok(results(&data).to_vec())
    }
}

#[async_trait]
impl ContentSource for NotionSource {
    fn name(&self) -> &str {
        "notion"
    }

    async fn list_projects(&self) -> Result<Vec<Project>> {
        let Some(database_id) = self.projects_database_id.as_deref() else {
            warn!("NOTION_PROJECTS_DATABASE_ID is not set - returning empty projects");
            return Ok(Vec::new());
        };

        let data = self.query_database(database_id, None, false).await?;
        let mut projects: Vec<Project> = results(&data).iter().map(parse_project).collect();
        projects.sort_by_key(|p| p.s_no);

        info!("Fetched {} projects from Notion", projects.len());
        Ok(projects)
    }

    async fn list_posts(&self) -> Result<Vec<BlogPost>> {
        let Some(database_id) = self.blog_database_id.as_deref() else {
            warn!("NOTION_DATABASE_ID is not set - returning empty blog posts");
            return Ok(Vec::new());
        };

        let data = self.query_database(database_id, None, true).await?;
        let posts: Vec<BlogPost> = results(&data).iter().map(parse_post).collect();

        info!("Fetched {} blog posts from Notion", posts.len());
        Ok(posts)
    }

    async fn post_by_slug(&self, slug: &str) -> Result<Option<BlogPostDetail>> {
        let database_id = self
            .blog_database_id
            .as_deref()
            .ok_or_else(|| ShowreelError::SourceUnavailable("NOTION_DATABASE_ID is not set".to_string()))?;

        let filter = json!({ "property": "Slug", "rich_text": { "equals": slug } });
        let data = self.query_database(database_id, Some(filter), true).await?;

        let Some(page) = results(&data).first() else {
            return Ok(None);
        };

        let post = parse_post(page);
        let blocks = self.block_children(&post.id).await?;

        Ok(Some(BlogPostDetail { post, blocks }))
    }
}

fn results(data: &Value) -> &[Value] {
    data["results"].as_array().map(Vec::as_slice).unwrap_or(&[])
}

/// `title` or `rich_text` property, first fragment's plain text
fn text_property(props: &Value, name: &str) -> Option<String> {
    let prop = &props[name];
    prop["title"]
        .get(0)
        .or_else(|| prop["rich_text"].get(0))
        .and_then(|fragment| fragment["plain_text"].as_str())
        .map(str::to_string)
}

/// URL of a `files` entry, hosted or external
fn file_url(file: &Value) -> Option<String> {
    file["file"]["url"]
        .as_str()
        .or_else(|| file["external"]["url"].as_str())
        .map(str::to_string)
}

fn first_file_url(props: &Value, name: &str) -> Option<String> {
    props[name]["files"].get(0).and_then(file_url)
}

fn all_file_urls(props: &Value, name: &str) -> Vec<String> {
    props[name]["files"]
        .as_array()
        .map(|files| files.iter().filter_map(file_url).collect())
        .unwrap_or_default()
}

fn multi_select(props: &Value, name: &str) -> Vec<String> {
    props[name]["multi_select"]
        .as_array()
        .map(|options| {
            options
                .iter()
                .filter_map(|o| o["name"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

fn parse_project(page: &Value) -> Project {
    let props = &page["properties"];

    Project {
        id: page["id"].as_str().unwrap_or_default().to_string(),
        title: text_property(props, "Title").unwrap_or_else(|| "Untitled".to_string()),
        slug: text_property(props, "Slug").unwrap_or_default(),
        year: props["Year"]["number"]
            .as_i64()
            .and_then(|y| i32::try_from(y).ok())
            .unwrap_or_else(|| Utc::now().year()),
        role: text_property(props, "Role").unwrap_or_default(),
        thumbnail_url: first_file_url(props, "Thumbnail").unwrap_or_else(|| PLACEHOLDER_THUMBNAIL.to_string()),
        video_url: props["Video URL"]["url"].as_str().map(str::to_string),
        description: text_property(props, "Description").unwrap_or_default(),
        credits: multi_select(props, "Credits"),
        still_images: all_file_urls(props, "Still Images"),
        category: props["Category"]["select"]["name"]
            .as_str()
            .map(ProjectCategory::from_name)
            .unwrap_or_default(),
        featured: props["Featured"]["checkbox"].as_bool().unwrap_or(false),
        s_no: props["SNo"]["number"].as_i64().unwrap_or(0),
    }
}

fn parse_post(page: &Value) -> BlogPost {
    let props = &page["properties"];

    BlogPost {
        id: page["id"].as_str().unwrap_or_default().to_string(),
        title: text_property(props, "Title").unwrap_or_else(|| "Untitled".to_string()),
        slug: text_property(props, "Slug").unwrap_or_default(),
        date: props["Date"]["date"]["start"]
            .as_str()
            .map(str::to_string)
            .unwrap_or_else(|| Utc::now().to_rfc3339()),
        excerpt: text_property(props, "Excerpt").unwrap_or_default(),
        thumbnail: first_file_url(props, "Thumbnail").unwrap_or_else(|| PLACEHOLDER_THUMBNAIL.to_string()),
        content: None,
        tags: multi_select(props, "Tags"),
    }
}
