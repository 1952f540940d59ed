use crate::contact::ContactForm;
use crate::content::{filter_by_category, BlogPost, BlogPostDetail, PlayableItem, Project, ProjectCategory};
use crate::media::{ImageFormat, TransformOptions};
use crate::server::{ApiResponse, AppState};
use crate::utils::error::{Result, ShowreelError};
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

type ApiResult<T> = Result<Json<ApiResponse<T>>>;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

#[derive(Debug, Default, Deserialize)]
pub struct ProjectsQuery {
    category: Option<String>,
}

impl ProjectsQuery {
    /// `None` for a missing, empty or "All" category
    fn category(&self) -> Option<ProjectCategory> {
        self.category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty() && !c.eq_ignore_ascii_case("all"))
            .map(ProjectCategory::from_name)
    }
}

pub async fn list_projects(State(state): State<AppState>, Query(query): Query<ProjectsQuery>) -> ApiResult<Vec<Project>> {
    let projects = state.content.list_projects().await?;
    let projects = filter_by_category(projects, query.category());
    debug!("Serving {} projects", projects.len());
    Ok(Json(ApiResponse::ok(projects)))
}

pub async fn get_project(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Project> {
    match state.content.project_by_id(&id).await? {
        Some(project) => Ok(Json(ApiResponse::ok(project))),
        None => Err(ShowreelError::NotFound("Project not found".to_string())),
    }
}

/// Projects as player items, in playlist order
pub async fn playlist(State(state): State<AppState>) -> ApiResult<Vec<PlayableItem>> {
    Ok(Json(ApiResponse::ok(state.content.list().await?)))
}

pub async fn list_posts(State(state): State<AppState>) -> ApiResult<Vec<BlogPost>> {
    Ok(Json(ApiResponse::ok(state.content.list_posts().await?)))
}

pub async fn get_post(State(state): State<AppState>, Path(slug): Path<String>) -> ApiResult<BlogPostDetail> {
    match state.content.post_by_slug(&slug).await? {
        Some(post) => Ok(Json(ApiResponse::ok(post))),
        None => Err(ShowreelError::NotFound("Post not found".to_string())),
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct AssetQuery {
    key: Option<String>,
    width: Option<String>,
    height: Option<String>,
    quality: Option<String>,
    format: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetRequest {
    key: String,
    #[serde(flatten)]
    options: TransformOptions,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetData {
    url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    transformed_url: Option<String>,
    asset: AssetRequest,
}

fn parse_param<T: FromStr>(name: &str, value: Option<&str>) -> Result<Option<T>> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| ShowreelError::InvalidInput(format!("Invalid {} parameter: {}", name, raw))),
    }
}

impl AssetQuery {
    fn options(&self) -> Result<TransformOptions> {
        let format = match self.format.as_deref().filter(|f| !f.is_empty()) {
            None => None,
            Some(raw) => Some(
                ImageFormat::parse(raw)
                    .ok_or_else(|| ShowreelError::InvalidInput(format!("Invalid format parameter: {}", raw)))?,
            ),
        };

        Ok(TransformOptions {
            width: parse_param("width", self.width.as_deref())?,
            height: parse_param("height", self.height.as_deref())?,
            quality: parse_param("quality", self.quality.as_deref())?,
            format,
            fit: None,
        })
    }
}

/// Resolve an asset key to its CDN URL
pub async fn asset(State(state): State<AppState>, Query(query): Query<AssetQuery>) -> ApiResult<AssetData> {
    let key = query
        .key
        .clone()
        .filter(|k| !k.is_empty())
        .ok_or_else(|| ShowreelError::InvalidInput("Missing required parameter: key".to_string()))?;
    let options = query.options()?;

    let url = state.media.public_url(&key)?;
    let transformed_url = if options.is_empty() {
        None
    } else {
        Some(state.media.resolve(&key, &options)?)
    };

    Ok(Json(ApiResponse::ok(AssetData {
        url,
        transformed_url,
        asset: AssetRequest { key, options },
    })))
}

#[derive(Debug, Serialize)]
pub struct ContactReceipt {
    message: String,
}

/// Validate and acknowledge a contact submission
pub async fn submit_contact(body: Bytes) -> ApiResult<ContactReceipt> {
    let form: ContactForm = serde_json::from_slice(&body)
        .map_err(|e| ShowreelError::InvalidInput(format!("Malformed contact form: {}", e)))?;

    form.validate()?;
    info!("Accepted contact form submission");

    Ok(Json(ApiResponse::ok(ContactReceipt {
        message: "Contact form submitted successfully".to_string(),
    })))
}
