//! Media URL resolution for showreel
//!
//! Maps opaque CDN keys to display URLs, optionally carrying image
//! transform parameters understood by the CDN's resizing layer.

use crate::utils::error::{Result, ShowreelError};
use serde::{Deserialize, Serialize};
use std::fmt;
use url::form_urlencoded;

/// Widths used for responsive `srcset`s
pub const DEFAULT_WIDTHS: [u32; 5] = [320, 640, 1024, 1280, 1920];

/// Output image format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Webp,
    Jpg,
    Png,
    Avif,
}

impl ImageFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageFormat::Webp => "webp",
            ImageFormat::Jpg => "jpg",
            ImageFormat::Png => "png",
            ImageFormat::Avif => "avif",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Webp => "image/webp",
            ImageFormat::Jpg => "image/jpeg",
            ImageFormat::Png => "image/png",
            ImageFormat::Avif => "image/avif",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "webp" => Some(ImageFormat::Webp),
            "jpg" | "jpeg" => Some(ImageFormat::Jpg),
            "png" => Some(ImageFormat::Png),
            "avif" => Some(ImageFormat::Avif),
            _ => None,
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resize behaviour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Fit {
    ScaleDown,
    Contain,
    Cover,
    Crop,
    Pad,
}

impl Fit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Fit::ScaleDown => "scale-down",
            Fit::Contain => "contain",
            Fit::Cover => "cover",
            Fit::Crop => "crop",
            Fit::Pad => "pad",
        }
    }
}

/// Optional transform parameters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<ImageFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fit: Option<Fit>,
}

impl TransformOptions {
    pub fn width(width: u32) -> Self {
        Self {
            width: Some(width),
            ..Self::default()
        }
    }

    pub fn with_format(mut self, format: ImageFormat) -> Self {
        self.format = Some(format);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Query string in a fixed parameter order, without the leading `?`
    fn query(&self) -> String {
        let mut query = form_urlencoded::Serializer::new(String::new());

        if let Some(width) = self.width.filter(|w| *w > 0) {
            query.append_pair("width", &width.to_string());
        }
        if let Some(height) = self.height.filter(|h| *h > 0) {
            query.append_pair("height", &height.to_string());
        }
        if let Some(quality) = self.quality.filter(|q| *q > 0) {
            query.append_pair("quality", &quality.to_string());
        }
        if let Some(format) = self.format {
            query.append_pair("format", format.as_str());
        }
        if let Some(fit) = self.fit {
            query.append_pair("fit", fit.as_str());
        }

        query.finish()
    }
}

/// One `<source>` entry of a `<picture>` element
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PictureSource {
    pub src_set: String,
    #[serde(rename = "type")]
    pub mime_type: String,
}

/// Resolves asset keys against the public CDN location
///
/// Pure: holds only the configured base URL.
#[derive(Debug, Clone, Default)]
pub struct MediaResolver {
    base_url: Option<String>,
}

impl MediaResolver {
    pub fn new(base_url: Option<String>) -> Self {
        let base_url = base_url
            .map(|u| u.trim().trim_end_matches('/').to_string())
            .filter(|u| !u.is_empty());
        Self { base_url }
    }

    pub fn is_configured(&self) -> bool {
        self.base_url.is_some()
    }

    /// Plain public URL for a key
    pub fn public_url(&self, key: &str) -> Result<String> {
        let base = self.base_url.as_deref().ok_or_else(|| {
            ShowreelError::Configuration("NEXT_PUBLIC_R2_PUBLIC_URL is not configured".to_string())
        })?;
        Ok(format!("{}/{}", base, key.trim_start_matches('/')))
    }

    /// Display URL for a key with transform parameters
    pub fn resolve(&self, key: &str, options: &TransformOptions) -> Result<String> {
        let url = self.public_url(key)?;
        let query = options.query();

        if query.is_empty() {
            Ok(url)
        } else {
            Ok(format!("{}?{}", url, query))
        }
    }

    /// Responsive `srcset` attribute value
    pub fn srcset(&self, key: &str, widths: &[u32], format: ImageFormat) -> Result<String> {
        let entries = widths
            .iter()
            .map(|&width| {
                let url = self.resolve(key, &TransformOptions::width(width).with_format(format))?;
                Ok(format!("{} {}w", url, width))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(entries.join(", "))
    }

    /// `<picture>` sources in preference order: avif, webp, jpeg
    pub fn picture_sources(&self, key: &str, widths: &[u32]) -> Result<Vec<PictureSource>> {
        [ImageFormat::Avif, ImageFormat::Webp, ImageFormat::Jpg]
            .into_iter()
            .map(|format| {
                Ok(PictureSource {
                    src_set: self.srcset(key, widths, format)?,
                    mime_type: format.mime_type().to_string(),
                })
            })
            .collect()
    }

    /// Whether `value` already is a URL or site path rather than a CDN key
    pub fn is_absolute(value: &str) -> bool {
        value.starts_with('/') || value.starts_with("http://") || value.starts_with("https://")
    }
}
