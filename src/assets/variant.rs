use serde::{Deserialize, Serialize};
use std::fmt;

use super::AssetRef;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Fit {
    Clip,
    #[default]
    Crop,
    Fill,
    Max,
}

impl fmt::Display for Fit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Fit::Clip => "clip",
            Fit::Crop => "crop",
            Fit::Fill => "fill",
            Fit::Max => "max",
        };
        f.write_str(s)
    }
}

/// Transform parameters appended to an asset URL.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageOptions {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub fit: Option<Fit>,
    pub quality: Option<u8>,
}

impl ImageOptions {
    pub fn width(width: u32) -> Self {
        ImageOptions {
            width: Some(width),
            ..Default::default()
        }
    }

    /// 800x400 crop at quality 80.
    pub fn journal() -> Self {
        Self::sized(800, 400, Fit::Crop, 80)
    }

    pub fn sized(width: u32, height: u32, fit: Fit, quality: u8) -> Self {
        ImageOptions {
            width: Some(width),
            height: Some(height),
            fit: Some(fit),
            quality: Some(quality.clamp(1, 100)),
        }
    }

    pub fn thumbnail() -> Self {
        ImageOptions {
            width: Some(200),
            height: Some(200),
            fit: Some(Fit::Crop),
            quality: None,
        }
    }

    fn query(&self) -> String {
        let mut params = Vec::new();
        if let Some(w) = self.width {
            params.push(format!("w={}", w));
        }
        if let Some(h) = self.height {
            params.push(format!("h={}", h));
        }
        if let Some(fit) = self.fit {
            params.push(format!("fit={}", fit));
        }
        if let Some(q) = self.quality {
            params.push(format!("q={}", q));
        }
        params.push("auto=format".to_string());
        params.join("&")
    }
}

impl AssetRef {
    pub fn url(&self, base: &str, options: &ImageOptions) -> String {
        format!(
            "{}/{}?{}",
            base.trim_end_matches('/'),
            self.file_name(),
            options.query()
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponsiveUrls {
    pub small: String,
    pub medium: String,
    pub large: String,
    pub thumbnail: String,
}

pub fn responsive_urls(asset: &AssetRef, base: &str) -> ResponsiveUrls {
    ResponsiveUrls {
        small: asset.url(base, &ImageOptions::width(400)),
        medium: asset.url(base, &ImageOptions::width(800)),
        large: asset.url(base, &ImageOptions::width(1200)),
        thumbnail: asset.url(base, &ImageOptions::thumbnail()),
    }
}
