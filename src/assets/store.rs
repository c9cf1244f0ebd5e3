use anyhow::{Context, Result};
use log::{debug, info};
use rusqlite::Connection;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

use crate::db::repository::AssetRepo;
use crate::error::JournalError;

const IMAGE_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "gif", "webp", "heic"];

/// A stored upload as recorded in the database.
#[derive(Debug, Clone, Serialize)]
pub struct Asset {
    pub id: String,
    pub filename: String,
    pub size_bytes: u64,
    pub created_at: String,
}

/// Reference to an uploaded image: `image-<sha256>-<ext>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetRef {
    pub id: String,
}

impl AssetRef {
    pub fn new(id: impl Into<String>) -> Self {
        AssetRef { id: id.into() }
    }

    fn parts(&self) -> Option<(&str, &str)> {
        let rest = self.id.strip_prefix("image-")?;
        rest.rsplit_once('-')
    }

    /// Name of the stored file, `<sha256>.<ext>`.
    pub fn file_name(&self) -> String {
        match self.parts() {
            Some((hash, ext)) => format!("{}.{}", hash, ext),
            None => self.id.clone(),
        }
    }
}

/// Content-addressed image storage under the data directory.
pub struct AssetStore {
    dir: PathBuf,
}

impl AssetStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        AssetStore { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Copy the image at `source` into the store and record it. Uploading the
    /// same bytes twice yields the same reference and a single stored file.
    pub fn upload(&self, conn: &Connection, source: &Path) -> Result<AssetRef> {
        let ext = source
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .filter(|e| IMAGE_EXTENSIONS.contains(&e.as_str()))
            .ok_or_else(|| JournalError::UnsupportedImage(source.display().to_string()))?;

        let bytes = fs::read(source)
            .with_context(|| format!("Reading image {:?}", source))?;

        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        let hash = format!("{:x}", hasher.finalize());
        let asset = AssetRef::new(format!("image-{}-{}", hash, ext));

        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Creating asset directory {:?}", self.dir))?;
        let target = self.dir.join(asset.file_name());
        if target.exists() {
            debug!("Asset {} already stored", asset.id);
        } else {
            fs::write(&target, &bytes)
                .with_context(|| format!("Writing asset {:?}", target))?;
            info!("Stored asset {} ({} bytes)", asset.id, bytes.len());
        }

        let filename = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| asset.file_name());
        AssetRepo::record(conn, &asset.id, &filename, bytes.len() as u64)?;
        Ok(asset)
    }

    pub fn path_of(&self, asset: &AssetRef) -> PathBuf {
        self.dir.join(asset.file_name())
    }
}
