use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::assets::{Fit, ImageOptions};
use crate::sources::Identity;
use crate::streaks::{DEFAULT_MILESTONES, normalize_milestones};

fn default_user_id() -> String {
    "local".to_string()
}
fn default_milestones() -> Vec<u32> {
    DEFAULT_MILESTONES.to_vec()
}
fn default_carousel_size() -> usize {
    3
}
fn default_image_width() -> u32 {
    ImageOptions::journal().width.unwrap_or(800)
}
fn default_image_height() -> u32 {
    ImageOptions::journal().height.unwrap_or(400)
}
fn default_image_quality() -> u8 {
    ImageOptions::journal().quality.unwrap_or(80)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileConfig {
    #[serde(default = "default_user_id")]
    pub user_id: String,
    #[serde(default)]
    pub display_name: String,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            user_id: default_user_id(),
            display_name: String::new(),
        }
    }
}

impl Identity for ProfileConfig {
    fn current_user_id(&self) -> Option<&str> {
        Some(self.user_id.trim()).filter(|id| !id.is_empty())
    }

    fn display_name(&self) -> Option<&str> {
        Some(self.display_name.trim()).filter(|name| !name.is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreakConfig {
    #[serde(default = "default_milestones")]
    pub milestones: Vec<u32>,
}

impl Default for StreakConfig {
    fn default() -> Self {
        Self {
            milestones: default_milestones(),
        }
    }
}

impl StreakConfig {
    pub fn milestones(&self) -> Vec<u32> {
        normalize_milestones(&self.milestones)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptsConfig {
    /// How many prompts the dashboard carousel draws
    #[serde(default = "default_carousel_size")]
    pub carousel_size: usize,
}

impl Default for PromptsConfig {
    fn default() -> Self {
        Self {
            carousel_size: default_carousel_size(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImagesConfig {
    /// Where assets are served from. Empty means the local asset folder.
    #[serde(default)]
    pub base_url: String,
    #[serde(default = "default_image_width")]
    pub width: u32,
    #[serde(default = "default_image_height")]
    pub height: u32,
    #[serde(default)]
    pub fit: Fit,
    #[serde(default = "default_image_quality")]
    pub quality: u8,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            width: default_image_width(),
            height: default_image_height(),
            fit: Fit::default(),
            quality: default_image_quality(),
        }
    }
}

impl ImagesConfig {
    pub fn entry_options(&self) -> ImageOptions {
        ImageOptions::sized(self.width, self.height, self.fit, self.quality)
    }

    pub fn base_url_or(&self, assets_dir: &Path) -> String {
        let base = self.base_url.trim();
        if base.is_empty() {
            format!("file://{}", assets_dir.display())
        } else {
            base.to_string()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub profile: ProfileConfig,
    #[serde(default)]
    pub streak: StreakConfig,
    #[serde(default)]
    pub prompts: PromptsConfig,
    #[serde(default)]
    pub images: ImagesConfig,
}

impl AppConfig {
    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("", "", "daybook")
            .context("Could not determine project directories")
    }

    pub fn config_path() -> Result<PathBuf> {
        let dirs = Self::project_dirs()?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn data_dir() -> Result<PathBuf> {
        let dirs = Self::project_dirs()?;
        Ok(dirs.data_dir().to_path_buf())
    }

    pub fn db_path() -> Result<PathBuf> {
        Ok(Self::data_dir()?.join("daybook.db"))
    }

    pub fn assets_dir() -> Result<PathBuf> {
        Ok(Self::data_dir()?.join("assets"))
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content =
            std::fs::read_to_string(path).with_context(|| format!("Reading {:?}", path))?;
        let config: AppConfig = toml::from_str(&content).context("Parsing config.toml")?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self).context("Serializing config")?;
        std::fs::write(path, content).with_context(|| format!("Writing {:?}", path))?;
        Ok(())
    }

    pub fn ensure_data_dir() -> Result<PathBuf> {
        let dir = Self::data_dir()?;
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::greeting_name;
    use tempfile::TempDir;

    #[test]
    fn missing_file_gives_defaults() {
        let tmp = TempDir::new().unwrap();
        let config = AppConfig::load_from(&tmp.path().join("none.toml")).unwrap();
        assert_eq!(config.profile.user_id, "local");
        assert_eq!(config.streak.milestones, vec![7, 30, 100, 365]);
        assert_eq!(config.prompts.carousel_size, 3);
        assert_eq!(config.images.entry_options(), ImageOptions::journal());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(
            &path,
            "[profile]\ndisplay_name = \"Ana\"\n\n[images]\nquality = 60\nfit = \"max\"\n",
        )
        .unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.profile.user_id, "local");
        assert_eq!(config.profile.display_name, "Ana");
        assert_eq!(config.images.quality, 60);
        assert_eq!(config.images.fit, Fit::Max);
        assert_eq!(config.images.width, 800);
        assert_eq!(config.prompts.carousel_size, 3);
    }

    #[test]
    fn save_then_load() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("config.toml");
        let mut config = AppConfig::default();
        config.profile.display_name = "Bo".to_string();
        config.streak.milestones = vec![3, 10];
        config.save_to(&path).unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded.profile.display_name, "Bo");
        assert_eq!(loaded.streak.milestones, vec![3, 10]);
    }

    #[test]
    fn unusable_milestones_fall_back() {
        let streak = StreakConfig {
            milestones: vec![0, 0],
        };
        assert_eq!(streak.milestones(), vec![7, 30, 100, 365]);

        let streak = StreakConfig {
            milestones: vec![30, 5, 30],
        };
        assert_eq!(streak.milestones(), vec![5, 30]);
    }

    #[test]
    fn profile_identity() {
        let mut profile = ProfileConfig::default();
        assert_eq!(greeting_name(&profile), "local");
        profile.display_name = "  Ana ".to_string();
        assert_eq!(greeting_name(&profile), "Ana");
        profile.user_id = "   ".to_string();
        assert_eq!(profile.current_user_id(), None);
    }

    #[test]
    fn empty_base_url_points_at_assets_dir() {
        let images = ImagesConfig::default();
        assert_eq!(
            images.base_url_or(Path::new("/data/assets")),
            "file:///data/assets"
        );
    }
}
