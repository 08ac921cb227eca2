//! Glint configuration file handling

use anyhow::{Context, Result};
use glint_animation::{Easing, EntranceAnimation, EntranceFrame, EntranceOptions};
use glint_widgets::{FadeInOptions, GlowCardOptions, GradientOptions, StaggerOptions};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// File name looked up when a directory is given
pub const CONFIG_FILE: &str = "glint.toml";

/// Top-level Glint configuration (glint.toml)
#[derive(Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct GlintConfig {
    pub preview: PreviewConfig,
    pub card: GlowCardOptions,
    pub gradient: GradientOptions,
    pub stagger: StaggerConfig,
}

/// Headless preview settings
#[derive(Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PreviewConfig {
    /// Frames to simulate
    pub frames: usize,
    /// Synthetic frame rate
    pub fps: u32,
    /// Element size used for pointer normalization (px)
    pub width: f32,
    pub height: f32,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            frames: 120,
            fps: 60,
            width: 320.0,
            height: 200.0,
        }
    }
}

/// Staggered reveal settings
#[derive(Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct StaggerConfig {
    pub items: usize,
    /// Seconds before the first item
    pub base_delay: f32,
    /// Seconds between items
    pub step: f32,
    /// Seconds per item entrance
    pub duration: f32,
    /// Pixels each item rises
    pub distance: f32,
}

impl Default for StaggerConfig {
    fn default() -> Self {
        Self {
            items: 3,
            base_delay: 0.0,
            step: 0.1,
            duration: glint_animation::entrance::DEFAULT_DURATION,
            distance: glint_animation::entrance::DEFAULT_DISTANCE,
        }
    }
}

impl StaggerConfig {
    pub fn options(&self) -> StaggerOptions {
        StaggerOptions {
            base_delay: self.base_delay,
            step: self.step,
            item: FadeInOptions {
                delay: 0.0,
                duration: self.duration,
                distance: self.distance,
                easing: Easing::entrance(),
            },
        }
    }
}

impl GlintConfig {
    /// Load configuration from a file, or from `glint.toml` in a directory
    pub fn load(path: &Path) -> Result<Self> {
        let config_path = resolve_path(path);

        if !config_path.exists() {
            anyhow::bail!(
                "No {} found at {}. Run `glint init` to create one.",
                CONFIG_FILE,
                path.display()
            );
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;

        let config = Self::from_toml(&content)
            .with_context(|| format!("Invalid configuration in {}", config_path.display()))?;

        tracing::debug!(path = %config_path.display(), "loaded configuration");
        Ok(config)
    }

    /// Parse and validate TOML content
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: GlintConfig = toml::from_str(content).context("Failed to parse TOML")?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the engine would refuse at mount time
    pub fn validate(&self) -> Result<()> {
        self.card.validate().context("[card]")?;
        self.gradient.validate().context("[gradient]")?;

        let stagger = &self.stagger;
        EntranceAnimation::new(EntranceOptions {
            delay: stagger.base_delay,
            duration: stagger.duration,
            from: EntranceFrame::hidden_below(stagger.distance),
            ..EntranceOptions::default()
        })
        .context("[stagger]")?;
        if !(stagger.step.is_finite() && stagger.step >= 0.0) {
            anyhow::bail!(
                "[stagger]: step must be finite and non-negative (got {})",
                stagger.step
            );
        }

        let preview = &self.preview;
        if preview.fps == 0 {
            anyhow::bail!("[preview]: fps must be positive");
        }
        if !(preview.width > 0.0 && preview.height > 0.0) {
            anyhow::bail!(
                "[preview]: element size must be positive (got {}x{})",
                preview.width,
                preview.height
            );
        }
        Ok(())
    }

    /// Serialize to TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }
}

/// `path` itself if it names a file, otherwise `path/glint.toml`
pub fn resolve_path(path: &Path) -> PathBuf {
    if path.is_file() {
        path.to_path_buf()
    } else {
        path.join(CONFIG_FILE)
    }
}

/// Write a default glint.toml into `dir`
///
/// Refuses to replace an existing file unless `force` is set.
pub fn write_default(dir: &Path, force: bool) -> Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;

    let config_path = dir.join(CONFIG_FILE);
    if config_path.exists() && !force {
        anyhow::bail!(
            "{} already exists. Use --force to overwrite it.",
            config_path.display()
        );
    }

    let content = GlintConfig::default().to_toml()?;
    fs::write(&config_path, content)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    Ok(config_path)
}
