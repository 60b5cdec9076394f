//! Configuration management for tgmark.
//!
//! Loads configuration from ${TGMARK_HOME}/config.toml with sensible defaults.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Glyphs written in place of markup that has no entity equivalent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Symbols {
    pub heading_level_1: String,
    pub heading_level_2: String,
    pub heading_level_3: String,
    pub heading_level_4: String,
    pub heading_level_5: String,
    pub heading_level_6: String,
    /// Written before an image's alt text.
    pub image: String,
    pub task_completed: String,
    pub task_uncompleted: String,
}

impl Symbols {
    /// Glyph for a heading of `level` (1-6). Out-of-range levels get none.
    pub fn heading(&self, level: u8) -> &str {
        match level {
            1 => &self.heading_level_1,
            2 => &self.heading_level_2,
            3 => &self.heading_level_3,
            4 => &self.heading_level_4,
            5 => &self.heading_level_5,
            6 => &self.heading_level_6,
            _ => "",
        }
    }

    pub fn task(&self, checked: bool) -> &str {
        if checked {
            &self.task_completed
        } else {
            &self.task_uncompleted
        }
    }
}

impl Default for Symbols {
    fn default() -> Self {
        Self {
            heading_level_1: "📌".to_string(),
            heading_level_2: "📝".to_string(),
            heading_level_3: "📋".to_string(),
            heading_level_4: "📄".to_string(),
            heading_level_5: "📃".to_string(),
            heading_level_6: "🔖".to_string(),
            image: "🖼".to_string(),
            task_completed: "✅".to_string(),
            task_uncompleted: "☑️".to_string(),
        }
    }
}

/// Options for a single Markdown conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Promote long blockquotes to expandable blockquotes.
    pub cite_expandable: bool,
    /// Blockquotes longer than this many UTF-16 units become expandable.
    pub expandable_quote_threshold: u32,
    /// Rewrite `\(...\)` and `\[...\]` math into Unicode before parsing.
    pub latex_escape: bool,
    pub symbols: Symbols,
}

impl RenderConfig {
    pub const DEFAULT_EXPANDABLE_QUOTE_THRESHOLD: u32 = 200;
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            cite_expandable: true,
            expandable_quote_threshold: Self::DEFAULT_EXPANDABLE_QUOTE_THRESHOLD,
            latex_escape: true,
            symbols: Symbols::default(),
        }
    }
}

/// Message splitting and artifact extraction settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Maximum UTF-16 length of one text message. 0 means the protocol limit.
    pub max_message_length: usize,
    /// Code blocks with more lines than this are sent as files.
    pub code_file_line_threshold: usize,
    /// Timeout for rendering one diagram, in seconds. 0 disables the timeout.
    pub render_timeout_secs: u64,
}

impl PipelineConfig {
    pub const DEFAULT_MAX_MESSAGE_LENGTH: usize = crate::split::DEFAULT_MAX_MESSAGE_LENGTH;
    pub const DEFAULT_CODE_FILE_LINE_THRESHOLD: usize = 50;
    pub const DEFAULT_RENDER_TIMEOUT_SECS: u64 = 10;

    /// Returns the diagram render timeout, or `None` when disabled.
    pub fn render_timeout(&self) -> Option<Duration> {
        (self.render_timeout_secs > 0).then(|| Duration::from_secs(self.render_timeout_secs))
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_message_length: Self::DEFAULT_MAX_MESSAGE_LENGTH,
            code_file_line_threshold: Self::DEFAULT_CODE_FILE_LINE_THRESHOLD,
            render_timeout_secs: Self::DEFAULT_RENDER_TIMEOUT_SECS,
        }
    }
}

/// Diagram rendering service settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MermaidConfig {
    /// When false, diagrams are always sent as source files.
    pub enabled: bool,
    pub base_url: String,
    pub theme: String,
}

impl MermaidConfig {
    pub const DEFAULT_BASE_URL: &'static str = "https://mermaid.ink";
    pub const DEFAULT_THEME: &'static str = "default";
}

impl Default for MermaidConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            theme: Self::DEFAULT_THEME.to_string(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub render: RenderConfig,
    pub pipeline: PipelineConfig,
    pub mermaid: MermaidConfig,
}

/// Returns the embedded default config template.
fn default_config_template() -> &'static str {
    include_str!("../default_config.toml")
}

pub mod paths {
    //! Path resolution for tgmark configuration.
    //!
    //! TGMARK_HOME resolution order:
    //! 1. TGMARK_HOME environment variable (if set)
    //! 2. ~/.config/tgmark (default)

    use std::path::PathBuf;

    pub const HOME_ENV: &str = "TGMARK_HOME";

    /// Returns the tgmark home directory.
    pub fn tgmark_home() -> PathBuf {
        if let Ok(home) = std::env::var(HOME_ENV) {
            return PathBuf::from(home);
        }

        dirs::home_dir()
            .unwrap_or_default()
            .join(".config")
            .join("tgmark")
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        tgmark_home().join("config.toml")
    }
}

impl Config {
    /// Loads configuration from the default location.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    /// Writes the default config template to `path`.
    ///
    /// Fails if a file already exists there.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("Config file already exists at {}", path.display());
        }

        Self::write_config(path, default_config_template())
    }

    /// Generates a config TOML from Rust defaults.
    ///
    /// Uses the embedded template for structure/comments and merges
    /// generated values from `Config::default()` into it.
    pub fn generate() -> Result<String> {
        use toml_edit::DocumentMut;

        let generated_toml = toml::to_string(&Config::default())
            .context("Failed to serialize default config to TOML")?;

        // Parse template as base (preserves comments)
        let mut doc: DocumentMut = default_config_template()
            .parse()
            .context("Failed to parse default config template")?;
        let generated_doc: DocumentMut = generated_toml
            .parse()
            .context("Failed to parse generated config")?;

        merge_items(doc.as_table_mut(), generated_doc.as_table());

        Ok(doc.to_string())
    }

    /// Writes config content to a file, creating parent directories as needed.
    /// Uses atomic write (temp file + rename) to prevent corruption.
    fn write_config(path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let tmp_path = path.with_extension("toml.tmp");
        fs::write(&tmp_path, content)
            .with_context(|| format!("Failed to write config to {}", tmp_path.display()))?;
        fs::rename(&tmp_path, path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                tmp_path.display(),
                path.display()
            )
        })?;

        Ok(())
    }
}

/// Recursively overlays values from `source` onto `target`, keeping the
/// target's comments and layout.
fn merge_items(target: &mut toml_edit::Table, source: &toml_edit::Table) {
    use toml_edit::Item;

    for (key, value) in source.iter() {
        match value {
            Item::Value(v) => {
                target[key] = Item::Value(v.clone());
            }
            Item::Table(src_table) => {
                if let Some(Item::Table(target_table)) = target.get_mut(key) {
                    merge_items(target_table, src_table);
                } else {
                    target[key] = Item::Table(src_table.clone());
                }
            }
            Item::ArrayOfTables(src_arr) => {
                target[key] = Item::ArrayOfTables(src_arr.clone());
            }
            Item::None => {}
        }
    }
}
