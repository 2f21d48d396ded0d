//! Site configuration management for `vellum.toml`.
//!
//! # Sections
//!
//! | Section        | Purpose                                         |
//! |----------------|-------------------------------------------------|
//! | `[base]`       | Site metadata (title, author, url, language)    |
//! | `[build]`      | Content and output directories                  |
//! | `[build.rss]`  | Feed file name and entry derivation settings    |
//! | `[extra]`      | User-defined custom fields                      |
//!
//! The file is optional: without it the defaults in [`defaults`] apply.
//! After CLI overrides are applied the config is frozen and handed around as
//! `&SiteConfig`.
//!
//! # Example
//!
//! ```toml
//! [base]
//! title = "My Blog"
//! description = "A personal blog"
//! url = "https://example.com"
//!
//! [build]
//! content = "docs/blogs"
//! output = "docs/.vitepress/dist"
//!
//! [build.rss]
//! path = "rss.xml"
//! ```

mod base;
mod build;
pub mod defaults;
mod error;

pub use build::UndatedPolicy;
pub use error::ConfigError;

use crate::cli::{Cli, Commands};
use anyhow::{Result, bail};
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};
use url::Url;

// ============================================================================
// Root Configuration
// ============================================================================

/// Root configuration structure representing vellum.toml
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct SiteConfig {
    /// Absolute path to the config file (set after loading)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Basic site information
    #[serde(default)]
    pub base: base::BaseConfig,

    /// Build settings
    #[serde(default)]
    pub build: build::BuildConfig,

    /// User-defined extra fields
    #[serde(default)]
    pub extra: HashMap<String, toml::Value>,
}

impl SiteConfig {
    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: SiteConfig = toml::from_str(content).map_err(ConfigError::from)?;
        Ok(config)
    }

    /// Load configuration from file path
    pub fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        Self::from_str(&content)
    }

    /// Get the root directory path
    pub fn get_root(&self) -> &Path {
        self.build.root.as_deref().unwrap_or(Path::new("./"))
    }

    /// Set the root directory path
    pub fn set_root(&mut self, path: &Path) {
        self.build.root = Some(path.to_path_buf())
    }

    /// Absolute path of the feed file.
    pub fn feed_path(&self) -> PathBuf {
        self.build.output.join(&self.build.rss.path)
    }

    /// Site base URL, with a trailing slash so relative routes append to it.
    pub fn base_url(&self) -> Result<Url> {
        let mut url = Url::parse(&self.base.url).map_err(|err| {
            ConfigError::Validation(format!("[base.url] `{}` is invalid: {err}", self.base.url))
        })?;
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(url)
    }

    /// Apply CLI arguments and resolve every path against the root.
    pub fn update_with_cli(&mut self, cli: &Cli) {
        let root = cli
            .root
            .clone()
            .unwrap_or_else(|| self.get_root().to_owned());

        let source = cli.source();
        Self::update_option(&mut self.build.content, source.content.as_ref());
        Self::update_option(&mut self.base.url, source.base_url.as_ref());

        if let Commands::Build { output, rss, .. } = &cli.command {
            Self::update_option(&mut self.build.output, output.as_ref());
            Self::update_option(&mut self.build.rss.enable, rss.as_ref());
        }

        self.update_path_with_root(&root, &cli.config);
    }

    /// Update config option if CLI value is provided
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    /// Normalize root, config and directory paths to absolute paths
    fn update_path_with_root(&mut self, root: &Path, config_name: &Path) {
        let root = Self::normalize_path(root);
        self.set_root(&root);

        self.config_path = Self::normalize_path(&root.join(config_name));
        self.build.content = Self::normalize_path(&root.join(&self.build.content));
        self.build.output = Self::normalize_path(&root.join(&self.build.output));
    }

    /// Normalize a path to absolute, using canonicalize if the path exists
    fn normalize_path(path: &Path) -> PathBuf {
        path.canonicalize().unwrap_or_else(|_| {
            // For non-existent paths, manually make them absolute
            if path.is_absolute() {
                path.to_path_buf()
            } else {
                std::env::current_dir()
                    .map(|cwd| cwd.join(path))
                    .unwrap_or_else(|_| path.to_path_buf())
            }
        })
    }

    /// Validate settings the feed depends on.
    pub fn validate(&self) -> Result<()> {
        let url = self.base_url()?;
        if !matches!(url.scheme(), "http" | "https") {
            bail!(ConfigError::Validation(
                "[base.url] must start with http:// or https://".into()
            ));
        }

        if let Some(link) = &self.base.author_link
            && Url::parse(link).is_err()
        {
            bail!(ConfigError::Validation(format!(
                "[base.author_link] `{link}` is not an absolute URL"
            )));
        }

        if self.build.rss.description_max_len == 0 {
            bail!(ConfigError::Validation(
                "[build.rss.description_max_len] must be greater than 0".into()
            ));
        }

        if self.build.rss.path.as_os_str().is_empty() || self.build.rss.path.is_absolute() {
            bail!(ConfigError::Validation(
                "[build.rss.path] must be a relative file path".into()
            ));
        }

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_from_str() {
        let config = SiteConfig::from_str(
            r#"
            [base]
            title = "My Blog"
            author = "Test Author"
        "#,
        )
        .unwrap();

        assert_eq!(config.base.title, "My Blog");
        assert_eq!(config.base.author, "Test Author");
    }

    #[test]
    fn test_from_str_invalid_toml() {
        let err = SiteConfig::from_str("[base\ntitle = \"x\"").unwrap_err();
        assert!(err.downcast_ref::<ConfigError>().is_some());
    }

    #[test]
    fn test_from_path_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = SiteConfig::from_path(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::Io(..))
        ));
    }

    #[test]
    fn test_unknown_top_level_field_rejection() {
        let config = r#"
            [deploy]
            provider = "github"
        "#;
        assert!(SiteConfig::from_str(config).is_err());
    }

    #[test]
    fn test_extra_fields() {
        let config = SiteConfig::from_str(
            r#"
            [extra]
            analytics_id = "UA-12345"
            fonts = ["Inter", "JetBrains Mono"]
        "#,
        )
        .unwrap();

        assert_eq!(
            config.extra.get("analytics_id").and_then(|v| v.as_str()),
            Some("UA-12345")
        );
        assert_eq!(
            config.extra.get("fonts").and_then(|v| v.as_array()).map(Vec::len),
            Some(2)
        );
    }

    #[test]
    fn test_get_root_default() {
        let config = SiteConfig::default();
        assert_eq!(config.get_root(), Path::new("./"));
    }

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let mut config = SiteConfig::default();
        config.base.url = "https://example.com/blog".into();
        assert_eq!(config.base_url().unwrap().as_str(), "https://example.com/blog/");

        config.base.url = "https://example.com".into();
        assert_eq!(config.base_url().unwrap().as_str(), "https://example.com/");
    }

    #[test]
    fn test_validate_default_config() {
        assert!(SiteConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_url() {
        let mut config = SiteConfig::default();
        config.base.url = "example.com".into();
        assert!(config.validate().is_err());

        config.base.url = "ftp://example.com".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_description_len() {
        let mut config = SiteConfig::default();
        config.build.rss.description_max_len = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_author_link() {
        let mut config = SiteConfig::default();
        config.base.author_link = Some("/about".into());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_update_with_cli_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().to_str().unwrap();
        let cli = Cli::parse_from([
            "vellum",
            "--root",
            root,
            "build",
            "--content",
            "posts",
            "--output",
            "dist",
            "--base-url",
            "https://preview.example.com",
            "--rss=false",
        ]);

        let mut config = SiteConfig::default();
        config.update_with_cli(&cli);

        let root = dir.path().canonicalize().unwrap();
        assert_eq!(config.get_root(), root.as_path());
        assert_eq!(config.build.content, root.join("posts"));
        assert_eq!(config.build.output, root.join("dist"));
        assert_eq!(config.config_path, root.join("vellum.toml"));
        assert_eq!(config.feed_path(), root.join("dist").join("rss.xml"));
        assert_eq!(config.base.url, "https://preview.example.com");
        assert!(!config.build.rss.enable);
    }

    #[test]
    fn test_update_with_cli_keeps_config_values() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().to_str().unwrap();
        let cli = Cli::parse_from(["vellum", "--root", root, "query"]);

        let mut config = SiteConfig::from_str(
            r#"
            [base]
            url = "https://alice.dev"
            [build]
            content = "notes"
        "#,
        )
        .unwrap();
        config.update_with_cli(&cli);

        let root = dir.path().canonicalize().unwrap();
        assert_eq!(config.build.content, root.join("notes"));
        assert_eq!(config.base.url, "https://alice.dev");
        assert!(config.build.rss.enable);
    }
}
