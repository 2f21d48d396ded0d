//! `[build]` section configuration.
//!
//! Contains input/output paths and feed generation settings.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ============================================================================
// Enums
// ============================================================================

/// Publish date used for documents without a `date` key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UndatedPolicy {
    /// Time the build started (default). Undated posts rank first.
    #[default]
    BuildTime,
    /// File modification time, falling back to build time.
    Modified,
}

// ============================================================================
// Main BuildConfig
// ============================================================================

/// `[build]` section in vellum.toml.
///
/// # Example
/// ```toml
/// [build]
/// content = "docs/blogs"
/// output = "docs/.vitepress/dist"
///
/// [build.rss]
/// path = "rss.xml"
/// undated = "modified"
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Project root directory (usually set via CLI `--root`).
    #[serde(default = "defaults::build::root")]
    #[educe(Default = defaults::build::root())]
    pub root: Option<PathBuf>,

    /// Markdown source directory.
    #[serde(default = "defaults::build::content")]
    #[educe(Default = defaults::build::content())]
    pub content: PathBuf,

    /// Rendered site directory the feed is written into.
    #[serde(default = "defaults::build::output")]
    #[educe(Default = defaults::build::output())]
    pub output: PathBuf,

    /// RSS feed generation settings.
    #[serde(default)]
    pub rss: RssConfig,
}

/// `[build.rss]` section
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct RssConfig {
    /// Enable rss feed generation.
    #[serde(default = "defaults::r#true")]
    #[educe(Default = true)]
    pub enable: bool,

    /// Feed file path, relative to the output directory.
    #[serde(default = "defaults::build::rss::path")]
    #[educe(Default = defaults::build::rss::path())]
    pub path: PathBuf,

    /// Maximum characters of a description derived from the post body.
    #[serde(default = "defaults::build::rss::description_max_len")]
    #[educe(Default = defaults::build::rss::description_max_len())]
    pub description_max_len: usize,

    /// Publish date for posts without `date`.
    #[serde(default = "defaults::build::rss::undated")]
    #[educe(Default = defaults::build::rss::undated())]
    pub undated: UndatedPolicy,
}
