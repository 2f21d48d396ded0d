//! `[base]` section configuration.
//!
//! Contains the site metadata that ends up in the feed channel.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};

/// `[base]` section in vellum.toml - basic site metadata.
///
/// # Example
/// ```toml
/// [base]
/// title = "My Blog"
/// description = "Notes on Rust and the web"
/// author = "Alice"
/// email = "alice@example.com"
/// url = "https://myblog.com"
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct BaseConfig {
    /// Feed channel title.
    #[serde(default = "defaults::base::title")]
    #[educe(Default = defaults::base::title())]
    pub title: String,

    /// Feed channel description.
    #[serde(default = "defaults::base::description")]
    #[educe(Default = defaults::base::description())]
    pub description: String,

    /// Absolute site URL. Every entry link is resolved against it.
    #[serde(default = "defaults::base::url")]
    #[educe(Default = defaults::base::url())]
    pub url: String,

    /// Author name for the channel and items.
    #[serde(default = "defaults::base::author")]
    #[educe(Default = defaults::base::author())]
    pub author: String,

    /// Author homepage. Falls back to `url`.
    #[serde(default)]
    pub author_link: Option<String>,

    /// Author email, combined with `author` into the rss `email (Name)` form.
    #[serde(default = "defaults::base::email")]
    #[educe(Default = defaults::base::email())]
    pub email: String,

    /// BCP 47 language code (e.g., "en-US").
    #[serde(default = "defaults::base::language")]
    #[educe(Default = defaults::base::language())]
    pub language: String,

    /// Copyright notice. Empty means `Copyright © <year> <author>`.
    #[serde(default)]
    pub copyright: String,
}

impl BaseConfig {
    /// Copyright line for the given year.
    pub fn copyright_for(&self, year: i32) -> String {
        if self.copyright.is_empty() {
            format!("Copyright © {year} {}", self.author)
        } else {
            self.copyright.clone()
        }
    }

    pub fn author_link(&self) -> &str {
        self.author_link.as_deref().unwrap_or(&self.url)
    }
}
