//! rss feed generation.
//!
//! Reads every eligible Markdown document, derives one [`FeedEntry`] per
//! document and writes an RSS 2.0 channel to `[build.rss].path`.
//!
//! ```text
//! collect_documents() ──► Document::read() ──► FeedBuilder::entry() ──► sort ──► to_xml()
//!      (walkdir)            (rayon, fail-soft       (url/title/desc/date)   (newest    (rss crate)
//!                            front matter)                                    first)
//! ```

use crate::{
    config::{SiteConfig, UndatedPolicy},
    content::{self, Document, frontmatter::HeaderStatus, plain},
    log,
    utils::date::parse_date,
};
use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Datelike, Utc};
use rayon::prelude::*;
use regex::Regex;
use rss::{
    ChannelBuilder, GuidBuilder, ItemBuilder,
    extension::atom::{AtomExtensionBuilder, Link},
    validation::Validate,
};
use serde::{Serialize, Serializer};
use std::{
    fs,
    path::{Path, PathBuf},
    sync::LazyLock,
};
use url::Url;

const GENERATOR: &str = concat!("vellum ", env!("CARGO_PKG_VERSION"));
const RSS_MIME_TYPE: &str = "application/rss+xml";

// ============================================================================
// Public API
// ============================================================================

/// Build rss feed if enabled in config.
pub fn build_rss(config: &SiteConfig) -> Result<()> {
    if !config.build.rss.enable {
        log!("rss"; "disabled, skipping");
        return Ok(());
    }

    let builder = FeedBuilder::new(config, Utc::now())?;
    let entries = builder.collect_entries()?;
    builder.write(&entries)?;
    Ok(())
}

/// Derived feed entries, newest first, without writing anything.
pub fn query_entries(config: &SiteConfig) -> Result<Vec<FeedEntry>> {
    FeedBuilder::new(config, Utc::now())?.collect_entries()
}

// ============================================================================
// FeedEntry
// ============================================================================

/// One `<item>` of the feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedEntry {
    /// Absolute URL, also used as the permalink guid.
    pub url: String,
    pub title: String,
    /// Plain-text description.
    pub description: String,
    #[serde(serialize_with = "serialize_rfc3339")]
    pub pub_date: DateTime<Utc>,
    /// rss `email (Name)` form.
    pub author: String,
}

fn serialize_rfc3339<S: Serializer>(date: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&date.to_rfc3339())
}

impl FeedEntry {
    fn to_rss_item(&self) -> rss::Item {
        ItemBuilder::default()
            .title(self.title.clone())
            .link(Some(self.url.clone()))
            .guid(
                GuidBuilder::default()
                    .permalink(true)
                    .value(self.url.clone())
                    .build(),
            )
            .description(self.description.clone())
            .pub_date(self.pub_date.to_rfc2822())
            .author(self.author.clone())
            .build()
    }
}

// ============================================================================
// FeedBuilder
// ============================================================================

/// Turns the content directory into a feed for one build.
///
/// `build_time` is captured once so every undated entry and the channel's
/// `lastBuildDate` agree.
pub struct FeedBuilder<'a> {
    config: &'a SiteConfig,
    base_url: Url,
    build_time: DateTime<Utc>,
}

impl<'a> FeedBuilder<'a> {
    pub fn new(config: &'a SiteConfig, build_time: DateTime<Utc>) -> Result<Self> {
        Ok(Self {
            config,
            base_url: config.base_url()?,
            build_time,
        })
    }

    /// Scan the content directory and derive sorted entries.
    pub fn collect_entries(&self) -> Result<Vec<FeedEntry>> {
        let content_dir = &self.config.build.content;
        let paths = content::collect_documents(content_dir)?;

        let documents = paths
            .par_iter()
            .map(|path| Document::read(path, content_dir))
            .collect::<Result<Vec<_>>>()?;

        for doc in documents.iter().filter(|d| d.header == HeaderStatus::Malformed) {
            log!("warn"; "malformed front matter in {}, using defaults", doc.relative.display());
        }

        let mut entries = documents
            .iter()
            .map(|doc| self.entry(doc))
            .collect::<Result<Vec<_>>>()?
            .into_iter()
            .flatten()
            .collect::<Vec<_>>();
        sort_newest_first(&mut entries);

        log!(
            "rss";
            "{} documents, {} drafts skipped",
            documents.len(),
            documents.len() - entries.len()
        );
        Ok(entries)
    }

    /// Derive the entry for one document. Drafts give `None`.
    pub fn entry(&self, doc: &Document) -> Result<Option<FeedEntry>> {
        let meta = &doc.meta;
        if meta.draft {
            return Ok(None);
        }

        let route = doc.route();
        let url = self.resolve(&route)?;

        let title = non_blank(meta.title.as_deref()).unwrap_or(route);
        let description = non_blank(meta.description.as_deref()).unwrap_or_else(|| {
            plain::summarize(&doc.body, self.config.build.rss.description_max_len)
        });
        let pub_date = meta
            .date
            .as_deref()
            .and_then(parse_date)
            .unwrap_or_else(|| self.undated_fallback(doc));
        let author = normalize_rss_author(meta.author.as_deref(), self.config);

        Ok(Some(FeedEntry {
            url: url.into(),
            title,
            description,
            pub_date,
            author,
        }))
    }

    fn undated_fallback(&self, doc: &Document) -> DateTime<Utc> {
        match self.config.build.rss.undated {
            UndatedPolicy::BuildTime => self.build_time,
            UndatedPolicy::Modified => doc.modified.map_or(self.build_time, DateTime::from),
        }
    }

    /// Resolve a `/`-separated route against the base URL, one encoded
    /// segment at a time so `#` and `?` in file names stay in the path.
    fn resolve(&self, route: &str) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("[base.url] `{}` cannot be a base", self.base_url))?
            .pop_if_empty()
            .extend(route.split('/').filter(|s| !s.is_empty()));
        Ok(url)
    }

    /// Generate rss xml string
    pub fn to_xml(&self, entries: &[FeedEntry]) -> Result<String> {
        let config = self.config;
        let base = &config.base;
        let feed_url = self.resolve(&path_to_route(&config.build.rss.path))?;

        let mut self_link = Link::default();
        self_link.set_href(feed_url.as_str());
        self_link.set_rel("self");
        self_link.set_mime_type(Some(RSS_MIME_TYPE.to_string()));

        let mut author_link = Link::default();
        author_link.set_href(base.author_link());
        author_link.set_rel("author");
        author_link.set_title(Some(base.author.clone()));

        let atom = AtomExtensionBuilder::default()
            .links(vec![self_link, author_link])
            .build();

        let channel = ChannelBuilder::default()
            .title(&base.title)
            .link(self.base_url.as_str())
            .description(&base.description)
            .language(base.language.clone())
            .copyright(base.copyright_for(self.build_time.year()))
            .managing_editor(normalize_rss_author(None, config))
            .last_build_date(self.build_time.to_rfc2822())
            .generator(GENERATOR.to_string())
            .atom_ext(atom)
            .items(entries.iter().map(FeedEntry::to_rss_item).collect::<Vec<_>>())
            .build();

        channel
            .validate()
            .map_err(|e| anyhow!("rss validation failed: {e}"))?;
        Ok(channel.to_string())
    }

    /// Write rss feed to file, replacing any previous one.
    pub fn write(&self, entries: &[FeedEntry]) -> Result<PathBuf> {
        let xml = self.to_xml(entries)?;
        let rss_path = self.config.feed_path();

        if let Some(parent) = rss_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        fs::write(&rss_path, xml)
            .with_context(|| format!("failed to write {}", rss_path.display()))?;

        log!(
            "rss";
            "{} ({} entries)",
            rss_path.file_name().unwrap_or_default().to_string_lossy(),
            entries.len()
        );
        Ok(rss_path)
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Descending by publish date; equal dates keep scan order.
fn sort_newest_first(entries: &mut [FeedEntry]) {
    entries.sort_by(|a, b| b.pub_date.cmp(&a.pub_date));
}

/// Front-matter text that is present and not just whitespace.
fn non_blank(value: Option<&str>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty()).map(str::to_owned)
}

fn path_to_route(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Normalize author field to rss format: "email@example.com (Name)"
///
/// Priority:
/// 1. Post author if already in valid format
/// 2. Site config author if in valid format
/// 3. Combine site config email and author
fn normalize_rss_author(author: Option<&str>, config: &SiteConfig) -> String {
    static RE_VALID_AUTHOR: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}[ \t]*\([^)]+\)$").unwrap()
    });

    if let Some(author) = author
        && RE_VALID_AUTHOR.is_match(author)
    {
        return author.to_owned();
    }

    let site_author = &config.base.author;
    if RE_VALID_AUTHOR.is_match(site_author) {
        return site_author.clone();
    }

    format!("{} ({})", config.base.email, site_author)
}
