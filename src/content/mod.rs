//! Markdown content discovery and loading.
//!
//! - **frontmatter**: split a document into metadata and body
//! - **plain**: Markdown to plain text for descriptions
//!
//! # Discovery rules
//!
//! | Path | Collected |
//! |------|-----------|
//! | `posts/hello.md` | yes |
//! | `posts/index.md`, `index.md` | no (listing pages) |
//! | `assets/**`, `posts/assets/**` | no |
//! | `.drafts/**`, `.DS_Store` | no (hidden) |
//! | `posts/notes.txt` | no (not Markdown) |
//! | `linked.md -> ../shared/post.md` | yes (symlinks are followed) |

pub mod frontmatter;
pub mod plain;

use anyhow::{Context, Result};
use frontmatter::{FrontMatter, HeaderStatus};
use std::{
    ffi::OsStr,
    fs,
    path::{Path, PathBuf},
    time::SystemTime,
};
use walkdir::{DirEntry, WalkDir};

/// File extensions treated as Markdown.
pub const MARKDOWN_EXTENSIONS: &[&str] = &["md", "markdown"];

/// Directory names whose whole subtree is skipped.
const EXCLUDED_DIRS: &[&str] = &["assets"];

/// Files to ignore during directory traversal
const IGNORED_FILES: &[&str] = &[".DS_Store"];

/// File stem of listing pages that never become feed entries.
const INDEX_STEM: &str = "index";

/// A Markdown document read from the content directory.
#[derive(Debug, Clone)]
pub struct Document {
    /// Path relative to the content root.
    pub relative: PathBuf,
    pub meta: FrontMatter,
    pub header: HeaderStatus,
    /// Text after the front-matter block.
    pub body: String,
    pub modified: Option<SystemTime>,
}

impl Document {
    /// Read and split a document.
    ///
    /// Only I/O problems are errors; bad front matter is reported via `header`.
    pub fn read(path: &Path, content_root: &Path) -> Result<Self> {
        let source = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let modified = fs::metadata(path).and_then(|m| m.modified()).ok();
        let relative = path.strip_prefix(content_root).unwrap_or(path).to_path_buf();

        Ok(Self::from_source(relative, &source, modified))
    }

    pub fn from_source(relative: PathBuf, source: &str, modified: Option<SystemTime>) -> Self {
        let extracted = frontmatter::extract(source);
        Self {
            relative,
            meta: extracted.meta,
            header: extracted.status,
            body: extracted.body.to_owned(),
            modified,
        }
    }

    /// Relative path with the Markdown extension swapped for `.html`,
    /// always `/`-separated.
    pub fn route(&self) -> String {
        let html = self.relative.with_extension("html");
        html.components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }
}

/// Collect every feed-eligible Markdown file under `dir`, sorted by path.
///
/// Symlinks are followed, so linked posts and directories are collected under
/// their link path. Traversal errors (unreadable directories, a missing root,
/// symlink loops) are returned.
pub fn collect_documents(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let walker = WalkDir::new(dir)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_skipped_entry(e));

    for entry in walker {
        let entry = entry.with_context(|| format!("failed to scan {}", dir.display()))?;
        if entry.file_type().is_file() && is_feed_document(entry.path()) {
            files.push(entry.into_path());
        }
    }

    Ok(files)
}

/// Hidden entries, ignored files and excluded directories.
fn is_skipped_entry(entry: &DirEntry) -> bool {
    let name = entry.file_name().to_str().unwrap_or_default();
    if name.starts_with('.') || IGNORED_FILES.contains(&name) {
        return true;
    }
    entry.file_type().is_dir() && EXCLUDED_DIRS.contains(&name)
}

fn is_feed_document(path: &Path) -> bool {
    let is_markdown = path
        .extension()
        .and_then(OsStr::to_str)
        .is_some_and(|ext| MARKDOWN_EXTENSIONS.iter().any(|md| ext.eq_ignore_ascii_case(md)));
    let is_index = path.file_stem().is_some_and(|stem| stem == INDEX_STEM);

    is_markdown && !is_index
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn relative(files: &[PathBuf], root: &Path) -> Vec<String> {
        files
            .iter()
            .map(|p| p.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
            .collect()
    }

    #[test]
    fn test_collect_documents_rules() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(root, "index.md", "# Home");
        write(root, "hello.md", "hi");
        write(root, "posts/index.md", "# Posts");
        write(root, "posts/second.markdown", "x");
        write(root, "posts/deep/third.md", "x");
        write(root, "posts/notes.txt", "x");
        write(root, "assets/readme.md", "x");
        write(root, "posts/assets/embedded.md", "x");
        write(root, ".drafts/secret.md", "x");
        write(root, ".DS_Store", "");

        let files = collect_documents(root).unwrap();
        assert_eq!(
            relative(&files, root),
            vec!["hello.md", "posts/deep/third.md", "posts/second.markdown"]
        );
    }

    #[test]
    fn test_collect_documents_empty_dir() {
        let dir = TempDir::new().unwrap();
        assert!(collect_documents(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn test_collect_documents_missing_dir() {
        let dir = TempDir::new().unwrap();
        assert!(collect_documents(&dir.path().join("missing")).is_err());
    }

    #[test]
    fn test_collect_uppercase_extension() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "Loud.MD", "x");
        assert_eq!(collect_documents(dir.path()).unwrap().len(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_collect_follows_symlinks() {
        use std::os::unix::fs::symlink;

        let shared = TempDir::new().unwrap();
        write(shared.path(), "post.md", "x");
        write(shared.path(), "series/part1.md", "x");

        let dir = TempDir::new().unwrap();
        let root = dir.path();
        symlink(shared.path().join("post.md"), root.join("linked.md")).unwrap();
        symlink(shared.path().join("series"), root.join("series")).unwrap();

        let files = collect_documents(root).unwrap();
        assert_eq!(relative(&files, root), vec!["linked.md", "series/part1.md"]);

        let doc = Document::read(&files[0], root).unwrap();
        assert_eq!(doc.route(), "linked.html");
    }

    #[test]
    fn test_document_read() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "posts/hello.md", "---\ntitle: Hello\n---\nBody text");

        let doc = Document::read(&dir.path().join("posts/hello.md"), dir.path()).unwrap();
        assert_eq!(doc.relative, PathBuf::from("posts/hello.md"));
        assert_eq!(doc.meta.title.as_deref(), Some("Hello"));
        assert_eq!(doc.header, HeaderStatus::Parsed);
        assert_eq!(doc.body, "Body text");
        assert!(doc.modified.is_some());
    }

    #[test]
    fn test_document_read_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = Document::read(&dir.path().join("gone.md"), dir.path()).unwrap_err();
        assert!(format!("{err:#}").contains("gone.md"));
    }

    #[test]
    fn test_document_route() {
        let doc = Document::from_source(PathBuf::from("posts/2024/hello world.md"), "", None);
        assert_eq!(doc.route(), "posts/2024/hello world.html");

        let doc = Document::from_source(PathBuf::from("notes.markdown"), "", None);
        assert_eq!(doc.route(), "notes.html");
    }
}
