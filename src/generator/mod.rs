//! Build outputs derived from the content directory.

pub mod rss;
