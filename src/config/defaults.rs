//! Default values for configuration fields.
//!
//! These functions are used by serde for default deserialization. Together they
//! are the blog's built-in settings when no `vellum.toml` exists.

// ============================================================================
// Common Defaults
// ============================================================================

pub fn r#true() -> bool {
    true
}

// ============================================================================
// [base] Section Defaults
// ============================================================================

pub mod base {
    pub fn title() -> String {
        "Blog".into()
    }

    pub fn description() -> String {
        "A blog about web development, programming, and what I learn.".into()
    }

    pub fn url() -> String {
        "https://example.com".into()
    }

    pub fn author() -> String {
        "<YOUR_NAME>".into()
    }

    pub fn email() -> String {
        "user@noreply.vellum".into()
    }

    pub fn language() -> String {
        "en-US".into()
    }
}

// ============================================================================
// [build] Section Defaults
// ============================================================================

pub mod build {
    use std::path::PathBuf;

    pub fn root() -> Option<PathBuf> {
        None
    }

    pub fn content() -> PathBuf {
        "docs/blogs".into()
    }

    pub fn output() -> PathBuf {
        "docs/.vitepress/dist".into()
    }

    pub mod rss {
        use super::super::super::UndatedPolicy;
        use std::path::PathBuf;

        pub fn path() -> PathBuf {
            "rss.xml".into()
        }

        pub fn description_max_len() -> usize {
            280
        }

        pub fn undated() -> UndatedPolicy {
            UndatedPolicy::default()
        }
    }
}
