//! Front-matter extraction.
//!
//! Supports YAML-style (`---`) and TOML (`+++`) blocks at the very start of a
//! document. Parsing never fails: a missing or malformed block yields an empty
//! [`FrontMatter`] and the caller only learns about it through [`HeaderStatus`].
//!
//! ```text
//! ---
//! title: "Hello"
//! date: 2024-01-01
//! draft: false
//! ---
//! # Body starts here
//! ```

use toml::{Table, Value};

const YAML_DELIMITER: &str = "---";
const YAML_END_DELIMITER: &str = "...";
const TOML_DELIMITER: &str = "+++";

/// Metadata keys the feed cares about. Every other key is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrontMatter {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
    pub author: Option<String>,
    pub draft: bool,
}

/// What was found at the top of the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderStatus {
    /// No front-matter block.
    Missing,
    /// Block found and parsed.
    Parsed,
    /// Block found but unusable; metadata is empty.
    Malformed,
}

/// Front matter and the remaining body of a document.
#[derive(Debug)]
pub struct Extracted<'a> {
    pub meta: FrontMatter,
    pub body: &'a str,
    pub status: HeaderStatus,
}

/// Split `content` into front matter and body.
pub fn extract(content: &str) -> Extracted<'_> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);

    let (block, body, is_toml) = match split_block(content) {
        Block::None => return Extracted::new(FrontMatter::default(), content, HeaderStatus::Missing),
        Block::Unclosed => {
            return Extracted::new(FrontMatter::default(), content, HeaderStatus::Malformed);
        }
        Block::Closed { block, body, is_toml } => (block, body, is_toml),
    };

    let meta = if is_toml { parse_toml(block) } else { parse_yaml_like(block) };
    match meta {
        Some(meta) => Extracted::new(meta, body, HeaderStatus::Parsed),
        None => Extracted::new(FrontMatter::default(), body, HeaderStatus::Malformed),
    }
}

impl<'a> Extracted<'a> {
    const fn new(meta: FrontMatter, body: &'a str, status: HeaderStatus) -> Self {
        Self { meta, body, status }
    }
}

// ============================================================================
// Block detection
// ============================================================================

enum Block<'a> {
    None,
    Unclosed,
    Closed {
        block: &'a str,
        body: &'a str,
        is_toml: bool,
    },
}

/// Locate a delimited block whose opening line is the first line of `content`.
fn split_block(content: &str) -> Block<'_> {
    let mut lines = content.split_inclusive('\n');
    let Some(first) = lines.next() else {
        return Block::None;
    };

    let is_toml = match first.trim_end() {
        YAML_DELIMITER => false,
        TOML_DELIMITER => true,
        _ => return Block::None,
    };

    let block_start = first.len();
    let mut offset = block_start;
    for line in lines {
        let trimmed = line.trim_end();
        let closes = if is_toml {
            trimmed == TOML_DELIMITER
        } else {
            trimmed == YAML_DELIMITER || trimmed == YAML_END_DELIMITER
        };
        if closes {
            return Block::Closed {
                block: &content[block_start..offset],
                body: &content[offset + line.len()..],
                is_toml,
            };
        }
        offset += line.len();
    }

    Block::Unclosed
}

// ============================================================================
// YAML-style parsing
// ============================================================================

/// Parse flat `key: value` front matter.
///
/// Indented lines and list items belong to the previous key and are skipped,
/// except under a `|` or `>` block scalar where they form the value.
/// Keys other than the ones in [`FrontMatter`] are ignored, whatever their
/// spelling. Returns `None` when a top-level line has no `key:` part or a
/// quote is left open.
fn parse_yaml_like(block: &str) -> Option<FrontMatter> {
    let mut meta = FrontMatter::default();
    let mut lines = block.lines().peekable();

    while let Some(line) = lines.next() {
        if line.trim().is_empty() || line.trim_start().starts_with('#') {
            continue;
        }
        if line.starts_with([' ', '\t']) || line.starts_with("- ") || line == "-" {
            continue;
        }

        let (key, raw) = split_key(line)?;
        let raw = raw.trim();
        let value = match BlockScalar::from_indicator(raw) {
            Some(style) => {
                let mut folded = Vec::new();
                while let Some(next) = lines.peek() {
                    if !next.trim().is_empty() && !next.starts_with([' ', '\t']) {
                        break;
                    }
                    folded.push(next.trim());
                    lines.next();
                }
                Some(style.join(&folded))
            }
            None => parse_yaml_scalar(raw)?,
        };

        match key.to_ascii_lowercase().as_str() {
            "title" => meta.title = value,
            "description" => meta.description = value,
            "date" => meta.date = value,
            "author" => meta.author = value,
            "draft" => meta.draft = value.as_deref().is_some_and(is_truthy),
            _ => {}
        }
    }

    Some(meta)
}

/// Split a top-level line into its key and the raw value after `:`.
///
/// Quoted keys (`"draft": true`, `'last updated': ...`) are unquoted and may
/// contain `:` themselves.
fn split_key(line: &str) -> Option<(&str, &str)> {
    if let Some(quote @ ('"' | '\'')) = line.chars().next() {
        let inner = &line[1..];
        let end = inner.find(quote)?;
        let raw = inner[end + 1..].trim_start().strip_prefix(':')?;
        return Some((&inner[..end], raw));
    }

    let (key, raw) = line.split_once(':')?;
    let key = key.trim();
    (!key.is_empty()).then_some((key, raw))
}

#[derive(Clone, Copy)]
enum BlockScalar {
    Literal,
    Folded,
}

impl BlockScalar {
    fn from_indicator(raw: &str) -> Option<Self> {
        match raw.trim_end_matches(['-', '+']) {
            "|" => Some(Self::Literal),
            ">" => Some(Self::Folded),
            _ => None,
        }
    }

    fn join(self, lines: &[&str]) -> String {
        let sep = match self {
            Self::Literal => "\n",
            Self::Folded => " ",
        };
        lines.join(sep).trim().to_owned()
    }
}

/// Parse a single-line scalar.
///
/// `Some(None)` is an explicit null or empty value, `None` is a syntax error
/// (an unterminated quote).
fn parse_yaml_scalar(raw: &str) -> Option<Option<String>> {
    let quoted = |quote: char| -> Option<Option<String>> {
        let inner = raw.strip_prefix(quote)?;
        let end = inner.rfind(quote)?;
        let rest = inner[end + 1..].trim();
        if !rest.is_empty() && !rest.starts_with('#') {
            return None;
        }
        let inner = &inner[..end];
        let value = if quote == '"' {
            inner.replace("\\\"", "\"").replace("\\\\", "\\")
        } else {
            inner.replace("''", "'")
        };
        Some(Some(value))
    };

    match raw.chars().next() {
        Some(q @ ('"' | '\'')) => quoted(q),
        _ => {
            // ` #` starts a trailing comment on plain scalars
            let value = raw.split(" #").next().unwrap_or_default().trim();
            match value {
                "" | "~" | "null" | "Null" | "NULL" => Some(None),
                _ => Some(Some(value.to_owned())),
            }
        }
    }
}

/// YAML 1.1 style truthiness for the `draft` flag.
fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "yes" | "on" | "1"
    )
}

// ============================================================================
// TOML parsing
// ============================================================================

fn parse_toml(block: &str) -> Option<FrontMatter> {
    let table: Table = toml::from_str(block).ok()?;

    let text = |key: &str| -> Option<String> {
        match table.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Datetime(dt) => Some(dt.to_string()),
            Value::Integer(n) => Some(n.to_string()),
            Value::Float(n) => Some(n.to_string()),
            _ => None,
        }
    };

    let draft = match table.get("draft") {
        Some(Value::Boolean(b)) => *b,
        Some(Value::String(s)) => is_truthy(s),
        Some(Value::Integer(n)) => *n != 0,
        _ => false,
    };

    Some(FrontMatter {
        title: text("title"),
        description: text("description"),
        date: text("date"),
        author: text("author"),
        draft,
    })
}
