//! Front matter parsing from markdown files.
//!
//! A front-matter block is YAML between two lines of exactly `---` at the
//! very top of the file. Fields are loosely typed in practice (unquoted
//! dates, numbers as categories, a scalar where a list was meant), so every
//! field is read as a raw YAML value first and coerced afterwards.

use crate::{
    log,
    utils::{category::CategoryField, date::DateValue},
};
use serde::Deserialize;
use serde_yaml::Value;
use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
};
use thiserror::Error;

/// Front-matter delimiter line
const DELIMITER: &str = "---";
const BOM: char = '\u{feff}';

#[derive(Debug, Error)]
pub enum FrontMatterError {
    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO error when reading `{0}`")]
    Io(PathBuf, #[source] std::io::Error),
}

/// Normalized-on-read front matter of a post.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrontMatter {
    pub title: Option<String>,
    pub date: Option<DateValue>,
    pub category: Option<CategoryField>,
    /// Hand-written excerpt, preferred over everything else
    pub excerpt: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawFrontMatter {
    title: Option<Value>,
    date: Option<Value>,
    category: Option<Value>,
    excerpt: Option<Value>,
    description: Option<Value>,
}

impl FrontMatter {
    /// Parse the YAML text of a front-matter block (without delimiters).
    pub fn parse(yaml: &str) -> Result<Self, FrontMatterError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let raw: RawFrontMatter = serde_yaml::from_str(yaml)?;
        Ok(raw.into())
    }
}

impl From<RawFrontMatter> for FrontMatter {
    fn from(raw: RawFrontMatter) -> Self {
        Self {
            title: raw.title.as_ref().and_then(scalar_to_string),
            date: raw.date.as_ref().and_then(date_value),
            category: raw.category.as_ref().and_then(category_field),
            excerpt: raw.excerpt.as_ref().and_then(non_empty_string),
            description: raw.description.as_ref().and_then(non_empty_string),
        }
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Tagged(tagged) => scalar_to_string(&tagged.value),
        Value::Null | Value::Sequence(_) | Value::Mapping(_) => None,
    }
}

fn non_empty_string(value: &Value) -> Option<String> {
    scalar_to_string(value).filter(|s| !s.is_empty())
}

fn date_value(value: &Value) -> Option<DateValue> {
    match value {
        Value::String(s) => Some(DateValue::Text(s.clone())),
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .map(DateValue::Millis),
        Value::Tagged(tagged) => date_value(&tagged.value),
        _ => None,
    }
}

fn category_field(value: &Value) -> Option<CategoryField> {
    match value {
        Value::Sequence(items) => Some(CategoryField::Many(
            items.iter().filter_map(scalar_to_string).collect(),
        )),
        Value::Tagged(tagged) => category_field(&tagged.value),
        other => scalar_to_string(other).map(CategoryField::One),
    }
}

// ============================================================================
// Block Splitting
// ============================================================================

#[inline]
fn is_delimiter(line: &str) -> bool {
    line.trim_end_matches(['\r', '\n']) == DELIMITER
}

/// Split a document into its front-matter YAML and its body.
///
/// Returns `(None, text)` when the document has no complete block.
pub fn split_front_matter(text: &str) -> (Option<&str>, &str) {
    let content = text.strip_prefix(BOM).unwrap_or(text);
    let mut lines = content.split_inclusive('\n');

    let start = match lines.next() {
        Some(first) if is_delimiter(first) => first.len(),
        _ => return (None, text),
    };

    let mut offset = start;
    for line in lines {
        if is_delimiter(line) {
            return (Some(&content[start..offset]), &content[offset + line.len()..]);
        }
        offset += line.len();
    }

    (None, text)
}

/// Read only the front-matter block of a file, leaving the body unread.
///
/// Returns `Ok(None)` for files without a complete block. Invalid UTF-8 is
/// replaced rather than treated as an error.
pub fn read_front_matter(path: &Path) -> Result<Option<String>, FrontMatterError> {
    let io_err = |err| FrontMatterError::Io(path.to_path_buf(), err);
    let file = File::open(path).map_err(io_err)?;
    let mut lines = BufReader::new(file).split(b'\n');

    match lines.next().transpose().map_err(io_err)? {
        Some(first) if is_delimiter(String::from_utf8_lossy(&first).trim_start_matches(BOM)) => {}
        _ => return Ok(None),
    }

    let mut yaml = Vec::new();
    for line in lines {
        let line = line.map_err(io_err)?;
        let line = line.strip_suffix(b"\r").unwrap_or(&line[..]);
        if line == DELIMITER.as_bytes() {
            return Ok(Some(decode_lossy(yaml, path)));
        }
        yaml.extend_from_slice(line);
        yaml.push(b'\n');
    }

    Ok(None)
}

/// Decode file bytes as UTF-8, replacing invalid sequences with U+FFFD.
pub fn decode_lossy(bytes: Vec<u8>, path: &Path) -> String {
    String::from_utf8(bytes).unwrap_or_else(|err| {
        log!("warn"; "{}: invalid UTF-8, bad bytes replaced", path.display());
        String::from_utf8_lossy(err.as_bytes()).into_owned()
    })
}
