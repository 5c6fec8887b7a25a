//! Frontmatter splitting for Quill articles.
//!
//! Articles carry a YAML frontmatter block delimited by `---` lines at the
//! very start of the file. [`split`] separates that block from the body and
//! parses it into a [`Frontmatter`] with lenient field coercion:
//!
//! - numeric fields written as quoted strings are coerced to integers
//!   (`seriesOrder: "2"` → `2`)
//! - list fields accept both YAML flow sequences and a single bracketed
//!   string (`"[aws, storage]"` → `["aws", "storage"]`)
//! - unrecognized keys are preserved as strings in [`Frontmatter::extra`]
//!
//! Splitting never fails: a missing block, an unclosed delimiter, or
//! malformed YAML all degrade to empty metadata with the full original text
//! as the body.

use std::collections::BTreeMap;

use serde_yaml::Value;

/// Metadata extracted from an article's frontmatter block.
///
/// All fields are optional. When a field is `None` (or empty for `tags`),
/// the frontmatter did not set it; defaults are the caller's concern.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Frontmatter {
    /// Article title.
    pub title: Option<String>,
    /// Publication date, as written (ISO-8601 expected, not validated here).
    pub date: Option<String>,
    /// Short excerpt for listings and feeds.
    pub excerpt: Option<String>,
    /// Ordered tag list.
    pub tags: Vec<String>,
    /// Series name, when the article belongs to a series.
    pub series: Option<String>,
    /// Position within the series.
    pub series_order: Option<i64>,
    /// Unrecognized keys, stringified.
    pub extra: BTreeMap<String, String>,
}

impl Frontmatter {
    /// Check if no field was set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.date.is_none()
            && self.excerpt.is_none()
            && self.tags.is_empty()
            && self.series.is_none()
            && self.series_order.is_none()
            && self.extra.is_empty()
    }
}

/// Split raw article text into frontmatter and body.
///
/// The frontmatter block must start on the first line (`---`) and end at the
/// next line consisting of `---`. Anything that deviates from that shape —
/// no opening delimiter, no closing delimiter, YAML that fails to parse —
/// yields empty metadata and the entire input as the body.
#[must_use]
pub fn split(text: &str) -> (Frontmatter, &str) {
    let Some((block, body)) = extract_block(text) else {
        return (Frontmatter::default(), text);
    };

    match serde_yaml::from_str::<Value>(block) {
        Ok(Value::Mapping(mapping)) => (parse_mapping(&mapping), body),
        // Scalar or null frontmatter carries no usable fields.
        Ok(_) => (Frontmatter::default(), body),
        Err(_) => (Frontmatter::default(), text),
    }
}

/// Locate the frontmatter block and the body following it.
///
/// Returns `(block, body)` or `None` when the input has no well-formed
/// delimiter pair.
fn extract_block(text: &str) -> Option<(&str, &str)> {
    let rest = text.strip_prefix("---")?;
    let rest = rest.strip_prefix('\n').or_else(|| rest.strip_prefix("\r\n"))?;

    // Closing delimiter: a line that is exactly `---` (ignoring trailing CR).
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end_matches(['\r', '\n']) == "---" {
            let block = &rest[..offset];
            let mut body = &rest[offset + line.len()..];
            if let Some(stripped) = body.strip_prefix('\n') {
                body = stripped;
            }
            return Some((block, body));
        }
        offset += line.len();
    }
    None
}

/// Extract known fields from the parsed mapping, coercing values as needed.
fn parse_mapping(mapping: &serde_yaml::Mapping) -> Frontmatter {
    let mut fm = Frontmatter::default();

    for (key, value) in mapping {
        let Value::String(key) = key else { continue };
        match key.as_str() {
            "title" => fm.title = string_value(value),
            "date" => fm.date = string_value(value),
            "excerpt" => fm.excerpt = string_value(value),
            "tags" => fm.tags = list_value(value),
            "series" => fm.series = string_value(value),
            "seriesOrder" => fm.series_order = int_value(value),
            _ => {
                if let Some(s) = stringify(value) {
                    fm.extra.insert(key.clone(), s);
                }
            }
        }
    }

    fm
}

/// Coerce a scalar YAML value to a string.
fn string_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Coerce a YAML value to an integer, accepting numeric strings.
fn int_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Coerce a YAML value to a string list.
///
/// Sequences take each element's scalar form. A single string is treated as
/// a bracketed comma-separated list when wrapped in `[...]`, otherwise as a
/// one-element list. Elements are trimmed and stripped of wrapping quotes.
fn list_value(value: &Value) -> Vec<String> {
    match value {
        Value::Sequence(seq) => seq.iter().filter_map(string_value).collect(),
        Value::String(s) => {
            let inner = s
                .trim()
                .strip_prefix('[')
                .and_then(|rest| rest.strip_suffix(']'))
                .unwrap_or(s.trim());
            inner
                .split(',')
                .map(strip_quotes)
                .filter(|item| !item.is_empty())
                .map(str::to_owned)
                .collect()
        }
        _ => Vec::new(),
    }
}

/// Trim an element and remove one layer of matching quotes.
fn strip_quotes(item: &str) -> &str {
    let item = item.trim();
    item.strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .or_else(|| {
            item.strip_prefix('\'')
                .and_then(|rest| rest.strip_suffix('\''))
        })
        .unwrap_or(item)
}

/// Stringify an arbitrary YAML value for the `extra` map.
fn stringify(value: &Value) -> Option<String> {
    string_value(value).or_else(|| {
        serde_yaml::to_string(value)
            .ok()
            .map(|s| s.trim_end().to_owned())
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_split_basic() {
        let text = "---\ntitle: S3 Basics\ndate: 2024-01-10\n---\n\n# Body\n";
        let (fm, body) = split(text);
        assert_eq!(fm.title, Some("S3 Basics".to_owned()));
        assert_eq!(fm.date, Some("2024-01-10".to_owned()));
        assert_eq!(body, "# Body\n");
    }

    #[test]
    fn test_split_no_frontmatter() {
        let text = "# Just a document\n\nNo metadata here.\n";
        let (fm, body) = split(text);
        assert!(fm.is_empty());
        assert_eq!(body, text);
    }

    #[test]
    fn test_split_unclosed_delimiter_falls_back() {
        let text = "---\ntitle: Broken\n\nNo closing fence.\n";
        let (fm, body) = split(text);
        assert!(fm.is_empty());
        assert_eq!(body, text);
    }

    #[test]
    fn test_split_malformed_yaml_falls_back() {
        let text = "---\ntitle: [unterminated\n---\nBody\n";
        let (fm, body) = split(text);
        assert!(fm.is_empty());
        assert_eq!(body, text);
    }

    #[test]
    fn test_split_empty_block() {
        let text = "---\n---\nBody\n";
        let (fm, body) = split(text);
        assert!(fm.is_empty());
        assert_eq!(body, "Body\n");
    }

    #[test]
    fn test_split_crlf_delimiters() {
        let text = "---\r\ntitle: Windows\r\n---\r\nBody\r\n";
        let (fm, body) = split(text);
        assert_eq!(fm.title, Some("Windows".to_owned()));
        assert_eq!(body, "Body\r\n");
    }

    #[test]
    fn test_tags_flow_sequence() {
        let (fm, _) = split("---\ntags: [aws, storage]\n---\n");
        assert_eq!(fm.tags, vec!["aws".to_owned(), "storage".to_owned()]);
    }

    #[test]
    fn test_tags_block_sequence() {
        let (fm, _) = split("---\ntags:\n  - aws\n  - storage\n---\n");
        assert_eq!(fm.tags, vec!["aws".to_owned(), "storage".to_owned()]);
    }

    #[test]
    fn test_tags_bracketed_string() {
        let (fm, _) = split("---\ntags: \"[aws, 'storage', \\\"s3\\\"]\"\n---\n");
        assert_eq!(
            fm.tags,
            vec!["aws".to_owned(), "storage".to_owned(), "s3".to_owned()]
        );
    }

    #[test]
    fn test_tags_plain_string_is_single_element() {
        let (fm, _) = split("---\ntags: aws\n---\n");
        assert_eq!(fm.tags, vec!["aws".to_owned()]);
    }

    #[test]
    fn test_series_order_number() {
        let (fm, _) = split("---\nseries: Kafka\nseriesOrder: 3\n---\n");
        assert_eq!(fm.series, Some("Kafka".to_owned()));
        assert_eq!(fm.series_order, Some(3));
    }

    #[test]
    fn test_series_order_numeric_string_coerced() {
        let (fm, _) = split("---\nseriesOrder: \"2\"\n---\n");
        assert_eq!(fm.series_order, Some(2));
    }

    #[test]
    fn test_series_order_garbage_ignored() {
        let (fm, _) = split("---\nseriesOrder: soon\n---\n");
        assert_eq!(fm.series_order, None);
    }

    #[test]
    fn test_quoted_title() {
        let (fm, _) = split("---\ntitle: \"Quoted: with colon\"\n---\n");
        assert_eq!(fm.title, Some("Quoted: with colon".to_owned()));
    }

    #[test]
    fn test_numeric_title_coerced_to_string() {
        let (fm, _) = split("---\ntitle: 2024\n---\n");
        assert_eq!(fm.title, Some("2024".to_owned()));
    }

    #[test]
    fn test_unknown_keys_preserved_as_strings() {
        let (fm, _) = split("---\ndraft: true\nlayout: wide\nweight: 10\n---\n");
        assert_eq!(fm.extra.get("draft"), Some(&"true".to_owned()));
        assert_eq!(fm.extra.get("layout"), Some(&"wide".to_owned()));
        assert_eq!(fm.extra.get("weight"), Some(&"10".to_owned()));
    }

    #[test]
    fn test_date_with_time_kept_verbatim() {
        let (fm, _) = split("---\ndate: \"2024-01-10T09:30:00+09:00\"\n---\n");
        assert_eq!(fm.date, Some("2024-01-10T09:30:00+09:00".to_owned()));
    }

    #[test]
    fn test_body_preserves_later_delimiters() {
        let text = "---\ntitle: T\n---\nIntro\n\n---\n\nOutro\n";
        let (fm, body) = split(text);
        assert_eq!(fm.title, Some("T".to_owned()));
        assert_eq!(body, "Intro\n\n---\n\nOutro\n");
    }
}
