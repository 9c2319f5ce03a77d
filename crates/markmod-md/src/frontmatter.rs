//! Frontmatter extraction and parsing.

use serde_json::{Map, Value};

/// A markdown document split into its frontmatter and body.
#[derive(Debug, Clone, PartialEq)]
pub struct Document<'a> {
    /// Frontmatter mapping in source order. Empty when the document has none.
    pub attributes: Map<String, Value>,

    /// Markdown content after the frontmatter block
    pub body: &'a str,
}

/// Split a markdown source into frontmatter attributes and body.
///
/// The block must open on the very first line (an optional byte order mark
/// is skipped) with `---` and close with a line holding `---` or `...`.
/// A source without an opening fence has empty attributes and the whole
/// source as body.
pub fn extract_frontmatter(source: &str) -> Result<Document<'_>, FrontmatterError> {
    let text = source.strip_prefix('\u{feff}').unwrap_or(source);

    let Some((first, mut rest)) = split_line(text) else {
        return Ok(Document {
            attributes: Map::new(),
            body: source,
        });
    };
    if first.trim_end() != "---" {
        return Ok(Document {
            attributes: Map::new(),
            body: source,
        });
    }

    let yaml_start = rest;
    let mut yaml_len = 0;
    loop {
        let Some((line, next)) = split_line(rest) else {
            return Err(FrontmatterError::Unclosed);
        };
        let fence = line.trim_end();
        if fence == "---" || fence == "..." {
            let yaml = &yaml_start[..yaml_len];
            let attributes = parse_attributes(yaml)?;
            return Ok(Document {
                attributes,
                body: next,
            });
        }
        yaml_len += rest.len() - next.len();
        rest = next;
    }
}

/// Split off the first line, returning it without its terminator.
fn split_line(text: &str) -> Option<(&str, &str)> {
    if text.is_empty() {
        return None;
    }
    match text.find('\n') {
        Some(pos) => {
            let line = &text[..pos];
            Some((line.strip_suffix('\r').unwrap_or(line), &text[pos + 1..]))
        }
        None => Some((text, "")),
    }
}

fn parse_attributes(yaml: &str) -> Result<Map<String, Value>, FrontmatterError> {
    if yaml.trim().is_empty() {
        return Ok(Map::new());
    }

    let value: Value =
        serde_yaml::from_str(yaml).map_err(|e| FrontmatterError::InvalidYaml(e.to_string()))?;

    match value {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Map::new()),
        other => Err(FrontmatterError::NotAMapping(kind_of(&other))),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "mapping",
    }
}

/// Errors that can occur when parsing frontmatter.
#[derive(Debug, thiserror::Error)]
pub enum FrontmatterError {
    #[error("Unclosed frontmatter block - missing closing ---")]
    Unclosed,

    #[error("Invalid YAML in frontmatter: {0}")]
    InvalidYaml(String),

    #[error("Frontmatter must be a mapping, found a {0}")]
    NotAMapping(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn extracts_valid_frontmatter() {
        let source = r#"---
title: Button
description: A clickable button component
order: 1
---

# Button Component
"#;

        let doc = extract_frontmatter(source).unwrap();

        assert_eq!(doc.attributes["title"], "Button");
        assert_eq!(
            doc.attributes["description"],
            "A clickable button component"
        );
        assert_eq!(doc.attributes["order"], 1);
        assert_eq!(doc.body, "\n# Button Component\n");
    }

    #[test]
    fn preserves_key_order() {
        let source = "---\nzeta: 1\nalpha: 2\nmid: [a, b]\n---\nbody";

        let doc = extract_frontmatter(source).unwrap();
        let keys: Vec<&str> = doc.attributes.keys().map(String::as_str).collect();

        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
        assert_eq!(
            serde_json::to_string(&doc.attributes).unwrap(),
            r#"{"zeta":1,"alpha":2,"mid":["a","b"]}"#
        );
    }

    #[test]
    fn handles_no_frontmatter() {
        let source = "# Just Markdown\n\nNo frontmatter here.";

        let doc = extract_frontmatter(source).unwrap();

        assert!(doc.attributes.is_empty());
        assert_eq!(doc.body, source);
    }

    #[test]
    fn fence_must_open_the_document() {
        let source = "\n---\ntitle: Late\n---\n";

        let doc = extract_frontmatter(source).unwrap();

        assert!(doc.attributes.is_empty());
        assert_eq!(doc.body, source);
    }

    #[test]
    fn accepts_dots_closing_fence_and_bom() {
        let source = "\u{feff}---\r\ntitle: Dots\r\n...\r\nText";

        let doc = extract_frontmatter(source).unwrap();

        assert_eq!(doc.attributes["title"], "Dots");
        assert_eq!(doc.body, "Text");
    }

    #[test]
    fn empty_block_has_no_attributes() {
        let doc = extract_frontmatter("---\n---\nbody").unwrap();

        assert!(doc.attributes.is_empty());
        assert_eq!(doc.body, "body");
    }

    #[test]
    fn errors_on_unclosed_frontmatter() {
        let source = "---\ntitle: Test\n# No closing";

        let result = extract_frontmatter(source);

        assert!(matches!(result, Err(FrontmatterError::Unclosed)));
    }

    #[test]
    fn errors_on_invalid_yaml() {
        let source = "---\ntitle: [invalid yaml\n---\n";

        let result = extract_frontmatter(source);

        assert!(matches!(result, Err(FrontmatterError::InvalidYaml(_))));
    }

    #[test]
    fn errors_on_scalar_frontmatter() {
        let result = extract_frontmatter("---\njust a string\n---\n");

        assert!(matches!(result, Err(FrontmatterError::NotAMapping("string"))));
    }
}
