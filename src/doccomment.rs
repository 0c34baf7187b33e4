//! Head comments: the `/** ... */` block written directly before a rule or
//! the grammar declaration.
//!
//! The comment body is free text followed by optional block tags:
//!
//! ```text
//! /**
//!  * An entity with a name and features.
//!  *
//!  * @example
//!  *   entity Person { name: String }
//!  * @see Feature
//!  * @deprecated use Type instead
//!  */
//! ```

use regex::Regex;
use std::sync::LazyLock;

static RE_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^@([A-Za-z][A-Za-z0-9_-]*)(?:\s+(.*))?$").unwrap());

static RE_LINE_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[[:blank:]]*\*(?: |$)?").unwrap());

/// Documentation attached to one rule or grammar. Immutable once built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocComment {
    text: String,
    tags: Vec<DocTag>,
}

/// A `@name value` block tag. Continuation lines are joined with `\n`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocTag {
    pub name: String,
    pub value: String,
}

impl DocComment {
    /// A comment with no text and no tags, for undocumented rules.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Plain text without tags.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into().trim().to_string(),
            tags: Vec::new(),
        }
    }

    /// Parse a raw comment, with or without its `/**` and `*/` delimiters.
    pub fn parse(raw: &str) -> Self {
        let body = raw.trim();
        let body = body.strip_prefix("/**").unwrap_or(body);
        let body = body.strip_suffix("*/").unwrap_or(body).trim();

        let mut text_lines: Vec<&str> = Vec::new();
        let mut tags: Vec<(String, Vec<&str>)> = Vec::new();

        for line in body.lines() {
            let line = strip_line_prefix(line);
            if let Some(caps) = RE_TAG.captures(line.trim_start()) {
                let name = caps[1].to_string();
                let first = caps.get(2).map_or("", |m| m.as_str());
                tags.push((name, vec![first]));
            } else if let Some((_, lines)) = tags.last_mut() {
                lines.push(line);
            } else {
                text_lines.push(line);
            }
        }

        Self {
            text: join_block(&text_lines),
            tags: tags
                .into_iter()
                .map(|(name, lines)| DocTag {
                    value: join_tag_value(&lines),
                    name,
                })
                .collect(),
        }
    }

    /// Free text before the first tag.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn tags(&self) -> &[DocTag] {
        &self.tags
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.tags.is_empty()
    }

    /// First line or sentence of the text, for index listings.
    pub fn summary(&self) -> &str {
        let first_line = self.text.lines().next().unwrap_or("");
        match first_line.find(". ") {
            Some(end) => &first_line[..=end],
            None => first_line,
        }
    }

    /// Values of every tag named `name`, in source order.
    pub fn tag_values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.tags
            .iter()
            .filter(move |t| t.name == name)
            .map(|t| t.value.as_str())
    }

    pub fn examples(&self) -> Vec<&str> {
        self.tag_values("example").collect()
    }

    pub fn see_also(&self) -> Vec<&str> {
        self.tag_values("see").collect()
    }

    /// `Some("")` for a bare `@deprecated`.
    pub fn deprecated(&self) -> Option<&str> {
        self.tag_values("deprecated").next()
    }

    /// Tags other than the ones with dedicated accessors.
    pub fn other_tags(&self) -> impl Iterator<Item = &DocTag> {
        self.tags
            .iter()
            .filter(|t| !matches!(t.name.as_str(), "example" | "see" | "deprecated"))
    }
}

/// Strip the conventional leading ` * ` of a comment line.
fn strip_line_prefix(line: &str) -> &str {
    match RE_LINE_PREFIX.find(line) {
        Some(m) => &line[m.end()..],
        None => line,
    }
}

/// Join lines, dropping leading and trailing blank lines and trailing spaces.
fn join_block(lines: &[&str]) -> String {
    let start = lines.iter().position(|l| !l.trim().is_empty());
    let end = lines.iter().rposition(|l| !l.trim().is_empty());
    match (start, end) {
        (Some(start), Some(end)) => lines[start..=end]
            .iter()
            .map(|l| l.trim_end())
            .collect::<Vec<_>>()
            .join("\n"),
        _ => String::new(),
    }
}

/// Tag value: the inline part plus unindented continuation lines.
fn join_tag_value(lines: &[&str]) -> String {
    let inline = lines[0].trim();
    let rest = unindent(&join_block(&lines[1..]));
    match (inline.is_empty(), rest.is_empty()) {
        (_, true) => inline.to_string(),
        (true, false) => rest,
        (false, false) => format!("{}\n{}", inline, rest),
    }
}

/// Remove common leading indentation from a multi-line string.
fn unindent(text: &str) -> String {
    let min_indent = text
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.len() - l.trim_start_matches(' ').len())
        .min()
        .unwrap_or(0);

    text.lines()
        .map(|l| if l.len() >= min_indent { &l[min_indent..] } else { l.trim_start() })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_line_comment() {
        let doc = DocComment::parse("/** Rule A */");
        assert_eq!(doc.text(), "Rule A");
        assert!(doc.tags().is_empty());
    }

    #[test]
    fn multi_line_text_keeps_paragraphs() {
        let doc = DocComment::parse("/**\n * First line.\n *\n * Second paragraph.\n */");
        assert_eq!(doc.text(), "First line.\n\nSecond paragraph.");
    }

    #[test]
    fn tags_split_from_text() {
        let doc = DocComment::parse(
            "/**\n * An entity.\n * @see Feature\n * @see Type\n * @deprecated use Type\n * @since 2.0\n */",
        );
        assert_eq!(doc.text(), "An entity.");
        assert_eq!(doc.see_also(), vec!["Feature", "Type"]);
        assert_eq!(doc.deprecated(), Some("use Type"));
        let others: Vec<_> = doc.other_tags().map(|t| t.name.as_str()).collect();
        assert_eq!(others, vec!["since"]);
    }

    #[test]
    fn example_block_is_unindented() {
        let doc = DocComment::parse(
            "/**\n * Entity declaration.\n * @example\n *   entity Person {\n *     name: String\n *   }\n */",
        );
        assert_eq!(doc.examples(), vec!["entity Person {\n  name: String\n}"]);
    }

    #[test]
    fn bare_deprecated_tag() {
        let doc = DocComment::parse("/** @deprecated */");
        assert_eq!(doc.deprecated(), Some(""));
        assert_eq!(doc.text(), "");
    }

    #[test]
    fn summary_is_first_sentence() {
        let doc = DocComment::parse("/** Root rule. Contains all types.\n * More. */");
        assert_eq!(doc.summary(), "Root rule.");
    }

    #[test]
    fn empty_comment() {
        assert!(DocComment::parse("/** */").is_empty());
        assert!(DocComment::empty().is_empty());
        assert!(!DocComment::from_text("x").is_empty());
    }
}
