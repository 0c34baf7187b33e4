//! GitHub-flavored markdown anchors and links for rule headings.

/// GitHub heading anchor slug.
///
/// Lowercase, keep alphanumerics, spaces and hyphens, then turn spaces into
/// hyphens. Underscores are kept, as GitHub does for headings.
pub fn github_slug(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for c in text.to_lowercase().chars() {
        if c.is_alphanumeric() || c == ' ' || c == '-' || c == '_' {
            slug.push(c);
        }
    }
    slug.replace(' ', "-")
}

/// Markdown link to the heading of a documented rule.
pub fn rule_link(name: &str) -> String {
    format!("[{}](#{})", name, github_slug(name))
}

/// Table-of-contents list item for a rule.
pub fn render_toc_item(name: &str, summary: &str) -> String {
    if summary.is_empty() {
        format!("* {}", rule_link(name))
    } else {
        format!("* {}: {}", rule_link(name), summary)
    }
}

/// Render a `@see` target: URLs and relative paths become links, names of
/// documented rules become anchor links, anything else is kept as written.
pub fn render_see_link(text: &str, is_rule: impl Fn(&str) -> bool) -> String {
    if text.starts_with('/') || text.starts_with("./") || text.starts_with("../") {
        return format!("[{}]({})", text, text);
    }
    if contains_markdown_link(text) {
        return text.to_string();
    }
    if text.contains("://") {
        return wrap_bare_urls(text);
    }
    if is_rule(text) {
        return rule_link(text);
    }
    text.to_string()
}

/// Check if text contains a markdown link `[...](...)`.
fn contains_markdown_link(text: &str) -> bool {
    let mut rest = text;
    while let Some(open) = rest.find('[') {
        let after_open = &rest[open + 1..];
        match after_open.find(']') {
            Some(close) if after_open[close + 1..].starts_with('(') => return true,
            Some(close) => rest = &after_open[close + 1..],
            None => return false,
        }
    }
    false
}

/// Wrap bare URLs in markdown link syntax.
fn wrap_bare_urls(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            if ["http://", "https://", "ftp://"].iter().any(|p| word.starts_with(p)) {
                format!("[{}]({})", word, word)
            } else {
                word.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_simple() {
        assert_eq!(github_slug("Domainmodel"), "domainmodel");
        assert_eq!(github_slug("ML_COMMENT"), "ml_comment");
    }

    #[test]
    fn slug_strips_punctuation() {
        assert_eq!(github_slug("Terminals::ID"), "terminalsid");
        assert_eq!(github_slug("Hello World"), "hello-world");
    }

    #[test]
    fn toc_item_with_summary() {
        assert_eq!(render_toc_item("Entity", "An entity."), "* [Entity](#entity): An entity.");
        assert_eq!(render_toc_item("Entity", ""), "* [Entity](#entity)");
    }

    #[test]
    fn see_links() {
        let is_rule = |name: &str| name == "Feature";
        assert_eq!(render_see_link("Feature", is_rule), "[Feature](#feature)");
        assert_eq!(render_see_link("Unknown", is_rule), "Unknown");
        assert_eq!(render_see_link("./other.md", is_rule), "[./other.md](./other.md)");
        assert_eq!(
            render_see_link("docs at https://example.com/x", is_rule),
            "docs at [https://example.com/x](https://example.com/x)"
        );
        assert_eq!(render_see_link("[docs](https://x.y)", is_rule), "[docs](https://x.y)");
    }
}
