//! HTML formatter: standalone HTML page with semantic markup.

use crate::formatter::{dot, references, referenced_by, syntax, GrammarDocsFormatter, GraphOptions, Link};
use crate::model::{GrammarDoc, RuleDoc, RuleDocMap};
use crate::toc::github_slug;

#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlFormatter {
    graph: GraphOptions,
}

impl HtmlFormatter {
    pub fn new(graph: GraphOptions) -> Self {
        Self { graph }
    }
}

impl GrammarDocsFormatter for HtmlFormatter {
    fn format_grammar(&self, grammar_doc: &GrammarDoc<'_>) -> String {
        let mut out = String::new();

        out.push_str("<!DOCTYPE html>\n<html>\n<head>\n");
        out.push_str("<meta charset=\"utf-8\">\n");
        out.push_str(&format!("<title>{}</title>\n", html_escape(grammar_doc.name())));
        out.push_str("<style>\n");
        out.push_str("body { font-family: system-ui, sans-serif; max-width: 48em; margin: 2em auto; padding: 0 1em; }\n");
        out.push_str("code { background: #f4f4f4; padding: 0.15em 0.3em; border-radius: 3px; }\n");
        out.push_str("pre { background: #f4f4f4; padding: 1em; border-radius: 5px; overflow-x: auto; }\n");
        out.push_str(".tag { display: inline-block; font-size: 0.75em; padding: 0.1em 0.4em; border-radius: 3px; margin-left: 0.5em; background: #ddd; }\n");
        out.push_str(".tag-deprecated { background: #c0392b; color: white; }\n");
        out.push_str(".unresolved { color: #888; font-style: italic; }\n");
        out.push_str(".missing { color: #c0392b; }\n");
        out.push_str("</style>\n");
        out.push_str("</head>\n<body>\n");

        out.push_str(&format!("<h1>{}</h1>\n", html_escape(grammar_doc.simple_name())));
        let comment = grammar_doc.head_comment();
        if !comment.text().is_empty() {
            out.push_str(&paragraphs(comment.text()));
        }

        out.push_str("<dl>\n");
        out.push_str(&format!("  <dt>Grammar</dt><dd><code>{}</code></dd>\n", html_escape(grammar_doc.name())));
        for used in grammar_doc.used_grammars() {
            out.push_str(&format!("  <dt>Uses</dt><dd><code>{}</code></dd>\n", html_escape(used)));
        }
        if !grammar_doc.hidden_tokens().is_empty() {
            let hidden: Vec<String> = grammar_doc
                .hidden_tokens()
                .iter()
                .map(|t| format!("<code>{}</code>", html_escape(t)))
                .collect();
            out.push_str(&format!("  <dt>Hidden</dt><dd>{}</dd>\n", hidden.join(", ")));
        }
        for decl in grammar_doc.generates() {
            out.push_str(&format!("  <dt>Generates</dt><dd><code>{}</code></dd>\n", html_escape(&decl.uri)));
        }
        for decl in grammar_doc.imports() {
            out.push_str(&format!("  <dt>Imports</dt><dd><code>{}</code></dd>\n", html_escape(&decl.uri)));
        }
        out.push_str("</dl>\n");

        // Index
        if !grammar_doc.rules().is_empty() {
            out.push_str("<h2>Index</h2>\n<ul>\n");
            for rule_doc in grammar_doc.rules() {
                out.push_str(&format!("  <li>{}</li>\n", anchor_link(rule_doc.name())));
            }
            out.push_str("</ul>\n");
        }

        let mapping = grammar_doc.mapping();
        for rule_doc in grammar_doc.rules() {
            out.push_str(&self.format_rule(rule_doc, &mapping));
        }

        out.push_str("</body>\n</html>\n");
        out
    }

    fn format_graph(&self, grammar_doc: &GrammarDoc<'_>) -> String {
        dot::render_graph(grammar_doc, self.graph)
    }

    fn format_rule(&self, rule_doc: &RuleDoc<'_>, mapping: &RuleDocMap<'_, '_>) -> String {
        let mut out = String::new();
        let rule = rule_doc.rule();
        let comment = rule_doc.head_comment();

        out.push_str(&format!(
            "<h3 id=\"{}\">{}",
            html_escape(&github_slug(rule_doc.name())),
            html_escape(rule_doc.name())
        ));
        out.push_str(&format!(" <span class=\"tag\">{}</span>", rule.kind.label()));
        if rule.kind.is_fragment() {
            out.push_str(" <span class=\"tag\">fragment</span>");
        }
        for annotation in &rule.annotations {
            out.push_str(&format!(" <span class=\"tag\">@{}</span>", html_escape(annotation)));
        }
        if comment.deprecated().is_some() {
            out.push_str(" <span class=\"tag tag-deprecated\">deprecated</span>");
        }
        out.push_str("</h3>\n");

        if let Some(reason) = comment.deprecated() {
            if !reason.is_empty() {
                out.push_str(&format!("<p><strong>Deprecated:</strong> {}</p>\n", html_escape(reason)));
            }
        }

        if !comment.text().is_empty() {
            out.push_str(&paragraphs(comment.text()));
        }

        match syntax::render_rule(rule_doc) {
            Ok(definition) => out.push_str(&format!(
                "<pre><code class=\"language-xtext\">{}</code></pre>\n",
                html_escape(&definition)
            )),
            Err(missing) => out.push_str(&format!(
                "<p class=\"missing\">Definition unavailable: {}</p>\n",
                html_escape(&missing.to_string())
            )),
        }

        let examples = comment.examples();
        if !examples.is_empty() {
            out.push_str("<h4>Example</h4>\n");
            for example in examples {
                out.push_str(&format!("<pre><code>{}</code></pre>\n", html_escape(example)));
            }
        }

        let refs = references(rule_doc, mapping);
        if !refs.is_empty() {
            out.push_str("<h4>References</h4>\n<ul>\n");
            for link in &refs {
                let item = match link {
                    Link::Resolved(doc) => anchor_link(doc.name()),
                    Link::Unresolved(call) => format!(
                        "<span class=\"unresolved\">{} (unresolved)</span>",
                        html_escape(&call.qualified_name())
                    ),
                };
                out.push_str(&format!("  <li>{}</li>\n", item));
            }
            out.push_str("</ul>\n");
        }

        let callers = referenced_by(rule_doc, mapping);
        if !callers.is_empty() {
            out.push_str("<h4>Referenced by</h4>\n<ul>\n");
            for caller in callers {
                out.push_str(&format!("  <li>{}</li>\n", anchor_link(caller.name())));
            }
            out.push_str("</ul>\n");
        }

        let see_also = comment.see_also();
        if !see_also.is_empty() {
            out.push_str("<h4>See also</h4>\n<ul>\n");
            for see in see_also {
                let item = if mapping.values().any(|doc| doc.name() == see) {
                    anchor_link(see)
                } else {
                    html_escape(see)
                };
                out.push_str(&format!("  <li>{}</li>\n", item));
            }
            out.push_str("</ul>\n");
        }

        let others: Vec<_> = comment.other_tags().collect();
        if !others.is_empty() {
            out.push_str("<dl>\n");
            for tag in others {
                out.push_str(&format!(
                    "  <dt>@{}</dt><dd>{}</dd>\n",
                    html_escape(&tag.name),
                    html_escape(&tag.value)
                ));
            }
            out.push_str("</dl>\n");
        }

        out
    }

    fn output_file_extension(&self) -> &str {
        "html"
    }
}

fn anchor_link(name: &str) -> String {
    format!(
        "<a href=\"#{}\"><code>{}</code></a>",
        html_escape(&github_slug(name)),
        html_escape(name)
    )
}

/// One `<p>` per blank-line separated paragraph.
fn paragraphs(text: &str) -> String {
    text.split("\n\n")
        .map(|p| format!("<p>{}</p>\n", html_escape(p.trim())))
        .collect()
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
