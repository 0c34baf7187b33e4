//! GitHub-flavored markdown formatter.

use crate::formatter::{dot, references, referenced_by, syntax, GrammarDocsFormatter, GraphOptions, Link};
use crate::grammar::PackageDecl;
use crate::model::{GrammarDoc, RuleDoc, RuleDocMap};
use crate::toc;

#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownFormatter {
    graph: GraphOptions,
}

impl MarkdownFormatter {
    pub fn new(graph: GraphOptions) -> Self {
        Self { graph }
    }
}

impl GrammarDocsFormatter for MarkdownFormatter {
    fn format_grammar(&self, grammar_doc: &GrammarDoc<'_>) -> String {
        let mut output = String::new();

        output.push_str(&format!("# {}\n\n", grammar_doc.simple_name()));

        let comment = grammar_doc.head_comment();
        if !comment.text().is_empty() {
            output.push_str(comment.text());
            output.push_str("\n\n");
        }

        // Grammar metadata
        let mut meta: Vec<String> = vec![format!("* **Grammar:** `{}`", grammar_doc.name())];
        if !grammar_doc.used_grammars().is_empty() {
            let used: Vec<String> = grammar_doc.used_grammars().iter().map(|g| format!("`{}`", g)).collect();
            meta.push(format!("* **Uses:** {}", used.join(", ")));
        }
        if !grammar_doc.hidden_tokens().is_empty() {
            let hidden: Vec<String> = grammar_doc.hidden_tokens().iter().map(|t| format!("`{}`", t)).collect();
            meta.push(format!("* **Hidden:** {}", hidden.join(", ")));
        }
        for decl in grammar_doc.generates() {
            meta.push(format!("* **Generates:** {}", render_package(decl)));
        }
        for decl in grammar_doc.imports() {
            meta.push(format!("* **Imports:** {}", render_package(decl)));
        }
        output.push_str(&meta.join("\n"));
        output.push_str("\n\n");

        if !grammar_doc.rules().is_empty() {
            output.push_str("## Index\n\n");
            for rule_doc in grammar_doc.rules() {
                output.push_str(&toc::render_toc_item(rule_doc.name(), rule_doc.head_comment().summary()));
                output.push('\n');
            }
            output.push('\n');

            output.push_str("## Rules\n\n");
            let mapping = grammar_doc.mapping();
            for rule_doc in grammar_doc.rules() {
                output.push_str(&self.format_rule(rule_doc, &mapping));
                output.push('\n');
            }
        }

        output
    }

    fn format_graph(&self, grammar_doc: &GrammarDoc<'_>) -> String {
        dot::render_graph(grammar_doc, self.graph)
    }

    fn format_rule(&self, rule_doc: &RuleDoc<'_>, mapping: &RuleDocMap<'_, '_>) -> String {
        let mut lines: Vec<String> = Vec::new();
        let comment = rule_doc.head_comment();

        lines.push(format!("### {}\n", rule_doc.name()));
        lines.push(render_badges(rule_doc));
        lines.push(String::new());

        if let Some(reason) = comment.deprecated() {
            if reason.is_empty() {
                lines.push("**Deprecated.**".to_string());
            } else {
                lines.push(format!("**Deprecated:** {}", reason));
            }
            lines.push(String::new());
        }

        if !comment.text().is_empty() {
            lines.push(comment.text().to_string());
            lines.push(String::new());
        }

        match syntax::render_rule(rule_doc) {
            Ok(definition) => {
                let fence = fence_for(&definition);
                lines.push(format!("{}xtext", fence));
                lines.push(definition);
                lines.push(fence);
            }
            Err(missing) => lines.push(format!("> **Definition unavailable:** {}", missing)),
        }
        lines.push(String::new());

        let examples = comment.examples();
        if !examples.is_empty() {
            lines.push("#### Example\n".to_string());
            for example in examples {
                let fence = fence_for(example);
                lines.push(fence.clone());
                lines.push(example.to_string());
                lines.push(fence);
            }
            lines.push(String::new());
        }

        let refs = references(rule_doc, mapping);
        if !refs.is_empty() {
            lines.push("#### References\n".to_string());
            for link in &refs {
                lines.push(format!("* {}", render_link(link)));
            }
            lines.push(String::new());
        }

        let callers = referenced_by(rule_doc, mapping);
        if !callers.is_empty() {
            lines.push("#### Referenced by\n".to_string());
            for caller in callers {
                lines.push(format!("* {}", toc::rule_link(caller.name())));
            }
            lines.push(String::new());
        }

        let see_also = comment.see_also();
        if !see_also.is_empty() {
            lines.push("#### See also\n".to_string());
            let is_rule = |name: &str| mapping.values().any(|doc| doc.name() == name);
            for see in see_also {
                lines.push(format!("* {}", toc::render_see_link(see, is_rule)));
            }
            lines.push(String::new());
        }

        let others: Vec<String> = comment
            .other_tags()
            .map(|tag| format!("* **@{}** {}", tag.name, tag.value.replace('\n', "\n  ")))
            .collect();
        if !others.is_empty() {
            lines.push("#### Tags\n".to_string());
            lines.extend(others);
            lines.push(String::new());
        }

        lines.join("\n")
    }

    fn output_file_extension(&self) -> &str {
        "md"
    }
}

/// Kind badges, e.g. `` > `terminal rule` `fragment` ``.
fn render_badges(rule_doc: &RuleDoc<'_>) -> String {
    let kind = rule_doc.rule().kind;
    let mut badges = vec![format!("`{}`", kind.label())];
    if kind.is_fragment() {
        badges.push("`fragment`".to_string());
    }
    for annotation in &rule_doc.rule().annotations {
        badges.push(format!("`@{}`", annotation));
    }
    if let Some(ref ty) = rule_doc.rule().return_type {
        badges.push(format!("`returns {}`", ty));
    }
    if rule_doc.head_comment().deprecated().is_some() {
        badges.push("*`deprecated`*".to_string());
    }
    format!("> {}", badges.join(" "))
}

/// Backtick fence longer than any backtick run inside `text`.
fn fence_for(text: &str) -> String {
    let longest = text.split(|c| c != '`').map(str::len).max().unwrap_or(0);
    "`".repeat(longest.max(2) + 1)
}

fn render_link(link: &Link<'_, '_>) -> String {
    match link {
        Link::Resolved(doc) => toc::rule_link(doc.name()),
        Link::Unresolved(call) => format!("`{}` _(unresolved)_", call.qualified_name()),
    }
}

fn render_package(decl: &PackageDecl) -> String {
    match decl.name {
        Some(ref name) => format!("`{}` (`{}`)", decl.uri, name),
        None => format!("`{}`", decl.uri),
    }
}
