//! Plain-text formatter, for terminals and pagers.

use crate::formatter::{dot, references, referenced_by, syntax, GrammarDocsFormatter, GraphOptions, Link};
use crate::model::{GrammarDoc, RuleDoc, RuleDocMap};

#[derive(Debug, Clone, Copy, Default)]
pub struct TextFormatter {
    graph: GraphOptions,
}

impl TextFormatter {
    pub fn new(graph: GraphOptions) -> Self {
        Self { graph }
    }
}

impl GrammarDocsFormatter for TextFormatter {
    fn format_grammar(&self, grammar_doc: &GrammarDoc<'_>) -> String {
        let mut lines: Vec<String> = Vec::new();

        lines.extend(underline(&format!("Grammar {}", grammar_doc.name()), '='));
        lines.push(String::new());

        let comment = grammar_doc.head_comment();
        if !comment.text().is_empty() {
            lines.push(comment.text().to_string());
            lines.push(String::new());
        }
        if !grammar_doc.used_grammars().is_empty() {
            lines.push(format!("Uses: {}", grammar_doc.used_grammars().join(", ")));
            lines.push(String::new());
        }
        if !grammar_doc.hidden_tokens().is_empty() {
            lines.push(format!("Hidden: {}", grammar_doc.hidden_tokens().join(", ")));
            lines.push(String::new());
        }

        let mapping = grammar_doc.mapping();
        for rule_doc in grammar_doc.rules() {
            lines.push(self.format_rule(rule_doc, &mapping));
        }

        let mut out = lines.join("\n");
        if !out.ends_with('\n') {
            out.push('\n');
        }
        out
    }

    fn format_graph(&self, grammar_doc: &GrammarDoc<'_>) -> String {
        dot::render_graph(grammar_doc, self.graph)
    }

    fn format_rule(&self, rule_doc: &RuleDoc<'_>, mapping: &RuleDocMap<'_, '_>) -> String {
        let mut lines: Vec<String> = Vec::new();
        let rule = rule_doc.rule();
        let comment = rule_doc.head_comment();

        let mut title = format!("{} ({}", rule_doc.name(), rule.kind.label());
        if rule.kind.is_fragment() {
            title.push_str(", fragment");
        }
        for annotation in &rule.annotations {
            title.push_str(&format!(", @{}", annotation));
        }
        title.push(')');
        lines.extend(underline(&title, '-'));

        if let Some(reason) = comment.deprecated() {
            if reason.is_empty() {
                lines.push("DEPRECATED".to_string());
            } else {
                lines.push(format!("DEPRECATED: {}", reason));
            }
        }
        if !comment.text().is_empty() {
            lines.push(comment.text().to_string());
        }
        lines.push(String::new());

        match syntax::render_rule(rule_doc) {
            Ok(definition) => lines.extend(definition.lines().map(|l| format!("  {}", l))),
            Err(missing) => lines.push(format!("  [definition unavailable: {}]", missing)),
        }
        lines.push(String::new());

        for example in comment.examples() {
            lines.push("Example:".to_string());
            lines.extend(example.lines().map(|l| format!("  {}", l)));
            lines.push(String::new());
        }

        let refs: Vec<String> = references(rule_doc, mapping)
            .iter()
            .map(|link| match link {
                Link::Resolved(doc) => doc.name().to_string(),
                Link::Unresolved(call) => format!("{} [unresolved]", call.qualified_name()),
            })
            .collect();
        if !refs.is_empty() {
            lines.push(format!("References: {}", refs.join(", ")));
        }

        let callers: Vec<&str> = referenced_by(rule_doc, mapping).iter().map(|doc| doc.name()).collect();
        if !callers.is_empty() {
            lines.push(format!("Referenced by: {}", callers.join(", ")));
        }

        let see_also = comment.see_also();
        if !see_also.is_empty() {
            lines.push(format!("See also: {}", see_also.join(", ")));
        }

        for tag in comment.other_tags() {
            lines.push(format!("@{}: {}", tag.name, tag.value));
        }

        lines.push(String::new());
        lines.join("\n")
    }

    fn output_file_extension(&self) -> &str {
        "txt"
    }
}

fn underline(title: &str, ch: char) -> [String; 2] {
    [title.to_string(), ch.to_string().repeat(title.chars().count())]
}
