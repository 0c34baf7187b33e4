//! DOT/Graphviz rendering of the rule dependency graph.
//!
//! Every documented rule becomes one node. Every rule call met while walking
//! a rule's definition in pre-order becomes one edge, so a rule calling `B`
//! twice yields two `-> "B"` edges and `A: 'x' A?;` yields a single self
//! edge (the cardinality belongs to the one call). Calls to rules that are not
//! documented in the grammar still produce edges, named as written.

use crate::formatter::GrammarDocsFormatter;
use crate::model::{GrammarDoc, RuleDoc, RuleDocMap};

/// Graph rendering switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GraphOptions {
    /// Emit each `(from, to)` pair once instead of once per rule call.
    pub collapse_duplicate_edges: bool,
}

/// Render the dependency graph of `grammar_doc`.
pub fn render_graph(grammar_doc: &GrammarDoc<'_>, options: GraphOptions) -> String {
    let mut out = String::new();

    out.push_str(&format!("digraph {} {{\n", quote(grammar_doc.name())));
    out.push_str("  rankdir=LR;\n");
    out.push_str("  node [shape=box];\n\n");

    for rule_doc in grammar_doc.rules() {
        out.push_str(&render_node(rule_doc));
    }

    out.push('\n');

    let mut emitted: Vec<(&str, String)> = Vec::new();
    for rule_doc in grammar_doc.rules() {
        for target in edge_targets(rule_doc) {
            if options.collapse_duplicate_edges {
                let key = (rule_doc.name(), target.clone());
                if emitted.contains(&key) {
                    continue;
                }
                emitted.push(key);
            }
            out.push_str(&render_edge(rule_doc.name(), &target));
        }
    }

    out.push_str("}\n");
    out
}

/// Names of the rules called from `rule_doc`, one entry per call.
pub fn edge_targets(rule_doc: &RuleDoc<'_>) -> Vec<String> {
    rule_doc
        .definition()
        .map(|definition| {
            definition
                .rule_calls()
                .into_iter()
                .map(|call| call.qualified_name())
                .collect()
        })
        .unwrap_or_default()
}

fn render_node(rule_doc: &RuleDoc<'_>) -> String {
    let name = quote(rule_doc.name());
    let mut attrs = vec![format!("label={}", name)];
    match rule_doc {
        RuleDoc::Parser(doc) => {
            if doc.is_fragment() {
                attrs.push("style=dashed".to_string());
            }
        }
        RuleDoc::Terminal(doc) => {
            attrs.push("shape=ellipse".to_string());
            if doc.is_fragment() {
                attrs.push("style=dashed".to_string());
            }
        }
        RuleDoc::Enum(_) => attrs.push("shape=hexagon".to_string()),
    }
    format!("  {} [{}];\n", name, attrs.join(", "))
}

fn render_edge(from: &str, to: &str) -> String {
    format!("  {} -> {};\n", quote(from), quote(to))
}

/// DOT double-quoted identifier.
fn quote(id: &str) -> String {
    format!("\"{}\"", id.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Formatter whose only output is the dependency graph.
#[derive(Debug, Clone, Copy, Default)]
pub struct DotFormatter {
    graph: GraphOptions,
}

impl DotFormatter {
    pub fn new(graph: GraphOptions) -> Self {
        Self { graph }
    }
}

impl GrammarDocsFormatter for DotFormatter {
    fn format_grammar(&self, grammar_doc: &GrammarDoc<'_>) -> String {
        render_graph(grammar_doc, self.graph)
    }

    fn format_graph(&self, grammar_doc: &GrammarDoc<'_>) -> String {
        render_graph(grammar_doc, self.graph)
    }

    /// The rule's node and its outgoing edges, as a DOT fragment.
    fn format_rule(&self, rule_doc: &RuleDoc<'_>, _mapping: &RuleDocMap<'_, '_>) -> String {
        let mut out = render_node(rule_doc);
        let mut emitted: Vec<String> = Vec::new();
        for target in edge_targets(rule_doc) {
            if self.graph.collapse_duplicate_edges {
                if emitted.contains(&target) {
                    continue;
                }
                emitted.push(target.clone());
            }
            out.push_str(&render_edge(rule_doc.name(), &target));
        }
        out
    }

    fn output_file_extension(&self) -> &str {
        "dot"
    }
}
