//! JSON formatter: structured output for tooling integration.
//!
//! Serializes borrowed view structs rather than the model itself, so the
//! resolved reference lists computed for the other formats are part of the
//! output.

use crate::doccomment::DocComment;
use crate::formatter::{dot, references, referenced_by, syntax, GrammarDocsFormatter, GraphOptions, Link};
use crate::grammar::PackageDecl;
use crate::model::{GrammarDoc, RuleDoc, RuleDocMap};
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFormatter {
    graph: GraphOptions,
}

impl JsonFormatter {
    pub fn new(graph: GraphOptions) -> Self {
        Self { graph }
    }
}

#[derive(Serialize)]
struct GrammarView<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    description: &'a str,
    used_grammars: &'a [String],
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    hidden_tokens: &'a [String],
    generates: Vec<PackageView<'a>>,
    imports: Vec<PackageView<'a>>,
    rules: Vec<RuleView<'a>>,
}

#[derive(Serialize)]
struct PackageView<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    uri: &'a str,
}

#[derive(Serialize)]
struct RuleView<'a> {
    name: &'a str,
    kind: &'static str,
    fragment: bool,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    annotations: &'a [String],
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    parameters: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    returns: Option<&'a str>,
    #[serde(skip_serializing_if = "str::is_empty")]
    description: &'a str,
    /// `None` when the rule has no definition
    definition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    deprecated: Option<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    examples: Vec<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    see: Vec<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tags: Vec<TagView<'a>>,
    references: Vec<ReferenceView>,
    referenced_by: Vec<&'a str>,
}

#[derive(Serialize)]
struct TagView<'a> {
    name: &'a str,
    value: &'a str,
}

#[derive(Serialize)]
struct ReferenceView {
    name: String,
    resolved: bool,
}

fn rule_view<'a>(rule_doc: &'a RuleDoc<'_>, mapping: &RuleDocMap<'a, '_>) -> RuleView<'a> {
    let rule = rule_doc.rule();
    let comment: &'a DocComment = rule_doc.head_comment();
    RuleView {
        name: &rule.name,
        kind: match rule_doc {
            RuleDoc::Parser(_) => "parser",
            RuleDoc::Terminal(_) => "terminal",
            RuleDoc::Enum(_) => "enum",
        },
        fragment: rule.kind.is_fragment(),
        annotations: &rule.annotations,
        parameters: &rule.parameters,
        returns: rule.return_type.as_deref(),
        description: comment.text(),
        definition: syntax::render_rule(rule_doc).ok(),
        deprecated: comment.deprecated(),
        examples: comment.examples(),
        see: comment.see_also(),
        tags: comment
            .other_tags()
            .map(|tag| TagView {
                name: &tag.name,
                value: &tag.value,
            })
            .collect(),
        references: references(rule_doc, mapping)
            .iter()
            .map(|link| ReferenceView {
                name: link.name(),
                resolved: matches!(link, Link::Resolved(_)),
            })
            .collect(),
        referenced_by: referenced_by(rule_doc, mapping).iter().map(|doc| doc.name()).collect(),
    }
}

fn package_views(decls: &[PackageDecl]) -> Vec<PackageView<'_>> {
    decls
        .iter()
        .map(|decl| PackageView {
            name: decl.name.as_deref(),
            uri: &decl.uri,
        })
        .collect()
}

fn to_json<T: Serialize>(value: &T) -> String {
    match serde_json::to_string_pretty(value) {
        Ok(mut json) => {
            json.push('\n');
            json
        }
        // Views hold only strings, bools and sequences, which always serialize.
        Err(err) => format!("{{\"error\": {:?}}}\n", err.to_string()),
    }
}

impl GrammarDocsFormatter for JsonFormatter {
    fn format_grammar(&self, grammar_doc: &GrammarDoc<'_>) -> String {
        let mapping = grammar_doc.mapping();
        let view = GrammarView {
            name: grammar_doc.name(),
            description: grammar_doc.head_comment().text(),
            used_grammars: grammar_doc.used_grammars(),
            hidden_tokens: grammar_doc.hidden_tokens(),
            generates: package_views(grammar_doc.generates()),
            imports: package_views(grammar_doc.imports()),
            rules: grammar_doc
                .rules()
                .iter()
                .map(|rule_doc| rule_view(rule_doc, &mapping))
                .collect(),
        };
        to_json(&view)
    }

    fn format_graph(&self, grammar_doc: &GrammarDoc<'_>) -> String {
        dot::render_graph(grammar_doc, self.graph)
    }

    fn format_rule(&self, rule_doc: &RuleDoc<'_>, mapping: &RuleDocMap<'_, '_>) -> String {
        to_json(&rule_view(rule_doc, mapping))
    }

    fn output_file_extension(&self) -> &str {
        "json"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formatter::test_support::sample;
    use serde_json::Value;

    #[test]
    fn grammar_is_valid_json() {
        let g = sample();
        let doc = GrammarDoc::new(&g).unwrap();
        let out = JsonFormatter::default().format_grammar(&doc);
        let value: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["name"], "test.Sample");
        assert_eq!(value["rules"].as_array().unwrap().len(), g.rules().len());
        assert_eq!(value["rules"][0]["description"], "Rule A");
        assert_eq!(value["rules"][0]["definition"], "A:\n    'x' B;");
    }

    #[test]
    fn references_carry_resolution() {
        let g = sample();
        let doc = GrammarDoc::new(&g).unwrap();
        let mut mapping = doc.mapping();
        mapping.remove(&g.find_rule("B").unwrap().id());
        let a = &doc.rules()[0];
        let value: Value = serde_json::from_str(&JsonFormatter::default().format_rule(a, &mapping)).unwrap();
        assert_eq!(value["references"][0]["name"], "B");
        assert_eq!(value["references"][0]["resolved"], false);
    }

    #[test]
    fn missing_definition_is_null() {
        let g = sample();
        let doc = GrammarDoc::new(&g).unwrap();
        let broken = doc.rules().iter().find(|r| r.name() == "Broken").unwrap();
        let value: Value =
            serde_json::from_str(&JsonFormatter::default().format_rule(broken, &doc.mapping())).unwrap();
        assert!(value["definition"].is_null());
        assert_eq!(value["kind"], "parser");
    }

    #[test]
    fn annotations_and_hidden_tokens() {
        let g = crate::grammar::parse("grammar t.G hidden(WS, ML_COMMENT)\n/** Doc. */\n@Override\n@Final\nterminal ID: 'a'..'z'+;").unwrap();
        let doc = GrammarDoc::new(&g).unwrap();
        let value: Value = serde_json::from_str(&JsonFormatter::default().format_grammar(&doc)).unwrap();
        assert_eq!(value["hidden_tokens"], serde_json::json!(["WS", "ML_COMMENT"]));
        assert_eq!(value["rules"][0]["annotations"], serde_json::json!(["Override", "Final"]));

        let sample_grammar = sample();
        let sample_doc = GrammarDoc::new(&sample_grammar).unwrap();
        let plain: Value = serde_json::from_str(&JsonFormatter::default().format_grammar(&sample_doc)).unwrap();
        assert!(plain.get("hidden_tokens").is_none());
        assert!(plain["rules"][0].get("annotations").is_none());
    }

    #[test]
    fn enum_metadata() {
        let g = sample();
        let doc = GrammarDoc::new(&g).unwrap();
        let color = doc.rules().iter().find(|r| r.name() == "Color").unwrap();
        let value: Value =
            serde_json::from_str(&JsonFormatter::default().format_rule(color, &doc.mapping())).unwrap();
        assert_eq!(value["kind"], "enum");
        assert_eq!(value["deprecated"], "use plain strings");
    }
}
