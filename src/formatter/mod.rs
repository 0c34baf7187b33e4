//! Output formats behind one trait, selected by name.

pub mod dot;
pub mod html;
pub mod json;
pub mod markdown;
pub mod syntax;
pub mod text;

use crate::grammar::RuleRef;
use crate::model::{GrammarDoc, RuleDoc, RuleDocMap};
use anyhow::{anyhow, Result};

pub use dot::GraphOptions;

/// Turns the documentation model into one output representation.
///
/// Implementations are stateless apart from their configuration, so the same
/// formatter may be used for any number of grammars in any order.
pub trait GrammarDocsFormatter {
    /// Full grammar documentation, including every contained rule.
    fn format_grammar(&self, grammar_doc: &GrammarDoc<'_>) -> String;

    /// DOT description of the rule dependency graph.
    fn format_graph(&self, grammar_doc: &GrammarDoc<'_>) -> String;

    /// Documentation of a single rule. `mapping` resolves the rules it
    /// references and the rules referencing it.
    fn format_rule(&self, rule_doc: &RuleDoc<'_>, mapping: &RuleDocMap<'_, '_>) -> String;

    /// Extension of the files holding [`format_grammar`](Self::format_grammar)
    /// output, without the leading dot.
    fn output_file_extension(&self) -> &str;
}

/// Create a formatter for the given format name.
pub fn create_formatter(format: &str, graph: GraphOptions) -> Result<Box<dyn GrammarDocsFormatter>> {
    match format {
        "markdown" | "md" => Ok(Box::new(markdown::MarkdownFormatter::new(graph))),
        "html" => Ok(Box::new(html::HtmlFormatter::new(graph))),
        "text" | "txt" => Ok(Box::new(text::TextFormatter::new(graph))),
        "json" => Ok(Box::new(json::JsonFormatter::new(graph))),
        "dot" | "graphviz" => Ok(Box::new(dot::DotFormatter::new(graph))),
        _ => Err(anyhow!(
            "unknown format: {}. Use markdown, html, text, json, or dot",
            format
        )),
    }
}

/// A rule reference as seen from the documentation of the calling rule.
#[derive(Debug, Clone, Copy)]
pub enum Link<'a, 'g> {
    /// Documented in the current mapping
    Resolved(&'a RuleDoc<'g>),
    /// Imported, qualified, or otherwise absent from the mapping
    Unresolved(&'g RuleRef),
}

impl Link<'_, '_> {
    pub fn name(&self) -> String {
        match self {
            Link::Resolved(doc) => doc.name().to_string(),
            Link::Unresolved(call) => call.qualified_name(),
        }
    }
}

/// Distinct rules called from `rule_doc`, in order of first occurrence.
pub fn references<'a, 'g>(rule_doc: &RuleDoc<'g>, mapping: &RuleDocMap<'a, 'g>) -> Vec<Link<'a, 'g>> {
    let Some(definition) = rule_doc.definition() else {
        return Vec::new();
    };
    let mut seen: Vec<String> = Vec::new();
    let mut links = Vec::new();
    for call in definition.rule_calls() {
        let key = call.qualified_name();
        if seen.contains(&key) {
            continue;
        }
        seen.push(key);
        let resolved = call.target.and_then(|id| mapping.get(&id).copied());
        links.push(match resolved {
            Some(doc) => Link::Resolved(doc),
            None => Link::Unresolved(call),
        });
    }
    links
}

/// Rules in `mapping` whose definitions call `rule_doc`, in declaration order.
pub fn referenced_by<'a, 'g>(rule_doc: &RuleDoc<'g>, mapping: &RuleDocMap<'a, 'g>) -> Vec<&'a RuleDoc<'g>> {
    let target = rule_doc.id();
    let mut callers: Vec<&'a RuleDoc<'g>> = mapping
        .values()
        .copied()
        .filter(|doc| {
            doc.definition()
                .is_some_and(|def| def.rule_calls().iter().any(|call| call.target == Some(target)))
        })
        .collect();
    callers.sort_by_key(|doc| doc.id());
    callers
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::grammar::{self, Grammar};

    pub const SAMPLE: &str = r#"
/** Sample grammar for tests. */
grammar test.Sample with org.eclipse.xtext.common.Terminals

/**
 * Rule A
 * @see B
 */
A: 'x' B;

/** Rule B */
B: 'y';

/** Self reference. */
Rec: 'x' Rec?;

Twice: B ',' B;

Ext: name=ID;

Broken: ;

terminal DIGIT: '0'..'9';

/**
 * Colors.
 * @deprecated use plain strings
 */
enum Color: red='red' | green;
"#;

    pub fn sample() -> Grammar {
        grammar::parse(SAMPLE).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::sample;
    use super::*;

    #[test]
    fn create_known_formats() {
        for (name, ext) in [
            ("markdown", "md"),
            ("md", "md"),
            ("html", "html"),
            ("text", "txt"),
            ("json", "json"),
            ("dot", "dot"),
        ] {
            let formatter = create_formatter(name, GraphOptions::default()).unwrap();
            assert_eq!(formatter.output_file_extension(), ext);
        }
    }

    #[test]
    fn create_unknown_format() {
        let err = create_formatter("pdf", GraphOptions::default()).err().unwrap();
        assert!(err.to_string().contains("unknown format: pdf"));
    }

    #[test]
    fn references_are_distinct_and_ordered() {
        let g = sample();
        let doc = GrammarDoc::new(&g).unwrap();
        let mapping = doc.mapping();
        let twice = doc.rules().iter().find(|r| r.name() == "Twice").unwrap();
        let names: Vec<_> = references(twice, &mapping).iter().map(Link::name).collect();
        assert_eq!(names, vec!["B"]);
    }

    #[test]
    fn references_outside_mapping_are_unresolved() {
        let g = sample();
        let doc = GrammarDoc::new(&g).unwrap();
        let mut mapping = doc.mapping();
        let ext = doc.rules().iter().find(|r| r.name() == "Ext").unwrap();
        assert!(matches!(references(ext, &mapping)[0], Link::Unresolved(_)));

        let a = &doc.rules()[0];
        mapping.remove(&g.find_rule("B").unwrap().id());
        assert!(matches!(references(a, &mapping)[0], Link::Unresolved(_)));
    }

    #[test]
    fn referenced_by_in_declaration_order() {
        let g = sample();
        let doc = GrammarDoc::new(&g).unwrap();
        let mapping = doc.mapping();
        let b = doc.rules().iter().find(|r| r.name() == "B").unwrap();
        let names: Vec<_> = referenced_by(b, &mapping).iter().map(|d| d.name()).collect();
        assert_eq!(names, vec!["A", "Twice"]);

        let rec = doc.rules().iter().find(|r| r.name() == "Rec").unwrap();
        let names: Vec<_> = referenced_by(rec, &mapping).iter().map(|d| d.name()).collect();
        assert_eq!(names, vec!["Rec"]);
    }
}
