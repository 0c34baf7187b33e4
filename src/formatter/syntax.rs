//! Render rule definitions back to grammar syntax.

use crate::grammar::{Cardinality, Element, ElementKind, Predicate};
use crate::model::RuleDoc;
use thiserror::Error;

/// The rule was declared with an empty body, so there is nothing to show.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("rule `{rule}` has no definition")]
pub struct MissingDefinition {
    pub rule: String,
}

/// Position of an element relative to its parent, deciding parentheses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Context {
    Top,
    Group,
    Alternatives,
    UnorderedGroup,
    /// Terminal of an assignment, or operand of `!` / `->`
    Operand,
}

/// Full declaration of the rule, e.g. `Type:\n    DataType\n    | Entity;`.
pub fn render_rule(rule_doc: &RuleDoc<'_>) -> Result<String, MissingDefinition> {
    let rule = rule_doc.rule();
    let definition = rule_doc.definition().ok_or_else(|| MissingDefinition {
        rule: rule.name.clone(),
    })?;

    let mut header = match rule_doc {
        RuleDoc::Parser(doc) => {
            let mut h = String::new();
            if doc.is_fragment() {
                h.push_str("fragment ");
            }
            h.push_str(&rule.name);
            if !rule.parameters.is_empty() {
                h.push_str(&format!("<{}>", rule.parameters.join(", ")));
            }
            h
        }
        RuleDoc::Terminal(doc) => {
            let fragment = if doc.is_fragment() { "fragment " } else { "" };
            format!("terminal {}{}", fragment, rule.name)
        }
        RuleDoc::Enum(_) => format!("enum {}", rule.name),
    };
    if let Some(ref ty) = rule.return_type {
        header.push_str(&format!(" returns {}", ty));
    }
    if matches!(rule_doc, RuleDoc::Parser(_)) && !rule.hidden_tokens.is_empty() {
        header.push_str(&format!(" hidden({})", rule.hidden_tokens.join(", ")));
    }

    let body = match &definition.kind {
        ElementKind::Alternatives(items)
            if definition.cardinality == Cardinality::One && definition.predicate.is_none() =>
        {
            items
                .iter()
                .map(|item| render(item, Context::Alternatives))
                .collect::<Vec<_>>()
                .join("\n    | ")
        }
        _ => render(definition, Context::Top),
    };

    Ok(format!("{}:\n    {};", header, body))
}

fn render(element: &Element, context: Context) -> String {
    let core = match &element.kind {
        ElementKind::Keyword(text) => quote(text),
        ElementKind::RuleCall(call) => match call.arguments {
            Some(ref arguments) => format!("{}<{}>", call.qualified_name(), arguments),
            None => call.qualified_name(),
        },
        ElementKind::Assignment {
            feature,
            operator,
            terminal,
        } => format!("{}{}{}", feature, operator.as_str(), render(terminal, Context::Operand)),
        ElementKind::CrossReference { type_name, terminal } => match terminal {
            Some(terminal) => format!("[{}|{}]", type_name, render(terminal, Context::Operand)),
            None => format!("[{}]", type_name),
        },
        ElementKind::Action { type_name, feature } => match feature {
            Some((name, op)) => format!("{{{}.{}{}current}}", type_name, name, op.as_str()),
            None => format!("{{{}}}", type_name),
        },
        ElementKind::Group(items) => join(items, " ", Context::Group),
        ElementKind::Alternatives(items) => join(items, " | ", Context::Alternatives),
        ElementKind::UnorderedGroup(items) => join(items, " & ", Context::UnorderedGroup),
        ElementKind::Guarded { condition, body } => {
            format!("<{}> {}", condition, render(body, Context::Group))
        }
        ElementKind::CharacterRange { left, right } => format!("{}..{}", quote(left), quote(right)),
        ElementKind::Wildcard => ".".to_string(),
        ElementKind::NegatedToken(inner) => format!("!{}", render(inner, Context::Operand)),
        ElementKind::UntilToken(inner) => format!("-> {}", render(inner, Context::Operand)),
        ElementKind::EnumLiteral { name, literal } => match literal {
            Some(literal) => format!("{}={}", name, quote(literal)),
            None => name.clone(),
        },
        ElementKind::Eof => "EOF".to_string(),
    };

    let wrapped = if needs_parentheses(element, context) {
        format!("({})", core)
    } else {
        core
    };
    let prefix = match element.predicate {
        Some(Predicate::Syntactic) => "=>",
        Some(Predicate::FirstToken) => "->",
        None => "",
    };
    format!("{}{}{}", prefix, wrapped, element.cardinality.suffix())
}

/// Quote literal text, switching to `"` when the text holds an unescaped `'`.
fn quote(text: &str) -> String {
    let mut escaped = false;
    let mut bare_apostrophe = false;
    for c in text.chars() {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '\'' => bare_apostrophe = true,
            _ => {}
        }
    }
    if bare_apostrophe {
        format!("\"{}\"", text)
    } else {
        format!("'{}'", text)
    }
}

fn join(items: &[Element], separator: &str, context: Context) -> String {
    items
        .iter()
        .map(|item| render(item, context))
        .collect::<Vec<_>>()
        .join(separator)
}

fn needs_parentheses(element: &Element, context: Context) -> bool {
    let composite = matches!(
        element.kind,
        ElementKind::Group(_)
            | ElementKind::Alternatives(_)
            | ElementKind::UnorderedGroup(_)
            | ElementKind::Guarded { .. }
    );
    if !composite {
        return false;
    }
    if element.cardinality != Cardinality::One || element.predicate.is_some() {
        return true;
    }
    match context {
        Context::Top => false,
        Context::Alternatives if matches!(element.kind, ElementKind::Guarded { .. }) => false,
        _ if matches!(element.kind, ElementKind::Guarded { .. }) => true,
        Context::Group => !matches!(element.kind, ElementKind::Group(_)),
        Context::Alternatives => matches!(element.kind, ElementKind::Alternatives(_)),
        Context::UnorderedGroup => !matches!(element.kind, ElementKind::Group(_)),
        Context::Operand => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formatter::test_support::sample;
    use crate::grammar;
    use crate::model::GrammarDoc;

    fn round_trip(source: &str) -> String {
        let g = grammar::parse(&format!("grammar t.G\n{}", source)).unwrap();
        let doc = GrammarDoc::new(&g).unwrap();
        render_rule(&doc.rules()[0]).unwrap()
    }

    #[test]
    fn simple_sequence() {
        assert_eq!(round_trip("A: 'x' B; B: 'y';"), "A:\n    'x' B;");
    }

    #[test]
    fn top_level_alternatives_one_per_line() {
        assert_eq!(round_trip("Type: DataType | Entity;"), "Type:\n    DataType\n    | Entity;");
    }

    #[test]
    fn nested_groups_keep_parentheses() {
        assert_eq!(
            round_trip("Entity: 'entity' name=ID ('extends' superType=[Entity|QualifiedName])? '{' features+=Feature* '}';"),
            "Entity:\n    'entity' name=ID ('extends' superType=[Entity|QualifiedName])? '{' features+=Feature* '}';"
        );
    }

    #[test]
    fn alternatives_inside_group() {
        assert_eq!(round_trip("A: 'a' ('b' | 'c') 'd';"), "A:\n    'a' ('b' | 'c') 'd';");
    }

    #[test]
    fn double_cardinality() {
        assert_eq!(round_trip("A: ('a'*)?;"), "A:\n    ('a'*)?;");
    }

    #[test]
    fn assignment_of_alternatives() {
        assert_eq!(round_trip("A: op=('+' | '-');"), "A:\n    op=('+' | '-');");
    }

    #[test]
    fn predicates_and_actions() {
        assert_eq!(
            round_trip("A: B ({Bin.left=current} =>op='+' right=B)*;"),
            "A:\n    B ({Bin.left=current} =>op='+' right=B)*;"
        );
    }

    #[test]
    fn terminal_rule_header() {
        assert_eq!(
            round_trip("terminal fragment ML returns ecore::EString: '/*' -> '*/';"),
            "terminal fragment ML returns ecore::EString:\n    '/*' -> '*/';"
        );
    }

    #[test]
    fn terminal_negation_and_ranges() {
        assert_eq!(
            round_trip("terminal ID: '^'? ('a'..'z' | '_') !('\\n')*;"),
            "terminal ID:\n    '^'? ('a'..'z' | '_') !'\\n'*;"
        );
    }

    #[test]
    fn enum_rule() {
        assert_eq!(
            round_trip("enum Color: red='red' | green;"),
            "enum Color:\n    red='red'\n    | green;"
        );
    }

    #[test]
    fn hidden_tokens_on_parser_rules() {
        assert_eq!(
            round_trip("QN hidden(): ID ('.' ID)*;"),
            "QN:\n    ID ('.' ID)*;"
        );
        assert_eq!(
            round_trip("QN hidden(WS): ID;"),
            "QN hidden(WS):\n    ID;"
        );
    }

    /// Render the first rule, then load the rendered text in its place and
    /// check that the definition is unchanged.
    fn reparses(source: &str, rest: &str) {
        let original = grammar::parse(&format!("grammar t.G\n{}\n{}", source, rest)).unwrap();
        let doc = GrammarDoc::new(&original).unwrap();
        let rendered = render_rule(&doc.rules()[0]).unwrap();
        let reloaded = grammar::parse(&format!("grammar t.G\n{}\n{}", rendered, rest)).unwrap();
        assert_eq!(
            reloaded.rules()[0].alternatives,
            original.rules()[0].alternatives,
            "{}",
            rendered
        );
    }

    #[test]
    fn apostrophe_keyword_keeps_double_quotes() {
        assert_eq!(round_trip("Q: \"'\" name=ID;"), "Q:\n    \"'\" name=ID;");
        assert_eq!(round_trip(r"Q: '\'' name=ID;"), "Q:\n    '\\'' name=ID;");
        reparses("Q: \"'\" name=ID;", "");
        reparses("enum Quote: single=\"'\" | double='\"';", "");
    }

    #[test]
    fn string_terminal_round_trips() {
        let double = r#"'"' ('\\' . | !('\\' | '"'))* '"'"#;
        let single = r#""'" ('\\' . | !('\\' | "'"))* "'""#;
        assert_eq!(
            round_trip(&format!("terminal STRING: {} | {};", double, single)),
            format!("terminal STRING:\n    {}\n    | {};", double, single)
        );
        reparses(&format!("terminal STRING: {} | {};", double, single), "");
        reparses("terminal APOS: \"'\"..\"'\";", "");
    }

    #[test]
    fn guarded_alternatives() {
        let source = "Expr<In>: <In> 'in' Other | <!In> Other<!In>;";
        assert_eq!(
            round_trip(&format!("{}\nOther<In>: 'o';", source)),
            "Expr<In>:\n    <In> 'in' Other\n    | <!In> Other<!In>;"
        );
        reparses(source, "Other<In>: 'o';");
        reparses("A<P>: 'a' (<P> 'b' | <!P & P> 'c' 'd')?;", "");
        reparses("A<P>: <P> 'b';", "");
    }

    #[test]
    fn missing_definition() {
        let g = sample();
        let doc = GrammarDoc::new(&g).unwrap();
        let broken = doc.rules().iter().find(|r| r.name() == "Broken").unwrap();
        assert_eq!(
            render_rule(broken).unwrap_err(),
            MissingDefinition {
                rule: "Broken".into()
            }
        );
    }
}
