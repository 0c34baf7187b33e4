//! Grammar metamodel: rules, rule kinds and alternative-expression trees.
//!
//! The documentation model never owns anything in here: rule documentation
//! borrows rules out of a [`Grammar`] and compares them by [`RuleId`].

mod lexer;
pub mod parser;

pub use parser::parse;

use std::fmt;

/// Handle of a rule inside its grammar's rule table (declaration index).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RuleId(usize);

impl RuleId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A parsed grammar. Owns its rules in declaration order.
#[derive(Debug, Default)]
pub struct Grammar {
    pub name: String,
    /// Grammars listed after `with`
    pub used_grammars: Vec<String>,
    /// Grammar-wide `hidden(...)` token list
    pub hidden_tokens: Vec<String>,
    /// `generate name "uri"` declarations
    pub generates: Vec<PackageDecl>,
    /// `import "uri" as alias` declarations
    pub imports: Vec<PackageDecl>,
    /// Raw `/** */` comment preceding the `grammar` keyword
    pub comment: Option<String>,
    rules: Vec<Rule>,
}

/// An EPackage declaration (`generate` or `import`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageDecl {
    pub name: Option<String>,
    pub uri: String,
}

impl Grammar {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Append a rule, assigning it the next handle.
    pub fn add_rule(&mut self, mut rule: Rule) -> RuleId {
        let id = RuleId(self.rules.len());
        rule.id = id;
        self.rules.push(rule);
        id
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn rule(&self, id: RuleId) -> Option<&Rule> {
        self.rules.get(id.0)
    }

    pub fn find_rule(&self, name: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.name == name)
    }

    /// True when `rule` is the very rule stored under its id in this grammar.
    pub fn owns(&self, rule: &Rule) -> bool {
        self.rule(rule.id).is_some_and(|own| std::ptr::eq(own, rule))
    }

    /// Bind every unqualified rule call to the local rule of the same name.
    ///
    /// Qualified calls (`Terminals::ID`, `super::ID`) and names with no local
    /// declaration stay unresolved.
    pub fn resolve_rule_calls(&mut self) {
        let names: Vec<(String, RuleId)> =
            self.rules.iter().map(|r| (r.name.clone(), r.id)).collect();
        for rule in &mut self.rules {
            if let Some(alternatives) = rule.alternatives.as_mut() {
                alternatives.walk_mut(&mut |element| {
                    if let ElementKind::RuleCall(call) = &mut element.kind {
                        if call.qualifier.is_none() {
                            call.target = names
                                .iter()
                                .find(|(name, _)| *name == call.name)
                                .map(|(_, id)| *id);
                        }
                    }
                });
            }
        }
    }
}

/// A single grammar rule.
#[derive(Debug, Clone)]
pub struct Rule {
    id: RuleId,
    pub name: String,
    pub kind: RuleKind,
    pub return_type: Option<String>,
    /// Declared parameters of a parser rule, `In` in `Expr<In>`
    pub parameters: Vec<String>,
    /// `hidden(...)` token list of a parser rule
    pub hidden_tokens: Vec<String>,
    /// Annotations such as `@Override`, without the `@`
    pub annotations: Vec<String>,
    /// Rule body. `None` when the source declares an empty body.
    pub alternatives: Option<Element>,
    /// Raw `/** */` comment immediately preceding the declaration
    pub comment: Option<String>,
}

impl Rule {
    pub fn new(name: impl Into<String>, kind: RuleKind, alternatives: Option<Element>) -> Self {
        Self {
            id: RuleId(0),
            name: name.into(),
            kind,
            return_type: None,
            parameters: Vec::new(),
            hidden_tokens: Vec::new(),
            annotations: Vec::new(),
            alternatives,
            comment: None,
        }
    }

    pub fn id(&self) -> RuleId {
        self.id
    }

    /// Rule calls in the body, in pre-order, one entry per occurrence.
    pub fn rule_calls(&self) -> Vec<&RuleRef> {
        self.alternatives
            .as_ref()
            .map(Element::rule_calls)
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    Parser { fragment: bool },
    Terminal { fragment: bool },
    Enum,
}

impl RuleKind {
    pub fn label(self) -> &'static str {
        match self {
            RuleKind::Parser { .. } => "parser rule",
            RuleKind::Terminal { .. } => "terminal rule",
            RuleKind::Enum => "enum rule",
        }
    }

    pub fn is_fragment(self) -> bool {
        matches!(
            self,
            RuleKind::Parser { fragment: true } | RuleKind::Terminal { fragment: true }
        )
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Target of a rule call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleRef {
    pub name: String,
    /// `Terminals` in `Terminals::ID`
    pub qualifier: Option<String>,
    /// Argument list of a parameterized call, `In` in `Expr<In>`
    pub arguments: Option<String>,
    /// Local rule the call resolves to, if any
    pub target: Option<RuleId>,
}

impl RuleRef {
    pub fn unresolved(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            qualifier: None,
            arguments: None,
            target: None,
        }
    }

    /// Name as written in the grammar, including the qualifier.
    pub fn qualified_name(&self) -> String {
        match &self.qualifier {
            Some(q) => format!("{}::{}", q, self.name),
            None => self.name.clone(),
        }
    }
}

/// Node of an alternative-expression tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub kind: ElementKind,
    pub cardinality: Cardinality,
    pub predicate: Option<Predicate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cardinality {
    #[default]
    One,
    Optional,
    ZeroOrMore,
    OneOrMore,
}

impl Cardinality {
    pub fn suffix(self) -> &'static str {
        match self {
            Cardinality::One => "",
            Cardinality::Optional => "?",
            Cardinality::ZeroOrMore => "*",
            Cardinality::OneOrMore => "+",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Predicate {
    /// `=>`
    Syntactic,
    /// `->` in a parser rule
    FirstToken,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    /// `=`
    Set,
    /// `+=`
    Add,
    /// `?=`
    Bool,
}

impl AssignOp {
    pub fn as_str(self) -> &'static str {
        match self {
            AssignOp::Set => "=",
            AssignOp::Add => "+=",
            AssignOp::Bool => "?=",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementKind {
    /// Keyword text without the surrounding quotes
    Keyword(String),
    RuleCall(RuleRef),
    Assignment {
        feature: String,
        operator: AssignOp,
        terminal: Box<Element>,
    },
    CrossReference {
        type_name: String,
        terminal: Option<Box<Element>>,
    },
    Action {
        type_name: String,
        feature: Option<(String, AssignOp)>,
    },
    Group(Vec<Element>),
    Alternatives(Vec<Element>),
    UnorderedGroup(Vec<Element>),
    /// Alternative enabled by a parameter condition, `<In> 'in' Expr`
    Guarded {
        condition: String,
        body: Box<Element>,
    },
    CharacterRange {
        left: String,
        right: String,
    },
    Wildcard,
    NegatedToken(Box<Element>),
    UntilToken(Box<Element>),
    EnumLiteral {
        name: String,
        literal: Option<String>,
    },
    Eof,
}

impl Element {
    pub fn new(kind: ElementKind) -> Self {
        Self {
            kind,
            cardinality: Cardinality::One,
            predicate: None,
        }
    }

    pub fn keyword(text: impl Into<String>) -> Self {
        Self::new(ElementKind::Keyword(text.into()))
    }

    pub fn rule_call(target: RuleRef) -> Self {
        Self::new(ElementKind::RuleCall(target))
    }

    pub fn group(elements: Vec<Element>) -> Self {
        Self::new(ElementKind::Group(elements))
    }

    pub fn alternatives(elements: Vec<Element>) -> Self {
        Self::new(ElementKind::Alternatives(elements))
    }

    pub fn with_cardinality(mut self, cardinality: Cardinality) -> Self {
        self.cardinality = cardinality;
        self
    }

    /// Direct children in source order.
    pub fn children(&self) -> Vec<&Element> {
        match &self.kind {
            ElementKind::Group(items)
            | ElementKind::Alternatives(items)
            | ElementKind::UnorderedGroup(items) => items.iter().collect(),
            ElementKind::Assignment { terminal, .. } => vec![terminal.as_ref()],
            ElementKind::CrossReference { terminal, .. } => terminal.iter().map(|t| t.as_ref()).collect(),
            ElementKind::NegatedToken(inner) | ElementKind::UntilToken(inner) => vec![inner.as_ref()],
            ElementKind::Guarded { body, .. } => vec![body.as_ref()],
            ElementKind::Keyword(_)
            | ElementKind::RuleCall(_)
            | ElementKind::Action { .. }
            | ElementKind::CharacterRange { .. }
            | ElementKind::Wildcard
            | ElementKind::EnumLiteral { .. }
            | ElementKind::Eof => Vec::new(),
        }
    }

    /// Rule calls in this subtree, in pre-order, one entry per occurrence.
    pub fn rule_calls(&self) -> Vec<&RuleRef> {
        let mut calls = Vec::new();
        self.walk(&mut |element| {
            if let ElementKind::RuleCall(call) = &element.kind {
                calls.push(call);
            }
        });
        calls
    }

    /// Pre-order traversal.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Element)) {
        visit(self);
        for child in self.children() {
            child.walk(visit);
        }
    }

    fn walk_mut(&mut self, visit: &mut impl FnMut(&mut Element)) {
        visit(self);
        match &mut self.kind {
            ElementKind::Group(items)
            | ElementKind::Alternatives(items)
            | ElementKind::UnorderedGroup(items) => {
                for item in items {
                    item.walk_mut(visit);
                }
            }
            ElementKind::Assignment { terminal, .. } => terminal.walk_mut(visit),
            ElementKind::CrossReference {
                terminal: Some(terminal),
                ..
            } => terminal.walk_mut(visit),
            ElementKind::NegatedToken(inner) | ElementKind::UntilToken(inner) => inner.walk_mut(visit),
            ElementKind::Guarded { body, .. } => body.walk_mut(visit),
            _ => {}
        }
    }
}
