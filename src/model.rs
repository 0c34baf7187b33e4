//! Format-agnostic documentation model.
//!
//! One [`RuleDoc`] per grammar rule, collected in a [`GrammarDoc`]. Rule
//! documentation borrows its rule from the [`Grammar`] it was built from and
//! owns its [`DocComment`].

use crate::doccomment::DocComment;
use crate::error::ModelError;
use crate::grammar::{Element, Grammar, PackageDecl, Rule, RuleId, RuleKind};
use std::collections::{HashMap, HashSet};

/// Lookup from rule handle to its documentation, shared by all
/// [`format_rule`](crate::formatter::GrammarDocsFormatter::format_rule) calls
/// for one grammar.
pub type RuleDocMap<'a, 'g> = HashMap<RuleId, &'a RuleDoc<'g>>;

/// Documentation of one rule, by rule kind.
#[derive(Debug, Clone)]
pub enum RuleDoc<'g> {
    Parser(ParserRuleDoc<'g>),
    Terminal(TerminalRuleDoc<'g>),
    Enum(EnumRuleDoc<'g>),
}

impl<'g> RuleDoc<'g> {
    /// Build the variant matching the rule's kind.
    pub fn new(rule: &'g Rule, head_comment: DocComment) -> Result<Self, ModelError> {
        Ok(match rule.kind {
            RuleKind::Parser { .. } => RuleDoc::Parser(ParserRuleDoc::new(rule, head_comment)?),
            RuleKind::Terminal { .. } => RuleDoc::Terminal(TerminalRuleDoc::new(rule, head_comment)?),
            RuleKind::Enum => RuleDoc::Enum(EnumRuleDoc::new(rule, head_comment)?),
        })
    }

    /// The documented rule, as borrowed from its grammar.
    pub fn rule(&self) -> &'g Rule {
        match self {
            RuleDoc::Parser(doc) => doc.rule(),
            RuleDoc::Terminal(doc) => doc.rule(),
            RuleDoc::Enum(doc) => doc.rule(),
        }
    }

    pub fn head_comment(&self) -> &DocComment {
        match self {
            RuleDoc::Parser(doc) => &doc.head_comment,
            RuleDoc::Terminal(doc) => &doc.head_comment,
            RuleDoc::Enum(doc) => &doc.head_comment,
        }
    }

    pub fn id(&self) -> RuleId {
        self.rule().id()
    }

    pub fn name(&self) -> &'g str {
        &self.rule().name
    }

    /// Expression tree the references of this rule are read from.
    pub fn definition(&self) -> Option<&'g Element> {
        match self {
            RuleDoc::Parser(doc) => doc.alternatives(),
            RuleDoc::Terminal(doc) => doc.alternatives(),
            RuleDoc::Enum(doc) => doc.literals(),
        }
    }
}

/// Documentation attached to a parser rule.
#[derive(Debug, Clone)]
pub struct ParserRuleDoc<'g> {
    rule: &'g Rule,
    head_comment: DocComment,
}

impl<'g> ParserRuleDoc<'g> {
    pub fn new(rule: &'g Rule, head_comment: DocComment) -> Result<Self, ModelError> {
        check_kind(rule, "parser rule", matches!(rule.kind, RuleKind::Parser { .. }))?;
        Ok(Self { rule, head_comment })
    }

    pub fn rule(&self) -> &'g Rule {
        self.rule
    }

    pub fn head_comment(&self) -> &DocComment {
        &self.head_comment
    }

    /// The rule definition, exactly as it appears in the grammar.
    pub fn alternatives(&self) -> Option<&'g Element> {
        self.rule.alternatives.as_ref()
    }

    pub fn is_fragment(&self) -> bool {
        self.rule.kind.is_fragment()
    }
}

/// Documentation attached to a terminal rule.
#[derive(Debug, Clone)]
pub struct TerminalRuleDoc<'g> {
    rule: &'g Rule,
    head_comment: DocComment,
}

impl<'g> TerminalRuleDoc<'g> {
    pub fn new(rule: &'g Rule, head_comment: DocComment) -> Result<Self, ModelError> {
        check_kind(rule, "terminal rule", matches!(rule.kind, RuleKind::Terminal { .. }))?;
        Ok(Self { rule, head_comment })
    }

    pub fn rule(&self) -> &'g Rule {
        self.rule
    }

    pub fn head_comment(&self) -> &DocComment {
        &self.head_comment
    }

    pub fn alternatives(&self) -> Option<&'g Element> {
        self.rule.alternatives.as_ref()
    }

    pub fn is_fragment(&self) -> bool {
        self.rule.kind.is_fragment()
    }
}

/// Documentation attached to an enum rule.
#[derive(Debug, Clone)]
pub struct EnumRuleDoc<'g> {
    rule: &'g Rule,
    head_comment: DocComment,
}

impl<'g> EnumRuleDoc<'g> {
    pub fn new(rule: &'g Rule, head_comment: DocComment) -> Result<Self, ModelError> {
        check_kind(rule, "enum rule", rule.kind == RuleKind::Enum)?;
        Ok(Self { rule, head_comment })
    }

    pub fn rule(&self) -> &'g Rule {
        self.rule
    }

    pub fn head_comment(&self) -> &DocComment {
        &self.head_comment
    }

    /// The literal declarations (a single literal or their alternatives).
    pub fn literals(&self) -> Option<&'g Element> {
        self.rule.alternatives.as_ref()
    }
}

fn check_kind(rule: &Rule, expected: &'static str, matches: bool) -> Result<(), ModelError> {
    if matches {
        Ok(())
    } else {
        Err(ModelError::KindMismatch {
            rule: rule.name.clone(),
            expected,
            found: rule.kind,
        })
    }
}

/// Documentation of a whole grammar: its metadata and its rules in
/// declaration order.
#[derive(Debug, Clone)]
pub struct GrammarDoc<'g> {
    grammar: &'g Grammar,
    head_comment: DocComment,
    rules: Vec<RuleDoc<'g>>,
}

impl<'g> GrammarDoc<'g> {
    /// Document every rule of `grammar`, parsing each rule's head comment.
    pub fn new(grammar: &'g Grammar) -> Result<Self, ModelError> {
        let rules = grammar
            .rules()
            .iter()
            .map(|rule| RuleDoc::new(rule, head_comment_of(rule.comment.as_deref())))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            grammar,
            head_comment: head_comment_of(grammar.comment.as_deref()),
            rules,
        })
    }

    /// Assemble from already-built rule documentation.
    ///
    /// Every rule must belong to `grammar` and appear at most once.
    pub fn from_rule_docs(
        grammar: &'g Grammar,
        head_comment: DocComment,
        rules: Vec<RuleDoc<'g>>,
    ) -> Result<Self, ModelError> {
        let mut seen = HashSet::new();
        for doc in &rules {
            if !grammar.owns(doc.rule()) {
                return Err(ModelError::ForeignRule {
                    rule: doc.name().to_string(),
                    grammar: grammar.name.clone(),
                });
            }
            if !seen.insert(doc.id()) {
                return Err(ModelError::DuplicateRule {
                    rule: doc.name().to_string(),
                });
            }
        }
        Ok(Self {
            grammar,
            head_comment,
            rules,
        })
    }

    pub fn grammar(&self) -> &'g Grammar {
        self.grammar
    }

    pub fn name(&self) -> &'g str {
        &self.grammar.name
    }

    /// Last segment of the qualified grammar name.
    pub fn simple_name(&self) -> &'g str {
        self.name().rsplit('.').next().unwrap_or_default()
    }

    pub fn used_grammars(&self) -> &'g [String] {
        &self.grammar.used_grammars
    }

    /// Tokens hidden between the grammar's parser rules.
    pub fn hidden_tokens(&self) -> &'g [String] {
        &self.grammar.hidden_tokens
    }

    pub fn generates(&self) -> &'g [PackageDecl] {
        &self.grammar.generates
    }

    pub fn imports(&self) -> &'g [PackageDecl] {
        &self.grammar.imports
    }

    pub fn head_comment(&self) -> &DocComment {
        &self.head_comment
    }

    pub fn rules(&self) -> &[RuleDoc<'g>] {
        &self.rules
    }

    pub fn rule_doc(&self, id: RuleId) -> Option<&RuleDoc<'g>> {
        self.rules.iter().find(|doc| doc.id() == id)
    }

    /// Rule handle → documentation for every contained rule.
    pub fn mapping(&self) -> RuleDocMap<'_, 'g> {
        self.rules.iter().map(|doc| (doc.id(), doc)).collect()
    }
}

fn head_comment_of(raw: Option<&str>) -> DocComment {
    raw.map(DocComment::parse).unwrap_or_default()
}
