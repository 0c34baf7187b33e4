//! Recursive-descent loader for Xtext-style grammar files.
//!
//! Produces a [`Grammar`] with rule calls resolved against local rule names.
//! The raw `/** */` comment written directly before the `grammar` keyword or
//! before a rule declaration is kept on the grammar or rule; turning it into a
//! [`DocComment`](crate::doccomment::DocComment) is left to the caller.

use super::lexer::{tokenize, Token, TokenKind};
use super::{AssignOp, Cardinality, Element, ElementKind, Grammar, PackageDecl, Predicate, Rule, RuleKind, RuleRef};
use crate::error::{LoadError, LoadErrorKind};

type Result<T> = std::result::Result<T, LoadError>;

/// Load a grammar from source text.
pub fn parse(source: &str) -> Result<Grammar> {
    let tokens = tokenize(source)
        .map_err(|failure| LoadError::at(LoadErrorKind::InvalidToken, source, failure.offset))?;
    let mut parser = Parser {
        source,
        tokens,
        pos: 0,
        in_terminal: false,
    };
    let mut grammar = parser.grammar()?;
    grammar.resolve_rule_calls();
    Ok(grammar)
}

struct Parser<'src> {
    source: &'src str,
    tokens: Vec<Token<'src>>,
    pos: usize,
    /// Inside a terminal rule body, where `->` is an until-token
    in_terminal: bool,
}

impl<'src> Parser<'src> {
    // -- Token cursor ---------------------------------------------------------

    fn peek(&self) -> Option<&Token<'src>> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> Option<TokenKind> {
        self.peek().map(|t| t.kind)
    }

    fn nth_kind(&self, n: usize) -> Option<TokenKind> {
        self.tokens.get(self.pos + n).map(|t| t.kind)
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.peek_kind() == Some(kind)
    }

    fn at_word(&self, word: &str) -> bool {
        self.peek()
            .is_some_and(|t| t.kind == TokenKind::Ident && t.text == word)
    }

    fn bump(&mut self) -> Token<'src> {
        let token = self.tokens[self.pos].clone();
        self.pos += 1;
        token
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn eat_word(&mut self, word: &str) -> bool {
        if self.at_word(word) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token<'src>> {
        if self.at(kind) {
            Ok(self.bump())
        } else {
            Err(self.unexpected(&kind.to_string()))
        }
    }

    fn expect_word(&mut self, word: &str) -> Result<()> {
        if self.eat_word(word) {
            Ok(())
        } else {
            Err(self.unexpected(&format!("`{}`", word)))
        }
    }

    fn ident(&mut self) -> Result<&'src str> {
        let token = self.expect(TokenKind::Ident)?;
        Ok(token.text.trim_start_matches('^'))
    }

    fn unexpected(&self, expected: &str) -> LoadError {
        match self.peek() {
            Some(token) => LoadError::at(
                LoadErrorKind::Unexpected {
                    found: format!("`{}`", token.text),
                    expected: expected.to_string(),
                },
                self.source,
                token.span.start,
            ),
            None => LoadError::at(
                LoadErrorKind::UnexpectedEof {
                    expected: expected.to_string(),
                },
                self.source,
                self.source.len(),
            ),
        }
    }

    // -- Grammar header -------------------------------------------------------

    fn grammar(&mut self) -> Result<Grammar> {
        let comment = self.peek().and_then(|t| t.doc).map(str::to_string);
        if !self.eat_word("grammar") {
            return Err(match self.peek() {
                Some(token) => LoadError::at(LoadErrorKind::MissingGrammar, self.source, token.span.start),
                None => LoadError::at(LoadErrorKind::MissingGrammar, self.source, 0),
            });
        }

        let mut grammar = Grammar::new(self.qualified_name()?);
        grammar.comment = comment;

        if self.eat_word("with") {
            grammar.used_grammars.push(self.qualified_name()?);
            while self.eat(TokenKind::Comma) {
                grammar.used_grammars.push(self.qualified_name()?);
            }
        }
        if self.at_word("hidden") {
            grammar.hidden_tokens = self.hidden_list()?;
        }

        loop {
            if self.eat_word("generate") {
                let name = self.ident()?.to_string();
                let uri = self.string()?;
                grammar.generates.push(PackageDecl { name: Some(name), uri });
                if self.eat_word("as") {
                    self.ident()?;
                }
            } else if self.eat_word("import") {
                let uri = self.string()?;
                let alias = if self.eat_word("as") {
                    Some(self.ident()?.to_string())
                } else {
                    None
                };
                grammar.imports.push(PackageDecl { name: alias, uri });
            } else {
                break;
            }
        }

        while self.peek().is_some() {
            let rule = self.rule()?;
            grammar.add_rule(rule);
        }

        Ok(grammar)
    }

    fn qualified_name(&mut self) -> Result<String> {
        let mut name = self.ident()?.to_string();
        while self.at(TokenKind::Dot) && self.nth_kind(1) == Some(TokenKind::Ident) {
            self.bump();
            name.push('.');
            name.push_str(self.ident()?);
        }
        Ok(name)
    }

    fn hidden_list(&mut self) -> Result<Vec<String>> {
        self.expect_word("hidden")?;
        self.expect(TokenKind::LParen)?;
        let mut names = Vec::new();
        if !self.at(TokenKind::RParen) {
            names.push(self.rule_name()?);
            while self.eat(TokenKind::Comma) {
                names.push(self.rule_name()?);
            }
        }
        self.expect(TokenKind::RParen)?;
        Ok(names)
    }

    /// `Name` or `qualifier::Name`, as written.
    fn rule_name(&mut self) -> Result<String> {
        let first = self.ident()?;
        if self.eat(TokenKind::ColonColon) {
            Ok(format!("{}::{}", first, self.ident()?))
        } else {
            Ok(first.to_string())
        }
    }

    fn string(&mut self) -> Result<String> {
        let token = self.expect(TokenKind::String)?;
        Ok(unquote(token.text).to_string())
    }

    // -- Rules ----------------------------------------------------------------

    fn rule(&mut self) -> Result<Rule> {
        let comment = self.peek().and_then(|t| t.doc).map(str::to_string);

        let mut annotations = Vec::new();
        while self.eat(TokenKind::At) {
            annotations.push(self.ident()?.to_string());
        }

        let mut rule = if self.eat_word("terminal") {
            self.terminal_rule()?
        } else if self.eat_word("enum") {
            self.enum_rule()?
        } else {
            self.parser_rule()?
        };
        rule.annotations = annotations;
        rule.comment = comment;
        Ok(rule)
    }

    fn parser_rule(&mut self) -> Result<Rule> {
        let fragment = self.at_word("fragment") && self.nth_kind(1) == Some(TokenKind::Ident);
        if fragment {
            self.bump();
        }
        let name = self.ident()?.to_string();
        // `fragment Name*:` declares a fragment without its own return type
        self.eat(TokenKind::Star);
        let parameters = if self.at(TokenKind::Lt) {
            self.parameters()?
        } else {
            Vec::new()
        };
        let return_type = self.returns()?;
        let hidden_tokens = if self.at_word("hidden") {
            self.hidden_list()?
        } else {
            Vec::new()
        };
        self.expect(TokenKind::Colon)?;

        self.in_terminal = false;
        let alternatives = self.rule_body()?;

        let mut rule = Rule::new(name, RuleKind::Parser { fragment }, alternatives);
        rule.return_type = return_type;
        rule.parameters = parameters;
        rule.hidden_tokens = hidden_tokens;
        Ok(rule)
    }

    fn terminal_rule(&mut self) -> Result<Rule> {
        let fragment = self.eat_word("fragment");
        let name = self.ident()?.to_string();
        let return_type = self.returns()?;
        self.expect(TokenKind::Colon)?;

        self.in_terminal = true;
        let alternatives = self.rule_body();
        self.in_terminal = false;

        let mut rule = Rule::new(name, RuleKind::Terminal { fragment }, alternatives?);
        rule.return_type = return_type;
        Ok(rule)
    }

    fn enum_rule(&mut self) -> Result<Rule> {
        let name = self.ident()?.to_string();
        let return_type = self.returns()?;
        self.expect(TokenKind::Colon)?;

        let alternatives = if self.at(TokenKind::Semicolon) {
            None
        } else {
            let mut literals = vec![self.enum_literal()?];
            while self.eat(TokenKind::Pipe) {
                literals.push(self.enum_literal()?);
            }
            Some(single_or(literals, ElementKind::Alternatives))
        };
        self.expect(TokenKind::Semicolon)?;

        let mut rule = Rule::new(name, RuleKind::Enum, alternatives);
        rule.return_type = return_type;
        Ok(rule)
    }

    fn enum_literal(&mut self) -> Result<Element> {
        let name = self.ident()?.to_string();
        let literal = if self.eat(TokenKind::Eq) {
            Some(self.string()?)
        } else {
            None
        };
        Ok(Element::new(ElementKind::EnumLiteral { name, literal }))
    }

    fn returns(&mut self) -> Result<Option<String>> {
        if self.eat_word("returns") {
            Ok(Some(self.rule_name()?))
        } else {
            Ok(None)
        }
    }

    /// Body up to and including the closing `;`. Empty bodies yield `None`.
    fn rule_body(&mut self) -> Result<Option<Element>> {
        if self.eat(TokenKind::Semicolon) {
            return Ok(None);
        }
        let body = self.alternatives()?;
        self.expect(TokenKind::Semicolon)?;
        Ok(Some(body))
    }

    /// `<In, Other>` after a parser rule name.
    fn parameters(&mut self) -> Result<Vec<String>> {
        self.expect(TokenKind::Lt)?;
        let mut names = vec![self.ident()?.to_string()];
        while self.eat(TokenKind::Comma) {
            names.push(self.ident()?.to_string());
        }
        self.expect(TokenKind::Gt)?;
        Ok(names)
    }

    /// Contents of a guard condition or call argument list such as
    /// `<!In & Other>` or `<In=true, Other>`, normalized to single spacing
    /// around binary operators.
    fn angle_text(&mut self) -> Result<String> {
        self.expect(TokenKind::Lt)?;
        let mut text = String::new();
        loop {
            let Some(kind) = self.peek_kind() else {
                return Err(self.unexpected("'>'"));
            };
            match kind {
                TokenKind::Gt => {
                    self.bump();
                    return Ok(text);
                }
                TokenKind::Amp => text.push_str(" & "),
                TokenKind::Pipe => text.push_str(" | "),
                TokenKind::Comma => text.push_str(", "),
                TokenKind::Bang | TokenKind::Eq | TokenKind::LParen | TokenKind::RParen | TokenKind::Ident => {
                    text.push_str(self.tokens[self.pos].text)
                }
                _ => return Err(self.unexpected("parameter condition")),
            }
            self.bump();
        }
    }

    // -- Elements -------------------------------------------------------------

    fn alternatives(&mut self) -> Result<Element> {
        let mut items = vec![self.conditional_branch()?];
        while self.eat(TokenKind::Pipe) {
            items.push(self.conditional_branch()?);
        }
        Ok(single_or(items, ElementKind::Alternatives))
    }

    /// An alternative, optionally guarded by `<condition>` in parser rules.
    fn conditional_branch(&mut self) -> Result<Element> {
        if self.in_terminal || !self.at(TokenKind::Lt) {
            return self.unordered_group();
        }
        let condition = self.angle_text()?;
        let body = self.group()?;
        Ok(Element::new(ElementKind::Guarded {
            condition,
            body: Box::new(body),
        }))
    }

    fn unordered_group(&mut self) -> Result<Element> {
        let mut items = vec![self.group()?];
        while self.eat(TokenKind::Amp) {
            items.push(self.group()?);
        }
        Ok(single_or(items, ElementKind::UnorderedGroup))
    }

    fn group(&mut self) -> Result<Element> {
        let mut items = Vec::new();
        while self.at_item_start() {
            items.push(self.item()?);
        }
        if items.is_empty() {
            return Err(self.unexpected("grammar element"));
        }
        Ok(single_or(items, ElementKind::Group))
    }

    fn at_item_start(&self) -> bool {
        matches!(
            self.peek_kind(),
            Some(
                TokenKind::String
                    | TokenKind::Ident
                    | TokenKind::LParen
                    | TokenKind::LBrace
                    | TokenKind::LBracket
                    | TokenKind::Bang
                    | TokenKind::Arrow
                    | TokenKind::FatArrow
                    | TokenKind::Dot
            )
        )
    }

    fn item(&mut self) -> Result<Element> {
        let predicate = if self.eat(TokenKind::FatArrow) {
            Some(Predicate::Syntactic)
        } else if !self.in_terminal && self.eat(TokenKind::Arrow) {
            Some(Predicate::FirstToken)
        } else {
            None
        };

        let mut element = if self.in_terminal && self.eat(TokenKind::Arrow) {
            Element::new(ElementKind::UntilToken(Box::new(self.primary()?)))
        } else {
            self.primary()?
        };

        if predicate.is_some() {
            if element.predicate.is_some() || element.cardinality != Cardinality::One {
                element = Element::group(vec![element]);
            }
            element.predicate = predicate;
        }

        let cardinality = self.cardinality();
        if cardinality != Cardinality::One {
            if element.cardinality != Cardinality::One {
                // `(a*)?` keeps both cardinalities
                element = Element::group(vec![element]);
            }
            element.cardinality = cardinality;
        }
        Ok(element)
    }

    fn cardinality(&mut self) -> Cardinality {
        if self.eat(TokenKind::Question) {
            Cardinality::Optional
        } else if self.eat(TokenKind::Star) {
            Cardinality::ZeroOrMore
        } else if self.eat(TokenKind::Plus) {
            Cardinality::OneOrMore
        } else {
            Cardinality::One
        }
    }

    fn primary(&mut self) -> Result<Element> {
        match self.peek_kind() {
            Some(TokenKind::String) => self.keyword_or_range(),
            Some(TokenKind::Bang) => {
                self.bump();
                Ok(Element::new(ElementKind::NegatedToken(Box::new(self.primary()?))))
            }
            Some(TokenKind::Dot) => {
                self.bump();
                Ok(Element::new(ElementKind::Wildcard))
            }
            Some(TokenKind::LParen) => self.parenthesized(),
            Some(TokenKind::LBrace) => self.action(),
            Some(TokenKind::LBracket) => self.cross_reference(),
            Some(TokenKind::Ident) => {
                if self.in_terminal && self.at_word("EOF") {
                    self.bump();
                    return Ok(Element::new(ElementKind::Eof));
                }
                match self.nth_kind(1) {
                    Some(TokenKind::Eq | TokenKind::PlusEq | TokenKind::QuestionEq) => self.assignment(),
                    _ => self.rule_call(),
                }
            }
            _ => Err(self.unexpected("grammar element")),
        }
    }

    fn keyword_or_range(&mut self) -> Result<Element> {
        let left = self.string()?;
        if self.eat(TokenKind::DotDot) {
            let right = self.string()?;
            return Ok(Element::new(ElementKind::CharacterRange { left, right }));
        }
        Ok(Element::keyword(left))
    }

    fn parenthesized(&mut self) -> Result<Element> {
        self.expect(TokenKind::LParen)?;
        let inner = self.alternatives()?;
        self.expect(TokenKind::RParen)?;
        Ok(inner)
    }

    fn action(&mut self) -> Result<Element> {
        self.expect(TokenKind::LBrace)?;
        let type_name = self.rule_name()?;
        let feature = if self.eat(TokenKind::Dot) {
            let feature = self.ident()?.to_string();
            let operator = if self.eat(TokenKind::PlusEq) {
                AssignOp::Add
            } else {
                self.expect(TokenKind::Eq)?;
                AssignOp::Set
            };
            self.expect_word("current")?;
            Some((feature, operator))
        } else {
            None
        };
        self.expect(TokenKind::RBrace)?;
        Ok(Element::new(ElementKind::Action { type_name, feature }))
    }

    fn cross_reference(&mut self) -> Result<Element> {
        self.expect(TokenKind::LBracket)?;
        let type_name = self.rule_name()?;
        let terminal = if self.eat(TokenKind::Pipe) {
            let terminal = match self.peek_kind() {
                Some(TokenKind::String) => Element::keyword(self.string()?),
                _ => self.rule_call()?,
            };
            Some(Box::new(terminal))
        } else {
            None
        };
        self.expect(TokenKind::RBracket)?;
        Ok(Element::new(ElementKind::CrossReference { type_name, terminal }))
    }

    fn assignment(&mut self) -> Result<Element> {
        let feature = self.ident()?.to_string();
        let operator = match self.bump().kind {
            TokenKind::PlusEq => AssignOp::Add,
            TokenKind::QuestionEq => AssignOp::Bool,
            _ => AssignOp::Set,
        };
        let terminal = match self.peek_kind() {
            Some(TokenKind::String) => Element::keyword(self.string()?),
            Some(TokenKind::LBracket) => self.cross_reference()?,
            Some(TokenKind::LParen) => self.parenthesized()?,
            Some(TokenKind::Ident) => self.rule_call()?,
            _ => return Err(self.unexpected("assignable terminal")),
        };
        Ok(Element::new(ElementKind::Assignment {
            feature,
            operator,
            terminal: Box::new(terminal),
        }))
    }

    fn rule_call(&mut self) -> Result<Element> {
        let first = self.ident()?.to_string();
        let mut target = if self.eat(TokenKind::ColonColon) {
            RuleRef {
                name: self.ident()?.to_string(),
                qualifier: Some(first),
                arguments: None,
                target: None,
            }
        } else {
            RuleRef::unresolved(first)
        };
        if !self.in_terminal && self.at(TokenKind::Lt) {
            target.arguments = Some(self.angle_text()?);
        }
        Ok(Element::rule_call(target))
    }
}

/// Collapse a one-item list to the item itself.
fn single_or(mut items: Vec<Element>, wrap: fn(Vec<Element>) -> ElementKind) -> Element {
    if items.len() == 1 {
        items.remove(0)
    } else {
        Element::new(wrap(items))
    }
}

fn unquote(text: &str) -> &str {
    &text[1..text.len() - 1]
}
