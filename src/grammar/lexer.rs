//! Token types for the grammar loader.

use logos::Logos;
use std::fmt;
use std::ops::Range;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n\f]+|//[^\n]*")]
pub enum TokenKind {
    /// `/* ... */`, including `/** ... */` doc comments
    #[token("/*", block_comment)]
    BlockComment,

    #[regex(r"'([^'\\]|\\.)*'")]
    #[regex(r#""([^"\\]|\\.)*""#)]
    String,

    #[regex(r"\^?[a-zA-Z_][a-zA-Z0-9_]*")]
    Ident,

    #[token("::")]
    ColonColon,
    #[token(":")]
    Colon,
    #[token(";")]
    Semicolon,
    #[token(",")]
    Comma,
    #[token("|")]
    Pipe,
    #[token("&")]
    Amp,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("..")]
    DotDot,
    #[token(".")]
    Dot,
    #[token("=")]
    Eq,
    #[token("+=")]
    PlusEq,
    #[token("?=")]
    QuestionEq,
    #[token("?")]
    Question,
    #[token("*")]
    Star,
    #[token("+")]
    Plus,
    #[token("!")]
    Bang,
    #[token("->")]
    Arrow,
    #[token("=>")]
    FatArrow,
    #[token("@")]
    At,
}

fn block_comment(lex: &mut logos::Lexer<TokenKind>) -> bool {
    match lex.remainder().find("*/") {
        Some(end) => {
            lex.bump(end + 2);
            true
        }
        None => false,
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TokenKind::BlockComment => "comment",
            TokenKind::String => "string",
            TokenKind::Ident => "identifier",
            TokenKind::ColonColon => "'::'",
            TokenKind::Colon => "':'",
            TokenKind::Semicolon => "';'",
            TokenKind::Comma => "','",
            TokenKind::Pipe => "'|'",
            TokenKind::Amp => "'&'",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::LBrace => "'{'",
            TokenKind::RBrace => "'}'",
            TokenKind::LBracket => "'['",
            TokenKind::RBracket => "']'",
            TokenKind::Lt => "'<'",
            TokenKind::Gt => "'>'",
            TokenKind::DotDot => "'..'",
            TokenKind::Dot => "'.'",
            TokenKind::Eq => "'='",
            TokenKind::PlusEq => "'+='",
            TokenKind::QuestionEq => "'?='",
            TokenKind::Question => "'?'",
            TokenKind::Star => "'*'",
            TokenKind::Plus => "'+'",
            TokenKind::Bang => "'!'",
            TokenKind::Arrow => "'->'",
            TokenKind::FatArrow => "'=>'",
            TokenKind::At => "'@'",
        };
        f.write_str(s)
    }
}

/// A significant token together with the doc comment written right before it.
#[derive(Debug, Clone)]
pub struct Token<'src> {
    pub kind: TokenKind,
    pub text: &'src str,
    pub span: Range<usize>,
    /// Last `/** */` comment between the previous significant token and this one
    pub doc: Option<&'src str>,
}

/// Lexing failure: byte offset of the offending input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LexFailure {
    pub offset: usize,
}

/// Tokenize `source`, folding comments into the `doc` slot of the next token.
pub fn tokenize(source: &str) -> Result<Vec<Token<'_>>, LexFailure> {
    let mut lexer = TokenKind::lexer(source);
    let mut tokens = Vec::new();
    let mut pending_doc: Option<&str> = None;

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        let kind = result.map_err(|()| LexFailure { offset: span.start })?;
        let text = lexer.slice();
        if kind == TokenKind::BlockComment {
            // `/**/` is an empty plain comment, not a doc comment
            if text.starts_with("/**") && text != "/**/" {
                pending_doc = Some(text);
            }
            continue;
        }
        tokens.push(Token {
            kind,
            text,
            span,
            doc: pending_doc.take(),
        });
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source).unwrap().iter().map(|t| t.kind).collect()
    }

    #[test]
    fn punctuation_prefers_longest_match() {
        assert_eq!(
            kinds(":: : .. . += ?= => ->"),
            vec![
                TokenKind::ColonColon,
                TokenKind::Colon,
                TokenKind::DotDot,
                TokenKind::Dot,
                TokenKind::PlusEq,
                TokenKind::QuestionEq,
                TokenKind::FatArrow,
                TokenKind::Arrow,
            ]
        );
    }

    #[test]
    fn strings_with_escapes() {
        let tokens = tokenize(r#"'\'' "a\"b" 'x'"#).unwrap();
        let texts: Vec<_> = tokens.iter().map(|t| t.text).collect();
        assert_eq!(texts, vec![r"'\''", r#""a\"b""#, "'x'"]);
    }

    #[test]
    fn doc_comment_attaches_to_next_token() {
        let tokens = tokenize("/** Rule A */ A: 'x'; // trailing\n/* plain */ B").unwrap();
        assert_eq!(tokens[0].text, "A");
        assert_eq!(tokens[0].doc, Some("/** Rule A */"));
        let b = tokens.last().unwrap();
        assert_eq!(b.text, "B");
        assert_eq!(b.doc, None);
    }

    #[test]
    fn last_doc_comment_wins() {
        let tokens = tokenize("/** first */ /** second */ A").unwrap();
        assert_eq!(tokens[0].doc, Some("/** second */"));
    }

    #[test]
    fn unterminated_comment_fails() {
        assert_eq!(tokenize("A /* open").unwrap_err(), LexFailure { offset: 2 });
    }

    #[test]
    fn caret_escaped_identifier() {
        let tokens = tokenize("^grammar").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Ident);
    }
}
