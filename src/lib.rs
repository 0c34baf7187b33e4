//! grammardoc: documentation and dependency graphs for Xtext-style grammars.
//!
//! A [`Grammar`](grammar::Grammar) is loaded with [`grammar::parse`], wrapped
//! in a [`GrammarDoc`](model::GrammarDoc), and handed to one of the
//! [`GrammarDocsFormatter`](formatter::GrammarDocsFormatter) implementations:
//!
//! ```
//! use grammardoc::formatter::{create_formatter, GraphOptions};
//! use grammardoc::grammar;
//! use grammardoc::model::GrammarDoc;
//!
//! let g = grammar::parse("grammar t.G\n/** Rule A */ A: 'x' B;\n/** Rule B */ B: 'y';").unwrap();
//! let doc = GrammarDoc::new(&g).unwrap();
//! let formatter = create_formatter("markdown", GraphOptions::default()).unwrap();
//! assert!(formatter.format_grammar(&doc).contains("Rule A"));
//! assert!(formatter.format_graph(&doc).contains("\"A\" -> \"B\";"));
//! ```

pub mod doccomment;
pub mod error;
pub mod formatter;
pub mod grammar;
pub mod model;
pub mod toc;
