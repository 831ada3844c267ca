//! Query language for vault search.
//!
//! This module provides:
//! - Tokenizing and parsing query text into a typed tree
//! - Evaluating the tree against a vault snapshot
//! - The searchable-field policy that keeps secrets out of text matching
//! - Highlight terms for result views

mod ast;
mod context;
mod evaluate;
mod fields;
mod highlight;
mod matcher;
mod parser;
mod text_match;
mod token;
mod website;

// Re-export public types
pub use ast::{AstKind, AstNode, SortDirection, Span, TextValue};
pub use context::{SearchContext, VaultSnapshot};
pub use evaluate::Evaluator;
pub use fields::{is_sensitive_path, searchable_fields, SearchableField, SENSITIVE_FIELD_PATHS};
pub use highlight::derive_highlight_terms;
pub use matcher::{filter_items, FilterResult, SearchQuery};
pub use parser::{parse_query, ParseResult};
pub use token::{tokenize, Token, TokenKind};
pub use website::uri_matches;
