//! Boolean search over a decrypted credential vault.
//!
//! This crate provides:
//! - A small query language (`has:uri AND NOT in:folder:"Old"`) with a
//!   tokenizer, parser and typed AST
//! - An evaluator that narrows a vault snapshot without matching secrets
//! - Translation between structured filters and query text
//! - A live session that keeps the last valid query while text is edited

pub mod basic_filter;
pub mod error;
pub mod options;
pub mod query;
pub mod session;
pub mod types;

// Re-export main types
pub use basic_filter::BasicFilter;
pub use error::{QueryError, Result};
pub use options::SearchOptions;
pub use query::{
    filter_items, parse_query, AstKind, AstNode, FilterResult, ParseResult, SearchContext,
    SearchQuery, VaultSnapshot,
};
pub use session::{QuerySession, QueryState};
pub use types::{
    CipherType, CipherView, CollectionView, FolderView, Organization, UriMatchStrategy,
};
