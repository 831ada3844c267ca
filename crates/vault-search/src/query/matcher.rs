//! Compiled queries and the text-to-results pipeline.

use crate::error::{QueryError, Result};
use crate::options::SearchOptions;
use crate::types::CipherView;

use super::ast::AstNode;
use super::context::{SearchContext, VaultSnapshot};
use super::evaluate::Evaluator;
use super::highlight::derive_highlight_terms;
use super::parser::parse_query;

/// A parsed query ready to run against any snapshot.
///
/// Blank text compiles to a query without a tree, which keeps every item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    text: String,
    ast: Option<AstNode>,
}

impl SearchQuery {
    pub fn compile(text: &str) -> Result<Self> {
        let ast = if text.trim().is_empty() {
            None
        } else {
            Some(parse_query(text)?)
        };
        Ok(Self {
            text: text.to_string(),
            ast,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn ast(&self) -> Option<&AstNode> {
        self.ast.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.ast.is_none()
    }

    pub fn highlight_terms(&self) -> Vec<String> {
        self.ast
            .as_ref()
            .map(derive_highlight_terms)
            .unwrap_or_default()
    }

    pub fn evaluate<'a>(
        &self,
        context: &SearchContext<'a>,
        options: &SearchOptions,
    ) -> SearchContext<'a> {
        let Some(ast) = &self.ast else {
            return context.clone();
        };
        let result = Evaluator::new(options).evaluate(ast, context);
        log::debug!(
            "query matched {} of {} items",
            result.len(),
            context.len()
        );
        result
    }
}

/// Outcome of running query text against a snapshot.
#[derive(Debug, Clone)]
pub enum FilterResult<'a> {
    Matched {
        ast: Option<AstNode>,
        items: Vec<&'a CipherView>,
    },
    Invalid {
        error: QueryError,
    },
}

impl<'a> FilterResult<'a> {
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Invalid { .. })
    }

    /// Matching items; empty for an invalid query.
    pub fn items(&self) -> &[&'a CipherView] {
        match self {
            Self::Matched { items, .. } => items,
            Self::Invalid { .. } => &[],
        }
    }

    pub fn error(&self) -> Option<&QueryError> {
        match self {
            Self::Matched { .. } => None,
            Self::Invalid { error } => Some(error),
        }
    }
}

/// Parses `text` and evaluates it over the whole snapshot.
pub fn filter_items<'a>(
    text: &str,
    snapshot: &'a VaultSnapshot,
    options: &SearchOptions,
) -> FilterResult<'a> {
    match SearchQuery::compile(text) {
        Ok(query) => {
            let items = query.evaluate(&snapshot.context(), options).items;
            FilterResult::Matched {
                ast: query.ast,
                items,
            }
        }
        Err(error) => {
            log::debug!("rejecting query: {}", error);
            FilterResult::Invalid { error }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LoginView;

    fn snapshot() -> VaultSnapshot {
        let items = [("1", "Bank", "jane"), ("2", "Mail", "sam")]
            .into_iter()
            .map(|(id, name, username)| CipherView {
                id: id.to_string(),
                name: name.to_string(),
                login: Some(LoginView {
                    username: Some(username.to_string()),
                    password: Some("hunter2".to_string()),
                    ..LoginView::default()
                }),
                ..CipherView::default()
            })
            .collect();
        VaultSnapshot {
            items,
            ..VaultSnapshot::default()
        }
    }

    fn ids(result: &FilterResult<'_>) -> Vec<String> {
        result.items().iter().map(|item| item.id.clone()).collect()
    }

    #[test]
    fn blank_text_keeps_every_item() {
        let snapshot = snapshot();
        let result = filter_items("   ", &snapshot, &SearchOptions::default());
        assert!(!result.is_error());
        assert_eq!(ids(&result), vec!["1", "2"]);
        assert!(matches!(result, FilterResult::Matched { ast: None, .. }));
    }

    #[test]
    fn matched_results_carry_the_tree() {
        let snapshot = snapshot();
        let result = filter_items("sam", &snapshot, &SearchOptions::default());
        assert_eq!(ids(&result), vec!["2"]);
        let FilterResult::Matched { ast: Some(ast), .. } = &result else {
            panic!("expected a parsed tree");
        };
        assert_eq!(ast.to_string(), "Search(Term(sam))");
    }

    #[test]
    fn unparsable_text_is_invalid() {
        let snapshot = snapshot();
        let result = filter_items("(jane", &snapshot, &SearchOptions::default());
        assert!(result.is_error());
        assert!(result.items().is_empty());
        assert!(matches!(result.error(), Some(QueryError::Parse { .. })));
    }

    #[test]
    fn compiled_queries_are_reusable() {
        let query = SearchQuery::compile("Bank OR sam").expect("compile");
        assert_eq!(query.text(), "Bank OR sam");
        assert_eq!(query.highlight_terms(), vec!["bank", "sam"]);

        let snapshot = snapshot();
        let options = SearchOptions::default();
        assert_eq!(query.evaluate(&snapshot.context(), &options).ids(), vec!["1", "2"]);
        assert!(SearchQuery::compile("").expect("blank").is_empty());
    }
}
