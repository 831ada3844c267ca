//! Query state for a search box that is edited one keystroke at a time.
//!
//! Half-typed text (`has:uri AND (`) is usually unparsable. The session keeps
//! running the last query that did parse so results do not flicker away.

use crate::error::QueryError;
use crate::options::SearchOptions;
use crate::query::{FilterResult, SearchQuery, VaultSnapshot};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryState {
    /// The text parsed and is now the active query.
    Valid,
    /// The text was blank; every item matches.
    Cleared,
    /// The text did not parse; the previous query stays active.
    Invalid(QueryError),
}

#[derive(Debug, Clone, Default)]
pub struct QuerySession {
    active: Option<SearchQuery>,
    last_error: Option<QueryError>,
}

impl QuerySession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, text: &str) -> QueryState {
        match SearchQuery::compile(text) {
            Ok(query) if query.is_empty() => {
                self.active = None;
                self.last_error = None;
                QueryState::Cleared
            }
            Ok(query) => {
                self.active = Some(query);
                self.last_error = None;
                QueryState::Valid
            }
            Err(error) => {
                log::debug!("keeping previous query: {}", error);
                self.last_error = Some(error.clone());
                QueryState::Invalid(error)
            }
        }
    }

    /// The query results are computed from.
    pub fn active(&self) -> Option<&SearchQuery> {
        self.active.as_ref()
    }

    /// Error from the most recent update, if it failed.
    pub fn last_error(&self) -> Option<&QueryError> {
        self.last_error.as_ref()
    }

    pub fn highlight_terms(&self) -> Vec<String> {
        self.active
            .as_ref()
            .map(SearchQuery::highlight_terms)
            .unwrap_or_default()
    }

    /// Runs the active query. Never returns `Invalid`: a failed update leaves
    /// the previous query in charge.
    pub fn filter<'a>(
        &self,
        snapshot: &'a VaultSnapshot,
        options: &SearchOptions,
    ) -> FilterResult<'a> {
        let context = snapshot.context();
        match &self.active {
            Some(query) => FilterResult::Matched {
                ast: query.ast().cloned(),
                items: query.evaluate(&context, options).items,
            },
            None => FilterResult::Matched {
                ast: None,
                items: context.items,
            },
        }
    }
}
