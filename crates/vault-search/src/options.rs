//! Tunables for query evaluation.

use serde::{Deserialize, Serialize};

use crate::error::{QueryError, Result};
use crate::types::UriMatchStrategy;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SearchOptions {
    /// Drop repeated items from `OR` results, keeping the first occurrence.
    /// When off, both sides are simply concatenated.
    pub deduplicate_unions: bool,
    /// Strategy for login URIs that do not carry their own.
    pub default_uri_match: UriMatchStrategy,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            deduplicate_unions: true,
            default_uri_match: UriMatchStrategy::Domain,
        }
    }
}

impl SearchOptions {
    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|e| QueryError::InvalidOptions(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_deduplicate_and_match_domains() {
        let options = SearchOptions::default();
        assert!(options.deduplicate_unions);
        assert_eq!(options.default_uri_match, UriMatchStrategy::Domain);
    }

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let options = SearchOptions::from_json(r#"{"defaultUriMatch": "host"}"#).expect("parse");
        assert!(options.deduplicate_unions);
        assert_eq!(options.default_uri_match, UriMatchStrategy::Host);
    }

    #[test]
    fn reads_all_keys() {
        let options = SearchOptions::from_json(
            r#"{"deduplicateUnions": false, "defaultUriMatch": "starts_with"}"#,
        )
        .expect("parse");
        assert!(!options.deduplicate_unions);
        assert_eq!(options.default_uri_match, UriMatchStrategy::StartsWith);
    }

    #[test]
    fn malformed_json_is_an_options_error() {
        let result = SearchOptions::from_json(r#"{"defaultUriMatch": "sometimes"}"#);
        assert!(matches!(result, Err(QueryError::InvalidOptions(_))));
    }
}
