//! Highlight term extraction for search results.
//!
//! Collects the literal text a result view should mark: bare terms, the
//! value side of field terms and website values. Negated subtrees and
//! structural predicates (`has:`, `in:`, `type:`, ...) contribute nothing.
//! Terms are lowercased and come back sorted and deduplicated.

use std::collections::BTreeSet;

use super::ast::{AstKind, AstNode};

pub fn derive_highlight_terms(ast: &AstNode) -> Vec<String> {
    let mut collector = HighlightCollector::default();
    collector.collect_node(ast);
    collector.into_terms()
}

#[derive(Default)]
struct HighlightCollector {
    terms: BTreeSet<String>,
}

impl HighlightCollector {
    fn collect_node(&mut self, node: &AstNode) {
        match &node.kind {
            AstKind::Search(inner) | AstKind::Parentheses(inner) => self.collect_node(inner),
            AstKind::Or(left, right) | AstKind::And(left, right) => {
                self.collect_node(left);
                self.collect_node(right);
            }
            // Negated text never appears in the results.
            AstKind::Not(_) => {}
            AstKind::Term { value } => self.push(&value.text),
            AstKind::FieldTerm { term, .. } => self.push(&term.text),
            AstKind::Website { value } | AstKind::WebsiteMatch { value, .. } => self.push(value),
            AstKind::HasAttachment
            | AstKind::HasUri
            | AstKind::HasFolder
            | AstKind::HasCollection
            | AstKind::InFolder { .. }
            | AstKind::InCollection { .. }
            | AstKind::InOrg { .. }
            | AstKind::InMyVault
            | AstKind::InTrash
            | AstKind::IsFavorite
            | AstKind::Type { .. }
            | AstKind::Field { .. }
            | AstKind::OrderBy { .. } => {}
        }
    }

    fn push(&mut self, value: &str) {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return;
        }
        self.terms.insert(trimmed.to_lowercase());
    }

    fn into_terms(self) -> Vec<String> {
        self.terms.into_iter().collect()
    }
}
