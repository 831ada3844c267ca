//! Query evaluation against a search context.
//!
//! Each node narrows the context it is given. Names that do not resolve to a
//! folder, collection, organization or item type narrow to nothing.

use std::cmp::Ordering;
use std::collections::HashSet;

use crate::options::SearchOptions;
use crate::types::{CipherType, CipherView, UriMatchStrategy};

use super::ast::{AstKind, AstNode, SortDirection, TextValue};
use super::context::SearchContext;
use super::fields::searchable_fields;
use super::text_match::{field_name_matches, TextNeedle};
use super::website::uri_matches;

/// Runs a query tree against a [`SearchContext`] under the given options.
pub struct Evaluator<'o> {
    options: &'o SearchOptions,
}

impl<'o> Evaluator<'o> {
    /// Evaluator bound to `options`.
    pub fn new(options: &'o SearchOptions) -> Self {
        Self { options }
    }

    /// Returns the subset of `context` selected by `node`.
    pub fn evaluate<'a>(&self, node: &AstNode, context: &SearchContext<'a>) -> SearchContext<'a> {
        let result = match &node.kind {
            AstKind::Search(inner) | AstKind::Parentheses(inner) => self.evaluate(inner, context),
            AstKind::Or(left, right) => {
                let left = self.evaluate(left, context);
                let right = self.evaluate(right, context);
                self.union(context, left, right)
            }
            AstKind::And(left, right) => {
                let left = self.evaluate(left, context);
                self.evaluate(right, &left)
            }
            AstKind::Not(inner) => {
                let excluded = self.evaluate(inner, context);
                let excluded = excluded.ids().into_iter().collect::<HashSet<_>>();
                context.filter(|item| !excluded.contains(item.id.as_str()))
            }
            AstKind::Term { value } => {
                let needle = TextNeedle::new(value);
                context.filter(|item| term_matches(item, &needle))
            }
            AstKind::FieldTerm { field, term } => {
                let needle = TextNeedle::new(term);
                context.filter(|item| field_term_matches(item, field, &needle))
            }
            AstKind::HasAttachment => context.filter(|item| !item.attachments.is_empty()),
            AstKind::HasUri => context.filter(|item| !item.login_uris().is_empty()),
            AstKind::HasFolder => context.filter(|item| item.folder_id.is_some()),
            AstKind::HasCollection => context.filter(|item| !item.collection_ids.is_empty()),
            AstKind::InFolder { folder } => match context.folder_id(folder) {
                Some(id) => context.filter(|item| item.folder_id.as_deref() == Some(id)),
                None => context.narrow(Vec::new()),
            },
            AstKind::InCollection { collection } => match context.collection_id(collection) {
                Some(id) => context.filter(|item| item.collection_ids.iter().any(|c| c == id)),
                None => context.narrow(Vec::new()),
            },
            AstKind::InOrg { org } => match context.organization_id(org) {
                Some(id) => context.filter(|item| item.organization_id.as_deref() == Some(id)),
                None => context.narrow(Vec::new()),
            },
            AstKind::InMyVault => context.filter(|item| item.organization_id.is_none()),
            AstKind::InTrash => context.filter(|item| item.deleted_date.is_some()),
            AstKind::IsFavorite => context.filter(|item| item.favorite),
            AstKind::Type { cipher_type } => match CipherType::from_name(cipher_type) {
                Some(wanted) => context.filter(|item| item.cipher_type == wanted),
                None => context.narrow(Vec::new()),
            },
            AstKind::Field { name } => context.filter(|item| {
                item.fields.iter().any(|field| {
                    field
                        .name
                        .as_deref()
                        .is_some_and(|field_name| field_name_matches(name, field_name))
                })
            }),
            AstKind::Website { value } => context.filter(|item| self.website_matches(item, value, None)),
            AstKind::WebsiteMatch { value, match_type } => {
                context.filter(|item| self.website_matches(item, value, Some(*match_type)))
            }
            AstKind::OrderBy { field, direction } => order_by(context, field, *direction),
        };

        log::trace!(
            "{:?} narrowed {} items to {}",
            node.span,
            context.len(),
            result.len()
        );
        result
    }

    fn union<'a>(
        &self,
        context: &SearchContext<'a>,
        left: SearchContext<'a>,
        right: SearchContext<'a>,
    ) -> SearchContext<'a> {
        let mut items = left.items;
        if self.options.deduplicate_unions {
            let mut seen = items
                .iter()
                .map(|item| item.id.as_str())
                .collect::<HashSet<_>>();
            items.extend(
                right
                    .items
                    .into_iter()
                    .filter(|item| seen.insert(item.id.as_str())),
            );
        } else {
            items.extend(right.items);
        }
        context.narrow(items)
    }

    fn website_matches(
        &self,
        item: &CipherView,
        website: &str,
        strategy: Option<UriMatchStrategy>,
    ) -> bool {
        item.login_uris().iter().any(|login_uri| {
            let Some(uri) = login_uri.uri.as_deref() else {
                return false;
            };
            let strategy = strategy
                .or(login_uri.match_type)
                .unwrap_or(self.options.default_uri_match);
            uri_matches(uri, website, strategy)
        })
    }
}

fn term_matches(item: &CipherView, needle: &TextNeedle) -> bool {
    if needle.is_empty() {
        return true;
    }
    searchable_fields(item)
        .iter()
        .any(|field| needle.matches(&field.value))
}

fn field_term_matches(item: &CipherView, field: &TextValue, needle: &TextNeedle) -> bool {
    searchable_fields(item)
        .iter()
        .filter(|candidate| field_name_matches(&field.text, &candidate.name))
        .any(|candidate| needle.matches(&candidate.value))
}

/// Stable sort on the first value of `field`; items without it go last in
/// either direction.
fn order_by<'a>(
    context: &SearchContext<'a>,
    field: &str,
    direction: SortDirection,
) -> SearchContext<'a> {
    let mut keyed = context
        .items
        .iter()
        .map(|item| {
            let key = searchable_fields(item)
                .into_iter()
                .find(|candidate| field_name_matches(field, &candidate.name))
                .map(|candidate| candidate.value.to_lowercase());
            (key, *item)
        })
        .collect::<Vec<_>>();

    keyed.sort_by(|(left, _), (right, _)| match (left, right) {
        (Some(left), Some(right)) => match direction {
            SortDirection::Ascending => left.cmp(right),
            SortDirection::Descending => right.cmp(left),
        },
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });

    context.narrow(keyed.into_iter().map(|(_, item)| item).collect())
}
