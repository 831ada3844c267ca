//! Structured filters and their query-text form.
//!
//! A [`BasicFilter`] is what a sidebar of checkboxes can express: a set of
//! vaults, folders and types (any of which may match) and a set of
//! collections and fields (all of which must match). It converts to query
//! text and back; text outside that shape is rejected.

use serde::{Deserialize, Serialize};

use crate::error::{QueryError, Result};
use crate::query::{parse_query, AstKind, AstNode};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BasicFilter {
    /// `None` is the personal vault; `Some(name)` an organization.
    pub vaults: Vec<Option<String>>,
    pub folders: Vec<String>,
    pub collections: Vec<String>,
    pub types: Vec<String>,
    pub fields: Vec<String>,
}

impl BasicFilter {
    pub fn is_empty(&self) -> bool {
        self.vaults.is_empty()
            && self.folders.is_empty()
            && self.collections.is_empty()
            && self.types.is_empty()
            && self.fields.is_empty()
    }

    /// Query text selecting the same items. An empty filter gives `""`.
    pub fn to_text(&self) -> String {
        let vaults = self
            .vaults
            .iter()
            .map(|vault| match vault {
                None => "in:my_vault".to_string(),
                Some(name) => format!("in:org:{}", quote(name)),
            })
            .collect::<Vec<_>>();
        let folders = predicates("in:folder:", &self.folders);
        let collections = predicates("in:collection:", &self.collections);
        let types = predicates("type:", &self.types);
        let fields = predicates("field:", &self.fields);

        [
            group(&vaults, " OR "),
            group(&folders, " OR "),
            group(&collections, " AND "),
            group(&types, " OR "),
            group(&fields, " AND "),
        ]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" AND ")
    }

    /// Reads query text back into a filter.
    ///
    /// Blank text is the empty filter. Otherwise every top-level conjunct
    /// must be an `OR` of vault, folder or type predicates (each category
    /// at most once) or an `AND` of collection predicates or `field:` terms.
    pub fn from_text(text: &str) -> Result<Self> {
        let mut filter = Self::default();
        if text.trim().is_empty() {
            return Ok(filter);
        }

        let ast = parse_query(text)?;
        let root = match &ast.kind {
            AstKind::Search(inner) => inner.as_ref(),
            _ => &ast,
        };

        let mut conjuncts = Vec::new();
        flatten_and(root, &mut conjuncts);

        let mut seen = Vec::new();
        for conjunct in conjuncts {
            let source = &text[conjunct.span.start..conjunct.span.end];
            let node = strip_parentheses(conjunct);

            let mut nodes = Vec::new();
            let joiner = match &node.kind {
                AstKind::Or(..) => {
                    flatten_or(node, &mut nodes);
                    Joiner::Or
                }
                AstKind::And(..) => {
                    flatten_and_grouped(node, &mut nodes);
                    Joiner::And
                }
                _ => {
                    nodes.push(node);
                    Joiner::Single
                }
            };

            let atoms = nodes
                .into_iter()
                .map(classify)
                .collect::<Option<Vec<_>>>()
                .ok_or_else(|| not_representable(source, "unsupported predicate"))?;
            let Some(category) = atoms.first().map(Atom::category) else {
                return Err(not_representable(source, "empty group"));
            };
            if atoms.iter().any(|atom| atom.category() != category) {
                return Err(not_representable(source, "mixed predicates in one group"));
            }

            match (category.repeats(), joiner) {
                (false, Joiner::And) => {
                    return Err(not_representable(source, "these predicates combine with OR"))
                }
                (true, Joiner::Or) => {
                    return Err(not_representable(source, "these predicates combine with AND"))
                }
                (false, _) if seen.contains(&category) => {
                    return Err(not_representable(source, "category appears more than once"))
                }
                _ => seen.push(category),
            }

            for atom in atoms {
                match atom {
                    Atom::Vault(vault) => filter.vaults.push(vault),
                    Atom::Folder(name) => filter.folders.push(name),
                    Atom::Collection(name) => filter.collections.push(name),
                    Atom::Type(name) => filter.types.push(name),
                    Atom::Field(name) => filter.fields.push(name),
                }
            }
        }

        Ok(filter)
    }
}

fn quote(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{escaped}\"")
}

fn predicates(prefix: &str, values: &[String]) -> Vec<String> {
    values
        .iter()
        .map(|value| format!("{prefix}{}", quote(value)))
        .collect()
}

fn group(parts: &[String], separator: &str) -> Option<String> {
    (!parts.is_empty()).then(|| format!("({})", parts.join(separator)))
}

fn not_representable(source: &str, reason: &str) -> QueryError {
    QueryError::NotRepresentable(format!("{reason}: {source}"))
}

// ---------------------------------------------------------------------------
// Shape analysis
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Joiner {
    Single,
    Or,
    And,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Category {
    Vaults,
    Folders,
    Collections,
    Types,
    Fields,
}

impl Category {
    /// Categories joined by AND may be split across several conjuncts.
    fn repeats(self) -> bool {
        matches!(self, Self::Collections | Self::Fields)
    }
}

enum Atom {
    Vault(Option<String>),
    Folder(String),
    Collection(String),
    Type(String),
    Field(String),
}

impl Atom {
    fn category(&self) -> Category {
        match self {
            Self::Vault(_) => Category::Vaults,
            Self::Folder(_) => Category::Folders,
            Self::Collection(_) => Category::Collections,
            Self::Type(_) => Category::Types,
            Self::Field(_) => Category::Fields,
        }
    }
}

fn classify(node: &AstNode) -> Option<Atom> {
    match &strip_parentheses(node).kind {
        AstKind::InMyVault => Some(Atom::Vault(None)),
        AstKind::InOrg { org } => Some(Atom::Vault(Some(org.clone()))),
        AstKind::InFolder { folder } => Some(Atom::Folder(folder.clone())),
        AstKind::InCollection { collection } => Some(Atom::Collection(collection.clone())),
        AstKind::Type { cipher_type } => Some(Atom::Type(cipher_type.clone())),
        AstKind::Field { name } => Some(Atom::Field(name.clone())),
        _ => None,
    }
}

fn strip_parentheses(mut node: &AstNode) -> &AstNode {
    while let AstKind::Parentheses(inner) = &node.kind {
        node = inner.as_ref();
    }
    node
}

/// Top-level conjuncts. Parenthesized groups stay whole.
fn flatten_and<'n>(node: &'n AstNode, out: &mut Vec<&'n AstNode>) {
    match &node.kind {
        AstKind::And(left, right) => {
            flatten_and(left, out);
            flatten_and(right, out);
        }
        _ => out.push(node),
    }
}

fn flatten_and_grouped<'n>(node: &'n AstNode, out: &mut Vec<&'n AstNode>) {
    match &strip_parentheses(node).kind {
        AstKind::And(left, right) => {
            flatten_and_grouped(left, out);
            flatten_and_grouped(right, out);
        }
        _ => out.push(node),
    }
}

fn flatten_or<'n>(node: &'n AstNode, out: &mut Vec<&'n AstNode>) {
    match &strip_parentheses(node).kind {
        AstKind::Or(left, right) => {
            flatten_or(left, out);
            flatten_or(right, out);
        }
        _ => out.push(node),
    }
}
