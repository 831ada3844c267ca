//! Typed query tree.
//!
//! The parser produces a loose tree of values and qualified values;
//! [`normalize`] maps it onto the closed vocabulary below and rejects
//! predicates it does not know.

use std::fmt;

use crate::error::{QueryError, Result};
use crate::types::UriMatchStrategy;

use super::parser::{RawKind, RawNode};
use super::token::TokenKind;

/// Byte range of a node in the query text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn length(&self) -> usize {
        self.end - self.start
    }
}

/// A literal from the query, unescaped. `quoted` records whether it was
/// written in double quotes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextValue {
    pub text: String,
    pub quoted: bool,
}

impl TextValue {
    pub fn plain(text: &str) -> Self {
        Self {
            text: text.to_string(),
            quoted: false,
        }
    }

    pub fn quoted(text: String) -> Self {
        Self { text, quoted: true }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Some(Self::Ascending),
            "desc" | "descending" => Some(Self::Descending),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ascending => "asc",
            Self::Descending => "desc",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AstNode {
    pub kind: AstKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AstKind {
    /// Root of every parsed query.
    Search(Box<AstNode>),
    Or(Box<AstNode>, Box<AstNode>),
    And(Box<AstNode>, Box<AstNode>),
    Not(Box<AstNode>),
    Parentheses(Box<AstNode>),
    Term {
        value: TextValue,
    },
    FieldTerm {
        field: TextValue,
        term: TextValue,
    },
    HasAttachment,
    HasUri,
    HasFolder,
    HasCollection,
    InFolder {
        folder: String,
    },
    InCollection {
        collection: String,
    },
    InOrg {
        org: String,
    },
    InMyVault,
    InTrash,
    IsFavorite,
    Type {
        cipher_type: String,
    },
    /// `field:<name>`: the item has a custom field with that name.
    Field {
        name: String,
    },
    Website {
        value: String,
    },
    WebsiteMatch {
        value: String,
        match_type: UriMatchStrategy,
    },
    OrderBy {
        field: String,
        direction: SortDirection,
    },
}

impl AstNode {
    fn new(kind: AstKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn span(&self) -> Span {
        self.span
    }

    /// Direct children, left to right.
    pub fn children(&self) -> Vec<&AstNode> {
        match &self.kind {
            AstKind::Search(inner) | AstKind::Not(inner) | AstKind::Parentheses(inner) => {
                vec![inner.as_ref()]
            }
            AstKind::Or(left, right) | AstKind::And(left, right) => {
                vec![left.as_ref(), right.as_ref()]
            }
            _ => Vec::new(),
        }
    }

    pub fn node_count(&self) -> usize {
        1 + self
            .children()
            .into_iter()
            .map(AstNode::node_count)
            .sum::<usize>()
    }
}

impl fmt::Display for TextValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.quoted {
            write!(f, "\"{}\"", self.text)
        } else {
            f.write_str(&self.text)
        }
    }
}

impl fmt::Display for AstNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            AstKind::Search(inner) => write!(f, "Search({inner})"),
            AstKind::Or(left, right) => write!(f, "Or({left}, {right})"),
            AstKind::And(left, right) => write!(f, "And({left}, {right})"),
            AstKind::Not(inner) => write!(f, "Not({inner})"),
            AstKind::Parentheses(inner) => write!(f, "Parentheses({inner})"),
            AstKind::Term { value } => write!(f, "Term({value})"),
            AstKind::FieldTerm { field, term } => write!(f, "FieldTerm({field}, {term})"),
            AstKind::HasAttachment => f.write_str("HasAttachment"),
            AstKind::HasUri => f.write_str("HasUri"),
            AstKind::HasFolder => f.write_str("HasFolder"),
            AstKind::HasCollection => f.write_str("HasCollection"),
            AstKind::InFolder { folder } => write!(f, "InFolder({folder})"),
            AstKind::InCollection { collection } => write!(f, "InCollection({collection})"),
            AstKind::InOrg { org } => write!(f, "InOrg({org})"),
            AstKind::InMyVault => f.write_str("InMyVault"),
            AstKind::InTrash => f.write_str("InTrash"),
            AstKind::IsFavorite => f.write_str("IsFavorite"),
            AstKind::Type { cipher_type } => write!(f, "Type({cipher_type})"),
            AstKind::Field { name } => write!(f, "Field({name})"),
            AstKind::Website { value } => write!(f, "Website({value})"),
            AstKind::WebsiteMatch { value, match_type } => {
                write!(f, "WebsiteMatch({value}, {})", match_type.as_str())
            }
            AstKind::OrderBy { field, direction } => {
                write!(f, "OrderBy({field}, {})", direction.as_str())
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Wraps the raw tree in a `Search` root and types every leaf.
pub(crate) fn normalize(raw: RawNode) -> Result<AstNode> {
    let span = raw.span;
    let inner = normalize_node(raw)?;
    Ok(AstNode::new(AstKind::Search(Box::new(inner)), span))
}

fn normalize_node(raw: RawNode) -> Result<AstNode> {
    let span = raw.span;
    let kind = match raw.kind {
        RawKind::Or(left, right) => {
            AstKind::Or(Box::new(normalize_node(*left)?), Box::new(normalize_node(*right)?))
        }
        RawKind::And(left, right) => {
            AstKind::And(Box::new(normalize_node(*left)?), Box::new(normalize_node(*right)?))
        }
        RawKind::Not(inner) => AstKind::Not(Box::new(normalize_node(*inner)?)),
        RawKind::Group(inner) => AstKind::Parentheses(Box::new(normalize_node(*inner)?)),
        RawKind::Text(value) => AstKind::Term { value },
        RawKind::Qualified(parts) => normalize_qualified(parts, span)?,
        RawKind::Function { prefix, args } => normalize_function(prefix, args, span)?,
    };
    Ok(AstNode::new(kind, span))
}

fn is_keyword(part: &TextValue, keyword: &str) -> bool {
    !part.quoted && part.text == keyword
}

fn normalize_qualified(parts: Vec<TextValue>, span: Span) -> Result<AstKind> {
    if parts.len() > 2
        && parts
            .iter()
            .skip(1)
            .any(|part| !part.quoted && part.text.starts_with("//"))
    {
        return Err(QueryError::parse(
            "a URL must be quoted, as in website:\"https://example.com\"",
            span.start,
        ));
    }

    let mut parts = parts.into_iter();
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(field), Some(term), None, None) => Ok(if is_keyword(&field, "type") {
            AstKind::Type {
                cipher_type: term.text,
            }
        } else if is_keyword(&field, "website") {
            AstKind::Website { value: term.text }
        } else if is_keyword(&field, "field") {
            AstKind::Field { name: term.text }
        } else {
            AstKind::FieldTerm { field, term }
        }),
        (Some(head), Some(value), Some(modifier), None) if is_keyword(&head, "website") => {
            let match_type = UriMatchStrategy::from_name(&modifier.text).ok_or_else(|| {
                QueryError::parse(
                    format!("unknown website match type '{}'", modifier.text),
                    span.start,
                )
            })?;
            Ok(AstKind::WebsiteMatch {
                value: value.text,
                match_type,
            })
        }
        (Some(head), Some(field), Some(modifier), None) if is_keyword(&head, "order") => {
            let direction = SortDirection::from_name(&modifier.text).ok_or_else(|| {
                QueryError::parse(
                    format!("unknown sort direction '{}'", modifier.text),
                    span.start,
                )
            })?;
            Ok(AstKind::OrderBy {
                field: field.text,
                direction,
            })
        }
        (Some(head), _, Some(_), _) => Err(QueryError::parse(
            format!("'{}' does not take that many qualifiers", head.text),
            span.start,
        )),
        _ => Err(QueryError::parse("malformed field term", span.start)),
    }
}

fn normalize_function(prefix: TokenKind, args: Vec<TextValue>, span: Span) -> Result<AstKind> {
    let mut args = args.into_iter();
    let Some(name) = args.next() else {
        return Err(QueryError::parse("expected a predicate name", span.start));
    };
    let value = args.next();
    if args.next().is_some() {
        return Err(QueryError::parse(
            format!("too many arguments for '{}'", name.text),
            span.start,
        ));
    }

    let lowered = name.text.to_ascii_lowercase();
    let kind = match (prefix, lowered.as_str(), value) {
        (TokenKind::Has, "attachment", None) => AstKind::HasAttachment,
        (TokenKind::Has, "uri", None) => AstKind::HasUri,
        (TokenKind::Has, "folder", None) => AstKind::HasFolder,
        (TokenKind::Has, "collection", None) => AstKind::HasCollection,
        (TokenKind::Is, "favorite", None) => AstKind::IsFavorite,
        (TokenKind::In, "my_vault", None) => AstKind::InMyVault,
        (TokenKind::In, "trash", None) => AstKind::InTrash,
        (TokenKind::In, "folder", Some(value)) => AstKind::InFolder { folder: value.text },
        (TokenKind::In, "collection", Some(value)) => AstKind::InCollection {
            collection: value.text,
        },
        (TokenKind::In, "org", Some(value)) => AstKind::InOrg { org: value.text },
        (TokenKind::In, "folder" | "collection" | "org", None) => {
            return Err(QueryError::parse(
                format!("in:{lowered} needs a name, as in in:{lowered}:\"Name\""),
                span.end,
            ))
        }
        (_, _, Some(_)) if is_known_flag(prefix, &lowered) => {
            return Err(QueryError::parse(
                format!("'{}' does not take a value", name.text),
                span.start,
            ))
        }
        _ => {
            return Err(QueryError::parse(
                format!("unknown predicate '{}{}'", prefix_text(prefix), name.text),
                span.start,
            ))
        }
    };
    Ok(kind)
}

fn is_known_flag(prefix: TokenKind, name: &str) -> bool {
    matches!(
        (prefix, name),
        (TokenKind::Has, "attachment" | "uri" | "folder" | "collection")
            | (TokenKind::Is, "favorite")
            | (TokenKind::In, "my_vault" | "trash")
    )
}

fn prefix_text(prefix: TokenKind) -> &'static str {
    match prefix {
        TokenKind::Has => "has:",
        TokenKind::In => "in:",
        TokenKind::Is => "is:",
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::super::parser::parse_query;
    use super::*;

    fn root(input: &str) -> AstKind {
        let ast = parse_query(input).expect("parse");
        match ast.kind {
            AstKind::Search(inner) => inner.kind,
            other => panic!("expected a search root, got {other:?}"),
        }
    }

    #[test]
    fn type_and_website_are_reserved_field_names() {
        assert_eq!(
            root(r#"type:"Secure Note""#),
            AstKind::Type {
                cipher_type: "Secure Note".to_string()
            }
        );
        assert_eq!(
            root("website:example.com"),
            AstKind::Website {
                value: "example.com".to_string()
            }
        );
    }

    #[test]
    fn quoted_reserved_names_stay_field_terms() {
        assert!(matches!(root(r#""type":card"#), AstKind::FieldTerm { .. }));
        assert!(matches!(root("Type:card"), AstKind::FieldTerm { .. }));
    }

    #[test]
    fn website_match_carries_its_strategy() {
        assert_eq!(
            root(r#"website:"https://example.com/login":starts_with"#),
            AstKind::WebsiteMatch {
                value: "https://example.com/login".to_string(),
                match_type: UriMatchStrategy::StartsWith,
            }
        );
    }

    #[test]
    fn unquoted_urls_ask_for_quotes() {
        for input in ["website:https://example.com", "website:https://example.com:exact"] {
            let error = parse_query(input).expect_err("url splits on its colon");
            assert!(error.to_string().contains("must be quoted"), "{input}: {error}");
            assert_eq!(error.position(), Some(0));
        }
    }

    #[test]
    fn field_head_names_a_custom_field() {
        assert_eq!(
            root(r#"field:"Banking""#),
            AstKind::Field {
                name: "Banking".to_string()
            }
        );
        assert!(matches!(root(r#""field":Banking"#), AstKind::FieldTerm { .. }));
    }

    #[test]
    fn order_by_accepts_both_directions() {
        assert_eq!(
            root("order:name:desc"),
            AstKind::OrderBy {
                field: "name".to_string(),
                direction: SortDirection::Descending,
            }
        );
        assert_eq!(
            root("order:username:ASC"),
            AstKind::OrderBy {
                field: "username".to_string(),
                direction: SortDirection::Ascending,
            }
        );
    }

    #[test]
    fn bad_qualifiers_are_parse_errors() {
        assert!(parse_query("order:name:sideways").is_err());
        assert!(parse_query("website:example.com:sometimes").is_err());
        assert!(parse_query("a:b:c").is_err());
        assert!(parse_query("order:a:b:c").is_err());
    }

    #[test]
    fn unknown_functions_are_parse_errors() {
        assert!(parse_query("has:password").is_err());
        assert!(parse_query("is:weak").is_err());
        assert!(parse_query("in:closet").is_err());
        assert!(parse_query("has:uri:yes").is_err());
    }

    #[test]
    fn in_predicates_need_a_name() {
        let error = parse_query("in:folder").expect_err("missing name");
        assert_eq!(error.position(), Some("in:folder".len()));
    }

    #[test]
    fn function_names_ignore_case() {
        assert_eq!(root("has:URI"), AstKind::HasUri);
        assert_eq!(root("is:Favorite"), AstKind::IsFavorite);
        assert_eq!(root("in:My_Vault"), AstKind::InMyVault);
    }

    #[test]
    fn uppercase_prefix_is_a_field_term() {
        assert!(matches!(root("HAS:uri"), AstKind::FieldTerm { .. }));
    }

    #[test]
    fn node_count_covers_the_whole_tree() {
        let ast = parse_query("a OR (b NOT c)").expect("parse");
        // Search, Or, a, Parentheses, And, b, Not, c
        assert_eq!(ast.node_count(), 8);
    }
}
