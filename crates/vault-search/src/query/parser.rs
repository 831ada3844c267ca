//! Query parser.
//!
//! Recursive descent over the token stream, loosest to tightest:
//!
//! ```text
//! query   := or
//! or      := and ("OR" and)*
//! and     := not (("AND" | <adjacent>) not)*
//! not     := "NOT" group | group
//! group   := "(" or ")" | atom
//! atom    := function | value (":" value)*
//! ```
//!
//! Binary chains fold to the left and each rule commits to the first
//! alternative that fits, so every input has exactly one derivation.

use crate::error::{QueryError, Result};

use super::ast::{normalize, AstNode, Span, TextValue};
use super::token::{tokenize, Token, TokenKind};

pub type ParseResult = std::result::Result<AstNode, QueryError>;

/// Parses query text into a typed AST rooted at a `Search` node.
pub fn parse_query(input: &str) -> ParseResult {
    log::debug!("parsing query of {} bytes", input.len());

    let tokens = tokenize(input);
    let raw = QueryParser::new(tokens, input.len()).parse()?;
    let ast = normalize(raw)?;

    log::debug!("parsed query into {} nodes", ast.node_count());
    Ok(ast)
}

// ---------------------------------------------------------------------------
// Raw parse tree
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub(crate) struct RawNode {
    pub kind: RawKind,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub(crate) enum RawKind {
    Or(Box<RawNode>, Box<RawNode>),
    And(Box<RawNode>, Box<RawNode>),
    Not(Box<RawNode>),
    Group(Box<RawNode>),
    Text(TextValue),
    /// `a:b`, or `a:b:c` for three-part predicates.
    Qualified(Vec<TextValue>),
    /// `has:`, `in:` or `is:` followed by its colon-separated arguments.
    Function {
        prefix: TokenKind,
        args: Vec<TextValue>,
    },
}

impl RawNode {
    fn binary(make: fn(Box<RawNode>, Box<RawNode>) -> RawKind, left: Self, right: Self) -> Self {
        let span = Span::new(left.span.start, right.span.end);
        Self {
            kind: make(Box::new(left), Box::new(right)),
            span,
        }
    }
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

struct QueryParser<'a> {
    tokens: Vec<Token<'a>>,
    index: usize,
    input_len: usize,
}

impl<'a> QueryParser<'a> {
    fn new(tokens: Vec<Token<'a>>, input_len: usize) -> Self {
        Self {
            tokens,
            index: 0,
            input_len,
        }
    }

    fn parse(mut self) -> Result<RawNode> {
        self.skip_whitespace();
        if self.is_end() {
            return Err(QueryError::parse("query is empty", 0));
        }

        let expression = self.parse_or_expression()?;
        self.skip_whitespace();
        if let Some(token) = self.peek() {
            return Err(QueryError::parse(
                format!("unexpected '{}'", token.text),
                token.offset,
            ));
        }

        Ok(expression)
    }

    fn parse_or_expression(&mut self) -> Result<RawNode> {
        let mut left = self.parse_and_expression()?;
        while self.consume_keyword(TokenKind::Or) {
            let right = self.parse_and_expression()?;
            left = RawNode::binary(RawKind::Or, left, right);
        }
        Ok(left)
    }

    fn parse_and_expression(&mut self) -> Result<RawNode> {
        let mut left = self.parse_not_expression()?;
        loop {
            // An explicit AND and plain adjacency build the same node.
            if !self.consume_keyword(TokenKind::And) && !self.next_starts_operand() {
                break;
            }
            let right = self.parse_not_expression()?;
            left = RawNode::binary(RawKind::And, left, right);
        }
        Ok(left)
    }

    fn parse_not_expression(&mut self) -> Result<RawNode> {
        self.skip_whitespace();
        let Some(token) = self.peek().copied() else {
            return Err(self.unexpected_end("expected a term"));
        };
        if token.kind != TokenKind::Not {
            return self.parse_group_expression();
        }

        self.index += 1;
        self.skip_whitespace();
        if matches!(self.peek().map(|next| next.kind), Some(TokenKind::Not)) {
            let position = self.peek().map(|next| next.offset).unwrap_or(self.input_len);
            return Err(QueryError::parse(
                "NOT must be followed by a term or a parenthesized group",
                position,
            ));
        }
        let operand = self.parse_group_expression()?;
        let span = Span::new(token.offset, operand.span.end);
        Ok(RawNode {
            kind: RawKind::Not(Box::new(operand)),
            span,
        })
    }

    fn parse_group_expression(&mut self) -> Result<RawNode> {
        self.skip_whitespace();
        let Some(token) = self.peek().copied() else {
            return Err(self.unexpected_end("expected a term"));
        };

        match token.kind {
            TokenKind::LParen => {
                self.index += 1;
                self.skip_whitespace();
                if let Some(close) = self.peek().filter(|next| next.kind == TokenKind::RParen) {
                    return Err(QueryError::parse("empty parentheses", close.offset));
                }

                let inner = self.parse_or_expression()?;
                self.skip_whitespace();
                match self.peek().copied() {
                    Some(close) if close.kind == TokenKind::RParen => {
                        self.index += 1;
                        Ok(RawNode {
                            kind: RawKind::Group(Box::new(inner)),
                            span: Span::new(token.offset, close.end()),
                        })
                    }
                    Some(other) => Err(QueryError::parse(
                        format!("expected ')' but found '{}'", other.text),
                        other.offset,
                    )),
                    None => Err(self.unexpected_end("missing closing ')'")),
                }
            }
            TokenKind::Literal | TokenKind::Quoted => self.parse_value_atom(),
            TokenKind::Has | TokenKind::In | TokenKind::Is => self.parse_function_atom(),
            _ => Err(QueryError::parse(
                format!("unexpected '{}'", token.text),
                token.offset,
            )),
        }
    }

    fn parse_value_atom(&mut self) -> Result<RawNode> {
        let Some(first) = self.next() else {
            return Err(self.unexpected_end("expected a term"));
        };
        let mut parts = vec![first.text_value()];
        let end = self.parse_qualifiers(&mut parts, first.end())?;
        let span = Span::new(first.offset, end);

        let kind = if parts.len() == 1 {
            RawKind::Text(parts.remove(0))
        } else {
            RawKind::Qualified(parts)
        };
        Ok(RawNode { kind, span })
    }

    fn parse_function_atom(&mut self) -> Result<RawNode> {
        let Some(prefix) = self.next() else {
            return Err(self.unexpected_end("expected a predicate"));
        };
        let name = match self.next() {
            Some(token) if token.kind == TokenKind::Literal => token,
            Some(token) => {
                return Err(QueryError::parse(
                    format!("expected a name after '{}'", prefix.text),
                    token.offset,
                ))
            }
            None => {
                return Err(self.unexpected_end(&format!("expected a name after '{}'", prefix.text)))
            }
        };

        let mut args = vec![name.text_value()];
        let end = self.parse_qualifiers(&mut args, name.end())?;
        Ok(RawNode {
            kind: RawKind::Function {
                prefix: prefix.kind,
                args,
            },
            span: Span::new(prefix.offset, end),
        })
    }

    /// Consumes `:value` pairs glued to the previous token. Returns the end
    /// offset of the last consumed value.
    fn parse_qualifiers(&mut self, parts: &mut Vec<TextValue>, mut end: usize) -> Result<usize> {
        while let Some(colon) = self.peek().copied().filter(|t| t.kind == TokenKind::Colon) {
            self.index += 1;
            match self.peek().copied() {
                Some(value) if value.kind.is_value() => {
                    self.index += 1;
                    parts.push(value.text_value());
                    end = value.end();
                }
                _ => {
                    return Err(QueryError::parse(
                        "expected a value after ':'",
                        colon.offset,
                    ))
                }
            }
        }
        Ok(end)
    }

    fn next_starts_operand(&self) -> bool {
        let mut index = self.index;
        while let Some(token) = self.tokens.get(index) {
            if token.kind != TokenKind::Whitespace {
                return token.kind.is_value()
                    || token.kind.is_function_prefix()
                    || matches!(token.kind, TokenKind::LParen | TokenKind::Not);
            }
            index += 1;
        }
        false
    }

    fn consume_keyword(&mut self, keyword: TokenKind) -> bool {
        let checkpoint = self.index;
        self.skip_whitespace();
        if matches!(self.peek().map(|token| token.kind), Some(kind) if kind == keyword) {
            self.index += 1;
            return true;
        }
        self.index = checkpoint;
        false
    }

    fn skip_whitespace(&mut self) {
        while matches!(
            self.peek().map(|token| token.kind),
            Some(TokenKind::Whitespace)
        ) {
            self.index += 1;
        }
    }

    fn unexpected_end(&self, message: &str) -> QueryError {
        QueryError::parse(format!("{message} but reached end of query"), self.input_len)
    }

    fn is_end(&self) -> bool {
        self.index >= self.tokens.len()
    }

    fn peek(&self) -> Option<&Token<'a>> {
        self.tokens.get(self.index)
    }

    fn next(&mut self) -> Option<Token<'a>> {
        let token = self.tokens.get(self.index).copied()?;
        self.index += 1;
        Some(token)
    }
}
