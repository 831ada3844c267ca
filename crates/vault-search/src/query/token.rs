//! Query tokenizer.
//!
//! Every input is representable: any character that is not whitespace, a
//! parenthesis or a colon belongs to a literal run, so lexing cannot fail.
//! Whitespace is kept as a token so spans stay exact.

use logos::Logos;

use super::ast::TextValue;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    #[token("AND")]
    And,
    #[token("OR")]
    Or,
    #[token("NOT")]
    Not,
    #[regex(r"\s+")]
    Whitespace,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("has:")]
    Has,
    #[token("in:")]
    In,
    #[token("is:")]
    Is,
    #[token(":")]
    Colon,
    /// Double-quoted string; `\"` and `\\` are escapes. The closing quote is
    /// optional here so the lexer never has to backtrack; `tokenize` splits
    /// an unterminated match back into a literal.
    #[regex(r#""([^"\\]|\\.)*"?"#, priority = 3)]
    Quoted,
    /// Unquoted run. A stray quote (`"foo`, `foo"`) lands here.
    #[regex(r"[^\s():]+")]
    Literal,
}

impl TokenKind {
    pub fn is_value(self) -> bool {
        matches!(self, Self::Literal | Self::Quoted)
    }

    pub fn is_function_prefix(self) -> bool {
        matches!(self, Self::Has | Self::In | Self::Is)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    /// Byte offset of the token in the query.
    pub offset: usize,
}

impl Token<'_> {
    pub fn end(&self) -> usize {
        self.offset + self.text.len()
    }

    /// Literal value carried by a `Literal` or `Quoted` token.
    pub(crate) fn text_value(&self) -> TextValue {
        match self.kind {
            TokenKind::Quoted => TextValue::quoted(unescape_quoted(self.text)),
            _ => TextValue::plain(self.text),
        }
    }
}

/// Splits query text into tokens that cover it end to end, whitespace
/// included. Never fails.
pub fn tokenize(input: &str) -> Vec<Token<'_>> {
    let mut tokens: Vec<Token<'_>> = Vec::new();
    let mut base = 0usize;

    'restart: while base < input.len() {
        let mut lexer = TokenKind::lexer(&input[base..]);
        while let Some(kind) = lexer.next() {
            let span = lexer.span();
            let start = base + span.start;
            let end = base + span.end;
            let kind = match kind {
                Ok(TokenKind::Quoted) if !is_closed_quote(&input[start..end]) => {
                    // Stray opening quote: it starts an ordinary literal run,
                    // and lexing resumes right after that run.
                    let literal_end = literal_run_end(input, start);
                    tokens.push(Token {
                        kind: TokenKind::Literal,
                        text: &input[start..literal_end],
                        offset: start,
                    });
                    base = literal_end;
                    continue 'restart;
                }
                Ok(kind) => kind,
                // The literal class covers every other character.
                Err(()) => TokenKind::Literal,
            };
            tokens.push(Token {
                kind,
                text: &input[start..end],
                offset: start,
            });
        }
        break;
    }

    tokens
}

fn is_closed_quote(raw: &str) -> bool {
    let Some(body) = raw.strip_prefix('"') else {
        return false;
    };
    let mut escaped = false;
    for ch in body.chars() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' => escaped = true,
            '"' => return true,
            _ => {}
        }
    }
    false
}

fn literal_run_end(input: &str, start: usize) -> usize {
    input[start..]
        .char_indices()
        .find(|(_, ch)| ch.is_whitespace() || matches!(ch, '(' | ')' | ':'))
        .map(|(index, _)| start + index)
        .unwrap_or(input.len())
}

fn unescape_quoted(raw: &str) -> String {
    let inner = raw
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .unwrap_or(raw);
    let mut value = String::with_capacity(inner.len());
    let mut chars = inner.chars();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            value.push(ch);
            continue;
        }
        match chars.next() {
            Some(escaped @ ('"' | '\\')) => value.push(escaped),
            Some(other) => {
                value.push('\\');
                value.push(other);
            }
            None => value.push('\\'),
        }
    }

    value
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        tokenize(input).into_iter().map(|token| token.kind).collect()
    }

    #[test]
    fn keywords_are_uppercase_only() {
        assert_eq!(
            kinds("a AND b or c NOT d"),
            vec![
                TokenKind::Literal,
                TokenKind::Whitespace,
                TokenKind::And,
                TokenKind::Whitespace,
                TokenKind::Literal,
                TokenKind::Whitespace,
                TokenKind::Literal,
                TokenKind::Whitespace,
                TokenKind::Literal,
                TokenKind::Whitespace,
                TokenKind::Not,
                TokenKind::Whitespace,
                TokenKind::Literal,
            ]
        );
    }

    #[test]
    fn keyword_prefix_of_a_word_is_a_literal() {
        assert_eq!(kinds("ANDROID"), vec![TokenKind::Literal]);
        assert_eq!(kinds("ORacle"), vec![TokenKind::Literal]);
    }

    #[test]
    fn function_prefixes_and_separators() {
        assert_eq!(
            kinds(r#"in:folder:"Old Stuff""#),
            vec![
                TokenKind::In,
                TokenKind::Literal,
                TokenKind::Colon,
                TokenKind::Quoted,
            ]
        );
        assert_eq!(kinds("has:uri"), vec![TokenKind::Has, TokenKind::Literal]);
        assert_eq!(
            kinds("NOT(x)"),
            vec![
                TokenKind::Not,
                TokenKind::LParen,
                TokenKind::Literal,
                TokenKind::RParen,
            ]
        );
    }

    #[test]
    fn offsets_cover_the_input_exactly() {
        let input = "  alpha (beta:\"g h\")";
        let tokens = tokenize(input);
        let rebuilt = tokens.iter().map(|token| token.text).collect::<String>();
        assert_eq!(rebuilt, input);
        let mut expected_offset = 0;
        for token in &tokens {
            assert_eq!(token.offset, expected_offset);
            expected_offset = token.end();
        }
    }

    #[test]
    fn quoted_string_keeps_spaces_and_escapes() {
        let tokens = tokenize(r#""say \"hi\" \\ (now)""#);
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::Quoted);
        let value = tokens[0].text_value();
        assert!(value.quoted);
        assert_eq!(value.text, r#"say "hi" \ (now)"#);
    }

    #[test]
    fn unterminated_quotes_lex_as_literals() {
        let leading = tokenize("\"foo");
        assert_eq!(leading.len(), 1);
        assert_eq!(leading[0].kind, TokenKind::Literal);
        assert_eq!(leading[0].text, "\"foo");

        let trailing = tokenize("foo\"");
        assert_eq!(trailing.len(), 1);
        assert_eq!(trailing[0].kind, TokenKind::Literal);
        assert_eq!(trailing[0].text, "foo\"");
    }

    #[test]
    fn unterminated_quote_stops_at_the_next_separator() {
        let tokens = tokenize("\"foo bar");
        let texts = tokens.iter().map(|token| token.text).collect::<Vec<_>>();
        assert_eq!(texts, vec!["\"foo", " ", "bar"]);
        assert_eq!(tokens[0].kind, TokenKind::Literal);
        assert_eq!(tokens[2].kind, TokenKind::Literal);
        assert_eq!(tokens[2].offset, 5);
    }

    #[test]
    fn closed_quotes_win_over_literal_runs() {
        assert_eq!(kinds(r#""abc""#), vec![TokenKind::Quoted]);
        assert_eq!(kinds(r#""a b""#), vec![TokenKind::Quoted]);
        // A longer unquoted run still wins.
        let tokens = tokenize(r#""abc"x"#);
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::Literal);
        assert_eq!(tokens[0].text, r#""abc"x"#);
    }

    #[test]
    fn empty_input_has_no_tokens() {
        assert!(tokenize("").is_empty());
    }

    #[test]
    fn unicode_literals() {
        let tokens = tokenize("пароль 你好");
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[2].text, "你好");
        assert_eq!(tokens[2].offset, "пароль ".len());
    }
}
