//! Tokenizer for the CQL subset understood by the in-memory store

use eventsink_core::{StoreError, StoreResult};

/// A lexical token
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Identifier or keyword. Unquoted identifiers are lowercased, quoted
    /// ones keep their case.
    Ident {
        /// Identifier text
        text: String,
        /// Whether it was written in double quotes
        quoted: bool,
    },
    /// Single-quoted string literal
    Str(String),
    /// Numeric literal, kept as written
    Number(String),
    /// Bind marker `?`
    Marker,
    /// Any single punctuation character: `( ) , ; < > = { } : .`
    Symbol(char),
}

impl Token {
    /// Whether this is the unquoted keyword `kw` (case-insensitive)
    pub fn is_keyword(&self, kw: &str) -> bool {
        matches!(self, Token::Ident { text, quoted: false } if text.eq_ignore_ascii_case(kw))
    }

    /// Human-readable form for error messages
    pub fn describe(&self) -> String {
        match self {
            Token::Ident { text, quoted: true } => format!("\"{}\"", text),
            Token::Ident { text, .. } => text.clone(),
            Token::Str(s) => format!("'{}'", s),
            Token::Number(n) => n.clone(),
            Token::Marker => "?".to_string(),
            Token::Symbol(c) => c.to_string(),
        }
    }
}

/// Split `input` into tokens.
///
/// # Errors
///
/// Returns [`StoreError::Syntax`] on unterminated literals or characters
/// outside the subset.
pub fn tokenize(input: &str) -> StoreResult<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(pos, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
        } else if c == '-' && input[pos..].starts_with("--") {
            // line comment
            while let Some(&(_, c)) = chars.peek() {
                if c == '\n' {
                    break;
                }
                chars.next();
            }
        } else if c.is_ascii_alphabetic() || c == '_' {
            let mut text = String::new();
            while let Some(&(_, c)) = chars.peek() {
                if c.is_ascii_alphanumeric() || c == '_' {
                    text.push(c.to_ascii_lowercase());
                    chars.next();
                } else {
                    break;
                }
            }
            tokens.push(Token::Ident {
                text,
                quoted: false,
            });
        } else if c.is_ascii_digit() {
            let mut text = String::new();
            while let Some(&(_, c)) = chars.peek() {
                if c.is_ascii_digit() || c == '.' {
                    text.push(c);
                    chars.next();
                } else {
                    break;
                }
            }
            tokens.push(Token::Number(text));
        } else if c == '"' || c == '\'' {
            chars.next();
            let text = read_quoted(&mut chars, c, pos)?;
            if c == '"' {
                tokens.push(Token::Ident { text, quoted: true });
            } else {
                tokens.push(Token::Str(text));
            }
        } else if c == '?' {
            chars.next();
            tokens.push(Token::Marker);
        } else if "(),;<>={}:.".contains(c) {
            chars.next();
            tokens.push(Token::Symbol(c));
        } else {
            return Err(StoreError::Syntax(format!(
                "unexpected character '{}' at offset {}",
                c, pos
            )));
        }
    }

    Ok(tokens)
}

/// Read up to the closing `quote`; a doubled quote is an escaped quote.
fn read_quoted(
    chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>,
    quote: char,
    start: usize,
) -> StoreResult<String> {
    let mut text = String::new();
    while let Some((_, c)) = chars.next() {
        if c == quote {
            if matches!(chars.peek(), Some(&(_, next)) if next == quote) {
                chars.next();
                text.push(quote);
            } else {
                return Ok(text);
            }
        } else {
            text.push(c);
        }
    }
    Err(StoreError::Syntax(format!(
        "unterminated {} literal starting at offset {}",
        if quote == '"' { "identifier" } else { "string" },
        start
    )))
}
