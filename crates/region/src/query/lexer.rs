//! Tokenizer for filter queries.

use std::fmt;

use crate::error::QueryError;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Number(f64),
    Ident(String),
    LParen,
    RParen,
    Plus,
    Minus,
    Star,
    Slash,
    Lt,
    Le,
    Gt,
    Ge,
    EqEq,
    NotEq,
    Amp,
    Pipe,
    Tilde,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Number(n) => write!(f, "number {}", n),
            TokenKind::Ident(name) => write!(f, "'{}'", name),
            TokenKind::LParen => write!(f, "'('"),
            TokenKind::RParen => write!(f, "')'"),
            TokenKind::Plus => write!(f, "'+'"),
            TokenKind::Minus => write!(f, "'-'"),
            TokenKind::Star => write!(f, "'*'"),
            TokenKind::Slash => write!(f, "'/'"),
            TokenKind::Lt => write!(f, "'<'"),
            TokenKind::Le => write!(f, "'<='"),
            TokenKind::Gt => write!(f, "'>'"),
            TokenKind::Ge => write!(f, "'>='"),
            TokenKind::EqEq => write!(f, "'=='"),
            TokenKind::NotEq => write!(f, "'!='"),
            TokenKind::Amp => write!(f, "'&'"),
            TokenKind::Pipe => write!(f, "'|'"),
            TokenKind::Tilde => write!(f, "'~'"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Byte offset of the first character
    pub position: usize,
}

/// Split a query into tokens.
pub fn tokenize(input: &str) -> Result<Vec<Token>, QueryError> {
    let bytes = input.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        let c = bytes[pos];
        if c.is_ascii_whitespace() {
            pos += 1;
            continue;
        }

        let start = pos;
        let next = bytes.get(pos + 1).copied();
        let (kind, len) = match c {
            b'(' => (TokenKind::LParen, 1),
            b')' => (TokenKind::RParen, 1),
            b'+' => (TokenKind::Plus, 1),
            b'-' => (TokenKind::Minus, 1),
            b'*' => (TokenKind::Star, 1),
            b'/' => (TokenKind::Slash, 1),
            b'&' => (TokenKind::Amp, 1),
            b'|' => (TokenKind::Pipe, 1),
            b'~' => (TokenKind::Tilde, 1),
            b'<' if next == Some(b'=') => (TokenKind::Le, 2),
            b'<' => (TokenKind::Lt, 1),
            b'>' if next == Some(b'=') => (TokenKind::Ge, 2),
            b'>' => (TokenKind::Gt, 1),
            b'=' if next == Some(b'=') => (TokenKind::EqEq, 2),
            b'!' if next == Some(b'=') => (TokenKind::NotEq, 2),
            b'0'..=b'9' | b'.' => {
                let len = number_len(&bytes[start..]);
                let text = &input[start..start + len];
                let value = text.parse::<f64>().map_err(|_| QueryError::InvalidNumber {
                    position: start,
                    text: text.to_string(),
                })?;
                (TokenKind::Number(value), len)
            }
            c if c.is_ascii_alphabetic() || c == b'_' => {
                let len = bytes[start..]
                    .iter()
                    .take_while(|b| b.is_ascii_alphanumeric() || **b == b'_')
                    .count();
                (TokenKind::Ident(input[start..start + len].to_string()), len)
            }
            _ => {
                let found = input[start..].chars().next().unwrap_or('?');
                return Err(QueryError::UnexpectedCharacter {
                    position: start,
                    found,
                });
            }
        };

        tokens.push(Token {
            kind,
            position: start,
        });
        pos += len;
    }

    Ok(tokens)
}

/// Length of the numeric literal at the start of `bytes`: digits, one
/// decimal point and an optional exponent.
fn number_len(bytes: &[u8]) -> usize {
    let mut len = 0;
    let mut seen_dot = false;
    while len < bytes.len() {
        match bytes[len] {
            b'0'..=b'9' => len += 1,
            b'.' if !seen_dot => {
                seen_dot = true;
                len += 1;
            }
            _ => break,
        }
    }

    if matches!(bytes.get(len), Some(b'e') | Some(b'E')) {
        let mut exp = len + 1;
        if matches!(bytes.get(exp), Some(b'+') | Some(b'-')) {
            exp += 1;
        }
        let digits = bytes[exp.min(bytes.len())..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count();
        if digits > 0 {
            len = exp + digits;
        }
    }
    len
}
