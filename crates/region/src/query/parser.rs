//! Recursive-descent parser producing a type-checked expression tree.
//!
//! Precedence, loosest first: `or`/`|`, `and`/`&`, `not`/`~`, comparisons
//! (chainable), `+ -`, `* /`, unary sign.

use crate::error::{QueryError, ValueKind};

use super::lexer::{Token, TokenKind};

/// A sample attribute a query may refer to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Lat,
    Lon,
    Tcc,
}

impl Field {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "lat" => Some(Field::Lat),
            "lon" => Some(Field::Lon),
            "tcc" => Some(Field::Tcc),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NumExpr {
    Literal(f64),
    Field(Field),
    Neg(Box<NumExpr>),
    Binary(ArithOp, Box<NumExpr>, Box<NumExpr>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum BoolExpr {
    Literal(bool),
    Not(Box<BoolExpr>),
    And(Box<BoolExpr>, Box<BoolExpr>),
    Or(Box<BoolExpr>, Box<BoolExpr>),
    /// `a < b <= c` holds when every adjacent pair holds
    Compare {
        first: NumExpr,
        rest: Vec<(CmpOp, NumExpr)>,
    },
}

/// Result of parsing any sub-expression, before its context decides which
/// kind it must be.
#[derive(Debug, Clone, PartialEq)]
enum Typed {
    Num(NumExpr),
    Bool(BoolExpr),
}

impl Typed {
    fn kind(&self) -> ValueKind {
        match self {
            Typed::Num(_) => ValueKind::Number,
            Typed::Bool(_) => ValueKind::Boolean,
        }
    }
}

/// Parse a full token stream into a boolean predicate.
pub fn parse(tokens: &[Token]) -> Result<BoolExpr, QueryError> {
    if tokens.is_empty() {
        return Err(QueryError::Empty);
    }

    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.or_expr()?;

    if let Some(token) = parser.peek() {
        return Err(QueryError::UnexpectedToken {
            position: token.position,
            found: token.kind.to_string(),
            expected: "an operator or end of query",
        });
    }

    expect_bool(expr, 0, "query")
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.pos);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    /// Position of the next token, or one past the last one.
    fn position(&self) -> usize {
        match self.peek() {
            Some(token) => token.position,
            None => self.tokens.last().map(|t| t.position + 1).unwrap_or(0),
        }
    }

    fn peek_keyword(&self, word: &str) -> bool {
        matches!(self.peek(), Some(Token { kind: TokenKind::Ident(name), .. }) if name == word)
    }

    fn or_expr(&mut self) -> Result<Typed, QueryError> {
        let mut left = self.and_expr()?;
        loop {
            let position = self.position();
            let operator = match self.peek().map(|t| &t.kind) {
                Some(TokenKind::Pipe) => "|",
                _ if self.peek_keyword("or") => "or",
                _ => return Ok(left),
            };
            self.advance();
            let right = self.and_expr()?;
            let lhs = expect_bool(left, position, operator)?;
            let rhs = expect_bool(right, position, operator)?;
            left = Typed::Bool(BoolExpr::Or(Box::new(lhs), Box::new(rhs)));
        }
    }

    fn and_expr(&mut self) -> Result<Typed, QueryError> {
        let mut left = self.not_expr()?;
        loop {
            let position = self.position();
            let operator = match self.peek().map(|t| &t.kind) {
                Some(TokenKind::Amp) => "&",
                _ if self.peek_keyword("and") => "and",
                _ => return Ok(left),
            };
            self.advance();
            let right = self.not_expr()?;
            let lhs = expect_bool(left, position, operator)?;
            let rhs = expect_bool(right, position, operator)?;
            left = Typed::Bool(BoolExpr::And(Box::new(lhs), Box::new(rhs)));
        }
    }

    fn not_expr(&mut self) -> Result<Typed, QueryError> {
        let position = self.position();
        let operator = match self.peek().map(|t| &t.kind) {
            Some(TokenKind::Tilde) => "~",
            _ if self.peek_keyword("not") => "not",
            _ => return self.comparison(),
        };
        self.advance();
        let operand = expect_bool(self.not_expr()?, position, operator)?;
        Ok(Typed::Bool(BoolExpr::Not(Box::new(operand))))
    }

    fn comparison(&mut self) -> Result<Typed, QueryError> {
        let first = self.sum()?;
        let mut rest = Vec::new();
        let mut first_position = 0;

        while let Some(token) = self.peek() {
            let op = match token.kind {
                TokenKind::Lt => CmpOp::Lt,
                TokenKind::Le => CmpOp::Le,
                TokenKind::Gt => CmpOp::Gt,
                TokenKind::Ge => CmpOp::Ge,
                TokenKind::EqEq => CmpOp::Eq,
                TokenKind::NotEq => CmpOp::Ne,
                _ => break,
            };
            if rest.is_empty() {
                first_position = token.position;
            }
            let operator = token.kind.to_string();
            self.advance();
            let position = self.position();
            let operand = expect_num(self.sum()?, position, &operator)?;
            rest.push((op, operand));
        }

        if rest.is_empty() {
            return Ok(first);
        }
        let first = expect_num(first, first_position, "comparison")?;
        Ok(Typed::Bool(BoolExpr::Compare { first, rest }))
    }

    fn sum(&mut self) -> Result<Typed, QueryError> {
        let mut left = self.product()?;
        while let Some(token) = self.peek() {
            let op = match token.kind {
                TokenKind::Plus => ArithOp::Add,
                TokenKind::Minus => ArithOp::Sub,
                _ => break,
            };
            let position = token.position;
            let operator = token.kind.to_string();
            self.advance();
            let right = self.product()?;
            let lhs = expect_num(left, position, &operator)?;
            let rhs = expect_num(right, position, &operator)?;
            left = Typed::Num(NumExpr::Binary(op, Box::new(lhs), Box::new(rhs)));
        }
        Ok(left)
    }

    fn product(&mut self) -> Result<Typed, QueryError> {
        let mut left = self.unary()?;
        while let Some(token) = self.peek() {
            let op = match token.kind {
                TokenKind::Star => ArithOp::Mul,
                TokenKind::Slash => ArithOp::Div,
                _ => break,
            };
            let position = token.position;
            let operator = token.kind.to_string();
            self.advance();
            let right = self.unary()?;
            let lhs = expect_num(left, position, &operator)?;
            let rhs = expect_num(right, position, &operator)?;
            left = Typed::Num(NumExpr::Binary(op, Box::new(lhs), Box::new(rhs)));
        }
        Ok(left)
    }

    fn unary(&mut self) -> Result<Typed, QueryError> {
        match self.peek() {
            Some(token) if matches!(token.kind, TokenKind::Minus | TokenKind::Plus) => {
                let negate = token.kind == TokenKind::Minus;
                let position = token.position;
                let operator = token.kind.to_string();
                self.advance();
                let operand = expect_num(self.unary()?, position, &operator)?;
                Ok(Typed::Num(if negate {
                    NumExpr::Neg(Box::new(operand))
                } else {
                    operand
                }))
            }
            _ => self.primary(),
        }
    }

    fn primary(&mut self) -> Result<Typed, QueryError> {
        let Some(token) = self.advance() else {
            return Err(QueryError::UnexpectedEnd {
                expected: "a value",
            });
        };

        match &token.kind {
            TokenKind::Number(value) => Ok(Typed::Num(NumExpr::Literal(*value))),
            TokenKind::Ident(name) => match name.as_str() {
                "True" => Ok(Typed::Bool(BoolExpr::Literal(true))),
                "False" => Ok(Typed::Bool(BoolExpr::Literal(false))),
                "and" | "or" | "not" => Err(QueryError::UnexpectedToken {
                    position: token.position,
                    found: token.kind.to_string(),
                    expected: "a value",
                }),
                _ => Field::from_name(name)
                    .map(|field| Typed::Num(NumExpr::Field(field)))
                    .ok_or_else(|| QueryError::UnknownField {
                        position: token.position,
                        name: name.clone(),
                    }),
            },
            TokenKind::LParen => {
                let inner = self.or_expr()?;
                match self.advance() {
                    Some(Token {
                        kind: TokenKind::RParen,
                        ..
                    }) => Ok(inner),
                    Some(other) => Err(QueryError::UnexpectedToken {
                        position: other.position,
                        found: other.kind.to_string(),
                        expected: "')'",
                    }),
                    None => Err(QueryError::UnexpectedEnd { expected: "')'" }),
                }
            }
            other => Err(QueryError::UnexpectedToken {
                position: token.position,
                found: other.to_string(),
                expected: "a value",
            }),
        }
    }
}

fn expect_bool(expr: Typed, position: usize, operator: &str) -> Result<BoolExpr, QueryError> {
    match expr {
        Typed::Bool(b) => Ok(b),
        other => Err(QueryError::TypeMismatch {
            position,
            operator: operator.to_string(),
            expected: ValueKind::Boolean,
            found: other.kind(),
        }),
    }
}

fn expect_num(expr: Typed, position: usize, operator: &str) -> Result<NumExpr, QueryError> {
    match expr {
        Typed::Num(n) => Ok(n),
        other => Err(QueryError::TypeMismatch {
            position,
            operator: operator.to_string(),
            expected: ValueKind::Number,
            found: other.kind(),
        }),
    }
}
