//! Filter queries over weather samples.
//!
//! A query is a boolean expression over the sample fields `lat`, `lon` and
//! `tcc`, for example `tcc >= 20 and not (lon < -100 | lat > 40)`. Queries
//! are parsed and type-checked once; evaluation cannot fail and follows
//! IEEE float semantics, so comparisons against NaN are false (`!=` true).

mod lexer;
mod parser;

use std::fmt;
use std::str::FromStr;

use eclipse_common::WeatherSample;
use tracing::debug;

use crate::error::QueryError;
pub use parser::{ArithOp, BoolExpr, CmpOp, Field, NumExpr};

/// A parsed, type-checked filter predicate.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    source: String,
    expr: BoolExpr,
}

impl Query {
    pub fn parse(input: &str) -> Result<Self, QueryError> {
        let tokens = lexer::tokenize(input)?;
        let expr = parser::parse(&tokens)?;
        Ok(Self {
            source: input.trim().to_string(),
            expr,
        })
    }

    /// The query text as configured.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn expr(&self) -> &BoolExpr {
        &self.expr
    }

    pub fn matches(&self, sample: &WeatherSample) -> bool {
        eval_bool(&self.expr, sample)
    }
}

impl FromStr for Query {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Query::parse(s)
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Keep the samples for which `query` holds, preserving order.
pub fn filter_by_query(samples: &[WeatherSample], query: &Query) -> Vec<WeatherSample> {
    let kept: Vec<WeatherSample> = samples
        .iter()
        .filter(|sample| query.matches(sample))
        .copied()
        .collect();

    debug!(
        query = %query,
        input = samples.len(),
        kept = kept.len(),
        "Applied query filter"
    );
    kept
}

fn eval_num(expr: &NumExpr, sample: &WeatherSample) -> f64 {
    match expr {
        NumExpr::Literal(value) => *value,
        NumExpr::Field(Field::Lat) => sample.lat,
        NumExpr::Field(Field::Lon) => sample.lon,
        NumExpr::Field(Field::Tcc) => sample.tcc as f64,
        NumExpr::Neg(inner) => -eval_num(inner, sample),
        NumExpr::Binary(op, lhs, rhs) => {
            let (a, b) = (eval_num(lhs, sample), eval_num(rhs, sample));
            match op {
                ArithOp::Add => a + b,
                ArithOp::Sub => a - b,
                ArithOp::Mul => a * b,
                ArithOp::Div => a / b,
            }
        }
    }
}

fn eval_bool(expr: &BoolExpr, sample: &WeatherSample) -> bool {
    match expr {
        BoolExpr::Literal(value) => *value,
        BoolExpr::Not(inner) => !eval_bool(inner, sample),
        BoolExpr::And(lhs, rhs) => eval_bool(lhs, sample) && eval_bool(rhs, sample),
        BoolExpr::Or(lhs, rhs) => eval_bool(lhs, sample) || eval_bool(rhs, sample),
        BoolExpr::Compare { first, rest } => {
            let mut left = eval_num(first, sample);
            for (op, operand) in rest {
                let right = eval_num(operand, sample);
                let holds = match op {
                    CmpOp::Lt => left < right,
                    CmpOp::Le => left <= right,
                    CmpOp::Gt => left > right,
                    CmpOp::Ge => left >= right,
                    CmpOp::Eq => left == right,
                    CmpOp::Ne => left != right,
                };
                if !holds {
                    return false;
                }
                left = right;
            }
            true
        }
    }
}
