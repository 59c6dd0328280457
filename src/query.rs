//! Boolean query parsing.
//!
//! # Grammar
//!
//! ```text
//! query    := or_expr
//! or_expr  := and_expr (OR and_expr)*
//! and_expr := not_expr (AND not_expr)*
//! not_expr := NOT? word
//! ```
//!
//! `NOT` binds tightest and `OR` loosest; `AND` and `OR` associate to the
//! left. There is no grouping, and every pair of words needs an explicit
//! operator between them. The operators are whole whitespace-separated
//! tokens, except `NOT`, which is a single character glued to the front of
//! a word (`!кот`).

use std::fmt;

use crate::tokenizer::Tokenizer;

/// Parsed query. Built once per query and only read afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Term(String),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Not(Box<Expr>),
}

impl Expr {
    pub fn term(term: impl Into<String>) -> Self {
        Self::Term(term.into())
    }

    pub fn and(left: Expr, right: Expr) -> Self {
        Self::And(Box::new(left), Box::new(right))
    }

    pub fn or(left: Expr, right: Expr) -> Self {
        Self::Or(Box::new(left), Box::new(right))
    }

    pub fn not(operand: Expr) -> Self {
        Self::Not(Box::new(operand))
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Term(term) => f.write_str(term),
            Self::And(l, r) => write!(f, "({l} AND {r})"),
            Self::Or(l, r) => write!(f, "({l} OR {r})"),
            Self::Not(x) => write!(f, "NOT {x}"),
        }
    }
}

/// Why a query was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error("query is empty")]
    Empty,

    #[error("operator {operator:?} has no left operand")]
    LeadingOperator { operator: String },

    #[error("operator {operator:?} has no right operand")]
    TrailingOperator { operator: String },

    #[error("operator {second:?} directly follows operator {first:?}")]
    ConsecutiveOperators { first: String, second: String },

    #[error("missing operator between {left:?} and {right:?}")]
    MissingOperator { left: String, right: String },

    #[error("negation {token:?} has no word after it")]
    EmptyNegation { token: String },

    #[error("double negation in {token:?} is not supported")]
    DoubleNegation { token: String },

    #[error("{word:?} contains no searchable letters")]
    NoIndexableText { word: String },
}

/// Operator spellings. Matching is case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuerySyntax {
    pub and: String,
    pub or: String,
    pub not: char,
}

impl Default for QuerySyntax {
    fn default() -> Self {
        Self {
            and: "И".to_string(),
            or: "ИЛИ".to_string(),
            not: '!',
        }
    }
}

impl QuerySyntax {
    pub fn english() -> Self {
        Self {
            and: "AND".to_string(),
            or: "OR".to_string(),
            not: '!',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    And,
    Or,
}

#[derive(Debug)]
enum Token<'a> {
    Operator(Op, &'a str),
    Atom(Expr, &'a str),
}

impl<'a> Token<'a> {
    fn raw(&self) -> &'a str {
        match self {
            Self::Operator(_, raw) | Self::Atom(_, raw) => *raw,
        }
    }
}

/// Turns query strings into [`Expr`] trees.
///
/// Query words go through the same [`Tokenizer`] as document text, so the
/// parser must be built with the tokenizer the index was built with.
#[derive(Debug, Clone, Default)]
pub struct QueryParser {
    syntax: QuerySyntax,
    tokenizer: Tokenizer,
}

impl QueryParser {
    pub fn new(tokenizer: Tokenizer) -> Self {
        Self {
            syntax: QuerySyntax::default(),
            tokenizer,
        }
    }

    pub fn with_syntax(mut self, syntax: QuerySyntax) -> Self {
        self.syntax = syntax;
        self
    }

    pub fn syntax(&self) -> &QuerySyntax {
        &self.syntax
    }

    pub fn parse(&self, query: &str) -> Result<Expr, QueryError> {
        let tokens = query
            .split_whitespace()
            .map(|raw| self.lex(raw))
            .collect::<Result<Vec<_>, _>>()?;
        if tokens.is_empty() {
            return Err(QueryError::Empty);
        }

        let mut cursor = Cursor {
            tokens: &tokens,
            pos: 0,
        };
        let expr = cursor.or_expr()?;

        // Operators are all consumed by the loops above, so anything left
        // over is a word that follows another word.
        if let Some(next) = cursor.peek() {
            return Err(QueryError::MissingOperator {
                left: tokens[cursor.pos - 1].raw().to_string(),
                right: next.raw().to_string(),
            });
        }
        Ok(expr)
    }

    fn lex<'a>(&self, raw: &'a str) -> Result<Token<'a>, QueryError> {
        if raw == self.syntax.and {
            return Ok(Token::Operator(Op::And, raw));
        }
        if raw == self.syntax.or {
            return Ok(Token::Operator(Op::Or, raw));
        }

        let expr = match raw.strip_prefix(self.syntax.not) {
            Some("") => {
                return Err(QueryError::EmptyNegation {
                    token: raw.to_string(),
                });
            }
            Some(rest) if rest.starts_with(self.syntax.not) => {
                return Err(QueryError::DoubleNegation {
                    token: raw.to_string(),
                });
            }
            Some(rest) => Expr::not(self.word(rest)?),
            None => self.word(raw)?,
        };
        Ok(Token::Atom(expr, raw))
    }

    /// Normalize one query word. A word the tokenizer splits into several
    /// terms (`кот-пёс`) requires all of them.
    fn word(&self, raw: &str) -> Result<Expr, QueryError> {
        self.tokenizer
            .tokenize(raw)
            .into_iter()
            .map(Expr::Term)
            .reduce(Expr::and)
            .ok_or_else(|| QueryError::NoIndexableText {
                word: raw.to_string(),
            })
    }
}

/// Parse `query` with the default syntax and tokenizer.
pub fn parse(query: &str) -> Result<Expr, QueryError> {
    QueryParser::default().parse(query)
}

struct Cursor<'t, 'a> {
    tokens: &'t [Token<'a>],
    pos: usize,
}

impl<'t, 'a> Cursor<'t, 'a> {
    fn peek(&self) -> Option<&'t Token<'a>> {
        self.tokens.get(self.pos)
    }

    fn eat(&mut self, op: Op) -> bool {
        match self.peek() {
            Some(Token::Operator(found, _)) if *found == op => {
                self.pos += 1;
                true
            }
            _ => false,
        }
    }

    fn or_expr(&mut self) -> Result<Expr, QueryError> {
        let mut left = self.and_expr()?;
        while self.eat(Op::Or) {
            let right = self.and_expr()?;
            left = Expr::or(left, right);
        }
        Ok(left)
    }

    fn and_expr(&mut self) -> Result<Expr, QueryError> {
        let mut left = self.operand()?;
        while self.eat(Op::And) {
            let right = self.operand()?;
            left = Expr::and(left, right);
        }
        Ok(left)
    }

    /// An operand is expected either at the very start or right after an
    /// operator, which decides how a missing one is reported.
    fn operand(&mut self) -> Result<Expr, QueryError> {
        let previous = self.pos.checked_sub(1).map(|i| self.tokens[i].raw());
        match (self.peek(), previous) {
            (Some(Token::Atom(expr, _)), _) => {
                self.pos += 1;
                Ok(expr.clone())
            }
            (Some(Token::Operator(_, raw)), None) => {
                Err(QueryError::LeadingOperator {
                    operator: raw.to_string(),
                })
            }
            (Some(Token::Operator(_, raw)), Some(first)) => {
                Err(QueryError::ConsecutiveOperators {
                    first: first.to_string(),
                    second: raw.to_string(),
                })
            }
            (None, Some(last)) => Err(QueryError::TrailingOperator {
                operator: last.to_string(),
            }),
            (None, None) => Err(QueryError::Empty),
        }
    }
}
