//! Condition tree - composable boolean predicates for WHERE and HAVING.
//!
//! Conditions are plain values. They are combined with [`and`], [`or`] and
//! [`not`], which treat an absent operand (`None`) as the identity: combining
//! any condition with nothing yields that condition unchanged. This lets
//! callers build filters incrementally and conditionally.
//!
//! Equality is structural. Two conditions are equal when their shapes,
//! operators, columns and parameter values match; generated parameter names
//! are ignored.
//!
//! ```ignore
//! use sqlshape::sql::condition::{self, Condition};
//!
//! let name = Some(Condition::like_match("Name", "ann", LikeMatch::Contains, false));
//! let age = None; // no age filter requested
//! let filter = condition::and(name, age);
//! ```

use super::dialect::Dialect;
use super::parameter::Parameter;
use super::render::RenderContext;
use super::select::Select;
use super::token::{Token, TokenStream};
use super::value::Value;
use crate::error::{Error, Result};

// =============================================================================
// Operators
// =============================================================================

/// Comparison operators of a basic condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    IsNull,
    IsNotNull,
    Equal,
    NotEqual,
    GreaterThan,
    LessThan,
    GreaterThanOrEqual,
    LessThanOrEqual,
    Like,
    NotLike,
    Between,
    NotBetween,
}

impl Operator {
    /// Number of parameters the operator's template consumes.
    pub fn arity(self) -> usize {
        match self {
            Operator::IsNull | Operator::IsNotNull => 0,
            Operator::Between | Operator::NotBetween => 2,
            _ => 1,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Operator::IsNull => "IS NULL",
            Operator::IsNotNull => "IS NOT NULL",
            Operator::Equal => "=",
            Operator::NotEqual => "<>",
            Operator::GreaterThan => ">",
            Operator::LessThan => "<",
            Operator::GreaterThanOrEqual => ">=",
            Operator::LessThanOrEqual => "<=",
            Operator::Like => "LIKE",
            Operator::NotLike => "NOT LIKE",
            Operator::Between => "BETWEEN",
            Operator::NotBetween => "NOT BETWEEN",
        }
    }

    /// The operator that holds when both operands are swapped.
    pub fn swapped(self) -> Self {
        match self {
            Operator::GreaterThan => Operator::LessThan,
            Operator::LessThan => Operator::GreaterThan,
            Operator::GreaterThanOrEqual => Operator::LessThanOrEqual,
            Operator::LessThanOrEqual => Operator::GreaterThanOrEqual,
            other => other,
        }
    }

    fn tokens(self) -> Vec<Token> {
        match self {
            Operator::IsNull => vec![Token::IsNull],
            Operator::IsNotNull => vec![Token::IsNotNull],
            Operator::Equal => vec![Token::Eq],
            Operator::NotEqual => vec![Token::Ne],
            Operator::GreaterThan => vec![Token::Gt],
            Operator::LessThan => vec![Token::Lt],
            Operator::GreaterThanOrEqual => vec![Token::Gte],
            Operator::LessThanOrEqual => vec![Token::Lte],
            Operator::Like => vec![Token::Like],
            Operator::NotLike => vec![Token::Not, Token::Space, Token::Like],
            Operator::Between => vec![Token::Between],
            Operator::NotBetween => vec![Token::Not, Token::Space, Token::Between],
        }
    }
}

/// How the members of a condition list are joined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conjunction {
    And,
    Or,
}

/// Wildcard placement for LIKE patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeMatch {
    /// Pattern used as given.
    Exact,
    /// `%pattern%`
    Contains,
    /// `pattern%`
    StartsWith,
    /// `%pattern`
    EndsWith,
}

impl LikeMatch {
    pub fn apply(self, pattern: &str) -> String {
        match self {
            LikeMatch::Exact => pattern.to_string(),
            LikeMatch::Contains => format!("%{}%", pattern),
            LikeMatch::StartsWith => format!("{}%", pattern),
            LikeMatch::EndsWith => format!("%{}", pattern),
        }
    }
}

// =============================================================================
// Condition Tree
// =============================================================================

/// A boolean predicate node.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// `column <operator> [parameters]`
    Basic {
        column: String,
        operator: Operator,
        parameters: Vec<Parameter>,
    },

    /// Two columns compared with no parameter binding.
    Columns {
        left: String,
        operator: Operator,
        right: String,
    },

    /// `column [NOT] IN (p0, p1, ...)`
    InsideParameters {
        column: String,
        negated: bool,
        parameters: Vec<Parameter>,
    },

    /// `column [NOT] IN (SELECT ...)`
    InsideCommand {
        column: String,
        negated: bool,
        command: Box<Select>,
    },

    /// `(NOT(inner))`
    Not(Box<Condition>),

    /// Flattened sequence joined by one conjunction.
    List {
        conjunction: Conjunction,
        conditions: Vec<Condition>,
    },
}

impl Condition {
    /// Build a basic condition, validating the operator's arity.
    pub fn basic(
        column: impl Into<String>,
        operator: Operator,
        parameters: Vec<Parameter>,
    ) -> Result<Self> {
        let column = column.into();
        if column.is_empty() {
            return Err(Error::MissingArgument("column"));
        }
        if parameters.len() != operator.arity() {
            return Err(Error::InvalidArity {
                operator: operator.symbol(),
                expected: operator.arity(),
                actual: parameters.len(),
            });
        }
        Ok(Condition::Basic {
            column,
            operator,
            parameters,
        })
    }

    /// Compare `column` against a single value.
    pub fn compare(
        column: impl Into<String>,
        operator: Operator,
        value: impl Into<Value>,
    ) -> Result<Self> {
        let column = column.into();
        let parameter = Parameter::indexed(column.clone(), value);
        Self::basic(column, operator, vec![parameter])
    }

    fn binary(column: impl Into<String>, operator: Operator, value: impl Into<Value>) -> Self {
        let column = column.into();
        Condition::Basic {
            parameters: vec![Parameter::indexed(column.clone(), value)],
            column,
            operator,
        }
    }

    pub fn is_null(column: impl Into<String>) -> Self {
        Condition::Basic {
            column: column.into(),
            operator: Operator::IsNull,
            parameters: Vec::new(),
        }
    }

    pub fn is_not_null(column: impl Into<String>) -> Self {
        Condition::Basic {
            column: column.into(),
            operator: Operator::IsNotNull,
            parameters: Vec::new(),
        }
    }

    pub fn equal(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::binary(column, Operator::Equal, value)
    }

    pub fn not_equal(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::binary(column, Operator::NotEqual, value)
    }

    pub fn greater_than(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::binary(column, Operator::GreaterThan, value)
    }

    pub fn less_than(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::binary(column, Operator::LessThan, value)
    }

    pub fn greater_than_or_equal(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::binary(column, Operator::GreaterThanOrEqual, value)
    }

    pub fn less_than_or_equal(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::binary(column, Operator::LessThanOrEqual, value)
    }

    pub fn like(column: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::binary(column, Operator::Like, pattern.into())
    }

    pub fn not_like(column: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::binary(column, Operator::NotLike, pattern.into())
    }

    /// LIKE with wildcards placed according to `mode`.
    pub fn like_match(
        column: impl Into<String>,
        pattern: &str,
        mode: LikeMatch,
        negated: bool,
    ) -> Self {
        let operator = if negated {
            Operator::NotLike
        } else {
            Operator::Like
        };
        Self::binary(column, operator, mode.apply(pattern))
    }

    pub fn between(
        column: impl Into<String>,
        low: impl Into<Value>,
        high: impl Into<Value>,
    ) -> Self {
        Self::range(column.into(), Operator::Between, low.into(), high.into())
    }

    pub fn not_between(
        column: impl Into<String>,
        low: impl Into<Value>,
        high: impl Into<Value>,
    ) -> Self {
        Self::range(column.into(), Operator::NotBetween, low.into(), high.into())
    }

    fn range(column: String, operator: Operator, low: Value, high: Value) -> Self {
        Condition::Basic {
            parameters: vec![
                Parameter::indexed(column.clone(), low),
                Parameter::indexed(column.clone(), high),
            ],
            column,
            operator,
        }
    }

    /// `left = right` between two columns.
    pub fn equal_columns(left: impl Into<String>, right: impl Into<String>) -> Self {
        Condition::Columns {
            left: left.into(),
            operator: Operator::Equal,
            right: right.into(),
        }
    }

    /// Compare two columns with any single-operand operator.
    pub fn compare_columns(
        left: impl Into<String>,
        operator: Operator,
        right: impl Into<String>,
    ) -> Result<Self> {
        if operator.arity() != 1 {
            return Err(Error::InvalidArity {
                operator: operator.symbol(),
                expected: operator.arity(),
                actual: 1,
            });
        }
        Ok(Condition::Columns {
            left: left.into(),
            operator,
            right: right.into(),
        })
    }

    pub fn in_values<V: Into<Value>>(
        column: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        Self::inside_values(column.into(), values, false)
    }

    pub fn not_in_values<V: Into<Value>>(
        column: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        Self::inside_values(column.into(), values, true)
    }

    fn inside_values<V: Into<Value>>(
        column: String,
        values: impl IntoIterator<Item = V>,
        negated: bool,
    ) -> Self {
        let parameters = values
            .into_iter()
            .map(|v| Parameter::indexed(column.clone(), v))
            .collect();
        Condition::InsideParameters {
            column,
            negated,
            parameters,
        }
    }

    pub fn in_select(column: impl Into<String>, command: Select) -> Self {
        Condition::InsideCommand {
            column: column.into(),
            negated: false,
            command: Box::new(command),
        }
    }

    pub fn not_in_select(column: impl Into<String>, command: Select) -> Self {
        Condition::InsideCommand {
            column: column.into(),
            negated: true,
            command: Box::new(command),
        }
    }

    /// `self AND other`, flattening nested AND lists.
    pub fn and(self, other: Condition) -> Condition {
        combine(Conjunction::And, self, other)
    }

    /// `self OR other`, flattening nested OR lists.
    pub fn or(self, other: Condition) -> Condition {
        combine(Conjunction::Or, self, other)
    }

    /// `(NOT(self))`
    pub fn negate(self) -> Condition {
        Condition::Not(Box::new(self))
    }

    /// AND all conditions together; `None` when the iterator is empty.
    pub fn all(conditions: impl IntoIterator<Item = Condition>) -> Option<Condition> {
        conditions.into_iter().fold(None, |acc, c| and(acc, c))
    }

    /// OR all conditions together; `None` when the iterator is empty.
    pub fn any(conditions: impl IntoIterator<Item = Condition>) -> Option<Condition> {
        conditions.into_iter().fold(None, |acc, c| or(acc, c))
    }

    /// Render this condition on its own with fresh parameter numbering.
    pub fn to_sql(&self, dialect: Dialect) -> Result<(String, Vec<Parameter>)> {
        let mut ctx = RenderContext::new(dialect);
        let ts = self.to_tokens(&mut ctx)?;
        Ok((ts.serialize(dialect), ctx.into_parameters()))
    }

    /// Append this condition's tokens, binding its parameters into `ctx`.
    pub fn to_tokens(&self, ctx: &mut RenderContext) -> Result<TokenStream> {
        let mut ts = TokenStream::new();

        match self {
            Condition::Basic {
                column,
                operator,
                parameters,
            } => {
                ts.lparen().push(Token::Ident(column.clone())).space();
                ts.extend(operator.tokens());
                match parameters.as_slice() {
                    [] => {}
                    [value] => {
                        ts.space().push(ctx.bind(value));
                    }
                    [low, high] => {
                        ts.space()
                            .push(ctx.bind(low))
                            .space()
                            .push(Token::And)
                            .space()
                            .push(ctx.bind(high));
                    }
                    _ => {
                        return Err(Error::InvalidArity {
                            operator: operator.symbol(),
                            expected: operator.arity(),
                            actual: parameters.len(),
                        })
                    }
                }
                ts.rparen();
            }

            Condition::Columns {
                left,
                operator,
                right,
            } => {
                ts.lparen().push(Token::Ident(left.clone())).space();
                ts.extend(operator.tokens());
                ts.space().push(Token::Ident(right.clone())).rparen();
            }

            Condition::InsideParameters {
                column,
                negated,
                parameters,
            } => {
                if parameters.is_empty() {
                    // Empty set: IN is always false, NOT IN always true.
                    let always = if *negated { "(1 = 1)" } else { "(1 = 0)" };
                    ts.push(Token::Raw(always.into()));
                    return Ok(ts);
                }
                ts.lparen().push(Token::Ident(column.clone())).space();
                if *negated {
                    ts.push(Token::Not).space();
                }
                ts.push(Token::In).space().lparen();
                for (i, parameter) in parameters.iter().enumerate() {
                    if i > 0 {
                        ts.comma();
                    }
                    ts.push(ctx.bind(parameter));
                }
                ts.rparen().rparen();
            }

            Condition::InsideCommand {
                column,
                negated,
                command,
            } => {
                ts.lparen().push(Token::Ident(column.clone())).space();
                if *negated {
                    ts.push(Token::Not).space();
                }
                ts.push(Token::In).space().lparen();
                ts.append(&command.to_tokens(ctx)?);
                ts.rparen().rparen();
            }

            Condition::Not(inner) => {
                ts.lparen().push(Token::Not).lparen();
                ts.append(&inner.to_tokens(ctx)?);
                ts.rparen().rparen();
            }

            Condition::List {
                conjunction,
                conditions,
            } => {
                let joiner = match conjunction {
                    Conjunction::And => Token::And,
                    Conjunction::Or => Token::Or,
                };
                ts.lparen();
                for (i, condition) in conditions.iter().enumerate() {
                    if i > 0 {
                        ts.space().push(joiner.clone()).space();
                    }
                    ts.append(&condition.to_tokens(ctx)?);
                }
                ts.rparen();
            }
        }

        Ok(ts)
    }
}

fn combine(conjunction: Conjunction, left: Condition, right: Condition) -> Condition {
    let mut conditions = Vec::new();
    for condition in [left, right] {
        match condition {
            Condition::List {
                conjunction: inner,
                conditions: members,
            } if inner == conjunction => conditions.extend(members),
            other => conditions.push(other),
        }
    }
    Condition::List {
        conjunction,
        conditions,
    }
}

// =============================================================================
// Null-absorbing combinators
// =============================================================================

/// AND two optional conditions; an absent operand yields the other unchanged.
pub fn and(
    left: impl Into<Option<Condition>>,
    right: impl Into<Option<Condition>>,
) -> Option<Condition> {
    match (left.into(), right.into()) {
        (Some(l), Some(r)) => Some(l.and(r)),
        (Some(c), None) | (None, Some(c)) => Some(c),
        (None, None) => None,
    }
}

/// OR two optional conditions; an absent operand yields the other unchanged.
pub fn or(
    left: impl Into<Option<Condition>>,
    right: impl Into<Option<Condition>>,
) -> Option<Condition> {
    match (left.into(), right.into()) {
        (Some(l), Some(r)) => Some(l.or(r)),
        (Some(c), None) | (None, Some(c)) => Some(c),
        (None, None) => None,
    }
}

/// Negate an optional condition; nothing stays nothing.
pub fn not(condition: impl Into<Option<Condition>>) -> Option<Condition> {
    condition.into().map(Condition::negate)
}
