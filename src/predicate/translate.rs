//! Predicate-to-condition translation.

use super::{CompareOp, Method, Predicate};
use crate::error::{Error, Result};
use crate::mapping::{ColumnDef, ColumnResolver};
use crate::sql::condition::{Condition, LikeMatch, Operator};
use crate::sql::parameter::Parameter;
use crate::sql::value::Value;

/// Translates [`Predicate`] trees into [`Condition`] trees.
///
/// Member references resolve to columns through `R`; an explicit storage
/// type on the column overrides the one inferred from the constant.
#[derive(Debug)]
pub struct PredicateTranslator<'a, R: ColumnResolver + ?Sized> {
    resolver: &'a R,
}

impl<'a, R: ColumnResolver + ?Sized> PredicateTranslator<'a, R> {
    pub fn new(resolver: &'a R) -> Self {
        Self { resolver }
    }

    pub fn translate(&self, predicate: &Predicate) -> Result<Condition> {
        match predicate {
            Predicate::Compare { left, op, right } => self.compare(left, *op, right),
            Predicate::And(left, right) => Ok(self.translate(left)?.and(self.translate(right)?)),
            Predicate::Or(left, right) => Ok(self.translate(left)?.or(self.translate(right)?)),
            Predicate::Not(inner) => Ok(self.translate(inner)?.negate()),
            Predicate::Call {
                method,
                target,
                args,
            } => self.call(*method, target, args),
            // A bare boolean member reads as `member == true`.
            Predicate::Member { entity, property } => {
                let column = self.resolver.resolve_column(entity, property)?;
                Ok(basic(&column, Operator::Equal, vec![Value::Bool(true)]))
            }
            other => Err(unsupported(other, "is not a boolean expression")),
        }
    }

    fn compare(&self, left: &Predicate, op: CompareOp, right: &Predicate) -> Result<Condition> {
        let operator = operator(op);

        match (left, right) {
            (member @ Predicate::Member { .. }, Predicate::Constant(Value::Null))
            | (Predicate::Constant(Value::Null), member @ Predicate::Member { .. }) => {
                let column = self.column(member)?;
                match op {
                    CompareOp::Eq => Ok(Condition::is_null(column.name)),
                    CompareOp::Ne => Ok(Condition::is_not_null(column.name)),
                    _ => Err(Error::UnsupportedPredicate(format!(
                        "null can only be compared with == or !=, not {}",
                        op
                    ))),
                }
            }

            (Predicate::Member { .. }, Predicate::Member { .. }) => {
                let left = self.column(left)?;
                let right = self.column(right)?;
                Condition::compare_columns(left.name, operator, right.name)
            }

            (member @ Predicate::Member { .. }, Predicate::Constant(value)) => {
                let column = self.column(member)?;
                Ok(basic(&column, operator, vec![value.clone()]))
            }

            (Predicate::Constant(value), member @ Predicate::Member { .. }) => {
                let column = self.column(member)?;
                Ok(basic(&column, operator.swapped(), vec![value.clone()]))
            }

            _ => Err(Error::UnsupportedPredicate(format!(
                "comparison {} needs a member on at least one side and a member or constant on the other",
                op
            ))),
        }
    }

    fn call(&self, method: Method, target: &Predicate, args: &[Predicate]) -> Result<Condition> {
        let column = self.column(target)?;

        match method {
            Method::In | Method::NotIn => {
                let negated = method == Method::NotIn;
                match args {
                    [Predicate::Query(command)] => Ok(Condition::InsideCommand {
                        column: column.name,
                        negated,
                        command: command.clone(),
                    }),
                    [Predicate::Values(values)] => Ok(inside(&column, negated, values.iter())),
                    constants => {
                        let values = constants
                            .iter()
                            .map(|arg| constant(method, arg))
                            .collect::<Result<Vec<_>>>()?;
                        Ok(inside(&column, negated, values.into_iter()))
                    }
                }
            }

            Method::Between | Method::NotBetween => {
                let operator = if method == Method::Between {
                    Operator::Between
                } else {
                    Operator::NotBetween
                };
                match args {
                    [low, high] => {
                        let low = constant(method, low)?;
                        let high = constant(method, high)?;
                        Ok(basic(&column, operator, vec![low.clone(), high.clone()]))
                    }
                    _ => Err(arity(method, 2, args.len())),
                }
            }

            Method::Like
            | Method::NotLike
            | Method::LikeAll
            | Method::NotLikeAll
            | Method::LikeStartWith
            | Method::NotLikeStartWith
            | Method::LikeEndWith
            | Method::NotLikeEndWith => {
                let (mode, negated) = like_mode(method);
                let pattern = match args {
                    [arg] => match constant(method, arg)? {
                        Value::String(s) => s.as_str(),
                        other => {
                            return Err(Error::UnsupportedPredicate(format!(
                                "{} expects a string pattern, got {}",
                                method,
                                other.type_name()
                            )))
                        }
                    },
                    _ => return Err(arity(method, 1, args.len())),
                };
                let operator = if negated {
                    Operator::NotLike
                } else {
                    Operator::Like
                };
                Ok(basic(
                    &column,
                    operator,
                    vec![Value::String(mode.apply(pattern))],
                ))
            }

            Method::IsNull | Method::IsNotNull => {
                if !args.is_empty() {
                    return Err(arity(method, 0, args.len()));
                }
                if method == Method::IsNull {
                    Ok(Condition::is_null(column.name))
                } else {
                    Ok(Condition::is_not_null(column.name))
                }
            }
        }
    }

    fn column(&self, member: &Predicate) -> Result<ColumnDef> {
        match member {
            Predicate::Member { entity, property } => self.resolver.resolve_column(entity, property),
            other => Err(unsupported(other, "is not a member reference")),
        }
    }
}

fn operator(op: CompareOp) -> Operator {
    match op {
        CompareOp::Eq => Operator::Equal,
        CompareOp::Ne => Operator::NotEqual,
        CompareOp::Gt => Operator::GreaterThan,
        CompareOp::Lt => Operator::LessThan,
        CompareOp::Gte => Operator::GreaterThanOrEqual,
        CompareOp::Lte => Operator::LessThanOrEqual,
    }
}

fn like_mode(method: Method) -> (LikeMatch, bool) {
    match method {
        Method::Like => (LikeMatch::Exact, false),
        Method::NotLike => (LikeMatch::Exact, true),
        Method::LikeAll => (LikeMatch::Contains, false),
        Method::NotLikeAll => (LikeMatch::Contains, true),
        Method::LikeStartWith => (LikeMatch::StartsWith, false),
        Method::NotLikeStartWith => (LikeMatch::StartsWith, true),
        Method::LikeEndWith => (LikeMatch::EndsWith, false),
        _ => (LikeMatch::EndsWith, true),
    }
}

fn parameter(column: &ColumnDef, value: Value) -> Parameter {
    let parameter = Parameter::indexed(column.name.clone(), value);
    match column.storage_type {
        Some(storage_type) => parameter.with_storage_type(storage_type),
        None => parameter,
    }
}

fn basic(column: &ColumnDef, operator: Operator, values: Vec<Value>) -> Condition {
    Condition::Basic {
        column: column.name.clone(),
        operator,
        parameters: values.into_iter().map(|v| parameter(column, v)).collect(),
    }
}

fn inside<'v>(column: &ColumnDef, negated: bool, values: impl Iterator<Item = &'v Value>) -> Condition {
    Condition::InsideParameters {
        column: column.name.clone(),
        negated,
        parameters: values.map(|v| parameter(column, v.clone())).collect(),
    }
}

fn constant(method: Method, arg: &Predicate) -> Result<&Value> {
    match arg {
        Predicate::Constant(value) => Ok(value),
        other => Err(unsupported(other, &format!("is not a constant argument of {}", method))),
    }
}

fn arity(method: Method, expected: usize, actual: usize) -> Error {
    Error::UnsupportedPredicate(format!(
        "{} expects {} argument(s), got {}",
        method, expected, actual
    ))
}

fn unsupported(predicate: &Predicate, reason: &str) -> Error {
    let kind = match predicate {
        Predicate::Compare { .. } => "comparison",
        Predicate::And(..) => "AND",
        Predicate::Or(..) => "OR",
        Predicate::Not(_) => "NOT",
        Predicate::Call { .. } => "method call",
        Predicate::Member { .. } => "member",
        Predicate::Constant(_) => "constant",
        Predicate::Values(_) => "value list",
        Predicate::Query(_) => "query",
    };
    Error::UnsupportedPredicate(format!("{} {}", kind, reason))
}
