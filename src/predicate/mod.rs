//! Predicate expressions and their translation into conditions.
//!
//! A [`Predicate`] is an opaque tree of tagged nodes describing a boolean
//! filter over entity properties, typically produced by a typed query layer.
//! [`PredicateTranslator`] turns it into a [`Condition`](crate::sql::condition::Condition),
//! resolving property references to columns through a
//! [`ColumnResolver`](crate::mapping::ColumnResolver).

mod translate;

use std::fmt;
use std::str::FromStr;

use crate::error::Error;
use crate::sql::select::Select;
use crate::sql::value::Value;

pub use translate::PredicateTranslator;

/// Comparison operators of a [`Predicate::Compare`] node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Gt,
    Lt,
    Gte,
    Lte,
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            CompareOp::Eq => "==",
            CompareOp::Ne => "!=",
            CompareOp::Gt => ">",
            CompareOp::Lt => "<",
            CompareOp::Gte => ">=",
            CompareOp::Lte => "<=",
        };
        f.write_str(symbol)
    }
}

/// Methods callable on a member in a [`Predicate::Call`] node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    In,
    NotIn,
    Between,
    NotBetween,
    /// Pattern used as given.
    Like,
    NotLike,
    /// Wildcards on both sides.
    LikeAll,
    NotLikeAll,
    /// Trailing wildcard.
    LikeStartWith,
    NotLikeStartWith,
    /// Leading wildcard.
    LikeEndWith,
    NotLikeEndWith,
    IsNull,
    IsNotNull,
}

impl Method {
    pub fn name(self) -> &'static str {
        match self {
            Method::In => "In",
            Method::NotIn => "NotIn",
            Method::Between => "Between",
            Method::NotBetween => "NotBetween",
            Method::Like => "Like",
            Method::NotLike => "NotLike",
            Method::LikeAll => "LikeAll",
            Method::NotLikeAll => "NotLikeAll",
            Method::LikeStartWith => "LikeStartWith",
            Method::NotLikeStartWith => "NotLikeStartWith",
            Method::LikeEndWith => "LikeEndWith",
            Method::NotLikeEndWith => "NotLikeEndWith",
            Method::IsNull => "IsNull",
            Method::IsNotNull => "IsNotNull",
        }
    }

    const ALL: [Method; 14] = [
        Method::In,
        Method::NotIn,
        Method::Between,
        Method::NotBetween,
        Method::Like,
        Method::NotLike,
        Method::LikeAll,
        Method::NotLikeAll,
        Method::LikeStartWith,
        Method::NotLikeStartWith,
        Method::LikeEndWith,
        Method::NotLikeEndWith,
        Method::IsNull,
        Method::IsNotNull,
    ];
}

impl FromStr for Method {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Method::ALL
            .into_iter()
            .find(|m| m.name() == s)
            .ok_or_else(|| Error::UnsupportedPredicate(format!("unknown method `{}`", s)))
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A predicate expression node.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Compare {
        left: Box<Predicate>,
        op: CompareOp,
        right: Box<Predicate>,
    },
    And(Box<Predicate>, Box<Predicate>),
    Or(Box<Predicate>, Box<Predicate>),
    Not(Box<Predicate>),
    /// `target.method(args...)`
    Call {
        method: Method,
        target: Box<Predicate>,
        args: Vec<Predicate>,
    },
    /// Property of an entity.
    Member { entity: String, property: String },
    Constant(Value),
    /// Literal value list, the argument of `In`/`NotIn`.
    Values(Vec<Value>),
    /// Embedded query, the argument of `In`/`NotIn`.
    Query(Box<Select>),
}

// Constructors keep hand-built trees readable.
impl Predicate {
    pub fn member(entity: impl Into<String>, property: impl Into<String>) -> Self {
        Predicate::Member {
            entity: entity.into(),
            property: property.into(),
        }
    }

    pub fn constant(value: impl Into<Value>) -> Self {
        Predicate::Constant(value.into())
    }

    pub fn null() -> Self {
        Predicate::Constant(Value::Null)
    }

    pub fn values<V: Into<Value>>(values: impl IntoIterator<Item = V>) -> Self {
        Predicate::Values(values.into_iter().map(Into::into).collect())
    }

    pub fn query(command: Select) -> Self {
        Predicate::Query(Box::new(command))
    }

    pub fn compare(left: Predicate, op: CompareOp, right: Predicate) -> Self {
        Predicate::Compare {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    pub fn equal(self, right: Predicate) -> Self {
        Self::compare(self, CompareOp::Eq, right)
    }

    pub fn not_equal(self, right: Predicate) -> Self {
        Self::compare(self, CompareOp::Ne, right)
    }

    pub fn greater_than(self, right: Predicate) -> Self {
        Self::compare(self, CompareOp::Gt, right)
    }

    pub fn less_than(self, right: Predicate) -> Self {
        Self::compare(self, CompareOp::Lt, right)
    }

    pub fn greater_than_or_equal(self, right: Predicate) -> Self {
        Self::compare(self, CompareOp::Gte, right)
    }

    pub fn less_than_or_equal(self, right: Predicate) -> Self {
        Self::compare(self, CompareOp::Lte, right)
    }

    pub fn and(self, right: Predicate) -> Self {
        Predicate::And(Box::new(self), Box::new(right))
    }

    pub fn or(self, right: Predicate) -> Self {
        Predicate::Or(Box::new(self), Box::new(right))
    }

    pub fn negate(self) -> Self {
        Predicate::Not(Box::new(self))
    }

    pub fn call(self, method: Method, args: Vec<Predicate>) -> Self {
        Predicate::Call {
            method,
            target: Box::new(self),
            args,
        }
    }
}
