//! DML (Data Manipulation Language) statements: INSERT, UPDATE, DELETE.
//!
//! # Examples
//!
//! ```ignore
//! use sqlshape::sql::dml::{Insert, Update, Delete};
//! use sqlshape::sql::condition::Condition;
//! use sqlshape::sql::dialect::Dialect;
//!
//! // INSERT INTO Users ( Name,Age ) VALUES ( @PN_NEW_Name,@PN_NEW_Age )
//! let insert = Insert::new(Dialect::SqlServer, "Users")
//!     .set("Name", "Alice")
//!     .set("Age", 30);
//!
//! // UPDATE Users SET Visits=Visits+1 WHERE (Id = @PN_IDX_0)
//! let update = Update::new(Dialect::SqlServer, "Users")
//!     .increase("Visits")
//!     .filter(Condition::equal("Id", 1));
//!
//! // DELETE FROM Users WHERE (Active = @PN_IDX_0)
//! let delete = Delete::new(Dialect::SqlServer, "Users")
//!     .filter(Condition::equal("Active", false));
//! ```

use serde::Serialize;
use tracing::debug;

use super::condition::{self, Condition, Operator};
use super::dialect::{Dialect, SqlDialect};
use super::parameter::Parameter;
use super::render::RenderContext;
use super::select::Select;
use super::statement::{Command, Statement, StatementKind};
use super::token::{Token, TokenStream};
use super::value::{StorageType, Value};
use crate::error::{Error, Result};
use crate::executor::Executor;
use crate::mapping::{json_to_value, ColumnResolver, EntityMapping};
use crate::predicate::{Predicate, PredicateTranslator};

// ============================================================================
// Assignments
// ============================================================================

/// A column receiving a value in INSERT or UPDATE.
#[derive(Debug, Clone, PartialEq)]
pub enum Assignment {
    /// Bound `PN_NEW_<column>` parameter, or raw SQL for unbound parameters.
    Value(Parameter),
    /// Scalar subquery whose parameters merge into the statement.
    Query { column: String, command: Box<Select> },
}

impl Assignment {
    pub fn column(&self) -> &str {
        match self {
            Assignment::Value(parameter) => parameter.column(),
            Assignment::Query { column, .. } => column,
        }
    }

    fn value_tokens(&self, ctx: &mut RenderContext) -> Result<TokenStream> {
        let mut ts = TokenStream::new();
        match self {
            Assignment::Value(parameter) => {
                ts.push(ctx.bind(parameter));
            }
            Assignment::Query { command, .. } => {
                ts.lparen().append(&command.to_tokens(ctx)?).rparen();
            }
        }
        Ok(ts)
    }
}

/// Replace the assignment for the same column, or append.
fn assign(assignments: &mut Vec<Assignment>, assignment: Assignment) {
    match assignments
        .iter_mut()
        .find(|a| a.column() == assignment.column())
    {
        Some(existing) => *existing = assignment,
        None => assignments.push(assignment),
    }
}

fn function_assignment(column: impl Into<String>, sql: impl Into<String>) -> Result<Assignment> {
    let sql = sql.into();
    if sql.trim().is_empty() {
        return Err(Error::MissingArgument("function"));
    }
    Ok(Assignment::Value(Parameter::raw(column, sql)))
}

/// Assignments for every mapped property present on `entity`, in mapping order.
fn entity_assignments<T: Serialize + ?Sized>(
    mapping: &EntityMapping,
    entity: &T,
) -> Result<Vec<Assignment>> {
    let json = serde_json::to_value(entity)?;
    let object = json.as_object().ok_or_else(|| Error::UnsupportedValue {
        column: mapping.entity().to_string(),
        reason: "entity must serialize to an object".into(),
    })?;

    let mut assignments = Vec::new();
    for (property, column) in mapping.columns() {
        let Some(json) = object.get(property) else {
            continue;
        };
        let value = json_to_value(&column.name, json, column.storage_type)?;
        let mut parameter = Parameter::new_value(column.name.clone(), value);
        if let Some(storage_type) = column.storage_type {
            parameter = parameter.with_storage_type(storage_type);
        }
        assignments.push(Assignment::Value(parameter));
    }
    for property in object.keys().filter(|p| mapping.get(p).is_none()) {
        debug!(entity = mapping.entity(), property, "skipping unmapped entity property");
    }
    Ok(assignments)
}

fn require_assignments(assignments: &[Assignment]) -> Result<()> {
    if assignments.is_empty() {
        return Err(Error::MissingArgument("assignments"));
    }
    Ok(())
}

fn push_where(ts: &mut TokenStream, filter: &Option<Condition>, ctx: &mut RenderContext) -> Result<()> {
    if let Some(filter) = filter {
        ts.space()
            .push(Token::Where)
            .space()
            .append(&filter.to_tokens(ctx)?);
    }
    Ok(())
}

// ============================================================================
// INSERT
// ============================================================================

/// INSERT statement.
#[derive(Debug, Clone, PartialEq)]
#[must_use = "DML statements have no effect until rendered or executed"]
pub struct Insert {
    dialect: Dialect,
    table: String,
    assignments: Vec<Assignment>,
}

impl Insert {
    pub fn new(dialect: Dialect, table: impl Into<String>) -> Self {
        Self {
            dialect,
            table: table.into(),
            assignments: Vec::new(),
        }
    }

    /// Insert `value` into `column` as bound parameter `PN_NEW_<column>`.
    pub fn set(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        assign(
            &mut self.assignments,
            Assignment::Value(Parameter::new_value(column, value)),
        );
        self
    }

    pub fn set_with_type(
        mut self,
        column: impl Into<String>,
        value: impl Into<Value>,
        storage_type: StorageType,
    ) -> Self {
        let parameter = Parameter::new_value(column, value).with_storage_type(storage_type);
        assign(&mut self.assignments, Assignment::Value(parameter));
        self
    }

    /// Insert raw SQL text, typically a dialect function, into `column`.
    pub fn set_function(mut self, column: impl Into<String>, sql: impl Into<String>) -> Result<Self> {
        assign(&mut self.assignments, function_assignment(column, sql)?);
        Ok(self)
    }

    /// Insert the result of a scalar subquery into `column`.
    pub fn set_select(mut self, column: impl Into<String>, command: Select) -> Self {
        assign(
            &mut self.assignments,
            Assignment::Query {
                column: column.into(),
                command: Box::new(command),
            },
        );
        self
    }

    /// Insert every mapped property of `entity`.
    ///
    /// Property values go through `serde_json`. Timestamps bind as
    /// [`Value::DateTime`] when serialized by `chrono` or when the column is
    /// typed `Date`/`DateTime`; other strings bind as strings.
    pub fn set_entity<T: Serialize + ?Sized>(mut self, mapping: &EntityMapping, entity: &T) -> Result<Self> {
        for assignment in entity_assignments(mapping, entity)? {
            assign(&mut self.assignments, assignment);
        }
        Ok(self)
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn assignments(&self) -> &[Assignment] {
        &self.assignments
    }

    /// Query returning the identity generated by this insert.
    pub fn identity_command(&self) -> Result<Command> {
        let text = self.dialect.identity_query()?;
        Ok(Command::new(StatementKind::Select, text, Vec::new()))
    }

    /// Execute the insert, then fetch the generated identity.
    ///
    /// The identity query is resolved before anything runs, so dialects
    /// without identity retrieval fail without inserting.
    pub fn execute_and_get_identity(&self, executor: &mut dyn Executor) -> Result<Value> {
        let identity = self.identity_command()?;
        executor.execute(&self.to_command()?)?;
        executor.scalar(&identity)
    }
}

impl Statement for Insert {
    fn kind(&self) -> StatementKind {
        StatementKind::Insert
    }

    fn dialect(&self) -> Dialect {
        self.dialect
    }

    fn to_command(&self) -> Result<Command> {
        require_assignments(&self.assignments)?;
        let mut ctx = RenderContext::new(self.dialect);
        let mut ts = TokenStream::new();

        ts.push(Token::Insert)
            .space()
            .push(Token::Into)
            .space()
            .push(Token::Ident(self.table.clone()))
            .space()
            .lparen()
            .space();
        for (i, assignment) in self.assignments.iter().enumerate() {
            if i > 0 {
                ts.comma();
            }
            ts.push(Token::Ident(assignment.column().to_string()));
        }
        ts.space()
            .rparen()
            .space()
            .push(Token::Values)
            .space()
            .lparen()
            .space();
        for (i, assignment) in self.assignments.iter().enumerate() {
            if i > 0 {
                ts.comma();
            }
            ts.append(&assignment.value_tokens(&mut ctx)?);
        }
        ts.space().rparen();

        Ok(Command::from_tokens(StatementKind::Insert, &ts, ctx))
    }
}

// ============================================================================
// UPDATE
// ============================================================================

/// UPDATE statement.
#[derive(Debug, Clone, PartialEq)]
#[must_use = "DML statements have no effect until rendered or executed"]
pub struct Update {
    dialect: Dialect,
    table: String,
    assignments: Vec<Assignment>,
    filter: Option<Condition>,
}

impl Update {
    pub fn new(dialect: Dialect, table: impl Into<String>) -> Self {
        Self {
            dialect,
            table: table.into(),
            assignments: Vec::new(),
            filter: None,
        }
    }

    /// `column=@PN_NEW_<column>`
    pub fn set(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        assign(
            &mut self.assignments,
            Assignment::Value(Parameter::new_value(column, value)),
        );
        self
    }

    pub fn set_with_type(
        mut self,
        column: impl Into<String>,
        value: impl Into<Value>,
        storage_type: StorageType,
    ) -> Self {
        let parameter = Parameter::new_value(column, value).with_storage_type(storage_type);
        assign(&mut self.assignments, Assignment::Value(parameter));
        self
    }

    /// `column=<sql>` with raw SQL text.
    pub fn set_function(mut self, column: impl Into<String>, sql: impl Into<String>) -> Result<Self> {
        assign(&mut self.assignments, function_assignment(column, sql)?);
        Ok(self)
    }

    /// `column=(SELECT ...)`
    pub fn set_select(mut self, column: impl Into<String>, command: Select) -> Self {
        assign(
            &mut self.assignments,
            Assignment::Query {
                column: column.into(),
                command: Box::new(command),
            },
        );
        self
    }

    /// Set every mapped property of `entity`. Values convert as in
    /// [`Insert::set_entity`].
    pub fn set_entity<T: Serialize + ?Sized>(mut self, mapping: &EntityMapping, entity: &T) -> Result<Self> {
        for assignment in entity_assignments(mapping, entity)? {
            assign(&mut self.assignments, assignment);
        }
        Ok(self)
    }

    /// `column=column+1`
    pub fn increase(mut self, column: impl Into<String>) -> Self {
        let column = column.into();
        let sql = format!("{}+1", column);
        assign(&mut self.assignments, Assignment::Value(Parameter::raw(column, sql)));
        self
    }

    /// `column=column-1`
    pub fn decrease(mut self, column: impl Into<String>) -> Self {
        let column = column.into();
        let sql = format!("{}-1", column);
        assign(&mut self.assignments, Assignment::Value(Parameter::raw(column, sql)));
        self
    }

    /// Match rows whose `column` still holds its original value, bound as
    /// `PN_OLD_<column>`.
    pub fn where_original(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        let column = column.into();
        let parameter = Parameter::old_value(column.clone(), value);
        self.filter(Condition::Basic {
            column,
            operator: Operator::Equal,
            parameters: vec![parameter],
        })
    }

    /// AND a condition into WHERE; `None` leaves WHERE unchanged.
    pub fn filter(mut self, condition: impl Into<Option<Condition>>) -> Self {
        self.filter = condition::and(self.filter.take(), condition);
        self
    }

    /// OR a condition into WHERE; `None` leaves WHERE unchanged.
    pub fn filter_or(mut self, condition: impl Into<Option<Condition>>) -> Self {
        self.filter = condition::or(self.filter.take(), condition);
        self
    }

    /// Translate a predicate expression and AND it into WHERE.
    pub fn where_predicate<R: ColumnResolver + ?Sized>(
        self,
        translator: &PredicateTranslator<'_, R>,
        predicate: &Predicate,
    ) -> Result<Self> {
        let condition = translator.translate(predicate)?;
        Ok(self.filter(condition))
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn assignments(&self) -> &[Assignment] {
        &self.assignments
    }

    pub fn filter_condition(&self) -> Option<&Condition> {
        self.filter.as_ref()
    }
}

impl Statement for Update {
    fn kind(&self) -> StatementKind {
        StatementKind::Update
    }

    fn dialect(&self) -> Dialect {
        self.dialect
    }

    fn to_command(&self) -> Result<Command> {
        require_assignments(&self.assignments)?;
        let mut ctx = RenderContext::new(self.dialect);
        let mut ts = TokenStream::new();

        ts.push(Token::Update)
            .space()
            .push(Token::Ident(self.table.clone()))
            .space()
            .push(Token::Set)
            .space();
        for (i, assignment) in self.assignments.iter().enumerate() {
            if i > 0 {
                ts.comma();
            }
            ts.push(Token::Ident(assignment.column().to_string()))
                .push(Token::Eq)
                .append(&assignment.value_tokens(&mut ctx)?);
        }
        push_where(&mut ts, &self.filter, &mut ctx)?;

        Ok(Command::from_tokens(StatementKind::Update, &ts, ctx))
    }
}

// ============================================================================
// DELETE
// ============================================================================

/// DELETE statement.
#[derive(Debug, Clone, PartialEq)]
#[must_use = "DML statements have no effect until rendered or executed"]
pub struct Delete {
    dialect: Dialect,
    table: String,
    filter: Option<Condition>,
}

impl Delete {
    pub fn new(dialect: Dialect, table: impl Into<String>) -> Self {
        Self {
            dialect,
            table: table.into(),
            filter: None,
        }
    }

    pub fn filter(mut self, condition: impl Into<Option<Condition>>) -> Self {
        self.filter = condition::and(self.filter.take(), condition);
        self
    }

    pub fn filter_or(mut self, condition: impl Into<Option<Condition>>) -> Self {
        self.filter = condition::or(self.filter.take(), condition);
        self
    }

    pub fn where_predicate<R: ColumnResolver + ?Sized>(
        self,
        translator: &PredicateTranslator<'_, R>,
        predicate: &Predicate,
    ) -> Result<Self> {
        let condition = translator.translate(predicate)?;
        Ok(self.filter(condition))
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn filter_condition(&self) -> Option<&Condition> {
        self.filter.as_ref()
    }
}

impl Statement for Delete {
    fn kind(&self) -> StatementKind {
        StatementKind::Delete
    }

    fn dialect(&self) -> Dialect {
        self.dialect
    }

    fn to_command(&self) -> Result<Command> {
        let mut ctx = RenderContext::new(self.dialect);
        let mut ts = TokenStream::new();

        ts.push(Token::Delete)
            .space()
            .push(Token::From)
            .space()
            .push(Token::Ident(self.table.clone()));
        push_where(&mut ts, &self.filter, &mut ctx)?;

        Ok(Command::from_tokens(StatementKind::Delete, &ts, ctx))
    }
}
