//! Rendering state shared by every statement and condition.
//!
//! A [`RenderContext`] lives for exactly one render of a root statement. It
//! numbers pending parameters in placeholder order and collects every bound
//! parameter, so the resulting list always lines up with the text. Embedded
//! subqueries render into the same context, which renames their parameters
//! into the outer statement's namespace.

use super::dialect::Dialect;
use super::parameter::{Parameter, ParameterName};
use super::token::Token;

#[derive(Debug)]
pub struct RenderContext {
    dialect: Dialect,
    parameters: Vec<Parameter>,
    next_index: usize,
}

impl RenderContext {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            parameters: Vec::new(),
            next_index: 0,
        }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Emit the token for `parameter`, recording it if bound.
    ///
    /// Unbound parameters are spliced as raw SQL and never recorded.
    pub fn bind(&mut self, parameter: &Parameter) -> Token {
        if let Some(sql) = parameter.raw_sql() {
            return Token::Raw(sql.to_string());
        }

        let name = match parameter.parameter_name() {
            ParameterName::Fixed(name) => name.clone(),
            ParameterName::Pending => {
                let name = format!("IDX_{}", self.next_index);
                self.next_index += 1;
                name
            }
        };

        self.parameters
            .push(parameter.clone().with_name(name.clone()));
        Token::Param(name)
    }

    /// Parameters recorded so far, in placeholder order.
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn into_parameters(self) -> Vec<Parameter> {
        self.parameters
    }
}
