use std::fmt::Display;
use std::fmt::Formatter;

use workbench_expr::parse_constraint_expression;
use workbench_expr::BinaryExpression;
use workbench_expr::ConstraintExpression;
use workbench_expr::ExpansionContext;
use workbench_expr::ExpansionError;
use workbench_expr::ParseError;

/// A named constraint of a model, defined by a binary expression, an expander or nothing at all.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Constraint {
    name: String,
    expression: ConstraintExpression,
}

impl Constraint {
    pub fn new(name: impl Into<String>, expression: ConstraintExpression) -> Constraint {
        Constraint {
            name: name.into(),
            expression,
        }
    }

    /// Create a constraint from its textual definition.
    pub fn parse(name: impl Into<String>, text: &str) -> Result<Constraint, ParseError> {
        let expression = parse_constraint_expression(text)
            .into_result()?
            .unwrap_or_default();

        Ok(Constraint::new(name, expression))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn expression(&self) -> &ConstraintExpression {
        &self.expression
    }

    pub fn set_expression(&mut self, expression: ConstraintExpression) {
        self.expression = expression;
    }

    /// The concrete binary expressions the constraint stands for, with literal subscripts.
    pub fn expand<C: ExpansionContext + ?Sized>(
        &self,
        context: &C,
    ) -> Result<Vec<BinaryExpression>, ExpansionError> {
        self.expression.expand(context)
    }
}

impl Display for Constraint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.name, self.expression)
    }
}
