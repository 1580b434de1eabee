use std::fmt::Display;
use std::fmt::Formatter;

use itertools::Itertools;
use workbench_expr::BinaryExpression;
use workbench_expr::ExpansionError;
use workbench_expr::Operand;
use workbench_expr::VariableReference;

use crate::model::Model;
use crate::variable::Variable;

/// The value(s) assigned to one variable of the model.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum BoundVariable {
    Singleton { name: String, value: i32 },
    /// The values of the elements, starting with element 1.
    Aggregate { name: String, values: Vec<i32> },
}

impl BoundVariable {
    pub fn name(&self) -> &str {
        match self {
            BoundVariable::Singleton { name, .. } | BoundVariable::Aggregate { name, .. } => name,
        }
    }
}

impl Display for BoundVariable {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            BoundVariable::Singleton { name, value } => write!(f, "{name} = {value}"),
            BoundVariable::Aggregate { name, values } => {
                write!(f, "{name} = [{}]", values.iter().join(", "))
            }
        }
    }
}

/// Why a solution does not satisfy its model.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CheckError {
    #[error("constraint '{constraint}' is violated by '{expression}'")]
    Violated {
        constraint: String,
        expression: BinaryExpression,
    },
    #[error("constraint '{constraint}' refers to '{reference}', which has no value")]
    Unbound {
        constraint: String,
        reference: String,
    },
    #[error("constraint '{constraint}' cannot be expanded: {source}")]
    Expansion {
        constraint: String,
        source: ExpansionError,
    },
}

/// An assignment of a value to every variable of a model.
///
/// The solution refers to the model it was found for and cannot be changed after it is created.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Solution<'model> {
    model: &'model Model,
    variables: Vec<BoundVariable>,
}

impl<'model> Solution<'model> {
    /// Distribute `values`, one per decision variable in declaration order with aggregates
    /// contributing one value per element, over the variables of `model`.
    ///
    /// Returns `None` if the number of values does not match the model.
    pub(crate) fn from_values(
        model: &'model Model,
        values: Vec<i32>,
    ) -> Option<Solution<'model>> {
        let mut values = values.into_iter();
        let mut variables = vec![];

        for variable in model.variables() {
            let bound = match variable {
                Variable::Singleton(singleton) => BoundVariable::Singleton {
                    name: singleton.name().to_owned(),
                    value: values.next()?,
                },
                Variable::Aggregate(aggregate) => {
                    let elements = values.by_ref().take(aggregate.size()).collect::<Vec<_>>();
                    if elements.len() != aggregate.size() {
                        return None;
                    }

                    BoundVariable::Aggregate {
                        name: aggregate.name().to_owned(),
                        values: elements,
                    }
                }
            };

            variables.push(bound);
        }

        if values.next().is_some() {
            return None;
        }

        Some(Solution { model, variables })
    }

    pub fn model(&self) -> &'model Model {
        self.model
    }

    pub fn variables(&self) -> impl Iterator<Item = &BoundVariable> + '_ {
        self.variables.iter()
    }

    pub fn get(&self, name: &str) -> Option<&BoundVariable> {
        self.variables.iter().find(|variable| variable.name() == name)
    }

    /// The value of the singleton variable `name`.
    pub fn value(&self, name: &str) -> Option<i32> {
        match self.get(name)? {
            BoundVariable::Singleton { value, .. } => Some(*value),
            BoundVariable::Aggregate { .. } => None,
        }
    }

    /// The value of element `index` of aggregate `name`, counting from 1.
    pub fn element(&self, name: &str, index: usize) -> Option<i32> {
        match self.get(name)? {
            BoundVariable::Singleton { .. } => None,
            BoundVariable::Aggregate { values, .. } => {
                index.checked_sub(1).and_then(|idx| values.get(idx)).copied()
            }
        }
    }

    /// The value of a reference with a literal subscript, as produced by expanding a constraint.
    pub fn reference_value(&self, reference: &VariableReference) -> Option<i32> {
        match reference.literal_subscript() {
            None => self.value(&reference.name),
            Some(index) => {
                let index = usize::try_from(index).ok()?;
                self.element(&reference.name, index)
            }
        }
    }

    /// Verify that every constraint of the model holds under this solution.
    pub fn check(&self) -> Result<(), CheckError> {
        for constraint in self.model.constraints() {
            let expressions = constraint
                .expand(self.model)
                .map_err(|source| CheckError::Expansion {
                    constraint: constraint.name().to_owned(),
                    source,
                })?;

            for expression in expressions {
                let unbound = |reference: &VariableReference| CheckError::Unbound {
                    constraint: constraint.name().to_owned(),
                    reference: reference.to_string(),
                };

                let lhs = self
                    .reference_value(&expression.left)
                    .ok_or_else(|| unbound(&expression.left))?;
                let rhs = match &expression.right {
                    Operand::Literal(value) => *value,
                    Operand::Variable(reference) => self
                        .reference_value(reference)
                        .ok_or_else(|| unbound(reference))?,
                };

                if !expression.operator.holds(lhs, rhs) {
                    return Err(CheckError::Violated {
                        constraint: constraint.name().to_owned(),
                        expression,
                    });
                }
            }
        }

        Ok(())
    }
}

impl Display for Solution<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for variable in &self.variables {
            writeln!(f, "{variable}")?;
        }

        Ok(())
    }
}
