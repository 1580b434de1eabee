use fnv::FnvHashSet;
use itertools::Itertools;
use log::warn;
use workbench_expr::BinaryExpression;
use workbench_expr::ExpansionError;
use workbench_expr::VariableReference;

use super::Model;
use crate::constraint::Constraint;
use crate::variable::Variable;

/// A problem that prevents a model from being solved.
#[derive(Clone, Debug, PartialEq, Eq, Hash, thiserror::Error)]
pub enum ValidationError {
    #[error("variable '{0}' is declared more than once")]
    DuplicateVariable(String),
    #[error("domain '{0}' is declared more than once")]
    DuplicateDomain(String),
    #[error("variable '{0}' has no domain")]
    MissingDomain(String),
    #[error("variable '{variable}' refers to the undeclared domain '{domain}'")]
    UnknownDomain { variable: String, domain: String },
    #[error("constraint '{constraint}' refers to the undeclared variable '{variable}'")]
    UnknownVariable {
        constraint: String,
        variable: String,
    },
    #[error("constraint '{constraint}' indexes the singleton variable '{variable}'")]
    SubscriptOnSingleton {
        constraint: String,
        variable: String,
    },
    #[error("constraint '{constraint}' refers to aggregate '{variable}' without an index")]
    MissingSubscript {
        constraint: String,
        variable: String,
    },
    #[error("constraint '{constraint}' uses index {index} of '{variable}', which has {size} elements")]
    SubscriptOutOfRange {
        constraint: String,
        variable: String,
        index: i32,
        size: usize,
    },
    #[error("constraint '{constraint}' cannot be expanded: {source}")]
    Expansion {
        constraint: String,
        source: ExpansionError,
    },
}

impl Model {
    /// Every problem in the model, without modifying it. An empty list means the model can be
    /// compiled.
    pub fn diagnose(&self) -> Vec<ValidationError> {
        let mut errors = vec![];

        self.check_unique_names(&mut errors);
        self.check_domains(&mut errors);

        for constraint in &self.constraints {
            self.check_constraint(constraint, &mut errors);
        }

        errors.into_iter().unique().collect()
    }

    fn check_unique_names(&self, errors: &mut Vec<ValidationError>) {
        errors.extend(
            self.variables
                .iter()
                .map(Variable::name)
                .duplicates()
                .map(|name| ValidationError::DuplicateVariable(name.to_owned())),
        );

        errors.extend(
            self.shared_domains
                .iter()
                .map(|domain| domain.name())
                .duplicates()
                .map(|name| ValidationError::DuplicateDomain(name.to_owned())),
        );
    }

    fn check_domains(&self, errors: &mut Vec<ValidationError>) {
        for variable in &self.variables {
            let Some(domain) = variable.domain() else {
                errors.push(ValidationError::MissingDomain(variable.name().to_owned()));
                continue;
            };

            if self.resolve_domain(domain).is_none() {
                errors.push(ValidationError::UnknownDomain {
                    variable: variable.name().to_owned(),
                    domain: domain.to_string(),
                });
            }
        }
    }

    fn check_constraint(&self, constraint: &Constraint, errors: &mut Vec<ValidationError>) {
        let expressions = match constraint.expand(self) {
            Ok(expressions) => expressions,
            Err(source) => {
                errors.push(ValidationError::Expansion {
                    constraint: constraint.name().to_owned(),
                    source,
                });
                return;
            }
        };

        if expressions.is_empty() && !constraint.expression().is_empty() {
            warn!("constraint '{}' expands to nothing", constraint.name());
        }

        // Instances of an expander tend to repeat the same reference.
        let mut checked = FnvHashSet::default();

        for reference in expressions.iter().flat_map(BinaryExpression::references) {
            if checked.insert(reference) {
                if let Some(error) = self.check_reference(constraint.name(), reference) {
                    errors.push(error);
                }
            }
        }
    }

    fn check_reference(
        &self,
        constraint: &str,
        reference: &VariableReference,
    ) -> Option<ValidationError> {
        let constraint = constraint.to_owned();
        let Some(variable) = self.variable(&reference.name) else {
            return Some(ValidationError::UnknownVariable {
                constraint,
                variable: reference.name.clone(),
            });
        };

        match (variable, reference.literal_subscript()) {
            (Variable::Singleton(_), None) => None,
            (Variable::Singleton(_), Some(_)) => Some(ValidationError::SubscriptOnSingleton {
                constraint,
                variable: reference.name.clone(),
            }),
            (Variable::Aggregate(_), None) => Some(ValidationError::MissingSubscript {
                constraint,
                variable: reference.name.clone(),
            }),
            (Variable::Aggregate(aggregate), Some(index)) => {
                let in_range = usize::try_from(index)
                    .is_ok_and(|index| aggregate.contains_index(index));

                (!in_range).then(|| ValidationError::SubscriptOutOfRange {
                    constraint,
                    variable: reference.name.clone(),
                    index,
                    size: aggregate.size(),
                })
            }
        }
    }
}
