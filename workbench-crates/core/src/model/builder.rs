use std::fmt::Display;
use std::fmt::Formatter;

use workbench_expr::ParseError;

use super::DomainOverrideError;
use super::Model;
use crate::constraint::Constraint;
use crate::domain::ArgumentError;
use crate::domain::Band;
use crate::domain::Domain;
use crate::domain::SharedDomain;
use crate::variable::Variable;

/// Builds a [`Model`] from textual expressions.
///
/// Every method records its failure instead of returning it, so a whole model can be described
/// in one chain; [`ModelBuilder::build`] reports all failures at once.
///
/// ```
/// use workbench_core::Model;
///
/// let model = Model::builder("queens")
///     .aggregate("q", 4, "1..4")
///     .constraint("rows", "$q[i] <> $q[j] | i,j in 1..size(q),i+1..size(q)")
///     .build()
///     .unwrap();
///
/// assert_eq!(1, model.constraints().count());
/// ```
#[derive(Debug)]
pub struct ModelBuilder {
    model: Model,
    failures: Vec<BuildFailure>,
}

impl ModelBuilder {
    pub(crate) fn new(model: Model) -> ModelBuilder {
        ModelBuilder {
            model,
            failures: vec![],
        }
    }

    /// Declare a shared domain, e.g. `shared_domain("digits", "1..9")`.
    pub fn shared_domain(mut self, name: &str, range: &str) -> Self {
        let domain = range
            .parse::<Band>()
            .map_err(|source| BuildFailure::Parse {
                item: name.to_owned(),
                source,
            })
            .and_then(|band| {
                SharedDomain::new(name, band).map_err(|source| BuildFailure::Argument {
                    item: name.to_owned(),
                    source,
                })
            });

        match domain {
            Ok(domain) => self.model.add_shared_domain(domain),
            Err(failure) => self.failures.push(failure),
        }

        self
    }

    /// Declare a singleton variable whose domain is an inline range or the name of a shared
    /// domain.
    pub fn singleton(mut self, name: &str, domain: &str) -> Self {
        let variable = self
            .domain(name, domain)
            .and_then(|domain| Variable::singleton(name, domain).map_err(|e| argument(name, e)));

        self.push_variable(variable);
        self
    }

    pub fn aggregate(mut self, name: &str, size: usize, domain: &str) -> Self {
        let variable = self.domain(name, domain).and_then(|domain| {
            Variable::aggregate(name, size, domain).map_err(|e| argument(name, e))
        });

        self.push_variable(variable);
        self
    }

    /// Override the domain of one element of an aggregate declared earlier in the chain.
    pub fn override_element(mut self, aggregate: &str, index: usize, range: &str) -> Self {
        let result = range
            .parse::<Band>()
            .map_err(|source| BuildFailure::Parse {
                item: format!("{aggregate}[{index}]"),
                source,
            })
            .and_then(|band| {
                self.model
                    .override_element_domain(aggregate, index, band)
                    .map_err(BuildFailure::Override)
            });

        if let Err(failure) = result {
            self.failures.push(failure);
        }

        self
    }

    /// Add a constraint defined by a binary expression or an expander.
    pub fn constraint(mut self, name: &str, text: &str) -> Self {
        match Constraint::parse(name, text) {
            Ok(constraint) => self.model.add_constraint(constraint),
            Err(source) => self.failures.push(BuildFailure::Parse {
                item: name.to_owned(),
                source,
            }),
        }

        self
    }

    /// The model, if every step succeeded. The model is not validated.
    pub fn build(self) -> Result<Model, BuildError> {
        if self.failures.is_empty() {
            Ok(self.model)
        } else {
            Err(BuildError {
                failures: self.failures,
            })
        }
    }

    fn domain(&self, name: &str, text: &str) -> Result<Option<Domain>, BuildFailure> {
        if text.trim().is_empty() {
            return Ok(None);
        }

        text.parse::<Domain>()
            .map(Some)
            .map_err(|source| BuildFailure::Parse {
                item: name.to_owned(),
                source,
            })
    }

    fn push_variable(&mut self, variable: Result<Variable, BuildFailure>) {
        match variable {
            Ok(variable) => self.model.add_variable(variable),
            Err(failure) => self.failures.push(failure),
        }
    }
}

fn argument(item: &str, source: ArgumentError) -> BuildFailure {
    BuildFailure::Argument {
        item: item.to_owned(),
        source,
    }
}

/// A single failed step of a [`ModelBuilder`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum BuildFailure {
    #[error("'{item}': {source}")]
    Parse { item: String, source: ParseError },
    #[error("'{item}': {source}")]
    Argument { item: String, source: ArgumentError },
    #[error(transparent)]
    Override(DomainOverrideError),
}

/// Every failed step of a [`ModelBuilder`], in the order they were made.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuildError {
    pub failures: Vec<BuildFailure>,
}

impl Display for BuildError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (idx, failure) in self.failures.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{failure}")?;
        }

        Ok(())
    }
}

impl std::error::Error for BuildError {}
