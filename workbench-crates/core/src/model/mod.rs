//! The model: the owner of every variable, shared domain and constraint.

mod builder;
mod validation;

use workbench_expr::ExpansionContext;

pub use builder::BuildError;
pub use builder::BuildFailure;
pub use builder::ModelBuilder;
pub use validation::ValidationError;

use crate::constraint::Constraint;
use crate::domain::Band;
use crate::domain::Domain;
use crate::domain::SharedDomain;
use crate::variable::AggregateVariable;
use crate::variable::Variable;

/// Why the domain of an aggregate element could not be overridden.
#[derive(Clone, Debug, PartialEq, Eq, Hash, thiserror::Error)]
pub enum DomainOverrideError {
    #[error("there is no aggregate named '{0}'")]
    UnknownAggregate(String),
    #[error("the domain of aggregate '{0}' cannot be resolved")]
    UnresolvedDomain(String),
    #[error("index {index} is outside 1..{size} of aggregate '{aggregate}'")]
    IndexOutOfRange {
        aggregate: String,
        index: usize,
        size: usize,
    },
    #[error("{band} is not within the domain {base} of aggregate '{aggregate}'")]
    OutsideBand {
        aggregate: String,
        band: Band,
        base: Band,
    },
}

/// A constraint model.
///
/// Names are not required to be unique when elements are added; duplicates are reported by
/// [`Model::diagnose`]. Lookups by name return the first match in declaration order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Model {
    name: String,
    variables: Vec<Variable>,
    shared_domains: Vec<SharedDomain>,
    constraints: Vec<Constraint>,
    errors: Vec<ValidationError>,
}

impl Model {
    pub fn new(name: impl Into<String>) -> Model {
        Model {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Start building a model from textual expressions.
    pub fn builder(name: impl Into<String>) -> ModelBuilder {
        ModelBuilder::new(Model::new(name))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn add_variable(&mut self, variable: Variable) {
        self.variables.push(variable);
    }

    pub fn add_shared_domain(&mut self, domain: SharedDomain) {
        self.shared_domains.push(domain);
    }

    pub fn add_constraint(&mut self, constraint: Constraint) {
        self.constraints.push(constraint);
    }

    /// Remove the first constraint called `name`.
    pub fn remove_constraint(&mut self, name: &str) -> Option<Constraint> {
        let position = self
            .constraints
            .iter()
            .position(|constraint| constraint.name() == name)?;

        Some(self.constraints.remove(position))
    }

    pub fn variables(&self) -> impl Iterator<Item = &Variable> + '_ {
        self.variables.iter()
    }

    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.variables.iter().find(|variable| variable.name() == name)
    }

    pub fn variable_mut(&mut self, name: &str) -> Option<&mut Variable> {
        self.variables
            .iter_mut()
            .find(|variable| variable.name() == name)
    }

    pub fn aggregate(&self, name: &str) -> Option<&AggregateVariable> {
        self.variable(name).and_then(Variable::as_aggregate)
    }

    pub fn aggregate_mut(&mut self, name: &str) -> Option<&mut AggregateVariable> {
        self.variable_mut(name).and_then(Variable::as_aggregate_mut)
    }

    pub fn shared_domains(&self) -> impl Iterator<Item = &SharedDomain> + '_ {
        self.shared_domains.iter()
    }

    pub fn shared_domain(&self, name: &str) -> Option<&SharedDomain> {
        self.shared_domains
            .iter()
            .find(|domain| domain.name() == name)
    }

    pub fn constraints(&self) -> impl Iterator<Item = &Constraint> + '_ {
        self.constraints.iter()
    }

    pub fn constraint(&self, name: &str) -> Option<&Constraint> {
        self.constraints
            .iter()
            .find(|constraint| constraint.name() == name)
    }

    /// The band a domain stands for, looking up shared domains by name.
    pub fn resolve_domain(&self, domain: &Domain) -> Option<Band> {
        match domain {
            Domain::Inline(band) => Some(*band),
            Domain::Shared(name) => self.shared_domain(name).map(SharedDomain::band),
        }
    }

    /// Narrow the domain of element `index` of `aggregate` to `band`.
    ///
    /// The band has to lie within the resolved domain of the aggregate at the time of the call.
    pub fn override_element_domain(
        &mut self,
        aggregate: &str,
        index: usize,
        band: Band,
    ) -> Result<(), DomainOverrideError> {
        let variable = self
            .aggregate(aggregate)
            .ok_or_else(|| DomainOverrideError::UnknownAggregate(aggregate.to_owned()))?;

        if !variable.contains_index(index) {
            return Err(DomainOverrideError::IndexOutOfRange {
                aggregate: aggregate.to_owned(),
                index,
                size: variable.size(),
            });
        }

        let base = variable
            .domain()
            .and_then(|domain| self.resolve_domain(domain))
            .ok_or_else(|| DomainOverrideError::UnresolvedDomain(aggregate.to_owned()))?;

        if !band.is_subset_of(&base) {
            return Err(DomainOverrideError::OutsideBand {
                aggregate: aggregate.to_owned(),
                band,
                base,
            });
        }

        if let Some(variable) = self.aggregate_mut(aggregate) {
            variable.set_override(index, band);
        }

        Ok(())
    }

    /// The errors found by the last call to [`Model::validate`].
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Check the model, recording the errors in [`Model::errors`]. Returns whether the model is
    /// valid.
    pub fn validate(&mut self) -> bool {
        self.errors = self.diagnose();
        self.errors.is_empty()
    }
}

impl ExpansionContext for Model {
    fn aggregate_size(&self, name: &str) -> Option<usize> {
        self.aggregate(name).map(AggregateVariable::size)
    }
}
