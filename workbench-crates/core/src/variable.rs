use std::collections::BTreeMap;

use crate::domain::check_name;
use crate::domain::ArgumentError;
use crate::domain::Band;
use crate::domain::Domain;

/// A decision variable of a model.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Variable {
    Singleton(SingletonVariable),
    Aggregate(AggregateVariable),
}

impl Variable {
    pub fn singleton(
        name: impl Into<String>,
        domain: impl Into<Option<Domain>>,
    ) -> Result<Variable, ArgumentError> {
        SingletonVariable::new(name, domain).map(Variable::Singleton)
    }

    pub fn aggregate(
        name: impl Into<String>,
        size: usize,
        domain: impl Into<Option<Domain>>,
    ) -> Result<Variable, ArgumentError> {
        AggregateVariable::new(name, size, domain).map(Variable::Aggregate)
    }

    pub fn name(&self) -> &str {
        match self {
            Variable::Singleton(singleton) => &singleton.name,
            Variable::Aggregate(aggregate) => &aggregate.name,
        }
    }

    pub fn domain(&self) -> Option<&Domain> {
        match self {
            Variable::Singleton(singleton) => singleton.domain.as_ref(),
            Variable::Aggregate(aggregate) => aggregate.domain.as_ref(),
        }
    }

    pub fn as_aggregate(&self) -> Option<&AggregateVariable> {
        match self {
            Variable::Singleton(_) => None,
            Variable::Aggregate(aggregate) => Some(aggregate),
        }
    }

    pub fn as_aggregate_mut(&mut self) -> Option<&mut AggregateVariable> {
        match self {
            Variable::Singleton(_) => None,
            Variable::Aggregate(aggregate) => Some(aggregate),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SingletonVariable {
    name: String,
    domain: Option<Domain>,
}

impl SingletonVariable {
    pub fn new(
        name: impl Into<String>,
        domain: impl Into<Option<Domain>>,
    ) -> Result<SingletonVariable, ArgumentError> {
        Ok(SingletonVariable {
            name: check_name(name.into())?,
            domain: domain.into(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn domain(&self) -> Option<&Domain> {
        self.domain.as_ref()
    }

    pub fn set_domain(&mut self, domain: impl Into<Option<Domain>>) {
        self.domain = domain.into();
    }
}

/// A fixed-size collection of variables sharing a base domain, indexed from 1.
///
/// Individual elements may have their domain narrowed by an override. Overrides are only checked
/// when they are set; see [`crate::Model::override_element_domain`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AggregateVariable {
    name: String,
    domain: Option<Domain>,
    size: usize,
    overrides: BTreeMap<usize, Band>,
}

impl AggregateVariable {
    pub fn new(
        name: impl Into<String>,
        size: usize,
        domain: impl Into<Option<Domain>>,
    ) -> Result<AggregateVariable, ArgumentError> {
        Ok(AggregateVariable {
            name: check_name(name.into())?,
            domain: domain.into(),
            size,
            overrides: BTreeMap::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn domain(&self) -> Option<&Domain> {
        self.domain.as_ref()
    }

    pub fn set_domain(&mut self, domain: impl Into<Option<Domain>>) {
        self.domain = domain.into();
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Change the number of elements. Shrinking drops the overrides of the removed elements.
    pub fn resize(&mut self, size: usize) {
        self.overrides.retain(|index, _| *index <= size);
        self.size = size;
    }

    pub fn contains_index(&self, index: usize) -> bool {
        (1..=self.size).contains(&index)
    }

    /// The element at `index`, counting from 1.
    pub fn element(&self, index: usize) -> Option<AggregateElement> {
        if !self.contains_index(index) {
            return None;
        }

        let domain = match self.overrides.get(&index) {
            Some(band) => Some(Domain::Inline(*band)),
            None => self.domain.clone(),
        };

        Some(AggregateElement {
            name: format!("{}[{index}]", self.name),
            index,
            domain,
        })
    }

    pub fn elements(&self) -> impl Iterator<Item = AggregateElement> + '_ {
        (1..=self.size).filter_map(|index| self.element(index))
    }

    pub fn override_band(&self, index: usize) -> Option<Band> {
        self.overrides.get(&index).copied()
    }

    /// Remove the override of the element at `index`, returning it.
    pub fn clear_override(&mut self, index: usize) -> Option<Band> {
        self.overrides.remove(&index)
    }

    pub(crate) fn set_override(&mut self, index: usize, band: Band) {
        let _ = self.overrides.insert(index, band);
    }
}

/// One element of an [`AggregateVariable`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AggregateElement {
    pub name: String,
    pub index: usize,
    /// The override if there is one, otherwise the domain of the aggregate.
    pub domain: Option<Domain>,
}
