//! Solving a [`Model`] with a [`ConstraintEngine`].
//!
//! A solve goes through three phases. The model is validated first, and an invalid model never
//! reaches the engine. A valid model is then compiled into the engine, with one decision variable
//! per singleton and per aggregate element, and one relation per concrete binary expression.
//! Finally a single search for a first solution is run, and its values are projected back onto
//! the variables of the model.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;
use std::time::Instant;

use fnv::FnvHashMap;
use log::debug;
use log::warn;
use workbench_expr::ExpansionError;
use workbench_expr::Operand;
use workbench_expr::VariableReference;

use crate::engine::ConstraintEngine;
use crate::engine::EngineError;
use crate::engine::EngineOperand;
use crate::engine::PumpkinEngine;
use crate::engine::Relation;
use crate::engine::SearchLimits;
use crate::engine::SearchOutcome;
use crate::model::Model;
use crate::model::ValidationError;
use crate::solution::Solution;
use crate::variable::Variable;

/// Limits on a single solve.
#[derive(Clone, Debug, Default)]
pub struct SolveOptions {
    /// The maximum wall-clock time of the whole solve.
    pub time_limit: Option<Duration>,
    /// When raised, the search stops as soon as possible.
    pub interrupt: Option<Arc<AtomicBool>>,
}

/// The phase a [`ModelSolver`] is in, or the way its last solve ended.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SolveStatus {
    #[default]
    NotStarted,
    Validating,
    Compiling,
    Searching,
    InvalidModel,
    Failed,
    Unknown,
    Success,
}

/// The outcome of [`ModelSolver::solve`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SolveResult<'model> {
    /// The model did not pass validation; the engine was not used.
    InvalidModel(Vec<ValidationError>),
    /// The model has no solution.
    Failed,
    /// The search was stopped by a time limit or an interrupt.
    Unknown,
    Success(Solution<'model>),
}

impl<'model> SolveResult<'model> {
    pub fn status(&self) -> SolveStatus {
        match self {
            SolveResult::InvalidModel(_) => SolveStatus::InvalidModel,
            SolveResult::Failed => SolveStatus::Failed,
            SolveResult::Unknown => SolveStatus::Unknown,
            SolveResult::Success(_) => SolveStatus::Success,
        }
    }

    pub fn solution(&self) -> Option<&Solution<'model>> {
        match self {
            SolveResult::Success(solution) => Some(solution),
            _ => None,
        }
    }

    pub fn into_solution(self) -> Option<Solution<'model>> {
        match self {
            SolveResult::Success(solution) => Some(solution),
            _ => None,
        }
    }
}

/// Compilation failures that validation should have ruled out, except for root conflicts.
#[derive(Debug, thiserror::Error)]
enum CompileError {
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("the domain of '{0}' cannot be resolved")]
    UnresolvedDomain(String),
    #[error("'{0}' does not refer to a decision variable")]
    UnknownReference(String),
    #[error("constraint '{constraint}' cannot be expanded: {source}")]
    Expansion {
        constraint: String,
        source: ExpansionError,
    },
}

enum Slot<Var> {
    Singleton(Var),
    /// The decision variables of the elements, starting with element 1.
    Aggregate(Vec<Var>),
}

#[derive(Debug, Default)]
pub struct ModelSolver {
    options: SolveOptions,
    status: SolveStatus,
}

impl ModelSolver {
    pub fn new(options: SolveOptions) -> ModelSolver {
        ModelSolver {
            options,
            status: SolveStatus::NotStarted,
        }
    }

    pub fn options(&self) -> &SolveOptions {
        &self.options
    }

    /// The current phase, or how the last solve ended.
    pub fn status(&self) -> SolveStatus {
        self.status
    }

    /// Solve `model` with a fresh [`PumpkinEngine`].
    pub fn solve<'model>(&mut self, model: &'model Model) -> SolveResult<'model> {
        let mut engine = PumpkinEngine::new();
        self.solve_with(model, &mut engine)
    }

    /// Solve `model` with the given engine, which should not have been used before.
    pub fn solve_with<'model, E: ConstraintEngine>(
        &mut self,
        model: &'model Model,
        engine: &mut E,
    ) -> SolveResult<'model> {
        let limits = SearchLimits {
            deadline: self
                .options
                .time_limit
                .and_then(|limit| Instant::now().checked_add(limit)),
            interrupt: self.options.interrupt.clone(),
        };

        self.transition(SolveStatus::Validating);
        let errors = model.diagnose();
        if !errors.is_empty() {
            debug!("model '{}' has {} validation errors", model.name(), errors.len());
            return self.finish(SolveResult::InvalidModel(errors));
        }

        self.transition(SolveStatus::Compiling);
        let variables = match compile(model, engine) {
            Ok(variables) => variables,
            Err(CompileError::Engine(error)) => {
                debug!("{error}");
                return self.finish(SolveResult::Failed);
            }
            Err(error) => {
                warn!("failed to compile a validated model: {error}");
                return self.finish(SolveResult::Failed);
            }
        };

        if limits.is_reached() {
            return self.finish(SolveResult::Unknown);
        }

        self.transition(SolveStatus::Searching);
        let result = match engine.search_first(&variables, &limits) {
            SearchOutcome::Solution(values) => match Solution::from_values(model, values) {
                Some(solution) => SolveResult::Success(solution),
                None => {
                    warn!("the engine returned the wrong number of values");
                    SolveResult::Failed
                }
            },
            SearchOutcome::Infeasible => SolveResult::Failed,
            SearchOutcome::Unknown => SolveResult::Unknown,
        };

        self.finish(result)
    }

    fn finish<'model>(&mut self, result: SolveResult<'model>) -> SolveResult<'model> {
        self.transition(result.status());
        result
    }

    fn transition(&mut self, status: SolveStatus) {
        debug!("solve status {:?} -> {:?}", self.status, status);
        self.status = status;
    }
}

/// Create the decision variables and post the constraints of a validated model. Returns the
/// decision variables in declaration order.
fn compile<E: ConstraintEngine>(
    model: &Model,
    engine: &mut E,
) -> Result<Vec<E::Variable>, CompileError> {
    let mut variables = vec![];
    let mut slots: FnvHashMap<&str, Slot<E::Variable>> = FnvHashMap::default();

    for variable in model.variables() {
        match variable {
            Variable::Singleton(singleton) => {
                let band = singleton
                    .domain()
                    .and_then(|domain| model.resolve_domain(domain))
                    .ok_or_else(|| CompileError::UnresolvedDomain(singleton.name().to_owned()))?;

                let decision = engine.new_variable(singleton.name(), band);
                let _ = slots.insert(singleton.name(), Slot::Singleton(decision));
                variables.push(decision);
            }
            Variable::Aggregate(aggregate) => {
                let mut elements = Vec::with_capacity(aggregate.size());

                for element in aggregate.elements() {
                    let band = element
                        .domain
                        .as_ref()
                        .and_then(|domain| model.resolve_domain(domain))
                        .ok_or_else(|| CompileError::UnresolvedDomain(element.name.clone()))?;

                    let decision = engine.new_variable(&element.name, band);
                    elements.push(decision);
                    variables.push(decision);
                }

                let _ = slots.insert(aggregate.name(), Slot::Aggregate(elements));
            }
        }
    }

    let lookup = |reference: &VariableReference| {
        let slot = slots.get(reference.name.as_str());

        let decision = match (slot, reference.literal_subscript()) {
            (Some(Slot::Singleton(decision)), None) => Some(*decision),
            (Some(Slot::Aggregate(elements)), Some(index)) => usize::try_from(index)
                .ok()
                .and_then(|index| index.checked_sub(1))
                .and_then(|idx| elements.get(idx))
                .copied(),
            _ => None,
        };

        decision.ok_or_else(|| CompileError::UnknownReference(reference.to_string()))
    };

    let mut posted = 0_usize;
    for constraint in model.constraints() {
        let expressions = constraint
            .expand(model)
            .map_err(|source| CompileError::Expansion {
                constraint: constraint.name().to_owned(),
                source,
            })?;

        for expression in expressions {
            let rhs = match &expression.right {
                Operand::Literal(value) => EngineOperand::Constant(*value),
                Operand::Variable(reference) => EngineOperand::Variable(lookup(reference)?),
            };

            engine.post(Relation {
                lhs: lookup(&expression.left)?,
                operator: expression.operator,
                rhs,
            })?;
            posted += 1;
        }
    }

    debug!(
        "compiled {} decision variables and {posted} relations",
        variables.len()
    );

    Ok(variables)
}
