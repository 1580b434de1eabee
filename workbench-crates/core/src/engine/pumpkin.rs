use log::trace;
use pumpkin_core::branching::branchers::independent_variable_value_brancher::IndependentVariableValueBrancher;
use pumpkin_core::branching::value_selection::InDomainMin;
use pumpkin_core::branching::variable_selection::InputOrder;
use pumpkin_core::constraints::binary_equals;
use pumpkin_core::constraints::binary_less_than;
use pumpkin_core::constraints::binary_less_than_or_equals;
use pumpkin_core::constraints::binary_not_equals;
use pumpkin_core::results::ProblemSolution;
use pumpkin_core::results::SatisfactionResult;
use pumpkin_core::termination::TerminationCondition;
use pumpkin_core::variables::DomainId;
use pumpkin_core::Solver;
use workbench_expr::OperatorType;

use super::ConstraintEngine;
use super::EngineError;
use super::EngineOperand;
use super::Relation;
use super::SearchLimits;
use super::SearchOutcome;
use crate::domain::Band;

/// A [`ConstraintEngine`] backed by the Pumpkin solver.
#[derive(Debug, Default)]
pub struct PumpkinEngine {
    solver: Solver,
}

impl PumpkinEngine {
    pub fn new() -> PumpkinEngine {
        PumpkinEngine::default()
    }
}

impl ConstraintEngine for PumpkinEngine {
    type Variable = DomainId;

    fn new_variable(&mut self, name: &str, band: Band) -> DomainId {
        self.solver
            .new_named_bounded_integer(band.lower(), band.upper(), name)
    }

    fn post(&mut self, relation: Relation<DomainId>) -> Result<(), EngineError> {
        trace!("posting {relation}");

        // The binary relations of the solver only take variables, so constants become fixed
        // variables.
        let lhs = relation.lhs;
        let rhs = match relation.rhs {
            EngineOperand::Variable(rhs) => rhs,
            EngineOperand::Constant(value) => self.solver.new_bounded_integer(value, value),
        };

        let tag = self.solver.new_constraint_tag();
        let result = match relation.operator {
            OperatorType::Equals => self
                .solver
                .add_constraint(binary_equals(lhs, rhs, tag))
                .post(),
            OperatorType::NotEqual => self
                .solver
                .add_constraint(binary_not_equals(lhs, rhs, tag))
                .post(),
            OperatorType::Less => self
                .solver
                .add_constraint(binary_less_than(lhs, rhs, tag))
                .post(),
            OperatorType::LessThanOrEqual => self
                .solver
                .add_constraint(binary_less_than_or_equals(lhs, rhs, tag))
                .post(),
            OperatorType::Greater => self
                .solver
                .add_constraint(binary_less_than(rhs, lhs, tag))
                .post(),
            OperatorType::GreaterThanOrEqual => self
                .solver
                .add_constraint(binary_less_than_or_equals(rhs, lhs, tag))
                .post(),
        };

        result.map_err(|_| EngineError::RootConflict(relation.to_string()))
    }

    fn search_first(&mut self, variables: &[DomainId], limits: &SearchLimits) -> SearchOutcome {
        let mut brancher =
            IndependentVariableValueBrancher::new(InputOrder::new(variables), InDomainMin);
        let mut termination = LimitTermination {
            limits: limits.clone(),
        };

        let outcome = match self.solver.satisfy(&mut brancher, &mut termination) {
            SatisfactionResult::Satisfiable(satisfiable) => {
                let solution = satisfiable.solution();
                SearchOutcome::Solution(
                    variables
                        .iter()
                        .map(|variable| solution.get_integer_value(*variable))
                        .collect(),
                )
            }
            SatisfactionResult::Unsatisfiable(..) => SearchOutcome::Infeasible,
            SatisfactionResult::Unknown(..) => SearchOutcome::Unknown,
        };
        outcome
    }
}

/// Stops the search once a deadline passes or an interrupt is raised.
#[derive(Clone, Debug)]
struct LimitTermination {
    limits: SearchLimits,
}

impl TerminationCondition for LimitTermination {
    fn should_stop(&mut self) -> bool {
        self.limits.is_reached()
    }
}
