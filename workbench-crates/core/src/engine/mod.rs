//! The capability a constraint solving backend has to offer to solve a [`crate::Model`].

mod pumpkin;

use std::fmt::Debug;
use std::fmt::Display;
use std::fmt::Formatter;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Instant;

pub use pumpkin::PumpkinEngine;
use workbench_expr::OperatorType;

use crate::domain::Band;

/// A constraint solving session.
///
/// Variables and relations are added to the session one by one, after which a single search for
/// a first solution is run.
pub trait ConstraintEngine {
    /// The handle of a decision variable in the session.
    type Variable: Copy + Debug;

    /// Create a bounded integer decision variable.
    fn new_variable(&mut self, name: &str, band: Band) -> Self::Variable;

    /// Add a relation to the session. An error means the session can have no solution.
    fn post(&mut self, relation: Relation<Self::Variable>) -> Result<(), EngineError>;

    /// Search for a first solution, assigning the variables in the given order and trying the
    /// smallest value first. On success the outcome holds one value per given variable.
    fn search_first(
        &mut self,
        variables: &[Self::Variable],
        limits: &SearchLimits,
    ) -> SearchOutcome;
}

/// `lhs operator rhs`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Relation<Var> {
    pub lhs: Var,
    pub operator: OperatorType,
    pub rhs: EngineOperand<Var>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineOperand<Var> {
    Variable(Var),
    Constant(i32),
}

impl<Var: Debug> Display for Relation<Var> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.rhs {
            EngineOperand::Variable(rhs) => write!(f, "{:?} {} {:?}", self.lhs, self.operator, rhs),
            EngineOperand::Constant(rhs) => write!(f, "{:?} {} {rhs}", self.lhs, self.operator),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("posting '{0}' leads to a conflict at the root")]
    RootConflict(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SearchOutcome {
    /// The value of every searched variable, in the order they were given.
    Solution(Vec<i32>),
    Infeasible,
    /// The search was stopped before it could conclude.
    Unknown,
}

/// When a search has to give up.
#[derive(Clone, Debug, Default)]
pub struct SearchLimits {
    pub deadline: Option<Instant>,
    pub interrupt: Option<Arc<AtomicBool>>,
}

impl SearchLimits {
    pub fn is_reached(&self) -> bool {
        let timed_out = self
            .deadline
            .is_some_and(|deadline| Instant::now() >= deadline);
        let interrupted = self
            .interrupt
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed));

        timed_out || interrupted
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn no_limits_are_never_reached() {
        assert!(!SearchLimits::default().is_reached());
    }

    #[test]
    fn expired_deadline_is_reached() {
        let limits = SearchLimits {
            deadline: Instant::now().checked_sub(Duration::from_millis(1)),
            interrupt: None,
        };

        assert!(limits.is_reached());
    }

    #[test]
    fn interrupt_is_reached_once_raised() {
        let flag = Arc::new(AtomicBool::new(false));
        let limits = SearchLimits {
            deadline: None,
            interrupt: Some(Arc::clone(&flag)),
        };

        assert!(!limits.is_reached());
        flag.store(true, Ordering::Relaxed);
        assert!(limits.is_reached());
    }
}
