//! # workbench-core
//!
//! Workbench models describe a constraint satisfaction problem over integer variables:
//! - [`Variable`]s are either singletons or aggregates, i.e. fixed-size arrays indexed from 1.
//! - Each variable has a [`Domain`], which is either an inline [`Band`] or a reference to a
//!   [`SharedDomain`] declared on the model.
//! - [`Constraint`]s relate two variables, or a variable and a literal. An expander constraint is
//!   a template instantiated once per combination of its counters.
//!
//! A [`Model`] is checked with [`Model::diagnose`], and solved with [`ModelSolver`], which
//! compiles the model into a [`ConstraintEngine`] and searches for a first solution.
//!
//! ```
//! use workbench_core::Model;
//! use workbench_core::ModelSolver;
//!
//! let model = Model::builder("example")
//!     .shared_domain("digits", "1..9")
//!     .singleton("x", "digits")
//!     .singleton("y", "digits")
//!     .constraint("c", "x > y")
//!     .build()
//!     .unwrap();
//!
//! let mut solver = ModelSolver::default();
//! let solution = solver.solve(&model).into_solution().unwrap();
//!
//! assert!(solution.value("x").unwrap() > solution.value("y").unwrap());
//! ```

mod constraint;
mod domain;
pub mod engine;
mod model;
mod solution;
mod solver;
mod variable;

pub use constraint::Constraint;
pub use domain::ArgumentError;
pub use domain::Band;
pub use domain::Domain;
pub use domain::SharedDomain;
pub use engine::ConstraintEngine;
pub use engine::PumpkinEngine;
pub use model::BuildError;
pub use model::BuildFailure;
pub use model::DomainOverrideError;
pub use model::Model;
pub use model::ModelBuilder;
pub use model::ValidationError;
pub use solution::BoundVariable;
pub use solution::CheckError;
pub use solution::Solution;
pub use solver::ModelSolver;
pub use solver::SolveOptions;
pub use solver::SolveResult;
pub use solver::SolveStatus;
pub use variable::AggregateElement;
pub use variable::AggregateVariable;
pub use variable::SingletonVariable;
pub use variable::Variable;
pub use workbench_expr as expr;
