//! Ansatz template engine
//!
//! Builds on [`ansatz_dsl`] to provide the [`Ansatz`] type and its
//! operations:
//!
//! - **Combination**: `&a + &b` merges two templates additively, giving every
//!   term a leading coefficient parameter
//! - **Mutation**: [`Ansatz::mutate`] swaps function names using the
//!   instance's seeded RNG
//! - **Search**: [`Ansatz::apply_to`] fits parameters against a caller's
//!   [`Objective`] by random search or bounded Nelder–Mead
//!
//! # Example
//!
//! ```rust
//! use ansatz_engine::{from_fn, Ansatz, NumericEvaluator, SearchConfig};
//! use std::collections::HashMap;
//!
//! let a = Ansatz::builder("param1 * sin(param2 * x)")
//!     .variables(["x"])
//!     .functions(["sin", "cos"])
//!     .seed(7)
//!     .build()
//!     .unwrap();
//! let b = Ansatz::builder("x ** param1")
//!     .variables(["x"])
//!     .build()
//!     .unwrap();
//!
//! let c = &a + &b;
//! assert_eq!(c.to_expression(), "param1 * sin(param2 * x) + param3 * x ** param4");
//!
//! let evaluator = NumericEvaluator::new();
//! let objective = from_fn(move |numeric: &str| {
//!     let bindings = HashMap::from([("x".to_string(), 1.0)]);
//!     Ok(evaluator.evaluate(numeric, &bindings)?.abs())
//! });
//!
//! let config = SearchConfig::default().with_trials(50).with_seed(3);
//! let outcome = c.apply_to(objective, &[(-1.0, 1.0); 4], &config).unwrap();
//! assert_eq!(outcome.evaluations, 50);
//! assert_eq!(outcome.best_params.len(), 4);
//! ```

#![deny(unsafe_code)]

mod ansatz;
mod combiner;
mod evaluator;
mod mutator;
mod objective;
mod search;
mod substitution;

pub use ansatz::{Ansatz, AnsatzBuilder};
pub use combiner::{combine, Combined};
pub use evaluator::{EvalError, Function, NumericEvaluator};
pub use mutator::mutate_functions;
pub use objective::{from_fn, FnObjective, GuardedObjective, Objective, ObjectiveError};
pub use search::{
    Direction, NelderMead, Problem, RandomSearch, SearchConfig, SearchMode, SearchOutcome,
    SearchStrategy,
};
pub use substitution::{numeric_literal, substitute};

pub use ansatz_dsl::{AnsatzError, AnsatzResult, Expr, Vocabulary, VocabularyKind};
