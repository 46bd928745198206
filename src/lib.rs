//! Exact rational linear programming.
//!
//! The crate solves small LP problems over exact `i64` rational arithmetic
//! with the two-phase Big-M simplex method, constructs the dual of a primal
//! program, and solves one-dimensional transportation (balance) problems by
//! the method of potentials.
//!
//! Problems are stated in a compact textual DSL:
//!
//! ```
//! use linprog_exact::Solver;
//!
//! let mut solver = Solver::new();
//! assert!(solver.set_goal("x1 + x2 => min"));
//! assert!(solver.add_restriction("2x1 + 4x2 <= 16"));
//! assert!(solver.add_restriction("-4x1 + 2x2 <= 8"));
//! assert!(solver.add_restriction("x1 + 3x2 >= 9"));
//!
//! let steps = solver.solve();
//! let last = steps.last().unwrap();
//! assert!(last.valid());
//! ```

use thiserror::Error;

pub mod linalg;
pub mod model;
pub mod rational;
pub mod solvers;

pub use linalg::Matrix;
pub use model::{Direction, Goal, Polynomial, Relation, Restriction, Term};
pub use rational::Rational;
pub use solvers::{BalanceMatrix, Method, Solver, Step};

/// Broken-invariant errors. User-input problems (malformed DSL text,
/// ill-shaped balance matrices) are rejected through `bool`/`Result`
/// returns instead and never produce an [`Error`].
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
    #[error("no term with index {0}")]
    OutOfRange(usize),
}
