pub mod simplex;
pub mod transport;

pub use simplex::{Solver, Step};
pub use transport::{BalanceMatrix, Method};
