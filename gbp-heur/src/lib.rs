pub mod config;
pub mod error;
pub mod ident;
pub mod opt;

#[doc(inline)]
pub use error::{HeuristicError, ParameterError};
#[doc(inline)]
pub use opt::Heuristic;
