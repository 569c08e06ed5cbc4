//! Filter composition and filtering handler wrappers.

pub mod chain;
pub mod wrap;

pub use chain::{FilterChain, Lifted, MutatingChain, compose, compose_mutating, lift};
pub use wrap::{Filtered, FilteredFunc, Mutated, filtered, filtered_func, mutated};
