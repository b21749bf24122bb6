//! Knowledge graph domain

mod fact;
mod store;

pub use fact::GraphFact;
pub use store::{GraphQuery, GraphStore};

#[cfg(test)]
pub use store::mock::MockGraphStore;
