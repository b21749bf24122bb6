//! Vector similarity index domain

mod provider;

pub use provider::{VectorIndex, VectorMatch};

#[cfg(test)]
pub use provider::mock::MockVectorIndex;
