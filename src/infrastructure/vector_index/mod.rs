//! Vector index implementations

mod pinecone;

pub use pinecone::{PineconeConfig, PineconeIndex};
