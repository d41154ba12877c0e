// Word embeddings — vector spaces, loaders, and the cached similarity provider
// that every validation measure routes through.

pub mod loader;
pub mod provider;
pub mod traits;
pub mod vectors;

pub use provider::{Embedding, NeighborQuery};
pub use traits::VectorSpace;
pub use vectors::KeyedVectors;
