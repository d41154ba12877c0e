// Topic models — metadata sidecars, ranked descriptors, and the core
// directory registry that finds them alongside their embeddings.

pub mod meta;
pub mod model;
pub mod registry;
