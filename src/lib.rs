// topicscan: embedding-based validation of topic models
//
// This is the library root. Each module corresponds to a layer of the
// validation engine, from the word embedding up to the report tables.

pub mod config;
pub mod embedding;
pub mod error;
pub mod output;
pub mod report;
pub mod topics;
pub mod validation;
