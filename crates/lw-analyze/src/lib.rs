//! CLI internals for `lw-analyze`, split out of the binary so argument
//! handling and rendering stay unit-testable.

pub mod cli;
pub mod render;
