pub mod ingest;
pub mod serve;

pub use ingest::{ingest, PipelineConfig};
pub use serve::serve;
