//! Documentation ingestion: URL discovery plus the fetch-extract-persist
//! pipeline.

pub mod discovery;
pub mod pipeline;

pub use pipeline::{IngestionPipeline, SourceReport, UrlFailure};
