pub mod config;
pub mod discovery;
pub mod document;
pub mod error;
pub mod processor;
pub mod report;
pub mod runner;
pub mod stats;
pub mod text;

pub use config::Config;
pub use document::{Document, Extraction};
pub use error::ProcessError;
pub use processor::{ProcessOptions, ProcessingResult, process_bytes, process_file, process_source};
pub use runner::{FileFailure, RunSummary, run};
pub use stats::AggregateStats;
