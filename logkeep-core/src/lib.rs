pub mod config;
pub mod digest;
pub mod error;
pub mod event;
pub mod ingest;
pub mod logging;
pub mod report;
pub mod store;
