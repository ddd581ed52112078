pub mod dataset;
pub mod export;
pub mod filter;
pub mod format;
pub mod ingest;
pub mod paginate;
pub mod revenue;
