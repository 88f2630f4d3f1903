pub mod csv_source;
pub mod error;
pub mod store;
