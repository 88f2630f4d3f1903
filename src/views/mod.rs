pub mod cache;
pub mod error;
pub mod geo_subset;
pub mod snapshot;
pub mod view_name;
