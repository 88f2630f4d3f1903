pub mod lat_lon;
pub mod observation;
pub mod timestamp;
