pub mod models;
pub mod params;
pub mod position;
pub mod sign;
