pub mod catalog;
pub mod point_id;
pub mod scoring;
