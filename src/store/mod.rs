pub mod edges;
pub mod export;
pub mod rows;
