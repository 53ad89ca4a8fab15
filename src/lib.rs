pub mod applier;
pub mod commands;
pub mod edges;
pub mod error;
pub mod linear;
pub mod mapping;
pub mod model;
pub mod output;
pub mod prompt;
pub mod reconcile;
pub mod store;
pub mod surrogate;
pub mod tracker;
pub mod transform;
