pub mod export;
pub mod relink;
