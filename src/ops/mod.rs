pub mod export;
pub mod listing;
pub mod reorder;
