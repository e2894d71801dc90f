pub mod error;
pub mod export;
pub mod state_store;
