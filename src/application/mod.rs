pub mod engine;
pub mod history;
pub mod projection;
pub mod snap;
pub mod store;
pub mod validate;
