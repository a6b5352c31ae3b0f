pub mod user_store;

// Re-export commonly used types
pub use user_store::UserStore;
