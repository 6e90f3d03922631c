pub mod cache;
pub mod handle;
pub mod key;
pub mod state;
