//! Token persistence for the backend client
//!
//! The client reads and writes its tokens through [`TokenCallback`];
//! [`TokenStore`] is the implementation backed by a config entry.

pub mod ports;
pub mod store;

pub use ports::TokenCallback;
pub use store::TokenStore;
