//! Document storage for the chat collections.
//!
//! JSON-file backed, with atomic writes for durability.

pub mod json_store;

pub use json_store::JsonDocStore;
