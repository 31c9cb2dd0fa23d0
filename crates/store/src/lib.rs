//! # PanelForge Store
//!
//! Reference implementations of the [`ContentStore`] contract.
//!
//! - [`InMemoryContentStore`]: process-local, for tests and demos.
//! - [`FileContentStore`]: loads a JSON file once, writes it back after
//!   every successful mutation.
//!
//! [`ContentStore`]: panelforge_core::ContentStore

pub mod file_backend;
pub mod fixtures;
pub mod in_memory;
mod tree;

pub use file_backend::FileContentStore;
pub use in_memory::InMemoryContentStore;
