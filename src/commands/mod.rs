//! Command implementations for ghpin CLI

pub mod cache;
pub mod completions;
pub mod fetch;
pub mod pin;
pub mod show;
pub mod unpin;
pub mod version;
