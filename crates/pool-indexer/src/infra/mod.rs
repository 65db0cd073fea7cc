pub mod cli;
pub mod config;
pub mod observe;
pub mod source;
pub mod store;

pub use {source::OrderedEvents, store::InMemoryStore};
