//! Pool analytics: entities, events and the logic that keeps the former
//! consistent with the latter.

pub mod config;
pub mod entities;
pub mod events;
pub mod handlers;
pub mod indexer;
pub mod pricing;

pub use {
    config::Config,
    entities::{Entity, EntityKey, EntityStore, EntityStoreExt, MissingEntity},
    events::{EventSource, LoggedEvent, PoolEvent},
    indexer::{Indexer, Summary},
};
