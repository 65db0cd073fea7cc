#![forbid(unsafe_code)]

pub mod boundary;
pub mod domain;
pub mod infra;
mod run;

pub use {
    domain::{Config, Indexer, Summary},
    infra::{InMemoryStore, OrderedEvents},
    run::{run, start},
};
