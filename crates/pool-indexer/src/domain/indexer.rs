use {
    crate::{
        domain::{
            Config,
            entities::{EntityStore, MissingEntity},
            events::{EventSource, LoggedEvent, PoolEvent},
            handlers,
        },
        infra::observe,
    },
};

/// Applies pool events to a store, one at a time.
#[derive(Debug)]
pub struct Indexer<S> {
    store: S,
    config: Config,
}

/// Outcome of draining an event source.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Summary {
    pub applied: usize,
    pub skipped: usize,
}

impl<S: EntityStore> Indexer<S> {
    pub fn new(store: S, config: Config) -> Self {
        Self { store, config }
    }

    /// Runs the handler matching the event. On error the store is unchanged.
    pub fn apply(&mut self, event: &PoolEvent) -> Result<(), MissingEntity> {
        let store = &mut self.store;
        let config = &self.config;
        match event {
            PoolEvent::Initialize(event) => handlers::initialize(store, config, event),
            PoolEvent::Mint(event) => handlers::mint(store, config, event),
            PoolEvent::Burn(event) => handlers::burn(store, config, event),
            PoolEvent::Swap(event) => handlers::swap(store, config, event),
        }
    }

    /// Applies a delivered event. A skipped event is logged as an error and
    /// otherwise ignored.
    pub fn handle(&mut self, event: &LoggedEvent) -> Result<(), MissingEntity> {
        observe::applying(event);
        match self.apply(&event.event) {
            Ok(()) => {
                observe::applied(event);
                Ok(())
            }
            Err(err) => {
                observe::missing_entity(event, &err);
                Err(err)
            }
        }
    }

    /// Drains the source. A skipped event never stops the run.
    pub fn run(&mut self, source: &mut impl EventSource) -> Summary {
        let mut summary = Summary::default();
        while let Some(event) = source.next_event() {
            match self.handle(&event) {
                Ok(()) => summary.applied += 1,
                Err(_) => summary.skipped += 1,
            }
        }
        observe::replayed(&summary);
        summary
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }
}
