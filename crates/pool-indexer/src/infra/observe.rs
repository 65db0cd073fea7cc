//! Observability for the indexer. Every function here represents an event that
//! is meaningful to the system and is called when that event occurs.

use {
    crate::{
        domain::{
            entities::{MissingEntity, Pool},
            events::LoggedEvent,
            indexer::Summary,
        },
        infra::cli,
    },
    alloy_primitives::Address,
};

/// Setup the observability from the command line arguments.
pub fn init(args: &cli::Args) {
    let config = observe::Config::new(&args.log, args.stderr_threshold, args.use_json_logs);
    observe::tracing::initialize(&config);
}

/// Observe that an event is about to be applied.
pub fn applying(event: &LoggedEvent) {
    tracing::trace!(
        block = event.block,
        log_index = event.log_index,
        pool = %event.event.address(),
        kind = event.event.name(),
        "applying event"
    );
}

/// Observe that an event was applied to the store.
pub fn applied(event: &LoggedEvent) {
    tracing::debug!(
        block = event.block,
        log_index = event.log_index,
        pool = %event.event.address(),
        kind = event.event.name(),
        "applied event"
    );
}

/// Observe that an event was skipped because an entity it needs is missing.
/// The store is unchanged.
pub fn missing_entity(event: &LoggedEvent, err: &MissingEntity) {
    tracing::error!(
        block = event.block,
        log_index = event.log_index,
        pool = %event.event.address(),
        kind = event.event.name(),
        %err,
        "skipped event"
    );
}

/// Observe that the anchor pool is not in the store, so the reference
/// currency has no USD price.
pub fn reference_price_unavailable(err: &MissingEntity) {
    tracing::debug!(%err, "reference currency USD price unavailable");
}

/// Observe that a token's whitelist walk stopped early on a missing entity.
pub fn traversal_aborted(token: Address, err: &MissingEntity) {
    tracing::warn!(%token, %err, "aborted whitelist traversal");
}

/// Observe that a liquidity change would leave the `u128` range. The result is
/// clamped.
pub fn liquidity_out_of_bounds(pool: &Pool, delta: u128) {
    tracing::warn!(
        pool = %pool.id,
        liquidity = pool.liquidity,
        delta,
        "active liquidity out of bounds"
    );
}

/// Observe that a reorg replaced events which were already applied. The store
/// still contains their effects.
pub fn reorg_after_delivery(from_block: u64, delivered: usize) {
    tracing::warn!(
        from_block,
        delivered,
        "reorg replaced already delivered events"
    );
}

/// Observe a finished replay.
pub fn replayed(summary: &Summary) {
    tracing::info!(
        applied = summary.applied,
        skipped = summary.skipped,
        "replayed events"
    );
}
