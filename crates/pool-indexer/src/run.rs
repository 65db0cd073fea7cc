use {
    crate::{
        domain::{Config, Indexer, Summary},
        infra::{InMemoryStore, OrderedEvents, cli, config, observe, store::Snapshot},
    },
    anyhow::Result,
    clap::Parser,
    tokio::io::AsyncWriteExt,
};

/// Entry point of the binary. Exits the process with a non-zero code if the
/// replay could not be performed.
pub async fn start(args: impl Iterator<Item = String>) {
    let args = cli::Args::parse_from(args);
    observe::init(&args);
    tracing::info!("running pool indexer with {args:#?}");

    if let Err(err) = run(args).await {
        tracing::error!(?err, "pool indexer failed");
        std::process::exit(1);
    }
}

/// Replays the event file on top of the snapshot and writes the resulting
/// snapshot.
pub async fn run(args: cli::Args) -> Result<Summary> {
    let config = match &args.config {
        Some(path) => config::load(path).await,
        None => Config::default(),
    };
    let store = InMemoryStore::from(Snapshot::load(&args.snapshot).await?);
    let mut events = OrderedEvents::load(&args.events).await?;

    let mut indexer = Indexer::new(store, config);
    let summary = indexer.run(&mut events);

    let snapshot = indexer.store().snapshot();
    match &args.output {
        Some(path) => snapshot.write(path).await?,
        None => {
            let mut data = serde_json::to_vec_pretty(&snapshot)?;
            data.push(b'\n');
            let mut stdout = tokio::io::stdout();
            stdout.write_all(&data).await?;
            stdout.flush().await?;
        }
    }
    Ok(summary)
}
