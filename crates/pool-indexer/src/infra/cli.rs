use std::path::PathBuf;

#[derive(Debug, clap::Parser)]
pub struct Args {
    /// The log filter.
    #[clap(long, env, default_value = "warn,pool_indexer=info")]
    pub log: String,

    /// At which log level logs should be printed to stderr instead of stdout.
    #[clap(long, env)]
    pub stderr_threshold: Option<tracing::Level>,

    /// Whether to use JSON format for the logs.
    #[clap(long, env, default_value = "false")]
    pub use_json_logs: bool,

    /// Path to the indexer configuration file. This file should be in TOML
    /// format. Without it the Polygon deployment is indexed.
    #[clap(long, env)]
    pub config: Option<PathBuf>,

    /// JSON snapshot of the entities the events refer to.
    #[clap(long, env)]
    pub snapshot: PathBuf,

    /// Pool events, one JSON object per line.
    #[clap(long, env)]
    pub events: PathBuf,

    /// Where to write the resulting snapshot. Printed to stdout if not set.
    #[clap(long, env)]
    pub output: Option<PathBuf>,
}
