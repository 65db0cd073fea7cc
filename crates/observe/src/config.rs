use tracing::Level;

/// How log lines are filtered, formatted and where they are written to.
#[derive(Clone, Debug)]
pub struct Config {
    /// `EnvFilter` directives, e.g. `warn,pool_indexer=debug`.
    pub(crate) filter: String,
    /// Lines at or above this level go to stderr, everything else to stdout.
    pub(crate) stderr_threshold: Level,
    /// One JSON object per line instead of human readable text.
    pub(crate) json: bool,
}

impl Config {
    /// Without a threshold only errors are written to stderr.
    pub fn new(filter: &str, stderr_threshold: Option<Level>, json: bool) -> Self {
        Self {
            filter: filter.to_owned(),
            stderr_threshold: stderr_threshold.unwrap_or(Level::ERROR),
            json,
        }
    }

    pub fn with_filter(self, filter: &str) -> Self {
        Self {
            filter: filter.to_owned(),
            ..self
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new("info", None, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_go_to_stderr_by_default() {
        let config = Config::default();
        assert_eq!(config.stderr_threshold, Level::ERROR);
        assert_eq!(config.filter, "info");
        assert!(!config.json);
    }

    #[test]
    fn with_filter_keeps_the_rest() {
        let config = Config::new("warn", Some(Level::WARN), true).with_filter("debug");
        assert_eq!(config.filter, "debug");
        assert_eq!(config.stderr_threshold, Level::WARN);
        assert!(config.json);
    }
}
