use {
    crate::Config,
    std::{io::IsTerminal, panic::PanicHookInfo, sync::Once},
    time::macros::format_description,
    tracing_subscriber::{
        EnvFilter,
        Layer,
        fmt::{self, time::UtcTime, writer::MakeWriterExt as _},
        prelude::*,
        util::SubscriberInitExt,
    },
};

/// Initializes the global tracing subscriber and routes panics through it.
/// The filter syntax is documented at
/// https://docs.rs/tracing-subscriber/latest/tracing_subscriber/filter/struct.EnvFilter.html
pub fn initialize(config: &Config) {
    set_tracing_subscriber(config);
    std::panic::set_hook(Box::new(tracing_panic_hook));
}

/// Like [`initialize`], but can be called multiple times in a row. Later calls
/// are ignored.
///
/// Useful for tests.
pub fn initialize_reentrant(env_filter: &str) {
    // The subscriber is a global object so a second initialization from another
    // test thread would fail.
    static ONCE: Once = Once::new();
    ONCE.call_once(|| {
        set_tracing_subscriber(&Config::default().with_filter(env_filter));
        std::panic::set_hook(Box::new(tracing_panic_hook));
    });
}

fn set_tracing_subscriber(config: &Config) {
    // The json and the plain formatter have different types, so the shared
    // writer, timer and filter setup is expanded once per branch.
    macro_rules! fmt_layer {
        ($layer:expr) => {{
            $layer
                .with_writer(
                    std::io::stdout
                        .with_min_level(config.stderr_threshold)
                        .or_else(std::io::stderr),
                )
                .with_timer(UtcTime::new(format_description!(
                    "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z"
                )))
                .with_filter(EnvFilter::new(&config.filter))
        }};
    }

    if config.json {
        tracing_subscriber::registry()
            .with(fmt_layer!(fmt::layer().json()))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt_layer!(
                fmt::layer().with_ansi(std::io::stdout().is_terminal())
            ))
            .init();
    }
    ::tracing::debug!(filter = %config.filter, json = config.json, "initialized logging");
}

/// Panic hook that prints roughly the same message as the default panic hook
/// but uses tracing:error instead of stderr.
fn tracing_panic_hook(panic: &PanicHookInfo) {
    let thread = std::thread::current();
    let name = thread.name().unwrap_or("<unnamed>");
    let backtrace = std::backtrace::Backtrace::force_capture();
    ::tracing::error!("thread '{name}' {panic}\nstack backtrace:\n{backtrace}");
}
