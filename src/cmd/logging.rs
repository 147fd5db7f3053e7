use tracing::debug;
use tracing_subscriber::EnvFilter;

fn level(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Initializes the tracing subscriber on stderr. `RUST_LOG` wins over the
/// `-v` count when set.
pub fn init_logging(verbose: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level(verbose)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose >= 2)
        .with_thread_ids(verbose >= 3)
        .init();

    debug!("booktrends started with verbosity level: {}", verbose);
}
