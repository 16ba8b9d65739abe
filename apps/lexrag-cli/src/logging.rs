use tracing_subscriber::EnvFilter;

/// Log to stderr so stdout stays clean for answers and `--json` output.
/// `RUST_LOG` overrides the default `info` filter.
pub fn init() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .try_init();
}
