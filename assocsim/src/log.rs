use tracing_subscriber::EnvFilter;

pub fn init() {
    tracing_subscriber::fmt()
        // Set the environment variable `RUST_LOG` to one of `TRACE`, `DEBUG`, `INFO`, `WARN`, or
        // `ERROR`. Per-access hit and miss events are logged at `TRACE`.
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .with_level(true)
        // The target is mostly just noise.
        .with_target(false)
        .without_time()
        .init();
}
