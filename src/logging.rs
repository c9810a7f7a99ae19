use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber.
///
/// `RUST_LOG` wins when set; otherwise the level is `info`, or `debug` when
/// `verbose` is on.
pub fn init_logging(verbose: bool) {
  let default_level = if verbose { "debug" } else { "info" };
  let env_filter =
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

  let stdout_layer = tracing_subscriber::fmt::layer()
    .with_writer(std::io::stdout)
    .with_target(false);

  tracing_subscriber::registry()
    .with(env_filter)
    .with(stdout_layer)
    .init();
}
