use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Environment variable holding the log filter, e.g. `LILT_LOG=lilt=debug`.
pub const LOG_ENV_VAR: &str = "LILT_LOG";

/// Initialize structured JSON logging on stderr.
///
/// Defaults to `error` level unless overridden by [`LOG_ENV_VAR`]. `lilt-cli` writes encoded
/// playback states to stdout, one JSON document per line with `-o json`; log records go to
/// stderr so `lilt-cli ... | jq` only ever sees state frames. The session span (with its id)
/// is attached to every record emitted from inside a running session.
pub fn init() {
    let filter = EnvFilter::builder()
        .with_env_var(LOG_ENV_VAR)
        .with_default_directive(tracing::level_filters::LevelFilter::ERROR.into())
        .from_env_lossy();

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_current_span(true)
                .with_span_list(true),
        )
        .try_init();
}
