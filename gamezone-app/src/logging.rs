//! Tracing subscriber setup.

use gamezone_client::LogFormat;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::{AppError, AppResult};

const DEFAULT_FILTER: &str = "gamezone_app=info,gamezone_client=info,gamezone_cache=warn,warn";

/// Install the global subscriber. `RUST_LOG` overrides the default filter.
/// Output goes to stderr so stdout stays clean for the view JSON.
pub fn init_tracing(format: LogFormat) -> AppResult<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let registry = tracing_subscriber::registry().with(env_filter);
    let result = match format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init(),
    };
    result.map_err(|e| AppError::Logging(e.to_string()))?;

    tracing::debug!(?format, "tracing initialized");
    Ok(())
}
