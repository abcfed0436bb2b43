use tracing::subscriber::set_global_default;
use tracing::Subscriber;
use tracing_log::LogTracer;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::{Layered, SubscriberExt};
use tracing_subscriber::{EnvFilter, Registry};

use crate::cli::LogFormatArg;
use crate::error::StartupError;

/// Filter applied when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info,sqlx=warn";

pub fn build_json_subscriber<Sink>(
    env_filter: impl AsRef<str>,
    sink: Sink,
) -> impl Subscriber + Send + Sync
where
    Sink: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let formatting_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(false)
        .with_writer(sink);

    layered_subscriber_with_env_filter(env_filter).with(formatting_layer)
}

pub fn build_plain_subscriber<Sink>(
    env_filter: impl AsRef<str>,
    sink: Sink,
) -> impl Subscriber + Send + Sync
where
    Sink: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let formatting_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(sink);

    layered_subscriber_with_env_filter(env_filter).with(formatting_layer)
}

/// Installs the global subscriber and routes `log` records (sqlx) into it.
pub fn init(format: LogFormatArg) -> Result<(), StartupError> {
    match format {
        LogFormatArg::Json => {
            try_init_subscriber(build_json_subscriber(DEFAULT_LOG_FILTER, std::io::stdout))
        }
        LogFormatArg::Plain => {
            try_init_subscriber(build_plain_subscriber(DEFAULT_LOG_FILTER, std::io::stdout))
        }
    }
}

pub fn try_init_subscriber(subscriber: impl Subscriber + Send + Sync) -> Result<(), StartupError> {
    LogTracer::init()?;
    set_global_default(subscriber)?;

    Ok(())
}

fn layered_subscriber_with_env_filter(env_filter: impl AsRef<str>) -> Layered<EnvFilter, Registry> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(env_filter));
    Registry::default().with(env_filter)
}
