//! Tracing subscriber setup.

use tracing_subscriber::layer::{Layer, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry};

use crate::config::{LogFormat, LoggingConfig};

/// Install the global subscriber from config.
///
/// Filter precedence: `FRAMESTORE_LOG` env var, then the configured filter
/// string, then info. Safe to call more than once; later calls are no-ops.
pub fn init(config: &LoggingConfig) {
    let mut builder = EnvFilter::builder()
        .with_default_directive(tracing::metadata::LevelFilter::INFO.into())
        .with_env_var("FRAMESTORE_LOG");
    if let Some(directive) = &config.filter {
        builder = builder.with_default_directive(match directive.parse() {
            Ok(directive) => directive,
            Err(err) => {
                eprintln!("invalid log filter `{directive}`, using info: {err}");
                tracing::metadata::LevelFilter::INFO.into()
            }
        });
    }
    let filter = builder.from_env_lossy();

    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();
    if config.stdout {
        layers.push(build_stdout_layer(config.stdout_format));
    }
    layers.push(Box::new(filter));

    let _ = Registry::default().with(layers).try_init();
}

fn build_stdout_layer(format: LogFormat) -> Box<dyn Layer<Registry> + Send + Sync> {
    match format {
        LogFormat::Pretty => Box::new(
            tracing_subscriber::fmt::layer()
                .pretty()
                .with_writer(std::io::stderr)
                .with_target(true),
        ),
        LogFormat::Compact => Box::new(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_writer(std::io::stderr)
                .with_target(true),
        ),
        LogFormat::Json => Box::new(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_current_span(true),
        ),
    }
}
