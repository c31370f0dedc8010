use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Compact,
    /// One JSON object per record, for log collectors.
    Json,
}

fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "commons_kit=debug,info"
    } else {
        "commons_kit=info"
    }
}

/// `RUST_LOG` takes precedence over the built-in directive.
fn env_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)))
}

/// Installs the global subscriber. Must be called once per process.
pub fn init_logger(verbose: bool, format: LogFormat) {
    let registry = tracing_subscriber::registry().with(env_filter(verbose));
    match format {
        LogFormat::Compact => registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false)
                    .compact(),
            )
            .init(),
        LogFormat::Json => registry
            .with(fmt::layer().with_target(false).with_thread_ids(true).json())
            .init(),
    }
}

pub fn init_cli_logger(verbose: bool) {
    init_logger(verbose, LogFormat::Compact);
}
