use crate::config::LogConfig;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Targets silenced unless `log.verbose_http` is set; the indexer poll
/// otherwise floods the log with connection-pool chatter.
const HTTP_TARGETS: [&str; 3] = ["reqwest", "hyper", "hyper_util"];

/// Filter used when `RUST_LOG` is not set
fn filter_directives(config: &LogConfig) -> String {
    if config.verbose_http {
        return config.log_level.clone();
    }
    let mut directives = config.log_level.clone();
    for target in HTTP_TARGETS {
        directives.push_str(&format!(",{target}=warn"));
    }
    directives
}

/// Install the global subscriber. Keep the guard alive until exit or
/// buffered file output is lost.
///
/// Console output goes to stderr: stdout carries the activity list the
/// binary prints.
pub fn init_logging(config: &LogConfig) -> WorkerGuard {
    let file_appender = match config.rotation.as_str() {
        "hourly" => tracing_appender::rolling::hourly(&config.log_dir, &config.log_file),
        "daily" => tracing_appender::rolling::daily(&config.log_dir, &config.log_file),
        _ => tracing_appender::rolling::never(&config.log_dir, &config.log_file),
    };

    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directives(config)));

    let registry = tracing_subscriber::registry().with(filter);

    if config.use_json {
        // Target kept so records can be grouped by module
        let file_layer = fmt::layer()
            .json()
            .with_target(true)
            .with_writer(file_writer)
            .with_ansi(false);
        registry.with(file_layer).init();
    } else {
        let file_layer = fmt::layer()
            .with_target(false)
            .with_writer(file_writer)
            .with_ansi(false);
        let console_layer = fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
            .with_ansi(true);
        registry.with(file_layer).with(console_layer).init();
    }

    guard
}
