use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{LogFormat, ObservabilityConfig};

/// Initialize the global tracing subscriber.
///
/// Safe to call once per process; tests use `try_init` through their own
/// writers instead.
pub fn init_tracing(config: &ObservabilityConfig) {
    let logging = &config.logging;
    let filter = build_env_filter(&logging.filter);

    match logging.format {
        LogFormat::Pretty => {
            let fmt_layer = tracing_subscriber::fmt::layer()
                .pretty()
                .with_target(true)
                .with_thread_ids(false);
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt_layer)
                .init();
        }
        LogFormat::Compact => {
            let fmt_layer = tracing_subscriber::fmt::layer().compact().with_target(true);
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt_layer)
                .init();
        }
        LogFormat::Json => {
            let fmt_layer = tracing_subscriber::fmt::layer().json().with_current_span(true);
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt_layer)
                .init();
        }
    }
}

/// `RUST_LOG` wins over the configured filter; both fall back to quieting
/// the noisier infrastructure crates at `info`.
fn build_env_filter(configured: &str) -> EnvFilter {
    if let Ok(env_filter) = std::env::var("RUST_LOG") {
        EnvFilter::try_new(env_filter).unwrap_or_else(|_| default_filter(configured))
    } else {
        default_filter(configured)
    }
}

fn default_filter(configured: &str) -> EnvFilter {
    let directives = format!("{},hyper=warn,h2=warn,tower=info,sqlx=warn", configured);
    EnvFilter::try_new(directives).unwrap_or_else(|_| EnvFilter::new("info"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_filter_is_extended_with_crate_quieting() {
        let filter = default_filter("atrium=debug,info");
        let rendered = filter.to_string();
        assert!(rendered.contains("atrium=debug"));
        assert!(rendered.contains("sqlx=warn"));
    }

    #[test]
    fn invalid_filter_falls_back_to_info() {
        let filter = default_filter("not a ==== filter");
        assert_eq!(filter.to_string(), "info");
    }
}
