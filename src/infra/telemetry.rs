use std::sync::Once;

use metrics::{Unit, describe_counter};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::config::{LogFormat, LoggingSettings};

use super::error::InfraError;

static METRIC_DESCRIPTIONS: Once = Once::new();

/// Install a global tracing subscriber using the provided logging settings.
pub fn init(logging: &LoggingSettings) -> Result<(), InfraError> {
    describe_metrics();

    let env_filter = EnvFilter::builder()
        .with_default_directive(logging.level.into())
        .from_env_lossy();

    let fmt_layer = match logging.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .boxed(),
        LogFormat::Compact => fmt::layer().compact().with_target(true).boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(ErrorLayer::default())
        .with(fmt_layer)
        .try_init()
        .map_err(|err| {
            InfraError::telemetry(format!("failed to install tracing subscriber: {err}"))
        })
}

fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        describe_counter!(
            "favella_lookup_local_hit_total",
            Unit::Count,
            "Total number of local cache tier hits."
        );
        describe_counter!(
            "favella_lookup_local_miss_total",
            Unit::Count,
            "Total number of local cache tier misses."
        );
        describe_counter!(
            "favella_lookup_remote_hit_total",
            Unit::Count,
            "Total number of remote cache tier hits."
        );
        describe_counter!(
            "favella_lookup_remote_miss_total",
            Unit::Count,
            "Total number of remote cache tier misses, including errors degraded to misses."
        );
        describe_counter!(
            "favella_lookup_generated_total",
            Unit::Count,
            "Total number of artifacts generated after both tiers missed."
        );
        describe_counter!(
            "favella_cache_local_evicted_total",
            Unit::Count,
            "Total number of local entries evicted due to capacity."
        );
        describe_counter!(
            "favella_cache_local_expired_total",
            Unit::Count,
            "Total number of local entries removed by lazy TTL expiry."
        );
    });
}
