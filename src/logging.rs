//! Structured logging setup.
//!
//! - JSON lines in production, pretty output in development
//! - stdout, stderr or daily-rotated files through a non-blocking writer
//! - Optional OpenTelemetry export when an OTLP endpoint is configured

use crate::negotiate::Format;
use anyhow::{Context, Result};
use opentelemetry::{
    KeyValue,
    trace::{TraceError, TracerProvider as _},
};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{
    Resource,
    trace::{RandomIdGenerator, Sampler, TracerProvider},
};
use std::env;
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{
    EnvFilter, Layer, fmt, fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt,
};

const SERVICE_NAME: &str = "oerschema";

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub format: LogFormat,
    pub output: LogOutput,
    /// Directory for log files when `output` is [`LogOutput::File`]
    pub log_dir: PathBuf,
    pub log_file_prefix: String,
    pub service_version: String,
    /// "development", "staging" or "production"
    pub environment: String,
    /// OTLP collector; tracing export is off when unset
    pub otlp_endpoint: Option<String>,
    /// Trace sampling ratio, 0.0 to 1.0
    pub otel_sampling_rate: f64,
    pub otlp_timeout_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogOutput {
    Stdout,
    Stderr,
    File,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());
        let production = is_production(&environment);

        Self {
            format: if production {
                LogFormat::Json
            } else {
                LogFormat::Pretty
            },
            output: LogOutput::Stderr,
            log_dir: PathBuf::from("logs"),
            log_file_prefix: SERVICE_NAME.to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            environment,
            otlp_endpoint: None,
            otel_sampling_rate: if production { 0.1 } else { 1.0 },
            otlp_timeout_secs: 10,
        }
    }
}

fn is_production(environment: &str) -> bool {
    matches!(environment, "production" | "prod")
}

impl LoggingConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(format) = env::var("LOG_FORMAT") {
            config.format = match format.to_lowercase().as_str() {
                "json" => LogFormat::Json,
                "pretty" => LogFormat::Pretty,
                _ => config.format,
            };
        }

        if let Ok(output) = env::var("LOG_OUTPUT") {
            config.output = match output.to_lowercase().as_str() {
                "stdout" => LogOutput::Stdout,
                "stderr" => LogOutput::Stderr,
                "file" => LogOutput::File,
                _ => config.output,
            };
        }

        if let Ok(log_dir) = env::var("LOG_DIR") {
            config.log_dir = PathBuf::from(log_dir);
        }

        config.otlp_endpoint = env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
            .ok()
            .filter(|endpoint| !endpoint.trim().is_empty());

        if let Some(rate) = env::var("OTEL_SAMPLING_RATE")
            .ok()
            .and_then(|rate| rate.parse::<f64>().ok())
        {
            config.otel_sampling_rate = rate.clamp(0.0, 1.0);
        }

        config
    }

    fn resource(&self) -> Resource {
        Resource::new(vec![
            KeyValue::new(
                opentelemetry_semantic_conventions::resource::SERVICE_NAME,
                SERVICE_NAME,
            ),
            KeyValue::new(
                opentelemetry_semantic_conventions::resource::SERVICE_VERSION,
                self.service_version.clone(),
            ),
            KeyValue::new("environment", self.environment.clone()),
        ])
    }

    fn sampler(&self) -> Sampler {
        match self.otel_sampling_rate {
            rate if rate >= 1.0 => Sampler::AlwaysOn,
            rate if rate <= 0.0 => Sampler::AlwaysOff,
            rate => Sampler::ParentBased(Box::new(Sampler::TraceIdRatioBased(rate))),
        }
    }

    fn writer(&self) -> Result<(NonBlocking, WorkerGuard)> {
        Ok(match self.output {
            LogOutput::Stdout => tracing_appender::non_blocking(io::stdout()),
            LogOutput::Stderr => tracing_appender::non_blocking(io::stderr()),
            LogOutput::File => {
                std::fs::create_dir_all(&self.log_dir).with_context(|| {
                    format!("failed to create log directory {:?}", self.log_dir)
                })?;
                tracing_appender::non_blocking(tracing_appender::rolling::daily(
                    &self.log_dir,
                    &self.log_file_prefix,
                ))
            }
        })
    }
}

/// Installs the global subscriber.
///
/// The returned guard flushes buffered lines when dropped and must live as
/// long as the process logs.
pub fn init_logging(config: LoggingConfig) -> Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = if is_production(&config.environment) {
            "info"
        } else {
            "debug"
        };
        EnvFilter::new(format!("{level},hyper=info,tower=info,h2=info"))
    });

    let (writer, guard) = config.writer()?;

    let otel_layer = match config.otlp_endpoint.as_deref() {
        Some(endpoint) => match init_tracer_provider(&config, endpoint) {
            Ok(provider) => Some(
                tracing_opentelemetry::layer().with_tracer(provider.tracer(SERVICE_NAME)),
            ),
            Err(err) => {
                eprintln!("warning: OpenTelemetry exporter unavailable ({err}); tracing export disabled");
                None
            }
        },
        None => None,
    };

    let fmt_layer = match config.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_writer(writer)
            .with_target(true)
            .with_current_span(true)
            .with_span_events(FmtSpan::CLOSE)
            .boxed(),
        LogFormat::Pretty => fmt::layer()
            .pretty()
            .with_writer(writer)
            .with_target(true)
            .with_ansi(config.output != LogOutput::File)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(otel_layer)
        .with(fmt_layer)
        .try_init()
        .context("a global tracing subscriber is already installed")?;

    tracing::info!(
        service = SERVICE_NAME,
        version = %config.service_version,
        environment = %config.environment,
        format = ?config.format,
        output = ?config.output,
        otlp = config.otlp_endpoint.is_some(),
        "logging initialized"
    );

    Ok(Some(guard))
}

fn init_tracer_provider(config: &LoggingConfig, endpoint: &str) -> Result<TracerProvider, TraceError> {
    let exporter = opentelemetry_otlp::new_exporter()
        .tonic()
        .with_endpoint(endpoint)
        .with_timeout(Duration::from_secs(config.otlp_timeout_secs));

    opentelemetry_otlp::new_pipeline()
        .tracing()
        .with_exporter(exporter)
        .with_trace_config(
            opentelemetry_sdk::trace::Config::default()
                .with_sampler(config.sampler())
                .with_id_generator(RandomIdGenerator::default())
                .with_resource(config.resource()),
        )
        .install_batch(opentelemetry_sdk::runtime::Tokio)
}

/// Flushes pending spans to the collector.
pub fn shutdown_telemetry() {
    tracing::info!("shutting down telemetry");
    opentelemetry::global::shutdown_tracer_provider();
}

/// Warns when an operation exceeds a threshold in milliseconds, otherwise
/// logs it at debug.
#[macro_export]
macro_rules! log_slow_operation {
    ($duration:expr, $threshold_ms:expr, $($arg:tt)*) => {
        {
            let duration_ms = $duration.as_millis() as u64;
            if duration_ms > $threshold_ms {
                tracing::warn!(
                    duration_ms = duration_ms,
                    threshold_ms = $threshold_ms,
                    $($arg)*
                );
            } else {
                tracing::debug!(
                    duration_ms = duration_ms,
                    $($arg)*
                );
            }
        }
    };
}

#[macro_export]
macro_rules! log_cache_operation {
    (hit, $key:expr, $($arg:tt)*) => {
        tracing::debug!(
            cache_key = %$key,
            cache_result = "hit",
            $($arg)*
        );
    };
    (miss, $key:expr, $($arg:tt)*) => {
        tracing::debug!(
            cache_key = %$key,
            cache_result = "miss",
            $($arg)*
        );
    };
}

pub fn conversion_span(scope: &str, format: Format) -> tracing::Span {
    tracing::debug_span!("convert", scope = scope, format = %format)
}

pub fn request_span(route: &'static str, name: Option<&str>) -> tracing::Span {
    tracing::info_span!(
        "request",
        route = route,
        term = name.unwrap_or(""),
        service = SERVICE_NAME,
        version = env!("CARGO_PKG_VERSION")
    )
}

pub fn generation_span(out_dir: &std::path::Path) -> tracing::Span {
    tracing::info_span!("generate", out_dir = %out_dir.display())
}
