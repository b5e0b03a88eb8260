//! Tracing subscriber initialization with structured logging and optional
//! OpenTelemetry trace export.
//!
//! # Usage
//!
//! ```no_run
//! use parley_types::config::LogConfig;
//!
//! // Log to stderr at the configured filter level
//! parley_observe::tracing_setup::init_tracing(&LogConfig::default()).unwrap();
//! ```

use std::fs::{File, OpenOptions};
use std::sync::{Mutex, OnceLock};

use opentelemetry::trace::TracerProvider as _;
use opentelemetry_sdk::trace::SdkTracerProvider;
use parley_types::config::LogConfig;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Stores the OTel tracer provider so it can be shut down cleanly on exit.
static TRACER_PROVIDER: OnceLock<SdkTracerProvider> = OnceLock::new();

/// Initialize the global tracing subscriber from `config`.
///
/// - Installs a structured `fmt` layer writing to stderr, or appending to
///   `config.path` when it names a file.
/// - `RUST_LOG` takes precedence over `config.filter`.
/// - When `config.otel` is true, additionally bridges tracing spans to
///   OpenTelemetry using a stdout exporter.
///
/// # Errors
///
/// Returns an error if the log file cannot be opened, the filter directive
/// is invalid, or the global subscriber has already been set.
pub fn init_tracing(config: &LogConfig) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = build_filter(config)?;
    let is_file = !config.is_stderr();

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_ansi(!is_file)
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(make_writer(config)?);

    if config.otel {
        let provider = SdkTracerProvider::builder()
            .with_simple_exporter(opentelemetry_stdout::SpanExporter::default())
            .build();
        let tracer = provider.tracer("parley");
        let otel_layer = tracing_opentelemetry::layer().with_tracer(tracer);

        let _ = TRACER_PROVIDER.set(provider.clone());
        opentelemetry::global::set_tracer_provider(provider);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .with(otel_layer)
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()?;
    }

    Ok(())
}

/// Flush pending traces and shut down the OpenTelemetry tracer provider.
///
/// Safe to call even when OTel was not enabled (no-op in that case).
pub fn shutdown_tracing() {
    if let Some(provider) = TRACER_PROVIDER.get() {
        if let Err(e) = provider.shutdown() {
            eprintln!("Warning: OTel tracer provider shutdown error: {e}");
        }
    }
}

fn build_filter(config: &LogConfig) -> Result<EnvFilter, tracing_subscriber::filter::ParseError> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(&config.filter),
    }
}

fn make_writer(config: &LogConfig) -> std::io::Result<BoxMakeWriter> {
    if config.is_stderr() {
        return Ok(BoxMakeWriter::new(std::io::stderr));
    }
    Ok(BoxMakeWriter::new(Mutex::new(open_log_file(&config.path)?)))
}

fn open_log_file(path: &str) -> std::io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}
