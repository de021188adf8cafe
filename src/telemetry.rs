use prometheus::register_counter_vec;
use prometheus::CounterVec;
use prometheus::{Encoder, TextEncoder};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use lazy_static::lazy_static;

lazy_static! {
    pub static ref REMOTE_API_CALLS: CounterVec = register_counter_vec!(
        "remote_api_requests_total",
        "Number of requests sent to the remote content service",
        &["operation", "outcome"]
    )
    .unwrap();
    pub static ref FORM_SUBMISSIONS: CounterVec = register_counter_vec!(
        "form_submissions_total",
        "Number of admin form submissions",
        &["form", "outcome"]
    )
    .unwrap();
}

pub fn init_tracing() {
    let mut fmt_layer = fmt::layer();
    if std::env::var("INCLUDE_SPAN_EVENTS").is_ok_and(|value| value.eq_ignore_ascii_case("true")) {
        fmt_layer = fmt_layer.with_span_events(FmtSpan::ENTER | FmtSpan::EXIT);
    }
    let filter_layer =
        EnvFilter::try_from_env("LOG_LEVEL").unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();
}

pub fn record_api_call(operation: &str, ok: bool) {
    let outcome = if ok { "ok" } else { "error" };
    REMOTE_API_CALLS
        .with_label_values(&[operation, outcome])
        .inc();
}

pub fn record_submission(form: &str, outcome: &str) {
    FORM_SUBMISSIONS.with_label_values(&[form, outcome]).inc();
}

/// Encodes every registered metric in the prometheus text format.
/// Returns the content type together with the payload.
pub fn gather_metrics() -> Result<(String, Vec<u8>), prometheus::Error> {
    let encoder = TextEncoder::new();
    let metrics = prometheus::gather();
    let mut buf = vec![];
    encoder.encode(&metrics, &mut buf)?;
    Ok((encoder.format_type().to_owned(), buf))
}
