pub fn init() {
    // Honor RUST_LOG if set, default to info. Logs go to stderr so the
    // stdio transport keeps stdout for protocol frames.
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Record a histogram sample through the `metrics` facade and mirror it as
/// a log line, since no exporter is installed by default.
pub fn log_metric(tool: &str, metric: &str, value: f64) {
    tracing::info!(tool = tool, metric = metric, value = value, "metric");
    metrics::histogram!(metric.to_owned(), "tool" => tool.to_owned()).record(value);
}

/// Count one failed call, labelled by error kind.
pub fn count_error(tool: &str, kind: &'static str) {
    tracing::info!(tool = tool, metric = "analysis_errors_total", kind = kind, "metric");
    metrics::counter!("analysis_errors_total", "tool" => tool.to_owned(), "kind" => kind)
        .increment(1);
}
