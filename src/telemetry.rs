//! Tracing setup for the practice backend.
//!
//! `LOG_LEVEL` overrides the filter with standard `EnvFilter` directives. The
//! default keeps candidate rejections (`suggestions`) at debug and grading at
//! info; set `LOG_LEVEL="info,suggestions=debug,grading=debug"` to also see
//! submissions graded incorrect because their kind was unknown.
//!
//! `LOG_FORMAT=json` switches to structured output; anything else is the
//! human-readable formatter.

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,suggestions=debug,grading=info,practice_backend=debug,tower_http=info,axum=info";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

pub fn init_tracing() {
    let filter = EnvFilter::try_from_env("LOG_LEVEL").unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let format = LogFormat::parse(std::env::var("LOG_FORMAT").ok().as_deref());

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    // The two builders have different types, so each arm finishes its own init.
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}
