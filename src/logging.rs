//! Process logging: stdout plus an optional log file.
//!
//! The log file is truncated on every start, so it only ever holds the
//! current run.

use std::fs::File;
use std::str::FromStr;
use std::sync::Mutex;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Parse a level name such as `debug` or `WARN`, falling back to INFO
pub fn parse_level(raw: Option<&str>) -> LevelFilter {
    raw.and_then(|value| LevelFilter::from_str(value.trim()).ok())
        .unwrap_or(LevelFilter::INFO)
}

/// Install the global tracing subscriber
pub fn init(level: LevelFilter, log_file: Option<&str>) -> anyhow::Result<()> {
    let file = log_file
        .map(|path| {
            File::create(path).map_err(|e| anyhow::anyhow!("Failed to open log file '{}': {}", path, e))
        })
        .transpose()?;

    let file_layer = file.map(|file| {
        tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_target(true)
            .with_writer(Mutex::new(file))
    });

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_level(true),
        )
        .with(file_layer)
        .with(level)
        .init();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level(Some("debug")), LevelFilter::DEBUG);
        assert_eq!(parse_level(Some(" WARN ")), LevelFilter::WARN);
        assert_eq!(parse_level(Some("chatty")), LevelFilter::INFO);
        assert_eq!(parse_level(None), LevelFilter::INFO);
    }
}
