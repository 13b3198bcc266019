//! Logging setup shared by both binaries.
//!
//! Verbosity comes from `LOG_LEVEL`, a signed integer where lower is more
//! verbose: -4 is debug, 0 info, 4 warn, 8 error. Values in between round
//! towards the next quieter level. `RUST_LOG` directives, when set, are
//! layered on top.

use tracing_subscriber::{filter::LevelFilter, fmt, prelude::*, EnvFilter};

use crate::error::{Error, Result};

pub const LOG_LEVEL_ENV: &str = "LOG_LEVEL";

/// Maps a numeric `LOG_LEVEL` value onto a tracing level filter.
///
/// An unset or empty value means info.
pub fn parse_log_level(raw: Option<&str>) -> Result<LevelFilter> {
    let raw = match raw.map(str::trim) {
        None | Some("") => return Ok(LevelFilter::INFO),
        Some(raw) => raw,
    };
    let level: i64 = raw
        .parse()
        .map_err(|e| Error::ConfigError(format!("error parsing {}={:?}: {}", LOG_LEVEL_ENV, raw, e)))?;

    Ok(match level {
        i64::MIN..=-4 => LevelFilter::DEBUG,
        -3..=0 => LevelFilter::INFO,
        1..=4 => LevelFilter::WARN,
        5..=8 => LevelFilter::ERROR,
        _ => LevelFilter::OFF,
    })
}

/// Installs the global subscriber, writing to stderr.
pub fn init_logging() -> Result<()> {
    let level = parse_log_level(std::env::var(LOG_LEVEL_ENV).ok().as_deref())?;

    let env_filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let fmt_layer = fmt::layer().with_target(false).with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| Error::ConfigError(format!("failed to initialize logging: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_info() {
        assert_eq!(parse_log_level(None).unwrap(), LevelFilter::INFO);
        assert_eq!(parse_log_level(Some("")).unwrap(), LevelFilter::INFO);
    }

    #[test]
    fn test_numeric_levels() {
        assert_eq!(parse_log_level(Some("-4")).unwrap(), LevelFilter::DEBUG);
        assert_eq!(parse_log_level(Some("-8")).unwrap(), LevelFilter::DEBUG);
        assert_eq!(parse_log_level(Some("0")).unwrap(), LevelFilter::INFO);
        assert_eq!(parse_log_level(Some("-2")).unwrap(), LevelFilter::INFO);
        assert_eq!(parse_log_level(Some("4")).unwrap(), LevelFilter::WARN);
        assert_eq!(parse_log_level(Some("8")).unwrap(), LevelFilter::ERROR);
        assert_eq!(parse_log_level(Some("12")).unwrap(), LevelFilter::OFF);
    }

    #[test]
    fn test_non_numeric_level_is_config_error() {
        let err = parse_log_level(Some("debug")).unwrap_err();
        assert!(matches!(err, Error::ConfigError(_)));
    }
}
