use crate::errors::{ServiceError, ServiceResult};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Build the filter directive for a bare level or a full directive string.
///
/// A bare level (`debug`) applies to this crate and to the request spans
/// emitted by `tower_http`; anything containing `=` is used as-is.
pub fn filter_directive(level: &str) -> String {
    if level.contains('=') {
        level.to_string()
    } else {
        format!("skadix_api={level},skadix={level},tower_http={level}")
    }
}

/// Initialize structured logging. `RUST_LOG` wins over `level` when set.
pub fn init_tracing(level: &str, log_json: bool) -> ServiceResult<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(filter_directive(level)))
        .map_err(|e| ServiceError::logging(format!("invalid log filter {level:?}: {e}")))?;

    let registry = tracing_subscriber::registry().with(filter);

    let result = if log_json {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_ansi(false),
            )
            .try_init()
    } else {
        registry
            .with(
                fmt::layer()
                    .compact()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .try_init()
    };

    result.map_err(|e| ServiceError::logging(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_level_expands_to_crate_targets() {
        assert_eq!(
            filter_directive("debug"),
            "skadix_api=debug,skadix=debug,tower_http=debug"
        );
    }

    #[test]
    fn full_directive_is_kept() {
        assert_eq!(filter_directive("warn,skadix_api=trace"), "warn,skadix_api=trace");
    }
}
