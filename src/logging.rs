//! Logger bootstrap
//!
//! The library only talks to the `log` facade. Binaries call `init_logging`
//! once at startup to route records to stderr, keeping stdout for the run
//! report.

use flexi_logger::{FlexiLoggerError, Logger, LoggerHandle};

/// Start logging to stderr
///
/// `default_spec` is a log specification such as "info" or
/// "beam_envelope=debug". The `RUST_LOG` environment variable takes
/// precedence over it. The returned handle must be kept alive for as long as
/// logging is needed.
pub fn init_logging(default_spec: &str) -> Result<LoggerHandle, FlexiLoggerError> {
    Logger::try_with_env_or_str(default_spec)?
        .log_to_stderr()
        .format(flexi_logger::detailed_format)
        .start()
}
