//! Console logging shared by the demos and any embedding application.

mod pretty_list;

use std::fmt::Write as FmtWrite;

use anyhow::{Context, Result};
use flexi_logger::{DeferredNow, Logger, LoggerHandle, Record};
use textwrap::{termwidth, Options};

pub use self::pretty_list::PrettyList;

/// The log spec used when RUST_LOG is not set.
pub const DEFAULT_LOG_SPEC: &str = "info";

const MAX_LINE_WIDTH: usize = 74;

/// Setup console logging with [DEFAULT_LOG_SPEC] as the fallback level.
///
/// The returned handle must be kept alive for as long as logs should be
/// written.
pub fn setup() -> Result<LoggerHandle> {
    setup_with_spec(DEFAULT_LOG_SPEC)
}

/// Setup console logging, falling back to `spec` when RUST_LOG is unset.
///
/// Simulation internals log per-frame details at trace level, so something
/// like `ccthw_flowfield::particles=trace` is a useful spec when tuning.
pub fn setup_with_spec(spec: &str) -> Result<LoggerHandle> {
    let handle = Logger::try_with_env_or_str(spec)
        .with_context(|| format!("Invalid log spec {:?}", spec))?
        .format(multiline_format)
        .start()
        .context("Unable to start the logger")?;

    log::info!(
        "Adjust the log level by setting RUST_LOG. By default RUST_LOG={}",
        spec
    );

    Ok(handle)
}

/// Formats each record with a module header and wraps the body to the
/// terminal width.
pub fn multiline_format(
    w: &mut dyn std::io::Write,
    now: &mut DeferredNow,
    record: &Record,
) -> Result<(), std::io::Error> {
    let size = termwidth().clamp(20, MAX_LINE_WIDTH);
    let wrap_options = Options::new(size)
        .initial_indent("┏ ")
        .subsequent_indent("┃ ");

    let mut full_line = String::new();
    writeln!(
        full_line,
        "{} [{}] [{}:{}]",
        record.level(),
        now.now().format("%H:%M:%S%.3f"),
        record.module_path().unwrap_or("<unknown>"),
        record.line().unwrap_or(0),
    )
    .and_then(|_| write!(full_line, "{}", record.args()))
    .map_err(|_| std::io::Error::other("unable to format log record"))?;

    writeln!(w, "{}", textwrap::fill(&full_line, wrap_options))
}
