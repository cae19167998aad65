//! Writes statistics as `{prefix} {name}={value}` lines, optionally followed by a closing line.
//! Nothing is written until [`configure_statistic_logging`] has been called.

use std::fmt::Debug;
use std::fmt::Display;
use std::fmt::Formatter;
use std::io::stdout;
use std::io::Write;
use std::sync::OnceLock;
use std::sync::RwLock;

use convert_case::Case;
use convert_case::Casing;

/// Where and how statistic lines are written.
pub struct StatisticOptions {
    line_prefix: &'static str,
    closing_line: Option<&'static str>,
    casing: Option<Case>,
    writer: Box<dyn Write + Send + Sync>,
}

impl Debug for StatisticOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatisticOptions")
            .field("line_prefix", &self.line_prefix)
            .field("closing_line", &self.closing_line)
            .field("casing", &self.casing)
            .finish_non_exhaustive()
    }
}

static STATISTIC_OPTIONS: OnceLock<RwLock<StatisticOptions>> = OnceLock::new();

/// Configures the logging of the statistics; only the first call has an effect. Without a
/// writer the lines go to stdout.
pub fn configure_statistic_logging(
    prefix: &'static str,
    after: Option<&'static str>,
    casing: Option<Case>,
    writer: Option<Box<dyn Write + Send + Sync>>,
) {
    let _ = STATISTIC_OPTIONS.get_or_init(|| {
        RwLock::new(StatisticOptions {
            line_prefix: prefix,
            closing_line: after,
            casing,
            writer: writer.unwrap_or_else(|| Box::new(stdout())),
        })
    });
}

fn with_options(write: impl FnOnce(&mut StatisticOptions)) {
    if let Some(Ok(mut options)) = STATISTIC_OPTIONS.get().map(RwLock::write) {
        write(&mut options);
    }
}

/// Writes the line `{prefix} {name}={value}`, with `name` in the configured casing.
pub fn log_statistic(name: impl Display, value: impl Display) {
    with_options(|options| {
        let name = match options.casing {
            Some(casing) => name.to_string().to_case(casing),
            None => name.to_string(),
        };
        let _ = writeln!(options.writer, "{} {name}={value}", options.line_prefix);
    });
}

/// Writes the closing line of a block of statistics, if one is configured.
pub fn log_statistic_postfix() {
    with_options(|options| {
        if let Some(closing_line) = options.closing_line {
            let _ = writeln!(options.writer, "{closing_line}");
        }
    });
}

/// Whether [`configure_statistic_logging`] has been called.
pub fn should_log_statistics() -> bool {
    STATISTIC_OPTIONS.get().is_some()
}
