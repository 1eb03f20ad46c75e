use tracing_subscriber::fmt::format;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::prelude::*;

/// Environment variable that overrides the default log level.
pub const LOG_ENV: &str = "CHOREO_LOG";

/// Custom logger initialization to exclude timestamps but keep colors.
///
/// Use CHOREO_LOG=info or CHOREO_LOG=debug to increase verbosity.
/// Example: CHOREO_LOG=debug choreo drill.json play
pub fn init_custom_logger(debug: bool) {
    // Empty time formatter that doesn't print anything
    struct EmptyTime;
    impl FormatTime for EmptyTime {
        fn format_time(
            &self,
            _: &mut tracing_subscriber::fmt::format::Writer<'_>,
        ) -> std::fmt::Result {
            Ok(())
        }
    }

    let format = format()
        .with_timer(EmptyTime)
        .with_level(true)
        .with_target(true)
        .with_ansi(true);

    // log output goes to stderr so `--json` stays machine readable
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .event_format(format)
                .with_writer(std::io::stderr)
                .with_filter(filter(debug)),
        )
        .init();
}

/// Level filter from `CHOREO_LOG`, falling back to warn (debug with
/// `--debug`). An unparsable value also falls back.
fn filter(debug: bool) -> EnvFilter {
    let fallback = if debug { "debug" } else { "warn" };
    let level = std::env::var(LOG_ENV).unwrap_or_else(|_| fallback.to_string());
    EnvFilter::try_new(&level).unwrap_or_else(|_| EnvFilter::new(fallback))
}
