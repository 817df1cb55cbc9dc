use std::path::Path;
use std::str::FromStr;
use std::sync::{Once, OnceLock};

use config::LogConfig;
use time::UtcOffset;
use tracing::debug;
use tracing::level_filters::LevelFilter;
use tracing_appender::non_blocking;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_error::ErrorLayer;
use tracing_subscriber::fmt::time::OffsetTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Registry};

static GLOBAL_LOG_GUARD: OnceLock<Vec<WorkerGuard>> = OnceLock::new();
static START_LOGGING: Once = Once::new();

/// Installs the global subscriber: a stderr layer and a daily rolling file layer.
///
/// `RUST_LOG`, when set, wins over `log_config.level`. Only the first call has any effect.
pub fn init_global_logging(log_config: &LogConfig, file_name_prefix: &str) {
    START_LOGGING.call_once(|| {
        let tracing_level = LevelFilter::from_str(&log_config.level).unwrap_or(LevelFilter::WARN);

        let local_time = OffsetTime::new(
            UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC),
            time::format_description::well_known::Iso8601::DEFAULT,
        );
        let formatting_layer = fmt::layer()
            .with_ansi(false)
            .with_timer(local_time.clone())
            .with_writer(std::io::stderr);

        let file_appender = RollingFileAppender::builder()
            .filename_prefix(file_name_prefix)
            .rotation(Rotation::DAILY)
            .build(&log_config.path);
        let file_layer = match file_appender {
            Ok(file_appender) => {
                let (non_blocking_appender, guard) = non_blocking(file_appender);
                GLOBAL_LOG_GUARD.get_or_init(|| vec![guard]);
                Some(
                    fmt::layer()
                        .with_ansi(false)
                        .with_timer(local_time)
                        .with_writer(non_blocking_appender),
                )
            }
            Err(e) => {
                eprintln!(
                    "failed to create log file in '{}', log to stderr only: {}",
                    log_config.path, e
                );
                None
            }
        };

        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(tracing_level.to_string()));

        match Registry::default()
            .with(ErrorLayer::default())
            .with(formatting_layer)
            .with(file_layer)
            .with(filter)
            .try_init()
        {
            Ok(()) => debug!("log trace init successful"),
            Err(e) => eprintln!("global tracing subscriber was not installed: {}", e),
        }
    });
}

/// only use for unit test
/// parameter only use for first call
pub fn init_default_global_tracing(dir: impl AsRef<Path>, file_name: &str, level: &str) {
    let log_config = LogConfig {
        level: level.to_owned(),
        path: dir.as_ref().to_string_lossy().to_string(),
    };
    init_global_logging(&log_config, file_name);
}
