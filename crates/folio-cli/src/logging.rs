use colored::{ColoredString, Colorize};
use std::{fmt, time::Duration};
use tracing::{Event, Subscriber};
use tracing_subscriber::{
    fmt::{FmtContext, FormatEvent, FormatFields, format},
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
};

/// Thresholds above which an elapsed time is shown in yellow, then red.
pub struct FormatElapsedTimeOptions {
    pub(crate) sec_yellow_threshold: u64,
    pub(crate) sec_red_threshold: u64,
    pub(crate) millis_yellow_threshold: Option<u128>,
    pub(crate) millis_red_threshold: Option<u128>,
}

impl Default for FormatElapsedTimeOptions {
    fn default() -> Self {
        Self {
            sec_yellow_threshold: 1,
            sec_red_threshold: 2,
            millis_yellow_threshold: Some(100),
            millis_red_threshold: Some(500),
        }
    }
}

impl FormatElapsedTimeOptions {
    /// Thresholds for one-off tasks like starting a server, where nothing under a second is worth pointing out.
    pub fn default_dev() -> Self {
        Self {
            millis_yellow_threshold: None,
            millis_red_threshold: None,
            ..Default::default()
        }
    }
}

pub fn format_elapsed_time(elapsed: Duration, options: &FormatElapsedTimeOptions) -> ColoredString {
    match elapsed.as_secs() {
        secs if secs > 60 => {
            let mins = secs / 60;
            let secs = secs % 60;
            format!("{}m{}s", mins, secs).red()
        }
        secs if secs > options.sec_red_threshold => format!("{}s", secs).red(),
        secs if secs > options.sec_yellow_threshold => format!("{}s", secs).yellow(),
        secs if secs > 0 => format!("{}s", secs).dimmed(),
        _ => match elapsed.as_millis() {
            millis
                if options
                    .millis_red_threshold
                    .is_some_and(|threshold| millis > threshold) =>
            {
                format!("{}ms", millis).red()
            }
            millis
                if options
                    .millis_yellow_threshold
                    .is_some_and(|threshold| millis > threshold) =>
            {
                format!("{}ms", millis).yellow()
            }
            millis if millis > 0 => format!("{}ms", millis).dimmed(),
            _ => format!("{}μs", elapsed.as_micros()).dimmed(),
        },
    }
}

pub struct EventLoggerFormatter;

impl<S, N> FormatEvent<S, N> for EventLoggerFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: format::Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        if event.metadata().name() == "SKIP_FORMAT" {
            ctx.field_format().format_fields(writer.by_ref(), event)?;
            return writeln!(writer);
        }

        let timestamp = chrono::Local::now().format("%H:%M:%S").to_string().dimmed();

        // Records bridged from `log` are all named `log event`, show their level instead.
        let event_name = if event.metadata().name().starts_with("log event") {
            match *event.metadata().level() {
                tracing::Level::ERROR => "error",
                tracing::Level::WARN => "warn",
                _ => "",
            }
        } else {
            event.metadata().name()
        };

        write!(
            writer,
            "{}{} ",
            timestamp,
            if event_name.is_empty() {
                String::new()
            } else {
                format!(
                    " {}",
                    event_name.to_ascii_lowercase().bold().bright_yellow()
                )
            }
        )?;

        ctx.field_format().format_fields(writer.by_ref(), event)?;

        writeln!(writer)
    }
}

pub fn init_logging() {
    let tracing_formatter = tracing_subscriber::fmt::layer().event_format(EventLoggerFormatter);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("{}=info,folio=info,tower_http=info", env!("CARGO_CRATE_NAME")).into()
            }),
        )
        .with(tracing_formatter)
        .init();
}
