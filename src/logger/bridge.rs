//! Routes the crate's own `tracing` diagnostics to the configured sink.
//!
//! Events are rendered by the same encoder as [`Logger`](super::Logger)
//! records, so a sink never mixes two line shapes. The subscriber is installed
//! once per process; every [`route`] call swaps the destination, format and
//! level it writes with.

use parking_lot::RwLock;
use serde_json::Value;
use std::fmt;
use std::io::{self, Write};
use std::sync::Once;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::filter::{filter_fn, LevelFilter};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields, MakeWriter};
use tracing_subscriber::prelude::*;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, Layer};

use super::fields::Fields;
use super::level::Level;
use super::output::Output;
use super::record::{Format, Record};

struct Sink {
    level: Level,
    format: Format,
    output: Output,
}

static SINK: RwLock<Option<Sink>> = parking_lot::const_rwlock(None);
static INSTALL: Once = Once::new();

/// Send `tracing` events at or above `level` to `output`, encoded with `format`.
pub(crate) fn route(level: Level, format: Format, output: Output) {
    *SINK.write() = Some(Sink {
        level,
        format,
        output,
    });
    INSTALL.call_once(install);
}

fn install() {
    // RUST_LOG can narrow the events further
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::TRACE.into())
        .from_env_lossy();

    // Fails when the host already set a global subscriber
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(layer())
        .try_init();
}

fn layer<S>() -> impl Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a> + 'static,
{
    tracing_subscriber::fmt::layer()
        .event_format(RecordFormat)
        .with_writer(SinkWriter)
        .with_filter(filter_fn(|metadata| {
            SINK.read()
                .as_ref()
                .is_some_and(|sink| Level::from_tracing(*metadata.level()) >= sink.level)
        }))
}

/// Renders an event as a record: `target` and the event fields become record fields.
struct RecordFormat;

impl<S, N> FormatEvent<S, N> for RecordFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let Some(format) = SINK.read().as_ref().map(|sink| sink.format) else {
            return Ok(());
        };
        let metadata = event.metadata();
        let mut visitor = EventFields {
            message: String::new(),
            fields: Fields::new().with("target", metadata.target()),
        };
        event.record(&mut visitor);

        let record = Record::now(
            Level::from_tracing(*metadata.level()),
            &visitor.message,
            &visitor.fields,
        );
        fmt::Write::write_str(&mut writer, &String::from_utf8_lossy(&format.encode(&record)))
    }
}

struct EventFields {
    message: String,
    fields: Fields,
}

impl EventFields {
    fn record_value(&mut self, field: &Field, value: Value) {
        if field.name() == "message" {
            self.message = match value {
                Value::String(s) => s,
                other => other.to_string(),
            };
        } else {
            self.fields = self.fields.with(field.name(), value);
        }
    }
}

impl Visit for EventFields {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.record_value(field, Value::String(format!("{value:?}")));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.record_value(field, Value::from(value));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.record_value(field, Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.record_value(field, Value::from(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.record_value(field, Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.record_value(field, Value::from(value));
    }
}

/// Writer resolving the current sink for each event.
struct SinkWriter;

impl<'a> MakeWriter<'a> for SinkWriter {
    type Writer = EventWriter;

    fn make_writer(&'a self) -> Self::Writer {
        EventWriter(SINK.read().as_ref().map(|sink| sink.output.clone()))
    }
}

struct EventWriter(Option<Output>);

impl Write for EventWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if let Some(output) = &self.0 {
            output.write_record(buf)?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        match &self.0 {
            Some(output) => output.flush(),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::prelude::*;

    #[test]
    fn test_events_render_as_records() {
        let (output, buffer) = Output::buffer();
        *SINK.write() = Some(Sink {
            level: Level::Info,
            format: Format::Json,
            output,
        });

        let subscriber = tracing_subscriber::registry().with(layer());
        tracing::subscriber::with_default(subscriber, || {
            tracing::debug!("below level");
            tracing::info!(
                path = "configs/config.yaml",
                attempts = 2_u64,
                "Config reloaded successfully"
            );
        });
        *SINK.write() = None;

        let text = String::from_utf8(buffer.lock().clone()).unwrap();
        let lines: Vec<Value> = text
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 1, "{text}");
        let record = &lines[0];
        assert_eq!(record["level"], "INFO");
        assert_eq!(record["msg"], "Config reloaded successfully");
        assert_eq!(record["target"], module_path!());
        assert_eq!(record["path"], "configs/config.yaml");
        assert_eq!(record["attempts"], 2);
        assert!(record["time"].is_string());
        assert!(record.get("fields").is_none());
    }
}
