//! Telemetry sink writing to the log

use log::debug;

use robot_if::TelemetrySink;
use util::logger::TELEMETRY_TARGET;

/// Publishes values as debug log records under the telemetry target, which
/// only reaches the session log file.
#[derive(Debug, Default)]
pub struct LogTelemetry;

impl TelemetrySink for LogTelemetry {
    fn put_number(&mut self, name: &str, value: f64) {
        debug!(target: TELEMETRY_TARGET, "{} = {:.3}", name, value);
    }

    fn put_bool(&mut self, name: &str, value: bool) {
        debug!(target: TELEMETRY_TARGET, "{} = {}", name, value);
    }

    fn put_string(&mut self, name: &str, value: &str) {
        debug!(target: TELEMETRY_TARGET, "{} = \"{}\"", name, value);
    }
}
