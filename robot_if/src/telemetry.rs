//! # Telemetry interface

/// Fire-and-forget sink for named dashboard values.
///
/// Implementations must be usable from the dashboard thread.
pub trait TelemetrySink: Send {
    fn put_number(&mut self, name: &str, value: f64);

    fn put_bool(&mut self, name: &str, value: bool);

    fn put_string(&mut self, name: &str, value: &str);
}
