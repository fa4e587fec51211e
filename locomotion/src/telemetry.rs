/// Read-only per-tick snapshot for debug displays and logs.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Telemetry {
    pub speed: f32,
    pub max_speed: f32,
    pub grounded: bool,
    /// Fraction of ground probes touching terrain (0..=1).
    pub ground_ratio: f32,
    pub braking: bool,
    pub slope_angle_deg: f32,
    pub on_traversable_slope: bool,
    pub yaw_delta_deg: f32,
}

/// Consumer of per-tick telemetry. The core never depends on a display.
pub trait TelemetrySink {
    fn record(&mut self, telemetry: &Telemetry);
}

impl TelemetrySink for Vec<Telemetry> {
    fn record(&mut self, telemetry: &Telemetry) {
        self.push(*telemetry);
    }
}

/// Writes each snapshot to the `log` facade at debug level.
#[derive(Clone, Debug, Default)]
pub struct LogSink {
    pub label: String,
}

impl LogSink {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }
}

impl LogSink {
    /// One human-readable status line for `t`.
    pub fn line(&self, t: &Telemetry) -> String {
        format!(
            "{}: speed {:.1}/{:.1} ground {:.0}% brake {} slope {:.1}° yaw {:+.2}°",
            self.label,
            t.speed,
            t.max_speed,
            t.ground_ratio * 100.0,
            if t.braking { "ON" } else { "OFF" },
            t.slope_angle_deg,
            t.yaw_delta_deg,
        )
    }
}

impl TelemetrySink for LogSink {
    fn record(&mut self, t: &Telemetry) {
        if log::log_enabled!(log::Level::Debug) {
            log::debug!("{}", self.line(t));
        }
    }
}
