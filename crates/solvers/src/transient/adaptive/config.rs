/// Default bound on consecutive retries from a single time.
pub const DEFAULT_MAX_RETRIES: usize = 50;

/// Configuration for the adaptive driver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    /// Time the run starts from.
    pub start_time: f64,

    /// Time the run stops at. The last step is shortened to land on it.
    pub final_time: f64,

    /// Maximum consecutive diverged attempts before the run is abandoned.
    pub max_retries: usize,

    /// Shorten steps to land exactly on the exporter's next target time.
    pub hit_export_times: bool,
}

impl Config {
    /// Creates a config running from `t = 0` to `final_time`.
    #[must_use]
    pub fn new(final_time: f64) -> Self {
        Self {
            start_time: 0.0,
            final_time,
            max_retries: DEFAULT_MAX_RETRIES,
            hit_export_times: false,
        }
    }

    /// Validates that the time interval is finite and not reversed.
    ///
    /// # Errors
    ///
    /// Returns an error if a time is non-finite or the final time precedes
    /// the start time.
    pub fn validate(&self) -> Result<(), &'static str> {
        if !self.start_time.is_finite() {
            return Err("start_time must be finite");
        }
        if !self.final_time.is_finite() {
            return Err("final_time must be finite");
        }
        if self.final_time < self.start_time {
            return Err("final_time must not precede start_time");
        }
        Ok(())
    }
}
