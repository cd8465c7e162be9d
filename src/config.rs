//! Header decoding configuration.

use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};

/// Default plausibility window, in years either side of the reference year, for the
/// disk header's recording start date.
pub const DEFAULT_START_DATE_WINDOW_YEARS: i32 = 20;

/// Tunables for header validation.
///
/// ```rust
/// use ibtstream::DecodeConfig;
///
/// let config = DecodeConfig { reference_year: Some(2024), ..DecodeConfig::default() };
/// assert_eq!(config.year_bounds(), (2004, 2044));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeConfig {
    /// Accept start dates within this many years of the reference year.
    pub start_date_window_years: i32,
    /// Year the window is centred on. `None` uses the current UTC year at decode time.
    pub reference_year: Option<i32>,
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self { start_date_window_years: DEFAULT_START_DATE_WINDOW_YEARS, reference_year: None }
    }
}

impl DecodeConfig {
    /// Inclusive `(earliest, latest)` calendar years accepted for a recording start.
    pub fn year_bounds(&self) -> (i32, i32) {
        let reference = self.reference_year.unwrap_or_else(|| Utc::now().year());
        (reference - self.start_date_window_years, reference + self.start_date_window_years)
    }
}
