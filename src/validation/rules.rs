use serde::{Deserialize, Serialize};

/// Parameters for the range rules. Defaults match the CDI dataset layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleSet {
    /// Fields checked against `[year_min, year_max]` when present.
    pub year_fields: Vec<String>,
    /// Smallest admissible year (inclusive).
    pub year_min: i64,
    /// Largest admissible year (inclusive).
    pub year_max: i64,
    /// Field holding the measured value.
    pub percent_value_field: String,
    /// Field holding the value's unit.
    pub percent_unit_field: String,
    /// Unit literal that switches the percent rule on for a record.
    pub percent_unit: String,
    /// Smallest admissible percentage (inclusive).
    pub percent_min: f64,
    /// Largest admissible percentage (inclusive).
    pub percent_max: f64,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            year_fields: vec!["YearStart".to_string(), "YearEnd".to_string()],
            year_min: 1990,
            year_max: 2050,
            percent_value_field: "DataValue".to_string(),
            percent_unit_field: "DataValueUnit".to_string(),
            percent_unit: "%".to_string(),
            percent_min: 0.0,
            percent_max: 100.0,
        }
    }
}

impl RuleSet {
    /// `true` if `year` lies outside the configured bounds.
    pub fn year_out_of_range(&self, year: f64) -> bool {
        year < self.year_min as f64 || year > self.year_max as f64
    }

    /// `true` if a percentage is missing or outside the configured bounds.
    pub fn percent_invalid(&self, value: Option<f64>) -> bool {
        match value {
            None => true,
            Some(v) => v < self.percent_min || v > self.percent_max,
        }
    }
}
