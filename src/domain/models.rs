use chrono::{NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};

/// Label substituted when a block is created or renamed with a blank name.
pub const DEFAULT_BLOCK_NAME: &str = "New block";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TimeBlock {
    pub id: String,
    pub name: String,
    pub date: NaiveDate,
    pub start_hour: f64,
    pub duration: f64,
    #[serde(default)]
    pub income: bool,
    #[serde(default)]
    pub rate: f64,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl TimeBlock {
    /// End of the half-open `[start_hour, end)` interval, in decimal hours.
    pub fn end(&self) -> f64 {
        self.start_hour + self.duration
    }

    /// Derived earning; zero unless the block is flagged as income.
    pub fn earning(&self) -> f64 {
        if self.income { self.rate * self.duration } else { 0.0 }
    }

    pub fn validate(&self) -> Result<(), String> {
        validate_non_empty(&self.id, "block.id")?;
        validate_non_empty(&self.name, "block.name")?;
        if self.duration <= 0.0 {
            return Err("block.duration must be > 0".to_string());
        }
        if self.rate < 0.0 {
            return Err("block.rate must be >= 0".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub name: String,
    pub duration: f64,
    #[serde(default)]
    pub category: Option<String>,
}

impl Template {
    pub fn validate(&self) -> Result<(), String> {
        validate_non_empty(&self.name, "template.name")?;
        if self.duration <= 0.0 {
            return Err("template.duration must be > 0".to_string());
        }
        Ok(())
    }
}

/// A proposed, not-yet-committed placement awaiting snap and validation.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub date: NaiveDate,
    pub start_hour: f64,
    pub duration: f64,
    /// Set during move/update so a block does not collide with itself.
    pub ignore_id: Option<String>,
}

impl Candidate {
    pub fn new(date: NaiveDate, start_hour: f64, duration: f64) -> Self {
        Self {
            date,
            start_hour,
            duration,
            ignore_id: None,
        }
    }

    pub fn end(&self) -> f64 {
        self.start_hour + self.duration
    }
}

/// Process-wide view configuration, mutable only through explicit settings
/// changes on the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewParams {
    pub row_height: f64,
    pub hours_start: f64,
    pub hours_end: f64,
    pub grid_quantum: f64,
    pub snap_threshold_minutes: u32,
    pub week_starts_on: Weekday,
    pub anchor_date: NaiveDate,
}

impl Default for ViewParams {
    fn default() -> Self {
        Self {
            row_height: 40.0,
            hours_start: 6.0,
            hours_end: 22.0,
            grid_quantum: 0.25,
            snap_threshold_minutes: 0,
            week_starts_on: Weekday::Sun,
            anchor_date: Utc::now().date_naive(),
        }
    }
}

impl ViewParams {
    /// Magnet threshold converted to decimal hours; zero disables magnetism.
    pub fn snap_threshold_hours(&self) -> f64 {
        f64::from(self.snap_threshold_minutes) / 60.0
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.row_height <= 0.0 {
            return Err("settings.rowHeight must be > 0".to_string());
        }
        if self.hours_end <= self.hours_start {
            return Err("settings.hoursEnd must be after settings.hoursStart".to_string());
        }
        if self.grid_quantum <= 0.0 {
            return Err("settings.gridQuantum must be > 0".to_string());
        }
        Ok(())
    }
}

/// Formats decimal hours since midnight as `HH:MM` (9.25 -> "09:15").
pub fn decimal_to_hhmm(value: f64) -> String {
    let hours = value.floor();
    let minutes = ((value - hours) * 60.0).round() as u32;
    format!("{:02}:{:02}", hours as u32, minutes)
}

fn validate_non_empty(value: &str, field_name: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{field_name} must not be empty"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, 16).expect("valid date")
    }

    fn sample_block() -> TimeBlock {
        TimeBlock {
            id: "blk-1".to_string(),
            name: "Deep work".to_string(),
            date: sample_date(),
            start_hour: 9.0,
            duration: 1.5,
            income: true,
            rate: 120.0,
            category: Some("work".to_string()),
            notes: None,
        }
    }

    #[test]
    fn block_validate_accepts_valid_block() {
        assert!(sample_block().validate().is_ok());
    }

    #[test]
    fn block_validate_rejects_non_positive_duration() {
        let mut block = sample_block();
        block.duration = 0.0;
        assert!(block.validate().is_err());
    }

    #[test]
    fn block_validate_rejects_blank_name() {
        let mut block = sample_block();
        block.name = "   ".to_string();
        assert!(block.validate().is_err());
    }

    #[test]
    fn earning_requires_income_flag() {
        let mut block = sample_block();
        assert_eq!(block.earning(), 180.0);
        block.income = false;
        assert_eq!(block.earning(), 0.0);
    }

    #[test]
    fn decimal_to_hhmm_formats_quarter_hours() {
        assert_eq!(decimal_to_hhmm(9.25), "09:15");
        assert_eq!(decimal_to_hhmm(6.0), "06:00");
        assert_eq!(decimal_to_hhmm(21.75), "21:45");
    }

    #[test]
    fn block_serde_roundtrip_uses_camel_case() {
        let block = sample_block();
        let encoded = serde_json::to_string(&block).expect("serialize block");
        assert!(encoded.contains("\"startHour\""));
        let decoded: TimeBlock = serde_json::from_str(&encoded).expect("deserialize block");
        assert_eq!(decoded, block);
    }

    #[test]
    fn block_decode_tolerates_missing_optional_fields() {
        let decoded: TimeBlock = serde_json::from_str(
            r#"{"id":"b-1","name":"Meeting","date":"2026-02-16","startHour":9.0,"duration":1.0}"#,
        )
        .expect("deserialize minimal block");
        assert!(!decoded.income);
        assert_eq!(decoded.rate, 0.0);
        assert!(decoded.category.is_none());
    }

    #[test]
    fn default_view_params_match_planner_defaults() {
        let params = ViewParams::default();
        assert_eq!(params.row_height, 40.0);
        assert_eq!(params.hours_start, 6.0);
        assert_eq!(params.hours_end, 22.0);
        assert_eq!(params.grid_quantum, 0.25);
        assert_eq!(params.snap_threshold_minutes, 0);
        assert!(params.validate().is_ok());
    }
}
