use crate::domain::models::{Template, TimeBlock, ViewParams};
use crate::infrastructure::error::PlannerError;
use chrono::NaiveDate;
use serde_json::Value;
use std::fs;
use std::path::PathBuf;

/// Generic single-record key-value store for the planner's persisted state.
/// The engine treats it as a best-effort sink; callers may also load from it
/// at startup through [`load_or_default`].
pub trait StateStore {
    fn load(&self) -> Result<Option<String>, PlannerError>;
    fn save(&self, record: &str) -> Result<(), PlannerError>;
}

/// File-backed store holding the record as pretty-printed JSON.
#[derive(Debug, Clone)]
pub struct JsonFileStateStore {
    path: PathBuf,
}

impl JsonFileStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl StateStore for JsonFileStateStore {
    fn load(&self) -> Result<Option<String>, PlannerError> {
        if !self.path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(&self.path)?))
    }

    fn save(&self, record: &str) -> Result<(), PlannerError> {
        fs::write(&self.path, record)?;
        Ok(())
    }
}

/// Everything the planner persists between sessions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PersistedState {
    pub params: ViewParams,
    pub blocks: Vec<TimeBlock>,
    pub templates: Vec<Template>,
}

/// Encodes the persisted record:
/// `{ settings: {...}, placedBlocks: [...], templates: [...] }`.
pub fn encode_state(state: &PersistedState) -> Result<String, PlannerError> {
    let value = serde_json::json!({
        "settings": {
            "rowHeight": state.params.row_height,
            "hoursStart": state.params.hours_start,
            "hoursEnd": state.params.hours_end,
            "gridQuantum": state.params.grid_quantum,
            "snapThresholdMinutes": state.params.snap_threshold_minutes,
            "anchorDateISO": state.params.anchor_date.to_string(),
        },
        "placedBlocks": state.blocks,
        "templates": state.templates,
    });
    let formatted = serde_json::to_string_pretty(&value)?;
    Ok(format!("{formatted}\n"))
}

/// Decodes a persisted record, recovering silently from any malformed field
/// by falling back to its default. Never fails: an unparsable record yields
/// the full default state.
pub fn decode_state(raw: &str) -> PersistedState {
    let Ok(value) = serde_json::from_str::<Value>(raw) else {
        return PersistedState::default();
    };

    let mut params = ViewParams::default();
    if let Some(settings) = value.get("settings") {
        if let Some(row_height) = positive_number(settings, "rowHeight") {
            params.row_height = row_height;
        }
        if let Some(hours_start) = number(settings, "hoursStart") {
            params.hours_start = hours_start;
        }
        if let Some(hours_end) = number(settings, "hoursEnd") {
            params.hours_end = hours_end;
        }
        if let Some(quantum) = positive_number(settings, "gridQuantum") {
            params.grid_quantum = quantum;
        }
        if let Some(threshold) = settings
            .get("snapThresholdMinutes")
            .and_then(Value::as_u64)
            .and_then(|minutes| u32::try_from(minutes).ok())
        {
            params.snap_threshold_minutes = threshold;
        }
        if let Some(anchor) = settings
            .get("anchorDateISO")
            .and_then(Value::as_str)
            .and_then(|iso| iso.parse::<NaiveDate>().ok())
        {
            params.anchor_date = anchor;
        }
        // A window decoded inverted is unusable; fall back wholesale.
        if params.validate().is_err() {
            let defaults = ViewParams::default();
            params.hours_start = defaults.hours_start;
            params.hours_end = defaults.hours_end;
        }
    }

    let blocks = decode_entries::<TimeBlock>(&value, "placedBlocks");
    let templates = decode_entries::<Template>(&value, "templates");

    PersistedState {
        params,
        blocks,
        templates,
    }
}

/// Decoded state from the store, or defaults when the store is empty,
/// unreadable, or malformed.
pub fn load_or_default(store: &dyn StateStore) -> PersistedState {
    match store.load() {
        Ok(Some(raw)) => decode_state(&raw),
        _ => PersistedState::default(),
    }
}

fn number(settings: &Value, key: &str) -> Option<f64> {
    settings.get(key).and_then(Value::as_f64).filter(|v| v.is_finite())
}

fn positive_number(settings: &Value, key: &str) -> Option<f64> {
    number(settings, key).filter(|v| *v > 0.0)
}

fn decode_entries<T: serde::de::DeserializeOwned>(value: &Value, key: &str) -> Vec<T> {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(|entry| serde_json::from_value(entry.clone()).ok())
                .collect()
        })
        .unwrap_or_default()
}
