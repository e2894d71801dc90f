use crate::application::history::HistoryManager;
use crate::application::projection::{
    self, DayBlockGeometry, MonthCell, ViewKind, WeekBlockGeometry, WeekSummary,
};
use crate::application::snap;
use crate::application::store::TimeBlockStore;
use crate::application::validate::{self, PlacementError};
use crate::domain::models::{Candidate, DEFAULT_BLOCK_NAME, Template, TimeBlock, ViewParams};
use crate::infrastructure::error::PlannerError;
use crate::infrastructure::export;
use crate::infrastructure::state_store::{PersistedState, StateStore, encode_state};
use chrono::{NaiveDate, Utc, Weekday};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

fn next_id(prefix: &str) -> String {
    let sequence = NEXT_ID.fetch_add(1, Ordering::Relaxed);
    format!("{prefix}-{}-{sequence}", Utc::now().timestamp_micros())
}

/// Outcome of the pure preview path: the snapped start plus the validation
/// verdict for the adjusted candidate. Producing one never mutates anything.
#[derive(Debug, Clone, PartialEq)]
pub struct Proposal {
    pub start_hour: f64,
    pub result: Result<(), PlacementError>,
}

impl Proposal {
    pub fn is_accepted(&self) -> bool {
        self.result.is_ok()
    }
}

/// Inputs for a new placement. Metadata defaults to empty; a blank name is
/// replaced with [`DEFAULT_BLOCK_NAME`].
#[derive(Debug, Clone)]
pub struct CreateBlock {
    pub name: Option<String>,
    pub date: NaiveDate,
    pub start_hour: f64,
    pub duration: f64,
    pub income: bool,
    pub rate: f64,
    pub category: Option<String>,
    pub notes: Option<String>,
}

impl CreateBlock {
    pub fn new(date: NaiveDate, start_hour: f64, duration: f64) -> Self {
        Self {
            name: None,
            date,
            start_hour,
            duration,
            income: false,
            rate: 0.0,
            category: None,
            notes: None,
        }
    }
}

/// Partial update for an existing block. `None` leaves a field untouched;
/// a blank string clears `category`/`notes`.
#[derive(Debug, Clone, Default)]
pub struct BlockPatch {
    pub name: Option<String>,
    pub date: Option<NaiveDate>,
    pub start_hour: Option<f64>,
    pub duration: Option<f64>,
    pub income: Option<bool>,
    pub rate: Option<f64>,
    pub category: Option<String>,
    pub notes: Option<String>,
}

/// Partial update for the view configuration.
#[derive(Debug, Clone, Default)]
pub struct ViewParamsPatch {
    pub row_height: Option<f64>,
    pub hours_start: Option<f64>,
    pub hours_end: Option<f64>,
    pub grid_quantum: Option<f64>,
    pub snap_threshold_minutes: Option<u32>,
    pub week_starts_on: Option<Weekday>,
}

/// The planner core: owns the block store, the undo history, the templates,
/// and the view configuration. All mutation is synchronous and runs to
/// completion; callers pass the engine explicitly instead of sharing state.
pub struct PlannerEngine {
    store: TimeBlockStore,
    history: HistoryManager,
    params: ViewParams,
    templates: Vec<Template>,
    sink: Option<Box<dyn StateStore>>,
    log_path: Option<PathBuf>,
}

impl PlannerEngine {
    pub fn new() -> Self {
        Self::with_params(ViewParams::default())
    }

    pub fn with_params(params: ViewParams) -> Self {
        Self::from_persisted(PersistedState {
            params,
            blocks: Vec::new(),
            templates: Vec::new(),
        })
    }

    /// Restores a previously persisted session. Persisted blocks are trusted
    /// the same way history snapshots are: they were validated when placed.
    pub fn from_persisted(state: PersistedState) -> Self {
        let mut store = TimeBlockStore::default();
        store.replace_all(state.blocks);
        let mut history = HistoryManager::default();
        history.commit(store.snapshot());
        Self {
            store,
            history,
            params: state.params,
            templates: state.templates,
            sink: None,
            log_path: None,
        }
    }

    /// Attaches the persistence sink notified after every committed mutation.
    /// Notifications are best-effort; a failing sink never rolls back.
    pub fn attach_sink(&mut self, sink: Box<dyn StateStore>) {
        self.sink = Some(sink);
    }

    /// Enables the JSONL mutation log at the given path.
    pub fn set_log_path(&mut self, path: impl Into<PathBuf>) {
        self.log_path = Some(path.into());
    }

    pub fn view_params(&self) -> &ViewParams {
        &self.params
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Blocks in insertion order, optionally restricted to one date.
    pub fn list_blocks(&self, date: Option<NaiveDate>) -> Vec<TimeBlock> {
        match date {
            Some(date) => self.store.on_date(date).cloned().collect(),
            None => self.store.blocks().to_vec(),
        }
    }

    pub fn get_block(&self, id: &str) -> Option<&TimeBlock> {
        self.store.get(id.trim())
    }

    /// Pure preview for the drag state machine: snap, validate, report.
    /// Applies the same duration floor as `create_block` so a preview
    /// verdict always matches the commit verdict for the same candidate.
    pub fn propose(&self, candidate: Candidate) -> Proposal {
        let mut adjusted = candidate;
        adjusted.duration = adjusted.duration.max(self.params.grid_quantum);
        adjusted.start_hour = snap::snap_candidate(&adjusted, self.store.blocks(), &self.params);
        let result = validate::validate(&adjusted, self.store.blocks(), &self.params);
        Proposal {
            start_hour: adjusted.start_hour,
            result,
        }
    }

    pub fn create_block(&mut self, request: CreateBlock) -> Result<String, PlannerError> {
        let duration = request.duration.max(self.params.grid_quantum);
        let mut candidate = Candidate::new(request.date, request.start_hour, duration);
        candidate.start_hour = snap::snap_candidate(&candidate, self.store.blocks(), &self.params);
        validate::validate(&candidate, self.store.blocks(), &self.params)?;

        let block = TimeBlock {
            id: next_id("blk"),
            name: normalize_name(request.name),
            date: candidate.date,
            start_hour: candidate.start_hour,
            duration,
            income: request.income,
            rate: request.rate,
            category: normalize_meta(request.category),
            notes: normalize_meta(request.notes),
        };
        block.validate().map_err(PlannerError::InvalidInput)?;

        let id = block.id.clone();
        self.store.insert(block);
        self.commit_mutation("create_block", &format!("created block_id={id}"));
        Ok(id)
    }

    /// Places a new block stamped from a template (built-in or user-added).
    pub fn create_from_template(
        &mut self,
        template_name: &str,
        date: NaiveDate,
        start_hour: f64,
    ) -> Result<String, PlannerError> {
        let template = self
            .list_templates()
            .into_iter()
            .find(|template| template.name == template_name)
            .ok_or_else(|| PlannerError::NotFound(format!("template {template_name}")))?;

        let mut request = CreateBlock::new(date, start_hour, template.duration);
        request.name = Some(template.name);
        request.category = template.category;
        self.create_block(request)
    }

    pub fn update_block(&mut self, id: &str, patch: BlockPatch) -> Result<TimeBlock, PlannerError> {
        let id = id.trim();
        let Some(existing) = self.store.get(id) else {
            return Err(PlannerError::NotFound(format!("block {id}")));
        };

        let placement_changed =
            patch.date.is_some() || patch.start_hour.is_some() || patch.duration.is_some();

        let mut updated = existing.clone();
        if let Some(name) = patch.name {
            updated.name = normalize_name(Some(name));
        }
        if let Some(date) = patch.date {
            updated.date = date;
        }
        if let Some(start_hour) = patch.start_hour {
            updated.start_hour = start_hour;
        }
        if let Some(duration) = patch.duration {
            updated.duration = duration.max(self.params.grid_quantum);
        }
        if let Some(income) = patch.income {
            updated.income = income;
        }
        if let Some(rate) = patch.rate {
            updated.rate = rate;
        }
        if let Some(category) = patch.category {
            updated.category = normalize_meta(Some(category));
        }
        if let Some(notes) = patch.notes {
            updated.notes = normalize_meta(Some(notes));
        }

        let mut candidate = Candidate {
            date: updated.date,
            start_hour: updated.start_hour,
            duration: updated.duration,
            ignore_id: Some(updated.id.clone()),
        };
        if placement_changed {
            candidate.start_hour =
                snap::snap_candidate(&candidate, self.store.blocks(), &self.params);
        }
        validate::validate(&candidate, self.store.blocks(), &self.params)?;
        updated.start_hour = candidate.start_hour;
        updated.validate().map_err(PlannerError::InvalidInput)?;

        self.store.replace(id, updated.clone());
        self.commit_mutation("update_block", &format!("updated block_id={id}"));
        Ok(updated)
    }

    /// Deletes a block; `Ok(false)` when the id is unknown.
    pub fn delete_block(&mut self, id: &str) -> Result<bool, PlannerError> {
        let id = id.trim();
        if self.store.remove(id).is_none() {
            return Ok(false);
        }
        self.commit_mutation("delete_block", &format!("deleted block_id={id}"));
        Ok(true)
    }

    pub fn undo(&mut self) -> bool {
        let restored = match self.history.undo() {
            Some(snapshot) => snapshot.to_vec(),
            None => return false,
        };
        self.store.replace_all(restored);
        self.append_log("info", "undo", "restored previous snapshot");
        self.notify_sink("undo");
        true
    }

    pub fn redo(&mut self) -> bool {
        let restored = match self.history.redo() {
            Some(snapshot) => snapshot.to_vec(),
            None => return false,
        };
        self.store.replace_all(restored);
        self.append_log("info", "redo", "restored next snapshot");
        self.notify_sink("redo");
        true
    }

    /// Replaces the store wholesale from an exported JSON payload; one
    /// committed mutation, one history entry. Rejection mutates nothing.
    pub fn import_json(&mut self, raw: &str) -> Result<usize, PlannerError> {
        let blocks = export::import_json(raw)?;
        let count = blocks.len();
        self.store.replace_all(blocks);
        self.commit_mutation("import_json", &format!("imported {count} blocks"));
        Ok(count)
    }

    pub fn export_json(&self) -> Result<String, PlannerError> {
        export::export_json(self.store.blocks())
    }

    pub fn export_csv(&self) -> Result<String, PlannerError> {
        export::export_csv(self.store.blocks())
    }

    pub fn export_ics(&self) -> String {
        export::export_ics(self.store.blocks())
    }

    /// Built-in templates first, then user-added ones.
    pub fn list_templates(&self) -> Vec<Template> {
        let mut templates = builtin_templates();
        templates.extend(self.templates.iter().cloned());
        templates
    }

    pub fn add_template(&mut self, template: Template) -> Result<(), PlannerError> {
        template.validate().map_err(PlannerError::InvalidInput)?;
        self.templates.push(template);
        self.append_log("info", "add_template", "added template");
        self.notify_sink("add_template");
        Ok(())
    }

    pub fn update_view_params(&mut self, patch: ViewParamsPatch) -> Result<(), PlannerError> {
        let mut params = self.params.clone();
        if let Some(row_height) = patch.row_height {
            params.row_height = row_height;
        }
        if let Some(hours_start) = patch.hours_start {
            params.hours_start = hours_start;
        }
        if let Some(hours_end) = patch.hours_end {
            params.hours_end = hours_end;
        }
        if let Some(grid_quantum) = patch.grid_quantum {
            params.grid_quantum = grid_quantum;
        }
        if let Some(threshold) = patch.snap_threshold_minutes {
            params.snap_threshold_minutes = threshold;
        }
        if let Some(week_starts_on) = patch.week_starts_on {
            params.week_starts_on = week_starts_on;
        }
        params.validate().map_err(PlannerError::InvalidInput)?;

        self.params = params;
        self.append_log("info", "update_view_params", "settings changed");
        self.notify_sink("update_view_params");
        Ok(())
    }

    /// Moves the view anchor one week/day/month in either direction.
    pub fn step_anchor(&mut self, view: ViewKind, forward: bool) -> NaiveDate {
        self.params.anchor_date = projection::step_anchor(self.params.anchor_date, view, forward);
        self.append_log(
            "info",
            "step_anchor",
            &format!("anchor moved to {}", self.params.anchor_date),
        );
        self.notify_sink("step_anchor");
        self.params.anchor_date
    }

    pub fn go_to_date(&mut self, date: NaiveDate) {
        self.params.anchor_date = date;
        self.append_log("info", "go_to_date", &format!("anchor moved to {date}"));
        self.notify_sink("go_to_date");
    }

    pub fn project_week(&self, grid_width: f64) -> Vec<WeekBlockGeometry> {
        projection::project_week(self.store.blocks(), &self.params, grid_width)
    }

    pub fn project_day(&self) -> Vec<DayBlockGeometry> {
        projection::project_day(self.store.blocks(), &self.params)
    }

    pub fn project_month(&self) -> Vec<MonthCell> {
        projection::project_month(self.store.blocks(), &self.params)
    }

    pub fn week_summary(&self) -> WeekSummary {
        projection::week_summary(self.store.blocks(), &self.params)
    }

    /// Snapshot of everything the planner persists between sessions.
    pub fn persisted_state(&self) -> PersistedState {
        PersistedState {
            params: self.params.clone(),
            blocks: self.store.snapshot(),
            templates: self.templates.clone(),
        }
    }

    fn commit_mutation(&mut self, operation: &str, message: &str) {
        self.history.commit(self.store.snapshot());
        self.append_log("info", operation, message);
        self.notify_sink(operation);
    }

    fn notify_sink(&self, operation: &str) {
        let Some(sink) = self.sink.as_deref() else {
            return;
        };
        let result = encode_state(&self.persisted_state()).and_then(|record| sink.save(&record));
        if let Err(error) = result {
            self.append_log("error", operation, &format!("persistence sink failed: {error}"));
        }
    }

    fn append_log(&self, level: &str, operation: &str, message: &str) {
        let Some(path) = self.log_path.as_deref() else {
            return;
        };
        let payload = serde_json::json!({
            "timestamp": Utc::now().to_rfc3339(),
            "level": level,
            "operation": operation,
            "message": message,
        });
        if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(path) {
            let _ = writeln!(file, "{payload}");
        }
    }
}

impl Default for PlannerEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn builtin_templates() -> Vec<Template> {
    vec![
        Template {
            name: "30-minute meeting".to_string(),
            duration: 0.5,
            category: None,
        },
        Template {
            name: "1-hour session".to_string(),
            duration: 1.0,
            category: None,
        },
    ]
}

fn normalize_name(name: Option<String>) -> String {
    name.as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToOwned::to_owned)
        .unwrap_or_else(|| DEFAULT_BLOCK_NAME.to_string())
}

fn normalize_meta(value: Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToOwned::to_owned)
}
