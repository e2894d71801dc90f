use crate::domain::models::{TimeBlock, ViewParams};
use chrono::{Datelike, Days, Duration, Months, NaiveDate, Weekday};

/// Pixel height of the weekday header row above the week grid.
pub const HEADER_HEIGHT: f64 = 40.0;
/// Pixel width of the leading hour-label column.
pub const HOUR_LABEL_WIDTH: f64 = 70.0;
/// Minimum rendered block height in pixels.
pub const MIN_BLOCK_HEIGHT: f64 = 6.0;
/// The month grid is always 6 weeks of 7 cells.
pub const MONTH_GRID_CELLS: usize = 42;
/// Blocks listed per month cell; later same-date blocks are not shown.
pub const MONTH_CELL_BLOCK_CAP: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    Week,
    Day,
    Month,
}

/// Week-view coordinates for one block.
#[derive(Debug, Clone, PartialEq)]
pub struct WeekBlockGeometry {
    pub id: String,
    /// Calendar-day difference from the week start, always `0..=6`.
    pub day_offset: u32,
    pub top: f64,
    pub height: f64,
    pub left: f64,
    pub width: f64,
}

/// Day-view coordinates for one block; the view is a single full-width column.
#[derive(Debug, Clone, PartialEq)]
pub struct DayBlockGeometry {
    pub id: String,
    pub top: f64,
    pub height: f64,
}

/// One of the 42 cells of the month grid.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthCell {
    pub date: NaiveDate,
    pub in_anchor_month: bool,
    /// The first `MONTH_CELL_BLOCK_CAP` same-date blocks in store order.
    pub blocks: Vec<TimeBlock>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DaySummary {
    pub date: NaiveDate,
    pub hours: f64,
    pub income: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeekSummary {
    pub days: Vec<DaySummary>,
    pub total_hours: f64,
    pub total_income: f64,
    pub average_rate: f64,
}

/// Most recent date on/before `date` whose weekday is `week_starts_on`.
pub fn start_of_week(date: NaiveDate, week_starts_on: Weekday) -> NaiveDate {
    let offset = (7 + date.weekday().num_days_from_monday() - week_starts_on.num_days_from_monday())
        % 7;
    date - Duration::days(i64::from(offset))
}

fn vertical_extent(block: &TimeBlock, params: &ViewParams) -> (f64, f64) {
    let top = (block.start_hour - params.hours_start) * params.row_height;
    let height = MIN_BLOCK_HEIGHT.max((block.duration * params.row_height).round());
    (top, height)
}

/// Projects blocks into week-grid coordinates. Blocks outside the anchor
/// week are excluded.
pub fn project_week(
    blocks: &[TimeBlock],
    params: &ViewParams,
    grid_width: f64,
) -> Vec<WeekBlockGeometry> {
    let week_start = start_of_week(params.anchor_date, params.week_starts_on);
    let day_width = (grid_width - HOUR_LABEL_WIDTH) / 7.0;

    blocks
        .iter()
        .filter_map(|block| {
            let offset = (block.date - week_start).num_days();
            if !(0..=6).contains(&offset) {
                return None;
            }
            let (top, height) = vertical_extent(block, params);
            Some(WeekBlockGeometry {
                id: block.id.clone(),
                day_offset: offset as u32,
                top: HEADER_HEIGHT + top,
                height,
                left: HOUR_LABEL_WIDTH + offset as f64 * day_width,
                width: day_width,
            })
        })
        .collect()
}

/// Projects the anchor date's blocks into day-view coordinates.
pub fn project_day(blocks: &[TimeBlock], params: &ViewParams) -> Vec<DayBlockGeometry> {
    blocks
        .iter()
        .filter(|block| block.date == params.anchor_date)
        .map(|block| {
            let (top, height) = vertical_extent(block, params);
            DayBlockGeometry {
                id: block.id.clone(),
                top,
                height,
            }
        })
        .collect()
}

/// Builds the 6x7 month grid starting at the week-aligned date on/before the
/// first of the anchor month. Each cell lists at most four blocks in store
/// order; overflow is silently dropped.
pub fn project_month(blocks: &[TimeBlock], params: &ViewParams) -> Vec<MonthCell> {
    let first_of_month = params
        .anchor_date
        .with_day(1)
        .expect("day 1 exists in every month");
    let grid_start = start_of_week(first_of_month, params.week_starts_on);

    (0..MONTH_GRID_CELLS)
        .map(|index| {
            let date = grid_start + Duration::days(index as i64);
            let cell_blocks = blocks
                .iter()
                .filter(|block| block.date == date)
                .take(MONTH_CELL_BLOCK_CAP)
                .cloned()
                .collect();
            MonthCell {
                date,
                in_anchor_month: date.month() == params.anchor_date.month()
                    && date.year() == params.anchor_date.year(),
                blocks: cell_blocks,
            }
        })
        .collect()
}

/// Per-day hours/income over the anchor week plus totals and average rate.
pub fn week_summary(blocks: &[TimeBlock], params: &ViewParams) -> WeekSummary {
    let week_start = start_of_week(params.anchor_date, params.week_starts_on);
    let mut days = Vec::with_capacity(7);
    let mut total_hours = 0.0;
    let mut total_income = 0.0;

    for offset in 0..7 {
        let date = week_start + Duration::days(offset);
        let mut hours = 0.0;
        let mut income = 0.0;
        for block in blocks.iter().filter(|block| block.date == date) {
            hours += block.duration;
            income += block.earning();
        }
        total_hours += hours;
        total_income += income;
        days.push(DaySummary { date, hours, income });
    }

    let average_rate = if total_income > 0.0 && total_hours > 0.0 {
        total_income / total_hours
    } else {
        0.0
    };

    WeekSummary {
        days,
        total_hours,
        total_income,
        average_rate,
    }
}

/// Moves an anchor date by one view-sized step in either direction.
pub fn step_anchor(anchor: NaiveDate, view: ViewKind, forward: bool) -> NaiveDate {
    match (view, forward) {
        (ViewKind::Week, true) => anchor + Days::new(7),
        (ViewKind::Week, false) => anchor - Days::new(7),
        (ViewKind::Day, true) => anchor + Days::new(1),
        (ViewKind::Day, false) => anchor - Days::new(1),
        (ViewKind::Month, true) => anchor + Months::new(1),
        (ViewKind::Month, false) => anchor - Months::new(1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn block_on(id: &str, block_date: NaiveDate, start_hour: f64, duration: f64) -> TimeBlock {
        TimeBlock {
            id: id.to_string(),
            name: "Sample".to_string(),
            date: block_date,
            start_hour,
            duration,
            income: false,
            rate: 0.0,
            category: None,
            notes: None,
        }
    }

    fn params_anchored(anchor: NaiveDate) -> ViewParams {
        ViewParams {
            anchor_date: anchor,
            ..ViewParams::default()
        }
    }

    #[test]
    fn start_of_week_walks_back_to_configured_weekday() {
        // 2026-02-18 is a Wednesday.
        let wednesday = date(2026, 2, 18);
        assert_eq!(start_of_week(wednesday, Weekday::Sun), date(2026, 2, 15));
        assert_eq!(start_of_week(wednesday, Weekday::Mon), date(2026, 2, 16));
        // A date already on the week start maps to itself.
        assert_eq!(start_of_week(date(2026, 2, 15), Weekday::Sun), date(2026, 2, 15));
    }

    #[test]
    fn week_projection_places_blocks_by_day_and_hour() {
        let anchor = date(2026, 2, 18);
        let params = params_anchored(anchor);
        let blocks = vec![
            block_on("mon", date(2026, 2, 16), 9.0, 1.0),
            block_on("outside", date(2026, 2, 23), 9.0, 1.0),
        ];

        let projected = project_week(&blocks, &params, 770.0);
        assert_eq!(projected.len(), 1);
        let geometry = &projected[0];
        assert_eq!(geometry.id, "mon");
        // Week starts Sunday 2026-02-15, so Monday is offset 1.
        assert_eq!(geometry.day_offset, 1);
        assert_eq!(geometry.top, HEADER_HEIGHT + (9.0 - 6.0) * 40.0);
        assert_eq!(geometry.height, 40.0);
        assert_eq!(geometry.left, HOUR_LABEL_WIDTH + 100.0);
        assert_eq!(geometry.width, 100.0);
    }

    #[test]
    fn short_blocks_keep_minimum_height() {
        let anchor = date(2026, 2, 16);
        let params = params_anchored(anchor);
        let blocks = vec![block_on("tiny", anchor, 9.0, 0.05)];
        let projected = project_day(&blocks, &params);
        assert_eq!(projected[0].height, MIN_BLOCK_HEIGHT);
    }

    #[test]
    fn day_projection_filters_to_anchor_date() {
        let anchor = date(2026, 2, 16);
        let params = params_anchored(anchor);
        let blocks = vec![
            block_on("today", anchor, 7.5, 2.0),
            block_on("tomorrow", date(2026, 2, 17), 7.5, 2.0),
        ];

        let projected = project_day(&blocks, &params);
        assert_eq!(projected.len(), 1);
        assert_eq!(projected[0].id, "today");
        assert_eq!(projected[0].top, (7.5 - 6.0) * 40.0);
        assert_eq!(projected[0].height, 80.0);
    }

    #[test]
    fn month_grid_is_week_aligned_and_42_cells() {
        // February 2026 starts on a Sunday, so the grid starts on the 1st.
        let params = params_anchored(date(2026, 2, 10));
        let cells = project_month(&[], &params);
        assert_eq!(cells.len(), MONTH_GRID_CELLS);
        assert_eq!(cells[0].date, date(2026, 2, 1));
        assert!(cells[0].in_anchor_month);
        // March spill-over cells are flagged as outside the anchor month.
        assert!(!cells[41].in_anchor_month);

        // A month whose 1st falls mid-week starts the grid in the prior month.
        let april = params_anchored(date(2026, 4, 10));
        let cells = project_month(&[], &april);
        assert_eq!(cells[0].date, date(2026, 3, 29));
    }

    #[test]
    fn month_cells_cap_blocks_at_four_in_store_order() {
        let day = date(2026, 2, 16);
        let params = params_anchored(day);
        let blocks: Vec<TimeBlock> = (0..6)
            .map(|i| block_on(&format!("b{i}"), day, 6.0 + i as f64, 1.0))
            .collect();

        let cells = project_month(&blocks, &params);
        let cell = cells
            .iter()
            .find(|cell| cell.date == day)
            .expect("cell for the 16th");
        assert_eq!(cell.blocks.len(), MONTH_CELL_BLOCK_CAP);
        let ids: Vec<&str> = cell.blocks.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["b0", "b1", "b2", "b3"]);
    }

    #[test]
    fn week_summary_totals_hours_and_income() {
        let anchor = date(2026, 2, 18);
        let params = params_anchored(anchor);
        let mut paid = block_on("paid", date(2026, 2, 16), 9.0, 2.0);
        paid.income = true;
        paid.rate = 100.0;
        let blocks = vec![paid, block_on("free", date(2026, 2, 17), 9.0, 1.0)];

        let summary = week_summary(&blocks, &params);
        assert_eq!(summary.total_hours, 3.0);
        assert_eq!(summary.total_income, 200.0);
        assert!((summary.average_rate - 200.0 / 3.0).abs() < 1e-9);
        assert_eq!(summary.days.len(), 7);
        assert_eq!(summary.days[1].hours, 2.0);
        assert_eq!(summary.days[2].income, 0.0);
    }

    #[test]
    fn projections_are_pure() {
        let anchor = date(2026, 2, 16);
        let params = params_anchored(anchor);
        let blocks = vec![
            block_on("a", anchor, 9.0, 1.0),
            block_on("b", date(2026, 2, 17), 11.0, 0.5),
        ];

        assert_eq!(
            project_week(&blocks, &params, 900.0),
            project_week(&blocks, &params, 900.0)
        );
        assert_eq!(project_day(&blocks, &params), project_day(&blocks, &params));
        assert_eq!(
            project_month(&blocks, &params),
            project_month(&blocks, &params)
        );
    }

    #[test]
    fn step_anchor_moves_by_view_granularity() {
        let anchor = date(2026, 1, 31);
        assert_eq!(step_anchor(anchor, ViewKind::Week, true), date(2026, 2, 7));
        assert_eq!(step_anchor(anchor, ViewKind::Day, false), date(2026, 1, 30));
        // Month steps clamp to the target month's last day.
        assert_eq!(step_anchor(anchor, ViewKind::Month, true), date(2026, 2, 28));
    }
}
