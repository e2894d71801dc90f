use crate::domain::models::{TimeBlock, decimal_to_hhmm};
use crate::infrastructure::error::PlannerError;
use chrono::Utc;
use serde_json::Value;

/// Exports the block list as `{ "exportedAt": ..., "blocks": [...] }`.
pub fn export_json(blocks: &[TimeBlock]) -> Result<String, PlannerError> {
    let payload = serde_json::json!({
        "exportedAt": Utc::now().to_rfc3339(),
        "blocks": blocks,
    });
    Ok(serde_json::to_string_pretty(&payload)?)
}

/// Parses an exported payload. Rejects with `MalformedImport` unless `blocks`
/// is present as an array and every element decodes; no partial results.
pub fn import_json(raw: &str) -> Result<Vec<TimeBlock>, PlannerError> {
    let value: Value = serde_json::from_str(raw)
        .map_err(|error| PlannerError::MalformedImport(format!("invalid JSON: {error}")))?;
    let Some(entries) = value.get("blocks").and_then(Value::as_array) else {
        return Err(PlannerError::MalformedImport(
            "expected a \"blocks\" array".to_string(),
        ));
    };

    let mut blocks = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        let block: TimeBlock = serde_json::from_value(entry.clone()).map_err(|error| {
            PlannerError::MalformedImport(format!("blocks[{index}]: {error}"))
        })?;
        blocks.push(block);
    }
    Ok(blocks)
}

/// Exports blocks as CSV with human-readable `start`/`end` columns.
pub fn export_csv(blocks: &[TimeBlock]) -> Result<String, PlannerError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "id", "name", "date", "startHour", "duration", "start", "end", "income", "rate", "notes",
        "category",
    ])?;
    for block in blocks {
        writer.write_record([
            block.id.clone(),
            block.name.clone(),
            block.date.to_string(),
            block.start_hour.to_string(),
            block.duration.to_string(),
            decimal_to_hhmm(block.start_hour),
            decimal_to_hhmm(block.end()),
            block.income.to_string(),
            block.rate.to_string(),
            block.notes.clone().unwrap_or_default(),
            block.category.clone().unwrap_or_default(),
        ])?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|error| PlannerError::InvalidInput(error.to_string()))?;
    String::from_utf8(bytes).map_err(|error| PlannerError::InvalidInput(error.to_string()))
}

/// Exports blocks as an iCalendar file: one VEVENT per block with floating
/// local times, summary = name, description = notes.
pub fn export_ics(blocks: &[TimeBlock]) -> String {
    let mut lines = vec![
        "BEGIN:VCALENDAR".to_string(),
        "VERSION:2.0".to_string(),
        "PRODID:-//panda-planner//EN".to_string(),
    ];
    for block in blocks {
        lines.push("BEGIN:VEVENT".to_string());
        lines.push(format!("UID:{}", block.id));
        lines.push(format!(
            "DTSTART:{}T{}00",
            block.date.format("%Y%m%d"),
            decimal_to_hhmm(block.start_hour).replace(':', "")
        ));
        lines.push(format!(
            "DTEND:{}T{}00",
            block.date.format("%Y%m%d"),
            decimal_to_hhmm(block.end()).replace(':', "")
        ));
        lines.push(format!("SUMMARY:{}", escape_ics_text(&block.name)));
        if let Some(notes) = block.notes.as_deref().filter(|notes| !notes.is_empty()) {
            lines.push(format!("DESCRIPTION:{}", escape_ics_text(notes)));
        }
        lines.push("END:VEVENT".to_string());
    }
    lines.push("END:VCALENDAR".to_string());
    let mut out = lines.join("\r\n");
    out.push_str("\r\n");
    out
}

fn escape_ics_text(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace(';', "\\;")
        .replace(',', "\\,")
        .replace('\n', "\\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample_blocks() -> Vec<TimeBlock> {
        vec![
            TimeBlock {
                id: "blk-1".to_string(),
                name: "Deep work".to_string(),
                date: NaiveDate::from_ymd_opt(2026, 2, 16).expect("valid date"),
                start_hour: 9.25,
                duration: 1.5,
                income: true,
                rate: 120.0,
                category: Some("work".to_string()),
                notes: Some("quarterly report".to_string()),
            },
            TimeBlock {
                id: "blk-2".to_string(),
                name: "Lunch, outside".to_string(),
                date: NaiveDate::from_ymd_opt(2026, 2, 16).expect("valid date"),
                start_hour: 12.0,
                duration: 0.5,
                income: false,
                rate: 0.0,
                category: None,
                notes: None,
            },
        ]
    }

    #[test]
    fn json_roundtrip_ignoring_export_timestamp() {
        let blocks = sample_blocks();
        let exported = export_json(&blocks).expect("export");
        let imported = import_json(&exported).expect("import");
        assert_eq!(imported, blocks);
    }

    #[test]
    fn import_rejects_missing_blocks_field() {
        assert!(matches!(
            import_json(r#"{"entries": []}"#),
            Err(PlannerError::MalformedImport(_))
        ));
        assert!(matches!(
            import_json(r#"{"blocks": {"not": "an array"}}"#),
            Err(PlannerError::MalformedImport(_))
        ));
        assert!(matches!(
            import_json("{broken"),
            Err(PlannerError::MalformedImport(_))
        ));
    }

    #[test]
    fn import_rejects_undecodable_entry_without_partial_result() {
        let raw = r#"{"blocks": [
            {"id": "ok", "name": "Kept", "date": "2026-02-16", "startHour": 9.0, "duration": 1.0},
            {"id": "broken"}
        ]}"#;
        assert!(matches!(
            import_json(raw),
            Err(PlannerError::MalformedImport(_))
        ));
    }

    #[test]
    fn csv_has_expected_header_and_derived_times() {
        let exported = export_csv(&sample_blocks()).expect("export csv");
        let mut lines = exported.lines();
        assert_eq!(
            lines.next(),
            Some("id,name,date,startHour,duration,start,end,income,rate,notes,category")
        );
        let first = lines.next().expect("first row");
        assert!(first.starts_with("blk-1,Deep work,2026-02-16,9.25,1.5,09:15,10:45,true,120,"));
        // The comma in the name forces quoting.
        let second = lines.next().expect("second row");
        assert!(second.contains("\"Lunch, outside\""));
    }

    #[test]
    fn ics_emits_one_event_per_block() {
        let exported = export_ics(&sample_blocks());
        assert_eq!(exported.matches("BEGIN:VEVENT").count(), 2);
        assert!(exported.contains("DTSTART:20260216T091500"));
        assert!(exported.contains("DTEND:20260216T104500"));
        assert!(exported.contains("SUMMARY:Deep work"));
        assert!(exported.contains("DESCRIPTION:quarterly report"));
        assert!(exported.contains("SUMMARY:Lunch\\, outside"));
        assert!(exported.ends_with("END:VCALENDAR\r\n"));
    }
}
