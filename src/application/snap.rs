use crate::application::validate;
use crate::domain::models::{Candidate, TimeBlock, ViewParams};

/// Quantizes a raw decimal-hour value to the nearest grid multiple,
/// rounding halves up.
pub fn snap_to_grid(raw: f64, quantum: f64) -> f64 {
    if quantum <= 0.0 {
        return raw;
    }
    (raw / quantum).round() * quantum
}

/// Snaps a candidate's start: grid quantization first, then optional
/// neighbor magnetism. Returns the adjusted start hour; never mutates
/// anything and is idempotent for already-snapped values.
pub fn snap_candidate(candidate: &Candidate, blocks: &[TimeBlock], params: &ViewParams) -> f64 {
    let quantized = snap_to_grid(candidate.start_hour, params.grid_quantum);
    let threshold = params.snap_threshold_hours();
    if threshold <= 0.0 {
        return quantized;
    }

    let neighbors: Vec<&TimeBlock> = blocks
        .iter()
        .filter(|block| block.date == candidate.date)
        .filter(|block| candidate.ignore_id.as_deref() != Some(block.id.as_str()))
        .collect();

    // First opportunity: candidate start pulled flush against a neighbor's end.
    for neighbor in &neighbors {
        if (quantized - neighbor.end()).abs() <= threshold {
            let adjusted = Candidate {
                start_hour: neighbor.end(),
                ..candidate.clone()
            };
            if validate::validate(&adjusted, blocks, params).is_ok() {
                return adjusted.start_hour;
            }
        }
    }

    // Second opportunity: candidate end pulled flush against a neighbor's start.
    for neighbor in &neighbors {
        if (quantized + candidate.duration - neighbor.start_hour).abs() <= threshold {
            let adjusted = Candidate {
                start_hour: neighbor.start_hour - candidate.duration,
                ..candidate.clone()
            };
            if validate::validate(&adjusted, blocks, params).is_ok() {
                return adjusted.start_hour;
            }
        }
    }

    quantized
}
