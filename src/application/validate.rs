use crate::domain::models::{Candidate, TimeBlock, ViewParams};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum PlacementError {
    #[error("placement {start}-{end} is outside operating hours {hours_start}-{hours_end}")]
    OutOfBounds {
        start: f64,
        end: f64,
        hours_start: f64,
        hours_end: f64,
    },
    #[error("placement overlaps block {other_id}")]
    Overlap { other_id: String },
}

/// Rejects candidates outside the operating window or intersecting a stored
/// block on the same date. Pure; also reused by the snap engine to test
/// magnet-adjusted candidates.
pub fn validate(
    candidate: &Candidate,
    blocks: &[TimeBlock],
    params: &ViewParams,
) -> Result<(), PlacementError> {
    if candidate.start_hour < params.hours_start || candidate.end() > params.hours_end {
        return Err(PlacementError::OutOfBounds {
            start: candidate.start_hour,
            end: candidate.end(),
            hours_start: params.hours_start,
            hours_end: params.hours_end,
        });
    }

    for block in blocks {
        if candidate.ignore_id.as_deref() == Some(block.id.as_str()) {
            continue;
        }
        if block.date != candidate.date {
            continue;
        }
        // Half-open intervals: touching edges are not a collision.
        if block.end().min(candidate.end()) > block.start_hour.max(candidate.start_hour) {
            return Err(PlacementError::Overlap {
                other_id: block.id.clone(),
            });
        }
    }

    Ok(())
}
