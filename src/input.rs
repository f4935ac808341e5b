use itertools::Itertools;
use log::{debug, warn};

use crate::data::{CLASS_DELIMITER, LoadRow, TeachingLoad};

/// Splits a raw class list, trimming whitespace and dropping empty fragments.
pub fn parse_classes(raw: &str) -> Vec<String> {
    raw.split(CLASS_DELIMITER)
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect()
}

/// Converts raw rows into teaching loads.
///
/// Rows without a teacher name are dropped. A missing or empty class list
/// yields a load with no classes, which contributes nothing to the grid.
pub fn normalize_rows(rows: &[LoadRow]) -> Vec<TeachingLoad> {
    rows.iter()
        .enumerate()
        .filter_map(|(i, row)| {
            let teacher = row.teacher.trim();
            if teacher.is_empty() {
                warn!("Skipping row {}: no teacher given", i + 1);
                return None;
            }
            let classes = row.classes.as_deref().map(parse_classes).unwrap_or_default();
            if classes.is_empty() {
                debug!("Row {} ({}) lists no classes", i + 1, teacher);
            }
            Some(TeachingLoad {
                teacher: teacher.to_string(),
                subject: row.subject.trim().to_string(),
                classes,
            })
        })
        .collect()
}

/// Distinct teacher names in first-seen order.
pub fn distinct_teachers(loads: &[TeachingLoad]) -> Vec<String> {
    loads.iter().map(|l| l.teacher.clone()).unique().collect()
}
