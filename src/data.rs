use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;

use crate::error::ConfigError;

// Type aliases for clarity
pub type Day = usize;
pub type Period = usize;
pub type ClassIdx = usize;

/// Upper bound on lessons per day accepted by the generator.
pub const MAX_PERIODS_PER_DAY: usize = 24;
/// Upper bound on school days per week.
pub const MAX_DAYS: usize = 7;
/// Upper bound on configured classes.
pub const MAX_CLASSES: usize = 256;

/// Clock times of the ten lessons on the historical bell schedule.
pub const DEFAULT_BELL_TIMES: [&str; 10] = [
    "8:00 - 8:40",
    "8:40 - 9:20",
    "9:30 - 10:10",
    "10:10 - 10:50",
    "11:20 - 12:00",
    "12:00 - 12:40",
    "12:40 - 1:20",
    "2:00 - 2:40",
    "2:40 - 3:20",
    "3:20 - 4:00",
];

/// Separator between class identifiers in a raw input row.
pub const CLASS_DELIMITER: char = ',';

/// One (day, period) coordinate of the weekly grid, as indices into the configured days and periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
pub struct Slot {
    pub day: Day,
    pub period: Period,
}

impl Slot {
    pub fn new(day: Day, period: Period) -> Self {
        Self { day, period }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(day {}, lesson {})", self.day, self.period + 1)
    }
}

/// A raw teacher-load row as it arrives from the data-entry side.
/// `classes` is a comma separated list and may be absent or empty.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadRow {
    pub teacher: String,
    pub subject: String,
    #[serde(default)]
    pub classes: Option<String>,
}

/// A normalized teacher load: one teacher, one subject, the classes it must be taught to.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeachingLoad {
    pub teacher: String,
    pub subject: String,
    pub classes: Vec<String>,
}

impl TeachingLoad {
    #[cfg(test)]
    pub fn new(teacher: impl Into<String>, subject: impl Into<String>, classes: &[&str]) -> Self {
        Self {
            teacher: teacher.into(),
            subject: subject.into(),
            classes: classes.iter().map(|c| c.to_string()).collect(),
        }
    }

    /// Number of listed classes, known or not. Used as the priority key.
    pub fn workload(&self) -> usize {
        self.classes.len()
    }
}

/// Shape of the weekly grid.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimetableConfig {
    pub days: Vec<String>,
    pub periods_per_day: usize,
    pub classes: Vec<String>,
    /// Clock time of each lesson, by period. Lessons past the end of the list have no time.
    #[serde(default)]
    pub period_times: Vec<String>,
}

impl Default for TimetableConfig {
    fn default() -> Self {
        Self {
            days: ["Mon", "Tue", "Wed", "Thu", "Fri"]
                .iter()
                .map(|d| d.to_string())
                .collect(),
            periods_per_day: 10,
            classes: ["1R", "1G", "1B", "2R", "2G", "2B", "3R", "3Y", "4P", "4B"]
                .iter()
                .map(|c| c.to_string())
                .collect(),
            period_times: DEFAULT_BELL_TIMES.iter().map(|t| t.to_string()).collect(),
        }
    }
}

impl TimetableConfig {
    #[cfg(test)]
    pub fn new(days: &[&str], periods_per_day: usize, classes: &[&str]) -> Self {
        Self {
            days: days.iter().map(|d| d.to_string()).collect(),
            periods_per_day,
            classes: classes.iter().map(|c| c.to_string()).collect(),
            period_times: Vec::new(),
        }
    }

    #[cfg(test)]
    pub fn with_period_times(mut self, times: &[&str]) -> Self {
        self.period_times = times.iter().map(|t| t.to_string()).collect();
        self
    }

    /// Period labels, `Lesson 1` through `Lesson P`.
    pub fn period_labels(&self) -> Vec<String> {
        (1..=self.periods_per_day)
            .map(|i| format!("Lesson {}", i))
            .collect()
    }

    /// Label and clock time of every period.
    pub fn periods(&self) -> Vec<PeriodInfo> {
        self.period_labels()
            .into_iter()
            .enumerate()
            .map(|(i, label)| PeriodInfo {
                label,
                time: self
                    .period_times
                    .get(i)
                    .map(|t| t.trim().to_string())
                    .filter(|t| !t.is_empty()),
            })
            .collect()
    }

    #[cfg(test)]
    pub fn slot_count(&self) -> usize {
        self.days.len() * self.periods_per_day
    }

    /// Checks the grid can be allocated. Labels are compared after trimming.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.days.is_empty() {
            return Err(ConfigError::NoDays);
        }
        if self.days.len() > MAX_DAYS {
            return Err(ConfigError::TooManyDays(self.days.len()));
        }
        if self.periods_per_day == 0 {
            return Err(ConfigError::NoPeriods);
        }
        if self.periods_per_day > MAX_PERIODS_PER_DAY {
            return Err(ConfigError::TooManyPeriods(self.periods_per_day));
        }
        if self.classes.is_empty() {
            return Err(ConfigError::NoClasses);
        }
        if self.classes.len() > MAX_CLASSES {
            return Err(ConfigError::TooManyClasses(self.classes.len()));
        }

        let mut seen = HashSet::new();
        for day in &self.days {
            let day = day.trim();
            if day.is_empty() {
                return Err(ConfigError::BlankLabel("day"));
            }
            if !seen.insert(day) {
                return Err(ConfigError::DuplicateDay(day.to_string()));
            }
        }

        let mut seen = HashSet::new();
        for class in &self.classes {
            let class = class.trim();
            if class.is_empty() {
                return Err(ConfigError::BlankLabel("class"));
            }
            if !seen.insert(class) {
                return Err(ConfigError::DuplicateClass(class.to_string()));
            }
        }
        Ok(())
    }
}

/// A period as presented to readers of the timetable.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodInfo {
    pub label: String,
    pub time: Option<String>,
}

/// How load records are ordered before placement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum OrderingPolicy {
    /// Most classes first, ties kept in input order.
    #[default]
    Prioritized,
    /// Uniform random permutation.
    Shuffled,
}

/// A placed lesson.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub subject: String,
    pub teacher: String,
}

/// Content of one (day, period, class) cell.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum Cell {
    #[default]
    Free,
    Assigned(Assignment),
}

impl Cell {
    pub fn is_free(&self) -> bool {
        matches!(self, Cell::Free)
    }

    pub fn assignment(&self) -> Option<&Assignment> {
        match self {
            Cell::Free => None,
            Cell::Assigned(a) => Some(a),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Free => write!(f, "FREE"),
            Cell::Assigned(a) => write!(f, "{} ({})", a.subject, a.teacher),
        }
    }
}

/// What a teacher is doing in one slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum TeacherCell {
    #[default]
    Free,
    Teaching { class: String, subject: String },
}

/// A single (teacher, subject, class) lesson the engine was asked to place.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Obligation {
    pub teacher: String,
    pub subject: String,
    pub class: String,
}

impl fmt::Display for Obligation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}) for {}", self.subject, self.teacher, self.class)
    }
}

/// Outcome of a generation run beyond the grid itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationReport {
    pub placed: usize,
    /// Obligations for which no free, conflict-free slot was found.
    pub unplaced: Vec<Obligation>,
    /// Obligations naming a class outside the configured set.
    pub unknown_classes: Vec<Obligation>,
    /// Lessons placed per teacher.
    pub teacher_loads: BTreeMap<String, usize>,
}

/// The complete input for a generation request.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    #[serde(default)]
    pub config: TimetableConfig,
    pub loads: Vec<LoadRow>,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub ordering: OrderingPolicy,
}

/// Weekly timetable of one class, indexed `[day][period]`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassTimetable {
    pub class: String,
    pub days: Vec<Vec<Cell>>,
}

/// Weekly timetable of one teacher, indexed `[day][period]`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherTimetable {
    pub teacher: String,
    pub days: Vec<Vec<TeacherCell>>,
}

/// Every class for one day, indexed `[period][class]`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayMatrix {
    pub day: String,
    pub periods: Vec<Vec<Cell>>,
}

/// The final output of the generator.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimetableOutput {
    pub seed: u64,
    pub ordering: OrderingPolicy,
    pub config: TimetableConfig,
    pub periods: Vec<PeriodInfo>,
    pub master: Vec<DayMatrix>,
    pub classes: Vec<ClassTimetable>,
    pub teachers: Vec<TeacherTimetable>,
    pub report: GenerationReport,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = TimetableConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.slot_count(), 50);
        assert_eq!(config.period_labels()[9], "Lesson 10");
    }

    #[test]
    fn test_default_periods_carry_bell_times() {
        let periods = TimetableConfig::default().periods();
        assert_eq!(periods.len(), 10);
        assert_eq!(
            periods[0],
            PeriodInfo { label: "Lesson 1".into(), time: Some("8:00 - 8:40".into()) }
        );
        assert_eq!(periods[9].time.as_deref(), Some("3:20 - 4:00"));
    }

    #[test]
    fn test_period_times_shorter_than_periods() {
        let config = TimetableConfig::new(&["Mon"], 3, &["A"]).with_period_times(&["8:00", " "]);
        let times: Vec<Option<String>> = config.periods().into_iter().map(|p| p.time).collect();
        assert_eq!(times, vec![Some("8:00".to_string()), None, None]);

        let bare = TimetableConfig::new(&["Mon"], 2, &["A"]);
        assert!(bare.periods().iter().all(|p| p.time.is_none()));
    }

    #[test]
    fn test_config_size_limits() {
        let days: Vec<String> = (0..=MAX_DAYS).map(|i| format!("D{}", i)).collect();
        let config = TimetableConfig { days, ..TimetableConfig::default() };
        assert_eq!(config.validate(), Err(ConfigError::TooManyDays(MAX_DAYS + 1)));

        let classes: Vec<String> = (0..=MAX_CLASSES).map(|i| format!("C{}", i)).collect();
        let config = TimetableConfig { classes, ..TimetableConfig::default() };
        assert_eq!(config.validate(), Err(ConfigError::TooManyClasses(MAX_CLASSES + 1)));

        let classes: Vec<String> = (0..MAX_CLASSES).map(|i| format!("C{}", i)).collect();
        let days: Vec<String> = (0..MAX_DAYS).map(|i| format!("D{}", i)).collect();
        let largest = TimetableConfig {
            days,
            periods_per_day: MAX_PERIODS_PER_DAY,
            classes,
            period_times: Vec::new(),
        };
        assert_eq!(largest.validate(), Ok(()));
    }

    #[test]
    fn test_config_errors() {
        assert_eq!(
            TimetableConfig::new(&[], 5, &["A"]).validate(),
            Err(ConfigError::NoDays)
        );
        assert_eq!(
            TimetableConfig::new(&["Mon"], 0, &["A"]).validate(),
            Err(ConfigError::NoPeriods)
        );
        assert_eq!(
            TimetableConfig::new(&["Mon"], 5, &[]).validate(),
            Err(ConfigError::NoClasses)
        );
        assert_eq!(
            TimetableConfig::new(&["Mon"], MAX_PERIODS_PER_DAY + 1, &["A"]).validate(),
            Err(ConfigError::TooManyPeriods(MAX_PERIODS_PER_DAY + 1))
        );
        assert_eq!(
            TimetableConfig::new(&["Mon", " Mon"], 5, &["A"]).validate(),
            Err(ConfigError::DuplicateDay("Mon".into()))
        );
        assert_eq!(
            TimetableConfig::new(&["Mon"], 5, &["A", "A "]).validate(),
            Err(ConfigError::DuplicateClass("A".into()))
        );
        assert_eq!(
            TimetableConfig::new(&["Mon"], 5, &["A", "  "]).validate(),
            Err(ConfigError::BlankLabel("class"))
        );
    }

    #[test]
    fn test_cell_serialization() {
        let free = serde_json::to_value(Cell::Free).unwrap();
        assert_eq!(free, serde_json::json!({ "status": "free" }));

        let assigned = serde_json::to_value(Cell::Assigned(Assignment {
            subject: "Maths".into(),
            teacher: "T1".into(),
        }))
        .unwrap();
        assert_eq!(
            assigned,
            serde_json::json!({ "status": "assigned", "subject": "Maths", "teacher": "T1" })
        );
    }

    #[test]
    fn test_request_defaults() {
        let request: GenerateRequest = serde_json::from_str(
            r#"{ "loads": [{ "teacher": "T1", "subject": "Maths" }] }"#,
        )
        .unwrap();
        assert_eq!(request.config, TimetableConfig::default());
        assert_eq!(request.ordering, OrderingPolicy::Prioritized);
        assert_eq!(request.seed, None);
        assert_eq!(request.loads[0].classes, None);
    }
}
