//! Mutable timetable state: one cell per (day, period, class) plus a per-slot
//! index of which teacher is teaching which class.

use std::collections::HashMap;

use itertools::Itertools;

use crate::data::{
    Assignment, Cell, ClassIdx, ClassTimetable, Day, DayMatrix, Slot, TeacherCell,
    TeacherTimetable, TimetableConfig,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    days: Vec<String>,
    periods: Vec<String>,
    classes: Vec<String>,
    class_index: HashMap<String, ClassIdx>,
    /// Laid out `[day][period][class]`.
    cells: Vec<Cell>,
    /// One map per slot, `[day][period]`: teacher -> class being taught.
    teachers_at: Vec<HashMap<String, ClassIdx>>,
}

impl Grid {
    /// Allocates an all-FREE grid. Labels are trimmed.
    pub fn new(days: &[String], periods: &[String], classes: &[String]) -> Self {
        let trim = |labels: &[String]| -> Vec<String> {
            labels.iter().map(|l| l.trim().to_string()).collect()
        };
        let days = trim(days);
        let periods = trim(periods);
        let classes = trim(classes);
        let class_index = classes
            .iter()
            .enumerate()
            .map(|(i, c)| (c.clone(), i))
            .collect();
        let slot_count = days.len() * periods.len();

        Self {
            cells: vec![Cell::Free; slot_count * classes.len()],
            teachers_at: vec![HashMap::new(); slot_count],
            days,
            periods,
            classes,
            class_index,
        }
    }

    pub fn from_config(config: &TimetableConfig) -> Self {
        Self::new(&config.days, &config.period_labels(), &config.classes)
    }

    pub fn days(&self) -> &[String] {
        &self.days
    }

    pub fn periods(&self) -> &[String] {
        &self.periods
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn class_index(&self, class: &str) -> Option<ClassIdx> {
        self.class_index.get(class).copied()
    }

    pub fn slot_count(&self) -> usize {
        self.teachers_at.len()
    }

    /// All slots, ordered by day then period.
    pub fn slots(&self) -> impl Iterator<Item = Slot> + '_ {
        (0..self.days.len())
            .cartesian_product(0..self.periods.len())
            .map(|(day, period)| Slot::new(day, period))
    }

    fn contains(&self, slot: Slot) -> bool {
        slot.day < self.days.len() && slot.period < self.periods.len()
    }

    fn slot_offset(&self, slot: Slot) -> usize {
        slot.day * self.periods.len() + slot.period
    }

    fn cell_offset(&self, slot: Slot, class: ClassIdx) -> usize {
        self.slot_offset(slot) * self.classes.len() + class
    }

    pub fn is_free(&self, slot: Slot, class: ClassIdx) -> bool {
        self.cell_at(slot, class).is_some_and(Cell::is_free)
    }

    pub fn is_teacher_busy(&self, slot: Slot, teacher: &str) -> bool {
        self.contains(slot) && self.teachers_at[self.slot_offset(slot)].contains_key(teacher)
    }

    /// Writes an assignment and marks the teacher busy for the slot.
    ///
    /// The caller must have checked `is_free` and `!is_teacher_busy` for the
    /// same slot; the grid does not re-validate.
    pub fn place(&mut self, slot: Slot, class: ClassIdx, subject: &str, teacher: &str) {
        debug_assert!(self.is_free(slot, class), "cell {} is taken", slot);
        debug_assert!(!self.is_teacher_busy(slot, teacher), "{} is busy at {}", teacher, slot);

        let cell = self.cell_offset(slot, class);
        let at = self.slot_offset(slot);
        self.cells[cell] = Cell::Assigned(Assignment {
            subject: subject.to_string(),
            teacher: teacher.to_string(),
        });
        self.teachers_at[at].insert(teacher.to_string(), class);
    }

    pub fn cell_at(&self, slot: Slot, class: ClassIdx) -> Option<&Cell> {
        if !self.contains(slot) || class >= self.classes.len() {
            return None;
        }
        self.cells.get(self.cell_offset(slot, class))
    }

    /// Cells of one class, ordered by day then period.
    pub fn row_for_class(&self, class: &str) -> Option<Vec<&Cell>> {
        let class = self.class_index(class)?;
        Some(
            self.slots()
                .map(|slot| &self.cells[self.cell_offset(slot, class)])
                .collect(),
        )
    }

    /// What the teacher is doing in each slot, ordered by day then period.
    pub fn row_for_teacher(&self, teacher: &str) -> Vec<TeacherCell> {
        self.slots()
            .map(|slot| {
                let Some(&class) = self.teachers_at[self.slot_offset(slot)].get(teacher) else {
                    return TeacherCell::Free;
                };
                let subject = self.cells[self.cell_offset(slot, class)]
                    .assignment()
                    .map(|a| a.subject.clone())
                    .unwrap_or_default();
                TeacherCell::Teaching {
                    class: self.classes[class].clone(),
                    subject,
                }
            })
            .collect()
    }

    /// All classes for one day, indexed `[period][class]`.
    pub fn matrix_for_day(&self, day: Day) -> Option<Vec<Vec<&Cell>>> {
        if day >= self.days.len() {
            return None;
        }
        Some(
            (0..self.periods.len())
                .map(|period| {
                    let start = self.cell_offset(Slot::new(day, period), 0);
                    self.cells[start..start + self.classes.len()].iter().collect()
                })
                .collect(),
        )
    }

    pub fn assignment_count(&self) -> usize {
        self.cells.iter().filter(|c| !c.is_free()).count()
    }

    /// Number of lessons placed for a teacher across the whole week.
    pub fn load_of_teacher(&self, teacher: &str) -> usize {
        self.teachers_at
            .iter()
            .filter(|at| at.contains_key(teacher))
            .count()
    }

    /// Teachers with at least one placement, sorted.
    pub fn teachers(&self) -> Vec<&str> {
        self.teachers_at
            .iter()
            .flat_map(|at| at.keys().map(String::as_str))
            .unique()
            .sorted()
            .collect()
    }

    pub fn class_timetable(&self, class: &str) -> Option<ClassTimetable> {
        let row = self.row_for_class(class)?;
        Some(ClassTimetable {
            class: class.to_string(),
            days: row
                .chunks(self.periods.len().max(1))
                .map(|day| day.iter().map(|c| (*c).clone()).collect())
                .collect(),
        })
    }

    pub fn teacher_timetable(&self, teacher: &str) -> TeacherTimetable {
        TeacherTimetable {
            teacher: teacher.to_string(),
            days: self
                .row_for_teacher(teacher)
                .chunks(self.periods.len().max(1))
                .map(<[TeacherCell]>::to_vec)
                .collect(),
        }
    }

    pub fn day_matrix(&self, day: Day) -> Option<DayMatrix> {
        let matrix = self.matrix_for_day(day)?;
        Some(DayMatrix {
            day: self.days[day].clone(),
            periods: matrix
                .into_iter()
                .map(|row| row.into_iter().cloned().collect())
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_grid() -> Grid {
        Grid::from_config(&TimetableConfig::new(&["Mon", "Tue"], 3, &["A", "B"]))
    }

    #[test]
    fn test_new_grid_is_all_free() {
        let grid = small_grid();
        assert_eq!(grid.slot_count(), 6);
        assert_eq!(grid.periods(), ["Lesson 1", "Lesson 2", "Lesson 3"]);
        assert!(grid.slots().all(|s| grid.is_free(s, 0) && grid.is_free(s, 1)));
        assert_eq!(grid.assignment_count(), 0);
        assert!(grid.teachers().is_empty());
    }

    #[test]
    fn test_slots_ordered_by_day_then_period() {
        let grid = small_grid();
        let slots: Vec<Slot> = grid.slots().collect();
        assert_eq!(slots[0], Slot::new(0, 0));
        assert_eq!(slots[2], Slot::new(0, 2));
        assert_eq!(slots[3], Slot::new(1, 0));
    }

    #[test]
    fn test_place_marks_cell_and_teacher() {
        let mut grid = small_grid();
        let slot = Slot::new(1, 2);
        grid.place(slot, 1, "Maths", "T1");

        assert!(!grid.is_free(slot, 1));
        assert!(grid.is_free(slot, 0));
        assert!(grid.is_teacher_busy(slot, "T1"));
        assert!(!grid.is_teacher_busy(slot, "T2"));
        assert!(!grid.is_teacher_busy(Slot::new(0, 2), "T1"));
        assert_eq!(
            grid.cell_at(slot, 1),
            Some(&Cell::Assigned(Assignment {
                subject: "Maths".into(),
                teacher: "T1".into()
            }))
        );
        assert_eq!(grid.assignment_count(), 1);
        assert_eq!(grid.load_of_teacher("T1"), 1);
    }

    #[test]
    fn test_out_of_range_lookups() {
        let grid = small_grid();
        assert_eq!(grid.cell_at(Slot::new(2, 0), 0), None);
        assert_eq!(grid.cell_at(Slot::new(0, 3), 0), None);
        assert_eq!(grid.cell_at(Slot::new(0, 0), 2), None);
        assert!(!grid.is_free(Slot::new(5, 5), 0));
        assert!(!grid.is_teacher_busy(Slot::new(5, 5), "T1"));
        assert!(grid.row_for_class("Z").is_none());
        assert!(grid.matrix_for_day(2).is_none());
    }

    #[test]
    fn test_views() {
        let mut grid = small_grid();
        grid.place(Slot::new(0, 1), 0, "Maths", "T1");
        grid.place(Slot::new(1, 0), 1, "Maths", "T1");
        grid.place(Slot::new(1, 0), 0, "English", "T2");

        let row = grid.row_for_class("A").unwrap();
        assert_eq!(row.len(), 6);
        assert_eq!(row[1].to_string(), "Maths (T1)");
        assert_eq!(row[3].to_string(), "English (T2)");
        assert!(row[0].is_free());

        let teacher = grid.row_for_teacher("T1");
        assert_eq!(
            teacher[1],
            TeacherCell::Teaching {
                class: "A".into(),
                subject: "Maths".into()
            }
        );
        assert_eq!(
            teacher[3],
            TeacherCell::Teaching {
                class: "B".into(),
                subject: "Maths".into()
            }
        );
        assert_eq!(teacher.iter().filter(|c| **c == TeacherCell::Free).count(), 4);

        let tue = grid.matrix_for_day(1).unwrap();
        assert_eq!(tue.len(), 3);
        assert_eq!(tue[0][0].to_string(), "English (T2)");
        assert_eq!(tue[0][1].to_string(), "Maths (T1)");
        assert!(tue[1].iter().all(|c| c.is_free()));

        assert_eq!(grid.teachers(), vec!["T1", "T2"]);
    }

    #[test]
    fn test_teacher_lookup_is_exact() {
        let mut grid = small_grid();
        grid.place(Slot::new(0, 0), 0, "Maths", "Tr. Kamau");
        assert!(!grid.is_teacher_busy(Slot::new(0, 0), "Kamau"));
        assert!(grid.row_for_teacher("Kamau").iter().all(|c| *c == TeacherCell::Free));
    }

    #[test]
    fn test_snapshots() {
        let mut grid = small_grid();
        grid.place(Slot::new(1, 2), 0, "Maths", "T1");

        let class = grid.class_timetable("A").unwrap();
        assert_eq!(class.days.len(), 2);
        assert_eq!(class.days[1].len(), 3);
        assert!(!class.days[1][2].is_free());

        let teacher = grid.teacher_timetable("T1");
        assert_eq!(teacher.days.len(), 2);
        assert_eq!(teacher.days[0], vec![TeacherCell::Free; 3]);

        let day = grid.day_matrix(1).unwrap();
        assert_eq!(day.day, "Tue");
        assert_eq!(day.periods[2][0].to_string(), "Maths (T1)");
    }
}
