use crate::data::{
    ClassIdx, GenerateRequest, GenerationReport, Obligation, OrderingPolicy, Slot, TeachingLoad,
    TimetableConfig, TimetableOutput,
};
use crate::error::ConfigError;
use crate::grid::Grid;
use crate::input::{distinct_teachers, normalize_rows};
use log::{debug, info, trace};
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::time::Instant;

/// A finished run: the populated grid and what could not be placed.
#[derive(Debug, Clone)]
pub struct Generation {
    pub grid: Grid,
    pub report: GenerationReport,
}

/// Fills a fresh grid with the given loads using randomized greedy placement.
///
/// Each (load, class) pair gets exactly one attempt: the slot space is shuffled
/// and the first slot where the class cell is free and the teacher is idle wins.
/// Nothing is backtracked, so a feasible timetable may go unfound. Obligations
/// that find no slot, or name an unknown class, are recorded in the report.
pub fn generate<R: Rng + ?Sized>(
    loads: &[TeachingLoad],
    config: &TimetableConfig,
    ordering: OrderingPolicy,
    rng: &mut R,
) -> Result<Generation, ConfigError> {
    let start_time = Instant::now();
    config.validate()?;

    let mut grid = Grid::from_config(config);
    let order = order_loads(loads, ordering, rng);
    info!(
        "Generating timetable for {} loads over {} classes and {} slots ({:?} ordering)...",
        loads.len(),
        grid.classes().len(),
        grid.slot_count(),
        ordering
    );

    let mut report = GenerationReport::default();
    for load in order {
        for class in &load.classes {
            let obligation = Obligation {
                teacher: load.teacher.clone(),
                subject: load.subject.clone(),
                class: class.clone(),
            };
            let Some(class_idx) = grid.class_index(class) else {
                debug!("Skipping {}: unknown class", obligation);
                report.unknown_classes.push(obligation);
                continue;
            };

            match place_obligation(&mut grid, class_idx, load, rng) {
                Some(slot) => {
                    trace!("Placed {} at {}", obligation, slot);
                    report.placed += 1;
                }
                None => {
                    debug!("Dropped {}: no free slot", obligation);
                    report.unplaced.push(obligation);
                }
            }
        }
    }

    report.teacher_loads = grid
        .teachers()
        .into_iter()
        .map(|teacher| (teacher.to_string(), grid.load_of_teacher(teacher)))
        .collect();
    debug_assert_eq!(grid.assignment_count(), report.placed);

    info!(
        "Placed {} lessons, {} unplaced, {} unknown class references in {:.2?}",
        report.placed,
        report.unplaced.len(),
        report.unknown_classes.len(),
        start_time.elapsed()
    );
    Ok(Generation { grid, report })
}

fn order_loads<'a, R: Rng + ?Sized>(
    loads: &'a [TeachingLoad],
    ordering: OrderingPolicy,
    rng: &mut R,
) -> Vec<&'a TeachingLoad> {
    let mut order: Vec<&TeachingLoad> = loads.iter().collect();
    match ordering {
        // stable, ties keep input order
        OrderingPolicy::Prioritized => order.sort_by(|a, b| b.workload().cmp(&a.workload())),
        OrderingPolicy::Shuffled => order.shuffle(rng),
    }
    order
}

fn place_obligation<R: Rng + ?Sized>(
    grid: &mut Grid,
    class: ClassIdx,
    load: &TeachingLoad,
    rng: &mut R,
) -> Option<Slot> {
    let mut slots: Vec<Slot> = grid.slots().collect();
    slots.shuffle(rng);

    let slot = slots
        .into_iter()
        .find(|&slot| grid.is_free(slot, class) && !grid.is_teacher_busy(slot, &load.teacher))?;
    grid.place(slot, class, &load.subject, &load.teacher);
    Some(slot)
}

/// Runs a full request: normalizes the rows, seeds the generator and builds every view.
pub fn generate_timetable(request: &GenerateRequest) -> Result<TimetableOutput, ConfigError> {
    let seed = request.seed.unwrap_or_else(rand::random);
    info!("Using seed {}", seed);

    let loads = normalize_rows(&request.loads);
    let mut rng = SmallRng::seed_from_u64(seed);
    let Generation { grid, report } =
        generate(&loads, &request.config, request.ordering, &mut rng)?;

    let master = (0..grid.days().len())
        .filter_map(|day| grid.day_matrix(day))
        .collect();
    let classes = grid
        .classes()
        .iter()
        .filter_map(|class| grid.class_timetable(class))
        .collect();
    let teachers = distinct_teachers(&loads)
        .iter()
        .map(|teacher| grid.teacher_timetable(teacher))
        .collect();

    Ok(TimetableOutput {
        seed,
        ordering: request.ordering,
        config: request.config.clone(),
        periods: request.config.periods(),
        master,
        classes,
        teachers,
        report,
    })
}
