//! Fake generation requests and seeding through the generator.
//!
//! Seeded entries go through [`TimetableGenerator`], so they obey the same
//! conflict rules as anything created over the API. Teachers are shared
//! between groups of classes, which makes later classes work around earlier
//! ones.

mod models;

pub use models::{SeedConfig, SeedSummary, TeacherSeed};

use std::time::Instant;

use fake::Fake;
use fake::faker::name::en::Name;
use rayon::prelude::*;
use tracing::info;

use timetabler_models::{
    ClassId, GenerateRequest, GenerationConstraints, PriorityLevel, SubjectId, SubjectRequirement,
    TeacherId,
};
use timetabler_scheduling::{EntryStore, SchedulingError, TimetableGenerator};

const SUBJECTS: &[&str] = &[
    "Mathematics",
    "English",
    "Physics",
    "Chemistry",
    "Biology",
    "History",
    "Geography",
    "Computer Science",
    "Art",
    "Physical Education",
];

const SECTIONS: &[&str] = &["A", "B", "C"];

fn subject_name(index: usize) -> String {
    SUBJECTS
        .get(index)
        .map(|s| s.to_string())
        .unwrap_or_else(|| format!("Elective {}", index + 1))
}

fn priority_for(index: usize) -> PriorityLevel {
    match index {
        0 | 1 => PriorityLevel::High,
        _ if index + 1 == SUBJECTS.len() => PriorityLevel::Low,
        _ => PriorityLevel::Normal,
    }
}

/// One teacher per (subject, group of `classes_per_teacher` classes).
fn generate_teachers(config: &SeedConfig) -> Vec<Vec<TeacherSeed>> {
    let groups = config.classes.div_ceil(config.classes_per_teacher.max(1));

    (0..config.subjects_per_class)
        .into_par_iter()
        .map(|_| {
            (0..groups)
                .map(|_| TeacherSeed {
                    id: TeacherId::new(),
                    name: Name().fake(),
                })
                .collect()
        })
        .collect()
}

/// Build one generation request per class, sharing subjects and teachers.
pub fn generate_class_requests(
    config: &SeedConfig,
    defaults: &GenerationConstraints,
) -> Vec<GenerateRequest> {
    let teachers = generate_teachers(config);
    let subject_ids: Vec<SubjectId> = (0..config.subjects_per_class)
        .map(|_| SubjectId::new())
        .collect();
    let per_teacher = config.classes_per_teacher.max(1);

    (0..config.classes)
        .into_par_iter()
        .map(|class_index| {
            let subjects = (0..config.subjects_per_class)
                .map(|s| {
                    let teacher = &teachers[s][class_index / per_teacher];
                    SubjectRequirement {
                        subject_id: subject_ids[s],
                        subject_name: subject_name(s),
                        teacher_id: teacher.id,
                        teacher_name: teacher.name.clone(),
                        periods_per_week: (2u32..6).fake(),
                        duration_minutes: if s % 2 == 0 { 45 } else { 60 },
                        priority_level: priority_for(s),
                        room_id: None,
                        room_name: None,
                    }
                })
                .collect();

            GenerateRequest {
                school_id: config.school_id,
                academic_year: config.academic_year.clone(),
                grade_level: (class_index / SECTIONS.len() + 1).to_string(),
                section: Some(SECTIONS[class_index % SECTIONS.len()].to_string()),
                class_id: ClassId::new(),
                subjects,
                constraints: defaults.clone(),
            }
        })
        .collect()
}

/// Run the generator for each request in order.
pub async fn seed_timetables(
    store: &dyn EntryStore,
    requests: &[GenerateRequest],
) -> Result<SeedSummary, SchedulingError> {
    let start_time = Instant::now();
    println!("📅 Seeding timetables for {} classes...", requests.len());

    let generator = TimetableGenerator::new(store);
    let mut summary = SeedSummary::default();

    for request in requests {
        let result = generator.generate(request).await?;
        info!(
            class_id = %request.class_id,
            created = result.created.len(),
            shortfalls = result.shortfalls.len(),
            "Seeded class timetable"
        );

        summary.classes += 1;
        summary.entries += result.created.len();
        summary.shortfalls += result.shortfalls.len();
    }

    println!(
        "   ✓ Created {} entries ({} shortfalls) in {:?}",
        summary.entries,
        summary.shortfalls,
        start_time.elapsed()
    );

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use timetabler_models::{DayOfWeek, TimetableEntry, overlaps};
    use timetabler_scheduling::InMemoryEntryStore;

    fn config() -> SeedConfig {
        let mut config = SeedConfig::new(4, 5).with_academic_year("2025-2026");
        config.classes_per_teacher = 2;
        config
    }

    #[test]
    fn test_requests_shape() {
        let config = config();
        let requests = generate_class_requests(&config, &GenerationConstraints::default());

        assert_eq!(requests.len(), 4);
        let class_ids: HashSet<ClassId> = requests.iter().map(|r| r.class_id).collect();
        assert_eq!(class_ids.len(), 4);

        for request in &requests {
            assert_eq!(request.academic_year, "2025-2026");
            assert_eq!(request.school_id, config.school_id);
            assert_eq!(request.subjects.len(), 5);
            assert_eq!(request.subjects[0].subject_name, "Mathematics");
            assert!(
                request
                    .subjects
                    .iter()
                    .all(|s| (2..6).contains(&s.periods_per_week))
            );
        }
    }

    #[test]
    fn test_teachers_are_shared_within_groups() {
        let requests = generate_class_requests(&config(), &GenerationConstraints::default());

        let teacher = |class: usize| requests[class].subjects[0].teacher_id;
        assert_eq!(teacher(0), teacher(1));
        assert_eq!(teacher(2), teacher(3));
        assert_ne!(teacher(0), teacher(2));
    }

    #[test]
    fn test_subject_names_beyond_catalogue() {
        assert_eq!(subject_name(0), "Mathematics");
        assert_eq!(subject_name(SUBJECTS.len()), "Elective 11");
    }

    #[tokio::test]
    async fn test_seeded_teachers_are_never_double_booked() {
        let store = InMemoryEntryStore::new();
        let requests = generate_class_requests(&config(), &GenerationConstraints::default());

        let summary = seed_timetables(&store, &requests).await.unwrap();
        assert_eq!(summary.classes, 4);
        assert_eq!(store.len().await, summary.entries);

        let mut entries: Vec<TimetableEntry> = Vec::new();
        for request in &requests {
            entries.extend(
                store
                    .find_by_class_all_days(request.class_id, &request.academic_year)
                    .await
                    .unwrap(),
            );
        }
        assert_eq!(entries.len(), summary.entries);

        for day in DayOfWeek::weekdays() {
            let today: Vec<&TimetableEntry> = entries
                .iter()
                .filter(|e| e.details.day_of_week == day)
                .collect();
            for (i, a) in today.iter().enumerate() {
                for b in &today[i + 1..] {
                    if a.details.teacher_id == b.details.teacher_id {
                        assert!(!overlaps(
                            a.details.start_time,
                            a.details.end_time,
                            b.details.start_time,
                            b.details.end_time
                        ));
                    }
                }
            }
        }
    }
}
