//! Configuration for seeding generated timetables.

use timetabler_models::{SchoolId, TeacherId};

/// How many classes to seed and how many subjects each takes.
#[derive(Clone, Debug)]
pub struct SeedConfig {
    pub school_id: SchoolId,
    pub academic_year: String,
    pub classes: usize,
    pub subjects_per_class: usize,
    /// Classes that share one teacher per subject
    pub classes_per_teacher: usize,
}

impl SeedConfig {
    pub fn new(classes: usize, subjects_per_class: usize) -> Self {
        Self {
            school_id: SchoolId::new(),
            academic_year: "2024-2025".to_string(),
            classes,
            subjects_per_class,
            classes_per_teacher: 3,
        }
    }

    pub fn with_academic_year(mut self, academic_year: impl Into<String>) -> Self {
        self.academic_year = academic_year.into();
        self
    }

    pub fn with_school(mut self, school_id: SchoolId) -> Self {
        self.school_id = school_id;
        self
    }
}

/// A teacher shared by a group of classes for one subject.
#[derive(Clone, Debug)]
pub struct TeacherSeed {
    pub id: TeacherId,
    pub name: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub classes: usize,
    pub entries: usize,
    pub shortfalls: usize,
}
