//! Loading generation requests from JSON files.

use std::path::Path;

use anyhow::{Context, anyhow};
use validator::Validate;

use timetabler_models::dto::GenerateTimetableDto;
use timetabler_models::{GenerateRequest, GenerationConstraints};

/// Parse and validate a request body in the same shape as `POST /api/timetable/generate`.
pub fn parse_request(
    json: &str,
    defaults: &GenerationConstraints,
) -> anyhow::Result<GenerateRequest> {
    let dto: GenerateTimetableDto =
        serde_json::from_str(json).context("Request file is not a valid generation request")?;
    dto.validate()
        .map_err(|e| anyhow!("Invalid generation request: {}", e))?;
    dto.into_request(defaults)
        .map_err(|e| anyhow!("Invalid generation constraints: {}", e))
}

pub fn load_request(
    path: &Path,
    defaults: &GenerationConstraints,
) -> anyhow::Result<GenerateRequest> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    parse_request(&json, defaults)
}

#[cfg(test)]
mod tests {
    use super::*;
    use timetabler_models::{DayOfWeek, TimeRange};

    const REQUEST: &str = r#"{
        "school_id": "00000000-0000-0000-0000-000000000001",
        "academic_year": "2024-2025",
        "grade_level": "10",
        "section": "A",
        "class_id": "00000000-0000-0000-0000-000000000002",
        "subjects": [{
            "subject_id": "00000000-0000-0000-0000-000000000003",
            "subject_name": "Mathematics",
            "teacher_id": "00000000-0000-0000-0000-000000000004",
            "teacher_name": "Ada Lovelace",
            "periods_per_week": 4,
            "duration_minutes": 45,
            "priority_level": "high"
        }],
        "constraints": {
            "working_days": ["monday", "wednesday"],
            "lunch_break": { "start": "12:00", "end": "12:45" }
        }
    }"#;

    #[test]
    fn test_parse_request_merges_defaults() {
        let defaults = GenerationConstraints::default();
        let request = parse_request(REQUEST, &defaults).unwrap();

        assert_eq!(request.section.as_deref(), Some("A"));
        assert_eq!(request.subjects.len(), 1);
        assert_eq!(request.subjects[0].periods_per_week, 4);
        assert_eq!(
            request.constraints.working_days,
            vec![DayOfWeek::Monday, DayOfWeek::Wednesday]
        );
        assert_eq!(
            request.constraints.lunch_break,
            Some(TimeRange::parse("12:00", "12:45").unwrap())
        );
        assert_eq!(request.constraints.day_start, defaults.day_start);
        assert_eq!(
            request.constraints.break_duration_minutes,
            defaults.break_duration_minutes
        );
    }

    #[test]
    fn test_parse_request_rejects_invalid_input() {
        let defaults = GenerationConstraints::default();

        assert!(parse_request("{", &defaults).is_err());

        let no_subjects = REQUEST.replace(
            r#""subjects": [{"#,
            r#""ignored": [{"#,
        );
        assert!(parse_request(&no_subjects, &defaults).is_err());

        let bad_time = REQUEST.replace(r#""start": "12:00""#, r#""start": "noon""#);
        let err = parse_request(&bad_time, &defaults).unwrap_err();
        assert!(err.to_string().contains("constraints"));
    }
}
