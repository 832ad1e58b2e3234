use crate::models::UploadRecord;

/// Keeps uploads whose course and semester contain the queries, ignoring case.
/// An empty query places no constraint on its field.
pub fn filter(
    records: &[UploadRecord],
    course_query: &str,
    semester_query: &str,
) -> Vec<UploadRecord> {
    let course_query = course_query.to_lowercase();
    let semester_query = semester_query.to_lowercase();

    records
        .iter()
        .filter(|record| matches(&record.course, &course_query))
        .filter(|record| matches(&record.semester, &semester_query))
        .cloned()
        .collect()
}

fn matches(field: &str, query: &str) -> bool {
    query.is_empty() || field.to_lowercase().contains(query)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::sample_upload;
    use chrono::Utc;

    fn upload(course: &str, semester: &str) -> UploadRecord {
        let mut record = sample_upload("Avery Lee", "avery@osu.edu", Utc::now());
        record.course = course.to_string();
        record.semester = semester.to_string();
        record
    }

    fn records() -> Vec<UploadRecord> {
        vec![
            upload("CSE 2221", "Fall 2025"),
            upload("MATH 1151", "Spring 2025"),
            upload("cse 2231", "Spring 2025"),
        ]
    }

    #[test]
    fn course_match_ignores_case() {
        let found = filter(&records(), "cse", "");
        let courses: Vec<&str> = found.iter().map(|r| r.course.as_str()).collect();
        assert_eq!(courses, vec!["CSE 2221", "cse 2231"]);
    }

    #[test]
    fn empty_queries_pass_everything_through() {
        let input = records();
        assert_eq!(filter(&input, "", ""), input);
    }

    #[test]
    fn queries_combine_with_and() {
        let found = filter(&records(), "CSE", "spring");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].course, "cse 2231");
    }

    #[test]
    fn filtering_twice_changes_nothing() {
        let once = filter(&records(), "2", "2025");
        let twice = filter(&once, "2", "2025");
        assert_eq!(once, twice);
    }
}
