use std::collections::HashMap;
use std::fmt::Write;

use crate::leaderboard;
use crate::models::{CourseSummary, UploadRecord};
use crate::semester::classify_datetime;

pub fn summarize_by_course(records: &[UploadRecord]) -> Vec<CourseSummary> {
    let mut map: HashMap<&str, usize> = HashMap::new();

    for record in records {
        *map.entry(record.course.as_str()).or_insert(0) += 1;
    }

    let mut summaries: Vec<CourseSummary> = map
        .into_iter()
        .map(|(course, count)| CourseSummary {
            course: course.to_string(),
            count,
        })
        .collect();

    summaries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.course.cmp(&b.course)));
    summaries
}

pub fn build_report(semester: &str, top_n: usize, records: &[UploadRecord]) -> String {
    let in_semester: Vec<UploadRecord> = records
        .iter()
        .filter(|record| classify_datetime(record.uploaded_at).to_string() == semester)
        .cloned()
        .collect();
    let leaders = leaderboard::aggregate(records, semester, top_n);
    let summaries = summarize_by_course(&in_semester);

    let mut output = String::new();

    let _ = writeln!(output, "# Exam Archive Report");
    let _ = writeln!(
        output,
        "Generated for {} ({} uploads)",
        semester,
        in_semester.len()
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Top Contributors");

    if leaders.is_empty() {
        let _ = writeln!(output, "No uploads for this semester yet!");
    } else {
        for (rank, leader) in leaders.iter().enumerate() {
            let _ = writeln!(
                output,
                "{}. {} ({}): {} uploads",
                rank + 1,
                leader.name,
                leader.email,
                leader.count
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Course Mix");

    if summaries.is_empty() {
        let _ = writeln!(output, "No courses represented.");
    } else {
        for summary in summaries.iter() {
            let _ = writeln!(output, "- {}: {} uploads", summary.course, summary.count);
        }
    }

    let mut recent = in_semester;
    recent.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at));
    let _ = writeln!(output);
    let _ = writeln!(output, "## Recent Uploads");

    if recent.is_empty() {
        let _ = writeln!(output, "Nothing uploaded yet.");
    } else {
        for record in recent.iter().take(5) {
            let _ = writeln!(
                output,
                "- {} {} ({}) by {} on {}",
                record.course,
                record.exam_type,
                record.semester,
                record.uploader_name,
                record.uploaded_at.format("%Y-%m-%d")
            );
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::sample_upload;
    use chrono::{TimeZone, Utc};

    #[test]
    fn report_covers_selected_semester_only() {
        let fall = Utc.with_ymd_and_hms(2025, 10, 2, 8, 0, 0).unwrap();
        let spring = Utc.with_ymd_and_hms(2025, 2, 2, 8, 0, 0).unwrap();
        let mut physics = sample_upload("Jules Moreno", "moreno.88@osu.edu", fall);
        physics.course = "PHYSICS 1248".to_string();
        let records = vec![
            sample_upload("Avery Lee", "lee.4012@osu.edu", fall),
            sample_upload("Avery Lee", "lee.4012@osu.edu", fall),
            physics,
            sample_upload("Kiara Patel", "patel.301@osu.edu", spring),
        ];

        let report = build_report("Fall 2025", 5, &records);
        assert!(report.contains("Generated for Fall 2025 (3 uploads)"));
        assert!(report.contains("1. Avery Lee (lee.4012@osu.edu): 2 uploads"));
        assert!(report.contains("2. Jules Moreno (moreno.88@osu.edu): 1 uploads"));
        assert!(report.contains("- MATH 1151: 2 uploads"));
        assert!(!report.contains("Kiara Patel"));
    }

    #[test]
    fn empty_semester_reports_placeholder() {
        let report = build_report("Summer 2024", 5, &[]);
        assert!(report.contains("No uploads for this semester yet!"));
        assert!(report.contains("Nothing uploaded yet."));
    }
}
