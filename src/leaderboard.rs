use std::collections::HashMap;

use crate::models::{LeaderboardEntry, UploadRecord};
use crate::semester::classify_datetime;

pub const DEFAULT_TOP_N: usize = 5;

/// Ranks contributors by upload count within one semester.
///
/// Contributors are keyed on the (name, email) pair. Ties keep the order in
/// which each contributor first appears in `records`.
pub fn aggregate(
    records: &[UploadRecord],
    selected_semester: &str,
    top_n: usize,
) -> Vec<LeaderboardEntry> {
    let mut positions: HashMap<(&str, &str), usize> = HashMap::new();
    let mut entries: Vec<LeaderboardEntry> = Vec::new();

    for record in records {
        if classify_datetime(record.uploaded_at).to_string() != selected_semester {
            continue;
        }

        let key = (
            record.uploader_name.as_str(),
            record.uploader_email.as_str(),
        );
        let index = *positions.entry(key).or_insert_with(|| {
            entries.push(LeaderboardEntry {
                name: record.uploader_name.clone(),
                email: record.uploader_email.clone(),
                count: 0,
            });
            entries.len() - 1
        });
        entries[index].count += 1;
    }

    // sort_by is stable, so first-seen order survives on ties
    entries.sort_by(|a, b| b.count.cmp(&a.count));
    entries.truncate(top_n);
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::sample_upload;
    use chrono::{DateTime, TimeZone, Utc};

    fn fall_2025() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 10, 1, 9, 0, 0).unwrap()
    }

    fn spring_2025() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 2, 1, 9, 0, 0).unwrap()
    }

    fn repeat(name: &str, email: &str, at: DateTime<Utc>, times: usize) -> Vec<UploadRecord> {
        (0..times).map(|_| sample_upload(name, email, at)).collect()
    }

    #[test]
    fn ranks_contributors_in_selected_semester() {
        let mut records = repeat("A", "a@x", fall_2025(), 3);
        records.extend(repeat("B", "b@x", fall_2025(), 5));
        records.extend(repeat("C", "c@x", spring_2025(), 10));

        let leaders = aggregate(&records, "Fall 2025", DEFAULT_TOP_N);
        assert_eq!(
            leaders,
            vec![
                LeaderboardEntry {
                    name: "B".to_string(),
                    email: "b@x".to_string(),
                    count: 5,
                },
                LeaderboardEntry {
                    name: "A".to_string(),
                    email: "a@x".to_string(),
                    count: 3,
                },
            ]
        );
    }

    #[test]
    fn empty_when_nothing_matches() {
        let records = repeat("C", "c@x", spring_2025(), 2);
        assert!(aggregate(&records, "Fall 2025", DEFAULT_TOP_N).is_empty());
        assert!(aggregate(&[], "Fall 2025", DEFAULT_TOP_N).is_empty());
    }

    #[test]
    fn same_email_with_different_name_is_distinct() {
        let records = vec![
            sample_upload("Jane", "j@x", fall_2025()),
            sample_upload("J", "j@x", fall_2025()),
            sample_upload("Jane", "j@x", fall_2025()),
        ];

        let leaders = aggregate(&records, "Fall 2025", DEFAULT_TOP_N);
        assert_eq!(leaders.len(), 2);
        assert_eq!((leaders[0].name.as_str(), leaders[0].count), ("Jane", 2));
        assert_eq!((leaders[1].name.as_str(), leaders[1].count), ("J", 1));
    }

    #[test]
    fn ties_keep_first_seen_order_and_truncate() {
        let names = ["F", "E", "D", "C", "B", "A"];
        let records: Vec<UploadRecord> = names
            .iter()
            .map(|name| sample_upload(name, &format!("{name}@x"), fall_2025()))
            .collect();

        let leaders = aggregate(&records, "Fall 2025", DEFAULT_TOP_N);
        let ranked: Vec<&str> = leaders.iter().map(|entry| entry.name.as_str()).collect();
        assert_eq!(ranked, vec!["F", "E", "D", "C", "B"]);
    }

    #[test]
    fn label_match_is_exact() {
        let records = repeat("A", "a@x", fall_2025(), 1);
        assert!(aggregate(&records, "fall 2025", DEFAULT_TOP_N).is_empty());
        assert!(aggregate(&records, "Fall 2025 ", DEFAULT_TOP_N).is_empty());
    }
}
