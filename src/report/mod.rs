use std::fs;
use std::io;
use std::path::Path;

use crate::domain::question::GroupedQuestions;

/// Quotes a report field when it carries a delimiter, quote or line break.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Writes the cluster report to `path`, one row per cluster.
///
/// The file is truncated on every run; the header row is always present,
/// so an empty analysis produces a header-only file. Callers treat a write
/// failure as non-fatal for the request.
pub fn write_cluster_report(path: &Path, grouped: &GroupedQuestions) -> io::Result<()> {
    let mut report = String::from("Cluster,Question,Count\n");
    for bucket in &grouped.buckets {
        for group in &bucket.groups {
            report.push_str(&csv_field(bucket.label.as_str()));
            report.push(',');
            report.push_str(&csv_field(&group.representative));
            report.push(',');
            report.push_str(&group.count.to_string());
            report.push('\n');
        }
    }
    fs::write(path, report)
}

#[cfg(test)]
mod tests {
    use super::{csv_field, write_cluster_report};
    use crate::domain::question::{FrequencyLabel, GroupedQuestions, QuestionGroup};

    fn sample_grouped() -> GroupedQuestions {
        let mut grouped = GroupedQuestions::default();
        grouped.push(
            FrequencyLabel::Occasional,
            QuestionGroup {
                representative: "What is DBMS?".to_string(),
                count: 3,
                variants: vec![
                    "What is DBMS?".to_string(),
                    "Define DBMS.".to_string(),
                    "What is DBMS??".to_string(),
                ],
            },
        );
        grouped.push(
            FrequencyLabel::Rare,
            QuestionGroup {
                representative: "Explain 2NF, 3NF and \"BCNF\".".to_string(),
                count: 1,
                variants: vec!["Explain 2NF, 3NF and \"BCNF\".".to_string()],
            },
        );
        grouped
    }

    #[test]
    fn quotes_fields_with_delimiters() {
        assert_eq!(csv_field("plain text"), "plain text");
        assert_eq!(csv_field("a, b"), "\"a, b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(csv_field("line\nbreak"), "\"line\nbreak\"");
    }

    #[test]
    fn writes_one_row_per_cluster() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("report.csv");

        write_cluster_report(&path, &sample_grouped()).expect("report written");

        let contents = std::fs::read_to_string(&path).expect("report readable");
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "Cluster,Question,Count");
        assert_eq!(lines[1], "Occasionally Asked,What is DBMS?,3");
        assert_eq!(lines[2], "Rarely Asked,\"Explain 2NF, 3NF and \"\"BCNF\"\".\",1");
    }

    #[test]
    fn empty_analysis_leaves_a_header_only_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("report.csv");

        write_cluster_report(&path, &GroupedQuestions::default()).expect("report written");

        assert_eq!(
            std::fs::read_to_string(&path).expect("report readable"),
            "Cluster,Question,Count\n"
        );
    }

    #[test]
    fn report_is_overwritten_not_appended() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("report.csv");

        write_cluster_report(&path, &sample_grouped()).expect("first write");
        write_cluster_report(&path, &GroupedQuestions::default()).expect("second write");

        assert_eq!(
            std::fs::read_to_string(&path).expect("report readable"),
            "Cluster,Question,Count\n"
        );
    }
}
