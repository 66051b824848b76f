//! Admin CSV export of the grievance record set.

use chrono::{DateTime, Utc};
use grievance_domain::Grievance;

/// Header row of the exported CSV.
pub const CSV_HEADER: &str = "ID,Title,Description,Category,Status,Student,Submitted On,Updated On";

/// Renders records as CSV: every field double-quoted with embedded quotes
/// doubled, `ID` as the `GR-` + 8 export reference, dates as `YYYY-MM-DD`
/// or `-` when the store has not acknowledged a timestamp.
#[must_use]
pub fn export_csv(records: &[Grievance]) -> String {
    let mut output = String::from(CSV_HEADER);
    output.push('\n');

    for grievance in records {
        let fields = [
            grievance.id().export_reference(),
            grievance.title().to_owned(),
            grievance.description().to_owned(),
            grievance.category().as_str().to_owned(),
            grievance.status().as_str().to_owned(),
            grievance.submitter_email().to_owned(),
            date_or_dash(grievance.created_at()),
            date_or_dash(grievance.updated_at()),
        ];

        let row: Vec<String> = fields.iter().map(|field| quoted(field)).collect();
        output.push_str(&row.join(","));
        output.push('\n');
    }

    output
}

fn quoted(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

fn date_or_dash(value: Option<DateTime<Utc>>) -> String {
    value.map_or_else(
        || "-".to_owned(),
        |timestamp| timestamp.format("%Y-%m-%d").to_string(),
    )
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use grievance_domain::{Grievance, GrievanceCategory, GrievanceId, GrievanceStatus};

    use super::{CSV_HEADER, export_csv};

    fn record(title: &str, with_timestamps: bool) -> Grievance {
        let created = with_timestamps.then(|| {
            Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0)
                .single()
                .unwrap_or_else(|| unreachable!())
        });

        Grievance::from_parts(
            GrievanceId::new(),
            title,
            "description",
            GrievanceCategory::Hostel,
            GrievanceStatus::Pending,
            "alice@sece.ac.in",
            "uid-alice",
            None,
            None,
            created,
            created,
            None,
            None,
        )
        .unwrap_or_else(|_| unreachable!())
    }

    #[test]
    fn export_starts_with_the_header_row() {
        let csv = export_csv(&[]);
        assert_eq!(csv, format!("{CSV_HEADER}\n"));
    }

    #[test]
    fn rows_are_quoted_and_ids_use_the_export_reference() {
        let grievance = record("Broken AC", true);
        let csv = export_csv(&[grievance.clone()]);

        let rows: Vec<&str> = csv.lines().collect();
        assert_eq!(rows.len(), 2);
        assert!(rows[1].starts_with(&format!("\"{}\"", grievance.id().export_reference())));
        assert!(rows[1].contains("\"Broken AC\""));
        assert!(rows[1].contains("\"2024-03-01\""));
    }

    #[test]
    fn embedded_quotes_are_doubled() {
        let grievance = record("The \"AC\" again", true);
        let csv = export_csv(&[grievance]);
        assert!(csv.contains("\"The \"\"AC\"\" again\""));
    }

    #[test]
    fn missing_timestamps_render_as_dashes() {
        let grievance = record("no stamps yet", false);
        let csv = export_csv(&[grievance]);
        assert!(csv.contains("\"-\",\"-\""));
    }
}
