//! Tabular export of records as CSV bytes.

use chrono::{DateTime, Utc};
use csv::WriterBuilder;
use tracing::info;

use jobscout_shared::{CategoryLabel, JobScoutError, Record, Result};

/// Separator between matched sentences inside one category cell.
pub const SENTENCE_JOINER: &str = " | ";

const FIXED_COLUMNS: [&str; 7] = [
    "id",
    "url",
    "title",
    "organization",
    "location",
    "country",
    "description",
];

/// Header row: fixed columns, one column per category, then the matched set.
pub fn header() -> Vec<String> {
    FIXED_COLUMNS
        .iter()
        .map(|c| c.to_string())
        .chain(CategoryLabel::ALL.iter().map(|l| l.key().to_string()))
        .chain(std::iter::once("matched_categories".to_string()))
        .collect()
}

fn row(record: &Record) -> Vec<String> {
    let mut cells = vec![
        record.id.to_string(),
        record.url.clone(),
        record.title.clone(),
        record.organization.clone(),
        record.location.clone(),
        record.country.clone(),
        record.description.clone(),
    ];
    cells.extend(
        CategoryLabel::ALL
            .iter()
            .map(|label| record.classifications.get(*label).join(SENTENCE_JOINER)),
    );
    cells.push(
        record
            .any_category_matched()
            .iter()
            .map(|l| l.key())
            .collect::<Vec<_>>()
            .join(","),
    );
    cells
}

/// Serialize records to CSV. Fails with [`JobScoutError::NoResults`] when
/// there is nothing to export.
pub fn to_csv(records: &[Record]) -> Result<Vec<u8>> {
    if records.is_empty() {
        return Err(JobScoutError::NoResults("no records to export".into()));
    }

    let mut writer = WriterBuilder::new().has_headers(true).from_writer(Vec::new());
    writer
        .write_record(header())
        .map_err(|e| JobScoutError::Export(e.to_string()))?;
    for record in records {
        writer
            .write_record(row(record))
            .map_err(|e| JobScoutError::Export(e.to_string()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| JobScoutError::Export(e.to_string()))?;
    info!(records = records.len(), bytes = bytes.len(), "CSV export completed");
    Ok(bytes)
}

/// `jobs_<YYYYmmdd_HHMMSS>.csv`
pub fn export_file_name(at: DateTime<Utc>) -> String {
    format!("jobs_{}.csv", at.format("%Y%m%d_%H%M%S"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use jobscout_shared::{Classifications, Identifier, Sections};

    fn record(id: &str) -> Record {
        let mut classifications = Classifications::new();
        classifications.push(CategoryLabel::CloudProviderA, "Design AWS landing zones");
        classifications.push(CategoryLabel::CloudProviderA, "tune DynamoDB");
        Record {
            id: Identifier::new(id).unwrap(),
            url: format!("https://www.linkedin.com/jobs/view/{id}/"),
            title: "Cloud Engineer".into(),
            organization: "Contoso".into(),
            location: "Dublin, Ireland".into(),
            country: "Ireland".into(),
            description: "line one\nline two, with comma".into(),
            sections: Sections::new(),
            classifications,
            fetched_at: Utc::now(),
        }
    }

    #[test]
    fn empty_export_is_no_results() {
        assert!(matches!(to_csv(&[]), Err(JobScoutError::NoResults(_))));
    }

    #[test]
    fn csv_has_one_row_per_record() {
        let bytes = to_csv(&[record("1"), record("2")]).unwrap();
        let mut reader = csv::Reader::from_reader(bytes.as_slice());

        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.len(), FIXED_COLUMNS.len() + CategoryLabel::ALL.len() + 1);
        assert_eq!(&headers[0], "id");
        assert_eq!(&headers[7], "aws");
        assert_eq!(&headers[headers.len() - 1], "matched_categories");

        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][6], "line one\nline two, with comma");
        assert_eq!(&rows[0][7], "Design AWS landing zones | tune DynamoDB");
        assert_eq!(&rows[0][8], "");
        assert_eq!(&rows[1][headers.len() - 1], "aws");
    }

    #[test]
    fn file_name_is_timestamped() {
        let at = Utc.with_ymd_and_hms(2025, 3, 4, 5, 6, 7).unwrap();
        assert_eq!(export_file_name(at), "jobs_20250304_050607.csv");
    }
}
