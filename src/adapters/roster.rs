use crate::config::toml_config::{RosterColumns, RosterConfig};
use crate::domain::model::ExternalRecord;
use crate::utils::error::{Result, SyncError};
use serde::Serialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// A roster row that was left out of the import, with a line number a person
/// can find in the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRow {
    pub line: u64,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct RosterImport {
    pub records: Vec<ExternalRecord>,
    pub skipped: Vec<SkippedRow>,
    pub blank_rows: usize,
}

struct ColumnIndexes {
    member_id: Option<usize>,
    first_name: usize,
    last_name: usize,
    email: Option<usize>,
    secondary_email: Option<usize>,
}

/// Reads roster exports into [`ExternalRecord`]s.
///
/// Cells are trimmed. Blank rows are dropped, rows without a first or last
/// name or with an unreadable member id are skipped and reported.
#[derive(Debug, Clone)]
pub struct RosterReader {
    columns: RosterColumns,
    delimiter: u8,
}

impl RosterReader {
    pub fn new(columns: RosterColumns, delimiter: u8) -> Self {
        Self { columns, delimiter }
    }

    pub fn from_config(config: &RosterConfig) -> Result<Self> {
        let delimiter =
            crate::utils::validation::validate_delimiter("roster.delimiter", &config.delimiter)?;
        Ok(Self::new(config.columns.clone(), delimiter))
    }

    pub fn read_path<P: AsRef<Path>>(&self, path: P) -> Result<RosterImport> {
        let path = path.as_ref();
        tracing::info!("Reading roster from {}", path.display());
        let file = File::open(path)?;
        self.read_from(file, &path.display().to_string())
    }

    pub fn read_from<R: Read>(&self, reader: R, source_name: &str) -> Result<RosterImport> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let indexes = self.resolve_columns(csv_reader.headers()?, source_name)?;
        let mut import = RosterImport::default();

        for row in csv_reader.byte_records() {
            let row = row?;
            let line = row.position().map_or(0, |p| p.line());

            let row = match csv::StringRecord::from_byte_record(row) {
                Ok(row) => row,
                Err(e) => {
                    let reason = format!("column {} is not valid UTF-8", e.utf8_error().field() + 1);
                    tracing::warn!("Skipping roster line {}: {}", line, reason);
                    import.skipped.push(SkippedRow { line, reason });
                    continue;
                }
            };

            if row.iter().all(str::is_empty) {
                import.blank_rows += 1;
                continue;
            }

            match Self::parse_row(&row, &indexes) {
                Ok(record) => import.records.push(record),
                Err(reason) => {
                    tracing::warn!("Skipping roster line {}: {}", line, reason);
                    import.skipped.push(SkippedRow { line, reason });
                }
            }
        }

        tracing::info!(
            "Read {} roster rows ({} skipped, {} blank)",
            import.records.len(),
            import.skipped.len(),
            import.blank_rows
        );
        Ok(import)
    }

    fn resolve_columns(&self, headers: &csv::StringRecord, source_name: &str) -> Result<ColumnIndexes> {
        let find = |column: &str| -> Result<usize> {
            headers
                .iter()
                .position(|h| h == column)
                .ok_or_else(|| SyncError::MissingColumn {
                    source_name: source_name.to_string(),
                    column: column.to_string(),
                })
        };
        let find_optional = |column: &Option<String>| -> Result<Option<usize>> {
            column.as_deref().map(find).transpose()
        };

        Ok(ColumnIndexes {
            member_id: find_optional(&self.columns.member_id)?,
            first_name: find(&self.columns.first_name)?,
            last_name: find(&self.columns.last_name)?,
            email: find_optional(&self.columns.email)?,
            secondary_email: find_optional(&self.columns.secondary_email)?,
        })
    }

    fn parse_row(row: &csv::StringRecord, indexes: &ColumnIndexes) -> std::result::Result<ExternalRecord, String> {
        let cell = |index: Option<usize>| index.and_then(|i| row.get(i)).filter(|v| !v.is_empty());

        let first_name = cell(Some(indexes.first_name)).ok_or("missing first name")?;
        let last_name = cell(Some(indexes.last_name)).ok_or("missing last name")?;
        let member_id = cell(indexes.member_id).map(parse_member_id).transpose()?;
        let email = cell(indexes.email).or_else(|| cell(indexes.secondary_email));

        Ok(ExternalRecord::new(member_id, first_name, last_name, email))
    }
}

/// Spreadsheet exports sometimes render whole numbers as `123.0`.
fn parse_member_id(value: &str) -> std::result::Result<i64, String> {
    if let Ok(id) = value.parse::<i64>() {
        return Ok(id);
    }
    match value.parse::<f64>() {
        Ok(id) if id.fract() == 0.0 && id.abs() < i64::MAX as f64 => Ok(id as i64),
        _ => Err(format!("invalid member id '{}'", value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reader() -> RosterReader {
        RosterReader::new(RosterColumns::default(), b',')
    }

    #[test]
    fn test_reads_rows_in_order() {
        let csv = "Member ID,First Name,Last Name,Email\n\
                   123,John,Doe,j@x.com\n\
                   ,Jane,Roe,\n";
        let import = reader().read_from(csv.as_bytes(), "roster.csv").unwrap();

        assert_eq!(
            import.records,
            vec![
                ExternalRecord::new(Some(123), "John", "Doe", Some("j@x.com")),
                ExternalRecord::new(None, "Jane", "Roe", None),
            ]
        );
        assert!(import.skipped.is_empty());
    }

    #[test]
    fn test_cells_are_trimmed_and_spreadsheet_ids_accepted() {
        let csv = "Member ID,First Name,Last Name,Email\n 42.0 ,  John , Doe ,  j@x.com \n";
        let import = reader().read_from(csv.as_bytes(), "roster.csv").unwrap();

        assert_eq!(
            import.records[0],
            ExternalRecord::new(Some(42), "John", "Doe", Some("j@x.com"))
        );
    }

    #[test]
    fn test_skips_blank_and_incomplete_rows() {
        let csv = "Member ID,First Name,Last Name,Email\n\
                   1,John,,j@x.com\n\
                   ,,,\n\
                   2,,Roe,\n\
                   abc,Ann,Lee,\n\
                   3,Bo,Kim,\n";
        let import = reader().read_from(csv.as_bytes(), "roster.csv").unwrap();

        assert_eq!(import.records.len(), 1);
        assert_eq!(import.records[0].first_name, "Bo");
        assert_eq!(import.blank_rows, 1);
        assert_eq!(
            import.skipped,
            vec![
                SkippedRow {
                    line: 2,
                    reason: "missing last name".to_string()
                },
                SkippedRow {
                    line: 4,
                    reason: "missing first name".to_string()
                },
                SkippedRow {
                    line: 5,
                    reason: "invalid member id 'abc'".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_non_utf8_row_is_skipped() {
        let csv: &[u8] = b"Member ID,First Name,Last Name,Email\n\
                           1,J\xe9r\xf4me,Doe,\n\
                           2,Ann,Lee,\n";
        let import = reader().read_from(csv, "roster.csv").unwrap();

        assert_eq!(
            import.records,
            vec![ExternalRecord::new(Some(2), "Ann", "Lee", None)]
        );
        assert_eq!(
            import.skipped,
            vec![SkippedRow {
                line: 2,
                reason: "column 2 is not valid UTF-8".to_string()
            }]
        );
    }

    #[test]
    fn test_secondary_email_fallback() {
        let columns = RosterColumns {
            secondary_email: Some("Alt Email".to_string()),
            ..RosterColumns::default()
        };
        let csv = "Member ID,First Name,Last Name,Email,Alt Email\n\
                   1,John,Doe,,alt@x.com\n\
                   2,Jane,Roe,main@x.com,alt2@x.com\n\
                   3,Ann,Lee,,\n";
        let import = RosterReader::new(columns, b',')
            .read_from(csv.as_bytes(), "roster.csv")
            .unwrap();

        let emails: Vec<Option<&str>> = import.records.iter().map(|r| r.email.as_deref()).collect();
        assert_eq!(emails, vec![Some("alt@x.com"), Some("main@x.com"), None]);
    }

    #[test]
    fn test_custom_headers_and_delimiter() {
        let config = RosterConfig {
            path: None,
            delimiter: ";".to_string(),
            columns: RosterColumns {
                member_id: None,
                first_name: "Vorname".to_string(),
                last_name: "Nachname".to_string(),
                email: Some("E-Mail".to_string()),
                secondary_email: None,
            },
        };
        let csv = "Vorname;Nachname;E-Mail\nJohn;Doe;j@x.com\n";
        let import = RosterReader::from_config(&config)
            .unwrap()
            .read_from(csv.as_bytes(), "roster.csv")
            .unwrap();

        assert_eq!(
            import.records,
            vec![ExternalRecord::new(None, "John", "Doe", Some("j@x.com"))]
        );
    }

    #[test]
    fn test_missing_header_is_error() {
        let csv = "First Name,Last Name,Email\nJohn,Doe,\n";
        let err = reader().read_from(csv.as_bytes(), "roster.csv").unwrap_err();

        match err {
            SyncError::MissingColumn { source_name, column } => {
                assert_eq!(source_name, "roster.csv");
                assert_eq!(column, "Member ID");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
