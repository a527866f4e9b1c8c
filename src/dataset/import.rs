use crate::error::{IrriOpsError, Result};
use crate::models::{Dataset, SensorField, SensorReading};
use chrono::{NaiveDate, NaiveDateTime};
use std::path::Path;

pub const TIMESTAMP_COLUMN: &str = "timestamp";

/// Load a treatment dataset from a CSV file.
///
/// The header row must name a `timestamp` column. Cells in the recognized
/// sensor columns (`soil_moisture`, `NDVI`, `ET0`, `forecast_rain`) are
/// parsed as numbers; an empty cell leaves the field absent, while a
/// non-numeric cell fails the whole import with row and column context.
/// Unknown columns are kept verbatim for passthrough on export.
pub fn load_dataset(path: &Path) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)?;

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let timestamp_index = headers
        .iter()
        .position(|h| h == TIMESTAMP_COLUMN)
        .ok_or(IrriOpsError::MissingColumn {
            column: TIMESTAMP_COLUMN,
            treatment: "every treatment",
        })?;

    // Map each header to a recognized sensor field or a passthrough column.
    let mut field_columns: Vec<(usize, SensorField)> = Vec::new();
    let mut extra_columns: Vec<(usize, String)> = Vec::new();
    for (index, header) in headers.iter().enumerate() {
        if index == timestamp_index {
            continue;
        }
        match SensorField::from_column(header) {
            Some(field) => field_columns.push((index, field)),
            None => extra_columns.push((index, header.clone())),
        }
    }

    let mut readings = Vec::new();
    for (row_idx, record) in reader.records().enumerate() {
        let record = record?;
        let row = row_idx + 2; // line numbers start at 1, line 1 is the header

        let raw_timestamp = record.get(timestamp_index).unwrap_or("").trim();
        let timestamp =
            parse_timestamp(raw_timestamp).ok_or_else(|| IrriOpsError::InvalidTimestamp {
                row,
                value: raw_timestamp.to_string(),
            })?;

        let mut reading = SensorReading::new(timestamp);
        for (index, field) in &field_columns {
            let raw = record.get(*index).unwrap_or("").trim();
            if raw.is_empty() {
                continue;
            }
            let value = raw
                .parse::<f64>()
                .map_err(|_| IrriOpsError::InvalidValue {
                    column: field.column().to_string(),
                    row,
                    value: raw.to_string(),
                })?;
            reading.set_field(*field, value);
        }
        reading.extra = extra_columns
            .iter()
            .map(|(index, _)| record.get(*index).unwrap_or("").to_string())
            .collect();

        readings.push(reading);
    }

    tracing::debug!(
        rows = readings.len(),
        path = %path.display(),
        "dataset loaded"
    );

    Ok(Dataset {
        source: Some(path.to_path_buf()),
        headers,
        extra_headers: extra_columns.into_iter().map(|(_, h)| h).collect(),
        readings,
    })
}

fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .ok()
        .or_else(|| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S").ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_recognized_and_extra_columns() {
        let file = write_csv(
            "timestamp,soil_moisture,ET0,forecast_rain,plot_id\n\
             2024-06-01,20.5,5.0,1.0,A3\n\
             2024-06-02,31.0,4.2,0.0,A3\n",
        );

        let dataset = load_dataset(file.path()).unwrap();
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.extra_headers, vec!["plot_id".to_string()]);
        assert_eq!(dataset.readings[0].soil_moisture, Some(20.5));
        assert_eq!(dataset.readings[0].et0, Some(5.0));
        assert_eq!(dataset.readings[0].extra, vec!["A3".to_string()]);
        assert!(dataset.readings[0].ndvi.is_none());
    }

    #[test]
    fn accepts_datetime_and_date_only_timestamps() {
        let file = write_csv(
            "timestamp,ET0\n\
             2024-06-01 06:30:00,5.0\n\
             2024-06-02T18:00:00,4.0\n\
             2024-06-03,3.0\n",
        );

        let dataset = load_dataset(file.path()).unwrap();
        assert_eq!(dataset.len(), 3);
        assert_eq!(
            dataset.readings[0].timestamp.format("%H:%M").to_string(),
            "06:30"
        );
        assert_eq!(
            dataset.readings[2].timestamp.format("%H:%M").to_string(),
            "00:00"
        );
    }

    #[test]
    fn missing_timestamp_column_is_a_schema_error() {
        let file = write_csv("date,ET0\n2024-06-01,5.0\n");

        let err = load_dataset(file.path()).unwrap_err();
        assert!(matches!(
            err,
            IrriOpsError::MissingColumn {
                column: TIMESTAMP_COLUMN,
                ..
            }
        ));
    }

    #[test]
    fn non_numeric_cell_fails_with_row_context() {
        let file = write_csv(
            "timestamp,ET0\n\
             2024-06-01,5.0\n\
             2024-06-02,n/a\n",
        );

        let err = load_dataset(file.path()).unwrap_err();
        match err {
            IrriOpsError::InvalidValue { column, row, value } => {
                assert_eq!(column, "ET0");
                assert_eq!(row, 3);
                assert_eq!(value, "n/a");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unparseable_timestamp_fails_the_import() {
        let file = write_csv("timestamp,ET0\nyesterday,5.0\n");

        assert!(matches!(
            load_dataset(file.path()).unwrap_err(),
            IrriOpsError::InvalidTimestamp { row: 2, .. }
        ));
    }

    #[test]
    fn empty_cells_stay_absent() {
        let file = write_csv("timestamp,soil_moisture,ET0\n2024-06-01,,5.0\n");

        let dataset = load_dataset(file.path()).unwrap();
        assert!(dataset.readings[0].soil_moisture.is_none());
        assert_eq!(dataset.readings[0].et0, Some(5.0));
    }
}
