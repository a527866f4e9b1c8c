use super::import::TIMESTAMP_COLUMN;
use crate::error::Result;
use crate::models::{Dataset, Schedule, SensorField};
use std::io::Write;
use std::path::Path;

const DECISION_COLUMNS: [&str; 3] = ["irrigate", "ETc", "irrigation_mm"];

/// Write the schedule as CSV: the original columns in their original order,
/// with `irrigate`, `ETc`, and `irrigation_mm` appended for non-control
/// treatments. The control treatment exports the table unmodified.
pub fn write_csv<W: Write>(dataset: &Dataset, schedule: &Schedule, writer: W) -> Result<()> {
    let mut out = csv::Writer::from_writer(writer);

    let mut header: Vec<String> = dataset.headers.clone();
    if !schedule.treatment.is_control() {
        header.extend(DECISION_COLUMNS.iter().map(|c| c.to_string()));
    }
    out.write_record(&header)?;

    for row in &schedule.rows {
        let mut record: Vec<String> = Vec::with_capacity(header.len());
        for column in &dataset.headers {
            record.push(cell_value(dataset, row, column));
        }
        if let Some(decision) = row.decision {
            record.push(decision.irrigate.to_string());
            record.push(format_number(decision.etc_mm));
            record.push(format_number(decision.irrigation_mm));
        }
        out.write_record(&record)?;
    }

    out.flush()?;
    Ok(())
}

pub fn write_csv_file(dataset: &Dataset, schedule: &Schedule, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)?;
    write_csv(dataset, schedule, file)?;
    tracing::info!(path = %path.display(), "schedule exported");
    Ok(())
}

/// Pretty-printed JSON rendition of the schedule for machine consumers.
pub fn to_json_string(schedule: &Schedule) -> Result<String> {
    Ok(serde_json::to_string_pretty(schedule)?)
}

fn cell_value(dataset: &Dataset, row: &crate::models::ScheduleRow, column: &str) -> String {
    if column == TIMESTAMP_COLUMN {
        return row.reading.timestamp.format("%Y-%m-%d %H:%M:%S").to_string();
    }
    if let Some(field) = SensorField::from_column(column) {
        return row
            .reading
            .field(field)
            .map(format_number)
            .unwrap_or_default();
    }
    dataset
        .extra_headers
        .iter()
        .position(|h| h == column)
        .and_then(|i| row.reading.extra.get(i))
        .cloned()
        .unwrap_or_default()
}

fn format_number(value: f64) -> String {
    format!("{}", value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::build_schedule;
    use crate::models::{SensorReading, Treatment};
    use chrono::NaiveDate;

    fn sample_dataset() -> Dataset {
        let mut first = SensorReading::new(
            NaiveDate::from_ymd_opt(2024, 6, 1)
                .unwrap()
                .and_hms_opt(6, 0, 0)
                .unwrap(),
        );
        first.soil_moisture = Some(20.0);
        first.et0 = Some(5.0);
        first.forecast_rain = Some(1.0);
        first.extra = vec!["A3".to_string()];

        let mut second = SensorReading::new(
            NaiveDate::from_ymd_opt(2024, 6, 2)
                .unwrap()
                .and_hms_opt(6, 0, 0)
                .unwrap(),
        );
        second.soil_moisture = Some(30.0);
        second.et0 = Some(4.0);
        second.forecast_rain = Some(0.0);
        second.extra = vec!["A3".to_string()];

        Dataset {
            source: None,
            headers: vec![
                "timestamp".into(),
                "soil_moisture".into(),
                "ET0".into(),
                "forecast_rain".into(),
                "plot_id".into(),
            ],
            extra_headers: vec!["plot_id".into()],
            readings: vec![first, second],
        }
    }

    fn export_to_string(dataset: &Dataset, schedule: &Schedule) -> String {
        let mut buffer = Vec::new();
        write_csv(dataset, schedule, &mut buffer).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn appends_decision_columns_for_active_treatments() {
        let dataset = sample_dataset();
        let schedule =
            build_schedule(&dataset, Treatment::MoistureWeather, &Default::default()).unwrap();
        let csv = export_to_string(&dataset, &schedule);

        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "timestamp,soil_moisture,ET0,forecast_rain,plot_id,irrigate,ETc,irrigation_mm"
        );
        assert_eq!(
            lines.next().unwrap(),
            "2024-06-01 06:00:00,20,5,1,A3,true,5.75,4.75"
        );
        assert_eq!(
            lines.next().unwrap(),
            "2024-06-02 06:00:00,30,4,0,A3,false,0,0"
        );
    }

    #[test]
    fn control_export_matches_input_columns() {
        let dataset = sample_dataset();
        let schedule = build_schedule(&dataset, Treatment::Control, &Default::default()).unwrap();
        let csv = export_to_string(&dataset, &schedule);

        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "timestamp,soil_moisture,ET0,forecast_rain,plot_id"
        );
        assert_eq!(lines.next().unwrap(), "2024-06-01 06:00:00,20,5,1,A3");
        assert_eq!(csv.lines().count(), 3);
    }

    #[test]
    fn extra_columns_survive_export() {
        let dataset = sample_dataset();
        let schedule =
            build_schedule(&dataset, Treatment::MoistureWeather, &Default::default()).unwrap();
        let csv = export_to_string(&dataset, &schedule);

        for line in csv.lines().skip(1) {
            assert!(line.contains("A3"));
        }
    }

    #[test]
    fn json_output_carries_decisions() {
        let dataset = sample_dataset();
        let schedule =
            build_schedule(&dataset, Treatment::MoistureWeather, &Default::default()).unwrap();
        let json = to_json_string(&schedule).unwrap();

        assert!(json.contains("\"irrigate\": true"));
        assert!(json.contains("\"etc_mm\": 5.75"));
        assert!(json.contains("MoistureWeather"));
    }

    #[test]
    fn writes_schedule_file_to_disk() {
        let dataset = sample_dataset();
        let schedule =
            build_schedule(&dataset, Treatment::MoistureWeather, &Default::default()).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(schedule.treatment.schedule_filename());
        write_csv_file(&dataset, &schedule, &path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("timestamp,"));
        assert_eq!(written.lines().count(), 3);
    }
}
