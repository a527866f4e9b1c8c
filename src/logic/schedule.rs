use super::evaluator::evaluate;
use super::thresholds::ThresholdConfig;
use crate::error::{IrriOpsError, Result};
use crate::models::{Dataset, Schedule, ScheduleRow, Treatment};

/// Check that the dataset carries every column the treatment needs.
pub fn validate_schema(dataset: &Dataset, treatment: Treatment) -> Result<()> {
    for field in treatment.required_fields() {
        if !dataset.has_column(field.column()) {
            return Err(IrriOpsError::MissingColumn {
                column: field.column(),
                treatment: treatment.label(),
            });
        }
    }
    Ok(())
}

/// Apply the treatment rules across the whole dataset, preserving row order.
///
/// Validation is all-or-nothing: threshold and schema problems abort before
/// any row is evaluated, and a row-level failure discards the entire batch
/// rather than producing a partial schedule. Rows are independent, so the
/// result carries exactly one entry per reading, in input order.
pub fn build_schedule(
    dataset: &Dataset,
    treatment: Treatment,
    thresholds: &ThresholdConfig,
) -> Result<Schedule> {
    thresholds.validate()?;
    validate_schema(dataset, treatment)?;

    let rows = if treatment.is_control() {
        // Control group: no irrigation logic applied, rows pass through.
        dataset
            .readings
            .iter()
            .map(|reading| ScheduleRow {
                reading: reading.clone(),
                decision: None,
            })
            .collect()
    } else {
        dataset
            .readings
            .iter()
            .map(|reading| {
                evaluate(reading, treatment, thresholds).map(|decision| ScheduleRow {
                    reading: reading.clone(),
                    decision: Some(decision),
                })
            })
            .collect::<Result<Vec<_>>>()?
    };

    Ok(Schedule { treatment, rows })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SensorReading;
    use chrono::{NaiveDate, NaiveDateTime};

    fn ts(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, day)
            .unwrap()
            .and_hms_opt(6, 0, 0)
            .unwrap()
    }

    fn t2_dataset(rows: Vec<(u32, Option<f64>, Option<f64>, Option<f64>)>) -> Dataset {
        let readings = rows
            .into_iter()
            .map(|(day, moisture, et0, rain)| {
                let mut r = SensorReading::new(ts(day));
                r.soil_moisture = moisture;
                r.et0 = et0;
                r.forecast_rain = rain;
                r
            })
            .collect();
        Dataset {
            source: None,
            headers: vec![
                "timestamp".into(),
                "soil_moisture".into(),
                "ET0".into(),
                "forecast_rain".into(),
            ],
            extra_headers: Vec::new(),
            readings,
        }
    }

    #[test]
    fn schedule_preserves_length_and_order() {
        let dataset = t2_dataset(vec![
            (3, Some(20.0), Some(5.0), Some(1.0)),
            (1, Some(30.0), Some(5.0), Some(1.0)),
            (2, Some(20.0), Some(4.0), Some(0.5)),
        ]);
        let schedule =
            build_schedule(&dataset, Treatment::MoistureWeather, &Default::default()).unwrap();

        assert_eq!(schedule.len(), dataset.len());
        let timestamps: Vec<_> = schedule.rows.iter().map(|r| r.reading.timestamp).collect();
        assert_eq!(timestamps, vec![ts(3), ts(1), ts(2)]);
    }

    #[test]
    fn control_rows_pass_through_unannotated() {
        let dataset = t2_dataset(vec![(1, None, None, None), (2, None, None, None)]);
        let schedule = build_schedule(&dataset, Treatment::Control, &Default::default()).unwrap();

        assert_eq!(schedule.len(), 2);
        assert!(schedule.rows.iter().all(|r| r.decision.is_none()));
    }

    #[test]
    fn missing_column_fails_before_any_row() {
        let mut dataset = t2_dataset(vec![(1, Some(20.0), Some(5.0), Some(1.0))]);
        dataset.headers.retain(|h| h != "ET0");

        let err =
            build_schedule(&dataset, Treatment::MoistureWeather, &Default::default()).unwrap_err();
        assert!(matches!(
            err,
            IrriOpsError::MissingColumn { column: "ET0", .. }
        ));
    }

    #[test]
    fn one_bad_row_discards_the_batch() {
        let dataset = t2_dataset(vec![
            (1, Some(20.0), Some(5.0), Some(1.0)),
            (2, Some(20.0), None, Some(1.0)), // empty ET0 cell
            (3, Some(20.0), Some(5.0), Some(1.0)),
        ]);

        assert!(build_schedule(&dataset, Treatment::MoistureWeather, &Default::default()).is_err());
    }

    #[test]
    fn invalid_thresholds_abort_the_run() {
        let dataset = t2_dataset(vec![(1, Some(20.0), Some(5.0), Some(1.0))]);
        let bad = ThresholdConfig {
            field_capacity: -1.0,
            ..Default::default()
        };

        assert!(matches!(
            build_schedule(&dataset, Treatment::MoistureWeather, &bad),
            Err(IrriOpsError::InvalidThreshold(_))
        ));
    }

    #[test]
    fn decisions_match_per_row_evaluation() {
        let dataset = t2_dataset(vec![
            (1, Some(20.0), Some(5.0), Some(1.0)), // irrigate: 5.75 / 4.75
            (2, Some(30.0), Some(5.0), Some(1.0)), // wet soil: no
        ]);
        let schedule =
            build_schedule(&dataset, Treatment::MoistureWeather, &Default::default()).unwrap();

        let first = schedule.rows[0].decision.unwrap();
        assert!(first.irrigate);
        assert!((first.etc_mm - 5.75).abs() < 1e-9);

        let second = schedule.rows[1].decision.unwrap();
        assert!(!second.irrigate);
        assert_eq!(second.etc_mm, 0.0);
        assert_eq!(second.irrigation_mm, 0.0);
    }
}
