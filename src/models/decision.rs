use super::reading::SensorReading;
use super::treatment::Treatment;
use serde::Serialize;

/// Outcome of evaluating one reading. When the stress condition fails the
/// numeric fields are explicit zeros, not absent - export and charting
/// depend on every row carrying numbers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Decision {
    pub irrigate: bool,
    /// Crop water demand: ET0 x Kc.
    pub etc_mm: f64,
    /// Net depth to apply: max(0, ETc - forecast rain).
    pub irrigation_mm: f64,
}

impl Decision {
    pub fn no_irrigation() -> Self {
        Self {
            irrigate: false,
            etc_mm: 0.0,
            irrigation_mm: 0.0,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ScheduleRow {
    pub reading: SensorReading,
    /// `None` only under the control treatment, where rows pass through
    /// unannotated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decision: Option<Decision>,
}

/// The annotated table produced by a batch run, in input order.
#[derive(Debug, Clone, Serialize)]
pub struct Schedule {
    pub treatment: Treatment,
    pub rows: Vec<ScheduleRow>,
}

impl Schedule {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn irrigation_events(&self) -> usize {
        self.rows
            .iter()
            .filter(|r| r.decision.map(|d| d.irrigate).unwrap_or(false))
            .count()
    }

    pub fn total_irrigation_mm(&self) -> f64 {
        self.rows
            .iter()
            .filter_map(|r| r.decision)
            .map(|d| d.irrigation_mm)
            .sum()
    }

    /// Rows flagged for irrigation, in schedule order.
    pub fn irrigation_rows(&self) -> Vec<&ScheduleRow> {
        self.rows
            .iter()
            .filter(|r| r.decision.map(|d| d.irrigate).unwrap_or(false))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn row(day: u32, decision: Option<Decision>) -> ScheduleRow {
        let ts = NaiveDate::from_ymd_opt(2024, 6, day)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        ScheduleRow {
            reading: SensorReading::new(ts),
            decision,
        }
    }

    #[test]
    fn schedule_summaries() {
        let schedule = Schedule {
            treatment: Treatment::MoistureWeather,
            rows: vec![
                row(
                    1,
                    Some(Decision {
                        irrigate: true,
                        etc_mm: 5.75,
                        irrigation_mm: 4.75,
                    }),
                ),
                row(2, Some(Decision::no_irrigation())),
                row(
                    3,
                    Some(Decision {
                        irrigate: true,
                        etc_mm: 4.6,
                        irrigation_mm: 4.1,
                    }),
                ),
            ],
        };

        assert_eq!(schedule.irrigation_events(), 2);
        assert!((schedule.total_irrigation_mm() - 8.85).abs() < 1e-9);
        assert_eq!(schedule.irrigation_rows().len(), 2);
    }

    #[test]
    fn control_schedule_has_no_events() {
        let schedule = Schedule {
            treatment: Treatment::Control,
            rows: vec![row(1, None), row(2, None)],
        };
        assert_eq!(schedule.irrigation_events(), 0);
        assert_eq!(schedule.total_irrigation_mm(), 0.0);
    }
}
